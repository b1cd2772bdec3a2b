//! Rendering of the compatibility matrix and in-place replacement of the
//! previously generated block inside the index document.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::document::Entity;
use crate::status::{CanonicalStatus, FeatureStatus, ReportSummary, FEATURE_COLUMNS, OVERALL_COLUMN};

pub const MATRIX_HEADING: &str = "## Compatibility Matrix";
pub const TABLE_START: &str = "| Client | Version |";
pub const REPORT_LINK_PREFIX: &str = "./clients/";

/// Ordering of versions inside one client group, ascending.
pub trait VersionOrder {
    fn compare(&self, a: &str, b: &str) -> Ordering;
}

/// Plain string comparison, so `"10"` sorts before `"9"`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Lexicographic;

impl VersionOrder for Lexicographic {
    fn compare(&self, a: &str, b: &str) -> Ordering {
        a.cmp(b)
    }
}

/// Compares digit runs numerically and everything else as text.
#[derive(Debug, Clone, Copy, Default)]
pub struct Natural;

impl VersionOrder for Natural {
    fn compare(&self, a: &str, b: &str) -> Ordering {
        let (mut left, mut right) = (a, b);
        loop {
            match (left.is_empty(), right.is_empty()) {
                (true, true) => return Ordering::Equal,
                (true, false) => return Ordering::Less,
                (false, true) => return Ordering::Greater,
                _ => {}
            }
            let (l_chunk, l_rest) = split_chunk(left);
            let (r_chunk, r_rest) = split_chunk(right);
            let ordering = match (l_chunk.parse::<u64>(), r_chunk.parse::<u64>()) {
                (Ok(l), Ok(r)) => l.cmp(&r).then_with(|| l_chunk.len().cmp(&r_chunk.len())),
                _ => l_chunk.cmp(r_chunk),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
            left = l_rest;
            right = r_rest;
        }
    }
}

fn split_chunk(s: &str) -> (&str, &str) {
    let digits = s.starts_with(|c: char| c.is_ascii_digit());
    let end = s.find(|c: char| c.is_ascii_digit() != digits).unwrap_or(s.len());
    s.split_at(end)
}

/// Version ordering selectable from configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionOrdering {
    #[default]
    Lexicographic,
    Natural,
}

impl VersionOrder for VersionOrdering {
    fn compare(&self, a: &str, b: &str) -> Ordering {
        match self {
            Self::Lexicographic => Lexicographic.compare(a, b),
            Self::Natural => Natural.compare(a, b),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatrixRow {
    pub entity: Entity,
    pub statuses: FeatureStatus,
    pub link: Option<String>,
}

impl MatrixRow {
    pub fn overall(&self) -> CanonicalStatus {
        self.statuses.overall()
    }
}

impl From<&ReportSummary> for MatrixRow {
    fn from(report: &ReportSummary) -> Self {
        let link = (report.overall() != CanonicalStatus::NotYetTested)
            .then(|| format!("{REPORT_LINK_PREFIX}{}", report.file_name));
        Self { entity: report.entity.clone(), statuses: report.features.clone(), link }
    }
}

/// Groups rows by client name (ascending) and orders each group by version,
/// newest first. Equal versions keep their input order.
pub fn order_rows(rows: Vec<MatrixRow>, order: &dyn VersionOrder) -> Vec<MatrixRow> {
    let mut groups: BTreeMap<String, Vec<MatrixRow>> = BTreeMap::new();
    for row in rows {
        groups.entry(row.entity.name.clone()).or_default().push(row);
    }
    groups
        .into_values()
        .flat_map(|mut group| {
            group.sort_by(|a, b| order.compare(b.entity.version_str(), a.entity.version_str()));
            group
        })
        .collect()
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}

fn render_row(row: &MatrixRow) -> String {
    let cells: Vec<String> = FEATURE_COLUMNS
        .iter()
        .map(|column| {
            let icon = row
                .statuses
                .get(column.label)
                .unwrap_or(CanonicalStatus::NotYetTested)
                .icon();
            match (&row.link, column.label == OVERALL_COLUMN) {
                (Some(link), true) => format!("[{icon}]({link})"),
                _ => icon.to_string(),
            }
        })
        .collect();
    format!(
        "| {} | {} | {} |",
        escape_cell(&row.entity.name),
        escape_cell(row.entity.version_str()),
        cells.join(" | ")
    )
}

/// The full generated block: heading, blank line, table, trailing blank line.
///
/// Output depends only on `rows`, so rendering the same rows twice is
/// byte-identical.
pub fn render_matrix(rows: &[MatrixRow]) -> String {
    let labels: Vec<&str> = FEATURE_COLUMNS.iter().map(|column| column.label).collect();
    let mut lines = vec![
        MATRIX_HEADING.to_string(),
        String::new(),
        format!("{TABLE_START} {} |", labels.join(" | ")),
        format!("|--------|---------|{}", ":-------:|".repeat(labels.len())),
    ];
    lines.extend(rows.iter().map(render_row));
    let mut block = lines.join("\n");
    block.push_str("\n\n");
    block
}

/// Byte range of the generated block: from the heading line through the last
/// contiguous table line and one following blank line.
pub fn locate_matrix(document: &str) -> Option<Range<usize>> {
    let mut lines = Vec::new();
    let mut offset = 0;
    for raw in document.split_inclusive('\n') {
        lines.push((offset, offset + raw.len(), raw.trim_end_matches(['\n', '\r'])));
        offset += raw.len();
    }

    let is_blank = |idx: usize| lines.get(idx).is_some_and(|(_, _, text)| text.trim().is_empty());
    let start_idx = (0..lines.len()).find(|&idx| {
        lines[idx].2.trim_end() == MATRIX_HEADING
            && is_blank(idx + 1)
            && lines.get(idx + 2).is_some_and(|(_, _, text)| text.starts_with(TABLE_START))
    })?;

    let mut end_idx = start_idx + 2;
    while lines.get(end_idx + 1).is_some_and(|(_, _, text)| text.trim_start().starts_with('|')) {
        end_idx += 1;
    }
    if is_blank(end_idx + 1) {
        end_idx += 1;
    }
    Some(lines[start_idx].0..lines[end_idx].1)
}

/// Replaces the generated block, leaving every other byte untouched.
/// `None` when the anchor structure is absent.
pub fn splice_matrix(document: &str, block: &str) -> Option<String> {
    let range = locate_matrix(document)?;
    let mut updated = String::with_capacity(document.len() + block.len());
    updated.push_str(&document[..range.start]);
    updated.push_str(block);
    updated.push_str(&document[range.end..]);
    Some(updated)
}
