//! The shared status vocabulary.
//!
//! Every component maps markers and phrases through [`resolve`] (or the
//! marker-only [`resolve_marker`]) so report parsing, matrix rendering and the
//! queue audit cannot drift apart.

use std::fmt;

use serde::Serialize;

use crate::document::{Entity, ParsedDocument};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalStatus {
    NotYetTested,
    TestingInProgress,
    FullyCompatible,
    MostlyCompatible,
    PartiallyCompatible,
    NotCompatible,
}

impl CanonicalStatus {
    pub const ALL: [CanonicalStatus; 6] = [
        CanonicalStatus::NotYetTested,
        CanonicalStatus::TestingInProgress,
        CanonicalStatus::FullyCompatible,
        CanonicalStatus::MostlyCompatible,
        CanonicalStatus::PartiallyCompatible,
        CanonicalStatus::NotCompatible,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::NotYetTested => "Not Yet Tested",
            Self::TestingInProgress => "Testing in Progress",
            Self::FullyCompatible => "Fully Compatible",
            Self::MostlyCompatible => "Mostly Compatible",
            Self::PartiallyCompatible => "Partially Compatible",
            Self::NotCompatible => "Not Compatible",
        }
    }

    /// Glyph written into the rendered matrix.
    pub fn icon(self) -> &'static str {
        match self {
            Self::NotYetTested => "⏳",
            Self::TestingInProgress => "🔄",
            Self::FullyCompatible => "✅",
            Self::MostlyCompatible => "⚠️",
            Self::PartiallyCompatible => "⛔",
            Self::NotCompatible => "❌",
        }
    }

    /// Definiteness rank: untested < in progress < any terminal outcome.
    ///
    /// The four terminal outcomes share a rank; they are exclusive, not ordered.
    pub fn definiteness(self) -> u8 {
        match self {
            Self::NotYetTested => 0,
            Self::TestingInProgress => 1,
            _ => 2,
        }
    }

    pub fn is_terminal(self) -> bool {
        self.definiteness() == 2
    }

    /// Applies the work-in-progress floor to an already resolved status.
    pub fn with_in_progress_floor(self) -> Self {
        match self {
            Self::NotYetTested => Self::TestingInProgress,
            other => other,
        }
    }
}

impl fmt::Display for CanonicalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ⚠ is matched without its variation selector so `⚠` and `⚠️` both count.
const MARKERS: &[(&str, CanonicalStatus)] = &[
    ("🔄", CanonicalStatus::TestingInProgress),
    ("✅", CanonicalStatus::FullyCompatible),
    ("⚠", CanonicalStatus::MostlyCompatible),
    ("⛔", CanonicalStatus::PartiallyCompatible),
    ("❌", CanonicalStatus::NotCompatible),
    ("⏳", CanonicalStatus::NotYetTested),
];

const PHRASES: &[(&str, CanonicalStatus)] = &[
    ("Testing", CanonicalStatus::TestingInProgress),
    ("Fully", CanonicalStatus::FullyCompatible),
    ("Mostly", CanonicalStatus::MostlyCompatible),
    ("Partially", CanonicalStatus::PartiallyCompatible),
    ("Not", CanonicalStatus::NotCompatible),
];

const IN_PROGRESS_MARKERS: &[&str] = &["In Progress", "🔄"];

pub const OVERALL_RATING_MARKER: &str = "**Overall Rating:**";

/// Looks only at the closed glyph set.
pub fn resolve_marker(fragment: &str) -> Option<CanonicalStatus> {
    MARKERS.iter().find(|(marker, _)| fragment.contains(marker)).map(|(_, status)| *status)
}

fn resolve_phrase(fragment: &str) -> Option<CanonicalStatus> {
    PHRASES.iter().find(|(phrase, _)| fragment.contains(phrase)).map(|(_, status)| *status)
}

/// Maps a cell, line or body to a status: glyphs beat phrases, phrases beat
/// the `NotYetTested` default.
pub fn resolve(fragment: &str) -> CanonicalStatus {
    resolve_marker(fragment)
        .or_else(|| resolve_phrase(fragment))
        .unwrap_or(CanonicalStatus::NotYetTested)
}

/// A document is in progress when the phrase or the glyph appears anywhere.
pub fn is_work_in_progress(text: &str) -> bool {
    IN_PROGRESS_MARKERS.iter().any(|marker| text.contains(marker))
}

/// Where a matrix column reads its status from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnSource {
    /// Status cell of the first row in `section` whose leading cell starts with `row`.
    TableRow { section: &'static str, row: &'static str },
    /// The `**Overall Rating:**` line.
    OverallRating,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureColumn {
    pub label: &'static str,
    pub source: ColumnSource,
}

const fn row(label: &'static str, section: &'static str, row: &'static str) -> FeatureColumn {
    FeatureColumn { label, source: ColumnSource::TableRow { section, row } }
}

pub const MOUNT_SECTION: &str = "Mount Operations";
pub const FEATURE_SECTION: &str = "Feature Compatibility";
pub const OVERALL_COLUMN: &str = "Overall";

/// Matrix columns in rendering order.
pub const FEATURE_COLUMNS: &[FeatureColumn] = &[
    row("Basic Mount", MOUNT_SECTION, "Default"),
    row("Read Ops", FEATURE_SECTION, "Basic Read"),
    row("Write Ops", FEATURE_SECTION, "Basic Write"),
    row("Attrs", FEATURE_SECTION, "Permission"),
    row("Locking", FEATURE_SECTION, "File Locking"),
    row("Large Files", FEATURE_SECTION, "Large Files"),
    row("Unicode", FEATURE_SECTION, "Unicode"),
    FeatureColumn { label: OVERALL_COLUMN, source: ColumnSource::OverallRating },
];

/// Per-column statuses for one entity, in [`FEATURE_COLUMNS`] order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureStatus {
    entries: Vec<(String, CanonicalStatus)>,
}

impl FeatureStatus {
    pub fn get(&self, label: &str) -> Option<CanonicalStatus> {
        self.entries.iter().find(|(name, _)| name == label).map(|(_, status)| *status)
    }

    pub fn overall(&self) -> CanonicalStatus {
        self.get(OVERALL_COLUMN).unwrap_or(CanonicalStatus::NotYetTested)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, CanonicalStatus)> {
        self.entries.iter().map(|(name, status)| (name.as_str(), *status))
    }
}

impl FromIterator<(String, CanonicalStatus)> for FeatureStatus {
    fn from_iter<I: IntoIterator<Item = (String, CanonicalStatus)>>(iter: I) -> Self {
        Self { entries: iter.into_iter().collect() }
    }
}

/// One report reduced to its entity and normalized statuses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub entity: Entity,
    pub file_name: String,
    pub in_progress: bool,
    pub features: FeatureStatus,
}

impl ReportSummary {
    pub fn overall(&self) -> CanonicalStatus {
        self.features.overall()
    }
}

/// Text after the overall rating marker, if the report has one.
pub fn overall_rating_text(doc: &ParsedDocument) -> Option<&str> {
    doc.body.lines().find_map(|line| {
        let idx = line.find(OVERALL_RATING_MARKER)?;
        Some(line[idx + OVERALL_RATING_MARKER.len()..].trim())
    })
}

fn table_row_status(doc: &ParsedDocument, section: &str, key: &str) -> CanonicalStatus {
    let Some(table) = doc.section_table(section) else {
        return CanonicalStatus::NotYetTested;
    };
    let status_col = table.column("Status").unwrap_or(1);
    table
        .row_starting_with(key)
        .and_then(|cells| cells.get(status_col))
        .map(|cell| resolve(cell))
        .unwrap_or(CanonicalStatus::NotYetTested)
}

/// Resolves every column of a report, then applies the in-progress floor.
///
/// The floor runs strictly after per-column resolution so terminal outcomes
/// recorded in the report are never masked.
pub fn assess_report(doc: &ParsedDocument, entity: Entity, file_name: &str) -> ReportSummary {
    let in_progress = is_work_in_progress(&doc.body);
    let features = FEATURE_COLUMNS
        .iter()
        .map(|column| {
            let resolved = match column.source {
                ColumnSource::TableRow { section, row } => table_row_status(doc, section, row),
                ColumnSource::OverallRating => {
                    overall_rating_text(doc).map(resolve).unwrap_or(CanonicalStatus::NotYetTested)
                }
            };
            let status = if in_progress { resolved.with_in_progress_floor() } else { resolved };
            (column.label.to_string(), status)
        })
        .collect();

    ReportSummary { entity, file_name: file_name.to_string(), in_progress, features }
}
