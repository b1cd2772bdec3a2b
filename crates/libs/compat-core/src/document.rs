//! Line-scanning parser for client reports and the summary documents.
//!
//! A document is an optional `---` delimited YAML metadata block followed by a
//! markdown body. Headings are resolved first; tables and checklists are only
//! ever looked for inside an already-bounded section body.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_yaml::Value as YamlValue;

use crate::error::ParseError;

/// Heading depth of the sections a report is built from (`## Name`).
pub const SECTION_LEVEL: usize = 2;

/// A tested client, as declared by a report title or a queue row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Entity {
    pub name: String,
    pub version: Option<String>,
}

impl Entity {
    pub fn new(name: impl Into<String>, version: Option<String>) -> Self {
        Self { name: name.into(), version: version.filter(|v| !v.is_empty()) }
    }

    /// Splits a report title into name and trailing version token.
    ///
    /// `Ubuntu 22.04` carries a version; `Linux Kernel 5.15+` and single-word
    /// titles do not.
    pub fn from_title(title: &str) -> Self {
        let title = title.trim();
        if !title.ends_with('+') {
            if let Some((name, version)) = title.rsplit_once(' ') {
                return Self::new(name, Some(version.to_string()));
            }
        }
        Self::new(title, None)
    }

    pub fn version_str(&self) -> &str {
        self.version.as_deref().unwrap_or("")
    }

    /// Name and version joined back together, used for cross-document matching.
    pub fn display_name(&self) -> String {
        match &self.version {
            Some(version) => format!("{} {}", self.name, version),
            None => self.name.clone(),
        }
    }
}

/// A heading and the raw text up to the next heading of equal or higher level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub level: usize,
    pub heading: String,
    pub body: String,
}

impl Section {
    /// The first well-formed pipe table in this section.
    pub fn first_table(&self) -> Option<Table> {
        first_table(&self.body)
    }

    /// Every well-formed pipe table in this section, in order.
    pub fn tables(&self) -> Vec<Table> {
        tables(&self.body)
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.body.contains(needle)
    }

    /// True when the body holds at least one `- [ ]` / `- [x]` item.
    pub fn has_checklist(&self) -> bool {
        self.body.lines().any(is_checklist_line)
    }
}

/// A pipe-delimited table: header, separator, zero or more data rows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Table {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Index of the header column named `name`, ignoring ASCII case.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|cell| cell.eq_ignore_ascii_case(name))
    }

    /// First data row whose leading cell starts with `key`.
    pub fn row_starting_with(&self, key: &str) -> Option<&[String]> {
        self.rows
            .iter()
            .find(|row| row.first().is_some_and(|cell| cell.starts_with(key)))
            .map(Vec::as_slice)
    }

    /// True when any data row has a cell exactly equal to `value`.
    pub fn has_cell(&self, value: &str) -> bool {
        self.rows.iter().any(|row| row.iter().any(|cell| cell == value))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDocument {
    pub metadata: BTreeMap<String, YamlValue>,
    pub title: Option<String>,
    pub body: String,
    sections: Vec<Section>,
}

impl ParsedDocument {
    /// Parses a document that is not required to carry a title, such as the
    /// progress queue or the compatibility index.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let (metadata, body) = split_metadata(text)?;
        let lines = scan_lines(body);
        let title = lines
            .iter()
            .filter(|line| !line.fenced)
            .find_map(|line| title_text(line.text));
        let sections = collect_sections(body, &lines);
        Ok(Self { metadata, title, body: body.to_string(), sections })
    }

    /// Parses a client report; a report without a title is malformed.
    pub fn parse_report(text: &str) -> Result<(Self, Entity), ParseError> {
        let doc = Self::parse(text)?;
        let entity = doc.title.as_deref().map(Entity::from_title).ok_or(ParseError::MissingTitle)?;
        Ok((doc, entity))
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// The first top-level (`##`) section whose heading starts with `name`.
    /// Subsections never stand in for a report section.
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections
            .iter()
            .find(|section| section.level == SECTION_LEVEL && section.heading.starts_with(name))
    }

    pub fn has_section(&self, name: &str) -> bool {
        self.section(name).is_some()
    }

    /// First table of the named section; `None` when either is absent.
    pub fn section_table(&self, name: &str) -> Option<Table> {
        self.section(name).and_then(Section::first_table)
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.body.contains(needle)
    }
}

struct Line<'a> {
    start: usize,
    end: usize,
    text: &'a str,
    fenced: bool,
}

fn scan_lines(body: &str) -> Vec<Line<'_>> {
    let mut lines = Vec::new();
    let mut offset = 0;
    let mut in_fence = false;
    for raw in body.split_inclusive('\n') {
        let start = offset;
        offset += raw.len();
        let text = raw.trim_end_matches(['\n', '\r']);
        let fence_marker = is_fence(text);
        lines.push(Line { start, end: offset, text, fenced: in_fence || fence_marker });
        if fence_marker {
            in_fence = !in_fence;
        }
    }
    lines
}

fn is_fence(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.starts_with("```") || trimmed.starts_with("~~~")
}

fn split_metadata(text: &str) -> Result<(BTreeMap<String, YamlValue>, &str), ParseError> {
    let text = text.trim_start_matches('\u{feff}');
    let mut lines = text.split_inclusive('\n');
    let Some(first) = lines.next() else {
        return Ok((BTreeMap::new(), text));
    };
    if first.trim_end() != "---" {
        return Ok((BTreeMap::new(), text));
    }

    let yaml_start = first.len();
    let mut offset = yaml_start;
    for line in lines {
        let trimmed = line.trim_end();
        if trimmed == "---" || trimmed == "..." {
            let metadata = parse_metadata(&text[yaml_start..offset])?;
            return Ok((metadata, &text[offset + line.len()..]));
        }
        offset += line.len();
    }
    Err(ParseError::UnterminatedMetadata)
}

fn parse_metadata(yaml: &str) -> Result<BTreeMap<String, YamlValue>, ParseError> {
    if yaml.trim().is_empty() {
        return Ok(BTreeMap::new());
    }
    let value: YamlValue =
        serde_yaml::from_str(yaml).map_err(|err| ParseError::MalformedMetadata(err.to_string()))?;
    match value {
        YamlValue::Null => Ok(BTreeMap::new()),
        YamlValue::Mapping(mapping) => mapping
            .into_iter()
            .map(|(key, value)| match key {
                YamlValue::String(key) => Ok((key, value)),
                YamlValue::Number(key) => Ok((key.to_string(), value)),
                YamlValue::Bool(key) => Ok((key.to_string(), value)),
                _ => Err(ParseError::MalformedMetadata("non-scalar metadata key".into())),
            })
            .collect(),
        _ => Err(ParseError::MalformedMetadata("expected a key/value mapping".into())),
    }
}

/// `# Title (annotation)` yields `Title`; deeper headings never match.
fn title_text(line: &str) -> Option<String> {
    let text = line.strip_prefix("# ")?.trim_end();
    let text = match (text.ends_with(')'), text.find(" (")) {
        (true, Some(idx)) => &text[..idx],
        _ => text,
    };
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn heading(line: &str) -> Option<(usize, &str)> {
    let level = line.bytes().take_while(|b| *b == b'#').count();
    if level == 0 || level > 6 {
        return None;
    }
    let rest = &line[level..];
    if !rest.is_empty() && !rest.starts_with(' ') {
        return None;
    }
    Some((level, rest.trim()))
}

fn collect_sections(body: &str, lines: &[Line<'_>]) -> Vec<Section> {
    let headings: Vec<(usize, usize, &str)> = lines
        .iter()
        .enumerate()
        .filter(|(_, line)| !line.fenced)
        .filter_map(|(idx, line)| heading(line.text).map(|(level, text)| (idx, level, text)))
        .collect();

    headings
        .iter()
        .enumerate()
        .map(|(pos, &(idx, level, text))| {
            let start = lines[idx].end;
            let end = headings[pos + 1..]
                .iter()
                .find(|(_, next_level, _)| *next_level <= level)
                .map(|&(next_idx, _, _)| lines[next_idx].start)
                .unwrap_or(body.len());
            Section { level, heading: text.to_string(), body: body[start..end].to_string() }
        })
        .collect()
}

fn split_cells(line: &str) -> Vec<String> {
    line.trim().trim_matches('|').split('|').map(|cell| cell.trim().to_string()).collect()
}

fn is_table_line(line: &str) -> bool {
    line.trim_start().starts_with('|')
}

fn is_separator(line: &str) -> bool {
    if !is_table_line(line) {
        return false;
    }
    let cells = split_cells(line);
    !cells.is_empty()
        && cells.iter().all(|cell| {
            !cell.is_empty() && cell.contains('-') && cell.chars().all(|c| matches!(c, '-' | ':'))
        })
}

fn tables(text: &str) -> Vec<Table> {
    let lines: Vec<&str> = text.lines().collect();
    let mut found = Vec::new();
    let mut idx = 0;
    while idx + 1 < lines.len() {
        if !is_table_line(lines[idx]) || !is_separator(lines[idx + 1]) {
            idx += 1;
            continue;
        }
        let header = split_cells(lines[idx]);
        idx += 2;
        let mut rows = Vec::new();
        while idx < lines.len() && is_table_line(lines[idx]) {
            rows.push(split_cells(lines[idx]));
            idx += 1;
        }
        found.push(Table { header, rows });
    }
    found
}

fn first_table(text: &str) -> Option<Table> {
    tables(text).into_iter().next()
}

fn is_checklist_line(line: &str) -> bool {
    line.contains("- [ ]") || line.contains("- [x]")
}
