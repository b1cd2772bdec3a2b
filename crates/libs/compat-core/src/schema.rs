use serde::{Deserialize, Serialize};

use crate::document::ParsedDocument;
use crate::status::{FEATURE_SECTION, MOUNT_SECTION};

pub const PERFORMANCE_SECTION: &str = "Performance Metrics";
pub const ENVIRONMENT_SECTION: &str = "Test Environment Details";
pub const TEST_CASES_SECTION: &str = "Test Cases Executed";

/// Structural expectations for a client report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaRules {
    /// Absence of any of these fails the report.
    pub required_sections: Vec<String>,
    pub required_mount_options: Vec<String>,
    pub required_features: Vec<String>,
    pub hardware_marker: String,
}

impl Default for SchemaRules {
    fn default() -> Self {
        Self {
            required_sections: strings(&[
                "Compatibility Summary",
                MOUNT_SECTION,
                FEATURE_SECTION,
                ENVIRONMENT_SECTION,
                TEST_CASES_SECTION,
            ]),
            required_mount_options: strings(&["Default (no options)", "-o ro", "-o rw"]),
            required_features: strings(&[
                "Basic Read",
                "Basic Write",
                "File Creation",
                "File Deletion",
                "Directory Creation",
                "Directory Listing",
                "Large Files (>2GB)",
                "Unicode Filenames",
            ]),
            hardware_marker: "Client Hardware:".into(),
        }
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvisoryKind {
    MountTableMissing,
    MountOptionsMissing,
    FeatureTableMissing,
    FeaturesMissing,
    PerformanceTableMissing,
    HardwareDetailsMissing,
    ChecklistMissing,
}

/// A finding that is reported but never fails validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdvisoryWarning {
    pub kind: AdvisoryKind,
    pub message: String,
}

impl AdvisoryWarning {
    fn new(kind: AdvisoryKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SchemaReport {
    pub missing_sections: Vec<String>,
    pub advisories: Vec<AdvisoryWarning>,
}

impl SchemaReport {
    /// Only missing required sections fail a report.
    pub fn passed(&self) -> bool {
        self.missing_sections.is_empty()
    }
}

/// Checks a parsed report. Missing required sections stop the check early;
/// everything after that is advisory.
pub fn validate_document(doc: &ParsedDocument, rules: &SchemaRules) -> SchemaReport {
    let missing_sections: Vec<String> = rules
        .required_sections
        .iter()
        .filter(|section| !doc.has_section(section))
        .cloned()
        .collect();
    if !missing_sections.is_empty() {
        return SchemaReport { missing_sections, advisories: Vec::new() };
    }

    let mut advisories = Vec::new();
    check_table_rows(
        doc,
        MOUNT_SECTION,
        &rules.required_mount_options,
        (
            AdvisoryKind::MountTableMissing,
            "mount operations table not found or not properly formatted",
        ),
        (AdvisoryKind::MountOptionsMissing, "missing documentation for mount options"),
        &mut advisories,
    );
    check_table_rows(
        doc,
        FEATURE_SECTION,
        &rules.required_features,
        (
            AdvisoryKind::FeatureTableMissing,
            "feature compatibility table not found or not properly formatted",
        ),
        (AdvisoryKind::FeaturesMissing, "missing documentation for features"),
        &mut advisories,
    );

    if doc.section_table(PERFORMANCE_SECTION).is_none() {
        advisories.push(AdvisoryWarning::new(
            AdvisoryKind::PerformanceTableMissing,
            "performance metrics table not found or not properly formatted",
        ));
    }

    let has_hardware = doc
        .section(ENVIRONMENT_SECTION)
        .is_some_and(|section| section.contains(&rules.hardware_marker));
    if !has_hardware {
        advisories.push(AdvisoryWarning::new(
            AdvisoryKind::HardwareDetailsMissing,
            "test environment details section appears incomplete",
        ));
    }

    let has_checklist =
        doc.section(TEST_CASES_SECTION).is_some_and(|section| section.has_checklist());
    if !has_checklist {
        advisories.push(AdvisoryWarning::new(
            AdvisoryKind::ChecklistMissing,
            "test cases section should include a checklist",
        ));
    }

    SchemaReport { missing_sections, advisories }
}

fn check_table_rows(
    doc: &ParsedDocument,
    section: &str,
    required: &[String],
    (missing_table, table_message): (AdvisoryKind, &str),
    (missing_rows, rows_message): (AdvisoryKind, &str),
    advisories: &mut Vec<AdvisoryWarning>,
) {
    let Some(table) = doc.section_table(section) else {
        advisories.push(AdvisoryWarning::new(missing_table, table_message));
        return;
    };
    let missing: Vec<&str> =
        required.iter().filter(|row| !table.has_cell(row)).map(String::as_str).collect();
    if !missing.is_empty() {
        let message = format!("{rows_message}: {}", missing.join(", "));
        advisories.push(AdvisoryWarning::new(missing_rows, message));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> ParsedDocument {
        ParsedDocument::parse(text).expect("parse")
    }

    #[test]
    fn missing_required_section_fails_without_advisories() {
        let doc = parse("# Client\n\n## Compatibility Summary\n\n## Mount Operations\n");
        let report = validate_document(&doc, &SchemaRules::default());
        assert!(!report.passed());
        assert_eq!(
            report.missing_sections,
            vec!["Feature Compatibility", "Test Environment Details", "Test Cases Executed"]
        );
        assert!(report.advisories.is_empty());
    }

    #[test]
    fn nested_heading_does_not_satisfy_required_section() {
        let doc = parse(
            "# Client\n## Compatibility Summary\n## Mount Operations\n\
             ## Other\n### Feature Compatibility\n\
             ## Test Environment Details\n## Test Cases Executed\n",
        );
        let report = validate_document(&doc, &SchemaRules::default());
        assert!(!report.passed());
        assert_eq!(report.missing_sections, vec!["Feature Compatibility"]);
    }

    #[test]
    fn present_sections_pass_regardless_of_missing_rows() {
        let doc = parse(
            "# Client\n## Compatibility Summary\n## Mount Operations\n\
             | Option | Status |\n|---|---|\n| -o ro | ✅ |\n\
             ## Feature Compatibility\n## Test Environment Details\n## Test Cases Executed\n",
        );
        let report = validate_document(&doc, &SchemaRules::default());
        assert!(report.passed());
        let kinds: Vec<AdvisoryKind> = report.advisories.iter().map(|a| a.kind).collect();
        assert_eq!(
            kinds,
            vec![
                AdvisoryKind::MountOptionsMissing,
                AdvisoryKind::FeatureTableMissing,
                AdvisoryKind::PerformanceTableMissing,
                AdvisoryKind::HardwareDetailsMissing,
                AdvisoryKind::ChecklistMissing,
            ]
        );
        assert_eq!(
            report.advisories[0].message,
            "missing documentation for mount options: Default (no options), -o rw"
        );
    }

    #[test]
    fn rows_must_match_a_whole_cell() {
        let doc = parse(
            "## Mount Operations\n| Option | Status |\n|---|---|\n\
             | Default | ✅ |\n| -o rwx | ✅ |\n",
        );
        let rules = SchemaRules {
            required_sections: Vec::new(),
            required_mount_options: strings(&["Default", "-o rw"]),
            ..SchemaRules::default()
        };
        let report = validate_document(&doc, &rules);
        let mount = &report.advisories[0];
        assert_eq!(mount.kind, AdvisoryKind::MountOptionsMissing);
        assert!(mount.message.ends_with(": -o rw"));
    }
}
