use compat_core::{
    audit_progress, update_matrix, validate_tree, AdvisoryKind, CanonicalStatus, CompatConfig,
    CompatError, DiscrepancyKind,
};
use test_support::{index_document, progress_document, DocsTree, ReportBuilder};

fn config() -> CompatConfig {
    CompatConfig::default()
}

#[test]
fn fully_compatible_report_matches_queue_without_discrepancies() {
    let tree = DocsTree::new();
    tree.write_report(
        "linux-5.15.md",
        &ReportBuilder::new("Linux Kernel 5.15+").rating("✅ Fully Compatible").build(),
    );
    tree.write_progress(&progress_document(&[("Linux 5.15", "✅ Complete")]));

    let run = audit_progress(&config(), tree.root()).expect("audit");
    assert_eq!(run.reports_checked, 1);
    assert!(run.is_consistent(), "unexpected: {:?}", run.discrepancies);
}

#[test]
fn in_progress_report_flags_completed_queue_entry() {
    let tree = DocsTree::new();
    let report = ReportBuilder::new("Example Client").banner("🔄 In Progress").untested();
    tree.write_report("example-client.md", &report.build());
    tree.write_progress(&progress_document(&[("Example Client", "✅")]));

    let run = audit_progress(&config(), tree.root()).expect("audit");
    assert_eq!(run.discrepancies.len(), 1);
    assert_eq!(run.discrepancies[0].kind, DiscrepancyKind::InProgressButNotReflected);
    assert_eq!(run.discrepancies[0].report_status, CanonicalStatus::TestingInProgress);
}

#[test]
fn in_progress_report_marks_untested_features_in_progress() {
    let tree = DocsTree::new();
    let report = ReportBuilder::new("Example Client")
        .banner("🔄 In Progress")
        .untested()
        .feature_status("Basic Read", "❌");
    tree.write_report("example-client.md", &report.build());
    tree.write_index(&index_document());

    let update = update_matrix(&config(), tree.root()).expect("update");
    let row = &update.rows[0];
    assert_eq!(row.statuses.get("Read Ops"), Some(CanonicalStatus::NotCompatible));
    assert_eq!(row.statuses.get("Unicode"), Some(CanonicalStatus::TestingInProgress));
    assert_eq!(row.overall(), CanonicalStatus::TestingInProgress);
    assert!(tree.read_index().contains("[🔄](./clients/example-client.md)"));
}

#[test]
fn unmatched_report_is_missing_from_queue() {
    let tree = DocsTree::new();
    tree.write_report("haiku.md", &ReportBuilder::new("Haiku R1").rating("⚠️ Mostly").build());
    tree.write_progress(&progress_document(&[("Linux 5.15", "🔄"), ("Windows 11", "⏳")]));

    let run = audit_progress(&config(), tree.root()).expect("audit");
    let kinds: Vec<DiscrepancyKind> = run.discrepancies.iter().map(|d| d.kind).collect();
    assert_eq!(kinds, vec![DiscrepancyKind::MissingFromQueue]);
}

#[test]
fn missing_performance_section_is_advisory_only() {
    let tree = DocsTree::new();
    tree.write_report(
        "freebsd.md",
        &ReportBuilder::new("FreeBSD 14").without_section("Performance Metrics").build(),
    );

    let run = validate_tree(&config(), tree.root()).expect("validate");
    assert!(run.passed());
    let schema = run.reports[0].schema.as_ref().expect("schema report");
    assert_eq!(schema.advisories.len(), 1);
    assert_eq!(schema.advisories[0].kind, AdvisoryKind::PerformanceTableMissing);
}

#[test]
fn missing_feature_section_fails_validation() {
    let tree = DocsTree::new();
    tree.write_report(
        "freebsd.md",
        &ReportBuilder::new("FreeBSD 14").without_section("Feature Compatibility").build(),
    );
    tree.write_report("ubuntu.md", &ReportBuilder::new("Ubuntu 22.04").build());

    let run = validate_tree(&config(), tree.root()).expect("validate");
    assert!(!run.passed());
    assert_eq!(run.failed(), 1);
    let failed = &run.reports[0];
    assert_eq!(
        failed.schema.as_ref().map(|s| s.missing_sections.clone()),
        Some(vec!["Feature Compatibility".to_string()])
    );
    assert!(run.reports[1].passed());
}

#[test]
fn unparseable_report_fails_validation_but_batch_continues() {
    let tree = DocsTree::new();
    let broken = ReportBuilder::new("Broken 1").metadata("key: [unclosed");
    tree.write_report("broken.md", &broken.build());
    tree.write_report("ubuntu.md", &ReportBuilder::new("Ubuntu 22.04").build());

    let run = validate_tree(&config(), tree.root()).expect("validate");
    assert_eq!(run.reports.len(), 2);
    assert!(run.reports[0].error.is_some());
    assert!(run.reports[1].passed());
}

#[test]
fn report_without_metadata_feeds_mount_column() {
    let tree = DocsTree::new();
    let report = ReportBuilder::new("FreeBSD 14")
        .without_metadata()
        .mount_status("Default (no options)", "⛔ Partial")
        .rating("⚠️ Mostly");
    tree.write_report("freebsd.md", &report.build());
    tree.write_index(&index_document());

    let update = update_matrix(&config(), tree.root()).expect("update");
    assert!(update.skipped.is_empty());
    let row = &update.rows[0];
    assert_eq!(row.statuses.get("Basic Mount"), Some(CanonicalStatus::PartiallyCompatible));
    assert_eq!(row.overall(), CanonicalStatus::MostlyCompatible);
}

#[test]
fn matrix_regeneration_is_idempotent_and_preserves_surroundings() {
    let tree = DocsTree::new();
    let ubuntu_new = ReportBuilder::new("Ubuntu 22.04").rating("✅");
    let ubuntu_old = ReportBuilder::new("Ubuntu 20.04").rating("⚠️");
    tree.write_report("ubuntu-22.04.md", &ubuntu_new.build());
    tree.write_report("ubuntu-20.04.md", &ubuntu_old.build());
    tree.write_report("debian-12.md", &ReportBuilder::new("Debian 12").untested().build());
    tree.write_report("broken.md", "no title here\n");
    tree.write_index(&index_document());

    let first = update_matrix(&config(), tree.root()).expect("first update");
    assert!(first.changed);
    assert_eq!(first.reports_found, 4);
    assert_eq!(first.skipped.len(), 1);
    let after_first = tree.read_index();

    let second = update_matrix(&config(), tree.root()).expect("second update");
    assert!(!second.changed);
    assert_eq!(tree.read_index(), after_first);

    assert!(after_first
        .starts_with("---\ntitle: Client Compatibility\n---\n# Client Compatibility\n"));
    assert!(after_first.ends_with("## Legend\n\n- ✅ Fully Compatible\n- ⏳ Not Yet Tested\n"));
    assert!(!after_first.contains("Stale Client"));

    let debian = after_first.find("| Debian | 12 |").expect("debian row");
    let ubuntu_new = after_first.find("| Ubuntu | 22.04 |").expect("ubuntu 22.04 row");
    let ubuntu_old = after_first.find("| Ubuntu | 20.04 |").expect("ubuntu 20.04 row");
    assert!(debian < ubuntu_new && ubuntu_new < ubuntu_old);
    let untested_row = "| Debian | 12 | ⏳ | ⏳ | ⏳ | ⏳ | ⏳ | ⏳ | ⏳ | ⏳ |";
    assert!(after_first.contains(untested_row));
    assert!(after_first.contains("[✅](./clients/ubuntu-22.04.md)"));
}

#[test]
fn missing_matrix_anchor_aborts_the_run() {
    let tree = DocsTree::new();
    tree.write_report("ubuntu.md", &ReportBuilder::new("Ubuntu 22.04").build());
    tree.write_index("# Index\n\nNo matrix here.\n");

    let err = update_matrix(&config(), tree.root()).expect_err("anchor missing");
    assert!(matches!(err, CompatError::AnchorNotFound { .. }));
    assert_eq!(tree.read_index(), "# Index\n\nNo matrix here.\n");
}

#[test]
fn no_reports_leaves_index_untouched() {
    let tree = DocsTree::new();
    tree.write_index("# Index\n");
    let update = update_matrix(&config(), tree.root()).expect("update");
    assert_eq!(update.reports_found, 0);
    assert!(!update.changed);
    assert_eq!(tree.read_index(), "# Index\n");
}

#[test]
fn progress_without_queue_is_an_error() {
    let tree = DocsTree::new();
    tree.write_report("ubuntu.md", &ReportBuilder::new("Ubuntu 22.04").build());
    tree.write_progress("# Testing Progress\n\n## Notes\n");

    let err = audit_progress(&config(), tree.root()).expect_err("queue missing");
    assert!(matches!(err, CompatError::QueueNotFound { .. }));
}

#[cfg(unix)]
#[test]
fn matrix_rewrite_keeps_index_permissions() {
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    let tree = DocsTree::new();
    tree.write_report("ubuntu.md", &ReportBuilder::new("Ubuntu 22.04").rating("✅").build());
    let index = tree.write_index(&index_document());
    fs::set_permissions(&index, fs::Permissions::from_mode(0o644)).expect("chmod");

    let update = update_matrix(&config(), tree.root()).expect("update");
    assert!(update.changed);
    let mode = fs::metadata(&index).expect("metadata").permissions().mode();
    assert_eq!(mode & 0o777, 0o644);
}
