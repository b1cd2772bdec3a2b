use clap::Parser;
use compat_cli::{execute, parse_exit_code, run, Cli, Command};
use test_support::{index_document, progress_document, DocsTree, ReportBuilder};

fn cli_for(tree: &DocsTree, args: &[&str]) -> Cli {
    let root = tree.root().to_str().expect("utf-8 temp path").to_string();
    let mut argv = vec!["compat".to_string(), "--root".to_string(), root];
    argv.extend(args.iter().map(|arg| arg.to_string()));
    Cli::try_parse_from(argv).expect("parse args")
}

#[test]
fn parses_subcommands_and_global_flags() {
    let cli = Cli::try_parse_from(["compat", "--json", "-vv", "check-consistency"]).expect("parse");
    assert_eq!(cli.command, Command::CheckConsistency);
    assert!(cli.json);
    assert_eq!(cli.verbose, 2);
    assert_eq!(cli.root.to_str(), Some("."));

    let cli = Cli::try_parse_from(["compat", "update-matrix", "--config", "alt.toml"]);
    assert!(cli.is_err(), "global flags go before the subcommand");

    let cli = Cli::try_parse_from(["compat", "--config", "alt.toml", "update-matrix"])
        .expect("parse");
    assert_eq!(cli.config.as_deref().and_then(|p| p.to_str()), Some("alt.toml"));
}

#[test]
fn rejects_unknown_subcommand() {
    let err = Cli::try_parse_from(["compat", "render"]).expect_err("unknown subcommand");
    assert_eq!(parse_exit_code(&err), 1);
}

#[test]
fn help_is_not_a_failure() {
    let err = Cli::try_parse_from(["compat", "--help"]).expect_err("help short-circuits");
    assert_eq!(parse_exit_code(&err), 0);
}

#[test]
fn validate_reports_success_and_warnings() {
    let tree = DocsTree::new();
    tree.write_report(
        "freebsd.md",
        &ReportBuilder::new("FreeBSD 14").without_feature("Unicode Filenames").build(),
    );

    let outcome = run(&cli_for(&tree, &["validate"])).expect("run");
    assert!(outcome.success);
    assert!(outcome.lines[0].starts_with("Validating "));
    assert_eq!(
        outcome.lines[1],
        "  WARNING: missing documentation for features: Unicode Filenames"
    );
    assert_eq!(
        outcome.lines.last().map(String::as_str),
        Some("All client reports passed validation!")
    );
}

#[test]
fn validate_fails_on_missing_section() {
    let tree = DocsTree::new();
    tree.write_report(
        "freebsd.md",
        &ReportBuilder::new("FreeBSD 14").without_section("Test Cases Executed").build(),
    );

    let cli = cli_for(&tree, &["validate"]);
    let outcome = run(&cli).expect("run");
    assert!(!outcome.success);
    assert!(outcome
        .lines
        .contains(&"  ERROR: Missing required sections: Test Cases Executed".to_string()));
    assert_eq!(execute(&cli), 1);
}

#[test]
fn validate_with_no_reports_succeeds() {
    let tree = DocsTree::new();
    let outcome = run(&cli_for(&tree, &["validate"])).expect("run");
    assert!(outcome.success);
    assert_eq!(outcome.lines, vec!["No client reports found to validate.".to_string()]);
}

#[test]
fn update_matrix_rewrites_index_once() {
    let tree = DocsTree::new();
    tree.write_report("ubuntu.md", &ReportBuilder::new("Ubuntu 22.04").rating("✅ Fully").build());
    tree.write_index(&index_document());

    let cli = cli_for(&tree, &["update-matrix"]);
    let first = run(&cli).expect("first run");
    assert_eq!(
        first.lines,
        vec!["Updated compatibility matrix with 1 client reports.".to_string()]
    );
    let second = run(&cli).expect("second run");
    assert_eq!(
        second.lines,
        vec!["Updated compatibility matrix with 1 client reports. (already up to date)".to_string()]
    );
    assert!(tree.read_index().contains("| Ubuntu | 22.04 | ✅ |"));
}

#[test]
fn update_matrix_without_anchor_exits_nonzero() {
    let tree = DocsTree::new();
    tree.write_report("ubuntu.md", &ReportBuilder::new("Ubuntu 22.04").build());
    tree.write_index("# Index\n");

    let cli = cli_for(&tree, &["update-matrix"]);
    let err = run(&cli).expect_err("anchor missing");
    assert!(err.to_string().contains("## Compatibility Matrix"));
    assert_eq!(execute(&cli), 1);
}

#[test]
fn check_consistency_lists_every_discrepancy() {
    let tree = DocsTree::new();
    tree.write_report("haiku.md", &ReportBuilder::new("Haiku R1").rating("⚠️").build());
    tree.write_report(
        "linux.md",
        &ReportBuilder::new("Linux Kernel 6.1+").banner("Status: 🔄 In Progress").build(),
    );
    tree.write_progress(&progress_document(&[("Linux 6.1", "⏳ Not Started")]));

    let outcome = run(&cli_for(&tree, &["check-consistency"])).expect("run");
    assert!(!outcome.success);
    assert_eq!(
        outcome.lines,
        vec![
            "Found inconsistencies between client reports and progress tracking:".to_string(),
            "  - Client 'Haiku R1' has a report but is not listed in the progress tracking"
                .to_string(),
            "  - Client 'Linux Kernel 6.1+' is marked as in progress in report \
             but not in progress tracking"
                .to_string(),
        ]
    );
    assert_eq!(outcome.json["discrepancies"][0]["kind"], "missing-from-queue");
}

#[test]
fn check_consistency_passes_when_queue_agrees() {
    let tree = DocsTree::new();
    tree.write_report("linux.md", &ReportBuilder::new("Linux Kernel 5.15+").rating("✅").build());
    tree.write_progress(&progress_document(&[("Linux 5.15", "✅ Done")]));

    let cli = cli_for(&tree, &["check-consistency"]);
    assert_eq!(execute(&cli), 0);
}

#[test]
fn config_file_in_root_is_picked_up() {
    let tree = DocsTree::new();
    tree.write("compat.toml", "reports_dir = \"reports\"\nindex_path = \"site/index.md\"\n");
    tree.write("reports/ubuntu.md", &ReportBuilder::new("Ubuntu 22.04").rating("✅").build());
    tree.write("site/index.md", &index_document());

    let outcome = run(&cli_for(&tree, &["update-matrix"])).expect("run");
    assert!(outcome.success);
    assert!(tree.read("site/index.md").contains("[✅](./clients/ubuntu.md)"));
}

#[test]
fn example_config_round_trips() {
    let cli = Cli::try_parse_from(["compat", "example-config"]).expect("parse");
    let outcome = run(&cli).expect("run");
    assert!(outcome.success);
    assert!(outcome.lines.iter().any(|line| line.starts_with("reports_dir = ")));
}
