use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use compat_core::{
    audit_progress, update_matrix, validate_tree, CompatConfig, ConsistencyRun, MatrixUpdate,
    ValidationRun,
};
use serde::Serialize;
use serde_json::Value as JsonValue;

#[derive(Parser, Debug)]
#[command(name = "compat", about = "Client compatibility report tooling", version)]
pub struct Cli {
    /// Root of the docs tree; config paths are resolved against it.
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Config file; defaults to `<root>/compat.toml` when present.
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[arg(long)]
    pub json: bool,

    #[arg(short = 'v', long, action = ArgAction::Count)]
    pub verbose: u8,

    #[arg(short = 'q', long)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Check every client report against the required structure.
    Validate,
    /// Regenerate the compatibility matrix in the index document.
    UpdateMatrix,
    /// Compare client reports with the progress queue.
    CheckConsistency,
    /// Print the default config as TOML.
    ExampleConfig,
}

impl Command {
    fn failure_prefix(self) -> &'static str {
        match self {
            Self::Validate => "Error validating client reports",
            Self::UpdateMatrix => "Error updating compatibility matrix",
            Self::CheckConsistency => "Error checking progress consistency",
            Self::ExampleConfig => "Error rendering example config",
        }
    }
}

/// What a command produced: a pass/fail verdict plus both renderings.
#[derive(Debug, Clone)]
pub struct Outcome {
    pub success: bool,
    pub lines: Vec<String>,
    pub json: JsonValue,
}

impl Outcome {
    fn new<T: Serialize>(success: bool, lines: Vec<String>, payload: &T) -> Result<Self> {
        let json = serde_json::to_value(payload).context("failed to serialize run result")?;
        Ok(Self { success, lines, json })
    }
}

/// Exit code for an argument error; `--help` and `--version` are not failures.
pub fn parse_exit_code(err: &clap::Error) -> u8 {
    if err.use_stderr() {
        1
    } else {
        0
    }
}

pub fn init_logging(cli: &Cli) {
    let default_filter = match (cli.quiet, cli.verbose) {
        (true, _) => "off",
        (false, 0) => "warn",
        (false, 1) => "info",
        _ => "debug",
    };
    let env = env_logger::Env::default().default_filter_or(default_filter);
    let _ = env_logger::Builder::from_env(env).format_timestamp(None).try_init();
}

pub fn load_config(cli: &Cli) -> Result<CompatConfig> {
    CompatConfig::discover(&cli.root, cli.config.as_deref()).context("failed to load config")
}

pub fn run(cli: &Cli) -> Result<Outcome> {
    match cli.command {
        Command::ExampleConfig => {
            let template = CompatConfig::example_toml();
            let lines = template.lines().map(str::to_string).collect();
            Ok(Outcome { success: true, lines, json: JsonValue::String(template) })
        }
        Command::Validate => {
            let config = load_config(cli)?;
            let run = validate_tree(&config, &cli.root)?;
            Outcome::new(run.passed(), validation_lines(&run), &run)
        }
        Command::UpdateMatrix => {
            let config = load_config(cli)?;
            let update = update_matrix(&config, &cli.root)?;
            Outcome::new(true, matrix_lines(&update, &cli.root), &update)
        }
        Command::CheckConsistency => {
            let config = load_config(cli)?;
            let run = audit_progress(&config, &cli.root)?;
            Outcome::new(run.is_consistent(), consistency_lines(&run), &run)
        }
    }
}

/// Runs the command and reports it; the returned value is the process exit code.
pub fn execute(cli: &Cli) -> u8 {
    match run(cli) {
        Ok(outcome) => {
            emit(cli, &outcome);
            if outcome.success {
                0
            } else {
                1
            }
        }
        Err(err) => {
            log::error!("{err:#}");
            println!("{}: {err:#}", cli.command.failure_prefix());
            1
        }
    }
}

pub fn emit(cli: &Cli, outcome: &Outcome) {
    if cli.json {
        match serde_json::to_string_pretty(&outcome.json) {
            Ok(text) => println!("{text}"),
            Err(err) => eprintln!("failed to render json output: {err}"),
        }
        return;
    }
    if cli.quiet && outcome.success {
        return;
    }
    for line in &outcome.lines {
        println!("{line}");
    }
}

fn display_path(path: &Path, root: &Path) -> String {
    path.strip_prefix(root).unwrap_or(path).display().to_string()
}

pub fn validation_lines(run: &ValidationRun) -> Vec<String> {
    if run.reports.is_empty() {
        return vec!["No client reports found to validate.".to_string()];
    }
    let mut lines = Vec::new();
    for report in &run.reports {
        lines.push(format!("Validating {}...", report.path.display()));
        if let Some(error) = &report.error {
            lines.push(format!("  ERROR: {error}"));
            continue;
        }
        let Some(schema) = &report.schema else {
            continue;
        };
        if !schema.passed() {
            lines.push(format!(
                "  ERROR: Missing required sections: {}",
                schema.missing_sections.join(", ")
            ));
            continue;
        }
        for advisory in &schema.advisories {
            lines.push(format!("  WARNING: {}", advisory.message));
        }
        lines.push("  Validation complete.".to_string());
    }
    lines.push(String::new());
    if run.passed() {
        lines.push("All client reports passed validation!".to_string());
    } else {
        lines.push(
            "Some client reports have validation errors. Please fix them before committing."
                .to_string(),
        );
    }
    lines
}

pub fn matrix_lines(update: &MatrixUpdate, root: &Path) -> Vec<String> {
    if update.reports_found == 0 {
        return vec!["No client reports found.".to_string()];
    }
    let mut lines: Vec<String> = update
        .skipped
        .iter()
        .map(|path| format!("Skipped unparseable report {}", display_path(path, root)))
        .collect();
    let state = if update.changed { "" } else { " (already up to date)" };
    lines.push(format!(
        "Updated compatibility matrix with {} client reports.{state}",
        update.rows.len()
    ));
    lines
}

pub fn consistency_lines(run: &ConsistencyRun) -> Vec<String> {
    if run.is_consistent() {
        return vec![
            "No inconsistencies found between client reports and progress tracking.".to_string()
        ];
    }
    let mut lines =
        vec!["Found inconsistencies between client reports and progress tracking:".to_string()];
    lines.extend(run.discrepancies.iter().map(|issue| format!("  - {issue}")));
    lines
}
