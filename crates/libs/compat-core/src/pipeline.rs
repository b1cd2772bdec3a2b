//! Batch runs over a docs tree: validate every report, regenerate the matrix,
//! audit the progress queue.
//!
//! Each report is parsed independently; a report that fails to parse is logged
//! and skipped, while errors on the shared summary documents abort the run.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::CompatConfig;
use crate::consistency::{check_consistency, Discrepancy};
use crate::discovery::{discover_reports, read_document, write_atomic};
use crate::document::{Entity, ParsedDocument};
use crate::error::{CompatError, Result};
use crate::matrix::{order_rows, render_matrix, splice_matrix, MatrixRow, MATRIX_HEADING};
use crate::progress::parse_queue;
use crate::schema::{validate_document, SchemaReport, SchemaRules};
use crate::status::{assess_report, ReportSummary};

#[derive(Debug, Clone)]
pub struct LoadedReport {
    pub path: PathBuf,
    pub doc: ParsedDocument,
    pub entity: Entity,
}

impl LoadedReport {
    pub fn file_name(&self) -> String {
        file_name(&self.path)
    }

    pub fn summarize(&self) -> ReportSummary {
        assess_report(&self.doc, self.entity.clone(), &self.file_name())
    }
}

fn file_name(path: &Path) -> String {
    path.file_name().map(|name| name.to_string_lossy().into_owned()).unwrap_or_default()
}

pub fn load_report(path: &Path) -> Result<LoadedReport> {
    let text = read_document(path)?;
    let (doc, entity) = ParsedDocument::parse_report(&text)
        .map_err(|source| CompatError::Parse { path: path.to_path_buf(), source })?;
    Ok(LoadedReport { path: path.to_path_buf(), doc, entity })
}

/// Loads every report, skipping (and returning) the ones that fail to parse.
fn load_reports(paths: &[PathBuf]) -> Result<(Vec<LoadedReport>, Vec<PathBuf>)> {
    let mut loaded = Vec::with_capacity(paths.len());
    let mut skipped = Vec::new();
    for path in paths {
        match load_report(path) {
            Ok(report) => loaded.push(report),
            Err(err) if err.is_per_document() => {
                log::error!("skipping report: {err}");
                skipped.push(path.clone());
            }
            Err(err) => return Err(err),
        }
    }
    Ok((loaded, skipped))
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportValidation {
    pub path: PathBuf,
    /// Set when the report could not be read or parsed.
    pub error: Option<String>,
    pub schema: Option<SchemaReport>,
}

impl ReportValidation {
    pub fn passed(&self) -> bool {
        self.error.is_none() && self.schema.as_ref().is_some_and(SchemaReport::passed)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationRun {
    pub reports: Vec<ReportValidation>,
}

impl ValidationRun {
    pub fn passed(&self) -> bool {
        self.reports.iter().all(ReportValidation::passed)
    }

    pub fn failed(&self) -> usize {
        self.reports.iter().filter(|report| !report.passed()).count()
    }
}

pub fn validate_report(path: &Path, rules: &SchemaRules) -> ReportValidation {
    log::info!("validating {}", path.display());
    let loaded = match load_report(path) {
        Ok(loaded) => loaded,
        Err(err) => {
            log::error!("{err}");
            return ReportValidation {
                path: path.to_path_buf(),
                error: Some(err.to_string()),
                schema: None,
            };
        }
    };

    let schema = validate_document(&loaded.doc, rules);
    if !schema.passed() {
        let err = CompatError::Schema {
            path: path.to_path_buf(),
            missing: schema.missing_sections.clone(),
        };
        log::error!("{err}");
    }
    for advisory in &schema.advisories {
        log::warn!("{}: {}", path.display(), advisory.message);
    }
    ReportValidation { path: path.to_path_buf(), error: None, schema: Some(schema) }
}

pub fn validate_reports(paths: &[PathBuf], rules: &SchemaRules) -> ValidationRun {
    ValidationRun { reports: paths.iter().map(|path| validate_report(path, rules)).collect() }
}

/// Validates every report found under the configured directory.
pub fn validate_tree(config: &CompatConfig, root: &Path) -> Result<ValidationRun> {
    let paths = config.paths(root);
    let reports = discover_reports(&paths.reports_dir, &config.reports_glob)?;
    Ok(validate_reports(&reports, &config.schema))
}

#[derive(Debug, Clone, Serialize)]
pub struct MatrixUpdate {
    pub index_path: PathBuf,
    pub reports_found: usize,
    pub rows: Vec<MatrixRow>,
    pub skipped: Vec<PathBuf>,
    pub changed: bool,
}

/// Regenerates the matrix block of the index document in place.
///
/// With no reports the index is left alone. The index is only rewritten when
/// the spliced content differs, and always as a whole-file replacement.
pub fn update_matrix(config: &CompatConfig, root: &Path) -> Result<MatrixUpdate> {
    let paths = config.paths(root);
    let report_paths = discover_reports(&paths.reports_dir, &config.reports_glob)?;
    let mut update = MatrixUpdate {
        index_path: paths.index_path.clone(),
        reports_found: report_paths.len(),
        rows: Vec::new(),
        skipped: Vec::new(),
        changed: false,
    };
    if report_paths.is_empty() {
        log::info!("no client reports under {}", paths.reports_dir.display());
        return Ok(update);
    }

    let (loaded, skipped) = load_reports(&report_paths)?;
    let rows = loaded.iter().map(|report| MatrixRow::from(&report.summarize())).collect();
    let rows = order_rows(rows, &config.version_order);
    let block = render_matrix(&rows);

    let current = read_document(&paths.index_path)?;
    let updated = splice_matrix(&current, &block).ok_or_else(|| CompatError::AnchorNotFound {
        path: paths.index_path.clone(),
        anchor: MATRIX_HEADING.to_string(),
    })?;
    if updated != current {
        write_atomic(&paths.index_path, &updated)?;
        update.changed = true;
        log::info!("rewrote {}", paths.index_path.display());
    } else {
        log::debug!("{} already up to date", paths.index_path.display());
    }

    update.rows = rows;
    update.skipped = skipped;
    Ok(update)
}

#[derive(Debug, Clone, Serialize)]
pub struct ConsistencyRun {
    pub reports_checked: usize,
    pub queue_entries: usize,
    pub skipped: Vec<PathBuf>,
    pub discrepancies: Vec<Discrepancy>,
}

impl ConsistencyRun {
    pub fn is_consistent(&self) -> bool {
        self.discrepancies.is_empty()
    }
}

/// Compares report-derived status with the progress queue. Every finding is
/// collected; nothing here stops at the first discrepancy.
pub fn audit_progress(config: &CompatConfig, root: &Path) -> Result<ConsistencyRun> {
    let paths = config.paths(root);
    let report_paths = discover_reports(&paths.reports_dir, &config.reports_glob)?;
    let (loaded, skipped) = load_reports(&report_paths)?;
    let summaries: Vec<ReportSummary> = loaded.iter().map(LoadedReport::summarize).collect();

    let progress_text = read_document(&paths.progress_path)?;
    let progress = ParsedDocument::parse(&progress_text)
        .map_err(|source| CompatError::Parse { path: paths.progress_path.clone(), source })?;
    let queue = parse_queue(&progress)
        .ok_or_else(|| CompatError::QueueNotFound { path: paths.progress_path.clone() })?;

    let discrepancies = check_consistency(&summaries, &queue);
    for discrepancy in &discrepancies {
        log::warn!("{discrepancy}");
    }
    Ok(ConsistencyRun {
        reports_checked: summaries.len(),
        queue_entries: queue.len(),
        skipped,
        discrepancies,
    })
}
