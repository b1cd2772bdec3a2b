pub mod config;
pub mod consistency;
pub mod discovery;
pub mod document;
pub mod error;
pub mod matrix;
pub mod names;
pub mod pipeline;
pub mod progress;
pub mod schema;
pub mod status;

pub use config::{CompatConfig, DocPaths};
pub use consistency::{check_consistency, Discrepancy, DiscrepancyKind};
pub use discovery::{discover_reports, write_atomic};
pub use document::{Entity, ParsedDocument, Section, Table};
pub use error::{CompatError, ParseError};
pub use matrix::{
    order_rows, render_matrix, splice_matrix, Lexicographic, MatrixRow, Natural, VersionOrder,
    VersionOrdering,
};
pub use names::{find_match, find_match_index, names_match, normalize_name, CanonicalName};
pub use pipeline::{
    audit_progress, load_report, update_matrix, validate_reports, validate_tree, ConsistencyRun,
    MatrixUpdate, ReportValidation, ValidationRun,
};
pub use progress::{parse_queue, QueueEntry, QueueProgress};
pub use schema::{validate_document, AdvisoryKind, AdvisoryWarning, SchemaReport, SchemaRules};
pub use status::{assess_report, resolve, CanonicalStatus, FeatureStatus, ReportSummary};
