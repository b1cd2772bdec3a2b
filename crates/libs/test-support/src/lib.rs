//! Fixture documents and scratch docs trees shared by the workspace tests.

pub mod fixtures;
pub mod tree;

pub use fixtures::{index_document, progress_document, ReportBuilder};
pub use tree::DocsTree;
