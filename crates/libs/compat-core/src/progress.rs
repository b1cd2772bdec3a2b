use serde::Serialize;

use crate::document::{ParsedDocument, Table};
use crate::status::{resolve_marker, CanonicalStatus};

pub const QUEUE_SECTION: &str = "Client Testing Queue";

/// Testing progress as recorded by one queue row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueProgress {
    NotStarted,
    InProgress,
    Completed,
}

impl QueueProgress {
    /// Only the 🔄 and ✅ glyphs move a row out of `NotStarted`.
    pub fn from_cell(cell: &str) -> Self {
        match resolve_marker(cell) {
            Some(CanonicalStatus::TestingInProgress) => Self::InProgress,
            Some(CanonicalStatus::FullyCompatible) => Self::Completed,
            _ => Self::NotStarted,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueueEntry {
    pub client: String,
    pub progress: QueueProgress,
}

/// Reads the client queue table in declaration order.
///
/// Returns `None` when the queue section or a table with a `Client` column is
/// missing.
pub fn parse_queue(doc: &ParsedDocument) -> Option<Vec<QueueEntry>> {
    let section = doc.section(QUEUE_SECTION)?;
    let table = section.tables().into_iter().find(|table| table.column("Client").is_some())?;
    Some(queue_entries(&table))
}

fn queue_entries(table: &Table) -> Vec<QueueEntry> {
    let client_col = table.column("Client").unwrap_or(1);
    let status_col = table.column("Status").unwrap_or(3);
    table
        .rows
        .iter()
        .filter_map(|row| {
            let client = row.get(client_col)?.trim();
            if client.is_empty() {
                return None;
            }
            let status = row.get(status_col).map(String::as_str).unwrap_or("");
            Some(QueueEntry {
                client: client.to_string(),
                progress: QueueProgress::from_cell(status),
            })
        })
        .collect()
}
