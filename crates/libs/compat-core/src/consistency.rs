use std::fmt;

use serde::Serialize;

use crate::names::find_match_index;
use crate::progress::{QueueEntry, QueueProgress};
use crate::status::{CanonicalStatus, ReportSummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiscrepancyKind {
    MissingFromQueue,
    CompletedButNotReflected,
    InProgressButNotReflected,
}

impl DiscrepancyKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MissingFromQueue => "missing-from-queue",
            Self::CompletedButNotReflected => "completed-but-not-reflected",
            Self::InProgressButNotReflected => "in-progress-but-not-reflected",
        }
    }
}

/// Disagreement between a report and the progress queue for one client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Discrepancy {
    pub kind: DiscrepancyKind,
    pub client: String,
    pub report_status: CanonicalStatus,
    pub queue_client: Option<String>,
    pub queue_progress: Option<QueueProgress>,
}

impl fmt::Display for Discrepancy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            DiscrepancyKind::MissingFromQueue => write!(
                f,
                "Client '{}' has a report but is not listed in the progress tracking",
                self.client
            ),
            DiscrepancyKind::CompletedButNotReflected => write!(
                f,
                "Client '{}' is marked as completed in report but not in progress tracking",
                self.client
            ),
            DiscrepancyKind::InProgressButNotReflected => write!(
                f,
                "Client '{}' is marked as in progress in report but not in progress tracking",
                self.client
            ),
        }
    }
}

/// Audits reports against the queue. Queue rows without a report are not
/// flagged: the queue may list future work.
pub fn check_consistency(reports: &[ReportSummary], queue: &[QueueEntry]) -> Vec<Discrepancy> {
    let queue_names: Vec<&str> = queue.iter().map(|entry| entry.client.as_str()).collect();
    reports
        .iter()
        .filter_map(|report| {
            let client = report.entity.display_name();
            let report_status = report.overall();
            let Some(idx) = find_match_index(&client, &queue_names) else {
                return Some(Discrepancy {
                    kind: DiscrepancyKind::MissingFromQueue,
                    client,
                    report_status,
                    queue_client: None,
                    queue_progress: None,
                });
            };
            let entry = &queue[idx];
            let kind = match (report_status, entry.progress) {
                (status, progress)
                    if status.is_terminal() && progress != QueueProgress::Completed =>
                {
                    DiscrepancyKind::CompletedButNotReflected
                }
                (CanonicalStatus::TestingInProgress, progress)
                    if progress != QueueProgress::InProgress =>
                {
                    DiscrepancyKind::InProgressButNotReflected
                }
                _ => return None,
            };
            Some(Discrepancy {
                kind,
                client,
                report_status,
                queue_client: Some(entry.client.clone()),
                queue_progress: Some(entry.progress),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::ParsedDocument;
    use crate::status::assess_report;

    fn report(text: &str) -> ReportSummary {
        let (doc, entity) = ParsedDocument::parse_report(text).expect("parse");
        assess_report(&doc, entity, "report.md")
    }

    fn queue(entries: &[(&str, QueueProgress)]) -> Vec<QueueEntry> {
        entries
            .iter()
            .map(|(client, progress)| QueueEntry {
                client: client.to_string(),
                progress: *progress,
            })
            .collect()
    }

    #[test]
    fn completed_report_matching_completed_queue_is_consistent() {
        let reports =
            [report("# Linux Kernel 5.15+\n\n**Overall Rating:** ✅ Fully Compatible\n")];
        let queue = queue(&[("Linux 5.15", QueueProgress::Completed)]);
        assert!(check_consistency(&reports, &queue).is_empty());
    }

    #[test]
    fn in_progress_report_against_completed_queue() {
        let reports = [report("# Example Client\n\nStatus: 🔄 In Progress\n")];
        let queue = queue(&[("Example Client", QueueProgress::Completed)]);
        let found = check_consistency(&reports, &queue);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].kind, DiscrepancyKind::InProgressButNotReflected);
        assert_eq!(found[0].queue_client.as_deref(), Some("Example Client"));
    }

    #[test]
    fn terminal_report_against_unfinished_queue() {
        let reports = [report("# FreeBSD 14\n\n**Overall Rating:** ❌ Not Compatible\n")];
        let queue = queue(&[("FreeBSD 14", QueueProgress::InProgress)]);
        let found = check_consistency(&reports, &queue);
        assert_eq!(found[0].kind, DiscrepancyKind::CompletedButNotReflected);
        assert_eq!(
            found[0].to_string(),
            "Client 'FreeBSD 14' is marked as completed in report but not in progress tracking"
        );
    }

    #[test]
    fn unmatched_report_yields_single_missing_discrepancy() {
        let reports = [report("# Haiku R1\n\n**Overall Rating:** ⚠️ Mostly Compatible\n")];
        let queue = queue(&[("Windows 11", QueueProgress::NotStarted)]);
        let found = check_consistency(&reports, &queue);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].kind, DiscrepancyKind::MissingFromQueue);
        assert_eq!(found[0].kind.as_str(), "missing-from-queue");
    }

    #[test]
    fn untested_report_and_unreported_queue_rows_are_not_flagged() {
        let reports = [report("# Solaris 11\n")];
        let queue = queue(&[
            ("Solaris 11", QueueProgress::NotStarted),
            ("Windows 11", QueueProgress::NotStarted),
        ]);
        assert!(check_consistency(&reports, &queue).is_empty());
    }
}
