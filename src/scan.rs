//! Mailbox scanning: search, fetch, and run the pipeline over the results.

use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use tracing::{info, warn};

use crate::diagnostic::{Diagnostic, DiagnosticSink};
use crate::error::Result;
use crate::mailbox::{Mailbox, MailboxQuery};
use crate::model::Event;
use crate::parser::decode_message_observed;
use crate::pipeline::Pipeline;
use crate::rank::dedup_and_rank;

/// Outcome of one scan.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanReport {
    /// Messages fetched and run through the pipeline.
    pub processed: usize,
    /// Messages the search returned but the mailbox could not produce.
    pub failed_fetches: usize,
    /// Events found before deduplication.
    pub found: usize,
    /// Ranked, deduplicated events.
    pub events: Vec<Event>,
    /// Failures recovered from along the way.
    pub diagnostics: usize,
}

/// Counts diagnostics and forwards them to an optional inner sink.
struct CountingSink<'a> {
    inner: Option<&'a mut dyn DiagnosticSink>,
    count: usize,
}

impl DiagnosticSink for CountingSink<'_> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.count += 1;
        match self.inner.as_deref_mut() {
            Some(inner) => inner.report(diagnostic),
            None => tracing::debug!(%diagnostic, "pipeline diagnostic"),
        }
    }
}

/// Scan every message of `mailbox` matching `query`.
pub fn run_scan(
    mailbox: &dyn Mailbox,
    query: &MailboxQuery,
    pipeline: &Pipeline,
    now: DateTime<FixedOffset>,
) -> Result<ScanReport> {
    run_scan_observed(mailbox, query, pipeline, now, None, &mut |_, _| {})
}

/// [`run_scan`] with a diagnostic sink and a `(done, total)` progress callback.
///
/// Only the search itself can fail; a message that cannot be fetched is
/// counted and skipped.
pub fn run_scan_observed(
    mailbox: &dyn Mailbox,
    query: &MailboxQuery,
    pipeline: &Pipeline,
    now: DateTime<FixedOffset>,
    sink: Option<&mut dyn DiagnosticSink>,
    progress: &mut dyn FnMut(usize, usize),
) -> Result<ScanReport> {
    let ids = mailbox.search(query)?;
    let total = ids.len();
    info!(matched = total, "Scanning messages");

    let mut sink = CountingSink {
        inner: sink,
        count: 0,
    };
    let mut report = ScanReport::default();
    let mut events = Vec::new();

    for (i, id) in ids.iter().enumerate() {
        match mailbox.fetch(id) {
            Ok(Some(raw)) => {
                let message = decode_message_observed(&raw, &mut sink);
                events.extend(pipeline.events_for_message(&message, now, &mut sink));
                report.processed += 1;
            }
            Ok(None) => {
                warn!(%id, "Message vanished from mailbox");
                report.failed_fetches += 1;
            }
            Err(e) => {
                warn!(%id, error = %e, "Failed to fetch message");
                report.failed_fetches += 1;
            }
        }
        progress(i + 1, total);
    }

    report.found = events.len();
    report.events = dedup_and_rank(events, *now.offset());
    report.diagnostics = sink.count;
    info!(
        processed = report.processed,
        found = report.found,
        kept = report.events.len(),
        "Scan complete"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RemindError;
    use crate::mailbox::{MessageHeaders, MessageId};
    use chrono::TimeZone;

    /// In-memory mailbox; `None` bodies fail to fetch with an I/O error.
    struct Memory(Vec<Option<&'static [u8]>>);

    impl Mailbox for Memory {
        fn search(&self, query: &MailboxQuery) -> Result<Vec<MessageId>> {
            Ok(self
                .0
                .iter()
                .enumerate()
                .filter(|(_, body)| body.map_or(true, |b| query.matches(&MessageHeaders::from_raw(b))))
                .map(|(i, _)| MessageId::new(i.to_string()))
                .collect())
        }

        fn fetch(&self, id: &MessageId) -> Result<Option<Vec<u8>>> {
            let Ok(i) = id.as_str().parse::<usize>() else {
                return Ok(None);
            };
            match self.0.get(i) {
                Some(Some(body)) => Ok(Some(body.to_vec())),
                Some(None) => Err(RemindError::io(
                    id.as_str(),
                    std::io::Error::new(std::io::ErrorKind::PermissionDenied, "unreadable"),
                )),
                None => Ok(None),
            }
        }
    }

    fn raw(text: &'static str) -> Option<&'static [u8]> {
        Some(text.as_bytes())
    }

    fn now() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2026, 10, 19, 9, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_scan_counts_and_dedups() {
        let mailbox = Memory(vec![
            raw("Subject: Launch\n\nLaunch on October 20th.\n"),
            raw("Subject: Launch again\n\nStill October 20th, retro next Friday.\n"),
            None,
        ]);
        let mut progress = Vec::new();
        let report = run_scan_observed(
            &mailbox,
            &MailboxQuery::default(),
            &Pipeline::default(),
            now(),
            None,
            &mut |done, total| progress.push((done, total)),
        )
        .unwrap();

        assert_eq!(report.processed, 2);
        assert_eq!(report.failed_fetches, 1);
        assert_eq!(report.found, 3);
        assert_eq!(report.events.len(), 2);
        assert_eq!(report.events[0].source_subject, "Launch");
        assert_eq!(progress.last(), Some(&(3, 3)));
    }

    #[test]
    fn test_scan_applies_query() {
        let mailbox = Memory(vec![
            raw("Subject: Newsletter\n\nSale ends tomorrow!\n"),
            raw("Subject: Invoice\n\nPay by Friday.\n"),
        ]);
        let query = MailboxQuery::parse("-subject:newsletter");
        let report = run_scan(&mailbox, &query, &Pipeline::default(), now()).unwrap();
        assert_eq!(report.processed, 1);
        assert_eq!(report.events.len(), 1);
        assert_eq!(report.events[0].original_text, "Friday");
    }

    #[test]
    fn test_diagnostics_are_counted_and_forwarded() {
        let mailbox = Memory(vec![raw("Subject: Odd\n\nMeet at 25:00 please.\n")]);
        let mut collected: Vec<Diagnostic> = Vec::new();
        let report = run_scan_observed(
            &mailbox,
            &MailboxQuery::default(),
            &Pipeline::default(),
            now(),
            Some(&mut collected),
            &mut |_, _| {},
        )
        .unwrap();
        assert!(report.events.is_empty());
        assert_eq!(report.diagnostics, 1);
        assert_eq!(
            collected,
            vec![Diagnostic::ResolutionFailure {
                text: "25:00".into()
            }]
        );
    }
}
