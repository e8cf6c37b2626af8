//! Human-readable notification text for ranked events.
//!
//! Delivery (desktop surface, mail relay) is someone else's job; this module
//! only produces the `(title, body)` pairs handed to it.

use std::fmt::Write;

use chrono::{DateTime, FixedOffset};

use crate::model::{Event, ResolvedInstant, UrgencyTier};

pub const DEFAULT_DATE_FORMAT: &str = "%A, %B %d, %Y at %I:%M %p";

/// Shown in place of a date when the event has none.
pub const UNKNOWN_DATE: &str = "Unknown date";

/// Digest entries show at most this many characters of context by default.
pub const DEFAULT_MAX_CONTEXT_CHARS: usize = 100;

/// The parts of an event a notification is built from.
///
/// Every field is optional so partially known events can still be shown.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotificationView<'a> {
    pub original_text: Option<&'a str>,
    pub context_text: Option<&'a str>,
    pub resolved_instant: Option<&'a ResolvedInstant>,
    pub days_until: Option<i64>,
}

impl<'a> From<&'a Event> for NotificationView<'a> {
    fn from(event: &'a Event) -> Self {
        Self {
            original_text: Some(&event.original_text),
            context_text: Some(&event.context_text),
            resolved_instant: Some(&event.resolved_instant),
            days_until: Some(event.days_until),
        }
    }
}

/// Formats notifications and digests with a configurable date format.
#[derive(Debug, Clone)]
pub struct NotificationFormatter {
    date_format: String,
    max_context_chars: usize,
}

impl Default for NotificationFormatter {
    fn default() -> Self {
        Self {
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            max_context_chars: DEFAULT_MAX_CONTEXT_CHARS,
        }
    }
}

impl NotificationFormatter {
    pub fn new(date_format: impl Into<String>, max_context_chars: usize) -> Self {
        Self {
            date_format: date_format.into(),
            max_context_chars,
        }
    }

    /// `(title, body)` for one event. `subject` names the source message.
    pub fn format(&self, view: &NotificationView<'_>, subject: Option<&str>) -> (String, String) {
        let title = match view.days_until {
            Some(days) => format!("Reminder: {}", urgency_label(days)),
            None => "Reminder".to_string(),
        };

        let mut lines = Vec::with_capacity(4);
        if let Some(subject) = subject.filter(|s| !s.is_empty()) {
            lines.push(format!("From email: {subject}"));
        }
        lines.push(format!(
            "Event: {}",
            view.context_text.unwrap_or("Unknown event")
        ));
        lines.push(format!("When: {}", self.format_instant(view.resolved_instant)));
        if let Some(text) = view.original_text.filter(|t| !t.is_empty()) {
            lines.push(format!("Original: \"{text}\""));
        }

        (title, lines.join("\n"))
    }

    /// Render an instant with the configured format, appending the offset
    /// for zoned instants.
    ///
    /// An unusable format string falls back to [`DEFAULT_DATE_FORMAT`].
    pub fn format_instant(&self, instant: Option<&ResolvedInstant>) -> String {
        let Some(instant) = instant else {
            return UNKNOWN_DATE.to_string();
        };
        let local = instant.naive_local();

        let mut out = String::new();
        if write!(out, "{}", local.format(&self.date_format)).is_err() {
            tracing::warn!(format = %self.date_format, "invalid date format, using default");
            out.clear();
            let _ = write!(out, "{}", local.format(DEFAULT_DATE_FORMAT));
        }
        if let ResolvedInstant::Zoned(dt) = instant {
            let _ = write!(out, " {}", dt.offset());
        }
        out
    }

    /// One summary covering every overdue, urgent, or soon event.
    ///
    /// `None` when there is nothing pressing to report.
    pub fn digest(&self, events: &[Event], now: DateTime<FixedOffset>) -> Option<(String, String)> {
        let pressing: Vec<&Event> = events
            .iter()
            .filter(|e| e.urgency.severity() <= UrgencyTier::Soon.severity())
            .collect();
        if pressing.is_empty() {
            return None;
        }

        let subject = format!("{} important reminder(s) from your inbox", pressing.len());

        let mut body = format!(
            "Found {} important event(s) in your recent email:\n",
            pressing.len()
        );
        for (i, event) in pressing.iter().enumerate() {
            let context: String = event
                .context_text
                .chars()
                .take(self.max_context_chars)
                .collect();
            let source = if event.source_subject.is_empty() {
                "N/A"
            } else {
                &event.source_subject
            };
            let _ = write!(
                body,
                "\n{}. [{}] {}\n   Date: {}\n   Status: {} ({} days)\n   Source: {}\n",
                i + 1,
                event.urgency.as_str().to_uppercase(),
                context,
                self.format_instant(Some(&event.resolved_instant)),
                event.urgency,
                event.days_until,
                source,
            );
        }
        let _ = write!(
            body,
            "\nTotal events found: {}\nUrgent/important: {}\nScan time: {}\n",
            events.len(),
            pressing.len(),
            now.format("%Y-%m-%d %H:%M:%S"),
        );

        Some((subject, body))
    }
}

/// Coarse label used in notification titles.
pub fn urgency_label(days_until: i64) -> String {
    match days_until {
        0 => "TODAY".to_string(),
        1 => "TOMORROW".to_string(),
        -1 => "OVERDUE BY 1 DAY".to_string(),
        d if d < 0 => format!("OVERDUE BY {} DAYS", d.unsigned_abs()),
        d => format!("IN {d} DAYS"),
    }
}

/// `(title, body)` for `event` with the default formatter.
pub fn format_for_delivery(event: &Event, subject: Option<&str>) -> (String, String) {
    NotificationFormatter::default().format(&NotificationView::from(event), subject)
}

/// Digest of `events` with the default formatter.
pub fn format_digest(events: &[Event], now: DateTime<FixedOffset>) -> Option<(String, String)> {
    NotificationFormatter::default().digest(events, now)
}
