//! Cross-message deduplication and ranking of events.

use std::collections::HashSet;

use chrono::{FixedOffset, NaiveDate};

use crate::model::Event;

/// Collapse events sharing `(original_text, calendar date)`, keeping the
/// first one seen. Order of the survivors is preserved.
pub fn dedup(events: Vec<Event>) -> Vec<Event> {
    let mut seen: HashSet<(String, NaiveDate)> = HashSet::with_capacity(events.len());
    events
        .into_iter()
        .filter(|event| {
            let (text, date) = event.dedup_key();
            seen.insert((text.to_string(), date))
        })
        .collect()
}

/// Stable sort by urgency severity, then by instant.
///
/// Instants are compared as absolute points in time; naive ones are taken
/// to be local to `offset`. Instants that cannot be expressed in `offset`
/// sort before all others within their tier.
pub fn rank(mut events: Vec<Event>, offset: FixedOffset) -> Vec<Event> {
    events.sort_by_cached_key(|event| {
        (
            event.urgency.severity(),
            event.resolved_instant.pinned(offset),
        )
    });
    events
}

pub fn dedup_and_rank(events: Vec<Event>, offset: FixedOffset) -> Vec<Event> {
    rank(dedup(events), offset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EntityKind, ResolvedInstant};
    use crate::urgency::classify_days;

    fn event(text: &str, day: u32, hour: u32, days_until: i64, subject: &str) -> Event {
        Event {
            original_text: text.into(),
            context_text: text.into(),
            resolved_instant: ResolvedInstant::Naive(
                NaiveDate::from_ymd_opt(2026, 10, day)
                    .unwrap()
                    .and_hms_opt(hour, 0, 0)
                    .unwrap(),
            ),
            days_until,
            urgency: classify_days(days_until),
            entity_kind: EntityKind::Date,
            source_subject: subject.into(),
            source_from: String::new(),
        }
    }

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    #[test]
    fn test_dedup_keeps_first_seen() {
        let events = vec![
            event("October 20th", 20, 0, 1, "first"),
            event("tomorrow", 20, 0, 1, "a"),
            event("October 20th", 20, 0, 1, "second"),
        ];
        let out = dedup(events);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].source_subject, "first");
        assert_eq!(out[1].original_text, "tomorrow");
    }

    #[test]
    fn test_dedup_same_text_different_date_kept() {
        let out = dedup(vec![
            event("Friday", 23, 0, 4, "a"),
            event("Friday", 16, 0, -3, "b"),
        ]);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_dedup_is_idempotent() {
        let events = vec![
            event("x", 20, 0, 1, "a"),
            event("x", 20, 9, 1, "b"),
            event("y", 21, 0, 2, "c"),
        ];
        let once = dedup(events);
        let twice = dedup(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_rank_orders_by_severity_then_instant() {
        let events = vec![
            event("upcoming", 30, 0, 11, ""),
            event("soon", 23, 0, 4, ""),
            event("tomorrow", 20, 0, 1, ""),
            event("overdue", 16, 0, -3, ""),
        ];
        let ranked: Vec<String> = rank(events, utc())
            .into_iter()
            .map(|e| e.original_text)
            .collect();
        assert_eq!(ranked, vec!["overdue", "tomorrow", "soon", "upcoming"]);
    }

    #[test]
    fn test_rank_is_stable_for_equal_keys() {
        let events = vec![
            event("a", 22, 10, 3, "first"),
            event("b", 22, 10, 3, "second"),
        ];
        let ranked = rank(events, utc());
        assert_eq!(ranked[0].source_subject, "first");
        assert_eq!(ranked[1].source_subject, "second");
    }

    #[test]
    fn test_rank_output_sorted() {
        let events = vec![
            event("a", 28, 0, 9, ""),
            event("b", 19, 15, 0, ""),
            event("c", 12, 0, -7, ""),
            event("d", 25, 0, 6, ""),
            event("e", 19, 8, 0, ""),
        ];
        let ranked = dedup_and_rank(events, utc());
        let keys: Vec<_> = ranked
            .iter()
            .map(|e| (e.urgency.severity(), e.resolved_instant.pinned(utc())))
            .collect();
        assert!(keys.windows(2).all(|w| w[0] <= w[1]));
    }
}
