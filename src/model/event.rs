//! Candidate mentions and the events assembled from them.

use std::fmt;
use std::ops::Range;

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime};
use serde::Serialize;

/// The kind of temporal entity a recognizer tagged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntityKind {
    Date,
    Time,
    Event,
}

impl EntityKind {
    /// Map a recognizer label to a kind. Non-temporal labels yield `None`.
    pub fn from_label(label: &str) -> Option<Self> {
        if label.eq_ignore_ascii_case("DATE") {
            Some(Self::Date)
        } else if label.eq_ignore_ascii_case("TIME") {
            Some(Self::Time)
        } else if label.eq_ignore_ascii_case("EVENT") {
            Some(Self::Event)
        } else {
            None
        }
    }

    pub fn as_label(self) -> &'static str {
        match self {
            Self::Date => "DATE",
            Self::Time => "TIME",
            Self::Event => "EVENT",
        }
    }
}

/// A temporal span found in a message, before date resolution.
///
/// Produced by the extractor and consumed by the resolver; never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateMention {
    /// The tagged text, verbatim.
    pub entity_text: String,
    pub entity_kind: EntityKind,
    /// Surrounding tokens, clipped to the document.
    pub context_window: String,
    /// Byte range of `entity_text` within the analysed text.
    pub source_span: Range<usize>,
}

/// A resolved calendar point. Zone-aware only when the mention named a zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ResolvedInstant {
    Naive(NaiveDateTime),
    Zoned(DateTime<FixedOffset>),
}

impl ResolvedInstant {
    /// Wall-clock date and time as written, ignoring any zone.
    pub fn naive_local(&self) -> NaiveDateTime {
        match self {
            Self::Naive(dt) => *dt,
            Self::Zoned(dt) => dt.naive_local(),
        }
    }

    /// Calendar date as written. This is the date half of the dedup key.
    pub fn calendar_date(&self) -> NaiveDate {
        self.naive_local().date()
    }

    pub fn is_zoned(&self) -> bool {
        matches!(self, Self::Zoned(_))
    }

    /// Express the instant in `offset`. Naive instants are taken to already
    /// be local to `offset`.
    ///
    /// `None` when the result falls outside chrono's supported range.
    pub fn pinned(&self, offset: FixedOffset) -> Option<DateTime<FixedOffset>> {
        let shift = Duration::seconds(i64::from(offset.local_minus_utc()));
        match self {
            Self::Zoned(dt) => {
                dt.naive_utc().checked_add_signed(shift)?;
                Some(dt.with_timezone(&offset))
            }
            Self::Naive(ndt) => {
                let utc = ndt.checked_sub_signed(shift)?;
                Some(DateTime::from_naive_utc_and_offset(utc, offset))
            }
        }
    }
}

impl fmt::Display for ResolvedInstant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Naive(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M")),
            Self::Zoned(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M %:z")),
        }
    }
}

/// Coarse urgency bucket derived from whole days until the instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UrgencyTier {
    Overdue,
    Urgent,
    Soon,
    Upcoming,
}

impl UrgencyTier {
    /// Ranking weight: overdue and urgent share the top slot.
    pub fn severity(self) -> u8 {
        match self {
            Self::Overdue | Self::Urgent => 0,
            Self::Soon => 1,
            Self::Upcoming => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Overdue => "overdue",
            Self::Urgent => "urgent",
            Self::Soon => "soon",
            Self::Upcoming => "upcoming",
        }
    }
}

impl fmt::Display for UrgencyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// A dated action item found in a message.
///
/// Only created when the mention resolved to an instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Event {
    /// The mention text exactly as it appeared.
    pub original_text: String,
    /// Tokens around the mention.
    pub context_text: String,
    pub resolved_instant: ResolvedInstant,
    /// Signed whole days from the evaluation date.
    pub days_until: i64,
    pub urgency: UrgencyTier,
    pub entity_kind: EntityKind,
    pub source_subject: String,
    pub source_from: String,
}

impl Event {
    /// Key under which duplicate mentions collapse.
    pub fn dedup_key(&self) -> (&str, NaiveDate) {
        (&self.original_text, self.resolved_instant.calendar_date())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_entity_kind_from_label() {
        assert_eq!(EntityKind::from_label("DATE"), Some(EntityKind::Date));
        assert_eq!(EntityKind::from_label("time"), Some(EntityKind::Time));
        assert_eq!(EntityKind::from_label("Event"), Some(EntityKind::Event));
        assert_eq!(EntityKind::from_label("PERSON"), None);
        assert_eq!(EntityKind::from_label("ORG"), None);
    }

    #[test]
    fn test_severity_order() {
        assert_eq!(UrgencyTier::Overdue.severity(), 0);
        assert_eq!(UrgencyTier::Urgent.severity(), 0);
        assert_eq!(UrgencyTier::Soon.severity(), 1);
        assert_eq!(UrgencyTier::Upcoming.severity(), 2);
    }

    #[test]
    fn test_pinned_naive_keeps_wall_clock() {
        let ndt = NaiveDate::from_ymd_opt(2026, 10, 20)
            .unwrap()
            .and_hms_opt(15, 0, 0)
            .unwrap();
        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        let pinned = ResolvedInstant::Naive(ndt).pinned(offset).unwrap();
        assert_eq!(pinned.naive_local(), ndt);
        assert_eq!(pinned.offset(), &offset);
    }

    #[test]
    fn test_pinned_zoned_converts() {
        let est = FixedOffset::west_opt(5 * 3600).unwrap();
        let dt = est.with_ymd_and_hms(2026, 10, 20, 22, 0, 0).unwrap();
        let utc = FixedOffset::east_opt(0).unwrap();
        let pinned = ResolvedInstant::Zoned(dt).pinned(utc).unwrap();
        assert_eq!(pinned.naive_local().to_string(), "2026-10-21 03:00:00");
        // The dedup date stays the one that was written.
        assert_eq!(
            ResolvedInstant::Zoned(dt).calendar_date(),
            NaiveDate::from_ymd_opt(2026, 10, 20).unwrap()
        );
    }

    #[test]
    fn test_pinned_out_of_range_is_none() {
        let earliest = ResolvedInstant::Naive(NaiveDate::MIN.and_hms_opt(0, 0, 0).unwrap());
        assert_eq!(earliest.pinned(FixedOffset::east_opt(3600).unwrap()), None);
        assert!(earliest.pinned(FixedOffset::west_opt(3600).unwrap()).is_some());

        let latest = NaiveDate::MAX.and_hms_opt(23, 0, 0).unwrap();
        let latest = ResolvedInstant::Zoned(FixedOffset::east_opt(0).unwrap().from_utc_datetime(&latest));
        assert_eq!(latest.pinned(FixedOffset::east_opt(2 * 3600).unwrap()), None);
    }
}
