//! Whole-day urgency classification.

use chrono::{DateTime, FixedOffset};

use crate::model::{ResolvedInstant, UrgencyTier};

/// Signed calendar days from the evaluation date to `instant`.
///
/// The instant is first expressed in `now`'s offset, so a zoned instant that
/// falls on another calendar day there counts from that day. `None` when
/// the instant cannot be expressed in that offset.
pub fn days_until(instant: &ResolvedInstant, now: DateTime<FixedOffset>) -> Option<i64> {
    let target = instant.pinned(*now.offset())?.date_naive();
    Some((target - now.date_naive()).num_days())
}

/// Map a day count to its tier. Boundaries belong to the more urgent tier.
pub fn classify_days(days_until: i64) -> UrgencyTier {
    match days_until {
        d if d < 0 => UrgencyTier::Overdue,
        0..=1 => UrgencyTier::Urgent,
        2..=7 => UrgencyTier::Soon,
        _ => UrgencyTier::Upcoming,
    }
}

/// Day count and tier of `instant` as seen at `now`.
pub fn classify(
    instant: &ResolvedInstant,
    now: DateTime<FixedOffset>,
) -> Option<(i64, UrgencyTier)> {
    let days = days_until(instant, now)?;
    Some((days, classify_days(days)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    fn now() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2026, 10, 19, 9, 0, 0)
            .unwrap()
    }

    fn naive(d: u32, h: u32) -> ResolvedInstant {
        ResolvedInstant::Naive(
            NaiveDate::from_ymd_opt(2026, 10, d)
                .unwrap()
                .and_hms_opt(h, 0, 0)
                .unwrap(),
        )
    }

    #[test]
    fn test_classify_boundaries() {
        assert_eq!(classify_days(-1), UrgencyTier::Overdue);
        assert_eq!(classify_days(0), UrgencyTier::Urgent);
        assert_eq!(classify_days(1), UrgencyTier::Urgent);
        assert_eq!(classify_days(2), UrgencyTier::Soon);
        assert_eq!(classify_days(7), UrgencyTier::Soon);
        assert_eq!(classify_days(8), UrgencyTier::Upcoming);
        assert_eq!(classify_days(i64::MIN), UrgencyTier::Overdue);
    }

    #[test]
    fn test_days_until_is_calendar_difference() {
        // Earlier today is still today, not overdue.
        assert_eq!(days_until(&naive(19, 0), now()), Some(0));
        assert_eq!(days_until(&naive(20, 23), now()), Some(1));
        assert_eq!(days_until(&naive(16, 12), now()), Some(-3));
    }

    #[test]
    fn test_zoned_instant_counts_in_evaluation_offset() {
        let est = FixedOffset::west_opt(5 * 3600).unwrap();
        // 22:00 EST on the 20th is 03:00 UTC on the 21st.
        let instant = ResolvedInstant::Zoned(est.with_ymd_and_hms(2026, 10, 20, 22, 0, 0).unwrap());
        assert_eq!(classify(&instant, now()), Some((2, UrgencyTier::Soon)));
    }

    #[test]
    fn test_unrepresentable_instant_is_unclassified() {
        let earliest = ResolvedInstant::Naive(NaiveDate::MIN.and_hms_opt(0, 0, 0).unwrap());
        let ahead = FixedOffset::east_opt(3600)
            .unwrap()
            .with_ymd_and_hms(2026, 10, 19, 9, 0, 0)
            .unwrap();
        assert_eq!(classify(&earliest, ahead), None);
    }
}
