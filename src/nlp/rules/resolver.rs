//! Rule-based resolution of English date and time expressions.

use std::sync::OnceLock;

use chrono::{Datelike, Duration, FixedOffset, Months, NaiveDate, NaiveTime, TimeZone, Weekday};
use regex::{Captures, Regex};

use crate::model::ResolvedInstant;
use crate::nlp::{ResolveContext, TemporalResolver};

use super::lexicon::{
    count_value, holiday_date, month_number, weekday, zone_offset, COUNT, HOLIDAY, MONTH, WEEKDAY,
    ZONE,
};

/// Words that join a date and a time without changing either.
const CONNECTORS: [&str; 6] = ["at", "on", "by", "before", "until", "@"];

/// Resolves the expressions [`RuleRecognizer`](super::RuleRecognizer) tags.
///
/// Supported shapes:
/// - `today`, `tonight`, `tomorrow`, `yesterday`
/// - `[next|this|last|coming] <weekday>`
/// - `next|this|last week|month|year`
/// - `in <n> days|weeks|months`, `<n> days|weeks|months ago`
/// - `<month> <day>[, <year>]`, `[the] <day> [of] <month>[ <year>]`
/// - `YYYY-MM-DD`, `MM/DD/YYYY`, `the <nth>`
/// - fixed-date holidays, optionally with a year
///
/// Any of these may carry a clock time (`3 PM`, `15:30`, `noon`) with an
/// optional zone abbreviation. A zone yields a zoned instant; anything
/// else is naive wall-clock time. Dates without a time are at midnight,
/// except `tonight` which is 20:00.
#[derive(Debug, Default, Clone, Copy)]
pub struct RuleResolver;

impl RuleResolver {
    pub fn new() -> Self {
        Self
    }
}

struct ClockTime {
    time: NaiveTime,
    zone: Option<FixedOffset>,
}

fn clock_regex() -> &'static Regex {
    static CLOCK_RE: OnceLock<Regex> = OnceLock::new();
    CLOCK_RE.get_or_init(|| {
        let pattern = format!(
            r"\b(?:(?P<h12>\d{{1,2}})(?::(?P<m12>\d{{2}}))?\s*(?P<mer>[ap])\.?m\b\.?|(?P<h24>\d{{1,2}}):(?P<m24>\d{{2}})\b|(?P<word>noon|midnight)\b)(?:\s+(?P<zone>{ZONE})\b)?"
        );
        Regex::new(&pattern).expect("clock regex must compile")
    })
}

struct DatePatterns {
    relative_day: Regex,
    weekday: Regex,
    period: Regex,
    ahead: Regex,
    ago: Regex,
    month_day: Regex,
    day_month: Regex,
    iso: Regex,
    us: Regex,
    day_of_month: Regex,
    holiday: Regex,
}

fn date_patterns() -> &'static DatePatterns {
    static PATTERNS: OnceLock<DatePatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        let compile = |pattern: &str| Regex::new(pattern).expect("date regex must compile");
        DatePatterns {
            relative_day: compile(r"^(?P<word>today|tonight|tomorrow|yesterday)$"),
            weekday: compile(&format!(
                r"^(?:(?P<modifier>next|this|last|coming) )?(?P<day>{WEEKDAY})$"
            )),
            period: compile(r"^(?P<modifier>next|this|last) (?P<unit>week|month|year)$"),
            ahead: compile(&format!(
                r"^in (?P<count>{COUNT}) (?P<unit>day|week|month|year)s?$"
            )),
            ago: compile(&format!(
                r"^(?P<count>{COUNT}) (?P<unit>day|week|month|year)s? ago$"
            )),
            month_day: compile(&format!(
                r"^(?:{WEEKDAY} )?(?P<month>{MONTH})\.? (?P<day>\d{{1,2}})(?:st|nd|rd|th)?(?: (?P<year>\d{{4}}))?$"
            )),
            day_month: compile(&format!(
                r"^(?:{WEEKDAY} )?(?:the )?(?P<day>\d{{1,2}})(?:st|nd|rd|th)? (?:of )?(?P<month>{MONTH})\.?(?: (?P<year>\d{{4}}))?$"
            )),
            iso: compile(r"^(?P<year>\d{4})-(?P<month>\d{2})-(?P<day>\d{2})$"),
            us: compile(r"^(?P<month>\d{1,2})/(?P<day>\d{1,2})/(?P<year>\d{4})$"),
            day_of_month: compile(r"^the (?P<day>\d{1,2})(?:st|nd|rd|th)$"),
            holiday: compile(&format!(r"^(?P<name>{HOLIDAY})(?: (?P<year>\d{{4}}))?$")),
        }
    })
}

impl TemporalResolver for RuleResolver {
    fn resolve(&self, text: &str, ctx: &ResolveContext) -> Option<ResolvedInstant> {
        let text = text
            .replace('’', "'")
            .to_lowercase()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");

        let (clock, rest) = match clock_regex().captures(&text) {
            Some(caps) => {
                let whole = caps.get(0)?;
                let clock = clock_time(&caps)?;
                let rest = format!("{} {}", &text[..whole.start()], &text[whole.end()..]);
                (Some(clock), rest)
            }
            None => (None, text.clone()),
        };
        let rest = strip_connectors(&rest);

        let zone = clock.as_ref().and_then(|c| c.zone);
        let local_now = match zone {
            Some(offset) => ctx.now.with_timezone(&offset).naive_local(),
            None => ctx.now.naive_local(),
        };
        let today = local_now.date();

        let (date, time) = if rest.is_empty() {
            let clock = clock.as_ref()?;
            let date = if ctx.prefer_future && clock.time < local_now.time() {
                today.succ_opt()?
            } else {
                today
            };
            (date, clock.time)
        } else {
            let date = resolve_date(&rest, today, ctx.prefer_future)?;
            let time = match &clock {
                Some(clock) => clock.time,
                None if rest == "tonight" => NaiveTime::from_hms_opt(20, 0, 0)?,
                None => NaiveTime::from_hms_opt(0, 0, 0)?,
            };
            (date, time)
        };

        let local = date.and_time(time);
        match zone {
            Some(offset) => offset
                .from_local_datetime(&local)
                .single()
                .map(ResolvedInstant::Zoned),
            None => Some(ResolvedInstant::Naive(local)),
        }
    }
}

/// Clock time from a [`clock_regex`] match. `None` when out of range.
fn clock_time(caps: &Captures) -> Option<ClockTime> {
    let time = if let Some(word) = caps.name("word") {
        match word.as_str() {
            "noon" => NaiveTime::from_hms_opt(12, 0, 0)?,
            _ => NaiveTime::from_hms_opt(0, 0, 0)?,
        }
    } else if let Some(hour) = caps.name("h12") {
        let hour: u32 = hour.as_str().parse().ok()?;
        let minute: u32 = match caps.name("m12") {
            Some(m) => m.as_str().parse().ok()?,
            None => 0,
        };
        if !(1..=12).contains(&hour) {
            return None;
        }
        let pm = caps.name("mer").is_some_and(|m| m.as_str() == "p");
        NaiveTime::from_hms_opt(hour % 12 + if pm { 12 } else { 0 }, minute, 0)?
    } else {
        let hour: u32 = caps.name("h24")?.as_str().parse().ok()?;
        let minute: u32 = caps.name("m24")?.as_str().parse().ok()?;
        NaiveTime::from_hms_opt(hour, minute, 0)?
    };

    let zone = match caps.name("zone") {
        Some(abbr) => Some(zone_offset(abbr.as_str())?),
        None => None,
    };
    Some(ClockTime { time, zone })
}

fn strip_connectors(text: &str) -> String {
    text.split_whitespace()
        .map(|word| word.trim_matches(|c| c == ',' || c == ';'))
        .filter(|word| !word.is_empty() && !CONNECTORS.contains(word))
        .collect::<Vec<_>>()
        .join(" ")
}

fn resolve_date(text: &str, today: NaiveDate, prefer_future: bool) -> Option<NaiveDate> {
    let p = date_patterns();

    if let Some(caps) = p.relative_day.captures(text) {
        return match &caps["word"] {
            "tomorrow" => today.succ_opt(),
            "yesterday" => today.pred_opt(),
            _ => Some(today),
        };
    }
    if let Some(caps) = p.weekday.captures(text) {
        let target = weekday(&caps["day"])?;
        let modifier = caps.name("modifier").map(|m| m.as_str());
        return weekday_date(today, target, modifier, prefer_future);
    }
    if let Some(caps) = p.period.captures(text) {
        let direction = match &caps["modifier"] {
            "next" => 1,
            "last" => -1,
            _ => 0,
        };
        return shift(today, direction, &caps["unit"]);
    }
    if let Some(caps) = p.ahead.captures(text) {
        let count = i64::from(count_value(&caps["count"])?);
        return shift(today, count, &caps["unit"]);
    }
    if let Some(caps) = p.ago.captures(text) {
        let count = i64::from(count_value(&caps["count"])?);
        return shift(today, -count, &caps["unit"]);
    }
    if let Some(caps) = p.month_day.captures(text).or_else(|| p.day_month.captures(text)) {
        let month = month_number(&caps["month"])?;
        let day = caps["day"].parse().ok()?;
        let year = caps.name("year").map(|y| y.as_str());
        return calendar_date(today, year, month, day, prefer_future);
    }
    if let Some(caps) = p.iso.captures(text).or_else(|| p.us.captures(text)) {
        return NaiveDate::from_ymd_opt(
            caps["year"].parse().ok()?,
            caps["month"].parse().ok()?,
            caps["day"].parse().ok()?,
        );
    }
    if let Some(caps) = p.day_of_month.captures(text) {
        let day: u32 = caps["day"].parse().ok()?;
        return match today.with_day(day) {
            Some(date) if !(prefer_future && date < today) => Some(date),
            _ => today
                .with_day(1)?
                .checked_add_months(Months::new(1))?
                .with_day(day),
        };
    }
    if let Some(caps) = p.holiday.captures(text) {
        let (month, day) = holiday_date(&caps["name"])?;
        let year = caps.name("year").map(|y| y.as_str());
        return calendar_date(today, year, month, day, prefer_future);
    }
    None
}

/// A month/day with an optional written year. Without one, the current
/// year is used, or the next one when the date has passed and the future
/// reading is preferred.
fn calendar_date(
    today: NaiveDate,
    year: Option<&str>,
    month: u32,
    day: u32,
    prefer_future: bool,
) -> Option<NaiveDate> {
    if let Some(year) = year {
        return NaiveDate::from_ymd_opt(year.parse().ok()?, month, day);
    }
    let date = NaiveDate::from_ymd_opt(today.year(), month, day)?;
    if prefer_future && date < today {
        NaiveDate::from_ymd_opt(today.year() + 1, month, day)
    } else {
        Some(date)
    }
}

fn weekday_date(
    today: NaiveDate,
    target: Weekday,
    modifier: Option<&str>,
    prefer_future: bool,
) -> Option<NaiveDate> {
    let ahead = (i64::from(target.num_days_from_monday())
        - i64::from(today.weekday().num_days_from_monday()))
    .rem_euclid(7);
    let behind = (7 - ahead) % 7;

    let offset = match modifier {
        Some("next" | "coming") if ahead == 0 => 7,
        Some("next" | "coming") | Some("this") => ahead,
        Some(_) if behind == 0 => -7,
        Some(_) => -behind,
        None if prefer_future => ahead,
        None => -behind,
    };
    today.checked_add_signed(Duration::days(offset))
}

fn shift(date: NaiveDate, amount: i64, unit: &str) -> Option<NaiveDate> {
    match unit {
        "day" => date.checked_add_signed(Duration::days(amount)),
        "week" => date.checked_add_signed(Duration::days(amount * 7)),
        "month" => shift_months(date, amount),
        _ => shift_months(date, amount * 12),
    }
}

fn shift_months(date: NaiveDate, months: i64) -> Option<NaiveDate> {
    let span = Months::new(u32::try_from(months.unsigned_abs()).ok()?);
    if months >= 0 {
        date.checked_add_months(span)
    } else {
        date.checked_sub_months(span)
    }
}
