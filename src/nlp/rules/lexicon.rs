//! Word lists and pattern fragments shared by the rule-based recognizer and resolver.
//!
//! Fragments are plain regex source, meant to be embedded in `(?i)` patterns.
//! They only contain non-capturing groups so callers can wrap them freely.

use chrono::{FixedOffset, Weekday};

pub const MONTH: &str = r"(?:jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)";

pub const WEEKDAY: &str = r"(?:monday|tuesday|wednesday|thursday|friday|saturday|sunday)";

pub const COUNT: &str =
    r"(?:\d{1,3}|an?|one|two|three|four|five|six|seven|eight|nine|ten|eleven|twelve)";

pub const ZONE: &str = r"(?:est|edt|cst|cdt|mst|mdt|pst|pdt|gmt|utc|cet|cest|jst)";

pub const HOLIDAY: &str = r"(?:christmas(?:\s+(?:day|eve))?|new\s+year['’]?s(?:\s+(?:day|eve))?|halloween|valentine['’]?s\s+day|independence\s+day)";

/// Clock times: `3 PM`, `3:30 p.m.`, `15:30`, `noon`, each with an optional zone.
pub fn time_pattern() -> String {
    format!(
        r"(?:\d{{1,2}}(?::\d{{2}})?\s*(?:[ap]m\b|[ap]\.m\.)|\d{{1,2}}:\d{{2}}\b|noon\b|midnight\b)(?:\s+{ZONE}\b)?"
    )
}

/// Calendar expressions, absolute and relative. Ends on a word boundary.
pub fn date_pattern() -> String {
    let ordinal = r"\d{1,2}(?:st|nd|rd|th)?";
    let alternatives = [
        format!(r"(?:{WEEKDAY},?\s+)?{MONTH}\.?\s+{ordinal}(?:,?\s+\d{{4}})?"),
        format!(r"(?:{WEEKDAY},?\s+)?(?:the\s+)?{ordinal}\s+(?:of\s+)?{MONTH}\.?(?:,?\s+\d{{4}})?"),
        r"\d{4}-\d{2}-\d{2}".to_string(),
        r"\d{1,2}/\d{1,2}/\d{4}".to_string(),
        format!(r"(?:next|this|last|coming)\s+{WEEKDAY}"),
        r"(?:next|this|last)\s+(?:week|month|year)".to_string(),
        format!(r"in\s+{COUNT}\s+(?:days?|weeks?|months?)"),
        format!(r"{COUNT}\s+(?:days?|weeks?|months?)\s+ago"),
        WEEKDAY.to_string(),
        r"today|tonight|tomorrow|yesterday".to_string(),
        r"the\s+\d{1,2}(?:st|nd|rd|th)".to_string(),
    ]
    .map(|alt| format!("(?:{alt})"))
    .join("|");
    format!(r"(?:{alternatives})\b")
}

pub fn month_number(word: &str) -> Option<u32> {
    let prefix = word.get(..3)?.to_ascii_lowercase();
    let n = match prefix.as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(n)
}

pub fn weekday(word: &str) -> Option<Weekday> {
    let prefix = word.get(..3)?.to_ascii_lowercase();
    let day = match prefix.as_str() {
        "mon" => Weekday::Mon,
        "tue" => Weekday::Tue,
        "wed" => Weekday::Wed,
        "thu" => Weekday::Thu,
        "fri" => Weekday::Fri,
        "sat" => Weekday::Sat,
        "sun" => Weekday::Sun,
        _ => return None,
    };
    Some(day)
}

/// Digits or a small number word (`a`, `an`, `one` … `twelve`).
pub fn count_value(word: &str) -> Option<u32> {
    if let Ok(n) = word.parse::<u32>() {
        return Some(n);
    }
    let n = match word.to_ascii_lowercase().as_str() {
        "a" | "an" | "one" => 1,
        "two" => 2,
        "three" => 3,
        "four" => 4,
        "five" => 5,
        "six" => 6,
        "seven" => 7,
        "eight" => 8,
        "nine" => 9,
        "ten" => 10,
        "eleven" => 11,
        "twelve" => 12,
        _ => return None,
    };
    Some(n)
}

/// UTC offset of a well-known zone abbreviation.
pub fn zone_offset(abbr: &str) -> Option<FixedOffset> {
    const ZONES: [(&str, i32); 13] = [
        ("EST", -5),
        ("EDT", -4),
        ("CST", -6),
        ("CDT", -5),
        ("MST", -7),
        ("MDT", -6),
        ("PST", -8),
        ("PDT", -7),
        ("GMT", 0),
        ("UTC", 0),
        ("CET", 1),
        ("CEST", 2),
        ("JST", 9),
    ];
    let hours = ZONES
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(abbr))?
        .1;
    FixedOffset::east_opt(hours * 3600)
}

/// Month and day of a fixed-date holiday name.
pub fn holiday_date(name: &str) -> Option<(u32, u32)> {
    let name = name.replace('’', "'");
    let words: Vec<&str> = name.split_whitespace().collect();
    let date = match words.as_slice() {
        ["christmas"] | ["christmas", "day"] => (12, 25),
        ["christmas", "eve"] => (12, 24),
        ["new", "year's" | "years"] | ["new", "year's" | "years", "day"] => (1, 1),
        ["new", "year's" | "years", "eve"] => (12, 31),
        ["halloween"] => (10, 31),
        ["valentine's" | "valentines", "day"] => (2, 14),
        ["independence", "day"] => (7, 4),
        _ => return None,
    };
    Some(date)
}
