//! Cell coercion rules shared by every interpreter strategy
//!
//! All three strategies call into this module, so an amount or a date that is
//! accepted by one of them is accepted by all of them.

use crate::types::Cell;
use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// What to do with an amount that has a fractional part (e.g. `3.7`)
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum DecimalPolicy {
    /// Drop the fraction (`3.7` -> 3, `-3.7` -> -3)
    #[default]
    Truncate,
    /// Round half away from zero (`2.5` -> 3, `-2.5` -> -3)
    Round,
    /// Count the cell as invalid and contribute 0
    Reject,
}

impl std::fmt::Display for DecimalPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DecimalPolicy::Truncate => "truncate",
            DecimalPolicy::Round => "round",
            DecimalPolicy::Reject => "reject",
        };
        f.write_str(name)
    }
}

//==============================================================================
// Amounts
//==============================================================================

/// Coerce an amount cell to an integer. `None` means the cell counts as
/// invalid and contributes 0.
pub fn coerce_amount(cell: &Cell, policy: DecimalPolicy) -> Option<i64> {
    match cell {
        Cell::Int(i) => Some(*i),
        Cell::Float(f) => amount_from_number(*f, policy),
        Cell::Text(s) => amount_from_text(s),
        Cell::Empty | Cell::Bool(_) | Cell::DateTime(_) => None,
    }
}

/// Numeric amount under `policy`; non-finite and out-of-range values fail
pub fn amount_from_number(value: f64, policy: DecimalPolicy) -> Option<i64> {
    if !value.is_finite() {
        return None;
    }
    let whole = match policy {
        DecimalPolicy::Truncate => value.trunc(),
        DecimalPolicy::Round => value.round(),
        DecimalPolicy::Reject if value.fract() != 0.0 => return None,
        DecimalPolicy::Reject => value,
    };
    // i64::MIN is exactly representable, i64::MAX is not
    if (-9_223_372_036_854_775_808.0..9_223_372_036_854_775_808.0).contains(&whole) {
        Some(whole as i64)
    } else {
        None
    }
}

/// Numeral-only text: optional sign and ASCII digits, surrounding whitespace
/// ignored. Decimal strings such as `"3.5"` are not numerals.
pub fn amount_from_text(text: &str) -> Option<i64> {
    text.trim().parse::<i64>().ok()
}

//==============================================================================
// Dates
//==============================================================================

/// Largest Excel serial day number (9999-12-31)
pub const MAX_EXCEL_SERIAL: f64 = 2_958_465.0;

// Two-digit year variants come before their four-digit siblings: `%y` fails
// on a four-digit year. `%Y` accepts any number of digits, so every parse is
// also checked against MIN_YEAR.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %I:%M:%S %p",
    "%Y-%m-%d %I:%M %p",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%y %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%y %H:%M",
    "%m/%d/%Y %H:%M",
    "%m/%d/%y %I:%M %p",
    "%m/%d/%Y %I:%M %p",
    "%d.%m.%y %H:%M:%S",
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%y %H:%M",
    "%d.%m.%Y %H:%M",
    "%B %d, %Y %H:%M:%S",
    "%B %d, %Y %H:%M",
    "%B %d, %Y %I:%M %p",
    "%B %d %Y %I:%M %p",
];

// Month-first slash dates win; day-first is tried only when they fail
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%m/%d/%y",
    "%m/%d/%Y",
    "%d/%m/%y",
    "%d/%m/%Y",
    "%d.%m.%y",
    "%d.%m.%Y",
    "%d-%b-%y",
    "%d-%b-%Y",
    "%B %d, %Y",
    "%B %d %Y",
    "%d %B %Y",
    "%d %B, %Y",
    "%A, %d %B %Y",
    "%A, %B %d, %Y",
];

/// Smallest year accepted from text. Anything lower is a short year that a
/// `%Y` field read as-is (`"24"` -> year 24).
const MIN_YEAR: i32 = 1000;

fn plausible(date: NaiveDate) -> Option<NaiveDate> {
    (date.year() >= MIN_YEAR).then_some(date)
}

/// Coerce a date cell to a calendar date. Any time of day is dropped.
pub fn coerce_date(cell: &Cell) -> Option<NaiveDate> {
    match cell {
        Cell::DateTime(dt) => Some(dt.date()),
        Cell::Int(i) => date_from_serial(*i as f64),
        Cell::Float(f) => date_from_serial(*f),
        Cell::Text(s) => parse_date_text(s),
        Cell::Empty | Cell::Bool(_) => None,
    }
}

/// Excel serial day number (1900 date system) to a date. Fractions are the
/// time of day and are ignored; serial 60 (the non-existent 1900-02-29) maps
/// to 1900-02-28.
pub fn date_from_serial(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || !(1.0..=MAX_EXCEL_SERIAL).contains(&serial) {
        return None;
    }
    let days = serial.floor() as u64;
    let epoch = if days < 60 {
        NaiveDate::from_ymd_opt(1899, 12, 31)?
    } else {
        NaiveDate::from_ymd_opt(1899, 12, 30)?
    };
    epoch.checked_add_days(Days::new(days))
}

/// Permissive text date parsing: ISO dates and date-times (24- or 12-hour),
/// RFC 3339, slash and dotted dates with two- or four-digit years, `d-Mon-yy`,
/// compact `YYYYMMDD`, English month names, and `YYYY-MM` / `January 2024`
/// (first of the month).
pub fn parse_date_text(text: &str) -> Option<NaiveDate> {
    let s = text.trim();
    if s.is_empty() {
        return None;
    }

    // Offsets are ignored: the date is taken as written
    if let Some(date) = DateTime::parse_from_rfc3339(s)
        .ok()
        .and_then(|dt| plausible(dt.naive_local().date()))
    {
        return Some(date);
    }

    let datetime = DATETIME_FORMATS.iter().find_map(|fmt| {
        NaiveDateTime::parse_from_str(s, fmt)
            .ok()
            .and_then(|dt| plausible(dt.date()))
    });
    if datetime.is_some() {
        return datetime;
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| {
            NaiveDate::parse_from_str(s, fmt)
                .ok()
                .and_then(plausible)
        })
        .or_else(|| parse_compact_date(s))
        .or_else(|| parse_year_month(s))
        .or_else(|| parse_month_name_year(s))
        .and_then(plausible)
}

/// `YYYYMMDD`
fn parse_compact_date(s: &str) -> Option<NaiveDate> {
    if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year = s[0..4].parse().ok()?;
    let month = s[4..6].parse().ok()?;
    let day = s[6..8].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// `January 2024` / `Jan 2024` -> first day of that month
fn parse_month_name_year(s: &str) -> Option<NaiveDate> {
    let (month, year) = s.split_once(' ')?;
    let year = year.trim();
    if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDate::parse_from_str(&format!("1 {} {}", month, year), "%d %B %Y").ok()
}

/// `YYYY-MM` -> first day of that month
fn parse_year_month(s: &str) -> Option<NaiveDate> {
    let (year, month) = s.split_once('-')?;
    if year.len() != 4 || month.is_empty() || month.len() > 2 {
        return None;
    }
    if !year.bytes().chain(month.bytes()).all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, 1)
}
