//! Date/time normalization for values coming back from the booking backend.
//!
//! The backend hands out dates in several shapes: bare `YYYY-MM-DD` strings,
//! naive `YYYY-MM-DD HH:mm:ss` timestamps, offset-qualified ISO strings and
//! numeric epochs. Everything here is pure and total: failures surface as
//! `None` or a fallback string, never as a panic.
//!
//! Accepted text shapes: `YYYY-MM-DD`, `YYYY-MM` (first of the month, UTC),
//! `YYYY-MM-DD[T ]HH:MM[:SS[.fff]]` read as wall time, and the same followed
//! by `Z`, `±HH:MM` or `±HHMM`. Anything else is `None`.
//!
//! Functions without a zone argument read the host zone through
//! [`chrono::Local`]; the `*_in` variants take the zone explicitly.

use std::borrow::Cow;
use std::fmt::Display;
use std::sync::LazyLock;

use chrono::{
    DateTime, Datelike, Duration, Local, LocalResult, Locale, NaiveDate, NaiveDateTime, TimeZone,
    Utc,
};
use regex::Regex;

use crate::slots::to_24_hour;

/// Shown by [`format_for_display`] when neither a date nor a time is known.
pub const DISPLAY_PLACEHOLDER: &str = "—";

/// Epoch values at or above this are milliseconds, below it seconds.
const EPOCH_MILLIS_THRESHOLD: f64 = 1e12;
/// Largest representable instant, in milliseconds either side of the epoch.
const MAX_EPOCH_MILLIS: f64 = 8.64e15;

static DATE_ONLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("date-only pattern"));
static YEAR_MONTH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}$").expect("year-month pattern"));
static OFFSET_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"T.*(Z|[+\-][0-9]{2}:?[0-9]{2})$").expect("offset suffix pattern")
});

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%z",
];
const LOCAL_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// A raw date/time value as it arrives from the backend or the UI.
#[derive(Clone, Debug, PartialEq)]
pub enum DateTimeInput<'a> {
    Missing,
    Text(Cow<'a, str>),
    Number(f64),
}

impl<'a> From<&'a str> for DateTimeInput<'a> {
    fn from(s: &'a str) -> Self {
        DateTimeInput::Text(Cow::Borrowed(s))
    }
}

impl<'a> From<&'a String> for DateTimeInput<'a> {
    fn from(s: &'a String) -> Self {
        DateTimeInput::Text(Cow::Borrowed(s.as_str()))
    }
}

impl From<String> for DateTimeInput<'_> {
    fn from(s: String) -> Self {
        DateTimeInput::Text(Cow::Owned(s))
    }
}

impl<'a, T: Into<DateTimeInput<'a>>> From<Option<T>> for DateTimeInput<'a> {
    fn from(value: Option<T>) -> Self {
        value.map_or(DateTimeInput::Missing, Into::into)
    }
}

impl From<f64> for DateTimeInput<'_> {
    fn from(n: f64) -> Self {
        DateTimeInput::Number(n)
    }
}

impl From<i64> for DateTimeInput<'_> {
    fn from(n: i64) -> Self {
        DateTimeInput::Number(n as f64)
    }
}

impl From<u64> for DateTimeInput<'_> {
    fn from(n: u64) -> Self {
        DateTimeInput::Number(n as f64)
    }
}

impl From<i32> for DateTimeInput<'_> {
    fn from(n: i32) -> Self {
        DateTimeInput::Number(f64::from(n))
    }
}

/// JSON strings are text, JSON numbers are epochs, everything else is missing.
impl<'a> From<&'a serde_json::Value> for DateTimeInput<'a> {
    fn from(value: &'a serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(s) => DateTimeInput::Text(Cow::Borrowed(s.as_str())),
            serde_json::Value::Number(n) => n
                .as_f64()
                .map_or(DateTimeInput::Missing, DateTimeInput::Number),
            _ => DateTimeInput::Missing,
        }
    }
}

/// Normalize a backend date/time into a UTC ISO-8601 string
/// (`YYYY-MM-DDTHH:MM:SS.sssZ`), reading naive timestamps in the host zone.
///
/// Returns `None` for missing or unparseable input.
pub fn to_canonical_iso<'a>(input: impl Into<DateTimeInput<'a>>) -> Option<String> {
    to_canonical_iso_in(input, &Local)
}

/// [`to_canonical_iso`] with an explicit zone for naive timestamps.
pub fn to_canonical_iso_in<'a, Tz: TimeZone>(
    input: impl Into<DateTimeInput<'a>>,
    tz: &Tz,
) -> Option<String> {
    canonical_instant_in(input, tz).map(|instant| to_iso_string(&instant))
}

/// Resolve a backend date/time to a UTC instant.
///
/// Resolution order:
/// 1. all-digit text and native numbers are epochs (ms when `>= 10^12`, else s);
/// 2. a bare `YYYY-MM-DD` is midnight UTC;
/// 3. text with a `Z` or `±HH:MM` suffix is an absolute instant;
/// 4. anything else is wall time in `tz`.
///
/// Note that `"20240101"` is epoch seconds under rule 1, not a date.
pub fn canonical_instant_in<'a, Tz: TimeZone>(
    input: impl Into<DateTimeInput<'a>>,
    tz: &Tz,
) -> Option<DateTime<Utc>> {
    match input.into() {
        DateTimeInput::Missing => None,
        DateTimeInput::Number(n) => from_epoch(n),
        DateTimeInput::Text(raw) => {
            if raw.is_empty() {
                return None;
            }
            if raw.bytes().all(|b| b.is_ascii_digit()) {
                return from_epoch(raw.parse::<f64>().ok()?);
            }
            parse_text(&raw, tz)
        }
    }
}

/// Calendar day of a backend date/time as seen in `tz`.
///
/// A value that starts with `YYYY-MM-DD` keeps that day as written; other
/// values are resolved to an instant first.
pub fn calendar_date_in<'a, Tz: TimeZone>(
    input: impl Into<DateTimeInput<'a>>,
    tz: &Tz,
) -> Option<NaiveDate> {
    let input = input.into();
    if let DateTimeInput::Text(raw) = &input {
        let written = raw
            .trim()
            .get(..10)
            .filter(|day| DATE_ONLY.is_match(day))
            .and_then(|day| NaiveDate::parse_from_str(day, "%Y-%m-%d").ok());
        if written.is_some() {
            return written;
        }
    }
    canonical_instant_in(input, tz).map(|instant| instant.with_timezone(tz).date_naive())
}

/// Render an instant the way the normalizer emits it.
///
/// Years outside `0..=9999` use the expanded `±YYYYYY` form.
pub fn to_iso_string(instant: &DateTime<Utc>) -> String {
    let year = instant.year();
    let rest = instant.format("-%m-%dT%H:%M:%S%.3fZ");
    if (0..=9999).contains(&year) {
        format!("{year:04}{rest}")
    } else {
        format!("{year:+07}{rest}")
    }
}

fn from_epoch(n: f64) -> Option<DateTime<Utc>> {
    if !n.is_finite() {
        return None;
    }
    let millis = if n >= EPOCH_MILLIS_THRESHOLD { n } else { n * 1000.0 }.trunc();
    if !millis.is_finite() || millis.abs() > MAX_EPOCH_MILLIS {
        return None;
    }
    DateTime::from_timestamp_millis(millis as i64)
}

/// Text forms only; epochs are handled by the caller.
fn parse_text<Tz: TimeZone>(raw: &str, tz: &Tz) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if DATE_ONLY.is_match(s) {
        let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?;
        return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
    }
    if YEAR_MONTH.is_match(s) {
        let date = NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d").ok()?;
        return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
    }

    let normalized = s.replacen(' ', "T", 1);
    if OFFSET_SUFFIX.is_match(&normalized) {
        parse_with_offset(&normalized)
    } else {
        parse_local(&normalized, tz)
    }
}

fn parse_with_offset(s: &str) -> Option<DateTime<Utc>> {
    let s: Cow<'_, str> = match s.strip_suffix('Z') {
        Some(rest) => Cow::Owned(format!("{rest}+00:00")),
        None => Cow::Borrowed(s),
    };
    OFFSET_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(&s, fmt).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

fn parse_local<Tz: TimeZone>(s: &str, tz: &Tz) -> Option<DateTime<Utc>> {
    let naive = LOCAL_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())?;
    resolve_local(&naive, tz)
}

/// Ambiguous wall times take the earlier instant; wall times inside a
/// forward transition are read with the offset in force before the gap.
fn resolve_local<Tz: TimeZone>(naive: &NaiveDateTime, tz: &Tz) -> Option<DateTime<Utc>> {
    match tz.from_local_datetime(naive) {
        LocalResult::Single(dt) => Some(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Some(earliest.with_timezone(&Utc)),
        LocalResult::None => {
            let before = naive.checked_sub_signed(Duration::hours(1))?;
            tz.from_local_datetime(&before)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc) + Duration::hours(1))
        }
    }
}

/// Best-effort human rendering of a booking's date and time in the host zone
/// and locale.
///
/// Never fails: with nothing to show it returns [`DISPLAY_PLACEHOLDER`], and
/// with nothing parseable it returns the raw inputs joined by a space.
pub fn format_for_display(date: Option<&str>, time: Option<&str>) -> String {
    format_for_display_in(date, time, &Local, host_locale())
}

/// [`format_for_display`] with an explicit zone and locale.
pub fn format_for_display_in<Tz>(
    date: Option<&str>,
    time: Option<&str>,
    tz: &Tz,
    locale: Locale,
) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let date = date.filter(|d| !d.is_empty());
    let time = time.filter(|t| !t.is_empty());
    let candidate = match (date, time) {
        (None, None) => return DISPLAY_PLACEHOLDER.to_string(),
        (Some(d), Some(t)) => format!("{d}T{t}"),
        (Some(d), None) => d.to_string(),
        (None, Some(t)) => t.to_string(),
    };
    let date = date.unwrap_or_default();
    let time = time.unwrap_or_default();

    // The space-joined retry also lets slot labels such as "10:00 AM" through.
    let instant = parse_text(&candidate, tz)
        .or_else(|| parse_text(&format!("{date} {}", to_24_hour(time)), tz));

    match instant {
        Some(instant) => render(&instant.with_timezone(tz), locale),
        None => format!("{date} {time}").trim().to_string(),
    }
}

fn render<Tz>(dt: &DateTime<Tz>, locale: Locale) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let has_meridian = !dt.format_localized("%p", locale).to_string().trim().is_empty();
    let pattern = if has_meridian {
        "%a, %d %b %Y, %I:%M %p"
    } else {
        "%a, %d %b %Y, %H:%M"
    };
    dt.format_localized(pattern, locale).to_string()
}

/// Locale taken from `LC_ALL`, `LC_TIME` or `LANG`, falling back to `en_US`.
pub fn host_locale() -> Locale {
    ["LC_ALL", "LC_TIME", "LANG"]
        .iter()
        .filter_map(|key| std::env::var(key).ok())
        .find(|value| !value.is_empty())
        .and_then(|value| locale_from_tag(&value))
        .unwrap_or(Locale::en_US)
}

/// Parse a POSIX or BCP-47 style locale tag (`de_DE.UTF-8`, `en-IN`).
pub fn locale_from_tag(tag: &str) -> Option<Locale> {
    let name = tag.split(['.', '@']).next()?.replace('-', "_");
    match name.as_str() {
        "C" | "POSIX" => Some(Locale::POSIX),
        other => Locale::try_from(other).ok(),
    }
}
