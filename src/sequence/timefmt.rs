// src/sequence/timefmt.rs

//! Date and time text formats shared by sequence files, timing files and the
//! CLI.
//!
//! - dates are `YYYY/MM/DD`
//! - times of day are `HH:MM:SS.s`, written with one digit of tenths
//!   (truncated, never rounded)

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};

/// Format the date part of `time` as `YYYY/MM/DD`.
pub fn format_date(time: &DateTime<Utc>) -> String {
    time.format("%Y/%m/%d").to_string()
}

/// Format the time of day of `time` as `HH:MM:SS.s`.
pub fn format_time(time: &DateTime<Utc>) -> String {
    // Leap-second nanos can exceed one second; clamp the tenths digit.
    let tenths = (time.nanosecond() / 100_000_000).min(9);
    format!("{}.{}", time.format("%H:%M:%S"), tenths)
}

/// Parse a `YYYY/MM/DD` date.
pub fn parse_date(date: &str) -> Option<NaiveDate> {
    let mut parts = date.trim().split('/');
    let year = parts.next()?.trim().parse::<i32>().ok()?;
    let month = parts.next()?.trim().parse::<u32>().ok()?;
    let day = parts.next()?.trim().parse::<u32>().ok()?;
    if parts.next().is_some() {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Parse an `HH:MM:SS[.fraction]` time of day.
///
/// The fraction is read as a decimal fraction of a second, so `.5` and `.50`
/// are the same instant. Digits beyond microseconds are ignored.
pub fn parse_time_of_day(time: &str) -> Option<NaiveTime> {
    let mut parts = time.trim().split(':');
    let hour = parts.next()?.parse::<u32>().ok()?;
    let minute = parts.next()?.parse::<u32>().ok()?;
    let seconds = parts.next()?;
    if parts.next().is_some() {
        return None;
    }

    let (whole, fraction) = match seconds.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (seconds, ""),
    };
    let second = whole.parse::<u32>().ok()?;
    let micros = parse_fraction_micros(fraction)?;

    NaiveTime::from_hms_micro_opt(hour, minute, second, micros)
}

/// Parse separate date and time-of-day strings into a UTC instant.
pub fn parse_date_time(date: &str, time: &str) -> Option<DateTime<Utc>> {
    let date = parse_date(date)?;
    let time = parse_time_of_day(time)?;
    Some(NaiveDateTime::new(date, time).and_utc())
}

/// Parse a combined `YYYY/MM/DD HH:MM:SS.s` string (CLI form) as UTC.
pub fn parse_date_time_str(text: &str) -> Option<DateTime<Utc>> {
    parse_naive_date_time_str(text).map(|naive| naive.and_utc())
}

/// Parse a combined `YYYY/MM/DD HH:MM:SS.s` string without a time zone.
pub fn parse_naive_date_time_str(text: &str) -> Option<NaiveDateTime> {
    let (date, time) = text.trim().split_once(char::is_whitespace)?;
    Some(NaiveDateTime::new(parse_date(date)?, parse_time_of_day(time)?))
}

fn parse_fraction_micros(fraction: &str) -> Option<u32> {
    if fraction.is_empty() {
        return Some(0);
    }
    if !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let digits: String = fraction.chars().chain("000000".chars()).take(6).collect();
    digits.parse::<u32>().ok()
}
