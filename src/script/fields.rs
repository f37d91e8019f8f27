// src/script/fields.rs

//! Parsers for individual script fields.
//!
//! These return `None` on malformed input; the script parser attaches the
//! line number and field name when turning that into a `CompileError`.

use std::path::Path;

use chrono::TimeDelta;

/// Parse a signed offset: a sign field (`-` is negative, anything else is
/// positive) plus `HH:MM:SS` or `MM:SS`, each component possibly fractional.
pub fn parse_offset(sign: &str, text: &str) -> Option<TimeDelta> {
    let components = text
        .split(':')
        .map(|c| c.trim().parse::<f64>().ok())
        .collect::<Option<Vec<f64>>>()?;

    let seconds = match components.as_slice() {
        [hh, mm, ss] => hh * 3600.0 + mm * 60.0 + ss,
        [mm, ss] => mm * 60.0 + ss,
        _ => return None,
    };
    if !seconds.is_finite() {
        return None;
    }

    let delta = TimeDelta::microseconds((seconds * 1_000_000.0).round() as i64);
    if sign.trim() == "-" {
        Some(-delta)
    } else {
        Some(delta)
    }
}

/// Parse a shutter speed: `1/250`, `2`, `0.5`.
pub fn parse_shutter(text: &str) -> Option<f64> {
    let parts = text
        .split('/')
        .map(|p| p.trim().parse::<f64>().ok())
        .collect::<Option<Vec<f64>>>()?;

    let seconds = match parts.as_slice() {
        [num, den] => num / den,
        [sec] => *sec,
        _ => return None,
    };
    (seconds.is_finite() && seconds > 0.0).then_some(seconds)
}

/// Sound files are always played as MP3; swap whatever extension the script
/// names.
pub fn normalise_sound_file(file: &str) -> String {
    Path::new(file.trim())
        .with_extension("mp3")
        .to_string_lossy()
        .into_owned()
}
