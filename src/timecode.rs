//! Timestamp Codec
//!
//! Converts between float seconds and `HH:MM:SS[.,]mmm`-style timestamp
//! strings. Parsing is best-effort and fails closed: malformed input yields
//! `NaN` instead of an error, so a single corrupt timestamp inside an
//! imported file never aborts the surrounding parse.

use tracing::warn;

use crate::TimeSec;

/// Hour-field convention of a timestamp string. All three occur in the wild
/// and must be reproducible for lossless round-tripping.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HourField {
    /// Zero-padded two-digit hour (`00:01:30,000`)
    Padded,
    /// Bare hour digits (`0:01:30.000`)
    Bare,
    /// No hour field at all (`01:30.000`); falls back to `Bare` once the
    /// time crosses one hour, since the field can no longer be omitted
    Omitted,
}

/// Formats seconds as a subtitle timestamp.
///
/// `ms_separator` selects the millisecond separator (`,` for SubRip-style
/// files, `.` otherwise); `hour_field` selects the hour convention.
pub fn format_timestamp(seconds: TimeSec, ms_separator: char, hour_field: HourField) -> String {
    let clamped = if seconds.is_finite() && seconds > 0.0 {
        seconds
    } else {
        0.0
    };

    let total_ms = (clamped * 1000.0).round() as u64;
    let ms = total_ms % 1000;
    let total_secs = total_ms / 1000;
    let secs = total_secs % 60;
    let total_mins = total_secs / 60;
    let mins = total_mins % 60;
    let hours = total_mins / 60;

    match hour_field {
        HourField::Padded => {
            format!("{:02}:{:02}:{:02}{}{:03}", hours, mins, secs, ms_separator, ms)
        }
        HourField::Omitted if hours == 0 => {
            format!("{:02}:{:02}{}{:03}", mins, secs, ms_separator, ms)
        }
        _ => format!("{}:{:02}:{:02}{}{:03}", hours, mins, secs, ms_separator, ms),
    }
}

/// Parses a timestamp (`HH:MM:SS.mmm`, `MM:SS.mmm`, or bare `SS.mmm`, with
/// either `.` or `,` as the decimal separator) into seconds.
///
/// Components are split on `:` and accumulated in reverse as
/// `value * 60^index`. Any malformed component poisons the result to `NaN`.
pub fn parse_timestamp(input: &str) -> TimeSec {
    let normalized = input.trim().replace(',', ".");
    if normalized.is_empty() {
        return TimeSec::NAN;
    }

    let mut total = 0.0;
    for (index, part) in normalized.split(':').rev().enumerate() {
        match part.trim().parse::<f64>() {
            Ok(value) => total += value * 60f64.powi(index as i32),
            Err(_) => {
                warn!(input, "Malformed timestamp component");
                return TimeSec::NAN;
            }
        }
    }
    total
}
