//! Text format detection for animated counters
//!
//! A counter's original text (e.g. `"$2.1M+"`, `"15,000+"`, `"94%"`) decides
//! how every interpolated value is rendered. The notation is classified once,
//! from the original text, and then frozen for the element's lifetime.
//!
//! Rendering is bit-compatible with the site's browser formatting, including
//! `Number.prototype.toFixed` rounding and en-US digit grouping.

use serde::{Deserialize, Serialize};

/// Display notation of a counter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Notation {
    /// `floor(v)` followed by `%`
    Percentage,
    /// `v / 1e6` with one decimal, followed by `M+`
    Millions,
    /// `v / 1e3` with no decimals, followed by `K+`
    Thousands,
    /// `floor(v)` with comma thousands separators, followed by `+`
    Grouped,
}

impl Notation {
    pub fn format(self, value: f64) -> String {
        match self {
            Notation::Percentage => format!("{}%", value.floor() as i64),
            Notation::Millions => format!("{}M+", to_fixed(value / 1_000_000.0, 1)),
            Notation::Thousands => format!("{}K+", to_fixed(value / 1_000.0, 0)),
            Notation::Grouped => format!("{}+", group_thousands(value.floor() as i64)),
        }
    }
}

/// Classify the notation of a counter's original text
///
/// Markers are checked in order: `%`, then `M`, then `K`; anything else is a
/// grouped integer.
pub fn classify(text: &str) -> Notation {
    if text.contains('%') {
        Notation::Percentage
    } else if text.contains('M') {
        Notation::Millions
    } else if text.contains('K') {
        Notation::Thousands
    } else {
        Notation::Grouped
    }
}

/// Numeric target encoded in a counter's original text
///
/// `"$2.1M+"` is 2 100 000, `"12K+"` is 12 000, `"15,000+"` is 15 000 and
/// `"94%"` is 94. Returns `None` when no leading number can be read.
pub fn parse_target(text: &str) -> Option<f64> {
    let clean: String = text
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | '%' | '+'))
        .collect();

    let value = parse_leading_float(&clean)?;
    if clean.contains('M') {
        Some(value * 1_000_000.0)
    } else if clean.contains('K') {
        Some(value * 1_000.0)
    } else {
        Some(value)
    }
}

/// Parse the longest decimal literal at the start of `text`
///
/// Leading whitespace is skipped and trailing garbage ignored, so `"2.1M"`
/// reads as 2.1.
pub fn parse_leading_float(text: &str) -> Option<f64> {
    let s = text.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let int_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    let mut mantissa_digits = end - int_start;

    if bytes.get(end) == Some(&b'.') {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while bytes.get(frac_end).is_some_and(u8::is_ascii_digit) {
            frac_end += 1;
        }
        mantissa_digits += frac_end - frac_start;
        if mantissa_digits > 0 {
            end = frac_end;
        }
    }
    if mantissa_digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let digits_start = exp_end;
        while bytes.get(exp_end).is_some_and(u8::is_ascii_digit) {
            exp_end += 1;
        }
        if exp_end > digits_start {
            end = exp_end;
        }
    }

    s[..end].parse().ok()
}

/// Fixed-point rendering with `Number.prototype.toFixed` semantics
///
/// Differs from Rust's `{:.N}` only on exact binary ties, which round away
/// from zero instead of to even (`0.25` → `"0.3"`, `2.5` → `"3"`).
pub fn to_fixed(value: f64, digits: u32) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if value < 0.0 {
        return format!("-{}", to_fixed(-value, digits));
    }
    // Normalizes -0.0
    let value = value.abs();
    let precision = digits as usize;

    // value is an exact tie at `digits` decimals iff value * 2^(digits+1) is
    // an odd integer; scaling by a power of two is exact.
    let doubled = value * 2f64.powi(digits as i32 + 1);
    let is_tie = doubled.fract() == 0.0 && doubled % 2.0 == 1.0;
    if is_tie {
        let scale = 10f64.powi(digits as i32);
        let rounded_up = (value * scale).floor() + 1.0;
        return format!("{:.*}", precision, rounded_up / scale);
    }
    format!("{:.*}", precision, value)
}

/// Integer with en-US thousands separators (`15000` → `"15,000"`)
pub fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Human readable file size, base 1024 (`1536` → `"1.5 KB"`)
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut unit = 0;
    let mut scale = 1u64;
    while unit + 1 < UNITS.len() && bytes >= scale * 1024 {
        scale *= 1024;
        unit += 1;
    }

    let fixed = to_fixed(bytes as f64 / scale as f64, 2);
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, UNITS[unit])
}
