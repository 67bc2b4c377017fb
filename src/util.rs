// Utility helpers for parsing and basic statistics.
//
// This module centralizes the "dirty" spreadsheet handling so the rest of
// the code can assume clean, typed values.
use crate::types::CellValue;
use num_format::{Locale, ToFormattedString};
use std::collections::{HashMap, HashSet};

/// Parse a string-like value into `f64` while being forgiving about
/// formatting issues that are common in spreadsheet exports.
///
/// - Trims whitespace.
/// - Rejects values that contain alphabetic characters (this also keeps
///   `NaN` and `inf` out).
/// - Strips thousands separators like `","` before parsing.
/// - Returns `None` for anything that cannot be safely parsed.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if s.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let s = s.replace(",", "");
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Coerce a cell to a number; anything non-numeric is "unknown".
pub fn coerce_number(cell: &CellValue) -> Option<f64> {
    match cell {
        CellValue::Number(n) if n.is_finite() => Some(*n),
        CellValue::Text(s) => parse_f64_safe(Some(s.as_str())),
        _ => None,
    }
}

/// Arithmetic mean; `None` for an empty input so callers never mistake
/// "no data" for a real zero.
pub fn mean<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = f64>,
{
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

/// `part / whole * 100`, defined as 0 when `whole` is 0.
pub fn percentage(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// Make labels unique the way spreadsheet tooling does: the second
/// `Attendance` becomes `Attendance.1`, the third `Attendance.2`.
pub fn dedupe_labels(labels: Vec<String>) -> Vec<String> {
    let mut used: HashSet<String> = HashSet::new();
    let mut counters: HashMap<String, usize> = HashMap::new();
    let mut out = Vec::with_capacity(labels.len());
    for label in labels {
        let mut candidate = label.clone();
        while used.contains(&candidate) {
            let n = counters.entry(label.clone()).or_insert(0);
            *n += 1;
            candidate = format!("{}.{}", label, n);
        }
        used.insert(candidate.clone());
        out.push(candidate);
    }
    out
}

/// Whole numbers without a trailing `.0`, everything else as-is.
pub fn format_plain(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed decimals plus locale-aware thousands separators (`1,234.50`).
    let neg = n.is_sign_negative() && n != 0.0;
    let s = format!("{:.*}", decimals, n.abs());
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let mut res = match int_part.parse::<u128>() {
        Ok(v) => v.to_formatted_string(&Locale::en),
        Err(_) => int_part.to_string(),
    };
    if let Some(frac) = frac_part {
        res.push('.');
        res.push_str(frac);
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

/// Percentage for display, e.g. `60.0%`.
pub fn format_percent(n: f64) -> String {
    format!("{}%", format_number(n, 1))
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}
