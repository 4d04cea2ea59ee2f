//! Human-readable sizes and durations for the config file.
//!
//! Sizes accept `B`, `KB`, `MB`, `GB` (binary multiples, case-insensitive);
//! durations accept `ms`, `s`, `m`, `h`, `d`. A bare number is bytes or
//! seconds respectively.

use std::time::Duration;

const KB: u64 = 1024;
const MB: u64 = KB * 1024;
const GB: u64 = MB * 1024;

/// Parse a size like `256MB` into bytes.
pub fn parse_size(value: &str) -> Option<u64> {
    let (number, unit) = split_unit(value)?;
    let multiplier = match unit.to_ascii_uppercase().as_str() {
        "" | "B" => 1,
        "K" | "KB" => KB,
        "M" | "MB" => MB,
        "G" | "GB" => GB,
        _ => return None,
    };
    number.checked_mul(multiplier)
}

/// Format a byte count with the largest fitting unit, e.g. `2.0 GB`.
pub fn format_size(bytes: u64) -> String {
    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Parse a duration like `10m` or `90s`. `0` means no expiration.
pub fn parse_duration(value: &str) -> Option<Duration> {
    let (number, unit) = split_unit(value)?;
    let duration = match unit.to_ascii_lowercase().as_str() {
        "ms" => Duration::from_millis(number),
        "" | "s" => Duration::from_secs(number),
        "m" => Duration::from_secs(number.checked_mul(60)?),
        "h" => Duration::from_secs(number.checked_mul(3600)?),
        "d" => Duration::from_secs(number.checked_mul(86_400)?),
        _ => return None,
    };
    Some(duration)
}

/// Format a duration in the coarsest unit that represents it exactly.
pub fn format_duration(duration: Duration) -> String {
    let millis = duration.as_millis();
    if millis == 0 {
        return "0".to_string();
    }
    if millis % 1000 != 0 {
        return format!("{}ms", millis);
    }
    let secs = duration.as_secs();
    if secs % 86_400 == 0 {
        format!("{}d", secs / 86_400)
    } else if secs % 3600 == 0 {
        format!("{}h", secs / 3600)
    } else if secs % 60 == 0 {
        format!("{}m", secs / 60)
    } else {
        format!("{}s", secs)
    }
}

fn split_unit(value: &str) -> Option<(u64, &str)> {
    let value = value.trim();
    let split = value
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(value.len());
    let (digits, unit) = value.split_at(split);
    let number = digits.parse().ok()?;
    Some((number, unit.trim()))
}
