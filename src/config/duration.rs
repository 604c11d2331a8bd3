//! Duration strings in the `90s` / `1m30s` / `1.5h` / `250ms` notation

use crate::error::{AppError, Result};
use std::time::Duration;

const NANOS_PER_SEC: u128 = 1_000_000_000;

fn unit_nanos(unit: &str) -> Option<u128> {
    match unit {
        "ns" => Some(1),
        "us" | "µs" | "μs" => Some(1_000),
        "ms" => Some(1_000_000),
        "s" => Some(NANOS_PER_SEC),
        "m" => Some(60 * NANOS_PER_SEC),
        "h" => Some(3_600 * NANOS_PER_SEC),
        _ => None,
    }
}

fn is_number_byte(b: u8) -> bool {
    b.is_ascii_digit() || b == b'.'
}

/// Parse a sequence of `<number><unit>` pairs into a `Duration`.
///
/// A bare `0` is accepted; every other value needs a unit. Negative
/// durations are rejected since every duration setting here is a wait.
pub fn parse_duration(input: &str) -> Result<Duration> {
    let invalid = |reason: &str| AppError::config(format!("Invalid duration '{}': {}", input, reason));

    let s = input.trim();
    if s.is_empty() {
        return Err(invalid("empty value"));
    }
    if s == "0" {
        return Ok(Duration::ZERO);
    }
    if s.starts_with('-') {
        return Err(invalid("negative durations are not allowed"));
    }
    let s = s.strip_prefix('+').unwrap_or(s);

    let bytes = s.as_bytes();
    let mut i = 0;
    let mut total: u128 = 0;

    while i < bytes.len() {
        let number_start = i;
        while i < bytes.len() && is_number_byte(bytes[i]) {
            i += 1;
        }
        let number = &s[number_start..i];

        let unit_start = i;
        while i < bytes.len() && !is_number_byte(bytes[i]) {
            i += 1;
        }
        let unit = &s[unit_start..i];

        if number.is_empty() || number == "." {
            return Err(invalid("expected a number"));
        }
        if unit.is_empty() {
            return Err(invalid("missing unit"));
        }
        let scale = unit_nanos(unit).ok_or_else(|| invalid(&format!("unknown unit '{}'", unit)))?;

        let (whole, fraction) = number.split_once('.').unwrap_or((number, ""));
        if fraction.contains('.') {
            return Err(invalid("malformed number"));
        }

        let whole: u128 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid("malformed number"))?
        };
        let mut nanos = whole.checked_mul(scale).ok_or_else(|| invalid("overflow"))?;

        if !fraction.is_empty() {
            let fraction: f64 = format!("0.{}", fraction)
                .parse()
                .map_err(|_| invalid("malformed number"))?;
            nanos = nanos
                .checked_add((fraction * scale as f64).round() as u128)
                .ok_or_else(|| invalid("overflow"))?;
        }

        total = total.checked_add(nanos).ok_or_else(|| invalid("overflow"))?;
    }

    let secs = u64::try_from(total / NANOS_PER_SEC).map_err(|_| invalid("overflow"))?;
    Ok(Duration::new(secs, (total % NANOS_PER_SEC) as u32))
}

/// Render a duration back in the same notation, largest units first
pub fn format_duration(duration: Duration) -> String {
    let total_ms = duration.as_millis();
    if total_ms == 0 {
        return format!("{}ms", duration.as_secs_f64() * 1000.0);
    }

    let hours = total_ms / 3_600_000;
    let minutes = (total_ms % 3_600_000) / 60_000;
    let seconds = (total_ms % 60_000) / 1_000;
    let millis = total_ms % 1_000;

    let mut out = String::new();
    if hours > 0 {
        out.push_str(&format!("{}h", hours));
    }
    if minutes > 0 {
        out.push_str(&format!("{}m", minutes));
    }
    if seconds > 0 {
        out.push_str(&format!("{}s", seconds));
    }
    if millis > 0 {
        out.push_str(&format!("{}ms", millis));
    }
    out
}
