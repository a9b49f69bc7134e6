use crate::constants::delay::DEFAULT_DELAY_MS;
use crate::services::logger::Logger;
use once_cell::sync::Lazy;
use regex::Regex;

static DURATION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(\d+(?:\.\d+)?)(ms|s|m|h)?$").expect("duration regex"));

/// Parses `<number><unit>` (unit one of ms, s, m, h; ms when omitted) into
/// milliseconds. Missing or blank input yields the default delay; malformed
/// input is logged and also yields the default.
pub fn parse_duration_ms(raw: Option<&str>, logger: &Logger) -> u64 {
    let Some(raw) = raw.map(str::trim).filter(|v| !v.is_empty()) else {
        return DEFAULT_DELAY_MS;
    };
    match try_parse_duration_ms(raw) {
        Some(ms) => ms,
        None => {
            logger.warn(
                "Invalid delay format, using default",
                Some(&serde_json::json!({
                    "delay": raw,
                    "default_ms": DEFAULT_DELAY_MS,
                })),
            );
            DEFAULT_DELAY_MS
        }
    }
}

fn try_parse_duration_ms(raw: &str) -> Option<u64> {
    let caps = DURATION_RE.captures(raw)?;
    let value: f64 = caps.get(1)?.as_str().parse().ok()?;
    let multiplier = match caps
        .get(2)
        .map(|m| m.as_str().to_ascii_lowercase())
        .as_deref()
    {
        None | Some("ms") => 1.0,
        Some("s") => 1_000.0,
        Some("m") => 60_000.0,
        Some("h") => 3_600_000.0,
        Some(_) => return None,
    };
    let ms = (value * multiplier).round();
    if !ms.is_finite() || ms > u64::MAX as f64 {
        return None;
    }
    Some(ms as u64)
}
