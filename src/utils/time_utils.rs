use chrono::{DateTime, Utc};

pub struct TimeUtils;

impl TimeUtils {
    pub const SECS_IN_MIN: i64 = 60;
    pub const SECS_IN_H: i64 = Self::SECS_IN_MIN * 60;
    pub const SECS_IN_D: i64 = Self::SECS_IN_H * 24;
    pub const SECS_IN_W: i64 = Self::SECS_IN_D * 7;
    pub const STANDARD_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
}

/// Parse a timeframe token (`15m`, `4h`, `1d`, `1w`) into seconds.
/// Only fixed-length units are understood. `1M` (month) and anything else yields `None`.
pub fn token_to_secs(token: &str) -> Option<i64> {
    let unit = token.chars().last()?;
    let magnitude: i64 = token[..token.len() - unit.len_utf8()].parse().ok()?;
    if magnitude <= 0 {
        return None;
    }
    let unit_secs = match unit {
        'm' => TimeUtils::SECS_IN_MIN,
        'h' => TimeUtils::SECS_IN_H,
        'd' => TimeUtils::SECS_IN_D,
        'w' => TimeUtils::SECS_IN_W,
        _ => return None,
    };
    magnitude.checked_mul(unit_secs)
}

pub fn now_utc() -> DateTime<Utc> {
    Utc::now()
}

pub fn now_epoch_secs() -> i64 {
    Utc::now().timestamp()
}

// Used for display purposes
pub fn epoch_ms_to_utc(epoch_ms: i64) -> String {
    match DateTime::from_timestamp_millis(epoch_ms) {
        Some(dt) => dt.format(TimeUtils::STANDARD_TIME_FORMAT).to_string(),
        None => format!("invalid({})", epoch_ms),
    }
}

pub fn format_duration(ms: i64) -> String {
    let secs = ms / 1000;
    if secs < 60 {
        return format!("{}s", secs);
    }
    let mins = secs / 60;
    if mins < 60 {
        return format!("{}m {}s", mins, secs % 60);
    }
    let hours = mins / 60;
    if hours < 24 {
        return format!("{}h {}m", hours, mins % 60);
    }
    let days = hours / 24;
    format!("{}d {}h", days, hours % 24)
}
