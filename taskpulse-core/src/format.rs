//! Formatting helpers shared by the CLI and the suggestion prompt.

use chrono::NaiveTime;

const DAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Name of a weekday index (Monday = 0). Out-of-range indexes render as "?".
pub fn day_name(index: u32) -> &'static str {
    DAY_NAMES.get(index as usize).copied().unwrap_or("?")
}

/// Format an hour of day as "09:00".
pub fn format_hour(hour: u32) -> String {
    format!("{:02}:00", hour)
}

/// Format a time of day as "HH:MM", dropping seconds.
pub fn format_clock(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

/// Format a percentage with two decimals, e.g. "66.67%".
pub fn format_percent(value: f64) -> String {
    format!("{:.2}%", value)
}
