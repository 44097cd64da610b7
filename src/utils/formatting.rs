//! Formatting utilities used for CLI and export outputs.

pub fn pad_right(s: &str, width: usize) -> String {
    format!("{:<width$}", s, width = width)
}

/// Seconds → "HHh MMm" (or "HH:MM" when `short`).
pub fn secs2readable(secs: i64, short: bool) -> String {
    let mins = secs.max(0) / 60;
    let hours = mins / 60;
    let minutes = mins % 60;

    if short {
        format!("{:02}:{:02}", hours, minutes)
    } else {
        format!("{:02}h {:02}m", hours, minutes)
    }
}

/// "on"/"off" for boolean flags.
pub fn on_off(flag: bool) -> &'static str {
    if flag { "on" } else { "off" }
}
