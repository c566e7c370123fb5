use chrono::{Duration, NaiveTime};

/// Time-of-day formats accepted from stored and remote payloads.
const CLOCK_TIME_FORMATS: [&str; 2] = ["%H:%M:%S", "%H:%M"];

/// This is the standard way of rendering a time of day in worklog.
pub fn clock_time_to_text(time: NaiveTime) -> String {
    time.format("%H:%M:%S").to_string()
}

/// Parses a clock time, accepting both `HH:MM:SS` and `HH:MM`.
pub fn parse_clock_time(text: &str) -> Option<NaiveTime> {
    CLOCK_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(text, fmt).ok())
}

/// Formats an elapsed duration as `HH:MM:SS`. Negative durations render as zero.
pub fn format_duration(duration: Duration) -> String {
    let total_seconds = duration.num_seconds().max(0);
    format!(
        "{:02}:{:02}:{:02}",
        total_seconds / 3600,
        (total_seconds % 3600) / 60,
        total_seconds % 60
    )
}
