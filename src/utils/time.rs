use crate::config::HOUR_FORMAT_THRESHOLD_SECS;

/// Formats `seconds` as a zero-padded clock.
///
/// `MM:SS` by default; `H:MM:SS` when the quiz duration (`total_seconds`)
/// is an hour or longer, so the format stays stable while counting down.
pub fn format_clock(seconds: u64, total_seconds: u64) -> String {
    if total_seconds >= HOUR_FORMAT_THRESHOLD_SECS || seconds >= HOUR_FORMAT_THRESHOLD_SECS {
        let hours = seconds / 3600;
        let minutes = (seconds % 3600) / 60;
        let secs = seconds % 60;
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{:02}:{:02}", seconds / 60, seconds % 60)
    }
}
