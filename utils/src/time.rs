//! Time formatting helpers for log lines and replay output.

use tally_types::Timestamp;

/// Format a span of seconds with its two most significant units.
pub fn format_duration(secs: u64) -> String {
    const UNITS: [(u64, &str); 4] = [(86_400, "d"), (3_600, "h"), (60, "m"), (1, "s")];

    let Some(lead) = UNITS.iter().position(|(size, _)| secs >= *size) else {
        return "0s".to_string();
    };
    let (size, name) = UNITS[lead];
    match UNITS.get(lead + 1) {
        Some((next, next_name)) => {
            format!("{}{} {}{}", secs / size, name, (secs % size) / next, next_name)
        }
        None => format!("{}{}", secs, name),
    }
}

/// Describe a voting deadline relative to `now`.
pub fn describe_deadline(deadline: Timestamp, now: Timestamp) -> String {
    if deadline.has_passed(now) {
        format!("closed {} ago", format_duration(now.remaining_from(deadline)))
    } else {
        format!("closes in {}", format_duration(deadline.remaining_from(now)))
    }
}
