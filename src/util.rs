use serde::Serializer;
use std::time::Duration;

/// Compact duration label used in logs and error details, e.g. `1h0m0s`, `25m0s`, `42s`.
pub fn format_duration(d: Duration) -> String {
    let total = d.as_secs();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    match (hours, minutes) {
        (0, 0) => format!("{}s", seconds),
        (0, m) => format!("{}m{}s", m, seconds),
        (h, m) => format!("{}h{}m{}s", h, m, seconds),
    }
}

/// Elapsed clock shown while a session runs: whole minutes plus zero padded seconds.
pub fn format_elapsed(d: Duration) -> String {
    let total = d.as_secs();
    format!("{}m{:02}s", total / 60, total % 60)
}

pub fn serialize_duration<S: Serializer>(d: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_duration(*d))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration_minutes() {
        assert_eq!(format_duration(Duration::from_secs(25 * 60)), "25m0s");
        assert_eq!(format_duration(Duration::from_secs(50 * 60 + 7)), "50m7s");
    }

    #[test]
    fn test_format_duration_hours() {
        assert_eq!(format_duration(Duration::from_secs(3600)), "1h0m0s");
        assert_eq!(format_duration(Duration::from_secs(12 * 3600)), "12h0m0s");
        assert_eq!(format_duration(Duration::from_secs(3600 + 61)), "1h1m1s");
    }

    #[test]
    fn test_format_duration_seconds_only() {
        assert_eq!(format_duration(Duration::ZERO), "0s");
        assert_eq!(format_duration(Duration::from_millis(42_900)), "42s");
    }

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(Duration::ZERO), "0m00s");
        assert_eq!(format_elapsed(Duration::from_secs(65)), "1m05s");
        // hours fold into minutes
        assert_eq!(format_elapsed(Duration::from_secs(2 * 3600 + 9)), "120m09s");
    }
}
