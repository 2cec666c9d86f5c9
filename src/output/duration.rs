//! Coarse human-readable durations for the runtime table.

/// Seconds per day.
const DAY: f64 = 86_400.0;

/// Seconds per hour.
const HOUR: u64 = 3_600;

/// Durations of at least this many seconds are shown in days.
pub const DAYS_DISPLAY_THRESHOLD: f64 = 4.0 * DAY;

/// Rounding units, largest first.
const ROUNDING_UNITS: [f64; 2] = [DAYS_DISPLAY_THRESHOLD, 1.0];

/// Truncate a duration to the largest rounding unit it exceeds.
///
/// Durations above four days become whole multiples of four days, anything
/// above one second becomes whole seconds, and smaller values pass through.
/// The result never exceeds the input.
pub fn round_duration(seconds: f64) -> f64 {
    for unit in ROUNDING_UNITS {
        if seconds > unit {
            // fmod is exact, so the difference is an exact multiple of `unit`.
            return seconds - seconds % unit;
        }
    }
    seconds
}

/// Render a duration given in seconds.
///
/// - at least four days: `"<d> days"`
/// - below one hour: `"<m>m <ss>s"`
/// - otherwise: `"<h>h <mm>m"` with minutes rounded
///
/// Negative and NaN inputs render as zero.
pub fn format_duration(seconds: f64) -> String {
    let seconds = if seconds.is_nan() { 0.0 } else { seconds.max(0.0) };

    let days = (seconds / DAY).floor();
    if seconds >= DAYS_DISPLAY_THRESHOLD {
        return format!("{} days", days as u64);
    }

    // Whole seconds within the last day.
    let secs = (seconds - days * DAY).floor() as u64;
    let hours = secs / HOUR;
    let total_hours = 24 * days as u64 + hours;
    let rest = secs - HOUR * hours;

    if total_hours == 0 {
        format!("{}m {:02}s", rest / 60, rest % 60)
    } else {
        let minutes = (rest as f64 / 60.0).round_ties_even() as u64;
        format!("{}h {:02}m", total_hours, minutes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to_four_days() {
        let rounded = round_duration(400_000.0);
        assert_eq!(rounded, 345_600.0);
        assert_eq!(format_duration(rounded), "4 days");

        assert_eq!(round_duration(1_000_000.0), 2.0 * 345_600.0);
        assert_eq!(format_duration(round_duration(1_000_000.0)), "8 days");
    }

    #[test]
    fn test_round_to_seconds() {
        assert_eq!(round_duration(125.7), 125.0);
        assert_eq!(round_duration(345_600.0), 345_600.0);
        assert_eq!(round_duration(0.5), 0.5);
        assert_eq!(round_duration(0.0), 0.0);
    }

    #[test]
    fn test_minutes_and_seconds() {
        assert_eq!(format_duration(125.0), "2m 05s");
        assert_eq!(format_duration(0.0), "0m 00s");
        assert_eq!(format_duration(59.9), "0m 59s");
        assert_eq!(format_duration(3599.0), "59m 59s");
    }

    #[test]
    fn test_hours_and_minutes() {
        assert_eq!(format_duration(5000.0), "1h 23m");
        assert_eq!(format_duration(3600.0), "1h 00m");
        // 1 day, 2 hours, 3 minutes
        assert_eq!(format_duration(DAY + 2.0 * 3600.0 + 180.0), "26h 03m");
        // Just below the days display threshold.
        assert_eq!(format_duration(DAYS_DISPLAY_THRESHOLD - 60.0), "95h 59m");
    }

    #[test]
    fn test_minute_rounding_is_half_even() {
        // 1h 0m 30s -> 0.5 min rounds to 0; 1h 1m 30s -> 1.5 rounds to 2.
        assert_eq!(format_duration(3630.0), "1h 00m");
        assert_eq!(format_duration(3690.0), "1h 02m");
        assert_eq!(format_duration(3650.0), "1h 01m");
    }

    #[test]
    fn test_degenerate_inputs() {
        assert_eq!(format_duration(-5.0), "0m 00s");
        assert_eq!(format_duration(f64::NAN), "0m 00s");
    }
}
