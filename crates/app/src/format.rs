/// Session clock: `m:ss`.
pub fn clock(elapsed_ms: u64) -> String {
    let minutes = elapsed_ms / 60_000;
    let seconds = (elapsed_ms % 60_000) / 1_000;
    format!("{minutes}:{seconds:02}")
}

/// Accumulated study time: `0m`, `<n>m` or `<h>h <m>m`.
pub fn total_time(total_ms: u64) -> String {
    let total_minutes = total_ms / 60_000;
    if total_minutes < 60 {
        return format!("{total_minutes}m");
    }
    format!("{}h {}m", total_minutes / 60, total_minutes % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_pads_seconds() {
        assert_eq!(clock(0), "0:00");
        assert_eq!(clock(9_999), "0:09");
        assert_eq!(clock(61_000), "1:01");
        assert_eq!(clock(3_600_000), "60:00");
    }

    #[test]
    fn total_time_switches_to_hours() {
        assert_eq!(total_time(0), "0m");
        assert_eq!(total_time(59_999), "0m");
        assert_eq!(total_time(59 * 60_000), "59m");
        assert_eq!(total_time(60 * 60_000), "1h 0m");
        assert_eq!(total_time(135 * 60_000 + 5_000), "2h 15m");
    }
}
