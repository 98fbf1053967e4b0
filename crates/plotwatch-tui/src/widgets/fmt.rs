//! Human-readable formatting for table cells.

use chrono::{DateTime, Duration, Utc};

/// Shorten a plot id to `first10…last10`. Ids shorter than 20 chars
/// render empty -- they are placeholders, not real ids.
pub fn shorten_id(id: &str) -> String {
    let chars: Vec<char> = id.chars().collect();
    if chars.len() < 20 {
        return String::new();
    }
    let head: String = chars[..10].iter().collect();
    let tail: String = chars[chars.len() - 10..].iter().collect();
    format!("{head}…{tail}")
}

/// Format available bytes as a compact capacity (e.g., "1.8TB", "245GB").
/// `u64::MAX` is the "no longer advertised" sentinel and renders as "-".
pub fn fmt_capacity(bytes: u64) -> String {
    if bytes == u64::MAX {
        return "-".into();
    }
    #[allow(clippy::cast_precision_loss, clippy::as_conversions)]
    let b = bytes as f64;
    if bytes >= 1_000_000_000_000 {
        format!("{:.1}TB", b / 1e12)
    } else if bytes >= 1_000_000_000 {
        format!("{:.1}GB", b / 1e9)
    } else if bytes >= 1_000_000 {
        format!("{}MB", bytes / 1_000_000)
    } else if bytes >= 1_000 {
        format!("{}KB", bytes / 1_000)
    } else {
        format!("{bytes}B")
    }
}

/// Format a duration in compact human units ("2d3h", "4h23m", "12m5s").
pub fn fmt_duration(d: Duration) -> String {
    let secs = d.num_seconds().max(0);
    let days = secs / 86_400;
    let hours = (secs % 86_400) / 3_600;
    let mins = (secs % 3_600) / 60;
    let rest = secs % 60;

    if days > 0 {
        format!("{days}d{hours}h")
    } else if hours > 0 {
        format!("{hours}h{mins}m")
    } else if mins > 0 {
        format!("{mins}m{rest}s")
    } else {
        format!("{rest}s")
    }
}

/// Format an optional timestamp, or "-" when the boundary has not been
/// reached.
pub fn fmt_time(ts: Option<DateTime<Utc>>) -> String {
    ts.map_or_else(|| "-".into(), |t| t.format("%Y-%m-%d %H:%M:%S").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shorten_id_formats_long_ids_only() {
        assert_eq!(shorten_id("0123456789abcdefghij"), "0123456789…abcdefghij");
        assert_eq!(shorten_id("0123456789abcdefghijklmno"), "0123456789…fghijklmno");
        assert_eq!(shorten_id("short"), "");
        assert_eq!(shorten_id(""), "");
    }

    #[test]
    fn capacity_units_and_sentinel() {
        assert_eq!(fmt_capacity(u64::MAX), "-");
        assert_eq!(fmt_capacity(0), "0B");
        assert_eq!(fmt_capacity(512), "512B");
        assert_eq!(fmt_capacity(8_000), "8KB");
        assert_eq!(fmt_capacity(245_000_000_000), "245.0GB");
        assert_eq!(fmt_capacity(1_800_000_000_000), "1.8TB");
    }

    #[test]
    fn duration_units_collapse() {
        assert_eq!(fmt_duration(Duration::seconds(0)), "0s");
        assert_eq!(fmt_duration(Duration::seconds(45)), "45s");
        assert_eq!(fmt_duration(Duration::seconds(12 * 60 + 5)), "12m5s");
        assert_eq!(fmt_duration(Duration::seconds(4 * 3600 + 23 * 60)), "4h23m");
        assert_eq!(fmt_duration(Duration::seconds(2 * 86_400 + 3 * 3600)), "2d3h");
        assert_eq!(fmt_duration(Duration::seconds(-5)), "0s");
    }
}
