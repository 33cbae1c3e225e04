//! Pure formatting helpers shared by every caller of the facade

const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Format a byte count with 1024-based units and two decimals
///
/// `1024` formats as `"1.00 KB"`, `1023` as `"1023.00 B"`. Values beyond
/// the terabyte range stay in TB.
pub fn format_bytes(bytes: u64) -> String {
    let mut size = bytes as f64;
    let mut order = 0;
    while size >= 1024.0 && order < UNITS.len() - 1 {
        order += 1;
        size /= 1024.0;
    }
    format!("{:.2} {}", size, UNITS[order])
}

/// Percentage of `total` that is in use, 0.0 when the capacity is unknown
pub fn usage_percent(total: u64, free: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let used = total.saturating_sub(free);
    (used as f64 / total as f64) * 100.0
}

/// Format uptime seconds as `"{d}d {h}h {m}m {s}s"`
pub fn format_uptime(seconds: u64) -> String {
    let days = seconds / 86400;
    let hours = (seconds % 86400) / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    format!("{}d {}h {}m {}s", days, hours, minutes, secs)
}

/// Flatten line breaks and cut a message to `max_chars` characters
///
/// Truncated text ends with `...`; the cut never splits a UTF-8 character.
pub fn summarize(message: &str, max_chars: usize) -> String {
    let flat = message.replace("\r\n", " ").replace(['\n', '\r'], " ");
    if flat.chars().count() <= max_chars {
        return flat;
    }
    let mut cut: String = flat.chars().take(max_chars).collect();
    cut.push_str("...");
    cut
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes_boundaries() {
        assert_eq!(format_bytes(0), "0.00 B");
        assert_eq!(format_bytes(1023), "1023.00 B");
        assert_eq!(format_bytes(1024), "1.00 KB");
        assert_eq!(format_bytes(1024 * 1024 * 5), "5.00 MB");
        assert_eq!(format_bytes(1536), "1.50 KB");
    }

    #[test]
    fn test_format_bytes_caps_at_terabytes() {
        let five_pb = 5 * 1024u64.pow(5);
        assert_eq!(format_bytes(five_pb), "5120.00 TB");
    }

    #[test]
    fn test_usage_percent() {
        assert_eq!(usage_percent(1000, 250), 75.0);
        assert_eq!(usage_percent(1000, 1000), 0.0);
        assert_eq!(usage_percent(0, 0), 0.0);
        // free larger than total must not underflow
        assert_eq!(usage_percent(100, 200), 0.0);
    }

    #[test]
    fn test_format_uptime() {
        assert_eq!(format_uptime(0), "0d 0h 0m 0s");
        assert_eq!(format_uptime(59), "0d 0h 0m 59s");
        assert_eq!(format_uptime(90061), "1d 1h 1m 1s");
    }

    #[test]
    fn test_summarize() {
        assert_eq!(summarize("short", 80), "short");
        assert_eq!(summarize("line one\r\nline two\nend", 80), "line one line two end");
        assert_eq!(summarize("abcdefgh", 4), "abcd...");
        assert_eq!(summarize("ééééé", 2), "éé...");
    }
}
