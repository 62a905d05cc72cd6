use chrono::{DateTime, Local, Utc};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Format a UTC timestamp in local time as "Mar 04, 2026 21:15"
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%b %d, %Y %H:%M").to_string()
}

/// Like `format_timestamp`, with a placeholder for "never"
pub fn format_optional(ts: Option<&DateTime<Utc>>) -> String {
    ts.map(format_timestamp)
        .unwrap_or_else(|| "not yet".to_string())
}

/// Format a day count with one decimal: "2.5 days"
pub fn format_days(days: f64) -> String {
    if (days - 1.0).abs() < 0.05 {
        "1.0 day".to_string()
    } else {
        format!("{:.1} days", days)
    }
}

/// Create a simple ASCII progress bar
pub fn progress_bar(filled: u32, total: u32, width: usize) -> String {
    if total == 0 {
        return "░".repeat(width);
    }
    let ratio = (filled as f64 / total as f64).min(1.0);
    let filled_count = (ratio * width as f64).round() as usize;
    let empty_count = width.saturating_sub(filled_count);
    format!("{}{}", "█".repeat(filled_count), "░".repeat(empty_count))
}

/// Pad or truncate to exactly `width` terminal columns.
/// Names can be any script, so measure display width rather than chars.
pub fn fit_width(s: &str, width: usize) -> String {
    if s.width() <= width {
        return format!("{}{}", s, " ".repeat(width - s.width()));
    }
    let mut out = String::new();
    let mut used = 0;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    used += 1;
    out.push_str(&" ".repeat(width.saturating_sub(used)));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_widths() {
        assert_eq!(progress_bar(0, 30, 10), "░░░░░░░░░░");
        assert_eq!(progress_bar(15, 30, 10), "█████░░░░░");
        assert_eq!(progress_bar(30, 30, 10), "██████████");
        assert_eq!(progress_bar(3, 0, 4), "░░░░");
    }

    #[test]
    fn fit_width_pads_and_truncates() {
        assert_eq!(fit_width("Ali", 6), "Ali   ");
        assert_eq!(fit_width("Abdurrahman", 6), "Abdur…");
        // wide characters take two columns each
        let fitted = fit_width("日本語の名前", 6);
        assert_eq!(fitted.width(), 6);
        assert!(fitted.ends_with('…') || fitted.ends_with(' '));
    }

    #[test]
    fn day_formatting() {
        assert_eq!(format_days(1.0), "1.0 day");
        assert_eq!(format_days(2.46), "2.5 days");
        assert_eq!(format_days(0.3), "0.3 days");
    }
}
