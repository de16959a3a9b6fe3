//! Small shared helpers: report month parsing and arithmetic

use chrono::{Datelike, Utc};

/// Parse a "YYYY-M" / "YYYY-MM" month parameter
pub fn parse_month(s: &str) -> Option<(i32, u32)> {
    let (year, month) = s.split_once('-')?;
    let year: i32 = year.parse().ok()?;
    let month: u32 = month.parse().ok()?;
    if !(1..=12).contains(&month) {
        return None;
    }
    Some((year, month))
}

/// Current calendar month (UTC)
pub fn current_month() -> (i32, u32) {
    let now = Utc::now();
    (now.year(), now.month())
}

/// The month before the given one, wrapping across year boundaries
pub fn prev_month(year: i32, month: u32) -> (i32, u32) {
    if month == 1 { (year - 1, 12) } else { (year, month - 1) }
}

/// "YYYY-MM" display form
pub fn format_month(year: i32, month: u32) -> String {
    format!("{year}-{month:02}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_month() {
        assert_eq!(parse_month("2025-1"), Some((2025, 1)));
        assert_eq!(parse_month("2025-01"), Some((2025, 1)));
        assert_eq!(parse_month("2025-12"), Some((2025, 12)));
        assert_eq!(parse_month("2025-13"), None);
        assert_eq!(parse_month("2025-0"), None);
        assert_eq!(parse_month("2025"), None);
        assert_eq!(parse_month("garbage"), None);
        assert_eq!(parse_month("2025-xx"), None);
    }

    #[test]
    fn test_prev_month_wraps() {
        assert_eq!(prev_month(2025, 1), (2024, 12));
        assert_eq!(prev_month(2025, 7), (2025, 6));
    }

    #[test]
    fn test_format_month_pads() {
        assert_eq!(format_month(2025, 1), "2025-01");
        assert_eq!(format_month(2025, 11), "2025-11");
    }
}
