//! Display formatters for quotation figures

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::numeric::round2;

/// Parse a quotation date in any of the shapes the backend sends
///
/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DDTHH:MM:SS` and plain
/// `YYYY-MM-DD` (midnight UTC).
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for pattern in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, pattern) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Group the integer digits with commas
fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Fixed-decimal number with thousands separators
pub fn format_number(value: f64, decimals: usize) -> String {
    let value = if value.is_finite() { value } else { 0.0 };
    let fixed = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };
    let sign = if value < 0.0 && fixed.chars().any(|c| c.is_ascii_digit() && c != '0') {
        "-"
    } else {
        ""
    };
    match frac_part {
        Some(frac) => format!("{}{}.{}", sign, group_thousands(int_part), frac),
        None => format!("{}{}", sign, group_thousands(int_part)),
    }
}

/// Currency amount, e.g. `$1,234.56`
pub fn format_currency(value: f64, symbol: &str) -> String {
    let formatted = format_number(round2(value), 2);
    match formatted.strip_prefix('-') {
        Some(rest) => format!("-{}{}", symbol, rest),
        None => format!("{}{}", symbol, formatted),
    }
}

pub fn format_weight(kg: f64) -> String {
    format!("{} kg", format_number(kg, 2))
}

pub fn format_volume(cubic_meters: f64) -> String {
    format!("{} m³", format_number(cubic_meters, 3))
}

pub fn format_percentage(value: f64) -> String {
    format!("{}%", format_number(value, 2))
}

pub fn format_quantity(value: f64) -> String {
    format_number(value, 0)
}

/// `DD/MM/YYYY`, or `-` when the date cannot be parsed
pub fn format_date(raw: Option<&str>) -> String {
    raw.and_then(parse_date)
        .map(|dt| dt.format("%d/%m/%Y").to_string())
        .unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(1234.5, "$"), "$1,234.50");
        assert_eq!(format_currency(0.0, "$"), "$0.00");
        assert_eq!(format_currency(-99.999, "$"), "-$100.00");
        assert_eq!(format_currency(1_000_000.0, "S/ "), "S/ 1,000,000.00");
    }

    #[test]
    fn test_format_number_grouping() {
        assert_eq!(format_number(999.0, 0), "999");
        assert_eq!(format_number(1000.0, 0), "1,000");
        assert_eq!(format_number(123456.789, 1), "123,456.8");
        assert_eq!(format_number(-0.001, 2), "0.00");
        assert_eq!(format_number(f64::NAN, 2), "0.00");
    }

    #[test]
    fn test_units() {
        assert_eq!(format_weight(12.5), "12.50 kg");
        assert_eq!(format_volume(1.2345), "1.235 m³");
        assert_eq!(format_percentage(12.5), "12.50%");
        assert_eq!(format_quantity(1500.0), "1,500");
    }

    #[test]
    fn test_parse_date_shapes() {
        let rfc = parse_date("2024-03-15T10:30:00Z").unwrap();
        assert_eq!((rfc.year(), rfc.month(), rfc.day(), rfc.hour()), (2024, 3, 15, 10));

        let offset = parse_date("2024-03-15T10:30:00-05:00").unwrap();
        assert_eq!(offset.hour(), 15);

        let spaced = parse_date("2024-03-15 08:00:00").unwrap();
        assert_eq!(spaced.hour(), 8);

        let plain = parse_date("2024-03-15").unwrap();
        assert_eq!(plain.hour(), 0);

        assert!(parse_date("").is_none());
        assert!(parse_date("not a date").is_none());
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date(Some("2024-03-05T10:00:00Z")), "05/03/2024");
        assert_eq!(format_date(Some("garbage")), "-");
        assert_eq!(format_date(None), "-");
    }
}
