//! Number and date formatting for printed invoices (fr-FR conventions).

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Round to a whole amount and group thousands with a space: `1234567` -> `1 234 567`.
///
/// No currency symbol is added; callers append the currency label.
pub fn format_amount(value: f64) -> String {
    let rounded = value.round() as i64;
    format_grouped_int(rounded)
}

fn format_grouped_int(value: i64) -> String {
    let negative = value < 0;
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            out.push(' ');
        }
        out.push(ch);
    }

    let mut grouped: String = out.chars().rev().collect();
    if negative {
        grouped.insert(0, '-');
    }
    grouped
}

/// Fixed number of decimals, e.g. kWh with 2 places and unit price with 4.
pub fn format_decimal(value: f64, places: usize) -> String {
    format!("{:.*}", places, value)
}

/// Meter readings as entered: whole values without decimals, others in shortest form.
pub fn format_reading(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// `dd/mm/yyyy`, taken from the UTC calendar date.
pub fn format_date(date: &DateTime<Utc>) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Parse the timestamp shapes the API emits: RFC 3339, naive ISO datetime, or a bare date.
pub fn parse_date(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amounts_are_grouped_by_thousands() {
        assert_eq!(format_amount(1234567.0), "1 234 567");
        assert_eq!(format_amount(13000.0), "13 000");
        assert_eq!(format_amount(999.0), "999");
        assert_eq!(format_amount(0.0), "0");
    }

    #[test]
    fn amounts_are_rounded_to_whole_units() {
        assert_eq!(format_amount(1499.6), "1 500");
        assert_eq!(format_amount(-2500.2), "-2 500");
    }

    #[test]
    fn decimals_are_fixed() {
        assert_eq!(format_decimal(120.0, 2), "120.00");
        assert_eq!(format_decimal(125.0, 4), "125.0000");
    }

    #[test]
    fn readings_drop_trailing_zeroes() {
        assert_eq!(format_reading(1104.0), "1104");
        assert_eq!(format_reading(1104.5), "1104.5");
    }

    #[test]
    fn dates_use_day_month_year() {
        let date = parse_date("2024-03-05T00:00:00Z").unwrap();
        assert_eq!(format_date(&date), "05/03/2024");
    }

    #[test]
    fn dates_accept_api_variants() {
        let with_millis = parse_date("2024-11-30T23:15:00.000Z").unwrap();
        assert_eq!(format_date(&with_millis), "30/11/2024");

        let bare = parse_date("2025-01-09").unwrap();
        assert_eq!(format_date(&bare), "09/01/2025");

        let offset = parse_date("2024-03-05T01:00:00+02:00").unwrap();
        assert_eq!(format_date(&offset), "04/03/2024");

        assert!(parse_date("not a date").is_none());
    }
}
