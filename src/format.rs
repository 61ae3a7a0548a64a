//! Display formatting for dates, money and item numbers.
//!
//! Output follows the Brazilian conventions the tracker was built around:
//! `dd/MM/yyyy` dates and `R$ 1.234,56` amounts.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

pub const DISPLAY_DATE_FORMAT: &str = "%d/%m/%Y";
pub const INPUT_DATE_FORMAT: &str = "%Y-%m-%d";
pub const DISPLAY_DATETIME_FORMAT: &str = "%d/%m/%Y %H:%M";
pub const GANTT_TICK_FORMAT: &str = "%d/%m";

pub const CURRENCY_SYMBOL: &str = "R$";

/// Parses an ISO-8601 calendar date. Accepts a bare `YYYY-MM-DD` or a full
/// timestamp, of which only the date part is kept. Anything else is `None`.
pub fn parse_iso_date(input: &str) -> Option<NaiveDate> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, INPUT_DATE_FORMAT) {
        return Some(date);
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(timestamp.date_naive());
    }
    NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|timestamp| timestamp.date())
}

pub fn is_date_valid(input: &str) -> bool {
    parse_iso_date(input).is_some()
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DISPLAY_DATE_FORMAT).to_string()
}

/// Formats a raw ISO date for display; invalid input renders as an empty string.
pub fn format_date_str(input: &str) -> String {
    parse_iso_date(input).map(format_date).unwrap_or_default()
}

pub fn format_date_for_input(date: NaiveDate) -> String {
    date.format(INPUT_DATE_FORMAT).to_string()
}

pub fn format_datetime(timestamp: DateTime<Utc>) -> String {
    timestamp.format(DISPLAY_DATETIME_FORMAT).to_string()
}

pub fn format_gantt_tick(date: NaiveDate) -> String {
    date.format(GANTT_TICK_FORMAT).to_string()
}

pub fn format_currency(value: f64) -> String {
    format_currency_with(CURRENCY_SYMBOL, value)
}

pub fn format_currency_with(symbol: &str, value: f64) -> String {
    if !value.is_finite() {
        return format!("{symbol} -");
    }
    let cents = (value.abs() * 100.0).round() as u64;
    let whole = group_thousands(cents / 100);
    let fraction = cents % 100;
    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}{symbol} {whole},{fraction:02}")
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}

/// Left-pads an item number with zeros to three characters.
pub fn format_item_number(item_number: &str) -> String {
    format!("{:0>3}", item_number.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn parses_plain_and_timestamp_dates() {
        assert_eq!(parse_iso_date("2024-01-05"), Some(d(2024, 1, 5)));
        assert_eq!(parse_iso_date(" 2024-01-05 "), Some(d(2024, 1, 5)));
        assert_eq!(parse_iso_date("2024-01-05T10:30:00Z"), Some(d(2024, 1, 5)));
        assert_eq!(parse_iso_date("2024-01-05T10:30:00"), Some(d(2024, 1, 5)));
        assert_eq!(parse_iso_date("2024-02-30"), None);
        assert_eq!(parse_iso_date("not a date"), None);
        assert_eq!(parse_iso_date(""), None);
    }

    #[test]
    fn formats_currency_with_brazilian_separators() {
        assert_eq!(format_currency(0.0), "R$ 0,00");
        assert_eq!(format_currency(2500.0), "R$ 2.500,00");
        assert_eq!(format_currency(1234567.891), "R$ 1.234.567,89");
        assert_eq!(format_currency(-12.5), "-R$ 12,50");
    }

    #[test]
    fn formats_dates_for_display() {
        assert_eq!(format_date(d(2024, 1, 5)), "05/01/2024");
        assert_eq!(format_gantt_tick(d(2024, 1, 5)), "05/01");
        assert_eq!(format_date_str("2024-01-15"), "15/01/2024");
        assert_eq!(format_date_str("garbage"), "");
    }

    #[test]
    fn pads_item_numbers() {
        assert_eq!(format_item_number("1"), "001");
        assert_eq!(format_item_number("42"), "042");
        assert_eq!(format_item_number("1234"), "1234");
    }
}
