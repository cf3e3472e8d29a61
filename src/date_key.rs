use chrono::{Datelike, NaiveDate};
use serde::Serialize;

/// First day the scraped corpus covers. The picker never offers earlier dates.
pub const MIN_SUPPORTED_DATE: NaiveDate = match NaiveDate::from_ymd_opt(2024, 9, 14) {
    Some(date) => date,
    None => panic!("invalid minimum date"),
};

pub(crate) const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateLabel {
    pub month: &'static str,
    pub day: u32,
}

impl std::fmt::Display for DateLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.month, self.day)
    }
}

/// Builds the document key for a day: day, month and year concatenated
/// without separators or padding.
///
/// Expects `date >= MIN_SUPPORTED_DATE`; the range is not checked here.
/// Note that distinct dates can share a key (1 Dec vs 11 Feb of the same year).
pub fn resolve_key(date: NaiveDate) -> String {
    format!("{}{}{}", date.day(), date.month(), date.year())
}

pub fn resolve_label(date: NaiveDate) -> DateLabel {
    DateLabel {
        month: MONTHS[date.month0() as usize],
        day: date.day(),
    }
}

pub fn document_path(key: &str) -> String {
    format!("days/{key}")
}

pub fn parse_date(value: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
}

pub fn is_supported(date: NaiveDate) -> bool {
    date >= MIN_SUPPORTED_DATE
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn key_concatenates_without_padding() {
        assert_eq!(resolve_key(ymd(2024, 9, 14)), "1492024");
        assert_eq!(resolve_key(ymd(2025, 1, 5)), "512025");
        assert_eq!(resolve_key(ymd(2024, 12, 31)), "31122024");
    }

    #[test]
    fn key_is_deterministic() {
        let date = ymd(2025, 3, 7);
        assert_eq!(resolve_key(date), resolve_key(ymd(2025, 3, 7)));
    }

    #[test]
    fn ambiguous_dates_share_a_key() {
        assert_eq!(resolve_key(ymd(2025, 12, 1)), resolve_key(ymd(2025, 2, 11)));
    }

    #[test]
    fn label_uses_month_name() {
        let label = resolve_label(ymd(2024, 9, 14));
        assert_eq!(label.month, "September");
        assert_eq!(label.day, 14);
        assert_eq!(label.to_string(), "September 14");
    }

    #[test]
    fn parse_accepts_iso_dates_only() {
        assert_eq!(parse_date(" 2024-10-02 ").unwrap(), ymd(2024, 10, 2));
        assert!(parse_date("02/10/2024").is_err());
        assert!(parse_date("2024-02-30").is_err());
    }

    #[test]
    fn minimum_date_boundary() {
        assert!(is_supported(MIN_SUPPORTED_DATE));
        assert!(!is_supported(ymd(2024, 9, 13)));
        assert_eq!(document_path("1492024"), "days/1492024");
    }
}
