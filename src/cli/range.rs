use anyhow::{anyhow, Result};
use chrono::{Local, NaiveDate};
use chrono_english::{parse_date_string, Dialect};

/// Parses a range bound like "15/03/2024", "last monday" or "2 weeks ago" into a
/// calendar date. Dates are day/month/year.
pub fn parse_range_date(text: &str) -> Result<NaiveDate> {
    parse_date_string(text, Local::now(), Dialect::Uk)
        .map(|moment| moment.date_naive())
        .map_err(|e| anyhow!("Failed to parse date \"{text}\": {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_dates() {
        assert_eq!(
            parse_range_date("15/03/2024").unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
        );
    }

    #[test]
    fn parses_relative_dates() {
        assert_eq!(
            parse_range_date("yesterday").unwrap(),
            Local::now().date_naive() - chrono::Days::new(1)
        );
    }

    #[test]
    fn rejects_nonsense() {
        assert!(parse_range_date("not a date").is_err());
    }
}
