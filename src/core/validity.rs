use crate::utils::error::{BotError, Result};
use chrono::{Days, NaiveDate};

pub const DATE_FORMAT: &str = "%d.%m.%Y";

/// Adds the leading day count of `exp_period` to `issue_date` (`DD.MM.YYYY`).
///
/// `"01.01.2024"` with `"30 дней"` gives `"31.01.2024"`. Negative counts are
/// accepted and move the date backwards.
pub fn calculate_validity(issue_date: &str, exp_period: &str) -> Result<String> {
    let date = parse_issue_date(issue_date)?;
    let days = parse_period_days(exp_period)?;

    let shifted = if days >= 0 {
        date.checked_add_days(Days::new(days.unsigned_abs()))
    } else {
        date.checked_sub_days(Days::new(days.unsigned_abs()))
    };

    shifted
        .map(|d| d.format(DATE_FORMAT).to_string())
        .ok_or_else(|| BotError::PeriodFormat {
            value: exp_period.to_string(),
            reason: "resulting date is out of range".to_string(),
        })
}

pub fn parse_issue_date(value: &str) -> Result<NaiveDate> {
    // chrono accepts unpadded fields and longer years; the layout is strictly DD.MM.YYYY.
    let bytes = value.as_bytes();
    let shape_ok = bytes.len() == 10
        && bytes[2] == b'.'
        && bytes[5] == b'.'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 2 || i == 5 || b.is_ascii_digit());

    if !shape_ok {
        return Err(BotError::DateParse {
            value: value.to_string(),
            reason: "expected DD.MM.YYYY".to_string(),
        });
    }

    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|e| BotError::DateParse {
        value: value.to_string(),
        reason: e.to_string(),
    })
}

pub fn parse_period_days(exp_period: &str) -> Result<i64> {
    let token = exp_period
        .split_whitespace()
        .next()
        .ok_or_else(|| BotError::PeriodFormat {
            value: exp_period.to_string(),
            reason: "no day count given".to_string(),
        })?;

    token.parse::<i64>().map_err(|e| BotError::PeriodFormat {
        value: exp_period.to_string(),
        reason: format!("'{}' is not a number of days: {}", token, e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    #[test]
    fn test_adds_days() {
        assert_eq!(calculate_validity("01.01.2024", "30 days").unwrap(), "31.01.2024");
        assert_eq!(calculate_validity("01.01.2024", "0").unwrap(), "01.01.2024");
        assert_eq!(calculate_validity("15.12.2023", "  20\tдней").unwrap(), "04.01.2024");
    }

    #[test]
    fn test_crosses_leap_day() {
        assert_eq!(calculate_validity("28.02.2024", "1 day").unwrap(), "29.02.2024");
        assert_eq!(calculate_validity("28.02.2023", "1 day").unwrap(), "01.03.2023");
        assert_eq!(calculate_validity("01.01.2024", "366").unwrap(), "01.01.2025");
    }

    #[test]
    fn test_matches_chrono_arithmetic() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        for n in [0u64, 1, 27, 59, 60, 180, 365, 1000] {
            let expected = (start + Days::new(n)).format(DATE_FORMAT).to_string();
            let actual = calculate_validity("01.01.2024", &format!("{} дн.", n)).unwrap();
            assert_eq!(actual, expected, "period {}", n);
        }
    }

    #[test]
    fn test_signed_periods() {
        assert_eq!(calculate_validity("10.01.2024", "-10").unwrap(), "31.12.2023");
        assert_eq!(calculate_validity("10.01.2024", "+5 days").unwrap(), "15.01.2024");
    }

    #[test]
    fn test_rejects_malformed_dates() {
        for date in ["31.13.2024", "2024-01-01", "1.1.2024", "30.02.2024", "", "01.01.24", "01.01.20245"] {
            let err = calculate_validity(date, "30 days").unwrap_err();
            assert!(matches!(err, BotError::DateParse { .. }), "date {:?} gave {:?}", date, err);
        }
    }

    #[test]
    fn test_rejects_non_numeric_period() {
        for period in ["abc days", "", "   ", "30days", "3.5 days"] {
            let err = calculate_validity("01.01.2024", period).unwrap_err();
            assert!(matches!(err, BotError::PeriodFormat { .. }), "period {:?} gave {:?}", period, err);
        }
    }

    #[test]
    fn test_date_checked_before_period() {
        let err = calculate_validity("bad", "abc").unwrap_err();
        assert!(matches!(err, BotError::DateParse { .. }));
    }

    #[test]
    fn test_out_of_range_result() {
        assert_err!(calculate_validity("01.01.2024", "9223372036854775807"));
        assert_ok!(parse_period_days("9223372036854775807"));
    }
}
