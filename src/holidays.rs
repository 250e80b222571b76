//! US Federal Reserve bank holidays.
//!
//! See https://www.chicagofed.org/utilities/about-us/bank-holidays

use crate::error::Res;
use anyhow::{bail, Context};
use chrono::NaiveDate;
use std::collections::BTreeSet;

/// The set of bank holidays for a single year.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct BankHolidays {
    days: BTreeSet<NaiveDate>,
}

impl BankHolidays {
    /// Returns the built-in US bank holidays for `year`.
    pub fn us(year: i32) -> Res<Self> {
        // (month, day) of holidays that move around each year: MLK, Presidents, Memorial, Labor,
        // Columbus and Thanksgiving.
        let floating: [(u32, u32); 6] = match year {
            2024 => [(1, 15), (2, 19), (5, 27), (9, 2), (10, 14), (11, 28)],
            2025 => [(1, 20), (2, 17), (5, 26), (9, 1), (10, 13), (11, 27)],
            2026 => [(1, 19), (2, 16), (5, 25), (9, 7), (10, 12), (11, 26)],
            2027 => [(1, 18), (2, 15), (5, 31), (9, 6), (10, 11), (11, 25)],
            _ => bail!("no bank holiday support for {year}, provide a holidays list"),
        };
        // New Year's, Juneteenth, Independence, Veterans and Christmas
        let fixed: [(u32, u32); 5] = [(1, 1), (6, 19), (7, 4), (11, 11), (12, 25)];
        let mut days = BTreeSet::new();
        for (month, day) in fixed.into_iter().chain(floating) {
            let date = NaiveDate::from_ymd_opt(year, month, day)
                .with_context(|| format!("invalid holiday {year}-{month}-{day}"))?;
            days.insert(date);
        }
        Ok(Self { days })
    }

    /// Uses exactly the given days as the holidays.
    pub fn from_days(days: impl IntoIterator<Item = NaiveDate>) -> Self {
        Self {
            days: days.into_iter().collect(),
        }
    }

    /// Returns true if `date` is a bank holiday.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.days.contains(&date)
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_years_have_eleven_holidays() {
        for year in 2024..=2027 {
            let holidays = BankHolidays::us(year).unwrap();
            assert_eq!(holidays.len(), 11, "year {year}");
            assert!(holidays.contains(NaiveDate::from_ymd_opt(year, 12, 25).unwrap()));
        }
    }

    #[test]
    fn test_thanksgiving_2024() {
        let holidays = BankHolidays::us(2024).unwrap();
        assert!(holidays.contains(NaiveDate::from_ymd_opt(2024, 11, 28).unwrap()));
        assert!(!holidays.contains(NaiveDate::from_ymd_opt(2024, 11, 29).unwrap()));
    }

    #[test]
    fn test_unsupported_year() {
        let err = BankHolidays::us(2031).unwrap_err();
        assert!(err.to_string().contains("2031"));
    }

    #[test]
    fn test_from_days() {
        let day = NaiveDate::from_ymd_opt(2031, 7, 4).unwrap();
        let holidays = BankHolidays::from_days([day]);
        assert!(holidays.contains(day));
        assert!(!holidays.is_empty());
    }
}
