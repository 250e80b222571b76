//! Generates the semimonthly salary paychecks for the year.

use crate::config::Config;
use crate::error::Res;
use crate::espp;
use crate::model::{Income, SalaryDetails};
use anyhow::Context;
use chrono::{Datelike, NaiveDate, Weekday};

/// Salary is paid 24 times a year, what the IRS calls "semimonthly".
pub const PAY_PERIODS: usize = 24;

/// Returns the salary pay dates for the configured year: the 15th and the last day of each month,
/// pulled back to the previous business day when they land on a bank holiday or a weekend.
pub(crate) fn pay_dates(config: &Config) -> Res<Vec<NaiveDate>> {
    let mut dates = Vec::with_capacity(PAY_PERIODS);
    for month in 1..=12 {
        for day in [config.day(month, 15)?, last_day_of_month(config.year(), month)?] {
            dates.push(business_day(day, |d| config.bank_holiday(d))?);
        }
    }
    Ok(dates)
}

/// Creates the salary `Income` events, one per pay date, stamped with the per-paycheck benefit
/// deductions, extra withholding and ESPP rate that apply on that date.
pub(crate) fn generate(config: &Config) -> Res<Vec<Income>> {
    let pay = config.pay();
    let base = pay.gross.as_f64();
    let raised = base * (1.0 + pay.increase.percent / 100.0);
    let mut income = Vec::with_capacity(PAY_PERIODS);
    for date in pay_dates(config)? {
        let gross = if date >= config.increase_start() {
            raised
        } else {
            base
        };
        let details = SalaryDetails {
            term_life: pay.term_life.as_f64(),
            hsa: pay.hsa.as_f64(),
            fsa: pay.fsa.as_f64(),
            medical: pay.medical.as_f64(),
            dental: pay.dental.as_f64(),
            vision: pay.vision.as_f64(),
            vacation_buy: pay.vacation_buy.as_f64(),
            withhold: config.withhold_amount(date),
            percent_espp: espp::window_percent(config, date),
            ..SalaryDetails::default()
        };
        income.push(Income::salary(date, gross, details));
    }
    Ok(income)
}

fn last_day_of_month(year: i32, month: u32) -> Res<NaiveDate> {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .with_context(|| format!("no last day for {year}-{month:02}"))
}

fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Steps `date` back one day at a time while it is a holiday, then while it is a weekend. Repeats
/// until both hold, so a Friday holiday behind a weekend keeps moving back.
fn business_day(mut date: NaiveDate, is_holiday: impl Fn(NaiveDate) -> bool) -> Res<NaiveDate> {
    loop {
        let start = date;
        while is_holiday(date) {
            date = date.pred_opt().context("date underflow")?;
        }
        while is_weekend(date) {
            date = date.pred_opt().context("date underflow")?;
        }
        if date == start {
            return Ok(date);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::{config_with, sample_config};
    use proptest::prelude::*;
    use serde_json::json;
    use std::collections::BTreeSet;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    #[test]
    fn test_holiday_then_weekend() {
        let dates = pay_dates(&sample_config()).unwrap();
        assert_eq!(dates.len(), PAY_PERIODS);
        // MLK day is Monday the 15th, pulled back over the weekend.
        assert_eq!(dates[0], date(1, 12));
        assert_eq!(dates[1], date(1, 31));
        // Leap day is a Thursday.
        assert_eq!(dates[3], date(2, 29));
        // Sunday the 31st.
        assert_eq!(dates[5], date(3, 29));
        // Saturday the 15th.
        assert_eq!(dates[10], date(6, 14));
    }

    #[test]
    fn test_raise_applies_from_start_date() {
        let config = sample_config();
        let income = generate(&config).unwrap();
        for i in &income {
            if i.date() < date(4, 1) {
                assert_eq!(i.gross(), 4000.0);
            } else {
                assert!((i.gross() - 4080.0).abs() < 1e-9);
            }
        }
        assert_eq!(income.iter().filter(|i| i.gross() == 4000.0).count(), 6);
    }

    #[test]
    fn test_benefits_and_withholding_stamped() {
        let config = config_with(|v| {
            v["pay"]["hsa"] = json!(50);
            v["pay"]["withhold"] = json!([{"start_date": "2024-06-01", "amount": 25}]);
        });
        let income = generate(&config).unwrap();
        for i in &income {
            let details = i.salary_details().unwrap();
            assert_eq!(details.hsa, 50.0);
            let expected = if i.date() >= date(6, 1) { 25.0 } else { 0.0 };
            assert_eq!(details.withhold, expected);
        }
    }

    #[test]
    fn test_espp_rate_stamped_per_window() {
        let config = config_with(|v| {
            v["pay"]["espp"]["percent_first"] = json!(10);
            v["pay"]["espp"]["percent_third"] = json!(5);
            v["pay"]["espp"]["buy_price"] = json!(20);
        });
        let income = generate(&config).unwrap();
        for i in &income {
            let rate = i.salary_details().unwrap().percent_espp;
            if i.date() <= date(3, 1) {
                assert_eq!(rate, 0.10);
            } else if i.date() <= date(9, 1) {
                assert_eq!(rate, 0.0);
            } else {
                assert_eq!(rate, 0.05);
            }
        }
    }

    proptest! {
        #[test]
        fn business_days_avoid_holidays_and_weekends(
            ordinals in prop::collection::btree_set(1u32..=366, 0..40),
            ordinal in 1u32..=366,
        ) {
            let holidays: BTreeSet<NaiveDate> = ordinals
                .iter()
                .filter_map(|o| NaiveDate::from_yo_opt(2024, *o))
                .collect();
            let start = NaiveDate::from_yo_opt(2024, ordinal).unwrap();
            let day = business_day(start, |d| holidays.contains(&d)).unwrap();
            prop_assert!(day <= start);
            prop_assert!(!is_weekend(day));
            prop_assert!(!holidays.contains(&day));
        }

        #[test]
        fn pay_dates_are_ordered_weekdays(year in 2024i32..=2027) {
            let config = config_with(|v| v["year"] = json!(year));
            let dates = pay_dates(&config).unwrap();
            prop_assert_eq!(dates.len(), PAY_PERIODS);
            for pair in dates.windows(2) {
                prop_assert!(pair[0] < pair[1]);
            }
            for d in dates {
                prop_assert_eq!(d.year(), year);
                prop_assert!(!is_weekend(d));
                prop_assert!(!config.bank_holiday(d));
            }
        }
    }
}
