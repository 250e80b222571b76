//! Social Security tax.

use crate::config::Config;
use crate::model::Income;

/// Sets the Social Security tax on every event, stopping once the year-to-date tax reaches the
/// tax on the wage cap.
pub(crate) fn apply(config: &Config, income: &mut [Income]) {
    let social = config.social_security();
    let percent = social.percent / 100.0;
    let tax_max = social.cap.as_f64() * percent;
    let mut ytd = 0.0;
    for income in income.iter_mut() {
        let mut tax = income.fica_wages() * percent;
        if tax + ytd > tax_max {
            tax = (tax_max - ytd).max(0.0);
        }
        ytd += tax;
        income.tax_social = tax;
        income.ytd.tax_social = ytd;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SalaryDetails;
    use crate::test::config_with;
    use chrono::NaiveDate;
    use serde_json::json;

    #[test]
    fn test_wage_cap() {
        let config = config_with(|v| v["social_security"]["cap"] = json!(10000));
        let mut income: Vec<Income> = (1..=4)
            .map(|m| {
                Income::salary(
                    NaiveDate::from_ymd_opt(2024, m, 15).unwrap(),
                    4000.0,
                    SalaryDetails {
                        vacation_buy: 100.0,
                        ..SalaryDetails::default()
                    },
                )
            })
            .collect();
        apply(&config, &mut income);

        // 3900 of wages per paycheck at 6.2%.
        assert!((income[0].tax_social - 241.8).abs() < 1e-9);
        assert!((income[1].tax_social - 241.8).abs() < 1e-9);
        assert!((income[2].tax_social - (620.0 - 483.6)).abs() < 1e-9);
        assert!(income[3].tax_social < 1e-9);
        assert!((income[3].ytd.tax_social - 620.0).abs() < 1e-9);
        assert!(income.iter().all(|i| i.tax_social >= 0.0));
    }
}
