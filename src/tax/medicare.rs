//! Medicare tax and the additional Medicare surtax.

use crate::config::Config;
use crate::model::Income;

/// Sets the Medicare tax and surtax on every event. The surtax applies to the portion of wages
/// that takes the year-to-date total past the surtax threshold.
pub(crate) fn apply(config: &Config, income: &mut [Income]) {
    let medicare = config.medicare();
    let cap = medicare.surtax_cap.as_f64() - 0.01;
    let percent = medicare.percent / 100.0;
    let percent_surtax = medicare.surtax_percent / 100.0;
    let (mut ytd, mut ytd_surtax, mut ytd_wages) = (0.0, 0.0, 0.0);
    for income in income.iter_mut() {
        let wages = income.fica_wages();
        let wages_surtax = (ytd_wages + wages - cap).max(0.0).min(wages);
        ytd_wages += wages;
        let tax = wages * percent;
        let surtax = wages_surtax * percent_surtax;
        ytd += tax;
        ytd_surtax += surtax;
        income.tax_medicare = tax;
        income.tax_medicare_surtax = surtax;
        income.ytd.tax_medicare = ytd;
        income.ytd.tax_medicare_surtax = ytd_surtax;
        income.ytd.tax_medicare_total = ytd + ytd_surtax;
    }
}
