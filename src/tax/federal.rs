//! Federal income tax withholding.

use crate::config::Config;
use crate::model::Income;

/// Supplemental income is withheld at 22% until the year-to-date total reaches $1,000,000 and at
/// 37% after that.
const SUPPLEMENTAL_CAP: f64 = 999_999.99;
const SUPPLEMENTAL_LOW: f64 = 0.22;
const SUPPLEMENTAL_HIGH: f64 = 0.37;

/// The semimonthly withholding table, highest threshold first, with rates as fractions.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Brackets {
    table: Vec<(f64, f64)>,
}

impl Brackets {
    pub(crate) fn new(table: impl IntoIterator<Item = (f64, f64)>) -> Self {
        let mut table: Vec<(f64, f64)> = table
            .into_iter()
            .map(|(threshold, percent)| (threshold, percent / 100.0))
            .collect();
        table.sort_by(|a, b| b.0.total_cmp(&a.0));
        Self { table }
    }

    fn from_config(config: &Config) -> Self {
        Self::new(
            config
                .federal()
                .table
                .iter()
                .map(|(threshold, percent)| (threshold.as_f64(), *percent)),
        )
    }

    /// Returns the tax and the highest marginal rate touched for `amount`.
    pub(crate) fn tax(&self, mut amount: f64) -> (f64, f64) {
        let mut tax = 0.0;
        let mut top = 0.0_f64;
        for &(threshold, percent) in &self.table {
            if amount > threshold {
                top = top.max(percent);
                tax += (amount - threshold) * percent;
                amount = threshold;
            }
        }
        (tax, top)
    }
}

/// Returns the tax and rate for a supplemental payment of `gross` given the supplemental gross
/// paid earlier in the year. A payment that crosses the cap is split into two portions.
pub(crate) fn supplemental_tax(gross: f64, ytd_gross: f64) -> (f64, f64) {
    if ytd_gross + gross <= SUPPLEMENTAL_CAP {
        return (gross * SUPPLEMENTAL_LOW, SUPPLEMENTAL_LOW);
    }
    if ytd_gross > SUPPLEMENTAL_CAP {
        return (gross * SUPPLEMENTAL_HIGH, SUPPLEMENTAL_HIGH);
    }
    let high = ytd_gross + gross - SUPPLEMENTAL_CAP;
    let low = gross - high;
    (
        high * SUPPLEMENTAL_HIGH + low * SUPPLEMENTAL_LOW,
        SUPPLEMENTAL_HIGH,
    )
}

/// Sets the federal tax, rate and year-to-date tax on every event.
///
/// Events with a configured percent use it. Salary uses the withholding table on the taxable
/// amount less the personal exemption, plus any extra withholding. Everything else follows the
/// supplemental rules.
pub(crate) fn apply(config: &Config, income: &mut [Income]) {
    let brackets = Brackets::from_config(config);
    let mut ytd_supplemental = 0.0;
    let mut ytd = 0.0;
    for income in income.iter_mut() {
        let (tax, percent) = match (income.manual_percent_tax_federal(), income.salary_details()) {
            (Some(percent), _) => {
                let percent = percent / 100.0;
                ytd_supplemental += income.gross;
                (income.federal_taxable * percent, percent)
            }
            (None, Some(salary)) => {
                let (tax, percent) =
                    brackets.tax(income.federal_taxable - salary.personal_exemption);
                (tax + salary.withhold, percent)
            }
            (None, None) => {
                let taxes = supplemental_tax(income.gross, ytd_supplemental);
                ytd_supplemental += income.gross;
                taxes
            }
        };
        ytd += tax;
        income.tax_federal = tax;
        income.percent_tax_federal = percent;
        income.ytd.tax_federal = ytd;
    }
}
