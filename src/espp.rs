//! Employee Stock Purchase Program withholding and purchases.
//!
//! There are two purchase dates a year and three withholding windows:
//!
//! - first: Jan 1 to the first purchase date
//! - second: the first purchase date to the second
//! - third: the second purchase date to Dec 31, which purchases next year
//!
//! The IRS cap does not account for the discount the company gives, so the real cap is computed
//! from the IRS cap and the discount. Any carryover from last year adds to the first window.
//! See https://www.naspp.com/blog/ESPP-25000-Limit for the nuances.

use crate::config::Config;
use crate::error::Res;
use crate::model::{Details, EsppPurchase, Income};
use anyhow::bail;
use chrono::NaiveDate;
use tracing::debug;

/// Amounts below half a cent are treated as zero.
const EPSILON: f64 = 0.005;

/// A withholding window, `(start, end]`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Window {
    start: NaiveDate,
    end: NaiveDate,
    /// Withholding rate as a fraction.
    percent: f64,
}

impl Window {
    fn contains(&self, date: NaiveDate) -> bool {
        self.start < date && date <= self.end
    }
}

fn windows(config: &Config) -> Res<[Window; 3]> {
    let espp = &config.pay().espp;
    Ok([
        Window {
            start: config.day(1, 1)?,
            end: config.espp_first(),
            percent: espp.percent_first / 100.0,
        },
        Window {
            start: config.espp_first(),
            end: config.espp_second(),
            percent: espp.percent_second / 100.0,
        },
        Window {
            start: config.espp_second(),
            end: config.day(12, 31)?,
            percent: espp.percent_third / 100.0,
        },
    ])
}

/// The ESPP withholding rate, as a fraction, for a paycheck on `date`.
pub(crate) fn window_percent(config: &Config, date: NaiveDate) -> f64 {
    if !config.espp_active() {
        return 0.0;
    }
    windows(config)
        .ok()
        .and_then(|w| w.into_iter().find(|w| w.contains(date)))
        .map_or(0.0, |w| w.percent)
}

/// The share price used for purchases: the configured fixed price, otherwise the lower of the
/// offering start price and the spot price.
fn buy_price(config: &Config, spot: Option<f64>) -> Res<f64> {
    let espp = &config.pay().espp;
    if let Some(price) = espp.buy_price {
        return Ok(price);
    }
    match (espp.start_price, spot) {
        (Some(start), Some(spot)) => Ok(start.min(spot)),
        (Some(price), None) | (None, Some(price)) => Ok(price),
        (None, None) => bail!("espp buy_price or a stock price is required for purchases"),
    }
}

/// Withholds ESPP contributions from the salary events in `salary` and returns the purchase
/// events for the first two windows. Every salary event is stamped with the year-to-date amount
/// withheld.
pub(crate) fn allocate(
    config: &Config,
    salary: &mut [Income],
    spot: Option<f64>,
) -> Res<Vec<Income>> {
    let espp = &config.pay().espp;
    let discount = espp.percent_discount / 100.0;
    let cap_real = espp.cap_irs.as_f64() * (1.0 - discount);

    let windows = windows(config)?;
    let mut withheld = [0.0; 3];
    let mut ytd = 0.0;
    for (index, window) in windows.iter().enumerate() {
        let mut cap = match index {
            0 => cap_real + espp.carryover.as_f64(),
            1 => cap_real - withheld[0],
            _ => cap_real,
        };
        for income in salary.iter_mut().filter(|i| window.contains(i.date)) {
            let gross = income.gross;
            if let Some(details) = income.salary_details_mut() {
                if window.percent > 0.0 {
                    let amount = (gross * window.percent).min(cap).max(0.0);
                    cap -= amount;
                    details.percent_espp = window.percent;
                    details.espp = amount;
                    withheld[index] += amount;
                    ytd += amount;
                }
            }
            income.ytd.espp = ytd;
        }
    }
    debug!(
        "ESPP withheld {:.2}, {:.2} and {:.2} across the three windows",
        withheld[0], withheld[1], withheld[2]
    );

    let mut purchases = Vec::new();
    for (window, withheld) in windows.iter().zip(withheld).take(2) {
        if withheld < EPSILON {
            continue;
        }
        let price = buy_price(config, spot)?;
        if let Some(purchase) = purchase(window.end, withheld, discount, price) {
            debug!(
                "ESPP purchase on {} at {price:.2}, discount spread {:.2}",
                window.end,
                purchase.gross()
            );
            purchases.push(purchase);
        }
    }
    Ok(purchases)
}

/// Creates a purchase event for the amount withheld in a window. The event's gross is the
/// discount spread, which is taxed as supplemental income. Returns `None` when nothing would be
/// purchased.
fn purchase(date: NaiveDate, withheld: f64, discount: f64, price: f64) -> Option<Income> {
    if price <= 0.0 {
        return None;
    }
    let amount = withheld / (1.0 - discount);
    let shares = (amount / price).floor();
    let purchase = shares * price;
    if purchase < EPSILON {
        return None;
    }
    let spread = purchase * discount;
    if spread < EPSILON {
        return None;
    }
    Some(Income::new(
        date,
        spread,
        Details::Espp(EsppPurchase {
            shares,
            share_price: price,
            purchase,
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::salary;
    use crate::test::config_with;
    use serde_json::json;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    #[test]
    fn test_inactive_espp_withholds_nothing() {
        let config = config_with(|_| {});
        let mut income = salary::generate(&config).unwrap();
        let purchases = allocate(&config, &mut income, None).unwrap();
        assert!(purchases.is_empty());
        assert!(income.iter().all(|i| i.espp() == 0.0 && i.ytd.espp == 0.0));
    }

    #[test]
    fn test_withholding_and_purchases() {
        let config = config_with(|v| {
            v["pay"]["increase"]["percent"] = json!(0);
            v["pay"]["espp"]["percent_first"] = json!(10);
            v["pay"]["espp"]["percent_second"] = json!(10);
            v["pay"]["espp"]["buy_price"] = json!(17);
        });
        let mut income = salary::generate(&config).unwrap();
        let purchases = allocate(&config, &mut income, None).unwrap();

        // Four paychecks before March 1 at $400 each.
        let first: f64 = income
            .iter()
            .filter(|i| i.date() <= date(3, 1))
            .map(|i| i.espp())
            .sum();
        assert_eq!(first, 1600.0);
        assert_eq!(purchases.len(), 2);

        let p = &purchases[0];
        assert_eq!(p.date(), date(3, 1));
        let Details::Espp(details) = &p.details else {
            panic!("expected a purchase");
        };
        // 1600 / 0.85 = 1882.35, which buys 110 shares at 17.
        assert_eq!(details.shares, 110.0);
        assert_eq!(details.purchase, 1870.0);
        assert!((p.gross() - 280.5).abs() < 1e-9);

        // Nothing is withheld after the second purchase date.
        let last = income.last().unwrap();
        assert_eq!(last.espp(), 0.0);
        assert_eq!(last.ytd.espp, income[income.len() - 9].ytd.espp);
    }

    #[test]
    fn test_first_window_cap_includes_carryover() {
        let config = config_with(|v| {
            v["pay"]["increase"]["percent"] = json!(0);
            v["pay"]["espp"]["cap_irs"] = json!(1000);
            v["pay"]["espp"]["carryover"] = json!(100);
            v["pay"]["espp"]["percent_first"] = json!(50);
            v["pay"]["espp"]["buy_price"] = json!(1);
        });
        let mut income = salary::generate(&config).unwrap();
        allocate(&config, &mut income, None).unwrap();
        // Real cap is 850, plus 100 carryover, consumed by the first paycheck.
        assert_eq!(income[0].espp(), 950.0);
        assert_eq!(income[1].espp(), 0.0);
        assert_eq!(income[1].ytd.espp, 950.0);
    }

    #[test]
    fn test_second_window_cap_reduced_by_first() {
        let config = config_with(|v| {
            v["pay"]["increase"]["percent"] = json!(0);
            v["pay"]["espp"]["cap_irs"] = json!(2000);
            v["pay"]["espp"]["percent_first"] = json!(10);
            v["pay"]["espp"]["percent_second"] = json!(50);
            v["pay"]["espp"]["buy_price"] = json!(1);
        });
        let mut income = salary::generate(&config).unwrap();
        allocate(&config, &mut income, None).unwrap();
        // Real cap 1700, the first window withholds 1600, leaving 100 for the second.
        let second: f64 = income
            .iter()
            .filter(|i| i.date() > date(3, 1) && i.date() <= date(9, 1))
            .map(|i| i.espp())
            .sum();
        assert!((second - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_buy_price_uses_lower_of_start_and_spot() {
        let config = config_with(|v| {
            v["pay"]["espp"]["percent_first"] = json!(10);
            v["pay"]["espp"]["start_price"] = json!(30);
        });
        assert_eq!(buy_price(&config, Some(25.0)).unwrap(), 25.0);
        assert_eq!(buy_price(&config, Some(35.0)).unwrap(), 30.0);
        assert_eq!(buy_price(&config, None).unwrap(), 30.0);
    }

    #[test]
    fn test_buy_price_missing() {
        let config = config_with(|v| v["pay"]["espp"]["percent_first"] = json!(10));
        assert!(buy_price(&config, None).is_err());
    }

    #[test]
    fn test_tiny_purchase_is_dropped() {
        assert!(purchase(date(3, 1), 10.0, 0.15, 100.0).is_none());
        assert!(purchase(date(3, 1), 100.0, 0.0, 1.0).is_none());
        assert!(purchase(date(3, 1), 100.0, 0.15, 1.0).is_some());
    }
}
