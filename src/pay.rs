//! The paycheck pipeline, where every income event is merged and finalized.

use crate::config::Config;
use crate::error::{ErrorType, IntoResult, Res};
use crate::model::{Details, Income, RsuDetails, SupplementalDetails};
use crate::tax::{federal, medicare, social_security};
use crate::{espp, salary, savings, Result};
use anyhow::Context;
use chrono::NaiveDate;
use tracing::{debug, trace};

/// The forecast ledger for a year: every income event in date order with all deductions, taxes
/// and year-to-date totals computed.
#[derive(Debug, Clone, PartialEq)]
pub struct Pay {
    income: Vec<Income>,
}

impl Pay {
    /// Runs the pipeline for `config`.
    ///
    /// `today` splits the 401(k) windows so the schedule can be rebalanced during the year, and
    /// `spot` is the current share price when one was needed and fetched.
    ///
    /// The stages run in a fixed order, each a single pass over the events:
    ///
    /// - salary paychecks, then ESPP withholding and purchases
    /// - merge with supplemental and RSU income, and sort by date
    /// - year-to-date gross
    /// - personal exemption
    /// - 401(k) pre-tax then post-tax savings
    /// - federal deductions
    /// - federal, Medicare and Social Security taxes
    /// - net pay
    pub fn new(config: &Config, today: NaiveDate, spot: Option<f64>) -> Result<Self> {
        let mut salary = salary::generate(config).pub_result(ErrorType::Config)?;
        let purchases = espp::allocate(config, &mut salary, spot).pub_result(ErrorType::Config)?;
        let supplemental = supplemental(config);
        let rsu = rsu(config, spot).pub_result(ErrorType::Config)?;

        let mut income = salary;
        income.extend(purchases);
        income.extend(supplemental);
        income.extend(rsu);
        // Stable, so same-day events stay in merge order.
        income.sort_by_key(|i| i.date);
        debug!("Merged {} income events", income.len());

        ytd_gross(&mut income);
        personal_exemption(config, &mut income);
        savings::apply(config, &mut income, today)?;
        federal_deductions(&mut income);
        federal::apply(config, &mut income);
        medicare::apply(config, &mut income);
        social_security::apply(config, &mut income);
        net(config, &mut income);

        for i in &income {
            trace!("{i}");
            i.validate().pub_result(ErrorType::Invariant)?;
        }
        if let Ok(json) = serde_json::to_string_pretty(&income) {
            debug!("Income ledger:\n\n{json}\n\n");
        }
        Ok(Self { income })
    }

    /// Every income event in date order.
    pub fn income(&self) -> &[Income] {
        &self.income
    }

    /// The salary pay dates.
    pub fn pay_periods(&self) -> Vec<NaiveDate> {
        self.income
            .iter()
            .filter(|i| i.is_salary())
            .map(|i| i.date)
            .collect()
    }
}

fn supplemental(config: &Config) -> Vec<Income> {
    config
        .income()
        .supplemental
        .iter()
        .map(|s| {
            Income::new(
                s.date,
                s.gross.as_f64(),
                Details::Supplemental(SupplementalDetails {
                    label: s.kind.clone(),
                    percent_tax_federal: manual_percent(s.percent_tax_federal),
                }),
            )
        })
        .collect()
}

/// RSU vests, dated when they show up on a paystub. The price is the vest's own, the configured
/// stock price, or the spot price, in that order.
fn rsu(config: &Config, spot: Option<f64>) -> Res<Vec<Income>> {
    let mut income = Vec::with_capacity(config.income().rsu.len());
    for vest in &config.income().rsu {
        let price = vest
            .price
            .or(config.stock().price)
            .or(spot)
            .with_context(|| {
                format!(
                    "no price for the RSU vest on {}, set a price for it or a stock price",
                    vest.date
                )
            })?;
        income.push(Income::new(
            vest.paystub_date()?,
            vest.quantity * price,
            Details::Rsu(RsuDetails {
                quantity: vest.quantity,
                vest_price: price,
                percent_tax_federal: manual_percent(vest.percent_tax_federal),
            }),
        ));
    }
    Ok(income)
}

fn manual_percent(percent: f64) -> Option<f64> {
    (percent > 0.0).then_some(percent)
}

fn ytd_gross(income: &mut [Income]) {
    let mut rsu_remaining: f64 = income
        .iter()
        .filter_map(|i| match &i.details {
            Details::Rsu(r) => Some(r.quantity),
            _ => None,
        })
        .sum();
    let (mut rsu_vested, mut gross, mut gross_supplemental, mut espp) = (0.0, 0.0, 0.0, 0.0);
    for income in income.iter_mut() {
        match &income.details {
            Details::Salary(_) => {
                gross += income.gross;
                espp = income.ytd.espp;
            }
            Details::Rsu(r) => {
                rsu_remaining -= r.quantity;
                rsu_vested += r.quantity;
                gross_supplemental += income.gross;
            }
            Details::Supplemental(_) | Details::Espp(_) => gross_supplemental += income.gross,
        }
        income.ytd.gross = gross;
        income.ytd.gross_supplemental = gross_supplemental;
        income.ytd.gross_total = gross + gross_supplemental;
        income.ytd.rsu_quantity_remaining = rsu_remaining.max(0.0);
        income.ytd.rsu_quantity_vested = rsu_vested;
        income.ytd.espp = espp;
    }
}

/// Splits the annual personal exemption evenly across the salary paychecks.
fn personal_exemption(config: &Config, income: &mut [Income]) {
    let count = income.iter().filter(|i| i.is_salary()).count();
    if count == 0 {
        return;
    }
    let share = config.federal().personal_exemption.as_f64() / count as f64;
    for details in income.iter_mut().filter_map(|i| i.salary_details_mut()) {
        details.personal_exemption = share;
    }
}

/// Pre-tax deductions and federal taxable wages. Must run after 401(k) savings.
fn federal_deductions(income: &mut [Income]) {
    let mut ytd = [0.0; 7];
    for income in income.iter_mut() {
        let benefits = match income.salary_details() {
            Some(s) => [
                s.term_life,
                s.fsa,
                s.hsa,
                s.medical,
                s.dental,
                s.vision,
                s.vacation_buy,
            ],
            None => [0.0; 7],
        };
        income.deductions = income.contrib_401k() + benefits[1..].iter().sum::<f64>();
        income.federal_taxable = income.gross - income.deductions;
        for (total, amount) in ytd.iter_mut().zip(benefits) {
            *total += amount;
        }
        let [term_life, fsa, hsa, medical, dental, vision, vacation_buy] = ytd;
        let y = &mut income.ytd;
        y.term_life = term_life;
        y.fsa = fsa;
        y.hsa = hsa;
        y.medical = medical;
        y.dental = dental;
        y.vision = vision;
        y.vacation_buy = vacation_buy;
    }
}

/// Net pay and its year-to-date totals. The configured fudge is added to the first paycheck.
fn net(config: &Config, income: &mut [Income]) {
    let mut fudge = config.pay().start_net_fudge.map(|f| f.as_f64());
    let (mut ytd, mut ytd_supplemental) = (0.0, 0.0);
    for income in income.iter_mut() {
        income.calc_net();
        if income.is_salary() {
            if let Some(fudge) = fudge.take() {
                income.net += fudge;
            }
            ytd += income.net;
        } else {
            ytd_supplemental += income.net;
        }
        income.ytd.net = ytd;
        income.ytd.net_supplemental = ytd_supplemental;
        income.ytd.net_total = ytd + ytd_supplemental;
    }
}
