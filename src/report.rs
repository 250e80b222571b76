//! CSV output: the income ledger and the summary of the inputs that produced it.

use crate::config::Config;
use crate::error::{ErrorType, IntoResult, Res};
use crate::model::{Details, Income, DATE_FORMAT};
use crate::Result;
use anyhow::{anyhow, bail, Context};
use chrono::NaiveDate;
use std::collections::BTreeSet;

/// The ledger columns for one event as `(title, value)` pairs.
fn columns(income: &Income) -> Vec<(&'static str, String)> {
    let num = |v: f64| format!("{v:.4}");
    let salary = income.salary_details().cloned().unwrap_or_default();
    let (rsu_quantity, rsu_vest_price) = match &income.details {
        Details::Rsu(r) => (r.quantity, r.vest_price),
        _ => (0.0, 0.0),
    };
    let (espp_shares, espp_share_price, espp_purchase) = match &income.details {
        Details::Espp(p) => (p.shares, p.share_price, p.purchase),
        _ => (0.0, 0.0, 0.0),
    };
    let ytd = &income.ytd;
    vec![
        ("Pay Date", income.date.format(DATE_FORMAT).to_string()),
        ("Payment Type", income.payment_type()),
        ("Gross Pay", num(income.gross)),
        ("Gross Pay YTD", num(ytd.gross)),
        ("Gross Supplemental YTD", num(ytd.gross_supplemental)),
        ("Gross Total YTD", num(ytd.gross_total)),
        ("Net Pay", num(income.net)),
        ("Net Pay YTD", num(ytd.net)),
        ("Net Supplemental YTD", num(ytd.net_supplemental)),
        ("Net Total YTD", num(ytd.net_total)),
        ("401(k) Contribution", num(salary.contrib_401k)),
        ("401(k) Contribution Percent", num(salary.percent_401k)),
        ("401(k) Contribution YTD", num(ytd.contrib_401k)),
        ("401(k) Company Match", num(salary.contrib_401k_match)),
        ("401(k) Company Match YTD", num(ytd.contrib_401k_match)),
        ("401(k) Post-tax Contribution", num(salary.contrib_401k_post)),
        ("401(k) Post-tax Percent", num(salary.percent_401k_post)),
        ("401(k) Post-tax YTD", num(ytd.contrib_401k_post)),
        ("401(k) Total YTD", num(ytd.contrib_401k_total)),
        ("Federal Tax Deduction", num(income.deductions)),
        ("Federal Personal Exemption", num(salary.personal_exemption)),
        ("Term Life Insurance", num(salary.term_life)),
        ("Term Life Insurance YTD", num(ytd.term_life)),
        ("Flexible Spending Account", num(salary.fsa)),
        ("Flexible Spending Account YTD", num(ytd.fsa)),
        ("Health Savings Account", num(salary.hsa)),
        ("Health Savings Account YTD", num(ytd.hsa)),
        ("Medical Plan", num(salary.medical)),
        ("Medical Plan YTD", num(ytd.medical)),
        ("Dental Plan", num(salary.dental)),
        ("Dental Plan YTD", num(ytd.dental)),
        ("Vision Plan", num(salary.vision)),
        ("Vision Plan YTD", num(ytd.vision)),
        ("Vacation Buy", num(salary.vacation_buy)),
        ("Vacation Buy YTD", num(ytd.vacation_buy)),
        ("ESPP Percent", num(salary.percent_espp)),
        ("ESPP Withholding", num(salary.espp)),
        ("ESPP Withholding YTD", num(ytd.espp)),
        ("ESPP Shares", num(espp_shares)),
        ("ESPP Share Price", num(espp_share_price)),
        ("ESPP Purchase", num(espp_purchase)),
        ("Federal Extra Withholding", num(salary.withhold)),
        ("Federal Taxable Amount", num(income.federal_taxable)),
        ("Federal Tax Percent", num(income.percent_tax_federal)),
        ("Federal Tax", num(income.tax_federal)),
        ("Federal Tax YTD", num(ytd.tax_federal)),
        ("Social Security Tax", num(income.tax_social)),
        ("Social Security Tax YTD", num(ytd.tax_social)),
        ("Medicare Tax", num(income.tax_medicare)),
        ("Medicare Tax YTD", num(ytd.tax_medicare)),
        ("Medicare Surtax", num(income.tax_medicare_surtax)),
        ("Medicare Surtax YTD", num(ytd.tax_medicare_surtax)),
        ("Medicare Tax Total", num(income.tax_medicare_total)),
        ("Medicare Tax Total YTD", num(ytd.tax_medicare_total)),
        ("RSU Quantity", num(rsu_quantity)),
        ("RSU Quantity Vested YTD", num(ytd.rsu_quantity_vested)),
        ("RSU Quantity Remaining YTD", num(ytd.rsu_quantity_remaining)),
        ("RSU Vest Price", num(rsu_vest_price)),
    ]
}

/// Renders the income ledger as CSV, one row per event under a single header row.
///
/// # Errors
/// - `ErrorType::Invariant` if an event's columns do not match the header.
/// - `ErrorType::Io` if the CSV cannot be written.
pub fn ledger(income: &[Income]) -> Result<String> {
    let Some(first) = income.first() else {
        return Ok(String::new());
    };
    let header: Vec<&'static str> = columns(first).into_iter().map(|(title, _)| title).collect();
    let mut rows = Vec::with_capacity(income.len());
    for i in income {
        let (titles, values): (Vec<&'static str>, Vec<String>) = columns(i).into_iter().unzip();
        if titles != header {
            return Err(header_mismatch(&header, &titles)).pub_result(ErrorType::Invariant);
        }
        rows.push(values);
    }
    write_csv(&header, &rows).pub_result(ErrorType::Io)
}

fn header_mismatch(expected: &[&str], found: &[&str]) -> anyhow::Error {
    let expected: BTreeSet<&str> = expected.iter().copied().collect();
    let found: BTreeSet<&str> = found.iter().copied().collect();
    let diff: Vec<&str> = expected.symmetric_difference(&found).copied().collect();
    anyhow!("CSV header mismatch, difference={diff:?}")
}

/// Renders the key/value summary of the run.
pub fn summary(config: &Config, today: NaiveDate, version: &str) -> Result<String> {
    let save = config.save();
    let rows: Vec<Vec<String>> = vec![
        row("Created", today.format(DATE_FORMAT)),
        row("Version", env!("CARGO_PKG_VERSION")),
        row("Year", config.year()),
        row("Salary increase percent", config.pay().increase.percent),
        row(
            "Salary increase start",
            config.increase_start().format(DATE_FORMAT),
        ),
        row("401(k) pre-tax cap", save.cap_pre.as_f64()),
        row("401(k) total cap", save.cap.as_f64()),
        row("401(k) pre-tax start percent", save.percent_pre.start),
        row("401(k) pre-tax increase percent", save.percent_pre.increase),
        row("401(k) pre-tax manual mode", save.percent_pre.is_manual()),
        row("401(k) post-tax start percent", save.percent_post.start),
        row("401(k) post-tax increase percent", save.percent_post.increase),
        row("401(k) post-tax manual mode", save.percent_post.is_manual()),
        row("CFG version", version),
    ];
    write_csv(&["Paystub key", "Value"], &rows).pub_result(ErrorType::Io)
}

fn row(key: &str, value: impl ToString) -> Vec<String> {
    vec![key.to_string(), value.to_string()]
}

fn write_csv<S: AsRef<[u8]>>(header: &[&str], rows: &[Vec<S>]) -> Res<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(header)?;
    for row in rows {
        writer.write_record(row)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow!("Unable to flush CSV: {}", e.error()))?;
    let text = String::from_utf8(bytes).context("CSV is not UTF-8")?;
    if text.is_empty() {
        bail!("CSV is empty");
    }
    Ok(text)
}
