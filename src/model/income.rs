//! The `Income` event that flows through every stage of the paycheck pipeline.

use crate::error::Res;
use crate::model::Amount;
use anyhow::{bail, ensure};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// The date format used in all textual output, e.g. `04/15/24`.
pub const DATE_FORMAT: &str = "%m/%d/%y";

/// The kind of a pay event.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncomeKind {
    Salary,
    Rsu,
    Supplemental,
    Espp,
}

serde_plain::derive_display_from_serialize!(IncomeKind);
serde_plain::derive_fromstr_from_deserialize!(IncomeKind);

/// Inputs and 401(k) results that only exist for regular salary paychecks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SalaryDetails {
    /// Imputed cost of employer term life insurance (adds to Medicare/SS wages).
    pub(crate) term_life: f64,
    pub(crate) hsa: f64,
    pub(crate) fsa: f64,
    pub(crate) medical: f64,
    pub(crate) dental: f64,
    pub(crate) vision: f64,
    pub(crate) vacation_buy: f64,
    /// This paycheck's share of the annual federal personal exemption.
    pub(crate) personal_exemption: f64,
    /// Flat extra federal withholding requested by the employee.
    pub(crate) withhold: f64,
    /// ESPP withholding rate as a fraction.
    pub(crate) percent_espp: f64,
    pub(crate) espp: f64,
    /// Pre-tax 401(k) rate as a fraction.
    pub(crate) percent_401k: f64,
    pub(crate) contrib_401k: f64,
    pub(crate) contrib_401k_match: f64,
    /// Post-tax 401(k) rate as a fraction.
    pub(crate) percent_401k_post: f64,
    pub(crate) contrib_401k_post: f64,
}

impl SalaryDetails {
    /// Deductions taken out of the paycheck for benefits, excluding 401(k) and ESPP.
    pub(crate) fn benefits(&self) -> f64 {
        self.fsa + self.hsa + self.medical + self.dental + self.vision + self.vacation_buy
    }

    /// Wages subject to Medicare and Social Security, given the paycheck gross.
    pub(crate) fn fica_wages(&self, gross: f64) -> f64 {
        gross + self.term_life - self.benefits()
    }
}

/// An RSU vest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RsuDetails {
    pub(crate) quantity: f64,
    pub(crate) vest_price: f64,
    /// Federal withholding percent chosen at vest, e.g. `22.0`.
    pub(crate) percent_tax_federal: Option<f64>,
}

/// A bonus, award or other non-salary payment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SupplementalDetails {
    /// Free-form label such as "bonus".
    pub(crate) label: String,
    pub(crate) percent_tax_federal: Option<f64>,
}

/// An ESPP share purchase. The event gross is the discount spread.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EsppPurchase {
    pub(crate) shares: f64,
    pub(crate) share_price: f64,
    pub(crate) purchase: f64,
}

/// The kind-specific payload of an `Income` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Details {
    Salary(SalaryDetails),
    Rsu(RsuDetails),
    Supplemental(SupplementalDetails),
    Espp(EsppPurchase),
}

/// Year-to-date running totals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ytd {
    pub(crate) gross: f64,
    pub(crate) gross_supplemental: f64,
    pub(crate) gross_total: f64,
    pub(crate) net: f64,
    pub(crate) net_supplemental: f64,
    pub(crate) net_total: f64,
    pub(crate) contrib_401k: f64,
    pub(crate) contrib_401k_match: f64,
    pub(crate) contrib_401k_post: f64,
    pub(crate) contrib_401k_total: f64,
    pub(crate) term_life: f64,
    pub(crate) fsa: f64,
    pub(crate) hsa: f64,
    pub(crate) medical: f64,
    pub(crate) dental: f64,
    pub(crate) vision: f64,
    pub(crate) vacation_buy: f64,
    pub(crate) espp: f64,
    pub(crate) tax_federal: f64,
    pub(crate) tax_social: f64,
    pub(crate) tax_medicare: f64,
    pub(crate) tax_medicare_surtax: f64,
    pub(crate) tax_medicare_total: f64,
    pub(crate) rsu_quantity_vested: f64,
    pub(crate) rsu_quantity_remaining: f64,
}

/// One pay-affecting transaction: a paycheck, vest, bonus or ESPP purchase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Income {
    pub(crate) date: NaiveDate,
    pub(crate) gross: f64,
    pub(crate) details: Details,
    /// Pre-tax deductions from federal taxable wages.
    pub(crate) deductions: f64,
    pub(crate) federal_taxable: f64,
    /// The reported federal rate as a fraction.
    pub(crate) percent_tax_federal: f64,
    pub(crate) tax_federal: f64,
    pub(crate) tax_social: f64,
    pub(crate) tax_medicare: f64,
    pub(crate) tax_medicare_surtax: f64,
    pub(crate) tax_medicare_total: f64,
    pub(crate) net: f64,
    pub(crate) ytd: Ytd,
}

impl Income {
    pub(crate) fn new(date: NaiveDate, gross: f64, details: Details) -> Self {
        Self {
            date,
            gross,
            details,
            deductions: 0.0,
            federal_taxable: 0.0,
            percent_tax_federal: 0.0,
            tax_federal: 0.0,
            tax_social: 0.0,
            tax_medicare: 0.0,
            tax_medicare_surtax: 0.0,
            tax_medicare_total: 0.0,
            net: 0.0,
            ytd: Ytd::default(),
        }
    }

    pub(crate) fn salary(date: NaiveDate, gross: f64, details: SalaryDetails) -> Self {
        Self::new(date, gross, Details::Salary(details))
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn kind(&self) -> IncomeKind {
        match self.details {
            Details::Salary(_) => IncomeKind::Salary,
            Details::Rsu(_) => IncomeKind::Rsu,
            Details::Supplemental(_) => IncomeKind::Supplemental,
            Details::Espp(_) => IncomeKind::Espp,
        }
    }

    pub fn is_salary(&self) -> bool {
        matches!(self.details, Details::Salary(_))
    }

    /// The text shown in the "Payment Type" column: the supplemental label when one was given,
    /// otherwise the kind.
    pub fn payment_type(&self) -> String {
        match &self.details {
            Details::Supplemental(s) if !s.label.is_empty() => s.label.clone(),
            _ => self.kind().to_string(),
        }
    }

    pub fn gross(&self) -> f64 {
        self.gross
    }

    pub fn net(&self) -> f64 {
        self.net
    }

    pub fn federal_taxable(&self) -> f64 {
        self.federal_taxable
    }

    pub fn tax_federal(&self) -> f64 {
        self.tax_federal
    }

    pub fn tax_social(&self) -> f64 {
        self.tax_social
    }

    pub fn tax_medicare_total(&self) -> f64 {
        self.tax_medicare_total
    }

    pub fn ytd(&self) -> &Ytd {
        &self.ytd
    }

    pub(crate) fn salary_details(&self) -> Option<&SalaryDetails> {
        match &self.details {
            Details::Salary(s) => Some(s),
            _ => None,
        }
    }

    pub(crate) fn salary_details_mut(&mut self) -> Option<&mut SalaryDetails> {
        match &mut self.details {
            Details::Salary(s) => Some(s),
            _ => None,
        }
    }

    /// The federal withholding percent fixed by configuration for this event, if any.
    pub(crate) fn manual_percent_tax_federal(&self) -> Option<f64> {
        match &self.details {
            Details::Rsu(r) => r.percent_tax_federal,
            Details::Supplemental(s) => s.percent_tax_federal,
            _ => None,
        }
    }

    pub fn contrib_401k(&self) -> f64 {
        self.salary_details().map_or(0.0, |s| s.contrib_401k)
    }

    pub fn contrib_401k_match(&self) -> f64 {
        self.salary_details().map_or(0.0, |s| s.contrib_401k_match)
    }

    pub fn contrib_401k_post(&self) -> f64 {
        self.salary_details().map_or(0.0, |s| s.contrib_401k_post)
    }

    pub fn personal_exemption(&self) -> f64 {
        self.salary_details().map_or(0.0, |s| s.personal_exemption)
    }

    pub fn espp(&self) -> f64 {
        self.salary_details().map_or(0.0, |s| s.espp)
    }

    /// Benefit deductions subtracted from net pay: FSA, HSA, medical, dental, vision, vacation
    /// buy and ESPP withholding.
    pub fn benefit_deductions(&self) -> f64 {
        self.salary_details()
            .map_or(0.0, |s| s.benefits() + s.espp)
    }

    /// Wages subject to Medicare and Social Security.
    pub(crate) fn fica_wages(&self) -> f64 {
        match &self.details {
            Details::Salary(s) => s.fica_wages(self.gross),
            _ => self.gross,
        }
    }

    /// Computes net pay and the Medicare total from the taxes and deductions already set.
    pub(crate) fn calc_net(&mut self) {
        self.tax_medicare_total = self.tax_medicare + self.tax_medicare_surtax;
        self.net = self.gross
            - self.contrib_401k()
            - self.contrib_401k_post()
            - self.tax_federal
            - self.tax_social
            - self.tax_medicare_total
            - self.benefit_deductions();
    }

    /// Every monetary value with its name, used for validation.
    fn monetary_fields(&self) -> Vec<(&'static str, f64)> {
        let mut fields = vec![
            ("gross", self.gross),
            ("deductions", self.deductions),
            ("federal_taxable", self.federal_taxable),
            ("percent_tax_federal", self.percent_tax_federal),
            ("tax_federal", self.tax_federal),
            ("tax_social", self.tax_social),
            ("tax_medicare", self.tax_medicare),
            ("tax_medicare_surtax", self.tax_medicare_surtax),
            ("tax_medicare_total", self.tax_medicare_total),
            ("net", self.net),
            ("ytd_gross", self.ytd.gross),
            ("ytd_gross_supplemental", self.ytd.gross_supplemental),
            ("ytd_gross_total", self.ytd.gross_total),
            ("ytd_net", self.ytd.net),
            ("ytd_net_supplemental", self.ytd.net_supplemental),
            ("ytd_net_total", self.ytd.net_total),
            ("ytd_401k", self.ytd.contrib_401k),
            ("ytd_401k_match", self.ytd.contrib_401k_match),
            ("ytd_401k_post", self.ytd.contrib_401k_post),
            ("ytd_401k_total", self.ytd.contrib_401k_total),
            ("ytd_espp", self.ytd.espp),
            ("ytd_tax_federal", self.ytd.tax_federal),
            ("ytd_tax_social", self.ytd.tax_social),
            ("ytd_tax_medicare", self.ytd.tax_medicare),
            ("ytd_tax_medicare_surtax", self.ytd.tax_medicare_surtax),
            ("ytd_tax_medicare_total", self.ytd.tax_medicare_total),
            ("ytd_rsu_quantity_vested", self.ytd.rsu_quantity_vested),
            ("ytd_rsu_quantity_remaining", self.ytd.rsu_quantity_remaining),
        ];
        match &self.details {
            Details::Salary(s) => fields.extend([
                ("term_life", s.term_life),
                ("hsa", s.hsa),
                ("fsa", s.fsa),
                ("medical", s.medical),
                ("dental", s.dental),
                ("vision", s.vision),
                ("vacation_buy", s.vacation_buy),
                ("personal_exemption", s.personal_exemption),
                ("withhold", s.withhold),
                ("espp", s.espp),
                ("contrib_401k", s.contrib_401k),
                ("contrib_401k_match", s.contrib_401k_match),
                ("contrib_401k_post", s.contrib_401k_post),
            ]),
            Details::Rsu(r) => fields.extend([
                ("rsu_quantity", r.quantity),
                ("rsu_vest_price", r.vest_price),
            ]),
            Details::Supplemental(_) => {}
            Details::Espp(p) => fields.extend([
                ("espp_shares", p.shares),
                ("espp_share_price", p.share_price),
                ("espp_purchase", p.purchase),
            ]),
        }
        fields
    }

    /// Checks the invariants that must hold once the pipeline has completed.
    pub(crate) fn validate(&self) -> Res<()> {
        for (name, value) in self.monetary_fields() {
            if value.is_nan() || value < 0.0 {
                bail!("{} income on {}: '{name}' is negative {value}", self.kind(), self.date);
            }
        }
        if self.is_salary() {
            return Ok(());
        }
        for (name, value) in [
            ("gross", self.gross),
            ("federal_taxable", self.federal_taxable),
            ("tax_federal", self.tax_federal),
            ("tax_medicare_total", self.tax_medicare_total),
        ] {
            ensure!(
                value > 0.0,
                "{} income on {}: '{name}' must be > 0.0, found {value}",
                self.kind(),
                self.date
            );
        }
        for (name, value) in [
            ("ytd_401k", self.ytd.contrib_401k),
            ("ytd_401k_match", self.ytd.contrib_401k_match),
            ("ytd_401k_post", self.ytd.contrib_401k_post),
        ] {
            ensure!(
                value == 0.0,
                "{} income on {}: '{name}' must be 0.0, found {value}",
                self.kind(),
                self.date
            );
        }
        Ok(())
    }
}

impl Display for Income {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let money = |v: f64| format!("{:>13}", Amount::from_f64(v).to_string());
        writeln!(f, "Income")?;
        writeln!(f, "{:>28}  {}", "Pay Date", self.date.format(DATE_FORMAT))?;
        writeln!(f, "{:>28}  {}", "Payment Type", self.payment_type())?;
        writeln!(f, "{:>28}  {}", "Gross Pay", money(self.gross))?;
        writeln!(f, "{:>28}  {}", "Gross Total YTD", money(self.ytd.gross_total))?;
        if let Some(s) = self.salary_details() {
            writeln!(f, "{:>28}  {:.2}%", "401(k) Percent", s.percent_401k * 100.0)?;
            writeln!(f, "{:>28}  {}", "401(k) Contribution", money(s.contrib_401k))?;
            writeln!(f, "{:>28}  {}", "401(k) Company Match", money(s.contrib_401k_match))?;
            writeln!(f, "{:>28}  {:.2}%", "401(k) Post-tax Percent", s.percent_401k_post * 100.0)?;
            writeln!(f, "{:>28}  {}", "401(k) Post-tax", money(s.contrib_401k_post))?;
            writeln!(f, "{:>28}  {}", "Benefit Deductions", money(s.benefits()))?;
            writeln!(f, "{:>28}  {}", "ESPP Withholding", money(s.espp))?;
        }
        writeln!(f, "{:>28}  {}", "Federal Taxable Amount", money(self.federal_taxable))?;
        writeln!(f, "{:>28}  {:.2}%", "Federal Tax Percent", self.percent_tax_federal * 100.0)?;
        writeln!(f, "{:>28}  {}", "Federal Tax", money(self.tax_federal))?;
        writeln!(f, "{:>28}  {}", "Social Security Tax", money(self.tax_social))?;
        writeln!(f, "{:>28}  {}", "Medicare Tax Total", money(self.tax_medicare_total))?;
        write!(f, "{:>28}  {}", "Net Pay", money(self.net))
    }
}
