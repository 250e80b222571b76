//! Configuration file handling.
//!
//! The configuration is a JSON file, `config.json`, that describes a single year of pay: the
//! salary and its raise, benefit deductions, supplemental income, 401(k) and ESPP elections, and
//! the tax tables for the year. Loading validates everything up front so that a bad file fails
//! before any paycheck is computed.

use crate::error::{ErrorType, IntoResult, Res};
use crate::holidays::BankHolidays;
use crate::model::Amount;
use crate::salary::PAY_PERIODS;
use crate::{utils, Result};
use anyhow::{bail, ensure, Context};
use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::trace;

const CONFIG_JSON: &str = "config.json";

/// RSU paystubs show up about a week after the vest date.
pub(crate) const RSU_PAYSTUB_LAG_DAYS: u64 = 7;

/// The `Config` object represents a validated configuration for one year. You instantiate it by
/// providing the path to a directory holding `config.json`, or to the file itself.
#[derive(Debug, Clone)]
pub struct Config {
    path: PathBuf,
    file: ConfigFile,
    holidays: BankHolidays,
    increase_start: NaiveDate,
    espp_first: NaiveDate,
    espp_second: NaiveDate,
    /// Additional withholding sorted by start date, newest first.
    withhold: Vec<(NaiveDate, f64)>,
}

impl Config {
    /// Loads and validates the configuration.
    ///
    /// # Errors
    /// - `ErrorType::Io` if the file cannot be read.
    /// - `ErrorType::Config` if the file cannot be parsed or fails validation.
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let mut path = path.into();
        if path.is_dir() {
            path = path.join(CONFIG_JSON);
        }
        let content = utils::read(&path).await.pub_result(ErrorType::Io)?;
        Self::from_json(path, &content)
    }

    /// Parses and validates the configuration from a JSON string. `path` is where the
    /// configuration came from and is used to locate the config directory.
    pub fn from_json(path: impl Into<PathBuf>, json: &str) -> Result<Self> {
        let path = path.into();
        let file: ConfigFile = serde_json::from_str(json)
            .with_context(|| format!("Failed to parse config file at {}", path.display()))
            .pub_result(ErrorType::Config)?;
        Self::new(path, file)
    }

    /// Validates `file` and resolves the defaults that depend on the configured year.
    pub fn new(path: PathBuf, file: ConfigFile) -> Result<Self> {
        Self::build(path, file)
            .context("Invalid configuration")
            .pub_result(ErrorType::Config)
    }

    fn build(path: PathBuf, file: ConfigFile) -> Res<Self> {
        let year = file.year;
        let day = |month, day| day_in(year, month, day);

        let holidays = match &file.holidays {
            Some(days) => {
                for d in days {
                    ensure!(d.year() == year, "holiday {d} is not in {year}");
                }
                BankHolidays::from_days(days.iter().copied())
            }
            None => BankHolidays::us(year)?,
        };

        let increase_start = match file.pay.increase.start_date {
            Some(d) => d,
            None => day(4, 1)?,
        };
        let espp_first = match file.pay.espp.date_first {
            Some(d) => d,
            None => day(3, 1)?,
        };
        let espp_second = match file.pay.espp.date_second {
            Some(d) => d,
            None => day(9, 1)?,
        };
        for (name, d) in [
            ("pay.increase.start_date", increase_start),
            ("pay.espp.date_first", espp_first),
            ("pay.espp.date_second", espp_second),
        ] {
            ensure!(d.year() == year, "{name} {d} is not in {year}");
        }
        ensure!(
            espp_first < espp_second,
            "pay.espp.date_first must come before pay.espp.date_second"
        );

        let mut withhold = Vec::with_capacity(file.pay.withhold.len());
        for entry in &file.pay.withhold {
            ensure!(
                !entry.amount.is_negative(),
                "negative withholding amount {}",
                entry.amount
            );
            withhold.push((entry.start_date, entry.amount.as_f64()));
        }
        withhold.sort_by(|a, b| b.0.cmp(&a.0));

        file.validate()?;

        let config = Self {
            path,
            file,
            holidays,
            increase_start,
            espp_first,
            espp_second,
            withhold,
        };
        trace!("{config:?}");
        Ok(config)
    }

    /// The path of the configuration file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The directory holding the configuration file.
    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }

    pub fn year(&self) -> i32 {
        self.file.year
    }

    /// The identifier the user gave to this configuration, if any.
    pub fn version(&self) -> Option<&str> {
        self.file.version.as_deref()
    }

    pub fn pay(&self) -> &PayConfig {
        &self.file.pay
    }

    pub fn stock(&self) -> &StockConfig {
        &self.file.stock
    }

    pub fn income(&self) -> &IncomeConfig {
        &self.file.income
    }

    pub fn save(&self) -> &SaveConfig {
        &self.file.save
    }

    pub fn federal(&self) -> &FederalConfig {
        &self.file.federal
    }

    pub fn medicare(&self) -> &MedicareConfig {
        &self.file.medicare
    }

    pub fn social_security(&self) -> &SocialSecurityConfig {
        &self.file.social_security
    }

    /// The first day the raised salary applies.
    pub fn increase_start(&self) -> NaiveDate {
        self.increase_start
    }

    /// The first ESPP purchase date.
    pub fn espp_first(&self) -> NaiveDate {
        self.espp_first
    }

    /// The second ESPP purchase date.
    pub fn espp_second(&self) -> NaiveDate {
        self.espp_second
    }

    /// True when any ESPP window withholds.
    pub fn espp_active(&self) -> bool {
        let espp = &self.file.pay.espp;
        espp.percent_first > 0.0 || espp.percent_second > 0.0 || espp.percent_third > 0.0
    }

    /// Returns true if `date` is a bank holiday.
    pub fn bank_holiday(&self, date: NaiveDate) -> bool {
        self.holidays.contains(date)
    }

    /// Returns the date for `month` and `day` in the configured year.
    pub fn day(&self, month: u32, day: u32) -> Res<NaiveDate> {
        day_in(self.file.year, month, day)
    }

    /// The additional withholding for a salaried paycheck on `date`. Later entries override
    /// earlier ones from their start date forward.
    pub fn withhold_amount(&self, date: NaiveDate) -> f64 {
        self.withhold
            .iter()
            .find(|(start, _)| date >= *start)
            .map_or(0.0, |(_, amount)| *amount)
    }

    /// True when a spot price must be fetched: an RSU vest has no price and no default price is
    /// configured, or the ESPP withholds without a fixed buy price.
    pub fn needs_spot_price(&self) -> bool {
        if self.file.stock.price.is_some() {
            return self.espp_active() && self.file.pay.espp.buy_price.is_none();
        }
        let rsu = self.file.income.rsu.iter().any(|r| r.price.is_none());
        let espp = self.espp_active() && self.file.pay.espp.buy_price.is_none();
        rsu || espp
    }
}

fn day_in(year: i32, month: u32, day: u32) -> Res<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
        .with_context(|| format!("invalid date {year}-{month:02}-{day:02}"))
}

/// Represents the serialization and deserialization format of the configuration file. Money may be
/// a number or a string such as `"$4,000.00"`. Dates are `YYYY-MM-DD`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ConfigFile {
    pub year: i32,
    /// Optional identifier for this configuration. When missing, `git describe` is run in the
    /// configuration directory.
    pub version: Option<String>,
    /// Overrides the built-in US bank holidays.
    pub holidays: Option<Vec<NaiveDate>>,
    pub pay: PayConfig,
    pub stock: StockConfig,
    pub income: IncomeConfig,
    pub save: SaveConfig,
    pub federal: FederalConfig,
    pub medicare: MedicareConfig,
    pub social_security: SocialSecurityConfig,
}

impl ConfigFile {
    fn validate(&self) -> Res<()> {
        let required = [
            (self.pay.gross, "pay gross"),
            (self.federal.personal_exemption, "federal personal_exemption"),
            (self.medicare.surtax_cap, "medicare surtax cap"),
            (self.social_security.cap, "social security cap"),
            (self.save.cap, "401(k) total cap"),
            (self.save.cap_pre, "401(k) pre-tax cap"),
        ];
        for (amount, name) in required {
            ensure!(!amount.is_zero(), "{name} required");
            ensure!(!amount.is_negative(), "{name} is negative {amount}");
        }
        ensure!(
            !self.federal.table.is_empty(),
            "federal semimonthly paytool period table required"
        );
        for (threshold, percent) in &self.federal.table {
            ensure!(
                !threshold.is_negative() && *percent >= 0.0,
                "invalid federal table entry ({threshold}, {percent})"
            );
        }
        for (percent, name) in [
            (self.medicare.percent, "medicare tax percent"),
            (self.medicare.surtax_percent, "medicare surtax percent"),
            (self.social_security.percent, "social security tax percent"),
        ] {
            ensure!(percent > 0.0, "{name} required");
        }
        ensure!(
            self.save.cap_pre <= self.save.cap,
            "401(k) pre-tax cap {} exceeds the total cap {}",
            self.save.cap_pre,
            self.save.cap
        );
        ensure!(self.save.change > 0, "401(k) change must be at least 1");

        for (policy, name) in [
            (&self.save.percent_pre, "pre"),
            (&self.save.percent_post, "post"),
        ] {
            if !policy.manual.is_empty() && policy.manual.len() != PAY_PERIODS {
                bail!(
                    "manual list '{name}' wrong length, expected {PAY_PERIODS} found {}",
                    policy.manual.len()
                );
            }
            if policy.manual.is_empty() && policy.start == 0 && policy.increase != 0 {
                bail!("invalid auto-config start and increase for '{name}'");
            }
        }

        let pay = &self.pay;
        for (amount, name) in [
            (pay.term_life, "term_life"),
            (pay.hsa, "hsa"),
            (pay.fsa, "fsa"),
            (pay.medical, "medical"),
            (pay.dental, "dental"),
            (pay.vision, "vision"),
            (pay.vacation_buy, "vacation_buy"),
            (pay.espp.cap_irs, "espp cap_irs"),
            (pay.espp.carryover, "espp carryover"),
        ] {
            ensure!(!amount.is_negative(), "negative {name} {amount}");
        }
        ensure!(
            pay.increase.percent >= 0.0,
            "negative pay increase percent {}",
            pay.increase.percent
        );
        let espp = &pay.espp;
        ensure!(
            (0.0..100.0).contains(&espp.percent_discount),
            "espp percent_discount must be in [0, 100), found {}",
            espp.percent_discount
        );
        for percent in [espp.percent_first, espp.percent_second, espp.percent_third] {
            ensure!(
                (0.0..=100.0).contains(&percent),
                "espp withholding percent must be in [0, 100], found {percent}"
            );
        }
        for price in [espp.buy_price, espp.start_price, self.stock.price]
            .into_iter()
            .flatten()
        {
            ensure!(price > 0.0, "stock prices must be positive, found {price}");
        }

        for rsu in &self.income.rsu {
            if rsu.percent_tax_federal < 0.0 {
                bail!("negative federal tax percent {}", rsu.percent_tax_federal);
            }
            ensure!(rsu.quantity > 0.0, "rsu quantity must be positive on {}", rsu.date);
            if let Some(price) = rsu.price {
                ensure!(price > 0.0, "rsu price must be positive on {}", rsu.date);
            }
            let paystub = rsu.paystub_date()?;
            ensure!(
                paystub.year() == self.year,
                "rsu vest {} lands in another year",
                rsu.date
            );
        }
        for supplemental in &self.income.supplemental {
            if supplemental.percent_tax_federal < 0.0 {
                bail!(
                    "negative federal tax percent {}",
                    supplemental.percent_tax_federal
                );
            }
            ensure!(
                supplemental.date.year() == self.year,
                "supplemental income {} is not in {}",
                supplemental.date,
                self.year
            );
            ensure!(
                !supplemental.gross.is_zero() && !supplemental.gross.is_negative(),
                "supplemental income on {} must be positive",
                supplemental.date
            );
        }
        Ok(())
    }
}

/// Regular per-paycheck income and deductions.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PayConfig {
    /// Gross pay per paycheck before the raise.
    pub gross: Amount,
    pub term_life: Amount,
    pub hsa: Amount,
    pub fsa: Amount,
    pub medical: Amount,
    pub dental: Amount,
    pub vision: Amount,
    pub vacation_buy: Amount,
    pub increase: IncreaseConfig,
    pub espp: EsppConfig,
    pub withhold: Vec<WithholdConfig>,
    /// Sometimes the company makes a mistake. Added to the first paycheck's net pay.
    pub start_net_fudge: Option<Amount>,
}

/// The regular pay increase.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct IncreaseConfig {
    pub percent: f64,
    /// Defaults to April 1.
    pub start_date: Option<NaiveDate>,
}

/// An additional flat federal withholding from `start_date` until the end of the year. A later
/// entry with an `amount` of 0 stops a previous one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WithholdConfig {
    pub start_date: NaiveDate,
    pub amount: Amount,
}

/// Employee Stock Purchase Program.
///
/// There are two buy dates a year, `date_first` and `date_second`, and three withholding windows:
/// Jan 1 to `date_first`, `date_first` to `date_second`, and `date_second` to Dec 31. The third
/// window buys in the next year.
///
/// The IRS cap, `cap_irs`, does not account for the discount, so the real cap is
/// `cap_irs * (1 - percent_discount / 100)`. `carryover` adds to the first window's cap.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EsppConfig {
    pub cap_irs: Amount,
    pub carryover: Amount,
    pub percent_discount: f64,
    pub percent_first: f64,
    pub percent_second: f64,
    pub percent_third: f64,
    /// Defaults to March 1.
    pub date_first: Option<NaiveDate>,
    /// Defaults to September 1.
    pub date_second: Option<NaiveDate>,
    /// A fixed share price for purchases.
    pub buy_price: Option<f64>,
    /// The share price at the start of the offering. Purchases use the lower of this and the
    /// spot price when `buy_price` is not set.
    pub start_price: Option<f64>,
}

impl Default for EsppConfig {
    fn default() -> Self {
        Self {
            cap_irs: Amount::from_f64(25_000.0),
            carryover: Amount::default(),
            percent_discount: 15.0,
            percent_first: 0.0,
            percent_second: 0.0,
            percent_third: 0.0,
            date_first: None,
            date_second: None,
            buy_price: None,
            start_price: None,
        }
    }
}

/// Where the current share price comes from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StockConfig {
    /// A fixed price to use instead of fetching one.
    pub price: Option<f64>,
    /// The quote page base URL. `{url}/{symbol}` is fetched.
    pub url: Option<String>,
    pub symbol: Option<String>,
    /// Price cache file. Defaults to the user cache directory.
    pub cache: Option<PathBuf>,
    pub cache_hours: u32,
}

impl Default for StockConfig {
    fn default() -> Self {
        Self {
            price: None,
            url: None,
            symbol: None,
            cache: None,
            cache_hours: 24,
        }
    }
}

/// Non-salaried income.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct IncomeConfig {
    pub rsu: Vec<RsuConfig>,
    pub supplemental: Vec<SupplementalConfig>,
}

/// An RSU vest.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RsuConfig {
    pub date: NaiveDate,
    pub quantity: f64,
    #[serde(default)]
    pub price: Option<f64>,
    /// Federal withholding percent, 0 to use the supplemental rules.
    #[serde(default)]
    pub percent_tax_federal: f64,
}

impl RsuConfig {
    /// The date the vest shows up on a paystub.
    pub(crate) fn paystub_date(&self) -> Res<NaiveDate> {
        self.date
            .checked_add_days(Days::new(RSU_PAYSTUB_LAG_DAYS))
            .with_context(|| format!("invalid rsu date {}", self.date))
    }
}

/// A bonus, award or other supplemental payment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SupplementalConfig {
    pub date: NaiveDate,
    pub gross: Amount,
    /// A label for the payment, e.g. "bonus".
    #[serde(default)]
    pub kind: String,
    /// Federal withholding percent, 0 to use the supplemental rules.
    #[serde(default)]
    pub percent_tax_federal: f64,
}

/// 401(k) savings. Set `start` and `increase` to 0 to auto-optimize, or to a value to lock it.
/// Populating `manual` with 24 percents bypasses the optimizer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SaveConfig {
    /// Employer match percent.
    pub percent_match: f64,
    /// The total cap across pre-tax, post-tax and employer match.
    pub cap: Amount,
    pub cap_pre: Amount,
    pub percent_pre: PercentPolicy,
    pub percent_post: PercentPolicy,
    /// Pay periods after the raise before the contribution rate changes.
    pub increase_shift: u32,
    /// The maximum percent change across windows.
    pub change: u32,
    /// Pay periods within this many days of today are too close to change.
    pub tweak_limit_days: u32,
}

impl Default for SaveConfig {
    fn default() -> Self {
        Self {
            percent_match: 6.0,
            cap: Amount::default(),
            cap_pre: Amount::default(),
            percent_pre: PercentPolicy::default(),
            percent_post: PercentPolicy::default(),
            increase_shift: 0,
            change: 1,
            tweak_limit_days: 7,
        }
    }
}

/// Contribution percents for pre-tax or post-tax savings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PercentPolicy {
    pub start: u32,
    pub increase: u32,
    pub manual: Vec<u32>,
}

impl PercentPolicy {
    pub fn is_manual(&self) -> bool {
        !self.manual.is_empty()
    }
}

/// Federal tax. Use the semimonthly table from IRS Publication 15-T.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FederalConfig {
    /// The annual personal exemption, split evenly across paychecks.
    pub personal_exemption: Amount,
    /// `[threshold, percent]` pairs.
    pub table: Vec<(Amount, f64)>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MedicareConfig {
    pub percent: f64,
    pub surtax_cap: Amount,
    pub surtax_percent: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SocialSecurityConfig {
    pub percent: f64,
    pub cap: Amount,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::{sample_config, sample_json};
    use serde_json::json;
    use tempfile::TempDir;

    fn from_value(value: serde_json::Value) -> Result<Config> {
        Config::from_json("/tmp/config.json", &value.to_string())
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_defaults_resolve_against_year() {
        let config = sample_config();
        assert_eq!(config.increase_start(), date(2024, 4, 1));
        assert_eq!(config.espp_first(), date(2024, 3, 1));
        assert_eq!(config.espp_second(), date(2024, 9, 1));
        assert_eq!(config.save().change, 1);
        assert_eq!(config.save().tweak_limit_days, 7);
        assert_eq!(config.pay().espp.percent_discount, 15.0);
        assert!(!config.espp_active());
        assert!(config.bank_holiday(date(2024, 1, 15)));
        assert_eq!(config.dir(), Path::new("/tmp"));
    }

    #[test]
    fn test_amount_strings() {
        let mut value = sample_json();
        value["pay"]["gross"] = json!("$4,000.00");
        let config = from_value(value).unwrap();
        assert_eq!(config.pay().gross.as_f64(), 4000.0);
    }

    #[test]
    fn test_missing_tax_fields() {
        for (section, field, message) in [
            ("medicare", "percent", "medicare tax percent required"),
            ("medicare", "surtax_cap", "medicare surtax cap required"),
            ("social_security", "cap", "social security cap required"),
            ("federal", "personal_exemption", "federal personal_exemption required"),
            ("save", "cap_pre", "401(k) pre-tax cap required"),
        ] {
            let mut value = sample_json();
            value[section][field] = json!(0);
            let err = from_value(value).unwrap_err();
            assert_eq!(err.error_type(), ErrorType::Config);
            assert!(err.to_string().contains(message), "{err}");
        }
    }

    #[test]
    fn test_empty_federal_table() {
        let mut value = sample_json();
        value["federal"]["table"] = json!([]);
        let err = from_value(value).unwrap_err();
        assert!(err.to_string().contains("paytool period table required"));
    }

    #[test]
    fn test_manual_list_wrong_length() {
        let mut value = sample_json();
        value["save"]["percent_pre"]["manual"] = json!([10, 10, 10]);
        let err = from_value(value).unwrap_err();
        assert!(err.to_string().contains("manual list 'pre' wrong length"));
    }

    #[test]
    fn test_auto_start_with_fixed_increase() {
        let mut value = sample_json();
        value["save"]["percent_post"]["increase"] = json!(5);
        let err = from_value(value).unwrap_err();
        assert!(err.to_string().contains("invalid auto-config"));
    }

    #[test]
    fn test_negative_federal_percent() {
        let mut value = sample_json();
        value["income"]["supplemental"] =
            json!([{"date": "2024-05-31", "gross": 5000, "percent_tax_federal": -1}]);
        let err = from_value(value).unwrap_err();
        assert!(err.to_string().contains("negative federal tax percent"));
    }

    #[test]
    fn test_unsupported_year_requires_holidays() {
        let mut value = sample_json();
        value["year"] = json!(2031);
        let err = from_value(value.clone()).unwrap_err();
        assert!(err.to_string().contains("no bank holiday support"));

        value["holidays"] = json!(["2031-01-01", "2031-12-25"]);
        let config = from_value(value).unwrap();
        assert!(config.bank_holiday(date(2031, 12, 25)));
        assert!(!config.bank_holiday(date(2031, 7, 4)));
    }

    #[test]
    fn test_rsu_vest_spilling_into_next_year() {
        let mut value = sample_json();
        value["income"]["rsu"] = json!([{"date": "2024-12-28", "quantity": 10}]);
        let err = from_value(value).unwrap_err();
        assert!(err.to_string().contains("lands in another year"));
    }

    #[test]
    fn test_withhold_amount_most_recent_wins() {
        let mut value = sample_json();
        value["pay"]["withhold"] = json!([
            {"start_date": "2024-03-01", "amount": 50},
            {"start_date": "2024-08-01", "amount": 0},
            {"start_date": "2024-06-01", "amount": "$75.00"},
        ]);
        let config = from_value(value).unwrap();
        assert_eq!(config.withhold_amount(date(2024, 2, 29)), 0.0);
        assert_eq!(config.withhold_amount(date(2024, 3, 1)), 50.0);
        assert_eq!(config.withhold_amount(date(2024, 5, 31)), 50.0);
        assert_eq!(config.withhold_amount(date(2024, 6, 14)), 75.0);
        assert_eq!(config.withhold_amount(date(2024, 8, 15)), 0.0);
    }

    #[test]
    fn test_needs_spot_price() {
        let mut value = sample_json();
        assert!(!from_value(value.clone()).unwrap().needs_spot_price());

        value["income"]["rsu"] = json!([{"date": "2024-02-15", "quantity": 10}]);
        assert!(from_value(value.clone()).unwrap().needs_spot_price());

        value["stock"]["price"] = json!(30.0);
        assert!(!from_value(value.clone()).unwrap().needs_spot_price());

        value["pay"]["espp"]["percent_first"] = json!(10);
        assert!(from_value(value.clone()).unwrap().needs_spot_price());

        value["pay"]["espp"]["buy_price"] = json!(25.0);
        assert!(!from_value(value).unwrap().needs_spot_price());
    }

    #[test]
    fn test_bad_json() {
        let err = Config::from_json("/tmp/config.json", "{ year: ").unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Config);
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[tokio::test]
    async fn test_load_from_directory() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_JSON);
        utils::write(&path, sample_json().to_string()).await.unwrap();
        let config = Config::load(dir.path()).await.unwrap();
        assert_eq!(config.path(), path);
        assert_eq!(config.year(), 2024);
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = Config::load(dir.path().join("nope.json")).await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Io);
    }
}
