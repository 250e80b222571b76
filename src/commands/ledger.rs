//! The `csv` command.

use crate::commands::Out;
use crate::model::Income;
use crate::pay::Pay;
use crate::{price, report, version, Config, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Year-end totals of a forecast.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    pub events: usize,
    pub gross_total: f64,
    pub net_total: f64,
    pub tax_federal: f64,
    pub contrib_401k_total: f64,
}

impl Totals {
    fn new(income: &[Income]) -> Self {
        let Some(last) = income.last() else {
            return Self::default();
        };
        let ytd = last.ytd();
        Self {
            events: income.len(),
            gross_total: ytd.gross_total,
            net_total: ytd.net_total,
            tax_federal: ytd.tax_federal,
            contrib_401k_total: ytd.contrib_401k_total,
        }
    }
}

/// Runs the forecast and renders the ledger CSV, a blank line and the summary CSV.
pub async fn csv(config: Config, today: NaiveDate) -> Result<Out<Totals>> {
    let spot = price::spot_price(&config).await?;
    let pay = Pay::new(&config, today, spot)?;
    let ledger = report::ledger(pay.income())?;
    let version = match config.version() {
        Some(v) => v.to_string(),
        None => version::repo_version(config.dir()).await,
    };
    let summary = report::summary(&config, today, &version)?;
    let totals = Totals::new(pay.income());
    let message = format!(
        "Forecast {} income events for {}, net pay {}",
        totals.events,
        config.year(),
        crate::model::Amount::from_f64(totals.net_total)
    );
    Ok(Out::new(message, totals).with_output(format!("{ledger}\n{summary}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::sample_json;
    use crate::utils;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_csv_command() {
        let dir = TempDir::new().unwrap();
        let mut value = sample_json();
        value["version"] = serde_json::json!("test-config");
        utils::write(dir.path().join("config.json"), value.to_string())
            .await
            .unwrap();
        let config = Config::load(dir.path()).await.unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();

        let out = csv(config, today).await.unwrap();
        let output = out.output().unwrap();
        let (ledger, summary) = output.split_once("\n\n").unwrap();
        assert_eq!(ledger.lines().count(), 25);
        assert!(summary.starts_with("Paystub key,Value\n"));
        assert!(summary.trim_end().ends_with("CFG version,test-config"));

        let totals = out.structure().unwrap();
        assert_eq!(totals.events, 24);
        assert!((totals.contrib_401k_total - 69000.0).abs() < 1e-6);
        assert!(out.message().starts_with("Forecast 24 income events for 2024"));
    }
}
