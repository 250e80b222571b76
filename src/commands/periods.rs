//! The `periods` command.

use crate::commands::Out;
use crate::model::DATE_FORMAT;
use crate::pay::Pay;
use crate::{price, Config, Result};
use chrono::NaiveDate;

/// Lists the salary pay dates, one per line.
pub async fn periods(config: Config, today: NaiveDate) -> Result<Out<Vec<String>>> {
    let spot = price::spot_price(&config).await?;
    let pay = Pay::new(&config, today, spot)?;
    let dates: Vec<String> = pay
        .pay_periods()
        .into_iter()
        .map(|d| d.format(DATE_FORMAT).to_string())
        .collect();
    let mut output = dates.join("\n");
    output.push('\n');
    let message = format!("{} pay periods in {}", dates.len(), config.year());
    Ok(Out::new(message, dates).with_output(output))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::sample_config;

    #[tokio::test]
    async fn test_periods() {
        let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let out = periods(sample_config(), today).await.unwrap();
        let output = out.output().unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 24);
        assert_eq!(lines[0], "01/12/24");
        assert_eq!(lines[23], "12/31/24");
        assert_eq!(out.structure().unwrap().len(), 24);
        assert_eq!(out.message(), "24 pay periods in 2024");
    }
}
