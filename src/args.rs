//! These structs provide the CLI interface for the paystub CLI.

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::filter::LevelFilter;

/// paystub: A command-line tool for forecasting a year of paychecks.
///
/// Given a yearly configuration of salary, raises, bonuses, RSU vests, benefits, ESPP and 401(k)
/// elections, this program produces every paycheck of the year with its deductions, taxes, net
/// pay and year-to-date totals.
///
/// The 401(k) contribution percents are optimized to land just over the yearly caps. Run it again
/// as the year goes on, with a new --today, to rebalance the remaining paychecks.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Print the income ledger as CSV, followed by a blank line and a summary CSV.
    ///
    /// Every paycheck, bonus, RSU vest and ESPP purchase of the year is a row, in date order.
    Csv(ConfigArgs),
    /// Print the salary pay dates, one per line.
    Periods(ConfigArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The date to treat as today, YYYY-MM-DD. Paychecks within a week of today are too close to
    /// change their 401(k) percent. Defaults to the current date.
    #[arg(long, env = "PAYSTUB_TODAY")]
    today: Option<NaiveDate>,
}

impl Common {
    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    /// The `--today` date or the current local date.
    pub fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }
}

/// (Not shown): Args for commands that read a configuration.
#[derive(Debug, Parser, Clone)]
pub struct ConfigArgs {
    /// The directory containing config.json, or the path to the configuration file itself.
    config: PathBuf,
}

impl ConfigArgs {
    pub fn config(&self) -> &Path {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_csv() {
        let args =
            Args::try_parse_from(["paystub", "--today", "2024-07-01", "csv", "configs/2024"])
                .unwrap();
        assert_eq!(
            args.common().today(),
            NaiveDate::from_ymd_opt(2024, 7, 1).unwrap()
        );
        assert_eq!(args.common().log_level(), LevelFilter::INFO);
        let Command::Csv(csv) = args.command() else {
            panic!("expected the csv command");
        };
        assert_eq!(csv.config(), Path::new("configs/2024"));
    }

    #[test]
    fn test_parse_periods_with_log_level() {
        let args =
            Args::try_parse_from(["paystub", "--log-level", "trace", "periods", "x.json"]).unwrap();
        assert_eq!(args.common().log_level(), LevelFilter::TRACE);
        assert!(matches!(args.command(), Command::Periods(_)));
    }

    #[test]
    fn test_bad_today() {
        assert!(Args::try_parse_from(["paystub", "--today", "07/01/24", "csv", "x"]).is_err());
    }
}
