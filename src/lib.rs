pub mod args;
pub mod commands;
mod config;
mod error;
mod espp;
mod holidays;
pub mod model;
mod pay;
mod price;
mod report;
mod salary;
mod savings;
mod tax;
mod utils;
mod version;

#[cfg(test)]
mod test;

pub use config::{Config, ConfigFile};
pub use error::{Error, ErrorType, Result};
pub use holidays::BankHolidays;
pub use pay::Pay;
pub use price::{FixedPrice, PriceSource, StockPrice};
pub use report::{ledger, summary};
pub use salary::PAY_PERIODS;
