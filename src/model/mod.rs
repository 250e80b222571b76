//! Types that represent the core data model: money amounts and income events.
mod amount;
mod income;

pub use amount::{Amount, AmountError};
pub use income::{
    Details, EsppPurchase, Income, IncomeKind, RsuDetails, SalaryDetails, SupplementalDetails,
    Ytd, DATE_FORMAT,
};
