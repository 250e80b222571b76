//! Federal, Medicare and Social Security withholding.
//!
//! Each module is a single pass over the merged, date-ordered income list. They must run after
//! the 401(k) and federal deduction passes and before net pay is computed.

pub(crate) mod federal;
pub(crate) mod medicare;
pub(crate) mod social_security;
