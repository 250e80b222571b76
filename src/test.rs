//! Shared test utilities for building configurations.
//!
//! This module is only compiled when running tests (`#[cfg(test)]`).

use crate::Config;
use serde_json::{json, Value};

/// A minimal 2024 configuration: a 4000 paycheck with a 2% raise, no stock income and no ESPP.
pub(crate) fn sample_json() -> Value {
    json!({
        "year": 2024,
        "pay": {
            "gross": 4000,
            "increase": { "percent": 2 }
        },
        "save": {
            "cap": 69000,
            "cap_pre": 23000
        },
        "federal": {
            "personal_exemption": 4300,
            "table": [[0, 0], [1200, 10]]
        },
        "medicare": {
            "percent": 1.45,
            "surtax_cap": 200000,
            "surtax_percent": 0.9
        },
        "social_security": {
            "percent": 6.2,
            "cap": 168600
        }
    })
}

/// Parses `sample_json` as if it were read from `/tmp/config.json`.
pub(crate) fn sample_config() -> Config {
    config_with(|_| {})
}

/// Parses `sample_json` after `f` has changed it.
pub(crate) fn config_with(f: impl FnOnce(&mut Value)) -> Config {
    let mut value = sample_json();
    f(&mut value);
    Config::from_json("/tmp/config.json", &value.to_string()).unwrap()
}
