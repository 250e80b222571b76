//! Command handlers for the paystub CLI.
//!
//! This module contains implementations for all CLI subcommands.

mod ledger;
mod periods;

use serde::Serialize;
use std::fmt::Debug;
use tracing::{debug, info};

pub use ledger::{csv, Totals};
pub use periods::periods;

/// The output type for a command. The `output` is the command's product and goes to stdout, the
/// `message` is a note for the user logged at `info!`, and the optional `structure` is logged as
/// JSON at `debug!`.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Text to print to stdout.
    output: Option<String>,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            output: None,
            structure: Some(structure),
        }
    }

    /// Sets the text printed to stdout.
    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = Some(output.into());
        self
    }

    /// Get the `message`.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the text printed to stdout.
    pub fn output(&self) -> Option<&str> {
        self.output.as_deref()
    }

    /// Get the structured data stored in `structure`.
    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Print the output to stdout, the message to `info!` and the structured data (if it exists)
    /// as JSON to `debug!`.
    pub fn print(&self) {
        if let Some(output) = self.output() {
            print!("{output}");
        }
        info!("{}", self.message);
        if let Some(structure) = self.structure() {
            if let Ok(json) = serde_json::to_string_pretty(structure) {
                debug!("Command output:\n\n{json}\n\n");
            }
        }
    }
}
