//! Command handlers for the tracker CLI.
//!
//! This module contains implementations for all CLI subcommands.

mod add;
mod chart;
mod export;
mod init;
mod list;
mod summary;

use crate::api::{self, Mode};
use crate::error::{ErrorType, IntoResult};
use crate::model::{Amount, Unit};
use crate::repo::Repository;
use crate::{Config, Result};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt::Debug;
use tracing::{debug, info};

pub use add::add;
pub use chart::{chart, ChartView, SegmentView};
pub use export::export;
pub use init::init;
pub use list::list;
pub use summary::{summary, Counted};

/// The output type for a command. This allows the command to return a consistent message and,
/// optionally, structured data to the command line.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
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
            structure: Some(structure),
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
        }
    }

    /// Get the `message`.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the structured data stored in `structure`.
    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Print the message to `info!` and the structured data (if it exists) as JSON to `debug!`.
    pub fn print(&self) {
        info!("{}", self.message);
        if let Some(structure) = self.structure() {
            if let Ok(json) = serde_json::to_string_pretty(structure) {
                debug!("Command output:\n\n{json}\n\n");
            }
        }
    }
}

/// Creates the backend for `mode` and loads every category from it.
async fn open(config: &Config, mode: Mode) -> Result<Repository> {
    let backend = api::backend(config, mode).pub_result(ErrorType::Sync)?;
    let mut repo = Repository::new(backend, config);
    let count = repo.load_all().await?;
    debug!("Loaded {count} entries");
    Ok(repo)
}

/// Formats a total in its unit: dollars with cents, quantities as whole numbers.
pub(crate) fn format_value(unit: Unit, value: Decimal) -> String {
    match unit {
        Unit::Dollars => match Amount::new(value) {
            Ok(amount) => amount.to_string(),
            Err(_) => format!("${value}"),
        },
        Unit::Quantity => format_num::format_num!(",.0", crate::aggregate::to_f64(value)),
    }
}
