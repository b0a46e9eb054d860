//! Aggregation, chart geometry and animation for a nonprofit's resource distribution dashboard.
//!
//! Entries are fetched from and submitted to the portal backend through a `Repository`. A
//! `Snapshot` of the repository feeds the functions in `aggregate`, whose results feed the donut
//! and ring layouts in `geometry`. `animation` counts the dashboard figures up frame by frame.

pub mod aggregate;
pub mod animation;
pub mod api;
pub mod args;
pub mod commands;
mod config;
mod error;
pub mod geometry;
pub mod model;
mod repo;
mod utils;

#[cfg(test)]
mod test;

pub use api::Mode;
pub use config::{ChartSettings, Config};
pub use error::{Error, ErrorType, FieldError, Result, ValidationErrors};
pub use repo::{Repository, Snapshot};
