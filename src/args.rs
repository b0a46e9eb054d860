//! These structs provide the CLI interface for the tracker CLI.

use crate::model::Category;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing_subscriber::filter::LevelFilter;

/// tracker: Summaries and charts of the assistance a nonprofit hands out.
///
/// Entries (diapers, donations given and received, bus passes, rideshares, water, electric and
/// rent assistance) live in the portal backend. This program fetches them, adds new ones, and
/// computes the totals, monthly rollups, trends and chart geometry the dashboard shows.
///
/// Set RESOURCE_TRACKER_IN_TEST_MODE to any value to run against seeded demo data instead of the
/// portal.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Write a configuration file pointing at the portal backend.
    Init(InitArgs),
    /// Show totals, the monthly rollup, year-to-date and the trend.
    Summary(SummaryArgs),
    /// List the entries of one category, most recent first.
    List(ListArgs),
    /// Add an entry, e.g. `tracker add rent date=2026-06-01 clientName="Rosa Diaz" amount=650`.
    Add(AddArgs),
    /// Lay out the donut chart of category totals.
    Chart(ChartArgs),
    /// Write entries to a CSV file.
    Export(ExportArgs),
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

    /// The configuration file.
    #[arg(long, env = "TRACKER_CONFIG", default_value_t = default_config_path())]
    config: DisplayPath,

    /// Overrides the backend base URL from the configuration file.
    #[arg(long, env = "TRACKER_API_BASE_URL")]
    api_base_url: Option<String>,
}

impl Common {
    pub fn new(log_level: LevelFilter, config: PathBuf, api_base_url: Option<String>) -> Self {
        Self {
            log_level,
            config: config.into(),
            api_base_url,
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn config(&self) -> &DisplayPath {
        &self.config
    }

    pub fn api_base_url(&self) -> Option<&str> {
        self.api_base_url.as_deref()
    }
}

/// (Not shown): Args for the `tracker init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// The base URL of the portal backend, e.g. https://portal.example.org
    #[arg(long)]
    api_base_url: String,
}

impl InitArgs {
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
        }
    }

    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }
}

/// (Not shown): Args for the `tracker summary` command.
#[derive(Debug, Parser, Clone, Default)]
pub struct SummaryArgs {
    /// The year of the monthly rollup. Defaults to the current year.
    #[arg(long)]
    pub year: Option<i32>,

    /// Narrow the rollup, year-to-date and trend to one category.
    #[arg(long)]
    pub category: Option<Category>,

    /// How many months the trend covers. Defaults to the configured trend_months.
    #[arg(long)]
    pub months: Option<u32>,

    /// A year-to-date goal to report progress toward.
    #[arg(long)]
    pub goal: Option<Decimal>,

    /// Count the year-to-date figure and goal ring up the way the dashboard does.
    #[arg(long)]
    pub animate: bool,
}

/// (Not shown): Args for the `tracker list` command.
#[derive(Debug, Parser, Clone)]
pub struct ListArgs {
    /// One of: diapers, donations-given, donations-received, bus-passes, rideshare, water,
    /// electric, rent
    pub category: Category,

    /// Show at most this many entries.
    #[arg(long)]
    pub limit: Option<usize>,
}

/// (Not shown): Args for the `tracker add` command.
#[derive(Debug, Parser, Clone)]
pub struct AddArgs {
    /// The category of the new entry.
    pub category: Category,

    /// Fields as key=value pairs, using the backend's field names (date, clientName, amount...).
    #[arg(required = true)]
    pub fields: Vec<String>,
}

/// (Not shown): Args for the `tracker chart` command.
#[derive(Debug, Parser, Clone, Default)]
pub struct ChartArgs {
    /// Chart one category's breakdown instead of the totals of every category.
    #[arg(long)]
    pub category: Option<Category>,

    /// Highlight the segment at this index.
    #[arg(long)]
    pub hover: Option<usize>,
}

/// (Not shown): Args for the `tracker export` command.
#[derive(Debug, Parser, Clone)]
pub struct ExportArgs {
    /// Where to write the CSV file.
    pub path: PathBuf,

    /// Export only this category.
    #[arg(long)]
    pub category: Option<Category>,
}

fn default_config_path() -> DisplayPath {
    DisplayPath(crate::Config::default_path())
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn path(&self) -> &Path {
        &self.0
    }
}
