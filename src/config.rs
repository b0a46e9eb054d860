//! Configuration file handling.
//!
//! The configuration file is a small JSON document, by default at
//! `<config dir>/resource-tracker/config.json`. It holds the backend base URL along with timing and
//! chart settings. A `Config` is always passed explicitly to whatever needs it; nothing reads the
//! environment or the file system behind the caller's back.

use crate::error::{Error, ErrorType, IntoResult, Res};
use crate::{utils, Result};
use anyhow::{anyhow, ensure, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

const APP_NAME: &str = "resource-tracker";
const CONFIG_VERSION: u8 = 1;
const CONFIG_JSON: &str = "config.json";
const REQUEST_TIMEOUT_SECS: u64 = 30;
const SYNC_TIMEOUT_SECS: u64 = 10;
const COUNTER_DURATION_MS: u64 = 1000;
const FRAME_INTERVAL_MS: u64 = 16;
const TREND_MONTHS: u32 = 6;

/// The loaded and validated configuration.
#[derive(Debug, Clone)]
pub struct Config {
    path: Option<PathBuf>,
    config_file: ConfigFile,
    api_base_url: Url,
}

impl Config {
    /// Creates a configuration with default settings for the backend at `api_base_url`.
    pub fn new(api_base_url: &str) -> Result<Self> {
        let config_file = ConfigFile {
            api_base_url: api_base_url.to_string(),
            ..ConfigFile::default()
        };
        Self::from_file(None, config_file).pub_result(ErrorType::Config)
    }

    /// Loads and validates the configuration file at `path`.
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let config_file = ConfigFile::load(&path)
            .await
            .pub_result(ErrorType::Config)?;
        Self::from_file(Some(path), config_file).pub_result(ErrorType::Config)
    }

    /// Writes a new configuration file at `path` for the backend at `api_base_url`. Fails if a
    /// file already exists there.
    pub async fn create(path: impl Into<PathBuf>, api_base_url: &str) -> Result<Self> {
        let path = path.into();
        if path.exists() {
            return Err(Error::new(
                ErrorType::Config,
                anyhow!("A config file already exists at '{}'", path.display()),
            ));
        }
        let config_file = ConfigFile {
            api_base_url: api_base_url.to_string(),
            ..ConfigFile::default()
        };
        let config = Self::from_file(Some(path.clone()), config_file)
            .pub_result(ErrorType::Config)?;
        if let Some(parent) = path.parent() {
            utils::make_dir(parent).await.pub_result(ErrorType::Io)?;
        }
        config
            .config_file
            .save(&path)
            .await
            .pub_result(ErrorType::Io)?;
        Ok(config)
    }

    fn from_file(path: Option<PathBuf>, config_file: ConfigFile) -> Res<Self> {
        let api_base_url = parse_base_url(&config_file.api_base_url)?;
        ensure!(
            config_file.chart.radius > 0.0,
            "chart.radius must be positive, got {}",
            config_file.chart.radius
        );
        ensure!(
            config_file.chart.stroke_width >= 0.0 && config_file.chart.hover_stroke_delta >= 0.0,
            "chart stroke widths must not be negative"
        );
        ensure!(
            config_file.frame_interval_ms > 0,
            "frame_interval_ms must be greater than zero"
        );
        Ok(Self {
            path,
            config_file,
            api_base_url,
        })
    }

    /// Replaces the backend base URL, e.g. with a value given on the command line.
    pub fn with_api_base_url(mut self, api_base_url: &str) -> Result<Self> {
        self.api_base_url = parse_base_url(api_base_url).pub_result(ErrorType::Config)?;
        self.config_file.api_base_url = api_base_url.to_string();
        Ok(self)
    }

    /// The default location of the configuration file.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_NAME)
            .join(CONFIG_JSON)
    }

    /// The file this configuration was loaded from, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// The backend base URL. Always ends with a `/` so that collection paths can be joined onto it.
    pub fn api_base_url(&self) -> &Url {
        &self.api_base_url
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.config_file.request_timeout_secs)
    }

    /// How long `add` waits for the backend to acknowledge a submission before rolling back.
    pub fn sync_timeout(&self) -> Duration {
        Duration::from_secs(self.config_file.sync_timeout_secs)
    }

    pub fn counter_duration(&self) -> Duration {
        Duration::from_millis(self.config_file.counter_duration_ms)
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.config_file.frame_interval_ms)
    }

    pub fn trend_months(&self) -> u32 {
        self.config_file.trend_months
    }

    pub fn chart(&self) -> &ChartSettings {
        &self.config_file.chart
    }
}

/// Donut and ring dimensions, in the view's drawing units.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ChartSettings {
    pub radius: f64,
    pub stroke_width: f64,
    /// How much wider a hovered donut segment is drawn.
    pub hover_stroke_delta: f64,
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self {
            radius: 80.0,
            stroke_width: 24.0,
            hover_stroke_delta: 6.0,
        }
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "resource-tracker",
///   "config_version": 1,
///   "api_base_url": "https://portal.example.org",
///   "request_timeout_secs": 30,
///   "sync_timeout_secs": 10,
///   "counter_duration_ms": 1000,
///   "frame_interval_ms": 16,
///   "trend_months": 6,
///   "chart": { "radius": 80.0, "stroke_width": 24.0, "hover_stroke_delta": 6.0 }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "resource-tracker"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// Base URL of the portal backend
    api_base_url: String,

    #[serde(default = "default_request_timeout")]
    request_timeout_secs: u64,

    #[serde(default = "default_sync_timeout")]
    sync_timeout_secs: u64,

    #[serde(default = "default_counter_duration")]
    counter_duration_ms: u64,

    #[serde(default = "default_frame_interval")]
    frame_interval_ms: u64,

    #[serde(default = "default_trend_months")]
    trend_months: u32,

    #[serde(default)]
    chart: ChartSettings,
}

fn default_request_timeout() -> u64 {
    REQUEST_TIMEOUT_SECS
}

fn default_sync_timeout() -> u64 {
    SYNC_TIMEOUT_SECS
}

fn default_counter_duration() -> u64 {
    COUNTER_DURATION_MS
}

fn default_frame_interval() -> u64 {
    FRAME_INTERVAL_MS
}

fn default_trend_months() -> u32 {
    TREND_MONTHS
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            api_base_url: String::new(),
            request_timeout_secs: REQUEST_TIMEOUT_SECS,
            sync_timeout_secs: SYNC_TIMEOUT_SECS,
            counter_duration_ms: COUNTER_DURATION_MS,
            frame_interval_ms: FRAME_INTERVAL_MS,
            trend_months: TREND_MONTHS,
            chart: ChartSettings::default(),
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile from `path`, checking that it belongs to this application.
    async fn load(path: impl AsRef<Path>) -> Res<Self> {
        let path = path.as_ref();
        let config: ConfigFile = utils::deserialize(path).await?;
        ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );
        Ok(config)
    }

    async fn save(&self, path: impl AsRef<Path>) -> Res<()> {
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(path, data)
            .await
            .context("Unable to write config file")
    }
}

/// Parses the backend base URL and normalizes it to end with `/`.
fn parse_base_url(s: &str) -> Res<Url> {
    ensure!(!s.trim().is_empty(), "The api_base_url is empty");
    let mut url =
        Url::parse(s.trim()).with_context(|| format!("Invalid api_base_url '{s}'"))?;
    ensure!(
        url.scheme() == "http" || url.scheme() == "https",
        "The api_base_url must be http or https, got '{}'",
        url.scheme()
    );
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
