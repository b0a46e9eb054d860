//! The boundary to the portal backend, which is the system of record for entries.
//!
//! The repository only needs two things from a backend: fetch every entry of a category, and
//! submit one entry and get it back with an id. `Backend` captures exactly that. `HttpBackend`
//! talks to the real service; `MemoryBackend` keeps everything in process for tests and for
//! running the CLI offline.

mod http;
mod memory;

use crate::error::Res;
use crate::model::{Category, Entry};
use crate::Config;
use tracing::debug;

pub use http::HttpBackend;
pub use memory::{MemoryBackend, MemoryState, SubmitBehavior};

/// When this environment variable is set and non-empty the CLI uses a seeded `MemoryBackend`.
pub const TEST_MODE_ENV: &str = "RESOURCE_TRACKER_IN_TEST_MODE";

/// The source of truth for entries.
#[async_trait::async_trait]
pub trait Backend {
    /// Returns every entry of `category`, in the order the backend lists them.
    async fn fetch(&mut self, category: Category) -> Res<Vec<Entry>>;

    /// Persists `entry` and returns the acknowledged entry, which carries the assigned id.
    async fn submit(&mut self, entry: &Entry) -> Res<Entry>;
}

/// Which backend implementation to use.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Default)]
pub enum Mode {
    #[default]
    Http,
    Test,
}

impl Mode {
    /// Reads `RESOURCE_TRACKER_IN_TEST_MODE`.
    pub fn from_env() -> Self {
        match std::env::var(TEST_MODE_ENV) {
            Ok(value) if !value.is_empty() => Mode::Test,
            _ => Mode::Http,
        }
    }
}

/// Creates the backend selected by `mode`.
pub fn backend(config: &Config, mode: Mode) -> Res<Box<dyn Backend + Send>> {
    debug!("Using the {mode:?} backend");
    match mode {
        Mode::Http => Ok(Box::new(HttpBackend::new(config)?)),
        Mode::Test => Ok(Box::new(MemoryBackend::seeded())),
    }
}
