use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the configuration file at `path`, pointing at the backend at `api_base_url`, with
/// default timing and chart settings.
///
/// # Errors
/// - Returns an error if the file already exists, the URL is not http(s), or writing fails.
pub async fn init(path: &Path, api_base_url: &str) -> Result<Out<()>> {
    let config = Config::create(path, api_base_url).await?;
    let written = config
        .path()
        .context("The new configuration has no path")
        .pub_result(ErrorType::Config)?;
    Ok(format!(
        "Created {} for the backend at {}",
        written.display(),
        config.api_base_url()
    )
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_init_writes_loadable_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let out = init(&path, "https://portal.example.org").await.unwrap();
        assert!(out.message().contains("https://portal.example.org/"));
        let config = Config::load(&path).await.unwrap();
        assert_eq!(config.api_base_url().as_str(), "https://portal.example.org/");

        let err = init(&path, "https://portal.example.org").await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Config);
    }
}
