//! Implements the `Backend` trait over the portal's JSON HTTP endpoints.

use crate::api::Backend;
use crate::error::Res;
use crate::model::{Category, Entry};
use crate::Config;
use anyhow::{bail, Context};
use serde_json::Value;
use tracing::{debug, trace};
use url::Url;

/// Talks to `{base}/api/{category}`: `GET` lists a collection and `POST` adds to it.
pub struct HttpBackend {
    base_url: Url,
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(config: &Config) -> Res<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .context("Unable to build the HTTP client")?;
        Ok(Self {
            base_url: config.api_base_url().clone(),
            client,
        })
    }

    fn collection_url(&self, category: Category) -> Res<Url> {
        self.base_url
            .join(&format!("api/{}", category.slug()))
            .with_context(|| format!("Unable to build the URL for {category}"))
    }
}

#[async_trait::async_trait]
impl Backend for HttpBackend {
    async fn fetch(&mut self, category: Category) -> Res<Vec<Entry>> {
        let url = self.collection_url(category)?;
        debug!("GET {url}");
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("Failed to fetch {category} entries"))?;
        let body = read_body(response, &url).await?;
        let rows = match unwrap_data(body) {
            Value::Array(rows) => rows,
            other => bail!("Expected a list of {category} entries, got {other}"),
        };
        trace!("Received {} {category} entries", rows.len());
        rows.into_iter()
            .map(|row| Entry::from_json(category, row))
            .collect()
    }

    async fn submit(&mut self, entry: &Entry) -> Res<Entry> {
        let category = entry.category();
        let url = self.collection_url(category)?;
        debug!("POST {url}");
        let response = self
            .client
            .post(url.clone())
            .json(&entry.to_json()?)
            .send()
            .await
            .with_context(|| format!("Failed to submit {category} entry"))?;
        let body = read_body(response, &url).await?;
        Entry::from_json(category, unwrap_data(body))
    }
}

async fn read_body(response: reqwest::Response, url: &Url) -> Res<Value> {
    let status = response.status();
    let text = response
        .text()
        .await
        .unwrap_or_else(|_| "Unable to read response body".to_string());
    if !status.is_success() {
        bail!("{url} responded with status {status}: {text}");
    }
    serde_json::from_str(&text).with_context(|| format!("{url} did not return valid JSON"))
}

/// Some endpoints wrap their payload as `{"data": ...}`.
fn unwrap_data(body: Value) -> Value {
    match body {
        Value::Object(mut map) if map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}
