//! Shared HTTP client and the JSON document fetcher
//!
//! [`HttpJsonFetcher`] reads `http(s)://` documents over the network and
//! `file://` or plain paths from disk, so DriverLog data can be pinned to a
//! local snapshot.

use async_trait::async_trait;
use ddmerge_core::{DatasetResult, JsonFetcher};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::PathBuf;
use tracing::debug;

use crate::config::RemoteConfig;
use crate::error::RemoteError;
use crate::Result;

/// Thin wrapper over `reqwest::Client` configured from [`RemoteConfig`]
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: reqwest::Client,
}

impl HttpClient {
    pub fn new(config: &RemoteConfig) -> Result<Self> {
        let inner = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout())
            .build()
            .map_err(|e| RemoteError::Client(e.to_string()))?;
        Ok(HttpClient { inner })
    }

    /// GET `url` and return the body, failing on non-success status
    pub async fn get_text(&self, url: &str) -> Result<String> {
        debug!(url = %url, "GET");
        let response = self.inner.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RemoteError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response.text().await?)
    }

    /// GET `url` and decode the body as JSON
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let body = self.get_text(url).await?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// Where a JSON uri points
#[derive(Debug, Clone, PartialEq, Eq)]
enum JsonLocation {
    Http(String),
    File(PathBuf),
}

fn locate(uri: &str) -> Result<JsonLocation> {
    if uri.starts_with("http://") || uri.starts_with("https://") {
        return Ok(JsonLocation::Http(uri.to_string()));
    }
    if let Some(path) = uri.strip_prefix("file://") {
        return Ok(JsonLocation::File(PathBuf::from(path)));
    }
    if uri.contains("://") || uri.is_empty() {
        return Err(RemoteError::InvalidUri(uri.to_string()));
    }
    Ok(JsonLocation::File(PathBuf::from(uri)))
}

/// [`JsonFetcher`] over HTTP(S) and the local filesystem
#[derive(Debug, Clone)]
pub struct HttpJsonFetcher {
    client: HttpClient,
}

impl HttpJsonFetcher {
    pub fn new(client: HttpClient) -> Self {
        HttpJsonFetcher { client }
    }

    pub fn from_config(config: &RemoteConfig) -> Result<Self> {
        Ok(Self::new(HttpClient::new(config)?))
    }

    async fn read(&self, uri: &str) -> Result<Value> {
        match locate(uri)? {
            JsonLocation::Http(url) => self.client.get_json(&url).await,
            JsonLocation::File(path) => {
                let raw = tokio::fs::read_to_string(&path).await?;
                Ok(serde_json::from_str(&raw)?)
            }
        }
    }
}

#[async_trait]
impl JsonFetcher for HttpJsonFetcher {
    async fn read_json(&self, uri: &str) -> DatasetResult<Value> {
        self.read(uri).await.map_err(|e| e.into_fetch(uri))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ddmerge_core::DatasetError;
    use tempfile::tempdir;

    #[test]
    fn test_locate() {
        assert_eq!(
            locate("https://example.org/d.json").unwrap(),
            JsonLocation::Http("https://example.org/d.json".to_string())
        );
        assert_eq!(
            locate("file:///tmp/d.json").unwrap(),
            JsonLocation::File(PathBuf::from("/tmp/d.json"))
        );
        assert_eq!(
            locate("data/d.json").unwrap(),
            JsonLocation::File(PathBuf::from("data/d.json"))
        );
        assert!(locate("ftp://example.org/d.json").is_err());
        assert!(locate("").is_err());
    }

    #[tokio::test]
    async fn test_read_json_from_file_uri() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("driverlog.json");
        std::fs::write(&path, br#"{"drivers": []}"#).unwrap();

        let fetcher = HttpJsonFetcher::from_config(&RemoteConfig::default()).unwrap();
        let doc = fetcher
            .read_json(&format!("file://{}", path.display()))
            .await
            .unwrap();
        assert_eq!(doc, serde_json::json!({"drivers": []}));
    }

    #[tokio::test]
    async fn test_missing_file_is_fetch_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("absent.json");
        let fetcher = HttpJsonFetcher::from_config(&RemoteConfig::default()).unwrap();
        let err = fetcher
            .read_json(path.to_str().unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, DatasetError::Fetch { .. }));
    }

    #[tokio::test]
    async fn test_invalid_json_is_fetch_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, b"{drivers: ").unwrap();
        let fetcher = HttpJsonFetcher::from_config(&RemoteConfig::default()).unwrap();
        let err = fetcher
            .read_json(path.to_str().unwrap())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("JSON parsing error"));
    }
}
