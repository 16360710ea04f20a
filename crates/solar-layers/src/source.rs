//! Where raster bytes come from.

use std::collections::HashMap;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use tracing::debug;

use crate::config::LayerConfig;
use crate::error::{LayerError, LayerResult};

/// Retrieves the raw bytes behind a raster URL.
///
/// Implementations do not retry. Timeouts are applied by the caller.
#[async_trait]
pub trait RasterSource: Send + Sync {
    async fn fetch(&self, url: &str) -> LayerResult<Bytes>;
}

/// Plain HTTP GET via reqwest. Any non-2xx status is a transport error.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
}

impl HttpSource {
    pub fn new(config: &LayerConfig) -> LayerResult<Self> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| LayerError::Config(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    /// Use an existing client, for callers that share one.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RasterSource for HttpSource {
    async fn fetch(&self, url: &str) -> LayerResult<Bytes> {
        let transport = |message: String| LayerError::Transport {
            url: url.to_string(),
            message,
        };

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(transport(format!("HTTP {}", status)));
        }

        let body = response.bytes().await.map_err(|e| transport(e.to_string()))?;
        debug!(url, bytes = body.len(), "Fetched raster");
        Ok(body)
    }
}

/// Serves rasters from memory, keyed by URL.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    entries: HashMap<String, Bytes>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, url: impl Into<String>, data: impl Into<Bytes>) {
        self.entries.insert(url.into(), data.into());
    }

    pub fn with(mut self, url: impl Into<String>, data: impl Into<Bytes>) -> Self {
        self.insert(url, data);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl RasterSource for MemorySource {
    async fn fetch(&self, url: &str) -> LayerResult<Bytes> {
        self.entries
            .get(url)
            .cloned()
            .ok_or_else(|| LayerError::Transport {
                url: url.to_string(),
                message: "not found".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_source() {
        let source = MemorySource::new().with("mem://a", vec![1u8, 2, 3]);
        assert_eq!(source.len(), 1);
        assert_eq!(source.fetch("mem://a").await.unwrap(), Bytes::from_static(&[1, 2, 3]));

        let err = source.fetch("mem://b").await.unwrap_err();
        assert!(err.is_transport());
        assert_eq!(err.to_string(), "Failed to fetch mem://b: not found");
    }

    #[test]
    fn test_http_source_builds_from_default_config() {
        assert!(HttpSource::new(&LayerConfig::default()).is_ok());
    }
}
