//! Recast Fetch
//!
//! Retrieval of recording assets (metadata, shape descriptor, slide images,
//! webcam recording) over HTTP, behind the [`Fetcher`] trait so the assembly
//! pipeline can run against in-memory doubles.

pub mod session;

use std::path::Path;
use std::time::Duration;

use bytes::Bytes;
use futures::StreamExt;
use tokio::io::AsyncWriteExt;

use recast_common::error::{RecastError, RecastResult};

pub use session::SessionUrl;

/// Retrieval capability used by the pipeline.
#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    /// Download a resource into memory.
    async fn fetch(&self, url: &str) -> RecastResult<Bytes>;

    /// Stream a resource to `path`, returning the number of bytes written.
    async fn fetch_to_file(&self, url: &str, path: &Path) -> RecastResult<u64>;
}

/// [`Fetcher`] backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> RecastResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("recast/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| RecastError::config(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    async fn get(&self, url: &str) -> RecastResult<reqwest::Response> {
        let response = self.client.get(url).send().await.map_err(|e| {
            RecastError::network(url, e.status().map(|s| s.as_u16()), e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RecastError::network(
                url,
                Some(status.as_u16()),
                format!("server answered {status}"),
            ));
        }
        Ok(response)
    }
}

#[async_trait::async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> RecastResult<Bytes> {
        tracing::debug!(url, "Fetching");
        let body = self
            .get(url)
            .await?
            .bytes()
            .await
            .map_err(|e| RecastError::network(url, None, format!("Failed reading body: {e}")))?;
        tracing::debug!(url, bytes = body.len(), "Fetched");
        Ok(body)
    }

    async fn fetch_to_file(&self, url: &str, path: &Path) -> RecastResult<u64> {
        tracing::debug!(url, path = %path.display(), "Downloading");
        let response = self.get(url).await?;

        let mut file = tokio::fs::File::create(path)
            .await
            .map_err(|e| RecastError::filesystem(path, e))?;
        let mut stream = response.bytes_stream();
        let mut written = 0u64;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| {
                RecastError::network(url, None, format!("Download interrupted: {e}"))
            })?;
            file.write_all(&chunk)
                .await
                .map_err(|e| RecastError::filesystem(path, e))?;
            written += chunk.len() as u64;
        }
        file.flush()
            .await
            .map_err(|e| RecastError::filesystem(path, e))?;

        tracing::debug!(url, path = %path.display(), bytes = written, "Downloaded");
        Ok(written)
    }
}
