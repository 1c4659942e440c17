use super::links;
use crate::config::SourceConfig;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("invalid spreadsheet link '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Failed to fetch from Google Drive (HTTP {status})")]
    Status { status: u16 },
    #[error("Failed to fetch from Google Drive: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Anything that can hand back the raw bytes of a spreadsheet download link.
#[async_trait]
pub trait SpreadsheetSource: Send + Sync {
    async fn fetch(&self, download_url: &str) -> Result<Vec<u8>, FetchError>;
}

/// Downloads spreadsheets over HTTP, optionally through a relay prefix.
#[derive(Debug, Clone)]
pub struct HttpSpreadsheetFetcher {
    client: reqwest::Client,
    proxy_prefix: Option<String>,
}

impl HttpSpreadsheetFetcher {
    pub fn new(timeout: Duration, proxy_prefix: Option<String>) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            proxy_prefix: proxy_prefix.filter(|prefix| !prefix.trim().is_empty()),
        })
    }

    pub fn from_config(config: &SourceConfig) -> Result<Self, FetchError> {
        Self::new(config.timeout, config.proxy_prefix.clone())
    }

    pub fn request_url(&self, download_url: &str) -> Result<String, FetchError> {
        let target = Url::parse(download_url).map_err(|source| FetchError::InvalidUrl {
            url: download_url.to_string(),
            source,
        })?;

        Ok(match &self.proxy_prefix {
            Some(prefix) => links::proxied_url(prefix, target.as_str()),
            None => target.into(),
        })
    }
}

#[async_trait]
impl SpreadsheetSource for HttpSpreadsheetFetcher {
    async fn fetch(&self, download_url: &str) -> Result<Vec<u8>, FetchError> {
        let request_url = self.request_url(download_url)?;
        debug!(url = %request_url, proxied = self.proxy_prefix.is_some(), "fetching spreadsheet");

        let response = self.client.get(&request_url).send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "spreadsheet download rejected");
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        debug!(bytes = body.len(), "spreadsheet downloaded");
        Ok(body.to_vec())
    }
}
