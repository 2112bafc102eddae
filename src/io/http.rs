use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use super::FetchSource;
use anyhow::{Result, bail};

/// HTTP source downloading the artifact in a single GET request
pub struct HttpSource {
    client: Client,
    url: String,
}

impl HttpSource {
    /// Create a new HTTP source
    ///
    /// Packaging artifacts are small enough to fetch whole, so no Range
    /// negotiation is attempted.
    pub fn new(url: String) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self { client, url })
    }
}

#[async_trait]
impl FetchSource for HttpSource {
    async fn fetch(&self) -> Result<Vec<u8>> {
        let resp = self.client.get(&self.url).send().await?;
        if !resp.status().is_success() {
            bail!("HTTP request failed with status: {}", resp.status());
        }
        Ok(resp.bytes().await?.to_vec())
    }
}
