mod http;
mod local;

pub use http::HttpSource;
pub use local::LocalFileSource;

use anyhow::Result;
use async_trait::async_trait;

/// Trait for fetching a complete artifact from a data source
#[async_trait]
pub trait FetchSource: Send + Sync {
    /// Read the whole artifact into memory
    async fn fetch(&self) -> Result<Vec<u8>>;
}
