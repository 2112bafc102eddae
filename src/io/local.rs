use super::FetchSource;
use anyhow::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Local file source reading the whole artifact from disk
pub struct LocalFileSource {
    path: PathBuf,
}

impl LocalFileSource {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }
}

#[async_trait]
impl FetchSource for LocalFileSource {
    async fn fetch(&self) -> Result<Vec<u8>> {
        Ok(tokio::fs::read(&self.path).await?)
    }
}
