use async_trait::async_trait;

use crate::error::Result;

/// Fetches a page body; implemented over reqwest in `infra::http_client`
#[async_trait]
pub trait HttpClientPort: Send + Sync {
    async fn get_text(&self, url: &str) -> Result<String>;
}
