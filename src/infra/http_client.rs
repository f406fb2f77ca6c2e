use async_trait::async_trait;
use tracing::{debug, warn};

use crate::app::ports::HttpClientPort;
use crate::config::SourcesConfig;
use crate::error::Result;
use crate::observability::metrics::{emit_counter, MetricName};

/// Shared reqwest client carrying the configured user agent and timeout
pub struct ReqwestHttp {
    client: reqwest::Client,
}

impl ReqwestHttp {
    pub fn new(config: &SourcesConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout())
            .gzip(true)
            .deflate(true)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpClientPort for ReqwestHttp {
    async fn get_text(&self, url: &str) -> Result<String> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|resp| resp.error_for_status());
        let response = match response {
            Ok(resp) => resp,
            Err(e) => {
                warn!("Request to {} failed: {}", url, e);
                emit_counter(MetricName::FetchRequestsError, 1);
                return Err(e.into());
            }
        };
        let body = response.text().await?;
        emit_counter(MetricName::FetchRequestsSuccess, 1);
        Ok(body)
    }
}
