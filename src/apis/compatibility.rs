use scraper::Html;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use super::{element_text, selector};
use crate::app::ports::HttpClientPort;
use crate::error::{Result, ScraperError};
use crate::observability::metrics::{emit_counter, MetricName};
use crate::types::{CompatibilityEntry, CompatibilityLists};

/// Scrapes the official supported-processor pages, one list per platform
pub struct CompatibilityListFetcher {
    http: Arc<dyn HttpClientPort>,
    urls: Vec<String>,
}

impl CompatibilityListFetcher {
    pub fn new(http: Arc<dyn HttpClientPort>, urls: Vec<String>) -> Self {
        Self { http, urls }
    }

    #[instrument(skip(self))]
    pub async fn fetch_lists(&self) -> Result<CompatibilityLists> {
        let mut lists = Vec::with_capacity(self.urls.len());
        for url in &self.urls {
            debug!("Get compatibility list from {}", url);
            let body = self.http.get_text(url).await?;
            let list = parse_compatibility_table(&body)?;
            info!("{} compatible CPUs listed at {}", list.len(), url);
            emit_counter(MetricName::FetchCompatibilityEntries, list.len() as u64);
            lists.push(list);
        }
        Ok(lists)
    }
}

/// Parse the manufacturer / brand / model table of a compatibility page.
///
/// Every row must have exactly three cells.
pub fn parse_compatibility_table(html: &str) -> Result<Vec<CompatibilityEntry>> {
    let document = Html::parse_document(html);
    let body_selector = selector("main#main table tbody")?;
    let row_selector = selector("tr")?;
    let cell_selector = selector("td")?;

    let tbody = document
        .select(&body_selector)
        .next()
        .ok_or_else(|| ScraperError::MissingField("compatibility table not found".into()))?;

    let mut entries = Vec::new();
    for row in tbody.select(&row_selector) {
        let cells: Vec<String> = row.select(&cell_selector).map(element_text).collect();
        match <[String; 3]>::try_from(cells) {
            Ok([vendor, brand, model]) => {
                entries.push(CompatibilityEntry::new(vendor, brand, model))
            }
            Err(cells) => {
                return Err(ScraperError::InvalidRow(format!(
                    "expected 3 cells, got {}: {:?}",
                    cells.len(),
                    cells
                )))
            }
        }
    }
    Ok(entries)
}
