use async_trait::async_trait;
use scraper::{ElementRef, Html};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument};

use super::{element_text, first_text, selector, CatalogSource};
use crate::app::ports::HttpClientPort;
use crate::constants::fill_template;
use crate::error::{Result, ScraperError};
use crate::observability::metrics::{emit_counter, MetricName};
use crate::types::{CatalogEntry, Vendor};

/// A row of the AMD processor specification table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmdProductRef {
    pub title: String,
    pub product_id: String,
}

/// amd.com catalog crawler.
///
/// AMD's application gateway blocks clients that crawl too quickly, so a
/// delay is awaited after every product page.
pub struct AmdCatalog {
    http: Arc<dyn HttpClientPort>,
    processors_url: String,
    product_url: String,
    delay: Duration,
}

impl AmdCatalog {
    pub fn new(
        http: Arc<dyn HttpClientPort>,
        processors_url: String,
        product_url: String,
        delay: Duration,
    ) -> Self {
        Self {
            http,
            processors_url,
            product_url,
            delay,
        }
    }

    async fn fetch_product(&self, product_id: &str) -> Result<CatalogEntry> {
        let url = fill_template(&self.product_url, product_id);
        let body = self.http.get_text(&url).await?;
        parse_product_page(&body, &url)
    }
}

#[async_trait]
impl CatalogSource for AmdCatalog {
    fn vendor(&self) -> Vendor {
        Vendor::Amd
    }

    #[instrument(skip(self))]
    async fn fetch_catalog(&self) -> Result<Vec<CatalogEntry>> {
        debug!("Get AMD CPU-family information from {}", self.processors_url);
        let body = self.http.get_text(&self.processors_url).await?;
        let products = parse_processor_table(&body)?;

        let mut all_cpus = Vec::with_capacity(products.len());
        for product in products {
            let entry = self.fetch_product(&product.product_id).await.map_err(|e| {
                error!("Loading AMD CPU-info for ID {} failed: {}", product.product_id, e);
                e
            })?;
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            info!("AMD CPU-family: {}, CPU: {}", entry.family, entry.title);
            all_cpus.push(entry);
        }
        emit_counter(MetricName::FetchCatalogEntries, all_cpus.len() as u64);
        Ok(all_cpus)
    }
}

/// Product id from an `entity-<digits>` CSS class
fn entity_id(cell: ElementRef<'_>) -> Option<String> {
    cell.value()
        .classes()
        .filter_map(|class| class.strip_prefix("entity-"))
        .find(|id| !id.is_empty() && id.chars().all(|c| c.is_ascii_digit()))
        .map(str::to_string)
}

/// Titles and product ids of the specification table
pub fn parse_processor_table(html: &str) -> Result<Vec<AmdProductRef>> {
    let document = Html::parse_document(html);
    let row_selector = selector("table#spec-table tbody tr")?;
    let name_selector = selector(r#"td[headers="view-name-table-column"]"#)?;

    let mut products = Vec::new();
    for row in document.select(&row_selector) {
        let Some(cell) = row.select(&name_selector).next() else {
            continue;
        };
        let title = element_text(cell);
        let product_id = entity_id(cell).ok_or_else(|| {
            ScraperError::MissingField(format!("AMD CPU {title} does not have id"))
        })?;
        products.push(AmdProductRef { title, product_id });
    }
    Ok(products)
}

/// Product detail page. Some CPUs publish no launch date at all.
pub fn parse_product_page(html: &str, page_url: &str) -> Result<CatalogEntry> {
    let document = Html::parse_document(html);
    let root = document.root_element();

    let title = first_text(root, "div#block-amd-page-title h2")?
        .ok_or_else(|| ScraperError::MissingField(format!("title on {page_url}")))?;

    let specs_selector = selector("div#product-specs div.fieldset-wrapper")?;
    let specs = document
        .select(&specs_selector)
        .next()
        .ok_or_else(|| ScraperError::MissingField(format!("product specs on {page_url}")))?;

    let launch_raw = match first_text(specs, "div.field--name-field-launch-date div.field__item")? {
        Some(launch) => Some(launch),
        None => first_text(specs, "div.field--name-field-launch-date-new div.field__item")?,
    };
    let family = first_text(specs, "div.field--name-product-type div.field__item")?
        .ok_or_else(|| ScraperError::MissingField(format!("product type on {page_url}")))?;

    Ok(CatalogEntry {
        title,
        number: None,
        launch_raw,
        family,
        info_url: page_url.to_string(),
    })
}
