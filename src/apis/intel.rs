use async_trait::async_trait;
use scraper::Html;
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

use super::{element_text, first_text, resolve_link, selector, CatalogSource};
use crate::app::ports::HttpClientPort;
use crate::constants::{fill_template, INTEL_PANEL_KEYS};
use crate::error::{Result, ScraperError};
use crate::observability::metrics::{emit_counter, MetricName};
use crate::types::{CatalogEntry, Vendor};

/// A processor family linked from the ARK processors page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntelFamily {
    pub name: String,
    pub url: String,
}

/// Intel ARK catalog crawler
pub struct IntelCatalog {
    http: Arc<dyn HttpClientPort>,
    processors_url: String,
    search_url: String,
}

impl IntelCatalog {
    pub fn new(http: Arc<dyn HttpClientPort>, processors_url: String, search_url: String) -> Self {
        Self {
            http,
            processors_url,
            search_url,
        }
    }

    /// Look a single model up through the ARK search, which redirects to the
    /// product page on an exact hit
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str) -> Result<CatalogEntry> {
        let search_url = fill_template(&self.search_url, query);
        debug!("Get Intel CPU information for {} from {}", query, search_url);
        let body = self.http.get_text(&search_url).await?;
        let product_url = parse_search_redirect(&body, &search_url)?.ok_or_else(|| {
            ScraperError::MissingField(format!("no ARK search results for '{query}'"))
        })?;
        debug!("CPU-info is at {}", product_url);
        self.fetch_product(&product_url).await
    }

    async fn fetch_product(&self, url: &str) -> Result<CatalogEntry> {
        let body = self.http.get_text(url).await?;
        parse_product_page(&body, url)
    }

    async fn fetch_family(&self, family: &IntelFamily) -> Result<Vec<CatalogEntry>> {
        let body = self.http.get_text(&family.url).await?;
        let product_urls = parse_family_products(&body, &family.url)?;

        let mut cpus = Vec::with_capacity(product_urls.len());
        for url in product_urls {
            let entry = self.fetch_product(&url).await.map_err(|e| {
                error!("Loading Intel CPU-info from {} failed: {}", url, e);
                e
            })?;
            info!("Intel CPU-family: {}, CPU: {}", family.name, entry.title);
            cpus.push(entry);
        }
        Ok(cpus)
    }
}

#[async_trait]
impl CatalogSource for IntelCatalog {
    fn vendor(&self) -> Vendor {
        Vendor::Intel
    }

    #[instrument(skip(self))]
    async fn fetch_catalog(&self) -> Result<Vec<CatalogEntry>> {
        debug!("Get Intel CPU-family information from {}", self.processors_url);
        let body = self.http.get_text(&self.processors_url).await?;
        let families = parse_family_links(&body, &self.processors_url)?;

        let mut all_cpus = Vec::new();
        for family in &families {
            debug!("Got Intel CPU-family {}", family.name);
            all_cpus.extend(self.fetch_family(family).await?);
        }
        info!("Fetched {} Intel CPUs from {} families", all_cpus.len(), families.len());
        emit_counter(MetricName::FetchCatalogEntries, all_cpus.len() as u64);
        Ok(all_cpus)
    }
}

/// Family links of the processor panels we catalog, in panel order
pub fn parse_family_links(html: &str, page_url: &str) -> Result<Vec<IntelFamily>> {
    let document = Html::parse_document(html);
    let link_selector = selector("a")?;

    let mut families = Vec::new();
    for key in INTEL_PANEL_KEYS {
        let panel_selector = selector(&format!(
            r#"div.products.processors[data-parent-panel-key="{key}"]"#
        ))?;
        for panel in document.select(&panel_selector) {
            for link in panel.select(&link_selector) {
                let Some(href) = link.value().attr("href") else {
                    continue;
                };
                families.push(IntelFamily {
                    name: element_text(link),
                    url: resolve_link(page_url, href)?,
                });
            }
        }
    }
    Ok(families)
}

/// Product page links of a family's product table
pub fn parse_family_products(html: &str, page_url: &str) -> Result<Vec<String>> {
    let document = Html::parse_document(html);
    let row_selector = selector("table#product-table tbody tr")?;
    let link_selector = selector(r#"td[data-component="arkproductlink"] a"#)?;

    let mut urls = Vec::new();
    for row in document.select(&row_selector) {
        let href = row
            .select(&link_selector)
            .next()
            .and_then(|link| link.value().attr("href"))
            .ok_or_else(|| ScraperError::MissingField("ARK product link".into()))?;
        urls.push(resolve_link(page_url, href)?);
    }
    Ok(urls)
}

/// Product detail page. Legacy CPUs may lack a number or a launch quarter.
pub fn parse_product_page(html: &str, page_url: &str) -> Result<CatalogEntry> {
    let document = Html::parse_document(html);
    let root = document.root_element();

    let title = first_text(root, "h1.h1")?
        .ok_or_else(|| ScraperError::MissingField(format!("title on {page_url}")))?;
    let number = first_text(root, r#"span.value[data-key="ProcessorNumber"]"#)?;
    let launch_raw = first_text(root, r#"span.value[data-key="BornOnDate"]"#)?;
    let family = first_text(root, r#"span.value[data-key="ProductGroup"] a"#)?
        .ok_or_else(|| ScraperError::MissingField(format!("product group on {page_url}")))?;

    Ok(CatalogEntry {
        title,
        number,
        launch_raw,
        family,
        info_url: page_url.to_string(),
    })
}

/// Product page a search redirects to, if the search had an exact hit
pub fn parse_search_redirect(html: &str, search_url: &str) -> Result<Option<String>> {
    let document = Html::parse_document(html);
    let redirect_selector = selector("input#FormRedirectUrl")?;
    document
        .select(&redirect_selector)
        .next()
        .and_then(|input| input.value().attr("value"))
        .map(|path| resolve_link(search_url, path))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apis::fixtures::FixtureHttp;

    const PROCESSORS_URL: &str = "https://ark.intel.com/content/www/us/en/ark.html#@Processors";
    const SEARCH_URL: &str = "https://ark.intel.com/content/www/us/en/ark/search.html?_charset_=UTF-8&q={}";
    const FAMILY_URL: &str =
        "https://ark.intel.com/content/www/us/en/ark/products/series/87465/intel-atom-processor-x-series.html";
    const PRODUCT_URL: &str =
        "https://ark.intel.com/content/www/us/en/ark/products/207907/intel-atom-x6427fe-processor.html";

    const PROCESSORS_PAGE: &str = r#"
        <div class="products processors" data-parent-panel-key="PanelLabel29035">
          <a href="/content/www/us/en/ark/products/series/87465/intel-atom-processor-x-series.html">Intel Atom® Processor X Series</a>
        </div>
        <div class="products processors" data-parent-panel-key="PanelLabel99999">
          <a href="/content/www/us/en/ark/products/series/1/unrelated.html">Unrelated</a>
        </div>
        <div class="products processors" data-parent-panel-key="PanelLabel122139">
          <a href="/content/www/us/en/ark/products/series/123/core.html">Intel® Core™ Processors</a>
        </div>
    "#;

    const FAMILY_PAGE: &str = r#"
        <table id="product-table"><tbody>
          <tr><td data-component="arkproductlink"><a href="/content/www/us/en/ark/products/207907/intel-atom-x6427fe-processor.html">Intel Atom® x6427FE Processor</a></td></tr>
        </tbody></table>
    "#;

    const PRODUCT_PAGE: &str = r#"
        <h1 class="h1">Intel Atom® x6427FE Processor </h1>
        <span class="value" data-key="ProcessorNumber">6427FE</span>
        <span class="value" data-key="BornOnDate">Q1'21</span>
        <span class="value" data-key="ProductGroup">
          <a href="/content/www/us/en/ark/products/series/87465/intel-atom-processor-x-series.html" class="ark-accessible-color hrefcolor">Intel Atom® Processor X Series</a>
        </span>
    "#;

    #[test]
    fn test_family_links_follow_panel_order() {
        let families = parse_family_links(PROCESSORS_PAGE, PROCESSORS_URL).unwrap();
        let names: Vec<&str> = families.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["Intel® Core™ Processors", "Intel Atom® Processor X Series"]);
        assert_eq!(families[1].url, FAMILY_URL);
    }

    #[test]
    fn test_product_page_fields() {
        let entry = parse_product_page(PRODUCT_PAGE, PRODUCT_URL).unwrap();
        assert_eq!(entry.title, "Intel Atom® x6427FE Processor");
        assert_eq!(entry.number.as_deref(), Some("6427FE"));
        assert_eq!(entry.launch_raw.as_deref(), Some("Q1'21"));
        assert_eq!(entry.family, "Intel Atom® Processor X Series");
        assert_eq!(entry.info_url, PRODUCT_URL);
    }

    #[test]
    fn test_legacy_product_without_number_or_launch() {
        let html = r#"
            <h1 class="h1">Intel® Pentium® 4 Processor 2.80 GHz</h1>
            <span class="value" data-key="ProductGroup"><a href="/x">Legacy Intel® Pentium® Processor</a></span>
        "#;
        let entry = parse_product_page(html, PRODUCT_URL).unwrap();
        assert_eq!(entry.number, None);
        assert_eq!(entry.launch_raw, None);
    }

    #[test]
    fn test_product_page_without_group_is_an_error() {
        let html = r#"<h1 class="h1">Intel® Something</h1>"#;
        assert!(matches!(
            parse_product_page(html, PRODUCT_URL),
            Err(ScraperError::MissingField(_))
        ));
    }

    #[test]
    fn test_search_redirect() {
        let html = r#"<input id="FormRedirectUrl" type="hidden" value="/content/www/us/en/ark/products/207907/intel-atom-x6427fe-processor.html"/>"#;
        let url = parse_search_redirect(html, SEARCH_URL).unwrap();
        assert_eq!(url.as_deref(), Some(PRODUCT_URL));
        assert_eq!(parse_search_redirect("<p>No results</p>", SEARCH_URL).unwrap(), None);
    }

    #[tokio::test]
    async fn test_fetch_catalog_walks_families_and_products() {
        let core_page = r#"<table id="product-table"><tbody></tbody></table>"#;
        let http = Arc::new(
            FixtureHttp::default()
                .with_page(PROCESSORS_URL, PROCESSORS_PAGE)
                .with_page(
                    "https://ark.intel.com/content/www/us/en/ark/products/series/123/core.html",
                    core_page,
                )
                .with_page(FAMILY_URL, FAMILY_PAGE)
                .with_page(PRODUCT_URL, PRODUCT_PAGE),
        );
        let catalog = IntelCatalog::new(http.clone(), PROCESSORS_URL.into(), SEARCH_URL.into());

        assert_eq!(catalog.vendor(), Vendor::Intel);
        let cpus = catalog.fetch_catalog().await.unwrap();
        assert_eq!(cpus.len(), 1);
        assert_eq!(cpus[0].number.as_deref(), Some("6427FE"));
        assert_eq!(http.requests.lock().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_search_without_results_is_an_error() {
        let search = fill_template(SEARCH_URL, "x6200FE");
        let http = Arc::new(FixtureHttp::default().with_page(&search, "<p>No results</p>"));
        let catalog = IntelCatalog::new(http, PROCESSORS_URL.into(), SEARCH_URL.into());
        assert!(matches!(
            catalog.search("x6200FE").await,
            Err(ScraperError::MissingField(_))
        ));
    }
}
