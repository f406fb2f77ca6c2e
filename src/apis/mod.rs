//! Fetchers for the compatibility lists and the vendor catalogs.
//!
//! Every fetcher keeps its HTML parsing in plain functions over the page body
//! so the parsing can be exercised without the network.

pub mod amd;
pub mod compatibility;
pub mod intel;

use async_trait::async_trait;
use reqwest::Url;
use scraper::{ElementRef, Selector};

use crate::error::{Result, ScraperError};
use crate::types::{CatalogEntry, Vendor};

/// A vendor's own product catalog
#[async_trait]
pub trait CatalogSource: Send + Sync {
    fn vendor(&self) -> Vendor;

    /// Fetch every catalog entry, in the order the vendor site lists them
    async fn fetch_catalog(&self) -> Result<Vec<CatalogEntry>>;
}

pub(crate) fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| ScraperError::Selector(format!("{css}: {e:?}")))
}

/// Concatenated, trimmed text content of an element
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Text of the first element under `root` matching `css`
pub(crate) fn first_text(root: ElementRef<'_>, css: &str) -> Result<Option<String>> {
    let sel = selector(css)?;
    Ok(root.select(&sel).next().map(element_text))
}

/// Resolve a (usually site-relative) link against the page it appeared on
pub(crate) fn resolve_link(base: &str, link: &str) -> Result<String> {
    let base = Url::parse(base).map_err(|e| ScraperError::InvalidUrl(format!("{base}: {e}")))?;
    base.join(link)
        .map(|url| url.to_string())
        .map_err(|e| ScraperError::InvalidUrl(format!("{link}: {e}")))
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_link_keeps_scheme_and_host() {
        let url = resolve_link(
            "https://ark.intel.com/content/www/us/en/ark.html#@Processors",
            "/content/www/us/en/ark/products/series/87465/intel-atom-processor-x-series.html",
        )
        .unwrap();
        assert_eq!(
            url,
            "https://ark.intel.com/content/www/us/en/ark/products/series/87465/intel-atom-processor-x-series.html"
        );
    }

    #[test]
    fn test_resolve_link_rejects_bad_base() {
        assert!(matches!(
            resolve_link("not a url", "/x"),
            Err(ScraperError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_invalid_selector_is_an_error() {
        assert!(matches!(selector("td[["), Err(ScraperError::Selector(_))));
    }
}
