use std::sync::Arc;
use tracing::{info, info_span, Instrument};

use crate::apis::amd::AmdCatalog;
use crate::apis::compatibility::CompatibilityListFetcher;
use crate::apis::intel::IntelCatalog;
use crate::apis::CatalogSource;
use crate::app::ports::HttpClientPort;
use crate::config::SourcesConfig;
use crate::constants::COMPATIBILITY_FILENAME;
use crate::error::Result;
use crate::storage::StagingStore;
use crate::types::{Catalogs, CompatibilityLists};

/// Use case for fetching the compatibility lists and vendor catalogs and
/// staging them on disk
pub struct ScrapeUseCase {
    compatibility: CompatibilityListFetcher,
    sources: Vec<Box<dyn CatalogSource>>,
    store: StagingStore,
}

impl ScrapeUseCase {
    pub fn new(
        compatibility: CompatibilityListFetcher,
        sources: Vec<Box<dyn CatalogSource>>,
        store: StagingStore,
    ) -> Self {
        Self {
            compatibility,
            sources,
            store,
        }
    }

    /// Wire up the public Intel and AMD sources over one HTTP client
    pub fn from_config(
        http: Arc<dyn HttpClientPort>,
        config: &SourcesConfig,
        store: StagingStore,
    ) -> Self {
        let compatibility =
            CompatibilityListFetcher::new(http.clone(), config.compatibility_urls.clone());
        let sources: Vec<Box<dyn CatalogSource>> = vec![
            Box::new(IntelCatalog::new(
                http.clone(),
                config.intel_processors_url.clone(),
                config.intel_search_url.clone(),
            )),
            Box::new(AmdCatalog::new(
                http,
                config.amd_processors_url.clone(),
                config.amd_product_url.clone(),
                config.amd_delay(),
            )),
        ];
        Self::new(compatibility, sources, store)
    }

    /// Fetch everything not yet staged (everything, with `force`)
    pub async fn run(&self, force: bool) -> Result<(CompatibilityLists, Catalogs)> {
        let lists = self
            .store
            .load_or_fetch(COMPATIBILITY_FILENAME, force, || {
                self.compatibility.fetch_lists()
            })
            .await?;
        info!("{} compatibility lists ready", lists.len());

        let mut catalogs = Catalogs::new();
        for source in &self.sources {
            let vendor = source.vendor();
            let span = info_span!("catalog", vendor = %vendor);
            let entries = self
                .store
                .load_or_fetch(StagingStore::vendor_filename(vendor), force, || {
                    source.fetch_catalog()
                })
                .instrument(span)
                .await?;
            info!("{} catalog ready with {} entries", vendor, entries.len());
            catalogs.insert(vendor.label().to_string(), entries);
            self.store.save_catalogs(&catalogs, false)?;
        }

        self.store.save_catalogs(&catalogs, true)?;
        Ok((lists, catalogs))
    }
}
