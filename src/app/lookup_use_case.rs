use tracing::{debug, info, warn};

use crate::apis::intel::IntelCatalog;
use crate::types::{CatalogEntry, CompatibilityEntry, CompatibilityLists, Vendor};

/// One Intel compatibility entry and what the ARK search found for it
#[derive(Debug, Clone)]
pub struct LookupResult {
    pub entry: CompatibilityEntry,
    pub found: Option<CatalogEntry>,
}

/// Use case for resolving Intel compatibility entries one by one through the
/// ARK search instead of the full catalog crawl
pub struct LookupUseCase {
    intel: IntelCatalog,
}

impl LookupUseCase {
    pub fn new(intel: IntelCatalog) -> Self {
        Self { intel }
    }

    /// Search every Intel entry; failed searches are logged and reported as `None`
    pub async fn run(&self, lists: &CompatibilityLists) -> Vec<LookupResult> {
        let mut results = Vec::new();
        let intel_entries = lists
            .iter()
            .flatten()
            .filter(|entry| Vendor::from_label(&entry.vendor) == Some(Vendor::Intel));

        for entry in intel_entries {
            debug!("Query for {}: {}", entry.vendor, entry.model_fragment);
            let found = match self.intel.search(&entry.model_fragment).await {
                Ok(cpu) => {
                    info!(
                        "{}, launched at: {}",
                        cpu.title,
                        cpu.launch_raw.as_deref().unwrap_or("unknown")
                    );
                    Some(cpu)
                }
                Err(e) => {
                    warn!("Lookup for {} failed: {}", entry.model_fragment, e);
                    None
                }
            };
            results.push(LookupResult {
                entry: entry.clone(),
                found,
            });
        }
        results
    }
}
