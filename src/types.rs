use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::constants::{AMD_VENDOR, INTEL_VENDOR};

/// CPU vendors that have a catalog to reconcile against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Vendor {
    Intel,
    Amd,
}

impl Vendor {
    pub const ALL: [Vendor; 2] = [Vendor::Intel, Vendor::Amd];

    /// Canonical vendor name, used as the catalog map key
    pub fn label(&self) -> &'static str {
        match self {
            Vendor::Intel => INTEL_VENDOR,
            Vendor::Amd => AMD_VENDOR,
        }
    }

    /// Recognize a manufacturer cell from the compatibility list.
    ///
    /// The list writes manufacturers with trademark decorations (`Intel®`),
    /// so only the prefix is compared. Other platforms (Qualcomm) yield `None`.
    pub fn from_label(raw: &str) -> Option<Vendor> {
        let raw = raw.trim();
        if raw.starts_with(INTEL_VENDOR) {
            Some(Vendor::Intel)
        } else if raw.starts_with(AMD_VENDOR) {
            Some(Vendor::Amd)
        } else {
            None
        }
    }
}

impl fmt::Display for Vendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One row of the official compatibility list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompatibilityEntry {
    pub vendor: String,
    pub brand: String,
    pub model_fragment: String,
}

impl CompatibilityEntry {
    pub fn new(
        vendor: impl Into<String>,
        brand: impl Into<String>,
        model_fragment: impl Into<String>,
    ) -> Self {
        Self {
            vendor: vendor.into(),
            brand: brand.into(),
            model_fragment: model_fragment.into(),
        }
    }
}

/// One row of a vendor's own product catalog.
///
/// Entries are identified by their position in the vendor's catalog sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub title: String,
    /// Legacy CPUs may not have a processor number at all
    pub number: Option<String>,
    /// Launch date exactly as the vendor site prints it
    pub launch_raw: Option<String>,
    pub family: String,
    pub info_url: String,
}

/// A catalog entry merged with its compatibility status and launch quarter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedRecord {
    pub title: String,
    pub number: Option<String>,
    pub is_compatible: bool,
    pub launch_normalized: Option<String>,
    pub launch_raw: Option<String>,
    pub family: String,
    pub info_url: String,
}

/// Compatibility lists as scraped, one inner list per platform page
pub type CompatibilityLists = Vec<Vec<CompatibilityEntry>>;

/// Vendor catalogs keyed by vendor label
pub type Catalogs = BTreeMap<String, Vec<CatalogEntry>>;

/// Reconciled records keyed by vendor label
pub type EnrichedCatalogs = BTreeMap<String, Vec<EnrichedRecord>>;
