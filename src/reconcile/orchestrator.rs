use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, info_span, warn};

use super::date::{LaunchDateNormalizer, PatternTableNormalizer};
use super::disambiguate::{disambiguate, MatchQuery};
use super::matcher::{CandidateMatcher, CandidateSet, SubstringMatcher};
use crate::error::ReconcileError;
use crate::observability::metrics::{emit_counter, MetricName};
use crate::types::{
    CatalogEntry, Catalogs, CompatibilityEntry, EnrichedCatalogs, EnrichedRecord, Vendor,
};

/// Per-entry condition worth surfacing to whoever runs the reconciliation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MatchEvent {
    Matched {
        vendor: String,
        fragment: String,
        titles: Vec<String>,
    },
    NotFound {
        vendor: String,
        brand: String,
        fragment: String,
    },
    /// Every listed title was marked compatible and needs a human look
    Ambiguous {
        vendor: String,
        brand: String,
        fragment: String,
        titles: Vec<String>,
    },
    /// A whole compatibility list had no catalog to reconcile against
    UnknownVendor { vendor: String, entries: usize },
}

impl MatchEvent {
    /// Whether the event should be reviewed by a person
    pub fn needs_review(&self) -> bool {
        matches!(self, MatchEvent::NotFound { .. } | MatchEvent::Ambiguous { .. })
    }
}

/// Counts for one vendor's reconciled catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VendorSummary {
    pub vendor: String,
    pub catalog_entries: usize,
    pub compatible: usize,
    pub undated: usize,
}

/// Result of one reconciliation run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    pub records: EnrichedCatalogs,
    pub events: Vec<MatchEvent>,
}

impl Reconciliation {
    pub fn summary(&self) -> Vec<VendorSummary> {
        self.records
            .iter()
            .map(|(vendor, records)| VendorSummary {
                vendor: vendor.clone(),
                catalog_entries: records.len(),
                compatible: records.iter().filter(|r| r.is_compatible).count(),
                undated: records.iter().filter(|r| r.launch_normalized.is_none()).count(),
            })
            .collect()
    }

    pub fn review_events(&self) -> impl Iterator<Item = &MatchEvent> {
        self.events.iter().filter(|event| event.needs_review())
    }
}

/// Merges compatibility lists into vendor catalogs
pub struct Reconciler {
    matcher: Box<dyn CandidateMatcher + Send + Sync>,
    normalizer: Box<dyn LaunchDateNormalizer + Send + Sync>,
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new()
    }
}

impl Reconciler {
    /// Substring matching and the launch-date pattern table
    pub fn new() -> Self {
        Self {
            matcher: Box::new(SubstringMatcher),
            normalizer: Box::new(PatternTableNormalizer),
        }
    }

    pub fn with_strategies(
        matcher: Box<dyn CandidateMatcher + Send + Sync>,
        normalizer: Box<dyn LaunchDateNormalizer + Send + Sync>,
    ) -> Self {
        Self {
            matcher,
            normalizer,
        }
    }

    /// Resolve every compatibility entry, then build one record per catalog entry.
    ///
    /// Fails only when a launch date cannot be normalized.
    pub fn reconcile(
        &self,
        compatibility_lists: &[Vec<CompatibilityEntry>],
        catalogs: &Catalogs,
    ) -> Result<Reconciliation, ReconcileError> {
        let mut compatible: BTreeMap<String, BTreeSet<usize>> = BTreeMap::new();
        let mut events = Vec::new();

        for list in compatibility_lists {
            let Some(first) = list.first() else {
                continue;
            };
            let vendor = match Vendor::from_label(&first.vendor)
                .map(|vendor| vendor.label())
                .filter(|label| catalogs.contains_key(*label))
            {
                Some(label) => label,
                None => {
                    let err = ReconcileError::UnknownVendor {
                        vendor: first.vendor.clone(),
                    };
                    info!("{}, skipping {} compatibility entries", err, list.len());
                    emit_counter(MetricName::ReconcileUnknownVendor, list.len() as u64);
                    events.push(MatchEvent::UnknownVendor {
                        vendor: first.vendor.clone(),
                        entries: list.len(),
                    });
                    continue;
                }
            };

            let span = info_span!("compatibility_list", vendor = %vendor, entries = list.len());
            let _enter = span.enter();
            let catalog = &catalogs[vendor];
            let resolved = compatible.entry(vendor.to_string()).or_default();

            for entry in list {
                emit_counter(MetricName::ReconcileEntriesProcessed, 1);
                let event = self.resolve_entry(vendor, entry, catalog, resolved);
                events.push(event);
            }
        }

        let mut records = EnrichedCatalogs::new();
        for (vendor, catalog) in catalogs {
            let resolved = compatible.get(vendor);
            let mut vendor_records = Vec::with_capacity(catalog.len());
            for (index, entry) in catalog.iter().enumerate() {
                let is_compatible = resolved.is_some_and(|set| set.contains(&index));
                vendor_records.push(self.enrich(entry, is_compatible)?);
            }
            emit_counter(MetricName::ReconcileRecordsBuilt, vendor_records.len() as u64);
            records.insert(vendor.clone(), vendor_records);
        }

        Ok(Reconciliation { records, events })
    }

    fn resolve_entry(
        &self,
        vendor: &str,
        entry: &CompatibilityEntry,
        catalog: &[CatalogEntry],
        resolved: &mut BTreeSet<usize>,
    ) -> MatchEvent {
        let query = MatchQuery {
            fragment: &entry.model_fragment,
            brand: &entry.brand,
        };
        // Indices past the end of the catalog are dropped
        let candidates: CandidateSet = self
            .matcher
            .candidates(query.fragment, catalog)
            .into_iter()
            .filter(|&index| index < catalog.len())
            .collect();

        if candidates.is_empty() {
            warn!(
                brand = %entry.brand,
                fragment = %entry.model_fragment,
                "CPU not found in {} catalog",
                vendor
            );
            emit_counter(MetricName::ReconcileNotFound, 1);
            return MatchEvent::NotFound {
                vendor: vendor.to_string(),
                brand: entry.brand.clone(),
                fragment: entry.model_fragment.clone(),
            };
        }

        let outcome = disambiguate(&query, candidates, catalog);
        let titles: Vec<String> = outcome
            .resolved
            .iter()
            .filter_map(|&index| catalog.get(index))
            .map(|cpu| cpu.title.clone())
            .collect();
        resolved.extend(outcome.resolved.iter().copied());

        if outcome.ambiguous {
            warn!(
                brand = %entry.brand,
                fragment = %entry.model_fragment,
                "Ambiguous match, {} candidates marked compatible: {}",
                titles.len(),
                titles.join(" | ")
            );
            emit_counter(MetricName::ReconcileAmbiguous, 1);
            MatchEvent::Ambiguous {
                vendor: vendor.to_string(),
                brand: entry.brand.clone(),
                fragment: entry.model_fragment.clone(),
                titles,
            }
        } else {
            debug!(fragment = %entry.model_fragment, "Matched {}", titles.join(" | "));
            emit_counter(MetricName::ReconcileMatched, 1);
            MatchEvent::Matched {
                vendor: vendor.to_string(),
                fragment: entry.model_fragment.clone(),
                titles,
            }
        }
    }

    fn enrich(
        &self,
        entry: &CatalogEntry,
        is_compatible: bool,
    ) -> Result<EnrichedRecord, ReconcileError> {
        let launch_normalized = match entry
            .launch_raw
            .as_deref()
            .filter(|raw| !raw.trim().is_empty())
        {
            Some(raw) => {
                emit_counter(MetricName::ReconcileDatesNormalized, 1);
                Some(self.normalizer.normalize(raw)?)
            }
            None => None,
        };

        Ok(EnrichedRecord {
            title: entry.title.clone(),
            number: entry.number.clone(),
            is_compatible,
            launch_normalized,
            launch_raw: entry.launch_raw.clone(),
            family: entry.family.clone(),
            info_url: entry.info_url.clone(),
        })
    }
}

/// Reconcile with the default strategies
pub fn reconcile(
    compatibility_lists: &[Vec<CompatibilityEntry>],
    catalogs: &Catalogs,
) -> Result<Reconciliation, ReconcileError> {
    Reconciler::new().reconcile(compatibility_lists, catalogs)
}
