//! Simple metrics module for the CPU scraper
//!
//! Counters are recorded through the `metrics` facade. The CLI installs a
//! Prometheus recorder and writes the rendered snapshot next to the export;
//! library users that install no recorder get no-op counters.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::fmt;
use tracing::info;

/// Enum representing all metric names used in the system
/// This eliminates magic strings and provides compile-time safety
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    // Fetch metrics
    FetchRequestsSuccess,
    FetchRequestsError,
    FetchCatalogEntries,
    FetchCompatibilityEntries,

    // Staging metrics
    StagingCacheHits,
    StagingWrites,

    // Reconcile metrics
    ReconcileEntriesProcessed,
    ReconcileMatched,
    ReconcileNotFound,
    ReconcileAmbiguous,
    ReconcileUnknownVendor,
    ReconcileRecordsBuilt,
    ReconcileDatesNormalized,

    // Export metrics
    ExportFilesWritten,
}

impl MetricName {
    /// Get the metric name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::FetchRequestsSuccess => "win11_cpus_fetch_requests_success_total",
            MetricName::FetchRequestsError => "win11_cpus_fetch_requests_error_total",
            MetricName::FetchCatalogEntries => "win11_cpus_fetch_catalog_entries_total",
            MetricName::FetchCompatibilityEntries => "win11_cpus_fetch_compatibility_entries_total",

            MetricName::StagingCacheHits => "win11_cpus_staging_cache_hits_total",
            MetricName::StagingWrites => "win11_cpus_staging_writes_total",

            MetricName::ReconcileEntriesProcessed => "win11_cpus_reconcile_entries_processed_total",
            MetricName::ReconcileMatched => "win11_cpus_reconcile_matched_total",
            MetricName::ReconcileNotFound => "win11_cpus_reconcile_not_found_total",
            MetricName::ReconcileAmbiguous => "win11_cpus_reconcile_ambiguous_total",
            MetricName::ReconcileUnknownVendor => "win11_cpus_reconcile_unknown_vendor_total",
            MetricName::ReconcileRecordsBuilt => "win11_cpus_reconcile_records_built_total",
            MetricName::ReconcileDatesNormalized => "win11_cpus_reconcile_dates_normalized_total",

            MetricName::ExportFilesWritten => "win11_cpus_export_files_written_total",
        }
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Increment a counter
pub fn emit_counter(name: MetricName, value: u64) {
    ::metrics::counter!(name.as_str()).increment(value);
}

/// Install the Prometheus recorder; keep the handle to render a snapshot later
pub fn install_recorder() -> Result<PrometheusHandle, String> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {}", e))?;
    info!("Metrics system initialized");
    Ok(handle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_names_are_prefixed_and_unique() {
        let names = [
            MetricName::FetchRequestsSuccess,
            MetricName::FetchRequestsError,
            MetricName::FetchCatalogEntries,
            MetricName::FetchCompatibilityEntries,
            MetricName::StagingCacheHits,
            MetricName::StagingWrites,
            MetricName::ReconcileEntriesProcessed,
            MetricName::ReconcileMatched,
            MetricName::ReconcileNotFound,
            MetricName::ReconcileAmbiguous,
            MetricName::ReconcileUnknownVendor,
            MetricName::ReconcileRecordsBuilt,
            MetricName::ReconcileDatesNormalized,
            MetricName::ExportFilesWritten,
        ];
        let unique: std::collections::HashSet<_> = names.iter().map(|n| n.as_str()).collect();
        assert_eq!(unique.len(), names.len());
        assert!(names.iter().all(|n| n.to_string().starts_with("win11_cpus_")));
    }

    #[test]
    fn test_emit_without_recorder_is_noop() {
        emit_counter(MetricName::ReconcileMatched, 1);
    }
}
