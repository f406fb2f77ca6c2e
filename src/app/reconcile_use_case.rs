use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::Result;
use crate::export::export_all;
use crate::reconcile::{Reconciler, Reconciliation};
use crate::storage::StagingStore;

/// Outcome of reconciling the staged data
#[derive(Debug)]
pub struct ReconcileReport {
    pub reconciliation: Reconciliation,
    pub exported: Vec<PathBuf>,
}

/// Use case for reconciling staged data and exporting the merged records
pub struct ReconcileUseCase {
    reconciler: Reconciler,
    store: StagingStore,
    output_dir: PathBuf,
}

impl ReconcileUseCase {
    pub fn new(
        reconciler: Reconciler,
        store: StagingStore,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            reconciler,
            store,
            output_dir: output_dir.into(),
        }
    }

    /// Create a use case with the default matching and date strategies
    pub fn with_default_reconciler(store: StagingStore, output_dir: impl Into<PathBuf>) -> Self {
        Self::new(Reconciler::new(), store, output_dir)
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn run(&self) -> Result<ReconcileReport> {
        let lists = self.store.load_compatibility_lists()?;
        let catalogs = self.store.load_catalogs()?;
        info!(
            "Reconciling {} compatibility lists against {} catalogs",
            lists.len(),
            catalogs.len()
        );

        let reconciliation = self.reconciler.reconcile(&lists, &catalogs)?;
        for summary in reconciliation.summary() {
            info!(
                vendor = %summary.vendor,
                compatible = summary.compatible,
                undated = summary.undated,
                "{} catalog entries reconciled",
                summary.catalog_entries
            );
        }

        let exported = export_all(&reconciliation, &self.output_dir)?;
        Ok(ReconcileReport {
            reconciliation,
            exported,
        })
    }
}
