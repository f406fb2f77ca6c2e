use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::future::Future;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::constants::{
    ALL_VENDORS_FILENAME, ALL_VENDORS_WIP_FILENAME, AMD_FILENAME, COMPATIBILITY_FILENAME,
    INTEL_FILENAME,
};
use crate::error::{Result, ScraperError};
use crate::observability::metrics::{emit_counter, MetricName};
use crate::types::{Catalogs, CompatibilityLists, Vendor};

/// Scraped data staged on disk as JSON between the scrape and reconcile runs
#[derive(Debug, Clone)]
pub struct StagingStore {
    data_dir: PathBuf,
}

impl StagingStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn path(&self, filename: &str) -> PathBuf {
        self.data_dir.join(filename)
    }

    /// Staged file of one vendor's catalog
    pub fn vendor_filename(vendor: Vendor) -> &'static str {
        match vendor {
            Vendor::Intel => INTEL_FILENAME,
            Vendor::Amd => AMD_FILENAME,
        }
    }

    pub fn read<T: DeserializeOwned>(&self, filename: &str) -> Result<Option<T>> {
        let path = self.path(filename);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)?;
        let value = serde_json::from_str(&content)?;
        debug!("Read staged {}", path.display());
        Ok(Some(value))
    }

    pub fn write<T: Serialize>(&self, filename: &str, value: &T) -> Result<()> {
        fs::create_dir_all(&self.data_dir)?;
        let path = self.path(filename);
        let content = serde_json::to_string_pretty(value)?;
        fs::write(&path, content)?;
        emit_counter(MetricName::StagingWrites, 1);
        debug!("Staged {}", path.display());
        Ok(())
    }

    pub fn remove(&self, filename: &str) -> Result<()> {
        let path = self.path(filename);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    /// Return the staged value unless `force` is set; otherwise run `fetch`
    /// and stage its result.
    pub async fn load_or_fetch<T, F, Fut>(&self, filename: &str, force: bool, fetch: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if !force {
            if let Some(value) = self.read(filename)? {
                info!("Using staged {}", self.path(filename).display());
                emit_counter(MetricName::StagingCacheHits, 1);
                return Ok(value);
            }
        }
        let value = fetch().await?;
        self.write(filename, &value)?;
        Ok(value)
    }

    /// Record the catalogs gathered so far. The final save replaces the
    /// work-in-progress file with the production one.
    pub fn save_catalogs(&self, catalogs: &Catalogs, final_save: bool) -> Result<()> {
        if final_save {
            self.write(ALL_VENDORS_FILENAME, catalogs)?;
            self.remove(ALL_VENDORS_WIP_FILENAME)
        } else {
            self.write(ALL_VENDORS_WIP_FILENAME, catalogs)
        }
    }

    pub fn load_catalogs(&self) -> Result<Catalogs> {
        self.read(ALL_VENDORS_FILENAME)?.ok_or_else(|| {
            ScraperError::MissingField(format!(
                "{} not staged, run the scrape first",
                self.path(ALL_VENDORS_FILENAME).display()
            ))
        })
    }

    pub fn save_compatibility_lists(&self, lists: &CompatibilityLists) -> Result<()> {
        self.write(COMPATIBILITY_FILENAME, lists)
    }

    pub fn load_compatibility_lists(&self) -> Result<CompatibilityLists> {
        self.read(COMPATIBILITY_FILENAME)?.ok_or_else(|| {
            ScraperError::MissingField(format!(
                "{} not staged, run the scrape first",
                self.path(COMPATIBILITY_FILENAME).display()
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CatalogEntry, CompatibilityEntry};
    use tempfile::tempdir;

    fn cpu(title: &str) -> CatalogEntry {
        CatalogEntry {
            title: title.to_string(),
            number: Some("3500".to_string()),
            launch_raw: Some("Q4'19".to_string()),
            family: "Desktop".to_string(),
            info_url: "https://www.amd.com/en/product/8456".to_string(),
        }
    }

    #[test]
    fn test_read_missing_file_is_none() {
        let dir = tempdir().unwrap();
        let store = StagingStore::new(dir.path());
        let value: Option<Vec<CatalogEntry>> = store.read(AMD_FILENAME).unwrap();
        assert!(value.is_none());
    }

    #[test]
    fn test_final_save_removes_work_in_progress() {
        let dir = tempdir().unwrap();
        let store = StagingStore::new(dir.path().join("data"));
        let mut catalogs = Catalogs::new();
        catalogs.insert("AMD".to_string(), vec![cpu("AMD Ryzen 5 3500")]);

        store.save_catalogs(&catalogs, false).unwrap();
        assert!(store.path(ALL_VENDORS_WIP_FILENAME).exists());
        assert!(store.load_catalogs().is_err());

        store.save_catalogs(&catalogs, true).unwrap();
        assert!(!store.path(ALL_VENDORS_WIP_FILENAME).exists());
        assert_eq!(store.load_catalogs().unwrap(), catalogs);
    }

    #[test]
    fn test_compatibility_lists_round_trip() {
        let dir = tempdir().unwrap();
        let store = StagingStore::new(dir.path());
        let lists = vec![vec![CompatibilityEntry::new("AMD", "Ryzen", "5 3500")], vec![]];
        store.save_compatibility_lists(&lists).unwrap();
        assert_eq!(store.load_compatibility_lists().unwrap(), lists);
    }

    #[tokio::test]
    async fn test_load_or_fetch_prefers_staged_data_unless_forced() {
        let dir = tempdir().unwrap();
        let store = StagingStore::new(dir.path());
        let file = StagingStore::vendor_filename(Vendor::Amd);

        let first: Vec<CatalogEntry> = store
            .load_or_fetch(file, false, || async { Ok(vec![cpu("first")]) })
            .await
            .unwrap();
        assert_eq!(first[0].title, "first");

        let cached: Vec<CatalogEntry> = store
            .load_or_fetch(file, false, || async { Ok(vec![cpu("second")]) })
            .await
            .unwrap();
        assert_eq!(cached[0].title, "first");

        let forced: Vec<CatalogEntry> = store
            .load_or_fetch(file, true, || async { Ok(vec![cpu("second")]) })
            .await
            .unwrap();
        assert_eq!(forced[0].title, "second");
    }

    #[tokio::test]
    async fn test_failed_fetch_stages_nothing() {
        let dir = tempdir().unwrap();
        let store = StagingStore::new(dir.path());
        let result: Result<Vec<CatalogEntry>> = store
            .load_or_fetch(INTEL_FILENAME, false, || async {
                Err(ScraperError::MissingField("offline".into()))
            })
            .await;
        assert!(result.is_err());
        assert!(!store.path(INTEL_FILENAME).exists());
    }
}
