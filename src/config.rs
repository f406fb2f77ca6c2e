use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::constants::{
    get_compatibility_urls, AMD_PROCESSORS_URL, AMD_PRODUCT_URL, DEFAULT_AMD_DELAY_MS,
    DEFAULT_TIMEOUT_SECONDS, DEFAULT_USER_AGENT, INTEL_PROCESSORS_URL, INTEL_SEARCH_URL,
};
use crate::error::{Result, ScraperError};

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";
pub const DATA_DIR_ENV: &str = "WIN11_CPUS_DATA_DIR";
pub const OUTPUT_DIR_ENV: &str = "WIN11_CPUS_OUTPUT_DIR";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub sources: SourcesConfig,
    pub storage: StorageConfig,
    pub export: ExportConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    /// Compatibility list pages, one per platform
    pub compatibility_urls: Vec<String>,
    pub intel_processors_url: String,
    /// `{}` is replaced with the search term
    pub intel_search_url: String,
    pub amd_processors_url: String,
    /// `{}` is replaced with the AMD product id
    pub amd_product_url: String,
    pub user_agent: String,
    pub timeout_seconds: u64,
    /// Pause between AMD product page requests
    pub amd_delay_ms: u64,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            compatibility_urls: get_compatibility_urls()
                .into_iter()
                .map(str::to_string)
                .collect(),
            intel_processors_url: INTEL_PROCESSORS_URL.to_string(),
            intel_search_url: INTEL_SEARCH_URL.to_string(),
            amd_processors_url: AMD_PROCESSORS_URL.to_string(),
            amd_product_url: AMD_PRODUCT_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            amd_delay_ms: DEFAULT_AMD_DELAY_MS,
        }
    }
}

impl SourcesConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn amd_delay(&self) -> Duration {
        Duration::from_millis(self.amd_delay_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub log_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            log_dir: PathBuf::from("logs"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub output_dir: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
        }
    }
}

impl Config {
    /// Load from `path`, falling back to defaults when the file does not exist.
    /// Environment overrides are applied last.
    ///
    /// Runs before the subscriber is installed, so nothing is logged here.
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let config_content = fs::read_to_string(path).map_err(|e| {
                ScraperError::Config(format!(
                    "Failed to read config file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
            Self::from_toml(&config_content)?
        } else {
            Config::default()
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
            self.storage.data_dir = PathBuf::from(dir);
        }
        if let Ok(dir) = std::env::var(OUTPUT_DIR_ENV) {
            self.export.output_dir = PathBuf::from(dir);
        }
    }

    fn validate(&self) -> Result<()> {
        if self.sources.timeout_seconds == 0 {
            return Err(ScraperError::Config(
                "sources.timeout_seconds must be positive".to_string(),
            ));
        }
        for template in [&self.sources.intel_search_url, &self.sources.amd_product_url] {
            if !template.contains("{}") {
                return Err(ScraperError::Config(format!(
                    "URL template '{}' has no '{{}}' placeholder",
                    template
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_point_at_public_sources() {
        let config = Config::default();
        assert_eq!(config.sources.compatibility_urls.len(), 3);
        assert_eq!(config.sources.timeout(), Duration::from_secs(15));
        assert_eq!(config.sources.amd_delay(), Duration::from_millis(1500));
        assert_eq!(config.storage.data_dir, PathBuf::from("data"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_other_defaults() {
        let config = Config::from_toml(
            r#"
            [sources]
            amd_delay_ms = 0

            [export]
            output_dir = "/tmp/cpus"
            "#,
        )
        .unwrap();
        assert_eq!(config.sources.amd_delay_ms, 0);
        assert_eq!(config.sources.timeout_seconds, DEFAULT_TIMEOUT_SECONDS);
        assert_eq!(config.export.output_dir, PathBuf::from("/tmp/cpus"));
        assert_eq!(config.storage.log_dir, PathBuf::from("logs"));
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let err = Config::from_toml("[sources\ntimeout_seconds = ").unwrap_err();
        assert!(matches!(err, ScraperError::Toml(_)));
    }

    #[test]
    fn test_template_without_placeholder_is_rejected() {
        let mut config = Config::default();
        config.sources.amd_product_url = "https://www.amd.com/en/product/".to_string();
        assert!(matches!(config.validate(), Err(ScraperError::Config(_))));
    }

    #[test]
    fn test_default_compatibility_urls_follow_scrape_order() {
        let config = Config::default();
        assert_eq!(config.sources.compatibility_urls, get_compatibility_urls());
        assert!(config.sources.compatibility_urls[0].ends_with("amd-processors"));
    }

    #[test]
    fn test_file_settings_are_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_PATH);
        fs::write(&path, "[sources]\ntimeout_seconds = 30\n").unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.sources.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.sources.user_agent, DEFAULT_USER_AGENT);
    }
}
