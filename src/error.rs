use thiserror::Error;

/// Failures of the reconciliation core
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReconcileError {
    /// No launch-date pattern recognizes the string; fatal to the whole run
    #[error("Unparseable launch date: '{raw}'")]
    UnparseableDate { raw: String },

    /// A compatibility list names a vendor without a catalog; the list is skipped
    #[error("No catalog for vendor: '{vendor}'")]
    UnknownVendor { vendor: String },
}

#[derive(Error, Debug)]
pub enum ScraperError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid CSS selector: {0}")]
    Selector(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid data row: {0}")]
    InvalidRow(String),

    #[error("Reconciliation failed: {0}")]
    Reconcile(#[from] ReconcileError),
}

pub type Result<T> = std::result::Result<T, ScraperError>;
