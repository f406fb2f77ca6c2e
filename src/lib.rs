//! Windows 11 supported-CPU scraper.
//!
//! Scrapes the official compatibility lists and the Intel and AMD product
//! catalogs, reconciles them and exports one enriched record per catalog entry.

pub mod apis;
pub mod config;
pub mod constants;
pub mod error;
pub mod export;
pub mod observability;
pub mod reconcile;
pub mod storage;
pub mod types;

// Application use cases and infrastructure adapters
pub mod app;
pub mod infra;

pub use reconcile::{reconcile, MatchEvent, Reconciler, Reconciliation};
pub use types::{CatalogEntry, CompatibilityEntry, EnrichedRecord, Vendor};
