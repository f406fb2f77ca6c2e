//! Reconciliation of the compatibility lists against vendor catalogs.
//!
//! Data flows leaf-first: [`matcher`] finds candidate catalog positions for a
//! compatibility entry, [`disambiguate`] narrows them, and [`orchestrator`]
//! accumulates the compatible positions per vendor and builds one
//! [`EnrichedRecord`](crate::types::EnrichedRecord) per catalog entry with the
//! launch date normalized by [`date`].

pub mod date;
pub mod disambiguate;
pub mod matcher;
pub mod orchestrator;

pub use date::{
    normalize, parse_launch_quarter, LaunchDateNormalizer, LaunchQuarter, PatternTableNormalizer,
};
pub use disambiguate::{disambiguate, Disambiguation, MatchQuery};
pub use matcher::{find_candidates, CandidateMatcher, CandidateSet, SubstringMatcher};
pub use orchestrator::{reconcile, MatchEvent, Reconciler, Reconciliation, VendorSummary};
