use std::collections::BTreeSet;

use crate::types::CatalogEntry;

/// Catalog positions considered a match for one compatibility entry
pub type CandidateSet = BTreeSet<usize>;

/// Finds the catalog entries a compatibility-list fragment may refer to
pub trait CandidateMatcher {
    fn candidates(&self, fragment: &str, catalog: &[CatalogEntry]) -> CandidateSet;
}

/// Plain case-sensitive substring match against catalog titles
#[derive(Debug, Clone, Copy, Default)]
pub struct SubstringMatcher;

impl CandidateMatcher for SubstringMatcher {
    fn candidates(&self, fragment: &str, catalog: &[CatalogEntry]) -> CandidateSet {
        find_candidates(fragment, catalog)
    }
}

/// Every index whose title contains `fragment` verbatim
pub fn find_candidates(fragment: &str, catalog: &[CatalogEntry]) -> CandidateSet {
    catalog
        .iter()
        .enumerate()
        .filter(|(_, entry)| entry.title.contains(fragment))
        .map(|(index, _)| index)
        .collect()
}

#[cfg(test)]
pub(crate) fn catalog_of(titles: &[&str]) -> Vec<CatalogEntry> {
    titles
        .iter()
        .map(|title| CatalogEntry {
            title: title.to_string(),
            number: None,
            launch_raw: None,
            family: "Test Family".to_string(),
            info_url: format!("https://example.com/{}", title.replace(' ', "-")),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_substring_returns_all_matches() {
        let catalog = catalog_of(&["Core i5-1135G7", "Core i5-11357G7"]);
        // "i5-11357G7" does not contain "i5-1135G7" verbatim
        let found = find_candidates("i5-1135G7", &catalog);
        assert_eq!(found, CandidateSet::from([0]));

        let found = find_candidates("i5-1135", &catalog);
        assert_eq!(found, CandidateSet::from([0, 1]));
    }

    #[test]
    fn test_match_is_case_sensitive() {
        let catalog = catalog_of(&["AMD Ryzen 5 3500", "amd ryzen 7 3700x"]);
        assert_eq!(find_candidates("Ryzen", &catalog), CandidateSet::from([0]));
        assert!(find_candidates("RYZEN", &catalog).is_empty());
    }

    #[test]
    fn test_no_match_returns_empty_set() {
        let catalog = catalog_of(&["Intel Atom x6427FE Processor"]);
        assert!(SubstringMatcher.candidates("x6200FE", &catalog).is_empty());
        assert!(SubstringMatcher.candidates("x6200FE", &[]).is_empty());
    }

    #[test]
    fn test_prefix_fragment_matches_longer_models() {
        let catalog = catalog_of(&["AMD Ryzen 5 3500", "AMD Ryzen 5 3500X", "AMD Ryzen 5 3600"]);
        assert_eq!(
            SubstringMatcher.candidates("5 3500", &catalog),
            CandidateSet::from([0, 1])
        );
    }
}
