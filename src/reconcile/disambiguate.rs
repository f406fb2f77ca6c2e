//! Narrowing of over-broad substring matches.
//!
//! Each refinement takes the current candidate set and returns the set the
//! next step should see. A step never returns an empty set for a non-empty
//! input.

use super::matcher::CandidateSet;
use crate::types::CatalogEntry;

/// What a compatibility entry is looking for
#[derive(Debug, Clone, Copy)]
pub struct MatchQuery<'a> {
    pub fragment: &'a str,
    pub brand: &'a str,
}

/// Outcome of narrowing a candidate set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Disambiguation {
    pub resolved: CandidateSet,
    /// More than one candidate survived every refinement
    pub ambiguous: bool,
}

pub type Refinement = fn(&MatchQuery<'_>, &CandidateSet, &[CatalogEntry]) -> CandidateSet;

/// Refinements in the order they are applied
pub const REFINEMENTS: [Refinement; 2] = [refine_whitespace_bounded, refine_by_brand];

fn retain_titles<F>(candidates: &CandidateSet, catalog: &[CatalogEntry], keep: F) -> CandidateSet
where
    F: Fn(&str) -> bool,
{
    candidates
        .iter()
        .copied()
        .filter(|&index| catalog.get(index).is_some_and(|entry| keep(&entry.title)))
        .collect()
}

/// Keep candidates whose title has the fragment as a whole word.
///
/// Titles are padded with a space on both sides so a fragment at either end
/// of the title still counts. The refined set replaces the input only when it
/// is non-empty and strictly smaller.
pub fn refine_whitespace_bounded(
    query: &MatchQuery<'_>,
    candidates: &CandidateSet,
    catalog: &[CatalogEntry],
) -> CandidateSet {
    let needle = format!(" {} ", query.fragment);
    let refined = retain_titles(candidates, catalog, |title| {
        format!(" {title} ").contains(&needle)
    });
    if !refined.is_empty() && refined.len() < candidates.len() {
        refined
    } else {
        candidates.clone()
    }
}

/// Keep candidates whose title mentions the brand; falls back to the input
/// when no title does.
pub fn refine_by_brand(
    query: &MatchQuery<'_>,
    candidates: &CandidateSet,
    catalog: &[CatalogEntry],
) -> CandidateSet {
    let refined = retain_titles(candidates, catalog, |title| title.contains(query.brand));
    if refined.is_empty() {
        candidates.clone()
    } else {
        refined
    }
}

/// Narrow `candidates` down to one entry if the refinements allow it
pub fn disambiguate(
    query: &MatchQuery<'_>,
    candidates: CandidateSet,
    catalog: &[CatalogEntry],
) -> Disambiguation {
    if candidates.len() <= 1 {
        return Disambiguation {
            resolved: candidates,
            ambiguous: false,
        };
    }

    let resolved = REFINEMENTS
        .iter()
        .fold(candidates, |current, refine| refine(query, &current, catalog));
    let ambiguous = resolved.len() > 1;

    Disambiguation {
        resolved,
        ambiguous,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::matcher::{catalog_of, find_candidates};

    fn query<'a>(fragment: &'a str, brand: &'a str) -> MatchQuery<'a> {
        MatchQuery { fragment, brand }
    }

    #[test]
    fn test_whitespace_refinement_picks_exact_model() {
        let catalog = catalog_of(&["AMD Ryzen 5 3500", "AMD Ryzen 5 3500X"]);
        let q = query("5 3500", "Ryzen");
        let candidates = find_candidates(q.fragment, &catalog);
        assert_eq!(candidates, CandidateSet::from([0, 1]));

        let result = disambiguate(&q, candidates, &catalog);
        assert_eq!(result.resolved, CandidateSet::from([0]));
        assert!(!result.ambiguous);
    }

    #[test]
    fn test_whitespace_refinement_on_intel_suffix_variants() {
        let catalog = catalog_of(&[
            "Intel® Core™ i5-1135G7 Processor",
            "Intel® Core™ i5-1135G7E Processor",
        ]);
        let q = query("i5-1135G7", "Core™");
        let candidates = find_candidates(q.fragment, &catalog);
        assert_eq!(candidates.len(), 2);

        let refined = refine_whitespace_bounded(&q, &candidates, &catalog);
        assert_eq!(refined, CandidateSet::from([0]));
    }

    #[test]
    fn test_whitespace_refinement_keeps_input_when_nothing_is_bounded() {
        let catalog = catalog_of(&["Ryzen 5 3500X", "Ryzen 5 3500U"]);
        let q = query("3500", "Ryzen");
        let candidates = CandidateSet::from([0, 1]);
        assert_eq!(refine_whitespace_bounded(&q, &candidates, &catalog), candidates);
    }

    #[test]
    fn test_whitespace_refinement_keeps_input_when_not_smaller() {
        let catalog = catalog_of(&["Ryzen 5 3500 Box", "Ryzen 5 3500 Tray"]);
        let q = query("3500", "Ryzen");
        let candidates = CandidateSet::from([0, 1]);
        assert_eq!(refine_whitespace_bounded(&q, &candidates, &catalog), candidates);
    }

    #[test]
    fn test_brand_refinement_filters_by_title() {
        let catalog = catalog_of(&["Intel Pentium Gold 7505", "Intel Celeron 7505"]);
        let q = query("7505", "Pentium");
        let candidates = CandidateSet::from([0, 1]);
        assert_eq!(refine_by_brand(&q, &candidates, &catalog), CandidateSet::from([0]));
    }

    #[test]
    fn test_brand_refinement_never_eliminates_everything() {
        let catalog = catalog_of(&["Intel Pentium Gold 7505", "Intel Celeron 7505"]);
        let q = query("7505", "Xeon");
        let candidates = CandidateSet::from([0, 1]);
        assert_eq!(refine_by_brand(&q, &candidates, &catalog), candidates);
    }

    #[test]
    fn test_brand_breaks_tie_after_whitespace_step() {
        let catalog = catalog_of(&[
            "Intel Pentium Gold 7505 Processor",
            "Intel Celeron 7505 Processor",
            "Intel Celeron 7505X Processor",
        ]);
        let q = query("7505", "Celeron");
        let result = disambiguate(&q, find_candidates("7505", &catalog), &catalog);
        assert_eq!(result.resolved, CandidateSet::from([1]));
        assert!(!result.ambiguous);
    }

    #[test]
    fn test_unresolvable_candidates_are_ambiguous() {
        let catalog = catalog_of(&["AMD Athlon Silver 3050U", "AMD Athlon Gold 3050U"]);
        let q = query("3050U", "Athlon");
        let result = disambiguate(&q, find_candidates("3050U", &catalog), &catalog);
        assert_eq!(result.resolved, CandidateSet::from([0, 1]));
        assert!(result.ambiguous);
    }

    #[test]
    fn test_single_and_empty_inputs_pass_through() {
        let catalog = catalog_of(&["AMD Ryzen 5 3500X"]);
        let q = query("3500", "Ryzen");

        let single = disambiguate(&q, CandidateSet::from([0]), &catalog);
        assert_eq!(single.resolved, CandidateSet::from([0]));
        assert!(!single.ambiguous);

        let empty = disambiguate(&q, CandidateSet::new(), &catalog);
        assert!(empty.resolved.is_empty());
        assert!(!empty.ambiguous);
    }
}
