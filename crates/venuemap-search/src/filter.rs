//! Multi-category filter selection over candidate places.
//!
//! Options within one category combine with OR; categories combine with AND.
//! A candidate that lacks the attribute a category filters on passes that
//! category, so incomplete metadata never hides every result.

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use venuemap_core::{Catalog, FilterAttribute, FilterCategory, PlaceCandidate};

use crate::error::InvariantViolation;

/// Category id → selected option labels. Every catalog category has an
/// entry, possibly empty.
pub type FilterSelection = BTreeMap<String, BTreeSet<String>>;

#[derive(Debug, Clone)]
pub struct FilterComposer {
    catalog: Arc<Catalog>,
    selection: FilterSelection,
}

impl FilterComposer {
    #[must_use]
    pub fn new(catalog: Arc<Catalog>) -> Self {
        let selection = catalog
            .categories
            .iter()
            .map(|c| (c.id.clone(), BTreeSet::new()))
            .collect();
        Self { catalog, selection }
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub fn selection(&self) -> &FilterSelection {
        &self.selection
    }

    /// `true` when no category has a selected option.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.selection.values().all(BTreeSet::is_empty)
    }

    #[must_use]
    pub fn is_selected(&self, category_id: &str, option: &str) -> bool {
        self.selection
            .get(category_id)
            .is_some_and(|set| set.iter().any(|o| o.eq_ignore_ascii_case(option)))
    }

    /// Flips membership of `option` in `category_id`'s selection.
    ///
    /// The option is matched case-insensitively against the catalog and
    /// stored under its catalog spelling. Returns whether the option is
    /// selected after the toggle.
    ///
    /// # Errors
    ///
    /// Returns [`InvariantViolation::UnknownCategory`] or
    /// [`InvariantViolation::UnknownOption`] when the pair is not in the
    /// catalog; the selection is left untouched.
    pub fn toggle(&mut self, category_id: &str, option: &str) -> Result<bool, InvariantViolation> {
        let category = self
            .catalog
            .category(category_id)
            .ok_or_else(|| InvariantViolation::UnknownCategory(category_id.to_owned()))?;
        let canonical = category
            .options
            .iter()
            .find(|o| o.eq_ignore_ascii_case(option))
            .ok_or_else(|| InvariantViolation::UnknownOption {
                category_id: category_id.to_owned(),
                option: option.to_owned(),
            })?
            .clone();

        let set = self.selection.entry(category.id.clone()).or_default();
        if set.remove(&canonical) {
            Ok(false)
        } else {
            set.insert(canonical);
            Ok(true)
        }
    }

    /// Empties every category.
    pub fn clear(&mut self) {
        for set in self.selection.values_mut() {
            set.clear();
        }
    }

    /// # Errors
    ///
    /// Returns [`InvariantViolation::UnknownCategory`] for an id outside the catalog.
    pub fn clear_category(&mut self, category_id: &str) -> Result<(), InvariantViolation> {
        self.selection
            .get_mut(category_id)
            .map(BTreeSet::clear)
            .ok_or_else(|| InvariantViolation::UnknownCategory(category_id.to_owned()))
    }

    /// Filters `candidates` by the current selection.
    ///
    /// With nothing selected the input slice is returned as-is
    /// (`Cow::Borrowed`), not a copy.
    #[must_use]
    pub fn apply<'a>(&self, candidates: &'a [PlaceCandidate]) -> Cow<'a, [PlaceCandidate]> {
        if self.is_empty() {
            return Cow::Borrowed(candidates);
        }
        Cow::Owned(
            candidates
                .iter()
                .filter(|c| self.matches(c))
                .cloned()
                .collect(),
        )
    }

    /// Whether `candidate` passes every non-empty category.
    #[must_use]
    pub fn matches(&self, candidate: &PlaceCandidate) -> bool {
        self.catalog.categories.iter().all(|category| {
            match self.selection.get(&category.id) {
                Some(selected) if !selected.is_empty() => {
                    category_admits(category, selected, candidate)
                }
                _ => true,
            }
        })
    }
}

fn category_admits(
    category: &FilterCategory,
    selected: &BTreeSet<String>,
    candidate: &PlaceCandidate,
) -> bool {
    let values = derived_values(&category.attribute(), candidate);
    if values.is_empty() {
        return true;
    }
    values
        .iter()
        .any(|v| selected.iter().any(|s| s.eq_ignore_ascii_case(v.trim())))
}

fn derived_values<'a>(attribute: &FilterAttribute, candidate: &'a PlaceCandidate) -> Vec<&'a str> {
    match attribute {
        FilterAttribute::Category => candidate
            .category
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .into_iter()
            .collect(),
        FilterAttribute::Facet(name) => candidate
            .facets
            .get(name)
            .map(|values| {
                values
                    .iter()
                    .map(String::as_str)
                    .filter(|v| !v.trim().is_empty())
                    .collect()
            })
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use venuemap_core::{parse_catalog, Coordinates};

    fn catalog() -> Arc<Catalog> {
        Arc::new(
            parse_catalog(
                r"
categories:
  - { id: venue_type, label: Venue Type, options: [Bar, Lounge, Club] }
  - { id: music_genre, label: Music Genre, facet: genre, options: [Jazz, Rock] }
",
            )
            .unwrap(),
        )
    }

    fn place(id: &str) -> PlaceCandidate {
        PlaceCandidate::new(id, format!("Place {id}"), Coordinates::new(1.0, 1.0))
    }

    fn ids(list: &[PlaceCandidate]) -> Vec<&str> {
        list.iter().map(|c| c.id.as_str()).collect()
    }

    fn sample() -> Vec<PlaceCandidate> {
        vec![
            place("bar-jazz")
                .with_category("Bar")
                .with_facet("genre", ["Jazz"]),
            place("lounge-rock")
                .with_category("Lounge")
                .with_facet("genre", ["Rock"]),
            place("club-untagged").with_category("Club"),
            place("bare"),
        ]
    }

    #[test]
    fn every_catalog_category_has_an_entry() {
        let composer = FilterComposer::new(catalog());
        let keys: Vec<&str> = composer.selection().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["music_genre", "venue_type"]);
        assert!(composer.is_empty());
    }

    #[test]
    fn empty_selection_returns_input_by_identity() {
        let composer = FilterComposer::new(catalog());
        let candidates = sample();
        let filtered = composer.apply(&candidates);
        assert!(matches!(filtered, Cow::Borrowed(_)));
        assert!(std::ptr::eq(filtered.as_ptr(), candidates.as_ptr()));
    }

    #[test]
    fn single_category_keeps_matches_and_attributeless() {
        let mut composer = FilterComposer::new(catalog());
        composer.toggle("venue_type", "Bar").unwrap();
        let candidates = sample();
        // "bare" has no category at all, so the venue filter does not apply to it.
        assert_eq!(ids(&composer.apply(&candidates)), vec!["bar-jazz", "bare"]);
    }

    #[test]
    fn options_within_category_are_or() {
        let mut composer = FilterComposer::new(catalog());
        composer.toggle("venue_type", "Bar").unwrap();
        composer.toggle("venue_type", "Lounge").unwrap();
        let candidates = sample();
        assert_eq!(
            ids(&composer.apply(&candidates)),
            vec!["bar-jazz", "lounge-rock", "bare"]
        );
    }

    #[test]
    fn categories_combine_with_and() {
        let mut composer = FilterComposer::new(catalog());
        composer.toggle("venue_type", "Lounge").unwrap();
        composer.toggle("venue_type", "Club").unwrap();
        composer.toggle("music_genre", "Rock").unwrap();
        let candidates = sample();
        // club-untagged has no genre facet, so only the venue filter applies to it.
        assert_eq!(
            ids(&composer.apply(&candidates)),
            vec!["lounge-rock", "club-untagged", "bare"]
        );
    }

    #[test]
    fn matching_is_case_insensitive() {
        let mut composer = FilterComposer::new(catalog());
        composer.toggle("venue_type", "bar").unwrap();
        assert!(composer.is_selected("venue_type", "Bar"));
        let candidates = vec![place("x").with_category("BAR"), place("y").with_category("Club")];
        assert_eq!(ids(&composer.apply(&candidates)), vec!["x"]);
    }

    #[test]
    fn double_toggle_restores_membership() {
        let mut composer = FilterComposer::new(catalog());
        composer.toggle("music_genre", "Jazz").unwrap();
        let before = composer.selection().clone();

        assert!(composer.toggle("venue_type", "Club").unwrap());
        assert!(!composer.toggle("venue_type", "Club").unwrap());
        assert_eq!(composer.selection(), &before);
    }

    #[test]
    fn unknown_category_is_rejected_without_change() {
        let mut composer = FilterComposer::new(catalog());
        let err = composer.toggle("price", "$$").unwrap_err();
        assert_eq!(err, InvariantViolation::UnknownCategory("price".to_string()));
        assert!(!composer.selection().contains_key("price"));
        assert!(composer.is_empty());
    }

    #[test]
    fn unknown_option_is_rejected_without_change() {
        let mut composer = FilterComposer::new(catalog());
        let err = composer.toggle("venue_type", "Stadium").unwrap_err();
        assert!(matches!(err, InvariantViolation::UnknownOption { .. }));
        assert!(composer.is_empty());
    }

    #[test]
    fn clear_returns_unfiltered_identity() {
        let mut composer = FilterComposer::new(catalog());
        composer.toggle("venue_type", "Bar").unwrap();
        composer.toggle("music_genre", "Jazz").unwrap();
        composer.clear();
        let candidates = sample();
        assert!(matches!(composer.apply(&candidates), Cow::Borrowed(_)));
        assert_eq!(composer.selection().len(), 2);
    }

    #[test]
    fn clear_category_only_touches_that_category() {
        let mut composer = FilterComposer::new(catalog());
        composer.toggle("venue_type", "Bar").unwrap();
        composer.toggle("music_genre", "Jazz").unwrap();
        composer.clear_category("venue_type").unwrap();
        assert!(!composer.is_selected("venue_type", "Bar"));
        assert!(composer.is_selected("music_genre", "Jazz"));
        assert!(composer.clear_category("nope").is_err());
    }
}
