//! Current candidates, autocomplete suggestions, and the filtered view.

use std::borrow::Cow;
use std::collections::HashSet;
use std::sync::Arc;

use venuemap_core::{Catalog, PlaceCandidate};

use crate::error::InvariantViolation;
use crate::filter::{FilterComposer, FilterSelection};
use crate::selection::SelectionStateMachine;

/// Owns the candidate list and the filter selection, and keeps
/// `filtered_view` in step with both.
///
/// The view is recomputed eagerly on every write, so reads never observe a
/// stale filter result. With no filter selected the view shares the
/// candidate list's allocation.
#[derive(Debug, Clone)]
pub struct ResultSetStore {
    candidates: Arc<Vec<PlaceCandidate>>,
    filtered: Arc<Vec<PlaceCandidate>>,
    suggestions: Vec<PlaceCandidate>,
    filters: FilterComposer,
}

impl ResultSetStore {
    #[must_use]
    pub fn new(catalog: Arc<Catalog>) -> Self {
        let candidates = Arc::new(Vec::new());
        Self {
            filtered: Arc::clone(&candidates),
            candidates,
            suggestions: Vec::new(),
            filters: FilterComposer::new(catalog),
        }
    }

    #[must_use]
    pub fn candidates(&self) -> &[PlaceCandidate] {
        &self.candidates
    }

    #[must_use]
    pub fn filtered_view(&self) -> &[PlaceCandidate] {
        &self.filtered
    }

    /// `true` when the filtered view is the candidate list itself rather
    /// than a filtered copy.
    #[must_use]
    pub fn view_is_unfiltered(&self) -> bool {
        Arc::ptr_eq(&self.candidates, &self.filtered)
    }

    #[must_use]
    pub fn find(&self, place_id: &str) -> Option<&PlaceCandidate> {
        self.candidates.iter().find(|c| c.id == place_id)
    }

    #[must_use]
    pub fn contains(&self, place_id: &str) -> bool {
        self.find(place_id).is_some()
    }

    /// Replaces the candidate list wholesale.
    ///
    /// Entries without coordinates are dropped, as are repeats of an id
    /// already seen (first occurrence wins). If the selected place is not in
    /// the new list the selection is cleared. Returns the number of
    /// candidates kept.
    pub fn set_candidates(
        &mut self,
        list: Vec<PlaceCandidate>,
        selection: &mut SelectionStateMachine,
    ) -> usize {
        let mut seen = HashSet::new();
        let kept: Vec<PlaceCandidate> = list
            .into_iter()
            .filter(|c| {
                if !c.has_coordinates() {
                    tracing::warn!(place_id = %c.id, "dropping candidate without coordinates");
                    return false;
                }
                if !seen.insert(c.id.clone()) {
                    tracing::debug!(place_id = %c.id, "dropping duplicate candidate id");
                    return false;
                }
                true
            })
            .collect();

        let count = kept.len();
        self.candidates = Arc::new(kept);
        self.refresh_view();

        let orphaned = selection
            .selected_id()
            .filter(|id| !self.contains(id))
            .map(str::to_owned);
        if let Some(place_id) = orphaned {
            tracing::debug!(%place_id, "selected place left the result set");
            selection.clear();
        }
        count
    }

    /// Inserts `candidate`, or merges it into the existing entry with the
    /// same id, and returns the stored record.
    ///
    /// # Errors
    ///
    /// Returns [`InvariantViolation::PlaceNotLocated`] if neither the new
    /// record nor an existing one has coordinates.
    pub fn upsert(&mut self, candidate: PlaceCandidate) -> Result<&PlaceCandidate, InvariantViolation> {
        let list = Arc::make_mut(&mut self.candidates);
        let index = match list.iter().position(|c| c.id == candidate.id) {
            Some(i) => {
                let merged = list[i].clone().merged_with(candidate);
                if !merged.has_coordinates() {
                    return Err(InvariantViolation::PlaceNotLocated(merged.id));
                }
                list[i] = merged;
                i
            }
            None => {
                if !candidate.has_coordinates() {
                    return Err(InvariantViolation::PlaceNotLocated(candidate.id));
                }
                list.push(candidate);
                list.len() - 1
            }
        };
        self.refresh_view();
        Ok(&self.candidates[index])
    }

    #[must_use]
    pub fn suggestions(&self) -> &[PlaceCandidate] {
        &self.suggestions
    }

    pub fn set_suggestions(&mut self, list: Vec<PlaceCandidate>) {
        self.suggestions = list;
    }

    pub fn clear_suggestions(&mut self) {
        self.suggestions.clear();
    }

    #[must_use]
    pub fn filters(&self) -> &FilterSelection {
        self.filters.selection()
    }

    #[must_use]
    pub fn composer(&self) -> &FilterComposer {
        &self.filters
    }

    /// # Errors
    ///
    /// See [`FilterComposer::toggle`]. The view is unchanged on error.
    pub fn toggle_filter(&mut self, category_id: &str, option: &str) -> Result<bool, InvariantViolation> {
        let selected = self.filters.toggle(category_id, option)?;
        self.refresh_view();
        Ok(selected)
    }

    pub fn clear_filters(&mut self) {
        self.filters.clear();
        self.refresh_view();
    }

    fn refresh_view(&mut self) {
        self.filtered = match self.filters.apply(&self.candidates) {
            Cow::Borrowed(_) => Arc::clone(&self.candidates),
            Cow::Owned(list) => Arc::new(list),
        };
    }
}
