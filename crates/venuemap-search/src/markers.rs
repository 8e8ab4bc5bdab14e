//! Keeps the map's markers equal to the filtered view.
//!
//! The synchronizer is the sole owner of marker handles. Every handle it
//! creates is removed exactly once, either when its place leaves the view or
//! on [`MarkerSynchronizer::teardown`].

use std::collections::{HashMap, HashSet};
use std::fmt;

use venuemap_core::PlaceCandidate;

use crate::map::{MapSurface, MarkerClick, MarkerStyle};

struct Tracked<H> {
    handle: H,
    style: MarkerStyle,
}

pub struct MarkerSynchronizer<M: MapSurface> {
    tracked: HashMap<String, Tracked<M::Marker>>,
}

impl<M: MapSurface> Default for MarkerSynchronizer<M> {
    fn default() -> Self {
        Self {
            tracked: HashMap::new(),
        }
    }
}

impl<M: MapSurface> fmt::Debug for MarkerSynchronizer<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MarkerSynchronizer")
            .field("tracked", &self.tracked_ids())
            .finish()
    }
}

impl<M: MapSurface> MarkerSynchronizer<M> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Diffs `view` against the tracked handles and applies the difference.
    ///
    /// Markers for ids no longer in the view are removed, new ids get a
    /// marker whose click handler comes from `on_click`, and ids already
    /// tracked keep their handle, restyled if the selection moved.
    pub fn reconcile<F>(
        &mut self,
        map: &mut M,
        view: &[PlaceCandidate],
        selected: Option<&str>,
        on_click: F,
    ) where
        F: Fn(&str) -> MarkerClick,
    {
        let target: HashSet<&str> = view
            .iter()
            .filter(|c| c.has_coordinates())
            .map(|c| c.id.as_str())
            .collect();

        let stale: Vec<String> = self
            .tracked
            .keys()
            .filter(|id| !target.contains(id.as_str()))
            .cloned()
            .collect();
        for id in stale {
            if let Some(tracked) = self.tracked.remove(&id) {
                map.remove_marker(tracked.handle);
            }
        }

        let mut created = 0usize;
        for candidate in view {
            let Some(at) = candidate.coordinates else {
                tracing::warn!(place_id = %candidate.id, "no marker for candidate without coordinates");
                continue;
            };
            let style = if selected == Some(candidate.id.as_str()) {
                MarkerStyle::Selected
            } else {
                MarkerStyle::Default
            };

            match self.tracked.get_mut(&candidate.id) {
                Some(tracked) => {
                    if tracked.style != style {
                        map.set_marker_style(&tracked.handle, style);
                        tracked.style = style;
                    }
                }
                None => {
                    let handle = map.create_marker(at, style, on_click(&candidate.id));
                    self.tracked
                        .insert(candidate.id.clone(), Tracked { handle, style });
                    created += 1;
                }
            }
        }

        tracing::trace!(tracked = self.tracked.len(), created, "markers reconciled");
    }

    /// Removes every tracked marker from `map`.
    pub fn teardown(&mut self, map: &mut M) {
        for (_, tracked) in self.tracked.drain() {
            map.remove_marker(tracked.handle);
        }
    }

    /// Tracked place ids, sorted.
    #[must_use]
    pub fn tracked_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.tracked.keys().cloned().collect();
        ids.sort();
        ids
    }

    #[must_use]
    pub fn style_of(&self, place_id: &str) -> Option<MarkerStyle> {
        self.tracked.get(place_id).map(|t| t.style)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tracked.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tracked.is_empty()
    }
}
