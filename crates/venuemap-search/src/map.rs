//! The rendering surface the coordinator drives.
//!
//! The coordinator is the only caller of a [`MapSurface`]. Marker handles
//! are moved into [`MapSurface::remove_marker`], so a handle cannot be
//! removed twice or used after removal.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use venuemap_core::{Coordinates, PlaceCandidate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerStyle {
    Default,
    Selected,
}

/// Callback attached to a marker. Firing it reports the marker's place id.
#[derive(Clone)]
pub struct MarkerClick {
    place_id: String,
    handler: Arc<dyn Fn(&str) + Send + Sync>,
}

impl MarkerClick {
    pub fn new(place_id: impl Into<String>, handler: Arc<dyn Fn(&str) + Send + Sync>) -> Self {
        Self {
            place_id: place_id.into(),
            handler,
        }
    }

    #[must_use]
    pub fn place_id(&self) -> &str {
        &self.place_id
    }

    pub fn fire(&self) {
        (self.handler)(&self.place_id);
    }
}

impl fmt::Debug for MarkerClick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MarkerClick")
            .field("place_id", &self.place_id)
            .finish_non_exhaustive()
    }
}

/// What the info popover shows for the selected place.
#[derive(Debug, Clone, PartialEq)]
pub struct PopoverContent {
    pub place_id: String,
    pub title: String,
    pub category: Option<String>,
    pub rating: Option<f64>,
    pub open_hours: Option<String>,
    pub image_url: Option<String>,
}

impl From<&PlaceCandidate> for PopoverContent {
    fn from(place: &PlaceCandidate) -> Self {
        Self {
            place_id: place.id.clone(),
            title: place.label.clone(),
            category: place.category.clone(),
            rating: place.rating,
            open_hours: place.open_hours.clone(),
            image_url: place.image_url.clone(),
        }
    }
}

pub trait MapSurface {
    /// Opaque handle for one created marker.
    type Marker;

    fn set_center(&mut self, at: Coordinates, zoom: u8);

    fn create_marker(&mut self, at: Coordinates, style: MarkerStyle, on_click: MarkerClick)
        -> Self::Marker;

    fn remove_marker(&mut self, marker: Self::Marker);

    /// Surfaces that cannot restyle in place may ignore this.
    fn set_marker_style(&mut self, _marker: &Self::Marker, _style: MarkerStyle) {}

    fn open_popover(&mut self, at: Coordinates, content: &PopoverContent);

    fn close_popover(&mut self);
}

/// Handle issued by [`InMemoryMap`].
#[derive(Debug, PartialEq, Eq)]
pub struct InMemoryMarker(u64);

#[derive(Debug, Clone)]
pub struct PlacedMarker {
    pub at: Coordinates,
    pub style: MarkerStyle,
    pub on_click: MarkerClick,
}

/// A map surface that records every call, used by the CLI and tests.
#[derive(Debug, Default)]
pub struct InMemoryMap {
    next_handle: u64,
    markers: BTreeMap<u64, PlacedMarker>,
    center: Option<Coordinates>,
    zoom: Option<u8>,
    popover: Option<(Coordinates, PopoverContent)>,
    created: usize,
    removed: usize,
}

impl InMemoryMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn center(&self) -> Option<Coordinates> {
        self.center
    }

    #[must_use]
    pub fn zoom(&self) -> Option<u8> {
        self.zoom
    }

    #[must_use]
    pub fn popover(&self) -> Option<&PopoverContent> {
        self.popover.as_ref().map(|(_, content)| content)
    }

    /// Place ids of live markers, sorted.
    #[must_use]
    pub fn marker_place_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .markers
            .values()
            .map(|m| m.on_click.place_id().to_owned())
            .collect();
        ids.sort();
        ids
    }

    #[must_use]
    pub fn marker_for(&self, place_id: &str) -> Option<&PlacedMarker> {
        self.markers
            .values()
            .find(|m| m.on_click.place_id() == place_id)
    }

    /// Simulates a user click on the marker for `place_id`. Returns `false`
    /// when no such marker is live.
    pub fn click(&self, place_id: &str) -> bool {
        match self.marker_for(place_id) {
            Some(marker) => {
                marker.on_click.fire();
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn created_count(&self) -> usize {
        self.created
    }

    #[must_use]
    pub fn removed_count(&self) -> usize {
        self.removed
    }

    #[must_use]
    pub fn live_count(&self) -> usize {
        self.markers.len()
    }
}

impl MapSurface for InMemoryMap {
    type Marker = InMemoryMarker;

    fn set_center(&mut self, at: Coordinates, zoom: u8) {
        self.center = Some(at);
        self.zoom = Some(zoom);
    }

    fn create_marker(
        &mut self,
        at: Coordinates,
        style: MarkerStyle,
        on_click: MarkerClick,
    ) -> InMemoryMarker {
        self.next_handle += 1;
        self.markers.insert(
            self.next_handle,
            PlacedMarker {
                at,
                style,
                on_click,
            },
        );
        self.created += 1;
        InMemoryMarker(self.next_handle)
    }

    fn remove_marker(&mut self, marker: InMemoryMarker) {
        if self.markers.remove(&marker.0).is_some() {
            self.removed += 1;
        } else {
            tracing::warn!(handle = marker.0, "remove_marker: unknown handle");
        }
    }

    fn set_marker_style(&mut self, marker: &InMemoryMarker, style: MarkerStyle) {
        if let Some(placed) = self.markers.get_mut(&marker.0) {
            placed.style = style;
        }
    }

    fn open_popover(&mut self, at: Coordinates, content: &PopoverContent) {
        self.popover = Some((at, content.clone()));
    }

    fn close_popover(&mut self) {
        self.popover = None;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[test]
    fn click_fires_handler_with_place_id() {
        let clicked = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&clicked);
        let mut map = InMemoryMap::new();
        let handle = map.create_marker(
            Coordinates::new(1.0, 1.0),
            MarkerStyle::Default,
            MarkerClick::new(
                "p1",
                Arc::new(move |id: &str| sink.lock().unwrap().push(id.to_owned())),
            ),
        );

        assert!(map.click("p1"));
        assert!(!map.click("p2"));
        assert_eq!(*clicked.lock().unwrap(), vec!["p1".to_string()]);

        map.remove_marker(handle);
        assert!(!map.click("p1"));
        assert_eq!((map.created_count(), map.removed_count()), (1, 1));
    }

    #[test]
    fn popover_content_copies_place_fields() {
        let place = PlaceCandidate::new("p1", "Smalls", Coordinates::new(0.0, 0.0))
            .with_category("Bar");
        let content = PopoverContent::from(&place);
        assert_eq!(content.title, "Smalls");
        assert_eq!(content.category.as_deref(), Some("Bar"));
    }
}
