//! Which place is selected, which overlays are open, and where the map
//! viewport sits.
//!
//! The machine never touches the map directly during a transition.
//! [`SelectionStateMachine::flush`] pushes the viewport and popover to the
//! surface afterwards, and only when they changed since the last push.

use venuemap_core::{Coordinates, PlaceCandidate};

use crate::error::InvariantViolation;
use crate::map::{MapSurface, PopoverContent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionPhase {
    /// Nothing selected.
    Idle,
    /// A place is selected. Its info popover may or may not be open.
    Selected,
    /// A place is selected and the detail panel is open.
    DetailOpen,
}

/// Snapshot of the selection and viewport.
///
/// `info_open` or `detail_panel_open` being true implies
/// `selected_place_id` is set.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionState {
    pub selected_place_id: Option<String>,
    pub info_open: bool,
    pub detail_panel_open: bool,
    pub map_center: Coordinates,
    pub map_zoom: u8,
}

#[derive(Debug, Clone, PartialEq)]
struct Pushed {
    center: Option<(Coordinates, u8)>,
    popover: Option<(Coordinates, PopoverContent)>,
}

#[derive(Debug, Clone)]
pub struct SelectionStateMachine {
    state: SelectionState,
    detail_zoom: u8,
    pushed: Pushed,
}

impl SelectionStateMachine {
    #[must_use]
    pub fn new(center: Coordinates, zoom: u8, detail_zoom: u8) -> Self {
        Self {
            state: SelectionState {
                selected_place_id: None,
                info_open: false,
                detail_panel_open: false,
                map_center: center,
                map_zoom: zoom,
            },
            detail_zoom,
            pushed: Pushed {
                center: None,
                popover: None,
            },
        }
    }

    #[must_use]
    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    #[must_use]
    pub fn phase(&self) -> SelectionPhase {
        match (&self.state.selected_place_id, self.state.detail_panel_open) {
            (None, _) => SelectionPhase::Idle,
            (Some(_), false) => SelectionPhase::Selected,
            (Some(_), true) => SelectionPhase::DetailOpen,
        }
    }

    #[must_use]
    pub fn selected_id(&self) -> Option<&str> {
        self.state.selected_place_id.as_deref()
    }

    #[must_use]
    pub fn zoom(&self) -> u8 {
        self.state.map_zoom
    }

    #[must_use]
    pub fn detail_zoom(&self) -> u8 {
        self.detail_zoom
    }

    /// Selects `place` from any phase: opens its info popover, closes the
    /// detail panel, and centers the viewport on it at the detail zoom.
    ///
    /// # Errors
    ///
    /// Returns [`InvariantViolation::PlaceNotLocated`] when `place` has no
    /// coordinates. The state is left untouched.
    pub fn select(&mut self, place: &PlaceCandidate) -> Result<(), InvariantViolation> {
        let at = place
            .coordinates
            .ok_or_else(|| InvariantViolation::PlaceNotLocated(place.id.clone()))?;
        self.state.selected_place_id = Some(place.id.clone());
        self.state.info_open = true;
        self.state.detail_panel_open = false;
        self.recenter(at, self.detail_zoom);
        Ok(())
    }

    /// Opens the detail panel. Returns `false` (and does nothing) when no
    /// place is selected.
    pub fn open_detail_panel(&mut self) -> bool {
        if self.state.selected_place_id.is_none() {
            return false;
        }
        self.state.detail_panel_open = true;
        true
    }

    pub fn close_detail_panel(&mut self) {
        self.state.detail_panel_open = false;
    }

    /// Hides the info popover but keeps the selection so it can be reopened.
    pub fn close_info(&mut self) {
        self.state.info_open = false;
    }

    /// Back to [`SelectionPhase::Idle`]. The viewport stays where it is.
    pub fn clear(&mut self) {
        self.state.selected_place_id = None;
        self.state.info_open = false;
        self.state.detail_panel_open = false;
    }

    /// Moves the viewport without touching the selection.
    pub fn recenter(&mut self, at: Coordinates, zoom: u8) {
        self.state.map_center = at;
        self.state.map_zoom = zoom;
    }

    /// Pushes viewport and popover changes to `map`.
    ///
    /// `selected` is the current record for the selected id, if the caller
    /// still has one. The popover opens only when info is open and a located
    /// record is available.
    pub fn flush<M: MapSurface>(&mut self, map: &mut M, selected: Option<&PlaceCandidate>) {
        let viewport = (self.state.map_center, self.state.map_zoom);
        if self.pushed.center != Some(viewport) {
            map.set_center(viewport.0, viewport.1);
            self.pushed.center = Some(viewport);
        }

        let wanted = selected
            .filter(|_| self.state.info_open)
            .filter(|p| self.state.selected_place_id.as_deref() == Some(p.id.as_str()))
            .and_then(|p| p.coordinates.map(|at| (at, p)));

        match wanted {
            Some((at, place)) => {
                let content = PopoverContent::from(place);
                let stale = self
                    .pushed
                    .popover
                    .as_ref()
                    .is_none_or(|(pushed_at, pushed)| *pushed_at != at || *pushed != content);
                if stale {
                    map.open_popover(at, &content);
                    self.pushed.popover = Some((at, content));
                }
            }
            None => {
                if self.pushed.popover.take().is_some() {
                    map.close_popover();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::InMemoryMap;

    const DETAIL_ZOOM: u8 = 17;

    fn machine() -> SelectionStateMachine {
        SelectionStateMachine::new(Coordinates::new(0.0, 0.0), 12, DETAIL_ZOOM)
    }

    fn place(id: &str, lat: f64, lon: f64) -> PlaceCandidate {
        PlaceCandidate::new(id, format!("Place {id}"), Coordinates::new(lat, lon))
    }

    #[test]
    fn select_opens_info_and_zooms_to_place() {
        let mut sm = machine();
        sm.select(&place("1", 40.7, -74.0)).unwrap();
        let state = sm.state();
        assert_eq!(state.selected_place_id.as_deref(), Some("1"));
        assert!(state.info_open);
        assert!(!state.detail_panel_open);
        assert_eq!(state.map_center, Coordinates::new(40.7, -74.0));
        assert_eq!(state.map_zoom, DETAIL_ZOOM);
        assert_eq!(sm.phase(), SelectionPhase::Selected);
    }

    #[test]
    fn select_rejects_stub_without_coordinates() {
        let mut sm = machine();
        let err = sm.select(&PlaceCandidate::stub("s", "Stub")).unwrap_err();
        assert_eq!(err, InvariantViolation::PlaceNotLocated("s".to_string()));
        assert_eq!(sm.phase(), SelectionPhase::Idle);
        assert_eq!(sm.zoom(), 12);
    }

    #[test]
    fn detail_panel_requires_selection() {
        let mut sm = machine();
        assert!(!sm.open_detail_panel());
        assert!(!sm.state().detail_panel_open);

        sm.select(&place("1", 1.0, 1.0)).unwrap();
        assert!(sm.open_detail_panel());
        assert_eq!(sm.phase(), SelectionPhase::DetailOpen);

        sm.close_detail_panel();
        assert_eq!(sm.phase(), SelectionPhase::Selected);
    }

    #[test]
    fn selecting_another_place_closes_detail_panel() {
        let mut sm = machine();
        sm.select(&place("1", 1.0, 1.0)).unwrap();
        sm.open_detail_panel();
        sm.select(&place("2", 2.0, 2.0)).unwrap();
        assert_eq!(sm.phase(), SelectionPhase::Selected);
        assert_eq!(sm.selected_id(), Some("2"));
    }

    #[test]
    fn close_info_keeps_selection() {
        let mut sm = machine();
        sm.select(&place("1", 1.0, 1.0)).unwrap();
        sm.close_info();
        assert_eq!(sm.selected_id(), Some("1"));
        assert!(!sm.state().info_open);
        assert_eq!(sm.phase(), SelectionPhase::Selected);
    }

    #[test]
    fn clear_returns_to_idle_and_keeps_viewport() {
        let mut sm = machine();
        sm.select(&place("1", 5.0, 6.0)).unwrap();
        sm.open_detail_panel();
        sm.clear();
        let state = sm.state();
        assert_eq!(sm.phase(), SelectionPhase::Idle);
        assert!(!state.info_open && !state.detail_panel_open);
        assert_eq!(state.map_center, Coordinates::new(5.0, 6.0));
    }

    #[test]
    fn recenter_leaves_selection_alone() {
        let mut sm = machine();
        sm.select(&place("1", 1.0, 1.0)).unwrap();
        sm.recenter(Coordinates::new(9.0, 9.0), 10);
        assert_eq!(sm.selected_id(), Some("1"));
        assert_eq!(sm.state().map_zoom, 10);
    }

    #[test]
    fn flush_pushes_only_changes() {
        let mut sm = machine();
        let mut map = InMemoryMap::new();
        let p = place("1", 3.0, 4.0);

        sm.flush(&mut map, None);
        assert_eq!(map.center(), Some(Coordinates::new(0.0, 0.0)));
        assert!(map.popover().is_none());

        sm.select(&p).unwrap();
        sm.flush(&mut map, Some(&p));
        assert_eq!(map.center(), Some(Coordinates::new(3.0, 4.0)));
        assert_eq!(map.zoom(), Some(DETAIL_ZOOM));
        assert_eq!(map.popover().map(|c| c.place_id.as_str()), Some("1"));

        sm.close_info();
        sm.flush(&mut map, Some(&p));
        assert!(map.popover().is_none());
    }

    #[test]
    fn flush_refreshes_popover_when_record_gains_fields() {
        let mut sm = machine();
        let mut map = InMemoryMap::new();
        let stub = place("1", 3.0, 4.0);
        sm.select(&stub).unwrap();
        sm.flush(&mut map, Some(&stub));
        assert!(map.popover().is_some_and(|c| c.open_hours.is_none()));

        let mut richer = stub.clone();
        richer.open_hours = Some("Mon: 5 PM - 2 AM".to_owned());
        sm.flush(&mut map, Some(&richer));
        assert_eq!(
            map.popover().and_then(|c| c.open_hours.as_deref()),
            Some("Mon: 5 PM - 2 AM")
        );
    }
}
