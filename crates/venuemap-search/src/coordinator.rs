//! Turns UI intents into state changes and remote calls.
//!
//! One task owns the [`SearchCoordinator`]. Remote calls run on spawned
//! tasks and report back through the coordinator's inbox carrying the
//! generation token they were issued with. A completion whose token is no
//! longer current is dropped on arrival. Marker click handlers post into the
//! same inbox, so every state change happens on the owning task.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use venuemap_core::{
    query_len, AppConfig, Catalog, Coordinates, Notice, NoticeKind, PlaceCandidate,
};
use venuemap_gateway::{PlaceGateway, RemoteError};

use crate::error::{GeolocationError, InvariantViolation};
use crate::filter::FilterSelection;
use crate::generation::{Generation, Token};
use crate::geolocation::Geolocator;
use crate::map::{MapSurface, MarkerClick};
use crate::markers::MarkerSynchronizer;
use crate::results::ResultSetStore;
use crate::retry::{call_with_timeout, retry_with_backoff};
use crate::selection::{SelectionPhase, SelectionState, SelectionStateMachine};

/// Tunables for one coordinator instance.
#[derive(Debug, Clone)]
pub struct CoordinatorSettings {
    /// Input shorter than this (in characters, after trimming) clears the
    /// suggestions instead of requesting them.
    pub autocomplete_min_chars: usize,
    pub autocomplete_debounce: Duration,
    /// Caller-side limit on each remote attempt and on geolocation.
    pub request_timeout: Duration,
    pub search_max_retries: u32,
    pub retry_backoff_base_ms: u64,
    pub detail_zoom: u8,
    pub default_center: Coordinates,
    pub default_zoom: u8,
}

impl CoordinatorSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            autocomplete_min_chars: config.autocomplete_min_chars,
            autocomplete_debounce: Duration::from_millis(config.autocomplete_debounce_ms),
            request_timeout: Duration::from_secs(config.request_timeout_secs),
            search_max_retries: config.search_max_retries,
            retry_backoff_base_ms: config.retry_backoff_base_ms,
            detail_zoom: config.detail_zoom,
            default_center: config.default_center,
            default_zoom: config.default_zoom,
        }
    }
}

impl Default for CoordinatorSettings {
    fn default() -> Self {
        Self {
            autocomplete_min_chars: 3,
            autocomplete_debounce: Duration::from_millis(250),
            request_timeout: Duration::from_secs(10),
            search_max_retries: 1,
            retry_backoff_base_ms: 500,
            detail_zoom: 17,
            default_center: Coordinates::new(40.7306, -73.9866),
            default_zoom: 12,
        }
    }
}

/// A user intent delivered to [`SearchCoordinator::run`].
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    InputChanged(String),
    Submitted(String),
    SuggestionPicked(PlaceCandidate),
    FilterToggled { category_id: String, option: String },
    FiltersCleared,
    MarkerClicked(String),
    InfoClosed,
    DetailPanelOpened,
    DetailPanelClosed,
    UseMyLocation,
    Shutdown,
}

enum Inbound {
    Ui(UiEvent),
    Remote(Completion),
}

enum Completion {
    Autocomplete {
        token: Token,
        text: String,
        result: Result<Vec<PlaceCandidate>, RemoteError>,
    },
    /// The debounce window ended after a newer input arrived; no call was made.
    AutocompleteSkipped { token: Token },
    Search {
        token: Token,
        text: String,
        result: Result<Vec<PlaceCandidate>, RemoteError>,
    },
    Details {
        token: Token,
        stub: PlaceCandidate,
        result: Result<PlaceCandidate, RemoteError>,
    },
    Location {
        token: Token,
        result: Result<Coordinates, GeolocationError>,
    },
}

pub struct SearchCoordinator<G, L, M: MapSurface> {
    gateway: Arc<G>,
    geolocator: Arc<L>,
    map: M,
    settings: CoordinatorSettings,
    store: ResultSetStore,
    selection: SelectionStateMachine,
    markers: MarkerSynchronizer<M>,
    query_text: String,
    notices: Vec<Notice>,
    autocomplete_gen: Generation,
    search_gen: Generation,
    details_gen: Generation,
    location_gen: Generation,
    inbox_tx: mpsc::UnboundedSender<Inbound>,
    inbox_rx: mpsc::UnboundedReceiver<Inbound>,
    in_flight: usize,
    shut_down: bool,
}

impl<G, L, M> SearchCoordinator<G, L, M>
where
    G: PlaceGateway,
    L: Geolocator,
    M: MapSurface,
{
    /// Builds a coordinator with the catalog's seed places as the initial
    /// result set and draws them on `map`.
    pub fn new(
        catalog: Arc<Catalog>,
        gateway: Arc<G>,
        geolocator: Arc<L>,
        map: M,
        settings: CoordinatorSettings,
    ) -> Self {
        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();
        let mut selection = SelectionStateMachine::new(
            settings.default_center,
            settings.default_zoom,
            settings.detail_zoom,
        );
        let mut store = ResultSetStore::new(Arc::clone(&catalog));
        let seeded = store.set_candidates(catalog.seed_places.clone(), &mut selection);
        tracing::debug!(seeded, "result set seeded from catalog");

        let mut coordinator = Self {
            gateway,
            geolocator,
            map,
            settings,
            store,
            selection,
            markers: MarkerSynchronizer::new(),
            query_text: String::new(),
            notices: Vec::new(),
            autocomplete_gen: Generation::new(),
            search_gen: Generation::new(),
            details_gen: Generation::new(),
            location_gen: Generation::new(),
            inbox_tx,
            inbox_rx,
            in_flight: 0,
            shut_down: false,
        };
        coordinator.sync();
        coordinator
    }

    /// Records the visible query text and requests suggestions once the
    /// input is long enough. Shorter input clears the suggestions and
    /// supersedes any pending request.
    pub fn on_input_change(&mut self, text: &str) {
        if self.ignoring("on_input_change") {
            return;
        }
        text.clone_into(&mut self.query_text);

        if query_len(text) < self.settings.autocomplete_min_chars {
            self.autocomplete_gen.invalidate();
            self.store.clear_suggestions();
            return;
        }

        let token = self.autocomplete_gen.issue();
        let generation = self.autocomplete_gen.clone();
        let gateway = Arc::clone(&self.gateway);
        let debounce = self.settings.autocomplete_debounce;
        let limit = self.settings.request_timeout;
        let text = text.to_owned();

        self.spawn_remote(async move {
            if !debounce.is_zero() {
                tokio::time::sleep(debounce).await;
            }
            if !generation.is_current(token) {
                return Completion::AutocompleteSkipped { token };
            }
            let result = call_with_timeout("autocomplete", limit, gateway.autocomplete(&text)).await;
            Completion::Autocomplete {
                token,
                text,
                result,
            }
        });
    }

    /// Runs a full search for `text`. Pending suggestions are discarded and
    /// nothing is auto-selected when results arrive.
    pub fn on_submit(&mut self, text: &str) {
        if self.ignoring("on_submit") {
            return;
        }
        text.clone_into(&mut self.query_text);
        self.autocomplete_gen.invalidate();
        self.store.clear_suggestions();

        let token = self.search_gen.issue();
        let gateway = Arc::clone(&self.gateway);
        let limit = self.settings.request_timeout;
        let max_retries = self.settings.search_max_retries;
        let backoff_base_ms = self.settings.retry_backoff_base_ms;
        let text = text.to_owned();

        self.spawn_remote(async move {
            let result = retry_with_backoff(max_retries, backoff_base_ms, || {
                call_with_timeout("search", limit, gateway.search(&text))
            })
            .await;
            Completion::Search {
                token,
                text,
                result,
            }
        });
    }

    /// Selects a picked suggestion, resolving its coordinates through place
    /// details first when the stub has none.
    pub fn on_suggestion_picked(&mut self, candidate: PlaceCandidate) {
        if self.ignoring("on_suggestion_picked") {
            return;
        }
        self.autocomplete_gen.invalidate();
        self.store.clear_suggestions();
        self.query_text.clone_from(&candidate.label);

        if candidate.has_coordinates() {
            self.place_and_select(candidate);
            return;
        }

        let token = self.details_gen.issue();
        let gateway = Arc::clone(&self.gateway);
        let limit = self.settings.request_timeout;
        let max_retries = self.settings.search_max_retries;
        let backoff_base_ms = self.settings.retry_backoff_base_ms;

        self.spawn_remote(async move {
            let result = retry_with_backoff(max_retries, backoff_base_ms, || {
                call_with_timeout("details", limit, gateway.details(&candidate.id))
            })
            .await;
            Completion::Details {
                token,
                stub: candidate,
                result,
            }
        });
    }

    pub fn on_filter_toggle(&mut self, category_id: &str, option: &str) {
        if self.ignoring("on_filter_toggle") {
            return;
        }
        match self.store.toggle_filter(category_id, option) {
            Ok(selected) => {
                tracing::debug!(
                    category_id,
                    option,
                    selected,
                    visible = self.store.filtered_view().len(),
                    "filter toggled"
                );
                self.sync();
            }
            Err(violation) => {
                tracing::warn!(%violation, "ignoring filter toggle");
            }
        }
    }

    pub fn on_clear_filters(&mut self) {
        if self.ignoring("on_clear_filters") {
            return;
        }
        self.store.clear_filters();
        self.sync();
    }

    pub fn on_marker_clicked(&mut self, place_id: &str) {
        if self.ignoring("on_marker_clicked") {
            return;
        }
        let Some(place) = self.store.find(place_id) else {
            let violation = InvariantViolation::UnknownPlace(place_id.to_owned());
            tracing::warn!(%violation, "ignoring marker click");
            return;
        };
        if let Err(violation) = self.selection.select(place) {
            tracing::warn!(%violation, "ignoring marker click");
            return;
        }
        self.sync();
    }

    pub fn on_close_info(&mut self) {
        if self.ignoring("on_close_info") {
            return;
        }
        self.selection.close_info();
        self.sync();
    }

    pub fn on_open_detail_panel(&mut self) {
        if self.ignoring("on_open_detail_panel") {
            return;
        }
        if !self.selection.open_detail_panel() {
            tracing::debug!("detail panel requested with nothing selected");
        }
        self.sync();
    }

    pub fn on_close_detail_panel(&mut self) {
        if self.ignoring("on_close_detail_panel") {
            return;
        }
        self.selection.close_detail_panel();
        self.sync();
    }

    /// Asks the geolocator for the current position. Success recenters the
    /// map at the current zoom and clears the selection; failure raises a
    /// [`Notice`] and changes nothing else.
    pub fn on_use_my_location(&mut self) {
        if self.ignoring("on_use_my_location") {
            return;
        }
        let token = self.location_gen.issue();
        let geolocator = Arc::clone(&self.geolocator);
        let limit = self.settings.request_timeout;

        self.spawn_remote(async move {
            let result = tokio::time::timeout(limit, geolocator.current_position())
                .await
                .unwrap_or(Err(GeolocationError::Timeout));
            Completion::Location { token, result }
        });
    }

    /// Routes one UI event to its handler.
    pub fn handle_event(&mut self, event: UiEvent) {
        match event {
            UiEvent::InputChanged(text) => self.on_input_change(&text),
            UiEvent::Submitted(text) => self.on_submit(&text),
            UiEvent::SuggestionPicked(candidate) => self.on_suggestion_picked(candidate),
            UiEvent::FilterToggled {
                category_id,
                option,
            } => self.on_filter_toggle(&category_id, &option),
            UiEvent::FiltersCleared => self.on_clear_filters(),
            UiEvent::MarkerClicked(place_id) => self.on_marker_clicked(&place_id),
            UiEvent::InfoClosed => self.on_close_info(),
            UiEvent::DetailPanelOpened => self.on_open_detail_panel(),
            UiEvent::DetailPanelClosed => self.on_close_detail_panel(),
            UiEvent::UseMyLocation => self.on_use_my_location(),
            UiEvent::Shutdown => self.shutdown(),
        }
    }

    /// Processes one queued completion or marker click, waiting if a remote
    /// call is still outstanding. Returns `false` when there is nothing left
    /// to wait for.
    pub async fn step(&mut self) -> bool {
        let inbound = match self.inbox_rx.try_recv() {
            Ok(inbound) => inbound,
            Err(_) if self.in_flight == 0 => return false,
            Err(_) => match self.inbox_rx.recv().await {
                Some(inbound) => inbound,
                None => return false,
            },
        };
        self.dispatch(inbound);
        true
    }

    /// Processes completions until no remote call is in flight and the
    /// inbox is empty.
    pub async fn settle(&mut self) {
        while self.step().await {}
    }

    /// Drives the coordinator from `events` until a [`UiEvent::Shutdown`]
    /// arrives or the sender side is dropped, then tears the map down.
    pub async fn run(&mut self, mut events: mpsc::Receiver<UiEvent>) {
        while !self.shut_down {
            tokio::select! {
                event = events.recv() => match event {
                    Some(event) => self.handle_event(event),
                    None => break,
                },
                Some(inbound) = self.inbox_rx.recv() => self.dispatch(inbound),
            }
        }
        self.shutdown();
    }

    fn dispatch(&mut self, inbound: Inbound) {
        match inbound {
            Inbound::Ui(event) => self.handle_event(event),
            Inbound::Remote(completion) => {
                self.in_flight = self.in_flight.saturating_sub(1);
                self.apply_completion(completion);
            }
        }
    }

    fn apply_completion(&mut self, completion: Completion) {
        match completion {
            Completion::Autocomplete {
                token,
                text,
                result,
            } => {
                if !self.autocomplete_gen.is_current(token) {
                    tracing::debug!(input = %text, "discarding superseded autocomplete response");
                    return;
                }
                match result {
                    Ok(suggestions) => {
                        tracing::debug!(input = %text, count = suggestions.len(), "suggestions updated");
                        self.store.set_suggestions(suggestions);
                    }
                    Err(err) => {
                        tracing::warn!(input = %text, error = %err, "autocomplete failed; no suggestions");
                        self.store.clear_suggestions();
                    }
                }
            }
            Completion::AutocompleteSkipped { token } => {
                tracing::trace!(?token, "autocomplete superseded during debounce");
            }
            Completion::Search {
                token,
                text,
                result,
            } => {
                if !self.search_gen.is_current(token) {
                    tracing::debug!(query = %text, "discarding superseded search response");
                    return;
                }
                let candidates = result.unwrap_or_else(|err| {
                    tracing::warn!(query = %text, error = %err, "search failed; showing no results");
                    Vec::new()
                });
                let kept = self.store.set_candidates(candidates, &mut self.selection);
                tracing::info!(query = %text, results = kept, "search completed");
                self.sync();
            }
            Completion::Details {
                token,
                stub,
                result,
            } => {
                if !self.details_gen.is_current(token) {
                    tracing::debug!(place_id = %stub.id, "discarding superseded details response");
                    return;
                }
                match result {
                    Ok(place) => self.place_and_select(stub.merged_with(place)),
                    Err(err) => {
                        tracing::warn!(place_id = %stub.id, error = %err, "could not resolve picked suggestion");
                    }
                }
            }
            Completion::Location { token, result } => {
                if !self.location_gen.is_current(token) {
                    tracing::debug!("discarding superseded location fix");
                    return;
                }
                match result {
                    Ok(at) => {
                        let zoom = self.selection.zoom();
                        self.selection.recenter(at, zoom);
                        self.selection.clear();
                        self.sync();
                    }
                    Err(err) => {
                        tracing::warn!(error = %err, "geolocation failed");
                        self.notices.push(Notice::new(
                            NoticeKind::Geolocation,
                            format!("Could not determine your location: {err}"),
                        ));
                    }
                }
            }
        }
    }

    fn place_and_select(&mut self, candidate: PlaceCandidate) {
        match self.store.upsert(candidate) {
            Ok(stored) => {
                if let Err(violation) = self.selection.select(stored) {
                    tracing::warn!(%violation, "could not select place");
                }
            }
            Err(violation) => tracing::warn!(%violation, "could not add place to results"),
        }
        self.sync();
    }

    fn spawn_remote<F>(&mut self, task: F)
    where
        F: Future<Output = Completion> + Send + 'static,
    {
        let tx = self.inbox_tx.clone();
        self.in_flight += 1;
        tokio::spawn(async move {
            let completion = task.await;
            if tx.send(Inbound::Remote(completion)).is_err() {
                tracing::debug!("coordinator dropped before remote call completed");
            }
        });
    }
}

impl<G, L, M: MapSurface> SearchCoordinator<G, L, M> {
    /// Brings the markers and the viewport in line with the current state.
    fn sync(&mut self) {
        if self.shut_down {
            return;
        }
        let selected_id = self.selection.selected_id().map(str::to_owned);
        let tx = self.inbox_tx.clone();
        self.markers.reconcile(
            &mut self.map,
            self.store.filtered_view(),
            selected_id.as_deref(),
            |place_id| {
                let tx = tx.clone();
                MarkerClick::new(
                    place_id,
                    Arc::new(move |id: &str| {
                        if tx
                            .send(Inbound::Ui(UiEvent::MarkerClicked(id.to_owned())))
                            .is_err()
                        {
                            tracing::debug!(place_id = id, "marker clicked after coordinator dropped");
                        }
                    }),
                )
            },
        );
        let selected = selected_id.as_deref().and_then(|id| self.store.find(id));
        self.selection.flush(&mut self.map, selected);
    }

    /// `true` once shut down; handlers bail out so no marker outlives the
    /// teardown.
    fn ignoring(&self, handler: &str) -> bool {
        if self.shut_down {
            tracing::debug!(handler, "coordinator shut down; ignoring");
        }
        self.shut_down
    }

    /// Supersedes every outstanding request and removes every marker.
    /// Safe to call more than once.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;
        self.autocomplete_gen.invalidate();
        self.search_gen.invalidate();
        self.details_gen.invalidate();
        self.location_gen.invalidate();
        self.markers.teardown(&mut self.map);
        self.selection.clear();
        self.selection.flush(&mut self.map, None);
        tracing::debug!("search coordinator shut down");
    }

    #[must_use]
    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    #[must_use]
    pub fn query_text(&self) -> &str {
        &self.query_text
    }

    #[must_use]
    pub fn suggestions(&self) -> &[PlaceCandidate] {
        self.store.suggestions()
    }

    #[must_use]
    pub fn candidates(&self) -> &[PlaceCandidate] {
        self.store.candidates()
    }

    #[must_use]
    pub fn filtered_view(&self) -> &[PlaceCandidate] {
        self.store.filtered_view()
    }

    #[must_use]
    pub fn filters(&self) -> &FilterSelection {
        self.store.filters()
    }

    #[must_use]
    pub fn selection(&self) -> &SelectionState {
        self.selection.state()
    }

    #[must_use]
    pub fn phase(&self) -> SelectionPhase {
        self.selection.phase()
    }

    #[must_use]
    pub fn map(&self) -> &M {
        &self.map
    }

    #[must_use]
    pub fn settings(&self) -> &CoordinatorSettings {
        &self.settings
    }

    #[must_use]
    pub fn tracked_marker_ids(&self) -> Vec<String> {
        self.markers.tracked_ids()
    }

    /// Remote calls spawned but not yet processed.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Notices raised since the last call. Each notice is returned once.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }
}

impl<G, L, M: MapSurface> Drop for SearchCoordinator<G, L, M> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
