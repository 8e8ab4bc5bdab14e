//! Scripted collaborators for coordinator integration tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::Notify;
use venuemap_core::{parse_catalog, Catalog, Coordinates, PlaceCandidate};
use venuemap_gateway::{PlaceGateway, RemoteError};
use venuemap_search::{CoordinatorSettings, InMemoryMap, SearchCoordinator, StaticGeolocator};

pub type TestCoordinator<G = ScriptedGateway> = SearchCoordinator<G, StaticGeolocator, InMemoryMap>;

#[derive(Debug, Clone)]
enum Outcome {
    Places(Vec<PlaceCandidate>),
    Place(PlaceCandidate),
    Fail(&'static str),
}

/// One scripted answer. A gated reply waits for [`Reply::release`] before
/// resolving.
#[derive(Debug, Clone)]
pub struct Reply {
    outcome: Outcome,
    gate: Option<Arc<Notify>>,
}

impl Reply {
    pub fn places(list: Vec<PlaceCandidate>) -> Self {
        Self {
            outcome: Outcome::Places(list),
            gate: None,
        }
    }

    pub fn place(place: PlaceCandidate) -> Self {
        Self {
            outcome: Outcome::Place(place),
            gate: None,
        }
    }

    pub fn fail(status: &'static str) -> Self {
        Self {
            outcome: Outcome::Fail(status),
            gate: None,
        }
    }

    /// Makes the reply wait for the returned gate.
    pub fn gated(mut self) -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        self.gate = Some(Arc::clone(&gate));
        (self, gate)
    }

    async fn resolve(self) -> Result<Outcome, RemoteError> {
        if let Some(gate) = self.gate {
            gate.notified().await;
        }
        match self.outcome {
            Outcome::Fail(status) => Err(RemoteError::Api {
                status: status.to_owned(),
                message: "scripted failure".to_owned(),
            }),
            other => Ok(other),
        }
    }
}

/// A gateway that answers from a script keyed by operation and input, and
/// records every call it receives. Unscripted calls resolve empty.
#[derive(Debug, Default)]
pub struct ScriptedGateway {
    script: Mutex<HashMap<(&'static str, String), Reply>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn on(&self, operation: &'static str, input: &str, reply: Reply) {
        self.script
            .lock()
            .unwrap()
            .insert((operation, input.to_owned()), reply);
    }

    /// Calls received so far, as `"operation:input"`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn was_called(&self, operation: &str, input: &str) -> bool {
        let key = format!("{operation}:{input}");
        self.calls.lock().unwrap().iter().any(|c| *c == key)
    }

    fn take(&self, operation: &'static str, input: &str) -> Option<Reply> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("{operation}:{input}"));
        self.script
            .lock()
            .unwrap()
            .get(&(operation, input.to_owned()))
            .cloned()
    }
}

impl PlaceGateway for ScriptedGateway {
    async fn search(&self, text: &str) -> Result<Vec<PlaceCandidate>, RemoteError> {
        match self.take("search", text) {
            Some(reply) => match reply.resolve().await? {
                Outcome::Places(list) => Ok(list),
                other => panic!("search scripted with {other:?}"),
            },
            None => Ok(Vec::new()),
        }
    }

    async fn autocomplete(&self, text: &str) -> Result<Vec<PlaceCandidate>, RemoteError> {
        match self.take("autocomplete", text) {
            Some(reply) => match reply.resolve().await? {
                Outcome::Places(list) => Ok(list),
                other => panic!("autocomplete scripted with {other:?}"),
            },
            None => Ok(Vec::new()),
        }
    }

    async fn details(&self, place_id: &str) -> Result<PlaceCandidate, RemoteError> {
        match self.take("details", place_id) {
            Some(reply) => match reply.resolve().await? {
                Outcome::Place(place) => Ok(place),
                other => panic!("details scripted with {other:?}"),
            },
            None => Err(RemoteError::Incomplete {
                place_id: place_id.to_owned(),
                reason: "not scripted".to_owned(),
            }),
        }
    }
}

/// Yields to spawned tasks until `gateway` has received the call.
pub async fn wait_for_call(gateway: &ScriptedGateway, operation: &str, input: &str) {
    for _ in 0..1_000 {
        if gateway.was_called(operation, input) {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!(
        "gateway never received {operation}:{input}; calls: {:?}",
        gateway.calls()
    );
}

pub const CATALOG_YAML: &str = r"
categories:
  - id: venue_type
    label: Venue Type
    options: [Bar, Lounge, Club]
  - id: music_genre
    label: Music Genre
    facet: genre
    options: [Jazz, Rock]
";

pub fn catalog() -> Arc<Catalog> {
    Arc::new(parse_catalog(CATALOG_YAML).unwrap())
}

pub fn settings() -> CoordinatorSettings {
    CoordinatorSettings {
        autocomplete_min_chars: 3,
        autocomplete_debounce: Duration::ZERO,
        request_timeout: Duration::from_secs(2),
        search_max_retries: 0,
        retry_backoff_base_ms: 0,
        detail_zoom: 17,
        default_center: Coordinates::new(0.0, 0.0),
        default_zoom: 12,
    }
}

pub fn coordinator(gateway: &Arc<ScriptedGateway>, locator: StaticGeolocator) -> TestCoordinator {
    SearchCoordinator::new(
        catalog(),
        Arc::clone(gateway),
        Arc::new(locator),
        InMemoryMap::new(),
        settings(),
    )
}

pub fn place(id: &str, category: &str, lat: f64, lon: f64) -> PlaceCandidate {
    PlaceCandidate::new(id, format!("Place {id}"), Coordinates::new(lat, lon)).with_category(category)
}
