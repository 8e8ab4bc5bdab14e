//! Search, filter composition, and map selection for the venue finder.
//!
//! [`SearchCoordinator`] owns every piece of interactive state and is the only
//! writer to the map surface. Remote calls run as spawned tasks and report
//! back through the coordinator's inbox tagged with a generation token, so
//! superseded responses are dropped on arrival.

pub mod coordinator;
pub mod error;
pub mod filter;
pub mod generation;
pub mod geolocation;
pub mod map;
pub mod markers;
pub mod results;
mod retry;
pub mod selection;

pub use coordinator::{CoordinatorSettings, SearchCoordinator, UiEvent};
pub use error::{GeolocationError, InvariantViolation};
pub use filter::{FilterComposer, FilterSelection};
pub use generation::{Generation, Token};
pub use geolocation::{Geolocator, StaticGeolocator};
pub use map::{
    InMemoryMap, InMemoryMarker, MapSurface, MarkerClick, MarkerStyle, PlacedMarker, PopoverContent,
};
pub use markers::MarkerSynchronizer;
pub use results::ResultSetStore;
pub use selection::{SelectionPhase, SelectionState, SelectionStateMachine};
