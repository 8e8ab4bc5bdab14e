//! Device position lookup.

use std::future::Future;

use venuemap_core::Coordinates;

use crate::error::GeolocationError;

/// Source of the user's current position.
pub trait Geolocator: Send + Sync + 'static {
    fn current_position(&self) -> impl Future<Output = Result<Coordinates, GeolocationError>> + Send;
}

/// A geolocator with a fixed answer, for hosts without a positioning
/// service and for tests.
#[derive(Debug, Clone, PartialEq)]
pub enum StaticGeolocator {
    Fixed(Coordinates),
    Denied,
    Unsupported,
}

impl StaticGeolocator {
    /// `Fixed` when a position is configured, otherwise `Unsupported`.
    #[must_use]
    pub fn from_home(home: Option<Coordinates>) -> Self {
        home.map_or(Self::Unsupported, Self::Fixed)
    }
}

impl Geolocator for StaticGeolocator {
    async fn current_position(&self) -> Result<Coordinates, GeolocationError> {
        match self {
            Self::Fixed(at) if at.is_valid() => Ok(*at),
            Self::Fixed(at) => Err(GeolocationError::Unavailable(format!(
                "configured position {at} is out of range"
            ))),
            Self::Denied => Err(GeolocationError::PermissionDenied),
            Self::Unsupported => Err(GeolocationError::Unsupported),
        }
    }
}
