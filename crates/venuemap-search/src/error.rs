use thiserror::Error;

/// The platform could not provide the current position.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeolocationError {
    #[error("location permission was denied")]
    PermissionDenied,

    #[error("geolocation is not supported on this device")]
    Unsupported,

    #[error("position unavailable: {0}")]
    Unavailable(String),

    #[error("timed out waiting for a position fix")]
    Timeout,
}

/// A request that contradicts the fixed catalog or the current state.
///
/// These are logged and ignored; they never abort the coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("unknown filter category '{0}'")]
    UnknownCategory(String),

    #[error("filter category '{category_id}' has no option '{option}'")]
    UnknownOption { category_id: String, option: String },

    #[error("place '{0}' has no coordinates")]
    PlaceNotLocated(String),

    #[error("place '{0}' is not in the current result set")]
    UnknownPlace(String),
}
