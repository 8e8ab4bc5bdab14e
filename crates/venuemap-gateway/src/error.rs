use thiserror::Error;

/// Failures from the remote search, autocomplete, and place-details APIs.
///
/// Callers recover from every variant by falling back to an empty result.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// Network or TLS failure, timeout, or non-2xx HTTP status.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a status other than `OK` or `ZERO_RESULTS`.
    #[error("places API returned {status}: {message}")]
    Api { status: String, message: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// A details response lacked data the contract guarantees.
    #[error("incomplete place record for {place_id}: {reason}")]
    Incomplete { place_id: String, reason: String },

    #[error("place id must be non-empty")]
    EmptyPlaceId,

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// The caller gave up waiting for the operation.
    #[error("{operation} timed out after {after_ms} ms")]
    Timeout { operation: String, after_ms: u64 },
}
