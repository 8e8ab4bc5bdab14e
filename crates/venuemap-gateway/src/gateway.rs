use std::future::Future;

use venuemap_core::PlaceCandidate;

use crate::error::RemoteError;

/// The three remote place operations the search coordinator consumes.
///
/// Implementations must resolve blank `text` to an empty list without
/// touching the network, and must not retry; retry policy belongs to the
/// caller.
pub trait PlaceGateway: Send + Sync + 'static {
    /// Full text search. Every returned candidate carries coordinates.
    fn search(
        &self,
        text: &str,
    ) -> impl Future<Output = Result<Vec<PlaceCandidate>, RemoteError>> + Send;

    /// Suggestion stubs for partial input. Coordinates are usually absent.
    fn autocomplete(
        &self,
        text: &str,
    ) -> impl Future<Output = Result<Vec<PlaceCandidate>, RemoteError>> + Send;

    /// A fully populated record, coordinates included.
    fn details(
        &self,
        place_id: &str,
    ) -> impl Future<Output = Result<PlaceCandidate, RemoteError>> + Send;
}
