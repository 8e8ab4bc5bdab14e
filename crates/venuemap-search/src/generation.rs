//! Latest-request-wins bookkeeping for asynchronous responses.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Identifies one issued request within a [`Generation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Token(u64);

/// A monotonically increasing counter shared between the coordinator and
/// the tasks it spawns.
///
/// Each new request takes a fresh [`Token`]; a response is applied only if
/// its token is still the latest one issued. Clones share the same counter.
#[derive(Debug, Clone, Default)]
pub struct Generation(Arc<AtomicU64>);

impl Generation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a token that supersedes every earlier one.
    pub fn issue(&self) -> Token {
        Token(self.0.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Supersedes every outstanding token without issuing a new request.
    pub fn invalidate(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_current(&self, token: Token) -> bool {
        self.0.load(Ordering::SeqCst) == token.0
    }
}
