//! Shared cooperative stop signal.
//!
//! Every loop in the system (race workers, account redeemers, pipeline
//! stages) checks the token at the top of each iteration. Observation is
//! polling-based: an in-flight remote call is allowed to finish before the
//! next check picks the signal up.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A clonable, idempotent cancellation token.
///
/// Once requested it stays requested for the lifetime of the token; callers
/// starting a new run construct a fresh one.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    requested: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Safe to call concurrently and repeatedly.
    pub fn request(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }

    /// Non-blocking check, safe for concurrent reads.
    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }
}
