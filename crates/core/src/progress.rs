//! Progress reporting sink.
//!
//! Progress is fire-and-forget: a sink must never block, fail, or otherwise
//! affect control flow. The core only ever calls [`ProgressSink::report`]
//! and moves on.

use std::sync::Arc;

/// Best-effort progress messages for a UI or log consumer.
pub trait ProgressSink: Send + Sync {
    fn report(&self, message: &str);
}

/// Sink that forwards progress to the `tracing` pipeline at info level.
#[derive(Debug, Default, Clone)]
pub struct TracingSink;

impl ProgressSink for TracingSink {
    fn report(&self, message: &str) {
        tracing::info!("{}", message);
    }
}

/// Sink that discards everything.
#[derive(Debug, Default, Clone)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn report(&self, _message: &str) {}
}

/// Wrap a sink so every message carries an account label, matching the
/// per-account progress lines of the redemption pool.
pub(crate) struct AccountSink {
    account_id: u32,
    inner: Arc<dyn ProgressSink>,
}

impl AccountSink {
    pub(crate) fn new(account_id: u32, inner: Arc<dyn ProgressSink>) -> Self {
        Self { account_id, inner }
    }
}

impl ProgressSink for AccountSink {
    fn report(&self, message: &str) {
        self.inner
            .report(&format!("[account {}] {}", self.account_id, message));
    }
}
