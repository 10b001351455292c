//! Scheduled trigger: arm a run to start at a wall-clock instant.
//!
//! Thin caller-side helper; the pipeline itself knows nothing about
//! scheduling. The wait sleeps in poll-interval slices so cancellation is
//! observed promptly even for a start time hours away.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::info;

use crate::cancel::CancelToken;

/// Wait until `start_at`. Returns true when the instant was reached, false
/// when cancellation was requested first. A start time in the past returns
/// true immediately.
pub async fn wait_until(
    start_at: DateTime<Utc>,
    poll_interval: Duration,
    cancel: &CancelToken,
) -> bool {
    let poll_interval = poll_interval.max(Duration::from_millis(10));
    info!(%start_at, "armed, waiting for start time");

    loop {
        if cancel.is_requested() {
            return false;
        }

        let remaining = start_at - Utc::now();
        let Ok(remaining) = remaining.to_std() else {
            // Already past the target instant.
            return true;
        };
        if remaining.is_zero() {
            return true;
        }

        tokio::time::sleep(remaining.min(poll_interval)).await;
    }
}
