//! Redundant-worker announcement discovery.
//!
//! N identical workers poll the announcement list; the first usable result
//! decides the race and stops everyone. There is deliberately no timeout:
//! availability around the release instant is bursty and a timeout would
//! abort a recoverable condition. Only a decision or external cancellation
//! ends the race.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::cancel::CancelToken;
use crate::client::AnnouncementApi;
use crate::progress::ProgressSink;

use super::types::{FetchError, RaceDecision, RaceSlot};

/// Backoff between a worker's failed attempts.
const WORKER_RETRY_DELAY: Duration = Duration::from_millis(100);
/// Cadence of the caller's wait for a decision.
const DECISION_POLL_DELAY: Duration = Duration::from_millis(100);
/// How long to wait for workers to observe the stop signal before returning.
const WORKER_JOIN_TIMEOUT: Duration = Duration::from_secs(1);

/// Races a configurable number of workers against the discovery endpoint.
pub struct RaceFetcher {
    api: Arc<dyn AnnouncementApi>,
    worker_count: usize,
}

impl RaceFetcher {
    pub fn new(api: Arc<dyn AnnouncementApi>, worker_count: usize) -> Self {
        Self {
            api,
            worker_count: worker_count.max(1),
        }
    }

    /// Run one race and match the winning list against `keyword`.
    ///
    /// Returns the first matching announcement id, `Ok(None)` when the list
    /// was fetched but no title contains the keyword, or an error when the
    /// session died or the caller cancelled.
    pub async fn fetch_announcement_id(
        &self,
        keyword: &str,
        progress: &dyn ProgressSink,
        cancel: &CancelToken,
    ) -> Result<Option<u64>, FetchError> {
        // The race has its own stop scope: deciding the race must not cancel
        // the caller's run.
        let race_stop = CancelToken::new();
        let slot = Arc::new(Mutex::new(RaceSlot::default()));

        info!(
            workers = self.worker_count,
            keyword, "starting announcement race"
        );
        progress.report(&format!(
            "launching {} discovery workers...",
            self.worker_count
        ));

        let mut workers = JoinSet::new();
        for worker_id in 1..=self.worker_count {
            let api = Arc::clone(&self.api);
            let slot = Arc::clone(&slot);
            let race_stop = race_stop.clone();
            let outer = cancel.clone();

            workers.spawn(async move {
                Self::worker_loop(worker_id, api, slot, race_stop, outer).await;
            });
        }

        // Wait until somebody decides or the caller cancels.
        loop {
            if slot.lock().expect("race slot poisoned").is_decided() {
                break;
            }
            if cancel.is_requested() {
                break;
            }
            tokio::time::sleep(DECISION_POLL_DELAY).await;
        }

        // Stop stragglers and give them a bounded window to notice, so no
        // worker keeps hitting the remote service after we return.
        race_stop.request();
        let drain = async {
            while workers.join_next().await.is_some() {}
        };
        if tokio::time::timeout(WORKER_JOIN_TIMEOUT, drain).await.is_err() {
            warn!("race workers did not stop within the join timeout");
            workers.abort_all();
        }

        let decision = slot.lock().expect("race slot poisoned").take();
        match decision {
            Some(RaceDecision::Won(list)) => {
                progress.report("announcement list fetched");
                match list.find_by_keyword(keyword) {
                    Some(item) => {
                        info!(id = item.id, title = %item.title, "matched announcement");
                        progress.report(&format!("found target announcement: {}", item.title));
                        Ok(Some(item.id))
                    }
                    None => {
                        warn!(keyword, "no announcement title contains the keyword");
                        progress.report(&format!(
                            "no announcement matching '{}' yet",
                            keyword
                        ));
                        Ok(None)
                    }
                }
            }
            Some(RaceDecision::SessionInvalid(message)) => {
                error!("discovery session invalid: {}", message);
                progress.report("discovery session invalid, stopping");
                Err(FetchError::SessionInvalid(message))
            }
            None => Err(FetchError::Cancelled),
        }
    }

    async fn worker_loop(
        worker_id: usize,
        api: Arc<dyn AnnouncementApi>,
        slot: Arc<Mutex<RaceSlot>>,
        race_stop: CancelToken,
        outer: CancelToken,
    ) {
        loop {
            if race_stop.is_requested() || outer.is_requested() {
                return;
            }

            match api.fetch_list().await {
                Ok(list) => {
                    let claimed = slot
                        .lock()
                        .expect("race slot poisoned")
                        .try_decide(RaceDecision::Won(list));
                    if claimed {
                        info!(worker_id, "worker won the race, stopping all workers");
                        race_stop.request();
                    }
                    // Losers discard their result and stop.
                    return;
                }
                Err(e) if e.is_session_invalid() => {
                    let claimed = slot
                        .lock()
                        .expect("race slot poisoned")
                        .try_decide(RaceDecision::SessionInvalid(e.to_string()));
                    if claimed {
                        error!(worker_id, "worker observed invalid session, stopping race");
                        race_stop.request();
                    }
                    return;
                }
                Err(e) => {
                    debug!(worker_id, "discovery attempt failed: {}", e);
                }
            }

            tokio::time::sleep(WORKER_RETRY_DELAY).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NullSink;
    use crate::testing::MockAnnouncementApi;

    #[tokio::test]
    async fn test_single_worker_wins() {
        let api = Arc::new(MockAnnouncementApi::new());
        api.set_list(vec![(11, "Event Day1")]).await;

        let fetcher = RaceFetcher::new(api, 1);
        let id = fetcher
            .fetch_announcement_id("Day1", &NullSink, &CancelToken::new())
            .await
            .unwrap();
        assert_eq!(id, Some(11));
    }

    #[tokio::test]
    async fn test_external_cancellation_before_start() {
        let api = Arc::new(MockAnnouncementApi::new());
        let cancel = CancelToken::new();
        cancel.request();

        let fetcher = RaceFetcher::new(api, 2);
        let result = fetcher
            .fetch_announcement_id("Day1", &NullSink, &cancel)
            .await;
        assert!(matches!(result, Err(FetchError::Cancelled)));
    }

    #[tokio::test]
    async fn test_worker_count_floor_is_one() {
        let api = Arc::new(MockAnnouncementApi::new());
        api.set_list(vec![(7, "Day1")]).await;

        let fetcher = RaceFetcher::new(api, 0);
        let id = fetcher
            .fetch_announcement_id("Day1", &NullSink, &CancelToken::new())
            .await
            .unwrap();
        assert_eq!(id, Some(7));
    }
}
