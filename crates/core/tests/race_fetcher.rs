//! Announcement race integration tests.
//!
//! These tests verify the redundant-worker discovery race with a mock board:
//! - A single authoritative winner under many workers
//! - Worker shutdown once the race is decided
//! - Session loss terminating the race
//! - Cooperative cancellation while the board is unreachable

use std::sync::Arc;
use std::time::Duration;

use snapcode_core::announce::{FetchError, RaceFetcher};
use snapcode_core::testing::MockAnnouncementApi;
use snapcode_core::{CancelToken, NullSink};

#[tokio::test]
async fn test_many_workers_single_winner() {
    let api = Arc::new(MockAnnouncementApi::new());
    api.set_list(vec![(10, "Event Day0"), (11, "Event Day1")])
        .await;

    let fetcher = RaceFetcher::new(Arc::clone(&api) as _, 8);
    let id = fetcher
        .fetch_announcement_id("Day1", &NullSink, &CancelToken::new())
        .await
        .unwrap();

    assert_eq!(id, Some(11));
}

#[tokio::test]
async fn test_workers_stop_after_decision() {
    let api = Arc::new(MockAnnouncementApi::new());
    api.set_list(vec![(7, "Day1")]).await;

    let fetcher = RaceFetcher::new(Arc::clone(&api) as _, 4);
    fetcher
        .fetch_announcement_id("Day1", &NullSink, &CancelToken::new())
        .await
        .unwrap();

    // No worker may keep polling the board once the race returned.
    let settled = api.list_fetch_count().await;
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(api.list_fetch_count().await, settled);
}

#[tokio::test]
async fn test_keyword_absent_is_not_an_error() {
    let api = Arc::new(MockAnnouncementApi::new());
    api.set_list(vec![(10, "Event Day0")]).await;

    let fetcher = RaceFetcher::new(api, 3);
    let id = fetcher
        .fetch_announcement_id("Day1", &NullSink, &CancelToken::new())
        .await
        .unwrap();

    assert_eq!(id, None);
}

#[tokio::test]
async fn test_session_loss_terminates_race() {
    let api = Arc::new(MockAnnouncementApi::new());
    api.set_session_invalid("credential expired").await;

    let fetcher = RaceFetcher::new(api, 4);
    let result = fetcher
        .fetch_announcement_id("Day1", &NullSink, &CancelToken::new())
        .await;

    match result {
        Err(FetchError::SessionInvalid(message)) => {
            assert!(message.contains("credential expired"));
        }
        other => panic!("expected session invalid, got {:?}", other),
    }
}

#[tokio::test]
async fn test_cancellation_while_board_unreachable() {
    // Nothing published, so workers retry forever until cancelled.
    let api = Arc::new(MockAnnouncementApi::new());
    let cancel = CancelToken::new();

    let race = {
        let api = Arc::clone(&api);
        let cancel = cancel.clone();
        tokio::spawn(async move {
            RaceFetcher::new(api, 4)
                .fetch_announcement_id("Day1", &NullSink, &cancel)
                .await
        })
    };

    tokio::time::sleep(Duration::from_millis(50)).await;
    cancel.request();

    let result = tokio::time::timeout(Duration::from_secs(2), race)
        .await
        .expect("race did not observe cancellation")
        .unwrap();
    assert!(matches!(result, Err(FetchError::Cancelled)));
}

#[tokio::test]
async fn test_late_publication_is_picked_up() {
    let api = Arc::new(MockAnnouncementApi::new());

    {
        let api = Arc::clone(&api);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(150)).await;
            api.set_list(vec![(42, "Event Day1")]).await;
        });
    }

    let fetcher = RaceFetcher::new(Arc::clone(&api) as _, 2);
    let id = fetcher
        .fetch_announcement_id("Day1", &NullSink, &CancelToken::new())
        .await
        .unwrap();

    assert_eq!(id, Some(42));
}
