//! End-to-end pipeline integration tests.
//!
//! These tests drive the whole discover -> detail -> extract -> redeem flow
//! against mock services:
//! - Full run with multiple accounts and a published code
//! - Precondition failures before anything is spawned
//! - Codes published after the announcement goes up
//! - Session loss during discovery and user cancellation

use std::sync::Arc;
use std::time::Duration;

use snapcode_core::captcha::ChallengeSolver;
use snapcode_core::testing::{fixtures, MockAnnouncementApi, MockRedeemApi, MockSolver};
use snapcode_core::{
    AccountPool, AccountRedeemer, CancelToken, NullSink, Pipeline, PipelineConfig, PipelineError,
};

fn test_config(keyword: &str) -> PipelineConfig {
    PipelineConfig {
        keyword: keyword.to_string(),
        worker_count: 2,
        poll_interval_ms: 10,
    }
}

fn pool_of(apis: &[Arc<MockRedeemApi>]) -> AccountPool {
    let redeemers = apis
        .iter()
        .enumerate()
        .map(|(i, api)| {
            AccountRedeemer::new(
                i as u32 + 1,
                Arc::clone(api) as _,
                Arc::new(MockSolver::echo()) as Arc<dyn ChallengeSolver>,
            )
        })
        .collect();
    AccountPool::new(redeemers)
}

#[tokio::test]
async fn test_full_run_redeems_every_account() {
    let announcements = Arc::new(MockAnnouncementApi::new());
    announcements
        .set_list(vec![(10, "Event Day0"), (11, "Event Day1")])
        .await;
    announcements
        .set_detail(11, &fixtures::announcement_html("GIFT2025"))
        .await;

    let apis: Vec<_> = (0..2).map(|_| Arc::new(MockRedeemApi::new())).collect();
    for api in &apis {
        api.set_default_response(fixtures::submit_success()).await;
    }

    let pipeline = Pipeline::new(test_config("Day1"), Arc::clone(&announcements) as _, pool_of(&apis));
    let result = pipeline
        .run(Arc::new(NullSink), &CancelToken::new())
        .await
        .unwrap();

    assert!(result.success);
    assert!(!result.cancelled);
    assert_eq!(result.succeeded, 2);
    assert_eq!(result.total, 2);

    // Every account submitted the extracted code.
    for api in &apis {
        let submissions = api.submissions().await;
        assert_eq!(submissions.len(), 1);
        assert_eq!(submissions[0].password, "GIFT2025");
    }
}

#[tokio::test]
async fn test_missing_keyword_fails_fast() {
    let announcements = Arc::new(MockAnnouncementApi::new());
    let apis = vec![Arc::new(MockRedeemApi::new())];

    let pipeline = Pipeline::new(test_config(""), announcements, pool_of(&apis));
    let result = pipeline.run(Arc::new(NullSink), &CancelToken::new()).await;

    assert!(matches!(result, Err(PipelineError::MissingKeyword)));
}

#[tokio::test]
async fn test_no_accounts_fails_fast() {
    let announcements = Arc::new(MockAnnouncementApi::new());

    let pipeline = Pipeline::new(test_config("Day1"), announcements, AccountPool::new(Vec::new()));
    let result = pipeline.run(Arc::new(NullSink), &CancelToken::new()).await;

    assert!(matches!(result, Err(PipelineError::NoAccounts)));
}

#[tokio::test]
async fn test_code_published_after_announcement() {
    let announcements = Arc::new(MockAnnouncementApi::new());
    announcements.set_list(vec![(11, "Event Day1")]).await;
    announcements
        .set_detail(11, &fixtures::announcement_html_without_code())
        .await;

    // The editor pastes the code into the body a moment later.
    {
        let announcements = Arc::clone(&announcements);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(60)).await;
            announcements
                .set_detail(11, &fixtures::announcement_html("LATE7777"))
                .await;
        });
    }

    let apis = vec![Arc::new(MockRedeemApi::new())];
    apis[0].set_default_response(fixtures::submit_success()).await;

    let pipeline = Pipeline::new(test_config("Day1"), Arc::clone(&announcements) as _, pool_of(&apis));
    let result = pipeline
        .run(Arc::new(NullSink), &CancelToken::new())
        .await
        .unwrap();

    assert!(result.success);
    assert_eq!(apis[0].submissions().await[0].password, "LATE7777");
}

#[tokio::test]
async fn test_discovery_session_loss_aborts_run() {
    let announcements = Arc::new(MockAnnouncementApi::new());
    announcements.set_session_invalid("credential expired").await;

    let apis = vec![Arc::new(MockRedeemApi::new())];
    let pipeline = Pipeline::new(test_config("Day1"), announcements, pool_of(&apis));
    let result = pipeline
        .run(Arc::new(NullSink), &CancelToken::new())
        .await
        .unwrap();

    assert!(!result.success);
    assert!(!result.cancelled);
    assert!(result.message.contains("session invalid"));
    assert!(apis[0].submissions().await.is_empty());
}

#[tokio::test]
async fn test_cancellation_during_discovery() {
    // The board never publishes, so discovery polls until cancelled.
    let announcements = Arc::new(MockAnnouncementApi::new());
    let apis = vec![Arc::new(MockRedeemApi::new())];
    let cancel = CancelToken::new();

    let run = {
        let cancel = cancel.clone();
        let pipeline = Pipeline::new(test_config("Day1"), announcements, pool_of(&apis));
        tokio::spawn(async move { pipeline.run(Arc::new(NullSink), &cancel).await })
    };

    tokio::time::sleep(Duration::from_millis(50)).await;
    cancel.request();

    let result = tokio::time::timeout(Duration::from_secs(2), run)
        .await
        .expect("pipeline did not observe cancellation")
        .unwrap()
        .unwrap();

    assert!(!result.success);
    assert!(result.cancelled);
}
