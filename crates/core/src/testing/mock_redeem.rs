//! Mock redemption endpoint for testing.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::client::{ClientError, RedeemApi, SubmitResponse};

/// A recorded submission for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedSubmission {
    /// The redemption password that was submitted.
    pub password: String,
    /// The challenge answer that was submitted.
    pub answer: String,
}

/// Mock implementation of the RedeemApi trait.
///
/// Provides controllable behavior for testing:
/// - Queue submission responses, with a default once the queue drains
/// - Record submissions for assertions
/// - Issue a distinct challenge payload per fetch so answer reuse is
///   detectable
/// - Simulate session loss and slow challenge delivery
///
/// # Example
///
/// ```rust,ignore
/// use snapcode_core::testing::{MockRedeemApi, fixtures};
///
/// let api = MockRedeemApi::new();
/// api.push_response(fixtures::submit_wrong_answer()).await;
/// api.set_default_response(fixtures::submit_success()).await;
///
/// // ... run the redeemer ...
///
/// let submissions = api.submissions().await;
/// assert_eq!(submissions.len(), 2);
/// ```
pub struct MockRedeemApi {
    /// Responses consumed in order before falling back to the default.
    queued: Arc<RwLock<VecDeque<SubmitResponse>>>,
    /// Response returned once the queue is empty.
    default_response: Arc<RwLock<Option<SubmitResponse>>>,
    /// Recorded submissions.
    submissions: Arc<RwLock<Vec<RecordedSubmission>>>,
    /// Challenge fetch counter, also used to make each payload unique.
    captcha_fetches: Arc<RwLock<u64>>,
    /// Artificial latency applied to every challenge fetch.
    captcha_delay: Arc<RwLock<Option<Duration>>>,
    /// Persistent session failure message, once set.
    session_invalid: Arc<RwLock<Option<String>>>,
}

impl std::fmt::Debug for MockRedeemApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockRedeemApi")
            .field("queued", &"<queued>")
            .field("submissions", &"<submissions>")
            .finish()
    }
}

impl Default for MockRedeemApi {
    fn default() -> Self {
        Self::new()
    }
}

impl MockRedeemApi {
    /// Create a new mock endpoint with no responses configured.
    pub fn new() -> Self {
        Self {
            queued: Arc::new(RwLock::new(VecDeque::new())),
            default_response: Arc::new(RwLock::new(None)),
            submissions: Arc::new(RwLock::new(Vec::new())),
            captcha_fetches: Arc::new(RwLock::new(0)),
            captcha_delay: Arc::new(RwLock::new(None)),
            session_invalid: Arc::new(RwLock::new(None)),
        }
    }

    /// Queue a response for the next submission.
    pub async fn push_response(&self, response: SubmitResponse) {
        self.queued.write().await.push_back(response);
    }

    /// Set the response returned once the queue is empty.
    pub async fn set_default_response(&self, response: SubmitResponse) {
        *self.default_response.write().await = Some(response);
    }

    /// Make every subsequent call fail with a session error.
    pub async fn set_session_invalid(&self, message: &str) {
        *self.session_invalid.write().await = Some(message.to_string());
    }

    /// Add artificial latency to challenge fetches.
    pub async fn set_captcha_delay(&self, delay: Duration) {
        *self.captcha_delay.write().await = Some(delay);
    }

    /// Get recorded submissions.
    pub async fn submissions(&self) -> Vec<RecordedSubmission> {
        self.submissions.read().await.clone()
    }

    /// Number of challenge fetches performed so far.
    pub async fn captcha_fetch_count(&self) -> u64 {
        *self.captcha_fetches.read().await
    }
}

#[async_trait]
impl RedeemApi for MockRedeemApi {
    async fn fetch_captcha(&self) -> Result<Vec<u8>, ClientError> {
        if let Some(delay) = *self.captcha_delay.read().await {
            tokio::time::sleep(delay).await;
        }

        if let Some(message) = self.session_invalid.read().await.clone() {
            return Err(ClientError::SessionInvalid(message));
        }

        // Unique payload per fetch; an echo solver then produces a distinct
        // answer for every challenge, so reuse shows up in assertions.
        let mut counter = self.captcha_fetches.write().await;
        *counter += 1;
        Ok(format!("captcha-{}", *counter).into_bytes())
    }

    async fn submit(&self, password: &str, answer: &str) -> Result<SubmitResponse, ClientError> {
        if let Some(message) = self.session_invalid.read().await.clone() {
            return Err(ClientError::SessionInvalid(message));
        }

        self.submissions.write().await.push(RecordedSubmission {
            password: password.to_string(),
            answer: answer.to_string(),
        });

        if let Some(response) = self.queued.write().await.pop_front() {
            return Ok(response);
        }
        match self.default_response.read().await.clone() {
            Some(response) => Ok(response),
            None => Err(ClientError::Api("no response configured".to_string())),
        }
    }
}
