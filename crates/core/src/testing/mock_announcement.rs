//! Mock announcement board for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::client::{
    AnnouncementApi, AnnouncementDetail, AnnouncementItem, AnnouncementList, ClientError,
};

/// Mock implementation of the AnnouncementApi trait.
///
/// Provides controllable behavior for testing:
/// - Publish an announcement list (or leave it unpublished so fetches fail)
/// - Map thread ids to detail bodies, replaceable mid-test
/// - Simulate session loss and slow responses
/// - Count list fetches for race assertions
///
/// # Example
///
/// ```rust,ignore
/// use snapcode_core::testing::MockAnnouncementApi;
///
/// let api = MockAnnouncementApi::new();
/// api.set_list(vec![(11, "Event Day1")]).await;
/// api.set_detail(11, "<p>body</p>").await;
///
/// let list = api.fetch_list().await?;
/// assert_eq!(list.find_by_keyword("Day1").map(|i| i.id), Some(11));
/// ```
pub struct MockAnnouncementApi {
    /// Published list. `None` means the board is unreachable and every
    /// fetch fails with a transient error.
    list: Arc<RwLock<Option<Vec<AnnouncementItem>>>>,
    /// Detail bodies by thread id.
    details: Arc<RwLock<HashMap<u64, String>>>,
    /// Persistent session failure message, once set.
    session_invalid: Arc<RwLock<Option<String>>>,
    /// Artificial latency applied to every list fetch.
    list_delay: Arc<RwLock<Option<Duration>>>,
    /// Number of list fetches performed.
    list_fetches: Arc<RwLock<usize>>,
}

impl std::fmt::Debug for MockAnnouncementApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockAnnouncementApi")
            .field("list", &"<list>")
            .field("details", &"<details>")
            .finish()
    }
}

impl Default for MockAnnouncementApi {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAnnouncementApi {
    /// Create a new mock board with nothing published yet.
    pub fn new() -> Self {
        Self {
            list: Arc::new(RwLock::new(None)),
            details: Arc::new(RwLock::new(HashMap::new())),
            session_invalid: Arc::new(RwLock::new(None)),
            list_delay: Arc::new(RwLock::new(None)),
            list_fetches: Arc::new(RwLock::new(0)),
        }
    }

    /// Publish the announcement list as (id, title) pairs.
    pub async fn set_list(&self, items: Vec<(u64, &str)>) {
        let items = items
            .into_iter()
            .map(|(id, title)| AnnouncementItem {
                id,
                title: title.to_string(),
            })
            .collect();
        *self.list.write().await = Some(items);
    }

    /// Take the list down again so subsequent fetches fail.
    pub async fn clear_list(&self) {
        *self.list.write().await = None;
    }

    /// Set the detail body for one thread.
    pub async fn set_detail(&self, thread_id: u64, text: &str) {
        self.details
            .write()
            .await
            .insert(thread_id, text.to_string());
    }

    /// Make every subsequent call fail with a session error.
    pub async fn set_session_invalid(&self, message: &str) {
        *self.session_invalid.write().await = Some(message.to_string());
    }

    /// Add artificial latency to list fetches.
    pub async fn set_list_delay(&self, delay: Duration) {
        *self.list_delay.write().await = Some(delay);
    }

    /// Number of list fetches performed so far.
    pub async fn list_fetch_count(&self) -> usize {
        *self.list_fetches.read().await
    }
}

#[async_trait]
impl AnnouncementApi for MockAnnouncementApi {
    async fn fetch_list(&self) -> Result<AnnouncementList, ClientError> {
        if let Some(delay) = *self.list_delay.read().await {
            tokio::time::sleep(delay).await;
        }
        *self.list_fetches.write().await += 1;

        if let Some(message) = self.session_invalid.read().await.clone() {
            return Err(ClientError::SessionInvalid(message));
        }

        match self.list.read().await.clone() {
            Some(items) => Ok(AnnouncementList { items }),
            None => Err(ClientError::Api("announcement list unavailable".to_string())),
        }
    }

    async fn fetch_detail(&self, thread_id: u64) -> Result<AnnouncementDetail, ClientError> {
        if let Some(message) = self.session_invalid.read().await.clone() {
            return Err(ClientError::SessionInvalid(message));
        }

        match self.details.read().await.get(&thread_id) {
            Some(text) => Ok(AnnouncementDetail { text: text.clone() }),
            None => Err(ClientError::Api(format!(
                "no detail for thread {}",
                thread_id
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unpublished_list_fails_transiently() {
        let api = MockAnnouncementApi::new();
        let err = api.fetch_list().await.unwrap_err();
        assert!(matches!(err, ClientError::Api(_)));
        assert_eq!(api.list_fetch_count().await, 1);
    }

    #[tokio::test]
    async fn test_published_list_round_trips() {
        let api = MockAnnouncementApi::new();
        api.set_list(vec![(11, "Event Day1")]).await;
        api.set_detail(11, "<p>body</p>").await;

        let list = api.fetch_list().await.unwrap();
        assert_eq!(list.find_by_keyword("Day1").map(|i| i.id), Some(11));

        let detail = api.fetch_detail(11).await.unwrap();
        assert_eq!(detail.text, "<p>body</p>");
    }

    #[tokio::test]
    async fn test_session_invalid_overrides_list() {
        let api = MockAnnouncementApi::new();
        api.set_list(vec![(1, "Day1")]).await;
        api.set_session_invalid("expired").await;

        let err = api.fetch_list().await.unwrap_err();
        assert!(err.is_session_invalid());
    }
}
