//! Trait seams for the remote campaign service.
//!
//! The concurrency core only ever talks to these traits; production code
//! wires the reqwest-backed clients, tests wire the mocks in
//! `crate::testing`.

use async_trait::async_trait;

use super::types::{AnnouncementDetail, AnnouncementList, ClientError, SubmitResponse};

/// Read-only announcement board operations, shared by all race workers.
#[async_trait]
pub trait AnnouncementApi: Send + Sync {
    /// Fetch the current announcement list.
    ///
    /// A `SessionInvalid` error means the shared discovery credential is no
    /// longer usable and further polling is pointless.
    async fn fetch_list(&self) -> Result<AnnouncementList, ClientError>;

    /// Fetch the detail body of one announcement.
    async fn fetch_detail(&self, thread_id: u64) -> Result<AnnouncementDetail, ClientError>;
}

/// Per-account redemption operations.
///
/// Implementations own the account's session state: `fetch_captcha` must
/// refresh any server-issued challenge session so that the following
/// `submit` rides on it. A challenge is single-use; the caller fetches a
/// fresh one before every submission.
#[async_trait]
pub trait RedeemApi: Send + Sync {
    /// Fetch a fresh captcha image.
    async fn fetch_captcha(&self) -> Result<Vec<u8>, ClientError>;

    /// Submit the redemption password with the solved captcha answer.
    async fn submit(&self, password: &str, answer: &str) -> Result<SubmitResponse, ClientError>;
}
