//! Types for the remote campaign API.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One entry of the campaign announcement board.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnnouncementItem {
    /// Opaque thread identifier used for detail retrieval.
    pub id: u64,
    /// Display title, matched against the configured keyword.
    pub title: String,
}

/// Payload of a successful discovery call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnnouncementList {
    pub items: Vec<AnnouncementItem>,
}

impl AnnouncementList {
    /// First item whose title contains `keyword`, if any.
    pub fn find_by_keyword(&self, keyword: &str) -> Option<&AnnouncementItem> {
        self.items.iter().find(|item| item.title.contains(keyword))
    }
}

/// Announcement detail content. Only the rich-text body is relevant; the
/// password extractor digs the code out of it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnnouncementDetail {
    pub text: String,
}

/// Raw outcome of a redemption submission.
///
/// `code` and `message` drive the retry state machine; the untouched
/// response body is kept for the final per-account report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub code: i64,
    pub message: String,
    #[serde(default)]
    pub raw: serde_json::Value,
}

impl SubmitResponse {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            raw: serde_json::Value::Null,
        }
    }
}

/// Errors surfaced by the remote API clients.
///
/// Everything except `SessionInvalid` is transient from the caller's point
/// of view; the owning loop backs off and retries.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("api error: {0}")]
    Api(String),

    #[error("session invalid: {0}")]
    SessionInvalid(String),
}

impl ClientError {
    pub fn is_session_invalid(&self) -> bool {
        matches!(self, ClientError::SessionInvalid(_))
    }
}
