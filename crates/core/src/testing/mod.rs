//! Testing utilities and mock implementations for E2E tests.
//!
//! This module provides mock implementations of all external service traits,
//! allowing comprehensive E2E testing without a live campaign backend.
//!
//! # Example
//!
//! ```rust,ignore
//! use snapcode_core::testing::{MockAnnouncementApi, MockRedeemApi, MockSolver, fixtures};
//!
//! let announcements = MockAnnouncementApi::new();
//! let redeem = MockRedeemApi::new();
//!
//! // Configure mock responses
//! announcements.set_list(vec![(11, "Event Day1")]).await;
//! redeem.set_default_response(fixtures::submit_success()).await;
//!
//! // Use in a Pipeline...
//! ```

mod mock_announcement;
mod mock_redeem;
mod mock_solver;

pub use mock_announcement::MockAnnouncementApi;
pub use mock_redeem::{MockRedeemApi, RecordedSubmission};
pub use mock_solver::MockSolver;

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::client::SubmitResponse;

    /// Successful redemption response.
    pub fn submit_success() -> SubmitResponse {
        SubmitResponse::new(0, "兑换成功")
    }

    /// Challenge answer rejected; the caller should retry with a fresh one.
    pub fn submit_wrong_answer() -> SubmitResponse {
        SubmitResponse::new(120001, "验证码错误，请重新输入")
    }

    /// Daily quota fully claimed.
    pub fn submit_quota_exhausted() -> SubmitResponse {
        SubmitResponse::new(100001, "今日名额已被领完")
    }

    /// Account already holds the entitlement. Non-zero code, but the
    /// message marks it as a success.
    pub fn submit_already_qualified() -> SubmitResponse {
        SubmitResponse::new(-1, "您已有测试资格，无需重复兑换")
    }

    /// Announcement body carrying `code` in the editor's styled span.
    pub fn announcement_html(code: &str) -> String {
        format!(
            r#"<p>今日资格码已发布</p><span style="color: rgb(231, 95, 51); font-size: 24px;">{}</span>"#,
            code
        )
    }

    /// Announcement body without any code in it yet.
    pub fn announcement_html_without_code() -> String {
        "<p>资格码稍后公布，请耐心等待</p>".to_string()
    }
}
