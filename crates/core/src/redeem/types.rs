//! Types for the per-account redemption state machine.

use serde::{Deserialize, Serialize};

use crate::client::SubmitResponse;

/// Remote return code for a successful redemption.
pub const CODE_SUCCESS: i64 = 0;
/// Remote return code when the daily quota is gone.
pub const CODE_QUOTA_EXHAUSTED: i64 = 100001;
/// Remote return code for an expired or invalid account session.
pub const CODE_SESSION_INVALID: i64 = 101;
/// Remote return code for a wrong challenge answer.
pub const CODE_WRONG_ANSWER: i64 = 120001;

/// Message fragments the service uses for accounts that already hold the
/// entitlement. The service reuses a generic failure code for this case, so
/// the message is authoritative here.
const QUALIFIED_MARKERS: [&str; 2] = ["已有测试资格", "无需重复兑换"];

/// One independent credential context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Ordinal label, used only for logging and result correlation.
    pub id: u32,
    /// Opaque session blob (cookie string).
    pub session: String,
}

/// Classified outcome of one submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Succeeded,
    AlreadyQualified,
    QuotaExhausted,
    SessionInvalid,
    /// Wrong challenge answer; retry with a fresh challenge.
    WrongAnswer,
    /// Anything else (rate limiting, transient server errors); retry.
    Other,
}

/// Classification policy for submit responses.
///
/// Precedence: exact success code first, then the already-qualified message
/// check (which overrides any non-zero code), then the remaining codes.
/// The substring matching is fragile against wording changes, which is why
/// it lives in exactly one place.
pub fn classify_submit_response(response: &SubmitResponse) -> SubmitOutcome {
    if response.code == CODE_SUCCESS {
        return SubmitOutcome::Succeeded;
    }
    if QUALIFIED_MARKERS
        .iter()
        .any(|marker| response.message.contains(marker))
    {
        return SubmitOutcome::AlreadyQualified;
    }
    match response.code {
        CODE_QUOTA_EXHAUSTED => SubmitOutcome::QuotaExhausted,
        CODE_SESSION_INVALID => SubmitOutcome::SessionInvalid,
        CODE_WRONG_ANSWER => SubmitOutcome::WrongAnswer,
        _ => SubmitOutcome::Other,
    }
}

/// Terminal state of one account's redemption loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedeemStatus {
    Succeeded,
    AlreadyQualified,
    QuotaExhausted,
    SessionInvalid,
    Cancelled,
    /// The account's task died without producing a result. Only the pool
    /// reports this; the state machine itself never does.
    Failed,
}

impl RedeemStatus {
    /// Both real success and an already-held entitlement count as success
    /// for aggregation.
    pub fn is_success(self) -> bool {
        matches!(self, RedeemStatus::Succeeded | RedeemStatus::AlreadyQualified)
    }
}

/// Terminal result of one account, produced exactly once per pool run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedeemResult {
    pub account_id: u32,
    pub status: RedeemStatus,
    pub message: String,
    /// Raw response of the terminal submission, when one was made.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<SubmitResponse>,
}

impl RedeemResult {
    pub fn success(&self) -> bool {
        self.status.is_success()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_success() {
        let response = SubmitResponse::new(0, "兑换成功");
        assert_eq!(classify_submit_response(&response), SubmitOutcome::Succeeded);
    }

    #[test]
    fn test_classify_wrong_answer() {
        let response = SubmitResponse::new(120001, "验证码错误");
        assert_eq!(
            classify_submit_response(&response),
            SubmitOutcome::WrongAnswer
        );
    }

    #[test]
    fn test_classify_quota_exhausted() {
        let response = SubmitResponse::new(100001, "已抢完");
        assert_eq!(
            classify_submit_response(&response),
            SubmitOutcome::QuotaExhausted
        );
    }

    #[test]
    fn test_classify_session_invalid() {
        let response = SubmitResponse::new(101, "请先登录");
        assert_eq!(
            classify_submit_response(&response),
            SubmitOutcome::SessionInvalid
        );
    }

    #[test]
    fn test_qualified_message_beats_nonzero_code() {
        // The service returns a generic failure code for this case; the
        // message decides.
        let response = SubmitResponse::new(1, "已有测试资格，无需重复兑换");
        assert_eq!(
            classify_submit_response(&response),
            SubmitOutcome::AlreadyQualified
        );
    }

    #[test]
    fn test_qualified_message_beats_known_failure_codes() {
        let response = SubmitResponse::new(100001, "已有测试资格");
        assert_eq!(
            classify_submit_response(&response),
            SubmitOutcome::AlreadyQualified
        );
    }

    #[test]
    fn test_unknown_code_is_retryable() {
        let response = SubmitResponse::new(7777, "系统繁忙");
        assert_eq!(classify_submit_response(&response), SubmitOutcome::Other);
    }

    #[test]
    fn test_status_success_mapping() {
        assert!(RedeemStatus::Succeeded.is_success());
        assert!(RedeemStatus::AlreadyQualified.is_success());
        assert!(!RedeemStatus::QuotaExhausted.is_success());
        assert!(!RedeemStatus::SessionInvalid.is_success());
        assert!(!RedeemStatus::Cancelled.is_success());
        assert!(!RedeemStatus::Failed.is_success());
    }
}
