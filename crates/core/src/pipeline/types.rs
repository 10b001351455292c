//! Types for the end-to-end pipeline.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::redeem::RedeemResult;

/// Configuration preconditions, checked before any concurrent work starts.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("no announcement keyword configured")]
    MissingKeyword,

    #[error("no accounts configured")]
    NoAccounts,
}

/// Aggregate outcome of one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineResult {
    /// True iff at least one account succeeded or was already qualified.
    pub success: bool,
    /// True when the run ended because cancellation was requested.
    pub cancelled: bool,
    pub message: String,
    /// Accounts that reached a success terminal.
    pub succeeded: usize,
    pub total: usize,
    /// Per-account terminal results, in account order.
    pub results: Vec<RedeemResult>,
}

impl PipelineResult {
    /// A run stopped by cancellation or a fatal pre-redemption condition.
    pub(crate) fn aborted(message: impl Into<String>, cancelled: bool) -> Self {
        Self {
            success: false,
            cancelled,
            message: message.into(),
            succeeded: 0,
            total: 0,
            results: Vec::new(),
        }
    }

    pub(crate) fn from_results(results: Vec<RedeemResult>, cancelled: bool) -> Self {
        let succeeded = results.iter().filter(|r| r.success()).count();
        let total = results.len();
        let success = succeeded > 0;
        let message = if success {
            format!("redemption finished: {}/{} accounts succeeded", succeeded, total)
        } else {
            format!("all {} accounts failed to redeem", total)
        };
        Self {
            success,
            cancelled,
            message,
            succeeded,
            total,
            results,
        }
    }
}
