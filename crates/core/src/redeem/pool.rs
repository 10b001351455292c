//! Concurrent multi-account redemption pool.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tracing::{info, warn};

use crate::cancel::CancelToken;
use crate::progress::ProgressSink;

use super::account::AccountRedeemer;
use super::types::{RedeemResult, RedeemStatus};

/// Owns one [`AccountRedeemer`] per configured account and runs them all
/// concurrently. Every account runs to its own terminal state; one
/// account's failure never cancels its siblings, because each credential
/// has its own shot at the limited quota.
pub struct AccountPool {
    redeemers: Vec<AccountRedeemer>,
}

impl AccountPool {
    pub fn new(redeemers: Vec<AccountRedeemer>) -> Self {
        Self { redeemers }
    }

    pub fn len(&self) -> usize {
        self.redeemers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.redeemers.is_empty()
    }

    /// Run every account to a terminal state and return one result per
    /// account, in construction order regardless of completion order.
    pub async fn run_all(
        &self,
        password: &str,
        poll_interval: Duration,
        progress: Arc<dyn ProgressSink>,
        cancel: &CancelToken,
    ) -> Vec<RedeemResult> {
        info!(accounts = self.redeemers.len(), "starting concurrent redemption");

        let mut handles = Vec::with_capacity(self.redeemers.len());
        for redeemer in &self.redeemers {
            let redeemer = redeemer.clone();
            let password = password.to_string();
            let progress = Arc::clone(&progress);
            let cancel = cancel.clone();

            handles.push(tokio::spawn(async move {
                redeemer
                    .run(&password, poll_interval, progress, &cancel)
                    .await
            }));
        }

        let mut results = Vec::with_capacity(handles.len());
        for (redeemer, joined) in self.redeemers.iter().zip(join_all(handles).await) {
            match joined {
                Ok(result) => results.push(result),
                Err(e) => {
                    // A panicked account task must not take the pool down;
                    // report it as a terminal failure for that account.
                    warn!(account = redeemer.account_id(), "account task failed: {}", e);
                    results.push(RedeemResult {
                        account_id: redeemer.account_id(),
                        status: RedeemStatus::Failed,
                        message: format!("account task failed: {}", e),
                        response: None,
                    });
                }
            }
        }

        info!(
            succeeded = results.iter().filter(|r| r.success()).count(),
            total = results.len(),
            "redemption pool finished"
        );
        results
    }
}
