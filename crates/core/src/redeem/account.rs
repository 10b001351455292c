//! Per-account redemption retry loop.
//!
//! Each iteration is one full attempt: fetch a fresh challenge, solve it,
//! submit, classify. Challenges are single-use; no path ever carries one
//! into the next iteration, so a previously-submitted (or failed-to-solve)
//! challenge can never be reused.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use crate::cancel::CancelToken;
use crate::captcha::ChallengeSolver;
use crate::client::RedeemApi;
use crate::progress::{AccountSink, ProgressSink};

use super::types::{classify_submit_response, RedeemResult, RedeemStatus, SubmitOutcome};

/// Drives one account until a terminal state.
///
/// Retryable conditions loop forever by design: the redemption window may
/// take many minutes of contention to open, so only a terminal outcome or
/// cancellation ends the loop.
#[derive(Clone)]
pub struct AccountRedeemer {
    account_id: u32,
    api: Arc<dyn RedeemApi>,
    solver: Arc<dyn ChallengeSolver>,
}

impl AccountRedeemer {
    pub fn new(account_id: u32, api: Arc<dyn RedeemApi>, solver: Arc<dyn ChallengeSolver>) -> Self {
        Self {
            account_id,
            api,
            solver,
        }
    }

    pub fn account_id(&self) -> u32 {
        self.account_id
    }

    pub async fn run(
        &self,
        password: &str,
        poll_interval: Duration,
        progress: Arc<dyn ProgressSink>,
        cancel: &CancelToken,
    ) -> RedeemResult {
        let progress = AccountSink::new(self.account_id, progress);
        let mut attempt: u64 = 0;

        loop {
            if cancel.is_requested() {
                return self.terminal(RedeemStatus::Cancelled, "cancelled", None);
            }

            attempt += 1;
            progress.report(&format!("attempt {}: fetching challenge...", attempt));

            let image = match self.api.fetch_captcha().await {
                Ok(image) => image,
                Err(e) if e.is_session_invalid() => {
                    error!(account = self.account_id, "account session invalid: {}", e);
                    progress.report("session invalid, giving up");
                    return self.terminal(
                        RedeemStatus::SessionInvalid,
                        &format!("session invalid: {}", e),
                        None,
                    );
                }
                Err(e) => {
                    warn!(
                        account = self.account_id,
                        "challenge fetch failed: {}, retrying", e
                    );
                    progress.report("challenge fetch failed, retrying...");
                    tokio::time::sleep(poll_interval).await;
                    continue;
                }
            };

            let answer = match self.solver.solve(&image).await {
                Some(answer) => answer,
                None => {
                    // Discard this challenge entirely; the session tied to
                    // it is invalid after a failed solve.
                    warn!(account = self.account_id, "no usable challenge answer");
                    progress.report("challenge unsolved, fetching a new one...");
                    tokio::time::sleep(poll_interval).await;
                    continue;
                }
            };

            progress.report(&format!("attempt {}: submitting answer {}", attempt, answer));

            let response = match self.api.submit(password, &answer).await {
                Ok(response) => response,
                Err(e) if e.is_session_invalid() => {
                    error!(account = self.account_id, "account session invalid: {}", e);
                    progress.report("session invalid, giving up");
                    return self.terminal(
                        RedeemStatus::SessionInvalid,
                        &format!("session invalid: {}", e),
                        None,
                    );
                }
                Err(e) => {
                    warn!(
                        account = self.account_id,
                        "submission failed: {}, retrying", e
                    );
                    progress.report("submission failed, retrying...");
                    tokio::time::sleep(poll_interval).await;
                    continue;
                }
            };

            match classify_submit_response(&response) {
                SubmitOutcome::Succeeded => {
                    info!(account = self.account_id, "redemption succeeded");
                    progress.report("redemption succeeded!");
                    return self.terminal(RedeemStatus::Succeeded, "redeemed", Some(response));
                }
                SubmitOutcome::AlreadyQualified => {
                    info!(account = self.account_id, "already qualified");
                    progress.report("already qualified, nothing to redeem");
                    return self.terminal(
                        RedeemStatus::AlreadyQualified,
                        "already qualified",
                        Some(response),
                    );
                }
                SubmitOutcome::QuotaExhausted => {
                    warn!(account = self.account_id, "redemption quota exhausted");
                    progress.report(&format!("quota exhausted: {}", response.message));
                    let message = format!("quota exhausted: {}", response.message);
                    return self.terminal(RedeemStatus::QuotaExhausted, &message, Some(response));
                }
                SubmitOutcome::SessionInvalid => {
                    error!(account = self.account_id, "account session invalid");
                    progress.report(&format!("session invalid: {}", response.message));
                    let message = format!("session invalid: {}", response.message);
                    return self.terminal(RedeemStatus::SessionInvalid, &message, Some(response));
                }
                SubmitOutcome::WrongAnswer => {
                    warn!(
                        account = self.account_id,
                        attempt, "wrong challenge answer, retrying"
                    );
                    progress.report("wrong challenge answer, retrying...");
                }
                SubmitOutcome::Other => {
                    warn!(
                        account = self.account_id,
                        code = response.code,
                        "submission rejected: {}, retrying",
                        response.message
                    );
                    progress.report(&format!("rejected ({}), retrying...", response.message));
                }
            }

            // The service invalidates the challenge after one submission
            // regardless of correctness, so every retry starts over.
            tokio::time::sleep(poll_interval).await;
        }
    }

    fn terminal(
        &self,
        status: RedeemStatus,
        message: &str,
        response: Option<crate::client::SubmitResponse>,
    ) -> RedeemResult {
        RedeemResult {
            account_id: self.account_id,
            status,
            message: message.to_string(),
            response,
        }
    }
}
