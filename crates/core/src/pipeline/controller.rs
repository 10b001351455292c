//! End-to-end pipeline sequencing.
//!
//! discover -> detail -> extract -> redeem, each stage an unbounded
//! poll-until-success loop that checks cancellation first. Stage failures
//! are absorbed and retried locally; only configuration errors and the
//! final aggregate cross the boundary to the caller.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::announce::{FetchError, RaceFetcher};
use crate::cancel::CancelToken;
use crate::client::AnnouncementApi;
use crate::extractor::PasswordExtractor;
use crate::progress::ProgressSink;
use crate::redeem::AccountPool;

use super::config::PipelineConfig;
use super::types::{PipelineError, PipelineResult};

/// Sequences one complete grab run.
pub struct Pipeline {
    config: PipelineConfig,
    announcements: Arc<dyn AnnouncementApi>,
    extractor: PasswordExtractor,
    pool: AccountPool,
}

impl Pipeline {
    pub fn new(
        config: PipelineConfig,
        announcements: Arc<dyn AnnouncementApi>,
        pool: AccountPool,
    ) -> Self {
        Self {
            config,
            announcements,
            extractor: PasswordExtractor::new(),
            pool,
        }
    }

    /// Run the whole flow. Blocks until every account reaches a terminal
    /// state or cancellation is requested.
    pub async fn run(
        &self,
        progress: Arc<dyn ProgressSink>,
        cancel: &CancelToken,
    ) -> Result<PipelineResult, PipelineError> {
        if self.config.keyword.is_empty() {
            return Err(PipelineError::MissingKeyword);
        }
        if self.pool.is_empty() {
            return Err(PipelineError::NoAccounts);
        }

        let poll_interval = self.config.poll_interval();
        info!(keyword = %self.config.keyword, "starting redemption pipeline");

        // Stage 1: discover the target announcement.
        let announcement_id = match self
            .discover_announcement(poll_interval, &progress, cancel)
            .await
        {
            Ok(id) => id,
            Err(result) => return Ok(*result),
        };

        // Stage 2: fetch the announcement body.
        let mut content = match self
            .fetch_detail_content(announcement_id, poll_interval, &progress, cancel)
            .await
        {
            Ok(content) => content,
            Err(result) => return Ok(*result),
        };

        // Stage 3: extract the password; the body may get edited to include
        // the code after first publication, so refresh it between attempts.
        let password = {
            let mut attempt: u64 = 0;
            loop {
                if cancel.is_requested() {
                    return Ok(PipelineResult::aborted("cancelled by user", true));
                }
                attempt += 1;
                progress.report(&format!("extracting password (attempt {})...", attempt));

                if let Some(password) = self.extractor.extract(&content) {
                    info!(%password, "password extracted");
                    progress.report(&format!("password extracted: {}", password));
                    break password;
                }

                warn!(attempt, "password not present in announcement body yet");
                progress.report("password not published yet, retrying...");
                tokio::time::sleep(poll_interval).await;

                match self.announcements.fetch_detail(announcement_id).await {
                    Ok(detail) => content = detail.text,
                    Err(e) => warn!("detail refresh failed: {}, reusing last body", e),
                }
            }
        };

        // Stage 4: fan out to every account.
        progress.report(&format!(
            "starting concurrent redemption across {} accounts",
            self.pool.len()
        ));
        let results = self
            .pool
            .run_all(&password, poll_interval, Arc::clone(&progress), cancel)
            .await;

        let aggregate = PipelineResult::from_results(results, cancel.is_requested());
        info!(
            success = aggregate.success,
            succeeded = aggregate.succeeded,
            total = aggregate.total,
            "pipeline finished"
        );
        progress.report(&aggregate.message);
        Ok(aggregate)
    }

    /// Stage 1 loop: race for the announcement list until the keyword
    /// matches. "Not found" is a warning, not a failure; the announcement
    /// may simply not have been posted yet.
    async fn discover_announcement(
        &self,
        poll_interval: Duration,
        progress: &Arc<dyn ProgressSink>,
        cancel: &CancelToken,
    ) -> Result<u64, Box<PipelineResult>> {
        let fetcher = RaceFetcher::new(Arc::clone(&self.announcements), self.config.worker_count);
        let mut poll_attempt: u64 = 0;

        loop {
            if cancel.is_requested() {
                return Err(Box::new(PipelineResult::aborted("cancelled by user", true)));
            }

            poll_attempt += 1;
            progress.report(&format!(
                "polling announcement list (attempt {})...",
                poll_attempt
            ));

            match fetcher
                .fetch_announcement_id(&self.config.keyword, progress.as_ref(), cancel)
                .await
            {
                Ok(Some(id)) => {
                    info!(id, poll_attempt, "target announcement found");
                    return Ok(id);
                }
                Ok(None) => {
                    warn!(
                        keyword = %self.config.keyword,
                        poll_attempt,
                        "target announcement not posted yet"
                    );
                    tokio::time::sleep(poll_interval).await;
                }
                Err(FetchError::SessionInvalid(message)) => {
                    return Err(Box::new(PipelineResult::aborted(
                        format!("discovery session invalid: {}", message),
                        false,
                    )));
                }
                Err(FetchError::Cancelled) => {
                    return Err(Box::new(PipelineResult::aborted("cancelled by user", true)));
                }
            }
        }
    }

    /// Stage 2 loop: poll the detail endpoint until it returns a body.
    async fn fetch_detail_content(
        &self,
        announcement_id: u64,
        poll_interval: Duration,
        progress: &Arc<dyn ProgressSink>,
        cancel: &CancelToken,
    ) -> Result<String, Box<PipelineResult>> {
        let mut attempt: u64 = 0;

        loop {
            if cancel.is_requested() {
                return Err(Box::new(PipelineResult::aborted("cancelled by user", true)));
            }

            attempt += 1;
            progress.report(&format!(
                "fetching announcement detail (attempt {}, id {})...",
                attempt, announcement_id
            ));

            match self.announcements.fetch_detail(announcement_id).await {
                Ok(detail) if !detail.text.is_empty() => {
                    info!(attempt, "announcement detail fetched");
                    return Ok(detail.text);
                }
                Ok(_) => {
                    warn!(attempt, "announcement detail empty, retrying");
                }
                Err(e) => {
                    warn!(attempt, "detail fetch failed: {}, retrying", e);
                    progress.report("detail fetch failed, retrying...");
                }
            }

            tokio::time::sleep(poll_interval).await;
        }
    }
}
