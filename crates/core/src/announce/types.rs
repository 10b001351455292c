//! Types for the redundant announcement fetch race.

use thiserror::Error;

use crate::client::AnnouncementList;

/// Terminal failure of a race.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The shared discovery credential is no longer usable; the whole race
    /// is pointless and was stopped.
    #[error("discovery session invalid: {0}")]
    SessionInvalid(String),

    /// The caller cancelled before any worker won.
    #[error("race cancelled")]
    Cancelled,
}

/// The single authoritative decision of a race.
///
/// Exactly one worker writes it, guarded by the decided flag in
/// [`RaceSlot`]; everyone else discards their result.
#[derive(Debug)]
pub enum RaceDecision {
    Won(AnnouncementList),
    SessionInvalid(String),
}

/// Mutex-protected win/error slot shared by all race workers.
#[derive(Debug, Default)]
pub struct RaceSlot {
    decided: bool,
    decision: Option<RaceDecision>,
}

impl RaceSlot {
    /// Claim the decision. Returns false if somebody already decided; the
    /// caller must then discard its own result and stop.
    pub fn try_decide(&mut self, decision: RaceDecision) -> bool {
        if self.decided {
            return false;
        }
        self.decided = true;
        self.decision = Some(decision);
        true
    }

    pub fn is_decided(&self) -> bool {
        self.decided
    }

    pub fn take(&mut self) -> Option<RaceDecision> {
        self.decision.take()
    }
}
