//! Challenge (captcha) solving seam.
//!
//! The core does not know how a challenge gets solved; it only needs an
//! answer or a "no usable answer" signal. A solver is allowed to block for
//! a long time (a human typing into a modal is a valid implementation), so
//! blocking callbacks are pushed onto the blocking thread pool.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

/// Challenge answers are at least 4 alphanumeric characters; anything
/// shorter is a misread and gets discarded.
const MIN_ANSWER_LEN: usize = 4;

/// Trim and validate a raw answer. `None` means the challenge must be
/// discarded and a fresh one fetched.
pub fn normalize_answer(raw: &str) -> Option<String> {
    let answer = raw.trim();
    if answer.chars().count() >= MIN_ANSWER_LEN {
        Some(answer.to_string())
    } else {
        None
    }
}

/// Produces an answer for a challenge image.
#[async_trait]
pub trait ChallengeSolver: Send + Sync {
    /// Solve one challenge. `None` when no usable answer could be produced;
    /// the caller then discards the challenge and fetches a new one.
    async fn solve(&self, image: &[u8]) -> Option<String>;
}

type SolveCallback = dyn Fn(Vec<u8>) -> Option<String> + Send + Sync;

/// Solver backed by a blocking callback (human-in-the-loop prompt, external
/// OCR binary, ...). The callback runs on the blocking pool so a modal
/// prompt cannot stall the async runtime.
pub struct CallbackSolver {
    callback: Arc<SolveCallback>,
}

impl CallbackSolver {
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(Vec<u8>) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            callback: Arc::new(callback),
        }
    }
}

#[async_trait]
impl ChallengeSolver for CallbackSolver {
    async fn solve(&self, image: &[u8]) -> Option<String> {
        let callback = Arc::clone(&self.callback);
        let image = image.to_vec();

        let answer = match tokio::task::spawn_blocking(move || callback(image)).await {
            Ok(answer) => answer?,
            Err(e) => {
                warn!("challenge callback panicked or was aborted: {}", e);
                return None;
            }
        };

        normalize_answer(&answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_answer_trims_and_validates() {
        assert_eq!(normalize_answer(" aB3d \n"), Some("aB3d".to_string()));
        assert_eq!(normalize_answer("abc"), None);
        assert_eq!(normalize_answer("   "), None);
    }

    #[tokio::test]
    async fn test_callback_solver_returns_answer() {
        let solver = CallbackSolver::new(|image| {
            assert_eq!(image, b"png-bytes");
            Some("WXYZ".to_string())
        });
        assert_eq!(solver.solve(b"png-bytes").await, Some("WXYZ".to_string()));
    }

    #[tokio::test]
    async fn test_callback_solver_rejects_short_answer() {
        let solver = CallbackSolver::new(|_| Some("no".to_string()));
        assert_eq!(solver.solve(b"img").await, None);
    }

    #[tokio::test]
    async fn test_callback_solver_propagates_none() {
        let solver = CallbackSolver::new(|_| None);
        assert_eq!(solver.solve(b"img").await, None);
    }
}
