//! Mock challenge solver for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::captcha::ChallengeSolver;

enum SolveMode {
    /// Answer with the challenge payload itself.
    Echo,
    /// Always answer with a fixed string.
    Fixed(String),
    /// Never produce an answer.
    Unsolvable,
}

/// Mock implementation of the ChallengeSolver trait.
///
/// The echo mode answers with the challenge bytes themselves, which makes
/// challenge reuse visible in recorded submissions. Counts solve calls for
/// assertions.
pub struct MockSolver {
    mode: SolveMode,
    solves: Arc<RwLock<usize>>,
}

impl std::fmt::Debug for MockSolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockSolver").finish()
    }
}

impl MockSolver {
    /// Solver that answers with the challenge payload as text.
    pub fn echo() -> Self {
        Self {
            mode: SolveMode::Echo,
            solves: Arc::new(RwLock::new(0)),
        }
    }

    /// Solver that always answers with `answer`.
    pub fn fixed(answer: &str) -> Self {
        Self {
            mode: SolveMode::Fixed(answer.to_string()),
            solves: Arc::new(RwLock::new(0)),
        }
    }

    /// Solver that never produces a usable answer.
    pub fn unsolvable() -> Self {
        Self {
            mode: SolveMode::Unsolvable,
            solves: Arc::new(RwLock::new(0)),
        }
    }

    /// Number of solve calls performed so far.
    pub async fn solve_count(&self) -> usize {
        *self.solves.read().await
    }
}

#[async_trait]
impl ChallengeSolver for MockSolver {
    async fn solve(&self, image: &[u8]) -> Option<String> {
        *self.solves.write().await += 1;
        match &self.mode {
            SolveMode::Echo => Some(String::from_utf8_lossy(image).into_owned()),
            SolveMode::Fixed(answer) => Some(answer.clone()),
            SolveMode::Unsolvable => None,
        }
    }
}
