//! Race-to-first-success announcement discovery.

mod fetcher;
mod types;

pub use fetcher::RaceFetcher;
pub use types::{FetchError, RaceDecision, RaceSlot};
