//! Pipeline controller: discover -> detail -> extract -> redeem.

mod config;
mod controller;
mod types;

pub use config::PipelineConfig;
pub use controller::Pipeline;
pub use types::{PipelineError, PipelineResult};
