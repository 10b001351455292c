pub mod announce;
pub mod cancel;
pub mod captcha;
pub mod client;
pub mod config;
pub mod extractor;
pub mod pipeline;
pub mod progress;
pub mod redeem;
pub mod schedule;
pub mod testing;

pub use cancel::CancelToken;
pub use captcha::{normalize_answer, CallbackSolver, ChallengeSolver};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, SolverMode,
};
pub use extractor::PasswordExtractor;
pub use pipeline::{Pipeline, PipelineConfig, PipelineError, PipelineResult};
pub use progress::{NullSink, ProgressSink, TracingSink};
pub use redeem::{Account, AccountPool, AccountRedeemer, RedeemResult, RedeemStatus};
