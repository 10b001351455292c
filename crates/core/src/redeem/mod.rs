//! Per-account redemption state machine and the multi-account pool.

mod account;
mod pool;
mod types;

pub use account::AccountRedeemer;
pub use pool::AccountPool;
pub use types::{
    classify_submit_response, Account, RedeemResult, RedeemStatus, SubmitOutcome, CODE_QUOTA_EXHAUSTED,
    CODE_SESSION_INVALID, CODE_SUCCESS, CODE_WRONG_ANSWER,
};
