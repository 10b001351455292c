//! Remote campaign API abstraction.
//!
//! The core consumes the [`AnnouncementApi`] and [`RedeemApi`] traits; the
//! reqwest-backed clients here are the production implementations.

mod fingerprint;
mod http;
mod traits;
mod types;

pub use fingerprint::DeviceFingerprint;
pub use http::{ApiEndpoints, HttpAnnouncementClient, HttpRedeemClient};
pub use traits::{AnnouncementApi, RedeemApi};
pub use types::*;
