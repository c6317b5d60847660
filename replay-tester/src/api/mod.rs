//! Checks against the VIP member backend: login, category create and
//! update with an image upload, announcement delete. Every request is timed
//! into the slow/fast latency ledgers.

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod flows;
pub mod ledger;

pub use config::{ApiConfig, DEFAULT_API_BASE_URL};
pub use flows::{ApiChecks, ApiFlow};
