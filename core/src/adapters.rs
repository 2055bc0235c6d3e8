//! # Adapters
//!
//! In-process implementations of the [`crate::ports`] a scan shares across
//! target pipelines. Transports and correlators live outside this crate.

pub mod evaluator;
pub mod host_errors;
pub mod progress;
pub mod rate_limit;

pub use evaluator::BasicEvaluator;
pub use host_errors::HostErrorCache;
pub use progress::RequestCounter;
pub use rate_limit::{TokenBucket, Unlimited, rate_limiter};
