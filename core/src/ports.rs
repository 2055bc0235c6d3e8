//! # Ports (Collaborator Boundaries)
//!
//! Traits for everything the fuzzing engine consumes but does not own:
//! network dispatch, out-of-band correlation, the process-wide stores and
//! the matcher engine.
//!
//! ## Rules
//! 1. All items here are `traits` (plus the plain data they exchange).
//! 2. Implementations are injected through [`crate::fuzzing::Services`],
//!    never reached through globals, so tests can substitute fakes.
//! 3. Stores shared between target pipelines must be safe under concurrent
//!    use from many tasks.

pub mod evaluator;
pub mod host_errors;
pub mod interactions;
pub mod progress;
pub mod rate_limit;
pub mod transport;

pub use evaluator::Evaluator;
pub use host_errors::HostErrorsCache;
pub use interactions::{Interactions, RequestData};
pub use progress::Progress;
pub use rate_limit::RateLimiter;
pub use transport::{Dispatch, Transport};
