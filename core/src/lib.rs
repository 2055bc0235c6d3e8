//! # Fuzzr Core
//!
//! Fuzzing rule execution engine. Given a target and the fuzzing rules of a
//! template, it decides whether the target is fuzzed, expands each rule into
//! request variants, dispatches them and enforces scan-wide policies (rate
//! limiting, stop at first match, unresponsive hosts).
//!
//! ## Layout
//! * **[`fuzzing`]**: rule application for one target (the entry point).
//! * **[`executor`]**: dispatch of a single generated variant.
//! * **[`precondition`]**: the filters deciding whether fuzzing starts.
//! * **[`rule`]**: the producer protocol rules implement.
//! * **[`ports`]**: traits for the collaborators the engine consumes.
//! * **[`adapters`]**: in-process implementations of the shared stores.

pub mod adapters;
pub mod executor;
pub mod fuzzing;
pub mod ports;
pub mod precondition;
pub mod rule;
pub mod useragent;

pub use executor::{Flow, StopReason};
pub use fuzzing::{FuzzingRequest, OutputCallback, RuleVerdict, Services};
pub use precondition::Precondition;
pub use rule::{FuzzRule, GeneratedRequest, RuleInput, Variants};
