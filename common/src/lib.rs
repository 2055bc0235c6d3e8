//! # Fuzzr Common
//!
//! Models shared by the fuzzing engine and its adapters.
//!
//! * **[`target`]**: what gets fuzzed (a URL or a captured request).
//! * **[`http`]**: the request draft handed to rules and transports.
//! * **[`variables`]**: the variable snapshot preconditions are matched against.
//! * **[`operators`]**: matchers and their AND/OR combination.
//! * **[`event`]**: results flowing back from the transport.
//! * **[`error`]**: the classified error taxonomy.

pub mod config;
pub mod error;
pub mod event;
pub mod http;
pub mod operators;
pub mod target;
pub mod variables;
