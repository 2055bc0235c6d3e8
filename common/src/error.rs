//! # Error Taxonomy
//!
//! Every failure the engine can observe is one of a closed set of variants,
//! so each caller has to decide explicitly what a new kind of failure means.
//!
//! * [`InputError`]: the target itself is unusable (aborts before dispatch).
//! * [`RuleError`]: what a rule producer reports once it stops.
//! * [`TransportError`]: what a single dispatch reports.
//! * [`FuzzError`]: what the orchestrator reports for a whole target.

use thiserror::Error;

/// A template references variables that nothing provided a value for.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("missing required variables: {}", .0.join(", "))]
pub struct MissingVars(pub Vec<String>);

#[derive(Debug, Error)]
pub enum InputError {
    #[error("empty input provided for fuzzing")]
    Empty,
    #[error("could not parse input url `{input}`: {reason}")]
    InvalidUrl { input: String, reason: String },
    #[error("could not build request obtained from target file: {0}")]
    BuildRequest(String),
}

/// Outcome reported by a rule producer when it stops producing variants.
#[derive(Debug, Error)]
pub enum RuleError {
    /// The rule does not apply to this target. Expected, not a failure.
    #[error("rule not applicable: {0}")]
    NotApplicable(String),
    /// The input space is exhausted, or the consumer refused more variants.
    #[error("no more requests")]
    NoMoreRequests,
    #[error(transparent)]
    MissingVars(#[from] MissingVars),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Outcome of a failed dispatch.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error(transparent)]
    MissingVars(#[from] MissingVars),
    #[error(transparent)]
    Failed(#[from] anyhow::Error),
}

#[derive(Debug, Error)]
pub enum FuzzError {
    #[error(transparent)]
    Input(#[from] InputError),
    /// No declared rule applied to the target.
    #[error("no rule was applicable for this request: {0}")]
    NotApplicable(String),
    #[error(transparent)]
    MissingVars(#[from] MissingVars),
    #[error("fuzzing cancelled for {0}")]
    Cancelled(String),
    #[error("could not execute rule `{rule}`: {source}")]
    Rule {
        rule: String,
        #[source]
        source: anyhow::Error,
    },
}
