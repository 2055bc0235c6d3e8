//! # Result Events
//!
//! What a dispatch produces and what ends up on the caller's output callback.

use std::collections::BTreeMap;

/// Flat key/value data produced by a request (response parts, prior values).
pub type InternalEvent = BTreeMap<String, String>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperatorResult {
    pub matched: bool,
    /// Names of the matchers that matched.
    pub matches: Vec<String>,
    pub extracts: BTreeMap<String, Vec<String>>,
}

/// A finding ready to be written out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultEvent {
    pub template_id: String,
    pub matched_at: String,
    pub matcher_name: Option<String>,
    pub extracted: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WrappedEvent {
    pub internal: InternalEvent,
    pub operators_result: Option<OperatorResult>,
    pub results: Vec<ResultEvent>,
}

impl WrappedEvent {
    pub fn new(internal: InternalEvent) -> Self {
        Self {
            internal,
            ..Self::default()
        }
    }

    pub fn with_result(mut self, result: OperatorResult) -> Self {
        self.operators_result = Some(result);
        self
    }

    /// Whether the operators matched. Events without operator results did not.
    pub fn matched(&self) -> bool {
        self.operators_result.as_ref().is_some_and(|r| r.matched)
    }
}
