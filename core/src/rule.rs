//! # Fuzzing Rules
//!
//! A rule turns a base request and a payload set into a lazy sequence of
//! request variants. The engine pulls variants one at a time and stops
//! pulling as soon as the executor asks it to, so a rule never produces more
//! than the consumer accepted.

use std::collections::BTreeMap;

use fuzzr_common::error::RuleError;
use fuzzr_common::event::InternalEvent;
use fuzzr_common::http::HttpRequest;
use fuzzr_common::target::FuzzTarget;

/// One concrete request variant produced by a rule.
#[derive(Debug, Clone)]
pub struct GeneratedRequest {
    pub request: HttpRequest,
    /// Name → value of everything substituted into the request.
    pub dynamic_values: BTreeMap<String, String>,
    /// Out-of-band interaction URLs planted in the request.
    pub interact_urls: Vec<String>,
}

impl GeneratedRequest {
    pub fn new(request: HttpRequest) -> Self {
        Self {
            request,
            dynamic_values: BTreeMap::new(),
            interact_urls: Vec::new(),
        }
    }

    pub fn with_value(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.dynamic_values.insert(name.into(), value.into());
        self
    }

    pub fn with_interact_url(mut self, url: impl Into<String>) -> Self {
        self.interact_urls.push(url.into());
        self
    }
}

pub struct RuleInput<'a> {
    pub target: &'a FuzzTarget,
    /// Values produced by earlier requests of the template.
    pub values: &'a InternalEvent,
    /// The rule's own copy of the base request.
    pub base_request: HttpRequest,
}

/// Lazy variant sequence. An `Err` item ends production with that outcome.
pub type Variants = Box<dyn Iterator<Item = Result<GeneratedRequest, RuleError>> + Send>;

/// A configured fuzzing strategy. Read-only once the template is loaded.
pub trait FuzzRule: Send + Sync {
    fn name(&self) -> &str;

    /// Checks whether the rule applies to the input and, if it does, returns
    /// its variants. Declining is reported as [`RuleError::NotApplicable`].
    fn generate(&self, input: RuleInput<'_>) -> Result<Variants, RuleError>;
}
