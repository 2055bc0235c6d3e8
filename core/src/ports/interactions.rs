use std::sync::Arc;

use fuzzr_common::event::WrappedEvent;
use fuzzr_common::operators::Operators;

use super::Evaluator;

/// Everything the correlator needs to finish evaluating an event once an
/// out-of-band interaction shows up.
pub struct RequestData {
    pub template_id: String,
    pub event: WrappedEvent,
    pub operators: Arc<Operators>,
    /// Builds results and evaluates matchers once interaction data arrived.
    pub evaluator: Arc<dyn Evaluator>,
}

/// Out-of-band interaction correlation service.
pub trait Interactions: Send + Sync {
    /// Whether `operators` need interaction data to decide a match.
    fn has_matchers(&self, operators: &Operators) -> bool {
        operators.has_interaction_matchers()
    }

    /// Registers an event whose match depends on interactions with `interact_urls`.
    fn request_event(&self, interact_urls: &[String], data: Arc<RequestData>);

    /// True when interactions already seen make `data` a match.
    fn already_matched(&self, data: &RequestData) -> bool;
}
