use std::collections::BTreeMap;

use async_trait::async_trait;
use fuzzr_common::error::TransportError;
use fuzzr_common::event::WrappedEvent;
use fuzzr_common::http::HttpRequest;
use fuzzr_common::target::FuzzTarget;

/// One generated variant, ready to go on the wire.
#[derive(Debug, Clone)]
pub struct Dispatch {
    pub request: HttpRequest,
    /// Values substituted into the request, kept for extraction correlation.
    pub dynamic_values: BTreeMap<String, String>,
    pub interact_urls: Vec<String>,
    /// The template's matchers need out-of-band confirmation.
    pub needs_interaction: bool,
}

/// Performs the network call and evaluates the response into an event.
///
/// Implementations honour the target's cancellation token on their own; the
/// engine never interrupts an in-flight `send`.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(
        &self,
        dispatch: &Dispatch,
        target: &FuzzTarget,
    ) -> Result<WrappedEvent, TransportError>;
}
