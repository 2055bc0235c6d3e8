//! # Generated Request Executor
//!
//! Sends one generated variant and tells the producing rule whether to keep
//! going. Shared state (host failures, rate limit, progress) is updated here.

use std::sync::Arc;

use fuzzr_common::error::TransportError;
use fuzzr_common::event::WrappedEvent;
use fuzzr_common::target::FuzzTarget;
use tracing::debug;

use crate::fuzzing::{FuzzingRequest, OutputCallback};
use crate::ports::{Dispatch, RequestData};
use crate::rule::GeneratedRequest;

/// Answer to the producing rule after each variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop(StopReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// A variant matched and stop-at-first-match is enabled.
    Matched,
    /// The request references variables nothing provides.
    MissingVars,
    /// The host-failure cache gave up on the target's host.
    HostUnresponsive,
}

impl FuzzingRequest {
    /// Dispatches `generated` and decides whether the rule may continue.
    ///
    /// A failed dispatch is recorded against the host and does not stop the
    /// rule: one transient failure must not cancel the remaining payloads.
    pub async fn execute_generated_request(
        &self,
        generated: GeneratedRequest,
        target: &FuzzTarget,
        callback: &OutputCallback<'_>,
    ) -> Flow {
        let has_interact_matchers = match &self.services.interactions {
            Some(interactions) => interactions.has_matchers(&self.operators),
            None => self.operators.has_interaction_matchers(),
        };
        let has_interact_markers = !generated.interact_urls.is_empty();

        if let Some(cache) = &self.services.host_errors
            && cache.check(target.host_key())
        {
            return Flow::Stop(StopReason::HostUnresponsive);
        }

        self.services.rate_limiter.take().await;

        let dispatch = Dispatch {
            request: generated.request,
            dynamic_values: generated.dynamic_values,
            interact_urls: generated.interact_urls,
            needs_interaction: has_interact_matchers,
        };

        let mut got_matches = false;
        let flow = match self.services.transport.send(&dispatch, target).await {
            Ok(event) => {
                let correlate = has_interact_markers && has_interact_matchers;
                got_matches = self.handle_event(event, &dispatch.interact_urls, correlate, callback);
                Flow::Continue
            }
            Err(TransportError::MissingVars(missing)) => {
                debug!(template = %self.template_id, "skipping further requests: {missing}");
                Flow::Stop(StopReason::MissingVars)
            }
            Err(TransportError::Failed(err)) => {
                if let Some(cache) = &self.services.host_errors {
                    cache.mark_failed(target.host_key(), &err);
                }
                debug!(template = %self.template_id, "Error occurred in request: {err:#}");
                Flow::Continue
            }
        };

        self.services.progress.increment_requests();

        let stop_at_first_match = self.config.stop_at_first_match || self.stop_at_first_match;
        if flow == Flow::Continue && stop_at_first_match && got_matches {
            return Flow::Stop(StopReason::Matched);
        }
        flow
    }

    /// Delivers `event` to the caller, or defers it to out-of-band
    /// correlation when its match depends on interactions. Returns whether
    /// the event counts as a match.
    fn handle_event(
        &self,
        mut event: WrappedEvent,
        interact_urls: &[String],
        correlate: bool,
        callback: &OutputCallback<'_>,
    ) -> bool {
        let operator_match = event.operators_result.as_ref().map(|r| r.matched);

        let correlator = self.services.interactions.as_ref().filter(|_| correlate);
        let already_matched = match correlator {
            Some(interactions) => {
                let data = Arc::new(RequestData {
                    template_id: self.template_id.clone(),
                    event,
                    operators: Arc::clone(&self.operators),
                    evaluator: Arc::clone(&self.services.evaluator),
                });
                interactions.request_event(interact_urls, Arc::clone(&data));
                interactions.already_matched(&data)
            }
            None => {
                if event.results.is_empty() {
                    event.results = self.services.evaluator.make_results(&self.template_id, &event);
                }
                callback(event);
                false
            }
        };

        // The event's own operator result has the final word.
        operator_match.unwrap_or(already_matched)
    }
}
