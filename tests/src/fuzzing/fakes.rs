//! Scripted collaborators for driving the engine without a network.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use fuzzr_common::error::{MissingVars, RuleError, TransportError};
use fuzzr_common::event::{InternalEvent, OperatorResult, WrappedEvent};
use fuzzr_common::http::HttpRequest;
use fuzzr_common::target::FuzzTarget;
use fuzzr_core::ports::{
    Dispatch, HostErrorsCache, Interactions, RateLimiter, RequestData, Transport,
};
use fuzzr_core::{FuzzRule, GeneratedRequest, RuleInput, Variants};

type Reply = dyn Fn(&Dispatch) -> Result<WrappedEvent, TransportError> + Send + Sync;

/// Records every dispatch and answers with a scripted reply.
pub struct RecordingTransport {
    sent: Mutex<Vec<Dispatch>>,
    reply: Box<Reply>,
}

impl RecordingTransport {
    pub fn replying<F>(reply: F) -> Arc<Self>
    where
        F: Fn(&Dispatch) -> Result<WrappedEvent, TransportError> + Send + Sync + 'static,
    {
        Arc::new(Self {
            sent: Mutex::new(Vec::new()),
            reply: Box::new(reply),
        })
    }

    /// Every response matches the template operators.
    pub fn matching() -> Arc<Self> {
        Self::replying(|dispatch| Ok(event_for(dispatch, Some(true))))
    }

    /// Responses carry no operator result.
    pub fn silent() -> Arc<Self> {
        Self::replying(|dispatch| Ok(event_for(dispatch, None)))
    }

    pub fn failing(message: &'static str) -> Arc<Self> {
        Self::replying(move |_| Err(TransportError::Failed(anyhow::anyhow!(message))))
    }

    pub fn sent(&self) -> Vec<Dispatch> {
        self.sent.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(
        &self,
        dispatch: &Dispatch,
        _target: &FuzzTarget,
    ) -> Result<WrappedEvent, TransportError> {
        self.sent.lock().unwrap().push(dispatch.clone());
        (self.reply)(dispatch)
    }
}

pub fn event_for(dispatch: &Dispatch, matched: Option<bool>) -> WrappedEvent {
    let mut internal = InternalEvent::new();
    internal.insert("url".into(), dispatch.request.url.to_string());
    let event = WrappedEvent::new(internal);
    match matched {
        Some(matched) => event.with_result(OperatorResult {
            matched,
            matches: if matched { vec!["sqli-error".into()] } else { Vec::new() },
            ..OperatorResult::default()
        }),
        None => event,
    }
}

pub enum Outcome {
    Payloads(Vec<&'static str>),
    NotApplicable,
    NoMoreRequests,
    MissingVars,
    /// Yields the payloads, then fails.
    FailAfter(Vec<&'static str>),
}

/// Rule with a scripted outcome that remembers the base requests it got.
pub struct ScriptedRule {
    name: &'static str,
    outcome: Outcome,
    interact_url: Option<&'static str>,
    tag: Option<&'static str>,
    seen: Mutex<Vec<HttpRequest>>,
}

impl ScriptedRule {
    pub fn new(name: &'static str, outcome: Outcome) -> Self {
        Self {
            name,
            outcome,
            interact_url: None,
            tag: None,
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn payloads(name: &'static str, payloads: &[&'static str]) -> Self {
        Self::new(name, Outcome::Payloads(payloads.to_vec()))
    }

    /// Plants an out-of-band URL in every variant.
    pub fn planting(mut self, interact_url: &'static str) -> Self {
        self.interact_url = Some(interact_url);
        self
    }

    /// Marks its copy of the base request with an `X-Rule` header.
    pub fn tagging(mut self, tag: &'static str) -> Self {
        self.tag = Some(tag);
        self
    }

    pub fn seen(&self) -> Vec<HttpRequest> {
        self.seen.lock().unwrap().clone()
    }

    fn variants(&self, base: HttpRequest, payloads: Vec<&'static str>) -> Variants {
        let interact_url = self.interact_url;
        Box::new(payloads.into_iter().map(move |payload| {
            let mut request = base.clone();
            if request.body.is_some() {
                request.body = Some(format!("id={payload}"));
            } else {
                request.url.set_query(Some(&format!("id={payload}")));
            }
            let mut generated = GeneratedRequest::new(request).with_value("id", payload);
            if let Some(url) = interact_url {
                generated = generated.with_interact_url(url);
            }
            Ok::<_, RuleError>(generated)
        }))
    }
}

impl FuzzRule for ScriptedRule {
    fn name(&self) -> &str {
        self.name
    }

    fn generate(&self, input: RuleInput<'_>) -> Result<Variants, RuleError> {
        let mut base = input.base_request;
        self.seen.lock().unwrap().push(base.clone());
        if let Some(tag) = self.tag {
            base.headers.set("X-Rule", tag);
        }

        match &self.outcome {
            Outcome::Payloads(payloads) => Ok(self.variants(base, payloads.clone())),
            Outcome::NotApplicable => Err(RuleError::NotApplicable("no parameters".into())),
            Outcome::NoMoreRequests => Err(RuleError::NoMoreRequests),
            Outcome::MissingVars => Err(MissingVars(vec!["csrf_token".into()]).into()),
            Outcome::FailAfter(payloads) => {
                let failure = std::iter::once(Err(RuleError::Other(anyhow::anyhow!(
                    "payload list truncated"
                ))));
                Ok(Box::new(self.variants(base, payloads.clone()).chain(failure)))
            }
        }
    }
}

/// Reports every host as unresponsive.
#[derive(Default)]
pub struct DeadHosts {
    pub marked: AtomicUsize,
}

impl HostErrorsCache for DeadHosts {
    fn check(&self, _host: &str) -> bool {
        true
    }

    fn mark_failed(&self, _host: &str, _err: &anyhow::Error) {
        self.marked.fetch_add(1, Ordering::Relaxed);
    }
}

/// Correlator that parks events and reports a fixed match state.
#[derive(Default)]
pub struct ParkingInteractions {
    pub parked: Mutex<Vec<(Vec<String>, String)>>,
    pub matched: bool,
}

impl Interactions for ParkingInteractions {
    fn request_event(&self, interact_urls: &[String], data: Arc<RequestData>) {
        self.parked
            .lock()
            .unwrap()
            .push((interact_urls.to_vec(), data.template_id.clone()));
    }

    fn already_matched(&self, _data: &RequestData) -> bool {
        self.matched
    }
}

/// Counts the tokens taken without ever waiting.
#[derive(Default)]
pub struct CountingLimiter {
    taken: AtomicUsize,
}

impl CountingLimiter {
    pub fn taken(&self) -> usize {
        self.taken.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl RateLimiter for CountingLimiter {
    async fn take(&self) {
        self.taken.fetch_add(1, Ordering::Relaxed);
    }
}
