//! # Rule Application
//!
//! Drives every fuzzing rule of a template against one target:
//!
//! 1. **Gate**: the precondition filters decide whether the target is fuzzed.
//! 2. **Base request**: built from the captured request, or synthesized as a
//!    `GET` for URL-only targets.
//! 3. **Rules**: tried in declaration order, each on its own copy of the base
//!    request, variants pulled lazily and dispatched one by one.
//! 4. **Classification**: every rule outcome is classified to decide whether
//!    to continue, finish the target early, or abort it.

use std::sync::Arc;

use fuzzr_common::config::Config;
use fuzzr_common::error::{FuzzError, InputError, RuleError};
use fuzzr_common::event::{InternalEvent, WrappedEvent};
use fuzzr_common::http::{self, HttpRequest};
use fuzzr_common::operators::Operators;
use fuzzr_common::target::FuzzTarget;
use tracing::{debug, trace};

use crate::adapters::{self, BasicEvaluator, HostErrorCache, RequestCounter, Unlimited};
use crate::executor::Flow;
use crate::ports::{Evaluator, HostErrorsCache, Interactions, Progress, RateLimiter, Transport};
use crate::precondition::Precondition;
use crate::rule::{FuzzRule, RuleInput};
use crate::useragent;

/// Receives every event that is not deferred to out-of-band correlation.
pub type OutputCallback<'a> = dyn Fn(WrappedEvent) + Send + Sync + 'a;

/// Collaborators a fuzzing request talks to.
///
/// The host-failure cache and the rate limiter are shared by every target
/// pipeline of a scan.
#[derive(Clone)]
pub struct Services {
    pub transport: Arc<dyn Transport>,
    pub evaluator: Arc<dyn Evaluator>,
    pub rate_limiter: Arc<dyn RateLimiter>,
    pub progress: Arc<dyn Progress>,
    pub host_errors: Option<Arc<dyn HostErrorsCache>>,
    pub interactions: Option<Arc<dyn Interactions>>,
}

impl Services {
    /// Services with no pacing, no failure tracking and no correlation.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            evaluator: Arc::new(BasicEvaluator),
            rate_limiter: Arc::new(Unlimited),
            progress: Arc::new(RequestCounter::new()),
            host_errors: None,
            interactions: None,
        }
    }

    /// Services with the in-process stores configured from `cfg`.
    pub fn from_config(transport: Arc<dyn Transport>, cfg: &Config) -> Self {
        let mut services =
            Self::new(transport).with_rate_limiter(adapters::rate_limiter(cfg.rate_limit));
        if cfg.max_host_errors > 0 {
            services.host_errors = Some(Arc::new(HostErrorCache::new(cfg.max_host_errors)));
        }
        services
    }

    pub fn with_evaluator(mut self, evaluator: Arc<dyn Evaluator>) -> Self {
        self.evaluator = evaluator;
        self
    }

    pub fn with_rate_limiter(mut self, rate_limiter: Arc<dyn RateLimiter>) -> Self {
        self.rate_limiter = rate_limiter;
        self
    }

    pub fn with_progress(mut self, progress: Arc<dyn Progress>) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_host_errors(mut self, cache: Arc<dyn HostErrorsCache>) -> Self {
        self.host_errors = Some(cache);
        self
    }

    pub fn with_interactions(mut self, interactions: Arc<dyn Interactions>) -> Self {
        self.interactions = Some(interactions);
        self
    }
}

/// How one rule ended for one target.
#[derive(Debug)]
pub enum RuleVerdict {
    /// Production finished without the rule rejecting the target.
    Applicable,
    /// The rule declined the target. Not an error.
    NotApplicable(String),
    /// Nothing more to do for this target, skip the remaining rules.
    Exhausted,
    /// Abort the target with this error.
    Fatal(FuzzError),
}

impl RuleVerdict {
    pub fn classify(rule: &str, err: RuleError) -> Self {
        match err {
            RuleError::NotApplicable(reason) => RuleVerdict::NotApplicable(reason),
            RuleError::NoMoreRequests => RuleVerdict::Exhausted,
            RuleError::MissingVars(missing) => RuleVerdict::Fatal(FuzzError::MissingVars(missing)),
            RuleError::Other(source) => RuleVerdict::Fatal(FuzzError::Rule {
                rule: rule.to_string(),
                source,
            }),
        }
    }
}

/// The fuzzing part of a request template.
pub struct FuzzingRequest {
    pub(crate) template_id: String,
    pub(crate) rules: Vec<Arc<dyn FuzzRule>>,
    pub(crate) precondition: Option<Precondition>,
    pub(crate) operators: Arc<Operators>,
    pub(crate) stop_at_first_match: bool,
    pub(crate) config: Arc<Config>,
    pub(crate) services: Services,
}

impl FuzzingRequest {
    pub fn new(template_id: impl Into<String>, config: Arc<Config>, services: Services) -> Self {
        Self {
            template_id: template_id.into(),
            rules: Vec::new(),
            precondition: None,
            operators: Arc::new(Operators::default()),
            stop_at_first_match: false,
            config,
            services,
        }
    }

    pub fn with_rule(mut self, rule: Arc<dyn FuzzRule>) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn with_precondition(mut self, precondition: Precondition) -> Self {
        self.precondition = Some(precondition);
        self
    }

    pub fn with_operators(mut self, operators: Operators) -> Self {
        self.operators = Arc::new(operators);
        self
    }

    /// Template-level stop at first match, on top of the global option.
    pub fn stop_at_first_match(mut self, enabled: bool) -> Self {
        self.stop_at_first_match = enabled;
        self
    }

    pub fn template_id(&self) -> &str {
        &self.template_id
    }

    pub fn should_fuzz_target(&self, target: &FuzzTarget) -> bool {
        match &self.precondition {
            Some(precondition) => precondition.should_fuzz(
                target,
                self.services.evaluator.as_ref(),
                &self.config,
                &self.template_id,
            ),
            None => true,
        }
    }

    /// Fuzzes `target` with every rule of the template.
    ///
    /// A target no rule applies to, or whose rules failed, is logged and
    /// skipped so one target never aborts a scan. A cancelled target ends
    /// the same way; callers observe cancellation through their own token.
    /// Only malformed input and missing template variables are returned.
    pub async fn execute_fuzzing(
        &self,
        target: &mut FuzzTarget,
        previous: &InternalEvent,
        callback: &OutputCallback<'_>,
    ) -> Result<(), FuzzError> {
        if !self.should_fuzz_target(target) {
            let shown = target
                .url()
                .map(|u| u.to_string())
                .unwrap_or_else(|_| target.input.clone());
            debug!(template = %self.template_id, "fuzz: target({shown}) not applicable for fuzzing");
            return Ok(());
        }

        if target.input.is_empty() && target.req_resp.is_none() {
            return Err(InputError::Empty.into());
        }

        let result = match &target.req_resp {
            Some(req_resp) => {
                let base_request = req_resp.build_request()?;
                target.input = base_request.url.to_string();
                self.apply_all_rules(target, previous, &base_request, callback).await
            }
            None => {
                let branch = target.clone();
                let parsed = http::parse_absolute_url(&branch.input)?;
                let mut base_request = HttpRequest::get(parsed);
                base_request.headers.set("User-Agent", useragent::pick_random());
                self.apply_all_rules(&branch, previous, &base_request, callback).await
            }
        };

        match result {
            Ok(()) => Ok(()),
            Err(err @ FuzzError::NotApplicable(_)) => {
                debug!(template = %self.template_id, "fuzz: {err}");
                Ok(())
            }
            Err(err @ FuzzError::Rule { .. }) => {
                debug!(template = %self.template_id, "fuzz: payload request execution failed: {err}");
                Ok(())
            }
            Err(err @ FuzzError::Cancelled(_)) => {
                debug!(template = %self.template_id, "fuzz: {err}");
                Ok(())
            }
            Err(err @ (FuzzError::MissingVars(_) | FuzzError::Input(_))) => Err(err),
        }
    }

    /// Applies every rule to `base_request` in declaration order.
    ///
    /// Fails with [`FuzzError::NotApplicable`] when no rule applied and with
    /// [`FuzzError::Cancelled`] as soon as the target's token is cancelled.
    pub async fn apply_all_rules(
        &self,
        target: &FuzzTarget,
        values: &InternalEvent,
        base_request: &HttpRequest,
        callback: &OutputCallback<'_>,
    ) -> Result<(), FuzzError> {
        let mut applicable = false;

        for rule in &self.rules {
            if target.is_cancelled() {
                return Err(FuzzError::Cancelled(target.input.clone()));
            }

            match self.apply_rule(rule.as_ref(), target, values, base_request, callback).await {
                RuleVerdict::Applicable => applicable = true,
                RuleVerdict::NotApplicable(reason) => {
                    trace!(template = %self.template_id, rule = rule.name(), "fuzz: {reason}");
                }
                RuleVerdict::Exhausted => return Ok(()),
                RuleVerdict::Fatal(err) => return Err(err),
            }
        }

        if !applicable {
            return Err(FuzzError::NotApplicable(target.input.clone()));
        }
        Ok(())
    }

    /// Pulls variants from `rule` and dispatches them until the rule runs
    /// out, fails, or the executor asks to stop.
    async fn apply_rule(
        &self,
        rule: &dyn FuzzRule,
        target: &FuzzTarget,
        values: &InternalEvent,
        base_request: &HttpRequest,
        callback: &OutputCallback<'_>,
    ) -> RuleVerdict {
        let input = RuleInput {
            target,
            values,
            base_request: base_request.clone(),
        };
        let mut variants = match rule.generate(input) {
            Ok(variants) => variants,
            Err(err) => return RuleVerdict::classify(rule.name(), err),
        };

        loop {
            if target.is_cancelled() {
                return RuleVerdict::Fatal(FuzzError::Cancelled(target.input.clone()));
            }

            let generated = match variants.next() {
                None => return RuleVerdict::Applicable,
                Some(Ok(generated)) => generated,
                Some(Err(err)) => return RuleVerdict::classify(rule.name(), err),
            };

            let flow = self
                .execute_generated_request(generated, target, callback)
                .await;
            if let Flow::Stop(reason) = flow {
                debug!(template = %self.template_id, rule = rule.name(), ?reason, "fuzz: rule stopped");
                return RuleVerdict::classify(rule.name(), RuleError::NoMoreRequests);
            }
        }
    }
}
