use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use anyhow::Context;
use fuzzr_common::error::FuzzError;
use fuzzr_common::event::{InternalEvent, WrappedEvent};
use fuzzr_common::operators::Operators;
use fuzzr_common::target::{CancelToken, FuzzTarget, RequestResponse};
use fuzzr_core::adapters::BasicEvaluator;
use fuzzr_core::ports::Evaluator;
use fuzzr_core::{FuzzingRequest, Precondition, Services};
use tracing::{debug, error, info_span, warn};

use super::CommandLine;
use crate::rules::ParamRule;
use crate::terminal::{print, spinner};
use crate::transport::PreviewTransport;

const TEMPLATE_ID: &str = "param-fuzz";

pub async fn fuzz(cmd: CommandLine) -> anyhow::Result<()> {
    let targets: Vec<FuzzTarget> = collect_targets(&cmd)?;
    if targets.is_empty() {
        anyhow::bail!("no targets given, pass URLs or --request");
    }

    let cfg = Arc::new(cmd.config());
    let evaluator: Arc<dyn Evaluator> = Arc::new(BasicEvaluator);
    let operators = Operators::new(cmd.matchers.clone(), cmd.match_condition);
    let transport = PreviewTransport::new(Arc::clone(&evaluator), operators.clone());
    let services = Services::from_config(Arc::new(transport), &cfg)
        .with_evaluator(evaluator)
        .with_progress(Arc::new(spinner::RequestSpinner));

    let mut request = FuzzingRequest::new(TEMPLATE_ID, cfg, services)
        .with_operators(operators)
        .with_rule(Arc::new(ParamRule::new(cmd.param.clone(), cmd.payloads.clone())));
    if !cmd.filters.is_empty() {
        for filter in &cmd.filters {
            debug!("precondition filter: {filter}");
        }
        request = request.with_precondition(Precondition::new(cmd.filters, cmd.filter_condition));
    }

    let findings = Arc::new(AtomicUsize::new(0));
    let on_event = {
        let findings = Arc::clone(&findings);
        move |event: WrappedEvent| {
            if !event.matched() {
                return;
            }
            for result in &event.results {
                print::finding(result);
                findings.fetch_add(1, Ordering::Relaxed);
            }
        }
    };

    let cancel = CancelToken::new();
    watch_interrupt(cancel.clone());

    let span = info_span!("fuzzing", template = request.template_id());
    let _guard = span.enter();
    let start_time = Instant::now();
    let total = targets.len();

    for target in targets {
        let mut target = target.with_cancel(cancel.clone());
        match request
            .execute_fuzzing(&mut target, &InternalEvent::new(), &on_event)
            .await
        {
            Ok(()) => {}
            Err(err @ FuzzError::Input(_)) => error!("{}: {err}", target.input),
            Err(err) => {
                spinner::finish();
                return Err(err.into());
            }
        }
        if cancel.is_cancelled() {
            warn!("Fuzzing cancelled, skipping the remaining targets");
            break;
        }
    }

    spinner::finish();
    print::summary(total, findings.load(Ordering::Relaxed), start_time.elapsed());
    Ok(())
}

fn collect_targets(cmd: &CommandLine) -> anyhow::Result<Vec<FuzzTarget>> {
    let mut targets: Vec<FuzzTarget> = cmd.targets.iter().map(FuzzTarget::from_url).collect();

    if let Some(path) = &cmd.request {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read request file at {path:?}"))?;
        let req_resp = RequestResponse::from_raw(&raw, &cmd.scheme)
            .with_context(|| format!("Failed to parse request file {path:?}"))?;
        targets.push(FuzzTarget::from_request(req_resp));
    }

    Ok(targets)
}

fn watch_interrupt(cancel: CancelToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, finishing the request in flight");
            cancel.cancel();
        }
    });
}
