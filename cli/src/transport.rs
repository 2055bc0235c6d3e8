//! Transport that prints the requests it is handed instead of sending them.
//!
//! There is no response, so the template operators are evaluated against the
//! request itself: URL variables, `method`, `body` and the `header` block.

use std::sync::Arc;

use async_trait::async_trait;
use colored::*;
use fuzzr_common::error::TransportError;
use fuzzr_common::event::{InternalEvent, WrappedEvent};
use fuzzr_common::http::HttpRequest;
use fuzzr_common::operators::Operators;
use fuzzr_common::target::FuzzTarget;
use fuzzr_common::variables::VariableSnapshot;
use fuzzr_core::ports::{Dispatch, Evaluator, Transport};
use tracing::info;

pub struct PreviewTransport {
    evaluator: Arc<dyn Evaluator>,
    operators: Arc<Operators>,
}

impl PreviewTransport {
    pub fn new(evaluator: Arc<dyn Evaluator>, operators: Operators) -> Self {
        Self {
            evaluator,
            operators: Arc::new(operators),
        }
    }
}

#[async_trait]
impl Transport for PreviewTransport {
    async fn send(
        &self,
        dispatch: &Dispatch,
        _target: &FuzzTarget,
    ) -> Result<WrappedEvent, TransportError> {
        let request = &dispatch.request;
        let values: Vec<String> = dispatch
            .dynamic_values
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect();

        info!(
            "{} {} {}",
            request.method.bold(),
            request.url,
            format!("[{}]", values.join(", ")).dimmed()
        );
        if let Some(body) = &request.body {
            info!("    {}", body.dimmed());
        }

        let mut internal = InternalEvent::new();
        internal.insert("url".to_string(), request.url.to_string());
        internal.insert("method".to_string(), request.method.clone());
        let event = WrappedEvent::new(internal);

        if self.operators.is_empty() {
            return Ok(event);
        }
        let result = self
            .evaluator
            .match_operators(&self.operators, &request_snapshot(request));
        Ok(event.with_result(result))
    }
}

fn request_snapshot(request: &HttpRequest) -> VariableSnapshot {
    let mut data = VariableSnapshot::from_url(&request.url);
    data.insert("path", request.url.path());
    data.insert("method", request.method.as_str());
    data.insert("body", request.body.as_deref().unwrap_or_default());

    let header: String = request
        .headers
        .iter()
        .map(|(name, value)| format!("{name}: {value}\n"))
        .collect();
    data.insert("header", header);
    data
}
