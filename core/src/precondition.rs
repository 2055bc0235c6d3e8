//! # Fuzzing Preconditions
//!
//! Decides per target whether fuzzing starts at all. Filters are matched
//! against a [`VariableSnapshot`] built from the target; fuzzing is opt-out,
//! so a template without filters fuzzes everything.

use fuzzr_common::config::Config;
use fuzzr_common::operators::{Condition, Matcher};
use fuzzr_common::target::FuzzTarget;
use fuzzr_common::variables::VariableSnapshot;
use tracing::debug;

use crate::ports::Evaluator;

#[derive(Debug, Clone, Default)]
pub struct Precondition {
    pub filters: Vec<Matcher>,
    pub condition: Condition,
}

impl Precondition {
    pub fn new(filters: Vec<Matcher>, condition: Condition) -> Self {
        Self { filters, condition }
    }

    /// True when the target passes the filters.
    ///
    /// Diagnostics are emitted when `matcher_status` / `show_var_dump` are
    /// set and never change the outcome.
    pub fn should_fuzz(
        &self,
        target: &FuzzTarget,
        evaluator: &dyn Evaluator,
        cfg: &Config,
        template_id: &str,
    ) -> bool {
        if self.filters.is_empty() {
            return true;
        }

        let data = filter_data_map(target);
        if cfg.show_var_dump {
            debug!("Fuzz Filter Variables:\n{data}");
        }

        let status: Vec<bool> = self
            .filters
            .iter()
            .enumerate()
            .map(|(index, filter)| {
                let matched = evaluator.match_filter(&data, filter);
                if cfg.matcher_status {
                    debug!(
                        input = %target.input,
                        template = template_id,
                        filter = %filter.display_name(index),
                        matched,
                        "fuzz filter evaluated"
                    );
                }
                matched
            })
            .collect();

        if status.is_empty() {
            return true;
        }

        let matched = self.condition.eval(&status);
        if cfg.matcher_status {
            debug!(input = %target.input, template = template_id, matched, "final filter status");
        }
        matched
    }
}

/// Builds the variable snapshot filters are matched against.
///
/// URL parts first, then the captured request (method, body, flattened
/// headers and the `cookie`/`user_agent`/`content_type` aliases). A target
/// whose URL cannot be parsed only exposes its raw input as `host`.
pub fn filter_data_map(target: &FuzzTarget) -> VariableSnapshot {
    let Ok(parsed) = target.url() else {
        let mut data = VariableSnapshot::new();
        data.insert("host", target.input.as_str());
        return data;
    };

    let mut data = VariableSnapshot::from_url(&parsed);
    data.insert("path", parsed.path());
    data.insert("query", parsed.query().unwrap_or_default());

    let Some(request) = target.captured_request() else {
        data.insert("method", "GET");
        return data;
    };

    data.insert("method", request.method.as_str());
    data.insert("body", request.body.as_str());

    let mut header = String::new();
    for (name, value) in request.headers.iter() {
        let name = name.trim().replace('-', "_").to_ascii_lowercase();
        match name.as_str() {
            "cookie" | "user_agent" | "content_type" => data.insert(&name, value),
            _ => {}
        }
        header.push_str(&format!("{name}: {value}\n"));
    }
    data.insert("header", header);
    data
}
