use fuzzr_common::event::{ResultEvent, WrappedEvent};
use fuzzr_common::operators::Matcher;
use fuzzr_common::variables::VariableSnapshot;

use crate::ports::Evaluator;

/// Word and status matching over a variable snapshot.
#[derive(Debug, Default, Clone, Copy)]
pub struct BasicEvaluator;

impl Evaluator for BasicEvaluator {
    fn match_filter(&self, data: &VariableSnapshot, matcher: &Matcher) -> bool {
        matcher.matches(data)
    }

    fn make_results(&self, template_id: &str, event: &WrappedEvent) -> Vec<ResultEvent> {
        let Some(result) = event.operators_result.as_ref().filter(|r| r.matched) else {
            return Vec::new();
        };

        let matched_at = event
            .internal
            .get("matched")
            .or_else(|| event.internal.get("url"))
            .cloned()
            .unwrap_or_default();
        let extracted: Vec<String> = result.extracts.values().flatten().cloned().collect();

        let result_for = |matcher_name: Option<String>| ResultEvent {
            template_id: template_id.to_string(),
            matched_at: matched_at.clone(),
            matcher_name,
            extracted: extracted.clone(),
        };

        if result.matches.is_empty() {
            return vec![result_for(None)];
        }
        result
            .matches
            .iter()
            .map(|name| result_for(Some(name.clone())))
            .collect()
    }
}
