use fuzzr_common::event::{OperatorResult, ResultEvent, WrappedEvent};
use fuzzr_common::operators::{Matcher, Operators};
use fuzzr_common::variables::VariableSnapshot;

/// The matcher/extractor engine of a template.
pub trait Evaluator: Send + Sync {
    /// Evaluates a single matcher (or precondition filter) against `data`.
    fn match_filter(&self, data: &VariableSnapshot, matcher: &Matcher) -> bool;

    /// Turns a matched event into output results.
    fn make_results(&self, template_id: &str, event: &WrappedEvent) -> Vec<ResultEvent>;

    /// Evaluates every matcher of `operators` and combines them.
    fn match_operators(&self, operators: &Operators, data: &VariableSnapshot) -> OperatorResult {
        let mut matches = Vec::new();
        let status: Vec<bool> = operators
            .matchers
            .iter()
            .enumerate()
            .map(|(index, matcher)| {
                let matched = self.match_filter(data, matcher);
                if matched {
                    matches.push(matcher.display_name(index));
                }
                matched
            })
            .collect();

        OperatorResult {
            matched: operators.condition.eval(&status),
            matches,
            ..OperatorResult::default()
        }
    }
}
