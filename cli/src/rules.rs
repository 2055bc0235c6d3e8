//! Single-parameter substitution rule: every payload replaces the value of
//! one query or `application/x-www-form-urlencoded` body parameter.

use fuzzr_common::error::RuleError;
use fuzzr_common::http::HttpRequest;
use fuzzr_core::{FuzzRule, GeneratedRequest, RuleInput, Variants};
use url::form_urlencoded;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Location {
    Query,
    Body,
}

pub struct ParamRule {
    param: String,
    payloads: Vec<String>,
}

impl ParamRule {
    pub fn new(param: String, payloads: Vec<String>) -> Self {
        Self { param, payloads }
    }
}

impl FuzzRule for ParamRule {
    fn name(&self) -> &str {
        "param-replace"
    }

    fn generate(&self, input: RuleInput<'_>) -> Result<Variants, RuleError> {
        let base = input.base_request;
        let Some(location) = locate(&base, &self.param) else {
            return Err(RuleError::NotApplicable(format!(
                "parameter `{}` not found in {}",
                self.param, base.url
            )));
        };

        let param = self.param.clone();
        let variants = self.payloads.clone().into_iter().map(move |payload| {
            let request = substitute(&base, location, &param, &payload);
            Ok::<_, RuleError>(GeneratedRequest::new(request).with_value(param.clone(), payload))
        });
        Ok(Box::new(variants))
    }
}

fn locate(request: &HttpRequest, param: &str) -> Option<Location> {
    if request.url.query_pairs().any(|(name, _)| name == param) {
        return Some(Location::Query);
    }
    let is_form = request
        .headers
        .get("Content-Type")
        .is_none_or(|ct| ct.contains("application/x-www-form-urlencoded"));
    let body = request.body.as_deref().unwrap_or_default();
    if is_form && form_urlencoded::parse(body.as_bytes()).any(|(name, _)| name == param) {
        return Some(Location::Body);
    }
    None
}

fn substitute(base: &HttpRequest, location: Location, param: &str, payload: &str) -> HttpRequest {
    let mut request = base.clone();
    match location {
        Location::Query => {
            let pairs = replace_pairs(request.url.query().unwrap_or_default(), param, payload);
            request.url.query_pairs_mut().clear().extend_pairs(pairs);
        }
        Location::Body => {
            let pairs = replace_pairs(request.body.as_deref().unwrap_or_default(), param, payload);
            let body = form_urlencoded::Serializer::new(String::new())
                .extend_pairs(pairs)
                .finish();
            request.body = Some(body);
        }
    }
    request
}

fn replace_pairs(encoded: &str, param: &str, payload: &str) -> Vec<(String, String)> {
    form_urlencoded::parse(encoded.as_bytes())
        .into_owned()
        .map(|(name, value)| {
            if name == param {
                (name, payload.to_string())
            } else {
                (name, value)
            }
        })
        .collect()
}
