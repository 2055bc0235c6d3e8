//! # Fuzz Target Model
//!
//! A target is either a bare URL or a captured request (e.g. from a proxy
//! history or a raw request file). Each target carries the cancellation
//! token of the pipeline processing it.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use url::Url;

use crate::error::InputError;
use crate::http::{self, Headers, HttpRequest};

/// Shared cancellation flag.
///
/// Clones observe the same flag, so a target branched off for URL-only
/// fuzzing still sees a cancellation of the target it was cloned from.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedRequest {
    pub method: String,
    pub headers: Headers,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestResponse {
    pub url: String,
    pub request: Option<CapturedRequest>,
}

impl RequestResponse {
    pub fn new(url: impl Into<String>, request: CapturedRequest) -> Self {
        Self {
            url: url.into(),
            request: Some(request),
        }
    }

    /// Parses a raw HTTP/1.x request dump.
    ///
    /// The URL is rebuilt from the request target and the `Host` header,
    /// unless the request line already carries an absolute URL.
    pub fn from_raw(raw: &str, scheme: &str) -> Result<Self, InputError> {
        let (head, body) = raw
            .split_once("\r\n\r\n")
            .or_else(|| raw.split_once("\n\n"))
            .unwrap_or((raw, ""));

        let mut lines = head.lines().map(str::trim_end).filter(|l| !l.is_empty());
        let request_line = lines
            .next()
            .ok_or_else(|| InputError::BuildRequest("empty raw request".to_string()))?;

        let mut parts = request_line.split_whitespace();
        let (Some(method), Some(path)) = (parts.next(), parts.next()) else {
            return Err(InputError::BuildRequest(format!(
                "malformed request line: {request_line}"
            )));
        };

        let mut headers = Headers::new();
        for line in lines {
            let Some((name, value)) = line.split_once(':') else {
                return Err(InputError::BuildRequest(format!("malformed header: {line}")));
            };
            headers.append(name.trim(), value.trim());
        }

        let url = if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            let host = headers
                .get("Host")
                .ok_or_else(|| InputError::BuildRequest("missing Host header".to_string()))?;
            format!("{scheme}://{host}{path}")
        };

        let request = CapturedRequest {
            method: method.to_string(),
            headers,
            body: body.to_string(),
        };
        Ok(Self::new(url, request))
    }

    /// Builds the base request fuzzing rules mutate.
    pub fn build_request(&self) -> Result<HttpRequest, InputError> {
        let url = http::parse_absolute_url(&self.url)
            .map_err(|e| InputError::BuildRequest(e.to_string()))?;

        let Some(captured) = &self.request else {
            return Ok(HttpRequest::get(url));
        };
        if captured.method.trim().is_empty() {
            return Err(InputError::BuildRequest("request has no method".to_string()));
        }

        let mut request = HttpRequest::new(captured.method.trim().to_ascii_uppercase(), url);
        request.headers = captured.headers.clone();
        if !captured.body.is_empty() {
            request.body = Some(captured.body.clone());
        }
        Ok(request)
    }
}

/// Represents a distinct target to be fuzzed.
#[derive(Debug, Clone, Default)]
pub struct FuzzTarget {
    /// The literal input, or the resolved URL once a captured request was built.
    pub input: String,
    pub req_resp: Option<RequestResponse>,
    pub cancel: CancelToken,
}

impl FuzzTarget {
    pub fn from_url(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            ..Self::default()
        }
    }

    pub fn from_request(req_resp: RequestResponse) -> Self {
        Self {
            input: req_resp.url.clone(),
            req_resp: Some(req_resp),
            cancel: CancelToken::new(),
        }
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// The target's URL: the captured request's when there is one.
    pub fn url(&self) -> Result<Url, InputError> {
        match &self.req_resp {
            Some(req_resp) => http::parse_absolute_url(&req_resp.url),
            None => http::parse_absolute_url(&self.input),
        }
    }

    pub fn captured_request(&self) -> Option<&CapturedRequest> {
        self.req_resp.as_ref().and_then(|rr| rr.request.as_ref())
    }

    /// Key used against the host-failure cache.
    pub fn host_key(&self) -> &str {
        &self.input
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}
