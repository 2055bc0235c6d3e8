//! Counts network-level failures per `host:port` and reports a host as
//! unresponsive once it reaches the configured threshold.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock};

use tracing::warn;
use url::Url;

use crate::ports::HostErrorsCache;

/// Failures that say something about the host rather than the request.
const HOST_FAILURE_MARKERS: &[&str] = &[
    "timed out",
    "timeout",
    "deadline exceeded",
    "connection refused",
    "connection reset",
    "no address found",
    "could not resolve host",
    "name or service not known",
    "network is unreachable",
    "no route to host",
];

pub struct HostErrorCache {
    max_errors: usize,
    counts: RwLock<HashMap<String, AtomicUsize>>,
}

impl HostErrorCache {
    pub fn new(max_errors: usize) -> Self {
        Self {
            max_errors: max_errors.max(1),
            counts: RwLock::new(HashMap::new()),
        }
    }

    pub fn errors(&self, host: &str) -> usize {
        let counts = self.counts.read().unwrap_or_else(PoisonError::into_inner);
        counts
            .get(&normalize(host))
            .map_or(0, |count| count.load(Ordering::Relaxed))
    }

    /// Increments the counter for `key`, creating it on first use.
    fn increment(&self, key: &str) -> usize {
        {
            let counts = self.counts.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(count) = counts.get(key) {
                return count.fetch_add(1, Ordering::Relaxed) + 1;
            }
        }
        let mut counts = self.counts.write().unwrap_or_else(PoisonError::into_inner);
        counts
            .entry(key.to_string())
            .or_default()
            .fetch_add(1, Ordering::Relaxed)
            + 1
    }
}

impl HostErrorsCache for HostErrorCache {
    fn check(&self, host: &str) -> bool {
        self.errors(host) >= self.max_errors
    }

    fn mark_failed(&self, host: &str, err: &anyhow::Error) {
        if !is_host_failure(err) {
            return;
        }
        let key = normalize(host);
        let errors = self.increment(&key);
        if errors == self.max_errors {
            warn!("Skipped {key} from target list as found unresponsive {errors} times");
        }
    }
}

/// `scheme://host[:port]/...` becomes `host:port`; anything unparsable is kept as is.
fn normalize(value: &str) -> String {
    let value = value.trim();
    let Ok(url) = Url::parse(value) else {
        return value.to_string();
    };
    match (url.host_str(), url.port_or_known_default()) {
        (Some(host), Some(port)) => format!("{host}:{port}"),
        (Some(host), None) => host.to_string(),
        _ => value.to_string(),
    }
}

fn is_host_failure(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        let message = cause.to_string().to_lowercase();
        HOST_FAILURE_MARKERS.iter().any(|marker| message.contains(marker))
    })
}
