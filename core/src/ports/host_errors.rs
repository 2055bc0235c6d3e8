/// Short-circuit store that suppresses requests to hosts that keep failing.
///
/// Shared by every target pipeline of a scan; `check` and `mark_failed` may be
/// called concurrently for the same host.
pub trait HostErrorsCache: Send + Sync {
    /// True when `host` failed too often and must be skipped.
    fn check(&self, host: &str) -> bool;

    /// Records a failed request against `host`.
    fn mark_failed(&self, host: &str, err: &anyhow::Error);
}
