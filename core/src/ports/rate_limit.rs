use async_trait::async_trait;

/// Process-wide request pacing.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Suspends until one more request is permitted.
    async fn take(&self);
}
