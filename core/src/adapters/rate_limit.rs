use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{self, Instant};

use crate::ports::RateLimiter;

/// Never suspends.
#[derive(Debug, Default, Clone, Copy)]
pub struct Unlimited;

#[async_trait]
impl RateLimiter for Unlimited {
    async fn take(&self) {}
}

/// Hands out one slot per `period`.
///
/// Callers reserve their slot under a short lock and sleep outside of it,
/// so concurrent pipelines queue up without blocking each other's I/O.
#[derive(Debug)]
pub struct TokenBucket {
    period: Duration,
    next_slot: Mutex<Option<Instant>>,
}

impl TokenBucket {
    pub fn per_second(requests: u32) -> Self {
        Self {
            period: Duration::from_secs(1) / requests.max(1),
            next_slot: Mutex::new(None),
        }
    }

    fn reserve(&self) -> Instant {
        let mut next = self.next_slot.lock().unwrap_or_else(PoisonError::into_inner);
        let now = Instant::now();
        let slot = match *next {
            Some(at) if at > now => at,
            _ => now,
        };
        *next = Some(slot + self.period);
        slot
    }
}

#[async_trait]
impl RateLimiter for TokenBucket {
    async fn take(&self) {
        let slot = self.reserve();
        time::sleep_until(slot).await;
    }
}

/// Picks the limiter for a `requests per second` setting, `0` meaning none.
pub fn rate_limiter(per_second: u32) -> Arc<dyn RateLimiter> {
    match per_second {
        0 => Arc::new(Unlimited),
        n => Arc::new(TokenBucket::per_second(n)),
    }
}
