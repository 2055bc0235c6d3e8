use std::sync::atomic::{AtomicU64, Ordering};

use crate::ports::Progress;

#[derive(Debug, Default)]
pub struct RequestCounter {
    requests: AtomicU64,
}

impl RequestCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requests(&self) -> u64 {
        self.requests.load(Ordering::Relaxed)
    }
}

impl Progress for RequestCounter {
    fn increment_requests(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
    }
}
