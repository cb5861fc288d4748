//! Host controls available to the worker.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;

/// The environment hosting a worker instance.
#[async_trait]
pub trait WorkerScope: Send + Sync {
    /// Activate as soon as installation finishes, without waiting for
    /// older instances to release their pages.
    async fn skip_waiting(&self);

    /// Take control of every open page. Returns how many were claimed.
    async fn claim_clients(&self) -> usize;
}

/// Scope with a fixed set of open pages (for development/testing).
#[derive(Debug, Default)]
pub struct InMemoryScope {
    open_clients: AtomicUsize,
    skipped_waiting: AtomicBool,
    claimed: AtomicUsize,
}

impl InMemoryScope {
    /// Create a scope with no open pages.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of open pages.
    pub fn with_clients(self, count: usize) -> Self {
        self.open_clients.store(count, Ordering::SeqCst);
        self
    }

    /// Whether `skip_waiting` was called.
    pub fn skipped_waiting(&self) -> bool {
        self.skipped_waiting.load(Ordering::SeqCst)
    }

    /// Pages currently controlled.
    pub fn claimed_clients(&self) -> usize {
        self.claimed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WorkerScope for InMemoryScope {
    async fn skip_waiting(&self) {
        self.skipped_waiting.store(true, Ordering::SeqCst);
    }

    async fn claim_clients(&self) -> usize {
        let count = self.open_clients.load(Ordering::SeqCst);
        self.claimed.store(count, Ordering::SeqCst);
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_claim_takes_all_open_pages() {
        let scope = InMemoryScope::new().with_clients(3);
        assert_eq!(scope.claimed_clients(), 0);
        assert_eq!(scope.claim_clients().await, 3);
        assert_eq!(scope.claimed_clients(), 3);
        assert!(!scope.skipped_waiting());
    }
}
