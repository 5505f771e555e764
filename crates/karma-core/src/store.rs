use std::future::Future;

use crate::error::StoreError;

/// A key-value counter service holding one running total per key.
pub trait CounterStore: Send + Sync {
    /// Atomically add `delta` to the counter at `key`, creating it at zero if
    /// absent. Returns the new total.
    fn increment_by(
        &self,
        key: &str,
        delta: i64,
    ) -> impl Future<Output = Result<i64, StoreError>> + Send;

    /// Liveness probe.
    fn ping(&self) -> impl Future<Output = Result<(), StoreError>> + Send;
}

// In-memory implementation for testing
#[cfg(any(test, feature = "test-utils"))]
pub mod memory {
    use super::*;
    use std::collections::HashMap;
    use std::sync::RwLock;

    /// In-memory counter store that also records every increment in order.
    #[derive(Default)]
    pub struct InMemoryCounterStore {
        totals: RwLock<HashMap<String, i64>>,
        log: RwLock<Vec<(String, i64)>>,
    }

    impl InMemoryCounterStore {
        pub fn new() -> Self {
            Self::default()
        }

        /// Current total for a key (zero if never incremented).
        pub fn get(&self, key: &str) -> i64 {
            self.totals
                .read()
                .unwrap()
                .get(key)
                .copied()
                .unwrap_or(0)
        }

        /// Every increment applied so far, in order.
        pub fn increments(&self) -> Vec<(String, i64)> {
            self.log.read().unwrap().clone()
        }
    }

    impl CounterStore for InMemoryCounterStore {
        async fn increment_by(&self, key: &str, delta: i64) -> Result<i64, StoreError> {
            let mut totals = self.totals.write().unwrap();
            let total = totals.entry(key.to_string()).or_insert(0);
            *total += delta;

            self.log.write().unwrap().push((key.to_string(), delta));
            Ok(*total)
        }

        async fn ping(&self) -> Result<(), StoreError> {
            Ok(())
        }
    }

}
