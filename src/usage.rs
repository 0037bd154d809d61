// Copyright (c) 2025 - Cowboy AI, Inc.
//! Configuration Usage Tracker
//!
//! Keeps each configuration's `used_count` equal to the number of live
//! fabric bindings referencing it. A fabric holding the same configuration
//! under two roles counts twice.

use std::sync::Arc;

use tracing::debug;

use crate::domain::{ConfigBinding, ConfigurationId};
use crate::errors::StoreResult;
use crate::store::ConfigurationStore;

/// Increments and decrements configuration usage counters
pub struct ConfigUsageTracker<S: ?Sized> {
    store: Arc<S>,
}

impl<S: ?Sized> Clone for ConfigUsageTracker<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S> ConfigUsageTracker<S>
where
    S: ConfigurationStore + ?Sized,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub async fn increment(&self, id: ConfigurationId) -> StoreResult<u64> {
        let used = self.store.adjust_configuration_usage(id, 1).await?;
        debug!(configuration_id = %id, used_count = used, "Configuration usage incremented");
        Ok(used)
    }

    pub async fn decrement(&self, id: ConfigurationId) -> StoreResult<u64> {
        let used = self.store.adjust_configuration_usage(id, -1).await?;
        debug!(configuration_id = %id, used_count = used, "Configuration usage decremented");
        Ok(used)
    }

    /// Increment once per binding, stopping at the first failure
    ///
    /// Returns the configurations incremented so far alongside any error so
    /// the caller can compensate exactly what was applied.
    pub async fn acquire(
        &self,
        bindings: &[ConfigBinding],
    ) -> (Vec<ConfigurationId>, StoreResult<()>) {
        self.apply(bindings, 1).await
    }

    /// Decrement once per binding, stopping at the first failure
    pub async fn release(
        &self,
        bindings: &[ConfigBinding],
    ) -> (Vec<ConfigurationId>, StoreResult<()>) {
        self.apply(bindings, -1).await
    }

    async fn apply(
        &self,
        bindings: &[ConfigBinding],
        delta: i64,
    ) -> (Vec<ConfigurationId>, StoreResult<()>) {
        let mut applied = Vec::with_capacity(bindings.len());
        for binding in bindings {
            let id = binding.configuration_id;
            let result = if delta > 0 {
                self.increment(id).await
            } else {
                self.decrement(id).await
            };
            if let Err(e) = result {
                return (applied, Err(e));
            }
            applied.push(id);
        }
        (applied, Ok(()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ConfigurationRecord;
    use crate::errors::StoreError;
    use crate::store::{InMemoryRecordStore, StoreOp};

    async fn seeded() -> (Arc<InMemoryRecordStore>, ConfigurationId, ConfigurationId) {
        let store = Arc::new(InMemoryRecordStore::new());
        let a = ConfigurationRecord::new("cfgA");
        let b = ConfigurationRecord::new("cfgB");
        let ids = (a.id, b.id);
        store.insert_configuration(a).await.unwrap();
        store.insert_configuration(b).await.unwrap();
        (store, ids.0, ids.1)
    }

    async fn used(store: &InMemoryRecordStore, id: ConfigurationId) -> u64 {
        store.get_configuration(id).await.unwrap().unwrap().used_count
    }

    #[tokio::test]
    async fn test_acquire_counts_each_binding() {
        let (store, a, b) = seeded().await;
        let tracker = ConfigUsageTracker::new(store.clone());
        let bindings = vec![
            ConfigBinding::new(a, "spine-1"),
            ConfigBinding::new(a, "spine-2"),
            ConfigBinding::new(b, "leaf-1"),
        ];

        let (applied, result) = tracker.acquire(&bindings).await;
        assert!(result.is_ok());
        assert_eq!(applied, vec![a, a, b]);
        assert_eq!(used(&store, a).await, 2);
        assert_eq!(used(&store, b).await, 1);

        let (_, result) = tracker.release(&bindings).await;
        assert!(result.is_ok());
        assert_eq!(used(&store, a).await, 0);
    }

    #[tokio::test]
    async fn test_partial_acquire_reports_applied() {
        let (store, a, b) = seeded().await;
        store.fail_after(StoreOp::AdjustConfigurationUsage, 1).await;
        let tracker = ConfigUsageTracker::new(store.clone());

        let (applied, result) = tracker
            .acquire(&[ConfigBinding::new(a, "spine-1"), ConfigBinding::new(b, "leaf-1")])
            .await;
        assert_eq!(applied, vec![a]);
        assert!(matches!(result, Err(StoreError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_unknown_configuration() {
        let (store, _, _) = seeded().await;
        let tracker = ConfigUsageTracker::new(store);
        assert!(matches!(
            tracker.increment(ConfigurationId::new()).await,
            Err(StoreError::NotFound { .. })
        ));
    }
}
