use moka::future::Cache;
use std::future::Future;
use tracing::{debug, trace};

/// Values computed once per connection configuration, such as the client
/// handle or the organization name.
///
/// Concurrent callers asking for a missing key share a single
/// initialization. Failed initializations are not cached.
pub struct ConnectionCache<V> {
    entries: Cache<&'static str, V>,
}

impl<V: Clone + Send + Sync + 'static> ConnectionCache<V> {
    pub fn new(name: &str) -> Self {
        ConnectionCache {
            entries: Cache::builder().max_capacity(64).name(name).build(),
        }
    }

    pub async fn get(&self, key: &'static str) -> Option<V> {
        self.entries.get(key).await
    }

    pub async fn get_or_try_insert<F, E>(&self, key: &'static str, init: F) -> Result<V, E>
    where
        F: Future<Output = Result<V, E>>,
        E: Clone + Send + Sync + 'static,
    {
        if let Some(value) = self.entries.get(key).await {
            trace!(key, "connection cache hit");
            return Ok(value);
        }

        debug!(key, "connection cache miss");
        self.entries
            .try_get_with(key, init)
            .await
            .map_err(|err| (*err).clone())
    }

    /// Drops one entry; the next lookup recomputes it.
    pub async fn invalidate(&self, key: &'static str) {
        debug!(key, "connection cache entry invalidated");
        self.entries.invalidate(key).await;
    }

    /// Drops every entry; the next lookup recomputes it.
    pub fn invalidate_all(&self) {
        debug!("connection cache invalidated");
        self.entries.invalidate_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigurationError;
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };
    use std::time::Duration;

    #[tokio::test]
    async fn concurrent_callers_share_one_initialization() {
        let cache = Arc::new(ConnectionCache::<String>::new("test"));
        let calls = Arc::new(AtomicUsize::new(0));

        let tasks = (0..8).map(|_| {
            let cache = cache.clone();
            let calls = calls.clone();
            tokio::spawn(async move {
                cache
                    .get_or_try_insert("organization", async {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(20)).await;
                        Ok::<_, ConfigurationError>("fabrikam".to_string())
                    })
                    .await
            })
        });

        for task in tasks.collect::<Vec<_>>() {
            assert_eq!(task.await.unwrap().unwrap(), "fabrikam");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let cache = ConnectionCache::<String>::new("test");

        let err = cache
            .get_or_try_insert("organization", async {
                Err(ConfigurationError::new("organization_url", "missing"))
            })
            .await
            .unwrap_err();
        assert_eq!(err.field, "organization_url");

        let value = cache
            .get_or_try_insert("organization", async {
                Ok::<_, ConfigurationError>("contoso".to_string())
            })
            .await
            .unwrap();
        assert_eq!(value, "contoso");
    }

    #[tokio::test]
    async fn invalidation_forces_recomputation() {
        let cache = ConnectionCache::<String>::new("test");
        cache
            .get_or_try_insert("organization", async { Ok::<_, ConfigurationError>("a".into()) })
            .await
            .unwrap();

        cache.invalidate_all();
        assert_eq!(cache.get("organization").await, None);

        let value = cache
            .get_or_try_insert("organization", async { Ok::<_, ConfigurationError>("b".into()) })
            .await
            .unwrap();
        assert_eq!(value, "b");
    }

    #[tokio::test]
    async fn invalidating_one_key_keeps_the_others() {
        let cache = ConnectionCache::<String>::new("test");
        for (key, value) in [("organization", "a"), ("client", "b")] {
            cache
                .get_or_try_insert(key, async { Ok::<_, ConfigurationError>(value.into()) })
                .await
                .unwrap();
        }

        cache.invalidate("client").await;
        assert_eq!(cache.get("client").await, None);
        assert_eq!(cache.get("organization").await, Some("a".to_string()));
    }
}
