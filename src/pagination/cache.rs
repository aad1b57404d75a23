use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::Instant;

/// Identity of one cached read: resource name followed by every query parameter
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    scope: String,
    parts: Vec<String>,
}

impl QueryKey {
    pub fn new(parts: Vec<String>) -> Self {
        Self {
            scope: String::new(),
            parts,
        }
    }

    /// Partition the key, e.g. per signed-in session, so one caller never reads another's entry
    pub fn scoped(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    pub fn resource(&self) -> &str {
        self.parts.first().map(String::as_str).unwrap_or("")
    }
}

struct Entry<T> {
    value: T,
    fetched_at: Instant,
}

type Slot<T> = Arc<tokio::sync::Mutex<Option<Entry<T>>>>;

/// Read-through cache with a stale-tolerance window
///
/// A key younger than `stale_time` is served from memory; an older or missing
/// one is fetched. Each key has its own async lock, so concurrent loads of the
/// same key share a single fetch while different keys proceed independently.
/// Failed fetches are not cached.
pub struct QueryCache<T> {
    stale_time: Duration,
    slots: Mutex<HashMap<QueryKey, Slot<T>>>,
}

impl<T: Clone> QueryCache<T> {
    pub fn new(stale_time: Duration) -> Self {
        Self {
            stale_time,
            slots: Mutex::new(HashMap::new()),
        }
    }

    fn slots(&self) -> MutexGuard<'_, HashMap<QueryKey, Slot<T>>> {
        self.slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn slot(&self, key: &QueryKey) -> Slot<T> {
        self.slots().entry(key.clone()).or_default().clone()
    }

    pub async fn get_or_fetch<F, Fut, E>(&self, key: QueryKey, fetch: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let slot = self.slot(&key);
        let mut entry = slot.lock().await;

        if let Some(cached) = entry.as_ref() {
            if cached.fetched_at.elapsed() < self.stale_time {
                tracing::trace!(resource = key.resource(), "query cache hit");
                return Ok(cached.value.clone());
            }
        }

        tracing::trace!(resource = key.resource(), "query cache miss");
        let value = fetch().await?;
        *entry = Some(Entry {
            value: value.clone(),
            fetched_at: Instant::now(),
        });
        drop(entry);

        self.prune();
        Ok(value)
    }

    /// Whether the key holds a value still inside the stale-tolerance window
    pub async fn is_fresh(&self, key: &QueryKey) -> bool {
        let slot = match self.slots().get(key) {
            Some(slot) => slot.clone(),
            None => return false,
        };
        let entry = slot.lock().await;
        entry
            .as_ref()
            .is_some_and(|e| e.fetched_at.elapsed() < self.stale_time)
    }

    /// Drop every entry of a resource, across all scopes
    pub fn invalidate(&self, resource: &str) {
        let mut slots = self.slots();
        let before = slots.len();
        slots.retain(|key, _| key.resource() != resource);
        tracing::debug!(resource, dropped = before - slots.len(), "invalidated cached queries");
    }

    pub fn len(&self) -> usize {
        self.slots().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // Evict idle slots holding a stale value. Empty slots may belong to a
    // caller that has not taken the lock yet, so they stay.
    fn prune(&self) {
        let stale_time = self.stale_time;
        self.slots().retain(|_, slot| match slot.try_lock() {
            Ok(entry) => entry.as_ref().map_or(true, |e| e.fetched_at.elapsed() < stale_time),
            Err(_) => true,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn key(page: &str) -> QueryKey {
        QueryKey::new(vec!["appointments".into(), page.into(), "10".into()])
    }

    async fn counted(calls: &AtomicUsize, value: u32) -> Result<u32, String> {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok(value)
    }

    #[tokio::test(start_paused = true)]
    async fn serves_fresh_entries_and_refetches_after_stale_time() {
        let cache = QueryCache::new(Duration::from_secs(30));
        let calls = AtomicUsize::new(0);

        assert_eq!(cache.get_or_fetch(key("1"), || counted(&calls, 1)).await, Ok(1));
        assert_eq!(cache.get_or_fetch(key("1"), || counted(&calls, 2)).await, Ok(1));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(cache.is_fresh(&key("1")).await);

        tokio::time::advance(Duration::from_secs(31)).await;
        assert!(!cache.is_fresh(&key("1")).await);
        assert_eq!(cache.get_or_fetch(key("1"), || counted(&calls, 3)).await, Ok(3));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn distinct_keys_fetch_separately() {
        let cache = QueryCache::new(Duration::from_secs(30));
        let calls = AtomicUsize::new(0);

        cache.get_or_fetch(key("1"), || counted(&calls, 1)).await.unwrap();
        cache.get_or_fetch(key("2"), || counted(&calls, 2)).await.unwrap();
        cache.get_or_fetch(key("1").scoped("other-session"), || counted(&calls, 3)).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(cache.len(), 3);
    }

    #[tokio::test]
    async fn errors_are_not_cached() {
        let cache: QueryCache<u32> = QueryCache::new(Duration::from_secs(30));

        let failed: Result<u32, String> = cache.get_or_fetch(key("1"), || async { Err("boom".to_string()) }).await;
        assert_eq!(failed, Err("boom".to_string()));

        let ok: Result<u32, String> = cache.get_or_fetch(key("1"), || async { Ok(7) }).await;
        assert_eq!(ok, Ok(7));
    }

    #[tokio::test]
    async fn concurrent_loads_of_one_key_share_a_fetch() {
        let cache = QueryCache::new(Duration::from_secs(30));
        let calls = AtomicUsize::new(0);

        let slow = || {
            let calls = &calls;
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(20)).await;
                Ok::<u32, String>(5)
            }
        };
        let (a, b) = tokio::join!(cache.get_or_fetch(key("1"), slow), cache.get_or_fetch(key("1"), slow));

        assert_eq!((a, b), (Ok(5), Ok(5)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn pruning_keeps_slots_that_are_still_waiting_for_a_value() {
        let cache = QueryCache::new(Duration::from_secs(30));
        let calls = AtomicUsize::new(0);

        // Claimed by a loader that has not locked it yet
        let pending = cache.slot(&key("2"));
        cache.get_or_fetch(key("1"), || counted(&calls, 1)).await.unwrap();
        assert_eq!(cache.len(), 2);

        // The loader's value lands in the registered slot and is served from there
        *pending.lock().await = Some(Entry { value: 2, fetched_at: Instant::now() });
        assert_eq!(cache.get_or_fetch(key("2"), || counted(&calls, 9)).await, Ok(2));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // Stale values are still evicted on the next insert
        tokio::time::advance(Duration::from_secs(31)).await;
        cache.get_or_fetch(key("3"), || counted(&calls, 3)).await.unwrap();
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn invalidate_drops_only_the_named_resource() {
        let cache = QueryCache::new(Duration::from_secs(30));
        let calls = AtomicUsize::new(0);
        let dashboard = QueryKey::new(vec!["dashboard".into()]);

        cache.get_or_fetch(key("1"), || counted(&calls, 1)).await.unwrap();
        cache.get_or_fetch(dashboard.clone(), || counted(&calls, 2)).await.unwrap();

        cache.invalidate("appointments");
        assert!(!cache.is_fresh(&key("1")).await);
        assert!(cache.is_fresh(&dashboard).await);
    }
}
