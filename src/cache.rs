//! Time-boxed snapshot cache for route and interface tables
//!
//! Each cached resource kind owns one `Cache`: the last successful snapshot,
//! its capture time, a TTL, and a fetch gate that keeps at most one fetch in
//! flight. Readers either get a fresh snapshot without I/O, wait for the
//! in-flight fetch, or trigger one themselves.
//!
//! On a failed refresh the previous snapshot keeps being served, downgraded
//! to a warning; the failure is only fatal when there is nothing to fall
//! back on.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Immutable, timestamped capture of a record set.
///
/// Snapshots are replaced wholesale: records are never mutated in place, and
/// consumers share the snapshot through an `Arc` so installation is atomic
/// from their point of view.
#[derive(Debug)]
pub struct Snapshot<T> {
    pub records: Vec<T>,
    pub captured_at: Instant,
}

impl<T> Snapshot<T> {
    pub fn age(&self) -> Duration {
        self.captured_at.elapsed()
    }
}

/// A successful cache read: the snapshot plus an optional staleness warning.
#[derive(Debug)]
pub struct CacheRead<T> {
    pub snapshot: Arc<Snapshot<T>>,
    /// Present when the latest refresh failed and older data is being served.
    pub warning: Option<String>,
}

struct Entry<T> {
    snapshot: Option<Arc<Snapshot<T>>>,
    invalidated: bool,
}

pub struct Cache<T> {
    ttl: Duration,
    entry: Mutex<Entry<T>>,
    fetch_gate: tokio::sync::Mutex<()>,
}

impl<T> Cache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entry: Mutex::new(Entry {
                snapshot: None,
                invalidated: false,
            }),
            fetch_gate: tokio::sync::Mutex::new(()),
        }
    }

    /// Return the held snapshot when it is still within its TTL.
    fn fresh_snapshot(&self) -> Option<Arc<Snapshot<T>>> {
        let entry = self.entry.lock().expect("cache lock poisoned");
        if entry.invalidated {
            return None;
        }
        entry
            .snapshot
            .as_ref()
            .filter(|s| s.age() < self.ttl)
            .cloned()
    }

    /// Serve from cache or run `fetch` to refresh.
    ///
    /// `force` bypasses the freshness check. The fetch gate guarantees at
    /// most one fetch in flight: a caller arriving during a fetch waits for
    /// it, then re-checks freshness instead of fetching again (unless it
    /// forced the refresh itself).
    pub async fn get_with<F, Fut, E>(&self, force: bool, fetch: F) -> Result<CacheRead<T>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<T>, E>>,
        E: std::fmt::Display,
    {
        if !force {
            if let Some(snapshot) = self.fresh_snapshot() {
                debug!("Cache hit ({} records, age {:?})", snapshot.records.len(), snapshot.age());
                return Ok(CacheRead {
                    snapshot,
                    warning: None,
                });
            }
        }

        let _fetching = self.fetch_gate.lock().await;

        // Another caller may have refreshed while we waited on the gate.
        if !force {
            if let Some(snapshot) = self.fresh_snapshot() {
                return Ok(CacheRead {
                    snapshot,
                    warning: None,
                });
            }
        }

        match fetch().await {
            Ok(records) => {
                let snapshot = Arc::new(Snapshot {
                    records,
                    captured_at: Instant::now(),
                });
                let mut entry = self.entry.lock().expect("cache lock poisoned");
                entry.snapshot = Some(Arc::clone(&snapshot));
                entry.invalidated = false;
                Ok(CacheRead {
                    snapshot,
                    warning: None,
                })
            }
            Err(err) => {
                let entry = self.entry.lock().expect("cache lock poisoned");
                match &entry.snapshot {
                    Some(snapshot) => {
                        warn!("Refresh failed, serving previous snapshot: {}", err);
                        let warning = format!(
                            "refresh failed ({}); showing data captured {}s ago",
                            err,
                            snapshot.age().as_secs()
                        );
                        Ok(CacheRead {
                            snapshot: Arc::clone(snapshot),
                            warning: Some(warning),
                        })
                    }
                    None => Err(err),
                }
            }
        }
    }

    /// Force the next `get_with` to refetch regardless of snapshot age.
    ///
    /// Used after a successful mutation; the held snapshot stays available
    /// as a stale fallback should that refetch fail.
    pub fn invalidate(&self) {
        self.entry.lock().expect("cache lock poisoned").invalidated = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counted_fetch(
        counter: Arc<AtomicUsize>,
    ) -> impl Future<Output = Result<Vec<u32>, String>> {
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(vec![1, 2, 3])
        }
    }

    #[tokio::test]
    async fn test_second_get_within_ttl_is_a_hit() {
        let cache: Cache<u32> = Cache::new(Duration::from_secs(60));
        let fetches = Arc::new(AtomicUsize::new(0));

        let first = cache
            .get_with(false, || counted_fetch(Arc::clone(&fetches)))
            .await
            .unwrap();
        let second = cache
            .get_with(false, || counted_fetch(Arc::clone(&fetches)))
            .await
            .unwrap();

        assert_eq!(fetches.load(Ordering::SeqCst), 1);
        assert_eq!(first.snapshot.records, second.snapshot.records);
        assert!(second.warning.is_none());
    }

    #[tokio::test]
    async fn test_force_always_fetches() {
        let cache: Cache<u32> = Cache::new(Duration::from_secs(60));
        let fetches = Arc::new(AtomicUsize::new(0));

        cache
            .get_with(false, || counted_fetch(Arc::clone(&fetches)))
            .await
            .unwrap();
        cache
            .get_with(true, || counted_fetch(Arc::clone(&fetches)))
            .await
            .unwrap();

        assert_eq!(fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_expired_snapshot_refetches() {
        let cache: Cache<u32> = Cache::new(Duration::from_millis(40));
        let fetches = Arc::new(AtomicUsize::new(0));

        cache
            .get_with(false, || counted_fetch(Arc::clone(&fetches)))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(80)).await;
        cache
            .get_with(false, || counted_fetch(Arc::clone(&fetches)))
            .await
            .unwrap();

        assert_eq!(fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_invalidate_bypasses_freshness() {
        let cache: Cache<u32> = Cache::new(Duration::from_secs(60));
        let fetches = Arc::new(AtomicUsize::new(0));

        cache
            .get_with(false, || counted_fetch(Arc::clone(&fetches)))
            .await
            .unwrap();
        cache.invalidate();
        cache
            .get_with(false, || counted_fetch(Arc::clone(&fetches)))
            .await
            .unwrap();

        assert_eq!(fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failed_fetch_without_snapshot_is_fatal() {
        let cache: Cache<u32> = Cache::new(Duration::from_secs(60));

        let result = cache
            .get_with(false, || async { Err::<Vec<u32>, _>("boom".to_string()) })
            .await;

        assert_eq!(result.unwrap_err(), "boom");
    }

    #[tokio::test]
    async fn test_failed_refresh_serves_stale_with_warning() {
        let cache: Cache<u32> = Cache::new(Duration::from_secs(60));
        let fetches = Arc::new(AtomicUsize::new(0));

        cache
            .get_with(false, || counted_fetch(Arc::clone(&fetches)))
            .await
            .unwrap();

        let read = cache
            .get_with(true, || async { Err::<Vec<u32>, _>("tool exploded".to_string()) })
            .await
            .unwrap();

        assert_eq!(read.snapshot.records, vec![1, 2, 3]);
        let warning = read.warning.expect("stale read should warn");
        assert!(warning.contains("tool exploded"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_gets_fetch_once() {
        let cache: Arc<Cache<u32>> = Arc::new(Cache::new(Duration::from_secs(60)));
        let fetches = Arc::new(AtomicUsize::new(0));

        let slow_cache = Arc::clone(&cache);
        let slow_fetches = Arc::clone(&fetches);
        let slow = tokio::spawn(async move {
            slow_cache
                .get_with(false, || async move {
                    slow_fetches.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(120)).await;
                    Ok::<_, String>(vec![7])
                })
                .await
                .unwrap()
        });

        // Wait until the slow fetch is definitely holding the gate.
        while fetches.load(Ordering::SeqCst) == 0 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        let waiting = cache
            .get_with(false, || counted_fetch(Arc::clone(&fetches)))
            .await
            .unwrap();

        let slow = slow.await.unwrap();
        assert_eq!(fetches.load(Ordering::SeqCst), 1);
        assert_eq!(slow.snapshot.records, vec![7]);
        assert_eq!(waiting.snapshot.records, vec![7]);
    }
}
