use dashmap::DashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

pub trait CacheEntry {
    fn fetched_at(&self) -> Instant;
}

/// Drop expired entries, then the oldest ones until at most `max_entries` remain.
pub fn prune_cache<K, V>(cache: &DashMap<K, V>, max_entries: usize, max_age: Duration)
where
    K: Clone + Eq + Hash,
    V: CacheEntry,
{
    let now = Instant::now();
    let mut live: Vec<(K, Instant)> = Vec::with_capacity(cache.len());
    cache.retain(|key, entry| {
        let fetched_at = entry.fetched_at();
        let fresh = now.duration_since(fetched_at) <= max_age;
        if fresh {
            live.push((key.clone(), fetched_at));
        }
        fresh
    });

    if live.len() <= max_entries {
        return;
    }

    live.sort_by_key(|(_, fetched_at)| *fetched_at);
    let excess = live.len() - max_entries;
    for (key, _) in live.into_iter().take(excess) {
        cache.remove(&key);
    }
}
