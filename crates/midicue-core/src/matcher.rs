//! Memoized first-match lookup over a [`RuleTable`].

use crate::event::EventKey;
use crate::rules::{Rule, RuleTable};
use lru::LruCache;
use std::num::NonZeroUsize;

pub const DEFAULT_CACHE_CAPACITY: usize = 128;

/// Caches the outcome of a scan (hit position or miss) per [`EventKey`].
///
/// Entries are only valid for the table generation they were computed
/// against; a lookup on another generation clears the cache first.
pub struct Matcher {
    cache: LruCache<EventKey, Option<usize>>,
    generation: Option<u64>,
    scans: u64,
}

impl Matcher {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: LruCache::new(capacity),
            generation: None,
            scans: 0,
        }
    }

    pub fn lookup<'t, A>(&mut self, table: &'t RuleTable<A>, key: EventKey) -> Option<&'t Rule<A>> {
        if self.generation != Some(table.generation()) {
            self.cache.clear();
            self.generation = Some(table.generation());
        }

        let position = match self.cache.get(&key) {
            Some(cached) => *cached,
            None => {
                self.scans += 1;
                let found = table.scan(&key);
                self.cache.put(key, found);
                found
            }
        };

        position.and_then(|p| table.get(key.status, p))
    }

    /// Number of uncached scans performed so far.
    pub fn scans(&self) -> u64 {
        self.scans
    }

    pub fn cached(&self) -> usize {
        self.cache.len()
    }

    pub fn clear(&mut self) {
        self.cache.clear();
        self.generation = None;
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{DataSelector, Selector};

    fn key(data1: u8) -> EventKey {
        EventKey {
            status: 0xB0,
            channel: Some(16),
            data1: Some(data1),
            data2: Some(0),
        }
    }

    fn table() -> RuleTable<&'static str> {
        RuleTable::new(vec![
            Rule::new("a", Selector::new(0xB0).data(DataSelector::Exact(1)), "a"),
            Rule::new("b", Selector::new(0xB0).data(DataSelector::Exact(2)), "b"),
        ])
    }

    #[test]
    fn test_repeated_lookup_scans_once() {
        let table = table();
        let mut matcher = Matcher::default();

        let first = matcher.lookup(&table, key(2)).map(|r| r.action);
        let second = matcher.lookup(&table, key(2)).map(|r| r.action);
        assert_eq!(first, Some("b"));
        assert_eq!(second, Some("b"));
        assert_eq!(matcher.scans(), 1);
    }

    #[test]
    fn test_misses_are_cached() {
        let table = table();
        let mut matcher = Matcher::default();
        assert!(matcher.lookup(&table, key(9)).is_none());
        assert!(matcher.lookup(&table, key(9)).is_none());
        assert_eq!(matcher.scans(), 1);
        assert_eq!(matcher.cached(), 1);
    }

    #[test]
    fn test_new_generation_invalidates() {
        let old = table();
        let mut matcher = Matcher::default();
        assert!(matcher.lookup(&old, key(3)).is_none());

        let new = RuleTable::new(vec![Rule::new("c", Selector::new(0xB0), "c")]);
        assert_eq!(matcher.lookup(&new, key(3)).map(|r| r.action), Some("c"));
        assert_eq!(matcher.scans(), 2);
    }

    #[test]
    fn test_capacity_bounds_cache() {
        let table = table();
        let mut matcher = Matcher::new(2);
        for d in 0..10 {
            matcher.lookup(&table, key(d));
        }
        assert_eq!(matcher.cached(), 2);

        let mut zero = Matcher::new(0);
        zero.lookup(&table, key(1));
        assert_eq!(zero.cached(), 1);
    }
}
