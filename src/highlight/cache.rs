//! 色付け結果のキャッシュ
//!
//! キーは行範囲と行内容そのもの。範囲内の編集でキーが自然に変わる。

use std::collections::HashMap;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct CacheKey {
    start: usize,
    end: usize,
    content: String,
}

impl CacheKey {
    /// `lines` は `start..=end` の行
    pub(crate) fn new(start: usize, end: usize, lines: &[String]) -> Self {
        Self {
            start,
            end,
            content: lines.join("\n"),
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    lines: Vec<String>,
    stored_at: Instant,
}

/// 件数上限と有効期限付きのキャッシュ
#[derive(Debug)]
pub(crate) struct HighlightCache {
    entries: HashMap<CacheKey, CacheEntry>,
    capacity: usize,
    freshness: Duration,
    staleness: Duration,
}

impl HighlightCache {
    pub(crate) fn new(capacity: usize, freshness: Duration, staleness: Duration) -> Self {
        Self {
            entries: HashMap::with_capacity(capacity),
            capacity: capacity.max(1),
            freshness,
            staleness,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    /// 鮮度期間内のエントリのみ返す
    pub(crate) fn get(&self, key: &CacheKey, now: Instant) -> Option<Vec<String>> {
        self.entries
            .get(key)
            .filter(|entry| now.saturating_duration_since(entry.stored_at) < self.freshness)
            .map(|entry| entry.lines.clone())
    }

    pub(crate) fn insert(&mut self, key: CacheKey, lines: Vec<String>, now: Instant) {
        if !self.entries.contains_key(&key) && self.entries.len() >= self.capacity {
            self.make_room(now);
        }
        self.entries.insert(
            key,
            CacheEntry {
                lines,
                stored_at: now,
            },
        );
    }

    /// 古いエントリを一掃し、なお満杯なら最古の1件を破棄する
    fn make_room(&mut self, now: Instant) {
        let staleness = self.staleness;
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| now.saturating_duration_since(entry.stored_at) <= staleness);
        let purged = before - self.entries.len();
        if purged > 0 {
            log::debug!("highlight cache purged {} stale entries", purged);
        }

        if self.entries.len() >= self.capacity {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.stored_at)
                .map(|(key, _)| key.clone());
            if let Some(key) = oldest {
                self.entries.remove(&key);
                log::debug!("highlight cache evicted oldest entry");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(n: usize) -> CacheKey {
        CacheKey::new(n, n, &[format!("line {}", n)])
    }

    fn cache(capacity: usize) -> HighlightCache {
        HighlightCache::new(capacity, Duration::from_secs(5), Duration::from_secs(30))
    }

    #[test]
    fn test_freshness_window() {
        let mut cache = cache(4);
        let t0 = Instant::now();
        cache.insert(key(0), vec!["x".into()], t0);

        assert!(cache.get(&key(0), t0 + Duration::from_secs(4)).is_some());
        assert!(cache.get(&key(0), t0 + Duration::from_secs(5)).is_none());
    }

    #[test]
    fn test_key_includes_content() {
        let a = CacheKey::new(0, 1, &["a".to_string(), "b".to_string()]);
        let b = CacheKey::new(0, 1, &["a".to_string(), "c".to_string()]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_purges_stale_before_evicting() {
        let mut cache = cache(3);
        let t0 = Instant::now();
        cache.insert(key(0), vec![], t0);
        cache.insert(key(1), vec![], t0);
        cache.insert(key(2), vec![], t0 + Duration::from_secs(20));

        let later = t0 + Duration::from_secs(40);
        cache.insert(key(3), vec![], later);

        assert_eq!(cache.len(), 2);
        assert!(cache.get(&key(2), later).is_none()); // 鮮度切れだが保持されている
        assert!(cache.entries.contains_key(&key(2)));
        assert!(!cache.entries.contains_key(&key(0)));
    }

    #[test]
    fn test_evicts_single_oldest_when_nothing_stale() {
        let mut cache = cache(3);
        let t0 = Instant::now();
        for n in 0..3 {
            cache.insert(key(n), vec![], t0 + Duration::from_millis(n as u64));
        }
        cache.insert(key(9), vec![], t0 + Duration::from_secs(1));

        assert_eq!(cache.len(), 3);
        assert!(!cache.entries.contains_key(&key(0)));
        assert!(cache.entries.contains_key(&key(1)));
    }

    #[test]
    fn test_overwrite_does_not_evict() {
        let mut cache = cache(2);
        let t0 = Instant::now();
        cache.insert(key(0), vec![], t0);
        cache.insert(key(1), vec![], t0);
        cache.insert(key(1), vec!["new".into()], t0);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&key(1), t0), Some(vec!["new".to_string()]));
    }
}
