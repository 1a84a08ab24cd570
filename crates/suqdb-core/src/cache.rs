//! In-memory aggregation cache.
//!
//! One partition per source, holding the latest successful batch from that
//! source. Partition replacement is atomic behind a `RwLock`, so a reader
//! may see a mix of old and freshly updated partitions during a cycle but
//! never a partially written one. The cache is an explicit value handed to
//! the orchestrator and the read API, not ambient global state.

use std::sync::RwLock;

use chrono::{DateTime, Utc};

use crate::deals::Deal;

/// Process-local store of the most recent successful batch per source.
#[derive(Debug, Default)]
pub struct DealsCache {
    inner: RwLock<CacheInner>,
}

#[derive(Debug, Default)]
struct CacheInner {
    /// Partitions in insertion order; order across sources carries no
    /// contractual meaning but keeps merged reads deterministic.
    partitions: Vec<Partition>,
    last_updated: Option<DateTime<Utc>>,
}

#[derive(Debug)]
struct Partition {
    source: String,
    deals: Vec<Deal>,
}

impl DealsCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the partition for `source` (creating it on first write) and
    /// stamps the global last-updated time.
    pub fn set(&self, source: &str, deals: Vec<Deal>) {
        let mut inner = self.write_lock();
        match inner.partitions.iter_mut().find(|p| p.source == source) {
            Some(partition) => partition.deals = deals,
            None => inner.partitions.push(Partition {
                source: source.to_string(),
                deals,
            }),
        }
        inner.last_updated = Some(Utc::now());
    }

    /// Returns the latest batch for `source`, or an empty vec if the source
    /// has never completed successfully.
    #[must_use]
    pub fn get(&self, source: &str) -> Vec<Deal> {
        self.read_lock()
            .partitions
            .iter()
            .find(|p| p.source == source)
            .map(|p| p.deals.clone())
            .unwrap_or_default()
    }

    /// Concatenation of all partitions in partition-insertion order.
    #[must_use]
    pub fn all_deals(&self) -> Vec<Deal> {
        self.read_lock()
            .partitions
            .iter()
            .flat_map(|p| p.deals.iter().cloned())
            .collect()
    }

    /// Distinct store display names across all cached deals, first-seen
    /// order.
    #[must_use]
    pub fn stores(&self) -> Vec<String> {
        let inner = self.read_lock();
        let mut stores: Vec<String> = Vec::new();
        for partition in &inner.partitions {
            for deal in &partition.deals {
                if !stores.contains(&deal.store) {
                    stores.push(deal.store.clone());
                }
            }
        }
        stores
    }

    /// Time of the most recent successful write to any partition.
    #[must_use]
    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.read_lock().last_updated
    }

    /// Drops all partitions and the last-updated stamp.
    pub fn clear(&self) {
        let mut inner = self.write_lock();
        inner.partitions.clear();
        inner.last_updated = None;
    }

    // Lock poisoning only occurs if a writer panicked mid-operation; every
    // write here replaces a whole partition, so the data is still coherent
    // and we recover the guard instead of propagating the panic.
    fn read_lock(&self) -> std::sync::RwLockReadGuard<'_, CacheInner> {
        self.inner.read().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn write_lock(&self) -> std::sync::RwLockWriteGuard<'_, CacheInner> {
        self.inner.write().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::Category;

    fn make_deal(id: &str, store: &str, source: &str) -> Deal {
        Deal {
            id: id.to_string(),
            title: format!("Deal {id}"),
            original_price: 2.0,
            discounted_price: 1.0,
            discount: 50,
            store: store.to_string(),
            category: Category::Groceries,
            location: "Bahrain".to_string(),
            image: String::new(),
            expiry_date: None,
            stock: "Available".to_string(),
            is_yellow_sticker: false,
            source: source.to_string(),
        }
    }

    #[test]
    fn get_unknown_source_returns_empty() {
        let cache = DealsCache::new();
        assert!(cache.get("lulu").is_empty());
        assert!(cache.last_updated().is_none());
    }

    #[test]
    fn set_replaces_only_that_partition() {
        let cache = DealsCache::new();
        cache.set("lulu", vec![make_deal("a", "Lulu Hypermarket", "lulu")]);
        cache.set("alosra", vec![make_deal("b", "Alosra", "alosra")]);

        cache.set("lulu", vec![make_deal("c", "Lulu Hypermarket", "lulu")]);

        assert_eq!(cache.get("lulu").len(), 1);
        assert_eq!(cache.get("lulu")[0].id, "c");
        assert_eq!(cache.get("alosra")[0].id, "b");
    }

    #[test]
    fn failed_cycle_leaves_previous_partition_intact() {
        let cache = DealsCache::new();
        cache.set("lulu", vec![make_deal("a", "Lulu Hypermarket", "lulu")]);
        cache.set("alosra", vec![make_deal("b", "Alosra", "alosra")]);

        // Cycle N: lulu's adapter fails, so the orchestrator never calls
        // set for it; alosra refreshes.
        cache.set("alosra", vec![make_deal("b2", "Alosra", "alosra")]);

        let all = cache.all_deals();
        assert_eq!(all.len(), 2);
        assert!(all.iter().any(|d| d.id == "a"), "lulu data from cycle N-1 kept");
        assert!(all.iter().any(|d| d.id == "b2"), "alosra data refreshed");
    }

    #[test]
    fn all_deals_preserves_partition_insertion_order() {
        let cache = DealsCache::new();
        cache.set("lulu", vec![make_deal("a", "Lulu Hypermarket", "lulu")]);
        cache.set("alosra", vec![make_deal("b", "Alosra", "alosra")]);
        // Re-writing an existing partition must not move it to the back.
        cache.set("lulu", vec![make_deal("a2", "Lulu Hypermarket", "lulu")]);

        let ids: Vec<_> = cache.all_deals().into_iter().map(|d| d.id).collect();
        assert_eq!(ids, vec!["a2", "b"]);
    }

    #[test]
    fn stores_are_distinct_in_first_seen_order() {
        let cache = DealsCache::new();
        cache.set(
            "lulu",
            vec![
                make_deal("a", "Lulu Hypermarket", "lulu"),
                make_deal("b", "Lulu Hypermarket", "lulu"),
            ],
        );
        cache.set("alosra", vec![make_deal("c", "Alosra", "alosra")]);

        assert_eq!(cache.stores(), vec!["Lulu Hypermarket", "Alosra"]);
    }

    #[test]
    fn set_stamps_last_updated() {
        let cache = DealsCache::new();
        cache.set("lulu", vec![]);
        assert!(cache.last_updated().is_some());
    }

    #[test]
    fn clear_resets_everything() {
        let cache = DealsCache::new();
        cache.set("lulu", vec![make_deal("a", "Lulu Hypermarket", "lulu")]);
        cache.clear();
        assert!(cache.all_deals().is_empty());
        assert!(cache.last_updated().is_none());
    }
}
