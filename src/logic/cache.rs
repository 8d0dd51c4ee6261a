//! Classification Cache
//!
//! Module id → final side for the current run. The first write for an id
//! wins; later writes are ignored.

use std::collections::{BTreeMap, HashMap};

use parking_lot::RwLock;

use crate::logic::evidence::Side;

#[derive(Debug, Default)]
pub struct ClassificationCache {
    inner: RwLock<HashMap<String, Side>>,
}

impl ClassificationCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, mod_id: &str) -> Option<Side> {
        self.inner.read().get(mod_id).copied()
    }

    /// Returns the side now stored for the id
    pub fn insert_if_absent(&self, mod_id: &str, side: Side) -> Side {
        *self.inner.write().entry(mod_id.to_string()).or_insert(side)
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Sorted copy for reporting
    pub fn snapshot(&self) -> BTreeMap<String, Side> {
        self.inner.read().iter().map(|(k, v)| (k.clone(), *v)).collect()
    }

    pub fn distribution(&self) -> BTreeMap<Side, usize> {
        let mut counts = BTreeMap::new();
        for side in self.inner.read().values() {
            *counts.entry(*side).or_insert(0) += 1;
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_write_wins() {
        let cache = ClassificationCache::new();
        assert_eq!(cache.insert_if_absent("jei", Side::ClientOnly), Side::ClientOnly);
        assert_eq!(cache.insert_if_absent("jei", Side::ServerOnly), Side::ClientOnly);
        assert_eq!(cache.get("jei"), Some(Side::ClientOnly));
        assert_eq!(cache.get("other"), None);
    }

    #[test]
    fn test_distribution() {
        let cache = ClassificationCache::new();
        cache.insert_if_absent("a", Side::Universal);
        cache.insert_if_absent("b", Side::Universal);
        cache.insert_if_absent("c", Side::ServerOnly);
        let dist = cache.distribution();
        assert_eq!(dist.get(&Side::Universal), Some(&2));
        assert_eq!(dist.get(&Side::ServerOnly), Some(&1));
        assert_eq!(cache.snapshot().keys().cloned().collect::<Vec<_>>(), vec!["a", "b", "c"]);
    }
}
