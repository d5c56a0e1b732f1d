//! Process-wide map of player version tag to descrambling transform.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use super::transform::DescramblingTransform;

/// Transforms keyed by player version tag.
///
/// Entries are added on first derivation and never evicted. When two
/// derivations for the same tag race, the first insert wins and every caller
/// gets that entry back.
#[derive(Default)]
pub struct TransformCache {
    entries: RwLock<HashMap<String, Arc<DescramblingTransform>>>,
}

static SHARED: OnceLock<Arc<TransformCache>> = OnceLock::new();

impl TransformCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cache shared by every decryptor in this process.
    pub fn shared() -> Arc<TransformCache> {
        Arc::clone(SHARED.get_or_init(|| Arc::new(TransformCache::new())))
    }

    pub fn get(&self, tag: &str) -> Option<Arc<DescramblingTransform>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(tag)
            .cloned()
    }

    /// Inserts unless the tag is already present; returns the stored entry.
    pub fn insert(&self, tag: &str, transform: DescramblingTransform) -> Arc<DescramblingTransform> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(
            entries
                .entry(tag.to_string())
                .or_insert_with(|| Arc::new(transform)),
        )
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Sorted copy of all entries (for display and persistence).
    pub fn snapshot(&self) -> BTreeMap<String, DescramblingTransform> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(tag, t)| (tag.clone(), (**t).clone()))
            .collect()
    }

    /// Adds entries from a snapshot without replacing existing tags.
    pub fn extend_from_snapshot(&self, snapshot: BTreeMap<String, DescramblingTransform>) {
        for (tag, transform) in snapshot {
            self.insert(&tag, transform);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decrypt::TransformOp;

    #[test]
    fn first_insert_wins() {
        let cache = TransformCache::new();
        let a = DescramblingTransform::new(vec![TransformOp::Reverse]);
        let b = DescramblingTransform::new(vec![TransformOp::Slice(2)]);
        let stored = cache.insert("v1", a.clone());
        assert_eq!(*stored, a);
        let again = cache.insert("v1", b);
        assert_eq!(*again, a);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("v1").as_deref(), Some(&a));
        assert!(cache.get("v2").is_none());
    }

    #[test]
    fn snapshot_and_extend() {
        let cache = TransformCache::new();
        cache.insert("b", DescramblingTransform::new(vec![TransformOp::Swap(1)]));
        cache.insert("a", DescramblingTransform::new(vec![TransformOp::Reverse]));
        let snap = cache.snapshot();
        assert_eq!(snap.keys().cloned().collect::<Vec<_>>(), vec!["a", "b"]);

        let other = TransformCache::new();
        other.insert("a", DescramblingTransform::new(vec![TransformOp::Slice(9)]));
        other.extend_from_snapshot(snap);
        assert_eq!(other.len(), 2);
        assert_eq!(other.get("a").unwrap().ops(), &[TransformOp::Slice(9)]);

        other.clear();
        assert!(other.is_empty());
    }

    #[test]
    fn shared_is_one_instance() {
        assert!(Arc::ptr_eq(&TransformCache::shared(), &TransformCache::shared()));
    }
}
