//! Latest update per worker, last write wins.

use bytes::Bytes;
use dashmap::DashMap;

#[derive(Debug, Default)]
pub struct UpdateCollector {
    updates: DashMap<String, Bytes>,
}

impl UpdateCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `update` for `worker_id`, returning the blob it replaced.
    /// Admission is checked by the caller.
    pub fn store(&self, worker_id: &str, update: Bytes) -> Option<Bytes> {
        self.updates.insert(worker_id.to_string(), update)
    }

    pub fn get(&self, worker_id: &str) -> Option<Bytes> {
        self.updates.get(worker_id).map(|entry| entry.value().clone())
    }

    pub fn contains(&self, worker_id: &str) -> bool {
        self.updates.contains_key(worker_id)
    }

    pub fn len(&self) -> usize {
        self.updates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }

    pub fn snapshot_ids(&self) -> Vec<String> {
        self.updates.iter().map(|entry| entry.key().clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_store_overwrites() {
        let collector = UpdateCollector::new();
        assert_eq!(collector.store("w1", Bytes::from_static(b"first")), None);
        assert_eq!(
            collector.store("w1", Bytes::from_static(b"second")),
            Some(Bytes::from_static(b"first"))
        );
        assert_eq!(collector.get("w1"), Some(Bytes::from_static(b"second")));
        assert_eq!(collector.len(), 1);
    }

    #[test]
    fn test_snapshot_ids() {
        let collector = UpdateCollector::new();
        collector.store("a", Bytes::new());
        collector.store("b", Bytes::new());
        let mut ids = collector.snapshot_ids();
        ids.sort();
        assert_eq!(ids, vec!["a", "b"]);
        assert!(!collector.contains("c"));
    }
}
