//! Result store
//!
//! Keeps the JSON records of recent extractions keyed by [`ExtractionId`],
//! plus which one was written last. Capacity is bounded; the oldest record
//! is evicted first.

use crate::types::{ExtractionId, ResultRecord};
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Default number of records kept
pub const DEFAULT_CAPACITY: usize = 64;

#[derive(Debug, Default)]
struct Inner {
    records: HashMap<ExtractionId, ResultRecord>,
    order: VecDeque<ExtractionId>,
    latest: Option<ExtractionId>,
}

/// Bounded, lock-guarded map of extraction results
#[derive(Debug)]
pub struct ResultStore {
    inner: Mutex<Inner>,
    capacity: usize,
}

impl ResultStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            capacity: capacity.max(1),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store `record` under `id` and mark it as the latest
    ///
    /// Writing an existing id replaces its record.
    pub fn put(&self, id: ExtractionId, record: ResultRecord) {
        let mut inner = self.lock();
        if inner.records.insert(id, record).is_none() {
            inner.order.push_back(id);
        }
        inner.latest = Some(id);

        while inner.order.len() > self.capacity {
            if let Some(evicted) = inner.order.pop_front() {
                inner.records.remove(&evicted);
                if inner.latest == Some(evicted) {
                    inner.latest = None;
                }
            }
        }
    }

    pub fn get(&self, id: &ExtractionId) -> Option<ResultRecord> {
        self.lock().records.get(id).cloned()
    }

    /// Record written most recently, if still held
    pub fn latest(&self) -> Option<(ExtractionId, ResultRecord)> {
        let inner = self.lock();
        let id = inner.latest?;
        inner.records.get(&id).map(|record| (id, record.clone()))
    }

    pub fn len(&self) -> usize {
        self.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ResultStore {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_store_has_no_latest() {
        let store = ResultStore::default();
        assert!(store.latest().is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_put_and_get() {
        let store = ResultStore::default();
        let id = ExtractionId::new();
        store.put(id, ResultRecord::attempted("p1"));

        assert_eq!(store.get(&id).unwrap().prompt_used, "p1");
        assert_eq!(store.latest().unwrap().0, id);
    }

    #[test]
    fn test_overwrite_same_id() {
        let store = ResultStore::default();
        let id = ExtractionId::new();
        store.put(id, ResultRecord::attempted("first"));
        store.put(id, ResultRecord::attempted("second"));

        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&id).unwrap().prompt_used, "second");
    }

    #[test]
    fn test_latest_tracks_most_recent_write() {
        let store = ResultStore::default();
        let a = ExtractionId::new();
        let b = ExtractionId::new();
        store.put(a, ResultRecord::attempted("a"));
        store.put(b, ResultRecord::attempted("b"));
        assert_eq!(store.latest().unwrap().1.prompt_used, "b");

        // Earlier results stay readable by id
        assert_eq!(store.get(&a).unwrap().prompt_used, "a");
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let store = ResultStore::new(2);
        let ids: Vec<_> = (0..3).map(|_| ExtractionId::new()).collect();
        for (i, id) in ids.iter().enumerate() {
            store.put(*id, ResultRecord::attempted(format!("p{}", i)));
        }

        assert_eq!(store.len(), 2);
        assert!(store.get(&ids[0]).is_none());
        assert!(store.get(&ids[1]).is_some());
        assert_eq!(store.latest().unwrap().0, ids[2]);
    }
}
