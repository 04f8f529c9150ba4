//! Published-snapshot slot. The refresh driver writes, HTTP handlers read.

use std::sync::{Arc, RwLock};

use crate::model::Snapshot;

/// Handle to the most recently published snapshot. Cloning the store is
/// cheap; readers receive an `Arc` to an immutable snapshot.
#[derive(Clone, Default)]
pub struct SnapshotStore {
    inner: Arc<RwLock<Option<Arc<Snapshot>>>>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the published snapshot. A candidate older than the current
    /// one is rejected (returns false) so `generated_at` never moves
    /// backwards for readers; an equal timestamp is last-writer-wins.
    pub fn publish(&self, snapshot: Snapshot) -> bool {
        let mut guard = self.inner.write().expect("poisoned snapshot lock");
        if let Some(current) = guard.as_ref() {
            if snapshot.generated_at < current.generated_at {
                return false;
            }
        }
        *guard = Some(Arc::new(snapshot));
        true
    }

    /// `None` until the first publish.
    pub fn latest(&self) -> Option<Arc<Snapshot>> {
        self.inner.read().expect("poisoned snapshot lock").clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CommodityTable;
    use chrono::{DateTime, Duration, Utc};

    fn snapshot_at(ts: DateTime<Utc>) -> Snapshot {
        Snapshot {
            equities: Vec::new(),
            indices: Vec::new(),
            crypto: Vec::new(),
            fuel: CommodityTable::new(),
            food: CommodityTable::new(),
            news: Vec::new(),
            sentiment: None,
            market_overview: None,
            jobs: Vec::new(),
            alerts: Vec::new(),
            generated_at: ts,
        }
    }

    #[test]
    fn empty_until_first_publish() {
        let store = SnapshotStore::new();
        assert!(store.latest().is_none());
    }

    #[test]
    fn publish_then_read_round_trips() {
        let store = SnapshotStore::new();
        let ts = Utc::now();
        assert!(store.publish(snapshot_at(ts)));
        assert_eq!(store.latest().unwrap().generated_at, ts);
    }

    #[test]
    fn stale_candidates_are_rejected() {
        let store = SnapshotStore::new();
        let now = Utc::now();
        assert!(store.publish(snapshot_at(now)));
        assert!(!store.publish(snapshot_at(now - Duration::seconds(30))));
        assert_eq!(store.latest().unwrap().generated_at, now);

        // Equal timestamp: last writer wins.
        assert!(store.publish(snapshot_at(now)));
    }
}
