// ── Pending operation markers ──
//
// Reference-counted per device key so overlapping toggles keep the key
// pending until the last write settles. Markers are released by dropping
// the guard, which also covers cancelled toggle futures.

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::model::DeviceKey;

#[derive(Default, Clone)]
pub(crate) struct PendingMarkers {
    counts: Arc<DashMap<DeviceKey, usize>>,
}

impl PendingMarkers {
    /// Mark `key` in flight until the returned guard is dropped.
    pub(crate) fn mark(&self, key: DeviceKey) -> PendingGuard {
        *self.counts.entry(key.clone()).or_insert(0) += 1;
        PendingGuard {
            counts: Arc::clone(&self.counts),
            key,
        }
    }

    pub(crate) fn is_pending(&self, key: &DeviceKey) -> bool {
        self.counts.contains_key(key)
    }

    /// Keys with at least one write in flight, sorted.
    pub(crate) fn keys(&self) -> Vec<DeviceKey> {
        let mut keys: Vec<DeviceKey> = self.counts.iter().map(|e| e.key().clone()).collect();
        keys.sort();
        keys
    }
}

pub(crate) struct PendingGuard {
    counts: Arc<DashMap<DeviceKey, usize>>,
    key: DeviceKey,
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        if let Entry::Occupied(mut entry) = self.counts.entry(self.key.clone()) {
            let count = entry.get_mut();
            *count = count.saturating_sub(1);
            if *count == 0 {
                entry.remove();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_clears_marker() {
        let markers = PendingMarkers::default();
        let key = DeviceKey::new("D118", "D118-1");

        let guard = markers.mark(key.clone());
        assert!(markers.is_pending(&key));
        drop(guard);
        assert!(!markers.is_pending(&key));
    }

    #[test]
    fn overlapping_marks_are_counted() {
        let markers = PendingMarkers::default();
        let key = DeviceKey::new("D117", "D117-2");

        let first = markers.mark(key.clone());
        let second = markers.mark(key.clone());
        drop(first);
        assert!(markers.is_pending(&key), "second write still in flight");
        drop(second);
        assert!(!markers.is_pending(&key));
    }

    #[test]
    fn keys_are_independent() {
        let markers = PendingMarkers::default();
        let _a = markers.mark(DeviceKey::new("D118", "D118-2"));
        let _b = markers.mark(DeviceKey::new("D117", "D117-1"));
        assert_eq!(
            markers.keys(),
            vec![
                DeviceKey::new("D117", "D117-1"),
                DeviceKey::new("D118", "D118-2"),
            ]
        );
    }
}
