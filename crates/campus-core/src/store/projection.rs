// ── Projection ──
//
// Confirmed power per registry device, held in a `watch` channel so every
// mutation is atomic and wakes subscribers. Only remote snapshots mutate
// it; toggle results never do.

use std::sync::Arc;

use campus_api::GroupSnapshot;
use tokio::sync::watch;

use crate::model::ProjectionSnapshot;
use crate::registry::DeviceRegistry;
use crate::stream::ProjectionStream;

pub(crate) struct Projection {
    tx: watch::Sender<Arc<ProjectionSnapshot>>,
}

impl Projection {
    /// Every registry device starts off.
    pub(crate) fn new(registry: &DeviceRegistry) -> Self {
        let (tx, _) = watch::channel(Arc::new(ProjectionSnapshot::from_registry(registry)));
        Self { tx }
    }

    pub(crate) fn snapshot(&self) -> Arc<ProjectionSnapshot> {
        self.tx.borrow().clone()
    }

    pub(crate) fn subscribe(&self) -> ProjectionStream {
        ProjectionStream::new(self.tx.subscribe())
    }

    /// Merge a full-subtree snapshot of `group`. Returns whether any value
    /// changed.
    ///
    /// - an empty snapshot (absent or `null` node) changes nothing;
    /// - registry devices missing from a non-empty snapshot become off;
    /// - device ids outside the registry are ignored.
    pub(crate) fn apply(&self, group: &str, snapshot: &GroupSnapshot) -> bool {
        if snapshot.is_empty() {
            return false;
        }

        self.tx.send_if_modified(|current| {
            let Some(devices) = current.group(group) else {
                return false;
            };
            let updates: Vec<(String, bool)> = devices
                .iter()
                .filter_map(|(device, &power)| {
                    let incoming = snapshot.get(device).is_some_and(|r| r.status.is_on());
                    (incoming != power).then(|| (device.clone(), incoming))
                })
                .collect();
            if updates.is_empty() {
                return false;
            }

            let next = Arc::make_mut(current);
            if let Some(devices) = next.group_mut(group) {
                for (device, power) in updates {
                    devices.insert(device, power);
                }
            }
            true
        })
    }
}
