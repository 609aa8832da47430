// ── Device state synchronizer ──
//
// Owns the projection of confirmed device power and the pending markers,
// mediates every toggle against the realtime store, and derives the
// connection state from group subscriptions.

use std::sync::Arc;

use campus_api::{DeviceRecord, GroupSnapshot, RealtimeStore, Subscription, SubscriptionEvent};
use dashmap::DashMap;
use futures_util::future::join_all;
use tokio::sync::{broadcast, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::aggregate;
use crate::config::{ReconnectPolicy, SyncConfig};
use crate::error::CoreError;
use crate::model::{
    ConnectionState, DeviceKey, DeviceToggle, GroupSummary, ProjectionSnapshot,
    SubscriptionState, SyncEvent, ToggleFailure, ToggleResult,
};
use crate::registry::DeviceRegistry;
use crate::store::{PendingMarkers, Projection};
use crate::stream::ProjectionStream;

const EVENT_CHANNEL_SIZE: usize = 256;

// ── Synchronizer ─────────────────────────────────────────────────

/// Keeps a local projection of AC power in step with the realtime store.
///
/// Cheaply cloneable via `Arc`. Subscription tasks hold a clone, so call
/// [`stop()`](Self::stop) when done; dropping the last handle alone does
/// not end them.
///
/// Toggles never mutate the projection: a toggle writes the desired state,
/// and the new power shows up when the store echoes it back through the
/// group subscription.
pub struct Synchronizer<S: RealtimeStore> {
    inner: Arc<SyncInner<S>>,
}

impl<S: RealtimeStore> Clone for Synchronizer<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct SyncInner<S> {
    store: S,
    registry: DeviceRegistry,
    config: SyncConfig,
    projection: Projection,
    pending: PendingMarkers,
    connection_state: watch::Sender<ConnectionState>,
    subscriptions: DashMap<String, GroupSlot>,
    event_tx: broadcast::Sender<SyncEvent>,
}

/// Per-group subscription bookkeeping. `generation` changes on every
/// `start()` / `stop()` so events from a superseded task are ignored.
struct GroupSlot {
    state: SubscriptionState,
    generation: u64,
    cancel: Option<CancellationToken>,
}

impl<S: RealtimeStore> Synchronizer<S> {
    /// Create a synchronizer over `store`. Does NOT subscribe; call
    /// [`start()`](Self::start).
    pub fn new(store: S, registry: DeviceRegistry, config: SyncConfig) -> Self {
        let projection = Projection::new(&registry);
        let (connection_state, _) = watch::channel(ConnectionState::Disconnected);
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_SIZE);
        let subscriptions = registry
            .groups()
            .map(|group| {
                (
                    group.to_owned(),
                    GroupSlot {
                        state: SubscriptionState::Idle,
                        generation: 0,
                        cancel: None,
                    },
                )
            })
            .collect();

        Self {
            inner: Arc::new(SyncInner {
                store,
                registry,
                config,
                projection,
                pending: PendingMarkers::default(),
                connection_state,
                subscriptions,
                event_tx,
            }),
        }
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Subscribe every registry group.
    ///
    /// Idempotent: groups already `Subscribing` or `Live` are skipped.
    /// `Idle` and `Failed` groups are (re)subscribed. Must be called from
    /// within a tokio runtime.
    pub fn start(&self) {
        let mut started = Vec::new();

        for group in self.inner.registry.groups() {
            let Some(mut slot) = self.inner.subscriptions.get_mut(group) else {
                continue;
            };
            if slot.state.is_active() {
                debug!(group, state = %slot.state, "already subscribed, skipping");
                continue;
            }

            let cancel = CancellationToken::new();
            if let Some(previous) = slot.cancel.replace(cancel.clone()) {
                previous.cancel();
            }
            slot.generation += 1;
            slot.state = SubscriptionState::Subscribing;
            started.push((group.to_owned(), slot.generation, cancel));
        }

        if started.is_empty() {
            return;
        }

        self.inner
            .connection_state
            .send_replace(ConnectionState::Connecting);

        for (group, generation, cancel) in started {
            info!(group, "subscribing");
            let subscription = self.inner.store.subscribe(&group);
            tokio::spawn(subscription_task(
                self.clone(),
                group,
                generation,
                subscription,
                cancel,
            ));
        }
    }

    /// Unsubscribe every group. The projection keeps its last values.
    pub fn stop(&self) {
        for mut slot in self.inner.subscriptions.iter_mut() {
            slot.generation += 1;
            slot.state = SubscriptionState::Idle;
            if let Some(cancel) = slot.cancel.take() {
                cancel.cancel();
            }
        }
        self.inner
            .connection_state
            .send_replace(ConnectionState::Disconnected);
        info!("synchronizer stopped");
    }

    /// Wait until every group is `Live`.
    ///
    /// Fails with `SubscriptionError` as soon as any group is `Failed` or
    /// `Idle` (not started). Callers bound the wait with a timeout.
    pub async fn ready(&self) -> Result<(), CoreError> {
        let mut events = self.inner.event_tx.subscribe();
        loop {
            let mut all_live = true;
            for entry in self.inner.subscriptions.iter() {
                match entry.state {
                    SubscriptionState::Live => {}
                    SubscriptionState::Subscribing => all_live = false,
                    state @ (SubscriptionState::Failed | SubscriptionState::Idle) => {
                        return Err(CoreError::SubscriptionError {
                            group: entry.key().clone(),
                            message: format!("subscription is {state}"),
                        });
                    }
                }
            }
            if all_live {
                return Ok(());
            }

            match events.recv().await {
                Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => {}
                Err(broadcast::error::RecvError::Closed) => {
                    return Err(CoreError::Internal("synchronizer dropped".into()));
                }
            }
        }
    }

    // ── Toggles ──────────────────────────────────────────────────────

    /// Write the desired power of one device.
    ///
    /// Fails with `UnknownDevice` before any I/O if the device is not in
    /// the registry. Write failures and timeouts are reported in the
    /// returned [`ToggleResult`]; nothing is retried.
    pub async fn toggle(
        &self,
        group: &str,
        device: &str,
        on: bool,
    ) -> Result<ToggleResult, CoreError> {
        if !self.inner.registry.contains(group, device) {
            return Err(CoreError::UnknownDevice {
                group: group.to_owned(),
                device: device.to_owned(),
            });
        }
        Ok(self.write_device(DeviceKey::new(group, device), on).await)
    }

    /// Write the desired power of every device in `group` concurrently.
    ///
    /// Waits for every write to settle; one failure does not affect the
    /// others. Results are in registry order.
    pub async fn toggle_group(
        &self,
        group: &str,
        on: bool,
    ) -> Result<Vec<DeviceToggle>, CoreError> {
        let devices = self.inner.registry.devices_of(group)?;
        info!(group, on, devices = devices.len(), "toggling group");

        let writes = devices.iter().map(|device| async move {
            let result = self
                .write_device(DeviceKey::new(group, device.as_str()), on)
                .await;
            DeviceToggle {
                device: device.clone(),
                result,
            }
        });
        Ok(join_all(writes).await)
    }

    /// Toggle a device to the opposite of its projected power.
    pub async fn flip(&self, group: &str, device: &str) -> Result<ToggleResult, CoreError> {
        let current = self
            .inner
            .projection
            .snapshot()
            .power(group, device)
            .ok_or_else(|| CoreError::UnknownDevice {
                group: group.to_owned(),
                device: device.to_owned(),
            })?;
        self.toggle(group, device, !current).await
    }

    async fn write_device(&self, key: DeviceKey, on: bool) -> ToggleResult {
        let guard = self.inner.pending.mark(key.clone());
        let timeout = self.inner.config.write_timeout;
        let value = DeviceRecord::new(on).to_value();
        debug!(device = %key, on, "writing device state");

        let path = key.path();
        let write = self.inner.store.write(&path, value);
        let result = match tokio::time::timeout(timeout, write).await {
            Ok(Ok(())) => ToggleResult::Ok,
            Ok(Err(e)) => {
                warn!(device = %key, error = %e, "toggle write failed");
                ToggleResult::Failed(ToggleFailure::WriteFailed {
                    reason: e.to_string(),
                })
            }
            Err(_) => {
                warn!(device = %key, ?timeout, "toggle write timed out");
                ToggleResult::Failed(ToggleFailure::Timeout { after: timeout })
            }
        };
        drop(guard);

        let _ = self.inner.event_tx.send(SyncEvent::ToggleSettled {
            key,
            desired: on,
            result: result.clone(),
        });
        result
    }

    // ── Observation ──────────────────────────────────────────────────

    pub fn registry(&self) -> &DeviceRegistry {
        &self.inner.registry
    }

    /// Whether a toggle write for the device is in flight.
    pub fn is_pending(&self, group: &str, device: &str) -> bool {
        self.inner.pending.is_pending(&DeviceKey::new(group, device))
    }

    /// Every device with a write in flight.
    pub fn pending(&self) -> Vec<DeviceKey> {
        self.inner.pending.keys()
    }

    /// Point-in-time copy of the projection. No I/O.
    pub fn projection_snapshot(&self) -> Arc<ProjectionSnapshot> {
        self.inner.projection.snapshot()
    }

    /// Stream of projection snapshots, one per change.
    pub fn watch_projection(&self) -> ProjectionStream {
        self.inner.projection.subscribe()
    }

    /// Per-group rows of the current projection.
    pub fn summary(&self) -> Vec<GroupSummary> {
        aggregate::summarize(&self.projection_snapshot())
    }

    pub fn connection_state(&self) -> ConnectionState {
        *self.inner.connection_state.borrow()
    }

    /// Subscribe to connection state changes.
    pub fn watch_connection(&self) -> watch::Receiver<ConnectionState> {
        self.inner.connection_state.subscribe()
    }

    /// Subscription state of `group`, `None` if it is not in the registry.
    pub fn subscription_state(&self, group: &str) -> Option<SubscriptionState> {
        self.inner.subscriptions.get(group).map(|slot| slot.state)
    }

    /// Subscribe to synchronizer events.
    pub fn events(&self) -> broadcast::Receiver<SyncEvent> {
        self.inner.event_tx.subscribe()
    }

    // ── Subscription callbacks ───────────────────────────────────────

    // Each callback holds the group's slot until the connection state is
    // published. `stop()` takes every slot, so it either supersedes the
    // generation first or publishes `Disconnected` after us.

    fn apply_snapshot(&self, group: &str, generation: u64, snapshot: &GroupSnapshot) {
        let Some(mut slot) = self.inner.subscriptions.get_mut(group) else {
            return;
        };
        if slot.generation != generation {
            return;
        }
        slot.state = SubscriptionState::Live;

        let changed = self.inner.projection.apply(group, snapshot);
        self.inner.connection_state.send_if_modified(|state| {
            if *state == ConnectionState::Connected {
                return false;
            }
            *state = ConnectionState::Connected;
            true
        });
        drop(slot);
        debug!(group, changed, records = snapshot.len(), "snapshot applied");

        let _ = self.inner.event_tx.send(SyncEvent::SnapshotApplied {
            group: group.to_owned(),
            changed,
        });
    }

    /// Returns false if the failure belongs to a superseded subscription.
    fn fail_subscription(&self, group: &str, generation: u64, message: String) -> bool {
        let Some(mut slot) = self.inner.subscriptions.get_mut(group) else {
            return false;
        };
        if slot.generation != generation {
            return false;
        }
        slot.state = SubscriptionState::Failed;
        self.inner
            .connection_state
            .send_replace(ConnectionState::Disconnected);
        drop(slot);

        warn!(group, error = %message, "subscription failed");
        let _ = self.inner.event_tx.send(SyncEvent::SubscriptionFailed {
            group: group.to_owned(),
            message,
        });
        true
    }

    /// Move a failed group back to `Subscribing` for a reconnect attempt.
    fn begin_resubscribe(&self, group: &str, generation: u64) -> bool {
        let Some(mut slot) = self.inner.subscriptions.get_mut(group) else {
            return false;
        };
        if slot.generation != generation || slot.state != SubscriptionState::Failed {
            return false;
        }
        slot.state = SubscriptionState::Subscribing;
        self.inner
            .connection_state
            .send_replace(ConnectionState::Connecting);
        true
    }
}

// ── Background tasks ─────────────────────────────────────────────

/// Apply one group's snapshots in delivery order until cancelled or the
/// subscription fails for good.
async fn subscription_task<S: RealtimeStore>(
    sync: Synchronizer<S>,
    group: String,
    generation: u64,
    mut subscription: Subscription,
    cancel: CancellationToken,
) {
    let mut attempt: u32 = 0;

    loop {
        let event = tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            event = subscription.next() => event,
        };

        let message = match event {
            Some(SubscriptionEvent::Snapshot(snapshot)) => {
                attempt = 0;
                sync.apply_snapshot(&group, generation, &snapshot);
                continue;
            }
            Some(SubscriptionEvent::Error(e)) => e.to_string(),
            None => "subscription closed".to_owned(),
        };

        if !sync.fail_subscription(&group, generation, message) {
            break;
        }

        let ReconnectPolicy::Backoff(reconnect) = &sync.inner.config.reconnect else {
            break;
        };
        if !reconnect.allows(attempt) {
            warn!(group, attempts = attempt, "giving up on subscription");
            break;
        }

        let delay = campus_api::backoff_delay(attempt, reconnect);
        attempt += 1;
        info!(group, attempt, ?delay, "resubscribing");
        let _ = sync.inner.event_tx.send(SyncEvent::Resubscribing {
            group: group.clone(),
            attempt,
            delay,
        });

        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            () = tokio::time::sleep(delay) => {}
        }

        if !sync.begin_resubscribe(&group, generation) {
            break;
        }
        subscription = sync.inner.store.subscribe(&group);
    }

    subscription.unsubscribe();
    debug!(group, "subscription task finished");
}
