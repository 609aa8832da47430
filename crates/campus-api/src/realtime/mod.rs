//! Realtime device store contract.
//!
//! The store holds one node per group, each child a device record:
//! `/{group}/{device}` -> `{ "status": "ON" | "OFF" }`.
//!
//! A [`RealtimeStore`] offers two capabilities:
//!
//! - [`subscribe`](RealtimeStore::subscribe): a durable server-push
//!   subscription rooted at a path. Every change below the path (and the
//!   initial value) is delivered as a full-subtree
//!   [`SubscriptionEvent::Snapshot`]. Delivery is FIFO per path, with no
//!   ordering across paths. A subscription delivers at most one
//!   [`SubscriptionEvent::Error`], after which it is dead: the store never
//!   reconnects on its own.
//! - [`write`](RealtimeStore::write): replace the subtree at a path.
//!   Resolves once the store acknowledges. Two writes are two independent
//!   operations with no atomicity between them.

pub mod firebase;
pub mod memory;
pub mod reconnect;
mod sse;
mod tree;

use std::collections::BTreeMap;
use std::future::Future;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::error::Error;

pub use reconnect::{ReconnectConfig, backoff_delay};

// ── Records ──────────────────────────────────────────────────────────

/// Power status as stored remotely.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum PowerStatus {
    On,
    Off,
}

impl PowerStatus {
    pub fn is_on(self) -> bool {
        self == Self::On
    }
}

impl From<bool> for PowerStatus {
    fn from(on: bool) -> Self {
        if on { Self::On } else { Self::Off }
    }
}

/// One device node: `{ "status": "ON" | "OFF" }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRecord {
    pub status: PowerStatus,
}

impl DeviceRecord {
    pub fn new(on: bool) -> Self {
        Self {
            status: PowerStatus::from(on),
        }
    }

    /// JSON value written to the store for this record.
    pub fn to_value(self) -> serde_json::Value {
        serde_json::json!({ "status": self.status })
    }
}

/// Full subtree of a group node: device id -> record.
///
/// An absent or `null` group node is an empty snapshot.
pub type GroupSnapshot = BTreeMap<String, DeviceRecord>;

/// Interpret a raw subtree value as a group snapshot.
///
/// Every child key becomes a record. Only a `status` of exactly `"ON"`
/// counts as on; a missing, malformed, or differently-cased status is off.
pub fn parse_group_snapshot(value: &serde_json::Value) -> GroupSnapshot {
    let Some(children) = value.as_object() else {
        return GroupSnapshot::new();
    };

    children
        .iter()
        .map(|(device, node)| {
            let on = node.get("status").and_then(serde_json::Value::as_str) == Some("ON");
            (device.clone(), DeviceRecord::new(on))
        })
        .collect()
}

// ── Subscription ─────────────────────────────────────────────────────

/// An event delivered on a [`Subscription`].
#[derive(Debug)]
pub enum SubscriptionEvent {
    /// The full subtree under the subscribed path.
    Snapshot(GroupSnapshot),
    /// Terminal failure. No further events follow.
    Error(Error),
}

/// Handle to a live server-push subscription.
///
/// Events arrive through [`next`](Self::next). The subscription is torn
/// down by [`unsubscribe`](Self::unsubscribe) or by dropping the handle.
pub struct Subscription {
    path: String,
    events: mpsc::UnboundedReceiver<SubscriptionEvent>,
    cancel: CancellationToken,
    terminated: bool,
}

impl Subscription {
    /// Build a handle from an event channel and the token that stops the
    /// producer. Store implementations call this from `subscribe`.
    pub fn new(
        path: impl Into<String>,
        events: mpsc::UnboundedReceiver<SubscriptionEvent>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            path: path.into(),
            events,
            cancel,
            terminated: false,
        }
    }

    /// The path this subscription is rooted at.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Wait for the next event.
    ///
    /// Returns `None` once the subscription is closed, after an `Error`
    /// has been delivered, or after [`unsubscribe`](Self::unsubscribe).
    pub async fn next(&mut self) -> Option<SubscriptionEvent> {
        if self.terminated || self.cancel.is_cancelled() {
            return None;
        }
        let event = self.events.recv().await?;
        if matches!(event, SubscriptionEvent::Error(_)) {
            self.terminated = true;
            self.cancel.cancel();
        }
        Some(event)
    }

    /// Stop the subscription. Idempotent.
    pub fn unsubscribe(&self) {
        self.cancel.cancel();
    }

    /// Whether the subscription has been torn down.
    pub fn is_closed(&self) -> bool {
        self.terminated || self.cancel.is_cancelled()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("path", &self.path)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

// ── Store trait ──────────────────────────────────────────────────────

/// A remote key-value store with server-push subscriptions.
///
/// `subscribe` must be called from within a tokio runtime: implementations
/// spawn the task that feeds the subscription.
pub trait RealtimeStore: Send + Sync + 'static {
    /// Open a subscription rooted at `path`.
    fn subscribe(&self, path: &str) -> Subscription;

    /// Replace the subtree at `path` with `value`.
    fn write(
        &self,
        path: &str,
        value: serde_json::Value,
    ) -> impl Future<Output = Result<(), Error>> + Send;
}

/// Normalize a store path into its non-empty segments.
pub(crate) fn path_segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_snapshot_only_exact_on_counts() {
        let value = json!({
            "D118-1": { "status": "ON" },
            "D118-2": { "status": "OFF" },
            "D118-3": { "status": "on" },
            "D118-4": "garbage",
        });

        let snap = parse_group_snapshot(&value);
        assert_eq!(snap.len(), 4);
        assert!(snap["D118-1"].status.is_on());
        assert!(!snap["D118-2"].status.is_on());
        assert!(!snap["D118-3"].status.is_on());
        assert!(!snap["D118-4"].status.is_on());
    }

    #[test]
    fn parse_null_snapshot_is_empty() {
        assert!(parse_group_snapshot(&serde_json::Value::Null).is_empty());
    }

    #[test]
    fn record_serializes_uppercase() {
        assert_eq!(DeviceRecord::new(true).to_value(), json!({ "status": "ON" }));
        assert_eq!(DeviceRecord::new(false).to_value(), json!({ "status": "OFF" }));
    }

    #[test]
    fn power_status_parses_case_insensitively() {
        assert_eq!("on".parse::<PowerStatus>().unwrap(), PowerStatus::On);
        assert_eq!(PowerStatus::Off.to_string(), "OFF");
    }

    #[tokio::test]
    async fn subscription_terminates_after_error() {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut sub = Subscription::new("D118", rx, CancellationToken::new());

        tx.send(SubscriptionEvent::Error(Error::StreamClosed {
            path: "D118".into(),
        }))
        .unwrap();
        tx.send(SubscriptionEvent::Snapshot(GroupSnapshot::new()))
            .unwrap();

        assert!(matches!(sub.next().await, Some(SubscriptionEvent::Error(_))));
        assert!(sub.next().await.is_none());
        assert!(sub.is_closed());
    }

    #[test]
    fn path_segments_ignore_slashes() {
        assert_eq!(path_segments("/D118//D118-1/"), vec!["D118", "D118-1"]);
        assert!(path_segments("/").is_empty());
    }
}
