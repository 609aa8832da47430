// ── Synchronizer state and outcomes ──

use std::time::Duration;

use serde::Serialize;

use super::device::DeviceKey;

/// Process-wide realtime connection status.
///
/// `Connecting` when subscriptions start, `Connected` on any successful
/// snapshot, `Disconnected` on any subscription failure or after `stop()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ConnectionState {
    Connecting,
    Connected,
    Disconnected,
}

/// Lifecycle of one group's subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SubscriptionState {
    /// Never started, or stopped.
    Idle,
    /// Registered, no snapshot yet.
    Subscribing,
    /// At least one snapshot applied.
    Live,
    /// Terminated by an error. Restarted only by `start()` or the
    /// reconnect policy.
    Failed,
}

impl SubscriptionState {
    /// Whether `start()` leaves this subscription alone.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Subscribing | Self::Live)
    }
}

/// Why a toggle did not take effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ToggleFailure {
    /// The store rejected the write or could not be reached.
    WriteFailed { reason: String },
    /// No acknowledgement within the write timeout.
    Timeout {
        #[serde(with = "duration_millis")]
        after: Duration,
    },
}

impl std::fmt::Display for ToggleFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WriteFailed { reason } => write!(f, "write failed: {reason}"),
            Self::Timeout { after } => write!(f, "timed out after {}ms", after.as_millis()),
        }
    }
}

/// Outcome of a toggle write. The projection is never touched by it:
/// the new power shows up only when the store echoes the change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum ToggleResult {
    Ok,
    Failed(ToggleFailure),
}

impl ToggleResult {
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok)
    }
}

/// One entry of a group toggle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceToggle {
    pub device: String,
    pub result: ToggleResult,
}

/// Observable synchronizer activity, broadcast to `events()` receivers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// A snapshot for `group` was applied. `changed` is false when every
    /// value already matched.
    SnapshotApplied { group: String, changed: bool },
    /// The subscription for `group` terminated.
    SubscriptionFailed { group: String, message: String },
    /// A resubscription attempt is scheduled.
    Resubscribing {
        group: String,
        attempt: u32,
        delay: Duration,
    },
    /// A toggle write settled and its pending marker was cleared.
    ToggleSettled {
        key: DeviceKey,
        desired: bool,
        result: ToggleResult,
    },
}

mod duration_millis {
    use std::time::Duration;

    use serde::Serializer;

    #[allow(clippy::trivially_copy_pass_by_ref)]
    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
    }
}
