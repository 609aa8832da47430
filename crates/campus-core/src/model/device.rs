// ── Device state ──

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::registry::DeviceRegistry;

/// Identifies one device: `(group, device)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DeviceKey {
    pub group: String,
    pub device: String,
}

impl DeviceKey {
    pub fn new(group: impl Into<String>, device: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            device: device.into(),
        }
    }

    /// Store path of the device record: `{group}/{device}`.
    pub fn path(&self) -> String {
        format!("{}/{}", self.group, self.device)
    }
}

impl fmt::Display for DeviceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.group, self.device)
    }
}

/// Point-in-time copy of every device's confirmed power state,
/// in registry order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ProjectionSnapshot {
    groups: IndexMap<String, IndexMap<String, bool>>,
}

impl ProjectionSnapshot {
    /// Every registry device, off.
    pub fn from_registry(registry: &DeviceRegistry) -> Self {
        let groups = registry
            .iter()
            .map(|(group, devices)| {
                let devices = devices.iter().map(|d| (d.clone(), false)).collect();
                (group.to_owned(), devices)
            })
            .collect();
        Self { groups }
    }

    /// Power of one device, `None` if it is not in the registry.
    pub fn power(&self, group: &str, device: &str) -> Option<bool> {
        self.groups.get(group)?.get(device).copied()
    }

    /// Devices of one group with their power, in registry order.
    pub fn group(&self, group: &str) -> Option<&IndexMap<String, bool>> {
        self.groups.get(group)
    }

    /// `(group, devices)` pairs in registry order.
    pub fn groups(&self) -> impl Iterator<Item = (&str, &IndexMap<String, bool>)> {
        self.groups.iter().map(|(g, d)| (g.as_str(), d))
    }

    pub(crate) fn group_mut(&mut self, group: &str) -> Option<&mut IndexMap<String, bool>> {
        self.groups.get_mut(group)
    }
}

/// Derived status of a group.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum GroupStatus {
    /// No device on (also the status of an empty group).
    Off,
    /// Some but not all devices on.
    Partial,
    /// Every device on.
    On,
}

/// One display row produced by the aggregator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupSummary {
    pub group: String,
    pub on: usize,
    pub total: usize,
    pub status: GroupStatus,
}
