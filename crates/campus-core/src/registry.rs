// ── Device registry ──
//
// Static mapping of room groups to their AC units. Built once at start
// and never mutated; display order is definition order.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// One group definition as supplied by configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupDefinition {
    pub name: String,
    pub devices: Vec<String>,
}

impl GroupDefinition {
    pub fn new(name: impl Into<String>, devices: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            name: name.into(),
            devices: devices.into_iter().map(Into::into).collect(),
        }
    }

    /// `{name}-1` ..= `{name}-{count}`, the campus naming convention.
    pub fn numbered(name: &str, count: usize) -> Self {
        Self::new(name, (1..=count).map(|n| format!("{name}-{n}")))
    }
}

/// Ordered registry of groups and their devices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceRegistry {
    groups: IndexMap<String, Vec<String>>,
}

impl DeviceRegistry {
    /// Build a registry, rejecting empty or unaddressable identifiers,
    /// duplicate groups, and devices repeated within a group.
    pub fn new(groups: impl IntoIterator<Item = GroupDefinition>) -> Result<Self, CoreError> {
        let mut map: IndexMap<String, Vec<String>> = IndexMap::new();

        for def in groups {
            if def.name.trim().is_empty() {
                return Err(CoreError::config("group name must not be empty"));
            }
            if let Some(c) = forbidden_char(&def.name) {
                return Err(CoreError::config(format!(
                    "group name '{}' must not contain {c:?}",
                    def.name
                )));
            }
            if map.contains_key(&def.name) {
                return Err(CoreError::config(format!("duplicate group '{}'", def.name)));
            }

            let mut devices: Vec<String> = Vec::with_capacity(def.devices.len());
            for device in def.devices {
                if device.trim().is_empty() || forbidden_char(&device).is_some() {
                    return Err(CoreError::config(format!(
                        "group '{}' has an invalid device id '{device}'",
                        def.name
                    )));
                }
                if devices.contains(&device) {
                    return Err(CoreError::config(format!(
                        "device '{device}' listed twice in group '{}'",
                        def.name
                    )));
                }
                devices.push(device);
            }
            map.insert(def.name, devices);
        }

        Ok(Self { groups: map })
    }

    /// Group identifiers in definition order.
    pub fn groups(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    /// Devices of `group` in definition order.
    pub fn devices_of(&self, group: &str) -> Result<&[String], CoreError> {
        self.groups
            .get(group)
            .map(Vec::as_slice)
            .ok_or_else(|| CoreError::UnknownGroup {
                group: group.to_owned(),
            })
    }

    pub fn contains(&self, group: &str, device: &str) -> bool {
        self.groups
            .get(group)
            .is_some_and(|devices| devices.iter().any(|d| d == device))
    }

    /// Total number of devices across all groups.
    pub fn device_count(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    /// `(group, devices)` pairs in definition order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.groups
            .iter()
            .map(|(group, devices)| (group.as_str(), devices.as_slice()))
    }

    /// The registry as configuration-shaped definitions.
    pub fn definitions(&self) -> Vec<GroupDefinition> {
        self.iter()
            .map(|(group, devices)| GroupDefinition::new(group, devices.iter().cloned()))
            .collect()
    }
}

impl Default for DeviceRegistry {
    /// Rooms D118 and D117 with four units each.
    fn default() -> Self {
        let groups = default_groups()
            .into_iter()
            .map(|def| (def.name, def.devices))
            .collect();
        Self { groups }
    }
}

/// First character that cannot appear in a realtime store key: the path
/// separator, `. $ # [ ]`, and control characters.
fn forbidden_char(id: &str) -> Option<char> {
    id.chars()
        .find(|&c| matches!(c, '/' | '.' | '$' | '#' | '[' | ']') || c.is_control())
}

/// The built-in group layout.
pub fn default_groups() -> Vec<GroupDefinition> {
    vec![
        GroupDefinition::numbered("D118", 4),
        GroupDefinition::numbered("D117", 4),
    ]
}
