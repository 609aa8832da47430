// ── Status aggregation ──
//
// Pure reductions of a projection snapshot into display figures. Devices
// never reported by the store count as off.

use crate::model::{GroupStatus, GroupSummary, ProjectionSnapshot};

/// Devices currently on, across all groups.
pub fn total_on(snapshot: &ProjectionSnapshot) -> usize {
    snapshot
        .groups()
        .map(|(_, devices)| devices.values().filter(|on| **on).count())
        .sum()
}

/// All registry devices.
pub fn total_devices(snapshot: &ProjectionSnapshot) -> usize {
    snapshot.groups().map(|(_, devices)| devices.len()).sum()
}

/// Status of one group, `None` if the group is unknown.
pub fn group_status(snapshot: &ProjectionSnapshot, group: &str) -> Option<GroupStatus> {
    let devices = snapshot.group(group)?;
    let on = devices.values().filter(|on| **on).count();
    Some(classify(on, devices.len()))
}

/// One row per group, in registry order.
pub fn summarize(snapshot: &ProjectionSnapshot) -> Vec<GroupSummary> {
    snapshot
        .groups()
        .map(|(group, devices)| {
            let on = devices.values().filter(|on| **on).count();
            let total = devices.len();
            GroupSummary {
                group: group.to_owned(),
                on,
                total,
                status: classify(on, total),
            }
        })
        .collect()
}

fn classify(on: usize, total: usize) -> GroupStatus {
    if on == 0 {
        GroupStatus::Off
    } else if on == total {
        GroupStatus::On
    } else {
        GroupStatus::Partial
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::registry::{DeviceRegistry, GroupDefinition};
    use crate::store::Projection;
    use campus_api::{DeviceRecord, GroupSnapshot};

    fn set(projection: &Projection, group: &str, on: &[&str], off: &[&str]) {
        let snap: GroupSnapshot = on
            .iter()
            .map(|d| ((*d).to_owned(), DeviceRecord::new(true)))
            .chain(off.iter().map(|d| ((*d).to_owned(), DeviceRecord::new(false))))
            .collect();
        projection.apply(group, &snap);
    }

    #[test]
    fn boundaries_of_group_status() {
        let projection = Projection::new(&DeviceRegistry::default());
        let all = ["D118-1", "D118-2", "D118-3", "D118-4"];

        assert_eq!(
            group_status(&projection.snapshot(), "D118"),
            Some(GroupStatus::Off)
        );

        set(&projection, "D118", &all[..1], &all[1..]);
        assert_eq!(
            group_status(&projection.snapshot(), "D118"),
            Some(GroupStatus::Partial)
        );

        set(&projection, "D118", &all[..3], &all[3..]);
        assert_eq!(
            group_status(&projection.snapshot(), "D118"),
            Some(GroupStatus::Partial)
        );

        set(&projection, "D118", &all, &[]);
        assert_eq!(
            group_status(&projection.snapshot(), "D118"),
            Some(GroupStatus::On)
        );
        assert_eq!(group_status(&projection.snapshot(), "D999"), None);
    }

    #[test]
    fn empty_group_is_off() {
        let registry =
            DeviceRegistry::new([GroupDefinition::new("Store", Vec::<String>::new())]).unwrap();
        let projection = Projection::new(&registry);
        assert_eq!(
            group_status(&projection.snapshot(), "Store"),
            Some(GroupStatus::Off)
        );
    }

    #[test]
    fn totals_and_summary() {
        let projection = Projection::new(&DeviceRegistry::default());
        set(&projection, "D118", &["D118-1", "D118-3"], &[]);
        set(&projection, "D117", &["D117-1", "D117-2", "D117-3", "D117-4"], &[]);

        let snap = projection.snapshot();
        assert_eq!(total_on(&snap), 6);
        assert_eq!(total_devices(&snap), 8);

        let rows = summarize(&snap);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].group, "D118");
        assert_eq!((rows[0].on, rows[0].total), (2, 4));
        assert_eq!(rows[0].status, GroupStatus::Partial);
        assert_eq!(rows[1].status, GroupStatus::On);
    }
}
