//! Interface table comparison.

use std::collections::HashMap;

use crate::observation::{InterfaceRecord, Payload};

use super::Change;

pub(super) fn compare(device_id: &str, previous: &Payload, current: &Payload) -> Vec<Change> {
    match (previous.as_interfaces(), current.as_interfaces()) {
        (Some(before), Some(after)) => diff_interfaces(device_id, before, after),
        _ => Vec::new(),
    }
}

/// Interfaces indexed by name, remembering first-seen order.
///
/// When a name repeats within one table, the later record wins but keeps the
/// position of the first occurrence.
struct InterfaceIndex<'a> {
    order: Vec<&'a str>,
    by_name: HashMap<&'a str, &'a InterfaceRecord>,
}

impl<'a> InterfaceIndex<'a> {
    fn new(records: &'a [InterfaceRecord]) -> Self {
        let mut order = Vec::new();
        let mut by_name = HashMap::new();
        for record in records {
            if by_name.insert(record.name.as_str(), record).is_none() {
                order.push(record.name.as_str());
            }
        }
        Self { order, by_name }
    }

    fn get(&self, name: &str) -> Option<&'a InterfaceRecord> {
        self.by_name.get(name).copied()
    }

    fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    fn iter(&self) -> impl Iterator<Item = &'a InterfaceRecord> + '_ {
        self.order.iter().filter_map(|name| self.get(name))
    }
}

/// Compares two interface tables keyed by interface name.
///
/// For each interface of `current`, in table order: absent before → `added`;
/// status differs → `modified` with the `previous → current` transition.
/// Then each interface only in `previous` → `removed`. Interfaces whose status
/// did not change produce nothing.
#[must_use]
pub fn diff_interfaces(
    device_id: &str,
    previous: &[InterfaceRecord],
    current: &[InterfaceRecord],
) -> Vec<Change> {
    let before = InterfaceIndex::new(previous);
    let after = InterfaceIndex::new(current);

    let mut changes = Vec::new();

    for record in after.iter() {
        match before.get(&record.name) {
            None => changes.push(Change::interface_added(device_id, &record.name)),
            Some(old) if old.status != record.status => {
                changes.push(Change::interface_status_changed(
                    device_id,
                    &record.name,
                    &old.status,
                    &record.status,
                ));
            }
            Some(_) => {}
        }
    }

    for record in before.iter() {
        if !after.contains(&record.name) {
            changes.push(Change::interface_removed(device_id, &record.name));
        }
    }

    changes
}
