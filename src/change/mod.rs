//! Change detection between two reconstructed network states.
//!
//! This module provides:
//! - The change record handed to renderers ([`Change`], [`ChangeKind`])
//! - The orchestrating detector ([`detect_changes`])
//! - Per-kind comparators ([`diff_routes`], [`diff_interfaces`], [`diff_connectivity`])
//!
//! # Ordering
//!
//! Output order is part of the contract:
//! 1. Devices present in the current state, in sorted `device_id` order.
//!    A device new in the current state yields a single device-level change
//!    and nothing else. Otherwise the comparators run in the fixed order of
//!    [`COMPARATORS`]: routing, interfaces, connectivity.
//! 2. Devices present only in the previous state, in sorted order.

mod connectivity;
mod interfaces;
mod routing;

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;

pub use connectivity::diff_connectivity;
pub use interfaces::diff_interfaces;
pub use routing::diff_routes;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::observation::{InterfaceStatus, ObservationKind, Payload};
use crate::snapshot::{DeviceSnapshot, DeviceState};

/// The classification of a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    /// Something appeared (device, route, interface) or a target became reachable.
    Added,
    /// Something disappeared or a target became unreachable.
    Removed,
    /// An interface changed status.
    Modified,
}

impl ChangeKind {
    /// Returns the lowercase wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Removed => "removed",
            Self::Modified => "modified",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One detected difference between two states.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    /// Whether something was added, removed or modified.
    #[serde(rename = "type")]
    pub kind: ChangeKind,
    /// The device the change belongs to.
    pub device_id: String,
    /// Human-facing summary.
    pub description: String,
    /// Supporting detail, e.g. the route line or the status transition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Interface name, for interface changes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interface: Option<String>,
    /// Probe target, for connectivity changes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

impl Change {
    fn new(kind: ChangeKind, device_id: &str, description: String) -> Self {
        Self {
            kind,
            device_id: device_id.to_string(),
            description,
            details: None,
            interface: None,
            target: None,
        }
    }

    fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// A device present now that was absent before.
    #[must_use]
    pub fn device_added(device_id: &str) -> Self {
        Self::new(ChangeKind::Added, device_id, "new device detected".to_string())
    }

    /// A device present before that is absent now.
    #[must_use]
    pub fn device_removed(device_id: &str) -> Self {
        Self::new(
            ChangeKind::Removed,
            device_id,
            "device removed or unreachable".to_string(),
        )
    }

    /// A route that appeared in the routing table.
    #[must_use]
    pub fn route_added(device_id: &str, route: &str) -> Self {
        Self::new(
            ChangeKind::Added,
            device_id,
            "routing change - route added".to_string(),
        )
        .with_details(route)
    }

    /// A route that disappeared from the routing table.
    #[must_use]
    pub fn route_removed(device_id: &str, route: &str) -> Self {
        Self::new(
            ChangeKind::Removed,
            device_id,
            "routing change - route removed".to_string(),
        )
        .with_details(route)
    }

    /// An interface that appeared.
    #[must_use]
    pub fn interface_added(device_id: &str, name: &str) -> Self {
        Self::interface(ChangeKind::Added, device_id, name, "interface added")
    }

    /// An interface that disappeared.
    #[must_use]
    pub fn interface_removed(device_id: &str, name: &str) -> Self {
        Self::interface(ChangeKind::Removed, device_id, name, "interface removed")
    }

    /// An interface whose status changed.
    #[must_use]
    pub fn interface_status_changed(
        device_id: &str,
        name: &str,
        previous: &InterfaceStatus,
        current: &InterfaceStatus,
    ) -> Self {
        let transition = format!("{previous} → {current}");
        Self::interface(
            ChangeKind::Modified,
            device_id,
            name,
            &format!("status changed: {transition}"),
        )
        .with_details(transition)
    }

    fn interface(kind: ChangeKind, device_id: &str, name: &str, summary: &str) -> Self {
        let mut change = Self::new(kind, device_id, format!("interface {name} - {summary}"));
        change.interface = Some(name.to_string());
        change
    }

    /// A probe target that became reachable.
    #[must_use]
    pub fn connection_restored(device_id: &str, target: &str) -> Self {
        Self::target(ChangeKind::Added, device_id, target, "connection restored")
    }

    /// A probe target that became unreachable.
    #[must_use]
    pub fn connection_lost(device_id: &str, target: &str) -> Self {
        Self::target(ChangeKind::Removed, device_id, target, "connection lost")
    }

    fn target(kind: ChangeKind, device_id: &str, target: &str, summary: &str) -> Self {
        let mut change = Self::new(kind, device_id, format!("connectivity to {target} - {summary}"));
        change.target = Some(target.to_string());
        change
    }

    /// Returns true if this is an "added" change.
    #[must_use]
    pub const fn is_added(&self) -> bool {
        matches!(self.kind, ChangeKind::Added)
    }

    /// Returns true if this is a "removed" change.
    #[must_use]
    pub const fn is_removed(&self) -> bool {
        matches!(self.kind, ChangeKind::Removed)
    }

    /// Returns true if this is a "modified" change.
    #[must_use]
    pub const fn is_modified(&self) -> bool {
        matches!(self.kind, ChangeKind::Modified)
    }
}

/// Compares one payload kind of one device.
///
/// Receives the device id and the previous/current payloads stored under the
/// comparator's kind. Payloads of an unexpected variant produce no changes.
pub type Comparator = fn(&str, &Payload, &Payload) -> Vec<Change>;

/// Comparator dispatch table, in the order comparators run for each device.
pub const COMPARATORS: [(ObservationKind, Comparator); 3] = [
    (ObservationKind::RoutingTable, routing::compare),
    (ObservationKind::Interfaces, interfaces::compare),
    (ObservationKind::Connectivity, connectivity::compare),
];

/// Compares two network states and returns the classified changes.
///
/// This is a pure function: the same inputs always produce the same output,
/// in the order described in the [module documentation](self).
///
/// Comparing a state with itself always yields an empty list.
#[must_use]
pub fn detect_changes(previous: &DeviceState, current: &DeviceState) -> Vec<Change> {
    let mut changes = Vec::new();

    for (device_id, current_device) in current.devices() {
        match previous.device(device_id) {
            Some(previous_device) => {
                compare_device(&mut changes, device_id, previous_device, current_device);
            }
            None => changes.push(Change::device_added(device_id)),
        }
    }

    for device_id in previous.device_ids() {
        if !current.contains_device(device_id) {
            changes.push(Change::device_removed(device_id));
        }
    }

    tracing::debug!(
        "Compared {} previous / {} current device(s): {} change(s)",
        previous.len(),
        current.len(),
        changes.len(),
    );

    changes
}

/// Runs every comparator whose kind is present on both sides.
fn compare_device(
    changes: &mut Vec<Change>,
    device_id: &str,
    previous: &DeviceSnapshot,
    current: &DeviceSnapshot,
) {
    for (kind, compare) in COMPARATORS {
        if let (Some(before), Some(after)) = (previous.payload(kind), current.payload(kind)) {
            changes.extend(compare(device_id, before, after));
        }
    }
}
