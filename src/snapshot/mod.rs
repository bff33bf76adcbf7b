//! State reconstruction: grouping observations that share an instant.
//!
//! This module provides:
//! - The per-device state at one instant ([`DeviceState`], [`DeviceSnapshot`])
//! - Reconstruction from a raw observation stream ([`reconstruct`])
//! - The ordered set of instants present in a stream ([`distinct_instants`])

use std::collections::BTreeMap;

use serde::Serialize;

use crate::observation::{
    Connectivity, InterfaceRecord, Observation, ObservationKind, Payload, RouteRecord, Timestamp,
};

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;

/// Everything known about one device at one instant, keyed by `type` tag.
///
/// Serializes as `{ "<type>": <data>, ... }`.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct DeviceSnapshot {
    payloads: BTreeMap<String, Payload>,
}

impl DeviceSnapshot {
    /// Creates an empty device snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a payload under its tag, returning the payload it replaced.
    pub fn insert(&mut self, payload: Payload) -> Option<Payload> {
        self.payloads.insert(payload.tag().to_string(), payload)
    }

    /// Returns the payload stored under a raw `type` tag.
    #[must_use]
    pub fn get(&self, tag: &str) -> Option<&Payload> {
        self.payloads.get(tag)
    }

    /// Returns the payload of a recognized kind.
    #[must_use]
    pub fn payload(&self, kind: ObservationKind) -> Option<&Payload> {
        self.get(kind.as_str())
    }

    /// Returns the routing table, if one was observed.
    #[must_use]
    pub fn routing_table(&self) -> Option<&[RouteRecord]> {
        self.payload(ObservationKind::RoutingTable)
            .and_then(Payload::as_routing_table)
    }

    /// Returns the interface table, if one was observed.
    #[must_use]
    pub fn interfaces(&self) -> Option<&[InterfaceRecord]> {
        self.payload(ObservationKind::Interfaces)
            .and_then(Payload::as_interfaces)
    }

    /// Returns the connectivity probes, if any were observed.
    #[must_use]
    pub fn connectivity(&self) -> Option<&Connectivity> {
        self.payload(ObservationKind::Connectivity)
            .and_then(Payload::as_connectivity)
    }

    /// Returns the stored `type` tags in sorted order.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.payloads.keys().map(String::as_str)
    }

    /// Returns the number of stored payloads.
    #[must_use]
    pub fn len(&self) -> usize {
        self.payloads.len()
    }

    /// Returns `true` if no payload is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.payloads.is_empty()
    }
}

/// The reconstructed state of the whole network at one instant.
///
/// Devices iterate in sorted `device_id` order, so everything derived from a
/// state is deterministic regardless of the order observations arrived in.
///
/// Serializes as `{ "<device_id>": { "<type>": <data> } }`.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct DeviceState {
    devices: BTreeMap<String, DeviceSnapshot>,
}

impl DeviceState {
    /// Creates an empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one observation, replacing any payload already stored for the
    /// same `(device_id, type)` pair. Returns `true` if a payload was replaced.
    pub fn record(&mut self, observation: &Observation) -> bool {
        self.devices
            .entry(observation.device_id.clone())
            .or_default()
            .insert(observation.payload.clone())
            .is_some()
    }

    /// Returns the snapshot of one device.
    #[must_use]
    pub fn device(&self, device_id: &str) -> Option<&DeviceSnapshot> {
        self.devices.get(device_id)
    }

    /// Returns `true` if the device was observed.
    #[must_use]
    pub fn contains_device(&self, device_id: &str) -> bool {
        self.devices.contains_key(device_id)
    }

    /// Iterates over devices in sorted order.
    pub fn devices(&self) -> impl Iterator<Item = (&str, &DeviceSnapshot)> {
        self.devices
            .iter()
            .map(|(device_id, snapshot)| (device_id.as_str(), snapshot))
    }

    /// Returns the device ids in sorted order.
    pub fn device_ids(&self) -> impl Iterator<Item = &str> {
        self.devices.keys().map(String::as_str)
    }

    /// Returns the number of devices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    /// Returns `true` if no device was observed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

/// Reconstructs the network state at `instant`.
///
/// Only observations whose timestamp equals `instant` exactly take part.
/// They are folded in stream order, so when the stream carries more than one
/// payload for the same `(device_id, type)` pair at this instant, the last one
/// wins.
///
/// An empty stream, or an instant absent from the stream, yields an empty
/// state.
#[must_use]
pub fn reconstruct(observations: &[Observation], instant: &Timestamp) -> DeviceState {
    let mut state = DeviceState::new();

    for observation in observations.iter().filter(|o| &o.timestamp == instant) {
        if state.record(observation) {
            tracing::debug!(
                "Duplicate {} for {} at {instant}, keeping the later one",
                observation.tag(),
                observation.device_id,
            );
        }
    }

    state
}

/// Returns the sorted, deduplicated instants present in a stream.
#[must_use]
pub fn distinct_instants(observations: &[Observation]) -> Vec<Timestamp> {
    let mut instants: Vec<Timestamp> = observations.iter().map(|o| o.timestamp.clone()).collect();
    instants.sort();
    instants.dedup();
    instants
}
