//! Observation layer: the raw, typed facts produced by the snapshot collector.
//!
//! This module provides types for:
//! - Identifying instants ([`Timestamp`])
//! - The closed set of recognized payload kinds ([`ObservationKind`])
//! - Typed payloads ([`Payload`], [`RouteRecord`], [`InterfaceRecord`], [`Connectivity`])
//! - The observation record itself ([`Observation`])
//!
//! # Wire Format
//!
//! Observations travel as `{ "timestamp", "device_id", "type", "data" }`.
//! The `type` tag selects how `data` is decoded; tags that are not recognized
//! are kept verbatim as [`Payload::Other`] so newer collectors do not break
//! older readers. A recognized tag whose `data` has an unexpected shape is
//! kept the same way (and logged), so one odd record never fails a window;
//! comparators skip it.

mod payload;
mod timestamp;


pub use payload::{
    Connectivity, InterfaceRecord, InterfaceStats, InterfaceStatus, ObservationKind, Payload,
    RouteRecord,
};
pub use timestamp::Timestamp;

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

/// One fact about one device at one instant.
///
/// Observations are immutable once decoded; reconstruction only reads and
/// regroups them.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawObservation")]
pub struct Observation {
    /// The instant this fact was collected at.
    pub timestamp: Timestamp,
    /// The device the fact is about.
    pub device_id: String,
    /// The typed payload, carrying its own `type` tag.
    pub payload: Payload,
}

impl Observation {
    /// Creates a new observation.
    #[must_use]
    pub fn new(timestamp: impl Into<Timestamp>, device_id: impl Into<String>, payload: Payload) -> Self {
        Self {
            timestamp: timestamp.into(),
            device_id: device_id.into(),
            payload,
        }
    }

    /// Returns the `type` tag of the payload.
    #[must_use]
    pub fn tag(&self) -> &str {
        self.payload.tag()
    }
}

/// Untyped wire shape, decoded into [`Observation`] by tag dispatch.
#[derive(Deserialize)]
struct RawObservation {
    timestamp: Timestamp,
    device_id: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: Value,
}

impl From<RawObservation> for Observation {
    fn from(raw: RawObservation) -> Self {
        let RawObservation {
            timestamp,
            device_id,
            kind,
            data,
        } = raw;

        let decoded = ObservationKind::from_tag(&kind).map(|known| Payload::try_decode(known, &data));
        let payload = match decoded {
            Some(Ok(payload)) => payload,
            Some(Err(e)) => {
                tracing::warn!(
                    "Unexpected {kind} shape for {device_id} at {timestamp}, kept verbatim: {e}"
                );
                Payload::Other { kind, data }
            }
            None => Payload::Other { kind, data },
        };

        Self {
            timestamp,
            device_id,
            payload,
        }
    }
}

impl Serialize for Observation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Observation", 4)?;
        state.serialize_field("timestamp", &self.timestamp)?;
        state.serialize_field("device_id", &self.device_id)?;
        state.serialize_field("type", self.payload.tag())?;
        state.serialize_field("data", &self.payload)?;
        state.end()
    }
}
