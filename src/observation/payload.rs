//! Typed payloads carried by observations.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

/// The recognized observation kinds.
///
/// The wire `type` tag is open: tags outside this set decode into
/// [`Payload::Other`] and are never compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ObservationKind {
    /// A device routing table (`routing_table`).
    RoutingTable,
    /// A device interface table (`interfaces`).
    Interfaces,
    /// Reachability probes from a device (`connectivity`).
    Connectivity,
}

impl ObservationKind {
    /// All recognized kinds, in comparison order.
    pub const ALL: [Self; 3] = [Self::RoutingTable, Self::Interfaces, Self::Connectivity];

    /// Returns the wire tag for this kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RoutingTable => "routing_table",
            Self::Interfaces => "interfaces",
            Self::Connectivity => "connectivity",
        }
    }

    /// Looks up a kind by its wire tag.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == tag)
    }
}

impl fmt::Display for ObservationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of a routing table.
///
/// Records are kept as the collector produced them. Identity for comparison
/// purposes is [`RouteRecord::canonical`], never the position in the table.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteRecord(Map<String, Value>);

impl RouteRecord {
    /// Creates a record from its raw fields.
    #[must_use]
    pub const fn from_fields(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Creates a record holding only a canonical `line`.
    #[must_use]
    pub fn from_line(line: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert("line".to_string(), Value::String(line.into()));
        Self(fields)
    }

    /// Returns the canonical route line, if the collector provided a non-empty one.
    #[must_use]
    pub fn line(&self) -> Option<&str> {
        self.str_field("line").filter(|line| !line.is_empty())
    }

    /// Returns the destination network (CIDR), if present.
    #[must_use]
    pub fn network(&self) -> Option<&str> {
        self.str_field("network")
    }

    /// Returns the route origin code (e.g. `C`, `S`, `R`), if present.
    #[must_use]
    pub fn origin(&self) -> Option<&str> {
        self.str_field("type")
    }

    /// Returns the raw fields of the record.
    #[must_use]
    pub const fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Returns the identity string used for set-based comparison.
    ///
    /// This is the `line` field when present, otherwise the JSON serialization
    /// of the whole record. `serde_json::Map` keeps keys sorted at every depth,
    /// so field order never affects identity.
    #[must_use]
    pub fn canonical(&self) -> Cow<'_, str> {
        self.line().map_or_else(
            // serializing a map of JSON values cannot fail
            || Cow::Owned(serde_json::to_string(&self.0).unwrap_or_default()),
            Cow::Borrowed,
        )
    }

    fn str_field(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }
}

/// Operational status of an interface.
///
/// Compared for equality only; unknown statuses are preserved verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum InterfaceStatus {
    /// Link is up.
    Up,
    /// Link is down.
    Down,
    /// Any other status reported by the collector.
    Other(String),
}

impl InterfaceStatus {
    /// Returns the wire representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Other(status) => status,
        }
    }
}

impl From<String> for InterfaceStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "up" => Self::Up,
            "down" => Self::Down,
            _ => Self::Other(value),
        }
    }
}

impl From<&str> for InterfaceStatus {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<InterfaceStatus> for String {
    fn from(status: InterfaceStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for InterfaceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Packet counters collected alongside an interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InterfaceStats {
    /// Packets received.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub packets_in: Option<u64>,
    /// Packets sent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub packets_out: Option<u64>,
}

/// One row of an interface table.
///
/// `name` is the identity key; only `status` takes part in comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceRecord {
    /// Interface name, unique within a device and instant.
    pub name: String,
    /// Operational status.
    pub status: InterfaceStatus,
    /// Packet counters, if collected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<InterfaceStats>,
    /// Any further fields the collector attached.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl InterfaceRecord {
    /// Creates an interface record without stats.
    #[must_use]
    pub fn new(name: impl Into<String>, status: impl Into<InterfaceStatus>) -> Self {
        Self {
            name: name.into(),
            status: status.into(),
            stats: None,
            extra: Map::new(),
        }
    }

    /// Attaches packet counters.
    #[must_use]
    pub const fn with_stats(mut self, stats: InterfaceStats) -> Self {
        self.stats = Some(stats);
        self
    }
}

/// Reachability of probe targets, keyed by target identifier.
pub type Connectivity = BTreeMap<String, bool>;

/// The data of an observation, selected by its `type` tag.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// A routing table.
    RoutingTable(Vec<RouteRecord>),
    /// An interface table.
    Interfaces(Vec<InterfaceRecord>),
    /// Reachability probes.
    Connectivity(Connectivity),
    /// A payload kept verbatim: an unrecognized tag, or a recognized tag whose
    /// `data` did not have the expected shape.
    Other {
        /// The original `type` tag.
        kind: String,
        /// The original `data`.
        data: Value,
    },
}

impl Payload {
    /// Decodes `data` as the payload of a recognized kind.
    ///
    /// # Errors
    ///
    /// Returns an error if `data` does not have the shape `kind` requires.
    pub fn try_decode(kind: ObservationKind, data: &Value) -> Result<Self, serde_json::Error> {
        Ok(match kind {
            ObservationKind::RoutingTable => Self::RoutingTable(Vec::deserialize(data)?),
            ObservationKind::Interfaces => Self::Interfaces(Vec::deserialize(data)?),
            ObservationKind::Connectivity => Self::Connectivity(Connectivity::deserialize(data)?),
        })
    }

    /// Returns an empty payload of the given kind.
    #[must_use]
    pub const fn empty(kind: ObservationKind) -> Self {
        match kind {
            ObservationKind::RoutingTable => Self::RoutingTable(Vec::new()),
            ObservationKind::Interfaces => Self::Interfaces(Vec::new()),
            ObservationKind::Connectivity => Self::Connectivity(BTreeMap::new()),
        }
    }

    /// Returns the wire `type` tag.
    #[must_use]
    pub fn tag(&self) -> &str {
        match self {
            Self::RoutingTable(_) => ObservationKind::RoutingTable.as_str(),
            Self::Interfaces(_) => ObservationKind::Interfaces.as_str(),
            Self::Connectivity(_) => ObservationKind::Connectivity.as_str(),
            Self::Other { kind, .. } => kind,
        }
    }

    /// Returns the recognized kind, or `None` for [`Payload::Other`].
    #[must_use]
    pub const fn kind(&self) -> Option<ObservationKind> {
        match self {
            Self::RoutingTable(_) => Some(ObservationKind::RoutingTable),
            Self::Interfaces(_) => Some(ObservationKind::Interfaces),
            Self::Connectivity(_) => Some(ObservationKind::Connectivity),
            Self::Other { .. } => None,
        }
    }

    /// Returns the routes if this is a routing table.
    #[must_use]
    pub fn as_routing_table(&self) -> Option<&[RouteRecord]> {
        match self {
            Self::RoutingTable(routes) => Some(routes),
            _ => None,
        }
    }

    /// Returns the interfaces if this is an interface table.
    #[must_use]
    pub fn as_interfaces(&self) -> Option<&[InterfaceRecord]> {
        match self {
            Self::Interfaces(interfaces) => Some(interfaces),
            _ => None,
        }
    }

    /// Returns the probe results if this is a connectivity payload.
    #[must_use]
    pub const fn as_connectivity(&self) -> Option<&Connectivity> {
        match self {
            Self::Connectivity(targets) => Some(targets),
            _ => None,
        }
    }
}

/// Serializes the `data` part only; the tag is written by the enclosing record.
impl Serialize for Payload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::RoutingTable(routes) => routes.serialize(serializer),
            Self::Interfaces(interfaces) => interfaces.serialize(serializer),
            Self::Connectivity(targets) => targets.serialize(serializer),
            Self::Other { data, .. } => data.serialize(serializer),
        }
    }
}
