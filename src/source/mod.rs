//! Data-source layer: where observation windows come from.
//!
//! This module provides:
//! - The retrieval abstraction ([`SnapshotSource`])
//! - The collector HTTP API implementation ([`ApiSource`])
//! - An offline export-file implementation ([`FileSource`])
//! - Device filtering applied as a decorator ([`FilteredSource`], [`FilterChain`])
//! - The HTTP client abstraction and its reqwest implementation
//!   ([`HttpClient`], [`ReqwestClient`])
//!
//! Every call is one-shot: no retry and no caching. Callers decide what a
//! failure means (the watch loop keeps its previous window).

mod api;
mod client;
mod error;
mod file;
pub mod filter;
mod http;

#[cfg(test)]
mod file_tests;

pub use api::ApiSource;
pub use client::ReqwestClient;
pub use error::{HttpError, SourceError};
pub use file::{Export, FileSource, local_differences};
pub use filter::{DeviceFilter, FilterChain, FilteredSource, NameRegexFilter};
pub use http::{HttpClient, HttpRequest, HttpResponse};

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::change::ChangeKind;
use crate::observation::{Observation, ObservationKind, Timestamp};

/// One classified group of differing items for a device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifferenceGroup {
    /// Whether the items were added, removed or modified.
    #[serde(rename = "type")]
    pub kind: ChangeKind,
    /// The differing items (canonical route strings for routing tables).
    pub items: Vec<String>,
}

/// Differences of one device between two arbitrary instants.
///
/// This is the shape the collector's compare endpoint answers with; it is
/// relayed untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceDifference {
    /// The device the groups belong to.
    pub device_id: String,
    /// The classified groups, empty groups omitted.
    pub changes: Vec<DifferenceGroup>,
}

/// A source of observation windows.
///
/// # Example
///
/// ```ignore
/// use net_rewind::source::{SnapshotSource, SourceError};
///
/// struct Fixed(Vec<Observation>);
///
/// impl SnapshotSource for Fixed {
///     async fn timeline(&self, _hours: u32) -> Result<Vec<Observation>, SourceError> {
///         Ok(self.0.clone())
///     }
///     // ...
/// }
/// ```
pub trait SnapshotSource: Send + Sync {
    /// Returns the observations collected during the last `hours` hours.
    ///
    /// Order is whatever the store yields; consumers regroup by instant.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the window cannot be retrieved or decoded.
    fn timeline(
        &self,
        hours: u32,
    ) -> impl Future<Output = Result<Vec<Observation>, SourceError>> + Send;

    /// Returns the distinct identifiers of known devices.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the list cannot be retrieved or decoded.
    fn devices(&self) -> impl Future<Output = Result<Vec<String>, SourceError>> + Send;

    /// Compares one payload kind between two arbitrary instants.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the comparison cannot be retrieved or decoded.
    fn compare(
        &self,
        first: &Timestamp,
        second: &Timestamp,
        kind: ObservationKind,
    ) -> impl Future<Output = Result<Vec<DeviceDifference>, SourceError>> + Send;
}
