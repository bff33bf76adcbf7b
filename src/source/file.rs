//! Snapshot source backed by an exported JSON file.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::change::{COMPARATORS, Change, ChangeKind};
use crate::observation::{Observation, ObservationKind, Payload, Timestamp};
use crate::snapshot::{DeviceState, reconstruct};

use super::{DeviceDifference, DifferenceGroup, SnapshotSource, SourceError};

/// Contents of an export file.
///
/// Either a bare array of observations, or an object:
///
/// ```json
/// { "observations": [ ... ], "devices": ["R1", "R2"] }
/// ```
///
/// `devices` is optional and derived from the observations when absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Export {
    /// The observations of the exported window.
    pub observations: Vec<Observation>,
    /// The known device identifiers, if the exporter listed them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub devices: Option<Vec<String>>,
}

impl Export {
    /// Parses export file contents.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Decode`] if the contents are not a valid export.
    pub fn parse(content: &str) -> Result<Self, SourceError> {
        if content.trim_start().starts_with('[') {
            let observations = serde_json::from_str(content).map_err(SourceError::Decode)?;
            return Ok(Self {
                observations,
                devices: None,
            });
        }
        serde_json::from_str(content).map_err(SourceError::Decode)
    }

    /// Returns the listed devices, or the sorted distinct device ids of the
    /// observations when none were listed.
    #[must_use]
    pub fn device_ids(&self) -> Vec<String> {
        self.devices.clone().unwrap_or_else(|| {
            self.observations
                .iter()
                .map(|o| o.device_id.as_str())
                .collect::<BTreeSet<_>>()
                .into_iter()
                .map(str::to_owned)
                .collect()
        })
    }
}

/// Reads an export file on every call.
///
/// The file is the whole window, so the `hours` argument of
/// [`SnapshotSource::timeline`] is ignored. Comparisons between arbitrary
/// instants are computed locally.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    /// Creates a source reading `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the path of the export file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads and parses the export file off the async runtime.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Read`] if the file cannot be read,
    /// [`SourceError::Decode`] if it is not a valid export, and
    /// [`SourceError::Task`] if the blocking task fails.
    pub async fn load(&self) -> Result<Export, SourceError> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || Self::load_blocking(&path)).await?
    }

    fn load_blocking(path: &Path) -> Result<Export, SourceError> {
        let content = std::fs::read_to_string(path).map_err(|source| SourceError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let export = Export::parse(&content)?;
        tracing::debug!(
            "Loaded {} observation(s) from {}",
            export.observations.len(),
            path.display()
        );
        Ok(export)
    }
}

impl SnapshotSource for FileSource {
    async fn timeline(&self, _hours: u32) -> Result<Vec<Observation>, SourceError> {
        Ok(self.load().await?.observations)
    }

    async fn devices(&self) -> Result<Vec<String>, SourceError> {
        Ok(self.load().await?.device_ids())
    }

    async fn compare(
        &self,
        first: &Timestamp,
        second: &Timestamp,
        kind: ObservationKind,
    ) -> Result<Vec<DeviceDifference>, SourceError> {
        let export = self.load().await?;
        let previous = reconstruct(&export.observations, first);
        let current = reconstruct(&export.observations, second);
        Ok(local_differences(&previous, &current, kind))
    }
}

/// Compares one payload kind across every device of either state.
///
/// A device or payload missing on one side compares against an empty
/// payload, so everything on the other side shows up as added or removed.
#[must_use]
pub fn local_differences(
    previous: &DeviceState,
    current: &DeviceState,
    kind: ObservationKind,
) -> Vec<DeviceDifference> {
    let Some(compare) = COMPARATORS
        .iter()
        .find_map(|&(k, compare)| (k == kind).then_some(compare))
    else {
        return Vec::new();
    };

    let empty = Payload::empty(kind);
    let device_ids: BTreeSet<&str> = previous.device_ids().chain(current.device_ids()).collect();

    device_ids
        .into_iter()
        .filter_map(|device_id| {
            let payload_of = |state: &DeviceState| {
                state
                    .device(device_id)
                    .and_then(|device| device.payload(kind))
                    .cloned()
                    .unwrap_or_else(|| empty.clone())
            };
            let changes = compare(device_id, &payload_of(previous), &payload_of(current));
            group_changes(device_id, kind, &changes)
        })
        .collect()
}

/// Groups changes by classification; `None` when there is nothing to report.
fn group_changes(
    device_id: &str,
    kind: ObservationKind,
    changes: &[Change],
) -> Option<DeviceDifference> {
    let groups: Vec<DifferenceGroup> = [ChangeKind::Added, ChangeKind::Removed, ChangeKind::Modified]
        .into_iter()
        .filter_map(|change_kind| {
            let items: Vec<String> = changes
                .iter()
                .filter(|c| c.kind == change_kind)
                .map(|c| difference_item(kind, c))
                .collect();
            (!items.is_empty()).then_some(DifferenceGroup {
                kind: change_kind,
                items,
            })
        })
        .collect();

    (!groups.is_empty()).then(|| DeviceDifference {
        device_id: device_id.to_owned(),
        changes: groups,
    })
}

/// Routes are listed by their canonical string; other kinds by description.
fn difference_item(kind: ObservationKind, change: &Change) -> String {
    match (kind, &change.details) {
        (ObservationKind::RoutingTable, Some(route)) => route.clone(),
        _ => change.description.clone(),
    }
}
