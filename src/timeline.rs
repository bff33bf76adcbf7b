//! Timeline navigation over a loaded observation window.
//!
//! A [`Timeline`] owns the observations of one window and the ordered set of
//! distinct instants they cover. Positions are plain indices owned by the
//! caller; every accessor takes the index explicitly and treats an index out
//! of range as "nothing to do" rather than an error.

use serde::Serialize;

use crate::change::{Change, detect_changes};
use crate::observation::{Observation, Timestamp};
use crate::snapshot::{DeviceState, distinct_instants, reconstruct};

#[cfg(test)]
#[path = "timeline_tests.rs"]
mod tests;

/// Result of comparing an instant with its predecessor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "changes", rename_all = "snake_case")]
pub enum Comparison {
    /// The instant is the first of the window; there is nothing to compare with.
    FirstSnapshot,
    /// Changes from the preceding instant (possibly empty).
    Changes(Vec<Change>),
}

impl Comparison {
    /// Returns the changes, or an empty slice for the first snapshot.
    #[must_use]
    pub fn changes(&self) -> &[Change] {
        match self {
            Self::FirstSnapshot => &[],
            Self::Changes(changes) => changes,
        }
    }

    /// Returns true if this is the first snapshot of the window.
    #[must_use]
    pub const fn is_first_snapshot(&self) -> bool {
        matches!(self, Self::FirstSnapshot)
    }
}

/// Everything a renderer needs for one selected position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Selection {
    /// Position within the timeline.
    pub index: usize,
    /// The instant at that position.
    pub instant: Timestamp,
    /// The reconstructed network state at that instant.
    pub state: DeviceState,
    /// Changes relative to the preceding instant.
    pub comparison: Comparison,
}

/// A loaded window of observations with its ordered instants.
#[derive(Debug, Clone, Default)]
pub struct Timeline {
    observations: Vec<Observation>,
    instants: Vec<Timestamp>,
}

impl Timeline {
    /// Creates a timeline over the given observations.
    #[must_use]
    pub fn new(observations: Vec<Observation>) -> Self {
        let instants = distinct_instants(&observations);
        Self {
            observations,
            instants,
        }
    }

    /// Returns the number of distinct instants.
    #[must_use]
    pub fn len(&self) -> usize {
        self.instants.len()
    }

    /// Returns `true` if the window holds no observations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instants.is_empty()
    }

    /// Returns the distinct instants in ascending order.
    #[must_use]
    pub fn instants(&self) -> &[Timestamp] {
        &self.instants
    }

    /// Returns the raw observations of the window.
    #[must_use]
    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    /// Returns the instant at `index`.
    #[must_use]
    pub fn instant(&self, index: usize) -> Option<&Timestamp> {
        self.instants.get(index)
    }

    /// Returns the earliest instant of the window.
    #[must_use]
    pub fn first(&self) -> Option<&Timestamp> {
        self.instants.first()
    }

    /// Returns the latest instant of the window.
    #[must_use]
    pub fn last(&self) -> Option<&Timestamp> {
        self.instants.last()
    }

    /// Returns the index of the latest instant.
    #[must_use]
    pub fn latest_index(&self) -> Option<usize> {
        self.instants.len().checked_sub(1)
    }

    /// Reconstructs the network state at `index`.
    #[must_use]
    pub fn state_at(&self, index: usize) -> Option<DeviceState> {
        self.instant(index)
            .map(|instant| reconstruct(&self.observations, instant))
    }

    /// Compares the state at `index` with the state at `index - 1`.
    ///
    /// Index 0 has no predecessor and yields [`Comparison::FirstSnapshot`].
    #[must_use]
    pub fn changes_at(&self, index: usize) -> Option<Comparison> {
        let current = self.state_at(index)?;
        Some(self.compare_with_predecessor(index, &current))
    }

    /// Bundles the instant, state and comparison at `index`.
    #[must_use]
    pub fn select(&self, index: usize) -> Option<Selection> {
        let instant = self.instant(index)?.clone();
        let state = reconstruct(&self.observations, &instant);
        let comparison = self.compare_with_predecessor(index, &state);

        Some(Selection {
            index,
            instant,
            state,
            comparison,
        })
    }

    /// Maps a slider position (percent, 0–100) to an index.
    ///
    /// The position is floored onto `[0, len - 1]`; values outside 0–100 are
    /// clamped. Returns `None` for an empty timeline or a non-finite position.
    #[must_use]
    pub fn index_for_position(&self, percent: f64) -> Option<usize> {
        let last = self.latest_index()?;
        if !percent.is_finite() {
            return None;
        }

        let fraction = (percent / 100.0).clamp(0.0, 1.0);
        // Indices are far below 2^52, so the float round trip is exact.
        #[allow(
            clippy::cast_precision_loss,
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss
        )]
        let index = (fraction * last as f64).floor() as usize;
        Some(index.min(last))
    }

    fn compare_with_predecessor(&self, index: usize, current: &DeviceState) -> Comparison {
        let Some(previous_index) = index.checked_sub(1) else {
            return Comparison::FirstSnapshot;
        };

        let previous = self.state_at(previous_index).unwrap_or_default();
        Comparison::Changes(detect_changes(&previous, current))
    }
}
