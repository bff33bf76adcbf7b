//! Connectivity probe comparison.

use crate::observation::{Connectivity, Payload};

use super::Change;

pub(super) fn compare(device_id: &str, previous: &Payload, current: &Payload) -> Vec<Change> {
    match (previous.as_connectivity(), current.as_connectivity()) {
        (Some(before), Some(after)) => diff_connectivity(device_id, before, after),
        _ => Vec::new(),
    }
}

/// Compares reachability over the targets probed in `current`.
///
/// A target missing from `previous` counts as unreachable before. A target
/// now reachable that was not before yields `added` (restored); one now
/// unreachable that was reachable before yields `removed` (lost).
///
/// Targets probed only in `previous` are not reported: the comparison walks
/// the current probe set only.
#[must_use]
pub fn diff_connectivity(
    device_id: &str,
    previous: &Connectivity,
    current: &Connectivity,
) -> Vec<Change> {
    current
        .iter()
        .filter(|(target, reachable)| previous.get(*target).copied().unwrap_or(false) != **reachable)
        .map(|(target, &reachable)| {
            if reachable {
                Change::connection_restored(device_id, target)
            } else {
                Change::connection_lost(device_id, target)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::change::ChangeKind;

    fn probes(entries: &[(&str, bool)]) -> Connectivity {
        entries
            .iter()
            .map(|(target, reachable)| ((*target).to_string(), *reachable))
            .collect()
    }

    #[test]
    fn lost_connection_is_removed() {
        let changes = diff_connectivity("R1", &probes(&[("R2", true)]), &probes(&[("R2", false)]));

        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].kind, ChangeKind::Removed);
        assert_eq!(changes[0].target.as_deref(), Some("R2"));
        assert!(changes[0].description.contains("connection lost"));
    }

    #[test]
    fn restored_connection_is_added() {
        let changes = diff_connectivity("R1", &probes(&[("R2", false)]), &probes(&[("R2", true)]));

        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].kind, ChangeKind::Added);
        assert!(changes[0].description.contains("connection restored"));
    }

    #[test]
    fn new_reachable_target_is_added() {
        let changes = diff_connectivity("R1", &probes(&[]), &probes(&[("R3", true)]));

        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].kind, ChangeKind::Added);
    }

    #[test]
    fn new_unreachable_target_is_not_reported() {
        let changes = diff_connectivity("R1", &probes(&[]), &probes(&[("R3", false)]));
        assert!(changes.is_empty());
    }

    #[test]
    fn vanished_targets_are_not_reported() {
        let changes = diff_connectivity(
            "R1",
            &probes(&[("R2", true), ("R3", false)]),
            &probes(&[("R2", true)]),
        );

        assert!(changes.is_empty());
    }

    #[test]
    fn targets_are_reported_in_sorted_order() {
        let changes = diff_connectivity(
            "R1",
            &probes(&[("R2", true), ("R3", true)]),
            &probes(&[("R3", false), ("R2", false)]),
        );

        let targets: Vec<_> = changes.iter().filter_map(|c| c.target.as_deref()).collect();
        assert_eq!(targets, vec!["R2", "R3"]);
    }
}
