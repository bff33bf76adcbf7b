//! Tests for change detection orchestration.

use serde_json::json;

use super::*;
use crate::observation::{Connectivity, InterfaceRecord, Observation, RouteRecord, Timestamp};
use crate::snapshot::reconstruct;

/// Builds a state from `(device, payload)` pairs, all at one instant.
fn state(entries: Vec<(&str, Payload)>) -> DeviceState {
    let observations: Vec<Observation> = entries
        .into_iter()
        .map(|(device, payload)| Observation::new(1, device, payload))
        .collect();
    reconstruct(&observations, &Timestamp::from(1))
}

fn routes(lines: &[&str]) -> Payload {
    Payload::RoutingTable(lines.iter().copied().map(RouteRecord::from_line).collect())
}

fn interfaces(entries: &[(&str, &str)]) -> Payload {
    Payload::Interfaces(
        entries
            .iter()
            .map(|(name, status)| InterfaceRecord::new(*name, *status))
            .collect(),
    )
}

fn probes(entries: &[(&str, bool)]) -> Payload {
    Payload::Connectivity(
        entries
            .iter()
            .map(|(target, reachable)| ((*target).to_string(), *reachable))
            .collect::<Connectivity>(),
    )
}

/// A device carrying every recognized payload kind.
fn full_device(route: &str, status: &str, reachable: bool) -> Vec<Payload> {
    vec![
        routes(&[route]),
        interfaces(&[("eth0", status)]),
        probes(&[("R9", reachable)]),
    ]
}

fn device_state(devices: Vec<(&str, Vec<Payload>)>) -> DeviceState {
    state(
        devices
            .into_iter()
            .flat_map(|(device, payloads)| payloads.into_iter().map(move |p| (device, p)))
            .collect(),
    )
}

mod change_kind {
    use super::*;

    #[test]
    fn serializes_lowercase() {
        assert_eq!(serde_json::to_value(ChangeKind::Added).unwrap(), json!("added"));
        assert_eq!(serde_json::to_value(ChangeKind::Removed).unwrap(), json!("removed"));
        assert_eq!(
            serde_json::to_value(ChangeKind::Modified).unwrap(),
            json!("modified")
        );
    }

    #[test]
    fn display_matches_wire_name() {
        assert_eq!(ChangeKind::Modified.to_string(), "modified");
    }
}

mod change {
    use super::*;

    #[test]
    fn serializes_only_present_fields() {
        let change = Change::interface_added("R1", "eth0");

        assert_eq!(
            serde_json::to_value(&change).unwrap(),
            json!({
                "type": "added",
                "device_id": "R1",
                "description": "interface eth0 - interface added",
                "interface": "eth0"
            })
        );
    }

    #[test]
    fn device_changes_have_no_sub_keys() {
        let change = Change::device_removed("R1");

        assert!(change.is_removed());
        assert!(change.details.is_none());
        assert!(change.interface.is_none());
        assert!(change.target.is_none());
        assert_eq!(change.description, "device removed or unreachable");
    }

    #[test]
    fn predicates_match_kind() {
        assert!(Change::device_added("R1").is_added());
        assert!(Change::connection_lost("R1", "R2").is_removed());
        assert!(
            Change::interface_status_changed(
                "R1",
                "eth0",
                &"up".into(),
                &"down".into()
            )
            .is_modified()
        );
    }
}

mod detect_changes_fn {
    use super::*;

    #[test]
    fn identical_states_have_no_changes() {
        let s = device_state(vec![
            ("R1", full_device("10.0.0.0/24 via eth0", "up", true)),
            ("R2", full_device("10.0.1.0/24 via eth1", "down", false)),
        ]);

        assert!(detect_changes(&s, &s).is_empty());
    }

    #[test]
    fn empty_states_have_no_changes() {
        assert!(detect_changes(&DeviceState::new(), &DeviceState::new()).is_empty());
    }

    #[test]
    fn interface_status_flip_scenario() {
        let previous = state(vec![("devR1", interfaces(&[("eth0", "up")]))]);
        let current = state(vec![("devR1", interfaces(&[("eth0", "down")]))]);

        let changes = detect_changes(&previous, &current);

        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].kind, ChangeKind::Modified);
        assert_eq!(changes[0].device_id, "devR1");
        assert_eq!(changes[0].interface.as_deref(), Some("eth0"));
        assert!(changes[0].description.contains("up → down"));
    }

    #[test]
    fn new_device_scenario() {
        let current = device_state(vec![("devA", full_device("r", "up", true))]);

        let changes = detect_changes(&DeviceState::new(), &current);

        assert_eq!(changes, vec![Change::device_added("devA")]);
        assert_eq!(changes[0].description, "new device detected");
    }

    #[test]
    fn added_route_scenario() {
        let previous = state(vec![("R1", routes(&["10.0.0.0/24 via eth0"]))]);
        let current = state(vec![(
            "R1",
            routes(&["10.0.0.0/24 via eth0", "10.0.1.0/24 via eth1"]),
        )]);

        let changes = detect_changes(&previous, &current);

        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].kind, ChangeKind::Added);
        assert_eq!(changes[0].details.as_deref(), Some("10.0.1.0/24 via eth1"));
    }

    #[test]
    fn removed_device_is_one_change() {
        let previous = device_state(vec![("R1", full_device("r", "up", true))]);

        let changes = detect_changes(&previous, &DeviceState::new());

        assert_eq!(changes, vec![Change::device_removed("R1")]);
    }

    #[test]
    fn device_level_changes_suppress_sub_changes() {
        let previous = device_state(vec![
            ("kept", full_device("a", "up", true)),
            ("old", full_device("b", "up", true)),
        ]);
        let current = device_state(vec![
            ("kept", full_device("a", "up", true)),
            ("new", full_device("c", "down", false)),
        ]);

        let changes = detect_changes(&previous, &current);

        assert_eq!(
            changes,
            vec![Change::device_added("new"), Change::device_removed("old")]
        );
    }

    #[test]
    fn route_classification_is_symmetric() {
        let a = state(vec![("R1", routes(&["x", "y"]))]);
        let b = state(vec![("R1", routes(&["y", "z"]))]);

        let forward = detect_changes(&a, &b);
        let backward = detect_changes(&b, &a);

        let route_of = |changes: &[Change], kind: ChangeKind| -> Vec<String> {
            changes
                .iter()
                .filter(|c| c.kind == kind)
                .filter_map(|c| c.details.clone())
                .collect()
        };

        assert_eq!(route_of(&forward, ChangeKind::Added), vec!["z"]);
        assert_eq!(route_of(&forward, ChangeKind::Removed), vec!["x"]);
        assert_eq!(
            route_of(&forward, ChangeKind::Added),
            route_of(&backward, ChangeKind::Removed)
        );
        assert_eq!(
            route_of(&forward, ChangeKind::Removed),
            route_of(&backward, ChangeKind::Added)
        );
    }

    #[test]
    fn comparators_run_in_fixed_order_per_device() {
        let previous = device_state(vec![("R1", full_device("old-route", "up", true))]);
        let current = device_state(vec![("R1", full_device("new-route", "down", false))]);

        let changes = detect_changes(&previous, &current);

        let descriptions: Vec<&str> = changes.iter().map(|c| c.description.as_str()).collect();
        assert_eq!(
            descriptions,
            vec![
                "routing change - route added",
                "routing change - route removed",
                "interface eth0 - status changed: up → down",
                "connectivity to R9 - connection lost",
            ]
        );
    }

    #[test]
    fn current_devices_come_before_removed_devices() {
        let previous = device_state(vec![
            ("A-gone", vec![interfaces(&[])]),
            ("B", vec![interfaces(&[("eth0", "up")])]),
        ]);
        let current = device_state(vec![("B", vec![interfaces(&[("eth0", "down")])])]);

        let changes = detect_changes(&previous, &current);

        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].device_id, "B");
        assert_eq!(changes[1], Change::device_removed("A-gone"));
    }

    #[test]
    fn payload_missing_on_one_side_is_skipped() {
        let previous = state(vec![("R1", routes(&["a"]))]);
        let current = state(vec![
            ("R1", routes(&["a"])),
            ("R1", interfaces(&[("eth0", "up")])),
        ]);

        assert!(detect_changes(&previous, &current).is_empty());
        assert!(detect_changes(&current, &previous).is_empty());
    }

    #[test]
    fn unrecognized_payloads_are_ignored() {
        let other = |peer: &str| Payload::Other {
            kind: "bgp_sessions".to_string(),
            data: json!({"peer": peer}),
        };
        let previous = state(vec![("R1", other("10.0.0.2"))]);
        let current = state(vec![("R1", other("10.0.0.3"))]);

        assert!(detect_changes(&previous, &current).is_empty());
    }

    #[test]
    fn route_field_reorder_is_not_a_change() {
        let record = |json: &str| serde_json::from_str::<RouteRecord>(json).unwrap();
        let previous = state(vec![(
            "R1",
            Payload::RoutingTable(vec![record(r#"{"line": "10.0.0.0/24 via eth0", "type": "S"}"#)]),
        )]);
        let current = state(vec![(
            "R1",
            Payload::RoutingTable(vec![record(r#"{"type": "S", "line": "10.0.0.0/24 via eth0"}"#)]),
        )]);

        assert!(detect_changes(&previous, &current).is_empty());
    }

    #[test]
    fn output_is_independent_of_arrival_order() {
        let forward = state(vec![
            ("R1", interfaces(&[("eth0", "down")])),
            ("R2", interfaces(&[("eth0", "down")])),
        ]);
        let reversed = state(vec![
            ("R2", interfaces(&[("eth0", "down")])),
            ("R1", interfaces(&[("eth0", "down")])),
        ]);
        let previous = state(vec![
            ("R1", interfaces(&[("eth0", "up")])),
            ("R2", interfaces(&[("eth0", "up")])),
        ]);

        assert_eq!(
            detect_changes(&previous, &forward),
            detect_changes(&previous, &reversed)
        );
    }

    #[test]
    fn comparator_table_covers_every_recognized_kind() {
        let kinds: Vec<ObservationKind> = COMPARATORS.iter().map(|(kind, _)| *kind).collect();
        assert_eq!(kinds, ObservationKind::ALL.to_vec());
    }
}
