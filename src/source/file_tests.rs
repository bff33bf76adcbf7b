//! Tests for `FileSource` and local comparisons.

use std::io::Write;

use serde_json::json;
use tempfile::NamedTempFile;

use super::{DifferenceGroup, Export, FileSource, SnapshotSource, SourceError, local_differences};
use crate::change::{ChangeKind, detect_changes};
use crate::observation::{ObservationKind, Timestamp};
use crate::snapshot::reconstruct;

fn write_export(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn routing(at: i64, device: &str, lines: &[&str]) -> serde_json::Value {
    let routes: Vec<_> = lines.iter().map(|line| json!({ "line": line })).collect();
    json!({ "timestamp": at, "device_id": device, "type": "routing_table", "data": routes })
}

fn export_document() -> String {
    json!({
        "observations": [
            routing(1, "R1", &["10.0.0.0/24 via eth0", "10.0.1.0/24 via eth1"]),
            routing(1, "R2", &["0.0.0.0/0 via 192.0.2.1"]),
            routing(2, "R1", &["10.0.0.0/24 via eth0", "10.0.2.0/24 via eth2"]),
            routing(2, "R2", &["0.0.0.0/0 via 192.0.2.1"]),
            routing(2, "R3", &["10.3.0.0/16 via eth0"]),
            {"timestamp": 2, "device_id": "R1", "type": "interfaces",
             "data": [{"name": "eth0", "status": "up"}]}
        ]
    })
    .to_string()
}

mod export {
    use super::*;

    #[test]
    fn parses_document_with_device_list() {
        let export = Export::parse(r#"{"observations": [], "devices": ["R2", "R1"]}"#).unwrap();

        assert!(export.observations.is_empty());
        assert_eq!(export.device_ids(), vec!["R2", "R1"]);
    }

    #[test]
    fn derives_sorted_devices_when_absent() {
        let export = Export::parse(&export_document()).unwrap();

        assert!(export.devices.is_none());
        assert_eq!(export.device_ids(), vec!["R1", "R2", "R3"]);
    }

    #[test]
    fn accepts_bare_observation_array() {
        let content = json!([routing(5, "R9", &["x"])]).to_string();

        let export = Export::parse(&format!("\n  {content}")).unwrap();

        assert_eq!(export.observations.len(), 1);
        assert_eq!(export.observations[0].timestamp, Timestamp::from(5));
    }

    #[test]
    fn rejects_invalid_json() {
        assert!(matches!(
            Export::parse("{not json"),
            Err(SourceError::Decode(_))
        ));
    }

    #[test]
    fn accepts_fractional_timestamps() {
        let export = Export::parse(
            r#"[{"timestamp": 1714564800.5, "device_id": "R1", "type": "interfaces",
                 "data": [{"name": "eth0", "status": "up"}]}]"#,
        )
        .unwrap();

        assert_eq!(export.observations[0].timestamp, Timestamp::from(1_714_564_800.5));
    }

    #[test]
    fn unexpected_connectivity_shape_keeps_the_window() {
        let content = json!([
            routing(1, "R1", &["10.0.0.0/24 via eth0"]),
            {"timestamp": 1, "device_id": "network", "type": "connectivity",
             "data": {"R1": {"R2": true}}}
        ])
        .to_string();

        let export = Export::parse(&content).unwrap();
        let state = reconstruct(&export.observations, &Timestamp::from(1));

        assert_eq!(export.observations.len(), 2);
        assert_eq!(state.device("R1").unwrap().routing_table().unwrap().len(), 1);
        assert!(state.device("network").unwrap().connectivity().is_none());
        assert!(detect_changes(&state, &state).is_empty());
        assert!(local_differences(&state, &state, ObservationKind::Connectivity).is_empty());
    }

    #[test]
    fn rejects_document_without_observations() {
        assert!(Export::parse(r#"{"devices": []}"#).is_err());
    }
}

mod file_source {
    use super::*;

    #[tokio::test]
    async fn timeline_returns_every_observation() {
        let file = write_export(&export_document());
        let source = FileSource::new(file.path());

        let observations = source.timeline(1).await.unwrap();

        assert_eq!(observations.len(), 6);
        assert_eq!(source.path(), file.path());
    }

    #[tokio::test]
    async fn devices_derived_from_file() {
        let file = write_export(&export_document());

        let devices = FileSource::new(file.path()).devices().await.unwrap();

        assert_eq!(devices, vec!["R1", "R2", "R3"]);
    }

    #[tokio::test]
    async fn missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");

        let error = FileSource::new(&path).timeline(24).await.unwrap_err();

        match error {
            SourceError::Read { path: failed, .. } => assert_eq!(failed, path),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn file_is_reread_on_every_call() {
        let file = write_export(r#"{"observations": []}"#);
        let source = FileSource::new(file.path());
        assert!(source.timeline(1).await.unwrap().is_empty());

        std::fs::write(file.path(), export_document()).unwrap();

        assert_eq!(source.timeline(1).await.unwrap().len(), 6);
    }

    #[tokio::test]
    async fn compare_groups_routes_per_device() {
        let file = write_export(&export_document());
        let source = FileSource::new(file.path());

        let differences = source
            .compare(
                &Timestamp::from(1),
                &Timestamp::from(2),
                ObservationKind::RoutingTable,
            )
            .await
            .unwrap();

        assert_eq!(differences.len(), 2);

        assert_eq!(differences[0].device_id, "R1");
        assert_eq!(
            differences[0].changes,
            vec![
                DifferenceGroup {
                    kind: ChangeKind::Added,
                    items: vec!["10.0.2.0/24 via eth2".to_string()],
                },
                DifferenceGroup {
                    kind: ChangeKind::Removed,
                    items: vec!["10.0.1.0/24 via eth1".to_string()],
                },
            ]
        );

        assert_eq!(differences[1].device_id, "R3");
        assert_eq!(differences[1].changes[0].kind, ChangeKind::Added);
    }
}

mod local_compare {
    use super::*;

    #[test]
    fn identical_instants_have_no_differences() {
        let export = Export::parse(&export_document()).unwrap();
        let state = reconstruct(&export.observations, &Timestamp::from(2));

        assert!(local_differences(&state, &state, ObservationKind::RoutingTable).is_empty());
    }

    #[test]
    fn interface_differences_use_descriptions() {
        let export = Export::parse(&export_document()).unwrap();
        let before = reconstruct(&export.observations, &Timestamp::from(1));
        let after = reconstruct(&export.observations, &Timestamp::from(2));

        let differences = local_differences(&before, &after, ObservationKind::Interfaces);

        assert_eq!(differences.len(), 1);
        assert_eq!(
            differences[0].changes,
            vec![DifferenceGroup {
                kind: ChangeKind::Added,
                items: vec!["interface eth0 - interface added".to_string()],
            }]
        );
    }

    #[test]
    fn serializes_in_collector_shape() {
        let export = Export::parse(&export_document()).unwrap();
        let before = reconstruct(&export.observations, &Timestamp::from(1));
        let after = reconstruct(&export.observations, &Timestamp::from(2));

        let differences = local_differences(&before, &after, ObservationKind::RoutingTable);
        let value = serde_json::to_value(&differences[1]).unwrap();

        assert_eq!(
            value,
            json!({
                "device_id": "R3",
                "changes": [{"type": "added", "items": ["10.3.0.0/16 via eth0"]}]
            })
        );
    }
}
