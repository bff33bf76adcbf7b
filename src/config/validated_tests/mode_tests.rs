//! Tests for command mode resolution.

use crate::observation::{ObservationKind, Timestamp};

use super::*;

#[test]
fn no_subcommand_shows_latest() {
    let config = api_config(&[]).unwrap();

    assert_eq!(config.mode, Mode::Show(Position::Latest));
}

#[test]
fn show_index() {
    let config = api_config(&["show", "--index", "4"]).unwrap();

    assert_eq!(config.mode, Mode::Show(Position::Index(4)));
}

#[test]
fn show_position() {
    let config = api_config(&["show", "--position", "37.5"]).unwrap();

    assert_eq!(config.mode, Mode::Show(Position::Percent(37.5)));
}

#[test]
fn non_finite_position_is_rejected() {
    let result = api_config(&["show", "--position", "NaN"]);

    assert!(matches!(result, Err(ConfigError::InvalidPosition { .. })));
}

#[test]
fn compare_parses_instants() {
    let config = api_config(&[
        "compare",
        "--from",
        "1714557600",
        "--to",
        "2024-05-01 11:00:00",
        "--type",
        "interfaces",
    ])
    .unwrap();

    assert_eq!(
        config.mode,
        Mode::Compare {
            first: Timestamp::Integer(1_714_557_600),
            second: Timestamp::from("2024-05-01 11:00:00"),
            kind: ObservationKind::Interfaces,
        }
    );
}

#[test]
fn devices_mode() {
    let config = api_config(&["devices"]).unwrap();

    assert_eq!(config.mode, Mode::Devices);
}

#[test]
fn display_summarizes_config() {
    let config = api_config(&["--include-device", "^R", "show", "--index", "2"]).unwrap();
    let text = config.to_string();

    assert!(text.contains("api http://collector.local/"));
    assert!(text.contains("hours: 24"));
    assert!(text.contains("show index 2"));
    assert!(text.contains("1 include / 0 exclude"));
}

#[test]
fn display_never_prints_header_values() {
    let config = api_config(&["--bearer", "super-secret"]).unwrap();

    assert!(!config.to_string().contains("super-secret"));
}
