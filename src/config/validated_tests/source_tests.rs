//! Tests for source resolution and HTTP headers.

use std::path::PathBuf;

use http::header::AUTHORIZATION;

use super::*;
use crate::config::field;

fn api_parts(config: &ValidatedConfig) -> (&url::Url, &http::HeaderMap) {
    match &config.source {
        SourceConfig::Api { url, headers } => (url, headers),
        SourceConfig::File(path) => panic!("expected API source, got file {}", path.display()),
    }
}

mod required_source {
    use super::*;

    #[test]
    fn missing_source_returns_error() {
        let result = ValidatedConfig::from_raw(&cli(&[]), None);

        assert!(matches!(
            result,
            Err(ConfigError::MissingRequired {
                field: field::SOURCE,
                ..
            })
        ));
    }

    #[test]
    fn url_from_cli() {
        let config = api_config(&[]).unwrap();

        assert_eq!(api_parts(&config).0.as_str(), "http://collector.local/");
    }

    #[test]
    fn input_file_from_cli() {
        let config = ValidatedConfig::from_raw(&cli(&["--input", "export.json"]), None).unwrap();

        assert_eq!(config.source, SourceConfig::File(PathBuf::from("export.json")));
    }

    #[test]
    fn url_from_toml() {
        let toml = toml(
            r#"
            [source]
            url = "https://collector.example.com/netmon"
        "#,
        );

        let config = ValidatedConfig::from_raw(&cli(&[]), Some(&toml)).unwrap();

        assert_eq!(
            api_parts(&config).0.as_str(),
            "https://collector.example.com/netmon"
        );
    }

    #[test]
    fn file_from_toml() {
        let toml = toml(
            r#"
            [source]
            file = "export.json"
        "#,
        );

        let config = ValidatedConfig::from_raw(&cli(&[]), Some(&toml)).unwrap();

        assert_eq!(config.source, SourceConfig::File(PathBuf::from("export.json")));
    }

    #[test]
    fn toml_with_both_url_and_file_is_rejected() {
        let toml = toml(
            r#"
            [source]
            url = "http://collector.local"
            file = "export.json"
        "#,
        );

        let result = ValidatedConfig::from_raw(&cli(&[]), Some(&toml));

        assert!(matches!(result, Err(ConfigError::ConflictingSources)));
    }

    #[test]
    fn cli_source_resolves_toml_conflict() {
        let toml = toml(
            r#"
            [source]
            url = "http://collector.local"
            file = "export.json"
        "#,
        );

        let config =
            ValidatedConfig::from_raw(&cli(&["--input", "other.json"]), Some(&toml)).unwrap();

        assert_eq!(config.source, SourceConfig::File(PathBuf::from("other.json")));
    }
}

mod url_validation {
    use super::*;

    #[test]
    fn invalid_url_is_rejected() {
        let result = ValidatedConfig::from_raw(&cli(&["--url", "not a url"]), None);

        assert!(matches!(result, Err(ConfigError::InvalidUrl { .. })));
    }

    #[test]
    fn non_http_scheme_is_rejected() {
        let result = ValidatedConfig::from_raw(&cli(&["--url", "ftp://collector.local"]), None);

        match result {
            Err(ConfigError::InvalidUrl { url, reason }) => {
                assert_eq!(url, "ftp://collector.local");
                assert!(reason.contains("ftp"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}

mod headers {
    use super::*;

    #[test]
    fn equals_and_colon_formats() {
        let config = api_config(&["--header", "X-Api-Key=secret", "--header", "X-Site: paris"]).unwrap();
        let headers = api_parts(&config).1;

        assert_eq!(headers.get("x-api-key").unwrap(), "secret");
        assert_eq!(headers.get("x-site").unwrap(), "paris");
    }

    #[test]
    fn bearer_sets_authorization() {
        let config = api_config(&["--bearer", "t0ken"]).unwrap();

        assert_eq!(
            api_parts(&config).1.get(AUTHORIZATION).unwrap(),
            "Bearer t0ken"
        );
    }

    #[test]
    fn toml_headers_and_bearer() {
        let toml = toml(
            r#"
            [source]
            url = "http://collector.local"
            bearer = "from-toml"

            [source.headers]
            X-Site = "lyon"
        "#,
        );

        let config = ValidatedConfig::from_raw(&cli(&[]), Some(&toml)).unwrap();
        let headers = api_parts(&config).1;

        assert_eq!(headers.get("x-site").unwrap(), "lyon");
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer from-toml");
    }

    #[test]
    fn cli_headers_override_toml_headers() {
        let toml = toml(
            r#"
            [source.headers]
            X-Site = "lyon"
        "#,
        );

        let config = ValidatedConfig::from_raw(
            &cli(&["--url", "http://collector.local", "--header", "X-Site=paris"]),
            Some(&toml),
        )
        .unwrap();

        assert_eq!(api_parts(&config).1.get("x-site").unwrap(), "paris");
    }

    #[test]
    fn header_without_separator_is_rejected() {
        let result = api_config(&["--header", "NoSeparator"]);

        assert!(matches!(result, Err(ConfigError::InvalidHeader { .. })));
    }

    #[test]
    fn invalid_header_name_is_rejected() {
        let result = api_config(&["--header", "Bad Name=value"]);

        assert!(matches!(result, Err(ConfigError::InvalidHeaderName { .. })));
    }

    #[test]
    fn invalid_header_value_is_rejected() {
        let result = api_config(&["--header", "X-Key=line\nbreak"]);

        assert!(matches!(result, Err(ConfigError::InvalidHeaderValue { .. })));
    }

    #[test]
    fn headers_are_ignored_for_file_source() {
        let config = ValidatedConfig::from_raw(
            &cli(&["--input", "export.json", "--header", "NoSeparator"]),
            None,
        )
        .unwrap();

        assert!(matches!(config.source, SourceConfig::File(_)));
    }
}
