#![allow(clippy::unwrap_used)]
//! Config priority contract tests.
//!
//! Priority order (highest to lowest):
//! 1. CLI arguments
//! 2. Config file settings
//! 3. Built-in defaults

use std::time::Duration;

use polychat_cli::config::{
    AuthConfig, ConfigFile, DEFAULT_CATALOG_URL, PolychatConfig, ResolveOptions,
    TranslationConfig, resolve_config,
};

fn make_config() -> ConfigFile {
    ConfigFile {
        polychat: PolychatConfig {
            server: Some("wss://file.example.com".to_string()),
            language: Some("de".to_string()),
            connect_timeout_secs: Some(5),
        },
        translation: TranslationConfig {
            api: Some("https://file-api.example.com".to_string()),
            catalog: None,
            timeout_secs: None,
        },
        auth: AuthConfig {
            user_id: Some("u1".to_string()),
            first_name: Some("Sam".to_string()),
            token: Some("token".to_string()),
            token_env: None,
        },
    }
}

#[test]
fn test_cli_language_overrides_config_language() {
    let options = ResolveOptions {
        language: Some("ja".to_string()),
        ..ResolveOptions::default()
    };

    let resolved = resolve_config(&options, &make_config()).unwrap();

    assert_eq!(resolved.language, "ja");
    assert_eq!(resolved.server, "wss://file.example.com");
}

#[test]
fn test_cli_endpoints_override_config_endpoints() {
    let options = ResolveOptions {
        language: None,
        server: Some("ws://127.0.0.1:8080".to_string()),
        api: Some("http://127.0.0.1:3000".to_string()),
    };

    let resolved = resolve_config(&options, &make_config()).unwrap();

    assert_eq!(resolved.server, "ws://127.0.0.1:8080");
    assert_eq!(resolved.api_url, "http://127.0.0.1:3000");
    assert_eq!(resolved.language, "de");
}

#[test]
fn test_cli_api_satisfies_missing_file_api() {
    let mut config = make_config();
    config.translation.api = None;

    assert!(resolve_config(&ResolveOptions::default(), &config).is_err());

    let options = ResolveOptions {
        api: Some("http://127.0.0.1:3000".to_string()),
        ..ResolveOptions::default()
    };
    assert!(resolve_config(&options, &config).is_ok());
}

#[test]
fn test_builtin_defaults_apply_last() {
    let mut config = make_config();
    config.polychat.language = None;

    let resolved = resolve_config(&ResolveOptions::default(), &config).unwrap();

    assert_eq!(resolved.language, "en");
    assert_eq!(resolved.catalog_url, DEFAULT_CATALOG_URL);
    assert_eq!(resolved.connect_timeout, Duration::from_secs(5));
    assert_eq!(resolved.translate_timeout, Duration::from_secs(10));
}
