//! Integration tests for gettext-config crate.

use gettext_common::test_utils::create_temp_dir;
use gettext_config::{ConfigError, ConfigLoader, TranslatorConfig};
use proptest::prelude::*;
use std::fs;
use std::path::Path;

#[test]
fn test_default_config_is_valid() {
    let config = TranslatorConfig::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.lang, "en");
    assert!(config.files.is_empty());
    assert!(!config.production_mode);
    assert_eq!(config.cache.expire_seconds, 7200);
}

#[test]
fn test_blank_language_is_rejected() {
    let config = TranslatorConfig {
        lang: "  ".to_string(),
        ..TranslatorConfig::default()
    };
    assert!(matches!(
        config.validate(),
        Err(ConfigError::Validation { field, .. }) if field == "lang"
    ));
}

#[test]
fn test_zero_expiry_is_rejected() {
    let mut config = TranslatorConfig::default();
    config.cache.expire_seconds = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_load_from_yaml_file() {
    let dir = create_temp_dir();
    let path = dir.path().join("gettext.yaml");
    fs::write(
        &path,
        "lang: cs\nnamespace: admin\nfiles:\n  default: /tmp/locale\n",
    )
    .unwrap();

    let config = ConfigLoader::load_from_file(&path).unwrap();
    if std::env::var("GETTEXT_LANG").is_err() {
        assert_eq!(config.lang, "cs");
    }
    assert_eq!(config.files.len(), 1);
}

#[test]
fn test_missing_file_reports_path() {
    let dir = create_temp_dir();
    let path = dir.path().join("absent.yaml");
    match ConfigLoader::load_from_file(&path) {
        Err(ConfigError::Io { path: reported, .. }) => assert_eq!(reported, path),
        other => panic!("expected an I/O error, got {other:?}"),
    }
}

#[test]
fn test_malformed_yaml_is_rejected() {
    let dir = create_temp_dir();
    let path = dir.path().join("broken.yml");
    fs::write(&path, "lang: [unterminated\n").unwrap();
    assert!(matches!(
        ConfigLoader::load_from_file(&path),
        Err(ConfigError::Yaml(_))
    ));
}

#[test]
fn test_logging_settings_convert_to_json_format() {
    let settings = gettext_config::LoggingSettings {
        level: "gettext_catalog=debug".to_string(),
        json: true,
    };
    let logging = settings.to_logging_config();
    assert_eq!(logging.level, "gettext_catalog=debug");
    assert_eq!(logging.format, gettext_common::LogFormat::Json);
}

fn config_strategy() -> impl Strategy<Value = TranslatorConfig> {
    (
        "[a-z]{2}(_[A-Z]{2})?",
        prop::collection::vec(("[a-z]{1,8}", "/[a-z]{1,8}(/[a-z]{1,8}){0,2}"), 0..5),
        any::<bool>(),
        "[A-Za-z][A-Za-z-]{0,15}",
        1u64..1_000_000,
    )
        .prop_map(|(lang, files, production_mode, namespace, expire_seconds)| {
            let mut config = TranslatorConfig {
                lang,
                production_mode,
                namespace,
                ..TranslatorConfig::default()
            };
            for (identifier, dir) in files {
                config.files.insert(identifier, dir.into());
            }
            config.cache.expire_seconds = expire_seconds;
            config
        })
}

proptest! {
    #[test]
    fn prop_yaml_config_round_trips(config in config_strategy()) {
        let yaml = serde_yaml::to_string(&config).unwrap();
        let parsed = ConfigLoader::parse(&yaml, Path::new("gettext.yaml")).unwrap();
        prop_assert!(parsed.validate().is_ok());
        prop_assert_eq!(parsed, config);
    }
}
