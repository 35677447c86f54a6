use std::time::Duration;

use runtask_watch::config::*;

#[test]
fn load_config_defaults_when_file_missing() {
    let dir = tempfile::tempdir().unwrap();
    let config = load_config(dir.path()).unwrap();

    assert_eq!(config, WatchConfig::default());
    assert_eq!(config.remote.address, "https://app.terraform.io");
    assert_eq!(config.remote.token_env, "TFE_TOKEN");
    assert_eq!(config.polling.backoff_min_ms, 1000);
    assert_eq!(config.polling.backoff_max_ms, 3000);
    assert_eq!(config.output.title, "Run tasks");
    assert!(config.output.color);
}

#[test]
fn partial_file_keeps_other_defaults() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join(CONFIG_FILE_NAME),
        r#"
[polling]
backoff_max_ms = 10000

[output]
color = false
"#,
    )
    .unwrap();

    let config = load_config(dir.path()).unwrap();
    assert_eq!(config.polling.backoff_min_ms, 1000);
    assert_eq!(config.polling.backoff_max_ms, 10000);
    assert!(!config.output.color);
    assert_eq!(config.output.title, "Run tasks");
}

#[test]
fn backoff_built_from_polling_config() {
    let polling = PollingConfig {
        backoff_min_ms: 200,
        backoff_max_ms: 800,
    };
    let backoff = polling.backoff();
    assert_eq!(backoff.min(), Duration::from_millis(200));
    assert_eq!(backoff.max(), Duration::from_millis(800));
}

#[test]
fn validate_collects_every_problem() {
    let mut config = WatchConfig::default();
    config.polling.backoff_min_ms = 0;
    config.remote.address = " ".to_string();
    config.output.title = String::new();

    let errors = validate(&config).unwrap_err();
    assert_eq!(errors.len(), 3, "{:?}", errors);
}

#[test]
fn validate_rejects_min_above_max() {
    let mut config = WatchConfig::default();
    config.polling.backoff_min_ms = 5000;

    let errors = validate(&config).unwrap_err();
    assert!(errors[0].contains("must not exceed"));
}

#[test]
fn load_config_file_reports_validation_failures() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("custom.toml");
    std::fs::write(&path, "[polling]\nbackoff_min_ms = 0\n").unwrap();

    let err = load_config_file(&path).unwrap_err();
    assert!(err.starts_with("Config validation failed:"), "{}", err);
    assert!(err.contains("  - polling.backoff_min_ms must be >= 1"));
}

#[test]
fn load_config_file_reports_parse_errors() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.toml");
    std::fs::write(&path, "[polling\n").unwrap();

    let err = load_config_file(&path).unwrap_err();
    assert!(err.starts_with("Failed to parse"), "{}", err);
}

#[test]
fn load_config_file_requires_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_config_file(&dir.path().join("missing.toml")).unwrap_err();
    assert!(err.starts_with("Failed to read"));
}

#[test]
fn token_ignores_blank_values() {
    let remote = RemoteConfig {
        address: "https://example.test".to_string(),
        token_env: "RUNTASK_WATCH_TEST_BLANK_TOKEN".to_string(),
    };
    std::env::set_var("RUNTASK_WATCH_TEST_BLANK_TOKEN", "  ");
    assert_eq!(remote.token(), None);

    std::env::set_var("RUNTASK_WATCH_TEST_BLANK_TOKEN", "secret");
    assert_eq!(remote.token().as_deref(), Some("secret"));
    std::env::remove_var("RUNTASK_WATCH_TEST_BLANK_TOKEN");
}
