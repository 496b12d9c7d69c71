//! Layered loading through figment.

use std::fs;

use fob_dev_config::{CONFIG_FILE_NAME, ConfigError, ConfigLoader, IndexOption, StatsSetting};
use tempfile::TempDir;

#[test]
fn missing_conventional_file_yields_defaults() {
    let temp = TempDir::new().unwrap();
    let loader = ConfigLoader::new(temp.path()).without_env();

    assert!(loader.config_path().is_none());
    let config = loader.load().unwrap();
    assert_eq!(config.index, IndexOption::Default);
}

#[test]
fn conventional_file_is_merged_over_defaults() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join(CONFIG_FILE_NAME),
        "public_path = \"/static/\"\nstats = false\n",
    )
    .unwrap();

    let config = ConfigLoader::new(temp.path()).without_env().load().unwrap();

    assert_eq!(config.public_path.as_deref(), Some("/static/"));
    assert_eq!(config.stats, Some(StatsSetting::Toggle(false)));
    // Untouched fields keep their defaults
    assert_eq!(config.methods, vec!["GET".to_string(), "HEAD".to_string()]);
}

#[test]
fn explicit_file_must_exist() {
    let temp = TempDir::new().unwrap();
    let err = ConfigLoader::new(temp.path())
        .with_file("custom.toml")
        .without_env()
        .load()
        .unwrap_err();

    assert!(matches!(err, ConfigError::NotFound(path) if path.ends_with("custom.toml")));
}

#[test]
fn explicit_file_replaces_conventional() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join(CONFIG_FILE_NAME), "index = false\n").unwrap();
    fs::write(temp.path().join("custom.toml"), "index = \"home.html\"\n").unwrap();

    let config = ConfigLoader::new(temp.path())
        .with_file("custom.toml")
        .without_env()
        .load()
        .unwrap();

    assert_eq!(config.index, IndexOption::File("home.html".into()));
}

#[test]
fn type_errors_surface_as_figment_errors() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join(CONFIG_FILE_NAME), "methods = 42\n").unwrap();

    let err = ConfigLoader::new(temp.path()).without_env().load().unwrap_err();
    assert!(matches!(err, ConfigError::Figment(_)));
}

#[test]
fn validation_runs_after_merge() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join(CONFIG_FILE_NAME), "methods = []\n").unwrap();

    let err = ConfigLoader::new(temp.path()).without_env().load().unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { .. }));
}
