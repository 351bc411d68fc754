//! Integration tests for configuration loading and graceful degradation
//!
//! Tests that manipulate AAVA_CONFIG are marked #[serial] so they do not
//! race each other on the process environment.

use aava_common::config::{resolve_config_path, ConfigSource, TomlConfig, CONFIG_ENV_VAR};
use aava_common::{ConfidenceScale, Error};
use serial_test::serial;
use std::env;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
#[serial]
fn test_env_var_used_when_no_cli_arg() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "env.toml", "[service]\nport = 6001\n");
    env::set_var(CONFIG_ENV_VAR, &path);

    assert_eq!(resolve_config_path(None), Some(path.clone()));
    let config = TomlConfig::resolve_and_load(None).unwrap();
    assert_eq!(config.service.port, 6001);

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_cli_arg_takes_precedence_over_env_var() {
    let dir = TempDir::new().unwrap();
    let env_path = write_file(&dir, "env.toml", "[service]\nport = 6001\n");
    let cli_path = write_file(&dir, "cli.toml", "[service]\nport = 6002\n");
    env::set_var(CONFIG_ENV_VAR, &env_path);

    let config = TomlConfig::resolve_and_load(Some(&cli_path)).unwrap();
    assert_eq!(config.service.port, 6002);

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_missing_explicit_file_degrades_to_defaults() {
    env::remove_var(CONFIG_ENV_VAR);
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("does-not-exist.toml");

    let config = TomlConfig::resolve_and_load(Some(&missing)).unwrap();
    assert_eq!(config, TomlConfig::default());
}

#[test]
#[serial]
fn test_resolved_path_is_loaded_once_with_its_source() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "env.toml", "[service]\nport = 6003\n");
    env::set_var(CONFIG_ENV_VAR, &path);

    let resolved = resolve_config_path(None);
    let (config, source) = TomlConfig::load_resolved(resolved).unwrap();
    assert_eq!(config.service.port, 6003);
    assert_eq!(source, ConfigSource::File(path.clone()));
    assert!(!source.is_default());

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_missing_file_source_is_reported() {
    env::remove_var(CONFIG_ENV_VAR);
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("absent.toml");

    let (config, source) =
        TomlConfig::load_resolved(resolve_config_path(Some(&missing))).unwrap();
    assert_eq!(config, TomlConfig::default());
    assert_eq!(source, ConfigSource::Missing(missing));
}

#[test]
#[serial]
fn test_malformed_file_is_an_error() {
    env::remove_var(CONFIG_ENV_VAR);
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "bad.toml", "[service\nport = ");

    let result = TomlConfig::resolve_and_load(Some(&path));
    assert!(matches!(result, Err(Error::Toml(_))));
}

#[test]
fn test_full_document() {
    let dir = TempDir::new().unwrap();
    let reference = write_file(
        &dir,
        "reference.toml",
        r#"
[regions.Maharashtra]
districts = ["Mumbai", "Pune"]
pincodes = ["400001", "411001"]
"#,
    );
    let config_text = format!(
        r#"
[service]
host = "0.0.0.0"
port = 7000

[logging]
level = "debug"
file = "/var/log/aava.log"

[scoring]
scale = "normalized"

[reference]
file = "{}"
"#,
        reference.display()
    );
    let path = write_file(&dir, "config.toml", &config_text);

    let config = TomlConfig::load(&path).unwrap();
    assert_eq!(config.service.host, "0.0.0.0");
    assert_eq!(config.service.port, 7000);
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.logging.file, Some(PathBuf::from("/var/log/aava.log")));
    assert_eq!(config.scoring.scale, ConfidenceScale::Normalized);

    let table = config.load_reference_table().unwrap();
    assert_eq!(table.region_for_pincode("411001"), Some("Maharashtra"));
}

#[test]
fn test_missing_reference_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let config = TomlConfig::from_toml_str(&format!(
        "[reference]\nfile = \"{}\"\n",
        dir.path().join("absent.toml").display()
    ))
    .unwrap();

    assert!(matches!(config.load_reference_table(), Err(Error::Io(_))));
}
