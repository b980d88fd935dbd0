use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;

fn write_config(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("pixelbuilds-cli-{}-{}", std::process::id(), name));
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_help_lists_commands() {
    Command::cargo_bin("pixelbuilds-exporter")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("once"))
        .stdout(predicate::str::contains("validate"));
}

#[test]
fn test_validate_defaults() {
    Command::cargo_bin("pixelbuilds-exporter")
        .unwrap()
        .env_remove("PIXELBUILDS_EXPORTER_CONFIG")
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"))
        .stdout(predicate::str::contains("0.0.0.0:9000"))
        .stdout(predicate::str::contains("15m"));
}

#[test]
fn test_validate_config_file() {
    let path = write_config("valid.yaml", "interval: 5m\nnamespace: pb\n");

    Command::cargo_bin("pixelbuilds-exporter")
        .unwrap()
        .arg("--config")
        .arg(&path)
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("5m"))
        .stdout(predicate::str::contains("Namespace: pb"));

    std::fs::remove_file(path).unwrap();
}

#[test]
fn test_invalid_config_fails() {
    let path = write_config("invalid.toml", "[exporter]\ndevice_concurrency = 0\n");

    Command::cargo_bin("pixelbuilds-exporter")
        .unwrap()
        .arg("--config")
        .arg(&path)
        .arg("validate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("device_concurrency"));

    std::fs::remove_file(path).unwrap();
}
