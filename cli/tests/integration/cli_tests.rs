//! CLI structure and argument parsing.

#![allow(clippy::expect_used)]

use assert_cmd::Command;
use predicates::prelude::*;

pub fn aggregator(home: &std::path::Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("aggregator-cli"));
    cmd.env("NO_COLOR", "1")
        .env("AGGREGATOR_HOME", home)
        .env_remove("AGGREGATOR_CONFIG");
    cmd
}

#[test]
fn test_cli_no_args_shows_help() {
    let home = tempfile::tempdir().expect("tempdir");
    // An env-sourced flag counts as an argument and suppresses the help.
    aggregator(home.path())
        .env_remove("NO_COLOR")
        .assert()
        .code(2)
        .stderr(predicate::str::contains(
            "Provision and manage Aggregator instances in Azure",
        ));
}

#[test]
fn test_no_color_env_accepts_conventional_values() {
    for value in ["1", "true", "yes", "0"] {
        let home = tempfile::tempdir().expect("tempdir");
        aggregator(home.path())
            .env("NO_COLOR", value)
            .args(["list.instances"])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("No cached Azure credential"))
            .stderr(predicate::str::contains("invalid value").not());
    }
}

#[test]
fn test_cli_help_lists_verbs() {
    let home = tempfile::tempdir().expect("tempdir");
    aggregator(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("logon.azure"))
        .stdout(predicate::str::contains("logon.vsts"))
        .stdout(predicate::str::contains("list.instances"))
        .stdout(predicate::str::contains("install.instance"))
        .stdout(predicate::str::contains("configure.instance"))
        .stdout(predicate::str::contains("uninstall.instance"));
}

#[test]
fn test_cli_version_flag() {
    let home = tempfile::tempdir().expect("tempdir");
    aggregator(home.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("aggregator-cli"));
}

#[test]
fn test_uninstall_help_shows_mapping_flag() {
    let home = tempfile::tempdir().expect("tempdir");
    aggregator(home.path())
        .args(["uninstall.instance", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--dont-remove-mappings"));
}

#[test]
fn test_install_requires_location() {
    let home = tempfile::tempdir().expect("tempdir");
    aggregator(home.path())
        .args(["install.instance", "--name", "contoso"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--location"));
}

#[test]
fn test_invalid_instance_name_fails_before_logon() {
    let home = tempfile::tempdir().expect("tempdir");
    aggregator(home.path())
        .args(["install.instance", "-n", "Not_Valid", "-l", "westeurope"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid instance name 'Not_Valid'"))
        .stdout(predicate::str::contains("Authenticating").not());
}

#[test]
fn test_missing_azure_credential_exits_one() {
    let home = tempfile::tempdir().expect("tempdir");
    aggregator(home.path())
        .args(["list.instances"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains(
            "No cached Azure credential: use the logon.azure command.",
        ));
}

#[test]
fn test_missing_credential_json_error() {
    let home = tempfile::tempdir().expect("tempdir");
    let output = aggregator(home.path())
        .args(["--json", "uninstall.instance", "-n", "contoso", "-l", "westeurope"])
        .output()
        .expect("run");
    assert_eq!(output.status.code(), Some(1));
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(value["error"], true);
    assert!(
        value["message"]
            .as_str()
            .expect("message")
            .contains("logon.azure")
    );
}

#[test]
fn test_invalid_config_file_is_reported() {
    let home = tempfile::tempdir().expect("tempdir");
    std::fs::write(
        home.path().join("config.yaml"),
        "runtime:\n  version_req: \"nope\"\n",
    )
    .expect("write");
    aggregator(home.path())
        .args(["list.instances"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("runtime.version_req"));
}
