//! `logon.*` argument handling that stops before any network call.

#![allow(clippy::expect_used)]

use predicates::prelude::*;

use crate::cli_tests::aggregator;

#[test]
fn test_logon_vsts_rejects_unknown_mode() {
    let home = tempfile::tempdir().expect("tempdir");
    aggregator(home.path())
        .args([
            "logon.vsts",
            "-u",
            "https://dev.azure.com/contoso",
            "-m",
            "Kerberos",
        ])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid value 'Kerberos'"));
}

#[test]
fn test_logon_vsts_pat_requires_token() {
    let home = tempfile::tempdir().expect("tempdir");
    aggregator(home.path())
        .env_remove("AGGREGATOR_VSTS_TOKEN")
        .args(["logon.vsts", "-u", "https://dev.azure.com/contoso", "-m", "PAT"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("--token is required for PAT logon"));
    assert!(!home.path().join("logon.vsts.json").exists());
}

#[test]
fn test_logon_azure_requires_all_fields() {
    let home = tempfile::tempdir().expect("tempdir");
    aggregator(home.path())
        .env_remove("AGGREGATOR_AZURE_PASSWORD")
        .args(["logon.azure", "-s", "sub", "-c", "client", "-t", "tenant"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--password"));
}
