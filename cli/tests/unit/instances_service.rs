//! Provisioning pipeline: add, remove, set authentication and listing.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::time::Duration;

use aggregator_cli::application::services::deployment::{Cancellation, PollOptions};
use aggregator_cli::application::services::instances::AggregatorInstances;
use aggregator_cli::application::services::runtime_package::RuntimePackage;
use aggregator_cli::domain::{InstanceName, VstsTokenType};
use semver::VersionReq;

use crate::fakes::{
    FakeAzure, FakeReleaseSource, Level, MemoryCredentialStore, MemoryPackageCache,
    RecordingLogger, StaticTemplate, TEMPLATE, vsts_logon,
};

fn contoso() -> InstanceName {
    InstanceName::new("contoso").expect("valid name")
}

fn poll() -> PollOptions {
    PollOptions {
        interval: Duration::ZERO,
        cancel: Cancellation::never(),
    }
}

fn pat_store() -> MemoryCredentialStore {
    MemoryCredentialStore::new().with(&vsts_logon(VstsTokenType::Pat))
}

#[tokio::test]
async fn test_add_happy_path_writes_token() {
    let azure = FakeAzure::new().with_states(&["Running", "Running", "Succeeded"]);
    let store = pat_store();
    let logger = RecordingLogger::default();
    let source = FakeReleaseSource::with_versions(&["0.4.0", "0.4.1"]);
    let cache = MemoryPackageCache::default();
    let runtime = RuntimePackage::new(&source, &cache, VersionReq::STAR);

    let ok = AggregatorInstances::new(&azure, &store, &logger)
        .add(
            &contoso(),
            "westeurope",
            &StaticTemplate(TEMPLATE),
            &runtime,
            &poll(),
        )
        .await
        .expect("add");

    assert!(ok);
    assert_eq!(azure.count("create:aggregator-contoso:westeurope"), 1);
    assert_eq!(azure.count("refresh:"), 3);
    assert_eq!(
        azure.count("deploy_zip:contoso:/cache/0.4.1/FunctionRuntime.zip"),
        1
    );
    assert_eq!(
        azure.settings().get("Aggregator_VstsToken").map(String::as_str),
        Some("pat-token")
    );
    assert_eq!(
        azure.submitted_parameters()[0]["appName"]["value"],
        "contosoaggregator"
    );
    assert!(logger.contains(Level::Info, "VSTS token saved"));
}

#[tokio::test]
async fn test_add_reuses_existing_resource_group() {
    let azure = FakeAzure::new()
        .with_group("aggregator-contoso", "westeurope")
        .with_states(&["Succeeded"]);
    let store = pat_store();
    let logger = RecordingLogger::default();
    let source = FakeReleaseSource::with_versions(&["0.4.1"]);
    let cache = MemoryPackageCache::default();
    let runtime = RuntimePackage::new(&source, &cache, VersionReq::STAR);

    let ok = AggregatorInstances::new(&azure, &store, &logger)
        .add(
            &contoso(),
            "westeurope",
            &StaticTemplate(TEMPLATE),
            &runtime,
            &poll(),
        )
        .await
        .expect("add");

    assert!(ok);
    assert_eq!(azure.count("create:"), 0);
    assert_eq!(azure.count("submit:aggregator-contoso:"), 1);
}

#[tokio::test]
async fn test_add_failed_deployment_skips_runtime() {
    let azure = FakeAzure::new().with_states(&["Running", "Failed"]);
    let store = pat_store();
    let logger = RecordingLogger::default();
    let source = FakeReleaseSource::with_versions(&["0.4.1"]);
    let cache = MemoryPackageCache::default();
    let runtime = RuntimePackage::new(&source, &cache, VersionReq::STAR);

    let ok = AggregatorInstances::new(&azure, &store, &logger)
        .add(
            &contoso(),
            "westeurope",
            &StaticTemplate(TEMPLATE),
            &runtime,
            &poll(),
        )
        .await
        .expect("add");

    assert!(!ok);
    assert_eq!(azure.count("deploy_zip:"), 0);
    assert_eq!(azure.count("write_settings:"), 0);
    assert!(source.fetches().is_empty());
    assert!(logger.contains(Level::Error, "Failed"));
}

#[tokio::test]
async fn test_add_upload_failure_skips_configuration() {
    let azure = FakeAzure::new()
        .with_states(&["Succeeded"])
        .failing_zip();
    let store = pat_store();
    let logger = RecordingLogger::default();
    let source = FakeReleaseSource::with_versions(&["0.4.1"]);
    let cache = MemoryPackageCache::default();
    let runtime = RuntimePackage::new(&source, &cache, VersionReq::STAR);

    let ok = AggregatorInstances::new(&azure, &store, &logger)
        .add(
            &contoso(),
            "westeurope",
            &StaticTemplate(TEMPLATE),
            &runtime,
            &poll(),
        )
        .await
        .expect("add");

    assert!(!ok);
    assert_eq!(azure.count("write_settings:"), 0);
    assert!(logger.contains(Level::Error, "Upload of runtime package failed"));
}

#[tokio::test]
async fn test_add_without_any_runtime_package_fails() {
    let azure = FakeAzure::new().with_states(&["Succeeded"]);
    let store = pat_store();
    let logger = RecordingLogger::default();
    let source = FakeReleaseSource::offline();
    let cache = MemoryPackageCache::default();
    let runtime = RuntimePackage::new(&source, &cache, VersionReq::STAR);

    let ok = AggregatorInstances::new(&azure, &store, &logger)
        .add(
            &contoso(),
            "westeurope",
            &StaticTemplate(TEMPLATE),
            &runtime,
            &poll(),
        )
        .await
        .expect("add");

    assert!(!ok);
    assert_eq!(azure.count("deploy_zip:"), 0);
}

#[tokio::test]
async fn test_add_warns_when_template_lacks_app_name() {
    let azure = FakeAzure::new().with_states(&["Failed"]);
    let store = pat_store();
    let logger = RecordingLogger::default();
    let source = FakeReleaseSource::with_versions(&["0.4.1"]);
    let cache = MemoryPackageCache::default();
    let runtime = RuntimePackage::new(&source, &cache, VersionReq::STAR);

    AggregatorInstances::new(&azure, &store, &logger)
        .add(
            &contoso(),
            "westeurope",
            &StaticTemplate(r#"{"parameters":{}}"#),
            &runtime,
            &poll(),
        )
        .await
        .expect("add");

    assert!(logger.contains(Level::Warning, "appName parameter not found"));
    assert_eq!(azure.count("submit:"), 1);
}

#[tokio::test]
async fn test_remove_existing_instance_deletes_group() {
    let azure = FakeAzure::new().with_group("aggregator-contoso", "westeurope");
    let store = MemoryCredentialStore::new();
    let logger = RecordingLogger::default();

    let ok = AggregatorInstances::new(&azure, &store, &logger)
        .remove(&contoso(), "westeurope")
        .await
        .expect("remove");

    assert!(ok);
    assert_eq!(azure.count("delete:aggregator-contoso"), 1);
    assert!(azure.group_names().is_empty());
}

#[tokio::test]
async fn test_remove_missing_instance_warns_and_succeeds() {
    let azure = FakeAzure::new();
    let store = MemoryCredentialStore::new();
    let logger = RecordingLogger::default();

    let ok = AggregatorInstances::new(&azure, &store, &logger)
        .remove(&contoso(), "westeurope")
        .await
        .expect("remove");

    assert!(ok);
    assert_eq!(azure.count("delete:"), 0);
    assert!(logger.contains(Level::Warning, "Instance contoso not found in westeurope."));
}

#[tokio::test]
async fn test_set_authentication_rewrites_token_only() {
    let azure = FakeAzure::new()
        .with_setting("FUNCTIONS_EXTENSION_VERSION", "~2")
        .with_setting("Aggregator_VstsToken", "old");
    let store = pat_store();
    let logger = RecordingLogger::default();

    let ok = AggregatorInstances::new(&azure, &store, &logger)
        .set_authentication(&contoso())
        .await
        .expect("set authentication");

    assert!(ok);
    let settings = azure.settings();
    assert_eq!(settings["Aggregator_VstsToken"], "pat-token");
    assert_eq!(settings["Aggregator_VstsTokenType"], "PAT");
    assert_eq!(settings["FUNCTIONS_EXTENSION_VERSION"], "~2");
    assert_eq!(azure.count("submit:"), 0);
    assert_eq!(azure.count("deploy_zip:"), 0);
}

#[tokio::test]
async fn test_list_all_recovers_plain_names() {
    let azure = FakeAzure::new()
        .with_group("aggregator-contoso", "westeurope")
        .with_group("aggregator-fabrikam", "eastus")
        .with_group("unrelated-rg", "westeurope");
    let store = MemoryCredentialStore::new();
    let logger = RecordingLogger::default();
    let instances = AggregatorInstances::new(&azure, &store, &logger);

    let all = instances.list_all().await.expect("list");
    let names: Vec<&str> = all.iter().map(|f| f.instance.plain_name()).collect();
    assert_eq!(names, vec!["contoso", "fabrikam"]);

    let here = instances
        .list_by_location("WestEurope")
        .await
        .expect("list by location");
    assert_eq!(here, vec![contoso()]);
}
