//! Writing the cached VSTS token into an instance.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use aggregator_cli::application::services::configuration::write_configuration;
use aggregator_cli::domain::{InstanceName, Provider, VstsTokenType};

use crate::fakes::{FakeAzure, Level, MemoryCredentialStore, RecordingLogger, vsts_logon};

fn contoso() -> InstanceName {
    InstanceName::new("contoso").expect("valid name")
}

#[tokio::test]
async fn test_unsupported_token_type_writes_nothing() {
    let azure = FakeAzure::new();
    let store = MemoryCredentialStore::new().with(&vsts_logon(VstsTokenType::OAuth));
    let logger = RecordingLogger::default();

    let ok = write_configuration(&azure, &store, &contoso(), &logger)
        .await
        .expect("write configuration");

    assert!(!ok);
    assert!(azure.calls().is_empty());
    assert!(logger.contains(Level::Warning, "VSTS token type OAuth is unsupported"));
}

#[tokio::test]
async fn test_missing_vsts_logon_writes_nothing() {
    let azure = FakeAzure::new();
    let store = MemoryCredentialStore::new();
    let logger = RecordingLogger::default();

    let ok = write_configuration(&azure, &store, &contoso(), &logger)
        .await
        .expect("write configuration");

    assert!(!ok);
    assert!(azure.calls().is_empty());
    assert!(logger.contains(Level::Warning, "logon.vsts"));
}

#[tokio::test]
async fn test_expired_vsts_logon_writes_nothing() {
    let azure = FakeAzure::new();
    let store = MemoryCredentialStore::new().with_expired(Provider::Vsts);
    let logger = RecordingLogger::default();

    let ok = write_configuration(&azure, &store, &contoso(), &logger)
        .await
        .expect("write configuration");

    assert!(!ok);
    assert!(logger.contains(Level::Warning, "expired"));
}

#[tokio::test]
async fn test_writing_twice_is_idempotent() {
    let azure = FakeAzure::new().with_setting("AzureWebJobsStorage", "conn");
    let store = MemoryCredentialStore::new().with(&vsts_logon(VstsTokenType::Pat));
    let logger = RecordingLogger::default();

    assert!(write_configuration(&azure, &store, &contoso(), &logger).await.expect("first"));
    let first = azure.settings();
    assert!(write_configuration(&azure, &store, &contoso(), &logger).await.expect("second"));

    assert_eq!(azure.settings(), first);
    assert_eq!(
        azure.count("write_settings:aggregator-contoso:contosoaggregator"),
        2
    );
}
