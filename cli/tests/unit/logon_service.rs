//! `logon.*` use-cases: cache first, then verify.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use aggregator_cli::application::ports::CredentialStore;
use aggregator_cli::application::services::logon::{LogonVerdict, logon_azure, logon_vsts};
use aggregator_cli::domain::{AzureLogon, LogonOutcome, Provider, VstsLogon, VstsTokenType};

use crate::fakes::{
    FakeConnector, Level, MemoryCredentialStore, RecordingLogger, azure_logon, vsts_logon,
};

#[tokio::test]
async fn test_valid_azure_logon_is_cached() {
    let store = MemoryCredentialStore::new();
    let logger = RecordingLogger::default();

    let verdict = logon_azure(&store, &FakeConnector::accepting(), &logger, &azure_logon())
        .await
        .expect("logon");

    assert_eq!(verdict, LogonVerdict::Valid);
    assert_eq!(store.saves(), vec![Provider::Azure]);
    assert_eq!(
        store.load::<AzureLogon>().expect("load"),
        LogonOutcome::Succeeded(azure_logon())
    );
}

#[tokio::test]
async fn test_rejected_vsts_logon_stays_cached() {
    let store = MemoryCredentialStore::new();
    let logger = RecordingLogger::default();
    let data = vsts_logon(VstsTokenType::Pat);

    let verdict = logon_vsts(&store, &FakeConnector::rejecting(), &logger, &data)
        .await
        .expect("logon");

    assert_eq!(verdict, LogonVerdict::Rejected);
    assert!(logger.contains(Level::Error, "Invalid VSTS credentials"));
    assert!(logger.contains(Level::Info, "using PAT credential"));
    assert_eq!(
        store.load::<VstsLogon>().expect("load"),
        LogonOutcome::Succeeded(data)
    );
}

#[tokio::test]
async fn test_new_logon_replaces_previous_entry() {
    let store = MemoryCredentialStore::new().with(&vsts_logon(VstsTokenType::Pat));
    let logger = RecordingLogger::default();
    let mut newer = vsts_logon(VstsTokenType::Pat);
    newer.token = "rotated".to_string();

    logon_vsts(&store, &FakeConnector::accepting(), &logger, &newer)
        .await
        .expect("logon");

    let cached = store.load::<VstsLogon>().expect("load").succeeded().expect("cached");
    assert_eq!(cached.token, "rotated");
}
