//! Integration tests for aggregator CLI
//!
//! These tests spawn the actual binary and test end-to-end behavior that
//! needs no network access.

mod cli_tests;
mod logon_command;
