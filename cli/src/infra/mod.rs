//! Infrastructure layer: concrete implementations of application port traits.
//!
//! This module contains all I/O-performing code: HTTP calls to Azure and
//! Azure DevOps, the credential and package caches, and embedded assets.
//!
//! Imports from `crate::domain` and `crate::application::ports` are allowed.
//! Imports from `crate::commands` or `crate::output` are forbidden.

pub mod azure;
pub mod config;
pub mod connector;
pub mod credential_store;
pub mod http;
pub mod package_cache;
pub mod releases;
pub mod template;
pub mod vsts;
