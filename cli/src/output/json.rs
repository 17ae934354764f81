//! JSON output helpers for `--json`.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::application::services::instances::InstanceLocation;

/// One row of `list.instances --json`.
#[derive(Debug, Serialize)]
struct InstanceRow<'a> {
    name: &'a str,
    location: &'a str,
    resource_group: String,
    host: String,
}

/// Format the instance list as a JSON array.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_instances(instances: &[InstanceLocation]) -> Result<String> {
    let rows: Vec<InstanceRow<'_>> = instances
        .iter()
        .map(|found| InstanceRow {
            name: found.instance.plain_name(),
            location: &found.location,
            resource_group: found.instance.resource_group_name(),
            host: found.instance.dns_host_name(),
        })
        .collect();
    serde_json::to_string_pretty(&rows).context("JSON serialization failed")
}

/// Format a JSON error object.
///
/// ```json
/// { "error": true, "message": "...", "code": 1 }
/// ```
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_error(message: &str, code: i32) -> Result<String> {
    let obj = serde_json::json!({
        "error": true,
        "message": message,
        "code": code,
    });
    serde_json::to_string_pretty(&obj).context("JSON serialization failed")
}
