//! Embedded instance template: implements the `TemplateSource` port.
//!
//! At compile time, `include_dir!` embeds everything under `assets/`:
//!   - `instance-template.json`: ARM template creating the Function App

use anyhow::{Context, Result};
use include_dir::{Dir, include_dir};

use crate::application::ports::TemplateSource;

static EMBEDDED_ASSETS: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/assets");

const INSTANCE_TEMPLATE: &str = "instance-template.json";

/// Return the raw bytes of a single embedded asset.
///
/// # Errors
///
/// Returns an error if no asset with the given `name` exists.
pub fn get_asset(name: &str) -> Result<&'static [u8]> {
    EMBEDDED_ASSETS
        .get_file(name)
        .map(|f| f.contents())
        .ok_or_else(|| anyhow::anyhow!("embedded asset not found: {name}"))
}

/// Serves the template compiled into the binary.
pub struct EmbeddedTemplate;

impl TemplateSource for EmbeddedTemplate {
    fn instance_template(&self) -> Result<String> {
        let bytes = get_asset(INSTANCE_TEMPLATE)?;
        String::from_utf8(bytes.to_vec()).context("instance template is not valid UTF-8")
    }
}
