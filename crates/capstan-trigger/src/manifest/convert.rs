//! Legacy configuration conversion.
//!
//! Early configuration files were a single YAML document with a top-level
//! `pipeline:` step map and an optional `branches:` constraint. This module
//! rewrites that form into a modern pipeline document so the rest of the
//! manifest pipeline only ever sees the current schema. Modern documents
//! pass through byte-for-byte; text the detector cannot parse also passes
//! through untouched, leaving the verdict to the manifest parser.

use serde_yaml::{Mapping, Value};

use crate::errors::ConvertError;

/// Context identifying the configuration being converted.
#[derive(Debug, Clone, Default)]
pub struct Metadata {
    /// Configuration file path within the repository.
    pub filename: String,
    /// Git reference the configuration was fetched at.
    pub reference: String,
}

/// Convert raw configuration text to the modern manifest format.
///
/// Non-YAML configuration filenames are rejected: this converter only
/// understands the YAML lineage.
pub fn convert_string(data: &str, metadata: &Metadata) -> Result<String, ConvertError> {
    if !is_yaml_filename(&metadata.filename) {
        return Err(ConvertError::UnsupportedFormat {
            filename: metadata.filename.clone(),
        });
    }
    if !is_legacy(data) {
        return Ok(data.to_string());
    }
    convert_legacy(data)
}

/// Whether the filename names a YAML configuration. A blank filename is
/// accepted: some configuration services return inline text with no path.
fn is_yaml_filename(filename: &str) -> bool {
    filename.is_empty() || filename.ends_with(".yml") || filename.ends_with(".yaml")
}

/// Detect the legacy single-document form: a top-level `pipeline` mapping
/// or a top-level `branches` constraint. Unparseable text is not legacy —
/// the manifest parser owns that failure.
fn is_legacy(data: &str) -> bool {
    let value: Value = match serde_yaml::from_str(data) {
        Ok(value) => value,
        Err(_) => return false,
    };
    if !value.is_mapping() || value.get("kind").is_some() {
        return false;
    }
    value.get("pipeline").is_some_and(Value::is_mapping) || value.get("branches").is_some()
}

/// Rewrite a legacy document into a modern pipeline document. The step map
/// is dropped (steps are compiled downstream); the `branches` constraint
/// becomes `trigger.branch`.
fn convert_legacy(data: &str) -> Result<String, ConvertError> {
    let legacy: Value = serde_yaml::from_str(data).map_err(|err| ConvertError::Convert {
        message: err.to_string(),
    })?;

    let mut pipeline = Mapping::new();
    pipeline.insert(Value::from("kind"), Value::from("pipeline"));
    pipeline.insert(Value::from("name"), Value::from("default"));

    if let Some(branches) = legacy.get("branches") {
        let mut trigger = Mapping::new();
        trigger.insert(Value::from("branch"), branches.clone());
        pipeline.insert(Value::from("trigger"), Value::Mapping(trigger));
    }

    serde_yaml::to_string(&Value::Mapping(pipeline)).map_err(|err| ConvertError::Convert {
        message: err.to_string(),
    })
}
