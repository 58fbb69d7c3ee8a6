//! Manifest linting.
//!
//! Runs after parsing and before pipeline selection. Lint failures are
//! user errors, not server errors: the triggerer materializes them as
//! error builds so the author sees the message next to their commit.

use std::collections::BTreeSet;

use crate::errors::LintError;

use super::Manifest;

/// Lint a parsed manifest under the repository trust flag.
///
/// Untrusted repositories may not use privileged constructs; today that
/// means host-path volumes. Returns the first violation found, in document
/// order.
pub fn manifest(manifest: &Manifest, trusted: bool) -> Result<(), LintError> {
    if manifest.pipelines().next().is_none() {
        return Err(LintError::new("manifest defines no pipelines"));
    }

    let mut names = BTreeSet::new();
    for pipeline in manifest.pipelines() {
        // Unnamed pipelines collapse to "default" at assembly, so two of
        // them collide just like two identical explicit names.
        let name = effective_name(&pipeline.name);
        if !names.insert(name) {
            return Err(LintError::new(format!(
                "duplicate pipeline name: {name}"
            )));
        }
    }

    for pipeline in manifest.pipelines() {
        for dependency in &pipeline.depends_on {
            if !names.contains(dependency.as_str()) {
                return Err(LintError::new(format!(
                    "pipeline {} depends on unknown pipeline: {dependency}",
                    effective_name(&pipeline.name)
                )));
            }
        }

        if !trusted {
            for volume in &pipeline.volumes {
                if volume.host.is_some() {
                    return Err(LintError::new(format!(
                        "untrusted repositories cannot mount host volumes: {}",
                        volume.name
                    )));
                }
            }
        }
    }

    Ok(())
}

fn effective_name(name: &str) -> &str {
    if name.is_empty() {
        "default"
    } else {
        name
    }
}
