//! Pipeline manifest model and parser.
//!
//! A manifest is a multi-document YAML stream. Each document carries a
//! `kind` (defaulting to `pipeline`); the stream is modeled as an ordered
//! sequence of [`Resource`] values so consumers can down-select the kinds
//! they care about while preserving document order.

pub mod convert;
pub mod lint;
pub mod signer;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::ParseError;

// ---------------------------------------------------------------------------
// Constraint
// ---------------------------------------------------------------------------

/// An include/exclude constraint over a single string-valued axis.
///
/// Deserializes from any of the three manifest forms:
///
/// ```yaml
/// branch: main                      # scalar → include
/// branch: [main, develop]           # sequence → include
/// branch:                           # mapping → include + exclude
///   include: [main]
///   exclude: [develop]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "ConstraintRepr")]
pub struct Constraint {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub include: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ConstraintRepr {
    Scalar(String),
    List(Vec<String>),
    Map {
        #[serde(default)]
        include: Vec<String>,
        #[serde(default)]
        exclude: Vec<String>,
    },
}

impl From<ConstraintRepr> for Constraint {
    fn from(repr: ConstraintRepr) -> Self {
        match repr {
            ConstraintRepr::Scalar(value) => Constraint {
                include: vec![value],
                exclude: Vec::new(),
            },
            ConstraintRepr::List(include) => Constraint {
                include,
                exclude: Vec::new(),
            },
            ConstraintRepr::Map { include, exclude } => Constraint { include, exclude },
        }
    }
}

impl Constraint {
    /// Whether `value` satisfies the constraint under glob semantics
    /// (`*`, `?`, `[set]` against the full value).
    ///
    /// Exclusion wins over inclusion; empty include and exclude lists
    /// match everything.
    pub fn matches(&self, value: &str) -> bool {
        self.eval(value, glob_eq)
    }

    /// Whether `value` satisfies the constraint under exact string
    /// comparison. Used for axes whose values are drawn from a fixed
    /// vocabulary, such as event names.
    pub fn matches_exact(&self, value: &str) -> bool {
        self.eval(value, |pattern, v| pattern == v)
    }

    /// Whether both lists are empty.
    pub fn is_empty(&self) -> bool {
        self.include.is_empty() && self.exclude.is_empty()
    }

    fn eval(&self, value: &str, eq: fn(&str, &str) -> bool) -> bool {
        if self.exclude.iter().any(|pattern| eq(pattern, value)) {
            return false;
        }
        if self.include.iter().any(|pattern| eq(pattern, value)) {
            return true;
        }
        self.include.is_empty()
    }
}

/// Glob comparison of a single pattern against the full value. Patterns
/// that fail to compile fall back to literal comparison.
fn glob_eq(pattern: &str, value: &str) -> bool {
    match glob::Pattern::new(pattern) {
        Ok(compiled) => compiled.matches(value),
        Err(_) => pattern == value,
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Target platform of a pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Platform {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub os: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub arch: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub variant: String,
    /// Kernel version.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version: String,
}

/// Concurrency limits of a pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Concurrency {
    #[serde(default)]
    pub limit: i64,
}

/// A named volume attached at the pipeline level. Host-path volumes are a
/// privileged construct: the linter rejects them for untrusted
/// repositories.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Volume {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<HostVolume>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp: Option<TempVolume>,
}

/// A volume bind-mounted from the runner host.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct HostVolume {
    pub path: String,
}

/// An ephemeral volume scoped to the pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TempVolume {}

/// Trigger constraints declared on a pipeline, one per axis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Conditions {
    #[serde(default, skip_serializing_if = "Constraint::is_empty")]
    pub branch: Constraint,
    #[serde(default, skip_serializing_if = "Constraint::is_empty")]
    pub event: Constraint,
    #[serde(rename = "ref", default, skip_serializing_if = "Constraint::is_empty")]
    pub reference: Constraint,
    #[serde(default, skip_serializing_if = "Constraint::is_empty")]
    pub repo: Constraint,
    #[serde(default, skip_serializing_if = "Constraint::is_empty")]
    pub target: Constraint,
    /// Upstream-status constraint governing `on_success` / `on_failure`.
    #[serde(default, skip_serializing_if = "Constraint::is_empty")]
    pub status: Constraint,
}

/// One executable unit within a manifest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Pipeline {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Platform::is_empty")]
    pub platform: Platform,
    #[serde(default)]
    pub concurrency: Concurrency,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
    /// Node label selectors constraining runner placement.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub node: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Conditions::is_empty")]
    pub trigger: Conditions,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<Volume>,
}

impl Platform {
    fn is_empty(&self) -> bool {
        self == &Platform::default()
    }
}

impl Conditions {
    fn is_empty(&self) -> bool {
        self == &Conditions::default()
    }
}

// ---------------------------------------------------------------------------
// Resources
// ---------------------------------------------------------------------------

/// A manifest signature document (`kind: signature`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Signature {
    pub hmac: String,
}

/// An external secret reference (`kind: secret`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Secret {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub data: String,
}

/// One document of a manifest. Documents of unrecognized kinds are
/// preserved so future kinds do not break parsing, but nothing selects
/// them.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Resource {
    Pipeline(Pipeline),
    Signature(Signature),
    Secret(Secret),
    Unknown { kind: String },
}

/// An ordered sequence of manifest resources.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Manifest {
    pub resources: Vec<Resource>,
}

impl Manifest {
    /// The pipeline documents, in declaration order.
    pub fn pipelines(&self) -> impl Iterator<Item = &Pipeline> {
        self.resources.iter().filter_map(|resource| match resource {
            Resource::Pipeline(pipeline) => Some(pipeline),
            _ => None,
        })
    }

    /// The first signature document, if any.
    pub fn signature(&self) -> Option<&Signature> {
        self.resources.iter().find_map(|resource| match resource {
            Resource::Signature(signature) => Some(signature),
            _ => None,
        })
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse a multi-document YAML manifest.
///
/// Empty documents are skipped. A document without a `kind` field is
/// treated as a pipeline.
pub fn parse(data: &str) -> Result<Manifest, ParseError> {
    let mut resources = Vec::new();

    for document in serde_yaml::Deserializer::from_str(data) {
        let value = serde_yaml::Value::deserialize(document)?;
        if value.is_null() {
            continue;
        }
        if !value.is_mapping() {
            return Err(ParseError::Invalid {
                message: "manifest document must be a mapping".to_string(),
            });
        }

        let kind = value
            .get("kind")
            .and_then(serde_yaml::Value::as_str)
            .unwrap_or("pipeline")
            .to_string();

        let resource = match kind.as_str() {
            "pipeline" => Resource::Pipeline(serde_yaml::from_value(value)?),
            "signature" => Resource::Signature(serde_yaml::from_value(value)?),
            "secret" => Resource::Secret(serde_yaml::from_value(value)?),
            _ => Resource::Unknown { kind },
        };
        resources.push(resource);
    }

    Ok(Manifest { resources })
}
