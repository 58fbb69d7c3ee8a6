//! Build and stage records — the persisted output of a trigger.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Event, Status, TriggerSource};

/// A persisted execution attempt derived from a hook.
///
/// Builds are numbered per repository: `number` equals the repository
/// counter at the instant of creation and is strictly increasing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Build {
    pub repo_id: i64,
    pub number: i64,
    pub trigger: TriggerSource,
    /// Build number of the parent build, for restarts. Zero when none.
    #[serde(default)]
    pub parent: i64,
    pub status: Status,
    /// Populated for error builds only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub event: Event,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub action: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub link: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub before: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub after: String,
    #[serde(rename = "ref")]
    pub reference: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub fork: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub source: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub target: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub author_login: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub author_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub author_email: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub author_avatar: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub sender: String,
    /// Deployment target for promote / rollback / deployment events.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub deploy: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, String>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished: Option<DateTime<Utc>>,
}

/// One runnable node of a build, 1:1 with a matched pipeline.
///
/// `number` is the 1-based position within the build's stage sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Stage {
    pub repo_id: i64,
    pub number: i64,
    pub name: String,
    pub os: String,
    pub arch: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub variant: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub kernel: String,
    /// Concurrency limit across builds of this stage. Zero means unlimited.
    #[serde(default)]
    pub limit: i64,
    pub status: Status,
    /// Names of stages that must finish before this one starts, in manifest
    /// order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
    /// Whether the stage runs when its dependencies succeed.
    pub on_success: bool,
    /// Whether the stage runs when a dependency fails.
    pub on_failure: bool,
    /// Node label selectors constraining runner placement.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl Stage {
    /// Whether the stage should be handed to the scheduler at creation:
    /// ready to run and not gated on other stages.
    pub fn is_schedulable(&self) -> bool {
        self.status == Status::Pending && self.depends_on.is_empty()
    }
}
