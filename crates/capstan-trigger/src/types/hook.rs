//! Hook types — the normalized source-control event the triggerer consumes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{Event, TriggerSource};

/// An inbound source-control event, already parsed by the hook layer.
///
/// The triggerer treats the hook as input: the only mutation it performs is
/// filling blank commit metadata from the commit service before assembly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Hook {
    pub event: Event,
    /// Provider-specific action qualifier (`opened`, `synchronized`, …).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub action: String,
    /// Build number of the parent build, for restarts. Zero when none.
    #[serde(default)]
    pub parent: i64,
    pub trigger: TriggerSource,
    /// Full git reference (`refs/heads/main`, `refs/tags/v1.0.0`).
    #[serde(rename = "ref")]
    pub reference: String,
    /// Commit SHA prior to the change. May be blank for tags.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub before: String,
    /// Commit SHA after the change.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub after: String,
    /// Source branch of a pull request.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub source: String,
    /// Target branch. Blank for tag events.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub target: String,
    /// Slug of the repository the change originates from. Differs from the
    /// target repository slug when the hook comes from a fork.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub fork: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub link: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub author_login: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub author_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub author_email: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub author_avatar: String,
    /// Username of the account that sent the hook.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub sender: String,
    /// Deployment target for promote / rollback / deployment events.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub deployment: String,
    /// Caller-supplied build parameters.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, String>,
}

impl Default for Hook {
    fn default() -> Self {
        Self {
            event: Event::Push,
            action: String::new(),
            parent: 0,
            trigger: TriggerSource::Hook,
            reference: String::new(),
            before: String::new(),
            after: String::new(),
            source: String::new(),
            target: String::new(),
            fork: String::new(),
            link: String::new(),
            title: String::new(),
            message: String::new(),
            author_login: String::new(),
            author_name: String::new(),
            author_email: String::new(),
            author_avatar: String::new(),
            sender: String::new(),
            deployment: String::new(),
            params: BTreeMap::new(),
        }
    }
}

/// A commit record returned by the commit service, used to backfill hook
/// metadata when the provider omits it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Commit {
    pub sha: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
    #[serde(default)]
    pub author: CommitAuthor,
}

/// Author details attached to a [`Commit`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CommitAuthor {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub email: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub avatar: String,
}
