//! Foundational types for the trigger core.
//!
//! Every type here is `Serialize + Deserialize + Debug + Clone`. All map
//! fields use `BTreeMap` (never `HashMap`) to guarantee deterministic
//! serialization of persisted records and webhook payloads.
//!
//! Status and event enums carry their wire names via serde so they compare
//! directly against the values found in manifests and hook payloads.

pub mod build;
pub mod hook;
pub mod repo;

pub use build::*;
pub use hook::*;
pub use repo::*;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Webhook event name for build lifecycle notifications.
pub const WEBHOOK_EVENT_BUILD: &str = "build";

/// Webhook action emitted when a build is created.
pub const WEBHOOK_ACTION_CREATED: &str = "created";

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Lifecycle status of a build or stage.
///
/// The serialized names are the wire values used in manifests and hook
/// payloads; `Passing` and `Failing` intentionally serialize as `success`
/// and `failure` so manifest status constraints match without translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum Status {
    /// Awaiting manual approval (unverified manifest on a protected repo).
    Blocked,
    /// Approval was refused.
    Declined,
    /// Waiting on upstream stage dependencies.
    #[serde(rename = "waiting_on_dependencies")]
    Waiting,
    /// Ready to be scheduled.
    Pending,
    Running,
    #[serde(rename = "success")]
    Passing,
    #[serde(rename = "failure")]
    Failing,
    Killed,
    Error,
    Skipped,
}

impl Status {
    /// The wire name, as used in manifest status constraints.
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Blocked => "blocked",
            Status::Declined => "declined",
            Status::Waiting => "waiting_on_dependencies",
            Status::Pending => "pending",
            Status::Running => "running",
            Status::Passing => "success",
            Status::Failing => "failure",
            Status::Killed => "killed",
            Status::Error => "error",
            Status::Skipped => "skipped",
        }
    }
}

// ---------------------------------------------------------------------------
// Event
// ---------------------------------------------------------------------------

/// The source-control event that produced a hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum Event {
    Push,
    PullRequest,
    Tag,
    Promote,
    Rollback,
    Deployment,
    Cron,
}

impl Event {
    /// The wire name, as used in manifest event constraints.
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::Push => "push",
            Event::PullRequest => "pull_request",
            Event::Tag => "tag",
            Event::Promote => "promote",
            Event::Rollback => "rollback",
            Event::Deployment => "deployment",
            Event::Cron => "cron",
        }
    }

    /// Whether this event carries a deployment target.
    pub fn is_deploy(&self) -> bool {
        matches!(self, Event::Promote | Event::Rollback | Event::Deployment)
    }
}

// ---------------------------------------------------------------------------
// TriggerSource
// ---------------------------------------------------------------------------

/// How a build was initiated.
///
/// Signature verification only applies to hook-initiated builds: a user
/// restarting a build has already been authorized by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
#[non_exhaustive]
pub enum TriggerSource {
    /// Delivered by the source-control provider.
    Hook,
    /// Initiated by a user action (restart, promote).
    User { login: String },
}

// ---------------------------------------------------------------------------
// WebhookData
// ---------------------------------------------------------------------------

/// Payload broadcast to configured webhook endpoints when a build event
/// occurs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct WebhookData {
    pub event: String,
    pub action: String,
    pub user: User,
    pub repo: Repository,
    pub build: Build,
}
