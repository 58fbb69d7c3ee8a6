//! Collaborator contracts consumed by the triggerer.
//!
//! Every external dependency of the trigger core is defined as an async
//! trait so deployments can wire in their own stores, schedulers, and
//! notification plugins. Default implementations live in `defaults/` and
//! `webhook.rs`. All implementations must be safe for concurrent use by
//! multiple trigger invocations.

use async_trait::async_trait;

use crate::errors::{
    CommitError, ConfigError, SchedError, StatusError, StoreError, WebhookError,
};
use crate::types::{Build, Commit, Repository, Stage, User, WebhookData};

// ---------------------------------------------------------------------------
// Stores
// ---------------------------------------------------------------------------

/// Lookup of user accounts.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Find a user by identifier.
    async fn find(&self, id: i64) -> Result<User, StoreError>;
}

/// Persistence for repository records.
#[async_trait]
pub trait RepositoryStore: Send + Sync {
    /// Atomically increment the repository build counter and return the
    /// updated record. The returned `counter` is the definitive build
    /// number for the caller: no two invocations observe the same value.
    async fn increment(&self, repo: &Repository) -> Result<Repository, StoreError>;
}

/// Persistence for builds and their stages.
#[async_trait]
pub trait BuildStore: Send + Sync {
    /// Persist a build together with its stages as a single atomic unit.
    /// Either both become visible or neither does. `stages` may be empty
    /// (error builds carry none).
    async fn create(&self, build: &Build, stages: &[Stage]) -> Result<(), StoreError>;
}

// ---------------------------------------------------------------------------
// Source-control services
// ---------------------------------------------------------------------------

/// Commit metadata lookup against the source-control provider. Used to
/// backfill hook fields the provider omitted; failures are best-effort.
#[async_trait]
pub trait CommitService: Send + Sync {
    async fn find(&self, user: &User, slug: &str, sha: &str) -> Result<Commit, CommitError>;
}

/// Arguments passed to [`ConfigService::find`]. The build is a speculative
/// draft assembled from the hook — it has no number and is never persisted.
#[derive(Debug)]
pub struct ConfigArgs<'a> {
    pub user: &'a User,
    pub repo: &'a Repository,
    pub build: &'a Build,
}

/// Raw pipeline configuration returned by a [`ConfigService`].
#[derive(Debug, Clone)]
pub struct Config {
    pub data: String,
}

/// Fetches the raw pipeline manifest for a build. May be backed by the
/// repository itself, a remote HTTP service, or a local file tree.
#[async_trait]
pub trait ConfigService: Send + Sync {
    async fn find(&self, args: &ConfigArgs<'_>) -> Result<Config, ConfigError>;
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Enqueues runnable stages for execution. Enqueue-only: claiming and
/// running stages belongs to the execution runtime.
#[async_trait]
pub trait Scheduler: Send + Sync {
    async fn schedule(&self, stage: &Stage) -> Result<(), SchedError>;
}

/// Input for [`StatusService::send`].
#[derive(Debug)]
pub struct StatusInput<'a> {
    pub repo: &'a Repository,
    pub build: &'a Build,
}

/// Reports build status back to the source-control provider
/// (commit statuses, checks). Fire-and-forget from the triggerer's
/// perspective.
#[async_trait]
pub trait StatusService: Send + Sync {
    async fn send(&self, user: &User, input: &StatusInput<'_>) -> Result<(), StatusError>;
}

/// Broadcasts build lifecycle events to configured webhook endpoints.
#[async_trait]
pub trait WebhookSender: Send + Sync {
    async fn send(&self, data: &WebhookData) -> Result<(), WebhookError>;
}

// ---------------------------------------------------------------------------
// Noop StatusService (useful for tests and deployments without SCM status)
// ---------------------------------------------------------------------------

/// Status service that discards all updates.
pub struct NoopStatus;

#[async_trait]
impl StatusService for NoopStatus {
    async fn send(&self, _user: &User, _input: &StatusInput<'_>) -> Result<(), StatusError> {
        Ok(())
    }
}
