//! Capstan build triggerer — converts source-control hooks into persisted
//! builds with runnable stages.
//!
//! This crate is the decision core of a continuous-integration server: it
//! gates inbound hooks, acquires and validates the pipeline manifest,
//! selects the pipelines matching the hook, persists the resulting build
//! atomically with its stages, and fans out to the scheduler and the
//! notification plugins.
//!
//! The crate is designed to be embedded: every external dependency — the
//! stores, the configuration source, the scheduler, the status and webhook
//! plugins — is a trait in [`traits`], and working defaults live in
//! [`defaults`] so a server (or a test) can assemble a
//! [`Triggerer`](trigger::Triggerer) with zero infrastructure.

pub mod defaults;
pub mod errors;
pub mod manifest;
pub mod traits;
pub mod trigger;
pub mod types;
pub mod webhook;

// Re-export public types at the crate level.

// defaults
pub use defaults::{
    FileConfigService, InMemoryBuildStore, InMemoryRepoStore, InMemoryScheduler,
    InMemoryUserStore,
};

// errors
pub use errors::{
    CommitError, ConfigError, ConvertError, LintError, ParseError, SchedError, StatusError,
    StoreError, TriggerError, WebhookError,
};

// manifest
pub use manifest::{
    Concurrency, Conditions, Constraint, HostVolume, Manifest, Pipeline, Platform, Resource,
    Secret, Signature, TempVolume, Volume,
};

// traits
pub use traits::{
    BuildStore, CommitService, Config, ConfigArgs, ConfigService, NoopStatus, RepositoryStore,
    Scheduler, StatusInput, StatusService, UserStore, WebhookSender,
};

// trigger
pub use trigger::Triggerer;

// types
pub use types::{
    Build, Commit, CommitAuthor, Event, Hook, Repository, Stage, Status, TriggerSource, User,
    WebhookData, WEBHOOK_ACTION_CREATED, WEBHOOK_EVENT_BUILD,
};

// webhook
pub use webhook::HttpWebhookSender;
