//! Error types for all collaborator contracts and the trigger entry point.

use thiserror::Error;

/// Errors from the persistent stores
/// ([`UserStore`](crate::traits::UserStore),
/// [`RepositoryStore`](crate::traits::RepositoryStore),
/// [`BuildStore`](crate::traits::BuildStore)).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found: {id}")]
    NotFound { id: String },
    #[error("store error: {message}")]
    Store { message: String },
}

/// Errors from [`ConfigService`](crate::traits::ConfigService).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration not found: {path}")]
    NotFound { path: String },
    #[error("configuration service error: {message}")]
    Service { message: String },
}

/// Errors from [`CommitService`](crate::traits::CommitService).
#[derive(Debug, Error)]
pub enum CommitError {
    #[error("commit not found: {sha}")]
    NotFound { sha: String },
    #[error("commit service error: {message}")]
    Service { message: String },
}

/// Errors from the legacy configuration converter.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("unsupported configuration format: {filename}")]
    UnsupportedFormat { filename: String },
    #[error("cannot convert configuration: {message}")]
    Convert { message: String },
}

/// Manifest parse failures. Recoverable: the triggerer materializes these
/// as error builds instead of surfacing them.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("cannot parse manifest: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("cannot parse manifest: {message}")]
    Invalid { message: String },
}

/// Manifest lint failures. Recoverable, like [`ParseError`].
#[derive(Debug, Error)]
#[error("linter: {message}")]
pub struct LintError {
    pub message: String,
}

impl LintError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Errors from [`Scheduler`](crate::traits::Scheduler).
#[derive(Debug, Error)]
pub enum SchedError {
    #[error("queue error: {message}")]
    Queue { message: String },
}

/// Errors from [`StatusService`](crate::traits::StatusService).
#[derive(Debug, Error)]
pub enum StatusError {
    #[error("status service error: {message}")]
    Service { message: String },
}

/// Errors from [`WebhookSender`](crate::traits::WebhookSender).
#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("webhook delivery failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("webhook error: {message}")]
    Send { message: String },
}

/// Fatal errors surfaced by [`Triggerer::trigger`](crate::trigger::Triggerer::trigger).
///
/// Recoverable manifest failures never appear here — they are persisted as
/// error builds and returned as `Ok(Some(build))`.
#[derive(Debug, Error)]
pub enum TriggerError {
    #[error("cannot find repository owner: {0}")]
    Owner(#[source] StoreError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Convert(#[from] ConvertError),
    #[error("cannot increment build sequence: {0}")]
    Increment(#[source] StoreError),
    #[error("cannot create build: {0}")]
    Create(#[source] StoreError),
    #[error("cannot enqueue stage: {0}")]
    Schedule(#[from] SchedError),
}
