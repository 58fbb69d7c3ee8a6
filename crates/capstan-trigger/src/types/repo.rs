//! Repository and user records.

use serde::{Deserialize, Serialize};

/// A registered repository.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Repository {
    pub id: i64,
    /// Identifier of the owning user account.
    pub user_id: i64,
    /// Canonical `namespace/name` slug.
    pub slug: String,
    /// Path of the pipeline manifest within the repository
    /// (e.g. `.capstan.yml`).
    pub config: String,
    /// Trusted repositories may use privileged pipeline constructs such as
    /// host-path volumes.
    #[serde(default)]
    pub trusted: bool,
    /// Protected repositories require a valid manifest signature for
    /// hook-initiated builds to start unblocked.
    #[serde(default)]
    pub protected: bool,
    /// Per-repository HMAC secret for manifest signatures.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub secret: String,
    #[serde(default)]
    pub ignore_pulls: bool,
    #[serde(default)]
    pub ignore_forks: bool,
    /// Monotonically increasing build counter. Only mutated through
    /// [`RepositoryStore::increment`](crate::traits::RepositoryStore::increment).
    #[serde(default)]
    pub counter: i64,
}

/// A user account that owns repositories.
///
/// The token is an opaque credential consumed by collaborators (commit and
/// status services); the trigger core never inspects it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct User {
    pub id: i64,
    pub login: String,
    #[serde(default)]
    pub active: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub token: String,
}
