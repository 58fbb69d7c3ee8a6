//! In-memory stores for testing and lightweight usage.
//!
//! Uses `BTreeMap` for deterministic iteration order (project convention).
//! Atomicity contracts are satisfied with a single write-lock acquisition:
//! the counter increment and the build-with-stages insert are each one
//! critical section.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::errors::StoreError;
use crate::traits::{BuildStore, RepositoryStore, UserStore};
use crate::types::{Build, Repository, Stage, User};

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// In-memory implementation of [`UserStore`].
#[derive(Default)]
pub struct InMemoryUserStore {
    users: Arc<RwLock<BTreeMap<i64, User>>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a user record.
    pub async fn insert(&self, user: User) {
        self.users.write().await.insert(user.id, user);
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find(&self, id: i64) -> Result<User, StoreError> {
        self.users
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })
    }
}

// ---------------------------------------------------------------------------
// Repositories
// ---------------------------------------------------------------------------

/// In-memory implementation of [`RepositoryStore`].
#[derive(Default)]
pub struct InMemoryRepoStore {
    repos: Arc<RwLock<BTreeMap<i64, Repository>>>,
}

impl InMemoryRepoStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a repository record.
    pub async fn insert(&self, repo: Repository) {
        self.repos.write().await.insert(repo.id, repo);
    }

    /// Fetch the current record, for inspecting the counter.
    pub async fn get(&self, id: i64) -> Option<Repository> {
        self.repos.read().await.get(&id).cloned()
    }
}

#[async_trait]
impl RepositoryStore for InMemoryRepoStore {
    async fn increment(&self, repo: &Repository) -> Result<Repository, StoreError> {
        let mut repos = self.repos.write().await;
        let stored = repos.get_mut(&repo.id).ok_or_else(|| StoreError::NotFound {
            id: repo.id.to_string(),
        })?;
        stored.counter += 1;
        Ok(stored.clone())
    }
}

// ---------------------------------------------------------------------------
// Builds
// ---------------------------------------------------------------------------

/// In-memory implementation of [`BuildStore`].
///
/// Builds are keyed by `(repo_id, number)`; the build and its stages are
/// inserted under one lock acquisition so readers never observe a build
/// without its stages.
#[derive(Default)]
pub struct InMemoryBuildStore {
    builds: Arc<RwLock<BTreeMap<(i64, i64), (Build, Vec<Stage>)>>>,
}

impl InMemoryBuildStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch a build and its stages.
    pub async fn find(&self, repo_id: i64, number: i64) -> Option<(Build, Vec<Stage>)> {
        self.builds.read().await.get(&(repo_id, number)).cloned()
    }

    /// Total number of persisted builds across repositories.
    pub async fn len(&self) -> usize {
        self.builds.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.builds.read().await.is_empty()
    }

    /// Build numbers persisted for a repository, in ascending order.
    pub async fn numbers(&self, repo_id: i64) -> Vec<i64> {
        self.builds
            .read()
            .await
            .keys()
            .filter(|(rid, _)| *rid == repo_id)
            .map(|(_, number)| *number)
            .collect()
    }
}

#[async_trait]
impl BuildStore for InMemoryBuildStore {
    async fn create(&self, build: &Build, stages: &[Stage]) -> Result<(), StoreError> {
        let mut builds = self.builds.write().await;
        let key = (build.repo_id, build.number);
        if builds.contains_key(&key) {
            return Err(StoreError::Store {
                message: format!(
                    "duplicate build number {} for repository {}",
                    build.number, build.repo_id
                ),
            });
        }
        builds.insert(key, (build.clone(), stages.to_vec()));
        Ok(())
    }
}
