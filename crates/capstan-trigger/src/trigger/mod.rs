//! The build triggerer — converts an inbound hook into a persisted build
//! with runnable stages.
//!
//! This is the canonical decision point where external signal becomes
//! internal work. One invocation handles one hook, linearly: gate →
//! owner lookup → hook enrichment → manifest acquisition → pipeline
//! selection → assembly → persistence → scheduling and notifications.
//! Invocations for different hooks run concurrently; the only
//! cross-invocation serialization is the atomic repository counter.

pub mod skip;

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::FutureExt;
use unicode_segmentation::UnicodeSegmentation;

use crate::errors::TriggerError;
use crate::manifest::{self, convert, lint, signer, Pipeline};
use crate::traits::{
    BuildStore, CommitService, ConfigArgs, ConfigService, RepositoryStore, Scheduler,
    StatusInput, StatusService, UserStore, WebhookSender,
};
use crate::types::{
    Build, Event, Hook, Repository, Stage, Status, TriggerSource, User, WebhookData,
    WEBHOOK_ACTION_CREATED, WEBHOOK_EVENT_BUILD,
};

/// Maximum stored length of build titles and messages, in user-perceived
/// characters (grapheme clusters).
const MAX_MESSAGE_LEN: usize = 2000;

/// Converts inbound source-control hooks into persisted builds.
///
/// All collaborators are trait objects so deployments can wire their own
/// stores, schedulers, and notification plugins. Every collaborator must
/// be safe for concurrent use: one triggerer instance serves all inbound
/// hooks.
pub struct Triggerer {
    config: Arc<dyn ConfigService>,
    commits: Arc<dyn CommitService>,
    statuses: Arc<dyn StatusService>,
    builds: Arc<dyn BuildStore>,
    scheduler: Arc<dyn Scheduler>,
    repos: Arc<dyn RepositoryStore>,
    users: Arc<dyn UserStore>,
    webhooks: Arc<dyn WebhookSender>,
}

impl Triggerer {
    /// Create a new triggerer from its collaborators.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: Arc<dyn ConfigService>,
        commits: Arc<dyn CommitService>,
        statuses: Arc<dyn StatusService>,
        builds: Arc<dyn BuildStore>,
        scheduler: Arc<dyn Scheduler>,
        repos: Arc<dyn RepositoryStore>,
        users: Arc<dyn UserStore>,
        webhooks: Arc<dyn WebhookSender>,
    ) -> Self {
        Self {
            config,
            commits,
            statuses,
            builds,
            scheduler,
            repos,
            users,
            webhooks,
        }
    }

    /// Trigger a build for an inbound hook.
    ///
    /// Returns `Ok(None)` when the hook is intentionally skipped (skip
    /// directive, gating rules, or no matching pipeline), `Ok(Some(build))`
    /// on success — including error builds, whose status is
    /// [`Status::Error`] — and `Err` only for fatal collaborator failures.
    ///
    /// A recovery boundary converts any panic escaping a collaborator into
    /// a logged `Ok(None)` so a pathological plugin cannot take down the
    /// host process.
    pub async fn trigger(
        &self,
        repo: &Repository,
        hook: &Hook,
    ) -> Result<Option<Build>, TriggerError> {
        match AssertUnwindSafe(self.trigger_inner(repo, hook))
            .catch_unwind()
            .await
        {
            Ok(result) => result,
            Err(panic) => {
                tracing::error!(
                    repo = %repo.slug,
                    reference = %hook.reference,
                    panic = %panic_message(panic.as_ref()),
                    backtrace = %std::backtrace::Backtrace::force_capture(),
                    "unexpected panic while triggering build"
                );
                Ok(None)
            }
        }
    }

    async fn trigger_inner(
        &self,
        repo: &Repository,
        hook: &Hook,
    ) -> Result<Option<Build>, TriggerError> {
        tracing::debug!(
            repo = %repo.slug,
            reference = %hook.reference,
            event = %hook.event.as_str(),
            commit = %hook.after,
            "hook received"
        );

        if skip::skip_message(hook) {
            tracing::info!(repo = %repo.slug, "skipping hook: found skip directive");
            return Ok(None);
        }
        if hook.event == Event::PullRequest {
            if repo.ignore_pulls {
                tracing::info!(repo = %repo.slug, "skipping hook: repository ignores pull requests");
                return Ok(None);
            }
            if repo.ignore_forks && !hook.fork.eq_ignore_ascii_case(&repo.slug) {
                tracing::info!(repo = %repo.slug, fork = %hook.fork, "skipping hook: repository ignores forks");
                return Ok(None);
            }
        }

        let user = self.users.find(repo.user_id).await.map_err(|err| {
            tracing::warn!(repo = %repo.slug, error = %err, "cannot find repository owner");
            TriggerError::Owner(err)
        })?;

        if !user.active {
            tracing::info!(repo = %repo.slug, owner = %user.login, "skipping hook: repository owner is inactive");
            return Ok(None);
        }

        let mut hook = hook.clone();
        self.normalize(&user, repo, &mut hook).await;

        // Speculative draft handed to the configuration service so remote
        // config plugins can see the build context. It carries no number
        // and is never persisted.
        let draft = build_from_hook(repo, &hook, Utc::now());
        let raw = self
            .config
            .find(&ConfigArgs {
                user: &user,
                repo,
                build: &draft,
            })
            .await
            .map_err(|err| {
                tracing::warn!(repo = %repo.slug, error = %err, "cannot find configuration");
                err
            })?;

        let converted = convert::convert_string(
            &raw.data,
            &convert::Metadata {
                filename: repo.config.clone(),
                reference: hook.reference.clone(),
            },
        )
        .map_err(|err| {
            tracing::warn!(repo = %repo.slug, error = %err, "cannot convert configuration");
            err
        })?;

        let parsed = match manifest::parse(&converted) {
            Ok(parsed) => parsed,
            Err(err) => {
                tracing::warn!(repo = %repo.slug, error = %err, "cannot parse manifest");
                return self
                    .create_build_error(repo, &hook, err.to_string())
                    .await
                    .map(Some);
            }
        };

        if let Err(err) = lint::manifest(&parsed, repo.trusted) {
            tracing::warn!(repo = %repo.slug, error = %err, "manifest failed linting");
            return self
                .create_build_error(repo, &hook, err.to_string())
                .await
                .map(Some);
        }

        // Hook-initiated builds on protected repositories must carry a
        // valid signature; user-initiated restarts are pre-authorized.
        let verified = if repo.protected && hook.trigger == TriggerSource::Hook {
            signer::verify(&converted, &repo.secret)
        } else {
            true
        };

        let matched = self.select(repo, &hook, &parsed);
        if matched.is_empty() {
            tracing::info!(repo = %repo.slug, "skipping build: no matching pipelines");
            return Ok(None);
        }

        let repo = self.repos.increment(repo).await.map_err(|err| {
            tracing::error!(repo = %repo.slug, error = %err, "cannot increment build sequence");
            TriggerError::Increment(err)
        })?;

        let now = Utc::now();
        let mut build = build_from_hook(&repo, &hook, now);
        build.number = repo.counter;
        build.title = truncate(&build.title, MAX_MESSAGE_LEN);
        build.message = truncate(&build.message, MAX_MESSAGE_LEN);

        let stages: Vec<Stage> = matched
            .iter()
            .enumerate()
            .map(|(index, pipeline)| assemble_stage(&repo, pipeline, index, verified, now))
            .collect();

        self.builds.create(&build, &stages).await.map_err(|err| {
            tracing::error!(repo = %repo.slug, build = build.number, error = %err, "cannot create build");
            TriggerError::Create(err)
        })?;

        if let Err(err) = self
            .statuses
            .send(
                &user,
                &StatusInput {
                    repo: &repo,
                    build: &build,
                },
            )
            .await
        {
            tracing::warn!(repo = %repo.slug, build = build.number, error = %err, "cannot send commit status");
        }

        for stage in &stages {
            if !stage.is_schedulable() {
                continue;
            }
            self.scheduler.schedule(stage).await.map_err(|err| {
                tracing::error!(
                    repo = %repo.slug,
                    build = build.number,
                    stage = %stage.name,
                    error = %err,
                    "cannot enqueue stage"
                );
                TriggerError::Schedule(err)
            })?;
        }

        let payload = WebhookData {
            event: WEBHOOK_EVENT_BUILD.to_string(),
            action: WEBHOOK_ACTION_CREATED.to_string(),
            user: user.clone(),
            repo: repo.clone(),
            build: build.clone(),
        };
        if let Err(err) = self.webhooks.send(&payload).await {
            tracing::warn!(repo = %repo.slug, build = build.number, error = %err, "cannot send webhook");
        }

        tracing::debug!(repo = %repo.slug, build = build.number, stages = stages.len(), "build created");
        Ok(Some(build))
    }

    /// Backfill blank commit metadata from the commit service. Best effort:
    /// a lookup failure is logged and ignored.
    async fn normalize(&self, user: &User, repo: &Repository, hook: &mut Hook) {
        if !hook.message.is_empty() || hook.after.is_empty() {
            return;
        }
        match self.commits.find(user, &repo.slug, &hook.after).await {
            Ok(commit) => {
                hook.message = commit.message;
                if hook.author_name.is_empty() {
                    hook.author_name = commit.author.name;
                }
                if hook.author_email.is_empty() {
                    hook.author_email = commit.author.email;
                }
                if hook.author_avatar.is_empty() {
                    hook.author_avatar = commit.author.avatar;
                }
            }
            Err(err) => {
                tracing::warn!(
                    repo = %repo.slug,
                    commit = %hook.after,
                    error = %err,
                    "cannot fetch commit metadata"
                );
            }
        }
    }

    /// Apply every axis predicate to every pipeline, yielding the matched
    /// set in manifest order.
    fn select<'a>(
        &self,
        repo: &Repository,
        hook: &Hook,
        parsed: &'a manifest::Manifest,
    ) -> Vec<&'a Pipeline> {
        let mut matched = Vec::new();
        for pipeline in parsed.pipelines() {
            if skip::skip_branch(pipeline, &hook.target) {
                tracing::info!(repo = %repo.slug, pipeline = %pipeline.name, "skipping pipeline: does not match branch");
            } else if skip::skip_event(pipeline, hook.event.as_str()) {
                tracing::info!(repo = %repo.slug, pipeline = %pipeline.name, "skipping pipeline: does not match event");
            } else if skip::skip_ref(pipeline, &hook.reference) {
                tracing::info!(repo = %repo.slug, pipeline = %pipeline.name, "skipping pipeline: does not match ref");
            } else if skip::skip_repo(pipeline, &repo.slug) {
                tracing::info!(repo = %repo.slug, pipeline = %pipeline.name, "skipping pipeline: does not match repo");
            } else if skip::skip_target(pipeline, hook) {
                tracing::info!(repo = %repo.slug, pipeline = %pipeline.name, "skipping pipeline: does not match deploy target");
            } else {
                matched.push(pipeline);
            }
        }
        matched
    }

    /// Persist a synthetic failed build for an unusable manifest. The
    /// build carries the failure message and no stages; nothing is
    /// scheduled and no notifications are sent.
    async fn create_build_error(
        &self,
        repo: &Repository,
        hook: &Hook,
        message: String,
    ) -> Result<Build, TriggerError> {
        let repo = self
            .repos
            .increment(repo)
            .await
            .map_err(TriggerError::Increment)?;

        let now = Utc::now();
        let mut build = build_from_hook(&repo, hook, now);
        build.number = repo.counter;
        build.status = Status::Error;
        build.error = Some(message);
        build.finished = Some(now);

        self.builds
            .create(&build, &[])
            .await
            .map_err(TriggerError::Create)?;
        Ok(build)
    }
}

/// Materialize a build record from a hook. The caller assigns the number
/// and applies truncation.
fn build_from_hook(repo: &Repository, hook: &Hook, now: DateTime<Utc>) -> Build {
    Build {
        repo_id: repo.id,
        number: 0,
        trigger: hook.trigger.clone(),
        parent: hook.parent,
        status: Status::Pending,
        error: None,
        event: hook.event,
        action: hook.action.clone(),
        link: hook.link.clone(),
        title: hook.title.clone(),
        message: hook.message.clone(),
        before: hook.before.clone(),
        after: hook.after.clone(),
        reference: hook.reference.clone(),
        fork: hook.fork.clone(),
        source: hook.source.clone(),
        target: hook.target.clone(),
        author_login: hook.author_login.clone(),
        author_name: hook.author_name.clone(),
        author_email: hook.author_email.clone(),
        author_avatar: hook.author_avatar.clone(),
        sender: hook.sender.clone(),
        deploy: hook.deployment.clone(),
        params: hook.params.clone(),
        created: now,
        updated: now,
        finished: None,
    }
}

/// Materialize a stage from a matched pipeline. `index` is the zero-based
/// position in the matched set.
fn assemble_stage(
    repo: &Repository,
    pipeline: &Pipeline,
    index: usize,
    verified: bool,
    now: DateTime<Utc>,
) -> Stage {
    let on_success = pipeline.trigger.status.matches(Status::Passing.as_str());
    // The default is success-only: failure runs must be opted into by
    // declaring a status constraint.
    let on_failure = pipeline.trigger.status.matches(Status::Failing.as_str())
        && !pipeline.trigger.status.is_empty();

    let status = if !verified {
        Status::Blocked
    } else if pipeline.depends_on.is_empty() {
        Status::Pending
    } else {
        Status::Waiting
    };

    let mut stage = Stage {
        repo_id: repo.id,
        number: (index + 1) as i64,
        name: pipeline.name.clone(),
        os: pipeline.platform.os.clone(),
        arch: pipeline.platform.arch.clone(),
        variant: pipeline.platform.variant.clone(),
        kernel: pipeline.platform.version.clone(),
        limit: pipeline.concurrency.limit,
        status,
        depends_on: pipeline.depends_on.clone(),
        on_success,
        on_failure,
        labels: pipeline.node.clone(),
        created: now,
        updated: now,
    };
    if stage.os.is_empty() {
        stage.os = "linux".to_string();
    }
    if stage.arch.is_empty() {
        stage.arch = "amd64".to_string();
    }
    if stage.name.is_empty() {
        stage.name = "default".to_string();
    }
    stage
}

/// Truncate to at most `limit` grapheme clusters, never splitting a
/// multi-byte sequence. Idempotent past the boundary.
fn truncate(s: &str, limit: usize) -> String {
    match s.grapheme_indices(true).nth(limit) {
        Some((offset, _)) => s[..offset].to_string(),
        None => s.to_string(),
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message
    } else {
        "opaque panic payload"
    }
}
