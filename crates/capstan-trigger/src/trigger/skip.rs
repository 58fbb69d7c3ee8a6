//! Skip decisions: the commit-message directive and the per-axis pipeline
//! predicates.
//!
//! Each predicate answers one question — should this pipeline be skipped
//! along one axis of the hook — and a pipeline is selected only when every
//! predicate keeps it.

use crate::manifest::Pipeline;
use crate::types::Hook;

/// Commit-message directives that suppress build creation.
const SKIP_DIRECTIVES: [&str; 2] = ["[ci skip]", "[skip ci]"];

/// Whether the hook carries a skip directive in its commit message, or in
/// its title when the message is blank. Case-insensitive, anywhere in the
/// text.
pub fn skip_message(hook: &Hook) -> bool {
    let text = if hook.message.is_empty() {
        &hook.title
    } else {
        &hook.message
    };
    let text = text.to_lowercase();
    SKIP_DIRECTIVES
        .iter()
        .any(|directive| text.contains(directive))
}

/// Whether the pipeline's branch constraint rejects the hook's target
/// branch. Tag and promote hooks carry no target branch; the empty value
/// passes an unconstrained pipeline and fails a constrained one.
pub fn skip_branch(pipeline: &Pipeline, branch: &str) -> bool {
    !pipeline.trigger.branch.matches(branch)
}

/// Whether the pipeline's event constraint rejects the hook event.
/// Event names are a fixed vocabulary, so the list is exact-match.
pub fn skip_event(pipeline: &Pipeline, event: &str) -> bool {
    !pipeline.trigger.event.matches_exact(event)
}

/// Whether the pipeline's ref constraint rejects the full git reference.
pub fn skip_ref(pipeline: &Pipeline, reference: &str) -> bool {
    !pipeline.trigger.reference.matches(reference)
}

/// Whether the pipeline's repo constraint rejects the repository slug.
pub fn skip_repo(pipeline: &Pipeline, slug: &str) -> bool {
    !pipeline.trigger.repo.matches(slug)
}

/// Whether the pipeline's deployment-target constraint rejects the hook.
/// Only deployment-carrying events are constrained by this axis; for any
/// other event the predicate keeps the pipeline regardless of the
/// constraint.
pub fn skip_target(pipeline: &Pipeline, hook: &Hook) -> bool {
    if !hook.event.is_deploy() {
        return false;
    }
    !pipeline.trigger.target.matches(&hook.deployment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::Constraint;
    use crate::types::Event;

    fn pipeline() -> Pipeline {
        Pipeline::default()
    }

    fn include(values: &[&str]) -> Constraint {
        Constraint {
            include: values.iter().map(|v| v.to_string()).collect(),
            exclude: Vec::new(),
        }
    }

    fn exclude(values: &[&str]) -> Constraint {
        Constraint {
            include: Vec::new(),
            exclude: values.iter().map(|v| v.to_string()).collect(),
        }
    }

    #[test]
    fn message_directives() {
        let cases = [
            ("update readme [CI SKIP]", true),
            ("update readme [ci skip]", true),
            ("[skip ci] wip", true),
            ("fix: handle [ci] skip markers", false),
            ("ordinary commit", false),
            ("", false),
        ];
        for (message, expected) in cases {
            let hook = Hook {
                message: message.to_string(),
                ..Hook::default()
            };
            assert_eq!(skip_message(&hook), expected, "message: {message:?}");
        }
    }

    #[test]
    fn title_scanned_when_message_blank() {
        let hook = Hook {
            title: "wip [skip ci]".to_string(),
            ..Hook::default()
        };
        assert!(skip_message(&hook));

        // A populated message takes precedence over the title.
        let hook = Hook {
            title: "wip [skip ci]".to_string(),
            message: "release".to_string(),
            ..Hook::default()
        };
        assert!(!skip_message(&hook));
    }

    #[test]
    fn branch_globbing() {
        let mut p = pipeline();
        p.trigger.branch = include(&["main", "release/*"]);
        assert!(!skip_branch(&p, "main"));
        assert!(!skip_branch(&p, "release/1.2"));
        assert!(skip_branch(&p, "develop"));
        assert!(skip_branch(&p, ""));
    }

    #[test]
    fn branch_exclusion() {
        let mut p = pipeline();
        p.trigger.branch = exclude(&["develop"]);
        assert!(!skip_branch(&p, "main"));
        assert!(skip_branch(&p, "develop"));
    }

    #[test]
    fn unconstrained_branch_keeps_empty_target() {
        assert!(!skip_branch(&pipeline(), ""));
    }

    #[test]
    fn event_exact_match() {
        let mut p = pipeline();
        p.trigger.event = include(&["push", "tag"]);
        assert!(!skip_event(&p, Event::Push.as_str()));
        assert!(!skip_event(&p, Event::Tag.as_str()));
        assert!(skip_event(&p, Event::PullRequest.as_str()));

        // Glob metacharacters in event lists are taken literally.
        p.trigger.event = include(&["pu*"]);
        assert!(skip_event(&p, Event::Push.as_str()));
    }

    #[test]
    fn ref_globbing() {
        let mut p = pipeline();
        p.trigger.reference = include(&["refs/tags/v*"]);
        assert!(!skip_ref(&p, "refs/tags/v1.0.0"));
        assert!(skip_ref(&p, "refs/heads/main"));
    }

    #[test]
    fn repo_globbing() {
        let mut p = pipeline();
        p.trigger.repo = include(&["octocat/*"]);
        assert!(!skip_repo(&p, "octocat/hello-world"));
        assert!(skip_repo(&p, "acme/hello-world"));
    }

    #[test]
    fn target_applies_only_to_deploy_events() {
        let mut p = pipeline();
        p.trigger.target = include(&["production"]);

        let push = Hook {
            event: Event::Push,
            ..Hook::default()
        };
        assert!(!skip_target(&p, &push));

        let promote = Hook {
            event: Event::Promote,
            deployment: "production".to_string(),
            ..Hook::default()
        };
        assert!(!skip_target(&p, &promote));

        let staging = Hook {
            event: Event::Promote,
            deployment: "staging".to_string(),
            ..Hook::default()
        };
        assert!(skip_target(&p, &staging));

        let rollback = Hook {
            event: Event::Rollback,
            deployment: "staging".to_string(),
            ..Hook::default()
        };
        assert!(skip_target(&p, &rollback));
    }
}
