//! Workflow checkpoints: named, ordered milestones with declarative matchers.

use std::collections::HashSet;

use crate::core::step::{ActionKind, StepRecord, find_word};

/// Decides whether a step satisfies a checkpoint.
///
/// A step matches when its kind is accepted and, if `keywords` is non-empty,
/// its target or value has a word starting with at least one keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Matcher {
    pub kinds: &'static [ActionKind],
    pub keywords: &'static [&'static str],
}

impl Matcher {
    pub fn matches(&self, step: &StepRecord) -> bool {
        if !self.kinds.contains(&step.action_kind) {
            return false;
        }
        if self.keywords.is_empty() {
            return true;
        }
        let haystack = step.haystack();
        self.keywords
            .iter()
            .any(|keyword| find_word(&haystack, keyword).is_some())
    }
}

/// One milestone of an expected workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint {
    pub name: &'static str,
    pub order: u32,
    pub matcher: Matcher,
    /// Markup expected in the DOM when this checkpoint's element is present.
    pub dom_markers: &'static [&'static str],
    /// Words naming the element, used to tie interaction errors to it.
    pub interaction_targets: &'static [&'static str],
    /// Content that only exists after an asynchronous load, if any.
    pub dynamic_content: Option<&'static [&'static str]>,
}

/// Static definition of a workflow variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowDefinition {
    pub name: &'static str,
    checkpoints: Vec<Checkpoint>,
}

impl WorkflowDefinition {
    /// Build a definition, sorting checkpoints by `order`.
    ///
    /// # Panics
    ///
    /// Panics on an empty checkpoint list, duplicate orderings, or duplicate
    /// names. These are setup bugs, not input errors.
    pub fn new(name: &'static str, mut checkpoints: Vec<Checkpoint>) -> Self {
        assert!(
            !checkpoints.is_empty(),
            "workflow {name}: checkpoints must be non-empty"
        );
        let mut orders = HashSet::new();
        let mut names = HashSet::new();
        for checkpoint in &checkpoints {
            assert!(
                orders.insert(checkpoint.order),
                "workflow {name}: duplicate checkpoint order {}",
                checkpoint.order
            );
            assert!(
                names.insert(checkpoint.name),
                "workflow {name}: duplicate checkpoint name '{}'",
                checkpoint.name
            );
        }
        checkpoints.sort_by_key(|checkpoint| checkpoint.order);
        Self { name, checkpoints }
    }

    pub fn checkpoints(&self) -> &[Checkpoint] {
        &self.checkpoints
    }

    pub fn checkpoint(&self, name: &str) -> Option<&Checkpoint> {
        self.checkpoints
            .iter()
            .find(|checkpoint| checkpoint.name == name)
    }
}
