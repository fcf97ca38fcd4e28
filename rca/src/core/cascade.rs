//! Root-cause resolution: the fixed decision cascade.
//!
//! Conditions are evaluated top-down and the first match wins:
//!
//! 1. DOM snapshot lacks every structural marker of the pivot checkpoint.
//! 2. The log reports an interaction error that names the pivot's element.
//! 3. The pivot depends on dynamically loaded content that never appears.
//! 4. The log shows an executed value that differs from the intended one.
//! 5. Otherwise, the website itself behaved unexpectedly.
//!
//! The success short-circuit runs before the cascade, and the fallback makes
//! it total.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::core::checkpoint::Checkpoint;
use crate::core::evaluate::CheckpointOutcome;
use crate::core::keywords::Keywords;
use crate::core::step::{StepRecord, find_word};
use crate::core::workflow::Branch;

/// `"X" instead of "Y"`, with straight or curly quotes.
static INSTEAD_OF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)["'“‘]([^"'”’]+)["'”’]\s+instead\s+of\s+["'“‘]([^"'”’]+)["'”’]"#).unwrap()
});

/// Everything the cascade looks at besides the checkpoint outcomes.
#[derive(Debug, Clone, Copy)]
pub struct Evidence<'a> {
    pub steps: &'a [StepRecord],
    /// True when the log itself declared overall success.
    pub declared_success: bool,
    /// `None` when no snapshot was captured; the DOM check is then skipped.
    pub dom_snapshot: Option<&'a str>,
    /// Rendered log text scanned for error and mismatch markers.
    pub failure_log: &'a str,
    /// Intended value per checkpoint name.
    pub expected_values: &'a BTreeMap<String, String>,
    pub keywords: &'a Keywords,
}

/// Selected branch and the checkpoint it was scoped to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub branch: Branch,
    pub pivot: Option<String>,
}

/// Select exactly one branch for the given outcomes.
///
/// `outcomes` must be the evaluation of `checkpoints`, in the same order.
pub fn resolve(
    checkpoints: &[Checkpoint],
    outcomes: &[CheckpointOutcome],
    evidence: &Evidence<'_>,
) -> Resolution {
    let pivot = checkpoints
        .iter()
        .zip(outcomes)
        .find(|(_, outcome)| !outcome.reached)
        .map(|(checkpoint, _)| checkpoint);

    let Some(pivot) = pivot else {
        debug!("all checkpoints reached");
        return Resolution {
            branch: Branch::Success,
            pivot: None,
        };
    };

    if evidence.declared_success && !evidence.steps.iter().any(StepRecord::is_failed) {
        debug!(pivot = pivot.name, "log declared success with no failed steps");
        return Resolution {
            branch: Branch::Success,
            pivot: None,
        };
    }

    let branch = cascade(pivot, checkpoints, outcomes, evidence);
    debug!(pivot = pivot.name, branch = ?branch, "root cause resolved");
    Resolution {
        branch,
        pivot: Some(pivot.name.to_string()),
    }
}

fn cascade(
    pivot: &Checkpoint,
    checkpoints: &[Checkpoint],
    outcomes: &[CheckpointOutcome],
    evidence: &Evidence<'_>,
) -> Branch {
    if let Some(dom) = evidence.dom_snapshot
        && dom_lacks_markers(pivot, dom)
    {
        return Branch::DomParsing;
    }
    if interaction_error_for(pivot, evidence) {
        return Branch::ElementInteraction;
    }
    if dynamic_content_missing(pivot, evidence.failure_log) {
        return Branch::DynamicContent;
    }
    if value_mismatch(checkpoints, outcomes, evidence) {
        return Branch::AgentReasoning;
    }
    Branch::WebsiteState
}

fn dom_lacks_markers(pivot: &Checkpoint, dom: &str) -> bool {
    if pivot.dom_markers.is_empty() {
        return false;
    }
    let dom = dom.to_lowercase();
    !pivot.dom_markers.iter().any(|marker| dom.contains(marker))
}

fn interaction_error_for(pivot: &Checkpoint, evidence: &Evidence<'_>) -> bool {
    evidence
        .failure_log
        .lines()
        .filter(|line| evidence.keywords.is_interaction_error(line))
        .any(|line| {
            let line = line.to_lowercase();
            pivot.interaction_targets.is_empty()
                || pivot
                    .interaction_targets
                    .iter()
                    .any(|target| find_word(&line, target).is_some())
        })
}

fn dynamic_content_missing(pivot: &Checkpoint, failure_log: &str) -> bool {
    let Some(content) = pivot.dynamic_content else {
        return false;
    };
    let log = failure_log.to_lowercase();
    !content.iter().any(|keyword| log.contains(keyword))
}

fn value_mismatch(
    checkpoints: &[Checkpoint],
    outcomes: &[CheckpointOutcome],
    evidence: &Evidence<'_>,
) -> bool {
    let stated = INSTEAD_OF_RE.captures_iter(evidence.failure_log).any(|caps| {
        let executed = caps.get(1).map_or("", |m| m.as_str());
        let intended = caps.get(2).map_or("", |m| m.as_str());
        !same_value(executed, intended)
    });
    if stated {
        return true;
    }

    evidence.expected_values.iter().any(|(name, expected)| {
        let Some(position) = checkpoints.iter().position(|c| c.name == name.as_str()) else {
            return false;
        };
        decisive_step(position, checkpoints, outcomes, evidence.steps)
            .and_then(|step| step.value.as_deref())
            .is_some_and(|value| !same_value(value, expected))
    })
}

/// The step that decided checkpoint `position`.
///
/// For a checkpoint the scan never reached, this is the first step after the
/// last reached checkpoint that would satisfy its matcher.
fn decisive_step<'a>(
    position: usize,
    checkpoints: &[Checkpoint],
    outcomes: &[CheckpointOutcome],
    steps: &'a [StepRecord],
) -> Option<&'a StepRecord> {
    if let Some(index) = outcomes.get(position).and_then(|outcome| outcome.step_index) {
        return steps.iter().find(|step| step.index == index);
    }
    let resume_at = outcomes
        .iter()
        .filter(|outcome| outcome.reached)
        .filter_map(|outcome| outcome.step_index)
        .max()
        .map_or(0, |index| index + 1);
    let matcher = checkpoints[position].matcher;
    steps
        .iter()
        .filter(|step| step.index >= resume_at && matcher.matches(step))
        .min_by_key(|step| step.index)
}

fn same_value(left: &str, right: &str) -> bool {
    left.trim().to_lowercase() == right.trim().to_lowercase()
}
