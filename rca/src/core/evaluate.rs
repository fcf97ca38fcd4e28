//! Checkpoint evaluation over a canonical step sequence.

use serde::{Deserialize, Serialize};

use crate::core::checkpoint::Checkpoint;
use crate::core::step::StepRecord;

/// Result of matching the step sequence against one checkpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckpointOutcome {
    pub checkpoint_name: String,
    pub reached: bool,
    pub step_index: Option<usize>,
    pub failure_detail: Option<String>,
}

/// Evaluate checkpoints in order against `steps`.
///
/// - Each checkpoint matches the lowest-index step after the previous match.
/// - A match counts as reached unless the step explicitly failed.
/// - After the first unreached checkpoint, the rest are unreached without
///   scanning.
///
/// Returns one outcome per checkpoint, in checkpoint order.
pub fn evaluate(steps: &[StepRecord], checkpoints: &[Checkpoint]) -> Vec<CheckpointOutcome> {
    let mut outcomes = Vec::with_capacity(checkpoints.len());
    let mut next_index = 0;
    let mut blocked_by: Option<&str> = None;

    for checkpoint in checkpoints {
        if let Some(pivot) = blocked_by {
            outcomes.push(CheckpointOutcome {
                checkpoint_name: checkpoint.name.to_string(),
                reached: false,
                step_index: None,
                failure_detail: Some(format!("not evaluated: '{pivot}' was not reached")),
            });
            continue;
        }

        let matched = steps
            .iter()
            .filter(|step| step.index >= next_index)
            .filter(|step| checkpoint.matcher.matches(step))
            .min_by_key(|step| step.index);

        let outcome = match matched {
            Some(step) if step.is_failed() => CheckpointOutcome {
                checkpoint_name: checkpoint.name.to_string(),
                reached: false,
                step_index: Some(step.index),
                failure_detail: Some(format!("step {} failed: {}", step.index, step.target)),
            },
            Some(step) => {
                next_index = step.index + 1;
                CheckpointOutcome {
                    checkpoint_name: checkpoint.name.to_string(),
                    reached: true,
                    step_index: Some(step.index),
                    failure_detail: None,
                }
            }
            None => CheckpointOutcome {
                checkpoint_name: checkpoint.name.to_string(),
                reached: false,
                step_index: None,
                failure_detail: Some(if next_index == 0 {
                    "no matching step".to_string()
                } else {
                    format!("no matching step at or after index {next_index}")
                }),
            },
        };

        if !outcome.reached {
            blocked_by = Some(checkpoint.name);
        }
        outcomes.push(outcome);
    }

    outcomes
}

/// The first unreached outcome, if any.
pub fn pivot(outcomes: &[CheckpointOutcome]) -> Option<&CheckpointOutcome> {
    outcomes.iter().find(|outcome| !outcome.reached)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::checkpoint::Matcher;
    use crate::core::step::ActionKind;

    const CHECKPOINTS: [Checkpoint; 3] = [
        checkpoint("open", 0, &[ActionKind::Click]),
        checkpoint("choose", 1, &[ActionKind::Select]),
        checkpoint("confirm", 2, &[ActionKind::Click]),
    ];

    const fn checkpoint(
        name: &'static str,
        order: u32,
        kinds: &'static [ActionKind],
    ) -> Checkpoint {
        Checkpoint {
            name,
            order,
            matcher: Matcher {
                kinds,
                keywords: &[],
            },
            dom_markers: &[],
            interaction_targets: &[],
            dynamic_content: None,
        }
    }

    fn step(index: usize, kind: ActionKind, succeeded: Option<bool>) -> StepRecord {
        StepRecord {
            index,
            action_kind: kind,
            target: format!("step-{index}"),
            value: None,
            succeeded,
        }
    }

    fn reached(outcomes: &[CheckpointOutcome]) -> Vec<bool> {
        outcomes.iter().map(|outcome| outcome.reached).collect()
    }

    #[test]
    fn empty_steps_reach_nothing() {
        let outcomes = evaluate(&[], &CHECKPOINTS);
        assert_eq!(outcomes.len(), 3);
        assert_eq!(reached(&outcomes), vec![false, false, false]);
        assert_eq!(pivot(&outcomes).map(|o| o.checkpoint_name.as_str()), Some("open"));
    }

    #[test]
    fn unknown_success_counts_as_reached() {
        let steps = vec![
            step(0, ActionKind::Click, None),
            step(1, ActionKind::Select, None),
            step(2, ActionKind::Click, Some(true)),
        ];
        let outcomes = evaluate(&steps, &CHECKPOINTS);
        assert_eq!(reached(&outcomes), vec![true, true, true]);
        assert!(pivot(&outcomes).is_none());
    }

    #[test]
    fn scan_never_matches_backwards() {
        // The only click is before the select, so "confirm" cannot reuse it.
        let steps = vec![
            step(0, ActionKind::Click, None),
            step(1, ActionKind::Select, None),
        ];
        let outcomes = evaluate(&steps, &CHECKPOINTS);
        assert_eq!(reached(&outcomes), vec![true, true, false]);
        assert_eq!(outcomes[2].step_index, None);
        assert_eq!(
            outcomes[2].failure_detail.as_deref(),
            Some("no matching step at or after index 2")
        );
    }

    #[test]
    fn failed_match_short_circuits_the_rest() {
        let steps = vec![
            step(0, ActionKind::Click, None),
            step(1, ActionKind::Select, Some(false)),
            step(2, ActionKind::Select, Some(true)),
            step(3, ActionKind::Click, Some(true)),
        ];
        let outcomes = evaluate(&steps, &CHECKPOINTS);
        assert_eq!(reached(&outcomes), vec![true, false, false]);
        assert_eq!(outcomes[1].step_index, Some(1));
        assert_eq!(outcomes[2].step_index, None);
        assert_eq!(
            outcomes[2].failure_detail.as_deref(),
            Some("not evaluated: 'choose' was not reached")
        );
    }

    #[test]
    fn matched_indices_are_increasing() {
        let steps = vec![
            step(0, ActionKind::Select, None),
            step(1, ActionKind::Click, None),
            step(2, ActionKind::Click, None),
            step(3, ActionKind::Select, None),
            step(4, ActionKind::Click, None),
        ];
        let outcomes = evaluate(&steps, &CHECKPOINTS);
        let indices: Vec<_> = outcomes.iter().filter_map(|o| o.step_index).collect();
        assert_eq!(indices, vec![1, 3, 4]);
        assert!(indices.windows(2).all(|pair| pair[0] <= pair[1]));
    }
}
