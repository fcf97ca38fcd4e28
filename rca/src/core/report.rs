//! Result record assembly.

use serde::Serialize;

use crate::core::advice::AdviceTable;
use crate::core::evaluate::{CheckpointOutcome, pivot};
use crate::core::workflow::{RootCause, Workflow};

/// Output of one task analysis.
///
/// Contains no timestamps: equal inputs serialize to identical JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisResult {
    pub task_id: String,
    pub workflow: Workflow,
    pub root_cause: RootCause,
    pub framework: String,
    /// First unreached checkpoint; `None` when the task succeeded.
    pub pivot: Option<String>,
    /// One outcome per checkpoint, in checkpoint order.
    pub checkpoints: Vec<CheckpointOutcome>,
    pub advice: String,
}

/// Package a resolved root cause into a result record. Pure assembly.
pub fn build_result(
    task_id: &str,
    workflow: Workflow,
    root_cause: RootCause,
    outcomes: Vec<CheckpointOutcome>,
    framework: &str,
    advice: &AdviceTable,
) -> AnalysisResult {
    let pivot = if root_cause.is_success() {
        None
    } else {
        pivot(&outcomes).map(|outcome| outcome.checkpoint_name.clone())
    };
    AnalysisResult {
        task_id: task_id.to_string(),
        workflow,
        root_cause,
        framework: framework.to_string(),
        pivot,
        checkpoints: outcomes,
        advice: advice.lookup(framework).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::workflow::Branch;

    fn outcomes() -> Vec<CheckpointOutcome> {
        vec![
            CheckpointOutcome {
                checkpoint_name: "Primary Category Navigation".to_string(),
                reached: true,
                step_index: Some(0),
                failure_detail: None,
            },
            CheckpointOutcome {
                checkpoint_name: "Primary Category Selection".to_string(),
                reached: false,
                step_index: None,
                failure_detail: Some("no matching step at or after index 1".to_string()),
            },
        ]
    }

    #[test]
    fn build_result_is_idempotent() {
        let advice = AdviceTable::default();
        let cause = Workflow::Dropdown.root_cause(Branch::WebsiteState);
        let first = build_result("t1", Workflow::Dropdown, cause, outcomes(), "selenium", &advice);
        let second = build_result("t1", Workflow::Dropdown, cause, outcomes(), "selenium", &advice);
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).expect("json"),
            serde_json::to_string(&second).expect("json")
        );
        assert_eq!(first.pivot.as_deref(), Some("Primary Category Selection"));
        assert_eq!(first.advice, advice.lookup("selenium"));
    }

    #[test]
    fn success_has_no_pivot() {
        let advice = AdviceTable::default();
        let cause = Workflow::Dropdown.root_cause(Branch::Success);
        let result = build_result("t1", Workflow::Dropdown, cause, outcomes(), "unknown", &advice);
        assert_eq!(result.pivot, None);
    }

    #[test]
    fn serializes_expected_fields() {
        let advice = AdviceTable::default();
        let cause = Workflow::Search.root_cause(Branch::AgentReasoning);
        let result = build_result("t9", Workflow::Search, cause, outcomes(), "playwright", &advice);
        let value = serde_json::to_value(&result).expect("json");
        assert_eq!(value["task_id"], "t9");
        assert_eq!(value["workflow"], "search");
        assert_eq!(value["root_cause"], "AGENT_REASONING_FAILURE");
        assert_eq!(value["checkpoints"][0]["checkpoint_name"], "Primary Category Navigation");
        assert_eq!(value["checkpoints"][1]["step_index"], serde_json::Value::Null);
    }
}
