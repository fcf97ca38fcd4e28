//! Task analysis: normalize, evaluate, resolve, report.

use tracing::{debug, instrument};

use crate::core::advice::{AdviceTable, resolve_framework};
use crate::core::cascade::{Evidence, resolve};
use crate::core::evaluate::evaluate;
use crate::core::normalize::{normalize, render_actions};
use crate::core::report::{AnalysisResult, build_result};
use crate::core::task::TaskInput;
use crate::core::workflow::Workflow;
use crate::io::config::ClassifierConfig;

/// Classify one task run against `workflow`.
///
/// Pure apart from tracing: equal arguments always produce equal results,
/// and no input makes it fail.
#[instrument(skip_all, fields(task_id = %task.task_id, workflow = %workflow))]
pub fn analyze_task(
    task: &TaskInput,
    workflow: Workflow,
    config: &ClassifierConfig,
) -> AnalysisResult {
    let actions = task.actions.0.as_slice();
    let normalized = normalize(&task.log, Some(actions), &config.keywords);
    debug!(
        steps = normalized.steps.len(),
        declared_success = normalized.declared_success,
        "log normalized"
    );

    let mut failure_log = task.log.render();
    if !actions.is_empty() {
        failure_log.push('\n');
        failure_log.push_str(&render_actions(actions));
    }

    let checkpoints = workflow.definition().checkpoints();
    let outcomes = evaluate(&normalized.steps, checkpoints);

    let evidence = Evidence {
        steps: &normalized.steps,
        declared_success: normalized.declared_success,
        dom_snapshot: task.dom_snapshot.as_deref(),
        failure_log: &failure_log,
        expected_values: &task.expected_values,
        keywords: &config.keywords,
    };
    let resolution = resolve(checkpoints, &outcomes, &evidence);
    let root_cause = workflow.root_cause(resolution.branch);

    let framework = resolve_framework(
        task.framework.as_deref(),
        &failure_log,
        config.default_framework.as_deref(),
    );
    let advice = AdviceTable::with_overrides(&config.advice);
    let result = build_result(
        &task.task_id,
        workflow,
        root_cause,
        outcomes,
        &framework,
        &advice,
    );
    debug!(root_cause = %result.root_cause, framework = %result.framework, "task analyzed");
    result
}
