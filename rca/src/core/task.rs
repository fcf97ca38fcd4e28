//! Task input record.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::core::normalize::{ActionSequence, RawLog, text_of};
use crate::core::workflow::Workflow;

/// Everything known about one automation run.
///
/// Read leniently: any field may be absent or oddly typed. Scalars are
/// stringified, an unrecognized workflow reads as `None`, and `log` wins over
/// its aliases `failure_log` and `result`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "Value")]
pub struct TaskInput {
    pub task_id: String,
    pub workflow: Option<Workflow>,
    pub log: RawLog,
    pub dom_snapshot: Option<String>,
    pub actions: ActionSequence,
    pub framework: Option<String>,
    /// Intended value per checkpoint name, e.g. `{"Query Entry": "Geoffrey Hinton"}`.
    pub expected_values: BTreeMap<String, String>,
}

impl From<Value> for TaskInput {
    fn from(value: Value) -> Self {
        let Value::Object(mut map) = value else {
            return TaskInput::default();
        };
        TaskInput {
            task_id: take_text(&mut map, &["task_id", "id"]).unwrap_or_default(),
            workflow: take_text(&mut map, &["workflow"]).and_then(|name| name.parse().ok()),
            log: take(&mut map, &["log", "failure_log", "result"])
                .map(RawLog::from)
                .unwrap_or_default(),
            dom_snapshot: take_text(&mut map, &["dom_snapshot", "dom"]),
            actions: take(&mut map, &["actions", "action_sequence"])
                .map(ActionSequence::from)
                .unwrap_or_default(),
            framework: take_text(&mut map, &["framework"]),
            expected_values: match take(&mut map, &["expected_values"]) {
                Some(Value::Object(entries)) => entries
                    .iter()
                    .filter_map(|(name, value)| Some((name.clone(), text_of(value)?)))
                    .collect(),
                _ => BTreeMap::new(),
            },
        }
    }
}

/// First non-null value among `keys`, in key order.
fn take(map: &mut Map<String, Value>, keys: &[&str]) -> Option<Value> {
    keys.iter()
        .find_map(|key| map.remove(*key).filter(|value| !value.is_null()))
}

fn take_text(map: &mut Map<String, Value>, keys: &[&str]) -> Option<String> {
    take(map, keys).as_ref().and_then(text_of)
}

impl TaskInput {
    /// Pick the workflow: an explicit choice wins over the task's own field.
    pub fn workflow_or(&self, explicit: Option<Workflow>) -> Option<Workflow> {
        explicit.or(self.workflow)
    }
}
