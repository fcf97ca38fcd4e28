//! Input normalization: raw task logs to canonical step sequences.
//!
//! Logs arrive in several literal shapes. [`RawLog`] captures them as a sum
//! type and [`normalize`] flattens every shape into ordered [`StepRecord`]s
//! with a single exhaustive match. Normalization never fails: unusable input
//! degrades to an empty sequence.

use serde::Deserialize;
use serde_json::Value;

use crate::core::keywords::Keywords;
use crate::core::step::{ActionKind, StepRecord};

/// One structured action as reported by an automation framework.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawAction {
    pub action: String,
    pub target: Option<String>,
    pub value: Option<String>,
    pub success: Option<bool>,
    pub error: Option<String>,
    pub description: Option<String>,
}

const ACTION_KEYS: &[&str] = &["action", "action_type", "type", "kind", "name"];
const TARGET_KEYS: &[&str] = &["target", "element", "selector", "xpath", "url"];
const VALUE_KEYS: &[&str] = &["value", "text", "option", "input"];
const SUCCESS_KEYS: &[&str] = &["success", "succeeded", "ok"];
const ERROR_KEYS: &[&str] = &["error", "exception"];
const DESCRIPTION_KEYS: &[&str] = &["description", "details", "thought"];

impl RawAction {
    /// Read an action from any JSON value without failing.
    ///
    /// Objects of the form `{"click_element": {...}}` (a single key holding
    /// the arguments) use the key as the action name.
    pub fn from_value(value: &Value) -> RawAction {
        let Some(map) = value.as_object() else {
            return RawAction {
                action: text_of(value).unwrap_or_default(),
                ..RawAction::default()
            };
        };

        let action = first_text(map, ACTION_KEYS);
        if action.is_none()
            && map.len() == 1
            && let Some((name, Value::Object(args))) = map.iter().next()
        {
            return RawAction {
                action: name.clone(),
                ..RawAction::from_value(&Value::Object(args.clone()))
            };
        }

        RawAction {
            action: action.unwrap_or_default(),
            target: first_text(map, TARGET_KEYS),
            value: first_text(map, VALUE_KEYS),
            success: SUCCESS_KEYS
                .iter()
                .find_map(|key| map.get(*key).and_then(flag_of)),
            error: first_text(map, ERROR_KEYS).filter(|err| !err.trim().is_empty()),
            description: first_text(map, DESCRIPTION_KEYS),
        }
    }

    fn to_step(&self, index: usize) -> StepRecord {
        let mut action_kind = ActionKind::classify(&self.action);
        if action_kind == ActionKind::Other
            && let Some(description) = &self.description
        {
            action_kind = ActionKind::classify(description);
        }
        let target = self
            .target
            .clone()
            .or_else(|| self.description.clone())
            .unwrap_or_default();
        let succeeded = match (self.success, &self.error) {
            (Some(flag), _) => Some(flag),
            (None, Some(_)) => Some(false),
            (None, None) => None,
        };
        StepRecord {
            index,
            action_kind,
            target,
            value: self.value.clone(),
            succeeded,
        }
    }

    /// Single-line rendering used when scanning logs for markers.
    fn render(&self) -> String {
        let mut parts = vec![self.action.clone()];
        parts.extend(self.target.iter().cloned());
        parts.extend(self.value.iter().map(|value| format!("\"{value}\"")));
        parts.extend(self.description.iter().cloned());
        let mut line = parts.join(" ");
        if let Some(error) = &self.error {
            line.push_str(" error: ");
            line.push_str(error);
        }
        line
    }
}

/// A structured action sequence, read leniently from JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "Value")]
pub struct ActionSequence(pub Vec<RawAction>);

impl From<Value> for ActionSequence {
    fn from(value: Value) -> Self {
        match value {
            Value::Array(items) => ActionSequence(items.iter().map(RawAction::from_value).collect()),
            Value::Null => ActionSequence::default(),
            other => ActionSequence(vec![RawAction::from_value(&other)]),
        }
    }
}

/// A task outcome log in any of its accepted shapes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "Value")]
pub enum RawLog {
    /// Freeform multi-line text.
    Text(String),
    /// Ordered plain strings, one step each.
    Lines(Vec<String>),
    /// Step name to description, in insertion order.
    Mapping(Vec<(String, String)>),
    /// Structured action objects.
    Actions(Vec<RawAction>),
}

impl Default for RawLog {
    fn default() -> Self {
        RawLog::Text(String::new())
    }
}

impl From<Value> for RawLog {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => RawLog::default(),
            Value::String(text) => RawLog::Text(text),
            Value::Array(items) => {
                if !items.is_empty() && items.iter().all(Value::is_object) {
                    RawLog::Actions(items.iter().map(RawAction::from_value).collect())
                } else {
                    RawLog::Lines(items.iter().filter_map(text_of).collect())
                }
            }
            Value::Object(map) => RawLog::Mapping(
                map.into_iter()
                    .map(|(key, value)| (key, text_of(&value).unwrap_or_default()))
                    .collect(),
            ),
            other => RawLog::Text(text_of(&other).unwrap_or_default()),
        }
    }
}

impl RawLog {
    /// Render the log as text lines for marker scanning.
    pub fn render(&self) -> String {
        match self {
            RawLog::Text(text) => text.clone(),
            RawLog::Lines(lines) => lines.join("\n"),
            RawLog::Mapping(entries) => entries
                .iter()
                .map(|(key, value)| mapping_line(key, value))
                .collect::<Vec<_>>()
                .join("\n"),
            RawLog::Actions(actions) => render_actions(actions),
        }
    }
}

pub fn render_actions(actions: &[RawAction]) -> String {
    actions
        .iter()
        .map(RawAction::render)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Canonical steps plus whether the log itself declared overall success.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedLog {
    pub steps: Vec<StepRecord>,
    pub declared_success: bool,
}

/// Flatten a raw log into ordered steps.
///
/// A non-empty `action_sequence` takes precedence over the raw log.
pub fn normalize(
    raw_log: &RawLog,
    action_sequence: Option<&[RawAction]>,
    keywords: &Keywords,
) -> NormalizedLog {
    if let Some(actions) = action_sequence.filter(|actions| !actions.is_empty()) {
        return from_actions(actions);
    }

    match raw_log {
        RawLog::Actions(actions) => from_actions(actions),
        RawLog::Text(text) => from_lines(text.lines(), keywords),
        RawLog::Lines(lines) => from_lines(lines.iter().flat_map(|line| line.lines()), keywords),
        RawLog::Mapping(entries) => {
            let lines: Vec<String> = entries
                .iter()
                .map(|(key, value)| mapping_line(key, value))
                .collect();
            from_lines(lines.iter().map(String::as_str), keywords)
        }
    }
}

fn from_actions(actions: &[RawAction]) -> NormalizedLog {
    NormalizedLog {
        steps: actions
            .iter()
            .enumerate()
            .map(|(index, action)| action.to_step(index))
            .collect(),
        declared_success: false,
    }
}

fn from_lines<'a>(lines: impl Iterator<Item = &'a str>, keywords: &Keywords) -> NormalizedLog {
    let mut log = NormalizedLog::default();
    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if keywords.is_success_line(line) {
            if let Some(step) = last_unresolved(&mut log.steps) {
                step.succeeded = Some(true);
            }
            log.declared_success = true;
            continue;
        }

        let failed = keywords.is_failure_line(line);
        let action_kind = ActionKind::classify(line);
        if failed
            && action_kind == ActionKind::Other
            && let Some(step) = last_unresolved(&mut log.steps)
        {
            step.succeeded = Some(false);
            continue;
        }

        let index = log.steps.len();
        log.steps.push(StepRecord {
            index,
            action_kind,
            target: line.to_string(),
            value: first_quoted(line),
            succeeded: failed.then_some(false),
        });
    }
    log
}

fn last_unresolved(steps: &mut [StepRecord]) -> Option<&mut StepRecord> {
    steps
        .iter_mut()
        .rev()
        .find(|step| step.succeeded.is_none())
}

fn mapping_line(key: &str, value: &str) -> String {
    if value.is_empty() {
        key.to_string()
    } else {
        format!("{}: {}", key.replace('_', " "), value)
    }
}

/// The first double-quoted fragment in `line`, if any.
fn first_quoted(line: &str) -> Option<String> {
    let start = line.find('"')? + 1;
    let len = line[start..].find('"')?;
    let quoted = line[start..start + len].trim();
    (!quoted.is_empty()).then(|| quoted.to_string())
}

fn first_text(map: &serde_json::Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| map.get(*key).and_then(text_of))
}

pub(crate) fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

fn flag_of(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(flag) => Some(*flag),
        Value::String(text) => match text.trim().to_lowercase().as_str() {
            "true" | "yes" | "ok" | "success" => Some(true),
            "false" | "no" | "failed" | "failure" => Some(false),
            _ => None,
        },
        _ => None,
    }
}
