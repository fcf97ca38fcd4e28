//! Canonical step records produced by log normalization.

use serde::{Deserialize, Serialize};

/// Semantic tag for an observed action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Navigate,
    Click,
    Select,
    Type,
    Submit,
    Scroll,
    Wait,
    Extract,
    Other,
}

/// Keyword table used to tag free text with an [`ActionKind`].
///
/// Order breaks ties when two keywords start at the same position.
const ACTION_KEYWORDS: &[(ActionKind, &[&str])] = &[
    (
        ActionKind::Navigate,
        &["navigate", "go to", "goto", "visit", "load page", "opened url", "open url"],
    ),
    (ActionKind::Select, &["select", "choose", "chose", "pick"]),
    (
        ActionKind::Click,
        &["click", "press", "tap", "open", "expand", "hover"],
    ),
    (ActionKind::Type, &["type", "typing", "enter", "fill", "input"]),
    (ActionKind::Submit, &["submit"]),
    (ActionKind::Scroll, &["scroll"]),
    (ActionKind::Wait, &["wait", "loaded", "loading", "appear"]),
    (
        ActionKind::Extract,
        &["extract", "read", "verif", "confirm", "collect", "record"],
    ),
];

impl ActionKind {
    /// Tag free text with the kind whose keyword occurs earliest.
    ///
    /// Keywords must start at a word boundary. Underscores and hyphens are
    /// treated as spaces so tool names like `go_to_url` or `input_text` match.
    /// Text with no keyword is [`ActionKind::Other`].
    pub fn classify(text: &str) -> ActionKind {
        let haystack = text.to_lowercase().replace(['_', '-'], " ");
        let mut best: Option<(usize, ActionKind)> = None;
        for (kind, keywords) in ACTION_KEYWORDS {
            for keyword in *keywords {
                if let Some(pos) = find_word(&haystack, keyword)
                    && best.is_none_or(|(best_pos, _)| pos < best_pos)
                {
                    best = Some((pos, *kind));
                }
            }
        }
        best.map(|(_, kind)| kind).unwrap_or(ActionKind::Other)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::Navigate => "navigate",
            ActionKind::Click => "click",
            ActionKind::Select => "select",
            ActionKind::Type => "type",
            ActionKind::Submit => "submit",
            ActionKind::Scroll => "scroll",
            ActionKind::Wait => "wait",
            ActionKind::Extract => "extract",
            ActionKind::Other => "other",
        }
    }
}

/// Byte offset of the first occurrence of `needle` that starts a word.
pub(crate) fn find_word(haystack: &str, needle: &str) -> Option<usize> {
    haystack.match_indices(needle).map(|(pos, _)| pos).find(|pos| {
        haystack[..*pos]
            .chars()
            .next_back()
            .is_none_or(|ch| !ch.is_alphanumeric())
    })
}

/// One observed action in a task log.
///
/// `succeeded` is tri-state: `None` when the log does not confirm either way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRecord {
    pub index: usize,
    pub action_kind: ActionKind,
    pub target: String,
    pub value: Option<String>,
    pub succeeded: Option<bool>,
}

impl StepRecord {
    /// True only when the log explicitly reports failure.
    pub fn is_failed(&self) -> bool {
        self.succeeded == Some(false)
    }

    /// Lowercased target and value, used for keyword matching.
    pub fn haystack(&self) -> String {
        match &self.value {
            Some(value) => format!("{} {}", self.target, value).to_lowercase(),
            None => self.target.to_lowercase(),
        }
    }
}
