//! Lookup tables for the free-text heuristics.
//!
//! These are configuration, not contracts: the defaults cover the English
//! log formats we have seen, and `rca.toml` can replace any table.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Keywords {
    /// A log line containing any of these (case-insensitive) is a failed step.
    pub failure_markers: Vec<String>,

    /// A log line starting with this prefix (case-insensitive) marks the last
    /// unresolved step and the workflow as succeeded.
    pub success_prefix: String,

    /// Phrases that identify an element interaction error in the log.
    pub interaction_markers: Vec<String>,
}

impl Default for Keywords {
    fn default() -> Self {
        Self {
            failure_markers: to_strings(&["error", "cannot", "fail", "not found"]),
            success_prefix: "Success".to_string(),
            interaction_markers: to_strings(&[
                "cannot click",
                "could not click",
                "unable to click",
                "not clickable",
                "not interactable",
                "click intercepted",
                "intercepts pointer events",
                "cannot interact",
                "cannot select",
                "could not select",
                "unable to select",
                "cannot type",
                "stale element",
            ]),
        }
    }
}

impl Keywords {
    pub fn is_failure_line(&self, line: &str) -> bool {
        contains_any(&line.to_lowercase(), &self.failure_markers)
    }

    pub fn is_success_line(&self, line: &str) -> bool {
        line.trim_start()
            .to_lowercase()
            .starts_with(&self.success_prefix.to_lowercase())
    }

    pub fn is_interaction_error(&self, line: &str) -> bool {
        contains_any(&line.to_lowercase(), &self.interaction_markers)
    }
}

/// True if the lowercased `haystack` contains any marker (compared lowercased).
fn contains_any(haystack: &str, markers: &[String]) -> bool {
    markers
        .iter()
        .any(|marker| haystack.contains(&marker.to_lowercase()))
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| item.to_string()).collect()
}
