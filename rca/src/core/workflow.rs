//! Workflow variants, their checkpoint definitions, and root-cause enums.
//!
//! Both variants share one cascade. Each variant owns a closed root-cause
//! enum whose values map one-to-one from the cascade's [`Branch`].

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::core::checkpoint::{Checkpoint, Matcher, WorkflowDefinition};
use crate::core::step::ActionKind;

/// Cascade branch selected by the resolver, shared by all workflows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Branch {
    Success,
    DomParsing,
    ElementInteraction,
    DynamicContent,
    AgentReasoning,
    WebsiteState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DropdownRootCause {
    Success,
    DomParsingFailure,
    ElementInteractionFailure,
    DynamicContentFailure,
    AgentReasoningFailure,
    WebsiteStateFailure,
}

impl From<Branch> for DropdownRootCause {
    fn from(branch: Branch) -> Self {
        match branch {
            Branch::Success => DropdownRootCause::Success,
            Branch::DomParsing => DropdownRootCause::DomParsingFailure,
            Branch::ElementInteraction => DropdownRootCause::ElementInteractionFailure,
            Branch::DynamicContent => DropdownRootCause::DynamicContentFailure,
            Branch::AgentReasoning => DropdownRootCause::AgentReasoningFailure,
            Branch::WebsiteState => DropdownRootCause::WebsiteStateFailure,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SearchRootCause {
    Success,
    DomParsingFailure,
    ElementInteractionFailure,
    ResultsLoadingFailure,
    AgentReasoningFailure,
    WebsiteStateFailure,
}

impl From<Branch> for SearchRootCause {
    fn from(branch: Branch) -> Self {
        match branch {
            Branch::Success => SearchRootCause::Success,
            Branch::DomParsing => SearchRootCause::DomParsingFailure,
            Branch::ElementInteraction => SearchRootCause::ElementInteractionFailure,
            Branch::DynamicContent => SearchRootCause::ResultsLoadingFailure,
            Branch::AgentReasoning => SearchRootCause::AgentReasoningFailure,
            Branch::WebsiteState => SearchRootCause::WebsiteStateFailure,
        }
    }
}

/// Root cause of a single analysis, tagged by workflow.
///
/// Serializes as the bare category name, e.g. `"DOM_PARSING_FAILURE"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum RootCause {
    Dropdown(DropdownRootCause),
    Search(SearchRootCause),
}

impl RootCause {
    pub fn is_success(self) -> bool {
        matches!(
            self,
            RootCause::Dropdown(DropdownRootCause::Success)
                | RootCause::Search(SearchRootCause::Success)
        )
    }

    pub fn label(self) -> &'static str {
        match self {
            RootCause::Dropdown(cause) => match cause {
                DropdownRootCause::Success => "SUCCESS",
                DropdownRootCause::DomParsingFailure => "DOM_PARSING_FAILURE",
                DropdownRootCause::ElementInteractionFailure => "ELEMENT_INTERACTION_FAILURE",
                DropdownRootCause::DynamicContentFailure => "DYNAMIC_CONTENT_FAILURE",
                DropdownRootCause::AgentReasoningFailure => "AGENT_REASONING_FAILURE",
                DropdownRootCause::WebsiteStateFailure => "WEBSITE_STATE_FAILURE",
            },
            RootCause::Search(cause) => match cause {
                SearchRootCause::Success => "SUCCESS",
                SearchRootCause::DomParsingFailure => "DOM_PARSING_FAILURE",
                SearchRootCause::ElementInteractionFailure => "ELEMENT_INTERACTION_FAILURE",
                SearchRootCause::ResultsLoadingFailure => "RESULTS_LOADING_FAILURE",
                SearchRootCause::AgentReasoningFailure => "AGENT_REASONING_FAILURE",
                SearchRootCause::WebsiteStateFailure => "WEBSITE_STATE_FAILURE",
            },
        }
    }
}

impl fmt::Display for RootCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Supported workflow variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Workflow {
    /// Cascading category dropdown: category, dynamic subcategory, item.
    Dropdown,
    /// Academic author search.
    Search,
}

impl Workflow {
    pub const ALL: [Workflow; 2] = [Workflow::Dropdown, Workflow::Search];

    pub fn as_str(self) -> &'static str {
        match self {
            Workflow::Dropdown => "dropdown",
            Workflow::Search => "search",
        }
    }

    pub fn definition(self) -> &'static WorkflowDefinition {
        match self {
            Workflow::Dropdown => &DROPDOWN,
            Workflow::Search => &SEARCH,
        }
    }

    pub fn root_cause(self, branch: Branch) -> RootCause {
        match self {
            Workflow::Dropdown => RootCause::Dropdown(branch.into()),
            Workflow::Search => RootCause::Search(branch.into()),
        }
    }
}

impl fmt::Display for Workflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Workflow {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "dropdown" | "cascade" | "cascade_dropdown" => Ok(Workflow::Dropdown),
            "search" | "arxiv" | "academic_search" => Ok(Workflow::Search),
            other => Err(format!(
                "unknown workflow '{other}' (expected one of: dropdown, search)"
            )),
        }
    }
}

const DROPDOWN_MARKUP: &[&str] = &[
    "<select",
    "role=\"listbox\"",
    "role=\"combobox\"",
    "aria-haspopup",
    "class=\"dropdown",
    "data-dropdown",
];
const OPTION_MARKUP: &[&str] = &["<option", "role=\"option\"", "role=\"menuitem\""];
const BUTTON_MARKUP: &[&str] = &["<button", "type=\"submit\"", "role=\"button\""];

static DROPDOWN: LazyLock<WorkflowDefinition> = LazyLock::new(|| {
    WorkflowDefinition::new(
        "dropdown",
        vec![
            Checkpoint {
                name: "Primary Category Navigation",
                order: 1,
                matcher: Matcher {
                    kinds: &[ActionKind::Navigate, ActionKind::Click],
                    keywords: &["category", "dropdown", "menu"],
                },
                dom_markers: DROPDOWN_MARKUP,
                interaction_targets: &["category", "dropdown", "menu"],
                dynamic_content: None,
            },
            Checkpoint {
                name: "Primary Category Selection",
                order: 2,
                matcher: Matcher {
                    kinds: &[ActionKind::Select, ActionKind::Click],
                    keywords: &["category", "option"],
                },
                dom_markers: OPTION_MARKUP,
                interaction_targets: &["category", "option"],
                dynamic_content: None,
            },
            Checkpoint {
                name: "Subcategory Loading",
                order: 3,
                matcher: Matcher {
                    kinds: &[ActionKind::Wait, ActionKind::Extract, ActionKind::Click],
                    keywords: &["subcategor", "sub-categor", "sub categor"],
                },
                dom_markers: DROPDOWN_MARKUP,
                interaction_targets: &["subcategor", "sub-categor", "sub categor"],
                dynamic_content: Some(&["subcategor", "sub-categor", "sub categor"]),
            },
            Checkpoint {
                name: "Subcategory Selection",
                order: 4,
                matcher: Matcher {
                    kinds: &[ActionKind::Select, ActionKind::Click],
                    keywords: &["subcategor", "sub-categor", "sub categor"],
                },
                dom_markers: OPTION_MARKUP,
                interaction_targets: &["subcategor", "sub-categor", "sub categor"],
                dynamic_content: Some(&["subcategor", "sub-categor", "sub categor"]),
            },
            Checkpoint {
                name: "Item Selection",
                order: 5,
                matcher: Matcher {
                    kinds: &[ActionKind::Click, ActionKind::Select],
                    keywords: &["item", "product", "listing"],
                },
                dom_markers: &[
                    "<a ",
                    "<a>",
                    "<button",
                    "role=\"link\"",
                    "class=\"product",
                    "class=\"item",
                ],
                interaction_targets: &["item", "product", "listing"],
                dynamic_content: Some(&["item", "product", "listing"]),
            },
            Checkpoint {
                name: "Goal Confirmation",
                order: 6,
                matcher: Matcher {
                    kinds: &[ActionKind::Extract, ActionKind::Click, ActionKind::Submit],
                    keywords: &["confirm", "verif", "cart", "checkout", "detail"],
                },
                dom_markers: BUTTON_MARKUP,
                interaction_targets: &["confirm", "cart", "checkout", "button"],
                dynamic_content: None,
            },
        ],
    )
});

static SEARCH: LazyLock<WorkflowDefinition> = LazyLock::new(|| {
    WorkflowDefinition::new(
        "search",
        vec![
            Checkpoint {
                name: "Search Page Navigation",
                order: 1,
                matcher: Matcher {
                    kinds: &[ActionKind::Navigate],
                    keywords: &[],
                },
                dom_markers: &["<form", "<input"],
                interaction_targets: &["search page", "page"],
                dynamic_content: None,
            },
            Checkpoint {
                name: "Search Field Selection",
                order: 2,
                matcher: Matcher {
                    kinds: &[ActionKind::Select, ActionKind::Click],
                    keywords: &["field", "author", "searchtype", "search type", "dropdown"],
                },
                dom_markers: &[
                    "<select",
                    "role=\"listbox\"",
                    "role=\"combobox\"",
                    "name=\"searchtype\"",
                ],
                interaction_targets: &["field", "searchtype", "search type", "dropdown"],
                dynamic_content: None,
            },
            Checkpoint {
                name: "Query Entry",
                order: 3,
                matcher: Matcher {
                    kinds: &[ActionKind::Type],
                    keywords: &[],
                },
                dom_markers: &["<input", "<textarea", "role=\"searchbox\"", "role=\"textbox\""],
                interaction_targets: &["input", "query", "search box", "text field", "textbox"],
                dynamic_content: None,
            },
            Checkpoint {
                name: "Search Submission",
                order: 4,
                matcher: Matcher {
                    kinds: &[ActionKind::Submit, ActionKind::Click],
                    keywords: &["search", "submit", "button"],
                },
                dom_markers: BUTTON_MARKUP,
                interaction_targets: &["search", "submit", "button"],
                dynamic_content: None,
            },
            Checkpoint {
                name: "Results Loading",
                order: 5,
                matcher: Matcher {
                    kinds: &[ActionKind::Wait, ActionKind::Extract],
                    keywords: &["result", "paper", "entries"],
                },
                dom_markers: &["<ol", "<ul", "<li", "<table", "class=\"arxiv-result"],
                interaction_targets: &[],
                dynamic_content: Some(&["result", "paper", "entries", "arxiv:"]),
            },
            Checkpoint {
                name: "Result Extraction",
                order: 6,
                matcher: Matcher {
                    kinds: &[ActionKind::Extract, ActionKind::Click],
                    keywords: &["paper", "title", "abstract", "result"],
                },
                dom_markers: &["<a ", "<a>", "<li", "<p", "class=\"title"],
                interaction_targets: &["paper", "title", "result", "link"],
                dynamic_content: Some(&["paper", "title", "abstract", "arxiv:"]),
            },
        ],
    )
});
