//! Framework detection and framework-specific remediation advice.

use std::collections::BTreeMap;

use crate::core::step::find_word;

pub const UNKNOWN_FRAMEWORK: &str = "unknown";

const GENERIC_ADVICE: &str = "Wait for target elements to become visible and interactable, \
re-read the page after every state-changing action, and verify typed or selected values \
against the task before continuing.";

const DEFAULT_ADVICE: &[(&str, &str)] = &[
    (
        "browser-use",
        "Re-extract page state after each dropdown change so dynamically loaded options are \
visible to the agent, and restate the exact target values in the task prompt.",
    ),
    (
        "playwright",
        "Prefer auto-waiting locators (get_by_role, select_option) and wait for the network to \
settle after actions that trigger dynamic content before locating dependent elements.",
    ),
    (
        "puppeteer",
        "Call page.waitForSelector before page.select or page.click, and await network idle \
after triggering dynamic loads.",
    ),
    (
        "selenium",
        "Use WebDriverWait with element_to_be_clickable before interacting, wrap native <select> \
elements with Select, and re-locate elements after dynamic updates to avoid stale references.",
    ),
];

/// Log keywords that identify a framework, checked in order.
const FRAMEWORK_HINTS: &[(&str, &[&str])] = &[
    ("selenium", &["selenium", "webdriver"]),
    ("playwright", &["playwright"]),
    ("puppeteer", &["puppeteer"]),
    ("browser-use", &["browser-use", "browser_use", "browseruse"]),
];

/// Framework name → advice, with a generic fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdviceTable {
    entries: BTreeMap<String, String>,
}

impl Default for AdviceTable {
    fn default() -> Self {
        Self {
            entries: DEFAULT_ADVICE
                .iter()
                .map(|(framework, advice)| (framework.to_string(), advice.to_string()))
                .collect(),
        }
    }
}

impl AdviceTable {
    /// Default table with `overrides` replacing or extending entries.
    pub fn with_overrides(overrides: &BTreeMap<String, String>) -> Self {
        let mut table = Self::default();
        for (framework, advice) in overrides {
            table
                .entries
                .insert(canonical_framework(framework), advice.clone());
        }
        table
    }

    pub fn lookup(&self, framework: &str) -> &str {
        self.entries
            .get(&canonical_framework(framework))
            .map(String::as_str)
            .unwrap_or(GENERIC_ADVICE)
    }
}

/// Pick the framework name for a result.
///
/// A non-blank `supplied` name wins; otherwise the log is searched for
/// framework hints, then `default` applies, then [`UNKNOWN_FRAMEWORK`].
pub fn resolve_framework(supplied: Option<&str>, log: &str, default: Option<&str>) -> String {
    if let Some(name) = supplied.filter(|name| !name.trim().is_empty()) {
        return canonical_framework(name);
    }
    if let Some(detected) = detect_framework(log) {
        return detected.to_string();
    }
    default
        .filter(|name| !name.trim().is_empty())
        .map(canonical_framework)
        .unwrap_or_else(|| UNKNOWN_FRAMEWORK.to_string())
}

/// First framework whose hint appears in `log`.
pub fn detect_framework(log: &str) -> Option<&'static str> {
    let log = log.to_lowercase();
    FRAMEWORK_HINTS
        .iter()
        .find(|(_, hints)| hints.iter().any(|hint| find_word(&log, hint).is_some()))
        .map(|(framework, _)| *framework)
}

fn canonical_framework(name: &str) -> String {
    name.trim().to_lowercase().replace('_', "-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn supplied_framework_wins_and_is_canonical() {
        let framework = resolve_framework(Some(" Browser_Use "), "selenium webdriver", None);
        assert_eq!(framework, "browser-use");
    }

    #[test]
    fn detects_framework_from_log() {
        assert_eq!(
            resolve_framework(None, "WebDriverException: element not interactable", None),
            "selenium"
        );
        assert_eq!(resolve_framework(Some(""), "playwright._impl", None), "playwright");
    }

    #[test]
    fn falls_back_to_default_then_unknown() {
        assert_eq!(resolve_framework(None, "no hints", Some("Puppeteer")), "puppeteer");
        assert_eq!(resolve_framework(None, "no hints", None), UNKNOWN_FRAMEWORK);
    }

    #[test]
    fn unknown_framework_gets_generic_advice() {
        let table = AdviceTable::default();
        assert_eq!(table.lookup("cypress"), GENERIC_ADVICE);
        assert!(table.lookup("Selenium").contains("WebDriverWait"));
    }

    #[test]
    fn overrides_replace_and_extend() {
        let overrides = BTreeMap::from([
            ("Cypress".to_string(), "use cy.get with retries".to_string()),
            ("selenium".to_string(), "custom".to_string()),
        ]);
        let table = AdviceTable::with_overrides(&overrides);
        assert_eq!(table.lookup("cypress"), "use cy.get with retries");
        assert_eq!(table.lookup("selenium"), "custom");
        assert!(table.lookup("playwright").contains("locators"));
    }
}
