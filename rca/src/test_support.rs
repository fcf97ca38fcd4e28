//! Test-only helpers for building task inputs.

use crate::core::normalize::RawAction;

/// A structured action with no explicit success flag.
pub fn action(name: &str, target: &str, value: Option<&str>) -> RawAction {
    RawAction {
        action: name.to_string(),
        target: Some(target.to_string()),
        value: value.map(str::to_string),
        ..RawAction::default()
    }
}

/// Mark an action as explicitly succeeded.
pub fn succeeded(mut action: RawAction) -> RawAction {
    action.success = Some(true);
    action
}

/// Actions that reach every dropdown checkpoint in order.
pub fn dropdown_success_actions() -> Vec<RawAction> {
    vec![
        succeeded(action("click", "category dropdown", None)),
        succeeded(action("select_option", "category", Some("Electronics"))),
        succeeded(action("wait", "subcategory list", None)),
        succeeded(action("select_option", "subcategory", Some("Laptops"))),
        succeeded(action("click", "product: ThinkPad X1", None)),
        succeeded(action("click", "add to cart button", None)),
    ]
}
