//! Inline diagnostic fragments.
//!
//! Failures that must stay visible without aborting a page — a missing
//! include, a modifier that threw — are rendered as a small styled "pill"
//! directly in the output. The markup is fixed so the fragments are easy to
//! spot and easy to grep for.

const PILL_STYLE: &str = "display: inline-block; background: red; color: white; \
     padding: 2px 8px; border-radius: 10px; font-family: 'Lucida Console', Monaco, \
     monospace, sans-serif; font-size: 80%";

/// Renders a styled inline diagnostic with a bold label and a message.
pub fn pill(label: &str, message: &str) -> String {
    format!("<span style=\"{PILL_STYLE}\"><b>{label}</b>: {message}</span>")
}

/// The plain-text marker substituted when a modifier chain names a modifier
/// that is not registered.
pub fn invalid_modifier(name: &str) -> String {
    format!("[invalid modifier '{name}']")
}
