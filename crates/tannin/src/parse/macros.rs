//! Attribute-macro expansion.
//!
//! The macros `tn-block`, `tn-if`, and `tn-loop` on an HTML start tag expand
//! to the equivalent bracket directive wrapping the whole element:
//!
//! ```text
//! <li tn-loop="$u in $users">{$u.name}</li>
//!   becomes
//! {loop $u in $users}<li>{$u.name}</li>{endloop}
//! ```
//!
//! Expansion runs over the raw text before tokenization. The balanced
//! closing tag is found with [`match_balanced`]; an element with no balanced
//! close is left untouched.

use once_cell::sync::Lazy;
use regex::Regex;

use tannin_htmlscan::match_balanced;

static TN_BLOCK: Lazy<Regex> = Lazy::new(|| tag_pattern("tn-block"));
static TN_IF: Lazy<Regex> = Lazy::new(|| tag_pattern("tn-if"));
static TN_LOOP: Lazy<Regex> = Lazy::new(|| tag_pattern("tn-loop"));

fn tag_pattern(attribute: &str) -> Regex {
    // <name ...attr... tn-x="value" ...attr...>
    let pattern = format!(
        r#"<([A-Za-z][A-Za-z0-9_-]*)([^>]*?)\s+{attribute}\s*=\s*"([^"]*)"([^>]*)>"#
    );
    Regex::new(&pattern).expect("attribute macro pattern is valid")
}

/// Expands all attribute macros in `content`, block macros first so that
/// `tn-if`/`tn-loop` on the same element end up inside the block.
pub fn expand_macros(content: &str) -> String {
    let content = expand_kind(content, &TN_BLOCK, "block", "{endblock}");
    let content = expand_kind(&content, &TN_IF, "if", "{endif}");
    expand_kind(&content, &TN_LOOP, "loop", "{endloop}")
}

struct MacroSite {
    start: usize,
    end: usize,
    tag: String,
    value: String,
    rebuilt: String,
}

fn expand_kind(content: &str, pattern: &Regex, directive: &str, end_marker: &str) -> String {
    let sites: Vec<MacroSite> = pattern
        .captures_iter(content)
        .map(|caps| {
            let whole = caps.get(0).expect("group 0 always present");
            MacroSite {
                start: whole.start(),
                end: whole.end(),
                tag: caps[1].to_string(),
                value: caps[3].to_string(),
                rebuilt: format!("<{}{}{}>", &caps[1], &caps[2], &caps[4]),
            }
        })
        .collect();
    if sites.is_empty() {
        return content.to_string();
    }

    // Rewrite back to front so earlier offsets stay valid; scanning for the
    // balanced close always happens on the current text.
    let mut out = content.to_string();
    for site in sites.iter().rev() {
        let Some(found) = match_balanced(&out, site.end, &site.tag) else {
            continue;
        };
        out.insert_str(found.end, end_marker);
        out.replace_range(
            site.start..site.end,
            &format!("{{{directive} {}}}{}", site.value, site.rebuilt),
        );
    }
    out
}
