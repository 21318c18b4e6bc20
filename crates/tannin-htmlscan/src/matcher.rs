//! Balanced closing-tag matching.
//!
//! Given a start tag that has already been recognized (the engine finds them
//! with a regex), [`match_balanced`] scans forward to the closing tag that
//! balances it. The scan keeps a nesting counter so an inner element of the
//! same name does not falsely terminate the match, ignores void and
//! self-closed elements, and suppresses tag recognition inside quoted
//! attribute values.

/// HTML elements that never have a closing tag.
///
/// These do not participate in nesting-depth accounting.
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "command", "embed", "hr", "img", "input", "keygen", "link",
    "meta", "param", "source", "track", "wbr",
];

/// Result of a balanced-close scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagMatch {
    /// Byte offset of the `<` that begins the matching closing tag.
    pub close_start: usize,
    /// Byte offset just past the `>` of the matching closing tag.
    pub end: usize,
}

/// Scans `content` from `from` (the byte offset just past the start tag's
/// `>`) for the closing tag that balances an already-open `tag_name`.
///
/// The nesting counter starts at 1. A same-named opening tag increments it, a
/// closing tag decrements it, and the match completes when it reaches zero.
/// Void elements and self-closed tags (`.../>`) never increment. Tags inside
/// quoted strings are not recognized.
///
/// Returns `None` when the content ends before the counter reaches zero; the
/// caller is expected to skip the occurrence, not fail.
pub fn match_balanced(content: &str, from: usize, tag_name: &str) -> Option<TagMatch> {
    let mut depth: i32 = 1;
    let mut in_string = false;
    let mut escaped = false;
    let mut in_tag = false;
    let mut capturing = false;
    let mut current_tag = String::new();
    let mut tag_start = 0usize;
    let mut prev: Option<char> = None;

    for (i, ch) in content[from..].char_indices() {
        let pos = from + i;
        let was_escaped = escaped;
        escaped = false;

        match ch {
            '\\' => {
                if !was_escaped {
                    escaped = true;
                }
            }
            '\'' | '"' => {
                if !was_escaped && in_tag {
                    in_string = !in_string;
                }
            }
            '<' => {
                if !in_string && !in_tag {
                    in_tag = true;
                    capturing = true;
                    current_tag.clear();
                    tag_start = pos;
                }
            }
            '>' => {
                if !in_string && in_tag {
                    in_tag = false;
                    capturing = false;
                    let name = current_tag.trim_end_matches('/');
                    let self_closed = current_tag.ends_with('/') || prev == Some('/');
                    if let Some(closed) = current_tag.strip_prefix('/') {
                        depth -= 1;
                        if closed.eq_ignore_ascii_case(tag_name) && depth <= 0 {
                            return Some(TagMatch {
                                close_start: tag_start,
                                end: pos + ch.len_utf8(),
                            });
                        }
                    } else if !self_closed && !is_void(name) {
                        depth += 1;
                    }
                }
            }
            c if c.is_whitespace() => {
                capturing = false;
            }
            c => {
                if capturing {
                    current_tag.push(c);
                }
            }
        }
        prev = Some(ch);
    }
    None
}

fn is_void(name: &str) -> bool {
    VOID_ELEMENTS.iter().any(|v| name.eq_ignore_ascii_case(v))
}
