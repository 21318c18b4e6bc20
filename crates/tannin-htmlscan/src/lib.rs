//! Incremental HTML scanning primitives for the tannin template engine.
//!
//! This crate provides the two character-level scanners the engine needs to
//! reason about raw HTML without parsing it into a DOM:
//!
//! - [`ContextScanner`]: an incremental scanner that classifies a position in
//!   a document as plain text, inside a tag's attribute list, inside a quoted
//!   attribute value, or inside the most recently opened element. The engine
//!   uses it to pick the escaping rule for each interpolation point.
//! - [`match_balanced`]: a forward scan from an already-recognized start tag
//!   to its balanced closing tag, tracking nesting depth and skipping tags
//!   that appear inside quoted attribute values. The engine uses it to expand
//!   attribute macros (`tn-if`, `tn-loop`, `tn-block`) around whole elements.
//!
//! Both scanners share the same tolerance for real-world markup: a backslash
//! escapes the character after it, any unescaped quote toggles string state,
//! and `<?...?>` processing sequences never open or close a tag.
//!
//! # Example
//!
//! ```rust
//! use tannin_htmlscan::ContextScanner;
//!
//! let mut scanner = ContextScanner::new();
//! scanner.feed("<a href=\"/x?q=");
//! assert!(scanner.in_tag());
//! assert!(scanner.in_string());
//! assert_eq!(scanner.tag(), "a");
//! ```

mod context;
mod matcher;

pub use context::{ContextScanner, ScanState};
pub use matcher::{match_balanced, TagMatch, VOID_ELEMENTS};
