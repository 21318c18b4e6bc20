//! Context-aware HTML template engine.
//!
//! tannin compiles a small template language — interpolations with modifier
//! pipelines, conditionals, loops, switches, named blocks, includes, and
//! template inheritance — into rendered output, escaping every interpolation
//! according to *where it sits in the markup* rather than trusting each call
//! site to remember.
//!
//! # Syntax
//!
//! ```text
//! {$user.name.truncate(20)}                 interpolation + modifiers
//! {if $count gt 0}…{elseif …}…{else}…{endif}
//! {loop $i,$item in $items}…{endloop}
//! {block header}…{endblock}
//! {extends "base.html"}
//! {include sidebar.html, section=docs}
//! <li tn-loop="$u in $users">{$u.name}</li> attribute macros
//! ```
//!
//! # Context-aware escaping
//!
//! Every interpolation is classified by its syntactic position — plain text,
//! inside a tag's attribute list, inside a quoted attribute value, or inside
//! a `<script>` block — and the matching escape is applied automatically:
//! HTML entities in text, percent-encoding in quoted attributes, JS-string
//! escaping in scripts. `{$x.ignoreContext()}` opts a single interpolation
//! out.
//!
//! ```rust
//! use tannin::Engine;
//!
//! let engine = Engine::new();
//! let mut tpl = engine.from_string("<a href=\"{$link}\">{$label}</a>");
//! tpl.assign("link", "m&m's page");
//! tpl.assign("label", "m&m's page");
//! assert_eq!(
//!     tpl.render().unwrap(),
//!     "<a href=\"m%26m%27s+page\">m&amp;m&#x27;s page</a>",
//! );
//! ```
//!
//! # Failure model
//!
//! Modifier problems degrade into visible inline fragments instead of
//! failing the render; undefined variables render as nothing. Only load
//! failures, invalid inheritance, unparseable directives, and runaway
//! include/extends chains abort, as [`RenderError`].
//!
//! # Crate layout
//!
//! - [`Engine`] / [`Settings`]: shared configuration, modifier registry,
//!   globals, loader, cache — built once, then read-only.
//! - [`Template`]: per-render object with its own bindings.
//! - [`ModifierRegistry`]: the modifier catalog, extensible via
//!   [`Engine::register_modifier`].
//! - [`TemplateLoader`] / [`ContentCache`]: collaborator seams for template
//!   sources and render caching.

pub mod ast;
pub mod cache;
pub mod cond;
mod context;
pub mod diag;
mod engine;
mod error;
pub mod loader;
pub mod locale;
mod modifiers;
pub mod parse;
pub mod path;
mod render;
mod template;
pub mod util;
pub mod value;

pub use cache::{cache_key, ContentCache, FsCache};
pub use engine::{Engine, Settings};
pub use error::{RenderError, Result};
pub use loader::{FsLoader, TemplateLoader};
pub use modifiers::{ModifierError, ModifierFn, ModifierRegistry};
pub use path::{ModifierCall, Segment, VarPath, ANON_ROOT};
pub use template::Template;
