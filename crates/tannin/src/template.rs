//! The template object: source plus bindings, rendered on demand.
//!
//! A [`Template`] is cheap and short-lived: load or create one, assign
//! variables, render, drop it. All shared state — modifiers, globals,
//! settings, loader, cache — lives on the [`Engine`] the template borrows.
//!
//! # Example
//!
//! ```rust
//! use tannin::Engine;
//!
//! let engine = Engine::new();
//! let mut tpl = engine.from_string("<p>{$name}</p>");
//! tpl.assign("name", "Ricardo");
//! assert_eq!(tpl.render().unwrap(), "<p>Ricardo</p>");
//! ```

use std::collections::HashMap;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::cache::cache_key;
use crate::engine::Engine;
use crate::error::{RenderError, Result};
use crate::locale;
use crate::parse::{expand_macros, parse, Tokenizer};
use crate::path::ANON_ROOT;
use crate::render::Renderer;

/// A template bound to an engine, with its own variable assignments.
pub struct Template<'e> {
    engine: &'e Engine,
    /// Load path, when the template came from the loader; keys the cache.
    identity: Option<String>,
    source: String,
    bindings: Map<String, Value>,
}

impl<'e> Template<'e> {
    pub(crate) fn from_parts(
        engine: &'e Engine,
        source: String,
        identity: Option<String>,
    ) -> Self {
        Template {
            engine,
            identity,
            source,
            bindings: Map::new(),
        }
    }

    /// The template's source text.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Assigns one variable. Anything serializable becomes a binding value.
    pub fn assign(&mut self, name: impl Into<String>, value: impl Serialize) -> &mut Self {
        let value = serde_json::to_value(value).unwrap_or(Value::Null);
        self.bindings.insert(name.into(), value);
        self
    }

    /// Merges a whole mapping of variables, later keys overriding earlier
    /// assignments of the same name.
    pub fn set_context(&mut self, vars: Map<String, Value>) -> &mut Self {
        for (name, value) in vars {
            self.bindings.insert(name, value);
        }
        self
    }

    /// The currently assigned variables.
    pub fn context(&self) -> &Map<String, Value> {
        &self.bindings
    }

    /// Loads an XML string table and exposes it to the template under
    /// `localized.<file stem>.<key>`.
    pub fn load_language(&mut self, path: &str) -> Result<&mut Self> {
        let (stem, table) = locale::load_string_table(path)?;
        let localized = self
            .bindings
            .entry("localized".to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(map) = localized {
            map.insert(stem, Value::Object(table));
        }
        Ok(self)
    }

    /// Renders the template to text.
    ///
    /// Runs macro expansion, tokenization, parsing, context annotation, and
    /// the tree walk; then, if the template extends a base, renders the base
    /// with this template's blocks as overrides and returns the base's
    /// output instead.
    pub fn render(&self) -> Result<String> {
        self.render_at_depth(0, HashMap::new())
    }

    pub(crate) fn render_at_depth(
        &self,
        depth: usize,
        overrides: HashMap<String, String>,
    ) -> Result<String> {
        let max_depth = self.engine.settings().max_depth;
        if depth > max_depth {
            return Err(RenderError::DepthExceeded(max_depth));
        }

        // Only plain top-level renders are cacheable: no overrides in, not
        // nested under an include or extends, and (checked below) no base to
        // defer to. Nested renders see caller-dependent bindings that the
        // identity key cannot capture.
        let cacheable = overrides.is_empty() && depth == 0;
        if cacheable {
            if let (Some(identity), Some(cache)) = (&self.identity, self.engine.cache()) {
                if let Some(hit) = cache.get(&cache_key(identity)) {
                    return Ok(hit);
                }
            }
        }

        let mut bindings = self.engine.globals().clone();
        bindings.insert(ANON_ROOT.to_string(), Value::Null);
        for (name, value) in &self.bindings {
            bindings.insert(name.clone(), value.clone());
        }

        let expanded = expand_macros(&self.source);
        let mut ast = parse(Tokenizer::new(&expanded).collect())?;
        crate::context::annotate(&mut ast.nodes, self.engine.settings().context_aware);

        let has_base = ast.base.is_some();
        let mut renderer = Renderer::new(self.engine, bindings, overrides, has_base, depth);
        let output = renderer.render(&ast.nodes)?;
        let blocks = renderer.into_blocks();

        if let Some(base_path) = &ast.base {
            let base_source = self
                .engine
                .loader()
                .load(base_path)
                .map_err(|_| RenderError::BaseNotFound(base_path.clone()))?;
            let mut base =
                Template::from_parts(self.engine, base_source, Some(base_path.clone()));
            base.bindings = self.bindings.clone();
            // The local render is discarded; the base's output wins.
            return base.render_at_depth(depth + 1, blocks);
        }

        if cacheable {
            if let (Some(identity), Some(cache)) = (&self.identity, self.engine.cache()) {
                cache.put(&cache_key(identity), &output);
            }
        }
        Ok(output)
    }
}

impl std::fmt::Debug for Template<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Template")
            .field("identity", &self.identity)
            .field("source_len", &self.source.len())
            .field("bindings", &self.bindings.len())
            .finish()
    }
}
