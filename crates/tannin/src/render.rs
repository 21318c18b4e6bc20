//! The tree-walking renderer.
//!
//! Rendering walks the parsed tree against a binding environment. Loops
//! shadow their key/item names and restore them afterwards; blocks capture
//! their rendered content for inheritance; includes spawn a fresh nested
//! render with the current bindings. Undefined variables render as nothing.

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::ast::{BlockNode, IfNode, IncludeNode, LoopNode, Node, SwitchNode};
use crate::diag;
use crate::engine::Engine;
use crate::error::{RenderError, Result};
use crate::path::VarPath;
use crate::template::Template;
use crate::value::{display, loose_eq, truthy};

pub(crate) struct Renderer<'e> {
    engine: &'e Engine,
    bindings: Map<String, Value>,
    overrides: HashMap<String, String>,
    captured: HashMap<String, String>,
    has_base: bool,
    depth: usize,
}

impl<'e> Renderer<'e> {
    pub(crate) fn new(
        engine: &'e Engine,
        bindings: Map<String, Value>,
        overrides: HashMap<String, String>,
        has_base: bool,
        depth: usize,
    ) -> Self {
        Renderer {
            engine,
            bindings,
            overrides,
            captured: HashMap::new(),
            has_base,
            depth,
        }
    }

    pub(crate) fn render(&mut self, nodes: &[Node]) -> Result<String> {
        let mut out = String::new();
        self.render_into(nodes, &mut out)?;
        Ok(out)
    }

    /// The block contents captured during the render, overrides applied, for
    /// handing to a base template.
    pub(crate) fn into_blocks(self) -> HashMap<String, String> {
        self.captured
    }

    fn render_into(&mut self, nodes: &[Node], out: &mut String) -> Result<()> {
        for node in nodes {
            match node {
                Node::Text(text) => out.push_str(text),
                Node::Var(path) => {
                    let value = self.eval_path(path);
                    out.push_str(&display(&value));
                }
                Node::If(node) => self.render_if(node, out)?,
                Node::Loop(node) => self.render_loop(node, out)?,
                Node::Block(node) => self.render_block(node, out)?,
                Node::Switch(node) => self.render_switch(node, out)?,
                Node::Include(node) => self.render_include(node, out)?,
            }
        }
        Ok(())
    }

    /// Resolves a variable path and applies its modifier chain. A missing
    /// root or key resolves to null; the chain still runs, so modifiers like
    /// `default()` see the absence.
    fn eval_path(&self, path: &VarPath) -> Value {
        let root = self
            .bindings
            .get(&path.root)
            .cloned()
            .unwrap_or(Value::Null);
        let resolved = path.resolve(&root, |name| self.bindings.get(name));
        self.engine.registry().apply(&path.modifiers, resolved)
    }

    fn render_if(&mut self, node: &IfNode, out: &mut String) -> Result<()> {
        for (cond, body) in &node.branches {
            let holds = truthy(&cond.eval(&|p: &VarPath| self.eval_path(p)));
            if holds {
                return self.render_into(body, out);
            }
        }
        if let Some(body) = &node.else_body {
            return self.render_into(body, out);
        }
        Ok(())
    }

    fn render_loop(&mut self, node: &LoopNode, out: &mut String) -> Result<()> {
        let collection = self.eval_path(&node.path);

        let previous_item = self.bindings.get(&node.item).cloned();
        let previous_key = node
            .key
            .as_ref()
            .map(|k| self.bindings.get(k).cloned());

        match collection {
            Value::Array(items) => {
                for (index, item) in items.into_iter().enumerate() {
                    if let Some(key) = &node.key {
                        self.bindings.insert(key.clone(), Value::from(index));
                    }
                    self.bindings.insert(node.item.clone(), item);
                    self.render_into(&node.body, out)?;
                }
            }
            Value::Object(entries) => {
                for (name, item) in entries {
                    if let Some(key) = &node.key {
                        self.bindings.insert(key.clone(), Value::String(name));
                    }
                    self.bindings.insert(node.item.clone(), item);
                    self.render_into(&node.body, out)?;
                }
            }
            // Scalars and null iterate zero times.
            _ => {}
        }

        restore(&mut self.bindings, &node.item, previous_item);
        if let Some(key) = &node.key {
            restore(&mut self.bindings, key, previous_key.flatten());
        }
        Ok(())
    }

    fn render_block(&mut self, node: &BlockNode, out: &mut String) -> Result<()> {
        let mut content = String::new();
        self.render_into(&node.body, &mut content)?;

        // An override from a descendant replaces the local content; the
        // captured map carries whichever won, so the deepest override
        // survives a multi-level extends chain.
        let chosen = match self.overrides.get(&node.name) {
            Some(replacement) if !replacement.is_empty() => replacement.clone(),
            _ => content,
        };
        // With a base declared, rendering authority passes to the base
        // render pass: the block emits nothing here.
        if !self.has_base {
            out.push_str(&chosen);
        }
        self.captured.insert(node.name.clone(), chosen);
        Ok(())
    }

    fn render_switch(&mut self, node: &SwitchNode, out: &mut String) -> Result<()> {
        let subject = node.subject.eval(&|p: &VarPath| self.eval_path(p));
        let mut matched = None;
        for (index, (case, _)) in node.cases.iter().enumerate() {
            let candidate = case.eval(&|p: &VarPath| self.eval_path(p));
            if loose_eq(&subject, &candidate) {
                matched = Some(index);
                break;
            }
        }
        match matched {
            Some(index) => self.render_into(&node.cases[index].1, out),
            None => match &node.default {
                Some(body) => self.render_into(body, out),
                None => Ok(()),
            },
        }
    }

    fn render_include(&mut self, node: &IncludeNode, out: &mut String) -> Result<()> {
        if node.target.starts_with("http") {
            match self.engine.loader().fetch_remote(&node.target) {
                Ok(bytes) => out.push_str(&String::from_utf8_lossy(&bytes)),
                Err(err) => out.push_str(&diag::pill("include", &err.to_string())),
            }
            return Ok(());
        }

        let source = match self.engine.loader().load(&node.target) {
            Ok(source) => source,
            Err(_) => {
                out.push_str(&diag::pill(
                    "tannin",
                    &format!("unable to load file '{}'", node.target),
                ));
                return Ok(());
            }
        };

        let mut child = Template::from_parts(self.engine, source, Some(node.target.clone()));
        child.set_context(self.bindings.clone());
        for (name, value) in &node.params {
            match value {
                Some(v) => child.assign(name.as_str(), v.as_str()),
                None => child.assign(name.as_str(), true),
            };
        }
        match child.render_at_depth(self.depth + 1, HashMap::new()) {
            Ok(text) => out.push_str(&text),
            // A runaway chain is a resource failure, not a page decoration.
            Err(err @ RenderError::DepthExceeded(_)) => return Err(err),
            Err(err) => out.push_str(&diag::pill("tannin", &err.to_string())),
        }
        Ok(())
    }
}

fn restore(bindings: &mut Map<String, Value>, name: &str, previous: Option<Value>) {
    match previous {
        Some(value) => {
            bindings.insert(name.to_string(), value);
        }
        None => {
            bindings.remove(name);
        }
    }
}
