//! Modifier registry and pipeline.
//!
//! Modifiers are named value transformations invoked from interpolations:
//! `{$name.upper().truncate(10)}`. The registry is an explicit value — built
//! once, then shared by reference into every render — rather than process
//! global state, so concurrent renders only ever read it.
//!
//! Failure is graceful by contract. An unknown modifier name substitutes a
//! visible `[invalid modifier '<name>']` marker and the chain continues; a
//! modifier that returns an error short-circuits the chain into a styled
//! inline diagnostic. Neither aborts the render.

mod builtin;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::diag;
use crate::path::ModifierCall;

/// Error returned by a modifier function.
///
/// The message becomes the visible part of the inline diagnostic.
#[derive(Debug)]
pub struct ModifierError(String);

impl ModifierError {
    /// Creates an error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        ModifierError(message.into())
    }
}

impl fmt::Display for ModifierError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ModifierError {}

/// A modifier: `(current value, string arguments) -> new value`.
pub type ModifierFn = dyn Fn(&Value, &[String]) -> Result<Value, ModifierError> + Send + Sync;

/// Registry of named modifiers.
///
/// # Example
///
/// ```rust
/// use serde_json::{json, Value};
/// use tannin::ModifierRegistry;
///
/// let mut registry = ModifierRegistry::with_builtins("GMT");
/// let added = registry.register("shout", |value: &Value, _args: &[String]| {
///     Ok(json!(format!("{}!!", value.as_str().unwrap_or_default())))
/// });
/// assert!(added);
///
/// // First registration wins; built-ins cannot be overridden.
/// let replaced = registry.register("upper", |v: &Value, _: &[String]| Ok(v.clone()));
/// assert!(!replaced);
/// ```
pub struct ModifierRegistry {
    map: HashMap<String, Arc<ModifierFn>>,
}

impl ModifierRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        ModifierRegistry {
            map: HashMap::new(),
        }
    }

    /// Creates a registry with the built-in catalog registered.
    ///
    /// `local_tz` is the timezone the `toLocal` modifier converts into: a
    /// fixed offset like `+02:00`, or `GMT`/`UTC`.
    pub fn with_builtins(local_tz: &str) -> Self {
        let mut registry = Self::new();
        builtin::register_builtins(&mut registry, local_tz);
        registry
    }

    /// Registers a modifier under `name`.
    ///
    /// Returns `false` without replacing anything when the name is already
    /// taken — first registration wins, so built-ins cannot be clobbered by
    /// accident.
    pub fn register<F>(&mut self, name: &str, f: F) -> bool
    where
        F: Fn(&Value, &[String]) -> Result<Value, ModifierError> + Send + Sync + 'static,
    {
        if self.map.contains_key(name) {
            return false;
        }
        self.map.insert(name.to_string(), Arc::new(f));
        true
    }

    /// Whether `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.map.contains_key(name)
    }

    /// Applies a modifier chain to `value`, left to right.
    pub fn apply(&self, chain: &[ModifierCall], mut value: Value) -> Value {
        for call in chain {
            match self.map.get(&call.name) {
                None => {
                    value = Value::String(diag::invalid_modifier(&call.name));
                }
                Some(f) => match f(&value, &call.args) {
                    Ok(next) => value = next,
                    // The diagnostic is the final value: later modifiers
                    // (including the auto-appended context escape) must not
                    // re-encode its markup.
                    Err(err) => return Value::String(diag::pill(&call.name, &err.to_string())),
                },
            }
        }
        value
    }
}

impl Default for ModifierRegistry {
    fn default() -> Self {
        Self::with_builtins("GMT")
    }
}

impl fmt::Debug for ModifierRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModifierRegistry")
            .field("modifiers", &self.map.len())
            .finish()
    }
}
