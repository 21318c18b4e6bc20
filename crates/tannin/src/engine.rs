//! The engine: shared configuration and registries for all renders.
//!
//! An [`Engine`] is built once — settings, modifiers, globals, loader,
//! cache — and then only read while templates render against it. That
//! init-then-freeze discipline is what makes concurrent renders over one
//! engine safe: nothing here is mutated after setup.

use std::path::PathBuf;
use std::time::Duration;

use serde_json::{Map, Value};

use crate::cache::ContentCache;
use crate::error::{RenderError, Result};
use crate::loader::{FsLoader, TemplateLoader};
use crate::modifiers::{ModifierError, ModifierRegistry};
use crate::template::Template;

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Directory templates, includes, and bases load from.
    pub root: PathBuf,
    /// Whether interpolations get automatic context-aware escaping.
    pub context_aware: bool,
    /// Timezone the `toLocal` modifier converts into (`GMT`, `UTC`, or a
    /// fixed offset like `+02:00`).
    pub local_tz: String,
    /// Lifetime for cached render output.
    pub cache_lifetime: Duration,
    /// Upper bound on include/extends nesting. A cyclic chain is the
    /// caller's bug; this keeps it from becoming a stack overflow.
    pub max_depth: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            root: PathBuf::new(),
            context_aware: true,
            local_tz: "GMT".to_string(),
            cache_lifetime: Duration::from_secs(86_400),
            max_depth: 16,
        }
    }
}

/// Shared state for template rendering.
///
/// # Example
///
/// ```rust
/// use serde_json::json;
/// use tannin::Engine;
///
/// let mut engine = Engine::new();
/// engine.register_modifier("excited", |value, _args| {
///     Ok(json!(format!("{}!", value.as_str().unwrap_or_default())))
/// });
///
/// let mut tpl = engine.from_string("{$greeting.excited()}");
/// tpl.assign("greeting", "hey");
/// assert_eq!(tpl.render().unwrap(), "hey!");
/// ```
pub struct Engine {
    settings: Settings,
    registry: ModifierRegistry,
    globals: Map<String, Value>,
    loader: Box<dyn TemplateLoader>,
    cache: Option<Box<dyn ContentCache>>,
}

impl Engine {
    /// Creates an engine with default settings.
    pub fn new() -> Self {
        Self::with_settings(Settings::default())
    }

    /// Creates an engine from explicit settings. The default loader reads
    /// files under `settings.root`.
    pub fn with_settings(settings: Settings) -> Self {
        Engine {
            registry: ModifierRegistry::with_builtins(&settings.local_tz),
            globals: Map::new(),
            loader: Box::new(FsLoader::new(&settings.root)),
            cache: None,
            settings,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Registers a custom modifier. Returns `false` when the name is already
    /// taken (first registration wins).
    pub fn register_modifier<F>(&mut self, name: &str, f: F) -> bool
    where
        F: Fn(&Value, &[String]) -> std::result::Result<Value, ModifierError>
            + Send
            + Sync
            + 'static,
    {
        self.registry.register(name, f)
    }

    pub fn registry(&self) -> &ModifierRegistry {
        &self.registry
    }

    /// Sets the global bindings merged into every render. Per-template
    /// assignments of the same name win.
    pub fn set_globals(&mut self, globals: Map<String, Value>) {
        self.globals = globals;
    }

    pub fn globals(&self) -> &Map<String, Value> {
        &self.globals
    }

    /// Replaces the template loader.
    pub fn set_loader(&mut self, loader: Box<dyn TemplateLoader>) {
        self.loader = loader;
    }

    pub fn loader(&self) -> &dyn TemplateLoader {
        self.loader.as_ref()
    }

    /// Enables render-output caching.
    pub fn set_cache(&mut self, cache: Box<dyn ContentCache>) {
        self.cache = Some(cache);
    }

    pub fn cache(&self) -> Option<&dyn ContentCache> {
        self.cache.as_deref()
    }

    /// Creates a template from source text.
    pub fn from_string(&self, source: impl Into<String>) -> Template<'_> {
        Template::from_parts(self, source.into(), None)
    }

    /// Loads a template through the loader.
    pub fn load(&self, path: &str) -> Result<Template<'_>> {
        let source = self
            .loader
            .load(path)
            .map_err(|_| RenderError::TemplateNotFound(path.to_string()))?;
        Ok(Template::from_parts(self, source, Some(path.to_string())))
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("settings", &self.settings)
            .field("globals", &self.globals.len())
            .field("cache", &self.cache.is_some())
            .finish()
    }
}
