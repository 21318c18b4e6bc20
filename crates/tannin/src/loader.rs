//! Template loading.
//!
//! Loading is a collaborator boundary: the engine asks a [`TemplateLoader`]
//! for source text by name and never touches the filesystem itself. The
//! default [`FsLoader`] reads files under a root directory; hosts swap in
//! their own implementation for embedded templates, databases, or tests.

use std::io;
use std::path::PathBuf;

/// Source of template content.
pub trait TemplateLoader: Send + Sync {
    /// Returns the source text for `path`.
    fn load(&self, path: &str) -> io::Result<String>;

    /// Fetches the content of an `http(s)` include target as opaque bytes.
    ///
    /// The default loader does not reach the network; hosts that want remote
    /// includes provide this.
    fn fetch_remote(&self, url: &str) -> io::Result<Vec<u8>> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            format!("remote includes are not enabled ({url})"),
        ))
    }
}

/// Loads templates from files under a root directory.
#[derive(Debug, Clone)]
pub struct FsLoader {
    root: PathBuf,
}

impl FsLoader {
    /// Creates a loader resolving paths against `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FsLoader { root: root.into() }
    }
}

impl TemplateLoader for FsLoader {
    fn load(&self, path: &str) -> io::Result<String> {
        std::fs::read_to_string(self.root.join(path))
    }
}
