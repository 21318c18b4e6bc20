//! Rendered-output caching.
//!
//! Another collaborator boundary: the engine stores and looks up rendered
//! output through a [`ContentCache`], keyed by a stable hash of the template
//! identity. Only plain renders are cached — a template that extends a base,
//! or is rendered with block overrides, always renders fresh.

use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use sha1::{Digest, Sha1};

/// Stable cache key for a template identity (usually its load path).
pub fn cache_key(identity: &str) -> String {
    use std::fmt::Write;
    let digest = Sha1::digest(identity.as_bytes());
    digest.iter().fold(String::with_capacity(40), |mut out, b| {
        let _ = write!(out, "{b:02x}");
        out
    })
}

/// Byte-for-byte content store with expiry.
pub trait ContentCache: Send + Sync {
    /// Returns the cached content for `key` if present and not expired.
    fn get(&self, key: &str) -> Option<String>;

    /// Stores `content` under `key`. Failures are silent; caching is best
    /// effort.
    fn put(&self, key: &str, content: &str);

    /// Drops the entry for `key`, if any.
    fn invalidate(&self, key: &str);
}

/// File-backed cache: one file per key, expired by modification time.
#[derive(Debug, Clone)]
pub struct FsCache {
    dir: PathBuf,
    lifetime: Duration,
}

impl FsCache {
    /// Creates a cache writing under `dir` with entries valid for
    /// `lifetime`.
    pub fn new(dir: impl Into<PathBuf>, lifetime: Duration) -> Self {
        FsCache {
            dir: dir.into(),
            lifetime,
        }
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }

    fn is_fresh(&self, key: &str) -> bool {
        let Ok(meta) = std::fs::metadata(self.entry_path(key)) else {
            return false;
        };
        let Ok(modified) = meta.modified() else {
            return false;
        };
        match SystemTime::now().duration_since(modified) {
            Ok(age) => age < self.lifetime,
            // Clock went backwards; treat the entry as fresh.
            Err(_) => true,
        }
    }
}

impl ContentCache for FsCache {
    fn get(&self, key: &str) -> Option<String> {
        if !self.is_fresh(key) {
            self.invalidate(key);
            return None;
        }
        std::fs::read_to_string(self.entry_path(key)).ok()
    }

    fn put(&self, key: &str, content: &str) {
        let _ = std::fs::create_dir_all(&self.dir);
        let _ = std::fs::write(self.entry_path(key), content);
    }

    fn invalidate(&self, key: &str) {
        let _ = std::fs::remove_file(self.entry_path(key));
    }
}
