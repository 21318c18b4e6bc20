//! Error types for template rendering.
//!
//! [`RenderError`] covers the *aborting* failure classes only: a template
//! that cannot be loaded, an invalid inheritance declaration, a directive
//! that cannot be evaluated, or a runaway include/extends chain. Modifier
//! failures are deliberately not errors — they degrade into visible inline
//! fragments (see [`crate::diag`]) so one broken expression cannot take down
//! a whole page.

use thiserror::Error;

/// Errors that abort a render.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The template file could not be found or read.
    #[error("unable to load file '{0}'")]
    TemplateNotFound(String),

    /// A template declared `{extends}` more than once.
    #[error("each template can extend 1 parent at the most")]
    MultipleExtends,

    /// The declared base template could not be loaded.
    #[error("unable to extend base template '{0}'")]
    BaseNotFound(String),

    /// A directive could not be parsed or evaluated. Carries the offending
    /// fragment so the failure is diagnosable from the message alone.
    #[error("{message} in '{fragment}'")]
    Eval {
        /// What went wrong.
        message: String,
        /// The directive text that triggered it.
        fragment: String,
    },

    /// The include/extends chain exceeded the configured depth limit.
    #[error("template nesting exceeded the depth limit of {0}")]
    DepthExceeded(usize),

    /// An I/O failure outside template loading (cache, localization files).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RenderError {
    pub(crate) fn eval(message: impl Into<String>, fragment: impl Into<String>) -> Self {
        RenderError::Eval {
            message: message.into(),
            fragment: fragment.into(),
        }
    }
}

/// Result type for rendering operations.
pub type Result<T> = std::result::Result<T, RenderError>;
