//! Unified error types for bundle-sbom.
//!
//! Per-module resolution failures never surface as errors: the finder and the
//! registry recover from them locally. The variants here cover what can abort a
//! build pass (configuration, root autodetection, emission) plus the manifest
//! errors that the recovering callers inspect before discarding.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for bundle-sbom operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum SbomError {
    /// A package manifest is missing or malformed
    #[error("Unreadable manifest at {path:?}: {context}")]
    ManifestUnreadable {
        path: PathBuf,
        context: String,
        #[source]
        source: ManifestErrorKind,
    },

    /// No usable manifest at the working directory while autodetection was requested
    #[error("Could not autodetect root component in {dir:?}: {context}")]
    RootAutodetect { dir: PathBuf, context: String },

    /// A serialization format with no registered serializer was requested
    #[error("Unsupported output format: {0}")]
    UnsupportedOutputFormat(String),

    /// Errors while rendering the BOM document
    #[error("Serialization failed: {context}")]
    Serialize {
        context: String,
        #[source]
        source: SerializeErrorKind,
    },

    /// IO errors with context
    #[error("IO error at {path:?}: {message}")]
    Io {
        path: Option<PathBuf>,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration errors
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Build input errors (malformed snapshot, unknown module ids)
    #[error("Invalid build input: {0}")]
    Input(String),
}

/// Why a manifest could not be used
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ManifestErrorKind {
    #[error("file not found")]
    NotFound,

    #[error("read failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("manifest is not a JSON object")]
    NotAnObject,
}

/// Specific serialization error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum SerializeErrorKind {
    #[error("JSON serialization failed: {0}")]
    Json(String),

    #[error("XML serialization failed: {0}")]
    Xml(String),

    #[error("Package URL construction failed: {0}")]
    Purl(String),
}

// ============================================================================
// Result type alias
// ============================================================================

/// Convenient Result type for bundle-sbom operations
pub type Result<T> = std::result::Result<T, SbomError>;

// ============================================================================
// Error construction helpers
// ============================================================================

impl SbomError {
    /// Create a manifest error for a path
    pub fn manifest(path: impl Into<PathBuf>, source: ManifestErrorKind) -> Self {
        Self::ManifestUnreadable {
            path: path.into(),
            context: String::new(),
            source,
        }
    }

    /// Create a root autodetection error
    pub fn root_autodetect(dir: impl Into<PathBuf>, context: impl Into<String>) -> Self {
        Self::RootAutodetect {
            dir: dir.into(),
            context: context.into(),
        }
    }

    /// Create an IO error with path context
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        let message = format!("{source}");
        Self::Io {
            path: Some(path),
            message,
            source,
        }
    }

    /// Create a serialization error
    pub fn serialize(context: impl Into<String>, source: SerializeErrorKind) -> Self {
        Self::Serialize {
            context: context.into(),
            source,
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a build input error
    pub fn input(message: impl Into<String>) -> Self {
        Self::Input(message.into())
    }

    /// True if the error only means "no usable manifest here"
    #[must_use]
    pub const fn is_manifest_unreadable(&self) -> bool {
        matches!(self, Self::ManifestUnreadable { .. })
    }
}

// ============================================================================
// Conversions from existing error types
// ============================================================================

impl From<std::io::Error> for SbomError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            path: None,
            message: format!("{err}"),
            source: err,
        }
    }
}

impl From<serde_json::Error> for SbomError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialize("JSON", SerializeErrorKind::Json(err.to_string()))
    }
}

// ============================================================================
// Error context extension trait
// ============================================================================

/// Extension trait for adding context to errors.
///
/// The context string is prepended to the error's existing context, so a
/// failure reads as a path through the code:
///
/// ```ignore
/// use bundle_sbom::error::ErrorContext;
///
/// let manifest = read_manifest(&dir)
///     .await
///     .with_context(|| format!("autodetecting root in {}", dir.display()))?;
/// ```
pub trait ErrorContext<T> {
    /// Add context to an error.
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context from a closure, only evaluated on error.
    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>;
}

impl<T, E: Into<SbomError>> ErrorContext<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        let ctx: String = context.into();
        self.map_err(|e| add_context_to_error(e.into(), &ctx))
    }

    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>,
    {
        self.map_err(|e| {
            let ctx: String = f().into();
            add_context_to_error(e.into(), &ctx)
        })
    }
}

/// Add context to an error, chaining with any existing context.
fn add_context_to_error(err: SbomError, new_ctx: &str) -> SbomError {
    match err {
        SbomError::ManifestUnreadable {
            path,
            context: existing,
            source,
        } => SbomError::ManifestUnreadable {
            path,
            context: chain_context(new_ctx, &existing),
            source,
        },
        SbomError::RootAutodetect {
            dir,
            context: existing,
        } => SbomError::RootAutodetect {
            dir,
            context: chain_context(new_ctx, &existing),
        },
        SbomError::Serialize {
            context: existing,
            source,
        } => SbomError::Serialize {
            context: chain_context(new_ctx, &existing),
            source,
        },
        SbomError::Io {
            path,
            message,
            source,
        } => SbomError::Io {
            path,
            message: chain_context(new_ctx, &message),
            source,
        },
        SbomError::UnsupportedOutputFormat(msg) => SbomError::UnsupportedOutputFormat(msg),
        SbomError::Config(msg) => SbomError::Config(chain_context(new_ctx, &msg)),
        SbomError::Input(msg) => SbomError::Input(chain_context(new_ctx, &msg)),
    }
}

/// Chain two context strings together.
///
/// If the existing context is empty, returns just the new context.
/// Otherwise, returns "`new_context`: `existing_context`".
fn chain_context(new: &str, existing: &str) -> String {
    if existing.is_empty() {
        new.to_string()
    } else {
        format!("{new}: {existing}")
    }
}

/// Extension trait for Option types to convert to errors with context.
pub trait OptionContext<T> {
    /// Convert None to an input error with the given context.
    fn context_none(self, context: impl Into<String>) -> Result<T>;
}

impl<T> OptionContext<T> for Option<T> {
    fn context_none(self, context: impl Into<String>) -> Result<T> {
        self.ok_or_else(|| SbomError::Input(context.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SbomError::manifest("/p/package.json", ManifestErrorKind::NotFound);
        let display = err.to_string();
        assert!(display.contains("/p/package.json"), "{display}");

        let err = SbomError::UnsupportedOutputFormat("yaml".to_string());
        assert_eq!(err.to_string(), "Unsupported output format: yaml");
    }

    #[test]
    fn test_error_chain() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = SbomError::io("/path/to/bom.json", io_err);

        assert!(err.to_string().contains("/path/to/bom.json"));
    }

    #[test]
    fn test_context_chaining_multiple_levels() {
        fn inner() -> Result<()> {
            Err(SbomError::root_autodetect("/app", "base"))
        }

        fn outer() -> Result<()> {
            inner().context("middle layer").context("outer layer")
        }

        match outer() {
            Err(SbomError::RootAutodetect { context, .. }) => {
                assert_eq!(context, "outer layer: middle layer: base");
            }
            other => panic!("Expected RootAutodetect error, got {other:?}"),
        }
    }

    #[test]
    fn test_with_context_lazy_evaluation() {
        let mut called = false;

        let ok_result: Result<i32> = Ok(42);
        let _ = ok_result.with_context(|| {
            called = true;
            "should not be called"
        });
        assert!(!called, "Closure should not be called for Ok result");

        let err_result: Result<i32> = Err(SbomError::config("error"));
        let _ = err_result.with_context(|| {
            called = true;
            "should be called"
        });
        assert!(called, "Closure should be called for Err result");
    }

    #[test]
    fn test_option_context() {
        let none_value: Option<i32> = None;
        match none_value.context_none("missing module") {
            Err(SbomError::Input(msg)) => assert_eq!(msg, "missing module"),
            other => panic!("Expected Input error, got {other:?}"),
        }
    }

    #[test]
    fn test_manifest_error_predicate() {
        let err = SbomError::manifest("/x", ManifestErrorKind::NotAnObject);
        assert!(err.is_manifest_unreadable());
        assert!(!SbomError::config("x").is_manifest_unreadable());
    }

    #[test]
    fn test_chain_context_helper() {
        assert_eq!(chain_context("new", ""), "new");
        assert_eq!(chain_context("new", "existing"), "new: existing");
    }
}
