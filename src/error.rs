//! Custom error types for tilewalk.
//!
//! Expected page conditions (an empty list, a missing action control) are not
//! errors; the engine encodes them as intents. What remains here are faults in
//! configuration, storage and page interaction.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for tilewalk operations
#[derive(Error, Debug)]
pub enum WalkError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Failed to load configuration
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        path: Option<PathBuf>,
    },

    /// Invalid configuration value
    #[error("Invalid configuration: {field} - {reason}")]
    InvalidConfig { field: String, reason: String },

    // =========================================================================
    // Storage Errors
    // =========================================================================
    /// Progress store read or write failed
    #[error("Store error for key '{key}': {message}")]
    Store { key: String, message: String },

    /// Could not acquire the store lock
    #[error("Failed to lock {path}: {message}")]
    StoreLock { path: PathBuf, message: String },

    // =========================================================================
    // Page Errors
    // =========================================================================
    /// A page primitive failed
    #[error("Page operation '{operation}' failed: {message}")]
    Page { operation: String, message: String },

    /// A handle no longer resolves to anything on the live page
    #[error("Stale handle: {what}")]
    StaleHandle { what: String },

    /// No browser to drive
    #[error("Browser unavailable: {detail}")]
    BrowserUnavailable { detail: String },

    // =========================================================================
    // Wrapped Errors
    // =========================================================================
    /// IO error wrapper
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON error wrapper
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// TOML parse error wrapper
    #[error(transparent)]
    Toml(#[from] toml::de::Error),

    /// Regex compile error wrapper
    #[error(transparent)]
    Regex(#[from] regex::Error),

    /// Generic error wrapper
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl WalkError {
    /// Create a configuration error with path
    pub fn config_with_path(message: impl Into<String>, path: PathBuf) -> Self {
        Self::Config {
            message: message.into(),
            path: Some(path),
        }
    }

    /// Create an invalid configuration error
    pub fn invalid_config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create a store error
    pub fn store(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Store {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Create a page error
    pub fn page(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Page {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Create a stale handle error
    pub fn stale(what: impl Into<String>) -> Self {
        Self::StaleHandle { what: what.into() }
    }

    /// Page-side failures that the next tick may well not see again.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Page { .. } | Self::StaleHandle { .. })
    }

    /// Get error code for exit status
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config { .. } | Self::InvalidConfig { .. } | Self::Toml(_) | Self::Regex(_) => 7,
            Self::Store { .. } | Self::StoreLock { .. } => 3,
            Self::BrowserUnavailable { .. } => 4,
            _ => 1,
        }
    }
}

/// Type alias for tilewalk results
pub type Result<T> = std::result::Result<T, WalkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = WalkError::page("click", "node detached");
        assert!(err.to_string().contains("click"));
        assert!(err.to_string().contains("node detached"));
    }

    #[test]
    fn test_is_transient() {
        assert!(WalkError::page("back", "timeout").is_transient());
        assert!(WalkError::stale("item 3").is_transient());
        assert!(!WalkError::invalid_config("page.hub_marker", "empty").is_transient());
        assert!(!WalkError::store("K", "disk full").is_transient());
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(
            WalkError::config_with_path("test", PathBuf::from("tilewalk.toml")).exit_code(),
            7
        );
        assert_eq!(WalkError::invalid_config("page.hub_marker", "empty").exit_code(), 7);
        assert_eq!(WalkError::store("K", "x").exit_code(), 3);
        assert_eq!(
            WalkError::BrowserUnavailable {
                detail: "no ws url".into()
            }
            .exit_code(),
            4
        );
        assert_eq!(WalkError::page("scroll", "x").exit_code(), 1);
    }

    #[test]
    fn test_config_with_path() {
        let path = PathBuf::from("/tmp/tilewalk.toml");
        let err = WalkError::config_with_path("failed to parse", path.clone());
        if let WalkError::Config {
            message,
            path: opt_path,
        } = err
        {
            assert_eq!(message, "failed to parse");
            assert_eq!(opt_path, Some(path));
        } else {
            panic!("Wrong error variant");
        }
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err: WalkError = io_err.into();
        assert!(matches!(err, WalkError::Io(_)));
        assert!(err.to_string().contains("access denied"));
    }

    #[test]
    fn test_error_from_regex() {
        let err: WalkError = regex::Regex::new("(unclosed").unwrap_err().into();
        assert!(matches!(err, WalkError::Regex(_)));
        assert_eq!(err.exit_code(), 7);
    }
}
