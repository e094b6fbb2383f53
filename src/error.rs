//! Error types for route-guards
//!
//! This module defines the error hierarchy used throughout the crate.
//! We use `thiserror` for library-style errors that are part of the API.
//! Denials and redirects are not errors: they are returned as
//! [`Outcome`](crate::guard::Outcome) values and only turned into HTTP
//! responses at the host boundary.

use thiserror::Error;

/// Boxed error returned by guard predicates and module loaders
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Top-level application error
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Guard load error: {0}")]
    Load(#[from] LoadError),

    #[error("Guard error: {0}")]
    Guard(#[from] GuardError),
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(String),

    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    #[error("Missing required configuration: {field}")]
    Missing { field: String },
}

/// Failure while building the guard table
///
/// A loader failure aborts the whole build attempt. It is never turned into
/// a silently missing guard.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to load guard module '{path}': {source}")]
    Loader {
        path: String,
        #[source]
        source: BoxError,
    },
}

impl LoadError {
    pub fn loader(path: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Loader {
            path: path.into(),
            source: source.into(),
        }
    }

    /// Path of the guard file whose loader failed
    pub fn path(&self) -> &str {
        match self {
            LoadError::Loader { path, .. } => path,
        }
    }
}

/// Errors raised while intercepting a request
#[derive(Error, Debug)]
pub enum GuardError {
    #[error(transparent)]
    Load(#[from] LoadError),

    /// The predicate itself failed instead of returning an outcome
    #[error("Guard for route '{route_id}' failed: {source}")]
    Predicate {
        route_id: String,
        #[source]
        source: BoxError,
    },
}

impl GuardError {
    pub fn predicate(route_id: impl Into<String>, source: BoxError) -> Self {
        Self::Predicate {
            route_id: route_id.into(),
            source,
        }
    }
}

/// Result type alias for the application
pub type Result<T> = std::result::Result<T, AppError>;

/// Result type alias for request interception
pub type GuardResult<T> = std::result::Result<T, GuardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loader_error_message() {
        let err = LoadError::loader("routes/admin/-guard.rs", "module not found");
        assert_eq!(err.path(), "routes/admin/-guard.rs");
        assert!(err.to_string().contains("routes/admin/-guard.rs"));
        assert!(err.to_string().contains("module not found"));
    }

    #[test]
    fn test_load_error_is_transparent_in_guard_error() {
        let err: GuardError = LoadError::loader("routes/x/-guard.rs", "boom").into();
        assert!(matches!(err, GuardError::Load(_)));
        assert!(err.to_string().starts_with("Failed to load guard module"));
    }

    #[test]
    fn test_predicate_error_keeps_source() {
        let err = GuardError::predicate("/api", "database unavailable".into());
        assert!(err.to_string().contains("/api"));
        let source = std::error::Error::source(&err).unwrap();
        assert_eq!(source.to_string(), "database unavailable");
    }

    #[test]
    fn test_app_error_conversions() {
        let err: AppError = ConfigError::Missing {
            field: "server.host".into(),
        }
        .into();
        assert!(matches!(err, AppError::Config(_)));

        let err: AppError = GuardError::predicate("/", "x".into()).into();
        assert!(matches!(err, AppError::Guard(_)));
    }
}
