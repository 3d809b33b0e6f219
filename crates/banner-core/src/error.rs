//! Error types for the banner engine.
//!
//! Resolution-path errors are absorbed at the resolver/engine boundary and
//! turned into "remove banner" instructions; the variants here exist so that
//! each layer can report what went wrong before the error is logged and
//! dropped. Configuration errors are the only ones surfaced to the user.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the banner engine.
#[derive(Debug, Error)]
pub enum BannerError {
    // Classification and resolution
    #[error("Invalid banner reference: {reason}")]
    ClassificationInvalid { reason: String },

    #[error("Failed to resolve banner '{reference}': {reason}")]
    ResolutionFailed { reference: String, reason: String },

    // Remote providers
    #[error("{provider} error: {message}")]
    Provider {
        provider: String,
        message: String,
        /// HTTP status, when the provider answered at all.
        status: Option<u16>,
    },

    #[error("Network error: {message}")]
    Network {
        message: String,
        /// Optional cause description
        cause: Option<String>,
    },

    #[error("Request timeout after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Rate limited by {service}, retry after {retry_after_secs:?} seconds")]
    RateLimited {
        service: String,
        retry_after_secs: Option<u64>,
    },

    // Configuration
    #[error("Field name '{alias}' is already used by {field}")]
    ConfigConflict { field: String, alias: String },

    #[error("Validation error for {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Invalid parameters: {message}")]
    InvalidParams { message: String },

    #[error("Method not found: {0}")]
    MethodNotFound(String),

    // File system
    #[error("IO error at {path:?}: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("File not found in vault: {0}")]
    FileNotFound(String),

    // Serialization
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    #[error("YAML error: {message}")]
    Yaml {
        message: String,
        #[source]
        source: Option<serde_yaml::Error>,
    },
}

/// Result type alias for banner operations.
pub type Result<T> = std::result::Result<T, BannerError>;

impl From<std::io::Error> for BannerError {
    fn from(err: std::io::Error) -> Self {
        BannerError::Io {
            message: err.to_string(),
            path: None,
            source: Some(err),
        }
    }
}

impl From<serde_json::Error> for BannerError {
    fn from(err: serde_json::Error) -> Self {
        BannerError::Json {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<serde_yaml::Error> for BannerError {
    fn from(err: serde_yaml::Error) -> Self {
        BannerError::Yaml {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<reqwest::Error> for BannerError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            BannerError::Timeout(std::time::Duration::from_secs(0))
        } else {
            let err = err.without_url();
            BannerError::Network {
                message: err.to_string(),
                cause: err.status().map(|s| s.to_string()),
            }
        }
    }
}

impl BannerError {
    /// Create an IO error with path context.
    pub fn io_with_path(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        BannerError::Io {
            message: err.to_string(),
            path: Some(path.into()),
            source: Some(err),
        }
    }

    /// Shorthand for a resolution failure.
    pub fn resolution(reference: impl Into<String>, reason: impl Into<String>) -> Self {
        BannerError::ResolutionFailed {
            reference: reference.into(),
            reason: reason.into(),
        }
    }

    /// Convert to a JSON-RPC error code.
    ///
    /// Custom error codes (application-defined, -32000 to -32099):
    /// - -32000: Network/provider error
    /// - -32001: Resolution failed
    /// - -32002: Configuration conflict
    /// - -32005: Validation error
    ///
    /// Unknown methods use the standard -32601.
    pub fn to_rpc_error_code(&self) -> i32 {
        match self {
            BannerError::Network { .. }
            | BannerError::Timeout(_)
            | BannerError::RateLimited { .. }
            | BannerError::Provider { .. } => -32000,

            BannerError::ResolutionFailed { .. }
            | BannerError::ClassificationInvalid { .. }
            | BannerError::FileNotFound(_) => -32001,

            BannerError::ConfigConflict { .. } => -32002,

            BannerError::Validation { .. } | BannerError::InvalidParams { .. } => -32005,

            BannerError::MethodNotFound(_) => -32601,

            _ => -32603,
        }
    }

    /// Check if this error is transient.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            BannerError::Network { .. } | BannerError::Timeout(_) | BannerError::RateLimited { .. }
        )
    }
}
