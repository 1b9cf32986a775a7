//! Plugin-level error types and user-facing message mapping.
//!
//! Every failure crossing the plugin boundary is re-raised as a single
//! error type carrying an already-mapped, user-facing message; remote
//! internals are never leaked to users.

use thiserror::Error;
use tracing::error;

use crate::api::error::ApiError;
use crate::config::ConfigError;

/// Fixed message for authentication failures.
const ERR_UNAUTHORIZED: &str =
    "Unauthorized: either your OpenProject API key is invalid or it does not have access";

/// Fixed message for 404 responses.
const ERR_NOT_FOUND: &str =
    "OpenProject returned a 404 Not Found error: check that the work package exists and the configured project slug is correct";

/// Fixed message for unexpected failures.
const ERR_INTERNAL: &str = "An internal error occurred while communicating with OpenProject";

/// Message used when a remote error body carries no readable message.
const UNKNOWN_ERROR: &str = "unknown error";

/// The error type surfaced to the host platform.
#[derive(Debug, Error)]
pub enum PluginError {
    /// The plugin is missing required configuration.
    #[error("{0}")]
    Configuration(String),

    /// A remote operation failed.
    #[error("{0}")]
    Operation(String),
}

/// Result type for plugin operations.
pub type Result<T> = std::result::Result<T, PluginError>;

impl PluginError {
    /// The user-facing message.
    pub fn message(&self) -> &str {
        match self {
            PluginError::Configuration(msg) | PluginError::Operation(msg) => msg,
        }
    }

    /// Wrap an unexpected error.
    ///
    /// The original error is logged and the fixed internal-error message
    /// is surfaced instead.
    pub fn internal(err: &dyn std::error::Error) -> Self {
        error!(error = %err, "unexpected plugin error");
        PluginError::Operation(ERR_INTERNAL.to_string())
    }
}

impl From<ApiError> for PluginError {
    fn from(err: ApiError) -> Self {
        PluginError::Operation(message_from_error(&err))
    }
}

impl From<ConfigError> for PluginError {
    fn from(err: ConfigError) -> Self {
        PluginError::Configuration(err.to_string())
    }
}

/// Map an API error to the message shown to users.
///
/// 401 yields the fixed auth-failure message; 404 yields the fixed
/// not-found message regardless of body content; any other status names
/// the code and the remote error's own `message` field when the body
/// parsed, else "unknown error". Everything else collapses into the
/// fixed internal-error message.
pub fn message_from_error(err: &ApiError) -> String {
    match err {
        ApiError::Unauthorized(_) => ERR_UNAUTHORIZED.to_string(),
        ApiError::Api { status: 404, .. } => ERR_NOT_FOUND.to_string(),
        ApiError::Api { status, body } => format!(
            "Error communicating with OpenProject (HTTP {}): {}",
            status,
            body.message().unwrap_or(UNKNOWN_ERROR)
        ),
        _ => ERR_INTERNAL.to_string(),
    }
}
