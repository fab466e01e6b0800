//! Error types for aduan.

use serde_json::json;
use thiserror::Error;

/// Application result type.
pub type AppResult<T> = Result<T, AppError>;

/// Application error type.
#[derive(Debug, Error)]
pub enum AppError {
    // === Client Errors ===
    #[error("Complaint not found: {0}")]
    ComplaintNotFound(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    /// Credentials did not match any account.
    #[error("Unauthorized")]
    Unauthorized,

    /// The caller's role, ownership or the record's status forbids the action.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    // === Server Errors ===
    #[error("Database error: {0}")]
    Database(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the stable error code the presentation layer maps to a message.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::ComplaintNotFound(_) => "COMPLAINT_NOT_FOUND",
            Self::UserNotFound(_) => "USER_NOT_FOUND",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::InvalidState(_) => "INVALID_STATE",
            Self::Conflict(_) => "CONFLICT",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Storage(_) => "STORAGE_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns whether this error is a not-found condition of any kind.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::ComplaintNotFound(_) | Self::UserNotFound(_))
    }

    /// Returns whether this error originates from the store or the process
    /// rather than from the caller's input.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::Database(_) | Self::Storage(_) | Self::Config(_) | Self::Internal(_)
        )
    }

    /// Render the error as the JSON envelope handed to UI code.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        if self.is_server_error() {
            tracing::error!(error = %self, code = self.error_code(), "Server error occurred");
        } else {
            tracing::debug!(error = %self, code = self.error_code(), "Client error occurred");
        }

        json!({
            "error": {
                "code": self.error_code(),
                "message": self.to_string(),
            }
        })
    }
}

// === From implementations ===

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_is_distinct_from_forbidden() {
        let missing = AppError::ComplaintNotFound("ADU1".to_string());
        let denied = AppError::Forbidden("not the owner".to_string());

        assert!(missing.is_not_found());
        assert!(!denied.is_not_found());
        assert_ne!(missing.error_code(), denied.error_code());
    }

    #[test]
    fn test_server_errors() {
        assert!(AppError::Database("timeout".to_string()).is_server_error());
        assert!(AppError::Storage("disk full".to_string()).is_server_error());
        assert!(!AppError::Conflict("email".to_string()).is_server_error());
        assert!(!AppError::Unauthorized.is_server_error());
    }

    #[test]
    fn test_invalid_transition_message() {
        let err = AppError::InvalidTransition {
            from: "baru".to_string(),
            to: "diproses".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid status transition: baru -> diproses");
        assert_eq!(err.error_code(), "INVALID_TRANSITION");
    }

    #[test]
    fn test_to_json_envelope() {
        let body = AppError::InvalidState("feedback needs a finished complaint".to_string())
            .to_json();
        assert_eq!(body["error"]["code"], "INVALID_STATE");
        assert_eq!(
            body["error"]["message"],
            "Invalid state: feedback needs a finished complaint"
        );
    }
}
