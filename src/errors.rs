// ABOUTME: Unified error handling system with typed error codes
// ABOUTME: AppError and ErrorCode cover the full failure taxonomy of the engine
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Coachlink

use serde::{Deserialize, Serialize};

/// Convenient result alias used throughout the crate
pub type AppResult<T> = Result<T, AppError>;

/// Machine-readable error codes for every failure class the core can produce
///
/// The transport layer (outside this crate) maps these to its own status
/// scheme; the core never deals in HTTP status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Malformed input that slipped past upstream validation
    InvalidInput,
    /// A referenced entity does not exist
    NotFound,
    /// Authorization or ownership violation
    PermissionDenied,
    /// Credential verification failed
    AuthInvalid,
    /// Email already registered to another user
    DuplicateEmail,
    /// Relationship invariant precondition not met (e.g. bucket mismatch)
    Conflict,
    /// Persistence layer failure (connection, transaction, constraint)
    DatabaseError,
    /// Configuration is missing or malformed
    ConfigError,
    /// Unexpected internal failure
    InternalError,
}

impl ErrorCode {
    /// Stable string form of the code, matching the serde representation
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidInput => "invalid_input",
            Self::NotFound => "not_found",
            Self::PermissionDenied => "permission_denied",
            Self::AuthInvalid => "auth_invalid",
            Self::DuplicateEmail => "duplicate_email",
            Self::Conflict => "conflict",
            Self::DatabaseError => "database_error",
            Self::ConfigError => "config_error",
            Self::InternalError => "internal_error",
        }
    }
}

/// Application error carrying a typed code and a human-readable message
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct AppError {
    /// Typed error code for programmatic handling
    pub code: ErrorCode,
    /// Human-readable description of the failure
    pub message: String,
}

impl AppError {
    /// Create an error with an explicit code
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Malformed input reached the core despite upstream validation
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// A referenced entity could not be resolved
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// The authenticated identity is not allowed to perform the action
    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::PermissionDenied, message)
    }

    /// Credential verification failed
    pub fn auth_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::AuthInvalid, message)
    }

    /// Email uniqueness violation
    pub fn duplicate_email(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DuplicateEmail, message)
    }

    /// Invariant precondition not met
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Conflict, message)
    }

    /// Persistence layer failure
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DatabaseError, message)
    }

    /// Configuration failure
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, message)
    }

    /// Unexpected internal failure
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::internal(format!("JSON serialization failed: {err}"))
    }
}
