// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types shared by every store and coordinator.

use crate::services::http::HttpError;

/// Error surfaced by core operations.
///
/// HTTP failures pass through unchanged inside [`AppError::Http`] so callers
/// can tell a cancelled request from a genuine network failure.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Http(#[from] HttpError),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Duplicate request for an exchange already in flight")]
    DuplicateRequest,

    #[error("Not authorized: no access token stored")]
    NotAuthorized,

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Secret store error: {0}")]
    SecretStore(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// True when the operation was aborted because a newer one superseded it
    /// or the owning store was cleared. UI layers should not show these.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, AppError::Http(e) if e.is_cancelled())
    }

    /// True when the API rejected the access token (HTTP 401).
    pub fn is_unauthorized(&self) -> bool {
        match self {
            AppError::NotAuthorized => true,
            AppError::Http(HttpError::Status(status)) => *status == 401,
            _ => false,
        }
    }

    /// Errors the user should see as an alert.
    pub fn is_user_facing(&self) -> bool {
        !self.is_cancelled() && !matches!(self, AppError::DuplicateRequest)
    }
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, AppError>;
