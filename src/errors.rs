//! # Error Handling for CRUD Operations
//!
//! Every operation fails with a [`CrudError`]. The variants keep apart the
//! situations a caller reacts to differently:
//! - the targeted row does not exist ([`CrudError::NotFound`])
//! - the request carried unusable input ([`CrudError::InvalidInput`])
//! - a write collided with a unique constraint ([`CrudError::Conflict`])
//! - the database itself failed ([`CrudError::Backend`])
//!
//! On top of that, [`CrudError::kind`] reports the coarse two-value taxonomy
//! that API clients match on: read operations fail as `NotFound` and write
//! operations as `UnprocessableEntity`, unless the row was simply missing.
//!
//! Database details are never sent to clients. Backend failures are logged
//! through `tracing` and replaced by a generic message in the response body.
//!
//! ```rust
//! use crudservice::errors::{CrudError, ErrorKind, Operation};
//! use sea_orm::DbErr;
//!
//! let err = CrudError::backend(Operation::Create, DbErr::Custom("disk full".into()));
//! assert_eq!(err.kind(), ErrorKind::UnprocessableEntity);
//! assert_eq!(err.to_string(), "UnprocessableEntity");
//! ```

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::{DbErr, SqlErr};
use serde::Serialize;
use serde_with::skip_serializing_none;
use std::fmt;

use crate::validation::{ValidationError, ValidationErrors};

/// The operation that produced an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    List,
    Get,
    Create,
    Update,
    Destroy,
}

impl Operation {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Get => "get",
            Self::Create => "create",
            Self::Update => "update",
            Self::Destroy => "destroy",
        }
    }

    /// List and get only read.
    #[must_use]
    pub const fn is_read(self) -> bool {
        matches!(self, Self::List | Self::Get)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse error identifier exposed to API clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    NotFound,
    UnprocessableEntity,
}

impl ErrorKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "NotFound",
            Self::UnprocessableEntity => "UnprocessableEntity",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure of a CRUD operation.
#[derive(Debug)]
pub enum CrudError {
    /// 404 Not Found - the targeted row is absent
    NotFound {
        /// Singular resource name (e.g. "todo")
        resource: String,
        /// The id that was looked up, when there was one
        id: Option<String>,
    },

    /// 422 Unprocessable Entity - request values failed validation
    InvalidInput {
        operation: Operation,
        errors: ValidationErrors,
    },

    /// 409 Conflict - unique constraint violated by a write
    Conflict {
        operation: Operation,
        /// Database message (logged, not sent to the client)
        message: String,
    },

    /// 500 Internal Server Error - details logged, not exposed
    Backend { operation: Operation, source: DbErr },
}

impl CrudError {
    pub fn not_found(resource: impl Into<String>, id: Option<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id,
        }
    }

    pub fn invalid(operation: Operation, errors: impl Into<ValidationErrors>) -> Self {
        Self::InvalidInput {
            operation,
            errors: errors.into(),
        }
    }

    #[must_use]
    pub const fn backend(operation: Operation, source: DbErr) -> Self {
        Self::Backend { operation, source }
    }

    /// Classify a database error raised while running `operation` on `resource`.
    ///
    /// - `DbErr::RecordNotFound` → [`CrudError::NotFound`]
    /// - unique constraint violations → [`CrudError::Conflict`]
    /// - everything else → [`CrudError::Backend`]
    #[must_use]
    pub fn from_db(operation: Operation, resource: &str, err: DbErr) -> Self {
        if let DbErr::RecordNotFound(_) = err {
            return Self::not_found(resource, None);
        }
        if let Some(SqlErr::UniqueConstraintViolation(message)) = err.sql_err() {
            return Self::Conflict { operation, message };
        }
        Self::backend(operation, err)
    }

    /// The operation that failed; `None` for a missing row.
    #[must_use]
    pub const fn operation(&self) -> Option<Operation> {
        match self {
            Self::NotFound { .. } => None,
            Self::InvalidInput { operation, .. }
            | Self::Conflict { operation, .. }
            | Self::Backend { operation, .. } => Some(*operation),
        }
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self.operation() {
            None => ErrorKind::NotFound,
            Some(op) if op.is_read() => ErrorKind::NotFound,
            Some(_) => ErrorKind::UnprocessableEntity,
        }
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Validation errors carried by [`CrudError::InvalidInput`].
    #[must_use]
    pub fn validation_errors(&self) -> Option<&[ValidationError]> {
        match self {
            Self::InvalidInput { errors, .. } => Some(errors.errors()),
            _ => None,
        }
    }

    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::InvalidInput { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::Backend { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Sanitised message safe to send to clients.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::NotFound { resource, id } => match id {
                Some(id) => format!("{resource} with ID '{id}' not found"),
                None => format!("{resource} not found"),
            },
            Self::InvalidInput { errors, .. } => match errors.errors() {
                [single] => single.to_string(),
                _ => "Validation failed".to_owned(),
            },
            Self::Conflict { .. } => "A record with the same unique value already exists".to_owned(),
            Self::Backend { .. } => "A database error occurred".to_owned(),
        }
    }

    /// Log details that stay server-side.
    ///
    /// Read operations log their own failures where they happen, so only
    /// write-side failures are logged here.
    fn log_internal(&self) {
        match self {
            Self::Backend { operation, source } if !operation.is_read() => {
                tracing::error!(operation = %operation, error = ?source, "Database error occurred");
            }
            Self::Conflict { operation, message } => {
                tracing::warn!(operation = %operation, error = %message, "Unique constraint violated");
            }
            _ => {
                tracing::debug!(
                    error = %self.user_message(),
                    status = %self.status_code(),
                    "CRUD error"
                );
            }
        }
    }
}

/// Error body sent to clients
#[skip_serializing_none]
#[derive(Serialize)]
struct ErrorResponse<'a> {
    error: ErrorKind,
    message: String,
    details: Option<&'a [ValidationError]>,
}

impl IntoResponse for CrudError {
    fn into_response(self) -> Response {
        self.log_internal();

        let body = ErrorResponse {
            error: self.kind(),
            message: self.user_message(),
            details: self.validation_errors(),
        };

        (self.status_code(), Json(body)).into_response()
    }
}

impl fmt::Display for CrudError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.kind(), f)
    }
}

impl std::error::Error for CrudError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Backend { source, .. } => Some(source),
            Self::InvalidInput { errors, .. } => Some(errors),
            _ => None,
        }
    }
}
