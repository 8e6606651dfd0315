use rusqlite::ErrorCode;
use serde::Serialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Classified failure of a core operation. Every variant maps onto a stable
/// wire kind and an HTTP status code so the transport layer can translate
/// outcomes without inspecting internals.
#[derive(Debug, Error)]
pub enum Error {
    #[error("authentication required")]
    Unauthenticated,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    #[error("{0}")]
    InvalidOperation(String),

    #[error("{field} already in use")]
    Conflict { field: &'static str },

    #[error("operation failed: {0}")]
    OperationFailed(String),
}

/// The {kind, message} structure handed to the transport layer.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub kind: &'static str,
    pub message: String,
}

impl Error {
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Unauthenticated => "unauthenticated",
            Error::NotFound(_) => "not_found",
            Error::Validation { .. } => "validation_error",
            Error::InvalidOperation(_) => "invalid_operation",
            Error::Conflict { .. } => "conflict",
            Error::OperationFailed(_) => "operation_failed",
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            Error::Unauthenticated => 401,
            Error::NotFound(_) => 404,
            Error::Validation { .. } | Error::InvalidOperation(_) => 400,
            Error::Conflict { .. } => 409,
            Error::OperationFailed(_) => 500,
        }
    }

    /// Body surfaced to callers. `OperationFailed` detail stays in the logs;
    /// the wire gets a generic message.
    pub fn body(&self) -> ErrorBody {
        let message = match self {
            Error::OperationFailed(_) => "internal error".to_string(),
            other => other.to_string(),
        };
        ErrorBody {
            kind: self.kind(),
            message,
        }
    }

    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Error::Validation {
            field,
            message: message.into(),
        }
    }
}

impl From<rusqlite::Error> for Error {
    fn from(e: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(failure, Some(msg)) = &e {
            if failure.code == ErrorCode::ConstraintViolation && msg.contains("accounts.email") {
                return Error::Conflict { field: "email" };
            }
        }
        log::error!("database error: {e}");
        Error::OperationFailed(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::OperationFailed(format!("serialization failed: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_the_taxonomy() {
        assert_eq!(Error::Unauthenticated.status_code(), 401);
        assert_eq!(Error::NotFound("todo").status_code(), 404);
        assert_eq!(Error::validation("date", "date required").status_code(), 400);
        assert_eq!(
            Error::InvalidOperation("cannot delete last workspace".into()).status_code(),
            400
        );
        assert_eq!(Error::Conflict { field: "email" }.status_code(), 409);
        assert_eq!(Error::OperationFailed("boom".into()).status_code(), 500);
    }

    #[test]
    fn operation_failed_body_hides_detail() {
        let body = Error::OperationFailed("disk io error".into()).body();
        assert_eq!(body.kind, "operation_failed");
        assert_eq!(body.message, "internal error");
    }

    #[test]
    fn validation_body_keeps_field_detail() {
        let body = Error::validation("date", "date required").body();
        assert_eq!(body.kind, "validation_error");
        assert_eq!(body.message, "date: date required");
    }
}
