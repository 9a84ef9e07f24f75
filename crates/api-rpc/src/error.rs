//! RPC Error Types
//!
//! Maps application errors to stable JSON-RPC error codes.

use jsonrpsee::types::ErrorObjectOwned;
use waitline_core::domain::DomainError;
use waitline_core::error::AppError;

/// RPC Error Codes
pub mod code {
    pub const VALIDATION_ERROR: i32 = 4000;
    pub const NOT_FOUND: i32 = 4001;
    pub const CONFLICT: i32 = 4002;
    pub const THROTTLED: i32 = 4003;
    pub const UNAUTHORIZED: i32 = 4010;
    pub const INTERNAL_ERROR: i32 = 5000;
    pub const DB_ERROR: i32 = 5001;
}

/// Convert AppError to JSON-RPC ErrorObject
pub fn to_rpc_error(err: AppError) -> ErrorObjectOwned {
    let msg = err.to_string();
    match err {
        AppError::Domain(domain) => match domain {
            DomainError::QueueNotFound(_) | DomainError::EntryNotFound { .. } => {
                ErrorObjectOwned::owned(code::NOT_FOUND, msg, None::<()>)
            }
            DomainError::AlreadyQueued { .. }
            | DomainError::QueueFull { .. }
            | DomainError::InvalidStatusTransition { .. } => {
                ErrorObjectOwned::owned(code::CONFLICT, msg, None::<()>)
            }
            DomainError::InvalidAction(_)
            | DomainError::InvalidStatus(_)
            | DomainError::ValidationError(_) => {
                ErrorObjectOwned::owned(code::VALIDATION_ERROR, msg, None::<()>)
            }
            DomainError::Internal(_) => {
                ErrorObjectOwned::owned(code::INTERNAL_ERROR, msg, None::<()>)
            }
        },
        AppError::Validation(_) => ErrorObjectOwned::owned(code::VALIDATION_ERROR, msg, None::<()>),
        // The engine already retried; whatever surfaces here is a genuine
        // transient failure the client may retry
        AppError::TransactionConflict(_) => {
            ErrorObjectOwned::owned(code::CONFLICT, msg, None::<()>)
        }
        AppError::Database(_) => ErrorObjectOwned::owned(code::DB_ERROR, msg, None::<()>),
        AppError::Serialization(_) => {
            ErrorObjectOwned::owned(code::VALIDATION_ERROR, msg, None::<()>)
        }
        AppError::Io(_) | AppError::Config(_) | AppError::Internal(_) => {
            ErrorObjectOwned::owned(code::INTERNAL_ERROR, msg, None::<()>)
        }
    }
}

pub fn throttled() -> ErrorObjectOwned {
    ErrorObjectOwned::owned(
        code::THROTTLED,
        "Rate limit exceeded. Please slow down.",
        None::<()>,
    )
}

pub fn unauthorized(msg: impl Into<String>) -> ErrorObjectOwned {
    ErrorObjectOwned::owned(code::UNAUTHORIZED, msg.into(), None::<()>)
}
