//! Unified error system for the roster service
//!
//! This module provides:
//! - [`ErrorCode`]: Standardized error codes for all error types
//! - [`ErrorCategory`]: Classification of errors by domain
//! - [`AppError`]: Error type with code, message, and optional details
//! - [`ErrorBody`]: The JSON body every failed request returns
//!
//! # Error Code Ranges
//!
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 3xxx: Roster errors
//! - 9xxx: System errors
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorBody, ErrorCode};
//!
//! let err = AppError::with_message(ErrorCode::InvalidAssignmentType, "unknown type 'elves'");
//! let body = ErrorBody::from(&err);
//! assert_eq!(body.error, "unknown type 'elves'");
//!
//! let err = AppError::sync_failed("connection reset");
//! assert_eq!(err.details.as_deref(), Some("connection reset"));
//! ```

mod category;
mod codes;
mod http;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{AppError, ErrorBody};
