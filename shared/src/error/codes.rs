//! Unified error codes for the roster service
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 3xxx: Roster errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values so they stay stable in logs
/// and across the SPA / server boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Resource not found
    NotFound = 3,
    /// Invalid request
    InvalidRequest = 5,

    // ==================== 1xxx: Auth ====================
    /// No shared secret presented
    NotAuthenticated = 1001,
    /// Shared secret presented but wrong
    InvalidCredentials = 1002,

    // ==================== 3xxx: Roster ====================
    /// Sync transaction failed and was rolled back
    SyncFailed = 3001,
    /// Member name is empty
    MemberNameRequired = 3002,
    /// Assignment type is not one of the recognized values
    InvalidAssignmentType = 3003,
    /// Assignment date is not a calendar date
    InvalidAssignmentDate = 3004,
    /// Assignment member name is empty
    AssignmentMemberRequired = 3005,
    /// Snapshot exceeds the per-request limits
    PayloadTooLarge = 3006,

    // ==================== 9xxx: System ====================
    /// Database error
    DatabaseError = 9002,
    /// No database connection could be acquired
    DatabaseUnavailable = 9003,
    /// Operation timed out
    TimeoutError = 9004,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::InvalidRequest => "Invalid request",

            // Auth
            ErrorCode::NotAuthenticated => "Missing API secret",
            ErrorCode::InvalidCredentials => "Invalid API secret",

            // Roster
            ErrorCode::SyncFailed => "Sync failed",
            ErrorCode::MemberNameRequired => "Member name is required",
            ErrorCode::InvalidAssignmentType => "Unknown assignment type",
            ErrorCode::InvalidAssignmentDate => "Invalid assignment date",
            ErrorCode::AssignmentMemberRequired => "Assignment member name is required",
            ErrorCode::PayloadTooLarge => "Sync payload too large",

            // System
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::DatabaseUnavailable => "Database unavailable",
            ErrorCode::TimeoutError => "Operation timed out",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            3 => Ok(ErrorCode::NotFound),
            5 => Ok(ErrorCode::InvalidRequest),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidCredentials),

            // Roster
            3001 => Ok(ErrorCode::SyncFailed),
            3002 => Ok(ErrorCode::MemberNameRequired),
            3003 => Ok(ErrorCode::InvalidAssignmentType),
            3004 => Ok(ErrorCode::InvalidAssignmentDate),
            3005 => Ok(ErrorCode::AssignmentMemberRequired),
            3006 => Ok(ErrorCode::PayloadTooLarge),

            // System
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::DatabaseUnavailable),
            9004 => Ok(ErrorCode::TimeoutError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}
