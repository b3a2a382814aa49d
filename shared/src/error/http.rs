//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::Success => StatusCode::OK,

            Self::NotFound => StatusCode::NOT_FOUND,

            Self::NotAuthenticated | Self::InvalidCredentials => StatusCode::UNAUTHORIZED,

            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,

            // Transient, client may resubmit the snapshot
            Self::DatabaseUnavailable | Self::TimeoutError => StatusCode::SERVICE_UNAVAILABLE,

            Self::SyncFailed | Self::DatabaseError => StatusCode::INTERNAL_SERVER_ERROR,

            // Validation and malformed input
            _ => StatusCode::BAD_REQUEST,
        }
    }
}
