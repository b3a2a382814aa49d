//! Shared-secret authentication via the `x-api-secret` header
//!
//! The check runs before any handler, so a rejected request never
//! touches the database.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use hmac::digest::InvalidLength;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use shared::error::AppError;

use crate::state::AppState;

type HmacSha256 = Hmac<Sha256>;

pub const API_SECRET_HEADER: &str = "x-api-secret";

/// Fixed message the secret is MAC'd over; only the key varies.
const SECRET_DOMAIN: &[u8] = b"roster-server/api-secret/v1";

/// Expected shared secret, kept as a MAC tag
///
/// Comparison goes through `Mac::verify_slice`, which is constant-time
/// regardless of where the presented value first differs.
#[derive(Clone)]
pub struct ApiSecret {
    tag: [u8; 32],
}

impl ApiSecret {
    pub fn new(secret: &str) -> Result<Self, InvalidLength> {
        let digest = Self::mac(secret)?.finalize().into_bytes();
        let mut tag = [0u8; 32];
        tag.copy_from_slice(&digest);
        Ok(Self { tag })
    }

    pub fn verify(&self, presented: &str) -> bool {
        match Self::mac(presented) {
            Ok(mac) => mac.verify_slice(&self.tag).is_ok(),
            Err(_) => false,
        }
    }

    fn mac(key: &str) -> Result<HmacSha256, InvalidLength> {
        let mut mac = <HmacSha256 as Mac>::new_from_slice(key.as_bytes())?;
        mac.update(SECRET_DOMAIN);
        Ok(mac)
    }
}

impl std::fmt::Debug for ApiSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiSecret(..)")
    }
}

/// Middleware that rejects requests without the correct `x-api-secret`
pub async fn api_secret_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let presented = request
        .headers()
        .get(API_SECRET_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty());

    let Some(presented) = presented else {
        tracing::warn!(
            method = %request.method(),
            path = %request.uri().path(),
            "Request without API secret"
        );
        return Err(AppError::not_authenticated());
    };

    if !state.api_secret.verify(presented) {
        tracing::warn!(
            method = %request.method(),
            path = %request.uri().path(),
            "Request with invalid API secret"
        );
        return Err(AppError::invalid_credentials());
    }

    Ok(next.run(request).await)
}
