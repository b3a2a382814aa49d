//! Authentication middleware for back-office clients

pub mod secret_auth;

pub use secret_auth::{ApiSecret, api_secret_middleware};
