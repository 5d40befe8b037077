//! Network Layer
//!
//! HTTP/JSON surface over the score store.
//! Validates request shape and the shared secret; all scoring rules live in `store/`.

pub mod auth;
pub mod protocol;
pub mod server;

pub use auth::{ApiKey, AuthError, API_KEY_HEADER};
pub use protocol::{ApiError, ErrorBody, ScoreSubmission, SubmitAck};
pub use server::{
    app, router, run, AllowedOrigins, AppState, ConfigError, ServerConfig, ServerError,
};
