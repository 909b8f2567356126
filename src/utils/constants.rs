//! Shared constants and invariants

pub const DEFAULT_SKEW_BUFFER_SECS: u64 = 60;
pub const DEFAULT_HTTP_TIMEOUT_MS: u64 = 5000;

/// How far in the past a fresh store's expiry sentinel sits.
pub const INITIAL_EXPIRY_BACKDATE_SECS: i64 = 5 * 60;

pub const TOKEN_ENDPOINT_PATH: &str = "/oauth/token";
pub const GRANT_TYPE_CLIENT_CREDENTIALS: &str = "client_credentials";
pub const BEARER_PREFIX: &str = "bearer ";

/// Issuer error bodies kept in [`crate::error::TokenError::IssuerBadStatus`].
pub const MAX_ERROR_BODY_BYTES: usize = 1024;

pub const DEFAULT_RETRY_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 200;
pub const DEFAULT_RETRY_MAX_DELAY_MS: u64 = 1000;
