//! # UAA Token Library
//!
//! Self-refreshing bearer tokens for OAuth2 `client_credentials` against a
//! UAA-style token endpoint. Callers ask [`CredentialStore::get_bearer_token`]
//! for `"bearer <token>"`; the store fetches on first use and whenever the
//! cached token is within the skew buffer of its expiry.
//!
//! Modules:
//! - `store`: credential store and token lifecycle (freshness, single-flight refresh)
//! - `cache`: client identity and cached token state
//! - `sources`: issuer transport and the `/oauth/token` round-trip
//! - `parser`: token endpoint response schema
//! - `config`: YAML configuration, defaults and validation
//! - `resilience`: retry with exponential backoff

pub mod cache;
pub mod config;
pub mod error;
pub mod helpers;
pub mod observability;
pub mod parser;
pub mod resilience;
pub mod sources;
pub mod store;
pub mod utils;

#[cfg(test)]
mod tests;

pub use crate::error::TokenError;
pub use crate::helpers::time::{Clock, SystemClock};
pub use crate::store::CredentialStore;
