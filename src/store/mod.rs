//! Credential store
//!
//! Owns the client identity, the issuer transport and the cached [`TokenState`].
//! The freshness check and refresh live in [`lifecycle`].

pub mod lifecycle;

use std::sync::atomic::AtomicU64;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::Url;
use tokio::sync::{Mutex, RwLock};

use crate::cache::credentials::CredentialIdentity;
use crate::cache::token::TokenState;
use crate::config::settings::ServiceConfig;
use crate::error::TokenError;
use crate::helpers::time::{get_skew_buffer_seconds, initial_expiry, Clock, SystemClock};
use crate::observability::metrics::Metrics;
use crate::sources::transport::{HttpTransport, IssuerTransport, TlsPolicy};
use crate::utils::constants::{DEFAULT_HTTP_TIMEOUT_MS, DEFAULT_SKEW_BUFFER_SECS};

/// Outcome of the most recent completed refresh, shared with callers that waited on it.
///
/// A success is only a marker: the token itself lives in the cached state.
#[derive(Debug, Default)]
pub(crate) struct RefreshSlot {
    pub(crate) last_outcome: Option<Result<(), TokenError>>,
}

pub struct CredentialStore<T = HttpTransport, C = SystemClock> {
    identity: CredentialIdentity,
    transport: T,
    clock: C,
    skew_buffer_seconds: u64,
    state: RwLock<TokenState>,
    refresh: Mutex<RefreshSlot>,
    /// bumped after every completed fetch, successful or not
    completed_refreshes: AtomicU64,
    metrics: Metrics,
}

impl CredentialStore {
    /// Validate the identity and prepare a store whose first access fetches a token.
    ///
    /// No network I/O happens here.
    pub fn new(
        issuer_uri: Url,
        skip_tls_verify: bool,
        client_id: &str,
        client_secret: &str,
    ) -> Result<Self, TokenError> {
        let identity = CredentialIdentity::new(issuer_uri, skip_tls_verify, client_id, client_secret)?;
        let transport = HttpTransport::new(
            TlsPolicy::from_skip_verify(skip_tls_verify),
            Duration::from_millis(DEFAULT_HTTP_TIMEOUT_MS),
        )?;
        Ok(Self::with_parts(identity, transport, SystemClock, DEFAULT_SKEW_BUFFER_SECS))
    }

    /// Build a store from a loaded service config.
    pub fn from_settings(config: &ServiceConfig) -> Result<Self, TokenError> {
        let issuer_uri = Url::parse(&config.issuer.uri)
            .map_err(|e| TokenError::InvalidArgument(format!("issuer uri '{}': {}", config.issuer.uri, e)))?;
        let identity = CredentialIdentity::new(
            issuer_uri,
            config.issuer.skip_tls_verify,
            &config.client.id,
            &config.client.secret,
        )?;
        let timeout_ms = config.settings.request_timeout_ms.unwrap_or(DEFAULT_HTTP_TIMEOUT_MS);
        let transport = HttpTransport::new(
            TlsPolicy::from_skip_verify(identity.skip_tls_verify()),
            Duration::from_millis(timeout_ms),
        )?;
        Ok(Self::with_parts(
            identity,
            transport,
            SystemClock,
            get_skew_buffer_seconds(config.settings.skew_buffer_seconds),
        ))
    }
}

impl<T: IssuerTransport, C: Clock> CredentialStore<T, C> {
    /// Assemble a store from already validated parts.
    pub fn with_parts(identity: CredentialIdentity, transport: T, clock: C, skew_buffer_seconds: u64) -> Self {
        let state = TokenState::expired(initial_expiry(clock.now()));
        Self {
            identity,
            transport,
            clock,
            skew_buffer_seconds,
            state: RwLock::new(state),
            refresh: Mutex::new(RefreshSlot::default()),
            completed_refreshes: AtomicU64::new(0),
            metrics: Metrics::new(),
        }
    }

    pub fn identity(&self) -> &CredentialIdentity {
        &self.identity
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn skew_buffer_seconds(&self) -> u64 {
        self.skew_buffer_seconds
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Expiry instant of the cached token, already reduced by the skew buffer.
    pub async fn expires_at(&self) -> DateTime<Utc> {
        self.state.read().await.expires_at
    }

    /// Scope granted with the cached token, if any fetch succeeded.
    pub async fn scope(&self) -> Option<String> {
        self.state.read().await.scope.clone()
    }
}
