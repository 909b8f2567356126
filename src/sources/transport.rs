//! Issuer transport
//!
//! The only capability the token lifecycle needs from HTTP: an authenticated GET
//! that yields status + body, configured with a TLS trust policy and a timeout.

use std::future::Future;
use std::time::Duration;

use http::StatusCode;
use reqwest::{Client, Url};
use thiserror::Error;

use crate::error::TokenError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TlsPolicy {
    /// Require a valid certificate chain.
    Verify,
    /// Accept any certificate. Only for self-signed, non-production issuers.
    SkipVerify,
}

impl TlsPolicy {
    pub fn from_skip_verify(skip_tls_verify: bool) -> Self {
        if skip_tls_verify {
            TlsPolicy::SkipVerify
        } else {
            TlsPolicy::Verify
        }
    }

    pub fn accepts_invalid_certs(&self) -> bool {
        matches!(self, TlsPolicy::SkipVerify)
    }
}

#[derive(Debug, Clone)]
pub struct IssuerResponse {
    pub status: StatusCode,
    pub body: String,
}

/// The request never produced a response.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct TransportError(pub String);

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError(format!("request timed out: {}", err))
        } else if err.is_connect() {
            TransportError(format!("connection failed: {}", err))
        } else {
            TransportError(err.to_string())
        }
    }
}

pub trait IssuerTransport: Send + Sync {
    fn get_with_basic_auth(
        &self,
        url: &Url,
        username: &str,
        password: &str,
    ) -> impl Future<Output = Result<IssuerResponse, TransportError>> + Send;
}

/// `reqwest` backed transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    tls_policy: TlsPolicy,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(tls_policy: TlsPolicy, timeout: Duration) -> Result<Self, TokenError> {
        let client = Client::builder()
            .danger_accept_invalid_certs(tls_policy.accepts_invalid_certs())
            .timeout(timeout)
            .build()
            .map_err(|e| TokenError::TransportInit(e.to_string()))?;
        Ok(Self { client, tls_policy, timeout })
    }

    pub fn tls_policy(&self) -> TlsPolicy {
        self.tls_policy
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl IssuerTransport for HttpTransport {
    async fn get_with_basic_auth(
        &self,
        url: &Url,
        username: &str,
        password: &str,
    ) -> Result<IssuerResponse, TransportError> {
        let response = self
            .client
            .get(url.clone())
            .basic_auth(username, Some(password))
            .header(http::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        Ok(IssuerResponse { status, body })
    }
}
