//! Typed failures of the credential store and its token lifecycle.

use thiserror::Error;

/// Failure reasons returned by [`CredentialStore`](crate::store::CredentialStore).
///
/// The enum is `Clone` so the outcome of a single in-flight refresh can be
/// handed to every caller that waited on it. Transport causes are therefore
/// carried as rendered messages rather than as the original error values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TokenError {
    /// Rejected constructor input (empty client id/secret, unusable issuer URI).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The HTTP client for the issuer could not be initialised.
    #[error("failed to initialise issuer transport: {0}")]
    TransportInit(String),

    /// The token endpoint could not be reached (DNS, connect, TLS, timeout).
    #[error("token issuer unreachable: {0}")]
    IssuerUnreachable(String),

    /// The token endpoint answered with something other than `200 OK`.
    #[error("token issuer returned HTTP {status}")]
    IssuerBadStatus { status: u16, body: String },

    /// The token endpoint body did not match the token schema.
    #[error("malformed token response: {0}")]
    MalformedResponse(String),
}

impl TokenError {
    /// Only transport failures are worth retrying inside a single call.
    pub fn is_retryable(&self) -> bool {
        matches!(self, TokenError::IssuerUnreachable(_))
    }

    /// Short label used for the failure metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            TokenError::InvalidArgument(_) => "invalid_argument",
            TokenError::TransportInit(_) => "transport_init",
            TokenError::IssuerUnreachable(_) => "unreachable",
            TokenError::IssuerBadStatus { .. } => "bad_status",
            TokenError::MalformedResponse(_) => "malformed",
        }
    }
}
