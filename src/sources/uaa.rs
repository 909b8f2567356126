use http::StatusCode;
use tracing::debug;

use crate::cache::credentials::CredentialIdentity;
use crate::error::TokenError;
use crate::parser::token_response::{parse_token_response, TokenResponse};
use crate::sources::transport::IssuerTransport;
use crate::utils::constants::MAX_ERROR_BODY_BYTES;

/// One `client_credentials` round-trip against the issuer.
pub async fn fetch_token<T>(transport: &T, identity: &CredentialIdentity) -> Result<TokenResponse, TokenError>
where
    T: IssuerTransport,
{
    let url = identity.token_url();
    debug!(issuer = %identity.issuer_uri(), client_id = %identity.client_id(), "requesting client_credentials token");

    let response = transport
        .get_with_basic_auth(&url, identity.client_id(), identity.client_secret())
        .await
        .map_err(|e| TokenError::IssuerUnreachable(e.to_string()))?;

    if response.status != StatusCode::OK {
        return Err(TokenError::IssuerBadStatus {
            status: response.status.as_u16(),
            body: truncate_body(response.body),
        });
    }

    parse_token_response(&response.body)
}

fn truncate_body(mut body: String) -> String {
    if body.len() > MAX_ERROR_BODY_BYTES {
        let mut end = MAX_ERROR_BODY_BYTES;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        body.truncate(end);
    }
    body
}
