use serde::Deserialize;

use crate::error::TokenError;

/// Body of a successful `/oauth/token` response.
///
/// `access_token` and `expires_in` are required; the rest is informational.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct TokenResponse {
    pub access_token: String,
    /// lifetime in seconds
    pub expires_in: u64,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub jti: Option<String>,
}

/// Parse the issuer body, rejecting anything that would leave us with an unusable token.
pub fn parse_token_response(body: &str) -> Result<TokenResponse, TokenError> {
    let response: TokenResponse = serde_json::from_str(body)
        .map_err(|e| TokenError::MalformedResponse(e.to_string()))?;

    if response.access_token.trim().is_empty() {
        return Err(TokenError::MalformedResponse("access_token is empty".to_owned()));
    }
    Ok(response)
}
