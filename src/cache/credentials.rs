use std::fmt;

use reqwest::Url;

use crate::error::TokenError;
use crate::utils::constants::{GRANT_TYPE_CLIENT_CREDENTIALS, TOKEN_ENDPOINT_PATH};

/// Who we are and where we ask for tokens. Immutable once built.
#[derive(Clone)]
pub struct CredentialIdentity {
    issuer_uri: Url,
    client_id: String,
    client_secret: String,
    skip_tls_verify: bool,
}

impl CredentialIdentity {
    pub fn new(
        issuer_uri: Url,
        skip_tls_verify: bool,
        client_id: &str,
        client_secret: &str,
    ) -> Result<Self, TokenError> {
        if client_id.is_empty() {
            return Err(TokenError::InvalidArgument("client_id must not be empty".to_owned()));
        }
        if client_secret.is_empty() {
            return Err(TokenError::InvalidArgument("client_secret must not be empty".to_owned()));
        }
        if !matches!(issuer_uri.scheme(), "http" | "https") {
            return Err(TokenError::InvalidArgument(format!(
                "issuer uri '{}' must use http or https",
                issuer_uri
            )));
        }
        Ok(Self {
            issuer_uri,
            client_id: client_id.to_owned(),
            client_secret: client_secret.to_owned(),
            skip_tls_verify,
        })
    }

    pub fn issuer_uri(&self) -> &Url {
        &self.issuer_uri
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn client_secret(&self) -> &str {
        &self.client_secret
    }

    pub fn skip_tls_verify(&self) -> bool {
        self.skip_tls_verify
    }

    /// `{issuer}/oauth/token?grant_type=client_credentials`, keeping any base path of the issuer.
    pub fn token_url(&self) -> Url {
        let mut url = self.issuer_uri.clone();
        let base_path = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{}{}", base_path, TOKEN_ENDPOINT_PATH));
        url.set_query(None);
        url.query_pairs_mut()
            .append_pair("grant_type", GRANT_TYPE_CLIENT_CREDENTIALS);
        url
    }
}

impl fmt::Debug for CredentialIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialIdentity")
            .field("issuer_uri", &self.issuer_uri.as_str())
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .field("skip_tls_verify", &self.skip_tls_verify)
            .finish()
    }
}
