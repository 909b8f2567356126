use chrono::{DateTime, Utc};

use crate::utils::constants::BEARER_PREFIX;

pub const TOKEN_VALUE_STUB: &str = "";

/// Mutable token cache owned by a credential store.
#[derive(Debug, Clone)]
pub struct TokenState {
    pub value: String,
    pub expires_at: DateTime<Utc>,
    pub scope: Option<String>,
}

impl TokenState {
    /// Empty token that is already expired, forcing the first access to fetch.
    pub fn expired(expires_at: DateTime<Utc>) -> Self {
        Self {
            value: TOKEN_VALUE_STUB.to_owned(),
            expires_at,
            scope: None,
        }
    }

    pub fn new(value: String, expires_at: DateTime<Utc>, scope: Option<String>) -> Self {
        Self { value, expires_at, scope }
    }

    /// Fresh strictly before the expiry instant.
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at && !self.value.is_empty()
    }

    pub fn bearer(&self) -> String {
        format!("{}{}", BEARER_PREFIX, self.value)
    }
}
