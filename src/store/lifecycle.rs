use std::sync::atomic::Ordering;

use tracing::{debug, trace};

use crate::cache::token::TokenState;
use crate::error::TokenError;
use crate::helpers::time::{compute_expiry, Clock};
use crate::resilience::retry::RetrySettings;
use crate::sources::transport::IssuerTransport;
use crate::sources::uaa::fetch_token;
use crate::store::CredentialStore;

impl<T: IssuerTransport, C: Clock> CredentialStore<T, C> {
    /// Return `"bearer <token>"`, fetching a new token first if the cached one is stale.
    ///
    /// At most one fetch runs per store at a time. Callers that queue behind a
    /// running fetch get that fetch's outcome instead of issuing their own.
    /// A failed fetch leaves the cached token untouched.
    pub async fn get_bearer_token(&self) -> Result<String, TokenError> {
        if let Some(bearer) = self.fresh_bearer().await {
            self.metrics().token_cache_hits.inc();
            trace!("serving cached bearer token");
            return Ok(bearer);
        }

        let observed = self.completed_refreshes.load(Ordering::Acquire);
        let mut slot = self.refresh.lock().await;

        if self.completed_refreshes.load(Ordering::Acquire) != observed {
            if let Some(outcome) = slot.last_outcome.clone() {
                trace!("sharing outcome of concurrent refresh");
                // the token cannot change while the refresh lock is held
                return match outcome {
                    Ok(()) => Ok(self.state.read().await.bearer()),
                    Err(e) => Err(e),
                };
            }
        }
        // refreshed between our first check and taking the lock
        if let Some(bearer) = self.fresh_bearer().await {
            self.metrics().token_cache_hits.inc();
            return Ok(bearer);
        }

        let outcome = self.refresh_token().await;
        slot.last_outcome = Some(outcome.as_ref().map(|_| ()).map_err(Clone::clone));
        self.completed_refreshes.fetch_add(1, Ordering::Release);
        outcome
    }

    /// [`get_bearer_token`](Self::get_bearer_token) with backoff on unreachable issuers only.
    pub async fn get_bearer_token_with_retry(&self, retry: &RetrySettings) -> Result<String, TokenError> {
        retry
            .run_with_retry(|| self.get_bearer_token(), TokenError::is_retryable)
            .await
    }

    async fn fresh_bearer(&self) -> Option<String> {
        let state = self.state.read().await;
        state.is_fresh(self.clock.now()).then(|| state.bearer())
    }

    // caller holds the refresh lock
    async fn refresh_token(&self) -> Result<String, TokenError> {
        let metrics = self.metrics();
        metrics.token_fetch_requests.inc();

        let timer = metrics.token_fetch_duration.start_timer();
        let fetched = fetch_token(&self.transport, &self.identity).await;
        timer.observe_duration();

        let response = fetched.inspect_err(|e| {
            metrics.token_fetch_failures.with_label_values(&[e.reason()]).inc();
            debug!(reason = e.reason(), error = %e, "token refresh failed, keeping previous token");
        })?;

        // lifetime counts from the moment the issuer answered
        let expires_at = compute_expiry(self.clock.now(), response.expires_in, self.skew_buffer_seconds);
        let next = TokenState::new(response.access_token, expires_at, response.scope);
        let bearer = next.bearer();

        *self.state.write().await = next;
        metrics.token_expiry_unix.set(expires_at.timestamp());
        debug!(
            expires_in = response.expires_in,
            skew_buffer_seconds = self.skew_buffer_seconds,
            expires_at = %expires_at.to_rfc3339(),
            "token refreshed"
        );
        Ok(bearer)
    }
}
