use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};

use crate::utils::constants::{DEFAULT_SKEW_BUFFER_SECS, INITIAL_EXPIRY_BACKDATE_SECS};

/// Source of "now" for freshness decisions.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

pub fn get_skew_buffer_seconds(skew_buffer_seconds_settings: Option<u64>) -> u64 {
    skew_buffer_seconds_settings.unwrap_or(DEFAULT_SKEW_BUFFER_SECS)
}

/// Expiry sentinel for a store that has never fetched.
pub fn initial_expiry(now: DateTime<Utc>) -> DateTime<Utc> {
    now - TimeDelta::seconds(INITIAL_EXPIRY_BACKDATE_SECS)
}

/// `now + expires_in - skew`, with the skew subtracted in whole seconds first.
///
/// A lifetime shorter than the skew yields an instant in the past.
pub fn compute_expiry(now: DateTime<Utc>, expires_in_seconds: u64, skew_buffer_seconds: u64) -> DateTime<Utc> {
    let lifetime = clamp_i64(expires_in_seconds) - clamp_i64(skew_buffer_seconds);
    TimeDelta::try_seconds(lifetime)
        .and_then(|delta| now.checked_add_signed(delta))
        .unwrap_or(if lifetime >= 0 { DateTime::<Utc>::MAX_UTC } else { DateTime::<Utc>::MIN_UTC })
}

fn clamp_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}
