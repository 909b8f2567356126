use prometheus::core::Collector;
use prometheus::{Encoder, HistogramOpts, Histogram, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

/// Token lifecycle metrics, one registry per credential store.
#[derive(Clone)]
pub struct Metrics {
    pub registry: Registry,

    // Fetch metrics
    pub token_fetch_requests: IntCounter,
    pub token_fetch_failures: IntCounterVec,
    pub token_fetch_duration: Histogram,

    // Cache metrics
    pub token_cache_hits: IntCounter,
    pub token_expiry_unix: IntGauge,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new_custom(Some("uaatoken".into()), None)
            .expect("static registry prefix is valid");

        let metrics = Self {
            token_fetch_requests: IntCounter::new("token_fetch_requests_total", "Token endpoint requests")
                .expect("static metric definition"),
            token_fetch_failures: IntCounterVec::new(Opts::new("token_fetch_failures_total", "Token fetch failures by reason"), &["reason"])
                .expect("static metric definition"),
            token_fetch_duration: Histogram::with_opts(HistogramOpts::new("token_fetch_duration_seconds", "Token fetch duration seconds").buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]))
                .expect("static metric definition"),
            token_cache_hits: IntCounter::new("token_cache_hits_total", "Bearer tokens served from cache")
                .expect("static metric definition"),
            token_expiry_unix: IntGauge::new("token_expiry_unix_seconds", "Expiry of the cached token")
                .expect("static metric definition"),
            registry,
        };

        register(&metrics.registry, metrics.token_fetch_requests.clone());
        register(&metrics.registry, metrics.token_fetch_failures.clone());
        register(&metrics.registry, metrics.token_fetch_duration.clone());
        register(&metrics.registry, metrics.token_cache_hits.clone());
        register(&metrics.registry, metrics.token_expiry_unix.clone());

        metrics
    }

    /// Prometheus text exposition of this registry.
    pub fn render(&self) -> String {
        let mut buffer = Vec::new();
        if TextEncoder::new().encode(&self.registry.gather(), &mut buffer).is_err() {
            return String::new();
        }
        String::from_utf8(buffer).unwrap_or_default()
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

// names are unique within a fresh registry
fn register<C: Collector + 'static>(registry: &Registry, collector: C) {
    registry
        .register(Box::new(collector))
        .expect("metric registered once per registry");
}
