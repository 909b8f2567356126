//! Configuration validation with aggregated errors.
//! - Aggregates all issues into Vec<String>
//! - Validates issuer uri, client identity, timeout, retry and logging invariants

use reqwest::Url;
use tracing::{error, info};

use crate::config::settings::{ClientConfig, IssuerConfig, RetryConfig, ServiceConfig, SettingsConfig};

const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
const MAX_SKEW_BUFFER_SECONDS: u64 = 60 * 60 * 24;

/// Public entrypoint: returns Ok(()) or Err(Vec<String>) containing all issues.
pub fn validate_service_config(cfg: &ServiceConfig) -> Result<(), Vec<String>> {
    let mut errors: Vec<String> = Vec::new();

    validate_issuer(&cfg.issuer, &mut errors);
    validate_client(&cfg.client, &mut errors);
    validate_settings(&cfg.settings, &mut errors);

    if errors.is_empty() {
        info!("config valid");
        Ok(())
    } else {
        error!("configuration validation errors ({}):", errors.len());
        for e in &errors {
            error!(" - {}", e);
        }
        Err(errors)
    }
}

fn validate_issuer(issuer: &IssuerConfig, errors: &mut Vec<String>) {
    match Url::parse(&issuer.uri) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => errors.push(format!(
            "issuer.uri '{}' must use http or https, got '{}'",
            issuer.uri,
            url.scheme()
        )),
        Err(e) => errors.push(format!("issuer.uri '{}' is not a valid uri: {}", issuer.uri, e)),
    }
}

fn validate_client(client: &ClientConfig, errors: &mut Vec<String>) {
    if client.id.trim().is_empty() {
        errors.push("client.id cannot be empty".to_string());
    }
    if client.secret.is_empty() {
        errors.push("client.secret cannot be empty".to_string());
    }
}

fn validate_settings(settings: &SettingsConfig, errors: &mut Vec<String>) {
    if let Some(retry) = &settings.retry {
        validate_retry("settings.retry", retry, errors);
    }

    if let Some(skew) = settings.skew_buffer_seconds {
        if skew > MAX_SKEW_BUFFER_SECONDS {
            errors.push(format!("settings.skew_buffer_seconds ({}) is unreasonably large", skew));
        }
    }

    if settings.request_timeout_ms == Some(0) {
        errors.push("settings.request_timeout_ms must be > 0".to_string());
    }

    if let Some(logging) = &settings.logging {
        if !VALID_LOG_LEVELS.contains(&logging.level.to_lowercase().as_str()) {
            errors.push(format!(
                "settings.logging.level '{}' invalid; allowed: {:?}",
                logging.level, VALID_LOG_LEVELS
            ));
        }
    }
}

fn validate_retry(path: &str, retry: &RetryConfig, errors: &mut Vec<String>) {
    if retry.attempts == Some(0) {
        errors.push(format!("{}.attempts must be > 0", path));
    }
    if let (Some(base), Some(max)) = (retry.base_delay_ms, retry.max_delay_ms) {
        if max < base {
            errors.push(format!(
                "{}.max_delay_ms ({}) must be >= base_delay_ms ({})",
                path, max, base
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::validate_service_config;
    use crate::config::settings::{ClientConfig, IssuerConfig, ServiceConfig, SettingsConfig};

    fn config(uri: &str) -> ServiceConfig {
        ServiceConfig {
            issuer: IssuerConfig { uri: uri.to_owned(), skip_tls_verify: false },
            client: ClientConfig { id: "id".into(), secret: "secret".into() },
            settings: SettingsConfig::default(),
        }
    }

    #[test]
    fn accepts_minimal_config() {
        assert!(validate_service_config(&config("https://uaa.example.com")).is_ok());
    }

    #[test]
    fn rejects_non_http_scheme() {
        let errors = validate_service_config(&config("ldap://uaa.example.com")).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("http or https"));
    }

    #[test]
    fn rejects_oversized_skew() {
        let mut cfg = config("https://uaa.example.com");
        cfg.settings.skew_buffer_seconds = Some(60 * 60 * 24 * 2);
        let errors = validate_service_config(&cfg).unwrap_err();
        assert!(errors[0].contains("skew_buffer_seconds"));
    }
}
