use std::path::Path;
use std::sync::OnceLock;

use anyhow::{anyhow, Result};
use regex::Regex;
use tracing::{debug, error};

use crate::config::settings::{LoggingConfig, ServiceConfig};
use crate::config::proc_validator::validate_service_config;
use crate::utils::constants::{DEFAULT_HTTP_TIMEOUT_MS, DEFAULT_SKEW_BUFFER_SECS};

/// Load and validate config from YAML file
pub async fn file_to_config(path: &Path) -> Result<ServiceConfig> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| anyhow!("cannot read config '{}': {}", path.display(), e))?;

    parse_config(&expand_env_vars(&content))
}

pub fn parse_config(content: &str) -> Result<ServiceConfig> {
    let mut service_config: ServiceConfig = serde_yaml::from_str(content)
        .inspect_err(|e| error!("parse config error: {}", e))?;

    // Apply defaults
    let settings = &mut service_config.settings;
    settings.logging.get_or_insert_with(LoggingConfig::default);
    settings.skew_buffer_seconds.get_or_insert(DEFAULT_SKEW_BUFFER_SECS);
    settings.request_timeout_ms.get_or_insert(DEFAULT_HTTP_TIMEOUT_MS);

    debug!("validation config ...");
    validate_service_config(&service_config)
        .map_err(|errors| anyhow!("config is not valid:\n  - {}", errors.join("\n  - ")))?;

    Ok(service_config)
}

/// Replace `${VAR}` and `${VAR:default}` with environment values.
pub fn expand_env_vars(input: &str) -> String {
    static ENV_VAR: OnceLock<Regex> = OnceLock::new();
    let re = ENV_VAR.get_or_init(|| {
        Regex::new(r"\$\{(\w+)(?::([^}]*))?\}").expect("env var pattern is valid")
    });
    re.replace_all(input, |caps: &regex::Captures| {
        let var = &caps[1];
        let default = caps.get(2).map(|m| m.as_str()).unwrap_or("");
        std::env::var(var).unwrap_or_else(|_| default.to_string())
    })
    .to_string()
}
