use std::path::Path;

use anyhow::{Context, Result};

use crate::config::loader::file_to_config;
use crate::config::settings::ServiceConfig;

pub async fn run(config_path: &str) -> Result<ServiceConfig> {
    file_to_config(Path::new(config_path))
        .await
        .with_context(|| format!("cannot load config from '{}'", config_path))
}
