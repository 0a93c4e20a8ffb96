use std::{collections::BTreeMap, path::Path};

use anyhow::Context;
use client_core::{DashboardConfig, DEFAULT_BACKEND_BASE_URL};
use serde::Deserialize;
use tokio::fs;
use tracing::warn;

pub const DEFAULT_CONFIG_FILE: &str = "merchantlens.toml";

const ENV_OVERRIDES: [&str; 2] = ["MERCHANTLENS_BACKEND_URL", "APP__BACKEND_BASE_URL"];

#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    backend_base_url: Option<String>,
    #[serde(flatten)]
    unrecognised: BTreeMap<String, toml::Value>,
}

/// Layers, later wins: built-in default, config file, environment, CLI flag.
pub async fn load_config(
    explicit_path: Option<&Path>,
    cli_backend_url: Option<&str>,
) -> anyhow::Result<DashboardConfig> {
    let file_contents = match explicit_path {
        Some(path) => Some(
            fs::read_to_string(path)
                .await
                .with_context(|| format!("failed to read config file '{}'", path.display()))?,
        ),
        None => fs::read_to_string(DEFAULT_CONFIG_FILE).await.ok(),
    };

    resolve_config(
        file_contents.as_deref(),
        |key| std::env::var(key).ok(),
        cli_backend_url,
    )
}

fn resolve_config(
    file_contents: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
    cli_backend_url: Option<&str>,
) -> anyhow::Result<DashboardConfig> {
    let mut backend_base_url = DEFAULT_BACKEND_BASE_URL.to_string();

    if let Some(raw) = file_contents {
        let file_cfg: FileConfig = toml::from_str(raw).context("failed to parse config file")?;
        for key in file_cfg.unrecognised.keys() {
            warn!(%key, "ignoring unrecognised config key");
        }
        if let Some(v) = file_cfg.backend_base_url {
            backend_base_url = v;
        }
    }

    for key in ENV_OVERRIDES {
        if let Some(v) = env(key) {
            backend_base_url = v;
        }
    }

    if let Some(v) = cli_backend_url {
        backend_base_url = v.to_string();
    }

    Ok(DashboardConfig::new(&backend_base_url)?)
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
