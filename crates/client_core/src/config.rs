use shared::protocol::Endpoint;
use thiserror::Error;
use url::Url;

pub const DEFAULT_BACKEND_BASE_URL: &str = "http://localhost:8000";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid backend base url '{value}': {reason}")]
    InvalidBackendUrl { value: String, reason: String },
}

/// Startup configuration injected into the backend gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    backend_base_url: String,
}

impl DashboardConfig {
    pub fn new(backend_base_url: &str) -> Result<Self, ConfigError> {
        let raw = backend_base_url.trim();
        let invalid = |reason: String| ConfigError::InvalidBackendUrl {
            value: raw.to_string(),
            reason,
        };

        let parsed = Url::parse(raw).map_err(|err| invalid(err.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(invalid(format!(
                "unsupported scheme '{}', expected http or https",
                parsed.scheme()
            )));
        }
        if parsed.host_str().is_none() {
            return Err(invalid("missing host".to_string()));
        }

        Ok(Self {
            backend_base_url: raw.trim_end_matches('/').to_string(),
        })
    }

    pub fn backend_base_url(&self) -> &str {
        &self.backend_base_url
    }

    pub fn endpoint_url(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.backend_base_url, endpoint.path())
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            backend_base_url: DEFAULT_BACKEND_BASE_URL.to_string(),
        }
    }
}
