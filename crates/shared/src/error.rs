use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::protocol::Endpoint;

const MAX_DETAIL_CHARS: usize = 200;

/// Error body the backend attaches to non-2xx responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendErrorBody {
    pub detail: serde_json::Value,
}

impl BackendErrorBody {
    pub fn message(&self) -> String {
        match &self.detail {
            serde_json::Value::String(text) => text.clone(),
            other => other.to_string(),
        }
    }

    /// Best-effort detail for a failed response: the structured `detail`
    /// field when present, otherwise the trimmed raw body.
    pub fn detail_from_body(body: &[u8]) -> Option<String> {
        if let Ok(parsed) = serde_json::from_slice::<Self>(body) {
            return Some(parsed.message());
        }
        let text = String::from_utf8_lossy(body);
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        Some(text.chars().take(MAX_DETAIL_CHARS).collect())
    }
}

fn detail_suffix(detail: &Option<String>) -> String {
    detail
        .as_deref()
        .map(|detail| format!(": {detail}"))
        .unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayCause {
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("status {status}{}", detail_suffix(.detail))]
    Status { status: u16, detail: Option<String> },
    #[error("malformed response body: {0}")]
    Decode(String),
}

/// Failure of a single backend call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{endpoint} failed with {cause}")]
pub struct GatewayError {
    pub endpoint: Endpoint,
    pub cause: GatewayCause,
}

impl GatewayError {
    pub fn new(endpoint: Endpoint, cause: GatewayCause) -> Self {
        Self { endpoint, cause }
    }

    pub fn transport(endpoint: Endpoint, message: impl Into<String>) -> Self {
        Self::new(endpoint, GatewayCause::Transport(message.into()))
    }

    pub fn status(endpoint: Endpoint, status: u16, detail: Option<String>) -> Self {
        Self::new(endpoint, GatewayCause::Status { status, detail })
    }

    pub fn decode(endpoint: Endpoint, message: impl Into<String>) -> Self {
        Self::new(endpoint, GatewayCause::Decode(message.into()))
    }
}
