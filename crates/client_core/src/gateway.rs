//! Typed access to the analytics backend. Every call maps its failure into a
//! [`GatewayError`] naming the endpoint, so callers never see raw transport
//! or serde errors.

use std::error::Error as _;

use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client, RequestBuilder,
};
use serde::de::DeserializeOwned;
use shared::{
    domain::{UploadFile, UploadKind},
    error::{BackendErrorBody, GatewayError},
    protocol::{
        Endpoint, PricingReport, QueryRequest, QueryResponse, SentimentReport,
        TotalSalesResponse, UPLOAD_CONTENT_TYPE, UPLOAD_FIELD_NAME,
    },
};
use tracing::{debug, warn};

use crate::config::DashboardConfig;

#[async_trait]
pub trait BackendGateway: Send + Sync {
    async fn fetch_total_sales(&self) -> Result<TotalSalesResponse, GatewayError>;
    async fn fetch_sentiment(&self) -> Result<SentimentReport, GatewayError>;
    async fn fetch_pricing_recommendations(&self) -> Result<PricingReport, GatewayError>;
    async fn submit_upload(&self, kind: UploadKind, file: UploadFile)
        -> Result<(), GatewayError>;
    async fn submit_query(&self, text: &str) -> Result<QueryResponse, GatewayError>;
}

pub struct HttpBackendGateway {
    http: Client,
    config: DashboardConfig,
}

impl HttpBackendGateway {
    pub fn new(config: DashboardConfig) -> Self {
        Self::with_client(config, Client::new())
    }

    pub fn with_client(config: DashboardConfig, http: Client) -> Self {
        Self { http, config }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    async fn send(
        &self,
        endpoint: Endpoint,
        request: RequestBuilder,
    ) -> Result<Vec<u8>, GatewayError> {
        debug!(%endpoint, "issuing backend request");
        let response = request
            .send()
            .await
            .map_err(|err| GatewayError::transport(endpoint, describe(&err)))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| GatewayError::transport(endpoint, describe(&err)))?;

        if !status.is_success() {
            return Err(GatewayError::status(
                endpoint,
                status.as_u16(),
                BackendErrorBody::detail_from_body(&body),
            ));
        }
        Ok(body.to_vec())
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: Endpoint) -> Result<T, GatewayError> {
        let request = self.http.get(self.config.endpoint_url(endpoint));
        let body = self.send(endpoint, request).await?;
        decode(endpoint, &body)
    }
}

#[async_trait]
impl BackendGateway for HttpBackendGateway {
    async fn fetch_total_sales(&self) -> Result<TotalSalesResponse, GatewayError> {
        self.get_json(Endpoint::SalesTotal)
            .await
            .inspect_err(log_failure)
    }

    async fn fetch_sentiment(&self) -> Result<SentimentReport, GatewayError> {
        self.get_json(Endpoint::ReviewSentiment)
            .await
            .inspect_err(log_failure)
    }

    async fn fetch_pricing_recommendations(&self) -> Result<PricingReport, GatewayError> {
        self.get_json(Endpoint::PricingRecommendations)
            .await
            .inspect_err(log_failure)
    }

    async fn submit_upload(
        &self,
        kind: UploadKind,
        file: UploadFile,
    ) -> Result<(), GatewayError> {
        let endpoint = Endpoint::for_upload(kind);
        let part = Part::bytes(file.bytes)
            .file_name(file.file_name)
            .mime_str(UPLOAD_CONTENT_TYPE)
            .map_err(|err| GatewayError::transport(endpoint, describe(&err)))?;
        let request = self
            .http
            .post(self.config.endpoint_url(endpoint))
            .multipart(Form::new().part(UPLOAD_FIELD_NAME, part));

        self.send(endpoint, request)
            .await
            .map(|_| ())
            .inspect_err(log_failure)
    }

    async fn submit_query(&self, text: &str) -> Result<QueryResponse, GatewayError> {
        let endpoint = Endpoint::NlpQuery;
        let request = self
            .http
            .post(self.config.endpoint_url(endpoint))
            .json(&QueryRequest {
                query: text.to_string(),
            });
        let body = self.send(endpoint, request).await.inspect_err(log_failure)?;
        decode(endpoint, &body).inspect_err(log_failure)
    }
}

fn decode<T: DeserializeOwned>(endpoint: Endpoint, body: &[u8]) -> Result<T, GatewayError> {
    serde_json::from_slice(body).map_err(|err| GatewayError::decode(endpoint, err.to_string()))
}

fn log_failure(err: &GatewayError) {
    warn!(endpoint = %err.endpoint, cause = %err.cause, "backend call failed");
}

/// reqwest's top-level message omits the underlying cause (refused
/// connection, DNS, ...), so walk the source chain.
fn describe(err: &reqwest::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[cfg(test)]
#[path = "tests/gateway_tests.rs"]
mod tests;
