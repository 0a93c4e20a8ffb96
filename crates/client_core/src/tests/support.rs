//! In-process gateway double recording every call it receives.

use std::{
    collections::{BTreeMap, HashSet},
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use shared::{
    domain::{ReviewSentiment, UploadFile, UploadKind},
    error::GatewayError,
    protocol::{Endpoint, PricingReport, QueryResponse, SentimentReport, TotalSalesResponse},
};
use tokio::sync::{Barrier, Notify};

use crate::gateway::BackendGateway;

pub(crate) struct FakeGateway {
    total_sales: Mutex<f64>,
    total_after_sales_upload: Option<f64>,
    sentiment: SentimentReport,
    pricing: PricingReport,
    answer: String,
    echoed_query: Option<String>,
    failing: HashSet<Endpoint>,
    read_barrier: Option<Arc<Barrier>>,
    query_gate: Option<Arc<Notify>>,
    stalled_read: Mutex<Option<Arc<Notify>>>,
    calls: Mutex<Vec<Endpoint>>,
    uploads: Mutex<Vec<(UploadKind, String)>>,
    queries: Mutex<Vec<String>>,
}

impl FakeGateway {
    /// Backend state of the "healthy dashboard" scenario.
    pub(crate) fn healthy() -> Self {
        let mut sentiment = BTreeMap::new();
        sentiment.insert(
            "great product".to_string(),
            ReviewSentiment {
                sentiment: "positive".to_string(),
                polarity: 0.8,
                product: None,
            },
        );
        let mut pricing_suggestions = BTreeMap::new();
        pricing_suggestions.insert("SKU1".into(), "raise price 5%".to_string());

        Self {
            total_sales: Mutex::new(1234.5),
            total_after_sales_upload: None,
            sentiment,
            pricing: PricingReport {
                recommendations: Vec::new(),
                pricing_suggestions,
            },
            answer: "sales rose 12%".to_string(),
            echoed_query: None,
            failing: HashSet::new(),
            read_barrier: None,
            query_gate: None,
            stalled_read: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
            uploads: Mutex::new(Vec::new()),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn failing(mut self, endpoint: Endpoint) -> Self {
        self.failing.insert(endpoint);
        self
    }

    pub(crate) fn with_total_sales(self, total_sales: f64) -> Self {
        *self.total_sales.lock().expect("total lock") = total_sales;
        self
    }

    /// An accepted sales upload moves the reported total to `total_sales`.
    pub(crate) fn with_total_after_sales_upload(mut self, total_sales: f64) -> Self {
        self.total_after_sales_upload = Some(total_sales);
        self
    }

    /// The backend answers queries with this text in its `query` field.
    pub(crate) fn with_echoed_query(mut self, query: &str) -> Self {
        self.echoed_query = Some(query.to_string());
        self
    }

    /// The next total-sales read takes its value, then blocks until the
    /// returned handle is notified. Later reads are not held.
    pub(crate) fn with_stalled_read(self) -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        *self.stalled_read.lock().expect("stall lock") = Some(Arc::clone(&gate));
        (self, gate)
    }

    /// Every read waits until all three reads have started.
    pub(crate) fn with_read_barrier(mut self) -> Self {
        self.read_barrier = Some(Arc::new(Barrier::new(3)));
        self
    }

    /// Queries block until the returned handle is notified.
    pub(crate) fn with_query_gate(mut self) -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        self.query_gate = Some(Arc::clone(&gate));
        (self, gate)
    }

    pub(crate) fn calls(&self) -> Vec<Endpoint> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub(crate) fn count(&self, endpoint: Endpoint) -> usize {
        self.calls().iter().filter(|call| **call == endpoint).count()
    }

    pub(crate) fn uploads(&self) -> Vec<(UploadKind, String)> {
        self.uploads.lock().expect("uploads lock").clone()
    }

    pub(crate) fn queries(&self) -> Vec<String> {
        self.queries.lock().expect("queries lock").clone()
    }

    async fn enter(&self, endpoint: Endpoint) -> Result<(), GatewayError> {
        self.calls.lock().expect("calls lock").push(endpoint);
        if let Some(barrier) = &self.read_barrier {
            if endpoint.method() == "GET" {
                barrier.wait().await;
            }
        }
        if self.failing.contains(&endpoint) {
            return Err(GatewayError::status(
                endpoint,
                500,
                Some("Internal Server Error".to_string()),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl BackendGateway for FakeGateway {
    async fn fetch_total_sales(&self) -> Result<TotalSalesResponse, GatewayError> {
        let total_sales = *self.total_sales.lock().expect("total lock");
        self.enter(Endpoint::SalesTotal).await?;
        let stall = self.stalled_read.lock().expect("stall lock").take();
        if let Some(gate) = stall {
            gate.notified().await;
        }
        Ok(TotalSalesResponse { total_sales })
    }

    async fn fetch_sentiment(&self) -> Result<SentimentReport, GatewayError> {
        self.enter(Endpoint::ReviewSentiment).await?;
        Ok(self.sentiment.clone())
    }

    async fn fetch_pricing_recommendations(&self) -> Result<PricingReport, GatewayError> {
        self.enter(Endpoint::PricingRecommendations).await?;
        Ok(self.pricing.clone())
    }

    async fn submit_upload(
        &self,
        kind: UploadKind,
        file: UploadFile,
    ) -> Result<(), GatewayError> {
        self.uploads
            .lock()
            .expect("uploads lock")
            .push((kind, file.file_name));
        self.enter(Endpoint::for_upload(kind)).await?;
        if let (UploadKind::Sales, Some(total)) = (kind, self.total_after_sales_upload) {
            *self.total_sales.lock().expect("total lock") = total;
        }
        Ok(())
    }

    async fn submit_query(&self, text: &str) -> Result<QueryResponse, GatewayError> {
        self.queries.lock().expect("queries lock").push(text.to_string());
        if let Some(gate) = &self.query_gate {
            gate.notified().await;
        }
        self.enter(Endpoint::NlpQuery).await?;
        Ok(QueryResponse {
            query: self.echoed_query.clone().unwrap_or_else(|| text.to_string()),
            answer: self.answer.clone(),
        })
    }
}
