//! Aggregate read cycle: the three dashboard metrics are fetched concurrently
//! and merged into one fully-populated [`AggregateView`], whatever subset of
//! the reads failed.

use std::{collections::BTreeMap, fmt};

use serde::Serialize;
use shared::{domain::ProductId, error::GatewayError, protocol::SentimentReport};
use tracing::{debug, warn};

use crate::gateway::BackendGateway;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AggregateView {
    pub total_sales: f64,
    pub sentiment_by_review: SentimentReport,
    pub pricing_suggestions: BTreeMap<ProductId, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetch_error: Option<String>,
}

impl AggregateView {
    pub fn is_degraded(&self) -> bool {
        self.fetch_error.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregateSection {
    TotalSales,
    Sentiment,
    Pricing,
}

impl AggregateSection {
    pub fn label(self) -> &'static str {
        match self {
            Self::TotalSales => "total sales",
            Self::Sentiment => "review sentiment",
            Self::Pricing => "pricing recommendations",
        }
    }
}

/// The reads that failed during one cycle, in section order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregateFailure {
    pub failures: Vec<(AggregateSection, GatewayError)>,
}

impl AggregateFailure {
    fn record(&mut self, section: AggregateSection, err: GatewayError) {
        warn!(
            section = section.label(),
            endpoint = %err.endpoint,
            cause = %err.cause,
            "aggregate read failed; using defaults for section"
        );
        self.failures.push((section, err));
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn sections(&self) -> impl Iterator<Item = AggregateSection> + '_ {
        self.failures.iter().map(|(section, _)| *section)
    }
}

impl fmt::Display for AggregateFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = self
            .sections()
            .map(AggregateSection::label)
            .collect::<Vec<_>>()
            .join(", ");
        let causes = self
            .failures
            .iter()
            .map(|(_, err)| err.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        write!(f, "Failed to fetch {names} from backend: {causes}")
    }
}

impl std::error::Error for AggregateFailure {}

pub async fn load_aggregate_view<G>(gateway: &G) -> AggregateView
where
    G: BackendGateway + ?Sized,
{
    // Settle-all: every read runs to completion regardless of the others.
    let (sales, sentiment, pricing) = futures::join!(
        gateway.fetch_total_sales(),
        gateway.fetch_sentiment(),
        gateway.fetch_pricing_recommendations(),
    );

    let mut view = AggregateView::default();
    let mut failure = AggregateFailure::default();

    match sales {
        Ok(response) => view.total_sales = response.total_sales,
        Err(err) => failure.record(AggregateSection::TotalSales, err),
    }
    match sentiment {
        Ok(report) => view.sentiment_by_review = report,
        Err(err) => failure.record(AggregateSection::Sentiment, err),
    }
    match pricing {
        Ok(report) => view.pricing_suggestions = report.pricing_suggestions,
        Err(err) => failure.record(AggregateSection::Pricing, err),
    }

    if failure.is_empty() {
        debug!(
            reviews = view.sentiment_by_review.len(),
            products = view.pricing_suggestions.len(),
            "aggregate view loaded"
        );
    } else {
        view.fetch_error = Some(failure.to_string());
    }
    view
}

#[cfg(test)]
#[path = "tests/orchestrator_tests.rs"]
mod tests;
