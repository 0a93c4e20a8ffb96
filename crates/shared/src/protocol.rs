use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

use crate::domain::{ProductId, ReviewSentiment, UploadKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Endpoint {
    SalesTotal,
    ReviewSentiment,
    PricingRecommendations,
    UploadSales,
    UploadReviews,
    NlpQuery,
}

impl Endpoint {
    pub fn path(self) -> &'static str {
        match self {
            Self::SalesTotal => "/sales/total",
            Self::ReviewSentiment => "/reviews/sentiment",
            Self::PricingRecommendations => "/recommendations/pricing",
            Self::UploadSales => "/upload-sales",
            Self::UploadReviews => "/upload-reviews",
            Self::NlpQuery => "/nlp/query",
        }
    }

    pub fn method(self) -> &'static str {
        match self {
            Self::SalesTotal | Self::ReviewSentiment | Self::PricingRecommendations => "GET",
            Self::UploadSales | Self::UploadReviews | Self::NlpQuery => "POST",
        }
    }

    pub fn for_upload(kind: UploadKind) -> Self {
        match kind {
            UploadKind::Sales => Self::UploadSales,
            UploadKind::Reviews => Self::UploadReviews,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method(), self.path())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TotalSalesResponse {
    pub total_sales: f64,
}

/// Review text to its sentiment score.
pub type SentimentReport = BTreeMap<String, ReviewSentiment>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingReport {
    #[serde(default)]
    pub recommendations: Vec<serde_json::Value>,
    pub pricing_suggestions: BTreeMap<ProductId, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    pub query: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub query: String,
    pub answer: String,
}

/// Multipart field name the upload endpoints read the CSV from.
pub const UPLOAD_FIELD_NAME: &str = "file";
pub const UPLOAD_CONTENT_TYPE: &str = "text/csv";
