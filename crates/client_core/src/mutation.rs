use std::fmt;

use serde::Serialize;
use shared::domain::{UploadFile, UploadKind};
use tracing::{info, warn};

use crate::gateway::BackendGateway;

/// A single user submission. Consumed by value; exactly one variant per
/// submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationIntent {
    Upload {
        sales_file: Option<UploadFile>,
        reviews_file: Option<UploadFile>,
    },
    Query {
        query_text: String,
    },
}

impl MutationIntent {
    pub fn upload(sales_file: Option<UploadFile>, reviews_file: Option<UploadFile>) -> Self {
        Self::Upload {
            sales_file,
            reviews_file,
        }
    }

    pub fn query(query_text: impl Into<String>) -> Self {
        Self::Query {
            query_text: query_text.into(),
        }
    }

    pub fn kind(&self) -> MutationKind {
        match self {
            Self::Upload { .. } => MutationKind::Upload,
            Self::Query { .. } => MutationKind::Query,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationKind {
    Upload,
    Query,
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Upload => f.write_str("upload"),
            Self::Query => f.write_str("query"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MutationResult {
    UploadAccepted,
    QueryAnswered { query: String, answer: String },
    Failed { reason: String },
}

impl MutationResult {
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failed { .. })
    }
}

pub async fn handle_mutation<G>(gateway: &G, intent: MutationIntent) -> MutationResult
where
    G: BackendGateway + ?Sized,
{
    match intent {
        MutationIntent::Upload {
            sales_file,
            reviews_file,
        } => handle_upload(gateway, sales_file, reviews_file).await,
        MutationIntent::Query { query_text } => handle_query(gateway, query_text).await,
    }
}

async fn handle_upload<G>(
    gateway: &G,
    sales_file: Option<UploadFile>,
    reviews_file: Option<UploadFile>,
) -> MutationResult
where
    G: BackendGateway + ?Sized,
{
    let mut failures = Vec::new();

    // Each file is submitted on its own; one failing does not skip the other.
    for (kind, file) in [
        (UploadKind::Sales, sales_file),
        (UploadKind::Reviews, reviews_file),
    ] {
        let Some(file) = file else {
            continue;
        };
        info!(
            kind = kind.label(),
            file_name = %file.file_name,
            size_bytes = file.bytes.len(),
            "submitting dataset upload"
        );
        if let Err(err) = gateway.submit_upload(kind, file).await {
            failures.push(err.to_string());
        }
    }

    if failures.is_empty() {
        MutationResult::UploadAccepted
    } else {
        warn!(failed = failures.len(), "dataset upload rejected");
        MutationResult::failed(format!("Upload failed: {}", failures.join("; ")))
    }
}

async fn handle_query<G>(gateway: &G, query_text: String) -> MutationResult
where
    G: BackendGateway + ?Sized,
{
    info!(chars = query_text.chars().count(), "submitting natural-language query");
    match gateway.submit_query(&query_text).await {
        Ok(response) => MutationResult::QueryAnswered {
            query: response.query,
            answer: response.answer,
        },
        Err(err) => MutationResult::failed(format!("Query failed: {err}")),
    }
}

#[cfg(test)]
#[path = "tests/mutation_tests.rs"]
mod tests;
