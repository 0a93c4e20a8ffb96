//! Terminal rendering of the dashboard view and of mutation outcomes.

use anyhow::Result;
use chrono::{DateTime, Utc};
use client_core::{AggregateView, MutationResult};
use serde::Serialize;

const REVIEW_PREVIEW_CHARS: usize = 50;

pub fn render_view(view: &AggregateView, refreshed_at: Option<DateTime<Utc>>) -> String {
    let mut lines = vec!["MerchantLens Dashboard".to_string()];
    if let Some(at) = refreshed_at {
        lines.push(format!("Last refreshed: {}", at.format("%Y-%m-%d %H:%M:%S UTC")));
    }
    if let Some(error) = &view.fetch_error {
        lines.push(format!("Error: {error}"));
    }

    lines.push(String::new());
    lines.push(format!("Total Sales: ${:.2}", view.total_sales));

    lines.push(String::new());
    lines.push("Review Sentiment".to_string());
    if view.sentiment_by_review.is_empty() {
        lines.push("  (none)".to_string());
    }
    for (text, score) in &view.sentiment_by_review {
        lines.push(format!(
            "  - {}: {} (Polarity: {:.2})",
            preview(text),
            score.sentiment,
            score.polarity
        ));
    }

    lines.push(String::new());
    lines.push("Pricing Recommendations".to_string());
    if view.pricing_suggestions.is_empty() {
        lines.push("  (none)".to_string());
    }
    for (product, suggestion) in &view.pricing_suggestions {
        lines.push(format!("  - {product}: {suggestion}"));
    }

    lines.join("\n")
}

pub fn render_result(result: &MutationResult) -> String {
    match result {
        MutationResult::UploadAccepted => "Upload accepted".to_string(),
        MutationResult::QueryAnswered { query, answer } => {
            format!("Query: {query}\nAnswer: {answer}")
        }
        MutationResult::Failed { reason } => format!("Error: {reason}"),
    }
}

fn preview(text: &str) -> String {
    if text.chars().count() <= REVIEW_PREVIEW_CHARS {
        return text.to_string();
    }
    let head: String = text.chars().take(REVIEW_PREVIEW_CHARS).collect();
    format!("{head}...")
}

#[derive(Serialize)]
struct MutationReport<'a> {
    result: &'a MutationResult,
    view: &'a AggregateView,
}

/// Writes rendered output to stdout, as text or as JSON.
#[derive(Debug, Clone, Copy)]
pub struct Printer {
    pub json: bool,
}

impl Printer {
    pub fn view(&self, view: &AggregateView, refreshed_at: Option<DateTime<Utc>>) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(view)?);
        } else {
            println!("{}", render_view(view, refreshed_at));
        }
        Ok(())
    }

    pub fn mutation(
        &self,
        result: &MutationResult,
        view: &AggregateView,
        refreshed_at: Option<DateTime<Utc>>,
    ) -> Result<()> {
        if self.json {
            let report = MutationReport { result, view };
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            println!("{}\n", render_result(result));
            println!("{}", render_view(view, refreshed_at));
        }
        Ok(())
    }

    /// Session chatter; kept off stdout in JSON mode.
    pub fn notice(&self, message: &str) {
        if self.json {
            eprintln!("{message}");
        } else {
            println!("{message}");
        }
    }
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
