use super::*;
use crate::test_support::FakeGateway;
use shared::protocol::Endpoint;

fn csv(name: &str) -> UploadFile {
    UploadFile::new(name, b"date,product,amount\n2024-05-01,SKU1,19.99\n".to_vec())
}

#[tokio::test]
async fn sales_only_upload_touches_only_sales_endpoint() {
    let gateway = FakeGateway::healthy();

    let result =
        handle_mutation(&gateway, MutationIntent::upload(Some(csv("sales.csv")), None)).await;

    assert_eq!(result, MutationResult::UploadAccepted);
    assert_eq!(gateway.calls(), vec![Endpoint::UploadSales]);
    assert_eq!(gateway.count(Endpoint::UploadReviews), 0);
}

#[tokio::test]
async fn reviews_only_upload_is_not_blocked_by_missing_sales_file() {
    let gateway = FakeGateway::healthy();

    let result =
        handle_mutation(&gateway, MutationIntent::upload(None, Some(csv("reviews.csv")))).await;

    assert_eq!(result, MutationResult::UploadAccepted);
    assert_eq!(
        gateway.uploads(),
        vec![(UploadKind::Reviews, "reviews.csv".to_string())]
    );
}

#[tokio::test]
async fn both_files_are_submitted_sales_first() {
    let gateway = FakeGateway::healthy();

    let result = handle_mutation(
        &gateway,
        MutationIntent::upload(Some(csv("sales.csv")), Some(csv("reviews.csv"))),
    )
    .await;

    assert!(result.is_success());
    assert_eq!(
        gateway.calls(),
        vec![Endpoint::UploadSales, Endpoint::UploadReviews]
    );
}

#[tokio::test]
async fn failing_sales_upload_still_attempts_reviews_and_reports_failure() {
    let gateway = FakeGateway::healthy().failing(Endpoint::UploadSales);

    let result = handle_mutation(
        &gateway,
        MutationIntent::upload(Some(csv("sales.csv")), Some(csv("reviews.csv"))),
    )
    .await;

    assert_eq!(gateway.count(Endpoint::UploadReviews), 1);
    let MutationResult::Failed { reason } = result else {
        panic!("expected failure, got {result:?}");
    };
    assert!(reason.starts_with("Upload failed: POST /upload-sales"), "{reason}");
    assert!(!reason.contains("/upload-reviews"), "{reason}");
}

#[tokio::test]
async fn empty_upload_issues_no_calls() {
    let gateway = FakeGateway::healthy();

    let result = handle_mutation(&gateway, MutationIntent::upload(None, None)).await;

    assert_eq!(result, MutationResult::UploadAccepted);
    assert!(gateway.calls().is_empty());
}

#[tokio::test]
async fn query_returns_backend_answer_verbatim() {
    let gateway = FakeGateway::healthy();

    let result = handle_mutation(
        &gateway,
        MutationIntent::query("compare sales last week vs previous"),
    )
    .await;

    assert_eq!(
        result,
        MutationResult::QueryAnswered {
            query: "compare sales last week vs previous".to_string(),
            answer: "sales rose 12%".to_string(),
        }
    );
    assert_eq!(
        gateway.queries(),
        vec!["compare sales last week vs previous".to_string()]
    );
}

#[tokio::test]
async fn answered_query_carries_the_backend_echo() {
    let gateway = FakeGateway::healthy().with_echoed_query("normalised: top products");

    let result = handle_mutation(&gateway, MutationIntent::query("Top products?")).await;

    assert_eq!(
        result,
        MutationResult::QueryAnswered {
            query: "normalised: top products".to_string(),
            answer: "sales rose 12%".to_string(),
        }
    );
    assert_eq!(gateway.queries(), vec!["Top products?".to_string()]);
}

#[tokio::test]
async fn query_text_is_not_trimmed_or_validated() {
    let gateway = FakeGateway::healthy();

    handle_mutation(&gateway, MutationIntent::query("")).await;
    handle_mutation(&gateway, MutationIntent::query("  padded  ")).await;

    assert_eq!(
        gateway.queries(),
        vec![String::new(), "  padded  ".to_string()]
    );
}

#[tokio::test]
async fn query_transport_failure_becomes_failed_result() {
    let gateway = FakeGateway::healthy().failing(Endpoint::NlpQuery);

    let result = handle_mutation(&gateway, MutationIntent::query("top products")).await;

    assert_eq!(
        result,
        MutationResult::failed(
            "Query failed: POST /nlp/query failed with status 500: Internal Server Error"
        )
    );
    assert!(!result.is_success());
}

#[test]
fn intent_kind_follows_variant() {
    assert_eq!(MutationIntent::query("q").kind(), MutationKind::Query);
    assert_eq!(MutationIntent::upload(None, None).kind(), MutationKind::Upload);
    assert_eq!(MutationKind::Upload.to_string(), "upload");
}

#[test]
fn result_serializes_with_status_tag() {
    let value = serde_json::to_value(MutationResult::QueryAnswered {
        query: "q".to_string(),
        answer: "a".to_string(),
    })
    .expect("serialize");
    assert_eq!(
        value,
        serde_json::json!({ "status": "query_answered", "query": "q", "answer": "a" })
    );
}
