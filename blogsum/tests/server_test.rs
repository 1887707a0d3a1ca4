mod support;

use blogsum::pipeline::BlogSummary;
use blogsum::server::{build_rocket, AppState, ErrorBody};
use rocket::http::{ContentType, Status};
use rocket::local::asynchronous::Client;
use support::{article_html, expected_summary, test_stores, TestStores, TITLE};
use tokio_util::sync::CancellationToken;

async fn client(stores: &TestStores) -> Client {
    let state = AppState::new(stores.pipeline(), CancellationToken::new());
    Client::tracked(build_rocket(state, None))
        .await
        .expect("valid rocket instance")
}

async fn post_summarize(client: &Client, body: &str) -> (Status, String) {
    let response = client
        .post("/api/summarize")
        .header(ContentType::JSON)
        .body(body.to_string())
        .dispatch()
        .await;
    let status = response.status();
    (status, response.into_string().await.unwrap_or_default())
}

#[tokio::test]
async fn test_summarize_endpoint_success() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/post")
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body(article_html())
        .create_async()
        .await;

    let stores = test_stores().await;
    let client = client(&stores).await;
    let url = format!("{}/post", server.url());

    let (status, body) = post_summarize(&client, &serde_json::json!({ "url": url }).to_string()).await;
    assert_eq!(status, Status::Ok);

    // Wire format is camelCase.
    let raw: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert!(raw.get("summaryTranslated").is_some());
    assert!(raw.get("fullText").is_some());

    let summary: BlogSummary = serde_json::from_str(&body).unwrap();
    assert_eq!(summary.title, TITLE);
    assert_eq!(summary.summary, expected_summary());
    assert_eq!(summary.url, url);
    assert_eq!(stores.summary_count().await, 1);
    assert_eq!(stores.document_count().await, 1);
}

#[tokio::test]
async fn test_summarize_requires_url() {
    let stores = test_stores().await;
    let client = client(&stores).await;

    for body in [r#"{}"#, r#"{"url": "   "}"#] {
        let (status, body) = post_summarize(&client, body).await;
        assert_eq!(status, Status::BadRequest);
        let error: ErrorBody = serde_json::from_str(&body).unwrap();
        assert_eq!(error.error, "URL is required");
    }
}

#[tokio::test]
async fn test_summarize_rejects_non_http_url() {
    let stores = test_stores().await;
    let client = client(&stores).await;

    let (status, body) = post_summarize(&client, r#"{"url": "ftp://example.com/post"}"#).await;
    assert_eq!(status, Status::BadRequest);
    let error: ErrorBody = serde_json::from_str(&body).unwrap();
    assert_eq!(error.error, "Please provide a valid HTTP or HTTPS URL");
    assert_eq!(stores.summary_count().await, 0);
}

#[tokio::test]
async fn test_summarize_reports_fetch_failure() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/missing")
        .with_status(404)
        .create_async()
        .await;

    let stores = test_stores().await;
    let client = client(&stores).await;

    let url = format!("{}/missing", server.url());
    let (status, body) = post_summarize(&client, &serde_json::json!({ "url": url }).to_string()).await;
    assert_eq!(status, Status::InternalServerError);
    let error: ErrorBody = serde_json::from_str(&body).unwrap();
    assert_eq!(error.error, "Unable to fetch the webpage (HTTP 404)");
}

#[tokio::test]
async fn test_malformed_body_gets_json_error() {
    let stores = test_stores().await;
    let client = client(&stores).await;

    let (status, body) = post_summarize(&client, "not json").await;
    assert!(status == Status::BadRequest || status == Status::UnprocessableEntity);
    let error: ErrorBody = serde_json::from_str(&body).unwrap();
    assert_eq!(error.error, "Invalid request body");
}

#[tokio::test]
async fn test_health_and_status() {
    let stores = test_stores().await;
    let client = client(&stores).await;

    let response = client.get("/health").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    assert_eq!(response.into_string().await.as_deref(), Some("OK"));

    let response = client.get("/api/v1/status").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    let status: serde_json::Value = serde_json::from_str(&response.into_string().await.unwrap()).unwrap();
    assert_eq!(status["status"], "ok");
    assert!(status["dictionary_words"].as_u64().unwrap() > 0);
}
