use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zenread_app::router;
use zenread_engine::{
    ArticlePipeline, FetchError, FetchOutput, FetchSettings, Fetcher, ReadabilityExtractor,
};

const BODY_LIMIT: usize = 64 * 1024;

/// Fails the test if the handler ever reaches the network.
#[derive(Default)]
struct CountingFetcher {
    calls: AtomicUsize,
}

#[async_trait::async_trait]
impl Fetcher for CountingFetcher {
    async fn fetch_html(&self, url: &str) -> Result<FetchOutput, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        panic!("unexpected fetch of {url}");
    }
}

fn live_router() -> Router {
    router(
        ArticlePipeline::with_settings(FetchSettings::default()),
        BODY_LIMIT,
    )
}

async fn post_parse(app: Router, body: impl Into<Body>) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::post("/parse")
                .header("content-type", "application/json")
                .body(body.into())
                .expect("request"),
        )
        .await
        .expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let value = serde_json::from_slice(&bytes).expect("json body");
    (status, value)
}

fn article_page() -> String {
    let paragraph = "<p>".to_string()
        + &"Readers want the text and nothing else on the page. ".repeat(10)
        + "</p>";
    format!(
        r#"<html lang="en"><head><title>Quiet Pages</title>
<meta property="og:site_name" content="Example Daily"></head>
<body><nav><a href="/">Home</a></nav><article>{}</article>
<script>track()</script></body></html>"#,
        paragraph.repeat(6)
    )
}

#[tokio::test]
async fn missing_url_is_rejected_without_fetching() {
    let fetcher = Arc::new(CountingFetcher::default());
    let app = router(
        ArticlePipeline::new(fetcher.clone(), Arc::new(ReadabilityExtractor::new())),
        BODY_LIMIT,
    );

    for body in [r#"{}"#, r#"{"url": ""}"#, r#"{"url": "   "}"#, "not json", ""] {
        let (status, value) = post_parse(app.clone(), body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body {body:?}");
        assert_eq!(value, json!({ "error": "URL is required" }));
    }
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn blocked_site_returns_access_denied() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/blocked"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let body = json!({ "url": format!("{}/blocked", server.uri()) }).to_string();
    let (status, value) = post_parse(live_router(), body).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(
        value,
        json!({ "error": "Access Denied: This website blocks automated readers. Try another link." })
    );
}

#[tokio::test]
async fn upstream_status_is_propagated() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let body = json!({ "url": format!("{}/gone", server.uri()) }).to_string();
    let (status, value) = post_parse(live_router(), body).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(value, json!({ "error": "Failed to fetch URL: 404 Not Found" }));
}

#[tokio::test]
async fn unparseable_url_is_bad_request() {
    let (status, value) = post_parse(live_router(), r#"{"url": "not a url"}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(value["error"]
        .as_str()
        .unwrap_or_default()
        .starts_with("Invalid URL"));
}

#[tokio::test]
async fn page_without_article_is_extraction_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "<html><head><title>Empty</title></head><body></body></html>",
            "text/html",
        ))
        .mount(&server)
        .await;

    let body = json!({ "url": server.uri() }).to_string();
    let (status, value) = post_parse(live_router(), body).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(value, json!({ "error": "Failed to extract article" }));
}

#[tokio::test]
async fn article_is_returned_as_camel_case_json() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/story"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(article_page(), "text/html"))
        .mount(&server)
        .await;

    let body = json!({ "url": format!("{}/story", server.uri()) }).to_string();
    let (status, value) = post_parse(live_router(), body).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(value["title"], "Quiet Pages");
    assert_eq!(value["words"], 600);
    assert_eq!(value["timeToRead"], 3);
    for key in ["content", "excerpt", "byline", "siteName", "lang", "publishedTime"] {
        assert!(value.get(key).is_some(), "missing {key}");
    }
    let content = value["content"].as_str().unwrap_or_default();
    assert!(content.contains("Readers want the text"));
    assert!(!content.contains("track()"));
}

#[tokio::test]
async fn health_answers_ok() {
    let response = live_router()
        .oneshot(Request::get("/health").body(Body::empty()).expect("request"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), 16).await.expect("body");
    assert_eq!(&bytes[..], b"ok");
}
