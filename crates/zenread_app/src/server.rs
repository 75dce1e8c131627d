//! HTTP service: `POST /parse` and `GET /health`.

use std::net::SocketAddr;

use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use zenread_engine::{
    ArticlePipeline, ArticleResult, FailureKind, FetchError, ParseError, ACCESS_DENIED_MESSAGE,
};
use zenread_logging::{reader_info, reader_warn};

const URL_REQUIRED: &str = "URL is required";
const EXTRACT_FAILED: &str = "Failed to extract article";

#[derive(Debug, Deserialize)]
struct ParseRequest {
    url: Option<String>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ParseResponse {
    pub content: String,
    pub title: String,
    pub excerpt: Option<String>,
    pub byline: Option<String>,
    pub site_name: Option<String>,
    pub lang: Option<String>,
    pub published_time: Option<String>,
    pub words: u32,
    pub time_to_read: u32,
}

impl From<ArticleResult> for ParseResponse {
    fn from(article: ArticleResult) -> Self {
        Self {
            content: article.content,
            title: article.title,
            excerpt: article.excerpt,
            byline: article.byline,
            site_name: article.site_name,
            lang: article.lang,
            published_time: article.published_time,
            words: article.word_count,
            time_to_read: article.time_to_read_minutes,
        }
    }
}

/// JSON `{"error": ...}` body with a status code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<ParseError> for ApiError {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::Fetch(err) => fetch_failure(err),
            ParseError::Extract(_) => ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, EXTRACT_FAILED),
        }
    }
}

fn fetch_failure(err: FetchError) -> ApiError {
    match err.kind {
        FailureKind::InvalidInput => {
            ApiError::new(StatusCode::BAD_REQUEST, format!("Invalid URL: {}", err.message))
        }
        FailureKind::AccessDenied => ApiError::new(StatusCode::FORBIDDEN, ACCESS_DENIED_MESSAGE),
        FailureKind::HttpStatus {
            status,
            status_text,
        } => ApiError::new(
            StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
            format!("Failed to fetch URL: {status} {status_text}"),
        ),
        FailureKind::Timeout
        | FailureKind::RedirectLimitExceeded
        | FailureKind::Network
        | FailureKind::TooLarge { .. }
        | FailureKind::UnsupportedContentType { .. } => ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to fetch article: {}", err.message),
        ),
    }
}

pub fn router(pipeline: ArticlePipeline, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/parse", post(parse_article))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(pipeline)
}

async fn health() -> &'static str {
    "ok"
}

/// Body is taken raw so a malformed or non-JSON payload gets the same 400
/// as a missing `url`.
async fn parse_article(
    State(pipeline): State<ArticlePipeline>,
    body: Bytes,
) -> Result<Json<ParseResponse>, ApiError> {
    let url = serde_json::from_slice::<ParseRequest>(&body)
        .ok()
        .and_then(|req| req.url)
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty())
        .ok_or_else(|| ApiError::new(StatusCode::BAD_REQUEST, URL_REQUIRED))?;

    match pipeline.parse(&url).await {
        Ok(article) => {
            reader_info!("POST /parse {} -> {} words", url, article.word_count);
            Ok(Json(article.into()))
        }
        Err(err) => {
            reader_warn!("POST /parse {} failed: {}", url, err);
            Err(err.into())
        }
    }
}

/// Binds `addr` and serves until Ctrl-C.
pub async fn serve(addr: SocketAddr, pipeline: ArticlePipeline, max_body_bytes: usize) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    reader_info!("listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(pipeline, max_body_bytes))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        reader_warn!("could not listen for Ctrl-C: {}", err);
        std::future::pending::<()>().await;
    }
    reader_info!("shutting down");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fetch_error(kind: FailureKind) -> ApiError {
        ParseError::Fetch(FetchError {
            kind,
            message: "boom".to_string(),
        })
        .into()
    }

    #[test]
    fn network_failures_are_server_errors() {
        let err = fetch_error(FailureKind::Timeout);
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message, "Failed to fetch article: boom");
    }

    #[test]
    fn unknown_upstream_status_falls_back_to_bad_gateway() {
        let err = fetch_error(FailureKind::HttpStatus {
            status: 1000,
            status_text: String::new(),
        });
        assert_eq!(err.status, StatusCode::BAD_GATEWAY);
    }
}
