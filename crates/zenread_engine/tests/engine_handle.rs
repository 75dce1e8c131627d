use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zenread_engine::{
    ArticlePipeline, EngineEvent, EngineHandle, FailureKind, FetchSettings, LanguageModel,
    ParseError, Summarizer, SummaryError, SummaryFormat, SummaryRequest, SummaryStyle,
};

struct EchoModel;

#[async_trait::async_trait]
impl LanguageModel for EchoModel {
    fn is_configured(&self) -> bool {
        true
    }

    async fn generate(&self, prompt: &str) -> Result<String, SummaryError> {
        Ok(format!("{} chars", prompt.len()))
    }
}

fn engine() -> EngineHandle {
    EngineHandle::new(
        ArticlePipeline::with_settings(FetchSettings::default()),
        Arc::new(Summarizer::new(Arc::new(EchoModel))),
    )
}

fn next_event(handle: &EngineHandle) -> EngineEvent {
    handle
        .recv_timeout(Duration::from_secs(10))
        .expect("engine event")
}

#[tokio::test(flavor = "multi_thread")]
async fn fetch_article_reports_by_request_id() {
    let server = MockServer::start().await;
    let paragraph = "<p>One two three four five six seven eight nine ten words here.</p>";
    let page = format!(
        "<html><head><title>Handle</title></head><body><article>{}</article></body></html>",
        paragraph.repeat(12)
    );
    Mock::given(method("GET"))
        .and(path("/ok"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(page, "text/html"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(410))
        .mount(&server)
        .await;

    let handle = engine();
    handle.fetch_article(7, format!("{}/ok", server.uri()));
    handle.fetch_article(8, format!("{}/gone", server.uri()));

    let mut seen = HashSet::new();
    for _ in 0..2 {
        match next_event(&handle) {
            EngineEvent::ArticleReady {
                request_id: 7,
                result,
            } => {
                let article = result.expect("article");
                assert_eq!(article.title, "Handle");
                assert!(article.word_count > 0);
                seen.insert(7);
            }
            EngineEvent::ArticleReady {
                request_id: 8,
                result,
            } => {
                match result {
                    Err(ParseError::Fetch(err)) => {
                        assert!(matches!(err.kind, FailureKind::HttpStatus { status: 410, .. }))
                    }
                    other => panic!("unexpected result {other:?}"),
                }
                seen.insert(8);
            }
            other => panic!("unexpected event {other:?}"),
        }
    }
    assert_eq!(seen.len(), 2);
}

#[test]
fn batch_emits_one_event_per_style() {
    let handle = engine();
    let styles = vec![
        SummaryStyle::Format(SummaryFormat::Headline),
        SummaryStyle::Format(SummaryFormat::SectionWise),
    ];
    handle.summarize_batch(3, "Body".to_string(), None, styles.clone());

    let mut got = Vec::new();
    for _ in 0..styles.len() {
        match next_event(&handle) {
            EngineEvent::SummaryReady { request_id, result } => {
                assert_eq!(request_id, 3);
                assert!(result.is_ok());
                got.push(result.style);
            }
            other => panic!("unexpected event {other:?}"),
        }
    }
    assert_eq!(got, styles);
}

#[test]
fn single_summary_carries_error_for_empty_content() {
    let handle = engine();
    handle.summarize(
        4,
        SummaryRequest {
            content: " ".to_string(),
            style: SummaryStyle::default(),
            title: None,
        },
    );
    match next_event(&handle) {
        EngineEvent::SummaryReady { request_id, result } => {
            assert_eq!(request_id, 4);
            assert_eq!(result.error, Some(SummaryError::EmptyContent));
        }
        other => panic!("unexpected event {other:?}"),
    }
}
