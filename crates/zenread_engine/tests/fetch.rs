use std::time::Duration;

use zenread_engine::{
    BrowserFetcher, FailureKind, FetchSettings, Fetcher, ACCESS_DENIED_MESSAGE, DESKTOP_USER_AGENT,
};
use wiremock::matchers::{header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn fetcher_returns_html_and_sends_browser_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/doc"))
        .and(header_exists("user-agent"))
        .and(header_exists("accept-language"))
        .and(header_exists("referer"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("<html>ok</html>", "text/html; charset=utf-8"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = BrowserFetcher::new(FetchSettings::default());
    let url = format!("{}/doc", server.uri());

    let output = fetcher.fetch_html(&url).await.expect("fetch ok");
    assert_eq!(output.html, "<html>ok</html>");
    assert_eq!(output.metadata.original_url, url);
    assert_eq!(output.metadata.final_url, output.metadata.original_url);
    assert_eq!(output.metadata.redirect_count, 0);
    assert_eq!(output.metadata.encoding_label, "UTF-8");

    let requests = server.received_requests().await.expect("recording enabled");
    let headers = &requests[0].headers;
    assert_eq!(
        headers.get("user-agent").and_then(|v| v.to_str().ok()),
        Some(DESKTOP_USER_AGENT)
    );
    assert_eq!(
        headers.get("referer").and_then(|v| v.to_str().ok()),
        Some(format!("{}/", server.uri()).as_str())
    );
    assert!(headers
        .get("accept")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .starts_with("text/html"));
}

#[tokio::test]
async fn configured_referer_wins_over_origin() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<p>x</p>", "text/html"))
        .mount(&server)
        .await;

    let settings = FetchSettings {
        referer: Some("https://www.google.com/".to_string()),
        ..FetchSettings::default()
    };
    let fetcher = BrowserFetcher::new(settings);
    fetcher
        .fetch_html(&format!("{}/a", server.uri()))
        .await
        .expect("fetch ok");

    let requests = server.received_requests().await.expect("recording enabled");
    assert_eq!(
        requests[0]
            .headers
            .get("referer")
            .and_then(|v| v.to_str().ok()),
        Some("https://www.google.com/")
    );
}

#[tokio::test]
async fn forbidden_maps_to_access_denied() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/blocked"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let fetcher = BrowserFetcher::new(FetchSettings::default());
    let err = fetcher
        .fetch_html(&format!("{}/blocked", server.uri()))
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::AccessDenied);
    assert_eq!(err.message, ACCESS_DENIED_MESSAGE);
}

#[tokio::test]
async fn fetcher_fails_on_http_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let fetcher = BrowserFetcher::new(FetchSettings::default());
    let url = format!("{}/missing", server.uri());

    let err = fetcher.fetch_html(&url).await.unwrap_err();
    assert_eq!(
        err.kind,
        FailureKind::HttpStatus {
            status: 404,
            status_text: "Not Found".to_string()
        }
    );
    assert!(!err.kind.is_network());
}

#[tokio::test]
async fn empty_url_is_invalid_input() {
    let fetcher = BrowserFetcher::new(FetchSettings::default());
    for url in ["", "   "] {
        let err = fetcher.fetch_html(url).await.unwrap_err();
        assert_eq!(err.kind, FailureKind::InvalidInput);
    }
    let err = fetcher.fetch_html("not a url").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidInput);
    let err = fetcher.fetch_html("ftp://example.com/file").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidInput);
}

#[tokio::test]
async fn refused_connection_is_network_error() {
    let settings = FetchSettings {
        connect_timeout: Duration::from_secs(2),
        request_timeout: Duration::from_secs(5),
        ..FetchSettings::default()
    };
    let fetcher = BrowserFetcher::new(settings);
    // Bind then drop a listener so the port is known to be closed.
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        listener.local_addr().expect("addr").port()
    };

    let err = fetcher
        .fetch_html(&format!("http://127.0.0.1:{port}/"))
        .await
        .unwrap_err();
    assert!(err.kind.is_network(), "unexpected kind {:?}", err.kind);
}

#[tokio::test]
async fn fetcher_times_out_on_slow_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_string("slow"),
        )
        .mount(&server)
        .await;

    let settings = FetchSettings {
        request_timeout: Duration::from_millis(50),
        ..FetchSettings::default()
    };
    let fetcher = BrowserFetcher::new(settings);
    let url = format!("{}/slow", server.uri());

    let err = fetcher.fetch_html(&url).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
}

#[tokio::test]
async fn fetcher_rejects_too_large_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/large"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Type", "text/html")
                .set_body_string("01234567890"),
        )
        .mount(&server)
        .await;

    let settings = FetchSettings {
        max_bytes: 10,
        ..FetchSettings::default()
    };
    let fetcher = BrowserFetcher::new(settings);
    let url = format!("{}/large", server.uri());

    let err = fetcher.fetch_html(&url).await.unwrap_err();
    assert_eq!(
        err.kind,
        FailureKind::TooLarge {
            max_bytes: 10,
            actual: Some(11)
        }
    );
}

#[tokio::test]
async fn non_html_content_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("%PDF-1.7", "application/pdf"))
        .mount(&server)
        .await;

    let fetcher = BrowserFetcher::new(FetchSettings::default());
    let err = fetcher
        .fetch_html(&format!("{}/paper.pdf", server.uri()))
        .await
        .unwrap_err();
    assert_eq!(
        err.kind,
        FailureKind::UnsupportedContentType {
            content_type: "application/pdf".to_string()
        }
    );
}

#[tokio::test]
async fn latin1_body_is_decoded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(&b"<p>caf\xe9</p>"[..], "text/html; charset=ISO-8859-1"),
        )
        .mount(&server)
        .await;

    let fetcher = BrowserFetcher::new(FetchSettings::default());
    let output = fetcher
        .fetch_html(&format!("{}/", server.uri()))
        .await
        .expect("fetch ok");
    assert_eq!(output.html, "<p>café</p>");
}
