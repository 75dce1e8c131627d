use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::header::{
    HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONNECTION, CONTENT_TYPE, REFERER,
    UPGRADE_INSECURE_REQUESTS, USER_AGENT,
};
use reqwest::StatusCode;
use url::Url;
use zenread_logging::{reader_debug, reader_info, reader_warn};

use crate::decode::decode_body;
use crate::{FailureKind, FetchError, FetchMetadata, FetchOutput, ACCESS_DENIED_MESSAGE};

/// A current desktop Chrome; some sites refuse anything that looks like a bot.
pub const DESKTOP_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

const BROWSER_ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8";

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub redirect_limit: usize,
    pub max_bytes: u64,
    pub allowed_content_types: Vec<String>,
    pub user_agent: String,
    pub accept_language: String,
    /// Sent as `Referer`; defaults to the target's own origin when unset.
    pub referer: Option<String>,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            redirect_limit: 5,
            max_bytes: 5 * 1024 * 1024,
            allowed_content_types: vec![
                "text/html".to_string(),
                "application/xhtml+xml".to_string(),
            ],
            user_agent: DESKTOP_USER_AGENT.to_string(),
            accept_language: "en-US,en;q=0.9".to_string(),
            referer: None,
        }
    }
}

#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch_html(&self, url: &str) -> Result<FetchOutput, FetchError>;
}

/// HTTP fetcher that presents itself as a desktop browser.
#[derive(Debug, Clone)]
pub struct BrowserFetcher {
    settings: FetchSettings,
}

impl BrowserFetcher {
    pub fn new(settings: FetchSettings) -> Self {
        Self { settings }
    }

    fn build_client(&self, redirect_counter: Arc<AtomicUsize>) -> Result<reqwest::Client, FetchError> {
        let redirect_limit = self.settings.redirect_limit;
        let policy = reqwest::redirect::Policy::custom(move |attempt| {
            let count = attempt.previous().len();
            redirect_counter.store(count, Ordering::Relaxed);
            if count >= redirect_limit {
                attempt.error("redirect limit exceeded")
            } else {
                attempt.follow()
            }
        });

        reqwest::Client::builder()
            .connect_timeout(self.settings.connect_timeout)
            .timeout(self.settings.request_timeout)
            .redirect(policy)
            .build()
            .map_err(|err| FetchError::new(FailureKind::Network, err.to_string()))
    }

    fn browser_headers(&self, target: &Url) -> HeaderMap {
        let mut headers = HeaderMap::new();
        let referer = self
            .settings
            .referer
            .clone()
            .unwrap_or_else(|| format!("{}/", target.origin().ascii_serialization()));
        let pairs = [
            (USER_AGENT, self.settings.user_agent.as_str()),
            (ACCEPT, BROWSER_ACCEPT),
            (ACCEPT_LANGUAGE, self.settings.accept_language.as_str()),
            (REFERER, referer.as_str()),
            (CONNECTION, "keep-alive"),
            (UPGRADE_INSECURE_REQUESTS, "1"),
        ];
        for (name, value) in pairs {
            match HeaderValue::from_str(value) {
                Ok(value) => {
                    headers.insert(name, value);
                }
                Err(_) => reader_warn!("skipping invalid {} header value", name),
            }
        }
        headers
    }

    fn is_content_type_allowed(&self, content_type: &str) -> bool {
        let ct = content_type.split(';').next().unwrap_or(content_type).trim();
        self.settings
            .allowed_content_types
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(ct))
    }
}

#[async_trait::async_trait]
impl Fetcher for BrowserFetcher {
    async fn fetch_html(&self, url: &str) -> Result<FetchOutput, FetchError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(FetchError::new(FailureKind::InvalidInput, "URL is required"));
        }
        let parsed = Url::parse(url)
            .map_err(|err| FetchError::new(FailureKind::InvalidInput, err.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(FetchError::new(
                FailureKind::InvalidInput,
                format!("unsupported scheme {}", parsed.scheme()),
            ));
        }

        let redirect_counter = Arc::new(AtomicUsize::new(0));
        let client = self.build_client(redirect_counter.clone())?;

        reader_debug!("GET {}", parsed);
        let response = client
            .get(parsed.as_str())
            .headers(self.browser_headers(&parsed))
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if status == StatusCode::FORBIDDEN {
            reader_warn!("{} refused the request with 403", parsed);
            return Err(FetchError::new(FailureKind::AccessDenied, ACCESS_DENIED_MESSAGE));
        }
        if !status.is_success() {
            let status_text = status.canonical_reason().unwrap_or("").to_string();
            return Err(FetchError::new(
                FailureKind::HttpStatus {
                    status: status.as_u16(),
                    status_text,
                },
                status.to_string(),
            ));
        }

        if let Some(content_len) = response.content_length() {
            if content_len > self.settings.max_bytes {
                return Err(FetchError::new(
                    FailureKind::TooLarge {
                        max_bytes: self.settings.max_bytes,
                        actual: Some(content_len),
                    },
                    "response too large",
                ));
            }
        }

        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());

        if let Some(ct) = content_type.as_deref() {
            if !self.is_content_type_allowed(ct) {
                return Err(FetchError::new(
                    FailureKind::UnsupportedContentType {
                        content_type: ct.to_string(),
                    },
                    "unsupported content type",
                ));
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > self.settings.max_bytes {
                return Err(FetchError::new(
                    FailureKind::TooLarge {
                        max_bytes: self.settings.max_bytes,
                        actual: Some(next_len),
                    },
                    "response too large",
                ));
            }
            bytes.extend_from_slice(&chunk);
        }

        let decoded = decode_body(&bytes, content_type.as_deref());
        if decoded.had_errors {
            reader_warn!(
                "{} contained malformed {} sequences",
                final_url,
                decoded.encoding_label
            );
        }
        reader_info!(
            "fetched {} bytes={} encoding={} redirects={}",
            final_url,
            bytes.len(),
            decoded.encoding_label,
            redirect_counter.load(Ordering::Relaxed)
        );

        let metadata = FetchMetadata {
            original_url: url.to_string(),
            final_url,
            redirect_count: redirect_counter.load(Ordering::Relaxed),
            content_type,
            byte_len: bytes.len() as u64,
            encoding_label: decoded.encoding_label,
        };

        Ok(FetchOutput {
            html: decoded.html,
            metadata,
        })
    }
}

fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_redirect() {
        return FetchError::new(FailureKind::RedirectLimitExceeded, err.to_string());
    }
    FetchError::new(FailureKind::Network, err.to_string())
}
