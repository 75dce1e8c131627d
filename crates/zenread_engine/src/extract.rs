use dom_smoothie::{Config, Readability};
use zenread_logging::{reader_debug, reader_info};

use crate::sanitize::sanitize_html;
use crate::token::{plain_text, reading_time_minutes, WhitespaceWordCounter, WordCounter};
use crate::{ArticleResult, ExtractError};

/// Cap on parsed elements; very large pages are rejected by readability
/// instead of stalling the request.
pub const DEFAULT_MAX_ELEMENTS: usize = 9_000;

pub trait Extractor: Send + Sync {
    fn extract(&self, html: &str, base_url: Option<&str>) -> Result<ArticleResult, ExtractError>;
}

/// Readability extraction (Mozilla's algorithm via `dom_smoothie`),
/// followed by sanitizing and word statistics.
pub struct ReadabilityExtractor {
    max_elements: usize,
    counter: Box<dyn WordCounter>,
}

impl ReadabilityExtractor {
    pub fn new() -> Self {
        Self::with_max_elements(DEFAULT_MAX_ELEMENTS)
    }

    pub fn with_max_elements(max_elements: usize) -> Self {
        Self {
            max_elements,
            counter: Box::new(WhitespaceWordCounter),
        }
    }
}

impl Default for ReadabilityExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Extractor for ReadabilityExtractor {
    fn extract(&self, html: &str, base_url: Option<&str>) -> Result<ArticleResult, ExtractError> {
        let cfg = Config {
            max_elements_to_parse: self.max_elements,
            ..Default::default()
        };

        let mut readability = Readability::new(html, base_url, Some(cfg)).map_err(|err| {
            reader_debug!("readability init failed: {err:?}");
            ExtractError::NoArticleFound
        })?;
        let article = readability.parse().map_err(|err| {
            reader_debug!("readability found no article: {err:?}");
            ExtractError::NoArticleFound
        })?;

        let content = sanitize_html(&article.content.to_string());
        let text = plain_text(&content);
        if content.is_empty() || text.is_empty() {
            return Err(ExtractError::NoArticleFound);
        }

        let word_count = self.counter.count(&text);
        let result = ArticleResult {
            title: article.title.trim().to_string(),
            content,
            excerpt: non_empty(article.excerpt),
            byline: non_empty(article.byline),
            site_name: non_empty(article.site_name),
            lang: non_empty(article.lang),
            published_time: non_empty(article.published_time),
            word_count,
            time_to_read_minutes: reading_time_minutes(word_count),
        };
        reader_info!(
            "extracted article title_len={} words={} minutes={}",
            result.title.len(),
            result.word_count,
            result.time_to_read_minutes
        );
        Ok(result)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
