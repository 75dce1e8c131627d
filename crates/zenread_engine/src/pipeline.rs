use std::sync::Arc;

use zenread_logging::reader_info;

use crate::extract::{Extractor, ReadabilityExtractor};
use crate::fetch::{BrowserFetcher, FetchSettings, Fetcher};
use crate::{ArticleResult, ParseError};

/// Fetch -> extract, shared by the HTTP route and the background engine.
#[derive(Clone)]
pub struct ArticlePipeline {
    fetcher: Arc<dyn Fetcher>,
    extractor: Arc<dyn Extractor>,
}

impl ArticlePipeline {
    pub fn new(fetcher: Arc<dyn Fetcher>, extractor: Arc<dyn Extractor>) -> Self {
        Self { fetcher, extractor }
    }

    /// Browser fetcher plus readability extraction.
    pub fn with_settings(settings: FetchSettings) -> Self {
        Self::new(
            Arc::new(BrowserFetcher::new(settings)),
            Arc::new(ReadabilityExtractor::new()),
        )
    }

    pub async fn parse(&self, url: &str) -> Result<ArticleResult, ParseError> {
        let fetched = self.fetcher.fetch_html(url).await?;
        let article = self
            .extractor
            .extract(&fetched.html, Some(&fetched.metadata.final_url))?;
        reader_info!(
            "parsed {} words={} from {}",
            article.title,
            article.word_count,
            fetched.metadata.final_url
        );
        Ok(article)
    }
}
