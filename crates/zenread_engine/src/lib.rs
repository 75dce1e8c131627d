//! Reader engine: fetching, article extraction and AI summaries.
mod convert;
mod decode;
mod engine;
mod extract;
mod fetch;
mod gemini;
mod pipeline;
mod sanitize;
mod summarize;
mod token;
mod types;

pub use convert::{Html2MdConverter, MarkdownConverter};
pub use decode::{decode_body, DecodedHtml};
pub use engine::EngineHandle;
pub use extract::{Extractor, ReadabilityExtractor, DEFAULT_MAX_ELEMENTS};
pub use fetch::{BrowserFetcher, FetchSettings, Fetcher, DESKTOP_USER_AGENT};
pub use gemini::{GeminiModel, GeminiSettings, DEFAULT_ENDPOINT, DEFAULT_MODEL};
pub use pipeline::ArticlePipeline;
pub use sanitize::sanitize_html;
pub use summarize::{
    build_prompt, LanguageModel, Summarizer, SummaryError, SummaryFormat, SummaryLength,
    SummaryRequest, SummaryResult, SummaryStyle,
};
pub use token::{plain_text, reading_time_minutes, WhitespaceWordCounter, WordCounter, WORDS_PER_MINUTE};
pub use types::{
    ArticleResult, EngineEvent, ExtractError, FailureKind, FetchError, FetchMetadata,
    FetchOutput, ParseError, RequestId, ACCESS_DENIED_MESSAGE,
};
