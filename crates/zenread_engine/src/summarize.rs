//! AI summaries of extracted articles.
//!
//! The summarizer turns a [`SummaryRequest`] into a prompt, hands it to a
//! [`LanguageModel`] and always answers with a [`SummaryResult`]; failures
//! travel inside the result instead of escaping as errors.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use futures_util::future::join_all;
use zenread_logging::{clip, reader_debug, reader_info, reader_warn};

use crate::token::{WhitespaceWordCounter, WordCounter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SummaryFormat {
    Paragraph,
    BulletPoints,
    Headline,
    SectionWise,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SummaryLength {
    Short,
    Medium,
    Long,
}

/// Presentation style of a summary: either a layout or a size tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SummaryStyle {
    Format(SummaryFormat),
    Length(SummaryLength),
}

impl SummaryStyle {
    pub const ALL: [SummaryStyle; 7] = [
        SummaryStyle::Format(SummaryFormat::Paragraph),
        SummaryStyle::Format(SummaryFormat::BulletPoints),
        SummaryStyle::Format(SummaryFormat::Headline),
        SummaryStyle::Format(SummaryFormat::SectionWise),
        SummaryStyle::Length(SummaryLength::Short),
        SummaryStyle::Length(SummaryLength::Medium),
        SummaryStyle::Length(SummaryLength::Long),
    ];

    pub fn slug(self) -> &'static str {
        match self {
            SummaryStyle::Format(SummaryFormat::Paragraph) => "paragraph",
            SummaryStyle::Format(SummaryFormat::BulletPoints) => "bullet-points",
            SummaryStyle::Format(SummaryFormat::Headline) => "headline",
            SummaryStyle::Format(SummaryFormat::SectionWise) => "section-wise",
            SummaryStyle::Length(SummaryLength::Short) => "short",
            SummaryStyle::Length(SummaryLength::Medium) => "medium",
            SummaryStyle::Length(SummaryLength::Long) => "long",
        }
    }

    fn instructions(self) -> &'static str {
        match self {
            SummaryStyle::Format(SummaryFormat::Paragraph) => {
                "Write a concise summary in a flowing paragraph format. Make it coherent and easy \
                 to read. Use **bold** for emphasis on key terms if needed. Keep it around 100 words."
            }
            SummaryStyle::Format(SummaryFormat::BulletPoints) => {
                "List the key points in clear, easy-to-read bullet points. Use markdown formatting:\n\
                 - Use **bold** for important terms\n\
                 - Each point should be concise\n\
                 - Use proper markdown list formatting with - or *\n\
                 - Keep it around 100 words total"
            }
            SummaryStyle::Format(SummaryFormat::Headline) => {
                "Provide a single, impactful sentence summarizing the article. Make it compelling \
                 and informative. Use **bold** for emphasis if needed."
            }
            SummaryStyle::Format(SummaryFormat::SectionWise) => {
                "Break down the article into logical sections, with each section having a short \
                 summary. Use markdown formatting:\n\
                 ## Section Title\nBrief summary of this section\n\n\
                 ## Next Section\nBrief summary of this section\n\n\
                 Use **bold** for section titles and important terms. Keep each section concise."
            }
            SummaryStyle::Length(SummaryLength::Short) => {
                "Write a short summary of about 50 words capturing only the central point. \
                 Use **bold** for the most important term."
            }
            SummaryStyle::Length(SummaryLength::Medium) => {
                "Write a summary of about 150 words covering the main argument and the key \
                 supporting points. Use **bold** for important terms."
            }
            SummaryStyle::Length(SummaryLength::Long) => {
                "Write a detailed summary of about 300 words. Cover the main argument, the \
                 supporting evidence and the conclusion. Use ## headers if the article has \
                 distinct parts and **bold** for important terms."
            }
        }
    }
}

impl Default for SummaryStyle {
    fn default() -> Self {
        SummaryStyle::Format(SummaryFormat::Paragraph)
    }
}

impl fmt::Display for SummaryStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for SummaryStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        SummaryStyle::ALL
            .into_iter()
            .find(|style| style.slug() == wanted)
            .ok_or_else(|| {
                let known: Vec<&str> = SummaryStyle::ALL.iter().map(|s| s.slug()).collect();
                format!("unknown summary style '{s}' (expected one of {})", known.join(", "))
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRequest {
    pub content: String,
    pub style: SummaryStyle,
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SummaryError {
    #[error("GEMINI_API_KEY is not configured")]
    MissingCredential,
    #[error("Content is required")]
    EmptyContent,
    #[error("summary service returned {status}: {message}")]
    Service { status: u16, message: String },
    #[error("summary service returned an unusable response: {0}")]
    MalformedResponse(String),
    #[error("could not reach the summary service: {0}")]
    Network(String),
}

/// Outcome of one summary call. On failure `summary_text` is empty,
/// `word_count` is zero and `error` says why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryResult {
    pub style: SummaryStyle,
    pub summary_text: String,
    pub word_count: u32,
    pub error: Option<SummaryError>,
}

impl SummaryResult {
    fn failed(style: SummaryStyle, error: SummaryError) -> Self {
        Self {
            style,
            summary_text: String::new(),
            word_count: 0,
            error: Some(error),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

#[async_trait::async_trait]
pub trait LanguageModel: Send + Sync {
    /// Whether a credential is available; checked before any call.
    fn is_configured(&self) -> bool;
    async fn generate(&self, prompt: &str) -> Result<String, SummaryError>;
}

pub struct Summarizer {
    model: Arc<dyn LanguageModel>,
    counter: WhitespaceWordCounter,
}

impl Summarizer {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self {
            model,
            counter: WhitespaceWordCounter,
        }
    }

    pub async fn summarize(&self, request: &SummaryRequest) -> SummaryResult {
        let style = request.style;
        match self.try_summarize(request).await {
            Ok(text) => {
                let word_count = self.counter.count(&text);
                reader_info!("summary style={} words={}", style, word_count);
                SummaryResult {
                    style,
                    summary_text: text,
                    word_count,
                    error: None,
                }
            }
            Err(err) => {
                reader_warn!("summary style={} failed: {}", style, err);
                SummaryResult::failed(style, err)
            }
        }
    }

    /// One independent call per style, run concurrently. Results come back
    /// in the order of `styles`.
    pub async fn summarize_batch(
        &self,
        content: &str,
        title: Option<&str>,
        styles: &[SummaryStyle],
    ) -> Vec<SummaryResult> {
        let requests: Vec<SummaryRequest> = styles
            .iter()
            .map(|&style| SummaryRequest {
                content: content.to_string(),
                style,
                title: title.map(str::to_string),
            })
            .collect();
        join_all(requests.iter().map(|request| self.summarize(request))).await
    }

    async fn try_summarize(&self, request: &SummaryRequest) -> Result<String, SummaryError> {
        if !self.model.is_configured() {
            return Err(SummaryError::MissingCredential);
        }
        if request.content.trim().is_empty() {
            return Err(SummaryError::EmptyContent);
        }

        let prompt = build_prompt(request.style, request.title.as_deref(), &request.content);
        reader_debug!("summary prompt: {}", clip(&prompt, 200));
        let text = self.model.generate(&prompt).await?;
        let text = text.trim();
        if text.is_empty() {
            return Err(SummaryError::MalformedResponse("empty summary text".into()));
        }
        Ok(text.to_string())
    }
}

pub fn build_prompt(style: SummaryStyle, title: Option<&str>, content: &str) -> String {
    let title = title
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| format!("Title: {t}\n\n"))
        .unwrap_or_default();
    format!(
        "You are an expert content summarizer. Please summarize the following content according to these requirements:

{instructions}

Content to summarize:
{title}{content}

IMPORTANT: Use proper markdown formatting in your response:
- Use **bold** for emphasis and important terms
- Use ## for section headers (if applicable)
- Use - or * for bullet points (if applicable)
- Use proper line breaks and spacing
- Ensure the formatting is clean and readable

Please provide only the summary text in the requested format without any additional formatting, explanations, or meta-commentary. Make sure the summary is well-structured and easy to read.
",
        instructions = style.instructions(),
    )
}
