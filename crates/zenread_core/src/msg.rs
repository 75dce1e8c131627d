use crate::{Article, FontFamily, RequestId, SummaryKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryText {
    pub text: String,
    pub word_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User edited the URL input box.
    UrlChanged(String),
    /// User submitted the current URL input.
    UrlSubmitted,
    /// Engine finished a fetch; `Err` holds a user-facing message.
    ArticleLoaded {
        request_id: RequestId,
        outcome: Result<Article, String>,
    },
    /// User left the reader view.
    BackClicked,
    SummaryRequested(SummaryKind),
    /// Several styles at once; answered concurrently under one request id.
    SummariesRequested(Vec<SummaryKind>),
    SummaryReady {
        request_id: RequestId,
        kind: SummaryKind,
        outcome: Result<SummaryText, String>,
    },
    FontSizeChanged(u16),
    FontFamilyChanged(FontFamily),
    FontReset,
    /// Render tick used to coalesce repaints.
    Tick,
    NoOp,
}
