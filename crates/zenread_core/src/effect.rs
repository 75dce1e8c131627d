use crate::{RequestId, SummaryKind};

/// Side effects requested by [`crate::update`]; the app carries them out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    FetchArticle {
        request_id: RequestId,
        url: String,
    },
    GenerateSummary {
        request_id: RequestId,
        content: String,
        title: Option<String>,
        style: SummaryKind,
    },
    /// One `SummaryReady` per style comes back, all with `request_id`.
    GenerateSummaries {
        request_id: RequestId,
        content: String,
        title: Option<String>,
        styles: Vec<SummaryKind>,
    },
    StopSpeech,
}
