use std::fmt;
use std::str::FromStr;

use crate::fonts::FontPreferences;
use crate::SummaryText;

pub type RequestId = u64;

/// Article as the presentation layer sees it. `content` is sanitized HTML;
/// `text` is its plain-text rendition, which is what gets summarized and
/// spoken.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Article {
    pub title: String,
    pub content: String,
    pub text: String,
    pub excerpt: Option<String>,
    pub byline: Option<String>,
    pub site_name: Option<String>,
    pub word_count: u32,
    pub time_to_read_minutes: u32,
}

impl Article {
    /// The reader view needs both a title and a body.
    pub fn is_displayable(&self) -> bool {
        !self.title.trim().is_empty() && !self.content.trim().is_empty()
    }
}

/// Summary styles offered by the UI. The app maps these onto the engine's
/// prompt styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SummaryKind {
    #[default]
    Paragraph,
    BulletPoints,
    Headline,
    SectionWise,
    Short,
    Medium,
    Long,
}

impl SummaryKind {
    pub const ALL: [SummaryKind; 7] = [
        SummaryKind::Paragraph,
        SummaryKind::BulletPoints,
        SummaryKind::Headline,
        SummaryKind::SectionWise,
        SummaryKind::Short,
        SummaryKind::Medium,
        SummaryKind::Long,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SummaryKind::Paragraph => "Paragraph",
            SummaryKind::BulletPoints => "Bullet points",
            SummaryKind::Headline => "Headline",
            SummaryKind::SectionWise => "Section-wise",
            SummaryKind::Short => "Short",
            SummaryKind::Medium => "Medium",
            SummaryKind::Long => "Long",
        }
    }

    fn slug(self) -> &'static str {
        match self {
            SummaryKind::Paragraph => "paragraph",
            SummaryKind::BulletPoints => "bullet-points",
            SummaryKind::Headline => "headline",
            SummaryKind::SectionWise => "section-wise",
            SummaryKind::Short => "short",
            SummaryKind::Medium => "medium",
            SummaryKind::Long => "long",
        }
    }
}

impl fmt::Display for SummaryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for SummaryKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        SummaryKind::ALL
            .into_iter()
            .find(|kind| kind.slug() == wanted)
            .ok_or_else(|| format!("unknown summary style '{s}'"))
    }
}

/// One requested style and, once it answered, its outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryEntry {
    pub(crate) kind: SummaryKind,
    pub(crate) outcome: Option<Result<SummaryText, String>>,
}

/// Summaries for the current article, keyed by style in request order.
/// `pending` stays set until every requested style has answered.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SummaryPanel {
    pub(crate) entries: Vec<SummaryEntry>,
    pub(crate) pending: Option<RequestId>,
}

impl SummaryPanel {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Replaces the panel with `kinds`, all awaiting a response.
    pub(crate) fn start(&mut self, request_id: RequestId, kinds: &[SummaryKind]) {
        self.entries = kinds
            .iter()
            .map(|&kind| SummaryEntry {
                kind,
                outcome: None,
            })
            .collect();
        self.pending = Some(request_id);
    }

    /// Records the answer for `kind`. Returns false when the response does
    /// not belong to the outstanding request.
    pub(crate) fn record(
        &mut self,
        request_id: RequestId,
        kind: SummaryKind,
        outcome: Result<SummaryText, String>,
    ) -> bool {
        if self.pending != Some(request_id) {
            return false;
        }
        let Some(entry) = self
            .entries
            .iter_mut()
            .find(|e| e.kind == kind && e.outcome.is_none())
        else {
            return false;
        };
        entry.outcome = Some(outcome);
        if self.entries.iter().all(|e| e.outcome.is_some()) {
            self.pending = None;
        }
        true
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }
}

/// Everything tied to the article currently being read.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ArticleSession {
    pub(crate) url_input: String,
    pub(crate) loading: bool,
    pub(crate) article: Option<Article>,
    pub(crate) error: Option<String>,
    pub(crate) pending: Option<RequestId>,
    pub(crate) summary: SummaryPanel,
}

impl ArticleSession {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn article(&self) -> Option<&Article> {
        self.article.as_ref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    pub(crate) session: ArticleSession,
    pub(crate) fonts: FontPreferences,
    last_request_id: RequestId,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fonts(fonts: FontPreferences) -> Self {
        Self {
            fonts,
            ..Self::default()
        }
    }

    pub fn session(&self) -> &ArticleSession {
        &self.session
    }

    pub fn fonts(&self) -> FontPreferences {
        self.fonts
    }

    /// Returns and clears the dirty flag. Renderers call this once per tick.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Request ids are never reused, even across back navigation.
    pub(crate) fn next_request_id(&mut self) -> RequestId {
        self.last_request_id += 1;
        self.last_request_id
    }

    pub(crate) fn is_dirty(&self) -> bool {
        self.dirty
    }
}
