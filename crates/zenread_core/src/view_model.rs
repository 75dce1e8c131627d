use crate::state::SummaryEntry;
use crate::{AppState, Article, FontPreferences, SummaryKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    UrlEntry,
    Reader,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleView {
    pub title: String,
    pub content: String,
    pub byline: Option<String>,
    pub site_name: Option<String>,
    pub excerpt: Option<String>,
    pub word_count: u32,
    pub time_to_read_minutes: u32,
}

impl From<&Article> for ArticleView {
    fn from(article: &Article) -> Self {
        Self {
            title: article.title.clone(),
            content: article.content.clone(),
            byline: article.byline.clone(),
            site_name: article.site_name.clone(),
            excerpt: article.excerpt.clone(),
            word_count: article.word_count,
            time_to_read_minutes: article.time_to_read_minutes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SummaryEntryView {
    pub kind: SummaryKind,
    pub loading: bool,
    pub text: Option<String>,
    pub word_count: u32,
    pub error: Option<String>,
}

impl From<&SummaryEntry> for SummaryEntryView {
    fn from(entry: &SummaryEntry) -> Self {
        let mut view = Self {
            kind: entry.kind,
            loading: entry.outcome.is_none(),
            ..Self::default()
        };
        match &entry.outcome {
            Some(Ok(summary)) => {
                view.text = Some(summary.text.clone());
                view.word_count = summary.word_count;
            }
            Some(Err(message)) => view.error = Some(message.clone()),
            None => {}
        }
        view
    }
}

/// Empty `entries` means no summary was requested for this article.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SummaryPanelView {
    pub loading: bool,
    pub entries: Vec<SummaryEntryView>,
}

impl SummaryPanelView {
    pub fn entry(&self, kind: SummaryKind) -> Option<&SummaryEntryView> {
        self.entries.iter().find(|e| e.kind == kind)
    }

    /// Text of the last requested style that produced one.
    pub fn last_text(&self) -> Option<&str> {
        self.entries.iter().rev().find_map(|e| e.text.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub screen: Screen,
    pub url_input: String,
    pub loading: bool,
    pub error: Option<String>,
    pub article: Option<ArticleView>,
    pub summary: SummaryPanelView,
    pub fonts: FontPreferences,
    pub dirty: bool,
}

impl AppState {
    pub fn view(&self) -> AppViewModel {
        let session = self.session();
        let article = session
            .article()
            .filter(|a| a.is_displayable())
            .map(ArticleView::from);
        let panel = &session.summary;
        AppViewModel {
            screen: if article.is_some() {
                Screen::Reader
            } else {
                Screen::UrlEntry
            },
            url_input: session.url_input.clone(),
            loading: session.loading,
            error: session.error.clone(),
            article,
            summary: SummaryPanelView {
                loading: panel.is_loading(),
                entries: panel.entries.iter().map(SummaryEntryView::from).collect(),
            },
            fonts: self.fonts(),
            dirty: self.is_dirty(),
        }
    }
}
