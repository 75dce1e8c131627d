use zenread_logging::{reader_debug, reader_info};

use crate::{AppState, Effect, Msg, SummaryKind};

const EXTRACTION_FAILED: &str = "Failed to extract article";

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::UrlChanged(text) => {
            if state.session.url_input != text {
                state.session.url_input = text;
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::UrlSubmitted => {
            let url = state.session.url_input.trim().to_string();
            if url.is_empty() {
                return (state, Vec::new());
            }
            // A second submit while loading supersedes the first one.
            let request_id = state.next_request_id();
            let session = &mut state.session;
            session.loading = true;
            session.error = None;
            session.pending = Some(request_id);
            reader_info!("fetch #{} {}", request_id, url);
            state.mark_dirty();
            vec![Effect::FetchArticle { request_id, url }]
        }
        Msg::ArticleLoaded {
            request_id,
            outcome,
        } => {
            let session = &mut state.session;
            if session.pending != Some(request_id) {
                reader_debug!("dropping stale article response #{}", request_id);
                return (state, Vec::new());
            }
            session.pending = None;
            session.loading = false;
            session.summary.reset();
            match outcome {
                Ok(article) if article.is_displayable() => {
                    session.article = Some(article);
                    session.error = None;
                }
                Ok(_) => {
                    session.article = None;
                    session.error = Some(EXTRACTION_FAILED.to_string());
                }
                Err(message) => {
                    session.article = None;
                    session.error = Some(message);
                }
            }
            state.mark_dirty();
            Vec::new()
        }
        Msg::BackClicked => {
            state.session.reset();
            state.mark_dirty();
            vec![Effect::StopSpeech]
        }
        Msg::SummaryRequested(kind) => request_summaries(&mut state, vec![kind]),
        Msg::SummariesRequested(kinds) => request_summaries(&mut state, kinds),
        Msg::SummaryReady {
            request_id,
            kind,
            outcome,
        } => {
            if !state.session.summary.record(request_id, kind, outcome) {
                reader_debug!("dropping stale {} summary response #{}", kind, request_id);
                return (state, Vec::new());
            }
            state.mark_dirty();
            Vec::new()
        }
        Msg::FontSizeChanged(size) => {
            if state.fonts.set_size(size) {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::FontFamilyChanged(family) => {
            if state.fonts.set_family(family) {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::FontReset => {
            if state.fonts.reset() {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

/// Ignored without an article. Repeated styles are requested once.
fn request_summaries(state: &mut AppState, requested: Vec<SummaryKind>) -> Vec<Effect> {
    let Some(article) = state.session.article.as_ref() else {
        return Vec::new();
    };
    let mut kinds: Vec<SummaryKind> = Vec::with_capacity(requested.len());
    for kind in requested {
        if !kinds.contains(&kind) {
            kinds.push(kind);
        }
    }
    if kinds.is_empty() {
        return Vec::new();
    }
    let content = article.text.clone();
    let title = Some(article.title.clone()).filter(|t| !t.trim().is_empty());
    let request_id = state.next_request_id();
    state.session.summary.start(request_id, &kinds);
    state.mark_dirty();

    match kinds.as_slice() {
        [style] => vec![Effect::GenerateSummary {
            request_id,
            content,
            title,
            style: *style,
        }],
        _ => vec![Effect::GenerateSummaries {
            request_id,
            content,
            title,
            styles: kinds,
        }],
    }
}
