use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

use zenread_core::{Article, Effect, Msg, SpeechController, SummaryKind, SummaryText};
use zenread_engine::{
    plain_text, ArticleResult, EngineEvent, EngineHandle, SummaryFormat, SummaryLength,
    SummaryRequest, SummaryResult, SummaryStyle,
};
use zenread_logging::{reader_debug, reader_info, reader_warn};

use crate::server::ApiError;

/// Carries out core effects on the engine and feeds completions back as
/// [`Msg`]s.
pub struct EffectRunner {
    engine: EngineHandle,
    speech: Option<Arc<Mutex<SpeechController>>>,
}

impl EffectRunner {
    pub fn new(
        engine: EngineHandle,
        speech: Option<Arc<Mutex<SpeechController>>>,
        msg_tx: mpsc::Sender<Msg>,
    ) -> Self {
        let runner = Self { engine, speech };
        runner.spawn_event_loop(msg_tx);
        runner
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::FetchArticle { request_id, url } => {
                    reader_info!("FetchArticle #{} {}", request_id, url);
                    self.engine.fetch_article(request_id, url);
                }
                Effect::GenerateSummary {
                    request_id,
                    content,
                    title,
                    style,
                } => {
                    reader_info!(
                        "GenerateSummary #{} style={} chars={}",
                        request_id,
                        style,
                        content.len()
                    );
                    self.engine.summarize(
                        request_id,
                        SummaryRequest {
                            content,
                            style: summary_style(style),
                            title,
                        },
                    );
                }
                Effect::GenerateSummaries {
                    request_id,
                    content,
                    title,
                    styles,
                } => {
                    reader_info!(
                        "GenerateSummaries #{} styles={} chars={}",
                        request_id,
                        styles.len(),
                        content.len()
                    );
                    let styles = styles.into_iter().map(summary_style).collect();
                    self.engine.summarize_batch(request_id, content, title, styles);
                }
                Effect::StopSpeech => {
                    if let Some(speech) = &self.speech {
                        match speech.lock() {
                            Ok(mut speech) => speech.stop(),
                            Err(_) => reader_warn!("speech controller lock poisoned"),
                        }
                    }
                }
            }
        }
    }

    fn spawn_event_loop(&self, msg_tx: mpsc::Sender<Msg>) {
        let engine = self.engine.clone();
        thread::spawn(move || loop {
            match engine.recv_timeout(Duration::from_millis(50)) {
                Some(event) => {
                    if msg_tx.send(event_to_msg(event)).is_err() {
                        reader_debug!("message channel closed; engine event loop exits");
                        break;
                    }
                }
                None => thread::sleep(Duration::from_millis(20)),
            }
        });
    }
}

pub fn event_to_msg(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::ArticleReady { request_id, result } => Msg::ArticleLoaded {
            request_id,
            outcome: result.map(map_article).map_err(|err| {
                reader_warn!("article #{} failed: {}", request_id, err);
                ApiError::from(err).message
            }),
        },
        EngineEvent::SummaryReady { request_id, result } => Msg::SummaryReady {
            request_id,
            kind: summary_kind(result.style),
            outcome: map_summary(result),
        },
    }
}

fn map_article(article: ArticleResult) -> Article {
    Article {
        text: plain_text(&article.content),
        title: article.title,
        content: article.content,
        excerpt: article.excerpt,
        byline: article.byline,
        site_name: article.site_name,
        word_count: article.word_count,
        time_to_read_minutes: article.time_to_read_minutes,
    }
}

fn map_summary(result: SummaryResult) -> Result<SummaryText, String> {
    match result.error {
        Some(err) => Err(err.to_string()),
        None => Ok(SummaryText {
            text: result.summary_text,
            word_count: result.word_count,
        }),
    }
}

pub fn summary_style(kind: SummaryKind) -> SummaryStyle {
    match kind {
        SummaryKind::Paragraph => SummaryStyle::Format(SummaryFormat::Paragraph),
        SummaryKind::BulletPoints => SummaryStyle::Format(SummaryFormat::BulletPoints),
        SummaryKind::Headline => SummaryStyle::Format(SummaryFormat::Headline),
        SummaryKind::SectionWise => SummaryStyle::Format(SummaryFormat::SectionWise),
        SummaryKind::Short => SummaryStyle::Length(SummaryLength::Short),
        SummaryKind::Medium => SummaryStyle::Length(SummaryLength::Medium),
        SummaryKind::Long => SummaryStyle::Length(SummaryLength::Long),
    }
}

pub fn summary_kind(style: SummaryStyle) -> SummaryKind {
    match style {
        SummaryStyle::Format(SummaryFormat::Paragraph) => SummaryKind::Paragraph,
        SummaryStyle::Format(SummaryFormat::BulletPoints) => SummaryKind::BulletPoints,
        SummaryStyle::Format(SummaryFormat::Headline) => SummaryKind::Headline,
        SummaryStyle::Format(SummaryFormat::SectionWise) => SummaryKind::SectionWise,
        SummaryStyle::Length(SummaryLength::Short) => SummaryKind::Short,
        SummaryStyle::Length(SummaryLength::Medium) => SummaryKind::Medium,
        SummaryStyle::Length(SummaryLength::Long) => SummaryKind::Long,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use zenread_engine::{FailureKind, FetchError, ParseError, SummaryError};

    use super::*;

    #[test]
    fn every_kind_maps_to_the_same_slug() {
        for kind in SummaryKind::ALL {
            assert_eq!(summary_style(kind).slug(), kind.to_string());
            assert_eq!(summary_kind(summary_style(kind)), kind);
        }
    }

    #[test]
    fn access_denied_becomes_user_message() {
        let msg = event_to_msg(EngineEvent::ArticleReady {
            request_id: 9,
            result: Err(ParseError::Fetch(FetchError {
                kind: FailureKind::AccessDenied,
                message: String::new(),
            })),
        });
        assert_eq!(
            msg,
            Msg::ArticleLoaded {
                request_id: 9,
                outcome: Err(zenread_engine::ACCESS_DENIED_MESSAGE.to_string()),
            }
        );
    }

    #[test]
    fn summary_error_becomes_message() {
        let msg = event_to_msg(EngineEvent::SummaryReady {
            request_id: 2,
            result: SummaryResult {
                style: SummaryStyle::Length(SummaryLength::Long),
                summary_text: String::new(),
                word_count: 0,
                error: Some(SummaryError::MissingCredential),
            },
        });
        assert_eq!(
            msg,
            Msg::SummaryReady {
                request_id: 2,
                kind: SummaryKind::Long,
                outcome: Err("GEMINI_API_KEY is not configured".to_string()),
            }
        );
    }

    #[test]
    fn batch_events_fill_every_requested_style() {
        use zenread_core::{update, AppState};

        let (state, _) = update(AppState::new(), Msg::UrlChanged("https://a.example".into()));
        let (state, _) = update(state, Msg::UrlSubmitted);
        let (state, _) = update(
            state,
            Msg::ArticleLoaded {
                request_id: 1,
                outcome: Ok(Article {
                    title: "T".into(),
                    content: "<p>Body</p>".into(),
                    text: "Body".into(),
                    ..Article::default()
                }),
            },
        );
        let (mut state, effects) = update(
            state,
            Msg::SummariesRequested(vec![SummaryKind::Headline, SummaryKind::Short]),
        );
        let request_id = match effects.as_slice() {
            [Effect::GenerateSummaries { request_id, .. }] => *request_id,
            other => panic!("expected a batch, got {other:?}"),
        };

        for (style, text) in [
            (SummaryStyle::Length(SummaryLength::Short), "Short take."),
            (SummaryStyle::Format(SummaryFormat::Headline), "Big news"),
        ] {
            let msg = event_to_msg(EngineEvent::SummaryReady {
                request_id,
                result: SummaryResult {
                    style,
                    summary_text: text.to_string(),
                    word_count: 2,
                    error: None,
                },
            });
            state = update(state, msg).0;
        }

        let summary = state.view().summary;
        assert!(!summary.loading);
        let texts: Vec<_> = summary.entries.iter().map(|e| e.text.clone()).collect();
        assert_eq!(
            texts,
            vec![Some("Big news".to_string()), Some("Short take.".to_string())]
        );
    }

    #[test]
    fn article_text_is_plain() {
        let article = map_article(ArticleResult {
            title: "T".into(),
            content: "<p>Hello <b>world</b></p>".into(),
            word_count: 2,
            ..ArticleResult::default()
        });
        assert_eq!(article.text, "Hello world");
    }
}
