//! Terminal reader: drives the core state machine for `zenread read` and
//! `zenread voices`.

use std::io::BufRead;
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use zenread_core::{
    update, AppState, AppViewModel, Msg, Screen, SpeechBackend, SpeechController, SpeechError,
    SpeechState, SummaryKind, Voice,
};
use zenread_engine::{
    ArticlePipeline, EngineHandle, GeminiModel, Html2MdConverter, Summarizer, SummaryError,
};
use zenread_logging::{reader_debug, reader_info, reader_warn};

use super::effects::EffectRunner;
use super::speech::EspeakBackend;
use super::ui::render;
use crate::config::AppConfig;

/// Fetch and summary calls carry their own timeouts; this only guards
/// against an engine that stopped answering altogether.
const ENGINE_SILENCE_LIMIT: Duration = Duration::from_secs(180);
const POLL_INTERVAL: Duration = Duration::from_millis(100);
const RATE_STEP: f32 = 0.25;

#[derive(Debug, thiserror::Error)]
pub enum ReaderError {
    #[error("{0}")]
    Article(String),
    #[error(transparent)]
    Speech(#[from] SpeechError),
    #[error("could not set up the summary client: {0}")]
    Summary(#[from] SummaryError),
    #[error("no response from the reader engine")]
    EngineSilent,
}

#[derive(Debug, Clone, Default)]
pub struct ReadOptions {
    pub url: String,
    pub summaries: Vec<SummaryKind>,
    pub speak: bool,
    pub voice: Option<String>,
    pub rate: Option<f32>,
}

/// Engine wired from configuration.
pub fn build_engine(config: &AppConfig) -> Result<EngineHandle, ReaderError> {
    let pipeline = ArticlePipeline::with_settings(config.fetch_settings());
    let model = GeminiModel::new(config.gemini_settings())?;
    let summarizer = Summarizer::new(Arc::new(model));
    Ok(EngineHandle::new(pipeline, Arc::new(summarizer)))
}

fn build_speech(config: &AppConfig) -> SpeechController {
    let backend = EspeakBackend::new(config.speech.program.clone());
    SpeechController::new(Box::new(backend), &config.speech.language)
}

pub fn list_voices(config: &AppConfig) -> Result<Vec<Voice>, ReaderError> {
    let backend = EspeakBackend::new(config.speech.program.clone());
    if !backend.is_supported() {
        return Err(SpeechError::Unsupported.into());
    }
    let speech = SpeechController::new(Box::new(backend), &config.speech.language);
    Ok(speech.voices().to_vec())
}

struct Reader {
    state: AppState,
    runner: EffectRunner,
    msg_rx: mpsc::Receiver<Msg>,
}

impl Reader {
    fn dispatch(&mut self, msg: Msg) -> Option<AppViewModel> {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        self.runner.enqueue(effects);
        let view = state.consume_dirty().then(|| state.view());
        self.state = state;
        view
    }

    /// Pumps engine messages until `done` holds for the current view.
    fn wait_for(&mut self, done: impl Fn(&AppViewModel) -> bool) -> Result<AppViewModel, ReaderError> {
        let mut last_event = Instant::now();
        loop {
            let view = self.state.view();
            if done(&view) {
                return Ok(view);
            }
            match self.msg_rx.recv_timeout(POLL_INTERVAL) {
                Ok(msg) => {
                    last_event = Instant::now();
                    self.dispatch(msg);
                }
                Err(mpsc::RecvTimeoutError::Timeout) => {
                    self.dispatch(Msg::Tick);
                    if last_event.elapsed() > ENGINE_SILENCE_LIMIT {
                        return Err(ReaderError::EngineSilent);
                    }
                }
                Err(mpsc::RecvTimeoutError::Disconnected) => return Err(ReaderError::EngineSilent),
            }
        }
    }
}

pub fn run_reader(config: &AppConfig, options: ReadOptions) -> Result<(), ReaderError> {
    let engine = build_engine(config)?;
    let speech = if options.speak {
        Some(Arc::new(Mutex::new(prepare_speech(config, &options)?)))
    } else {
        None
    };

    let (msg_tx, msg_rx) = mpsc::channel::<Msg>();
    let runner = EffectRunner::new(engine, speech.clone(), msg_tx);
    let mut reader = Reader {
        state: AppState::new(),
        runner,
        msg_rx,
    };
    let converter = Html2MdConverter;

    reader.dispatch(Msg::UrlChanged(options.url.clone()));
    if let Some(view) = reader.dispatch(Msg::UrlSubmitted) {
        eprintln!("{}", render::render_url_entry(&view));
    }
    let view = reader.wait_for(|view| !view.loading)?;
    if view.screen != Screen::Reader {
        let message = view
            .error
            .unwrap_or_else(|| "Failed to extract article".to_string());
        return Err(ReaderError::Article(message));
    }
    println!("{}", render::render(&view, &converter));

    // Several styles go out as one concurrent batch.
    if !options.summaries.is_empty() {
        let msg = Msg::SummariesRequested(options.summaries.clone());
        if let Some(view) = reader.dispatch(msg) {
            eprintln!("{}", render::render_summary(&view.summary));
        }
        let view = reader.wait_for(|view| !view.summary.loading)?;
        println!("\n{}", render::render_summary(&view.summary));
    }

    if let Some(speech) = speech {
        // The latest summary is read aloud; without one, the article itself.
        let text = reader
            .state
            .view()
            .summary
            .last_text()
            .map(str::to_string)
            .or_else(|| {
                reader
                    .state
                    .session()
                    .article()
                    .map(|article| article.text.clone())
            })
            .unwrap_or_default();
        speak_article(&mut reader, &speech, &text)?;
    }
    Ok(())
}

fn prepare_speech(config: &AppConfig, options: &ReadOptions) -> Result<SpeechController, ReaderError> {
    let mut speech = build_speech(config);
    if let Some(voice) = options.voice.as_ref().or(config.speech.voice.as_ref()) {
        speech.set_voice(voice)?;
    }
    speech.set_rate(options.rate.unwrap_or(config.speech.rate));
    speech.on_error(|message| eprintln!("Speech error: {message}"));
    Ok(speech)
}

/// Single-letter commands on stdin while the article is read aloud.
fn speak_article(
    reader: &mut Reader,
    speech: &Arc<Mutex<SpeechController>>,
    text: &str,
) -> Result<(), ReaderError> {
    with_speech(speech, |s| s.speak(text))?;
    eprintln!("Speaking. Commands: p pause, r resume, + faster, - slower, s stop, q back");

    let commands = spawn_stdin_reader();
    loop {
        if let Ok(line) = commands.try_recv() {
            match line.trim() {
                "p" => with_speech(speech, |s| {
                    s.pause();
                    Ok(())
                })?,
                "r" => with_speech(speech, |s| {
                    s.resume();
                    Ok(())
                })?,
                "+" | "-" => {
                    let step = if line.trim() == "+" { RATE_STEP } else { -RATE_STEP };
                    let rate = with_speech(speech, |s| Ok(s.set_rate(s.rate() + step)))?;
                    eprintln!("rate {rate:.2}");
                }
                "s" => with_speech(speech, |s| {
                    s.stop();
                    Ok(())
                })?,
                "q" => {
                    // Back to URL entry; the StopSpeech effect ends playback.
                    reader.dispatch(Msg::BackClicked);
                }
                "" => {}
                other => reader_debug!("ignoring speech command {:?}", other),
            }
        }
        let state = with_speech(speech, |s| {
            s.poll();
            Ok(s.state())
        })?;
        if state == SpeechState::Idle {
            reader_info!("speech done");
            return Ok(());
        }
        thread::sleep(POLL_INTERVAL);
    }
}

fn with_speech<T>(
    speech: &Arc<Mutex<SpeechController>>,
    f: impl FnOnce(&mut SpeechController) -> Result<T, SpeechError>,
) -> Result<T, ReaderError> {
    let mut guard = speech
        .lock()
        .map_err(|_| SpeechError::Backend("speech controller lock poisoned".into()))?;
    Ok(f(&mut guard)?)
}

fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(err) => {
                    reader_warn!("stdin closed: {}", err);
                    break;
                }
            }
        }
    });
    rx
}
