//! Text-to-speech playback control.
//!
//! [`SpeechController`] owns the single active utterance and enforces the
//! `Idle -> Speaking -> Paused` state machine. The platform engine sits
//! behind [`SpeechBackend`], which is polled for completion events rather
//! than calling back into the controller.

use zenread_logging::{reader_debug, reader_info, reader_warn};

pub const MIN_RATE: f32 = 0.1;
pub const MAX_RATE: f32 = 10.0;
pub const DEFAULT_VOICE_LANG: &str = "en";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voice {
    pub id: String,
    pub name: String,
    /// BCP 47 style tag, e.g. `en-US`.
    pub lang: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    pub voice: Option<String>,
    pub rate: f32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechEvent {
    Finished,
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpeechState {
    #[default]
    Idle,
    Speaking,
    Paused,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SpeechError {
    #[error("speech synthesis is not available on this system")]
    Unsupported,
    #[error("unknown voice '{0}'")]
    UnknownVoice(String),
    #[error("speech backend failed: {0}")]
    Backend(String),
}

pub trait SpeechBackend: Send {
    fn is_supported(&self) -> bool;
    fn voices(&self) -> Vec<Voice>;
    fn start(&mut self, utterance: &Utterance) -> Result<(), SpeechError>;
    fn cancel(&mut self);
    fn pause(&mut self) -> Result<(), SpeechError>;
    fn resume(&mut self) -> Result<(), SpeechError>;
    /// Applies a new rate to the utterance in flight.
    fn set_rate(&mut self, rate: f32) -> Result<(), SpeechError>;
    fn poll(&mut self) -> Option<SpeechEvent>;
}

pub fn clamp_rate(rate: f32) -> f32 {
    if rate.is_nan() {
        return 1.0;
    }
    rate.clamp(MIN_RATE, MAX_RATE)
}

type ErrorCallback = Box<dyn FnMut(&str) + Send>;

pub struct SpeechController {
    backend: Box<dyn SpeechBackend>,
    state: SpeechState,
    voices: Vec<Voice>,
    selected_voice: Option<String>,
    rate: f32,
    on_error: Option<ErrorCallback>,
}

impl SpeechController {
    /// Loads the backend's voices, keeping those whose language starts with
    /// `lang_prefix`, and selects the first one.
    pub fn new(backend: Box<dyn SpeechBackend>, lang_prefix: &str) -> Self {
        let prefix = lang_prefix.to_ascii_lowercase();
        let voices: Vec<Voice> = backend
            .voices()
            .into_iter()
            .filter(|v| v.lang.to_ascii_lowercase().starts_with(&prefix))
            .collect();
        let selected_voice = voices.first().map(|v| v.id.clone());
        reader_debug!(
            "speech: {} voices for '{}', selected {:?}",
            voices.len(),
            lang_prefix,
            selected_voice
        );
        Self {
            backend,
            state: SpeechState::Idle,
            voices,
            selected_voice,
            rate: 1.0,
            on_error: None,
        }
    }

    pub fn state(&self) -> SpeechState {
        self.state
    }

    pub fn is_speaking(&self) -> bool {
        self.state == SpeechState::Speaking
    }

    pub fn is_paused(&self) -> bool {
        self.state == SpeechState::Paused
    }

    pub fn voices(&self) -> &[Voice] {
        &self.voices
    }

    pub fn selected_voice(&self) -> Option<&str> {
        self.selected_voice.as_deref()
    }

    pub fn rate(&self) -> f32 {
        self.rate
    }

    pub fn on_error(&mut self, callback: impl FnMut(&str) + Send + 'static) {
        self.on_error = Some(Box::new(callback));
    }

    pub fn speak(&mut self, text: &str) -> Result<(), SpeechError> {
        if text.trim().is_empty() {
            return Ok(());
        }
        if !self.backend.is_supported() {
            let err = SpeechError::Unsupported;
            self.report(&err.to_string());
            return Err(err);
        }
        if self.state != SpeechState::Idle {
            self.backend.cancel();
            self.state = SpeechState::Idle;
        }
        let utterance = Utterance {
            text: text.to_string(),
            voice: self.selected_voice.clone(),
            rate: self.rate,
        };
        match self.backend.start(&utterance) {
            Ok(()) => {
                reader_info!(
                    "speech started: {} chars, voice {:?}, rate {}",
                    utterance.text.chars().count(),
                    utterance.voice,
                    utterance.rate
                );
                self.state = SpeechState::Speaking;
                Ok(())
            }
            Err(err) => {
                self.report(&err.to_string());
                Err(err)
            }
        }
    }

    pub fn pause(&mut self) {
        if self.state != SpeechState::Speaking {
            return;
        }
        match self.backend.pause() {
            Ok(()) => self.state = SpeechState::Paused,
            Err(err) => self.fail(&err.to_string()),
        }
    }

    pub fn resume(&mut self) {
        if self.state != SpeechState::Paused {
            return;
        }
        match self.backend.resume() {
            Ok(()) => self.state = SpeechState::Speaking,
            Err(err) => self.fail(&err.to_string()),
        }
    }

    pub fn stop(&mut self) {
        if self.state != SpeechState::Idle {
            self.backend.cancel();
            reader_debug!("speech stopped");
        }
        self.state = SpeechState::Idle;
    }

    pub fn set_voice(&mut self, id: &str) -> Result<(), SpeechError> {
        if !self.voices.iter().any(|v| v.id == id) {
            return Err(SpeechError::UnknownVoice(id.to_string()));
        }
        self.selected_voice = Some(id.to_string());
        Ok(())
    }

    /// Clamps into `[MIN_RATE, MAX_RATE]`. Returns the stored rate.
    pub fn set_rate(&mut self, rate: f32) -> f32 {
        self.rate = clamp_rate(rate);
        if self.state == SpeechState::Speaking {
            if let Err(err) = self.backend.set_rate(self.rate) {
                self.report(&err.to_string());
            }
        }
        self.rate
    }

    /// Drains one backend event and advances the state machine.
    pub fn poll(&mut self) -> Option<SpeechEvent> {
        if self.state == SpeechState::Idle {
            return None;
        }
        let event = self.backend.poll()?;
        match &event {
            SpeechEvent::Finished => {
                reader_debug!("speech finished");
                self.state = SpeechState::Idle;
            }
            SpeechEvent::Failed(message) => self.fail(message),
        }
        Some(event)
    }

    fn fail(&mut self, message: &str) {
        self.backend.cancel();
        self.state = SpeechState::Idle;
        self.report(message);
    }

    fn report(&mut self, message: &str) {
        reader_warn!("speech error: {}", message);
        if let Some(callback) = self.on_error.as_mut() {
            callback(message);
        }
    }
}

impl Drop for SpeechController {
    fn drop(&mut self) {
        self.stop();
    }
}
