//! Reader core: pure state machine, view-model helpers and the speech
//! controller. Nothing in here performs IO.
mod effect;
mod fonts;
mod msg;
mod speech;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use fonts::{FontFamily, FontPreferences, DEFAULT_FONT_SIZE, MAX_FONT_SIZE, MIN_FONT_SIZE};
pub use msg::{Msg, SummaryText};
pub use speech::{
    clamp_rate, SpeechBackend, SpeechController, SpeechError, SpeechEvent, SpeechState, Utterance,
    Voice, DEFAULT_VOICE_LANG, MAX_RATE, MIN_RATE,
};
pub use state::{AppState, Article, ArticleSession, RequestId, SummaryKind, SummaryPanel};
pub use update::update;
pub use view_model::{AppViewModel, ArticleView, Screen, SummaryEntryView, SummaryPanelView};
