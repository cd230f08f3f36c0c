//! Speech subsystem: one utterance at a time, replayed after backgrounding.

use tracing::{debug, info, warn};

use crate::locale::Locale;
use crate::platform::{QueueMode, SpeechEngine, Utterance};

/// Process-wide voice parameters. Not configurable per request.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Voice {
    pub pitch: f32,
    pub rate: f32,
    /// Engine language, applied once when the engine becomes ready.
    pub locale: Locale,
}

impl Default for Voice {
    fn default() -> Self {
        Self {
            pitch: 1.0,
            rate: 1.8,
            locale: Locale::Japanese,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SpeechSession {
    pub text: String,
    pub volume: f32,
    pub ready: bool,
}

impl Default for SpeechSession {
    fn default() -> Self {
        Self {
            text: String::new(),
            volume: 1.0,
            ready: false,
        }
    }
}

pub struct SpeechSubsystem {
    engine: Box<dyn SpeechEngine>,
    voice: Voice,
    session: SpeechSession,
}

impl SpeechSubsystem {
    pub fn new(engine: Box<dyn SpeechEngine>, voice: Voice) -> Self {
        Self {
            engine,
            voice,
            session: SpeechSession::default(),
        }
    }

    /// Kick off asynchronous engine setup. Does not wait for it.
    pub fn initialize(&mut self) {
        self.engine.initialize();
    }

    /// Engine-init callback. A failed init leaves every request a silent no-op.
    pub fn on_engine_ready(&mut self, success: bool) {
        if !success {
            warn!("speech engine failed to initialize; speech disabled");
            return;
        }
        if self.engine.is_language_available(self.voice.locale) {
            self.engine.set_language(self.voice.locale);
        }
        self.session.ready = true;
        info!("speech engine ready");
    }

    pub fn session(&self) -> &SpeechSession {
        &self.session
    }

    /// Replace whatever is being spoken with `text`.
    pub fn speak(&mut self, text: String, volume: f32) {
        if !self.session.ready {
            debug!("speech engine not ready; dropping utterance");
            return;
        }
        self.session.text = text;
        self.session.volume = volume;
        self.issue(self.session.text.clone(), volume);
    }

    /// Stop speaking and forget the text.
    pub fn cancel(&mut self) {
        self.speak(String::new(), 1.0);
    }

    /// Silence the engine but keep the text for resume-replay.
    pub fn flush(&mut self) {
        if self.session.ready {
            self.issue(String::new(), self.session.volume);
        }
    }

    /// Re-speak the preserved text at the preserved volume.
    pub fn replay(&mut self) {
        if self.session.text.is_empty() {
            return;
        }
        let text = self.session.text.clone();
        let volume = self.session.volume;
        self.speak(text, volume);
    }

    pub fn shutdown(&mut self) {
        self.session.ready = false;
        self.engine.shutdown();
    }

    fn issue(&mut self, text: String, volume: f32) {
        let utterance = Utterance {
            text,
            volume,
            pitch: self.voice.pitch,
            rate: self.voice.rate,
        };
        self.engine.speak(utterance, QueueMode::Flush);
    }
}
