//! A platform with no devices: every effect is logged and recorded.
//!
//! Used by the `gekitai-host` binary and by the integration tests. Platform
//! callbacks that a real device would deliver later (engine readiness,
//! permission answers, dialog buttons) are posted back through a
//! [`HostHandle`] according to [`HeadlessOptions`].

use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::debug;

use crate::bridge::{HostEvent, HostHandle};
use crate::dialog::DialogResponse;
use crate::error::Permission;
use crate::locale::{BuiltinCatalog, Locale};
use crate::platform::{
    AmbientChannel, Amplitude, ContentHost, DialogOrigin, DialogPresenter, DialogSpec, HostSignal,
    NoticeDuration, Notifier, PermissionService, Platform, QueueMode, SettingsStore, Snackbar,
    SpeechEngine, Utterance, VibratorDevice,
};

/// One observable platform effect.
#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    SpeechInit,
    SpeechLanguage(Locale),
    Speak(Utterance),
    SpeechShutdown,
    Vibrate { length_ms: u64, amplitude: Amplitude },
    VibrateCancel,
    VolumeWrite(i32),
    BrightnessWrite(i32),
    Toast { text: String, duration: NoticeDuration },
    ToastCancel,
    Snackbar(Snackbar),
    SnackbarDismiss,
    Dialog(DialogSpec),
    DialogDismiss,
    PermissionRequest(Permission),
    SettingsCleared,
    ContentResume,
    ContentPause,
    ContentDestroy,
    ContentSignal(HostSignal),
}

/// Shared, ordered record of effects.
#[derive(Clone, Default)]
pub struct EffectLog(Arc<Mutex<Vec<Effect>>>);

impl EffectLog {
    fn lock(&self) -> MutexGuard<'_, Vec<Effect>> {
        // A panicking test thread must not hide the effects recorded so far.
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn record(&self, effect: Effect) {
        debug!(target: "gekitai::headless", ?effect);
        self.lock().push(effect);
    }

    pub fn snapshot(&self) -> Vec<Effect> {
        self.lock().clone()
    }

    /// Return and forget everything recorded so far.
    pub fn take(&self) -> Vec<Effect> {
        std::mem::take(&mut *self.lock())
    }

    pub fn count(&self, pred: impl Fn(&Effect) -> bool) -> usize {
        self.lock().iter().filter(|e| pred(e)).count()
    }
}

/// How the headless dialog presenter answers.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum DialogAnswer {
    /// Leave dialogs up; the test posts `DialogResolved` itself.
    Manual,
    /// Press OK immediately, keeping any prompt default.
    Positive,
    /// Press Cancel immediately (OK for alerts).
    Negative,
}

#[derive(Clone, Debug)]
pub struct HeadlessOptions {
    /// `Some(result)` reports engine readiness right after initialization.
    pub speech_ready: Option<bool>,
    pub speech_language_available: bool,
    pub has_vibrator: bool,
    pub amplitude_control: bool,
    pub permission_granted: bool,
    pub show_rationale: bool,
    /// `Some(answer)` answers permission requests immediately.
    pub permission_answer: Option<bool>,
    pub dialog_answer: DialogAnswer,
    pub volume: i32,
    pub volume_max: i32,
    pub brightness: i32,
    pub brightness_max: i32,
}

impl Default for HeadlessOptions {
    fn default() -> Self {
        Self {
            speech_ready: Some(true),
            speech_language_available: true,
            has_vibrator: true,
            amplitude_control: true,
            permission_granted: true,
            show_rationale: false,
            permission_answer: None,
            dialog_answer: DialogAnswer::Manual,
            volume: 7,
            volume_max: 15,
            // Window brightness "unset" is -1 until overridden.
            brightness: -1,
            brightness_max: 255,
        }
    }
}

/// Handles a test keeps to inspect and steer the headless devices.
#[derive(Clone)]
pub struct Headless {
    pub log: EffectLog,
    pub granted: Arc<AtomicBool>,
    pub volume: Arc<AtomicI32>,
    pub brightness: Arc<AtomicI32>,
}

impl Headless {
    /// Build a headless [`Platform`] whose callbacks are posted to `host`.
    pub fn platform(options: &HeadlessOptions, host: &HostHandle) -> (Platform, Headless) {
        let log = EffectLog::default();
        let granted = Arc::new(AtomicBool::new(options.permission_granted));
        let volume = Arc::new(AtomicI32::new(options.volume));
        let brightness = Arc::new(AtomicI32::new(options.brightness));

        let platform = Platform {
            speech: Box::new(HeadlessSpeech {
                log: log.clone(),
                host: host.clone(),
                ready: options.speech_ready,
                language_available: options.speech_language_available,
            }),
            vibrator: Box::new(HeadlessVibrator {
                log: log.clone(),
                present: options.has_vibrator,
                amplitude_control: options.amplitude_control,
            }),
            volume: Box::new(HeadlessChannel {
                log: log.clone(),
                value: Arc::clone(&volume),
                max: options.volume_max,
                effect: Effect::VolumeWrite,
            }),
            brightness: Box::new(HeadlessChannel {
                log: log.clone(),
                value: Arc::clone(&brightness),
                max: options.brightness_max,
                effect: Effect::BrightnessWrite,
            }),
            notifier: Box::new(HeadlessNotifier { log: log.clone() }),
            dialogs: Box::new(HeadlessDialogs {
                log: log.clone(),
                host: host.clone(),
                answer: options.dialog_answer,
            }),
            permissions: Box::new(HeadlessPermissions {
                log: log.clone(),
                host: host.clone(),
                granted: Arc::clone(&granted),
                rationale: options.show_rationale,
                answer: options.permission_answer,
            }),
            settings: Box::new(HeadlessSettings { log: log.clone() }),
            strings: Box::new(BuiltinCatalog),
        };

        (
            platform,
            Headless {
                log,
                granted,
                volume,
                brightness,
            },
        )
    }

    pub fn content(&self) -> HeadlessContent {
        HeadlessContent {
            log: self.log.clone(),
            accepts_signals: true,
        }
    }
}

struct HeadlessSpeech {
    log: EffectLog,
    host: HostHandle,
    ready: Option<bool>,
    language_available: bool,
}

impl SpeechEngine for HeadlessSpeech {
    fn initialize(&mut self) {
        self.log.record(Effect::SpeechInit);
        if let Some(ready) = self.ready {
            let _ = self.host.post(HostEvent::SpeechEngineReady(ready));
        }
    }

    fn is_language_available(&self, _locale: Locale) -> bool {
        self.language_available
    }

    fn set_language(&mut self, locale: Locale) {
        self.log.record(Effect::SpeechLanguage(locale));
    }

    fn speak(&mut self, utterance: Utterance, _mode: QueueMode) {
        self.log.record(Effect::Speak(utterance));
    }

    fn shutdown(&mut self) {
        self.log.record(Effect::SpeechShutdown);
    }
}

struct HeadlessVibrator {
    log: EffectLog,
    present: bool,
    amplitude_control: bool,
}

impl VibratorDevice for HeadlessVibrator {
    fn has_vibrator(&self) -> bool {
        self.present
    }

    fn has_amplitude_control(&self) -> bool {
        self.amplitude_control
    }

    fn vibrate(&mut self, length_ms: u64, amplitude: Amplitude) {
        self.log.record(Effect::Vibrate { length_ms, amplitude });
    }

    fn cancel(&mut self) {
        self.log.record(Effect::VibrateCancel);
    }
}

struct HeadlessChannel {
    log: EffectLog,
    value: Arc<AtomicI32>,
    max: i32,
    effect: fn(i32) -> Effect,
}

impl AmbientChannel for HeadlessChannel {
    fn read(&self) -> i32 {
        self.value.load(Ordering::SeqCst)
    }

    fn write(&mut self, value: i32) {
        self.value.store(value, Ordering::SeqCst);
        self.log.record((self.effect)(value));
    }

    fn maximum(&self) -> i32 {
        self.max
    }
}

struct HeadlessNotifier {
    log: EffectLog,
}

impl Notifier for HeadlessNotifier {
    fn show_toast(&mut self, text: &str, duration: NoticeDuration) {
        self.log.record(Effect::Toast {
            text: text.to_owned(),
            duration,
        });
    }

    fn cancel_toast(&mut self) {
        self.log.record(Effect::ToastCancel);
    }

    fn show_snackbar(&mut self, snackbar: Snackbar) {
        self.log.record(Effect::Snackbar(snackbar));
    }

    fn dismiss_snackbar(&mut self) {
        self.log.record(Effect::SnackbarDismiss);
    }
}

struct HeadlessDialogs {
    log: EffectLog,
    host: HostHandle,
    answer: DialogAnswer,
}

impl DialogPresenter for HeadlessDialogs {
    fn present(&mut self, spec: DialogSpec) {
        let origin = spec.origin;
        let response = match self.answer {
            DialogAnswer::Manual => None,
            DialogAnswer::Positive => Some(DialogResponse::Positive {
                input: spec.input.clone(),
            }),
            DialogAnswer::Negative if spec.negative_label.is_some() => {
                Some(DialogResponse::Negative)
            }
            DialogAnswer::Negative => Some(DialogResponse::Positive { input: None }),
        };
        self.log.record(Effect::Dialog(spec));
        let Some(response) = response else {
            return;
        };
        let event = match origin {
            DialogOrigin::Content => HostEvent::DialogResolved(response),
            DialogOrigin::Rationale => HostEvent::RationaleAcknowledged,
        };
        let _ = self.host.post(event);
    }

    fn dismiss(&mut self) {
        self.log.record(Effect::DialogDismiss);
    }
}

struct HeadlessPermissions {
    log: EffectLog,
    host: HostHandle,
    granted: Arc<AtomicBool>,
    rationale: bool,
    answer: Option<bool>,
}

impl PermissionService for HeadlessPermissions {
    fn is_granted(&self, _permission: Permission) -> bool {
        self.granted.load(Ordering::SeqCst)
    }

    fn should_show_rationale(&self, _permission: Permission) -> bool {
        self.rationale
    }

    fn request(&mut self, permission: Permission) {
        self.log.record(Effect::PermissionRequest(permission));
        if let Some(granted) = self.answer {
            self.granted.store(granted, Ordering::SeqCst);
            let _ = self.host.post(HostEvent::PermissionResult { permission, granted });
        }
    }
}

struct HeadlessSettings {
    log: EffectLog,
}

impl SettingsStore for HeadlessSettings {
    fn clear(&mut self) -> anyhow::Result<()> {
        self.log.record(Effect::SettingsCleared);
        Ok(())
    }
}

/// Content stand-in that records what the coordinator asked of it.
pub struct HeadlessContent {
    log: EffectLog,
    accepts_signals: bool,
}

impl HeadlessContent {
    /// Content that never receives signals, like a renderer with no page loaded.
    pub fn deaf(mut self) -> Self {
        self.accepts_signals = false;
        self
    }
}

impl ContentHost for HeadlessContent {
    fn resume(&mut self) {
        self.log.record(Effect::ContentResume);
    }

    fn pause(&mut self) {
        self.log.record(Effect::ContentPause);
    }

    fn destroy(&mut self) {
        self.log.record(Effect::ContentDestroy);
    }

    fn notify(&mut self, signal: HostSignal) -> bool {
        if self.accepts_signals {
            self.log.record(Effect::ContentSignal(signal));
        }
        self.accepts_signals
    }
}
