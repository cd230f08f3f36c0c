//! Platform collaborators.
//!
//! The coordinator never touches a device API directly. Every effect goes
//! through one of these traits, and every asynchronous platform answer (speech
//! engine readiness, permission results, dialog buttons) comes back as a
//! [`HostEvent`](crate::bridge::HostEvent) posted through a
//! [`HostHandle`](crate::bridge::HostHandle).

use crate::error::Permission;
use crate::locale::{Locale, StringCatalog};

/// How a new utterance relates to the one in flight.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum QueueMode {
    /// Drop whatever is queued and speak immediately.
    Flush,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Utterance {
    pub text: String,
    pub volume: f32,
    pub pitch: f32,
    pub rate: f32,
}

/// Text-to-speech engine.
///
/// `initialize` starts the one-time asynchronous engine setup; the platform
/// reports the result with `HostEvent::SpeechEngineReady`.
pub trait SpeechEngine: Send {
    fn initialize(&mut self);
    fn is_language_available(&self, locale: Locale) -> bool;
    fn set_language(&mut self, locale: Locale);
    fn speak(&mut self, utterance: Utterance, mode: QueueMode);
    fn shutdown(&mut self);
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Amplitude {
    /// Platform default strength.
    Default,
    /// Full strength (255), used when the device supports amplitude control.
    Max,
}

pub trait VibratorDevice: Send {
    /// `false` when the device has no vibrator or the service is unavailable.
    fn has_vibrator(&self) -> bool;
    fn has_amplitude_control(&self) -> bool;
    fn vibrate(&mut self, length_ms: u64, amplitude: Amplitude);
    fn cancel(&mut self);
}

/// A host-wide scalar setting that can be overridden and later restored.
pub trait AmbientChannel: Send {
    fn read(&self) -> i32;
    fn write(&mut self, value: i32);
    fn maximum(&self) -> i32;
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum NoticeDuration {
    Short,
    Long,
    Indefinite,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Snackbar {
    pub text: String,
    pub duration: NoticeDuration,
    pub action_label: Option<String>,
}

/// Transient user-visible notifications.
pub trait Notifier: Send {
    fn show_toast(&mut self, text: &str, duration: NoticeDuration);
    fn cancel_toast(&mut self);
    fn show_snackbar(&mut self, snackbar: Snackbar);
    fn dismiss_snackbar(&mut self);
}

/// Who asked for a dialog, and so which event its OK button answers with.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum DialogOrigin {
    /// Answered with `HostEvent::DialogResolved`.
    Content,
    /// Permission rationale; answered with `HostEvent::RationaleAcknowledged`.
    Rationale,
}

/// Everything needed to draw a modal dialog. Styling is the platform's business.
#[derive(Clone, Debug, PartialEq)]
pub struct DialogSpec {
    pub origin: DialogOrigin,
    pub title: String,
    pub message: String,
    pub positive_label: String,
    pub negative_label: Option<String>,
    /// Initial text of the input field; `None` when the dialog has no input.
    pub input: Option<String>,
    /// Always `false`: the action buttons are the only exits.
    pub cancelable: bool,
}

/// Presents modal dialogs. Button presses come back as
/// `HostEvent::DialogResolved` (content dialogs) or
/// `HostEvent::RationaleAcknowledged` (permission rationale).
pub trait DialogPresenter: Send {
    fn present(&mut self, spec: DialogSpec);
    fn dismiss(&mut self);
}

pub trait PermissionService: Send {
    fn is_granted(&self, permission: Permission) -> bool;
    fn should_show_rationale(&self, permission: Permission) -> bool;
    /// Issue the platform request; the answer arrives as `HostEvent::PermissionResult`.
    fn request(&mut self, permission: Permission);
}

/// The single clearable settings store (the content's saved message list).
pub trait SettingsStore: Send {
    fn clear(&mut self) -> anyhow::Result<()>;
}

/// Signals delivered from the host into the content.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum HostSignal {
    Resumed,
    Paused,
}

/// The embedded renderer running the content.
pub trait ContentHost: Send {
    fn resume(&mut self);
    fn pause(&mut self);
    fn destroy(&mut self);
    /// Deliver a signal. Returns `false` if the content could not receive it.
    fn notify(&mut self, signal: HostSignal) -> bool;
}

/// The bundle of collaborators a [`Coordinator`](crate::coordinator::Coordinator) is built from.
pub struct Platform {
    pub speech: Box<dyn SpeechEngine>,
    pub vibrator: Box<dyn VibratorDevice>,
    pub volume: Box<dyn AmbientChannel>,
    pub brightness: Box<dyn AmbientChannel>,
    pub notifier: Box<dyn Notifier>,
    pub dialogs: Box<dyn DialogPresenter>,
    pub permissions: Box<dyn PermissionService>,
    pub settings: Box<dyn SettingsStore>,
    pub strings: Box<dyn StringCatalog>,
}
