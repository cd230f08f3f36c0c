//! The lifecycle coordinator.
//!
//! Owns every capability subsystem and the attached content, and is the only
//! place that mutates them. Driven one [`HostEvent`] at a time.

use tracing::{debug, info, warn};

use crate::ambient::{BrightnessOverride, VolumeOverride};
use crate::bridge::HostEvent;
use crate::dialog::{DialogReply, DialogRequest, DialogSerializer};
use crate::error::{Capability, CapabilityError, CapabilityResult, LifecycleError, Permission};
use crate::lifecycle::{Capabilities, LifecycleEvent, LifecycleState, fan_out};
use crate::locale::{Locale, Locales};
use crate::notify::Notifications;
use crate::permission::{GateState, PermissionGate};
use crate::platform::{ContentHost, HostSignal, Platform, SettingsStore};
use crate::request::CapabilityRequest;
use crate::speech::{SpeechSubsystem, Voice};
use crate::vibration::{VibrationCapability, VibrationSubsystem};

/// Whether the event loop should keep going after an event.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Flow {
    Continue,
    Exit,
}

pub struct Coordinator {
    state: LifecycleState,
    caps: Capabilities,
    locales: Locales,
    dialogs: DialogSerializer,
    notifications: Notifications,
    gate: PermissionGate,
    settings: Box<dyn SettingsStore>,
    content: Option<Box<dyn ContentHost>>,
}

impl Coordinator {
    /// Build the host. This is the "create" step: the speech engine starts
    /// initializing and the vibration permission is checked once.
    pub fn new(platform: Platform, voice: Voice, locale: Locale) -> Self {
        let Platform {
            speech,
            vibrator,
            volume,
            brightness,
            notifier,
            dialogs,
            permissions,
            settings,
            strings,
        } = platform;

        let mut coordinator = Self {
            state: LifecycleState::Created,
            caps: Capabilities {
                speech: SpeechSubsystem::new(speech, voice),
                vibration: VibrationSubsystem::new(vibrator),
                volume: VolumeOverride::new(volume),
                brightness: BrightnessOverride::new(brightness),
                alarm: false,
            },
            locales: Locales::new(locale, strings),
            dialogs: DialogSerializer::new(dialogs),
            notifications: Notifications::new(notifier),
            gate: PermissionGate::new(Permission::Vibrate, permissions),
            settings,
            content: None,
        };

        coordinator.caps.speech.initialize();
        if coordinator.caps.vibration.probe() == VibrationCapability::Unsupported {
            debug!("no vibrator; permission never requested");
        } else if coordinator
            .gate
            .check(&mut coordinator.dialogs, &mut coordinator.locales)
            .is_err()
        {
            debug!("vibration permission not yet granted at startup");
        }
        info!(locale = ?locale, "host created");
        coordinator
    }

    pub fn attach_content(&mut self, content: Box<dyn ContentHost>) {
        self.content = Some(content);
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.caps
    }

    pub fn locale(&self) -> Locale {
        self.locales.current()
    }

    pub fn dialog_pending(&self) -> bool {
        self.dialogs.is_pending()
    }

    pub fn permission_state(&self) -> GateState {
        self.gate.state()
    }

    pub fn handle(&mut self, event: HostEvent) -> Flow {
        match event {
            HostEvent::Lifecycle(event) => {
                if let Err(e) = self.transition(event) {
                    warn!(error = %e, "lifecycle event rejected");
                }
            }
            HostEvent::Request(request) => {
                let name = request.name();
                match self.dispatch(request) {
                    Ok(()) => {}
                    Err(e @ CapabilityError::InvalidArgument { .. }) => {
                        warn!(request = name, error = %e, "request rejected")
                    }
                    Err(e) => debug!(request = name, error = %e, "request not serviced"),
                }
            }
            HostEvent::Dialog { request, reply } => self.present_dialog(request, reply),
            HostEvent::DialogResolved(response) => {
                self.dialogs.resolve(response);
            }
            HostEvent::SpeechEngineReady(success) => {
                if !self.state.is_destroyed() {
                    self.caps.speech.on_engine_ready(success);
                }
            }
            HostEvent::PermissionResult { permission, granted } => {
                self.gate.on_result(
                    permission,
                    granted,
                    &mut self.notifications,
                    &mut self.locales,
                );
            }
            HostEvent::RationaleAcknowledged => {
                self.dialogs.finish_rationale();
                self.gate.on_rationale_acknowledged();
            }
            HostEvent::Shutdown => return Flow::Exit,
        }
        Flow::Continue
    }

    /// Apply a lifecycle event. Illegal events change nothing.
    pub fn transition(
        &mut self,
        event: LifecycleEvent,
    ) -> Result<LifecycleState, LifecycleError> {
        let from = self.state;
        let to = from.next(event)?;
        info!(?from, ?to, "lifecycle transition");

        if let Some(phase) = event.phase() {
            fan_out(&mut self.caps, phase);
        }

        match event {
            LifecycleEvent::Resume => {
                if let Some(content) = self.content.as_mut() {
                    content.resume();
                }
                self.notify_content(HostSignal::Resumed);
            }
            LifecycleEvent::Pause => {
                if let Some(content) = self.content.as_mut() {
                    content.pause();
                }
                self.notify_content(HostSignal::Paused);
            }
            LifecycleEvent::Stop => {
                if let Some(content) = self.content.as_mut() {
                    content.pause();
                }
            }
            LifecycleEvent::Destroy => self.teardown(),
            LifecycleEvent::Start => {}
        }

        self.state = to;
        Ok(to)
    }

    fn notify_content(&mut self, signal: HostSignal) {
        let Some(content) = self.content.as_mut() else {
            return;
        };
        if !content.notify(signal) {
            debug!(?signal, "content did not accept signal");
        }
    }

    fn teardown(&mut self) {
        self.dialogs.abandon();
        self.notifications.dismiss_all();
        // Requests served after the last background fan-out may have left
        // overrides or a vibration running.
        if self.caps.vibration.session().active {
            self.caps.vibration.stop();
        }
        self.caps.volume.restore();
        self.caps.brightness.restore();
        if let Some(mut content) = self.content.take() {
            content.destroy();
        }
        self.caps.speech.shutdown();
    }

    fn present_dialog(&mut self, request: DialogRequest, reply: DialogReply) {
        if self.state.is_destroyed() {
            debug!("dialog requested after destroy");
            let _ = reply.send(Err(CapabilityError::Disposed));
            return;
        }
        if let Err(e) = self.dialogs.present(request, reply, &mut self.locales) {
            debug!(error = %e, "dialog not presented");
        }
    }

    /// Route a validated request to its owning subsystem.
    pub fn dispatch(&mut self, request: CapabilityRequest) -> CapabilityResult<()> {
        if self.state.is_destroyed() {
            return Err(CapabilityError::Disposed);
        }
        info!(request = request.name(), state = ?self.state, "capability request");

        match request {
            CapabilityRequest::Speak { text, volume } => self.caps.speech.speak(text, volume),
            CapabilityRequest::CancelSpeech => self.caps.speech.cancel(),
            CapabilityRequest::Vibrate(length) => {
                if self.caps.vibration.probe() == VibrationCapability::Unsupported {
                    return Err(CapabilityError::CapabilityUnsupported(Capability::Vibration));
                }
                self.gate.check(&mut self.dialogs, &mut self.locales)?;
                self.caps.vibration.start(length);
            }
            CapabilityRequest::StopVibration => self.caps.vibration.stop(),
            CapabilityRequest::SetBrightness(level) => self.caps.brightness.set(level),
            CapabilityRequest::SetVolumeMax => self.caps.volume.maximize(),
            CapabilityRequest::SetAlarmFlag(flag) => self.caps.alarm = flag,
            CapabilityRequest::SetLocale(locale) => self.locales.set_current(locale),
            CapabilityRequest::ClearPersistedState => {
                if let Err(e) = self.settings.clear() {
                    warn!(error = %format!("{e:#}"), "failed to clear settings");
                }
            }
            CapabilityRequest::ShowToast { text, kind } => self.notifications.toast(&text, kind),
            CapabilityRequest::ShowSnackbar { text, kind } => {
                self.notifications.snackbar(text, kind, &mut self.locales)
            }
        }
        Ok(())
    }
}
