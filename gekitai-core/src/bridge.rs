//! The bridge between sandboxed content and the host.
//!
//! Content calls into the host from its own thread through a [`Bridge`]. Each
//! call is validated on the caller's thread and, if well formed, posted to the
//! host's event channel; the coordinator handles events strictly in arrival
//! order on the UI thread. Platform callbacks (engine readiness, permission
//! answers, dialog buttons) travel the same channel through a [`HostHandle`].

use crossbeam_channel::{Receiver, Sender, unbounded};
use tracing::trace;

use crate::dialog::{
    DialogKind, DialogOutcome, DialogReply, DialogRequest, DialogResponse, DialogTicket, rendezvous,
};
use crate::error::{CapabilityError, CapabilityResult, Permission};
use crate::lifecycle::LifecycleEvent;
use crate::locale::Locale;
use crate::request::{
    CapabilityRequest, expand_speech_loop, parse_alarm_flag, parse_brightness, parse_snack_kind,
    parse_toast_kind, parse_vibration_length, parse_volume,
};

/// Everything the coordinator reacts to.
#[derive(Debug)]
pub enum HostEvent {
    Lifecycle(LifecycleEvent),
    Request(CapabilityRequest),
    Dialog {
        request: DialogRequest,
        reply: DialogReply,
    },
    DialogResolved(DialogResponse),
    SpeechEngineReady(bool),
    PermissionResult {
        permission: Permission,
        granted: bool,
    },
    RationaleAcknowledged,
    Shutdown,
}

/// Create the host's event channel.
pub fn channel() -> (HostHandle, Receiver<HostEvent>) {
    let (tx, rx) = unbounded();
    (HostHandle { tx }, rx)
}

/// Platform-side sender. Cloned into whatever delivers async callbacks.
#[derive(Clone, Debug)]
pub struct HostHandle {
    tx: Sender<HostEvent>,
}

impl HostHandle {
    /// Post an event. Fails with `Disposed` once the host has stopped listening.
    pub fn post(&self, event: HostEvent) -> CapabilityResult<()> {
        self.tx.send(event).map_err(|_| CapabilityError::Disposed)
    }

    pub fn lifecycle(&self, event: LifecycleEvent) -> CapabilityResult<()> {
        self.post(HostEvent::Lifecycle(event))
    }

    /// A content-facing bridge sharing this channel.
    pub fn bridge(&self) -> Bridge {
        Bridge {
            host: self.clone(),
        }
    }
}

/// Content-facing entry points. Cheap to clone and `Send`.
#[derive(Clone, Debug)]
pub struct Bridge {
    host: HostHandle,
}

impl Bridge {
    fn submit(&self, request: CapabilityRequest) -> CapabilityResult<()> {
        trace!(request = request.name(), "bridge request");
        self.host.post(HostEvent::Request(request))
    }

    pub fn set_brightness(&self, value: &str) -> CapabilityResult<()> {
        self.submit(CapabilityRequest::SetBrightness(parse_brightness(value)))
    }

    pub fn volume_maximize(&self) -> CapabilityResult<()> {
        self.submit(CapabilityRequest::SetVolumeMax)
    }

    pub fn set_alerming(&self, flag: &str) -> CapabilityResult<()> {
        self.submit(CapabilityRequest::SetAlarmFlag(parse_alarm_flag(flag)))
    }

    pub fn cancel_speech(&self) -> CapabilityResult<()> {
        self.submit(CapabilityRequest::CancelSpeech)
    }

    pub fn speech_loop(&self, text: &str, volume: &str) -> CapabilityResult<()> {
        let volume = parse_volume(volume)?;
        self.submit(CapabilityRequest::Speak {
            text: expand_speech_loop(text),
            volume,
        })
    }

    pub fn clear_settings(&self) -> CapabilityResult<()> {
        self.submit(CapabilityRequest::ClearPersistedState)
    }

    pub fn start_vibrator(&self, length_ms: &str) -> CapabilityResult<()> {
        let length = parse_vibration_length(length_ms)?;
        self.submit(CapabilityRequest::Vibrate(length))
    }

    pub fn stop_vibrator(&self) -> CapabilityResult<()> {
        self.submit(CapabilityRequest::StopVibration)
    }

    pub fn set_language(&self, tag: &str) -> CapabilityResult<()> {
        self.submit(CapabilityRequest::SetLocale(Locale::from_tag(tag)))
    }

    pub fn show_toast(&self, text: &str, kind: u32) -> CapabilityResult<()> {
        let kind = parse_toast_kind(kind)?;
        self.submit(CapabilityRequest::ShowToast {
            text: text.to_owned(),
            kind,
        })
    }

    pub fn show_snackbar(&self, text: &str, kind: u32) -> CapabilityResult<()> {
        let kind = parse_snack_kind(kind)?;
        self.submit(CapabilityRequest::ShowSnackbar {
            text: text.to_owned(),
            kind,
        })
    }

    /// Post a dialog request without blocking. The ticket resolves when the user answers.
    pub fn request_dialog(&self, request: DialogRequest) -> CapabilityResult<DialogTicket> {
        let (reply, ticket) = rendezvous();
        self.host.post(HostEvent::Dialog { request, reply })?;
        Ok(ticket)
    }

    /// Show a message with an OK button and block until it is dismissed.
    pub fn alert(&self, message: &str) -> CapabilityResult<()> {
        let ticket = self.request_dialog(DialogRequest {
            kind: DialogKind::Alert,
            message: message.to_owned(),
        })?;
        ticket.wait().map(|_| ())
    }

    /// Ask an OK/Cancel question. Blocks; `true` means OK.
    pub fn confirm(&self, message: &str) -> CapabilityResult<bool> {
        let ticket = self.request_dialog(DialogRequest {
            kind: DialogKind::Confirm,
            message: message.to_owned(),
        })?;
        Ok(ticket.wait()? == DialogOutcome::Confirmed)
    }

    /// Ask for a line of text. Blocks; `None` means Cancel.
    pub fn prompt(&self, message: &str, default: Option<&str>) -> CapabilityResult<Option<String>> {
        let ticket = self.request_dialog(DialogRequest {
            kind: DialogKind::Prompt {
                default: default.map(str::to_owned),
            },
            message: message.to_owned(),
        })?;
        match ticket.wait()? {
            DialogOutcome::Text(text) => Ok(Some(text)),
            _ => Ok(None),
        }
    }
}
