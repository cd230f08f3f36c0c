//! Vibration subsystem: memoized capability probe plus one active session.

use tracing::{debug, info};

use crate::platform::{Amplitude, VibratorDevice};
use crate::request::VibrationLength;

/// Resolved once on first use; the hardware never changes at runtime.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum VibrationCapability {
    #[default]
    Unknown,
    Unsupported,
    Supported,
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct VibrationSession {
    /// Last issued length; the resume-replay value.
    pub length_ms: u64,
    pub active: bool,
    /// Set when backgrounding cancelled an active session.
    pub interrupted: bool,
}

pub struct VibrationSubsystem {
    device: Box<dyn VibratorDevice>,
    capability: VibrationCapability,
    session: VibrationSession,
}

impl VibrationSubsystem {
    pub fn new(device: Box<dyn VibratorDevice>) -> Self {
        Self {
            device,
            capability: VibrationCapability::Unknown,
            session: VibrationSession::default(),
        }
    }

    pub fn capability(&self) -> VibrationCapability {
        self.capability
    }

    pub fn session(&self) -> VibrationSession {
        self.session
    }

    /// Resolve the capability on first use; later calls return the cached answer.
    pub fn probe(&mut self) -> VibrationCapability {
        if self.capability == VibrationCapability::Unknown {
            self.capability = if self.device.has_vibrator() {
                VibrationCapability::Supported
            } else {
                VibrationCapability::Unsupported
            };
            info!(capability = ?self.capability, "vibration capability resolved");
        }
        self.capability
    }

    pub fn start(&mut self, length: VibrationLength) {
        if self.probe() != VibrationCapability::Supported {
            return;
        }

        // Effects never overlap.
        self.device.cancel();
        self.session.interrupted = false;

        let length_ms = match length {
            VibrationLength::Repeat => self.session.length_ms,
            VibrationLength::Millis(ms) => ms,
        };
        self.session.length_ms = length_ms;

        if length_ms == 0 {
            debug!("zero-length vibration; nothing to issue");
            self.session.active = false;
            return;
        }

        let amplitude = if self.device.has_amplitude_control() {
            Amplitude::Max
        } else {
            Amplitude::Default
        };
        self.device.vibrate(length_ms, amplitude);
        self.session.active = true;
    }

    pub fn stop(&mut self) {
        if self.capability != VibrationCapability::Supported {
            return;
        }
        self.device.cancel();
        self.session = VibrationSession::default();
    }

    /// Backgrounding: cancel an active session but keep its length.
    pub fn suspend(&mut self) {
        if self.capability != VibrationCapability::Supported || !self.session.active {
            return;
        }
        self.device.cancel();
        self.session.active = false;
        self.session.interrupted = true;
    }

    /// Foregrounding: restart a session that backgrounding interrupted.
    pub fn resume(&mut self) {
        if self.capability == VibrationCapability::Supported && self.session.interrupted {
            self.start(VibrationLength::Repeat);
        }
    }
}
