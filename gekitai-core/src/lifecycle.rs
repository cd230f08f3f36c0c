//! Host lifecycle state machine and the capability fan-out table.
//!
//! Every subsystem that holds a platform resource reacts to foreground and
//! background transitions. The reactions are listed in [`FANOUT`] and run in
//! that order, before the renderer itself is paused or resumed.

use crate::ambient::{BrightnessOverride, VolumeOverride};
use crate::error::LifecycleError;
use crate::speech::SpeechSubsystem;
use crate::vibration::VibrationSubsystem;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Created,
    Started,
    Resumed,
    Paused,
    Stopped,
    Destroyed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    Start,
    Resume,
    Pause,
    Stop,
    Destroy,
}

impl LifecycleState {
    /// The state reached by applying `event`, or an error if the pair is illegal.
    pub fn next(self, event: LifecycleEvent) -> Result<LifecycleState, LifecycleError> {
        use LifecycleEvent as E;
        use LifecycleState as S;
        match (self, event) {
            (S::Created, E::Start) => Ok(S::Started),
            (S::Started | S::Paused, E::Resume) => Ok(S::Resumed),
            (S::Resumed, E::Pause) => Ok(S::Paused),
            (S::Started | S::Paused, E::Stop) => Ok(S::Stopped),
            (S::Stopped, E::Destroy) => Ok(S::Destroyed),
            (from, event) => Err(LifecycleError::IllegalTransition { from, event }),
        }
    }

    pub fn is_destroyed(self) -> bool {
        self == LifecycleState::Destroyed
    }
}

impl LifecycleEvent {
    /// Which way the fan-out runs for this event, if at all.
    pub fn phase(self) -> Option<Phase> {
        match self {
            LifecycleEvent::Resume => Some(Phase::Foreground),
            LifecycleEvent::Pause | LifecycleEvent::Stop => Some(Phase::Background),
            LifecycleEvent::Start | LifecycleEvent::Destroy => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Foreground,
    Background,
}

/// The capability subsystems that take part in the fan-out.
pub struct Capabilities {
    pub speech: SpeechSubsystem,
    pub vibration: VibrationSubsystem,
    pub volume: VolumeOverride,
    pub brightness: BrightnessOverride,
    /// Set by content; while true, foregrounding pins the volume to max.
    pub alarm: bool,
}

pub type FanoutHandler = fn(&mut Capabilities, Phase);

/// Lifecycle reactions, in execution order.
pub const FANOUT: [(&str, FanoutHandler); 4] = [
    ("speech", speech_phase),
    ("vibration", vibration_phase),
    ("volume", volume_phase),
    ("brightness", brightness_phase),
];

fn speech_phase(caps: &mut Capabilities, phase: Phase) {
    match phase {
        Phase::Foreground => caps.speech.replay(),
        Phase::Background => caps.speech.flush(),
    }
}

fn vibration_phase(caps: &mut Capabilities, phase: Phase) {
    match phase {
        Phase::Foreground => caps.vibration.resume(),
        Phase::Background => caps.vibration.suspend(),
    }
}

fn volume_phase(caps: &mut Capabilities, phase: Phase) {
    match phase {
        Phase::Foreground => {
            if caps.alarm {
                caps.volume.maximize();
            }
        }
        Phase::Background => {
            caps.volume.restore();
        }
    }
}

fn brightness_phase(caps: &mut Capabilities, phase: Phase) {
    match phase {
        Phase::Foreground => caps.brightness.apply(),
        Phase::Background => {
            caps.brightness.restore();
        }
    }
}

/// Run every fan-out handler for `phase`, in table order.
pub fn fan_out(caps: &mut Capabilities, phase: Phase) {
    for (name, handler) in FANOUT {
        tracing::trace!(subsystem = name, ?phase, "fan-out");
        handler(caps, phase);
    }
}
