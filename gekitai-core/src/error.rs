//! Error taxonomy for capability requests.
//!
//! Every failure a bridge call can produce has a named variant. None of them are
//! fatal to the host: the coordinator logs and absorbs them, or turns them into a
//! transient notification for the user.

use thiserror::Error;

use crate::lifecycle::{LifecycleEvent, LifecycleState};

/// A native capability that can be missing on the device.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Capability {
    Speech,
    Vibration,
}

/// A runtime permission guarded by the permission gate.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Permission {
    Vibrate,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CapabilityError {
    /// Malformed request payload. Only the single request is rejected.
    #[error("invalid argument for {what}: {value:?}")]
    InvalidArgument { what: &'static str, value: String },

    /// The platform lacks the feature. The answer is cached.
    #[error("capability unsupported: {0:?}")]
    CapabilityUnsupported(Capability),

    /// The user refused a permission; the gate re-prompts on next use.
    #[error("permission denied: {0:?}")]
    PermissionDenied(Permission),

    /// A modal dialog is already pending.
    #[error("a dialog is already pending")]
    DialogBusy,

    /// The host has been destroyed.
    #[error("host has been disposed")]
    Disposed,
}

impl CapabilityError {
    pub(crate) fn invalid(what: &'static str, value: impl Into<String>) -> Self {
        CapabilityError::InvalidArgument {
            what,
            value: value.into(),
        }
    }

    /// Status code reported across the wasm import boundary.
    pub fn status_code(&self) -> u32 {
        use crate::abi::status;
        match self {
            CapabilityError::InvalidArgument { .. } => status::INVALID_ARGUMENT,
            CapabilityError::CapabilityUnsupported(_) => status::UNSUPPORTED,
            CapabilityError::PermissionDenied(_) => status::PERMISSION_DENIED,
            CapabilityError::DialogBusy => status::DIALOG_BUSY,
            CapabilityError::Disposed => status::DISPOSED,
        }
    }
}

/// Result type alias for bridge operations.
pub type CapabilityResult<T> = Result<T, CapabilityError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LifecycleError {
    #[error("illegal lifecycle transition: {event:?} while {from:?}")]
    IllegalTransition {
        from: LifecycleState,
        event: LifecycleEvent,
    },
}
