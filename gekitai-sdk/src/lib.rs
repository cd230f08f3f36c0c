#![cfg_attr(not(feature = "std"), no_std)]

//! gekitai-sdk
//!
//! Bindings for game content that runs inside the Gekitai host, compiled to
//! `wasm32-unknown-unknown`.
//!
//! Content exports `gekitai_frame` (required) and optionally `gekitai_init`,
//! `gekitai_deinit`, `gekitai_resume` and `gekitai_pause`. Everything else is a
//! host import under module `"env"`: strings cross as `(ptr, len)` UTF-8 pairs
//! and fire-and-forget calls report a status code.

extern crate alloc;

use alloc::string::String;
use alloc::vec;

#[cfg(feature = "wee_alloc")]
pub use wee_alloc;

/// ABI version this SDK was written against.
pub const ABI_VERSION: u32 = 1;

/// Returned by the raw prompt import when the user pressed Cancel.
pub const PROMPT_CANCELLED: i32 = -100;

/// Largest prompt answer [`dialog::prompt`] will return, in bytes.
pub const PROMPT_CAPACITY: usize = 4096;

/// Why the host refused a call.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Error {
    InvalidArgument,
    Unsupported,
    PermissionDenied,
    DialogBusy,
    /// The host is shutting down.
    Disposed,
    Unknown(u32),
}

impl Error {
    /// Decode a status code; `0` is success.
    pub fn check(status: u32) -> Result<()> {
        match status {
            0 => Ok(()),
            1 => Err(Error::InvalidArgument),
            2 => Err(Error::Unsupported),
            3 => Err(Error::PermissionDenied),
            4 => Err(Error::DialogBusy),
            5 => Err(Error::Disposed),
            other => Err(Error::Unknown(other)),
        }
    }

    /// Decode a negative dialog return value.
    fn from_negated(code: i32) -> Error {
        match Error::check(code.unsigned_abs()) {
            Err(e) => e,
            Ok(()) => Error::Unknown(0),
        }
    }
}

pub type Result<T> = core::result::Result<T, Error>;

/// Toast durations.
#[repr(u32)]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ToastKind {
    Short = 0,
    Long = 1,
}

/// Snackbar styles.
#[repr(u32)]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SnackKind {
    Short = 0,
    Long = 1,
    /// Stays until the user presses OK.
    ActionOk = 2,
}

/// Low-level raw ABI imports.
pub mod sys {
    #[link(wasm_import_module = "env")]
    unsafe extern "C" {
        #[link_name = "gekitai_abi_version"]
        pub fn abi_version() -> u32;
        #[link_name = "gekitai_log"]
        pub fn log(ptr: u32, len: u32);

        #[link_name = "gekitai_set_brightness"]
        pub fn set_brightness(ptr: u32, len: u32) -> u32;
        #[link_name = "gekitai_volume_maximize"]
        pub fn volume_maximize() -> u32;
        #[link_name = "gekitai_set_alerming"]
        pub fn set_alerming(ptr: u32, len: u32) -> u32;

        #[link_name = "gekitai_cancel_speech"]
        pub fn cancel_speech() -> u32;
        #[link_name = "gekitai_speech_loop"]
        pub fn speech_loop(text_ptr: u32, text_len: u32, vol_ptr: u32, vol_len: u32) -> u32;

        #[link_name = "gekitai_clear_settings"]
        pub fn clear_settings() -> u32;
        #[link_name = "gekitai_set_language"]
        pub fn set_language(ptr: u32, len: u32) -> u32;

        #[link_name = "gekitai_start_vibrator"]
        pub fn start_vibrator(ptr: u32, len: u32) -> u32;
        #[link_name = "gekitai_stop_vibrator"]
        pub fn stop_vibrator() -> u32;

        #[link_name = "gekitai_show_toast"]
        pub fn show_toast(ptr: u32, len: u32, kind: u32) -> u32;
        #[link_name = "gekitai_show_snackbar"]
        pub fn show_snackbar(ptr: u32, len: u32, kind: u32) -> u32;

        #[link_name = "gekitai_alert"]
        pub fn alert(ptr: u32, len: u32) -> i32;
        #[link_name = "gekitai_confirm"]
        pub fn confirm(ptr: u32, len: u32) -> i32;
        #[link_name = "gekitai_prompt"]
        pub fn prompt(
            msg_ptr: u32,
            msg_len: u32,
            def_ptr: u32,
            def_len: u32,
            out_ptr: u32,
            out_cap: u32,
        ) -> i32;
    }
}

#[inline]
fn raw(s: &str) -> (u32, u32) {
    (s.as_ptr() as u32, s.len() as u32)
}

/// Text-to-speech.
pub mod speech {
    use super::{Error, Result, raw, sys};
    use alloc::format;

    /// Speak `text` repeatedly (a bounded number of times) at `volume` in `[0, 1]`.
    /// Replaces anything currently being spoken.
    pub fn speak_loop(text: &str, volume: f32) -> Result<()> {
        let volume = format!("{volume}");
        let (tp, tl) = raw(text);
        let (vp, vl) = raw(&volume);
        Error::check(unsafe { sys::speech_loop(tp, tl, vp, vl) })
    }

    pub fn cancel() -> Result<()> {
        Error::check(unsafe { sys::cancel_speech() })
    }
}

/// Device vibration.
pub mod vibration {
    use super::{Error, Result, raw, sys};
    use alloc::string::ToString;

    /// Vibrate for `length_ms` milliseconds. Zero cancels without vibrating.
    pub fn start(length_ms: u32) -> Result<()> {
        let text = length_ms.to_string();
        let (p, l) = raw(&text);
        Error::check(unsafe { sys::start_vibrator(p, l) })
    }

    /// Vibrate again with the previous length.
    pub fn repeat() -> Result<()> {
        let (p, l) = raw("-1");
        Error::check(unsafe { sys::start_vibrator(p, l) })
    }

    pub fn stop() -> Result<()> {
        Error::check(unsafe { sys::stop_vibrator() })
    }
}

/// Screen brightness.
pub mod display {
    use super::{Error, Result, raw, sys};

    /// `true` forces full brightness, `false` returns to the system level.
    pub fn set_brighter(brighter: bool) -> Result<()> {
        let (p, l) = raw(if brighter { "brighter" } else { "normal" });
        Error::check(unsafe { sys::set_brightness(p, l) })
    }
}

/// Media volume and the alarm flag.
pub mod audio {
    use super::{Error, Result, raw, sys};

    /// Pin the media volume to its maximum until the host is backgrounded.
    pub fn volume_maximize() -> Result<()> {
        Error::check(unsafe { sys::volume_maximize() })
    }

    /// While set, the host re-maximizes the volume each time it comes back.
    pub fn set_alarming(on: bool) -> Result<()> {
        let (p, l) = raw(if on { "yes" } else { "no" });
        Error::check(unsafe { sys::set_alerming(p, l) })
    }
}

pub mod locale {
    use super::{Error, Result, raw, sys};

    /// Switch host strings to `tag` (`"ja"` or anything else for English).
    pub fn set_language(tag: &str) -> Result<()> {
        let (p, l) = raw(tag);
        Error::check(unsafe { sys::set_language(p, l) })
    }
}

pub mod settings {
    use super::{Error, Result, sys};

    /// Delete the persisted message list.
    pub fn clear() -> Result<()> {
        Error::check(unsafe { sys::clear_settings() })
    }
}

/// Toasts and snackbars.
pub mod notify {
    use super::{Error, Result, SnackKind, ToastKind, raw, sys};

    pub fn toast(text: &str, kind: ToastKind) -> Result<()> {
        let (p, l) = raw(text);
        Error::check(unsafe { sys::show_toast(p, l, kind as u32) })
    }

    pub fn snackbar(text: &str, kind: SnackKind) -> Result<()> {
        let (p, l) = raw(text);
        Error::check(unsafe { sys::show_snackbar(p, l, kind as u32) })
    }
}

/// Modal dialogs. Every call blocks until the user answers.
pub mod dialog {
    use super::{Error, PROMPT_CANCELLED, PROMPT_CAPACITY, Result, String, raw, sys, vec};

    pub fn alert(message: &str) -> Result<()> {
        let (p, l) = raw(message);
        match unsafe { sys::alert(p, l) } {
            0 => Ok(()),
            code => Err(Error::from_negated(code)),
        }
    }

    /// `true` if the user pressed OK.
    pub fn confirm(message: &str) -> Result<bool> {
        let (p, l) = raw(message);
        match unsafe { sys::confirm(p, l) } {
            1 => Ok(true),
            0 => Ok(false),
            code => Err(Error::from_negated(code)),
        }
    }

    /// Ask for a line of text. `None` if the user pressed Cancel.
    ///
    /// Answers longer than [`PROMPT_CAPACITY`] bytes are truncated.
    pub fn prompt(message: &str, default: &str) -> Result<Option<String>> {
        let mut out = vec![0u8; PROMPT_CAPACITY];
        let (mp, ml) = raw(message);
        let (dp, dl) = raw(default);
        let n = unsafe { sys::prompt(mp, ml, dp, dl, out.as_mut_ptr() as u32, out.len() as u32) };
        if n == PROMPT_CANCELLED {
            return Ok(None);
        }
        if n < 0 {
            return Err(Error::from_negated(n));
        }
        out.truncate((n as usize).min(PROMPT_CAPACITY));
        Ok(Some(String::from_utf8_lossy(&out).into_owned()))
    }
}

/// System API.
pub mod system {
    use super::{raw, sys};

    /// Log a message through the host's logger.
    pub fn log(message: &str) {
        let (p, l) = raw(message);
        unsafe { sys::log(p, l) }
    }

    pub fn abi_version() -> u32 {
        unsafe { sys::abi_version() }
    }

    /// `true` if the host speaks the ABI this SDK was built for.
    pub fn abi_compatible() -> bool {
        abi_version() == super::ABI_VERSION
    }
}

/// Convenience prelude for content crates.
pub mod prelude {
    pub use crate::{Error, SnackKind, ToastKind};
    pub use crate::{audio, dialog, display, locale, notify, settings, speech, system, vibration};
}
