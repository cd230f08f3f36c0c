//! gekitai-core ABI module
//!
//! This module defines the ABI contract between:
//! - **Host**: `gekitai-core` (the native capability bridge)
//! - **Guest**: the loaded WASM module (the game content)
//!
//! ## Imports (guest -> host)
//! Imported from module `"env"`. Strings are passed as `(ptr, len)` pairs of UTF-8
//! bytes in guest linear memory.
//!
//! ### Fire-and-forget capabilities (return a status code, see [`status`])
//! - `gekitai_set_brightness(ptr, len) -> u32`        ("brighter" | other)
//! - `gekitai_volume_maximize() -> u32`
//! - `gekitai_set_alerming(ptr, len) -> u32`          ("yes" | other)
//! - `gekitai_cancel_speech() -> u32`
//! - `gekitai_speech_loop(text_ptr, text_len, vol_ptr, vol_len) -> u32`
//! - `gekitai_clear_settings() -> u32`
//! - `gekitai_start_vibrator(ptr, len) -> u32`        (decimal length, "-1" = repeat last)
//! - `gekitai_stop_vibrator() -> u32`
//! - `gekitai_set_language(ptr, len) -> u32`
//! - `gekitai_show_toast(ptr, len, kind) -> u32`      (see [`toast_kind`])
//! - `gekitai_show_snackbar(ptr, len, kind) -> u32`   (see [`snack_kind`])
//!
//! ### Blocking dialogs
//! The calling content thread is suspended until the user dismisses the dialog.
//! - `gekitai_alert(ptr, len) -> i32`                 (0 on dismissal, negative status on error)
//! - `gekitai_confirm(ptr, len) -> i32`               (1 confirmed, 0 cancelled, negative on error)
//! - `gekitai_prompt(msg_ptr, msg_len, def_ptr, def_len, out_ptr, out_cap) -> i32`
//!     - Writes the edited text (truncated to `out_cap`) and returns its full byte length.
//!     - Returns [`PROMPT_CANCELLED`] on cancel, or a negative status on error.
//!
//! ### System
//! - `gekitai_abi_version() -> u32`
//! - `gekitai_log(ptr, len)`
//!
//! ## Exports (host -> guest)
//! Required:
//! - `gekitai_frame()`: called periodically while the host is resumed.
//!
//! Optional:
//! - `gekitai_init()`: called once after instantiation.
//! - `gekitai_deinit()`: called when the renderer is destroyed.
//! - `gekitai_resume()`: "host resumed" notification.
//! - `gekitai_pause()`: "host paused" notification.
//!
//! ## ABI Stability
//! We version this ABI with a single integer. Incompatible changes bump the number.

use wasmtime::{Instance, Store, TypedFunc};

/// Current ABI version expected by the host.
///
/// Bump this only for breaking ABI changes.
pub const ABI_VERSION: u32 = 1;

/// Wasmtime import module name used by the guest.
pub const IMPORT_MODULE: &str = "env";

/// Number of times `speechLoop` repeats its text inside one utterance.
pub const SPEECH_LOOP_REPEAT: usize = 32;

/// Returned by `gekitai_prompt` when the user pressed Cancel.
pub const PROMPT_CANCELLED: i32 = -100;

/// Guest export names (entrypoints).
pub mod guest_exports {
    pub const INIT: &str = "gekitai_init";
    pub const FRAME: &str = "gekitai_frame";
    pub const DEINIT: &str = "gekitai_deinit";
    pub const RESUME: &str = "gekitai_resume";
    pub const PAUSE: &str = "gekitai_pause";
}

/// Host import names provided to the guest.
///
/// These are the string names under module [`IMPORT_MODULE`].
pub mod host_imports {
    pub const ABI_VERSION: &str = "gekitai_abi_version";
    pub const LOG: &str = "gekitai_log";

    pub const SET_BRIGHTNESS: &str = "gekitai_set_brightness";
    pub const VOLUME_MAXIMIZE: &str = "gekitai_volume_maximize";
    pub const SET_ALERMING: &str = "gekitai_set_alerming";
    pub const CANCEL_SPEECH: &str = "gekitai_cancel_speech";
    pub const SPEECH_LOOP: &str = "gekitai_speech_loop";
    pub const CLEAR_SETTINGS: &str = "gekitai_clear_settings";
    pub const START_VIBRATOR: &str = "gekitai_start_vibrator";
    pub const STOP_VIBRATOR: &str = "gekitai_stop_vibrator";
    pub const SET_LANGUAGE: &str = "gekitai_set_language";
    pub const SHOW_TOAST: &str = "gekitai_show_toast";
    pub const SHOW_SNACKBAR: &str = "gekitai_show_snackbar";

    pub const ALERT: &str = "gekitai_alert";
    pub const CONFIRM: &str = "gekitai_confirm";
    pub const PROMPT: &str = "gekitai_prompt";
}

/// Status codes returned by fire-and-forget imports.
///
/// Dialog imports return these negated.
pub mod status {
    pub const OK: u32 = 0;
    pub const INVALID_ARGUMENT: u32 = 1;
    pub const UNSUPPORTED: u32 = 2;
    pub const PERMISSION_DENIED: u32 = 3;
    pub const DIALOG_BUSY: u32 = 4;
    pub const DISPOSED: u32 = 5;
}

/// Wire values for `gekitai_show_toast`.
pub mod toast_kind {
    pub const SHORT: u32 = 0;
    pub const LONG: u32 = 1;
}

/// Wire values for `gekitai_show_snackbar`.
pub mod snack_kind {
    pub const SHORT: u32 = 0;
    pub const LONG: u32 = 1;
    pub const ACTION_OK: u32 = 2;
}

/// Helpers for validating guest exports.
pub mod validate {
    use super::guest_exports;
    use wasmtime::{Instance, Store};

    /// Validate that a guest instance exports the required entrypoints for this ABI.
    ///
    /// Currently required:
    /// - `gekitai_frame`
    pub fn required_exports_present<T>(
        instance: &Instance,
        store: &mut Store<T>,
    ) -> Result<(), MissingExport> {
        if instance.get_func(&mut *store, guest_exports::FRAME).is_none() {
            return Err(MissingExport::Frame);
        }
        Ok(())
    }

    #[derive(Debug)]
    pub enum MissingExport {
        Frame,
    }
}

/// A small view of a guest's entrypoints as typed functions.
///
/// The runtime resolves these once after instantiation.
#[derive(Clone)]
pub struct GuestEntrypoints {
    pub init: Option<TypedFunc<(), ()>>,
    pub frame: TypedFunc<(), ()>,
    pub deinit: Option<TypedFunc<(), ()>>,
    pub resume: Option<TypedFunc<(), ()>>,
    pub pause: Option<TypedFunc<(), ()>>,
}

impl GuestEntrypoints {
    /// Resolve entrypoint exports from an instance.
    pub fn resolve<T>(instance: &Instance, store: &mut Store<T>) -> wasmtime::Result<Self> {
        let frame = instance.get_typed_func::<(), ()>(&mut *store, guest_exports::FRAME)?;
        let init = instance
            .get_typed_func::<(), ()>(&mut *store, guest_exports::INIT)
            .ok();
        let deinit = instance
            .get_typed_func::<(), ()>(&mut *store, guest_exports::DEINIT)
            .ok();
        let resume = instance
            .get_typed_func::<(), ()>(&mut *store, guest_exports::RESUME)
            .ok();
        let pause = instance
            .get_typed_func::<(), ()>(&mut *store, guest_exports::PAUSE)
            .ok();

        Ok(Self {
            init,
            frame,
            deinit,
            resume,
            pause,
        })
    }
}
