//! Host imports under module `"env"`.
//!
//! Each import decodes its arguments from guest memory and forwards to the
//! [`Bridge`]. Decoding failures become `InvalidArgument` and never reach the
//! coordinator.

use tracing::debug;
use wasmtime::{Caller, Extern, Linker, Memory};

use crate::abi::{ABI_VERSION, IMPORT_MODULE, PROMPT_CANCELLED, host_imports, status};
use crate::bridge::Bridge;
use crate::error::{CapabilityError, CapabilityResult};

/// Per-instance store data.
pub struct GuestState {
    pub bridge: Bridge,
}

fn guest_memory(caller: &mut Caller<'_, GuestState>) -> CapabilityResult<Memory> {
    caller
        .get_export("memory")
        .and_then(Extern::into_memory)
        .ok_or_else(|| CapabilityError::invalid("memory", "guest exports no memory"))
}

fn out_of_bounds(what: &'static str, start: usize, len: usize) -> CapabilityError {
    CapabilityError::invalid(what, format!("{len} bytes at {start:#x} out of bounds"))
}

fn read_str(
    caller: &mut Caller<'_, GuestState>,
    ptr: u32,
    len: u32,
    what: &'static str,
) -> CapabilityResult<String> {
    let memory = guest_memory(caller)?;
    let (start, len) = (ptr as usize, len as usize);
    if start.saturating_add(len) > memory.data_size(&*caller) {
        return Err(out_of_bounds(what, start, len));
    }
    let mut buf = vec![0u8; len];
    memory
        .read(&*caller, start, &mut buf)
        .map_err(|_| out_of_bounds(what, start, len))?;
    String::from_utf8(buf).map_err(|_| CapabilityError::invalid(what, "text is not UTF-8"))
}

fn write_bytes(
    caller: &mut Caller<'_, GuestState>,
    ptr: u32,
    bytes: &[u8],
) -> CapabilityResult<()> {
    let memory = guest_memory(caller)?;
    memory
        .write(&mut *caller, ptr as usize, bytes)
        .map_err(|_| out_of_bounds("prompt output", ptr as usize, bytes.len()))
}

fn status_of(result: CapabilityResult<()>) -> u32 {
    match result {
        Ok(()) => status::OK,
        Err(e) => {
            debug!(error = %e, "import failed");
            e.status_code()
        }
    }
}

fn negated(e: &CapabilityError) -> i32 {
    -(e.status_code() as i32)
}

/// Register every import on `linker`. Must be called before instantiation.
pub fn define_imports(linker: &mut Linker<GuestState>) -> wasmtime::Result<()> {
    // --- System ---
    linker.func_wrap(
        IMPORT_MODULE,
        host_imports::ABI_VERSION,
        |_caller: Caller<'_, GuestState>| -> u32 { ABI_VERSION },
    )?;

    linker.func_wrap(
        IMPORT_MODULE,
        host_imports::LOG,
        |mut caller: Caller<'_, GuestState>, ptr: u32, len: u32| {
            if let Ok(msg) = read_str(&mut caller, ptr, len, "log") {
                debug!(target: "gekitai::content", "{msg}");
            }
        },
    )?;

    // --- Ambient ---
    linker.func_wrap(
        IMPORT_MODULE,
        host_imports::SET_BRIGHTNESS,
        |mut caller: Caller<'_, GuestState>, ptr: u32, len: u32| -> u32 {
            status_of(
                read_str(&mut caller, ptr, len, "brightness")
                    .and_then(|v| caller.data().bridge.set_brightness(&v)),
            )
        },
    )?;

    linker.func_wrap(
        IMPORT_MODULE,
        host_imports::VOLUME_MAXIMIZE,
        |caller: Caller<'_, GuestState>| -> u32 {
            status_of(caller.data().bridge.volume_maximize())
        },
    )?;

    linker.func_wrap(
        IMPORT_MODULE,
        host_imports::SET_ALERMING,
        |mut caller: Caller<'_, GuestState>, ptr: u32, len: u32| -> u32 {
            status_of(
                read_str(&mut caller, ptr, len, "alerming")
                    .and_then(|v| caller.data().bridge.set_alerming(&v)),
            )
        },
    )?;

    // --- Speech ---
    linker.func_wrap(
        IMPORT_MODULE,
        host_imports::CANCEL_SPEECH,
        |caller: Caller<'_, GuestState>| -> u32 {
            status_of(caller.data().bridge.cancel_speech())
        },
    )?;

    linker.func_wrap(
        IMPORT_MODULE,
        host_imports::SPEECH_LOOP,
        |mut caller: Caller<'_, GuestState>,
         text_ptr: u32,
         text_len: u32,
         vol_ptr: u32,
         vol_len: u32|
         -> u32 {
            let args = read_str(&mut caller, text_ptr, text_len, "text").and_then(|text| {
                Ok((text, read_str(&mut caller, vol_ptr, vol_len, "volume")?))
            });
            status_of(
                args.and_then(|(text, volume)| caller.data().bridge.speech_loop(&text, &volume)),
            )
        },
    )?;

    // --- Settings / locale ---
    linker.func_wrap(
        IMPORT_MODULE,
        host_imports::CLEAR_SETTINGS,
        |caller: Caller<'_, GuestState>| -> u32 {
            status_of(caller.data().bridge.clear_settings())
        },
    )?;

    linker.func_wrap(
        IMPORT_MODULE,
        host_imports::SET_LANGUAGE,
        |mut caller: Caller<'_, GuestState>, ptr: u32, len: u32| -> u32 {
            status_of(
                read_str(&mut caller, ptr, len, "language")
                    .and_then(|v| caller.data().bridge.set_language(&v)),
            )
        },
    )?;

    // --- Vibration ---
    linker.func_wrap(
        IMPORT_MODULE,
        host_imports::START_VIBRATOR,
        |mut caller: Caller<'_, GuestState>, ptr: u32, len: u32| -> u32 {
            status_of(
                read_str(&mut caller, ptr, len, "lengthMs")
                    .and_then(|v| caller.data().bridge.start_vibrator(&v)),
            )
        },
    )?;

    linker.func_wrap(
        IMPORT_MODULE,
        host_imports::STOP_VIBRATOR,
        |caller: Caller<'_, GuestState>| -> u32 {
            status_of(caller.data().bridge.stop_vibrator())
        },
    )?;

    // --- Notifications ---
    linker.func_wrap(
        IMPORT_MODULE,
        host_imports::SHOW_TOAST,
        |mut caller: Caller<'_, GuestState>, ptr: u32, len: u32, kind: u32| -> u32 {
            status_of(
                read_str(&mut caller, ptr, len, "toast")
                    .and_then(|v| caller.data().bridge.show_toast(&v, kind)),
            )
        },
    )?;

    linker.func_wrap(
        IMPORT_MODULE,
        host_imports::SHOW_SNACKBAR,
        |mut caller: Caller<'_, GuestState>, ptr: u32, len: u32, kind: u32| -> u32 {
            status_of(
                read_str(&mut caller, ptr, len, "snackbar")
                    .and_then(|v| caller.data().bridge.show_snackbar(&v, kind)),
            )
        },
    )?;

    // --- Dialogs (block this thread until answered) ---
    linker.func_wrap(
        IMPORT_MODULE,
        host_imports::ALERT,
        |mut caller: Caller<'_, GuestState>, ptr: u32, len: u32| -> i32 {
            let result = read_str(&mut caller, ptr, len, "message")
                .and_then(|m| caller.data().bridge.alert(&m));
            match result {
                Ok(()) => 0,
                Err(e) => negated(&e),
            }
        },
    )?;

    linker.func_wrap(
        IMPORT_MODULE,
        host_imports::CONFIRM,
        |mut caller: Caller<'_, GuestState>, ptr: u32, len: u32| -> i32 {
            let result = read_str(&mut caller, ptr, len, "message")
                .and_then(|m| caller.data().bridge.confirm(&m));
            match result {
                Ok(confirmed) => i32::from(confirmed),
                Err(e) => negated(&e),
            }
        },
    )?;

    linker.func_wrap(
        IMPORT_MODULE,
        host_imports::PROMPT,
        |mut caller: Caller<'_, GuestState>,
         msg_ptr: u32,
         msg_len: u32,
         def_ptr: u32,
         def_len: u32,
         out_ptr: u32,
         out_cap: u32|
         -> i32 {
            let message = match read_str(&mut caller, msg_ptr, msg_len, "message") {
                Ok(m) => m,
                Err(e) => return negated(&e),
            };
            let default = if def_len == 0 {
                None
            } else {
                match read_str(&mut caller, def_ptr, def_len, "default") {
                    Ok(d) => Some(d),
                    Err(e) => return negated(&e),
                }
            };

            let bridge = caller.data().bridge.clone();
            let text = match bridge.prompt(&message, default.as_deref()) {
                Ok(Some(text)) => text,
                Ok(None) => return PROMPT_CANCELLED,
                Err(e) => return negated(&e),
            };

            let bytes = text.as_bytes();
            let copied = bytes.len().min(out_cap as usize);
            if let Err(e) = write_bytes(&mut caller, out_ptr, &bytes[..copied]) {
                return negated(&e);
            }
            i32::try_from(bytes.len()).unwrap_or(i32::MAX)
        },
    )?;

    Ok(())
}
