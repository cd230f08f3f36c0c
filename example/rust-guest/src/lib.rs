#![cfg_attr(target_arch = "wasm32", no_std)]

// Minimal Gekitai content: an alarm that rings until the user stops it.
//
// Build with `cargo build -p rust_guest --target wasm32-unknown-unknown --release`
// and run with `gekitai-host --module target/wasm32-unknown-unknown/release/rust_guest.wasm`.
//
// The host calls:
// - `gekitai_init()` once after loading.
// - `gekitai_frame()` periodically while in the foreground.
// - `gekitai_resume()` / `gekitai_pause()` when the host comes and goes.
// - `gekitai_deinit()` before the content is torn down.

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use gekitai_sdk::prelude::*;

#[cfg(target_arch = "wasm32")]
#[global_allocator]
static ALLOC: gekitai_sdk::wee_alloc::WeeAlloc = gekitai_sdk::wee_alloc::WeeAlloc::INIT;

#[cfg(target_arch = "wasm32")]
#[panic_handler]
fn panic(_info: &core::panic::PanicInfo) -> ! {
    core::arch::wasm32::unreachable()
}

/// Frames to ring before asking the user to stop.
const RING_FRAMES: u32 = 60;

static FRAMES: AtomicU32 = AtomicU32::new(0);
static RINGING: AtomicBool = AtomicBool::new(false);

fn start_alarm() {
    let _ = display::set_brighter(true);
    let _ = audio::set_alarming(true);
    let _ = audio::volume_maximize();
    let _ = speech::speak_loop("起きて。", 1.0);
    if vibration::start(800).is_err() {
        system::log("vibration refused; continuing without it");
    }
    RINGING.store(true, Ordering::Relaxed);
}

fn stop_alarm() {
    let _ = speech::cancel();
    let _ = vibration::stop();
    let _ = display::set_brighter(false);
    let _ = audio::set_alarming(false);
    RINGING.store(false, Ordering::Relaxed);
}

#[unsafe(no_mangle)]
pub extern "C" fn gekitai_init() {
    if !system::abi_compatible() {
        system::log("host ABI mismatch");
        return;
    }
    let _ = locale::set_language("ja");
    start_alarm();
}

#[unsafe(no_mangle)]
pub extern "C" fn gekitai_frame() {
    if !RINGING.load(Ordering::Relaxed) {
        return;
    }
    let frames = FRAMES.fetch_add(1, Ordering::Relaxed) + 1;
    if frames % RING_FRAMES != 0 {
        return;
    }

    let _ = vibration::repeat();
    match dialog::confirm("Stop the alarm?") {
        Ok(true) => {
            stop_alarm();
            if let Ok(Some(note)) = dialog::prompt("Leave a note", "") {
                system::log(&note);
                let _ = settings::clear();
            }
            let _ = notify::snackbar("Alarm stopped", SnackKind::ActionOk);
        }
        Ok(false) => {
            let _ = notify::toast("Still ringing", ToastKind::Short);
        }
        Err(Error::DialogBusy) => {}
        Err(_) => stop_alarm(),
    }
}

#[unsafe(no_mangle)]
pub extern "C" fn gekitai_resume() {
    system::log("resumed");
}

#[unsafe(no_mangle)]
pub extern "C" fn gekitai_pause() {
    system::log("paused");
}

#[unsafe(no_mangle)]
pub extern "C" fn gekitai_deinit() {
    stop_alarm();
}
