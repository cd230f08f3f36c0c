use std::time::{Duration, Instant};

use crossbeam_channel::Receiver;

use gekitai_core::headless::{DialogAnswer, Effect, Headless, HeadlessOptions};
use gekitai_core::locale::Locale;
use gekitai_core::platform::{Amplitude, NoticeDuration};
use gekitai_core::runtime::{ContentLink, WasmtimeRuntime};
use gekitai_core::speech::Voice;
use gekitai_core::{Coordinator, HostEvent, HostHandle, LifecycleEvent, bridge, event_loop, loader};

const FRAME_INTERVAL: Duration = Duration::from_millis(5);

/// Vibrates and toasts on init, toasts again (long) when paused.
const ALARM_GUEST: &str = r#"
(module
  (import "env" "gekitai_start_vibrator" (func $vibrate (param i32 i32) (result i32)))
  (import "env" "gekitai_show_toast" (func $toast (param i32 i32 i32) (result i32)))
  (memory (export "memory") 1)
  (data (i32.const 0) "250")
  (data (i32.const 16) "hello")
  (data (i32.const 32) "paused")
  (func (export "gekitai_init")
    (drop (call $vibrate (i32.const 0) (i32.const 3)))
    (drop (call $toast (i32.const 16) (i32.const 5) (i32.const 0))))
  (func (export "gekitai_frame"))
  (func (export "gekitai_pause")
    (drop (call $toast (i32.const 32) (i32.const 6) (i32.const 1))))
  (func (export "gekitai_deinit")))
"#;

/// Reports through toasts what the host answered.
const PROBING_GUEST: &str = r#"
(module
  (import "env" "gekitai_start_vibrator" (func $vibrate (param i32 i32) (result i32)))
  (import "env" "gekitai_confirm" (func $confirm (param i32 i32) (result i32)))
  (import "env" "gekitai_show_toast" (func $toast (param i32 i32 i32) (result i32)))
  (memory (export "memory") 1)
  (data (i32.const 0) "Stop?")
  (data (i32.const 16) "rejected")
  (data (i32.const 32) "confirmed")
  (func (export "gekitai_init")
    ;; Out-of-bounds argument: refused with InvalidArgument (1).
    (if (i32.eq (call $vibrate (i32.const 65530) (i32.const 16)) (i32.const 1))
      (then (drop (call $toast (i32.const 16) (i32.const 8) (i32.const 0)))))
    ;; Blocks until the dialog is answered.
    (if (i32.eq (call $confirm (i32.const 0) (i32.const 5)) (i32.const 1))
      (then (drop (call $toast (i32.const 32) (i32.const 9) (i32.const 0))))))
  (func (export "gekitai_frame")))
"#;

type Host = (Coordinator, Headless, HostHandle, Receiver<HostEvent>);

fn host(options: HeadlessOptions, guest: &str) -> Host {
    let (handle, events) = bridge::channel();
    let (platform, headless) = Headless::platform(&options, &handle);
    let mut coordinator = Coordinator::new(platform, Voice::default(), Locale::Japanese);

    let engine = WasmtimeRuntime::engine().unwrap();
    let module = loader::compile_module(&engine, guest.as_bytes()).unwrap();
    let link = ContentLink::spawn(&engine, &module, handle.bridge(), FRAME_INTERVAL).unwrap();
    coordinator.attach_content(Box::new(link));
    (coordinator, headless, handle, events)
}

fn pump_until(
    coordinator: &mut Coordinator,
    events: &Receiver<HostEvent>,
    done: impl Fn() -> bool,
) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !done() {
        match events.recv_deadline(deadline) {
            Ok(event) => {
                coordinator.handle(event);
            }
            Err(_) => return false,
        }
    }
    true
}

fn toast(text: &str, duration: NoticeDuration) -> Effect {
    Effect::Toast {
        text: text.to_owned(),
        duration,
    }
}

#[test]
fn guest_imports_reach_the_coordinator() {
    let (mut coordinator, headless, handle, events) = host(HeadlessOptions::default(), ALARM_GUEST);
    let log = headless.log.clone();

    assert!(pump_until(&mut coordinator, &events, || {
        log.snapshot().contains(&toast("hello", NoticeDuration::Short))
    }));
    assert!(log.snapshot().contains(&Effect::Vibrate {
        length_ms: 250,
        amplitude: Amplitude::Max,
    }));

    for event in [LifecycleEvent::Start, LifecycleEvent::Resume, LifecycleEvent::Pause] {
        handle.lifecycle(event).unwrap();
    }
    assert!(pump_until(&mut coordinator, &events, || {
        log.snapshot().contains(&toast("paused", NoticeDuration::Long))
    }));

    handle.lifecycle(LifecycleEvent::Stop).unwrap();
    handle.lifecycle(LifecycleEvent::Destroy).unwrap();
    assert!(event_loop::run_until(
        &mut coordinator,
        &events,
        Instant::now() + Duration::from_secs(5)
    ));
    assert!(coordinator.state().is_destroyed());
}

#[test]
fn invalid_arguments_and_blocking_dialogs_round_trip() {
    let options = HeadlessOptions {
        dialog_answer: DialogAnswer::Positive,
        ..HeadlessOptions::default()
    };
    let (mut coordinator, headless, _handle, events) = host(options, PROBING_GUEST);
    let log = headless.log.clone();

    assert!(pump_until(&mut coordinator, &events, || {
        log.snapshot().contains(&toast("confirmed", NoticeDuration::Short))
    }));
    let effects = log.snapshot();
    assert!(effects.contains(&toast("rejected", NoticeDuration::Short)));
    assert!(!effects.iter().any(|e| matches!(e, Effect::Vibrate { .. })));
    assert_eq!(effects.iter().filter(|e| matches!(e, Effect::Dialog(_))).count(), 1);
}

#[test]
fn content_without_a_frame_export_is_refused() {
    let (handle, _events) = bridge::channel();
    let engine = WasmtimeRuntime::engine().unwrap();
    let guest = br#"(module (func (export "gekitai_init")))"#;
    let module = loader::compile_module(&engine, guest).unwrap();
    assert!(ContentLink::spawn(&engine, &module, handle.bridge(), FRAME_INTERVAL).is_err());
}

#[test]
fn garbage_is_not_a_module() {
    let engine = WasmtimeRuntime::engine().unwrap();
    assert!(loader::compile_module(&engine, b"\x7fELF").is_err());
}
