//! The content runtime: a wasm module running on its own thread.
//!
//! The coordinator drives it through a [`ContentLink`], which implements
//! [`ContentHost`] by posting commands. The content thread ticks
//! `gekitai_frame` while resumed and blocks on the command channel otherwise,
//! so a blocking dialog inside the guest only ever stalls this thread.

pub mod imports;
pub mod runtime;

use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, bounded, unbounded};
use tracing::{debug, warn};
use wasmtime::{Engine, Module, Store, TypedFunc};

pub use imports::GuestState;
pub use runtime::WasmtimeRuntime;

use crate::abi::GuestEntrypoints;
use crate::bridge::Bridge;
use crate::platform::{ContentHost, HostSignal};

/// How long `destroy` waits for the content thread to finish `gekitai_deinit`.
const DESTROY_GRACE: Duration = Duration::from_secs(1);

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum ContentCommand {
    Resume,
    Pause,
    Notify(HostSignal),
    Destroy,
}

/// Coordinator-side handle to the content thread.
pub struct ContentLink {
    commands: Sender<ContentCommand>,
    finished: Receiver<()>,
    thread: Option<JoinHandle<()>>,
}

impl ContentLink {
    /// Instantiate `module` and start its thread. Content starts paused.
    pub fn spawn(
        engine: &Engine,
        module: &Module,
        bridge: Bridge,
        frame_interval: Duration,
    ) -> wasmtime::Result<Self> {
        let mut rt = WasmtimeRuntime::new(engine, bridge)?;
        let (_instance, entrypoints) = rt.instantiate(module)?;
        let store = rt.store;

        let (commands, command_rx) = unbounded();
        let (finished_tx, finished) = bounded(1);
        let thread = thread::Builder::new()
            .name("gekitai-content".into())
            .spawn(move || {
                ContentThread {
                    store,
                    entrypoints,
                    commands: command_rx,
                    frame_interval,
                    resumed: false,
                    faulted: false,
                }
                .run();
                let _ = finished_tx.send(());
            })
            .map_err(|e| wasmtime::Error::msg(format!("failed to spawn content thread: {e}")))?;

        Ok(Self {
            commands,
            finished,
            thread: Some(thread),
        })
    }

    fn send(&self, command: ContentCommand) -> bool {
        self.commands.send(command).is_ok()
    }
}

impl ContentHost for ContentLink {
    fn resume(&mut self) {
        self.send(ContentCommand::Resume);
    }

    fn pause(&mut self) {
        self.send(ContentCommand::Pause);
    }

    fn destroy(&mut self) {
        if !self.send(ContentCommand::Destroy) {
            return;
        }
        // The guest may be mid-frame; give it a moment, never block forever.
        match self.finished.recv_timeout(DESTROY_GRACE) {
            Ok(()) => {
                if let Some(thread) = self.thread.take() {
                    let _ = thread.join();
                }
            }
            Err(_) => warn!("content thread did not finish in time; detaching"),
        }
    }

    fn notify(&mut self, signal: HostSignal) -> bool {
        self.send(ContentCommand::Notify(signal))
    }
}

struct ContentThread {
    store: Store<GuestState>,
    entrypoints: GuestEntrypoints,
    commands: Receiver<ContentCommand>,
    frame_interval: Duration,
    resumed: bool,
    /// Set after a trap; the guest is never called again except for deinit.
    faulted: bool,
}

impl ContentThread {
    fn run(mut self) {
        let init = self.entrypoints.init.clone();
        self.call("init", init.as_ref());

        let mut next_frame = Instant::now();
        loop {
            let command = if self.resumed && !self.faulted {
                match self.commands.recv_deadline(next_frame) {
                    Ok(command) => Some(command),
                    Err(RecvTimeoutError::Timeout) => None,
                    Err(RecvTimeoutError::Disconnected) => Some(ContentCommand::Destroy),
                }
            } else {
                Some(self.commands.recv().unwrap_or(ContentCommand::Destroy))
            };

            match command {
                None => {
                    let frame = self.entrypoints.frame.clone();
                    self.call("frame", Some(&frame));
                    next_frame = Instant::now() + self.frame_interval;
                }
                Some(ContentCommand::Resume) => {
                    self.resumed = true;
                    next_frame = Instant::now();
                }
                Some(ContentCommand::Pause) => self.resumed = false,
                Some(ContentCommand::Notify(signal)) => {
                    let export = match signal {
                        HostSignal::Resumed => self.entrypoints.resume.clone(),
                        HostSignal::Paused => self.entrypoints.pause.clone(),
                    };
                    self.call("notify", export.as_ref());
                }
                Some(ContentCommand::Destroy) => {
                    let deinit = self.entrypoints.deinit.clone();
                    self.faulted = false;
                    self.call("deinit", deinit.as_ref());
                    debug!("content thread exiting");
                    return;
                }
            }
        }
    }

    fn call(&mut self, what: &'static str, export: Option<&TypedFunc<(), ()>>) {
        let Some(export) = export else {
            return;
        };
        if self.faulted {
            return;
        }
        if let Err(e) = export.call(&mut self.store, ()) {
            warn!(export = what, error = %e, "content trapped; halting");
            self.faulted = true;
        }
    }
}
