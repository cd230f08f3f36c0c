//! The UI-thread loop that feeds host events to the coordinator.

use std::time::Instant;

use crossbeam_channel::{Receiver, RecvTimeoutError};
use tracing::{debug, info};

use crate::bridge::HostEvent;
use crate::coordinator::{Coordinator, Flow};
use crate::error::CapabilityError;

/// Handle events until shutdown, destroy, or every sender is gone.
///
/// The receiver is consumed: once the loop ends, later posts fail with
/// `Disposed` and anything still queued is answered the same way.
pub fn run(coordinator: &mut Coordinator, events: Receiver<HostEvent>) {
    info!("event loop started");
    for event in events.iter() {
        if step(coordinator, event) == Flow::Exit {
            break;
        }
    }
    reject_queued(&events);
    info!(state = ?coordinator.state(), "event loop finished");
}

/// Like [`run`], but gives up at `deadline`. Returns `true` if the loop ended on its own.
///
/// On a `true` return the queue has been answered with `Disposed`; the caller
/// should drop `events` so later posts fail too.
pub fn run_until(
    coordinator: &mut Coordinator,
    events: &Receiver<HostEvent>,
    deadline: Instant,
) -> bool {
    loop {
        match events.recv_deadline(deadline) {
            Ok(event) => {
                if step(coordinator, event) == Flow::Exit {
                    reject_queued(events);
                    return true;
                }
            }
            Err(RecvTimeoutError::Timeout) => return false,
            Err(RecvTimeoutError::Disconnected) => return true,
        }
    }
}

/// Answer everything posted after the loop stopped listening.
fn reject_queued(events: &Receiver<HostEvent>) {
    for event in events.try_iter() {
        match event {
            HostEvent::Dialog { reply, .. } => {
                let _ = reply.send(Err(CapabilityError::Disposed));
            }
            other => debug!(event = ?other, "dropped after the loop ended"),
        }
    }
}

/// Handle whatever is already queued without blocking.
pub fn drain(coordinator: &mut Coordinator, events: &Receiver<HostEvent>) -> Flow {
    for event in events.try_iter() {
        if step(coordinator, event) == Flow::Exit {
            return Flow::Exit;
        }
    }
    Flow::Continue
}

fn step(coordinator: &mut Coordinator, event: HostEvent) -> Flow {
    let flow = coordinator.handle(event);
    if flow == Flow::Exit {
        debug!("shutdown requested");
        return Flow::Exit;
    }
    if coordinator.state().is_destroyed() {
        return Flow::Exit;
    }
    Flow::Continue
}
