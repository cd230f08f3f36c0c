//! gekitai-core: the native host for a sandboxed game.
//!
//! The game runs as a WebAssembly module on its own thread and reaches native
//! capabilities (speech, vibration, screen brightness, media volume, dialogs,
//! toasts, locale, persisted settings) only through the [`Bridge`]. A single
//! [`Coordinator`] owns every capability and drives them from the host
//! lifecycle:
//!
//! - Bridge calls are validated on the content thread and queued as
//!   [`HostEvent`]s; the coordinator handles them in arrival order.
//! - Going to the background flushes speech, cancels vibration and restores the
//!   system volume and brightness. Coming back replays what was interrupted.
//! - Modal dialogs block only the content thread that asked for them.
//!
//! Device access sits behind the traits in [`platform`]. [`headless`] provides
//! an implementation that records every effect, used by the `gekitai-host`
//! binary and the tests.
//!
//! The wasm ABI is defined in [`abi`] and mirrored by `gekitai-sdk`.

pub mod abi;
pub mod ambient;
pub mod bridge;
pub mod config;
pub mod coordinator;
pub mod dialog;
pub mod error;
pub mod event_loop;
pub mod headless;
pub mod lifecycle;
pub mod loader;
pub mod locale;
pub mod logging;
pub mod notify;
pub mod permission;
pub mod platform;
pub mod request;
pub mod runtime;
pub mod settings;
pub mod speech;
pub mod vibration;

pub use bridge::{Bridge, HostEvent, HostHandle};
pub use config::HostConfig;
pub use coordinator::{Coordinator, Flow};
pub use error::{CapabilityError, CapabilityResult, LifecycleError};
pub use lifecycle::{LifecycleEvent, LifecycleState};
pub use platform::Platform;
