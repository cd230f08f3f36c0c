//! Development runner: hosts a content module on the headless platform.
//!
//! Drives one full lifecycle (start, resume, pause, stop, destroy) and logs
//! every capability effect the content triggers.

use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use gekitai_core::config::HostConfig;
use gekitai_core::headless::{DialogAnswer, Effect, Headless, HeadlessOptions};
use gekitai_core::locale::Locale;
use gekitai_core::runtime::{ContentLink, WasmtimeRuntime};
use gekitai_core::settings::FileSettingsStore;
use gekitai_core::{Coordinator, LifecycleEvent, bridge, event_loop, loader, logging};

#[derive(Debug, Parser)]
#[command(name = "gekitai-host", version, about = "Run Gekitai content on a headless host")]
struct Cli {
    /// TOML configuration file. Missing file means defaults.
    #[arg(long, short = 'c', env = "GEKITAI_CONFIG")]
    config: Option<PathBuf>,

    /// Content module (`.wasm` or `.wat`). Overrides `content.module`.
    #[arg(long, short = 'm')]
    module: Option<PathBuf>,

    /// Initial locale tag for host strings (e.g. `ja`, `en`).
    #[arg(long)]
    locale: Option<String>,

    /// How long to stay resumed before backgrounding and tearing down.
    #[arg(long, default_value_t = 2000)]
    run_for_ms: u64,

    /// `tracing` filter directive. Overrides `logging.level`.
    #[arg(long)]
    log_level: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => HostConfig::load(path)?,
        None => HostConfig::default(),
    };
    if let Some(module) = cli.module {
        config.content.module = Some(module);
    }
    if let Some(tag) = cli.locale.as_deref() {
        config.locale.default = Locale::from_tag(tag);
    }
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    logging::init(&config.logging);

    let (host, events) = bridge::channel();
    let options = HeadlessOptions {
        dialog_answer: DialogAnswer::Positive,
        permission_answer: Some(true),
        ..HeadlessOptions::default()
    };
    let (mut platform, headless) = Headless::platform(&options, &host);
    platform.settings = Box::new(FileSettingsStore::new(&config.settings.path));
    let mut coordinator = Coordinator::new(platform, config.speech.voice(), config.locale.default);

    match &config.content.module {
        Some(path) => {
            let engine = WasmtimeRuntime::engine()?;
            let module = loader::load_module(&engine, path)?;
            let frame_interval = config.content.frame_interval();
            let link = ContentLink::spawn(&engine, &module, host.bridge(), frame_interval)
                .with_context(|| format!("failed to start content {}", path.display()))?;
            coordinator.attach_content(Box::new(link));
            info!(module = %path.display(), "content attached");
        }
        None => {
            coordinator.attach_content(Box::new(headless.content()));
            info!("no content module; running lifecycle only");
        }
    }

    host.lifecycle(LifecycleEvent::Start)?;
    host.lifecycle(LifecycleEvent::Resume)?;

    let run_for = Duration::from_millis(cli.run_for_ms);
    let driver = host.clone();
    thread::Builder::new()
        .name("gekitai-lifecycle".into())
        .spawn(move || {
            thread::sleep(run_for);
            for event in [LifecycleEvent::Pause, LifecycleEvent::Stop, LifecycleEvent::Destroy] {
                if driver.lifecycle(event).is_err() {
                    break;
                }
            }
        })
        .context("failed to spawn lifecycle driver")?;

    event_loop::run(&mut coordinator, events);

    let effects = headless.log.snapshot();
    info!(
        effects = effects.len(),
        utterances = effects.iter().filter(|e| matches!(e, Effect::Speak(_))).count(),
        vibrations = effects.iter().filter(|e| matches!(e, Effect::Vibrate { .. })).count(),
        dialogs = effects.iter().filter(|e| matches!(e, Effect::Dialog(_))).count(),
        state = ?coordinator.state(),
        "host finished"
    );
    Ok(())
}
