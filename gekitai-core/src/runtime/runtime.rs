//! Wasmtime engine, store and linker for one content module.

use tracing::debug;
use wasmtime::{Engine, Instance, Linker, Module, Store};

use super::imports::{self, GuestState};
use crate::abi;
use crate::bridge::Bridge;

pub struct WasmtimeRuntime {
    pub engine: Engine,
    pub store: Store<GuestState>,
    pub linker: Linker<GuestState>,
}

impl WasmtimeRuntime {
    /// Build a runtime whose imports forward to `bridge`.
    pub fn new(engine: &Engine, bridge: Bridge) -> wasmtime::Result<Self> {
        let store = Store::new(engine, GuestState { bridge });
        let mut linker = Linker::new(engine);
        imports::define_imports(&mut linker)?;
        Ok(Self {
            engine: engine.clone(),
            store,
            linker,
        })
    }

    /// Engine configuration shared by every content module.
    pub fn engine() -> wasmtime::Result<Engine> {
        let mut cfg = wasmtime::Config::new();
        cfg.wasm_multi_value(true);
        cfg.wasm_bulk_memory(true);
        cfg.wasm_reference_types(true);
        cfg.wasm_simd(true);
        Engine::new(&cfg)
    }

    /// Instantiate `module` and resolve its entrypoints.
    pub fn instantiate(
        &mut self,
        module: &Module,
    ) -> wasmtime::Result<(Instance, abi::GuestEntrypoints)> {
        let instance = self.linker.instantiate(&mut self.store, module)?;

        abi::validate::required_exports_present(&instance, &mut self.store)
            .map_err(|e| wasmtime::Error::msg(format!("content missing required export: {e:?}")))?;
        let entrypoints = abi::GuestEntrypoints::resolve(&instance, &mut self.store)?;
        debug!(
            init = entrypoints.init.is_some(),
            resume = entrypoints.resume.is_some(),
            pause = entrypoints.pause.is_some(),
            deinit = entrypoints.deinit.is_some(),
            "content instantiated"
        );

        Ok((instance, entrypoints))
    }
}
