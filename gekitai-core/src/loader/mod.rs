//! Content module loading.
//!
//! Content ships as either a `.wasm` binary or `.wat` text. File extensions
//! are not trusted; the bytes are sniffed, WAT is assembled, and the result is
//! compiled for the host engine.

use std::path::Path;

use thiserror::Error;
use tracing::debug;
use wasmtime::{Engine, Module};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read content module {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("unrecognized content format (expected wasm or wat)")]
    UnrecognizedFormat,
    #[error("failed to parse WAT: {0}")]
    WatParseFailed(#[from] wat::Error),
    #[error("failed to compile content module: {0}")]
    CompileFailed(wasmtime::Error),
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum DetectedFormat {
    Wasm,
    Wat,
}

/// Detect the format and produce valid wasm bytes.
pub fn normalize_to_wasm(bytes: &[u8]) -> Result<Vec<u8>, LoadError> {
    match detect_format(bytes).ok_or(LoadError::UnrecognizedFormat)? {
        DetectedFormat::Wasm => Ok(bytes.to_vec()),
        DetectedFormat::Wat => Ok(wat::parse_bytes(bytes)?.into_owned()),
    }
}

/// Detect, assemble if needed, and compile.
pub fn compile_module(engine: &Engine, bytes: &[u8]) -> Result<Module, LoadError> {
    let wasm = normalize_to_wasm(bytes)?;
    Module::new(engine, &wasm).map_err(LoadError::CompileFailed)
}

pub fn load_module(engine: &Engine, path: &Path) -> Result<Module, LoadError> {
    let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    debug!(path = %path.display(), size = bytes.len(), "loading content module");
    compile_module(engine, &bytes)
}

/// `\0asm` means binary; a `(` after an optional BOM and whitespace means text.
pub fn detect_format(bytes: &[u8]) -> Option<DetectedFormat> {
    if bytes.starts_with(b"\0asm") {
        return Some(DetectedFormat::Wasm);
    }
    let rest = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    let first = rest.iter().find(|b| !matches!(b, b' ' | b'\t' | b'\r' | b'\n'));
    (first == Some(&b'(')).then_some(DetectedFormat::Wat)
}
