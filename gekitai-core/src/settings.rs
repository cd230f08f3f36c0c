//! Persisted content settings (the saved message list).

use std::io;
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::info;

use crate::platform::SettingsStore;

/// The message list lives in a single file; clearing removes it.
pub struct FileSettingsStore {
    path: PathBuf,
}

impl FileSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for FileSettingsStore {
    fn clear(&mut self) -> anyhow::Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                info!(path = %self.path.display(), "settings cleared");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e)
                .with_context(|| format!("failed to clear settings at {}", self.path.display())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("gekitai-settings-{}-{name}", std::process::id()))
    }

    #[test]
    fn clear_removes_the_file() {
        let path = scratch("remove");
        std::fs::write(&path, "hello\n").unwrap();
        let mut store = FileSettingsStore::new(&path);
        store.clear().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn clearing_a_missing_file_is_fine() {
        let mut store = FileSettingsStore::new(scratch("missing"));
        store.clear().unwrap();
        store.clear().unwrap();
    }

    #[test]
    fn clearing_a_directory_reports_the_path() {
        let dir = scratch("dir");
        std::fs::create_dir_all(&dir).unwrap();
        let mut store = FileSettingsStore::new(&dir);
        let err = store.clear().unwrap_err();
        assert!(format!("{err:#}").contains("failed to clear settings"));
        std::fs::remove_dir(&dir).unwrap();
    }
}
