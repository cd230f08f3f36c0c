//! Host configuration, read from an optional TOML file.
//!
//! Every section and field has a default, so an empty or missing file yields a
//! working host.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::locale::Locale;
use crate::speech::Voice;

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct HostConfig {
    pub speech: SpeechConfig,
    pub locale: LocaleConfig,
    pub content: ContentConfig,
    pub settings: SettingsConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SpeechConfig {
    pub pitch: f32,
    pub rate: f32,
    pub locale: Locale,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        let voice = Voice::default();
        Self {
            pitch: voice.pitch,
            rate: voice.rate,
            locale: voice.locale,
        }
    }
}

impl SpeechConfig {
    pub fn voice(&self) -> Voice {
        Voice {
            pitch: self.pitch,
            rate: self.rate,
            locale: self.locale,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LocaleConfig {
    /// Locale for host strings until content calls `set_language`.
    pub default: Locale,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ContentConfig {
    /// `.wasm` or `.wat` module to run.
    pub module: Option<PathBuf>,
    pub frame_interval_ms: u64,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            module: None,
            frame_interval_ms: 16,
        }
    }
}

impl ContentConfig {
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms.max(1))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SettingsConfig {
    pub path: PathBuf,
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            path: std::env::temp_dir().join("gekitai-messages.txt"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing` filter directive, e.g. `info` or `gekitai_core=debug`.
    pub level: String,
    pub json: bool,
    /// Write to this file instead of stderr.
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            json: false,
            file: None,
        }
    }
}

impl HostConfig {
    pub fn from_toml(text: &str) -> anyhow::Result<Self> {
        toml::from_str(text).context("invalid host configuration")
    }

    /// Load from `path`. A missing file gives the defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(text) => Self::from_toml(&text).with_context(|| format!("in {}", path.display())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e).with_context(|| format!("failed to read {}", path.display())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = HostConfig::from_toml("").unwrap();
        assert_eq!(config, HostConfig::default());
        assert_eq!(config.speech.voice(), Voice::default());
        assert_eq!(config.locale.default, Locale::English);
        assert_eq!(config.content.frame_interval(), Duration::from_millis(16));
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = HostConfig::from_toml(
            r#"
            [speech]
            rate = 1.2

            [locale]
            default = "japanese"

            [logging]
            json = true
            "#,
        )
        .unwrap();
        assert_eq!(config.speech.rate, 1.2);
        assert_eq!(config.speech.pitch, 1.0);
        assert_eq!(config.speech.locale, Locale::Japanese);
        assert_eq!(config.locale.default, Locale::Japanese);
        assert!(config.logging.json);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn unknown_locale_is_an_error() {
        assert!(HostConfig::from_toml("[locale]\ndefault = \"klingon\"\n").is_err());
    }

    #[test]
    fn missing_file_is_not_an_error() {
        let path = std::env::temp_dir().join("gekitai-config-does-not-exist.toml");
        assert_eq!(HostConfig::load(&path).unwrap(), HostConfig::default());
    }

    #[test]
    fn zero_frame_interval_is_clamped() {
        let config = HostConfig::from_toml("[content]\nframe_interval_ms = 0\n").unwrap();
        assert_eq!(config.content.frame_interval(), Duration::from_millis(1));
    }
}
