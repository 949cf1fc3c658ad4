//! Configuration management for the doppel console client
//!
//! Merge order: built-in defaults, then `~/.config/omni/doppel/config.toml`,
//! then environment variables. The CLI layers its own flags on top.

use std::path::PathBuf;

use serde::Deserialize;
use url::Url;

use crate::{Error, Result};

/// Default backend base address
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Doppel console configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Backend base address, without trailing slash
    pub base_url: String,

    /// Voice configuration
    pub voice: VoiceConfig,
}

/// Voice capture/playback configuration
#[derive(Debug, Clone)]
pub struct VoiceConfig {
    /// Enable microphone capture and audio playback
    pub enabled: bool,

    /// Play AI reply audio automatically after each chat turn
    pub autoplay_replies: bool,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            autoplay_replies: false,
        }
    }
}

/// Top-level TOML configuration file schema
///
/// All fields are optional — the file is a partial overlay on top of defaults.
#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    /// Backend section
    #[serde(default)]
    pub backend: BackendFileConfig,

    /// Voice section
    #[serde(default)]
    pub voice: VoiceFileConfig,
}

/// Backend-related configuration
#[derive(Debug, Default, Deserialize)]
pub struct BackendFileConfig {
    /// Base address of the doppelganger backend
    pub base_url: Option<String>,
}

/// Voice-related configuration
#[derive(Debug, Default, Deserialize)]
pub struct VoiceFileConfig {
    /// Enable microphone capture and audio playback
    pub enabled: Option<bool>,

    /// Play AI reply audio automatically after each chat turn
    pub autoplay_replies: Option<bool>,
}

impl Config {
    /// Load configuration from file and environment
    ///
    /// # Errors
    ///
    /// Returns error if the resulting base address is not a valid URL
    pub fn load() -> Result<Self> {
        Self::load_with_base_url(None)
    }

    /// Load configuration with an explicit base address override (CLI flag)
    ///
    /// # Errors
    ///
    /// Returns error if the resulting base address is not a valid URL
    pub fn load_with_base_url(override_url: Option<&str>) -> Result<Self> {
        let file = load_config_file();

        let base_url = override_url
            .map(ToString::to_string)
            .or_else(|| std::env::var("DOPPEL_BACKEND_URL").ok())
            .or(file.backend.base_url)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let base_url = normalize_base_url(&base_url)?;

        let voice = VoiceConfig {
            enabled: std::env::var("DOPPEL_DISABLE_VOICE")
                .map(|v| !(v == "1" || v.eq_ignore_ascii_case("true")))
                .ok()
                .or(file.voice.enabled)
                .unwrap_or(true),
            autoplay_replies: file.voice.autoplay_replies.unwrap_or(false),
        };

        Ok(Self { base_url, voice })
    }
}

/// Validate a base address and strip any trailing slash
///
/// # Errors
///
/// Returns error if the address does not parse as an http(s) URL
pub fn normalize_base_url(raw: &str) -> Result<String> {
    let url = Url::parse(raw)
        .map_err(|e| Error::Config(format!("invalid backend URL {raw:?}: {e}")))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::Config(format!(
            "backend URL must be http or https, got {:?}",
            url.scheme()
        )));
    }

    Ok(raw.trim_end_matches('/').to_string())
}

/// Load the TOML config file from the standard path
///
/// Returns `ConfigFile::default()` if the file doesn't exist or can't be parsed.
pub fn load_config_file() -> ConfigFile {
    let Some(path) = config_file_path() else {
        return ConfigFile::default();
    };

    if !path.exists() {
        return ConfigFile::default();
    }

    match std::fs::read_to_string(&path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config file");
                config
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config file, using defaults"
                );
                ConfigFile::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file"
            );
            ConfigFile::default()
        }
    }
}

/// Return the config file path: `~/.config/omni/doppel/config.toml`
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| {
        d.config_dir()
            .join("omni")
            .join("doppel")
            .join("config.toml")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_trailing_slash() {
        let url = normalize_base_url("http://localhost:8000/").unwrap();
        assert_eq!(url, "http://localhost:8000");
    }

    #[test]
    fn normalize_keeps_plain_url() {
        let url = normalize_base_url("https://doppel.example.com").unwrap();
        assert_eq!(url, "https://doppel.example.com");
    }

    #[test]
    fn normalize_rejects_garbage() {
        assert!(normalize_base_url("not a url").is_err());
        assert!(normalize_base_url("ftp://example.com").is_err());
    }

    #[test]
    fn config_file_parses_partial_overlay() {
        let file: ConfigFile = toml::from_str(
            r#"
            [backend]
            base_url = "http://10.0.0.5:8000"
            "#,
        )
        .unwrap();

        assert_eq!(file.backend.base_url.as_deref(), Some("http://10.0.0.5:8000"));
        assert_eq!(file.voice.enabled, None);
    }
}
