//! TOML configuration file loading
//!
//! Supports `~/.config/line-gemini/config.toml` as a persistent config source.
//! All fields are optional; the file is a partial overlay on top of defaults.

use std::path::PathBuf;

use serde::Deserialize;

use crate::Result;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct GatewayConfigFile {
    /// LINE channel configuration
    #[serde(default)]
    pub line: LineFileConfig,

    /// Gemini configuration
    #[serde(default)]
    pub gemini: GeminiFileConfig,

    /// Server/runtime configuration
    #[serde(default)]
    pub server: ServerFileConfig,

    /// Upload directory and media limits
    #[serde(default)]
    pub upload: UploadFileConfig,
}

/// LINE Messaging API settings
#[derive(Debug, Default, Deserialize)]
pub struct LineFileConfig {
    pub channel_access_token: Option<String>,
    pub channel_secret: Option<String>,
    pub webhook_secret: Option<String>,
    pub api_base: Option<String>,
    pub data_api_base: Option<String>,
}

/// Gemini settings
#[derive(Debug, Default, Deserialize)]
pub struct GeminiFileConfig {
    pub api_key: Option<String>,

    /// Model identifier (e.g. "gemini-1.5-flash")
    pub model: Option<String>,

    pub api_base: Option<String>,
}

/// Server/runtime configuration
#[derive(Debug, Default, Deserialize)]
pub struct ServerFileConfig {
    /// HTTP port
    pub port: Option<u16>,

    /// Path prefix all routes are mounted under (e.g. "/bot")
    pub base_path: Option<String>,

    /// Deployment environment label
    pub environment: Option<String>,
}

/// Upload directory and media limits
#[derive(Debug, Default, Deserialize)]
pub struct UploadFileConfig {
    pub dir: Option<String>,
    pub max_file_size: Option<u64>,
    pub allowed_mime_types: Option<Vec<String>>,
}

/// Parse a config file body
///
/// # Errors
///
/// Returns error if the content is not valid TOML for this schema
pub fn parse_config_file(content: &str) -> Result<GatewayConfigFile> {
    Ok(toml::from_str(content)?)
}

/// Load the TOML config file from the standard path
///
/// Returns `GatewayConfigFile::default()` if the file doesn't exist or can't be parsed.
pub fn load_config_file() -> GatewayConfigFile {
    let Some(path) = config_file_path() else {
        return GatewayConfigFile::default();
    };

    if !path.exists() {
        return GatewayConfigFile::default();
    }

    match std::fs::read_to_string(&path) {
        Ok(content) => match parse_config_file(&content) {
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
                GatewayConfigFile::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file"
            );
            GatewayConfigFile::default()
        }
    }
}

/// Return the config file path: `~/.config/line-gemini/config.toml`
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("line-gemini").join("config.toml"))
}
