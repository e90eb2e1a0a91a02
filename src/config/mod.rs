//! Configuration management for the LINE gateway

pub mod file;

use std::path::PathBuf;

use secrecy::SecretString;

use self::file::GatewayConfigFile;
use crate::ai::mime::DEFAULT_ALLOWED_MIME_TYPES;
use crate::{Error, Result};

/// Default LINE Messaging API base
pub const DEFAULT_LINE_API_BASE: &str = "https://api.line.me/v2/bot";

/// Default LINE content (binary data) API base
pub const DEFAULT_LINE_DATA_API_BASE: &str = "https://api-data.line.me/v2/bot";

/// Default Gemini REST API base
pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default Gemini model
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";

/// Default upload size limit (10 MiB)
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Gateway configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// LINE channel configuration
    pub line: LineConfig,

    /// Gemini configuration
    pub gemini: GeminiConfig,

    /// HTTP server configuration
    pub server: ServerConfig,

    /// Upload directory and media limits
    pub upload: UploadConfig,
}

/// LINE Messaging API configuration
#[derive(Debug, Clone)]
pub struct LineConfig {
    /// Channel access token (bearer credential for every API call)
    pub channel_access_token: SecretString,

    /// Channel secret used to verify `x-line-signature`; verification is
    /// skipped when unset
    pub channel_secret: Option<SecretString>,

    /// Shared secret for the admin endpoints (`x-api-key`)
    pub webhook_secret: Option<SecretString>,

    /// Messaging API base URL
    pub api_base: String,

    /// Content API base URL
    pub data_api_base: String,
}

/// Gemini API configuration
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: SecretString,
    pub model: String,
    pub api_base: String,
}

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to listen on
    pub port: u16,

    /// Path prefix for every route; empty string mounts at the root
    pub base_path: String,

    /// Deployment environment label reported by `/health`
    pub environment: String,
}

/// Upload directory and media limits
#[derive(Debug, Clone)]
pub struct UploadConfig {
    /// Directory downloaded media is written to
    pub dir: PathBuf,

    /// Maximum accepted content size in bytes
    pub max_file_size: u64,

    /// MIME types the AI pipeline accepts
    pub allowed_mime_types: Vec<String>,
}

impl UploadConfig {
    /// Media policy enforced by the negotiation flow
    #[must_use]
    pub fn policy(&self) -> MediaPolicy {
        MediaPolicy {
            max_file_size: self.max_file_size,
            allowed_mime_types: self.allowed_mime_types.clone(),
        }
    }
}

/// Limits applied to downloaded media before it reaches the AI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaPolicy {
    pub max_file_size: u64,
    pub allowed_mime_types: Vec<String>,
}

impl Default for MediaPolicy {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            allowed_mime_types: DEFAULT_ALLOWED_MIME_TYPES
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

impl MediaPolicy {
    /// Whether the AI pipeline accepts this MIME type
    #[must_use]
    pub fn allows(&self, mime_type: &str) -> bool {
        self.allowed_mime_types
            .iter()
            .any(|m| m.eq_ignore_ascii_case(mime_type))
    }
}

impl Config {
    /// Load configuration from the process environment and the config file
    ///
    /// # Errors
    ///
    /// Returns error if a required credential is missing or a value is malformed
    pub fn load() -> Result<Self> {
        let fc = file::load_config_file();
        Self::from_sources(|key| std::env::var(key).ok(), fc)
    }

    /// Assemble configuration from an environment lookup and a parsed file
    ///
    /// Priority is env > file > default.
    ///
    /// # Errors
    ///
    /// Returns error if a required credential is missing or a value is malformed
    pub fn from_sources<F>(env: F, fc: GatewayConfigFile) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        let channel_access_token = var("CHANNEL_ACCESS_TOKEN")
            .or(fc.line.channel_access_token)
            .ok_or_else(|| Error::Config("CHANNEL_ACCESS_TOKEN is required".to_string()))?;

        let line = LineConfig {
            channel_access_token: SecretString::from(channel_access_token),
            channel_secret: var("CHANNEL_SECRET")
                .or(fc.line.channel_secret)
                .map(SecretString::from),
            webhook_secret: var("WEBHOOK_SECRET")
                .or(fc.line.webhook_secret)
                .map(SecretString::from),
            api_base: var("LINE_API_BASE")
                .or(fc.line.api_base)
                .unwrap_or_else(|| DEFAULT_LINE_API_BASE.to_string()),
            data_api_base: var("LINE_DATA_API_BASE")
                .or(fc.line.data_api_base)
                .unwrap_or_else(|| DEFAULT_LINE_DATA_API_BASE.to_string()),
        };

        let api_key = var("API_KEY")
            .or_else(|| var("GEMINI_API_KEY"))
            .or(fc.gemini.api_key)
            .ok_or_else(|| Error::Config("API_KEY is required".to_string()))?;

        let gemini = GeminiConfig {
            api_key: SecretString::from(api_key),
            model: var("GEMINI_MODEL")
                .or(fc.gemini.model)
                .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            api_base: var("GEMINI_API_BASE")
                .or(fc.gemini.api_base)
                .unwrap_or_else(|| DEFAULT_GEMINI_API_BASE.to_string()),
        };

        let port = match var("PORT") {
            Some(raw) => raw
                .parse()
                .map_err(|_| Error::Config(format!("invalid PORT: {raw}")))?,
            None => fc.server.port.unwrap_or(3000),
        };

        let server = ServerConfig {
            port,
            base_path: normalize_base_path(
                &var("BASE_PATH").or(fc.server.base_path).unwrap_or_default(),
            ),
            environment: var("APP_ENV")
                .or_else(|| var("NODE_ENV"))
                .or(fc.server.environment)
                .unwrap_or_else(|| "development".to_string()),
        };

        let max_file_size = match var("MAX_FILE_SIZE") {
            Some(raw) => raw
                .parse()
                .map_err(|_| Error::Config(format!("invalid MAX_FILE_SIZE: {raw}")))?,
            None => fc.upload.max_file_size.unwrap_or(DEFAULT_MAX_FILE_SIZE),
        };

        let upload = UploadConfig {
            dir: var("UPLOAD_DIR")
                .or(fc.upload.dir)
                .map_or_else(|| PathBuf::from("./uploads"), PathBuf::from),
            max_file_size,
            allowed_mime_types: fc.upload.allowed_mime_types.unwrap_or_else(|| {
                DEFAULT_ALLOWED_MIME_TYPES
                    .iter()
                    .map(ToString::to_string)
                    .collect()
            }),
        };

        Ok(Self {
            line,
            gemini,
            server,
            upload,
        })
    }
}

/// Normalize a route prefix to `""` or `"/segment[/segment...]"`
#[must_use]
pub fn normalize_base_path(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}
