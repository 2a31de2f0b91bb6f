//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{fs, path::PathBuf, str::FromStr, time::Duration};

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use url::Url;

use crate::domain::uploads::{MAX_IMAGE_BYTES, MAX_IMAGES, UploadLimits};

mod cli;

pub use cli::{
    CliArgs, Command, LoggingOverrides, PostTypeArgs, SubmitArgs, SubmitOverrides,
};

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "koinonia";
const ENV_PREFIX: &str = "KOINONIA";
pub(crate) const DEFAULT_UPLOAD_PATH: &str = "/api/community/upload-image";
const DEFAULT_API_TIMEOUT_SECS: u64 = 30;

/// Fully-resolved settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub api: ApiSettings,
    pub logging: LoggingSettings,
    pub uploads: UploadLimits,
}

#[derive(Debug, Clone)]
pub struct ApiSettings {
    /// Backend origin; only the `submit` command needs it.
    pub base_url: Option<Url>,
    pub upload_path: String,
    pub token: Option<String>,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    pub(crate) fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Parse the process arguments and resolve settings for them.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let cli = CliArgs::parse();
    let settings = load(&cli)?;
    Ok((cli, settings))
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;

    raw.apply_logging_overrides(&cli.logging);
    if let Command::Submit(args) = &cli.command {
        raw.apply_submit_overrides(&args.overrides);
    }

    Settings::from_raw(raw)
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    api: RawApiSettings,
    logging: RawLoggingSettings,
    uploads: RawUploadSettings,
}

impl RawSettings {
    fn apply_logging_overrides(&mut self, overrides: &LoggingOverrides) {
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
    }

    fn apply_submit_overrides(&mut self, overrides: &SubmitOverrides) {
        if let Some(url) = overrides.api_base_url.as_ref() {
            self.api.base_url = Some(url.clone());
        }
        if let Some(path) = overrides.api_token_file.as_ref() {
            self.api.token_file = Some(path.clone());
        }
        if let Some(seconds) = overrides.api_timeout_seconds {
            self.api.timeout_seconds = Some(seconds);
        }
        if let Some(path) = overrides.api_upload_path.as_ref() {
            self.api.upload_path = Some(path.clone());
        }
        if let Some(max) = overrides.uploads_max_files {
            self.uploads.max_files = Some(max);
        }
        if let Some(limit) = overrides.uploads_max_file_bytes {
            self.uploads.max_file_bytes = Some(limit);
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            api,
            logging,
            uploads,
        } = raw;

        Ok(Self {
            api: build_api_settings(api)?,
            logging: build_logging_settings(logging)?,
            uploads: build_upload_limits(uploads)?,
        })
    }
}

fn build_api_settings(api: RawApiSettings) -> Result<ApiSettings, LoadError> {
    let base_url = match non_blank(api.base_url) {
        Some(value) => {
            let url = Url::parse(&value)
                .map_err(|err| LoadError::invalid("api.base_url", format!("invalid URL: {err}")))?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(LoadError::invalid(
                    "api.base_url",
                    "scheme must be http or https",
                ));
            }
            Some(url)
        }
        None => None,
    };

    let upload_path =
        non_blank(api.upload_path).unwrap_or_else(|| DEFAULT_UPLOAD_PATH.to_string());

    // A token file wins over an inline token.
    let token = match api.token_file {
        Some(path) => {
            let contents = fs::read_to_string(&path).map_err(|err| {
                LoadError::invalid(
                    "api.token_file",
                    format!("failed to read {}: {err}", path.display()),
                )
            })?;
            let token = contents.trim().to_string();
            if token.is_empty() {
                return Err(LoadError::invalid("api.token_file", "file is empty"));
            }
            Some(token)
        }
        None => non_blank(api.token),
    };

    let timeout_seconds = api.timeout_seconds.unwrap_or(DEFAULT_API_TIMEOUT_SECS);
    if timeout_seconds == 0 {
        return Err(LoadError::invalid(
            "api.timeout_seconds",
            "must be greater than zero",
        ));
    }

    Ok(ApiSettings {
        base_url,
        upload_path,
        token,
        timeout: Duration::from_secs(timeout_seconds),
    })
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::WARN,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_upload_limits(uploads: RawUploadSettings) -> Result<UploadLimits, LoadError> {
    let max_files = uploads.max_files.unwrap_or(MAX_IMAGES);
    if max_files == 0 {
        return Err(LoadError::invalid(
            "uploads.max_files",
            "must be greater than zero",
        ));
    }
    if max_files > MAX_IMAGES {
        return Err(LoadError::invalid(
            "uploads.max_files",
            format!("must not exceed {MAX_IMAGES}"),
        ));
    }

    let max_file_bytes = uploads.max_file_bytes.unwrap_or(MAX_IMAGE_BYTES);
    if max_file_bytes == 0 {
        return Err(LoadError::invalid(
            "uploads.max_file_bytes",
            "must be greater than zero",
        ));
    }
    if max_file_bytes > MAX_IMAGE_BYTES {
        return Err(LoadError::invalid(
            "uploads.max_file_bytes",
            format!("must not exceed {MAX_IMAGE_BYTES} bytes"),
        ));
    }

    Ok(UploadLimits {
        max_files,
        max_file_bytes,
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawApiSettings {
    base_url: Option<String>,
    upload_path: Option<String>,
    token: Option<String>,
    token_file: Option<PathBuf>,
    timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawUploadSettings {
    max_files: Option<usize>,
    max_file_bytes: Option<u64>,
}
