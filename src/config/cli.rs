use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueHint, builder::BoolishValueParser};

/// Command-line arguments for the Koinonia binary.
#[derive(Debug, Parser)]
#[command(
    name = "koinonia",
    version,
    about = "Church community admin: post listings through the generic form engine"
)]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "KOINONIA_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(flatten)]
    pub logging: LoggingOverrides,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// List every community post category and how it is created.
    Types,
    /// Print the declarative form of a generic category as JSON.
    Describe(PostTypeArgs),
    /// Print the create-screen route of a category.
    #[command(name = "create-path")]
    CreatePath(PostTypeArgs),
    /// Fill in a generic category's form and submit it.
    Submit(Box<SubmitArgs>),
}

#[derive(Debug, Args, Clone)]
pub struct PostTypeArgs {
    /// Category key, e.g. `free-sharing`.
    #[arg(value_name = "TYPE")]
    pub post_type: String,
}

#[derive(Debug, Args, Default, Clone)]
pub struct LoggingOverrides {
    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new(),
        global = true
    )]
    pub log_json: Option<bool>,
}

#[derive(Debug, Args, Clone)]
pub struct SubmitArgs {
    /// Category key, e.g. `free-sharing`.
    #[arg(value_name = "TYPE")]
    pub post_type: String,

    /// Set a field value; repeat for several fields.
    #[arg(long = "field", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub fields: Vec<(String, String)>,

    /// Read a field value from a file; repeat for several fields.
    #[arg(
        long = "field-file",
        value_name = "KEY=PATH",
        value_parser = parse_key_path,
        value_hint = ValueHint::FilePath
    )]
    pub field_files: Vec<(String, PathBuf)>,

    /// Attach an image; order of the flags is the upload order.
    #[arg(long = "image", value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub images: Vec<PathBuf>,

    /// Zero-based position of the representative image.
    #[arg(long = "main-image", value_name = "INDEX")]
    pub main_image: Option<usize>,

    #[command(flatten)]
    pub overrides: SubmitOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct SubmitOverrides {
    /// Override the backend base URL.
    #[arg(long = "api-base-url", env = "KOINONIA_API_BASE_URL", value_name = "URL")]
    pub api_base_url: Option<String>,

    /// Read the bearer token from a file (takes precedence over configuration).
    #[arg(long = "api-token-file", env = "KOINONIA_API_TOKEN_FILE", value_name = "PATH")]
    pub api_token_file: Option<PathBuf>,

    /// Override the HTTP request timeout.
    #[arg(long = "api-timeout-seconds", value_name = "SECONDS")]
    pub api_timeout_seconds: Option<u64>,

    /// Override the image upload endpoint.
    #[arg(long = "api-upload-path", value_name = "PATH")]
    pub api_upload_path: Option<String>,

    /// Override the maximum number of images per post.
    #[arg(long = "uploads-max-files", value_name = "COUNT")]
    pub uploads_max_files: Option<usize>,

    /// Override the maximum size of one image in bytes.
    #[arg(long = "uploads-max-file-bytes", value_name = "BYTES")]
    pub uploads_max_file_bytes: Option<u64>,
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got `{raw}`"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing field key in `{raw}`"));
    }
    Ok((key.to_string(), value.to_string()))
}

fn parse_key_path(raw: &str) -> Result<(String, PathBuf), String> {
    let (key, path) = parse_key_value(raw)?;
    if path.trim().is_empty() {
        return Err(format!("missing file path in `{raw}`"));
    }
    Ok((key, PathBuf::from(path)))
}
