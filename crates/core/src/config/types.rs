use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub auth: AuthConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub transcoder: TranscoderConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub convert_url: ConvertUrlConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Largest request body accepted on the conversion routes.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(std::net::Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    5000
}

fn default_max_upload_bytes() -> usize {
    256 * 1024 * 1024
}

/// Authentication configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    pub method: AuthMethod,
    /// Shared bearer secret (required when method = "bearer")
    #[serde(default)]
    pub secret: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    /// Accept every request. Has to be chosen explicitly.
    None,
    /// `Authorization: Bearer <secret>`
    Bearer,
}

/// External transcoder configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TranscoderConfig {
    /// Path to ffmpeg binary.
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: PathBuf,

    /// Path to ffprobe binary.
    #[serde(default = "default_ffprobe_path")]
    pub ffprobe_path: PathBuf,

    /// Directory holding in-flight artifacts.
    #[serde(default = "default_artifact_dir")]
    pub artifact_dir: PathBuf,

    /// Kill ffmpeg after this many seconds. Unset means no limit.
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// FFmpeg log level (quiet, panic, fatal, error, warning, info, verbose, debug, trace).
    #[serde(default = "default_log_level")]
    pub ffmpeg_log_level: String,

    /// Additional global ffmpeg arguments, placed before the output path.
    #[serde(default)]
    pub extra_ffmpeg_args: Vec<String>,
}

fn default_ffmpeg_path() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_ffprobe_path() -> PathBuf {
    PathBuf::from("ffprobe")
}

fn default_artifact_dir() -> PathBuf {
    std::env::temp_dir().join("opusgate")
}

fn default_log_level() -> String {
    "error".to_string()
}

impl Default for TranscoderConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg_path(),
            ffprobe_path: default_ffprobe_path(),
            artifact_dir: default_artifact_dir(),
            timeout_secs: None,
            ffmpeg_log_level: default_log_level(),
            extra_ffmpeg_args: Vec::new(),
        }
    }
}

impl TranscoderConfig {
    /// Sets the artifact directory.
    pub fn with_artifact_dir(mut self, dir: PathBuf) -> Self {
        self.artifact_dir = dir;
        self
    }

    /// Sets the timeout in seconds.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = Some(timeout_secs);
        self
    }
}

/// Outbound fetch configuration for `/convert-url`.
///
/// Every limit is off by default. Callers choose the URL, so an unlimited
/// fetch is an SSRF and resource-exhaustion surface; production deployments
/// should set at least `timeout_secs` and `max_bytes`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FetchConfig {
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub connect_timeout_secs: Option<u64>,
    #[serde(default)]
    pub max_bytes: Option<u64>,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: None,
            connect_timeout_secs: None,
            max_bytes: None,
            user_agent: default_user_agent(),
        }
    }
}

fn default_user_agent() -> String {
    concat!("opusgate/", env!("CARGO_PKG_VERSION")).to_string()
}

/// Response shape of `/convert-url`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ConvertUrlConfig {
    #[serde(default)]
    pub response: ConvertUrlResponse,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConvertUrlResponse {
    /// Stream the Opus bytes back.
    #[default]
    Stream,
    /// Reply with JSON describing the produced file.
    Metadata,
}

/// Sanitized config for logging and API responses (secret redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub auth: SanitizedAuthConfig,
    pub server: ServerConfig,
    pub transcoder: TranscoderConfig,
    pub fetch: FetchConfig,
    pub convert_url: ConvertUrlConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedAuthConfig {
    pub method: AuthMethod,
    pub secret_configured: bool,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            auth: SanitizedAuthConfig {
                method: config.auth.method,
                secret_configured: config
                    .auth
                    .secret
                    .as_ref()
                    .is_some_and(|s| !s.is_empty()),
            },
            server: config.server.clone(),
            transcoder: config.transcoder.clone(),
            fetch: config.fetch.clone(),
            convert_url: config.convert_url.clone(),
        }
    }
}
