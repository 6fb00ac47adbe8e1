use super::{
    types::{AuthMethod, Config},
    ConfigError,
};

/// Validate configuration
/// Currently validates:
/// - Auth section exists (enforced by serde)
/// - Bearer auth carries a non-empty secret
/// - Server port is not 0
/// - Upload limit is not 0
/// - ffmpeg path is not empty
/// - Optional limits, when set, are not 0
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.auth.method == AuthMethod::Bearer
        && config.auth.secret.as_deref().is_none_or(str::is_empty)
    {
        return Err(ConfigError::ValidationError(
            "auth.secret must be set when auth.method = \"bearer\"".to_string(),
        ));
    }

    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.server.max_upload_bytes == 0 {
        return Err(ConfigError::ValidationError(
            "server.max_upload_bytes cannot be 0".to_string(),
        ));
    }

    if config.transcoder.ffmpeg_path.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "transcoder.ffmpeg_path cannot be empty".to_string(),
        ));
    }

    let zero_limits = [
        ("transcoder.timeout_secs", config.transcoder.timeout_secs),
        ("fetch.timeout_secs", config.fetch.timeout_secs),
        ("fetch.connect_timeout_secs", config.fetch.connect_timeout_secs),
        ("fetch.max_bytes", config.fetch.max_bytes),
    ];
    if let Some((name, _)) = zero_limits.iter().find(|(_, v)| *v == Some(0)) {
        return Err(ConfigError::ValidationError(format!(
            "{} cannot be 0 (omit it to disable the limit)",
            name
        )));
    }

    Ok(())
}
