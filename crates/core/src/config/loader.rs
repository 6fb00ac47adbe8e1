use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Prefix for environment overrides, e.g. `OPUSGATE_AUTH__SECRET`.
pub const ENV_PREFIX: &str = "OPUSGATE_";

/// `OPUSGATE_CONFIG` names the config file and is not itself a setting.
fn env_provider() -> Env {
    Env::prefixed(ENV_PREFIX).ignore(&["CONFIG"]).split("__")
}

/// Load configuration from file with environment variable overrides
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    Figment::new()
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Load configuration from `OPUSGATE_*` environment variables alone
pub fn load_config_from_env() -> Result<Config, ConfigError> {
    Figment::new()
        .merge(env_provider())
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}
