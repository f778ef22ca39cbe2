//! Server configuration parsed from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_DASHBOARD_DIR: &str = "dashboards";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required env var: {var}")]
    Missing { var: &'static str },
    #[error("invalid {var}: {value}")]
    Invalid { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
    pub dashboard_dir: PathBuf,
    pub pack_path: PathBuf,
    pub cors: bool,
}

impl Config {
    /// Build typed config from environment variables.
    ///
    /// Required:
    /// - `IDC_PACK`: path to the element pack JSON
    ///
    /// Optional:
    /// - `PORT`: default 3000
    /// - `IDC_DASHBOARD_DIR`: default `dashboards`
    /// - `IDC_CORS`: `true`/`1` enables a permissive CORS layer
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Config::from_env`] with an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = env_parse(&lookup, "PORT", DEFAULT_PORT)?;
        let dashboard_dir = lookup("IDC_DASHBOARD_DIR")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DASHBOARD_DIR.to_owned())
            .into();
        let pack_path = lookup("IDC_PACK")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing { var: "IDC_PACK" })?
            .into();
        let cors = env_bool(&lookup, "IDC_CORS")?;

        Ok(Self { port, dashboard_dir, pack_path, cors })
    }
}

fn env_parse<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(var) {
        None => Ok(default),
        Some(value) => value.trim().parse::<T>().map_err(|_| ConfigError::Invalid { var, value }),
    }
}

fn env_bool(lookup: &impl Fn(&str) -> Option<String>, var: &'static str) -> Result<bool, ConfigError> {
    let Some(value) = lookup(var) else {
        return Ok(false);
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "0" | "false" | "no" | "off" => Ok(false),
        "1" | "true" | "yes" | "on" => Ok(true),
        _ => Err(ConfigError::Invalid { var, value }),
    }
}
