//! Runtime configuration
//!
//! Values come from the process environment (optionally seeded from `.env`).

use crate::error::ArcadeError;
use crate::Result;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_RATES_API_BASE_URL: &str = "https://api.exchangerate-api.com/v4/latest";
const DEFAULT_RATES_TIMEOUT_SECS: u64 = 10;
const DEFAULT_SESSION_IDLE_SECS: u64 = 30 * 60;

#[derive(Debug, Clone)]
pub struct ArcadeConfig {
    pub port: u16,
    pub rates_api_base_url: String,
    pub rates_timeout: Duration,
    /// Directory for per-profile progress files. `None` keeps progress in memory.
    pub progress_dir: Option<PathBuf>,
    /// Game sessions untouched for longer than this are dropped.
    pub session_idle: Duration,
    pub launcher: LauncherConfig,
}

#[derive(Debug, Clone)]
pub struct LauncherConfig {
    pub games_dir: PathBuf,
    pub python: String,
    pub pip: String,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            games_dir: PathBuf::from("kid_zone_games"),
            python: "python".to_string(),
            pip: "pip".to_string(),
        }
    }
}

impl Default for ArcadeConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            rates_api_base_url: DEFAULT_RATES_API_BASE_URL.to_string(),
            rates_timeout: Duration::from_secs(DEFAULT_RATES_TIMEOUT_SECS),
            progress_dir: None,
            session_idle: Duration::from_secs(DEFAULT_SESSION_IDLE_SECS),
            launcher: LauncherConfig::default(),
        }
    }
}

impl ArcadeConfig {
    /// Build the configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let port = match env::var("PORT").or_else(|_| env::var("API_PORT")) {
            Ok(raw) => raw
                .parse()
                .map_err(|_| ArcadeError::ConfigError(format!("invalid port: {}", raw)))?,
            Err(_) => defaults.port,
        };

        let rates_timeout = match env::var("RATES_TIMEOUT_SECS") {
            Ok(raw) => Duration::from_secs(raw.parse().map_err(|_| {
                ArcadeError::ConfigError(format!("invalid RATES_TIMEOUT_SECS: {}", raw))
            })?),
            Err(_) => defaults.rates_timeout,
        };

        let session_idle = match env::var("SESSION_IDLE_SECS") {
            Ok(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ArcadeError::ConfigError(format!(
                        "invalid SESSION_IDLE_SECS: {}",
                        raw
                    )))
                }
            },
            Err(_) => defaults.session_idle,
        };

        let rates_api_base_url = env::var("RATES_API_BASE_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or(defaults.rates_api_base_url);

        let progress_dir = env::var("PROGRESS_DIR")
            .ok()
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from);

        let launcher = LauncherConfig {
            games_dir: env::var("LAUNCHER_GAMES_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.launcher.games_dir),
            python: env::var("LAUNCHER_PYTHON").unwrap_or(defaults.launcher.python),
            pip: env::var("LAUNCHER_PIP").unwrap_or(defaults.launcher.pip),
        };

        Ok(Self {
            port,
            rates_api_base_url,
            rates_timeout,
            progress_dir,
            session_idle,
            launcher,
        })
    }
}
