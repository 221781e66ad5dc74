//! Runtime configuration.
//!
//! Every setting has a default; `SCOUT_*` environment variables override them.
//! The crawler itself takes no command-line flags.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_DIRECTORY_URL: &str = "https://www.greystar.com/properties";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {var}: '{value}' ({reason})")]
    InvalidValue {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("{var} must be greater than zero")]
    Zero { var: &'static str },
}

/// Which page renderer the workers use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RendererKind {
    /// Headless Chrome, one browser per worker
    Browser,
    /// Plain HTTP fetch, no script execution
    Http,
}

impl FromStr for RendererKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "browser" | "chrome" => Ok(Self::Browser),
            "http" => Ok(Self::Http),
            other => Err(format!("expected 'browser' or 'http', got '{}'", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub directory_url: String,
    pub links_file: PathBuf,
    pub progress_file: PathBuf,
    pub table_file: PathBuf,
    /// Previously collected batch, compared against by `scout-dedup`
    pub previous_table_file: PathBuf,
    /// Rows of `table_file` not present in `previous_table_file`
    pub batch_table_file: PathBuf,
    pub workers: usize,
    pub page_timeout: Duration,
    pub settle_delay: Duration,
    pub throttle_delay: Duration,
    pub discovery_timeout: Duration,
    pub discovery_settle: Duration,
    pub renderer: RendererKind,
    pub chrome_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            directory_url: DEFAULT_DIRECTORY_URL.to_string(),
            links_file: PathBuf::from("greystar_links.json"),
            progress_file: PathBuf::from("greystar_progress.json"),
            table_file: PathBuf::from("greystar_properties.csv"),
            previous_table_file: PathBuf::from("greystar_properties_paralell.csv"),
            batch_table_file: PathBuf::from("greystar_properties_lote1.csv"),
            workers: 10,
            page_timeout: Duration::from_secs(20),
            settle_delay: Duration::from_secs(1),
            throttle_delay: Duration::from_millis(800),
            discovery_timeout: Duration::from_secs(60),
            discovery_settle: Duration::from_secs(5),
            renderer: RendererKind::Browser,
            chrome_path: None,
        }
    }
}

impl Config {
    /// Defaults with overrides from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Defaults with overrides from `lookup`, which maps a variable name to its value
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        if let Some(url) = get("SCOUT_DIRECTORY_URL") {
            url::Url::parse(&url).map_err(|e| ConfigError::InvalidValue {
                var: "SCOUT_DIRECTORY_URL",
                value: url.clone(),
                reason: e.to_string(),
            })?;
            config.directory_url = url;
        }
        if let Some(path) = get("SCOUT_LINKS_FILE") {
            config.links_file = PathBuf::from(path);
        }
        if let Some(path) = get("SCOUT_PROGRESS_FILE") {
            config.progress_file = PathBuf::from(path);
        }
        if let Some(path) = get("SCOUT_TABLE_FILE") {
            config.table_file = PathBuf::from(path);
        }
        if let Some(path) = get("SCOUT_PREVIOUS_TABLE_FILE") {
            config.previous_table_file = PathBuf::from(path);
        }
        if let Some(path) = get("SCOUT_BATCH_TABLE_FILE") {
            config.batch_table_file = PathBuf::from(path);
        }
        if let Some(value) = get("SCOUT_WORKERS") {
            config.workers = parse_value("SCOUT_WORKERS", &value)?;
            if config.workers == 0 {
                return Err(ConfigError::Zero { var: "SCOUT_WORKERS" });
            }
        }
        if let Some(value) = get("SCOUT_PAGE_TIMEOUT_SECS") {
            config.page_timeout = Duration::from_secs(parse_value("SCOUT_PAGE_TIMEOUT_SECS", &value)?);
        }
        if let Some(value) = get("SCOUT_SETTLE_MS") {
            config.settle_delay = Duration::from_millis(parse_value("SCOUT_SETTLE_MS", &value)?);
        }
        if let Some(value) = get("SCOUT_THROTTLE_MS") {
            config.throttle_delay = Duration::from_millis(parse_value("SCOUT_THROTTLE_MS", &value)?);
        }
        if let Some(value) = get("SCOUT_DISCOVERY_TIMEOUT_SECS") {
            config.discovery_timeout =
                Duration::from_secs(parse_value("SCOUT_DISCOVERY_TIMEOUT_SECS", &value)?);
        }
        if let Some(value) = get("SCOUT_RENDERER") {
            config.renderer = parse_value("SCOUT_RENDERER", &value)?;
        }
        if let Some(path) = get("CHROME_PATH") {
            config.chrome_path = Some(PathBuf::from(path));
        }

        Ok(config)
    }
}

fn parse_value<T>(var: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        var,
        value: value.to_string(),
        reason: e.to_string(),
    })
}
