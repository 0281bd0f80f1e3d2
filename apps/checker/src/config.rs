use std::{env, fmt, fs, path, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {0}: {1}")]
    ReadFailed(path::PathBuf, #[source] std::io::Error),
    #[error("failed to write config file {0}: {1}")]
    WriteFailed(path::PathBuf, #[source] std::io::Error),
    #[error("failed to parse config file {0}: {1}")]
    ParseFailed(path::PathBuf, #[source] toml::de::Error),
    #[error("failed to serialize config: {0}")]
    SerializeFailed(#[from] toml::ser::Error),
    #[error("no config path available, set XDG_CONFIG_HOME or HOME")]
    ConfigPathUnavailable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub probe: ProbeConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Local libsql file, used when no remote url is set
    pub path: path::PathBuf,
    /// Remote libsql server (libsql:// or https://)
    pub url: Option<String>,
    /// Only ever read from the environment
    #[serde(skip)]
    pub auth_token: Option<String>,
    pub pool_size: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    pub user_agent: String,
    /// Applied to targets stored without a timeout
    pub default_timeout_secs: u64,
    pub probe_spacing_ms: u64,
    /// Response bytes read per probe
    pub max_body_bytes: usize,
}

/// Where the target database lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseLocation {
    Local(path::PathBuf),
    Remote { url: String, auth_token: String },
}

/// Used to ensure we are actually reading a toml file
fn normalize_toml_path(path: &path::Path) -> path::PathBuf {
    let mut path = path.to_path_buf();
    if path.extension().map(|ext| ext != "toml").unwrap_or(true) {
        path.set_extension("toml");
    }
    path
}

/// Get default config path ($XDG_CONFIG_HOME/uptime/config.toml or
/// $HOME/.config/...)
fn default_config_path() -> Result<path::PathBuf, ConfigError> {
    let path = if let Ok(config_home) = env::var("XDG_CONFIG_HOME") {
        path::PathBuf::from(config_home)
    } else if let Some(home_dir) = env::home_dir() {
        home_dir.join(".config")
    } else {
        return Err(ConfigError::ConfigPathUnavailable);
    };

    Ok(path.join("uptime/config.toml"))
}

impl Default for Config {
    fn default() -> Self {
        Self { database: DatabaseConfig::default(), probe: ProbeConfig::default() }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { path: "uptime.db".into(), url: None, auth_token: None, pool_size: 4 }
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            user_agent: uptime::probe::DEFAULT_USER_AGENT.into(),
            default_timeout_secs: 10,
            probe_spacing_ms: 0,
            max_body_bytes: uptime::probe::DEFAULT_BODY_LIMIT,
        }
    }
}

impl DatabaseConfig {
    pub fn location(&self) -> DatabaseLocation {
        match &self.url {
            Some(url) if !url.is_empty() => DatabaseLocation::Remote {
                url: url.clone(),
                auth_token: self.auth_token.clone().unwrap_or_default(),
            },
            _ => DatabaseLocation::Local(self.path.clone()),
        }
    }
}

impl ProbeConfig {
    pub fn default_timeout(&self) -> Duration {
        Duration::from_secs(self.default_timeout_secs)
    }

    pub fn probe_spacing(&self) -> Duration {
        Duration::from_millis(self.probe_spacing_ms)
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let write_indented = |level: usize| {
            move |f: &mut fmt::Formatter<'_>, label: &str, value: &dyn fmt::Display| {
                writeln!(f, "  {:indent$}{}: {}", "", label, value, indent = level * 2)
            }
        };
        let write_title_indented = |level: usize| {
            move |f: &mut fmt::Formatter<'_>, label: &str| {
                writeln!(f, "{:indent$}{}", "", label, indent = level * 2)
            }
        };

        let write_title_1 = write_title_indented(1);
        let write_1 = write_indented(1);

        writeln!(f, "Current Internal Configuration State:")?;
        write_title_1(f, "Database")?;
        match self.database.location() {
            DatabaseLocation::Local(path) => write_1(f, "Path", &path.display())?,
            DatabaseLocation::Remote { url, auth_token } => {
                write_1(f, "Url", &url)?;
                write_1(f, "Auth Token", &if auth_token.is_empty() { "<none>" } else { "<set>" })?;
            }
        }
        write_1(f, "Pool Size", &self.database.pool_size)?;
        write_title_1(f, "Probe")?;
        write_1(f, "User Agent", &self.probe.user_agent)?;
        write_1(f, "Default Timeout (s)", &self.probe.default_timeout_secs)?;
        write_1(f, "Probe Spacing (ms)", &self.probe.probe_spacing_ms)?;
        write_1(f, "Max Body Bytes", &self.probe.max_body_bytes)?;

        Ok(())
    }
}

impl Config {
    /// Generate Config structure from file
    ///
    /// Creates a default config in ~/.config/uptime/config.toml
    ///  or the specified path, with the name config.toml if one does not exist
    pub fn from_config(optional_path: Option<impl AsRef<path::Path>>) -> Result<Self, ConfigError> {
        let config_path: path::PathBuf = if let Some(path) = optional_path {
            normalize_toml_path(path.as_ref())
        } else {
            default_config_path()?
        };

        if config_path.exists() {
            let raw_string = fs::read_to_string(&config_path)
                .map_err(|err| ConfigError::ReadFailed(config_path.clone(), err))?;
            toml::from_str(raw_string.as_str())
                .map_err(|err| ConfigError::ParseFailed(config_path, err))
        } else {
            let config = Self::default();
            config.write_config(&config_path)?;
            tracing::info!("Wrote default configuration to {}", config_path.display());
            Ok(config)
        }
    }

    /// Serialize and write a config to a file
    pub fn write_config(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        let config_str: String = toml::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|err| ConfigError::WriteFailed(path.to_path_buf(), err))?;
        }

        std::fs::write(path, config_str)
            .map_err(|err| ConfigError::WriteFailed(path.to_path_buf(), err))
    }

    /// Apply `UPTIME_DATABASE_*` overrides from the process environment
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| env::var(key).ok())
    }

    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(path) = lookup("UPTIME_DATABASE_PATH") {
            self.database.path = path.into();
        }
        if let Some(url) = lookup("UPTIME_DATABASE_URL") {
            self.database.url = Some(url);
        }
        if let Some(token) = lookup("UPTIME_DATABASE_AUTH_TOKEN") {
            self.database.auth_token = Some(token);
        }
        self
    }
}
