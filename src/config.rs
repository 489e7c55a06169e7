//! # Probe Configuration
//!
//! Configuration management for the probe library and CLI.
//! Supports config files, environment variables, and command-line overrides.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::error::{ProbeError, ProbeResult};
use crate::types::{ActivityEncoding, NewActivity};

/// Values given on the `run` command line
#[derive(Debug, Clone, Default)]
pub struct RunOverrides {
    pub base_url: Option<String>,
    pub auth_token: Option<String>,
    pub extended: bool,
}

/// Environment variable prefix shared by every override
pub const ENV_PREFIX: &str = "ECOVERSE_PROBE";

/// Probe configuration for backend connection, fixtures, and CLI behavior
///
/// # Examples
///
/// ```rust
/// use ecoverse_probe::config::ProbeConfig;
///
/// let config = ProbeConfig::default();
/// assert_eq!(config.endpoint.base_url, "http://localhost:3001/api");
/// assert_eq!(config.readiness.max_attempts, 5);
/// assert_eq!(config.fixtures.expected_email, "test@example.com");
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Backend endpoint and credentials
    pub endpoint: EndpointConfig,
    /// Readiness polling policy
    pub readiness: ReadinessConfig,
    /// Known values the backend is expected to return
    pub fixtures: FixtureConfig,
    /// Payload submitted by the activity creation step
    pub activity: ActivityConfig,
    /// Step selection defaults
    pub probe: ProbeSelection,
    /// CLI-specific settings
    pub cli: CliConfig,
}

/// Backend endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// Base URL including the API prefix (e.g., "<http://localhost:3001/api>")
    pub base_url: String,
    /// Request timeout in milliseconds
    pub timeout_ms: u64,
    /// Bearer token sent on authenticated calls
    pub auth_token: String,
}

/// Readiness polling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadinessConfig {
    /// Number of health probes before giving up
    pub max_attempts: u32,
    /// Fixed delay between attempts in milliseconds
    pub retry_interval_ms: u64,
}

/// Activity creation payload and its encoding
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityConfig {
    /// Activity type (e.g., "CYCLING")
    pub kind: String,
    pub title: String,
    pub description: String,
    /// Kilograms of CO2 the activity saved
    pub co2_saved: f64,
    /// How the fields are submitted
    pub encoding: ActivityEncoding,
}

/// Fixture values
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FixtureConfig {
    /// Email the fixture credential resolves to
    pub expected_email: String,
}

/// Which optional checks run by default
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeSelection {
    /// Run the extended checks after the core sequence
    pub extended: bool,
}

/// CLI-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Default output format (table, json)
    pub default_format: String,
    /// Verbose logging level
    pub verbose_level: u8,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3001/api".to_string(),
            timeout_ms: 30000,
            auth_token: "mock-token".to_string(),
        }
    }
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            retry_interval_ms: 2000,
        }
    }
}

impl ReadinessConfig {
    pub fn retry_interval(&self) -> Duration {
        Duration::from_millis(self.retry_interval_ms)
    }
}

impl Default for ActivityConfig {
    fn default() -> Self {
        Self {
            kind: "CYCLING".to_string(),
            title: "Morning Commute".to_string(),
            description: "Cycled 5km to work".to_string(),
            co2_saved: 1.2,
            encoding: ActivityEncoding::default(),
        }
    }
}

impl ActivityConfig {
    /// Wire payload for the activity creation call
    pub fn payload(&self) -> NewActivity {
        NewActivity {
            kind: self.kind.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            co2_saved: self.co2_saved,
        }
    }
}

impl Default for FixtureConfig {
    fn default() -> Self {
        Self {
            expected_email: "test@example.com".to_string(),
        }
    }
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            default_format: "table".to_string(),
            verbose_level: 0,
        }
    }
}

impl ProbeConfig {
    /// Load configuration from the standard config file locations and the environment
    ///
    /// Precedence (highest to lowest):
    /// 1. Environment variables (`ECOVERSE_PROBE_*`)
    /// 2. Config file (first of `./ecoverse-probe.toml`, `./config/ecoverse-probe.toml`,
    ///    `~/.ecoverse/probe.toml`, `<config dir>/ecoverse/probe.toml`)
    /// 3. Default values
    ///
    /// The result is not validated; callers apply their own overrides first
    /// and then call [`ProbeConfig::validate`].
    pub fn load() -> ProbeResult<Self> {
        let mut config = match Self::find_config_file() {
            Some(path) => {
                debug!("Loading config from: {}", path.display());
                Self::load_from_file(&path)?
            }
            None => Self::default(),
        };

        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Load configuration from an explicit file, then apply environment overrides
    ///
    /// Like [`ProbeConfig::load`], the result is not validated.
    pub fn load_with_file(path: &Path) -> ProbeResult<Self> {
        let mut config = Self::load_from_file(path)?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Load configuration from specific file
    pub fn load_from_file(path: &Path) -> ProbeResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ProbeError::config_error(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        toml::from_str(&content).map_err(|e| {
            ProbeError::config_error(format!(
                "Failed to parse config file {}: {}",
                path.display(),
                e
            ))
        })
    }

    /// Find the config file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        let mut candidates = vec![
            PathBuf::from("./ecoverse-probe.toml"),
            PathBuf::from("./config/ecoverse-probe.toml"),
        ];
        if let Some(home) = dirs::home_dir() {
            candidates.push(home.join(".ecoverse").join("probe.toml"));
        }
        if let Some(config_dir) = dirs::config_dir() {
            candidates.push(config_dir.join("ecoverse").join("probe.toml"));
        }

        candidates.into_iter().find(|path| path.is_file())
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) -> ProbeResult<()> {
        if let Some(url) = env_var("BASE_URL") {
            self.endpoint.base_url = url;
        }
        if let Some(timeout) = env_var("TIMEOUT_MS") {
            self.endpoint.timeout_ms = parse_env("TIMEOUT_MS", &timeout)?;
        }
        if let Some(token) = env_var("AUTH_TOKEN") {
            self.endpoint.auth_token = token;
        }

        if let Some(attempts) = env_var("READINESS_ATTEMPTS") {
            self.readiness.max_attempts = parse_env("READINESS_ATTEMPTS", &attempts)?;
        }
        if let Some(interval) = env_var("READINESS_INTERVAL_MS") {
            self.readiness.retry_interval_ms = parse_env("READINESS_INTERVAL_MS", &interval)?;
        }

        if let Some(email) = env_var("EXPECTED_EMAIL") {
            self.fixtures.expected_email = email;
        }
        if let Some(encoding) = env_var("ACTIVITY_ENCODING") {
            self.activity.encoding = encoding.parse::<ActivityEncoding>()?;
        }
        if let Some(extended) = env_var("EXTENDED") {
            self.probe.extended = parse_env("EXTENDED", &extended)?;
        }

        if let Some(format) = env_var("FORMAT") {
            self.cli.default_format = format;
        }

        Ok(())
    }

    /// Apply command-line overrides, the highest-precedence layer
    pub fn apply_run_overrides(&mut self, overrides: RunOverrides) {
        if let Some(base_url) = overrides.base_url {
            self.endpoint.base_url = base_url;
        }
        if let Some(token) = overrides.auth_token {
            self.endpoint.auth_token = token;
        }
        if overrides.extended {
            self.probe.extended = true;
        }
    }

    /// Reject configurations the probe cannot run with
    pub fn validate(&self) -> ProbeResult<()> {
        reqwest::Url::parse(&self.endpoint.base_url).map_err(|e| {
            ProbeError::config_error(format!(
                "Invalid base URL '{}': {}",
                self.endpoint.base_url, e
            ))
        })?;

        if self.endpoint.auth_token.trim().is_empty() {
            return Err(ProbeError::config_error("Auth token must not be empty"));
        }
        if self.readiness.max_attempts == 0 {
            return Err(ProbeError::config_error(
                "Readiness max_attempts must be at least 1",
            ));
        }
        if self.endpoint.timeout_ms == 0 {
            return Err(ProbeError::config_error("Request timeout must be positive"));
        }
        if !matches!(self.cli.default_format.as_str(), "table" | "json") {
            return Err(ProbeError::config_error(format!(
                "Unknown output format '{}' (expected table or json)",
                self.cli.default_format
            )));
        }

        Ok(())
    }

    /// Save configuration to file
    pub fn save_to_file(&self, path: &Path) -> ProbeResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| ProbeError::config_error(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get default config file path
    pub fn default_config_path() -> ProbeResult<PathBuf> {
        let home_dir = dirs::home_dir()
            .ok_or_else(|| ProbeError::config_error("Could not determine home directory"))?;

        Ok(home_dir.join(".ecoverse").join("probe.toml"))
    }
}

fn env_var(suffix: &str) -> Option<String> {
    std::env::var(format!("{ENV_PREFIX}_{suffix}")).ok()
}

fn parse_env<T>(suffix: &str, raw: &str) -> ProbeResult<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e| {
        ProbeError::config_error(format!("Invalid {ENV_PREFIX}_{suffix} '{raw}': {e}"))
    })
}
