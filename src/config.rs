//! Configuration loading via `ortho-config`.

use std::ffi::OsString;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;

use crate::gateway::DEFAULT_ENDPOINT;
use crate::poller::PollSettings;

const CONFIG_FILE: &str = "devicefarm.toml";

/// Service connection and polling settings derived from environment
/// variables, configuration files, and CLI flags.
#[derive(Clone, Debug, Deserialize, OrthoConfig, PartialEq, Eq)]
#[ortho_config(
    prefix = "DEVICEFARM",
    discovery(
        app_name = "devicefarm",
        env_var = "DEVICEFARM_CONFIG_PATH",
        config_file_name = "devicefarm.toml",
        dotfile_name = ".devicefarm.toml",
        project_file_name = "devicefarm.toml"
    )
)]
pub struct DeviceFarmConfig {
    /// Base URL of the Device Farm API, or of a signing proxy in front of it.
    #[ortho_config(default = DEFAULT_ENDPOINT.to_owned())]
    pub endpoint: String,
    /// Bearer token sent with every API call. Leave unset when a proxy
    /// injects credentials.
    pub auth_token: Option<String>,
    /// Project used when a command does not name one explicitly.
    pub project_arn: Option<String>,
    /// Overall budget for waiting on uploads, in milliseconds.
    #[ortho_config(default = 600_000)]
    pub poll_timeout_ms: i64,
    /// Pause between upload status checks, in milliseconds.
    #[ortho_config(default = 5_000)]
    pub poll_interval_ms: i64,
    /// Per-request HTTP timeout, in seconds.
    #[ortho_config(default = 30)]
    pub http_timeout_secs: u64,
}

/// Metadata for a configuration field, used to generate actionable error messages.
struct FieldMetadata {
    description: &'static str,
    env_var: &'static str,
    toml_key: &'static str,
}

impl FieldMetadata {
    const fn new(description: &'static str, env_var: &'static str, toml_key: &'static str) -> Self {
        Self {
            description,
            env_var,
            toml_key,
        }
    }

    fn missing(&self) -> ConfigError {
        ConfigError::MissingField(format!(
            "missing {}: set {} or add {} to {CONFIG_FILE}",
            self.description, self.env_var, self.toml_key
        ))
    }

    fn invalid(&self, reason: &str) -> ConfigError {
        ConfigError::Invalid(format!(
            "{} {reason}: check {} or {} in {CONFIG_FILE}",
            self.description, self.env_var, self.toml_key
        ))
    }
}

const ENDPOINT: FieldMetadata =
    FieldMetadata::new("Device Farm endpoint", "DEVICEFARM_ENDPOINT", "endpoint");
const AUTH_TOKEN: FieldMetadata =
    FieldMetadata::new("API bearer token", "DEVICEFARM_AUTH_TOKEN", "auth_token");
const PROJECT_ARN: FieldMetadata =
    FieldMetadata::new("Device Farm project ARN", "DEVICEFARM_PROJECT_ARN", "project_arn");
const HTTP_TIMEOUT: FieldMetadata = FieldMetadata::new(
    "HTTP timeout",
    "DEVICEFARM_HTTP_TIMEOUT_SECS",
    "http_timeout_secs",
);

impl DeviceFarmConfig {
    /// Loads configuration without attempting to parse CLI arguments. Values
    /// still merge defaults, configuration files, and environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the merge fails.
    pub fn load_without_cli_args() -> Result<Self, ConfigError> {
        Self::load_from_iter([OsString::from("devicefarm")])
            .map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Performs semantic validation. Error messages include guidance on how
    /// to provide values via environment variables or configuration files.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] when the endpoint is blank and
    /// [`ConfigError::Invalid`] when a value is present but unusable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let endpoint = self.endpoint.trim();
        if endpoint.is_empty() {
            return Err(ENDPOINT.missing());
        }
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(ENDPOINT.invalid("must start with http:// or https://"));
        }
        if self
            .auth_token
            .as_deref()
            .is_some_and(|token| token.trim().is_empty())
        {
            return Err(AUTH_TOKEN.invalid("must not be blank when set"));
        }
        if self.http_timeout_secs == 0 {
            return Err(HTTP_TIMEOUT.invalid("must be at least one second"));
        }
        Ok(())
    }

    /// Resolves the project to act on, preferring `explicit` over the
    /// configured default.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] when neither source provides a
    /// non-blank project ARN.
    pub fn resolve_project(&self, explicit: Option<&str>) -> Result<String, ConfigError> {
        explicit
            .or(self.project_arn.as_deref())
            .map(str::trim)
            .filter(|arn| !arn.is_empty())
            .map(str::to_owned)
            .ok_or_else(|| PROJECT_ARN.missing())
    }

    /// Returns the configured poll deadline and cadence. Negative values
    /// are treated as zero.
    #[must_use]
    pub fn poll_settings(&self) -> PollSettings {
        PollSettings::from_millis(self.poll_timeout_ms, self.poll_interval_ms)
    }

    /// Returns the per-request HTTP timeout.
    #[must_use]
    pub const fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

impl Default for DeviceFarmConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            auth_token: None,
            project_arn: None,
            poll_timeout_ms: 600_000,
            poll_interval_ms: 5_000,
            http_timeout_secs: 30,
        }
    }
}

/// Errors raised during configuration loading and validation.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum ConfigError {
    /// Indicates a required configuration field is empty or missing.
    #[error("missing configuration field: {0}")]
    MissingField(String),
    /// Indicates a configuration value is present but unusable.
    #[error("invalid configuration value: {0}")]
    Invalid(String),
    /// Surfaces errors from the `ortho-config` loader.
    #[error("configuration parsing failed: {0}")]
    Parse(String),
}

impl From<ortho_config::OrthoError> for ConfigError {
    fn from(value: ortho_config::OrthoError) -> Self {
        Self::Parse(value.to_string())
    }
}
