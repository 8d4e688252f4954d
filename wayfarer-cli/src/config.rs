//! Layered configuration for the CLI.
//!
//! Connection settings come from `WAYFARER_*` environment variables and
//! global flags, flags winning. `login` credentials additionally honour the
//! `[cmds.login]` table of a configuration file and
//! `WAYFARER_CMDS_LOGIN_*` variables.

use std::time::Duration;

use camino::Utf8PathBuf;
use clap::Parser;
use ortho_config::{MergeComposer, OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use wayfarer_client::{ApiClientConfig, DEFAULT_API_URL};
use wayfarer_core::Credentials;

use crate::CliError;

pub(crate) const ARG_API_URL: &str = "api-url";
pub(crate) const ARG_SESSION_FILE: &str = "session-file";
pub(crate) const ARG_TIMEOUT_SECS: &str = "timeout-secs";
pub(crate) const ARG_EMAIL: &str = "email";
pub(crate) const ARG_PASSWORD: &str = "password";
pub(crate) const ENV_API_URL: &str = "WAYFARER_API_URL";
pub(crate) const ENV_SESSION_FILE: &str = "WAYFARER_SESSION_FILE";
pub(crate) const ENV_TIMEOUT_SECS: &str = "WAYFARER_TIMEOUT_SECS";
pub(crate) const ENV_EMAIL: &str = "WAYFARER_CMDS_LOGIN_EMAIL";
pub(crate) const ENV_PASSWORD: &str = "WAYFARER_CMDS_LOGIN_PASSWORD";

/// Session file used when none is configured.
pub const DEFAULT_SESSION_FILE: &str = ".wayfarer/session.json";
/// Request timeout used when none is configured.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection flags accepted before any subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[ortho_config(prefix = "WAYFARER")]
pub(crate) struct GlobalArgs {
    /// Base URL of the marketplace API, e.g. "http://localhost:5000/api".
    #[arg(long = ARG_API_URL, value_name = "url")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) api_url: Option<String>,
    /// File holding the session token.
    #[arg(long = ARG_SESSION_FILE, value_name = "path")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) session_file: Option<Utf8PathBuf>,
    /// Request timeout in seconds.
    #[arg(long = ARG_TIMEOUT_SECS, value_name = "seconds")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) timeout_secs: Option<u64>,
}

impl GlobalArgs {
    /// Merge the environment under these flags.
    pub(crate) fn into_settings(self) -> Result<ClientSettings, CliError> {
        let mut composer = MergeComposer::new();
        composer.push_environment(environment_layer(|name| std::env::var(name).ok()));
        composer.push_cli(serde_json::to_value(&self).map_err(CliError::CollectArguments)?);
        settings_from_layers(composer.layers())
    }
}

/// Environment layer built from the variables `lookup` can see.
pub(crate) fn environment_layer(lookup: impl Fn(&str) -> Option<String>) -> Value {
    let mut layer = Map::new();
    if let Some(url) = lookup(ENV_API_URL) {
        layer.insert("api_url".to_owned(), Value::String(url));
    }
    if let Some(path) = lookup(ENV_SESSION_FILE) {
        layer.insert("session_file".to_owned(), Value::String(path));
    }
    if let Some(secs) = lookup(ENV_TIMEOUT_SECS).and_then(|raw| raw.trim().parse::<u64>().ok()) {
        layer.insert("timeout_secs".to_owned(), Value::from(secs));
    }
    Value::Object(layer)
}

pub(crate) fn settings_from_layers(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<ClientSettings, CliError> {
    let merged = GlobalArgs::merge_from_layers(layers).map_err(CliError::from)?;
    Ok(ClientSettings::from(merged))
}

/// Resolved connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    /// Base URL of the marketplace API.
    pub api_url: String,
    /// File holding the session token.
    pub session_file: Utf8PathBuf,
    /// Request timeout.
    pub timeout: Duration,
}

impl From<GlobalArgs> for ClientSettings {
    fn from(args: GlobalArgs) -> Self {
        Self {
            api_url: args.api_url.unwrap_or_else(|| DEFAULT_API_URL.to_owned()),
            session_file: args
                .session_file
                .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_SESSION_FILE)),
            timeout: Duration::from_secs(args.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
        }
    }
}

impl ClientSettings {
    /// HTTP client configuration for these settings.
    #[must_use]
    pub fn client_config(&self) -> ApiClientConfig {
        ApiClientConfig::new(self.api_url.clone()).with_timeout(self.timeout)
    }
}

/// CLI arguments for the `login` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "login",
    about = "Sign in and keep the session token",
    long_about = "Sign in with an e-mail and password. Credentials can come \
                 from CLI flags, configuration files, or environment \
                 variables."
)]
#[ortho_config(prefix = "WAYFARER")]
pub(crate) struct LoginArgs {
    /// Account e-mail.
    #[arg(long = ARG_EMAIL, value_name = "email")]
    #[serde(default)]
    pub(crate) email: Option<String>,
    /// Account password.
    #[arg(long = ARG_PASSWORD, value_name = "password")]
    #[serde(default)]
    pub(crate) password: Option<String>,
}

impl LoginArgs {
    pub(crate) fn into_config(self) -> Result<LoginConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        LoginConfig::try_from(merged)
    }
}

/// Resolved `login` credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LoginConfig {
    pub(crate) email: String,
    pub(crate) password: String,
}

impl TryFrom<LoginArgs> for LoginConfig {
    type Error = CliError;

    fn try_from(args: LoginArgs) -> Result<Self, Self::Error> {
        let email = args
            .email
            .map(|email| email.trim().to_owned())
            .filter(|email| !email.is_empty())
            .ok_or(CliError::MissingArgument {
                field: ARG_EMAIL,
                env: ENV_EMAIL,
            })?;
        let password = args.password.ok_or(CliError::MissingArgument {
            field: ARG_PASSWORD,
            env: ENV_PASSWORD,
        })?;
        Ok(Self { email, password })
    }
}

impl From<LoginConfig> for Credentials {
    fn from(config: LoginConfig) -> Self {
        Self {
            email: config.email,
            password: config.password,
        }
    }
}
