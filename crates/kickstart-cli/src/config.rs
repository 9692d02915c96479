//! Application configuration.
//!
//! [`AppConfig`] is loaded once at startup and passed down by value. The
//! CLI layer owns config; the core crate only sees the values derived from
//! it ([`ProjectSettings`], [`PipelineSettings`]).
//!
//! # Resolution order (highest priority first)
//!
//! 1. Environment variables `KICKSTART__<SECTION>__<KEY>`
//! 2. Config file (`--config FILE`, or the platform config directory)
//! 3. Built-in defaults
//!
//! Secrets are not configuration: they are read from the environment into
//! [`Credentials`] by [`read_credentials`].

use std::path::PathBuf;
use std::time::Duration;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use kickstart_adapters::{AwsSettings, GitHubSettings, HttpSettings, PostgresSettings};
use kickstart_core::application::{PipelineSettings, PollPolicy};
use kickstart_core::domain::{Credentials, ProjectSettings};

use crate::error::{CliError, CliResult};

const ENV_PREFIX: &str = "KICKSTART";

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub output: OutputConfig,
    pub project: ProjectConfig,
    pub poll: PollConfig,
    pub github: GitHubConfig,
    pub terraform: TerraformConfig,
    pub aws: AwsConfig,
    pub database: DatabaseConfig,
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub no_color: bool,
}

/// Values rendered into generated files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    pub author: String,
    pub license: String,
    pub node_version: String,
    pub initial_version: String,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        let defaults = ProjectSettings::default();
        Self {
            author: defaults.author,
            license: defaults.license,
            node_version: defaults.node_version,
            initial_version: defaults.initial_version,
        }
    }
}

/// Polling cadence for long-running remote operations. A zero
/// `timeout_secs` waits without bound.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    pub interval_secs: u64,
    pub timeout_secs: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_secs: PollPolicy::DEFAULT_INTERVAL.as_secs(),
            timeout_secs: PollPolicy::DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// Organization that owns new repositories; the token's user when unset.
    pub owner: Option<String>,
    pub private: bool,
    pub api_url: Option<String>,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            owner: None,
            private: true,
            api_url: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerraformConfig {
    pub organization: Option<String>,
    /// VCS connection workspaces pull the repository through (`ot-...`).
    pub oauth_token_id: Option<String>,
    pub api_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AwsConfig {
    pub region: Option<String>,
    /// Shared credentials file new access keys are appended to.
    /// Defaults to `~/.aws/credentials`.
    pub credentials_file: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        let defaults = PostgresSettings::default();
        Self {
            host: defaults.host,
            port: defaults.port,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: HttpSettings::default().timeout.as_secs(),
        }
    }
}

impl AppConfig {
    /// Load configuration: defaults, then the file, then the environment.
    ///
    /// An explicit `--config` file must exist; the default location is
    /// optional.
    pub fn load(config_file: Option<&PathBuf>) -> CliResult<Self> {
        let defaults = Config::try_from(&Self::default()).map_err(config_error)?;
        let file = match config_file {
            Some(path) => File::from(path.as_path()).required(true),
            None => File::from(Self::config_path()).required(false),
        };

        Config::builder()
            .add_source(defaults)
            .add_source(file)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .and_then(Config::try_deserialize)
            .map_err(config_error)
    }

    /// Path to the default configuration file.
    ///
    /// Uses `directories::ProjectDirs` for cross-platform correctness,
    /// falling back to `.kickstart.toml` in the current directory.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("com", "kickstart", "kickstart")
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(".kickstart.toml"))
    }

    pub fn project_settings(&self) -> ProjectSettings {
        ProjectSettings {
            author: self.project.author.clone(),
            license: self.project.license.clone(),
            node_version: self.project.node_version.clone(),
            initial_version: self.project.initial_version.clone(),
        }
    }

    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            poll: PollPolicy::from_secs(self.poll.interval_secs, self.poll.timeout_secs),
            private_repository: self.github.private,
            cloud_credentials_file: self
                .aws
                .credentials_file
                .clone()
                .unwrap_or_else(default_credentials_file),
        }
    }

    pub fn http_settings(&self) -> HttpSettings {
        HttpSettings {
            timeout: Duration::from_secs(self.http.timeout_secs),
            ..HttpSettings::default()
        }
    }

    pub fn github_settings(&self) -> GitHubSettings {
        GitHubSettings {
            api_url: self.github.api_url.clone(),
            organization: self.github.owner.clone(),
        }
    }

    pub fn aws_settings(&self, credentials: &Credentials) -> AwsSettings {
        AwsSettings {
            profile: credentials.aws_profile.clone(),
            region: self.aws.region.clone(),
        }
    }

    pub fn postgres_settings(&self) -> PostgresSettings {
        PostgresSettings {
            host: self.database.host.clone(),
            port: self.database.port,
        }
    }
}

fn default_credentials_file() -> PathBuf {
    directories::BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(".aws").join("credentials"))
        .unwrap_or_else(|| PipelineSettings::default().cloud_credentials_file)
}

fn config_error(err: config::ConfigError) -> CliError {
    CliError::ConfigError {
        message: err.to_string(),
        source: Some(Box::new(err)),
    }
}

/// Read every credential from the process environment.
pub fn read_credentials() -> Credentials {
    Credentials::from_lookup(|key| std::env::var(key).ok())
}

/// Where the project directory is created.
pub fn parent_dir() -> CliResult<PathBuf> {
    std::env::current_dir().map_err(|source| CliError::IoError {
        message: "cannot determine the current directory".into(),
        source,
    })
}
