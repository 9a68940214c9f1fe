//! Configuration loading via `ortho-config`.

use std::ffi::OsString;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;

use crate::aws::DEFAULT_AWS_BIN;
use crate::cloud::{HostnameAttribute, Region};

/// Settings shared by every `hostfleet` invocation, derived from defaults,
/// configuration files, and `HOSTFLEET_*` environment variables.
#[derive(Clone, Debug, Deserialize, OrthoConfig, PartialEq, Eq)]
#[ortho_config(
    prefix = "HOSTFLEET",
    discovery(
        app_name = "hostfleet",
        env_var = "HOSTFLEET_CONFIG_PATH",
        config_file_name = "hostfleet.toml",
        dotfile_name = ".hostfleet.toml",
        project_file_name = "hostfleet.toml"
    )
)]
pub struct HostfleetConfig {
    /// Path or name of the AWS command-line client.
    #[ortho_config(default = DEFAULT_AWS_BIN.to_owned())]
    pub aws_bin: String,
    /// Named AWS profile passed through as `--profile`.
    pub aws_profile: Option<String>,
    /// Region used when the command line does not name one.
    pub default_region: Option<String>,
    /// Instance attribute used as the host name. Accepts the kebab-case,
    /// snake-case, or legacy attribute spellings.
    #[ortho_config(default = "public-dns-name".to_owned())]
    pub hostname_attribute: String,
    /// SSH client used to run commands on resolved hosts.
    #[ortho_config(default = "ssh".to_owned())]
    pub ssh_bin: String,
    /// Remote login user; the SSH client default applies when unset.
    pub ssh_user: Option<String>,
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
            "missing {}: set {} or add {} to hostfleet.toml",
            self.description, self.env_var, self.toml_key
        ))
    }
}

const AWS_BIN: FieldMetadata =
    FieldMetadata::new("AWS CLI program", "HOSTFLEET_AWS_BIN", "aws_bin");
const SSH_BIN: FieldMetadata = FieldMetadata::new("SSH program", "HOSTFLEET_SSH_BIN", "ssh_bin");
const REGION: FieldMetadata = FieldMetadata::new(
    "AWS region (or pass --region)",
    "HOSTFLEET_DEFAULT_REGION",
    "default_region",
);

impl HostfleetConfig {
    /// Loads configuration without attempting to parse CLI arguments. Values
    /// still merge defaults, configuration files, and environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the merge fails.
    pub fn load_without_cli_args() -> Result<Self, ConfigError> {
        Self::load_from_iter([OsString::from("hostfleet")])
            .map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Checks that the program names are usable and the hostname attribute
    /// is recognised.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] for blank program names and
    /// [`ConfigError::InvalidAttribute`] for an unknown attribute.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require(&self.aws_bin, &AWS_BIN)?;
        require(&self.ssh_bin, &SSH_BIN)?;
        self.hostname_attribute().map(|_| ())
    }

    /// Parses the configured hostname attribute.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidAttribute`] when the value names no
    /// known attribute.
    pub fn hostname_attribute(&self) -> Result<HostnameAttribute, ConfigError> {
        self.hostname_attribute
            .parse()
            .map_err(|err: crate::cloud::UnknownAttribute| {
                ConfigError::InvalidAttribute(err.to_string())
            })
    }

    /// Picks the region, preferring `requested` over the configured default.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] when neither names a region.
    pub fn region(&self, requested: Option<&str>) -> Result<Region, ConfigError> {
        let usable = |value: &str| !value.trim().is_empty();
        requested
            .filter(|region| usable(region))
            .or_else(|| self.default_region.as_deref().filter(|region| usable(region)))
            .map(|region| Region::from(region.trim()))
            .ok_or_else(|| REGION.missing())
    }
}

fn require(value: &str, metadata: &FieldMetadata) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(metadata.missing());
    }
    Ok(())
}

/// Errors raised during configuration loading and validation.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum ConfigError {
    /// Indicates a required configuration field is empty or missing.
    #[error("missing configuration field: {0}")]
    MissingField(String),
    /// Surfaces errors from the `ortho-config` loader.
    #[error("configuration parsing failed: {0}")]
    Parse(String),
    /// Raised when the hostname attribute is not recognised.
    #[error("invalid hostname attribute: {0}")]
    InvalidAttribute(String),
}
