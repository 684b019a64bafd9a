//! Connection configuration for the remote tracking service.

use crate::error::{ClientError, Result};
use std::env;
use std::fmt;

/// Environment variable holding the service endpoint URL.
pub const ENV_URL: &str = "AZURE_DEVOPS_URL";
/// Environment variable holding the organization name.
pub const ENV_ORGANIZATION: &str = "AZURE_DEVOPS_ORGANIZATION";
/// Environment variable holding the project name.
pub const ENV_PROJECT: &str = "AZURE_DEVOPS_PROJECT";
/// Environment variable holding the personal access token.
pub const ENV_TOKEN: &str = "AZURE_DEVOPS_TOKEN";
/// Environment variable overriding the pinned protocol version.
pub const ENV_API_VERSION: &str = "API_VERSION";
/// Environment variable enabling the TLS verification bypass.
pub const ENV_ALLOW_INVALID_CERTS: &str = "AZURE_DEVOPS_ALLOW_INVALID_CERTS";

/// Protocol version pinned on every request unless overridden.
pub const DEFAULT_API_VERSION: &str = "6.0";

/// Resolved connection settings for the remote tracking service.
///
/// Construction fails fast when a required setting is absent; an incomplete
/// configuration cannot address or authenticate any call.
#[derive(Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub organization: String,
    pub project: String,
    pub token: String,
    pub api_version: String,

    /// Disable TLS certificate verification on the transport. Off unless
    /// explicitly requested.
    pub danger_accept_invalid_certs: bool,
}

impl ClientConfig {
    /// Build a configuration from explicit values.
    ///
    /// # Errors
    /// Returns `ClientError::MissingSetting` when a required value is empty.
    pub fn new(
        base_url: impl Into<String>,
        organization: impl Into<String>,
        project: impl Into<String>,
        token: impl Into<String>,
    ) -> Result<Self> {
        Self::from_parts(
            non_empty(base_url.into()),
            non_empty(organization.into()),
            non_empty(project.into()),
            non_empty(token.into()),
            None,
            false,
        )
    }

    /// Load the configuration from environment variables.
    ///
    /// # Errors
    /// Returns `ClientError::MissingSetting` naming the first absent
    /// required variable.
    pub fn from_env() -> Result<Self> {
        Self::from_parts(
            env_var(ENV_URL),
            env_var(ENV_ORGANIZATION),
            env_var(ENV_PROJECT),
            env_var(ENV_TOKEN),
            env_var(ENV_API_VERSION),
            env_var(ENV_ALLOW_INVALID_CERTS).is_some_and(|v| v == "1" || v.eq_ignore_ascii_case("true")),
        )
    }

    fn from_parts(
        base_url: Option<String>,
        organization: Option<String>,
        project: Option<String>,
        token: Option<String>,
        api_version: Option<String>,
        danger_accept_invalid_certs: bool,
    ) -> Result<Self> {
        Ok(Self {
            base_url: base_url.ok_or(ClientError::MissingSetting(ENV_URL))?,
            organization: organization.ok_or(ClientError::MissingSetting(ENV_ORGANIZATION))?,
            project: project.ok_or(ClientError::MissingSetting(ENV_PROJECT))?,
            token: token.ok_or(ClientError::MissingSetting(ENV_TOKEN))?,
            api_version: api_version.unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            danger_accept_invalid_certs,
        })
    }

    /// Root of the project-scoped REST area:
    /// `<endpoint>/<organization>/<project>/_apis`.
    #[must_use]
    pub fn api_root(&self) -> String {
        format!(
            "{}/{}/{}/_apis",
            self.base_url.trim_end_matches('/'),
            self.organization,
            self.project
        )
    }

    /// Override the pinned protocol version.
    #[must_use]
    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    /// Opt in to the TLS verification bypass.
    #[must_use]
    pub const fn with_invalid_certs(mut self, allow: bool) -> Self {
        self.danger_accept_invalid_certs = allow;
        self
    }
}

// The token never appears in logs or error chains.
impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("organization", &self.organization)
            .field("project", &self.project)
            .field("token", &"<redacted>")
            .field("api_version", &self.api_version)
            .field("danger_accept_invalid_certs", &self.danger_accept_invalid_certs)
            .finish()
    }
}

fn env_var(name: &str) -> Option<String> {
    env::var(name).ok().and_then(non_empty)
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}
