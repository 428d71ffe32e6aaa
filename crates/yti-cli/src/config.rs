//! Configuration loading and management.

use std::fmt;
use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// YouTrack connection settings.
    #[serde(default)]
    pub connection: ConnectionConfig,
    /// Toggl API settings.
    #[serde(default)]
    pub toggl: TogglConfig,
}

/// YouTrack connection settings.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Base URL of the YouTrack instance.
    pub url: Option<String>,
    /// Permanent token for the importing user.
    pub token: Option<String>,
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("url", &self.url)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Toggl API settings.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct TogglConfig {
    /// Toggl API token.
    pub token: Option<String>,
    /// Workspace id for report queries.
    pub workspace: Option<String>,
}

impl fmt::Debug for TogglConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TogglConfig")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("workspace", &self.workspace)
            .finish()
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(path) = config_file_path() {
            figment = figment.merge(Toml::file(path));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (YTI_CONNECTION_URL etc.)
        figment = figment.merge(Env::prefixed("YTI_").split("_"));

        figment.extract()
    }

    /// The YouTrack url and token, or an error telling the user how to set
    /// them.
    pub fn youtrack_connection(&self) -> anyhow::Result<(&str, &str)> {
        match (
            self.connection.url.as_deref(),
            self.connection.token.as_deref(),
        ) {
            (Some(url), Some(token)) if !url.is_empty() && !token.is_empty() => Ok((url, token)),
            _ => anyhow::bail!(
                "No configuration set for connection to YouTrack. Please add your url and permanent token to the config:\n\n  yti config set connection.url <url>\n  yti config set connection.token <token>"
            ),
        }
    }

    /// The Toggl token and workspace id, or an error telling the user how
    /// to set them.
    pub fn toggl_api(&self) -> anyhow::Result<(&str, &str)> {
        match (self.toggl.token.as_deref(), self.toggl.workspace.as_deref()) {
            (Some(token), Some(workspace)) if !token.is_empty() && !workspace.is_empty() => {
                Ok((token, workspace))
            }
            _ => anyhow::bail!(
                "No configuration set for connection to Toggl. Please add your api token and workspace id to the config:\n\n  yti config set toggl.token <api_token>\n  yti config set toggl.workspace <workspace_id>"
            ),
        }
    }
}

/// Returns the platform-specific config file path for yti.
///
/// On Linux: `~/.config/yti/config.toml`
pub fn config_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("yti").join("config.toml"))
}
