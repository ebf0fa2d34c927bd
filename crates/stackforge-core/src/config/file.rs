//! Project file parsing (stackforge.yaml)

use super::version;
use super::Configuration;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigFileError {
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// A project file: a configuration plus optional metadata about the file itself
///
/// ```yaml
/// min_version: 0.3.0
/// project_name: acme-api
/// framework: express
/// database: mongodb
/// features: [auth, logging]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectFile {
    /// Oldest CLI version able to honor every option in this file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_version: Option<String>,

    #[serde(flatten)]
    pub config: Configuration,
}

impl ProjectFile {
    pub fn from_yaml(content: &str, path: &Path) -> Result<Self, ConfigFileError> {
        serde_yaml::from_str(content).map_err(|source| ConfigFileError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub async fn load(path: &Path) -> Result<Self, ConfigFileError> {
        let content =
            tokio::fs::read_to_string(path)
                .await
                .map_err(|source| ConfigFileError::Read {
                    path: path.to_path_buf(),
                    source,
                })?;
        Self::from_yaml(&content, path)
    }

    /// Warning text if the running CLI is older than the file requires
    pub fn version_warning(&self, cli_version: &str, upgrade_command: &str) -> Option<String> {
        self.min_version
            .as_deref()
            .and_then(|required| version::check_compatibility(cli_version, required, upgrade_command))
    }

    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}
