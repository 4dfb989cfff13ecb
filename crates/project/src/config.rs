//! Per-project settings, stored as `project.toml` beside the saved pages.

use crate::error::ProjectError;
use doctree::FileHeader;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "project.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Written as the `skipole` key of every dumped file.
    pub skipole_version: String,
    /// Written as the `version` key of every dumped file.
    pub project_version: String,
    /// Refuse uploads whose `skipole` major version differs from ours.
    pub check_version_on_upload: bool,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            skipole_version: env!("CARGO_PKG_VERSION").to_string(),
            project_version: "0.0.1".to_string(),
            check_version_on_upload: false,
        }
    }
}

impl ProjectConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ProjectError> {
        Ok(toml::from_str(text)?)
    }

    pub fn config_path(dir: &Path) -> PathBuf {
        dir.join(CONFIG_FILE)
    }

    /// Config stored in `dir`, or the defaults when there is none.
    pub fn load(dir: &Path) -> Result<Self, ProjectError> {
        let path = Self::config_path(dir);
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::from_toml_str(&fs::read_to_string(&path)?)
    }

    pub fn to_toml_string(&self) -> Result<String, ProjectError> {
        Ok(toml::to_string_pretty(self)?)
    }


    pub fn header(&self) -> FileHeader {
        FileHeader::new(self.skipole_version.clone(), self.project_version.clone())
    }

    /// Whether a file written by framework version `found` may be uploaded.
    pub fn accepts(&self, found: &str) -> bool {
        !self.check_version_on_upload || major(found) == major(&self.skipole_version)
    }
}

fn major(version: &str) -> &str {
    version.split('.').next().unwrap_or_default().trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_use_defaults() {
        let config = ProjectConfig::from_toml_str("project_version = \"2.1\"\n").unwrap();
        assert_eq!(config.project_version, "2.1");
        assert_eq!(config.skipole_version, env!("CARGO_PKG_VERSION"));
        assert!(!config.check_version_on_upload);
    }

    #[test]
    fn rejects_wrong_types() {
        assert!(matches!(
            ProjectConfig::from_toml_str("check_version_on_upload = \"yes\""),
            Err(ProjectError::Config(_))
        ));
    }

    #[test]
    fn version_check_compares_major_only() {
        let mut config = ProjectConfig {
            skipole_version: "5.2.0".to_string(),
            ..ProjectConfig::default()
        };
        assert!(config.accepts("4.0.0"));
        config.check_version_on_upload = true;
        assert!(config.accepts("5.0.1"));
        assert!(!config.accepts("4.9.9"));
    }
}
