//! Project settings, stored as JSON next to where the tool runs.

use crate::error::SettingsError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Default settings file name.
pub const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    #[serde(alias = "Project_Name")]
    pub project_name: String,
    #[serde(alias = "Project_Path")]
    pub project_path: PathBuf,
    #[serde(alias = "Project_Description")]
    pub project_description: String,
    #[serde(alias = "Image_Link")]
    pub image_link: String,
    #[serde(alias = "Output_Path")]
    pub output_path: PathBuf,
    /// Also scan `*_test.<ext>` files.
    #[serde(alias = "Include_Tests")]
    pub include_tests: bool,
    /// Title-case package names.
    #[serde(alias = "CapitalizeItems")]
    pub capitalize_items: bool,
    /// Source file extensions to scan, without the dot.
    pub extensions: Vec<String>,
    /// Glob patterns, relative to `project_path`, of paths to skip.
    pub exclude: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            project_name: "Include project name here...".to_string(),
            project_path: PathBuf::from("./"),
            project_description: "Include project description here...".to_string(),
            image_link: String::new(),
            output_path: PathBuf::from("./"),
            include_tests: false,
            capitalize_items: false,
            extensions: vec!["go".to_string()],
            exclude: Vec::new(),
        }
    }
}

impl Settings {
    /// Read settings from `path`.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let content = fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| SettingsError::Invalid {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Read settings from `path`, writing the defaults there first when the
    /// file does not exist yet.
    pub fn load_or_create(path: &Path) -> Result<Self, SettingsError> {
        if path.exists() {
            return Self::load(path);
        }
        info!(path = %path.display(), "settings file not found; writing defaults");
        let settings = Settings::default();
        settings.save(path)?;
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        let content = serde_json::to_string_pretty(self).map_err(|source| SettingsError::Invalid {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, content + "\n").map_err(|source| SettingsError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}
