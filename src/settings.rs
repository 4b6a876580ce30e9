/*!
 * Persisted user settings
 *
 * Settings live in a YAML file under the user's configuration
 * directory. They carry the base ignore patterns, the preferred model,
 * and named rule texts that can be embedded into generated documents.
 * A missing file yields the defaults; a malformed one is an error.
 */

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::rules::{DEFAULT_DIR_PATTERNS, DEFAULT_EXCLUDED_EXTENSIONS, DEFAULT_FILE_PATTERNS};
use crate::tokenizer::Model;

/// File name of the settings file
const SETTINGS_FILE: &str = "settings.yaml";

/// Errors from loading or saving settings
#[derive(Error, Debug)]
pub enum SettingsError {
    /// Settings file could not be read or written
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Settings file is not valid YAML
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yml::Error),

    /// No configuration directory on this system
    #[error("Could not determine configuration directory")]
    NoConfigDir,

    /// A saved rule has a blank name or content
    #[error("Invalid saved rule '{0}': name and content must be non-blank")]
    InvalidRule(String),

    /// A requested rule name is not in the settings
    #[error("Unknown rule '{0}'")]
    UnknownRule(String),
}

/// Base ignore patterns persisted in settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IgnorePatterns {
    /// Directory name patterns
    pub directories: Vec<String>,
    /// File name patterns
    pub files: Vec<String>,
}

impl Default for IgnorePatterns {
    fn default() -> Self {
        Self {
            directories: DEFAULT_DIR_PATTERNS.clone(),
            files: DEFAULT_FILE_PATTERNS.clone(),
        }
    }
}

/// Persisted user settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Named rule texts embeddable into documents
    pub saved_rules: BTreeMap<String, String>,
    /// Render paths relative to the target's parent
    pub use_relative_paths: bool,
    /// Preferred model for token analysis
    pub model: Option<Model>,
    /// Base ignore patterns
    pub ignore_patterns: IgnorePatterns,
    /// Extensions excluded by default
    pub excluded_extensions: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            saved_rules: BTreeMap::new(),
            use_relative_paths: true,
            model: None,
            ignore_patterns: IgnorePatterns::default(),
            excluded_extensions: DEFAULT_EXCLUDED_EXTENSIONS.clone(),
        }
    }
}

impl Settings {
    /// Path of the settings file
    pub fn path() -> Result<PathBuf, SettingsError> {
        let config_dir = dirs::config_dir().ok_or(SettingsError::NoConfigDir)?;
        Ok(config_dir.join("promptpack").join(SETTINGS_FILE))
    }

    /// Load settings from the default location.
    ///
    /// A missing file yields the defaults.
    pub fn load() -> Result<Self, SettingsError> {
        Self::load_from(&Self::path()?)
    }

    /// Load settings from an explicit path
    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            log::debug!("no settings file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let settings: Settings = serde_yml::from_str(&content)?;
        settings.validate()?;

        Ok(settings)
    }

    /// Save settings to the default location
    pub fn save(&self) -> Result<(), SettingsError> {
        self.save_to(&Self::path()?)
    }

    /// Save settings to an explicit path
    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        self.validate()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_yml::to_string(self)?;
        fs::write(path, content)?;

        Ok(())
    }

    /// Reject saved rules with blank names or content
    pub fn validate(&self) -> Result<(), SettingsError> {
        for (name, content) in &self.saved_rules {
            if name.trim().is_empty() || content.trim().is_empty() {
                return Err(SettingsError::InvalidRule(name.clone()));
            }
        }
        Ok(())
    }

    /// Resolve rule names to (name, content) pairs, in name order
    pub fn select_rules(&self, names: &[String]) -> Result<Vec<(String, String)>, SettingsError> {
        let mut selected = Vec::with_capacity(names.len());
        for name in names {
            match self.saved_rules.get(name) {
                Some(content) => selected.push((name.clone(), content.clone())),
                None => return Err(SettingsError::UnknownRule(name.clone())),
            }
        }
        selected.sort();
        selected.dedup();
        Ok(selected)
    }
}
