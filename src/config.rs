//! Configuration management for Markdown Studio
//!
//! Handles loading, saving, and validating configuration for the rendering
//! pipeline. Configuration is stored as JSON in the platform config directory
//! (`dirs::config_dir()/markdown-studio/config.json`) and every field has a
//! default, so partial files are accepted.

use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application identifier used for config and data directories
pub const APP_ID: &str = "markdown-studio";

/// Name of the configuration file inside the config directory
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Maximum input file size (in bytes) - 10MB
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// File name of the standalone HTML artifact
pub const DEFAULT_HTML_FILE_NAME: &str = "markdown-content.html";

/// File name of the printable artifact
pub const DEFAULT_PDF_FILE_NAME: &str = "markdown-content.pdf";

/// A4 page size in PDF points
pub const A4_WIDTH_PT: f32 = 595.28;
pub const A4_HEIGHT_PT: f32 = 841.89;

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Standalone HTML export settings
    pub export: ExportConfig,

    /// Print (PDF) export settings
    pub print: PrintConfig,

    /// Code block highlighting settings
    pub highlight: HighlightConfig,
}

impl Config {
    /// Load configuration from the default location, or return defaults when
    /// no file exists
    pub fn load() -> ConfigResult<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load configuration from an explicit path
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::LoadError(format!("{}: {}", path.display(), e)))?;
        let config: Config =
            serde_json::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        log::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Save configuration to an explicit path
    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        self.validate()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::SaveError(e.to_string()))?;
        }
        let json =
            serde_json::to_string_pretty(self).map_err(|e| ConfigError::SaveError(e.to_string()))?;
        std::fs::write(path, json).map_err(|e| ConfigError::SaveError(e.to_string()))
    }

    /// Save configuration to the default location
    pub fn save(&self) -> ConfigResult<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Reject values the exporters cannot work with
    pub fn validate(&self) -> ConfigResult<()> {
        let print = &self.print;
        let positive = [
            ("print.page_width", print.page_width),
            ("print.page_height", print.page_height),
            ("print.font_size", print.font_size),
            ("print.line_height", print.line_height),
        ];
        for (key, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    reason: format!("must be a positive number, got {}", value),
                });
            }
        }

        if !(print.margin.is_finite() && print.margin >= 0.0) {
            return Err(ConfigError::InvalidValue {
                key: "print.margin".to_string(),
                reason: format!("must not be negative, got {}", print.margin),
            });
        }

        if print.margin * 2.0 >= print.page_width.min(print.page_height) {
            return Err(ConfigError::InvalidValue {
                key: "print.margin".to_string(),
                reason: "margins leave no printable area".to_string(),
            });
        }

        for (key, name) in [
            ("export.file_name", &self.export.file_name),
            ("print.file_name", &print.file_name),
        ] {
            if name.trim().is_empty() || name.contains(['/', '\\']) {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    reason: format!("'{}' is not a plain file name", name),
                });
            }
        }

        Ok(())
    }

    /// Get the configuration directory path
    pub fn config_dir() -> ConfigResult<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join(APP_ID))
            .ok_or(ConfigError::DirectoryError)
    }

    /// Get the configuration file path
    pub fn config_path() -> ConfigResult<PathBuf> {
        Self::config_dir().map(|p| p.join(CONFIG_FILE_NAME))
    }

    /// Get the data directory path (for persisted session data)
    pub fn data_dir() -> ConfigResult<PathBuf> {
        dirs::data_dir()
            .map(|p| p.join(APP_ID))
            .ok_or(ConfigError::DirectoryError)
    }
}

/// Standalone HTML export configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Document `<title>`
    pub title: String,

    /// CSS font-family of the body
    pub font_family: String,

    /// Maximum body width in pixels
    pub max_width_px: u32,

    /// Body padding in pixels
    pub padding_px: u32,

    /// Artifact file name
    pub file_name: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            title: "Markdown Content".to_string(),
            font_family: "system-ui, sans-serif".to_string(),
            max_width_px: 800,
            padding_px: 20,
            file_name: DEFAULT_HTML_FILE_NAME.to_string(),
        }
    }
}

/// Print export configuration. Lengths are PDF points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrintConfig {
    pub page_width: f32,
    pub page_height: f32,
    pub margin: f32,

    /// Body text size
    pub font_size: f32,

    /// Line height as a multiple of the font size
    pub line_height: f32,

    /// Artifact file name
    pub file_name: String,
}

impl Default for PrintConfig {
    fn default() -> Self {
        Self {
            page_width: A4_WIDTH_PT,
            page_height: A4_HEIGHT_PT,
            margin: 40.0,
            font_size: 11.0,
            line_height: 1.4,
            file_name: DEFAULT_PDF_FILE_NAME.to_string(),
        }
    }
}

/// Code highlighting configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    /// Highlight fenced code with a known language tag
    pub enabled: bool,

    /// Prefix for token class names
    pub class_prefix: String,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            class_prefix: "hljs-".to_string(),
        }
    }
}
