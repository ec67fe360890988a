//! Event configuration module.
//!
//! Handles loading and validating the per-event TOML record that drives a
//! render: where the template lives, who may request a certificate, and how
//! the subject name is placed on it. The record is organizer-authored and
//! read-only from the engine's point of view; every render re-reads the
//! latest snapshot rather than memoizing one.
//!
//! ## Event File
//!
//! ```toml
//! # All keys are optional - defaults shown below
//!
//! event_id = ""                 # Lookup key for restricted mode
//! template_url = ""             # http(s) URL or local path; empty = no template yet
//! mode = "public"               # "public" or "restricted"
//!
//! font_family = "Poppins"       # Named family, resolved against --font-dir
//! font_weight = "bold"          # "normal" or "bold"
//! font_size_px = 60.0           # 10-200
//! position_x = 50.0             # 0-100, percent of template width
//! position_y = 50.0             # 0-100, percent of template height
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Who may request a certificate for the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessMode {
    /// Any free-text name is accepted verbatim.
    Public,
    /// Requesters must present an identifier registered on the event.
    Restricted,
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessMode::Public => write!(f, "public"),
            AccessMode::Restricted => write!(f, "restricted"),
        }
    }
}

/// Weight of the subject-name typeface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    Normal,
    Bold,
}

impl fmt::Display for FontWeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FontWeight::Normal => write!(f, "normal"),
            FontWeight::Bold => write!(f, "bold"),
        }
    }
}

/// Per-event configuration loaded from an event TOML file.
///
/// All fields have defaults; organizer files need only specify the values
/// they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EventConfig {
    /// Opaque event key; the participant lookup in restricted mode is keyed
    /// on `(event_id, identifier)`.
    pub event_id: String,
    /// Template locator: `http(s)://` URL or local path. Empty means no
    /// template has been uploaded yet; preview shows a placeholder and
    /// export is disallowed.
    pub template_url: String,
    /// Eligibility policy.
    pub mode: AccessMode,
    /// Named font family for the subject name.
    pub font_family: String,
    /// Typeface weight.
    pub font_weight: FontWeight,
    /// Text size in pixels on the template raster (10-200).
    pub font_size_px: f32,
    /// Horizontal text anchor as a percentage of template width (0-100).
    /// The organizer UI steps in 0.5 increments, hence fractional.
    pub position_x: f64,
    /// Vertical text anchor as a percentage of template height (0-100).
    pub position_y: f64,
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            event_id: String::new(),
            template_url: String::new(),
            mode: AccessMode::Public,
            font_family: "Poppins".to_string(),
            font_weight: FontWeight::Bold,
            font_size_px: 60.0,
            position_x: 50.0,
            position_y: 50.0,
        }
    }
}

impl EventConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(10.0..=200.0).contains(&self.font_size_px) {
            return Err(ConfigError::Validation(
                "font_size_px must be 10-200".into(),
            ));
        }
        if !(0.0..=100.0).contains(&self.position_x) {
            return Err(ConfigError::Validation("position_x must be 0-100".into()));
        }
        if !(0.0..=100.0).contains(&self.position_y) {
            return Err(ConfigError::Validation("position_y must be 0-100".into()));
        }
        if self.mode == AccessMode::Restricted && self.event_id.trim().is_empty() {
            return Err(ConfigError::Validation(
                "restricted mode requires a non-empty event_id".into(),
            ));
        }
        Ok(())
    }

    /// Whether a template has been configured at all.
    pub fn has_template(&self) -> bool {
        !self.template_url.trim().is_empty()
    }
}

/// Load and validate an event config from a TOML file.
///
/// Missing keys fall back to defaults; unknown keys are rejected.
pub fn load_event_config(path: &Path) -> Result<EventConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: EventConfig = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock event TOML with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_event_toml() -> &'static str {
    r##"# Certstamp Event Configuration
# =============================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# Opaque event key. Restricted mode looks participants up by
# (event_id, identifier), so it must be set when mode = "restricted".
event_id = ""

# Template locator: an http(s) URL or a local file path (PNG or JPEG).
# Empty means "no template uploaded yet" - previews show a placeholder
# notice and exports are disallowed until one is set.
template_url = ""

# Eligibility policy:
#   "public"     - any free-text name is accepted verbatim
#   "restricted" - requesters must present a registered identifier
mode = "public"

# ---------------------------------------------------------------------------
# Text placement
# ---------------------------------------------------------------------------

# Named font family. Resolved against the font directory passed to the CLI
# (--font-dir); if the family cannot be found there the engine falls back
# to its built-in face and logs a warning, never failing the render.
font_family = "Poppins"

# "normal" or "bold".
font_weight = "bold"

# Text size in template pixels (10-200).
font_size_px = 60.0

# Anchor position as percentages of the template's native pixel size
# (0-100, half steps). Text is drawn left-anchored at this point and
# vertically centered on it.
position_x = 50.0
position_y = 50.0
"##
}
