//! Configuration for variational views.
//!
//! Loads `config.toml` from an explicit path, with optional CLI override via
//! `--config`, falling back to the `config.toml` embedded in the binary.
//!
//! ```toml
//! default_color = "rgb(127, 71, 62)"
//! opacity = 0.3
//! editor_selector = "atom-text-editor"
//!
//! [colors]
//! DEC = "#3e7f47"
//! ```
//!
//! # Testing
//!
//! Tests use [`Config::load()`] with explicit paths to temporary directories.

use crate::{color::Rgb, palette::Palette, style::StyleConfig, DEFAULT_DIMENSION_COLOR};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::{collections::BTreeMap, path::Path};

/// Colors and rendering options, loaded from `config.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Color for dimensions without an entry in [`colors`](Self::colors).
    pub default_color: Rgb,

    /// Alpha applied to line backgrounds.
    #[serde(default = "default_opacity")]
    pub opacity: f32,

    /// Selector the generated rules are scoped to.
    #[serde(default = "default_editor_selector")]
    pub editor_selector: String,

    /// Initial color per dimension name.
    pub colors: BTreeMap<String, Rgb>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_color: DEFAULT_DIMENSION_COLOR,
            opacity: default_opacity(),
            editor_selector: default_editor_selector(),
            colors: BTreeMap::new(),
        }
    }
}

fn default_opacity() -> f32 {
    0.3
}

fn default_editor_selector() -> String {
    "atom-text-editor".to_string()
}

impl Config {
    /// Read and deserialize a TOML config file from the given path.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        anyhow::ensure!(
            (0.0..=1.0).contains(&config.opacity),
            "Invalid opacity {} in {}; expected a value between 0 and 1",
            config.opacity,
            path.display()
        );
        Ok(config)
    }

    /// Load configuration with priority: CLI override > discovered path > embedded defaults.
    pub fn load_with_overrides(
        cli_override: Option<&Path>,
        discovered_path: Option<&Path>,
    ) -> Result<Self> {
        if let Some(path) = cli_override {
            return Self::load(path);
        }
        if let Some(path) = discovered_path {
            return Self::load(path);
        }
        Self::load_embedded()
    }

    fn load_embedded() -> Result<Self> {
        let source = include_str!("../../config.toml");
        toml::from_str(source).context("Failed to parse embedded config.toml")
    }

    pub fn style(&self) -> StyleConfig {
        StyleConfig {
            editor_selector: self.editor_selector.clone(),
            opacity: self.opacity,
        }
    }

    pub fn palette(&self) -> Palette {
        Palette::with_colors(
            self.default_color,
            self.colors
                .iter()
                .map(|(name, color)| (name.as_str(), *color)),
        )
    }
}
