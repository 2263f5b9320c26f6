//! Shared configuration loader for dml.
//!
//! `defaults/dml.default.toml` is embedded into the binary so that docs and
//! runtime behavior stay in sync. Applications layer user-specific files on top
//! of those defaults via [`Loader`] before deserializing into [`DmlConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use dml_core::color::{ColorScheme, FuzzPolicy};
use dml_core::pipeline::{Options, DEFAULT_DPI};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub use config::ConfigError as Error;

const DEFAULT_TOML: &str = include_str!("../defaults/dml.default.toml");

/// Project-local configuration file picked up when present.
pub const LOCAL_CONFIG_FILE: &str = "dml.toml";

/// Top-level configuration consumed by dml.
#[derive(Debug, Clone, Deserialize)]
pub struct DmlConfig {
    pub render: RenderConfig,
    #[serde(default)]
    pub tools: ToolsConfig,
    pub debug: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RenderConfig {
    pub colour: String,
    pub size: i64,
    pub dpi: i64,
    pub render_all_latex: bool,
    pub fuzz: FuzzConfig,
}

impl RenderConfig {
    /// Row count with negative values clamped to 0.
    pub fn target_rows(&self) -> u32 {
        u32::try_from(self.size.max(0)).unwrap_or(u32::MAX)
    }

    /// DPI, with non-positive values replaced by the default.
    pub fn dpi(&self) -> u32 {
        if self.dpi <= 0 {
            DEFAULT_DPI
        } else {
            u32::try_from(self.dpi).unwrap_or(u32::MAX)
        }
    }

    pub fn scheme(&self) -> ColorScheme {
        ColorScheme::from_spec(&self.colour)
    }
}

/// Mirrors [`FuzzPolicy`].
#[derive(Debug, Clone, Deserialize)]
pub struct FuzzConfig {
    pub base: f64,
    pub bright: f64,
    pub red: f64,
    pub blue: f64,
    pub saturated: f64,
    pub bright_min_brightness: f64,
    pub bright_max_saturation: f64,
    pub saturated_min_saturation: f64,
    pub saturated_min_brightness: f64,
    pub primary_high: u8,
    pub primary_low: u8,
}

impl From<&FuzzConfig> for FuzzPolicy {
    fn from(config: &FuzzConfig) -> Self {
        FuzzPolicy {
            base: config.base,
            bright: config.bright,
            red: config.red,
            blue: config.blue,
            saturated: config.saturated,
            bright_min_brightness: config.bright_min_brightness,
            bright_max_saturation: config.bright_max_saturation,
            saturated_min_saturation: config.saturated_min_saturation,
            saturated_min_brightness: config.saturated_min_brightness,
            primary_high: config.primary_high,
            primary_low: config.primary_low,
        }
    }
}

impl From<FuzzConfig> for FuzzPolicy {
    fn from(config: FuzzConfig) -> Self {
        FuzzPolicy::from(&config)
    }
}

/// Explicit paths for the external renderers.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToolsConfig {
    #[serde(default)]
    pub pdflatex: Option<PathBuf>,
    #[serde(default)]
    pub convert: Option<PathBuf>,
}

impl DmlConfig {
    /// Pipeline options derived from the render section.
    pub fn options(&self) -> Options {
        Options {
            scheme: self.render.scheme(),
            target_rows: self.render.target_rows(),
            dpi: self.render.dpi(),
            render_all_latex: self.render.render_all_latex,
        }
    }

    pub fn fuzz_policy(&self) -> FuzzPolicy {
        FuzzPolicy::from(&self.render.fuzz)
    }
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override (useful for CLI settings).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<DmlConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<DmlConfig, ConfigError> {
    Loader::new().build()
}
