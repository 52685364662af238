//! Plugin options and the immutable configuration resolved from them.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::codegen::OutputFormat;
use crate::selection::EntrySelection;

const DEFAULT_FILENAME: &str = "assets-manifest.js";
const DEFAULT_GLOBAL_NAME: &str = "ASSETS_MANIFEST";

/// Errors raised while loading or validating plugin options.
#[derive(Debug, Error)]
pub enum ConfigError {
  /// Failed to read the options file from disk.
  #[error("failed to read {path}: {source}", path = .path.display())]
  Io {
    /// Path that caused the error.
    path: PathBuf,
    /// Source I/O error.
    source: std::io::Error,
  },

  /// Options did not match the expected shape.
  #[error("invalid plugin options: {0}")]
  Parse(#[from] serde_json::Error),

  /// `filename` is empty or does not end in `.js` or `.json`.
  #[error("invalid filename `{0}`: expected a non-empty path ending in `.js` or `.json`")]
  InvalidFilename(String),

  /// `globalName` is empty.
  #[error("globalName must not be empty")]
  EmptyGlobalName,

  /// An explicit entries list contains an empty name.
  #[error("entries[{0}] must not be empty")]
  EmptyEntryName(usize),
}

/// Whether the serialised manifest should be minified.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "MinifyValue")]
pub enum MinifyMode {
  /// Always minify.
  Always,
  /// Never minify.
  Never,
  /// Follow the build's own optimisation setting.
  #[default]
  Auto,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MinifyValue {
  Flag(bool),
  Keyword(String),
}

impl TryFrom<MinifyValue> for MinifyMode {
  type Error = String;

  fn try_from(value: MinifyValue) -> Result<Self, Self::Error> {
    match value {
      MinifyValue::Flag(true) => Ok(Self::Always),
      MinifyValue::Flag(false) => Ok(Self::Never),
      MinifyValue::Keyword(keyword) if keyword == "auto" => Ok(Self::Auto),
      MinifyValue::Keyword(keyword) => Err(format!(
        "unknown minify keyword `{keyword}`, expected a boolean or `auto`"
      )),
    }
  }
}

impl MinifyMode {
  /// Decide whether to minify given the build's own optimisation flag.
  pub fn resolve(self, build_minimize: bool) -> bool {
    match self {
      Self::Always => true,
      Self::Never => false,
      Self::Auto => build_minimize,
    }
  }
}

impl From<bool> for MinifyMode {
  fn from(value: bool) -> Self {
    if value { Self::Always } else { Self::Never }
  }
}

/// User supplied plugin options. Missing or `null` values fall back to defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PluginOptions {
  /// Entry points to include in the manifest.
  #[serde(default, alias = "chunks")]
  pub entries: Option<EntrySelection>,
  /// Explicit public path prefix. Auto-detected when absent.
  #[serde(default)]
  pub public_path: Option<String>,
  /// Manifest location, absolute or relative to the build output directory.
  #[serde(default)]
  pub filename: Option<String>,
  /// Minification policy.
  #[serde(default, alias = "uglify")]
  pub minify: Option<MinifyMode>,
  /// Name used when the module wrapper exports onto an object or global.
  #[serde(default, alias = "global")]
  pub global_name: Option<String>,
  /// Skip the plugin entirely.
  #[serde(default)]
  pub disabled: Option<bool>,
  /// Compute the manifest but do not emit an asset when false.
  #[serde(default)]
  pub should_emit: Option<bool>,
  /// Merge with the manifest already present at the target path.
  #[serde(default)]
  pub merge: Option<bool>,
  /// Derive a reachable public path when running under a development server.
  #[serde(default)]
  pub dev_server_auto_public_path: Option<bool>,
}

impl PluginOptions {
  /// Parse options from a JSON string.
  pub fn from_json(content: &str) -> Result<Self, ConfigError> {
    Ok(serde_json::from_str(content)?)
  }

  /// Read options from a JSON file.
  pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
      path: path.to_path_buf(),
      source,
    })?;
    Self::from_json(&content)
  }
}

/// Validated configuration. Built once and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestConfig {
  entries: EntrySelection,
  public_path: Option<String>,
  filename: String,
  minify: MinifyMode,
  global_name: String,
  disabled: bool,
  should_emit: bool,
  merge: bool,
  dev_server_auto_public_path: bool,
}

impl Default for ManifestConfig {
  fn default() -> Self {
    Self {
      entries: EntrySelection::All,
      public_path: None,
      filename: DEFAULT_FILENAME.into(),
      minify: MinifyMode::Auto,
      global_name: DEFAULT_GLOBAL_NAME.into(),
      disabled: false,
      should_emit: true,
      merge: false,
      dev_server_auto_public_path: true,
    }
  }
}

impl ManifestConfig {
  /// Merge the supplied options over the defaults and validate the result.
  pub fn from_options(options: PluginOptions) -> Result<Self, ConfigError> {
    let defaults = Self::default();
    let config = Self {
      entries: options.entries.unwrap_or(defaults.entries),
      public_path: options.public_path.or(defaults.public_path),
      filename: options.filename.unwrap_or(defaults.filename),
      minify: options.minify.unwrap_or(defaults.minify),
      global_name: options.global_name.unwrap_or(defaults.global_name),
      disabled: options.disabled.unwrap_or(defaults.disabled),
      should_emit: options.should_emit.unwrap_or(defaults.should_emit),
      merge: options.merge.unwrap_or(defaults.merge),
      dev_server_auto_public_path: options
        .dev_server_auto_public_path
        .unwrap_or(defaults.dev_server_auto_public_path),
    };
    config.validate()?;
    Ok(config)
  }

  fn validate(&self) -> Result<(), ConfigError> {
    if OutputFormat::detect(&self.filename).is_none() {
      return Err(ConfigError::InvalidFilename(self.filename.clone()));
    }
    if self.global_name.is_empty() {
      return Err(ConfigError::EmptyGlobalName);
    }
    if let Some(index) = self.entries.first_empty_name() {
      return Err(ConfigError::EmptyEntryName(index));
    }
    Ok(())
  }

  /// Entry point selection policy.
  pub fn entries(&self) -> &EntrySelection {
    &self.entries
  }

  /// Explicitly configured public path.
  pub fn public_path(&self) -> Option<&str> {
    self.public_path.as_deref()
  }

  /// Manifest filename as configured.
  pub fn filename(&self) -> &str {
    &self.filename
  }

  /// Minification policy.
  pub fn minify(&self) -> MinifyMode {
    self.minify
  }

  /// Export name used by the module wrapper.
  pub fn global_name(&self) -> &str {
    &self.global_name
  }

  /// Whether the plugin is switched off.
  pub fn disabled(&self) -> bool {
    self.disabled
  }

  /// Whether the manifest asset is emitted.
  pub fn should_emit(&self) -> bool {
    self.should_emit
  }

  /// Whether merge mode is on.
  pub fn merge(&self) -> bool {
    self.merge
  }

  /// Whether the development server public path is derived automatically.
  pub fn dev_server_auto_public_path(&self) -> bool {
    self.dev_server_auto_public_path
  }

  /// Asset name relative to the output directory.
  ///
  /// Absolute filenames inside `output_dir` are made relative to it; absolute filenames
  /// elsewhere are kept as they are.
  pub fn asset_name(&self, output_dir: &Path) -> String {
    let filename = Path::new(&self.filename);
    if !filename.is_absolute() {
      return self.filename.clone();
    }

    match filename.strip_prefix(output_dir) {
      Ok(relative) => relative.to_string_lossy().replace('\\', "/"),
      Err(_) => self.filename.clone(),
    }
  }

  /// Absolute location of the manifest on disk.
  pub fn target_path(&self, output_dir: &Path) -> PathBuf {
    output_dir.join(&self.filename)
  }
}
