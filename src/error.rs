//! Error types surfaced while building a manifest.

use std::path::PathBuf;

use thiserror::Error;

pub use crate::codegen::MinifyError;
pub use crate::config::ConfigError;
pub use crate::manifest::MergeReadError;

/// Errors that abort a build's manifest emit.
#[derive(Debug, Error)]
pub enum ManifestError {
  /// Plugin options failed validation.
  #[error(transparent)]
  Config(#[from] ConfigError),

  /// The manifest filename does not end in a supported suffix.
  #[error("unsupported manifest format for `{filename}`: expected a `.js` or `.json` suffix")]
  UnsupportedFormat {
    /// Offending asset name.
    filename: String,
  },

  /// Compacting the generated module failed.
  #[error("failed to minify generated manifest module: {0}")]
  Minify(#[from] MinifyError),

  /// The manifest could not be serialised as JSON.
  #[error("failed to serialise manifest: {0}")]
  Serialize(#[from] serde_json::Error),

  /// Writing the emitted asset failed.
  #[error("failed to write {path}: {source}", path = .path.display())]
  Write {
    /// Path that caused the error.
    path: PathBuf,
    /// Source I/O error.
    source: std::io::Error,
  },
}
