//! Read-merge support against a manifest written by a previous build.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;
use tracing::{debug, warn};

use crate::codegen::OutputFormat;
use crate::models::AssetManifest;

fn module_data_pattern() -> &'static Regex {
  static PATTERN: OnceLock<Regex> = OnceLock::new();
  PATTERN.get_or_init(|| {
    Regex::new(r"function\s*\(\s*\)\s*\{(?:\s|//[^\n]*)*return\s*")
      .expect("invalid manifest module regex")
  })
}

/// Errors that can occur while reading a persisted manifest.
#[derive(Debug, Error)]
pub enum MergeReadError {
  /// Failed to read the manifest from disk.
  #[error("failed to read {path}: {source}", path = .path.display())]
  Io {
    /// Path that caused the error.
    path: PathBuf,
    /// Source I/O error.
    source: std::io::Error,
  },
  /// The manifest data is not valid.
  #[error("failed to parse {path}: {source}", path = .path.display())]
  Parse {
    /// Path that caused the error.
    path: PathBuf,
    /// Source parse error.
    source: serde_json::Error,
  },
  /// A module manifest does not contain a recognisable data literal.
  #[error("no manifest data found in module {path}", path = .path.display())]
  MissingModuleData {
    /// Path that caused the error.
    path: PathBuf,
  },
}

/// Load a previously written manifest.
///
/// Returns `Ok(None)` when no file exists at `path`.
pub fn load_persisted_manifest(
  path: &Path,
  format: OutputFormat,
) -> Result<Option<AssetManifest>, MergeReadError> {
  let content = match fs::read_to_string(path) {
    Ok(content) => content,
    Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
    Err(err) => {
      return Err(MergeReadError::Io {
        path: path.to_path_buf(),
        source: err,
      });
    }
  };

  let parse_error = |source| MergeReadError::Parse {
    path: path.to_path_buf(),
    source,
  };

  let manifest = match format {
    OutputFormat::Json => serde_json::from_str(&content).map_err(parse_error)?,
    OutputFormat::Module => {
      let data = module_data_pattern()
        .find(&content)
        .map(|found| &content[found.end()..])
        .ok_or_else(|| MergeReadError::MissingModuleData {
          path: path.to_path_buf(),
        })?;
      serde_json::Deserializer::from_str(data)
        .into_iter::<AssetManifest>()
        .next()
        .ok_or_else(|| MergeReadError::MissingModuleData {
          path: path.to_path_buf(),
        })?
        .map_err(parse_error)?
    }
  };

  Ok(Some(manifest))
}

/// Overlay `fresh` onto `previous`.
///
/// Entries of `previous` keep their position; entries present in `fresh` replace them and
/// new entries are appended.
pub fn merge_manifests(previous: AssetManifest, fresh: AssetManifest) -> AssetManifest {
  let mut merged = previous;
  for (entry, assets) in fresh {
    merged.insert(entry, assets);
  }
  merged
}

/// Merge `fresh` with the manifest persisted at `path`.
///
/// A missing file leaves `fresh` untouched. Read and parse failures are logged and the
/// fresh manifest is used on its own.
pub fn merge_with_persisted(
  fresh: AssetManifest,
  path: &Path,
  format: OutputFormat,
) -> AssetManifest {
  match load_persisted_manifest(path, format) {
    Ok(Some(previous)) => {
      debug!(
        path = %path.display(),
        previous_entries = previous.len(),
        fresh_entries = fresh.len(),
        "merging with persisted manifest"
      );
      merge_manifests(previous, fresh)
    }
    Ok(None) => fresh,
    Err(err) => {
      warn!(error = %err, "ignoring persisted manifest, writing fresh manifest only");
      fresh
    }
  }
}
