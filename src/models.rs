//! Data structures produced while building an assets manifest.

use std::fs;
use std::path::PathBuf;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::ManifestError;

/// Entry point name mapped to the file names reported by the host, in host order.
pub type RawManifest = IndexMap<String, Vec<String>>;

/// Entry point name mapped to its classified assets.
///
/// Insertion order is preserved so that serialised manifests list entries in the same
/// order the build reported them.
pub type AssetManifest = IndexMap<String, EntryAssets>;

/// Scripts and stylesheets required by a single entry point.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct EntryAssets {
  /// Files ending in `.js`, in the order the build produced them.
  #[serde(default, alias = "js")]
  pub scripts: Vec<String>,
  /// Files ending in `.css`, in the order the build produced them.
  #[serde(default, alias = "css")]
  pub styles: Vec<String>,
}

/// Raw manifest whose file names carry the public-path prefix.
///
/// Only [`crate::public_path::apply_public_path`] constructs this type, so every file
/// name inside has been prefixed exactly once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedManifest(pub(crate) RawManifest);

impl ResolvedManifest {
  /// Iterate entry names together with their prefixed file names.
  pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
    self.0.iter()
  }

  /// Prefixed file names for a single entry point.
  pub fn get(&self, entry: &str) -> Option<&[String]> {
    self.0.get(entry).map(Vec::as_slice)
  }

  /// Number of entry points in the manifest.
  pub fn len(&self) -> usize {
    self.0.len()
  }

  /// Returns true when no entry point was selected.
  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }
}

/// Manifest source ready to be handed back to the host for writing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedAsset {
  /// Asset name relative to the output directory (or absolute when outside of it).
  pub name: String,
  /// Absolute location the asset should be written to.
  pub path: PathBuf,
  /// Serialised manifest text.
  pub source: String,
}

impl EmittedAsset {
  /// Size of the serialised source in bytes.
  pub fn size(&self) -> usize {
    self.source.len()
  }

  /// Write the asset to [`EmittedAsset::path`], creating missing parent directories.
  pub fn write(&self) -> Result<(), ManifestError> {
    if let Some(parent) = self.path.parent() {
      fs::create_dir_all(parent).map_err(|source| ManifestError::Write {
        path: parent.to_path_buf(),
        source,
      })?;
    }

    fs::write(&self.path, &self.source).map_err(|source| ManifestError::Write {
      path: self.path.clone(),
      source,
    })
  }
}

/// Result of a single plugin run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestOutput {
  /// Final manifest, merged with the persisted one when merge mode is active.
  pub manifest: AssetManifest,
  /// Serialised asset, absent when emitting is turned off.
  pub asset: Option<EmittedAsset>,
}
