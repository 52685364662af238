//! Split resolved file lists into scripts and stylesheets.

use crate::models::{AssetManifest, EntryAssets, ResolvedManifest};

/// Suffix identifying script files.
pub const SCRIPT_SUFFIX: &str = ".js";
/// Suffix identifying stylesheet files.
pub const STYLE_SUFFIX: &str = ".css";

/// Classify every entry of a resolved manifest.
pub fn classify_manifest(resolved: &ResolvedManifest) -> AssetManifest {
  resolved
    .iter()
    .map(|(entry, files)| (entry.clone(), classify_files(files)))
    .collect()
}

/// Partition a file list by suffix, keeping relative order within each bucket.
///
/// Each bucket is filtered independently, so a file matching both suffixes would land in
/// both. Files matching neither are dropped.
pub fn classify_files(files: &[String]) -> EntryAssets {
  EntryAssets {
    scripts: filter_suffix(files, SCRIPT_SUFFIX),
    styles: filter_suffix(files, STYLE_SUFFIX),
  }
}

fn filter_suffix(files: &[String], suffix: &str) -> Vec<String> {
  files
    .iter()
    .filter(|file| file.ends_with(suffix))
    .cloned()
    .collect()
}
