//! Manifest construction broken into focused submodules for easier testing.

mod classify;
mod collect;
mod merge;

pub use classify::{SCRIPT_SUFFIX, STYLE_SUFFIX, classify_files, classify_manifest};
pub use collect::collect_entry_files;
pub use merge::{MergeReadError, load_persisted_manifest, merge_manifests, merge_with_persisted};
