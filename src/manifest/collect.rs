//! Collect the output files of the selected entry points.

use crate::host::EntrypointRegistry;
use crate::models::RawManifest;
use crate::selection::EntrySelection;

/// Map each selected entry point to its output files.
///
/// Explicitly named entry points the build does not know map to an empty list.
pub fn collect_entry_files<R>(selection: &EntrySelection, registry: &R) -> RawManifest
where
  R: EntrypointRegistry + ?Sized,
{
  let mut manifest = RawManifest::new();

  match selection {
    EntrySelection::All => {
      for name in registry.entry_names() {
        let files = registry.entry_files(name).unwrap_or_default();
        manifest.insert(name.to_string(), to_owned_files(files));
      }
    }
    EntrySelection::Named(names) => {
      for name in names {
        let files = match registry.entry_files(name) {
          Some(files) => to_owned_files(files),
          None => {
            tracing::debug!(
              entry = %name,
              "entry point not found in build, emitting empty file list"
            );
            Vec::new()
          }
        };
        manifest.insert(name.clone(), files);
      }
    }
  }

  manifest
}

fn to_owned_files(files: Vec<&str>) -> Vec<String> {
  files.into_iter().map(str::to_string).collect()
}
