//! Plugin orchestrator running the manifest pipeline once per finished build.

use std::fmt;
use std::path::Path;

use tracing::{debug, info};

use crate::codegen::{OutputFormat, render_manifest};
use crate::config::{ConfigError, ManifestConfig, PluginOptions};
use crate::error::ManifestError;
use crate::host::{Compilation, Environment};
use crate::manifest::{classify_manifest, collect_entry_files, merge_with_persisted};
use crate::models::{AssetManifest, EmittedAsset, ManifestOutput};
use crate::public_path::{PublicPathContext, apply_public_path, resolve_public_path};

/// Callback invoked with the final manifest of every build.
pub type EmitCallback = Box<dyn Fn(&AssetManifest) + Send + Sync>;

/// Maps entry points to their script and stylesheet assets after each build.
pub struct AssetsManifestPlugin {
  config: ManifestConfig,
  environment: Environment,
  on_emit: Option<EmitCallback>,
}

impl fmt::Debug for AssetsManifestPlugin {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("AssetsManifestPlugin")
      .field("config", &self.config)
      .field("environment", &self.environment)
      .field("on_emit", &self.on_emit.is_some())
      .finish()
  }
}

impl AssetsManifestPlugin {
  /// Validate `options` and create a plugin for the current process environment.
  pub fn new(options: PluginOptions) -> Result<Self, ConfigError> {
    let config = ManifestConfig::from_options(options)?;
    Ok(Self::from_config(config))
  }

  /// Create a plugin from an already validated configuration.
  pub fn from_config(config: ManifestConfig) -> Self {
    Self {
      config,
      environment: Environment::detect(),
      on_emit: None,
    }
  }

  /// Replace the detected environment.
  pub fn with_environment(mut self, environment: Environment) -> Self {
    self.environment = environment;
    self
  }

  /// Register a callback receiving the final manifest of every build.
  pub fn on_emit<F>(mut self, callback: F) -> Self
  where
    F: Fn(&AssetManifest) + Send + Sync + 'static,
  {
    self.on_emit = Some(Box::new(callback));
    self
  }

  /// Resolved configuration.
  pub fn config(&self) -> &ManifestConfig {
    &self.config
  }

  /// Environment the public path is resolved against.
  pub fn environment(&self) -> &Environment {
    &self.environment
  }

  /// Run the pipeline for a finished build.
  ///
  /// Returns `Ok(None)` when the plugin is disabled. Any error aborts the emit, so a
  /// partially computed manifest is never handed back. Only a failure to read the
  /// persisted manifest in merge mode is recovered from.
  pub fn apply(&self, compilation: &Compilation) -> Result<Option<ManifestOutput>, ManifestError> {
    if self.config.disabled() {
      debug!("assets manifest plugin disabled, skipping");
      return Ok(None);
    }

    let output_dir = compilation.output.path.as_path();
    let asset_name = self.config.asset_name(output_dir);
    let format = OutputFormat::from_filename(&asset_name)?;

    let raw = collect_entry_files(self.config.entries(), compilation.registry());
    let public_path = resolve_public_path(&PublicPathContext {
      configured: self.config.public_path(),
      dev_server_auto: self.config.dev_server_auto_public_path(),
      output: &compilation.output,
      dev_server: compilation.dev_server.as_ref(),
      environment: &self.environment,
    });
    let resolved = apply_public_path(raw, &public_path);
    debug!(public_path = %public_path, entries = resolved.len(), "resolved public path");
    if resolved.is_empty() {
      debug!("no entry points selected, manifest will be empty");
    }

    let mut manifest = classify_manifest(&resolved);

    if self.config.merge() && !self.environment.is_dev_server() {
      let target = self.config.target_path(output_dir);
      manifest = merge_with_persisted(manifest, &target, format);
    }

    let asset = if self.config.should_emit() {
      Some(self.render_asset(&manifest, format, asset_name, output_dir, compilation)?)
    } else {
      None
    };

    if let Some(callback) = &self.on_emit {
      callback(&manifest);
    }

    Ok(Some(ManifestOutput { manifest, asset }))
  }

  fn render_asset(
    &self,
    manifest: &AssetManifest,
    format: OutputFormat,
    name: String,
    output_dir: &Path,
    compilation: &Compilation,
  ) -> Result<EmittedAsset, ManifestError> {
    let minimize = self.config.minify().resolve(compilation.optimization.minimize);
    let source = render_manifest(manifest, format, minimize, self.config.global_name())?;
    let asset = EmittedAsset {
      path: self.config.target_path(output_dir),
      name,
      source,
    };
    info!(
      asset = %asset.name,
      entries = manifest.len(),
      bytes = asset.size(),
      minimize,
      "generated assets manifest"
    );
    Ok(asset)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::fs;
  use std::sync::{Arc, Mutex};

  use crate::host::{DevServerOptions, Entrypoint, OutputOptions};
  use crate::models::EntryAssets;
  use crate::selection::EntrySelection;
  use tempfile::tempdir;

  fn compilation(output_dir: &Path) -> Compilation {
    Compilation {
      entrypoints: vec![
        Entrypoint::new("app", ["app.abc123.js", "app.abc123.css"]),
        Entrypoint::new("admin", ["admin.js", "admin.js.map"]),
      ],
      output: OutputOptions {
        path: output_dir.to_path_buf(),
        public_path: Some("/static/".into()),
      },
      ..Compilation::default()
    }
  }

  fn plugin(options: PluginOptions) -> AssetsManifestPlugin {
    AssetsManifestPlugin::new(options)
      .unwrap()
      .with_environment(Environment::build())
  }

  fn entry(scripts: &[&str], styles: &[&str]) -> EntryAssets {
    EntryAssets {
      scripts: scripts.iter().map(|value| value.to_string()).collect(),
      styles: styles.iter().map(|value| value.to_string()).collect(),
    }
  }

  #[test]
  fn builds_manifest_for_selected_entries() {
    let dir = tempdir().unwrap();
    let plugin = plugin(PluginOptions {
      entries: Some(EntrySelection::named(["app"])),
      public_path: Some("/assets/".into()),
      filename: Some("manifest.json".into()),
      merge: Some(false),
      ..PluginOptions::default()
    });

    let output = plugin.apply(&compilation(dir.path())).unwrap().unwrap();

    let mut expected = AssetManifest::new();
    expected.insert(
      "app".into(),
      entry(&["/assets/app.abc123.js"], &["/assets/app.abc123.css"]),
    );
    assert_eq!(output.manifest, expected);

    let asset = output.asset.unwrap();
    assert_eq!(asset.name, "manifest.json");
    assert_eq!(asset.path, dir.path().join("manifest.json"));
    let parsed: AssetManifest = serde_json::from_str(&asset.source).unwrap();
    assert_eq!(parsed, expected);
  }

  #[test]
  fn unknown_entries_yield_empty_buckets() {
    let dir = tempdir().unwrap();
    let plugin = plugin(PluginOptions {
      entries: Some(EntrySelection::named(["missing"])),
      ..PluginOptions::default()
    });

    let output = plugin.apply(&compilation(dir.path())).unwrap().unwrap();

    let mut expected = AssetManifest::new();
    expected.insert("missing".into(), EntryAssets::default());
    assert_eq!(output.manifest, expected);
  }

  #[test]
  fn selects_all_entries_with_build_public_path() {
    let dir = tempdir().unwrap();
    let output = plugin(PluginOptions::default())
      .apply(&compilation(dir.path()))
      .unwrap()
      .unwrap();

    let keys: Vec<&str> = output.manifest.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["app", "admin"]);
    assert_eq!(output.manifest["admin"], entry(&["/static/admin.js"], &[]));
  }

  #[test]
  fn disabled_plugin_does_nothing() {
    let dir = tempdir().unwrap();
    let plugin = plugin(PluginOptions {
      disabled: Some(true),
      ..PluginOptions::default()
    });
    assert!(plugin.apply(&compilation(dir.path())).unwrap().is_none());
  }

  #[test]
  fn skips_asset_but_still_notifies_when_not_emitting() {
    let dir = tempdir().unwrap();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let plugin = plugin(PluginOptions {
      should_emit: Some(false),
      ..PluginOptions::default()
    })
    .on_emit(move |manifest| {
      sink.lock().unwrap().push(manifest.clone());
    });

    let output = plugin.apply(&compilation(dir.path())).unwrap().unwrap();

    assert!(output.asset.is_none());
    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0], output.manifest);
  }

  #[test]
  fn auto_minify_follows_build_optimisation() {
    let dir = tempdir().unwrap();
    let plugin = plugin(PluginOptions {
      filename: Some("manifest.json".into()),
      ..PluginOptions::default()
    });

    let mut build = compilation(dir.path());
    build.optimization.minimize = true;
    let minified = plugin.apply(&build).unwrap().unwrap().asset.unwrap();
    assert!(!minified.source.contains('\n'));

    build.optimization.minimize = false;
    let pretty = plugin.apply(&build).unwrap().unwrap().asset.unwrap();
    assert!(pretty.source.contains("\n  \"app\""));
  }

  #[test]
  fn emits_module_by_default() {
    let dir = tempdir().unwrap();
    let output = plugin(PluginOptions::default())
      .apply(&compilation(dir.path()))
      .unwrap()
      .unwrap();

    let asset = output.asset.unwrap();
    assert_eq!(asset.name, "assets-manifest.js");
    assert!(asset.source.contains(r#"root["ASSETS_MANIFEST"] = factory();"#));
    assert!(asset.source.contains("\"/static/app.abc123.js\""));
  }

  #[test]
  fn merges_with_persisted_manifest() {
    let dir = tempdir().unwrap();
    fs::write(
      dir.path().join("manifest.json"),
      r#"{"legacy": {"scripts": ["/old/legacy.js"], "styles": []}, "app": {"scripts": ["/old/app.js"], "styles": []}}"#,
    )
    .unwrap();
    let plugin = plugin(PluginOptions {
      filename: Some("manifest.json".into()),
      merge: Some(true),
      ..PluginOptions::default()
    });

    let output = plugin.apply(&compilation(dir.path())).unwrap().unwrap();

    let keys: Vec<&str> = output.manifest.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["legacy", "app", "admin"]);
    assert_eq!(output.manifest["legacy"], entry(&["/old/legacy.js"], &[]));
    assert_eq!(
      output.manifest["app"],
      entry(&["/static/app.abc123.js"], &["/static/app.abc123.css"])
    );
  }

  #[test]
  fn merge_round_trips_through_written_module() {
    let dir = tempdir().unwrap();
    let build = compilation(dir.path());
    let first = plugin(PluginOptions {
      entries: Some(EntrySelection::named(["admin"])),
      merge: Some(true),
      ..PluginOptions::default()
    });
    first.apply(&build).unwrap().unwrap().asset.unwrap().write().unwrap();

    let second = plugin(PluginOptions {
      entries: Some(EntrySelection::named(["app"])),
      merge: Some(true),
      minify: Some(true.into()),
      ..PluginOptions::default()
    });
    let output = second.apply(&build).unwrap().unwrap();

    let keys: Vec<&str> = output.manifest.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["admin", "app"]);
  }

  #[test]
  fn unreadable_persisted_manifest_is_ignored() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("manifest.json"), "{ broken").unwrap();
    let plugin = plugin(PluginOptions {
      filename: Some("manifest.json".into()),
      merge: Some(true),
      ..PluginOptions::default()
    });

    let output = plugin.apply(&compilation(dir.path())).unwrap().unwrap();
    assert_eq!(output.manifest.len(), 2);
  }

  #[test]
  fn dev_server_uses_reachable_origin_and_skips_merge() {
    let dir = tempdir().unwrap();
    fs::write(
      dir.path().join("manifest.json"),
      r#"{"legacy": {"scripts": ["/old/legacy.js"], "styles": []}}"#,
    )
    .unwrap();
    let mut build = compilation(dir.path());
    build.dev_server = Some(DevServerOptions {
      public_path: Some("/dev/".into()),
      port: Some(8080),
      https: false,
    });
    let plugin = plugin(PluginOptions {
      entries: Some(EntrySelection::named(["app"])),
      filename: Some("manifest.json".into()),
      merge: Some(true),
      ..PluginOptions::default()
    })
    .with_environment(Environment::dev_server("10.0.0.5".parse().unwrap()));

    let output = plugin.apply(&build).unwrap().unwrap();

    assert_eq!(output.manifest.len(), 1);
    assert_eq!(
      output.manifest["app"],
      entry(
        &["http://10.0.0.5:8080/dev/app.abc123.js"],
        &["http://10.0.0.5:8080/dev/app.abc123.css"]
      )
    );
  }

  #[test]
  fn invalid_options_fail_at_construction() {
    let result = AssetsManifestPlugin::new(PluginOptions {
      filename: Some("manifest.txt".into()),
      ..PluginOptions::default()
    });
    assert!(matches!(result, Err(ConfigError::InvalidFilename(_))));
  }

  #[test]
  fn exposes_resolved_configuration() {
    let plugin = plugin(PluginOptions {
      global_name: Some("APP_ASSETS".into()),
      ..PluginOptions::default()
    });
    assert_eq!(plugin.config().filename(), "assets-manifest.js");
    assert_eq!(plugin.config().global_name(), "APP_ASSETS");
    assert!(plugin.config().should_emit());
  }
}
