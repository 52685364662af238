//! Serialise a manifest as a JSON document or as a universal module.

mod format;
mod lexer;
mod minify;
mod umd;

use std::sync::OnceLock;

use regex::Regex;

use crate::error::ManifestError;
use crate::models::AssetManifest;

pub use format::format_module;
pub use lexer::MinifyError;
pub use minify::minify_module;
pub use umd::wrap_umd;

fn format_suffix_pattern() -> &'static Regex {
  static PATTERN: OnceLock<Regex> = OnceLock::new();
  PATTERN.get_or_init(|| Regex::new(r"\.(js|json)$").expect("invalid format suffix regex"))
}

/// Output format chosen from the manifest filename.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
  /// Plain JSON document (`.json`).
  Json,
  /// Universal module exporting the manifest (`.js`).
  Module,
}

impl OutputFormat {
  /// Detect the format from a filename suffix.
  pub fn detect(filename: &str) -> Option<Self> {
    let captures = format_suffix_pattern().captures(filename)?;
    match captures.get(1)?.as_str() {
      "json" => Some(Self::Json),
      _ => Some(Self::Module),
    }
  }

  /// Detect the format, failing on unsupported suffixes.
  pub fn from_filename(filename: &str) -> Result<Self, ManifestError> {
    Self::detect(filename).ok_or_else(|| ManifestError::UnsupportedFormat {
      filename: filename.to_string(),
    })
  }
}

/// Render the manifest in `format`.
///
/// JSON is pretty printed with two-space indentation unless `minimize` is set. Modules
/// are re-indented, or compacted when `minimize` is set; either way the data literal is
/// preserved exactly.
pub fn render_manifest(
  manifest: &AssetManifest,
  format: OutputFormat,
  minimize: bool,
  global_name: &str,
) -> Result<String, ManifestError> {
  match format {
    OutputFormat::Json if minimize => Ok(serde_json::to_string(manifest)?),
    OutputFormat::Json => Ok(serde_json::to_string_pretty(manifest)?),
    OutputFormat::Module => {
      let data = serde_json::to_string_pretty(manifest)?;
      let code = wrap_umd(global_name, &data);
      if minimize {
        Ok(minify_module(&code)?)
      } else {
        Ok(format_module(&code)?)
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::EntryAssets;

  fn manifest() -> AssetManifest {
    let mut manifest = AssetManifest::new();
    manifest.insert("app".into(), EntryAssets {
      scripts: vec!["/assets/app.js".into()],
      styles: Vec::new(),
    });
    manifest
  }

  #[test]
  fn detects_format_from_suffix() {
    assert_eq!(OutputFormat::detect("manifest.json"), Some(OutputFormat::Json));
    assert_eq!(OutputFormat::detect("out/manifest.js"), Some(OutputFormat::Module));
    assert_eq!(OutputFormat::detect("manifest.jsonp"), None);
    assert!(matches!(
      OutputFormat::from_filename("manifest.yml"),
      Err(ManifestError::UnsupportedFormat { filename }) if filename == "manifest.yml"
    ));
  }

  #[test]
  fn renders_pretty_json() {
    let code = render_manifest(&manifest(), OutputFormat::Json, false, "M").unwrap();
    assert_eq!(
      code,
      "{\n  \"app\": {\n    \"scripts\": [\n      \"/assets/app.js\"\n    ],\n    \"styles\": []\n  }\n}"
    );
  }

  #[test]
  fn renders_compact_json_that_round_trips() {
    let code = render_manifest(&manifest(), OutputFormat::Json, true, "M").unwrap();
    assert_eq!(code, r#"{"app":{"scripts":["/assets/app.js"],"styles":[]}}"#);

    let parsed: AssetManifest = serde_json::from_str(&code).unwrap();
    assert_eq!(parsed, manifest());
  }

  #[test]
  fn renders_formatted_module() {
    let code =
      render_manifest(&manifest(), OutputFormat::Module, false, "ASSETS_MANIFEST").unwrap();
    let expected = r#"(function (root, factory) {
  if (typeof exports === 'object' && typeof module === 'object') {
    module.exports = factory();
  } else if (typeof define === 'function' && define.amd) {
    define([], factory);
  } else if (typeof exports === 'object') {
    exports["ASSETS_MANIFEST"] = factory();
  } else {
    root["ASSETS_MANIFEST"] = factory();
  }
})(typeof window !== 'undefined' ? window : this, function () {
  // assets manifest
  return {
    "app": {
      "scripts": [
        "/assets/app.js"
      ],
      "styles": []
    }
  };
});"#;
    assert_eq!(code, expected);
  }

  #[test]
  fn renders_minified_module() {
    let code = render_manifest(&manifest(), OutputFormat::Module, true, "ASSETS_MANIFEST").unwrap();
    let expected = concat!(
      "(function(root,factory){",
      "if(typeof exports==='object'&&typeof module==='object'){module.exports=factory();}",
      "else if(typeof define==='function'&&define.amd){define([],factory);}",
      "else if(typeof exports==='object'){exports[\"ASSETS_MANIFEST\"]=factory();}",
      "else{root[\"ASSETS_MANIFEST\"]=factory();}",
      "})(typeof window!=='undefined'?window:this,function(){",
      "return{\"app\":{\"scripts\":[\"/assets/app.js\"],\"styles\":[]}};",
      "});"
    );
    assert_eq!(code, expected);
    assert_eq!(minify_module(&code).unwrap(), code);
  }

  #[test]
  fn minified_and_formatted_modules_carry_the_same_data() {
    let pretty = render_manifest(&manifest(), OutputFormat::Module, false, "M").unwrap();
    let minified = render_manifest(&manifest(), OutputFormat::Module, true, "M").unwrap();
    assert_eq!(minify_module(&pretty).unwrap(), minified);
  }
}
