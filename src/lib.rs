#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod codegen;
pub mod config;
pub mod error;
pub mod host;
pub mod manifest;
pub mod models;
pub mod plugin;
pub mod public_path;
pub mod selection;

pub use codegen::OutputFormat;
pub use config::{ManifestConfig, MinifyMode, PluginOptions};
pub use error::{ConfigError, ManifestError, MergeReadError, MinifyError};
pub use host::{Compilation, Entrypoint, EntrypointRegistry, Environment};
pub use models::{AssetManifest, EmittedAsset, EntryAssets, ManifestOutput};
pub use plugin::AssetsManifestPlugin;
pub use selection::EntrySelection;
