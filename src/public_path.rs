//! Resolve the public path prefix and apply it to collected file names.

use std::net::SocketAddr;

use crate::host::{DEFAULT_DEV_SERVER_PORT, DevServerOptions, Environment, OutputOptions};
use crate::models::{RawManifest, ResolvedManifest};

/// Inputs the public path depends on.
#[derive(Debug, Clone, Copy)]
pub struct PublicPathContext<'a> {
  /// Public path configured on the plugin.
  pub configured: Option<&'a str>,
  /// Whether the development server public path is derived automatically.
  pub dev_server_auto: bool,
  /// Output settings of the build.
  pub output: &'a OutputOptions,
  /// Development server settings, when one is configured.
  pub dev_server: Option<&'a DevServerOptions>,
  /// Process facts such as development server detection.
  pub environment: &'a Environment,
}

/// Determine the prefix prepended to every asset file name. Never fails.
///
/// Under a development server with automatic public paths the prefix is a full origin
/// built from the local address, so other devices on the network can load the assets.
pub fn resolve_public_path(context: &PublicPathContext<'_>) -> String {
  let dev_server_active = context.environment.is_dev_server();
  let dev_server = context.dev_server.cloned().unwrap_or_default();

  let fallback = dev_server
    .public_path
    .as_deref()
    .filter(|_| dev_server_active)
    .or(context.output.public_path.as_deref())
    .unwrap_or_default();

  if dev_server_active && context.dev_server_auto {
    let path = if fallback.starts_with('/') {
      fallback.to_string()
    } else {
      format!("/{fallback}")
    };
    let protocol = if dev_server.https { "https" } else { "http" };
    let origin = SocketAddr::new(
      context.environment.local_address(),
      dev_server.port.unwrap_or(DEFAULT_DEV_SERVER_PORT),
    );
    return format!("{protocol}://{origin}{path}");
  }

  context.configured.unwrap_or(fallback).to_string()
}

/// Prefix every file name with `public_path` by plain concatenation.
pub fn apply_public_path(raw: RawManifest, public_path: &str) -> ResolvedManifest {
  ResolvedManifest(
    raw
      .into_iter()
      .map(|(entry, files)| {
        let files = files
          .into_iter()
          .map(|file| format!("{public_path}{file}"))
          .collect();
        (entry, files)
      })
      .collect(),
  )
}
