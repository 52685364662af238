//! The slice of the host build the plugin reads once per build.

use std::env;
use std::fs;
use std::net::{IpAddr, Ipv4Addr, UdpSocket};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Environment variable set by the development server for the processes it spawns.
pub const DEV_SERVER_ENV: &str = "WEBPACK_DEV_SERVER";

/// Port assumed when the development server does not configure one.
pub const DEFAULT_DEV_SERVER_PORT: u16 = 8080;

/// Read access to the entry points known to the build.
pub trait EntrypointRegistry {
  /// Names of every known entry point, in the registry's own order.
  fn entry_names(&self) -> Vec<&str>;

  /// Output files of an entry point, concatenated across its chunks in host order.
  ///
  /// Returns `None` when the build does not know the entry point.
  fn entry_files(&self, name: &str) -> Option<Vec<&str>>;
}

/// A unit of output belonging to an entry point.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Chunk {
  /// Output file names in the order the build reported them.
  #[serde(default)]
  pub files: Vec<String>,
}

/// Named root of the build graph.
#[derive(Debug, Clone, Deserialize)]
pub struct Entrypoint {
  /// Entry point name.
  pub name: String,
  /// Chunks that make up the entry point.
  #[serde(default)]
  pub chunks: Vec<Chunk>,
}

impl Entrypoint {
  /// Entry point with a single chunk holding `files`.
  pub fn new<I, S>(name: impl Into<String>, files: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Self {
      name: name.into(),
      chunks: vec![Chunk {
        files: files.into_iter().map(Into::into).collect(),
      }],
    }
  }
}

impl EntrypointRegistry for [Entrypoint] {
  fn entry_names(&self) -> Vec<&str> {
    self.iter().map(|entry| entry.name.as_str()).collect()
  }

  fn entry_files(&self, name: &str) -> Option<Vec<&str>> {
    self.iter().find(|entry| entry.name == name).map(|entry| {
      entry
        .chunks
        .iter()
        .flat_map(|chunk| chunk.files.iter().map(String::as_str))
        .collect()
    })
  }
}

/// Output settings of the build.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputOptions {
  /// Directory the build writes its assets to.
  #[serde(default)]
  pub path: PathBuf,
  /// Public path the build serves its assets from.
  #[serde(default)]
  pub public_path: Option<String>,
}

/// Optimisation settings of the build.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Optimization {
  /// Whether the build minimises its own output.
  #[serde(default)]
  pub minimize: bool,
}

/// Settings of the local development server.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DevServerOptions {
  /// Public path the development server serves assets from.
  #[serde(default)]
  pub public_path: Option<String>,
  /// Port the development server listens on.
  #[serde(default)]
  pub port: Option<u16>,
  /// Whether the development server uses TLS.
  #[serde(default)]
  pub https: bool,
}

/// Snapshot of a finished build.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Compilation {
  /// Entry points in the build's own order.
  #[serde(default)]
  pub entrypoints: Vec<Entrypoint>,
  /// Output settings.
  #[serde(default)]
  pub output: OutputOptions,
  /// Optimisation settings.
  #[serde(default)]
  pub optimization: Optimization,
  /// Development server settings, when one is configured.
  #[serde(default)]
  pub dev_server: Option<DevServerOptions>,
}

impl Compilation {
  /// Load a build snapshot from a JSON file.
  pub fn from_path(path: &Path) -> Result<Self> {
    let content = fs::read_to_string(path)
      .with_context(|| format!("build snapshot not found at {}", path.display()))?;
    let compilation =
      serde_json::from_str(&content).context("failed to parse build snapshot JSON")?;
    Ok(compilation)
  }

  /// Entry point registry of this build.
  pub fn registry(&self) -> &[Entrypoint] {
    &self.entrypoints
  }
}

/// Process facts the public path depends on.
///
/// Passed in explicitly so both the development server and the regular build branch can
/// be exercised deterministically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Environment {
  dev_server: bool,
  local_address: IpAddr,
}

impl Default for Environment {
  fn default() -> Self {
    Self::build()
  }
}

impl Environment {
  /// A regular build that is not running under a development server.
  pub fn build() -> Self {
    Self {
      dev_server: false,
      local_address: IpAddr::V4(Ipv4Addr::LOCALHOST),
    }
  }

  /// Running under a development server reachable at `local_address`.
  pub fn dev_server(local_address: IpAddr) -> Self {
    Self {
      dev_server: true,
      local_address,
    }
  }

  /// Running under a development server on this machine, with a probed local address.
  pub fn detect_dev_server() -> Self {
    Self::dev_server(detect_local_address().unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST)))
  }

  /// Inspect the current process.
  pub fn detect() -> Self {
    let dev_server = env::var_os(DEV_SERVER_ENV).is_some_and(|value| !value.is_empty());
    if dev_server {
      Self::detect_dev_server()
    } else {
      Self::build()
    }
  }

  /// Whether a development server is running this build.
  pub fn is_dev_server(&self) -> bool {
    self.dev_server
  }

  /// Network reachable address of this machine.
  pub fn local_address(&self) -> IpAddr {
    self.local_address
  }
}

/// Address of the interface used for outbound traffic.
///
/// Connecting a UDP socket only selects a route, no packet leaves the machine.
fn detect_local_address() -> Option<IpAddr> {
  let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).ok()?;
  socket.connect((Ipv4Addr::new(10, 255, 255, 255), 1)).ok()?;
  let address = socket.local_addr().ok()?.ip();
  (!address.is_unspecified()).then_some(address)
}
