use std::path::PathBuf;

use anyhow::{Context, Result};
use assets_manifest::{AssetsManifestPlugin, Compilation, Environment, PluginOptions};
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Generate an assets manifest from a finished build snapshot.
#[derive(Parser)]
#[command(name = "assets-manifest")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Build snapshot describing entry points and output settings (JSON)
  #[arg(short, long)]
  build: PathBuf,

  /// Plugin options (JSON); defaults apply when omitted
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Treat the build as running under the development server
  #[arg(long)]
  dev_server: bool,

  /// Print the manifest source instead of writing it
  #[arg(long)]
  stdout: bool,
}

fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .without_time()
    .init();

  let cli = Cli::parse();

  let options = match &cli.config {
    Some(path) => PluginOptions::from_path(path)?,
    None => PluginOptions::default(),
  };
  let compilation = Compilation::from_path(&cli.build)?;

  let mut plugin = AssetsManifestPlugin::new(options)?;
  if cli.dev_server && !plugin.environment().is_dev_server() {
    plugin = plugin.with_environment(Environment::detect_dev_server());
  }

  let Some(output) = plugin.apply(&compilation)? else {
    return Ok(());
  };

  if let Some(asset) = output.asset {
    if cli.stdout {
      println!("{}", asset.source);
    } else {
      asset
        .write()
        .with_context(|| format!("failed to emit {}", asset.name))?;
      println!("{}", asset.path.display());
    }
  }

  Ok(())
}
