//! Solar data layer renderer.
//!
//! Reads a data layers descriptor (JSON), renders the requested layers and
//! writes one PNG per bitmap plus a JSON manifest per layer:
//! - `<layer>_<nn>.png`
//! - `<layer>.json` with id, bounds, legend and file names

mod manifest;
mod runner;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use solar_common::DataLayersResponse;
use solar_layers::{HttpSource, LayerConfig, LayerOrchestrator, RasterCache};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "solar-render")]
#[command(about = "Render solar data layers to PNG")]
struct Args {
    /// Data layers descriptor JSON file
    #[arg(long, env = "SOLAR_RESPONSE")]
    response: PathBuf,

    /// Layer to render, repeatable (default: all)
    #[arg(long = "layer", default_value = "all")]
    layers: Vec<String>,

    /// Directory for PNG files and manifests
    #[arg(long, env = "SOLAR_OUTPUT_DIR", default_value = "layers")]
    output_dir: PathBuf,

    /// Per-retrieval timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Decoded rasters kept in memory (0 disables caching)
    #[arg(long)]
    cache_capacity: Option<usize>,

    /// Log filter directive, e.g. `info` or `solar_layers=debug`
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // RUST_LOG wins over --log-level
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .json()
        .init();

    let mut config = LayerConfig::from_env();
    if let Some(secs) = args.timeout_secs {
        config.fetch_timeout = Duration::from_secs(secs);
    }
    if let Some(capacity) = args.cache_capacity {
        config.cache_capacity = capacity;
    }
    config.validate()?;

    let json = tokio::fs::read_to_string(&args.response)
        .await
        .with_context(|| format!("Failed to read {}", args.response.display()))?;
    let response = DataLayersResponse::from_json(&json)
        .with_context(|| format!("Invalid data layers descriptor {}", args.response.display()))?;

    info!(
        quality = ?response.imagery_quality,
        imagery_date = ?response.imagery_date.and_then(|d| d.to_naive_date()),
        "Loaded data layers descriptor"
    );

    let source = HttpSource::new(&config)?;
    let cache = Arc::new(RasterCache::new(config.cache_capacity));
    let orchestrator = LayerOrchestrator::new(Arc::new(source), config).with_cache(cache);

    let names = runner::expand_layers(&args.layers);
    tokio::fs::create_dir_all(&args.output_dir)
        .await
        .with_context(|| format!("Failed to create {}", args.output_dir.display()))?;

    let summary = runner::render_layers(&orchestrator, &response, &names, &args.output_dir).await?;

    info!(
        rendered = summary.rendered.len(),
        failed = summary.failed.len(),
        "Render session complete"
    );

    if summary.all_failed() {
        bail!("All {} requested layers failed", summary.failed.len());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_accepts_filter_directives() {
        let args = Args::parse_from([
            "solar-render",
            "--response",
            "layers.json",
            "--log-level",
            "warn,solar_layers=debug",
        ]);
        let filter = EnvFilter::try_new(&args.log_level).unwrap();
        assert!(filter.to_string().contains("solar_layers=debug"));
    }

    #[test]
    fn test_default_layers() {
        let args = Args::parse_from(["solar-render", "--response", "layers.json"]);
        assert_eq!(args.layers, vec!["all"]);
        assert_eq!(args.log_level, "info");
    }
}
