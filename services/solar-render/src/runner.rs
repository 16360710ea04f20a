//! Renders a list of layers, carrying on past failures.

use std::path::Path;

use anyhow::Result;
use solar_common::{DataLayersResponse, LayerId};
use solar_layers::LayerOrchestrator;
use tracing::{error, info, warn};

use crate::manifest::{self, LayerManifest};

#[derive(Debug, Default)]
pub struct RunSummary {
    pub rendered: Vec<LayerManifest>,
    pub failed: Vec<LayerManifest>,
    /// Requested names that are not layers; nothing is written for them.
    pub unknown: Vec<String>,
}

impl RunSummary {
    /// True when layers were requested and none of them rendered.
    pub fn all_failed(&self) -> bool {
        self.rendered.is_empty() && (!self.failed.is_empty() || !self.unknown.is_empty())
    }
}

/// Expand `all` into every layer name, keeping the order given otherwise.
pub fn expand_layers(requested: &[String]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for name in requested {
        let expanded: Vec<String> = if name == "all" {
            LayerId::ALL.iter().map(|id| id.to_string()).collect()
        } else {
            vec![name.clone()]
        };
        for name in expanded {
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }
    names
}

/// Render each named layer in turn. A failed layer gets an unavailable
/// manifest; only I/O failures on the output directory abort the run.
pub async fn render_layers(
    orchestrator: &LayerOrchestrator,
    response: &DataLayersResponse,
    names: &[String],
    output_dir: &Path,
) -> Result<RunSummary> {
    let mut summary = RunSummary::default();

    for name in names {
        let id: LayerId = match name.parse() {
            Ok(id) => id,
            Err(e) => {
                warn!(layer = %name, error = %e, "Skipping unknown layer");
                summary.unknown.push(name.clone());
                continue;
            }
        };
        match orchestrator.get_layer(id, response).await {
            Ok(layer) => {
                let manifest = manifest::write_layer(output_dir, &layer).await?;
                info!(layer = %id, files = manifest.files.len(), "Wrote layer");
                summary.rendered.push(manifest);
            }
            Err(e) => {
                error!(layer = %id, error = %e, "Layer unavailable");
                let manifest = LayerManifest::unavailable(id, e.to_string());
                manifest::write_manifest(output_dir, &manifest).await?;
                summary.failed.push(manifest);
            }
        }
    }

    Ok(summary)
}
