//! Per-layer output manifest and file writing.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use renderer::Legend;
use serde::{Deserialize, Serialize};
use solar_common::{GeoBounds, LayerId};
use solar_layers::Layer;

/// Contents of `<layer>.json`. `id` always comes from a `LayerId`, so it is
/// safe to use as a file name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerManifest {
    pub id: String,
    pub available: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<GeoBounds>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legend: Option<Legend>,
    #[serde(default)]
    pub files: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub rendered_at: DateTime<Utc>,
}

impl LayerManifest {
    pub fn unavailable(id: LayerId, error: String) -> Self {
        Self {
            id: id.to_string(),
            available: false,
            bounds: None,
            legend: None,
            files: Vec::new(),
            error: Some(error),
            rendered_at: Utc::now(),
        }
    }
}

/// `dsm_00.png`, `monthlyFlux_11.png`, ...
pub fn bitmap_file_name(layer: &str, index: usize) -> String {
    format!("{}_{:02}.png", layer, index)
}

/// Encode every bitmap of `layer` to PNG under `dir`.
pub async fn write_layer(dir: &Path, layer: &Layer) -> Result<LayerManifest> {
    let id = layer.id.as_str();
    let mut files = Vec::with_capacity(layer.bitmaps.len());

    for (index, bitmap) in layer.bitmaps.iter().enumerate() {
        let name = bitmap_file_name(id, index);
        let png = bitmap
            .to_png()
            .with_context(|| format!("Failed to encode {}", name))?;
        tokio::fs::write(dir.join(&name), png)
            .await
            .with_context(|| format!("Failed to write {}", name))?;
        files.push(name);
    }

    let manifest = LayerManifest {
        id: id.to_string(),
        available: true,
        bounds: Some(layer.bounds),
        legend: layer.legend.clone(),
        files,
        error: None,
        rendered_at: Utc::now(),
    };
    write_manifest(dir, &manifest).await?;
    Ok(manifest)
}

pub async fn write_manifest(dir: &Path, manifest: &LayerManifest) -> Result<()> {
    let path = dir.join(format!("{}.json", manifest.id));
    let json = serde_json::to_vec_pretty(manifest)?;
    tokio::fs::write(&path, json)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use renderer::Bitmap;
    use solar_common::LayerId;

    #[test]
    fn test_file_names() {
        assert_eq!(bitmap_file_name("dsm", 0), "dsm_00.png");
        assert_eq!(bitmap_file_name("monthlyFlux", 11), "monthlyFlux_11.png");
    }

    #[tokio::test]
    async fn test_write_layer() {
        let dir = tempfile::tempdir().unwrap();
        let layer = Layer {
            id: LayerId::HourlyShade,
            bounds: GeoBounds::new(37.5, 37.4, -122.0, -122.1),
            bitmaps: vec![Bitmap::new(2, 2), Bitmap::new(2, 2)],
            legend: None,
        };

        let manifest = write_layer(dir.path(), &layer).await.unwrap();
        assert_eq!(manifest.files, vec!["hourlyShade_00.png", "hourlyShade_01.png"]);

        let png = std::fs::read(dir.path().join("hourlyShade_01.png")).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");

        let json = std::fs::read_to_string(dir.path().join("hourlyShade.json")).unwrap();
        let parsed: LayerManifest = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, manifest);
        assert!(!json.contains("\"error\""));
    }

    #[test]
    fn test_unavailable_manifest_json() {
        let manifest = LayerManifest::unavailable(LayerId::Rgb, "Failed to fetch".to_string());
        let json = serde_json::to_value(&manifest).unwrap();
        assert_eq!(json["available"], false);
        assert_eq!(json["error"], "Failed to fetch");
        assert!(json.get("bounds").is_none());
        assert!(json.get("renderedAt").is_some());
    }
}
