//! Fetch, decode and render one layer.

use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use futures::future::try_join_all;
use metrics::{counter, histogram};
use renderer::{render, render_bands, Bitmap, Legend, RenderOptions};
use solar_common::{DataLayersResponse, GeoBounds, LayerId, RasterImage};
use tracing::{debug, info, instrument};

use crate::cache::RasterCache;
use crate::config::LayerConfig;
use crate::error::{LayerError, LayerResult};
use crate::plan::{BandSelection, LayerPlan};
use crate::source::RasterSource;

/// A rendered layer, ready to be overlaid at `bounds`.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub id: LayerId,
    pub bounds: GeoBounds,
    pub bitmaps: Vec<Bitmap>,
    pub legend: Option<Legend>,
}

/// Turns a data layers descriptor into rendered layers.
///
/// Each request retrieves its rasters concurrently. The first failure
/// cancels the remaining retrievals and fails the whole request.
pub struct LayerOrchestrator {
    source: Arc<dyn RasterSource>,
    config: LayerConfig,
    cache: Option<Arc<RasterCache>>,
    options: RenderOptions,
}

impl LayerOrchestrator {
    pub fn new(source: Arc<dyn RasterSource>, config: LayerConfig) -> Self {
        Self {
            source,
            config,
            cache: None,
            options: RenderOptions::default(),
        }
    }

    /// Share decoded rasters through `cache`.
    pub fn with_cache(mut self, cache: Arc<RasterCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_render_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    pub fn config(&self) -> &LayerConfig {
        &self.config
    }

    pub fn cache(&self) -> Option<&Arc<RasterCache>> {
        self.cache.as_ref()
    }

    /// Render the layer named `name` (`"dsm"`, `"monthlyFlux"`, ...).
    pub async fn get_layer_by_name(
        &self,
        name: &str,
        response: &DataLayersResponse,
    ) -> LayerResult<Layer> {
        let id: LayerId = name
            .parse()
            .map_err(|_| LayerError::UnsupportedLayer(name.to_string()))?;
        self.get_layer(id, response).await
    }

    #[instrument(skip(self, response), fields(layer = %id))]
    pub async fn get_layer(
        &self,
        id: LayerId,
        response: &DataLayersResponse,
    ) -> LayerResult<Layer> {
        let started = Instant::now();
        let plan = LayerPlan::build(id, response, &self.config.shade_sampling)?;

        let mask = async {
            match &plan.mask_url {
                Some(url) => self.raster(url).await.map(Some),
                None => Ok(None),
            }
        };
        let data = try_join_all(plan.data_urls.iter().map(|url| self.raster(url)));
        let (mask, data) = futures::try_join!(mask, data)?;

        let options = self.options;
        let layer = tokio::task::spawn_blocking(move || {
            render_plan(&plan, mask.as_deref(), &data, &options)
        })
        .await
        .map_err(|e| LayerError::Task(e.to_string()))??;

        let elapsed = started.elapsed();
        histogram!("solar_layer_render_seconds", "layer" => id.as_str())
            .record(elapsed.as_secs_f64());
        info!(
            bitmaps = layer.bitmaps.len(),
            width = layer.bitmaps.first().map_or(0, Bitmap::width),
            height = layer.bitmaps.first().map_or(0, Bitmap::height),
            elapsed_ms = elapsed.as_millis() as u64,
            "Rendered layer"
        );
        Ok(layer)
    }

    /// Retrieve and decode one raster, going through the cache if any.
    #[instrument(skip(self))]
    async fn raster(&self, url: &str) -> LayerResult<Arc<RasterImage>> {
        if let Some(cache) = &self.cache {
            if let Some(raster) = cache.get(url).await {
                return Ok(raster);
            }
        }

        let bytes = self.fetch(url).await?;
        let raster = Arc::new(decode(bytes).await?);

        if let Some(cache) = &self.cache {
            cache.insert(url, raster.clone()).await;
        }
        Ok(raster)
    }

    async fn fetch(&self, url: &str) -> LayerResult<Bytes> {
        let timeout = self.config.fetch_timeout;
        let bytes = tokio::time::timeout(timeout, self.source.fetch(url))
            .await
            .map_err(|_| LayerError::Timeout {
                url: url.to_string(),
                seconds: timeout.as_secs_f64(),
            })??;

        counter!("solar_raster_fetch_total").increment(1);
        counter!("solar_raster_fetch_bytes_total").increment(bytes.len() as u64);
        debug!(bytes = bytes.len(), "Fetched raster");
        Ok(bytes)
    }
}

async fn decode(bytes: Bytes) -> LayerResult<RasterImage> {
    let started = Instant::now();
    let raster = tokio::task::spawn_blocking(move || geotiff_parser::decode(&bytes))
        .await
        .map_err(|e| LayerError::Task(e.to_string()))??;
    histogram!("solar_raster_decode_seconds").record(started.elapsed().as_secs_f64());
    Ok(raster)
}

/// Render decoded rasters according to `plan`.
fn render_plan(
    plan: &LayerPlan,
    mask: Option<&RasterImage>,
    data: &[Arc<RasterImage>],
    options: &RenderOptions,
) -> LayerResult<Layer> {
    let first = data.first().ok_or(LayerError::MissingUrl(plan.id))?;
    let palette = plan.palette_for(first)?;

    let bitmaps = match plan.bands {
        BandSelection::First => data
            .iter()
            .map(|raster| render(raster, mask, &palette, options))
            .collect::<Result<Vec<_>, _>>()?,
        BandSelection::Each(count) => {
            let indices: Vec<usize> = (0..count).collect();
            render_bands(first, mask, &palette, options, &indices)?
        }
    };

    Ok(Layer {
        id: plan.id,
        bounds: first.bounds(),
        bitmaps,
        legend: plan.legend_for(&palette),
    })
}
