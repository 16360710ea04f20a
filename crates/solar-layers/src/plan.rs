//! What each layer needs: which rasters to fetch and how to render them.

use renderer::{palette, Legend, Palette};
use solar_common::{DataLayersResponse, LayerId, RasterImage};

use crate::error::{LayerError, LayerResult};
use crate::shade::ShadeSampling;

/// Number of bands in the monthly flux raster.
pub const MONTHS: usize = 12;

/// Fixed color domain for monthly flux, kWh/m²/month.
pub const MONTHLY_FLUX_DOMAIN: (f32, f32) = (0.0, 200.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaletteChoice {
    Binary,
    Sunlight,
    Rainbow,
    Iron,
    RgbPassthrough,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DomainPolicy {
    /// Min and max of the decoded band, ignoring missing values.
    FromData,
    Fixed(f32, f32),
    /// Binary and RGB palettes have no domain.
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegendPolicy {
    None,
    Labels(&'static str, &'static str),
    /// Domain bounds to one decimal with this unit.
    Units(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BandSelection {
    /// Band 0 of every data raster, one bitmap each.
    First,
    /// Bands `0..n` of the single data raster, one bitmap each.
    Each(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayerPlan {
    pub id: LayerId,
    pub mask_url: Option<String>,
    pub data_urls: Vec<String>,
    pub palette: PaletteChoice,
    pub domain: DomainPolicy,
    pub legend: LegendPolicy,
    pub bands: BandSelection,
}

impl LayerPlan {
    /// Build the plan for `id`, failing before any retrieval if the
    /// descriptor lacks a URL the layer needs.
    pub fn build(
        id: LayerId,
        response: &DataLayersResponse,
        sampling: &ShadeSampling,
    ) -> LayerResult<Self> {
        let url = |layer: LayerId| {
            response
                .url_for(layer)
                .map(str::to_string)
                .ok_or(LayerError::MissingUrl(layer))
        };
        let mask_url = if id.uses_mask() {
            Some(url(LayerId::Mask)?)
        } else {
            None
        };

        let plan = match id {
            LayerId::Mask => Self {
                id,
                mask_url,
                data_urls: vec![url(LayerId::Mask)?],
                palette: PaletteChoice::Binary,
                domain: DomainPolicy::None,
                legend: LegendPolicy::Labels("No roof", "Roof"),
                bands: BandSelection::First,
            },
            LayerId::Dsm => Self {
                id,
                mask_url,
                data_urls: vec![url(LayerId::Dsm)?],
                palette: PaletteChoice::Rainbow,
                domain: DomainPolicy::FromData,
                legend: LegendPolicy::Units("m"),
                bands: BandSelection::First,
            },
            LayerId::Rgb => Self {
                id,
                mask_url,
                data_urls: vec![url(LayerId::Rgb)?],
                palette: PaletteChoice::RgbPassthrough,
                domain: DomainPolicy::None,
                legend: LegendPolicy::None,
                bands: BandSelection::First,
            },
            LayerId::AnnualFlux => Self {
                id,
                mask_url,
                data_urls: vec![url(LayerId::AnnualFlux)?],
                palette: PaletteChoice::Iron,
                domain: DomainPolicy::FromData,
                legend: LegendPolicy::Units("kWh/m²/year"),
                bands: BandSelection::First,
            },
            LayerId::MonthlyFlux => Self {
                id,
                mask_url,
                data_urls: vec![url(LayerId::MonthlyFlux)?],
                palette: PaletteChoice::Iron,
                domain: DomainPolicy::Fixed(MONTHLY_FLUX_DOMAIN.0, MONTHLY_FLUX_DOMAIN.1),
                legend: LegendPolicy::Units("kWh/m²/month"),
                bands: BandSelection::Each(MONTHS),
            },
            LayerId::HourlyShade => {
                let data_urls = sampling
                    .select(&response.hourly_shade_urls)?
                    .into_iter()
                    .map(|u| {
                        if u.is_empty() {
                            Err(LayerError::MissingUrl(LayerId::HourlyShade))
                        } else {
                            Ok(u.to_string())
                        }
                    })
                    .collect::<LayerResult<Vec<_>>>()?;
                Self {
                    id,
                    mask_url,
                    data_urls,
                    palette: PaletteChoice::Sunlight,
                    domain: DomainPolicy::None,
                    legend: LegendPolicy::Labels("Shade", "Sun"),
                    bands: BandSelection::First,
                }
            }
        };
        Ok(plan)
    }

    /// Every URL the plan retrieves, mask first.
    pub fn urls(&self) -> impl Iterator<Item = &str> {
        self.mask_url
            .iter()
            .chain(self.data_urls.iter())
            .map(String::as_str)
    }

    /// Palette for this layer, with its domain resolved against `data`.
    pub fn palette_for(&self, data: &RasterImage) -> LayerResult<Palette> {
        let (min, max) = match self.domain {
            DomainPolicy::FromData => data.value_range(0).unwrap_or((0.0, 0.0)),
            DomainPolicy::Fixed(min, max) => (min, max),
            DomainPolicy::None => (0.0, 1.0),
        };
        let palette = match self.palette {
            PaletteChoice::Binary => palette::binary(),
            PaletteChoice::Sunlight => palette::sunlight(),
            PaletteChoice::Rainbow => palette::rainbow(min, max)?,
            PaletteChoice::Iron => palette::iron(min, max)?,
            PaletteChoice::RgbPassthrough => Palette::rgb_passthrough(),
        };
        Ok(palette)
    }

    pub fn legend_for(&self, palette: &Palette) -> Option<Legend> {
        match self.legend {
            LegendPolicy::None => None,
            LegendPolicy::Labels(min, max) => Some(Legend::labeled(palette, min, max)),
            LegendPolicy::Units(unit) => Some(Legend::with_units(palette, unit)),
        }
    }
}
