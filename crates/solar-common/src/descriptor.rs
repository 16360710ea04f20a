//! The data layers descriptor returned by the solar API.
//!
//! The pipeline consumes this read-only. Authentication parameters, if
//! any, are expected to be part of the URLs already.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::LayerId;

/// Number of hours in a (non-leap) year of hourly shade URLs.
pub const HOURS_PER_YEAR: usize = 365 * 24;

/// Download URLs and imagery metadata for one location.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataLayersResponse {
    #[serde(default)]
    pub imagery_date: Option<ImageryDate>,
    #[serde(default)]
    pub imagery_processed_date: Option<ImageryDate>,
    #[serde(default)]
    pub dsm_url: String,
    #[serde(default)]
    pub rgb_url: String,
    #[serde(default)]
    pub mask_url: String,
    #[serde(default)]
    pub annual_flux_url: String,
    #[serde(default)]
    pub monthly_flux_url: String,
    /// Indexed `day * 24 + hour`.
    #[serde(default)]
    pub hourly_shade_urls: Vec<String>,
    #[serde(default)]
    pub imagery_quality: ImageryQuality,
}

impl DataLayersResponse {
    /// Parse a descriptor from its JSON form.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// The single data URL of a layer, `None` for layers without one
    /// (hourly shade) or when the descriptor leaves it empty.
    pub fn url_for(&self, layer: LayerId) -> Option<&str> {
        let url = match layer {
            LayerId::Mask => &self.mask_url,
            LayerId::Dsm => &self.dsm_url,
            LayerId::Rgb => &self.rgb_url,
            LayerId::AnnualFlux => &self.annual_flux_url,
            LayerId::MonthlyFlux => &self.monthly_flux_url,
            LayerId::HourlyShade => return None,
        };
        if url.is_empty() {
            None
        } else {
            Some(url.as_str())
        }
    }
}

/// A calendar date as returned by the API (`{year, month, day}`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageryDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl ImageryDate {
    /// Convert to a chrono date, `None` if the fields do not form a valid date.
    pub fn to_naive_date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)
    }
}

/// Imagery quality tag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImageryQuality {
    High,
    Medium,
    Base,
    #[default]
    #[serde(rename = "IMAGERY_QUALITY_UNSPECIFIED")]
    Unspecified,
}
