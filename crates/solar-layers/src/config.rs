//! Configuration for layer retrieval.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{LayerError, LayerResult};
use crate::shade::{ShadeSampling, DAYS_PER_YEAR, HOURS_PER_DAY};

/// Configuration for the layer orchestrator and its raster sources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerConfig {
    /// Upper bound for a single raster retrieval.
    pub fetch_timeout: Duration,

    /// Connection timeout for the HTTP source.
    pub connect_timeout: Duration,

    /// Number of decoded rasters kept in memory. 0 disables caching.
    pub cache_capacity: usize,

    /// Which hourly shade frames to render.
    pub shade_sampling: ShadeSampling,

    /// User-Agent sent by the HTTP source.
    pub user_agent: String,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(60),
            connect_timeout: Duration::from_secs(10),
            cache_capacity: 32,
            shade_sampling: ShadeSampling::default(),
            user_agent: concat!("solar-layers/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl LayerConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("SOLAR_FETCH_TIMEOUT_SECS") {
            match val.parse() {
                Ok(secs) => config.fetch_timeout = Duration::from_secs(secs),
                Err(_) => warn!(value = %val, "Ignoring invalid SOLAR_FETCH_TIMEOUT_SECS"),
            }
        }

        if let Ok(val) = std::env::var("SOLAR_CONNECT_TIMEOUT_SECS") {
            match val.parse() {
                Ok(secs) => config.connect_timeout = Duration::from_secs(secs),
                Err(_) => warn!(value = %val, "Ignoring invalid SOLAR_CONNECT_TIMEOUT_SECS"),
            }
        }

        if let Ok(val) = std::env::var("SOLAR_CACHE_CAPACITY") {
            match val.parse() {
                Ok(capacity) => config.cache_capacity = capacity,
                Err(_) => warn!(value = %val, "Ignoring invalid SOLAR_CACHE_CAPACITY"),
            }
        }

        if let Ok(val) = std::env::var("SOLAR_SHADE_DAY") {
            match val.parse() {
                Ok(day) => config.shade_sampling.day = day,
                Err(_) => warn!(value = %val, "Ignoring invalid SOLAR_SHADE_DAY"),
            }
        }

        if let Ok(val) = std::env::var("SOLAR_SHADE_HOURS") {
            match parse_hours(&val) {
                Some(hours) => config.shade_sampling.hours = hours,
                None => warn!(value = %val, "Ignoring invalid SOLAR_SHADE_HOURS"),
            }
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> LayerResult<()> {
        if self.fetch_timeout.is_zero() {
            return Err(LayerError::Config("fetch_timeout must be > 0".to_string()));
        }

        if self.shade_sampling.day >= DAYS_PER_YEAR {
            return Err(LayerError::Config(format!(
                "shade day must be < {}, got {}",
                DAYS_PER_YEAR, self.shade_sampling.day
            )));
        }

        if self.shade_sampling.hours.is_empty() {
            return Err(LayerError::Config("at least one shade hour is required".to_string()));
        }

        if let Some(hour) = self.shade_sampling.hours.iter().find(|&&h| h >= HOURS_PER_DAY) {
            return Err(LayerError::Config(format!("shade hour must be < 24, got {}", hour)));
        }

        Ok(())
    }
}

/// Parse a comma separated list of hours, `"5, 8,12"`.
fn parse_hours(value: &str) -> Option<Vec<usize>> {
    let hours: Option<Vec<usize>> = value
        .split(',')
        .map(|part| part.trim().parse().ok())
        .collect();
    hours.filter(|h| !h.is_empty())
}
