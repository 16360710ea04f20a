//! Identifiers for the renderable data layers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The closed set of data layers the pipeline can render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LayerId {
    /// Building roof mask.
    Mask,
    /// Digital surface model (elevation).
    Dsm,
    /// True-color aerial imagery.
    Rgb,
    /// Annual solar flux.
    AnnualFlux,
    /// Solar flux per month, twelve bands.
    MonthlyFlux,
    /// Sun/shade frames for sampled hours.
    HourlyShade,
}

impl LayerId {
    /// Every layer, in display order.
    pub const ALL: [LayerId; 6] = [
        LayerId::Mask,
        LayerId::Dsm,
        LayerId::Rgb,
        LayerId::AnnualFlux,
        LayerId::MonthlyFlux,
        LayerId::HourlyShade,
    ];

    /// The wire name of the layer (`"annualFlux"`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            LayerId::Mask => "mask",
            LayerId::Dsm => "dsm",
            LayerId::Rgb => "rgb",
            LayerId::AnnualFlux => "annualFlux",
            LayerId::MonthlyFlux => "monthlyFlux",
            LayerId::HourlyShade => "hourlyShade",
        }
    }

    /// Whether the layer is rendered against the roof mask.
    pub fn uses_mask(&self) -> bool {
        !matches!(self, LayerId::Mask)
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LayerId {
    type Err = ParseLayerIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LayerId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| ParseLayerIdError(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unsupported layer: {0}")]
pub struct ParseLayerIdError(pub String);
