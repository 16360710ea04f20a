//! Legends describing how to read a rendered palette.

use serde::{Deserialize, Serialize};

use crate::palette::Palette;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Legend {
    /// Palette stops as lowercase `rrggbb`
    pub colors: Vec<String>,
    pub min_label: String,
    pub max_label: String,
}

impl Legend {
    /// Legend with explicit labels, for example "Shade" and "Sun".
    pub fn labeled(
        palette: &Palette,
        min_label: impl Into<String>,
        max_label: impl Into<String>,
    ) -> Self {
        Self {
            colors: palette.colors().iter().map(|c| c.to_hex()).collect(),
            min_label: min_label.into(),
            max_label: max_label.into(),
        }
    }

    /// Legend labelled with the palette domain to one decimal place and a unit.
    pub fn with_units(palette: &Palette, unit: &str) -> Self {
        Self::labeled(
            palette,
            format_value(palette.domain_min(), unit),
            format_value(palette.domain_max(), unit),
        )
    }
}

/// `"{value:.1} {unit}"`, or just the number when `unit` is empty.
pub fn format_value(value: f32, unit: &str) -> String {
    if unit.is_empty() {
        format!("{:.1}", value)
    } else {
        format!("{:.1} {}", value, unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette;

    #[test]
    fn test_units_legend() {
        let legend = Legend::with_units(&palette::rainbow(12.34, 48.06).unwrap(), "m");
        assert_eq!(legend.min_label, "12.3 m");
        assert_eq!(legend.max_label, "48.1 m");
        assert_eq!(legend.colors[0], "3949ab");
        assert_eq!(legend.colors.len(), 5);
    }

    #[test]
    fn test_labeled_legend_serializes_camel_case() {
        let legend = Legend::labeled(&palette::sunlight(), "Shade", "Sun");
        let json = serde_json::to_value(&legend).unwrap();
        assert_eq!(json["minLabel"], "Shade");
        assert_eq!(json["maxLabel"], "Sun");
        assert_eq!(json["colors"][1], "ffca28");
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(200.0, "kWh/m²/month"), "200.0 kWh/m²/month");
        assert_eq!(format_value(3.0, ""), "3.0");
    }
}
