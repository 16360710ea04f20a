//! Sampling of the yearly hourly-shade series.
//!
//! Hourly shade URLs are indexed `day * 24 + hour`. Rather than fetching all
//! 8760 frames, a handful of hours on a single day are selected.

use serde::{Deserialize, Serialize};

use crate::error::{LayerError, LayerResult};

pub const HOURS_PER_DAY: usize = 24;
pub const DAYS_PER_YEAR: usize = 365;

/// Summer solstice as a zero-based day of a non-leap year.
pub const SOLSTICE_DAY: usize = 172;
pub const DEFAULT_HOURS: [usize; 5] = [5, 8, 12, 16, 20];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShadeSampling {
    /// Zero-based day of year
    pub day: usize,
    /// Hours of day, 0-23, in output order
    pub hours: Vec<usize>,
}

impl Default for ShadeSampling {
    fn default() -> Self {
        Self {
            day: SOLSTICE_DAY,
            hours: DEFAULT_HOURS.to_vec(),
        }
    }
}

impl ShadeSampling {
    pub fn new(day: usize, hours: Vec<usize>) -> Self {
        Self { day, hours }
    }

    /// Flat indices into the hourly URL array, one per sampled hour.
    pub fn indices(&self) -> LayerResult<Vec<usize>> {
        if self.day >= DAYS_PER_YEAR {
            return Err(LayerError::IndexOutOfRange {
                index: self.day,
                len: DAYS_PER_YEAR,
            });
        }
        self.hours
            .iter()
            .map(|&hour| {
                if hour >= HOURS_PER_DAY {
                    Err(LayerError::IndexOutOfRange {
                        index: hour,
                        len: HOURS_PER_DAY,
                    })
                } else {
                    Ok(self.day * HOURS_PER_DAY + hour)
                }
            })
            .collect()
    }

    /// Pick the sampled URLs out of the full series.
    pub fn select<'a>(&self, urls: &'a [String]) -> LayerResult<Vec<&'a str>> {
        self.indices()?
            .into_iter()
            .map(|index| {
                urls.get(index)
                    .map(String::as_str)
                    .ok_or(LayerError::IndexOutOfRange {
                        index,
                        len: urls.len(),
                    })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_indices() {
        let indices = ShadeSampling::default().indices().unwrap();
        assert_eq!(indices, vec![4133, 4136, 4140, 4144, 4148]);
        assert_eq!(indices[0], 172 * 24 + 5);
    }

    #[test]
    fn test_select_picks_urls() {
        let urls: Vec<String> = (0..DAYS_PER_YEAR * HOURS_PER_DAY)
            .map(|i| format!("u{}", i))
            .collect();
        let selected = ShadeSampling::default().select(&urls).unwrap();
        assert_eq!(selected, vec!["u4133", "u4136", "u4140", "u4144", "u4148"]);
    }

    #[test]
    fn test_short_series_is_index_error() {
        let urls = vec!["only".to_string(); 100];
        let err = ShadeSampling::default().select(&urls).unwrap_err();
        assert!(matches!(
            err,
            LayerError::IndexOutOfRange { index: 4133, len: 100 }
        ));
    }

    #[test]
    fn test_out_of_range_day_and_hour() {
        assert!(matches!(
            ShadeSampling::new(365, vec![0]).indices(),
            Err(LayerError::IndexOutOfRange { index: 365, len: 365 })
        ));
        assert!(matches!(
            ShadeSampling::new(0, vec![3, 24]).indices(),
            Err(LayerError::IndexOutOfRange { index: 24, len: 24 })
        ));
    }

    #[test]
    fn test_last_hour_of_year() {
        let indices = ShadeSampling::new(364, vec![23]).indices().unwrap();
        assert_eq!(indices, vec![8759]);
    }
}
