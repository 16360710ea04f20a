//! GeoTIFF georeferencing: raster space to WGS84 bounds.

use projection::ProjectedCrs;
use solar_common::GeoBounds;
use tracing::debug;

use crate::ifd::Ifd;
use crate::tags::{self, tag_name};
use crate::{DecodeError, DecodeResult};

/// The subset of the GeoKeyDirectory needed to place a raster.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GeoKeys {
    pub model_type: Option<u16>,
    pub raster_type: Option<u16>,
    pub geographic_type: Option<u16>,
    pub projected_type: Option<u16>,
}

impl GeoKeys {
    /// Read short-valued keys from the GeoKeyDirectory tag.
    ///
    /// Layout: a 4-short header `[version, revision, minor, count]` then
    /// `count` entries of `[key, location, count, value]`. Location 0 means
    /// the value is stored inline.
    pub fn from_ifd(ifd: &Ifd<'_>) -> DecodeResult<Self> {
        let Some(dir) = ifd.u64_list(tags::GEO_KEY_DIRECTORY)? else {
            return Ok(Self::default());
        };
        if dir.len() < 4 {
            return Err(DecodeError::InvalidTag {
                tag: tag_name(tags::GEO_KEY_DIRECTORY),
                reason: format!("header needs 4 values, found {}", dir.len()),
            });
        }
        let count = dir[3];
        let entries = usize::try_from(count)
            .ok()
            .and_then(|c| c.checked_mul(4))
            .and_then(|n| dir.get(4..n.checked_add(4)?))
            .ok_or_else(|| DecodeError::InvalidTag {
                tag: tag_name(tags::GEO_KEY_DIRECTORY),
                reason: format!("{} keys declared, {} values present", count, dir.len()),
            })?;

        let mut keys = Self::default();
        for entry in entries.chunks_exact(4) {
            let (key, location, value) = (entry[0] as u16, entry[1], entry[3] as u16);
            if location != 0 {
                continue;
            }
            match key {
                tags::GT_MODEL_TYPE_GEO_KEY => keys.model_type = Some(value),
                tags::GT_RASTER_TYPE_GEO_KEY => keys.raster_type = Some(value),
                tags::GEOGRAPHIC_TYPE_GEO_KEY => keys.geographic_type = Some(value),
                tags::PROJECTED_CS_TYPE_GEO_KEY => keys.projected_type = Some(value),
                _ => {}
            }
        }
        Ok(keys)
    }

    fn is_projected(&self) -> bool {
        self.model_type == Some(tags::MODEL_TYPE_PROJECTED)
            || (self.model_type.is_none() && self.projected_type.is_some())
    }
}

/// Affine raster-to-model transform.
///
/// `x = a*col + b*row + c`, `y = d*col + e*row + f`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoTransform {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl GeoTransform {
    /// Build from ModelPixelScale + ModelTiepoint, or from ModelTransformation.
    pub fn from_ifd(ifd: &Ifd<'_>) -> DecodeResult<Self> {
        if let Some(m) = ifd.f64_list(tags::MODEL_TRANSFORMATION)? {
            if m.len() != 16 {
                return Err(DecodeError::InvalidTag {
                    tag: tag_name(tags::MODEL_TRANSFORMATION),
                    reason: format!("expected 16 values, found {}", m.len()),
                });
            }
            return Ok(Self {
                a: m[0],
                b: m[1],
                c: m[3],
                d: m[4],
                e: m[5],
                f: m[7],
            });
        }

        let tiepoint = ifd
            .f64_list(tags::MODEL_TIEPOINT)?
            .ok_or(DecodeError::MissingTag(tag_name(tags::MODEL_TIEPOINT)))?;
        let scale = ifd
            .f64_list(tags::MODEL_PIXEL_SCALE)?
            .ok_or(DecodeError::MissingTag(tag_name(tags::MODEL_PIXEL_SCALE)))?;
        if tiepoint.len() < 6 {
            return Err(DecodeError::InvalidTag {
                tag: tag_name(tags::MODEL_TIEPOINT),
                reason: format!("expected at least 6 values, found {}", tiepoint.len()),
            });
        }
        if tiepoint.len() > 6 {
            debug!(count = tiepoint.len() / 6, "Using first of several tiepoints");
        }
        if scale.len() < 2 || scale[0] <= 0.0 || scale[1] <= 0.0 {
            return Err(DecodeError::InvalidTag {
                tag: tag_name(tags::MODEL_PIXEL_SCALE),
                reason: format!("expected two positive scales, found {:?}", scale),
            });
        }

        let (i, j, x, y) = (tiepoint[0], tiepoint[1], tiepoint[3], tiepoint[4]);
        let (sx, sy) = (scale[0], scale[1]);
        Ok(Self {
            a: sx,
            b: 0.0,
            c: x - i * sx,
            d: 0.0,
            e: -sy,
            f: y + j * sy,
        })
    }

    /// Model coordinates of a raster position (pixel corners at integers).
    pub fn apply(&self, col: f64, row: f64) -> (f64, f64) {
        (
            self.a * col + self.b * row + self.c,
            self.d * col + self.e * row + self.f,
        )
    }

    /// Move the origin by half a pixel, for PixelIsPoint rasters whose
    /// tiepoint names a pixel centre.
    fn shifted_to_corner(self) -> Self {
        let (c, f) = self.apply(-0.5, -0.5);
        Self { c, f, ..self }
    }
}

/// Compute the WGS84 bounding box of a `width` x `height` raster.
pub fn compute_bounds(ifd: &Ifd<'_>, width: usize, height: usize) -> DecodeResult<GeoBounds> {
    let keys = GeoKeys::from_ifd(ifd)?;
    let mut transform = GeoTransform::from_ifd(ifd)?;
    if keys.raster_type == Some(tags::RASTER_PIXEL_IS_POINT) {
        transform = transform.shifted_to_corner();
    }

    let (w, h) = (width as f64, height as f64);
    let corners = [(0.0, 0.0), (w, 0.0), (0.0, h), (w, h)].map(|(c, r)| transform.apply(c, r));

    let enclosing = if keys.is_projected() {
        let code = keys.projected_type.ok_or_else(|| {
            DecodeError::UnsupportedCrs("projected model without ProjectedCSTypeGeoKey".to_string())
        })?;
        let crs = ProjectedCrs::from_epsg(code as u32)
            .map_err(|e| DecodeError::UnsupportedCrs(e.to_string()))?;
        debug!(epsg = code, "Inverse projecting raster corners");
        GeoBounds::enclosing(corners.iter().map(|&(x, y)| crs.to_geographic(x, y)))
    } else {
        GeoBounds::enclosing(corners)
    };
    let bounds = enclosing.ok_or_else(|| {
        DecodeError::InvalidGeoreference("non-finite corner coordinate".to_string())
    })?;

    if bounds.north > 90.0 || bounds.south < -90.0 {
        return Err(DecodeError::InvalidGeoreference(format!(
            "latitude range {}..{} is not geographic",
            bounds.south, bounds.north
        )));
    }
    if !bounds.is_valid() {
        return Err(DecodeError::InvalidGeoreference(format!(
            "empty extent: north={} south={} east={} west={}",
            bounds.north, bounds.south, bounds.east, bounds.west
        )));
    }
    Ok(bounds)
}
