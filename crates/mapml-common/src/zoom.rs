//! Zoom-range negotiation between style scale ranges and a TCRS.

use serde::{Deserialize, Serialize};

use crate::layer::ScaleRange;
use crate::tcrs::TiledCrs;

/// Inclusive zoom range advertised on a `zoom` input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoomRange {
    pub min: u32,
    pub max: u32,
}

impl ZoomRange {
    /// The full native range of a TCRS.
    pub fn native(tcrs: &TiledCrs) -> Self {
        let (min, max) = tcrs.native_zoom_range();
        Self { min, max }
    }

    pub fn contains(&self, zoom: u32) -> bool {
        zoom >= self.min && zoom <= self.max
    }
}

/// Clamp explicit zoom levels into the TCRS native range.
///
/// A missing bound takes the native limit on that side. The result is always
/// ordered, `min <= max`.
pub fn clamp_zoom(tcrs: &TiledCrs, min: Option<i64>, max: Option<i64>) -> ZoomRange {
    let (native_min, native_max) = tcrs.native_zoom_range();
    let clamp = |z: i64| z.clamp(native_min as i64, native_max as i64) as u32;

    let lo = min.map(clamp).unwrap_or(native_min);
    let hi = max.map(clamp).unwrap_or(native_max);

    ZoomRange {
        min: lo.min(hi),
        max: lo.max(hi),
    }
}

/// Derive the zoom range of a layer from its style's scale denominators.
///
/// The maximum denominator (the coarsest scale the style draws at) bounds the
/// zoom minimum, the minimum denominator bounds the zoom maximum. Without a
/// scale range the native range is returned. Out-of-range denominators clamp.
pub fn resolve_zoom(tcrs: &TiledCrs, scale_range: Option<&ScaleRange>) -> ZoomRange {
    let Some(range) = scale_range else {
        return ZoomRange::native(tcrs);
    };

    let zoom_min = range
        .max_denominator
        .map(|d| i64::from(tcrs.zoom_for_scale_denominator(d)));
    let zoom_max = range
        .min_denominator
        .map(|d| i64::from(tcrs.zoom_for_scale_denominator(d)));

    clamp_zoom(tcrs, zoom_min, zoom_max)
}
