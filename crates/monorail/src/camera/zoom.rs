use std::fmt;

use serde::{Deserialize, Serialize};

use crate::math::map_range;

pub const DEFAULT_MIN_ZOOM: f32 = 0.1;
pub const DEFAULT_MAX_ZOOM: f32 = 10.0;

/// Maps a UI-friendly normalized zoom in `[-1, 1]` onto a raw multiplier of
/// the visible area in `[min, max]`.
///
/// ```text
/// normalized  -1 ─────────── 0 ─────────── 1
/// raw        max ─────────── 1 ─────────── min
///            (zoomed out)  (none)     (zoomed in)
/// ```
///
/// Each half is linear, so the mapping is a bijection and
/// [`normalized`](Self::normalized) exactly undoes [`raw`](Self::raw).
///
/// Deserialization goes through [`try_new`](Self::try_new), so a config
/// file can't produce a range that collapses the view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawZoomRange")]
pub struct ZoomRange {
    min: f32,
    max: f32,
}

#[derive(Deserialize)]
struct RawZoomRange {
    min: f32,
    max: f32,
}

impl TryFrom<RawZoomRange> for ZoomRange {
    type Error = ZoomRangeError;

    fn try_from(raw: RawZoomRange) -> Result<Self, Self::Error> {
        Self::try_new(raw.min, raw.max)
    }
}

/// A zoom range with `min` outside `(0, 1]` or `max` below 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomRangeError {
    pub min: f32,
    pub max: f32,
}

impl fmt::Display for ZoomRangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid zoom range [{}, {}]: min zoom must be in (0, 1] and max at least 1",
            self.min, self.max
        )
    }
}

impl std::error::Error for ZoomRangeError {}

impl ZoomRange {
    /// # Panics
    ///
    /// If `min` is not in `(0, 1]` or `max` is below 1.
    pub fn new(min: f32, max: f32) -> Self {
        Self::try_new(min, max).unwrap_or_else(|err| panic!("{err}"))
    }

    pub fn try_new(min: f32, max: f32) -> Result<Self, ZoomRangeError> {
        // Written so NaN fails both checks.
        if min > 0.0 && min <= 1.0 && max >= 1.0 {
            Ok(Self { min, max })
        } else {
            Err(ZoomRangeError { min, max })
        }
    }

    /// Most zoomed-in raw multiplier.
    pub fn min(&self) -> f32 {
        self.min
    }

    /// Most zoomed-out raw multiplier.
    pub fn max(&self) -> f32 {
        self.max
    }

    /// Raw multiplier for a normalized zoom. Input is clamped to `[-1, 1]`.
    pub fn raw(&self, normalized: f32) -> f32 {
        let zoom = normalized.clamp(-1.0, 1.0);
        let raw = if zoom < 0.0 {
            map_range(zoom, -1.0, 0.0, self.max, 1.0)
        } else {
            map_range(zoom, 0.0, 1.0, 1.0, self.min)
        };
        self.clamp_raw(raw)
    }

    /// Normalized zoom for a raw multiplier. Input is clamped to
    /// `[min, max]`.
    pub fn normalized(&self, raw: f32) -> f32 {
        let raw = self.clamp_raw(raw);
        if raw > 1.0 {
            map_range(raw, self.max, 1.0, -1.0, 0.0)
        } else if raw < 1.0 {
            map_range(raw, 1.0, self.min, 0.0, 1.0)
        } else {
            0.0
        }
    }

    pub fn clamp_raw(&self, raw: f32) -> f32 {
        raw.clamp(self.min, self.max)
    }
}

impl Default for ZoomRange {
    fn default() -> Self {
        Self {
            min: DEFAULT_MIN_ZOOM,
            max: DEFAULT_MAX_ZOOM,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchors() {
        let z = ZoomRange::default();
        assert_eq!(z.raw(0.0), 1.0);
        assert_eq!(z.raw(-1.0), DEFAULT_MAX_ZOOM);
        assert_eq!(z.raw(-7.0), DEFAULT_MAX_ZOOM);
        assert!((z.raw(1.0) - DEFAULT_MIN_ZOOM).abs() < 1e-6);
        assert!((z.raw(3.0) - DEFAULT_MIN_ZOOM).abs() < 1e-6);
    }

    #[test]
    fn normalized_inverts_raw() {
        for range in [ZoomRange::default(), ZoomRange::new(0.5, 2.0), ZoomRange::new(1.0, 1.0)] {
            for step in 0..=40 {
                let x = -1.0 + step as f32 * 0.05;
                let raw = range.raw(x);
                assert!(raw >= range.min() && raw <= range.max());
                let back = range.normalized(raw);
                // A degenerate half collapses onto 0.
                let expected = if (x < 0.0 && range.max() == 1.0) || (x > 0.0 && range.min() == 1.0) {
                    0.0
                } else {
                    x
                };
                assert!((back - expected).abs() < 1e-5, "{x} -> {raw} -> {back}");
            }
        }
    }

    #[test]
    #[should_panic(expected = "min zoom")]
    fn rejects_zero_min() {
        ZoomRange::new(0.0, 2.0);
    }

    #[test]
    fn try_new_rejects_degenerate_ranges() {
        assert!(ZoomRange::try_new(0.5, 4.0).is_ok());
        assert!(ZoomRange::try_new(0.0, 10.0).is_err());
        assert!(ZoomRange::try_new(1.5, 10.0).is_err());
        assert!(ZoomRange::try_new(0.1, 0.5).is_err());
        assert!(ZoomRange::try_new(f32::NAN, 10.0).is_err());
    }

    #[test]
    fn deserialize_validates() {
        let range: ZoomRange = serde_json::from_str(r#"{"min":0.25,"max":4.0}"#).unwrap();
        assert_eq!((range.min(), range.max()), (0.25, 4.0));

        let zero_min = serde_json::from_str::<ZoomRange>(r#"{"min":0.0,"max":10.0}"#);
        let err = zero_min.unwrap_err().to_string();
        assert!(err.contains("invalid zoom range"), "{err}");
        assert!(serde_json::from_str::<ZoomRange>(r#"{"min":0.1,"max":0.5}"#).is_err());
    }
}
