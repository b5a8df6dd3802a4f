//! Unit-circle point rings, cached per segment count.
//!
//! Ellipses are drawn as a fan around their center. The ring of unit-circle
//! points only depends on the segment count, so each distinct count is
//! computed once and reused for the life of the renderer.

use std::collections::HashMap;
use std::f32::consts::TAU;

use crate::math::Vec2;

/// Fewest segments that still close a fan.
pub const MIN_SEGMENTS: u32 = 2;

/// Upper bound on ring size. Keeps one ellipse's vertex and index counts
/// well inside a `u32` index buffer.
pub const MAX_SEGMENTS: u32 = 4096;

/// Segment count for an ellipse of `radius` drawn at `max_scale`:
/// `max(2, 6 * cbrt(radius * max_scale))`, capped at [`MAX_SEGMENTS`].
pub fn default_segments(radius: f32, max_scale: f32) -> u32 {
    let estimate = 6.0 * (radius * max_scale).abs().cbrt();
    if estimate.is_nan() {
        return MIN_SEGMENTS;
    }
    clamp_segments(estimate.min(MAX_SEGMENTS as f32) as u32)
}

/// Bring a requested segment count into `MIN_SEGMENTS..=MAX_SEGMENTS`.
pub fn clamp_segments(segments: u32) -> u32 {
    segments.clamp(MIN_SEGMENTS, MAX_SEGMENTS)
}

#[derive(Debug, Default)]
pub struct EllipseCache {
    rings: HashMap<u32, Vec<Vec2>>,
}

impl EllipseCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Points on the unit circle, counter-clockwise from +X.
    pub fn ring(&mut self, segments: u32) -> &[Vec2] {
        self.rings.entry(segments).or_insert_with(|| {
            (0..segments)
                .map(|i| Vec2::from_angle(TAU * i as f32 / segments as f32))
                .collect()
        })
    }

    /// Number of cached segment counts.
    pub fn len(&self) -> usize {
        self.rings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_estimate() {
        assert_eq!(default_segments(0.0, 1.0), 2);
        assert_eq!(default_segments(1.0, 1.0), 6);
        let big = default_segments(1.0, 1000.0);
        assert!((59..=60).contains(&big));
        assert!(default_segments(50.0, 2.0) > default_segments(50.0, 1.0));
    }

    #[test]
    fn segment_estimate_is_bounded() {
        assert_eq!(default_segments(f32::MAX, 1.0), MAX_SEGMENTS);
        assert_eq!(default_segments(f32::INFINITY, 2.0), MAX_SEGMENTS);
        assert_eq!(default_segments(f32::NAN, 1.0), MIN_SEGMENTS);
        assert_eq!(clamp_segments(0), MIN_SEGMENTS);
        assert_eq!(clamp_segments(u32::MAX), MAX_SEGMENTS);
        assert_eq!(clamp_segments(64), 64);
    }

    #[test]
    fn ring_is_cached() {
        let mut cache = EllipseCache::new();
        let first = cache.ring(16).to_vec();
        let first_ptr = cache.ring(16).as_ptr();
        let second = cache.ring(16);
        assert_eq!(second.as_ptr(), first_ptr);
        assert_eq!(second, first.as_slice());
        assert_eq!(cache.len(), 1);

        let ring = cache.ring(4);
        assert!((ring[1] - Vec2::Y).length() < 1e-6);
        assert_eq!(cache.len(), 2);
    }
}
