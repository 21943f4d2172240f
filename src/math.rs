//! Scalar and geometry helpers shared by every simulation module.
//!
//! All functions work in map space (origin top-left, +y down).  Angles come
//! from `atan2(dy, dx)` so they match what the renderer expects.
//!
//! [`GeometryCache`] memoizes distance, angle, sine and cosine lookups keyed by
//! *rounded* inputs.  Two queries that round to the same key share one answer;
//! this is an accepted approximation, not a bug.  The whole cache is dropped
//! on a fixed period by [`GeometryCache::maintain`].

use std::collections::HashMap;
use std::f32::consts::{PI, TAU};

use bevy::math::Vec2;
use rand::Rng;

use crate::constants::GEOMETRY_CACHE_TIMEOUT;

/// Euclidean distance between two points.
#[inline]
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    (b - a).length()
}

/// Angle of the vector from `from` to `to`, in radians.
#[inline]
pub fn angle_between(from: Vec2, to: Vec2) -> f32 {
    (to.y - from.y).atan2(to.x - from.x)
}

/// Unit vector for `angle`.
#[inline]
pub fn from_angle(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

/// Linear interpolation with the amount clamped to at most 1.
#[inline]
pub fn lerp(start: f32, end: f32, amount: f32) -> f32 {
    let t = amount.min(1.0);
    (1.0 - t) * start + t * end
}

/// Interpolate between two angles along the shorter arc.
pub fn lerp_angle(start: f32, end: f32, amount: f32) -> f32 {
    let mut delta = (end - start).rem_euclid(TAU);
    if delta > PI {
        delta -= TAU;
    }
    start + delta * amount.min(1.0)
}

/// Clamp `value` into `[min, max]`.
#[inline]
pub fn clamp(value: f32, min: f32, max: f32) -> f32 {
    value.max(min).min(max)
}

/// Absolute angular difference folded into `[0, π]`.
pub fn wrap_angle_diff(a: f32, b: f32) -> f32 {
    let diff = (a - b).rem_euclid(TAU);
    if diff > PI {
        TAU - diff
    } else {
        diff
    }
}

/// Uniform float in `[min, max)`.  Returns `min` when the range is empty.
pub fn random_range(rng: &mut impl Rng, min: f32, max: f32) -> f32 {
    if max > min {
        rng.gen_range(min..max)
    } else {
        min
    }
}

/// Uniform `f64` in `[min, max)`.  Returns `min` when the range is empty.
pub fn random_range_f64(rng: &mut impl Rng, min: f64, max: f64) -> f64 {
    if max > min {
        rng.gen_range(min..max)
    } else {
        min
    }
}

/// Uniform integer in `[min, max]` (inclusive on both ends).
pub fn random_int(rng: &mut impl Rng, min: i32, max: i32) -> i32 {
    if max > min {
        rng.gen_range(min..=max)
    } else {
        min
    }
}

/// Corner vertices of a regular hexagon (flat rotation 0 puts vertex 0 on +x).
pub fn hexagon_vertices(center: Vec2, radius: f32, rotation: f32) -> [Vec2; 6] {
    let mut out = [Vec2::ZERO; 6];
    for (i, v) in out.iter_mut().enumerate() {
        let a = i as f32 / 6.0 * TAU + rotation;
        *v = center + from_angle(a) * radius;
    }
    out
}

// ── Geometry memo ─────────────────────────────────────────────────────────────

/// Key of a point pair: both endpoints rounded to whole pixels.
type PairKey = (i32, i32, i32, i32);

fn pair_key(a: Vec2, b: Vec2) -> PairKey {
    (
        a.x.round() as i32,
        a.y.round() as i32,
        b.x.round() as i32,
        b.y.round() as i32,
    )
}

/// Angles are keyed to the nearest hundredth of a radian.
fn angle_key(angle: f32) -> i32 {
    (angle * 100.0).round() as i32
}

/// Memoized distance/angle/sin/cos lookups with a time-boxed full flush.
#[derive(Debug, Clone)]
pub struct GeometryCache {
    distances: HashMap<PairKey, f32>,
    angles: HashMap<PairKey, f32>,
    sines: HashMap<i32, f32>,
    cosines: HashMap<i32, f32>,
    timeout: f64,
    last_flush: f64,
}

impl Default for GeometryCache {
    fn default() -> Self {
        Self::new(GEOMETRY_CACHE_TIMEOUT)
    }
}

impl GeometryCache {
    pub fn new(timeout: f64) -> Self {
        Self {
            distances: HashMap::new(),
            angles: HashMap::new(),
            sines: HashMap::new(),
            cosines: HashMap::new(),
            timeout,
            last_flush: 0.0,
        }
    }

    /// Distance between `a` and `b`; the first query for a rounded pair wins.
    pub fn distance(&mut self, a: Vec2, b: Vec2) -> f32 {
        *self
            .distances
            .entry(pair_key(a, b))
            .or_insert_with(|| distance(a, b))
    }

    /// Angle from `a` to `b`; the first query for a rounded pair wins.
    pub fn angle(&mut self, a: Vec2, b: Vec2) -> f32 {
        *self
            .angles
            .entry(pair_key(a, b))
            .or_insert_with(|| angle_between(a, b))
    }

    pub fn sin(&mut self, angle: f32) -> f32 {
        *self
            .sines
            .entry(angle_key(angle))
            .or_insert_with(|| angle.sin())
    }

    pub fn cos(&mut self, angle: f32) -> f32 {
        *self
            .cosines
            .entry(angle_key(angle))
            .or_insert_with(|| angle.cos())
    }

    /// Drop every entry once `timeout` seconds have passed since the last flush.
    ///
    /// Returns `true` when a flush happened.
    pub fn maintain(&mut self, now: f64) -> bool {
        if now - self.last_flush >= self.timeout {
            self.clear();
            self.last_flush = now;
            true
        } else {
            false
        }
    }

    pub fn clear(&mut self) {
        self.distances.clear();
        self.angles.clear();
        self.sines.clear();
        self.cosines.clear();
    }

    /// Total number of memoized values across all tables.
    pub fn entry_count(&self) -> usize {
        self.distances.len() + self.angles.len() + self.sines.len() + self.cosines.len()
    }

    pub fn last_flush(&self) -> f64 {
        self.last_flush
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn lerp_clamps_amount() {
        assert_eq!(lerp(0.0, 10.0, 0.5), 5.0);
        assert_eq!(lerp(0.0, 10.0, 3.0), 10.0);
    }

    #[test]
    fn lerp_angle_takes_short_way_round() {
        let a = 3.0;
        let b = -3.0;
        let mid = lerp_angle(a, b, 0.5);
        // The short arc crosses π, so the midpoint sits beyond 3.0 rather than at 0.
        assert!(mid > 3.0, "mid = {mid}");
    }

    #[test]
    fn wrap_angle_diff_folds_into_half_turn() {
        assert!((wrap_angle_diff(0.1, -0.1) - 0.2).abs() < 1e-5);
        assert!((wrap_angle_diff(PI - 0.1, -PI + 0.1) - 0.2).abs() < 1e-5);
        assert!(wrap_angle_diff(0.0, PI) <= PI + 1e-6);
    }

    #[test]
    fn random_helpers_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let v = random_range(&mut rng, -0.5, 0.5);
            assert!((-0.5..0.5).contains(&v));
            let i = random_int(&mut rng, 0, 3);
            assert!((0..=3).contains(&i));
        }
        assert_eq!(random_range(&mut rng, 2.0, 2.0), 2.0);
    }

    #[test]
    fn hexagon_vertices_lie_on_circumcircle() {
        let c = Vec2::new(10.0, 20.0);
        for v in hexagon_vertices(c, 30.0, 0.3) {
            assert!((distance(c, v) - 30.0).abs() < 1e-3);
        }
    }

    #[test]
    fn cache_shares_answers_for_rounded_keys() {
        let mut cache = GeometryCache::new(30.0);
        let first = cache.distance(Vec2::ZERO, Vec2::new(10.2, 0.0));
        let second = cache.distance(Vec2::ZERO, Vec2::new(9.8, 0.0));
        assert_eq!(first, second, "pairs rounding to the same pixels share one entry");
        assert_eq!(cache.entry_count(), 1);
    }

    #[test]
    fn cache_flushes_on_period_only() {
        let mut cache = GeometryCache::new(30.0);
        cache.sin(0.5);
        cache.angle(Vec2::ZERO, Vec2::X);
        assert!(!cache.maintain(10.0));
        assert_eq!(cache.entry_count(), 2);
        assert!(cache.maintain(30.0));
        assert_eq!(cache.entry_count(), 0);
        assert_eq!(cache.last_flush(), 30.0);
        assert!(!cache.maintain(45.0));
    }
}
