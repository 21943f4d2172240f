//! Collision predicates, shield tests, and knockback.
//!
//! ## Result cache
//!
//! [`CollisionSystem::circle_collision`] memoizes likely hits under a key built
//! from *floored* centres and exact radii.  Two queries whose centres floor to
//! the same pixels share one answer until the next wholesale clear, which
//! [`CollisionSystem::update`] performs every `cache_timeout` seconds.  That
//! staleness is an accepted imprecision of the cache, not a bug: it can only
//! affect pairs that are already within one pixel of the contact threshold.
//!
//! Pairs farther apart than the sum of their radii never reach the cache.
//!
//! ## Shield band
//!
//! The shield is a pulsing annulus around the player.  A projectile is blocked
//! when it lies inside the band *and* inside the shield arc widened by 10%.

use std::collections::HashMap;

use bevy::math::Vec2;
use rand::Rng;

use crate::canvas::palette;
use crate::constants::*;
use crate::effects::{EffectRequest, EffectSink};
use crate::enemy::Enemy;
use crate::math::{angle_between, distance, from_angle, random_range, wrap_angle_diff};
use crate::player::Player;
use crate::projectile::Projectile;

/// `(floor x1, floor y1, r1 bits, floor x2, floor y2, r2 bits)`.
type CacheKey = (i32, i32, u32, i32, i32, u32);

#[derive(Debug, Clone)]
pub struct CollisionSystem {
    cache: HashMap<CacheKey, bool>,
    cache_timeout: f64,
    last_clear: f64,
    /// Clock of the last `update`, drives the shield pulse.
    now: f64,
}

impl Default for CollisionSystem {
    fn default() -> Self {
        Self::new(COLLISION_CACHE_TIMEOUT)
    }
}

impl CollisionSystem {
    pub fn new(cache_timeout: f64) -> Self {
        Self {
            cache: HashMap::new(),
            cache_timeout,
            last_clear: 0.0,
            now: 0.0,
        }
    }

    /// Advance the clock and clear the cache once it has gone stale.
    pub fn update(&mut self, now: f64) {
        self.now = now;
        if now - self.last_clear > self.cache_timeout {
            self.cache.clear();
            self.last_clear = now;
        }
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    pub fn now(&self) -> f64 {
        self.now
    }

    /// Strict overlap test (`distance < r1 + r2`) with a cached slow path.
    pub fn circle_collision(&mut self, c1: Vec2, r1: f32, c2: Vec2, r2: f32) -> bool {
        let d = c2 - c1;
        let min_dist = r1 + r2;
        let dist_sq = d.length_squared();
        if dist_sq > min_dist * min_dist {
            return false;
        }
        let key = (
            c1.x.floor() as i32,
            c1.y.floor() as i32,
            r1.to_bits(),
            c2.x.floor() as i32,
            c2.y.floor() as i32,
            r2.to_bits(),
        );
        *self
            .cache
            .entry(key)
            .or_insert_with(|| dist_sq.sqrt() < min_dist)
    }

    pub fn hook_hits_enemy(&mut self, hook_pos: Vec2, hitbox: f32, enemy: &Enemy) -> bool {
        self.circle_collision(hook_pos, hitbox, enemy.position, enemy.radius)
    }

    /// True when the shot is inside the shield band and the widened arc.
    pub fn projectile_hits_shield(&self, projectile: &Projectile, player: &Player) -> bool {
        if player.invulnerable {
            return false;
        }
        let (inner, outer) = shield_band(player.radius, self.now);
        let d = distance(projectile.position, player.position);
        if d < inner || d > outer {
            return false;
        }
        let angle = angle_between(player.position, projectile.position);
        wrap_angle_diff(angle, player.shield_angle) <= SHIELD_ARC * SHIELD_ARC_FORGIVENESS / 2.0
    }

    pub fn projectile_hits_player(&mut self, projectile: &Projectile, player: &Player) -> bool {
        if player.invulnerable {
            return false;
        }
        if !self.circle_collision(
            projectile.position,
            projectile.radius,
            player.position,
            player.radius,
        ) {
            return false;
        }
        !self.projectile_hits_shield(projectile, player)
    }

    /// Push every active enemy within `radius` of `center` outward.
    ///
    /// Returns whether any enemy was affected.  Cosmetic feedback is limited
    /// to the nearest few enemies.
    pub fn apply_knockback(
        &self,
        center: Vec2,
        enemies: &mut [Enemy],
        radius: f32,
        force: f32,
        rng: &mut impl Rng,
        effects: &mut dyn EffectSink,
    ) -> bool {
        let radius_sq = radius * radius;
        let mut in_range: Vec<(usize, f32)> = enemies
            .iter()
            .enumerate()
            .filter(|(_, e)| e.active)
            .filter_map(|(i, e)| {
                let dist_sq = (e.position - center).length_squared();
                if dist_sq >= radius_sq {
                    return None;
                }
                let dist = dist_sq.sqrt();
                (dist < radius).then_some((i, dist))
            })
            .collect();
        if in_range.is_empty() {
            return false;
        }
        in_range.sort_by(|a, b| a.1.total_cmp(&b.1));

        let detailed = KNOCKBACK_DETAILED_COUNT.min(in_range.len());
        let nearest: Vec<Vec2> = in_range[..detailed]
            .iter()
            .map(|&(i, _)| enemies[i].position)
            .collect();

        for (rank, &(idx, dist)) in in_range.iter().enumerate() {
            let enemy = &mut enemies[idx];
            let base = angle_between(center, enemy.position);
            let jitter = random_range(rng, -0.5, 0.5);

            let mut crowding = 0.0;
            if rank < detailed {
                let close = enemy.radius * 3.0;
                for (j, other) in nearest.iter().enumerate() {
                    if j == rank {
                        continue;
                    }
                    let proximity = distance(enemy.position, *other);
                    if proximity < close {
                        crowding += 0.3 * (1.0 - proximity / close);
                    }
                }
            }
            let angle = base + jitter + random_range(rng, -crowding, crowding);

            let strength = force * (1.0 - dist / radius) * random_range(rng, 0.8, 1.2);
            let dir = from_angle(angle);
            enemy.knock_back(dir * strength * 1.5, KNOCKBACK_FRAMES);

            if rank == 0 {
                effects.explosion(center, palette::WHITE, radius * 0.5);
            }
            if rank < detailed {
                effects.explosion(enemy.position, palette::ORANGE, enemy.radius * 0.8);
                let sparks = ((5.0 * (1.0 - rank as f32 / detailed as f32)).ceil() as usize).min(3);
                for j in 0..sparks {
                    effects.emit(EffectRequest::Burst {
                        at: enemy.position + dir * enemy.radius * 0.5 * j as f32,
                        color: palette::ORANGE,
                        count: 1,
                        speed: 2.0,
                    });
                }
                effects.emit(EffectRequest::Beam {
                    from: center,
                    to: enemy.position,
                    color: palette::WHITE,
                    width: 2.0,
                    frames: 15.0,
                });
            }
        }
        true
    }
}

/// Inner and outer radius of the shield annulus at time `now` (seconds).
pub fn shield_band(player_radius: f32, now: f64) -> (f32, f32) {
    let pulse = SHIELD_PULSE_AMPLITUDE * (now * SHIELD_PULSE_RATE).sin() as f32 + 1.0;
    let thickness = player_radius * SHIELD_THICKNESS_FACTOR * pulse;
    let inner = player_radius + player_radius * SHIELD_DISTANCE_FACTOR - thickness / 2.0;
    (inner, inner + thickness)
}

#[inline]
pub fn point_in_circle(point: Vec2, center: Vec2, radius: f32) -> bool {
    (point - center).length_squared() <= radius * radius
}

/// Hexagon containment using axial hex distance in the hexagon's own frame.
pub fn point_in_hexagon(point: Vec2, center: Vec2, radius: f32, rotation: f32) -> bool {
    let d = point - center;
    let (s, c) = (-rotation).sin_cos();
    let x = d.x * c - d.y * s;
    let y = d.x * s + d.y * c;
    let sqrt3 = 3.0_f32.sqrt();
    let q = sqrt3 * x / 3.0;
    let r = -x / 3.0 + sqrt3 * y / 3.0;
    let hex_dist = q.abs().max(r.abs()).max((-q - r).abs());
    hex_dist <= radius / 2.0
}

/// True when the direction to `point` lies within half of `arc` of `shield_angle`.
pub fn is_point_behind_shield(point: Vec2, player_pos: Vec2, shield_angle: f32, arc: f32) -> bool {
    wrap_angle_diff(angle_between(player_pos, point), shield_angle) <= arc / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::{NullEffects, RecordingEffects};
    use crate::enemy::EnemyParams;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::f32::consts::PI;

    fn enemy_at(id: u64, x: f32, y: f32) -> Enemy {
        Enemy::new(id, Vec2::new(x, y), 0.0, 1.0, &EnemyParams::default(), &mut StdRng::seed_from_u64(id))
    }

    #[test]
    fn circle_collision_is_strict() {
        let mut cs = CollisionSystem::default();
        assert!(cs.circle_collision(Vec2::ZERO, 5.0, Vec2::new(9.0, 0.0), 5.0));
        assert!(!cs.circle_collision(Vec2::ZERO, 5.0, Vec2::new(10.0, 0.0), 5.0));
        assert!(!cs.circle_collision(Vec2::ZERO, 5.0, Vec2::new(30.0, 0.0), 5.0));
    }

    #[test]
    fn far_pairs_skip_the_cache() {
        let mut cs = CollisionSystem::default();
        cs.circle_collision(Vec2::ZERO, 5.0, Vec2::new(100.0, 0.0), 5.0);
        assert_eq!(cs.cache_len(), 0);
        cs.circle_collision(Vec2::ZERO, 5.0, Vec2::new(3.0, 0.0), 5.0);
        assert_eq!(cs.cache_len(), 1);
    }

    #[test]
    fn cache_clears_after_timeout() {
        let mut cs = CollisionSystem::new(0.1);
        cs.update(0.0);
        cs.circle_collision(Vec2::ZERO, 5.0, Vec2::new(3.0, 0.0), 5.0);
        cs.update(0.05);
        assert_eq!(cs.cache_len(), 1);
        cs.update(0.2);
        assert_eq!(cs.cache_len(), 0);
    }

    #[test]
    fn point_in_hexagon_center_and_far() {
        assert!(point_in_hexagon(Vec2::new(10.0, 10.0), Vec2::new(10.0, 10.0), 30.0, 0.4));
        assert!(!point_in_hexagon(Vec2::new(100.0, 10.0), Vec2::new(10.0, 10.0), 30.0, 0.4));
    }

    #[test]
    fn shield_arc_boundary() {
        let player = Vec2::ZERO;
        assert!(is_point_behind_shield(Vec2::new(10.0, 0.0), player, 0.0, PI / 2.0));
        assert!(is_point_behind_shield(Vec2::new(10.0, 9.0), player, 0.0, PI / 2.0));
        assert!(!is_point_behind_shield(Vec2::new(-10.0, 0.0), player, 0.0, PI / 2.0));
        // Wrap-around across ±π.
        assert!(is_point_behind_shield(Vec2::new(-10.0, 0.1), player, -PI + 0.05, PI / 2.0));
    }

    #[test]
    fn shield_band_pulses_around_fixed_centre() {
        for now in [0.0, 0.3, 0.77, 5.1] {
            let (inner, outer) = shield_band(30.0, now);
            let mid = (inner + outer) / 2.0;
            assert!((mid - 66.0).abs() < 1e-3);
            let t = outer - inner;
            assert!((9.6 - 1e-3..=14.4 + 1e-3).contains(&t), "thickness {t}");
        }
    }

    #[test]
    fn knockback_skips_inactive_enemies() {
        let cs = CollisionSystem::default();
        let mut enemies = vec![enemy_at(1, 10.0, 0.0)];
        enemies[0].active = false;
        let mut rng = StdRng::seed_from_u64(2);
        let applied =
            cs.apply_knockback(Vec2::ZERO, &mut enemies, 250.0, 30.0, &mut rng, &mut NullEffects);
        assert!(!applied);
        assert!(!enemies[0].knocked_back);
    }

    #[test]
    fn knockback_pushes_outward_and_limits_detail() {
        let cs = CollisionSystem::default();
        let mut enemies: Vec<Enemy> = (0..5).map(|i| enemy_at(i, 40.0 + i as f32 * 30.0, 0.0)).collect();
        let mut rng = StdRng::seed_from_u64(5);
        let mut fx = RecordingEffects::default();
        assert!(cs.apply_knockback(Vec2::ZERO, &mut enemies, 250.0, 30.0, &mut rng, &mut fx));
        for e in &enemies {
            assert!(e.knocked_back);
            assert!(e.velocity.x > 0.0, "pushed away from the centre");
        }
        let beams = fx
            .requests
            .iter()
            .filter(|r| matches!(r, EffectRequest::Beam { .. }))
            .count();
        assert_eq!(beams, 3);
    }
}
