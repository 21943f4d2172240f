//! Straight-line projectiles fired by enemies.

use std::f32::consts::TAU;

use bevy::color::Color;
use bevy::math::Vec2;
use rand::Rng;

use crate::canvas::{palette, Canvas};
use crate::constants::*;
use crate::effects::{EffectRequest, EffectSink};
use crate::math::{from_angle, random_range};

#[derive(Debug, Clone)]
pub struct Projectile {
    pub position: Vec2,
    pub velocity: Vec2,
    pub angle: f32,
    pub speed: f32,
    /// Current (pulsing) radius.
    pub radius: f32,
    pub base_radius: f32,
    pub is_enemy_projectile: bool,
    /// Remaining lifetime in seconds.
    pub lifetime: f32,
    pub active: bool,
    pulse_phase: f32,
    pulse_speed: f32,
    trail_counter: f32,
}

impl Projectile {
    pub fn new(position: Vec2, angle: f32, speed: f32, is_enemy_projectile: bool, rng: &mut impl Rng) -> Self {
        Self {
            position,
            velocity: from_angle(angle) * speed,
            angle,
            speed,
            radius: PROJECTILE_RADIUS,
            base_radius: PROJECTILE_RADIUS,
            is_enemy_projectile,
            lifetime: PROJECTILE_LIFETIME,
            active: true,
            pulse_phase: random_range(rng, 0.0, TAU),
            pulse_speed: random_range(rng, 5.0, 7.0),
            trail_counter: 0.0,
        }
    }

    /// Same shot with a custom lifetime (seconds).
    pub fn with_lifetime(mut self, lifetime: f32) -> Self {
        self.lifetime = lifetime;
        self
    }

    pub fn color(&self) -> Color {
        if self.is_enemy_projectile {
            palette::ENEMY
        } else {
            palette::PLAYER
        }
    }

    /// Move, pulse, age, and cull against the map bounds.
    pub fn update(&mut self, map_size: Vec2, dt: f32, effects: &mut dyn EffectSink) {
        let ts = dt * BASELINE_FPS;
        self.position += self.velocity * ts;

        self.pulse_phase += self.pulse_speed * dt;
        self.radius = self.base_radius * (0.2 * self.pulse_phase.sin() + 1.0);

        self.lifetime -= dt;
        if self.lifetime <= 0.0 {
            self.active = false;
        }

        self.trail_counter += ts;
        if self.trail_counter >= PROJECTILE_TRAIL_INTERVAL {
            effects.emit(EffectRequest::Trail {
                at: self.position,
                color: self.color(),
            });
            self.trail_counter = 0.0;
        }

        let p = self.position;
        if p.x < 0.0 || p.x > map_size.x || p.y < 0.0 || p.y > map_size.y {
            self.active = false;
        }
    }

    pub fn draw(&self, canvas: &mut dyn Canvas) {
        let (core, tail) = if self.is_enemy_projectile {
            (palette::ENEMY_LIGHT, palette::ENEMY)
        } else {
            (palette::PLAYER_LIGHT, palette::PLAYER)
        };
        canvas.disc(self.position, self.radius, self.color());
        canvas.disc(self.position, self.radius * 0.6, core);
        if self.speed > 0.0 {
            let back = from_angle(self.angle) * self.radius * 1.5;
            canvas.line(self.position - back, self.position - back / 2.0, tail);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::{NullEffects, RecordingEffects};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn shot(pos: Vec2, angle: f32) -> Projectile {
        Projectile::new(pos, angle, PROJECTILE_SPEED, true, &mut StdRng::seed_from_u64(9))
    }

    #[test]
    fn moves_along_its_angle() {
        let mut p = shot(Vec2::new(100.0, 100.0), 0.0);
        p.update(Vec2::splat(900.0), 1.0 / 60.0, &mut NullEffects);
        assert!((p.position.x - 107.0).abs() < 1e-3);
        assert!((p.position.y - 100.0).abs() < 1e-3);
    }

    #[test]
    fn radius_pulses_within_twenty_percent() {
        let mut p = shot(Vec2::new(100.0, 100.0), 0.0);
        for _ in 0..30 {
            p.update(Vec2::splat(900.0), 1.0 / 60.0, &mut NullEffects);
            assert!(p.radius >= 8.0 * 0.8 - 1e-3 && p.radius <= 8.0 * 1.2 + 1e-3);
        }
    }

    #[test]
    fn expires_after_lifetime() {
        let mut p = shot(Vec2::new(450.0, 450.0), 0.0).with_lifetime(0.05);
        p.velocity = Vec2::ZERO;
        for _ in 0..4 {
            p.update(Vec2::splat(900.0), 0.016, &mut NullEffects);
        }
        assert!(!p.active);
    }

    #[test]
    fn leaving_the_map_deactivates() {
        let mut p = shot(Vec2::new(895.0, 100.0), 0.0);
        p.update(Vec2::splat(900.0), 1.0 / 60.0, &mut NullEffects);
        assert!(!p.active);
    }

    #[test]
    fn leaves_a_trail_every_two_frame_units() {
        let mut p = shot(Vec2::new(100.0, 100.0), 0.0);
        let mut fx = RecordingEffects::default();
        // 1.2 frame units per step: emits on the 2nd and 4th step.
        for _ in 0..4 {
            p.update(Vec2::splat(900.0), 0.02, &mut fx);
        }
        assert_eq!(fx.requests.len(), 2);
    }
}
