//! Turret enemies: chase the player, aim with smoothing, and fire on a cooldown.
//!
//! Each enemy is either seeking (default AI) or knocked back.  While knocked
//! back its AI and its gun are disabled and it coasts on an externally imposed
//! velocity that decays every frame unit until the knockback timer runs out.
//!
//! Enemies are owned by [`crate::waves::EnemyManager`].  Everything else refers
//! to them through an [`EnemyId`] and must resolve it with [`find_active`]
//! before use.

use std::f32::consts::{PI, TAU};

use bevy::color::Alpha;
use bevy::math::Vec2;
use rand::Rng;

use crate::canvas::{palette, Canvas};
use crate::config::GameConfig;
use crate::constants::*;
use crate::effects::{EffectRequest, EffectSink};
use crate::math::{clamp, from_angle, lerp_angle, random_int, random_range, random_range_f64, GeometryCache};
use crate::projectile::Projectile;

/// Non-owning handle to an enemy held by the manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnemyId(pub u64);

/// Spawn-time tunables shared by all enemies of a session.
#[derive(Debug, Clone, Copy)]
pub struct EnemyParams {
    pub radius: f32,
    pub initial_shot_delay: f64,
    pub cooldown_min: f64,
    pub cooldown_max: f64,
    pub projectile_speed: f32,
    pub projectile_lifetime: f32,
}

impl Default for EnemyParams {
    fn default() -> Self {
        Self {
            radius: ENEMY_RADIUS,
            initial_shot_delay: ENEMY_INITIAL_SHOT_DELAY,
            cooldown_min: ENEMY_SHOT_COOLDOWN_MIN,
            cooldown_max: ENEMY_SHOT_COOLDOWN_MAX,
            projectile_speed: PROJECTILE_SPEED,
            projectile_lifetime: PROJECTILE_LIFETIME,
        }
    }
}

impl From<&GameConfig> for EnemyParams {
    fn from(cfg: &GameConfig) -> Self {
        Self {
            radius: cfg.enemy_radius,
            initial_shot_delay: cfg.enemy_initial_shot_delay,
            cooldown_min: cfg.enemy_shot_cooldown_min,
            cooldown_max: cfg.enemy_shot_cooldown_max,
            projectile_speed: cfg.projectile_speed,
            projectile_lifetime: cfg.projectile_lifetime,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Enemy {
    pub id: EnemyId,
    pub position: Vec2,
    pub velocity: Vec2,
    pub radius: f32,
    pub aim_angle: f32,
    /// Chase speed (px per frame unit), reassigned by the manager each update.
    pub speed: f32,
    pub health: u32,
    pub active: bool,
    pub knocked_back: bool,
    /// Remaining knockback (frame units).
    pub knockback_remaining: f32,
    pub spawn_time: f64,
    pub last_shot: Option<f64>,
    /// Seconds until the next shot may fire, already scaled by difficulty.
    pub shot_cooldown: f64,
    /// Difficulty at spawn; every re-rolled cooldown is divided by it.
    pub cooldown_scale: f64,
    params: EnemyParams,
    barrel_oscillation: f32,
    barrel_oscillation_speed: f32,
    barrel_oscillation_amount: f32,
    /// Inner pattern selector (0, 1 or 2).
    pub variation: u8,
    pub phase: f32,
    pub inner_rotation: f32,
}

impl Enemy {
    pub fn new(
        id: u64,
        position: Vec2,
        now: f64,
        difficulty: f32,
        params: &EnemyParams,
        rng: &mut impl Rng,
    ) -> Self {
        let cooldown_scale = f64::from(difficulty.max(1.0));
        Self {
            id: EnemyId(id),
            position,
            velocity: Vec2::ZERO,
            radius: params.radius,
            aim_angle: 0.0,
            speed: PLAYER_SPEED / ENEMY_SPEED_DIVISOR * difficulty,
            health: 1,
            active: true,
            knocked_back: false,
            knockback_remaining: 0.0,
            spawn_time: now,
            last_shot: None,
            shot_cooldown: random_range_f64(rng, params.cooldown_min, params.cooldown_max) / cooldown_scale,
            cooldown_scale,
            params: *params,
            barrel_oscillation: 0.0,
            barrel_oscillation_speed: random_range(rng, 0.05, 0.1),
            barrel_oscillation_amount: random_range(rng, 0.15, 0.25),
            variation: random_int(rng, 0, 2) as u8,
            phase: random_range(rng, 0.0, TAU),
            inner_rotation: random_range(rng, 0.0, TAU),
        }
    }

    /// Aim plus the cosmetic barrel sway.
    pub fn barrel_angle(&self) -> f32 {
        self.aim_angle + self.barrel_oscillation.sin() * self.barrel_oscillation_amount
    }

    pub fn barrel_length(&self) -> f32 {
        self.radius * ENEMY_BARREL_FACTOR
    }

    pub fn barrel_tip(&self) -> Vec2 {
        self.position + from_angle(self.barrel_angle()) * (self.radius + self.barrel_length())
    }

    /// Override AI with `velocity` for `frames` frame units.
    pub fn knock_back(&mut self, velocity: Vec2, frames: f32) {
        self.velocity = velocity;
        self.knocked_back = true;
        self.knockback_remaining = frames;
    }

    /// Apply one point of damage.  Returns `true` when the enemy died.
    pub fn take_damage(&mut self) -> bool {
        self.health = self.health.saturating_sub(1);
        if self.health == 0 {
            self.active = false;
        }
        !self.active
    }

    /// How far along the current cooldown the gun is, in `0..=1`.
    pub fn charge_ratio(&self, now: f64) -> f32 {
        let since = match self.last_shot {
            Some(t) => now - t,
            None => now - self.spawn_time - self.params.initial_shot_delay + self.shot_cooldown,
        };
        if self.shot_cooldown <= 0.0 {
            return 1.0;
        }
        (since / self.shot_cooldown).clamp(0.0, 1.0) as f32
    }

    #[allow(clippy::too_many_arguments)]
    pub fn update(
        &mut self,
        player_pos: Vec2,
        now: f64,
        dt: f32,
        map_size: Vec2,
        projectiles: &mut Vec<Projectile>,
        geometry: &mut GeometryCache,
        rng: &mut impl Rng,
        effects: &mut dyn EffectSink,
    ) {
        let ts = dt * BASELINE_FPS;

        if self.knocked_back {
            self.position += self.velocity * ts;
            self.knockback_remaining -= ts;
            if self.knockback_remaining <= 0.0 {
                self.knocked_back = false;
            }
            self.velocity *= ENEMY_KNOCKBACK_DECAY.powf(ts);
            if rng.gen::<f32>() < 0.2 * ts {
                effects.emit(EffectRequest::Trail {
                    at: self.position - self.velocity * 0.5,
                    color: palette::ORANGE,
                });
            }
        } else {
            let angle = geometry.angle(self.position, player_pos);
            self.aim_angle = lerp_angle(self.aim_angle, angle, ENEMY_AIM_SMOOTHING * ts);
            let dir = Vec2::new(geometry.cos(angle), geometry.sin(angle));
            self.velocity = dir * self.speed;
            self.position += self.velocity * ts;
        }

        self.position.x = clamp(self.position.x, self.radius, map_size.x - self.radius);
        self.position.y = clamp(self.position.y, self.radius, map_size.y - self.radius);

        let delay_passed = now - self.spawn_time > self.params.initial_shot_delay;
        let cooled = self.last_shot.map_or(true, |t| now - t > self.shot_cooldown);
        if !self.knocked_back && delay_passed && cooled {
            self.shoot(projectiles, rng, effects);
            self.last_shot = Some(now);
            self.shot_cooldown =
                random_range_f64(rng, self.params.cooldown_min, self.params.cooldown_max) / self.cooldown_scale;
        }

        self.phase = (self.phase + dt * 3.0) % TAU;
        self.barrel_oscillation += self.barrel_oscillation_speed * ts;
        let spin = if self.knocked_back { 3.0 } else { 1.0 };
        self.inner_rotation += 0.02 * ts * spin;
    }

    /// Fire one projectile from the barrel tip and recoil slightly.
    pub fn shoot(&mut self, projectiles: &mut Vec<Projectile>, rng: &mut impl Rng, effects: &mut dyn EffectSink) {
        let angle = self.barrel_angle();
        let tip = self.barrel_tip();
        projectiles.push(
            Projectile::new(tip, angle, self.params.projectile_speed, true, rng)
                .with_lifetime(self.params.projectile_lifetime),
        );
        effects.emit(EffectRequest::MuzzleFlash { at: tip, angle });
        self.velocity -= from_angle(angle);
    }

    pub fn draw(&self, canvas: &mut dyn Canvas, now: f64) {
        let pulse = 0.2 * self.phase.sin() + 1.0;
        let pos = self.position;
        let r = self.radius;

        canvas.circle(pos, r * 1.1 * pulse.min(1.1), palette::ENEMY.with_alpha(0.3));
        canvas.disc(pos, r, palette::ENEMY);
        canvas.disc(pos, r * 0.6, palette::ENEMY_LIGHT);
        canvas.circle(pos, r, palette::ENEMY_DARK);

        match self.variation {
            0 => {
                for i in 0..3 {
                    let color = if i % 2 == 0 { palette::ENEMY_LIGHT } else { palette::ENEMY_DARK };
                    canvas.circle(pos, r * (0.4 + i as f32 * 0.15), color);
                }
                for i in 0..6 {
                    let a = self.inner_rotation + i as f32 / 6.0 * TAU;
                    canvas.disc(pos + from_angle(a) * r * 0.55, r * 0.06, palette::WHITE);
                }
            }
            1 => {
                for i in 0..4 {
                    let a = self.inner_rotation + i as f32 / 4.0 * TAU;
                    canvas.line(pos + from_angle(a) * r * 0.2, pos + from_angle(a) * r * 0.75, palette::ENEMY_DARK);
                }
                canvas.circle(pos, r * 0.2, palette::WHITE);
            }
            _ => {
                canvas.hexagon(pos, r * 0.55, self.inner_rotation, palette::ENEMY_DARK);
                canvas.hexagon(pos, r * 0.3, -self.inner_rotation * 1.5, palette::WHITE);
            }
        }

        let dir = from_angle(self.barrel_angle());
        let base = pos + dir * r * 0.6;
        let tip = self.barrel_tip();
        canvas.line(base, tip, palette::ENEMY_LIGHT);
        let normal = Vec2::new(-dir.y, dir.x) * r * 0.15;
        canvas.line(base + normal, tip + normal * 0.6, palette::ENEMY_DARK);
        canvas.line(base - normal, tip - normal * 0.6, palette::ENEMY_DARK);
        canvas.disc(tip, r * 0.12, palette::ORANGE);

        if self.knocked_back {
            // Stun stars circling above the body.
            for i in 0..3 {
                let a = self.inner_rotation * 2.0 + i as f32 / 3.0 * TAU;
                let star = pos + Vec2::new(0.0, -r * 1.3) + from_angle(a) * Vec2::new(r * 0.6, r * 0.2);
                canvas.disc(star, 3.0, palette::YELLOW);
            }
        } else {
            let charge = self.charge_ratio(now);
            if charge > 0.7 {
                let arc = (charge - 0.7) / 0.3 * TAU;
                canvas.arc(pos, r * 1.25, -PI / 2.0 + arc / 2.0, arc, palette::YELLOW);
            }
        }
    }
}

/// Resolve `id` to an enemy that is still active.
pub fn find_active(enemies: &[Enemy], id: EnemyId) -> Option<&Enemy> {
    enemies.iter().find(|e| e.id == id && e.active)
}

pub fn find_active_mut(enemies: &mut [Enemy], id: EnemyId) -> Option<&mut Enemy> {
    enemies.iter_mut().find(|e| e.id == id && e.active)
}
