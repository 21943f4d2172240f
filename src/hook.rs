//! Grappling hook: a four-state machine owned by the player.
//!
//! | From         | To           | Trigger                                          |
//! |--------------|--------------|--------------------------------------------------|
//! | (created)    | `Extending`  | always, velocity toward the target               |
//! | `Extending`  | `Retracting` | travelled `max_distance` from start, or cancel   |
//! | `Extending`  | `Pulling`    | [`GrapplingHook::hit`] by the owner's sweep test |
//! | `Pulling`    | `Retracting` | tracked enemy no longer active                   |
//! | `Retracting` | `Idle`       | back within the owner's radius                   |
//!
//! The hook never holds an enemy.  It keeps an [`EnemyId`] and resolves it
//! against the manager's slice on every update.  Hit detection against enemies
//! is the owner's job; [`swept_hit`] provides the segment test it needs.

use std::f32::consts::{FRAC_PI_2, PI, TAU};

use bevy::math::Vec2;
use rand::Rng;

use crate::canvas::{palette, Canvas};
use crate::config::GameConfig;
use crate::constants::*;
use crate::effects::{EffectRequest, EffectSink};
use crate::enemy::{find_active, Enemy, EnemyId};
use crate::error::{ensure_finite, GameResult};
use crate::math::{angle_between, distance, from_angle, random_range};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookState {
    Extending,
    Retracting,
    Pulling,
    Idle,
}

/// What the owner should do after [`GrapplingHook::cancel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookCancel {
    /// Hook is flying back; keep updating it.
    Recalled,
    /// Drop the hook now.
    Discard,
}

#[derive(Debug, Clone, Copy)]
pub struct HookParams {
    pub speed: f32,
    pub max_distance: f32,
    pub hitbox_radius: f32,
}

impl Default for HookParams {
    fn default() -> Self {
        Self {
            speed: HOOK_SPEED,
            max_distance: HOOK_MAX_DISTANCE,
            hitbox_radius: HOOK_HITBOX_RADIUS,
        }
    }
}

impl From<&GameConfig> for HookParams {
    fn from(cfg: &GameConfig) -> Self {
        Self {
            speed: cfg.hook_speed,
            max_distance: cfg.hook_max_distance,
            hitbox_radius: cfg.hook_hitbox_radius,
        }
    }
}

const HOOK_SIZE: f32 = 12.0;

#[derive(Debug, Clone)]
pub struct GrapplingHook {
    pub position: Vec2,
    pub start: Vec2,
    pub target: Vec2,
    /// Firing angle, kept for the chain curve.
    pub angle: f32,
    pub velocity: Vec2,
    pub state: HookState,
    pub hit_enemy: Option<EnemyId>,
    pub params: HookParams,
    pulse_phase: f32,
}

impl GrapplingHook {
    pub fn new(from: Vec2, target: Vec2, params: HookParams, rng: &mut impl Rng, effects: &mut dyn EffectSink) -> Self {
        let angle = angle_between(from, target);
        for _ in 0..10 {
            let a = angle + random_range(rng, -0.5, 0.5);
            effects.emit(EffectRequest::Trail {
                at: from + from_angle(a) * 5.0,
                color: palette::PLAYER,
            });
        }
        Self {
            position: from,
            start: from,
            target,
            angle,
            velocity: from_angle(angle) * params.speed,
            state: HookState::Extending,
            hit_enemy: None,
            params,
            pulse_phase: 0.0,
        }
    }

    pub fn hitbox_radius(&self) -> f32 {
        self.params.hitbox_radius
    }

    pub fn is_idle(&self) -> bool {
        self.state == HookState::Idle
    }

    /// Advance one step.  Errors when the hook geometry went non-finite.
    #[allow(clippy::too_many_arguments)]
    pub fn update(
        &mut self,
        owner_pos: Vec2,
        owner_radius: f32,
        enemies: &[Enemy],
        dt: f32,
        rng: &mut impl Rng,
        effects: &mut dyn EffectSink,
    ) -> GameResult<()> {
        ensure_finite("hook owner position", owner_pos)?;
        let ts = dt * BASELINE_FPS;
        self.pulse_phase += 8.0 * dt;

        match self.state {
            HookState::Extending => {
                self.position += self.velocity * ts;
                if rng.gen::<f32>() < 0.3 * ts {
                    effects.emit(EffectRequest::Trail {
                        at: self.position,
                        color: palette::PLAYER,
                    });
                }
                if distance(self.start, self.position) >= self.params.max_distance {
                    self.state = HookState::Retracting;
                    effects.explosion(self.position, palette::PLAYER, 15.0);
                }
            }
            HookState::Retracting => {
                let dir = from_angle(angle_between(self.position, owner_pos));
                self.velocity = dir * self.params.speed * HOOK_RETRACT_FACTOR;
                let step = self.velocity.length() * ts;
                // A long step would overshoot the owner and never land inside it.
                let arrived = distance(owner_pos, self.position) <= step;
                if arrived {
                    self.position = owner_pos;
                } else {
                    self.position += self.velocity * ts;
                }
                if rng.gen::<f32>() < 0.3 * ts {
                    effects.emit(EffectRequest::Trail {
                        at: self.position,
                        color: palette::PLAYER,
                    });
                }
                if arrived || distance(owner_pos, self.position) <= owner_radius {
                    self.state = HookState::Idle;
                    effects.explosion(owner_pos, palette::PLAYER, 10.0);
                }
            }
            HookState::Pulling => {
                match self.hit_enemy.and_then(|id| find_active(enemies, id)) {
                    Some(enemy) => {
                        self.position = enemy.position;
                        if rng.gen::<f32>() < 0.5 * ts {
                            let span = distance(owner_pos, enemy.position);
                            let sparks = (span / 30.0).floor() as usize;
                            for i in 0..sparks {
                                let t = i as f32 / sparks as f32;
                                let jitter = Vec2::new(random_range(rng, -10.0, 10.0), random_range(rng, -10.0, 10.0));
                                effects.emit(EffectRequest::Trail {
                                    at: owner_pos.lerp(enemy.position, t) + jitter,
                                    color: palette::WHITE,
                                });
                            }
                        }
                    }
                    None => {
                        self.state = HookState::Retracting;
                        self.hit_enemy = None;
                    }
                }
            }
            HookState::Idle => {
                self.position = owner_pos;
            }
        }

        ensure_finite("hook update", self.position)
    }

    /// Latch onto `enemy` and start pulling the owner toward it.
    pub fn hit(&mut self, enemy: &Enemy, effects: &mut dyn EffectSink) {
        self.state = HookState::Pulling;
        self.hit_enemy = Some(enemy.id);
        self.position = enemy.position;
        effects.explosion(enemy.position, palette::PLAYER, 20.0);
        effects.floating_text(enemy.position, "HOOKED!", palette::WHITE, 18.0);
        effects.emit(EffectRequest::HookImpact {
            at: enemy.position,
            radius: enemy.radius,
        });
    }

    /// Early recall while extending; anything else is dropped.
    pub fn cancel(&mut self) -> HookCancel {
        if self.state == HookState::Extending {
            self.state = HookState::Retracting;
            HookCancel::Recalled
        } else {
            HookCancel::Discard
        }
    }

    /// Points of the arched chain from `owner_pos` to the hook head.
    pub fn chain_points(&self, owner_pos: Vec2, rng: &mut impl Rng) -> Vec<Vec2> {
        if self.state == HookState::Idle {
            return Vec::new();
        }
        let span = distance(owner_pos, self.position);
        let perp = from_angle(self.angle + FRAC_PI_2);
        let jitter = if self.state == HookState::Pulling { 5.0 } else { 2.0 };
        (0..=HOOK_CHAIN_SEGMENTS)
            .map(|i| {
                let t = i as f32 / HOOK_CHAIN_SEGMENTS as f32;
                let base = owner_pos.lerp(self.position, t);
                let arch = span * 0.05 * (t * PI).sin();
                let wobble = Vec2::new(
                    random_range(rng, -0.5, 0.5) * jitter,
                    random_range(rng, -0.5, 0.5) * jitter,
                );
                base + perp * arch + wobble
            })
            .collect()
    }

    pub fn draw(&self, canvas: &mut dyn Canvas, chain: &[Vec2]) {
        if self.state == HookState::Idle {
            return;
        }
        let pulse = 0.3 * self.pulse_phase.sin() + 1.0;

        if chain.len() > 1 {
            canvas.polyline(chain, palette::PLAYER);
            for (i, p) in chain.iter().enumerate().skip(1).step_by(2) {
                if i + 1 < chain.len() {
                    let node = 2.0 + (self.pulse_phase + i as f32 * 0.5).sin();
                    canvas.disc(*p, node, palette::WHITE);
                }
            }
        }

        canvas.disc(self.position, HOOK_SIZE * pulse, palette::PLAYER);
        canvas.disc(self.position, HOOK_SIZE * 0.6 * pulse, palette::PLAYER_LIGHT);
        if self.state == HookState::Pulling {
            let back = angle_between(self.position, self.start);
            for i in 0..3 {
                let a = back + i as f32 * TAU / 3.0;
                canvas.line(self.position, self.position + from_angle(a) * HOOK_SIZE * 1.2, palette::WHITE);
            }
        }
        canvas.disc(self.position, HOOK_SIZE * 0.3, palette::WHITE);
    }
}

/// Segment test for a hook that moved from `prev` to `pos` this step.
///
/// Only runs when the step was longer than the enemy radius.  Hits when the
/// closest point of the segment is within `hitbox + enemy_radius`, or, as an
/// approximate fallback for skipped-over enemies, when the path came within
/// twice the enemy radius and both endpoints are farther than that closest
/// point.
pub fn swept_hit(prev: Vec2, pos: Vec2, hitbox: f32, enemy_pos: Vec2, enemy_radius: f32) -> bool {
    let moved = pos - prev;
    let len_sq = moved.length_squared();
    if len_sq.sqrt() <= enemy_radius || len_sq == 0.0 {
        return false;
    }
    let t = ((enemy_pos - prev).dot(moved) / len_sq).clamp(0.0, 1.0);
    let closest = prev + moved * t;
    let dist = distance(enemy_pos, closest);
    if dist <= hitbox + enemy_radius {
        return true;
    }
    if dist < enemy_radius * 2.0 {
        let from_start = distance(enemy_pos, prev);
        let from_end = distance(enemy_pos, pos);
        return from_start > dist && from_end > dist;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::{NullEffects, RecordingEffects};
    use crate::enemy::EnemyParams;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(17)
    }

    fn hook_toward(target: Vec2) -> GrapplingHook {
        GrapplingHook::new(Vec2::new(100.0, 100.0), target, HookParams::default(), &mut rng(), &mut NullEffects)
    }

    fn enemy(id: u64, pos: Vec2) -> Enemy {
        Enemy::new(id, pos, 0.0, 1.0, &EnemyParams::default(), &mut rng())
    }

    #[test]
    fn starts_extending_toward_target() {
        let hook = hook_toward(Vec2::new(500.0, 100.0));
        assert_eq!(hook.state, HookState::Extending);
        assert!(hook.velocity.x > 0.0 && hook.velocity.y.abs() < 1e-4);
    }

    #[test]
    fn reaching_max_distance_retracts_on_next_update() {
        let mut hook = hook_toward(Vec2::new(900.0, 100.0));
        hook.position = hook.start + Vec2::new(HOOK_MAX_DISTANCE - 1.0, 0.0);
        hook.update(Vec2::new(100.0, 100.0), 30.0, &[], 1.0 / 60.0, &mut rng(), &mut NullEffects)
            .unwrap();
        assert_eq!(hook.state, HookState::Retracting);
    }

    #[test]
    fn pulling_drops_inactive_enemy() {
        let mut e = enemy(4, Vec2::new(300.0, 100.0));
        let mut hook = hook_toward(e.position);
        hook.hit(&e, &mut NullEffects);
        assert_eq!(hook.state, HookState::Pulling);
        e.active = false;
        hook.update(Vec2::new(100.0, 100.0), 30.0, std::slice::from_ref(&e), 0.016, &mut rng(), &mut NullEffects)
            .unwrap();
        assert_eq!(hook.state, HookState::Retracting);
        assert_eq!(hook.hit_enemy, None);
    }

    #[test]
    fn pulling_tracks_live_enemy() {
        let mut e = enemy(4, Vec2::new(300.0, 100.0));
        let mut hook = hook_toward(e.position);
        hook.hit(&e, &mut NullEffects);
        e.position = Vec2::new(320.0, 140.0);
        hook.update(Vec2::new(100.0, 100.0), 30.0, std::slice::from_ref(&e), 0.016, &mut rng(), &mut NullEffects)
            .unwrap();
        assert_eq!(hook.position, e.position);
        assert_eq!(hook.state, HookState::Pulling);
    }

    #[test]
    fn retracting_reaches_idle_near_owner() {
        let mut hook = hook_toward(Vec2::new(500.0, 100.0));
        hook.state = HookState::Retracting;
        hook.position = Vec2::new(160.0, 100.0);
        let owner = Vec2::new(100.0, 100.0);
        for _ in 0..5 {
            hook.update(owner, 30.0, &[], 1.0 / 60.0, &mut rng(), &mut NullEffects).unwrap();
        }
        assert!(hook.is_idle());
    }

    #[test]
    fn retracting_at_low_frame_rate_lands_on_owner() {
        let mut hook = hook_toward(Vec2::new(500.0, 100.0));
        hook.state = HookState::Retracting;
        let owner = Vec2::new(100.0, 100.0);
        hook.position = owner + Vec2::new(100.0, 0.0);
        for _ in 0..3 {
            hook.update(owner, 30.0, &[], 0.1, &mut rng(), &mut NullEffects).unwrap();
            if hook.is_idle() {
                break;
            }
        }
        assert!(hook.is_idle());
        assert_eq!(hook.position, owner);
    }

    #[test]
    fn cancel_recalls_only_while_extending() {
        let mut hook = hook_toward(Vec2::new(500.0, 100.0));
        assert_eq!(hook.cancel(), HookCancel::Recalled);
        assert_eq!(hook.state, HookState::Retracting);
        assert_eq!(hook.cancel(), HookCancel::Discard);
    }

    #[test]
    fn non_finite_owner_is_an_error() {
        let mut hook = hook_toward(Vec2::new(500.0, 100.0));
        let res = hook.update(Vec2::new(f32::NAN, 0.0), 30.0, &[], 0.016, &mut rng(), &mut NullEffects);
        assert!(res.is_err());
    }

    #[test]
    fn hit_announces_itself() {
        let e = enemy(1, Vec2::new(200.0, 100.0));
        let mut hook = hook_toward(e.position);
        let mut fx = RecordingEffects::default();
        hook.hit(&e, &mut fx);
        assert_eq!(fx.texts(), vec!["HOOKED!".to_string()]);
    }

    #[test]
    fn chain_has_nine_points() {
        let hook = hook_toward(Vec2::new(500.0, 100.0));
        assert_eq!(hook.chain_points(Vec2::new(100.0, 100.0), &mut rng()).len(), 9);
    }

    #[test]
    fn sweep_catches_pass_through() {
        // 60 px step straight through an enemy the endpoints both miss.
        assert!(swept_hit(
            Vec2::new(0.0, 0.0),
            Vec2::new(120.0, 0.0),
            15.0,
            Vec2::new(60.0, 0.0),
            25.0
        ));
    }

    #[test]
    fn sweep_ignores_short_steps_and_far_enemies() {
        assert!(!swept_hit(Vec2::ZERO, Vec2::new(10.0, 0.0), 15.0, Vec2::new(5.0, 0.0), 25.0));
        assert!(!swept_hit(Vec2::ZERO, Vec2::new(120.0, 0.0), 15.0, Vec2::new(60.0, 200.0), 25.0));
    }

    #[test]
    fn sweep_fallback_is_approximate() {
        // Closest approach 45 px: outside hitbox+radius (40) but inside 2r (50),
        // and both ends are farther away, so the heuristic reports a hit.
        assert!(swept_hit(Vec2::ZERO, Vec2::new(120.0, 0.0), 15.0, Vec2::new(60.0, 45.0), 25.0));
    }
}
