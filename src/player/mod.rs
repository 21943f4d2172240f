//! Player module: the hexagon, its shield, hook mode, and input.
//!
//! ## Sub-module layout
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | (this) | [`Player`] state, per-frame movement, hook stepping and swept hits |
//! | [`ability`] | Shield blocks, invulnerability, firing/cancelling the hook, death and reset |
//! | [`control`] | [`PlayerInput`] snapshot and the Bevy input system |
//! | [`rendering`] | Body, shield arc, and hook-mode indicator drawing |
//!
//! ## Ability axes
//!
//! | Axis | Values | Transition |
//! |------|--------|------------|
//! | Shield charge | `0..max` | +1 per block; cleared when hook mode starts |
//! | Invulnerability | flag + start time | set at max charge; cleared once after the duration |
//! | Hook | `Option<GrapplingHook>` | only fired while invulnerable; discarded when idle |

pub mod ability;
pub mod control;
pub mod rendering;

pub use control::{collect_player_input_system, cursor_to_map, PlayerInput};

use bevy::log::{info, warn};
use bevy::math::Vec2;
use rand::Rng;

use crate::canvas::palette;
use crate::collision::CollisionSystem;
use crate::config::GameConfig;
use crate::constants::*;
use crate::effects::{EffectRequest, EffectSink};
use crate::enemy::{find_active_mut, EnemyId};
use crate::error::{GameError, GameResult};
use crate::hook::{swept_hit, GrapplingHook, HookParams, HookState};
use crate::math::{angle_between, distance, from_angle};
use crate::waves::EnemyManager;

#[derive(Debug, Clone)]
pub struct Player {
    pub position: Vec2,
    pub velocity: Vec2,
    pub radius: f32,
    /// Movement speed (px per frame unit).
    pub speed: f32,
    /// Cosmetic spin of the hexagon.
    pub rotation: f32,
    /// Direction the shield faces; follows the pointer.
    pub shield_angle: f32,
    pub shield_charge: u32,
    pub max_shield_charge: u32,
    pub invulnerable: bool,
    pub invulnerable_since: f64,
    pub invulnerability_duration: f64,
    pub hook: Option<GrapplingHook>,
    pub hook_params: HookParams,
    /// Last pointer position seen (map space).
    pub aim: Vec2,
    pub score: u32,
    pub alive: bool,
    /// `die` is ignored until this time.
    pub death_suppressed_until: f64,
    pub knockback_radius: f32,
    pub knockback_force: f32,
    map_size: Vec2,
}

impl Player {
    pub fn new(position: Vec2, config: &GameConfig) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            radius: config.player_radius,
            speed: config.player_speed,
            rotation: 0.0,
            shield_angle: 0.0,
            shield_charge: 0,
            max_shield_charge: config.max_shield_charge,
            invulnerable: false,
            invulnerable_since: 0.0,
            invulnerability_duration: config.invulnerability_duration,
            hook: None,
            hook_params: HookParams::from(config),
            aim: position,
            score: 0,
            alive: true,
            death_suppressed_until: 0.0,
            knockback_radius: config.knockback_radius,
            knockback_force: config.knockback_force,
            map_size: config.map_size(),
        }
    }

    pub fn map_size(&self) -> Vec2 {
        self.map_size
    }

    pub fn charge_ratio(&self) -> f32 {
        if self.max_shield_charge == 0 {
            return 0.0;
        }
        self.shield_charge as f32 / self.max_shield_charge as f32
    }

    pub fn hook_state(&self) -> Option<HookState> {
        self.hook.as_ref().map(|h| h.state)
    }

    /// One simulation step.  Input edges fire or recall the hook first.
    #[allow(clippy::too_many_arguments)]
    pub fn update(
        &mut self,
        now: f64,
        dt: f32,
        input: &PlayerInput,
        enemies: &mut EnemyManager,
        collision: &mut CollisionSystem,
        rng: &mut impl Rng,
        effects: &mut dyn EffectSink,
    ) {
        let ts = dt * BASELINE_FPS;
        self.aim = input.aim;

        if input.fire_pressed {
            self.fire_hook(input.aim, rng, effects);
        }
        if input.fire_released && self.hook_state() == Some(HookState::Extending) {
            self.cancel_hook();
        }

        self.step_movement(ts, input);

        if self.invulnerable {
            let elapsed = now - self.invulnerable_since;
            if elapsed >= self.invulnerability_duration {
                self.expire_invulnerability(effects);
            } else {
                effects.emit(EffectRequest::InvulnerabilityAura {
                    center: self.position,
                    radius: self.radius,
                    progress: (elapsed / self.invulnerability_duration) as f32,
                });
            }
        }

        if self.hook.is_some() {
            if let Err(err) = self.step_hook(dt, enemies, collision, rng, effects) {
                warn!("[hook] {err}; discarding hook");
                self.hook = None;
            }
        }
        if self.hook.as_ref().is_some_and(GrapplingHook::is_idle) {
            self.hook = None;
        }
    }

    fn step_movement(&mut self, ts: f32, input: &PlayerInput) {
        let pull_target = self
            .hook
            .as_ref()
            .filter(|h| h.state == HookState::Pulling)
            .map(|h| h.position);

        self.velocity = match pull_target {
            Some(target) => {
                from_angle(angle_between(self.position, target)) * self.speed * PLAYER_PULL_SPEED_FACTOR
            }
            None => input.movement() * self.speed,
        };
        self.position += self.velocity * ts;
        self.position = self.position.clamp(
            Vec2::splat(self.radius),
            (self.map_size - Vec2::splat(self.radius)).max(Vec2::splat(self.radius)),
        );

        self.rotation += PLAYER_SPIN_RATE * ts;
        self.shield_angle = angle_between(self.position, input.aim);
    }

    /// Advance the hook, run the swept hit test, and resolve a finished pull.
    fn step_hook(
        &mut self,
        dt: f32,
        enemies: &mut EnemyManager,
        collision: &mut CollisionSystem,
        rng: &mut impl Rng,
        effects: &mut dyn EffectSink,
    ) -> GameResult<()> {
        let kill_target = {
            let Some(hook) = self.hook.as_mut() else {
                return Ok(());
            };
            let previous = hook.position;
            hook.update(self.position, self.radius, enemies.enemies(), dt, rng, effects)?;

            if hook.state == HookState::Extending {
                let hitbox = hook.hitbox_radius();
                let struck = enemies.enemies().iter().filter(|e| e.active).find(|e| {
                    collision.hook_hits_enemy(hook.position, hitbox, e)
                        || swept_hit(previous, hook.position, hitbox, e.position, e.radius)
                });
                if let Some(enemy) = struck {
                    hook.hit(enemy, effects);
                }
            }

            match (hook.state, hook.hit_enemy) {
                (HookState::Pulling, Some(id)) => {
                    let enemy = enemies.get(id).ok_or(GameError::StaleEnemyHandle { id: id.0 })?;
                    let reach = self.radius + enemy.radius;
                    (distance(self.position, enemy.position) <= reach).then_some(id)
                }
                _ => None,
            }
        };

        match kill_target {
            Some(id) => self.kill_hooked(id, enemies, collision, rng, effects),
            None => Ok(()),
        }
    }

    /// The pull reached its enemy: destroy it, score, and knock back the crowd.
    fn kill_hooked(
        &mut self,
        id: EnemyId,
        enemies: &mut EnemyManager,
        collision: &mut CollisionSystem,
        rng: &mut impl Rng,
        effects: &mut dyn EffectSink,
    ) -> GameResult<()> {
        let enemy = find_active_mut(enemies.enemies_mut(), id).ok_or(GameError::StaleEnemyHandle { id: id.0 })?;
        let (at, radius) = (enemy.position, enemy.radius);
        enemy.take_damage();

        self.score += 1;
        if let Some(hook) = self.hook.as_mut() {
            hook.hit_enemy = None;
        }
        effects.emit(EffectRequest::EnemyDeath { at, radius });
        effects.floating_text(at, "+1", palette::WHITE, 24.0);

        let knocked = collision.apply_knockback(
            at,
            enemies.enemies_mut(),
            self.knockback_radius,
            self.knockback_force,
            rng,
            effects,
        );
        if knocked {
            effects.screen_shake(0.6, 30.0);
        }
        info!("[player] hooked enemy {} destroyed, score {}", id.0, self.score);

        self.cancel_hook();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::{NullEffects, RecordingEffects};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn setup() -> (Player, EnemyManager, CollisionSystem, StdRng) {
        let config = GameConfig::default();
        (
            Player::new(Vec2::new(450.0, 450.0), &config),
            EnemyManager::new(&config),
            CollisionSystem::default(),
            StdRng::seed_from_u64(3),
        )
    }

    fn idle_input(aim: Vec2) -> PlayerInput {
        PlayerInput {
            aim,
            ..Default::default()
        }
    }

    #[test]
    fn moves_with_input_and_faces_pointer() {
        let (mut player, mut enemies, mut collision, mut rng) = setup();
        let input = PlayerInput {
            right: true,
            aim: Vec2::new(450.0, 0.0),
            ..Default::default()
        };
        player.update(0.0, 1.0 / 60.0, &input, &mut enemies, &mut collision, &mut rng, &mut NullEffects);
        assert!((player.position.x - 456.5).abs() < 1e-3);
        assert!((player.shield_angle + std::f32::consts::FRAC_PI_2).abs() < 0.05);
    }

    #[test]
    fn position_is_clamped_to_the_map() {
        let (mut player, mut enemies, mut collision, mut rng) = setup();
        player.position = Vec2::new(5.0, 895.0);
        let input = idle_input(Vec2::ZERO);
        player.update(0.0, 0.016, &input, &mut enemies, &mut collision, &mut rng, &mut NullEffects);
        assert_eq!(player.position, Vec2::new(30.0, 870.0));
    }

    #[test]
    fn invulnerability_expires_exactly_once() {
        let (mut player, mut enemies, mut collision, mut rng) = setup();
        let mut fx = RecordingEffects::default();
        player.activate_invulnerability(0.0, &mut fx);
        fx.clear();

        let input = idle_input(Vec2::ZERO);
        player.update(10.05, 0.016, &input, &mut enemies, &mut collision, &mut rng, &mut fx);
        assert!(!player.invulnerable);
        player.update(10.1, 0.016, &input, &mut enemies, &mut collision, &mut rng, &mut fx);
        let expiries = fx.texts().iter().filter(|t| t.as_str() == "SHIELD MODE").count();
        assert_eq!(expiries, 1);
    }

    #[test]
    fn expiry_cancels_the_hook() {
        let (mut player, mut enemies, mut collision, mut rng) = setup();
        player.activate_invulnerability(0.0, &mut NullEffects);
        assert!(player.fire_hook(Vec2::new(450.0, 0.0), &mut rng, &mut NullEffects));
        if let Some(hook) = player.hook.as_mut() {
            hook.position = Vec2::new(450.0, 200.0);
        }
        let input = idle_input(Vec2::ZERO);
        player.update(10.5, 0.016, &input, &mut enemies, &mut collision, &mut rng, &mut NullEffects);
        assert_eq!(player.hook_state(), Some(HookState::Retracting));
    }

    #[test]
    fn releasing_the_button_recalls_an_extending_hook() {
        let (mut player, mut enemies, mut collision, mut rng) = setup();
        player.activate_invulnerability(0.0, &mut NullEffects);
        let press = PlayerInput {
            fire_pressed: true,
            aim: Vec2::new(450.0, 0.0),
            ..Default::default()
        };
        player.update(0.1, 0.016, &press, &mut enemies, &mut collision, &mut rng, &mut NullEffects);
        let hold = idle_input(Vec2::new(450.0, 0.0));
        for i in 0..10 {
            player.update(0.2 + i as f64 * 0.016, 0.016, &hold, &mut enemies, &mut collision, &mut rng, &mut NullEffects);
        }
        assert_eq!(player.hook_state(), Some(HookState::Extending));

        let release = PlayerInput {
            fire_released: true,
            aim: Vec2::new(450.0, 0.0),
            ..Default::default()
        };
        player.update(0.4, 0.016, &release, &mut enemies, &mut collision, &mut rng, &mut NullEffects);
        assert_eq!(player.hook_state(), Some(HookState::Retracting));
    }

    #[test]
    fn hook_pull_kills_and_scores() {
        let (mut player, mut enemies, mut collision, mut rng) = setup();
        let target = Vec2::new(450.0, 300.0);
        let id = enemies.spawn_at(target, 0.0, &mut rng);

        player.activate_invulnerability(0.0, &mut NullEffects);
        player.fire_hook(target, &mut rng, &mut NullEffects);

        let input = idle_input(target);
        let mut now = 0.0;
        for _ in 0..120 {
            now += 1.0 / 60.0;
            // Pin the enemy so the pull resolves deterministically.
            if let Some(e) = find_active_mut(enemies.enemies_mut(), id) {
                e.position = target;
            }
            player.update(now, 1.0 / 60.0, &input, &mut enemies, &mut collision, &mut rng, &mut NullEffects);
            if player.score > 0 {
                break;
            }
        }
        assert_eq!(player.score, 1);
        assert!(player.hook.is_none());
        assert_eq!(enemies.active_count(), 0);
    }

    #[test]
    fn swept_hook_catches_enemy_between_frames() {
        let (mut player, mut enemies, mut collision, mut rng) = setup();
        player.position = Vec2::new(100.0, 450.0);
        // Enemy straddles the path but neither endpoint of the step touches it.
        let enemy_pos = Vec2::new(160.0, 450.0);
        let id = enemies.spawn_at(enemy_pos, 0.0, &mut rng);

        player.activate_invulnerability(0.0, &mut NullEffects);
        player.fire_hook(Vec2::new(800.0, 450.0), &mut rng, &mut NullEffects);
        if let Some(hook) = player.hook.as_mut() {
            hook.position = Vec2::new(110.0, 450.0);
        }
        // 0.1 s step moves the hook 120 px, jumping from 110 to 230.
        let input = idle_input(Vec2::new(800.0, 450.0));
        player.update(0.1, 0.1, &input, &mut enemies, &mut collision, &mut rng, &mut NullEffects);
        assert_eq!(player.hook_state(), Some(HookState::Pulling));
        assert_eq!(player.hook.as_ref().and_then(|h| h.hit_enemy), Some(id));
    }
}
