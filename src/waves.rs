//! Enemy manager: owns the enemy collection and schedules spawns.
//!
//! ## Spawn policies
//!
//! | Policy       | Behaviour                                                        |
//! |--------------|------------------------------------------------------------------|
//! | `Waves`      | cooldown → announce → spawn `n` enemies one at a time → complete |
//! | `Continuous` | one enemy per interval, interval shrinks, cap grows after 60 s   |
//!
//! ## Wave bookkeeping
//!
//! `remaining_to_spawn` drops by one per spawned enemy and never on removal.
//! A wave is complete exactly when nothing is left to spawn *and* no enemy is
//! alive; that check runs after every removal sweep.
//!
//! Difficulty rises with accumulated play time, `1 + min(2, t / 60)`, and
//! scales chase speed, spawn cooldowns and the concurrent-enemy cap.

use std::f32::consts::FRAC_PI_2;

use bevy::log::info;
use bevy::math::Vec2;
use rand::Rng;

use crate::canvas::{palette, Canvas};
use crate::config::{GameConfig, SpawnPolicy};
use crate::constants::*;
use crate::effects::{EffectRequest, EffectSink};
use crate::enemy::{find_active, Enemy, EnemyId, EnemyParams};
use crate::math::{from_angle, GeometryCache};
use crate::projectile::Projectile;

/// Wave tunables, copied out of [`GameConfig`].
#[derive(Debug, Clone, Copy)]
pub struct WaveParams {
    pub cooldown: f64,
    pub base_size: f32,
    pub growth: f32,
    pub interval_start: f64,
    pub interval_min: f64,
    pub base_max_enemies: usize,
    pub hard_max_enemies: usize,
}

impl Default for WaveParams {
    fn default() -> Self {
        Self {
            cooldown: WAVE_COOLDOWN,
            base_size: WAVE_BASE_SIZE,
            growth: WAVE_GROWTH,
            interval_start: WAVE_SPAWN_INTERVAL_START,
            interval_min: WAVE_SPAWN_INTERVAL_MIN,
            base_max_enemies: BASE_MAX_ENEMIES,
            hard_max_enemies: HARD_MAX_ENEMIES,
        }
    }
}

impl From<&GameConfig> for WaveParams {
    fn from(cfg: &GameConfig) -> Self {
        Self {
            cooldown: cfg.wave_cooldown,
            base_size: cfg.wave_base_size,
            growth: cfg.wave_growth,
            interval_start: cfg.wave_spawn_interval_start,
            interval_min: cfg.wave_spawn_interval_min,
            base_max_enemies: cfg.base_max_enemies,
            hard_max_enemies: cfg.hard_max_enemies,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EnemyManager {
    enemies: Vec<Enemy>,
    next_id: u64,
    policy: SpawnPolicy,
    params: EnemyParams,
    waves: WaveParams,
    map_size: Vec2,
    player_speed: f32,

    wave: u32,
    enemies_per_wave: u32,
    remaining_to_spawn: u32,
    wave_active: bool,
    /// Anchor of the spawn interval and of the inter-wave cooldown.
    last_spawn_time: Option<f64>,
    spawn_interval: f64,
    max_enemies: usize,
    game_time: f32,
    difficulty: f32,
    last_countdown: Option<u32>,
}

impl EnemyManager {
    pub fn new(config: &GameConfig) -> Self {
        let waves = WaveParams::from(config);
        Self {
            enemies: Vec::new(),
            next_id: 1,
            policy: config.spawn_policy,
            params: EnemyParams::from(config),
            waves,
            map_size: config.map_size(),
            player_speed: config.player_speed,
            wave: 0,
            enemies_per_wave: 0,
            remaining_to_spawn: 0,
            wave_active: false,
            last_spawn_time: None,
            spawn_interval: initial_interval(config.spawn_policy, &waves),
            max_enemies: waves.base_max_enemies,
            game_time: 0.0,
            difficulty: 1.0,
            last_countdown: None,
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────────

    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    /// Field access for collaborators; the collection itself stays owned here.
    pub fn enemies_mut(&mut self) -> &mut [Enemy] {
        &mut self.enemies
    }

    pub fn get(&self, id: EnemyId) -> Option<&Enemy> {
        find_active(&self.enemies, id)
    }

    pub fn active_count(&self) -> usize {
        self.enemies.iter().filter(|e| e.active).count()
    }

    pub fn policy(&self) -> SpawnPolicy {
        self.policy
    }

    pub fn wave(&self) -> u32 {
        self.wave
    }

    pub fn enemies_per_wave(&self) -> u32 {
        self.enemies_per_wave
    }

    pub fn remaining_to_spawn(&self) -> u32 {
        self.remaining_to_spawn
    }

    pub fn is_wave_active(&self) -> bool {
        self.wave_active
    }

    pub fn difficulty(&self) -> f32 {
        self.difficulty
    }

    pub fn max_enemies(&self) -> usize {
        self.max_enemies
    }

    pub fn spawn_interval(&self) -> f64 {
        self.spawn_interval
    }

    /// Seconds until the next wave starts, when between waves.
    pub fn next_wave_in(&self, now: f64) -> Option<f64> {
        if self.wave_active || self.policy != SpawnPolicy::Waves {
            return None;
        }
        let anchor = self.last_spawn_time.unwrap_or(now);
        Some((self.waves.cooldown - (now - anchor)).max(0.0))
    }

    // ── Update ────────────────────────────────────────────────────────────────

    #[allow(clippy::too_many_arguments)]
    pub fn update(
        &mut self,
        player_pos: Vec2,
        now: f64,
        dt: f32,
        projectiles: &mut Vec<Projectile>,
        geometry: &mut GeometryCache,
        rng: &mut impl Rng,
        effects: &mut dyn EffectSink,
    ) {
        self.game_time += dt;
        self.difficulty = 1.0 + (self.game_time / DIFFICULTY_RAMP_SECS).min(DIFFICULTY_MAX_BONUS);
        let anchor = *self.last_spawn_time.get_or_insert(now);

        match self.policy {
            SpawnPolicy::Waves => self.update_waves(now, anchor, rng, effects),
            SpawnPolicy::Continuous => self.update_continuous(now, anchor, rng, effects),
        }

        let speed = self.player_speed / ENEMY_SPEED_DIVISOR * self.difficulty;
        for enemy in self.enemies.iter_mut().filter(|e| e.active) {
            enemy.speed = speed;
            enemy.update(player_pos, now, dt, self.map_size, projectiles, geometry, rng, effects);
        }

        self.enemies.retain(|e| e.active);

        if self.policy == SpawnPolicy::Waves
            && self.wave_active
            && self.remaining_to_spawn == 0
            && self.enemies.is_empty()
        {
            self.wave_active = false;
            self.last_spawn_time = Some(now);
            self.last_countdown = None;
            info!("[wave] Wave {} complete", self.wave);
            effects.emit(EffectRequest::Banner {
                text: format!("WAVE {} COMPLETE!", self.wave),
                color: palette::PLAYER,
                size: 32.0,
            });
        }
    }

    fn update_waves(&mut self, now: f64, anchor: f64, rng: &mut impl Rng, effects: &mut dyn EffectSink) {
        self.max_enemies = difficulty_cap(self.difficulty, &self.waves);
        let elapsed = now - anchor;

        if self.wave_active {
            if self.remaining_to_spawn > 0
                && elapsed > self.spawn_interval
                && self.enemies.len() < self.max_enemies
            {
                self.spawn(now, rng, effects);
                self.remaining_to_spawn -= 1;
            }
            return;
        }

        if elapsed >= self.waves.cooldown {
            self.wave += 1;
            let n = (self.wave - 1) as f32;
            self.enemies_per_wave = (self.waves.base_size + self.waves.growth * n).floor() as u32;
            self.remaining_to_spawn = self.enemies_per_wave;
            self.spawn_interval = (self.waves.interval_start
                - WAVE_SPAWN_INTERVAL_STEP * f64::from(self.wave - 1))
            .max(self.waves.interval_min);
            self.wave_active = true;
            self.last_countdown = None;
            info!(
                "[wave] Wave {} started: {} enemies every {:.1}s (difficulty {:.2})",
                self.wave, self.enemies_per_wave, self.spawn_interval, self.difficulty
            );
            effects.emit(EffectRequest::Banner {
                text: format!("WAVE {} INCOMING!", self.wave),
                color: palette::DEEP_ORANGE,
                size: 36.0,
            });
            effects.explosion(self.map_size / 2.0, palette::DEEP_ORANGE, 100.0);
        } else if elapsed >= self.waves.cooldown - WAVE_COUNTDOWN_SECONDS && self.enemies.is_empty() {
            let secs = (self.waves.cooldown - elapsed).ceil().max(1.0) as u32;
            if self.last_countdown != Some(secs) {
                self.last_countdown = Some(secs);
                effects.emit(EffectRequest::Banner {
                    text: format!("NEXT WAVE IN {}s", secs),
                    color: palette::YELLOW,
                    size: 30.0,
                });
            }
        }
    }

    fn update_continuous(&mut self, now: f64, anchor: f64, rng: &mut impl Rng, effects: &mut dyn EffectSink) {
        if now - anchor > self.spawn_interval && self.enemies.len() < self.max_enemies {
            self.spawn(now, rng, effects);
            self.spawn_interval = (self.spawn_interval - CONTINUOUS_SPAWN_STEP).max(CONTINUOUS_SPAWN_MIN);
            let played = f64::from(self.game_time);
            if played > CONTINUOUS_CAP_GROWTH_AFTER {
                let grown = self.waves.base_max_enemies + (played / CONTINUOUS_CAP_GROWTH_PERIOD).floor() as usize;
                self.max_enemies = grown.min(self.waves.hard_max_enemies);
            }
        }
    }

    fn spawn(&mut self, now: f64, rng: &mut impl Rng, effects: &mut dyn EffectSink) {
        let pos = corner_spawn_position(self.map_size, SPAWN_CORNER_PADDING, rng);
        let mut enemy = Enemy::new(self.next_id, pos, now, self.difficulty, &self.params, rng);
        enemy.speed = self.player_speed / ENEMY_SPEED_DIVISOR * self.difficulty;
        self.next_id += 1;
        self.last_spawn_time = Some(now);

        effects.explosion(pos, palette::ENEMY, 30.0);
        for i in 0..20 {
            let angle = i as f32 / 20.0 * std::f32::consts::TAU + rng.gen::<f32>() * 0.3;
            effects.emit(EffectRequest::Trail {
                at: pos + from_angle(angle) * enemy.radius * 1.2,
                color: palette::ENEMY,
            });
        }
        self.enemies.push(enemy);
    }

    /// Place an enemy at `pos` outside the wave bookkeeping.
    pub fn spawn_at(&mut self, pos: Vec2, now: f64, rng: &mut impl Rng) -> EnemyId {
        let id = EnemyId(self.next_id);
        let mut enemy = Enemy::new(self.next_id, pos, now, self.difficulty, &self.params, rng);
        enemy.speed = self.player_speed / ENEMY_SPEED_DIVISOR * self.difficulty;
        self.next_id += 1;
        self.enemies.push(enemy);
        id
    }

    /// Back to the state of a fresh session.  Enemy ids keep counting up.
    pub fn clear(&mut self) {
        self.enemies.clear();
        self.wave = 0;
        self.enemies_per_wave = 0;
        self.remaining_to_spawn = 0;
        self.wave_active = false;
        self.last_spawn_time = None;
        self.spawn_interval = initial_interval(self.policy, &self.waves);
        self.max_enemies = self.waves.base_max_enemies;
        self.game_time = 0.0;
        self.difficulty = 1.0;
        self.last_countdown = None;
    }

    pub fn draw(&self, canvas: &mut dyn Canvas, now: f64) {
        for enemy in &self.enemies {
            enemy.draw(canvas, now);
        }
    }

    /// Top-right wave read-out.
    pub fn draw_indicator(&self, canvas: &mut dyn Canvas, now: f64) {
        if self.policy != SpawnPolicy::Waves {
            return;
        }
        let x = self.map_size.x - 110.0;
        canvas.text(Vec2::new(x, 30.0), &format!("Wave: {}", self.wave), 16.0, palette::WHITE);
        let detail = match self.next_wave_in(now) {
            Some(secs) => format!("Next Wave: {}s", secs.ceil() as u32),
            None => format!(
                "Enemies Remaining: {}",
                self.remaining_to_spawn as usize + self.enemies.len()
            ),
        };
        canvas.text(Vec2::new(x, 55.0), &detail, 16.0, palette::WHITE);
    }
}

fn initial_interval(policy: SpawnPolicy, waves: &WaveParams) -> f64 {
    match policy {
        SpawnPolicy::Waves => waves.interval_start,
        SpawnPolicy::Continuous => CONTINUOUS_SPAWN_INTERVAL,
    }
}

/// Concurrent-enemy cap for the wave policy: scales with difficulty, bounded
/// below by the base cap and above by the hard cap.
pub fn difficulty_cap(difficulty: f32, waves: &WaveParams) -> usize {
    let scaled = (waves.base_max_enemies as f32 * difficulty).round() as usize;
    scaled.clamp(waves.base_max_enemies, waves.hard_max_enemies.max(waves.base_max_enemies))
}

/// Random point near one of the four corners, biased toward the corner.
///
/// Distance from the padded corner is `pad + u² · 2·pad` for uniform `u`, so
/// most spawns land close to it without piling onto one spot.
pub fn corner_spawn_position(map_size: Vec2, padding: f32, rng: &mut impl Rng) -> Vec2 {
    let corner: u8 = rng.gen_range(0..4);
    let dist = padding + rng.gen::<f32>().powi(2) * (padding * 2.0);
    let offset = from_angle(rng.gen::<f32>() * FRAC_PI_2) * dist;
    let (w, h) = (map_size.x, map_size.y);
    match corner {
        0 => Vec2::new(padding + offset.x, padding + offset.y),
        1 => Vec2::new(w - padding - offset.x, padding + offset.y),
        2 => Vec2::new(padding + offset.x, h - padding - offset.y),
        3 => Vec2::new(w - padding - offset.x, h - padding - offset.y),
        _ => unreachable!("corner index is drawn from 0..4"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::{NullEffects, RecordingEffects};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    struct Harness {
        manager: EnemyManager,
        projectiles: Vec<Projectile>,
        geometry: GeometryCache,
        rng: StdRng,
    }

    impl Harness {
        fn new(config: &GameConfig) -> Self {
            Self {
                manager: EnemyManager::new(config),
                projectiles: Vec::new(),
                geometry: GeometryCache::default(),
                rng: StdRng::seed_from_u64(8),
            }
        }

        fn step(&mut self, now: f64, fx: &mut dyn EffectSink) {
            self.manager.update(
                Vec2::new(450.0, 450.0),
                now,
                0.016,
                &mut self.projectiles,
                &mut self.geometry,
                &mut self.rng,
                fx,
            );
        }
    }

    #[test]
    fn first_wave_starts_after_cooldown() {
        let mut h = Harness::new(&GameConfig::default());
        h.step(0.0, &mut NullEffects);
        assert_eq!(h.manager.wave(), 0);
        h.step(4.9, &mut NullEffects);
        assert!(!h.manager.is_wave_active());
        h.step(5.0, &mut NullEffects);
        assert!(h.manager.is_wave_active());
        assert_eq!(h.manager.wave(), 1);
        assert_eq!(h.manager.enemies_per_wave(), 5);
        assert_eq!(h.manager.remaining_to_spawn(), 5);
        assert!((h.manager.spawn_interval() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn countdown_ticks_once_per_second() {
        let mut h = Harness::new(&GameConfig::default());
        let mut fx = RecordingEffects::default();
        let mut t = 0.0;
        while t < 4.99 {
            h.step(t, &mut fx);
            t += 0.05;
        }
        let ticks: Vec<String> = fx
            .texts()
            .into_iter()
            .filter(|s| s.starts_with("NEXT WAVE IN"))
            .collect();
        assert_eq!(ticks, vec!["NEXT WAVE IN 3s", "NEXT WAVE IN 2s", "NEXT WAVE IN 1s"]);
    }

    #[test]
    fn spawns_one_at_a_time_and_counts_down() {
        let mut h = Harness::new(&GameConfig::default());
        h.step(0.0, &mut NullEffects);
        h.step(5.0, &mut NullEffects);
        h.step(5.1, &mut NullEffects);
        assert_eq!(h.manager.enemies().len(), 1);
        assert_eq!(h.manager.remaining_to_spawn(), 4);
        h.step(6.0, &mut NullEffects);
        assert_eq!(h.manager.enemies().len(), 1, "interval not yet elapsed");
        h.step(8.2, &mut NullEffects);
        assert_eq!(h.manager.enemies().len(), 2);
    }

    #[test]
    fn removal_does_not_touch_remaining() {
        let mut h = Harness::new(&GameConfig::default());
        h.step(0.0, &mut NullEffects);
        h.step(5.0, &mut NullEffects);
        h.step(5.1, &mut NullEffects);
        h.manager.enemies_mut()[0].take_damage();
        h.step(5.2, &mut NullEffects);
        assert_eq!(h.manager.enemies().len(), 0);
        assert_eq!(h.manager.remaining_to_spawn(), 4);
        assert!(h.manager.is_wave_active());
    }

    #[test]
    fn cap_scales_with_difficulty() {
        let w = WaveParams::default();
        assert_eq!(difficulty_cap(1.0, &w), 10);
        assert_eq!(difficulty_cap(1.5, &w), 15);
        assert_eq!(difficulty_cap(3.0, &w), 20);
    }

    #[test]
    fn continuous_policy_spawns_without_waves() {
        let config = GameConfig {
            spawn_policy: SpawnPolicy::Continuous,
            ..GameConfig::default()
        };
        let mut h = Harness::new(&config);
        h.step(0.0, &mut NullEffects);
        h.step(3.1, &mut NullEffects);
        assert_eq!(h.manager.enemies().len(), 1);
        assert_eq!(h.manager.wave(), 0);
        assert!((h.manager.spawn_interval() - 2.95).abs() < 1e-9);
    }

    #[test]
    fn corner_spawns_stay_near_corners() {
        let mut rng = StdRng::seed_from_u64(99);
        let map = Vec2::new(900.0, 900.0);
        for _ in 0..200 {
            let p = corner_spawn_position(map, 100.0, &mut rng);
            let near_x = p.x <= 400.0 + 1e-3 || p.x >= 500.0 - 1e-3;
            let near_y = p.y <= 400.0 + 1e-3 || p.y >= 500.0 - 1e-3;
            assert!(near_x && near_y, "{p:?}");
            assert!(p.x >= 100.0 - 1e-3 && p.x <= 800.0 + 1e-3);
        }
    }

    #[test]
    fn clear_resets_session() {
        let mut h = Harness::new(&GameConfig::default());
        h.step(0.0, &mut NullEffects);
        h.step(5.0, &mut NullEffects);
        h.step(5.1, &mut NullEffects);
        h.manager.clear();
        assert_eq!(h.manager.wave(), 0);
        assert!(h.manager.enemies().is_empty());
        assert!(!h.manager.is_wave_active());
        assert_eq!(h.manager.difficulty(), 1.0);
    }
}
