//! The game loop: one [`Game::frame`] call per display refresh.
//!
//! ## Frame order
//!
//! 1. Delta time from the previous timestamp (first frame 16 ms, clamped to 0.1 s)
//! 2. Rolling FPS → effects performance mode
//! 3. Input toggles (pause, grid, restart, verify) and verification polling
//! 4. Stop here while paused or over: drawing still happens
//! 5. Collision cache and geometry cache maintenance
//! 6. Player, then enemy manager (only while the player is alive)
//! 7. Projectiles move; shield blocks first, then body hits
//! 8. Effects, then the deferred game-over check
//!
//! Death does not end the game immediately.  A game-over entry tagged with the
//! session generation is queued for `game_over_delay` seconds later; a restart
//! bumps the generation so stale entries are ignored when they come due.

use std::collections::VecDeque;

use bevy::log::{info, warn};
use bevy::math::Vec2;
use bevy::prelude::Resource;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::collision::CollisionSystem;
use crate::config::GameConfig;
use crate::constants::*;
use crate::effects::Effects;
use crate::highscore::{MemoryScoreStore, ScoreStore};
use crate::math::GeometryCache;
use crate::player::{Player, PlayerInput};
use crate::projectile::Projectile;
use crate::schedule::DeferredQueue;
use crate::verify::{LedgerVerifier, ScoreVerifier, VerificationSession};
use crate::waves::EnemyManager;

pub type BoxedScoreStore = Box<dyn ScoreStore + Send + Sync>;
pub type BoxedVerifier = Box<dyn ScoreVerifier + Send + Sync>;

/// Coarse phase of a session, mirrored into the app state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    Playing,
    Paused,
    Over,
}

#[derive(Resource)]
pub struct Game {
    pub config: GameConfig,
    pub player: Player,
    pub enemies: EnemyManager,
    pub projectiles: Vec<Projectile>,
    pub collision: CollisionSystem,
    pub geometry: GeometryCache,
    pub effects: Effects,
    rng: StdRng,
    store: BoxedScoreStore,
    verifier: BoxedVerifier,
    verification: Option<VerificationSession>,
    game_over_queue: DeferredQueue<u64>,
    generation: u64,
    last_timestamp: Option<f64>,
    last_dt: f32,
    fps_history: VecDeque<f32>,
    now: f64,
    paused: bool,
    over: bool,
    show_grid: bool,
    high_score: u32,
    new_high_score: bool,
}

impl Game {
    pub fn new(config: GameConfig, store: BoxedScoreStore, verifier: BoxedVerifier) -> Self {
        let effects = Effects::new(config.map_size(), config.max_particles, config.max_explosions);
        Self::assemble(config, store, verifier, StdRng::from_entropy(), effects)
    }

    /// Deterministic game: every random draw comes from `seed`.
    pub fn with_seed(config: GameConfig, store: BoxedScoreStore, verifier: BoxedVerifier, seed: u64) -> Self {
        let effects = Effects::with_rng(
            config.map_size(),
            config.max_particles,
            config.max_explosions,
            StdRng::seed_from_u64(seed.wrapping_add(1)),
        );
        Self::assemble(config, store, verifier, StdRng::seed_from_u64(seed), effects)
    }

    /// Seeded game with an in-memory score store and a temp-dir ledger.
    pub fn headless(config: GameConfig, seed: u64) -> Self {
        let ledger = std::env::temp_dir().join(format!("hexhook-{}", std::process::id())).join("verified_scores.toml");
        Self::with_seed(
            config,
            Box::new(MemoryScoreStore::default()),
            Box::new(LedgerVerifier::new(ledger)),
            seed,
        )
    }

    fn assemble(
        config: GameConfig,
        store: BoxedScoreStore,
        verifier: BoxedVerifier,
        rng: StdRng,
        effects: Effects,
    ) -> Self {
        let high_score = store.load().unwrap_or_else(|err| {
            warn!("[score] {err}; starting from 0");
            0
        });
        Self {
            player: Player::new(config.map_size() / 2.0, &config),
            enemies: EnemyManager::new(&config),
            projectiles: Vec::new(),
            collision: CollisionSystem::new(config.collision_cache_timeout),
            geometry: GeometryCache::new(config.geometry_cache_timeout),
            effects,
            rng,
            store,
            verifier,
            verification: None,
            game_over_queue: DeferredQueue::new(),
            generation: 0,
            last_timestamp: None,
            last_dt: 0.0,
            fps_history: VecDeque::with_capacity(FPS_HISTORY_LEN),
            now: 0.0,
            paused: false,
            over: false,
            show_grid: true,
            high_score,
            new_high_score: false,
            config,
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────────

    pub fn phase(&self) -> GamePhase {
        if self.over {
            GamePhase::Over
        } else if self.paused {
            GamePhase::Paused
        } else {
            GamePhase::Playing
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_over(&self) -> bool {
        self.over
    }

    pub fn show_grid(&self) -> bool {
        self.show_grid
    }

    pub fn score(&self) -> u32 {
        self.player.score
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    pub fn is_new_high_score(&self) -> bool {
        self.new_high_score
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Timestamp of the latest frame (s).
    pub fn now(&self) -> f64 {
        self.now
    }

    pub fn last_dt(&self) -> f32 {
        self.last_dt
    }

    pub fn pending_game_over(&self) -> bool {
        !self.game_over_queue.is_empty()
    }

    pub fn verification_status(&self) -> Option<&str> {
        self.verification.as_ref().map(VerificationSession::status_text)
    }

    /// Rolling average over the last [`FPS_HISTORY_LEN`] frames.
    pub fn average_fps(&self) -> f32 {
        if self.fps_history.is_empty() {
            return BASELINE_FPS;
        }
        self.fps_history.iter().sum::<f32>() / self.fps_history.len() as f32
    }

    /// Grid is drawn when toggled on and the frame rate can afford it.
    pub fn grid_visible(&self) -> bool {
        self.show_grid && self.average_fps() >= GRID_HIDE_FPS
    }

    // ── Frame driver ──────────────────────────────────────────────────────────

    pub fn frame(&mut self, timestamp: f64, input: &PlayerInput) {
        let dt = match self.last_timestamp {
            Some(prev) => ((timestamp - prev) as f32).clamp(0.0, MAX_DELTA_TIME),
            None => FIRST_FRAME_DELTA,
        };
        self.last_timestamp = Some(timestamp);
        self.last_dt = dt;
        self.now = timestamp;
        self.record_fps(dt);

        if input.pause_pressed {
            self.toggle_pause();
        }
        if input.grid_pressed {
            self.toggle_grid();
        }
        if self.over {
            if input.restart_pressed {
                self.restart();
            } else if input.verify_pressed {
                self.start_verification();
            }
        }
        if let Some(session) = self.verification.as_mut() {
            session.tick(timestamp, self.verifier.as_mut());
        }

        if self.paused || self.over {
            return;
        }
        self.update(dt, input);
    }

    fn record_fps(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        if self.fps_history.len() == FPS_HISTORY_LEN {
            self.fps_history.pop_front();
        }
        self.fps_history.push_back(1.0 / dt);
        let low = self.average_fps() < LOW_PERFORMANCE_FPS;
        self.effects.set_fps_low(low);
    }

    fn update(&mut self, dt: f32, input: &PlayerInput) {
        let now = self.now;
        self.effects.set_clock(now);
        self.collision.update(now);
        self.geometry.maintain(now);

        if self.player.alive {
            self.player.update(
                now,
                dt,
                input,
                &mut self.enemies,
                &mut self.collision,
                &mut self.rng,
                &mut self.effects,
            );
            self.enemies.update(
                self.player.position,
                now,
                dt,
                &mut self.projectiles,
                &mut self.geometry,
                &mut self.rng,
                &mut self.effects,
            );
        }

        let map_size = self.config.map_size();
        for p in self.projectiles.iter_mut() {
            p.update(map_size, dt, &mut self.effects);
        }
        if self.player.alive {
            self.resolve_projectile_hits(now);
        }
        self.projectiles.retain(|p| p.active);

        self.effects.update(now, dt);

        for generation in self.game_over_queue.drain_due(now) {
            if generation == self.generation && !self.player.alive && !self.over {
                self.game_over();
            }
        }
    }

    /// Shield first: a blocked shot never reaches the body.
    fn resolve_projectile_hits(&mut self, now: f64) {
        for p in self.projectiles.iter_mut().filter(|p| p.active && p.is_enemy_projectile) {
            if self.collision.projectile_hits_shield(p, &self.player) {
                p.active = false;
                self.player.block_projectile(now, p.position, p.angle, &mut self.effects);
            } else if self.collision.projectile_hits_player(p, &self.player) {
                p.active = false;
                if self.player.die(now, &mut self.effects) {
                    self.game_over_queue.push(now + self.config.game_over_delay, self.generation);
                    break;
                }
            }
        }
    }

    // ── Session control ───────────────────────────────────────────────────────

    /// Ignored while the player is dead or the game is over.
    pub fn toggle_pause(&mut self) -> bool {
        if !self.player.alive || self.over {
            return false;
        }
        self.paused = !self.paused;
        info!("[game] {}", if self.paused { "paused" } else { "resumed" });
        true
    }

    pub fn toggle_grid(&mut self) {
        self.show_grid = !self.show_grid;
    }

    fn game_over(&mut self) {
        self.over = true;
        self.paused = false;
        let score = self.player.score;
        self.new_high_score = score > self.high_score;
        if self.new_high_score {
            self.high_score = score;
            match self.store.save(score) {
                Ok(()) => info!("[score] new high score {score} saved"),
                Err(err) => warn!("[score] {err}"),
            }
        }
        info!("[game] game over with score {score}");
    }

    /// Start a fresh session.  Pending game-over entries go stale.
    pub fn restart(&mut self) {
        self.generation += 1;
        self.game_over_queue.clear();
        self.player.reset(self.config.map_size() / 2.0, self.now);
        self.enemies.clear();
        self.projectiles.clear();
        self.effects.clear();
        self.collision = CollisionSystem::new(self.config.collision_cache_timeout);
        self.paused = false;
        self.over = false;
        self.new_high_score = false;
        self.verification = None;
        info!("[game] restart (session {})", self.generation);
    }

    /// Submit the final score once per game over.
    pub fn start_verification(&mut self) {
        if !self.over || self.verification.is_some() {
            return;
        }
        self.verification = Some(VerificationSession::start(
            self.player.score,
            self.now,
            self.verifier.as_mut(),
        ));
    }

    /// Map centre, where the player spawns.
    pub fn spawn_point(&self) -> Vec2 {
        self.config.map_size() / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game() -> Game {
        Game::headless(GameConfig::default(), 7)
    }

    fn aim_up() -> PlayerInput {
        PlayerInput {
            aim: Vec2::new(450.0, 0.0),
            ..Default::default()
        }
    }

    fn shoot_player(game: &mut Game) {
        let at = game.player.position;
        let shot = Projectile::new(at, 0.0, 0.0, true, &mut StdRng::seed_from_u64(1));
        game.projectiles.push(shot);
    }

    #[test]
    fn first_frame_and_long_gaps_use_fixed_deltas() {
        let mut g = game();
        g.frame(10.0, &aim_up());
        assert_eq!(g.last_dt(), FIRST_FRAME_DELTA);
        g.frame(12.0, &aim_up());
        assert_eq!(g.last_dt(), MAX_DELTA_TIME);
    }

    #[test]
    fn pause_freezes_simulation() {
        let mut g = game();
        g.frame(0.0, &aim_up());
        let pause = PlayerInput {
            pause_pressed: true,
            ..aim_up()
        };
        g.frame(0.016, &pause);
        assert_eq!(g.phase(), GamePhase::Paused);

        let before = g.player.position;
        let walk = PlayerInput {
            right: true,
            ..aim_up()
        };
        g.frame(0.032, &walk);
        assert_eq!(g.player.position, before);
    }

    #[test]
    fn body_hit_schedules_delayed_game_over() {
        let mut g = game();
        g.frame(0.0, &aim_up());
        shoot_player(&mut g);
        g.frame(0.016, &aim_up());
        assert!(!g.player.alive);
        assert!(!g.is_over());
        assert!(g.pending_game_over());

        g.frame(1.0, &aim_up());
        assert!(!g.is_over());
        g.frame(1.6, &aim_up());
        assert!(g.is_over());
    }

    #[test]
    fn pause_is_ignored_while_dead() {
        let mut g = game();
        g.frame(0.0, &aim_up());
        shoot_player(&mut g);
        g.frame(0.016, &aim_up());
        assert!(!g.toggle_pause());
        assert!(!g.is_paused());
    }

    #[test]
    fn restart_discards_stale_game_over() {
        let mut g = game();
        g.frame(0.0, &aim_up());
        shoot_player(&mut g);
        g.frame(0.016, &aim_up());
        g.frame(0.5, &aim_up());
        g.restart();
        assert_eq!(g.generation(), 1);
        g.frame(2.0, &aim_up());
        assert!(!g.is_over());
        assert!(g.player.alive);
    }

    #[test]
    fn game_over_records_new_high_score() {
        let mut g = game();
        g.frame(0.0, &aim_up());
        g.player.score = 4;
        shoot_player(&mut g);
        g.frame(0.016, &aim_up());
        g.frame(2.0, &aim_up());
        assert!(g.is_over());
        assert!(g.is_new_high_score());
        assert_eq!(g.high_score(), 4);
    }

    #[test]
    fn restart_key_only_works_after_game_over() {
        let mut g = game();
        g.frame(0.0, &aim_up());
        let restart = PlayerInput {
            restart_pressed: true,
            ..aim_up()
        };
        g.frame(0.016, &restart);
        assert_eq!(g.generation(), 0);
    }

    #[test]
    fn blocked_shot_charges_shield() {
        let mut g = game();
        g.frame(0.0, &aim_up());
        let (inner, outer) = crate::collision::shield_band(g.player.radius, 0.016);
        let at = g.player.position - Vec2::new(0.0, (inner + outer) / 2.0);
        g.projectiles
            .push(Projectile::new(at, std::f32::consts::FRAC_PI_2, 0.0, true, &mut StdRng::seed_from_u64(2)));
        g.frame(0.016, &aim_up());
        assert!(g.player.alive);
        assert_eq!(g.player.shield_charge, 1);
        assert!(g.projectiles.is_empty());
    }
}
