//! Runtime gameplay configuration loaded from `assets/game.toml`.
//!
//! [`GameConfig`] is a Bevy [`Resource`] that mirrors the tunables in
//! [`crate::constants`].  At startup, [`load_game_config`] reads
//! `assets/game.toml` and overwrites the defaults with any values present in
//! the file.  Missing keys fall back to the compile-time defaults, so a minimal
//! TOML can override just the values you care about.
//!
//! ## Tuning workflow
//!
//! 1. Edit `assets/game.toml`.
//! 2. Restart the game; no recompilation required.
//! 3. Out-of-range values are reported and the whole file is ignored.
//!
//! Keep `src/constants.rs` in sync: it remains the **authoritative default**
//! source used by `GameConfig::default()`.

use crate::constants::*;
use crate::error::{ensure_positive, ensure_within, GameResult};
use bevy::prelude::*;
use serde::Deserialize;

/// How the enemy manager decides when to spawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SpawnPolicy {
    /// Discrete waves separated by a cooldown.
    #[default]
    Waves,
    /// Legacy steady trickle with a shrinking interval.
    Continuous,
}

/// Runtime-tunable gameplay configuration.
///
/// All fields default to the corresponding compile-time constant from
/// `src/constants.rs`.  Override any subset in `assets/game.toml`.
#[derive(Resource, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // ── Map ───────────────────────────────────────────────────────────────────
    pub map_width: f32,
    pub map_height: f32,
    pub grid_cell_size: f32,

    // ── Player ────────────────────────────────────────────────────────────────
    pub player_radius: f32,
    pub player_speed: f32,
    pub max_shield_charge: u32,
    pub invulnerability_duration: f64,

    // ── Hook ──────────────────────────────────────────────────────────────────
    pub hook_speed: f32,
    pub hook_max_distance: f32,
    pub hook_hitbox_radius: f32,

    // ── Knockback ─────────────────────────────────────────────────────────────
    pub knockback_radius: f32,
    pub knockback_force: f32,

    // ── Enemy ─────────────────────────────────────────────────────────────────
    pub enemy_radius: f32,
    pub enemy_initial_shot_delay: f64,
    pub enemy_shot_cooldown_min: f64,
    pub enemy_shot_cooldown_max: f64,
    pub projectile_speed: f32,
    pub projectile_lifetime: f32,

    // ── Waves ─────────────────────────────────────────────────────────────────
    pub spawn_policy: SpawnPolicy,
    pub wave_cooldown: f64,
    pub wave_base_size: f32,
    pub wave_growth: f32,
    pub wave_spawn_interval_start: f64,
    pub wave_spawn_interval_min: f64,
    pub base_max_enemies: usize,
    pub hard_max_enemies: usize,

    // ── Caches ────────────────────────────────────────────────────────────────
    pub collision_cache_timeout: f64,
    pub geometry_cache_timeout: f64,

    // ── Game flow ─────────────────────────────────────────────────────────────
    pub game_over_delay: f64,

    // ── Effects ───────────────────────────────────────────────────────────────
    pub max_particles: usize,
    pub max_explosions: usize,

    // ── UI ────────────────────────────────────────────────────────────────────
    pub hud_font_size: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            // Map
            map_width: MAP_WIDTH,
            map_height: MAP_HEIGHT,
            grid_cell_size: GRID_CELL_SIZE,
            // Player
            player_radius: PLAYER_RADIUS,
            player_speed: PLAYER_SPEED,
            max_shield_charge: MAX_SHIELD_CHARGE,
            invulnerability_duration: INVULNERABILITY_DURATION,
            // Hook
            hook_speed: HOOK_SPEED,
            hook_max_distance: HOOK_MAX_DISTANCE,
            hook_hitbox_radius: HOOK_HITBOX_RADIUS,
            // Knockback
            knockback_radius: KNOCKBACK_RADIUS,
            knockback_force: KNOCKBACK_FORCE,
            // Enemy
            enemy_radius: ENEMY_RADIUS,
            enemy_initial_shot_delay: ENEMY_INITIAL_SHOT_DELAY,
            enemy_shot_cooldown_min: ENEMY_SHOT_COOLDOWN_MIN,
            enemy_shot_cooldown_max: ENEMY_SHOT_COOLDOWN_MAX,
            projectile_speed: PROJECTILE_SPEED,
            projectile_lifetime: PROJECTILE_LIFETIME,
            // Waves
            spawn_policy: SpawnPolicy::Waves,
            wave_cooldown: WAVE_COOLDOWN,
            wave_base_size: WAVE_BASE_SIZE,
            wave_growth: WAVE_GROWTH,
            wave_spawn_interval_start: WAVE_SPAWN_INTERVAL_START,
            wave_spawn_interval_min: WAVE_SPAWN_INTERVAL_MIN,
            base_max_enemies: BASE_MAX_ENEMIES,
            hard_max_enemies: HARD_MAX_ENEMIES,
            // Caches
            collision_cache_timeout: COLLISION_CACHE_TIMEOUT,
            geometry_cache_timeout: GEOMETRY_CACHE_TIMEOUT,
            // Game flow
            game_over_delay: GAME_OVER_DELAY,
            // Effects
            max_particles: MAX_PARTICLES,
            max_explosions: MAX_EXPLOSIONS,
            // UI
            hud_font_size: HUD_FONT_SIZE,
        }
    }
}

impl GameConfig {
    /// Map extent as a vector (`width`, `height`).
    pub fn map_size(&self) -> Vec2 {
        Vec2::new(self.map_width, self.map_height)
    }

    /// Reject values that would break the simulation.
    ///
    /// The spawn corners need at least three paddings of room on each axis, and
    /// the hook must be able to leave the player before it can turn back.
    pub fn validate(&self) -> GameResult<()> {
        ensure_within(
            "map_width",
            self.map_width as f64,
            (SPAWN_CORNER_PADDING * 4.0) as f64,
            10_000.0,
            "[400, 10000]",
        )?;
        ensure_within(
            "map_height",
            self.map_height as f64,
            (SPAWN_CORNER_PADDING * 4.0) as f64,
            10_000.0,
            "[400, 10000]",
        )?;
        ensure_positive("grid_cell_size", self.grid_cell_size as f64)?;
        ensure_positive("player_radius", self.player_radius as f64)?;
        ensure_positive("player_speed", self.player_speed as f64)?;
        ensure_within(
            "max_shield_charge",
            self.max_shield_charge as f64,
            1.0,
            100.0,
            "[1, 100]",
        )?;
        ensure_positive("invulnerability_duration", self.invulnerability_duration)?;
        ensure_positive("hook_speed", self.hook_speed as f64)?;
        ensure_within(
            "hook_max_distance",
            self.hook_max_distance as f64,
            self.player_radius as f64,
            f64::MAX,
            "[player_radius, ∞)",
        )?;
        ensure_positive("hook_hitbox_radius", self.hook_hitbox_radius as f64)?;
        ensure_positive("knockback_radius", self.knockback_radius as f64)?;
        ensure_positive("enemy_radius", self.enemy_radius as f64)?;
        ensure_positive("enemy_shot_cooldown_min", self.enemy_shot_cooldown_min)?;
        ensure_within(
            "enemy_shot_cooldown_max",
            self.enemy_shot_cooldown_max,
            self.enemy_shot_cooldown_min,
            f64::MAX,
            "[enemy_shot_cooldown_min, ∞)",
        )?;
        ensure_positive("projectile_speed", self.projectile_speed as f64)?;
        ensure_positive("projectile_lifetime", self.projectile_lifetime as f64)?;
        ensure_positive("wave_cooldown", self.wave_cooldown)?;
        ensure_within(
            "wave_base_size",
            self.wave_base_size as f64,
            1.0,
            1000.0,
            "[1, 1000]",
        )?;
        ensure_positive("wave_spawn_interval_min", self.wave_spawn_interval_min)?;
        ensure_within(
            "base_max_enemies",
            self.base_max_enemies as f64,
            1.0,
            self.hard_max_enemies as f64,
            "[1, hard_max_enemies]",
        )?;
        ensure_positive("collision_cache_timeout", self.collision_cache_timeout)?;
        ensure_positive("geometry_cache_timeout", self.geometry_cache_timeout)?;
        ensure_within(
            "game_over_delay",
            self.game_over_delay,
            0.0,
            60.0,
            "[0, 60]",
        )?;
        Ok(())
    }
}

/// Read and validate a config file, falling back to defaults on any problem.
///
/// Returns the config to use plus a one-line status for the startup log.
pub fn load_from_path(path: &str) -> (GameConfig, String) {
    match std::fs::read_to_string(path) {
        Ok(contents) => match toml::from_str::<GameConfig>(&contents) {
            Ok(loaded) => match loaded.validate() {
                Ok(()) => (loaded, format!("✓ Loaded game config from {path}")),
                Err(e) => (
                    GameConfig::default(),
                    format!("⚠ Rejected {path}: {e}; using defaults"),
                ),
            },
            Err(e) => (
                GameConfig::default(),
                format!("⚠ Failed to parse {path}: {e}; using defaults"),
            ),
        },
        Err(_) => (
            GameConfig::default(),
            format!("ℹ No {path} found; using compiled defaults"),
        ),
    }
}

/// Startup system: attempt to load `assets/game.toml` into the
/// [`GameConfig`] resource.
///
/// Missing keys retain their compiled defaults.  Parse and validation errors
/// are printed to stderr but never abort startup.
pub fn load_game_config(mut config: ResMut<GameConfig>) {
    let (loaded, status) = load_from_path("assets/game.toml");
    if status.starts_with('⚠') {
        eprintln!("{status}");
    } else {
        println!("{status}");
    }
    *config = loaded;
}
