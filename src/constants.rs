//! Centralised gameplay constants.
//!
//! Every tunable default lives here so it can be found and changed in one
//! place.  [`crate::config::GameConfig`] mirrors these values and lets
//! `assets/game.toml` override any subset of them at startup.
//!
//! ## Units
//!
//! Speeds and per-frame rates are expressed in *frame units*: the amount applied
//! per frame at the 60 fps baseline.  The game loop multiplies them by
//! `time_scale = dt * 60`, so they stay framerate independent.  Every timer
//! (cooldown, duration, interval) is in seconds.

// ── Frame Timing ──────────────────────────────────────────────────────────────

/// Largest delta time (s) fed into one update.  Equivalent to a 10 fps floor.
///
/// Larger steps let fast movers (hook at 20 px per frame unit) tunnel through
/// enemies even with the swept test.
pub const MAX_DELTA_TIME: f32 = 0.1;

/// Delta time used on the very first frame, before a previous timestamp exists.
pub const FIRST_FRAME_DELTA: f32 = 0.016;

/// Baseline frame rate that all frame-unit speeds are normalised against.
pub const BASELINE_FPS: f32 = 60.0;

/// Number of frames in the rolling FPS average.
pub const FPS_HISTORY_LEN: usize = 60;

/// Rolling FPS below which effects switch to low-performance mode.
pub const LOW_PERFORMANCE_FPS: f32 = 40.0;

/// Rolling FPS below which the background grid is hidden entirely.
pub const GRID_HIDE_FPS: f32 = 30.0;

// ── Map ───────────────────────────────────────────────────────────────────────

/// Width of the square play field (px).
pub const MAP_WIDTH: f32 = 900.0;

/// Height of the square play field (px).
pub const MAP_HEIGHT: f32 = 900.0;

/// Background grid cell size (px).
pub const GRID_CELL_SIZE: f32 = 50.0;

/// Grid cell size used while effects run in low-performance mode (px).
pub const GRID_CELL_SIZE_LOW_PERF: f32 = 100.0;

// ── Player ────────────────────────────────────────────────────────────────────

/// Player hexagon circumradius (px).  Also the body collision radius.
pub const PLAYER_RADIUS: f32 = 30.0;

/// Player movement speed (px per frame unit).
pub const PLAYER_SPEED: f32 = 6.5;

/// Multiplier on [`PLAYER_SPEED`] while the hook drags the player to an enemy.
pub const PLAYER_PULL_SPEED_FACTOR: f32 = 2.5;

/// Cosmetic hexagon spin (rad per frame unit).
pub const PLAYER_SPIN_RATE: f32 = 0.01;

/// Blocks required to enter hook mode.
pub const MAX_SHIELD_CHARGE: u32 = 6;

/// Hook-mode invulnerability length (s).
pub const INVULNERABILITY_DURATION: f64 = 10.0;

/// Window after `reset` during which `die` is ignored (s).
pub const DEATH_SUPPRESSION_WINDOW: f64 = 0.1;

// ── Shield ────────────────────────────────────────────────────────────────────

/// Gap between the player body and the shield band, as a fraction of the radius.
pub const SHIELD_DISTANCE_FACTOR: f32 = 1.2;

/// Shield band thickness as a fraction of the player radius.
pub const SHIELD_THICKNESS_FACTOR: f32 = 0.4;

/// Angular coverage of the shield (rad).
pub const SHIELD_ARC: f32 = std::f32::consts::FRAC_PI_2;

/// Widening applied to [`SHIELD_ARC`] when testing projectile hits.
pub const SHIELD_ARC_FORGIVENESS: f32 = 1.1;

/// Angular frequency of the shield pulse (rad/s).  One period is ~1.26 s.
pub const SHIELD_PULSE_RATE: f64 = 5.0;

/// Amplitude of the shield thickness pulse (fraction of nominal thickness).
pub const SHIELD_PULSE_AMPLITUDE: f32 = 0.2;

// ── Grappling Hook ────────────────────────────────────────────────────────────

/// Hook travel speed while extending (px per frame unit).
pub const HOOK_SPEED: f32 = 20.0;

/// Distance from the firing point at which an extending hook turns back (px).
pub const HOOK_MAX_DISTANCE: f32 = 800.0;

/// Hook head collision radius (px).
pub const HOOK_HITBOX_RADIUS: f32 = 15.0;

/// Retract speed multiplier relative to [`HOOK_SPEED`].
pub const HOOK_RETRACT_FACTOR: f32 = 1.5;

/// Number of chain segments drawn between player and hook head.
pub const HOOK_CHAIN_SEGMENTS: usize = 8;

// ── Knockback ─────────────────────────────────────────────────────────────────

/// Radius around a kill inside which enemies are knocked back (px).
pub const KNOCKBACK_RADIUS: f32 = 250.0;

/// Peak knockback force at the centre of the blast.
pub const KNOCKBACK_FORCE: f32 = 30.0;

/// Knockback length in frame units (60 = one second at baseline).
pub const KNOCKBACK_FRAMES: f32 = 60.0;

/// Nearest enemies that receive crowding jitter and the full effect set.
pub const KNOCKBACK_DETAILED_COUNT: usize = 3;

// ── Enemy ─────────────────────────────────────────────────────────────────────

/// Enemy body radius (px).
pub const ENEMY_RADIUS: f32 = 25.0;

/// Barrel length as a fraction of the enemy radius.
pub const ENEMY_BARREL_FACTOR: f32 = 0.8;

/// Divisor applied to the player speed to derive the base enemy speed.
pub const ENEMY_SPEED_DIVISOR: f32 = 2.5;

/// Aim smoothing rate (fraction of remaining angle per frame unit).
pub const ENEMY_AIM_SMOOTHING: f32 = 0.1;

/// Per-frame-unit velocity retention while knocked back.
pub const ENEMY_KNOCKBACK_DECAY: f32 = 0.98;

/// Delay between spawning and the first shot (s).
pub const ENEMY_INITIAL_SHOT_DELAY: f64 = 1.0;

/// Lower bound of the randomized shot cooldown (s).
pub const ENEMY_SHOT_COOLDOWN_MIN: f64 = 1.5;

/// Upper bound of the randomized shot cooldown (s).
pub const ENEMY_SHOT_COOLDOWN_MAX: f64 = 3.0;

// ── Projectile ────────────────────────────────────────────────────────────────

/// Enemy projectile speed (px per frame unit).
pub const PROJECTILE_SPEED: f32 = 7.0;

/// Nominal projectile radius before pulsing (px).
pub const PROJECTILE_RADIUS: f32 = 8.0;

/// Projectile lifetime (s).  Out-of-bounds culling usually fires first.
pub const PROJECTILE_LIFETIME: f32 = 10.0;

/// Frame units between trail particles.
pub const PROJECTILE_TRAIL_INTERVAL: f32 = 2.0;

// ── Waves ─────────────────────────────────────────────────────────────────────

/// Quiet period between waves (s).  The first wave also waits this long.
pub const WAVE_COOLDOWN: f64 = 5.0;

/// Final seconds of the cooldown that show a countdown banner.
pub const WAVE_COUNTDOWN_SECONDS: f64 = 3.0;

/// Enemies in the first wave.
pub const WAVE_BASE_SIZE: f32 = 5.0;

/// Extra enemies per subsequent wave (floored after multiplying).
pub const WAVE_GROWTH: f32 = 1.5;

/// Spawn interval at wave one (s).
pub const WAVE_SPAWN_INTERVAL_START: f64 = 3.0;

/// Spawn interval reduction per wave (s).
pub const WAVE_SPAWN_INTERVAL_STEP: f64 = 0.2;

/// Fastest spawn interval reachable by wave progression (s).
pub const WAVE_SPAWN_INTERVAL_MIN: f64 = 0.5;

/// Concurrent enemy cap at difficulty 1.0.
pub const BASE_MAX_ENEMIES: usize = 10;

/// Absolute concurrent enemy cap.
pub const HARD_MAX_ENEMIES: usize = 20;

/// Game time (s) over which difficulty rises by 1.0.
pub const DIFFICULTY_RAMP_SECS: f32 = 60.0;

/// Maximum difficulty bonus on top of 1.0.
pub const DIFFICULTY_MAX_BONUS: f32 = 2.0;

/// Corner padding for spawn placement (px).
pub const SPAWN_CORNER_PADDING: f32 = 100.0;

// ── Continuous spawn policy ───────────────────────────────────────────────────

/// Initial interval of the continuous spawn policy (s).
pub const CONTINUOUS_SPAWN_INTERVAL: f64 = 3.0;

/// Interval reduction after each continuous spawn (s).
pub const CONTINUOUS_SPAWN_STEP: f64 = 0.05;

/// Fastest interval of the continuous policy (s).
pub const CONTINUOUS_SPAWN_MIN: f64 = 1.0;

/// Play time after which the continuous policy starts raising its cap (s).
pub const CONTINUOUS_CAP_GROWTH_AFTER: f64 = 60.0;

/// Seconds of play per extra enemy of cap under the continuous policy.
pub const CONTINUOUS_CAP_GROWTH_PERIOD: f64 = 30.0;

// ── Caches ────────────────────────────────────────────────────────────────────

/// Collision result cache lifetime (s).  The whole cache is dropped at once.
pub const COLLISION_CACHE_TIMEOUT: f64 = 0.1;

/// Geometry memo (distance/angle/sin/cos) lifetime (s).
pub const GEOMETRY_CACHE_TIMEOUT: f64 = 30.0;

// ── Game flow ─────────────────────────────────────────────────────────────────

/// Delay between the player's death and the game-over screen (s).
pub const GAME_OVER_DELAY: f64 = 1.5;

// ── Effects ───────────────────────────────────────────────────────────────────

/// Particle cap (halved in low-performance mode).
pub const MAX_PARTICLES: usize = 200;

/// Explosion cap (halved in low-performance mode).
pub const MAX_EXPLOSIONS: usize = 10;

/// Ambient background motes kept alive.
pub const MAX_BACKGROUND_PARTICLES: usize = 30;

/// Live effect count above which low-performance mode is forced.
pub const LOW_PERFORMANCE_EFFECT_COUNT: usize = 250;

/// Interval between effect-load checks (s).
pub const EFFECT_LOAD_CHECK_INTERVAL: f64 = 1.0;

/// Lifetime of a floating text (frame units).
pub const FLOATING_TEXT_LIFE: f32 = 60.0;

/// Baseline duration used to scale the shake falloff (s).
pub const SCREEN_SHAKE_FALLOFF: f32 = 0.3;

// ── Verification ──────────────────────────────────────────────────────────────

/// Poll period while a verification job is processing (s).
pub const VERIFY_POLL_INTERVAL: f64 = 5.0;

/// Retry period after a failed poll (s).
pub const VERIFY_RETRY_INTERVAL: f64 = 10.0;

// ── UI ────────────────────────────────────────────────────────────────────────

/// HUD font size (px).
pub const HUD_FONT_SIZE: f32 = 20.0;
