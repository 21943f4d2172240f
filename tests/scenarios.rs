//! End-to-end scenarios and cross-module properties, driven only through the
//! public API.
//!
//! Covered:
//! 1. Shot at the player's centre with the shield turned away kills.
//! 2. Shot inside the shield band in front of the shield is blocked.
//! 3. Six blocks in a row enter hook mode with the charge reset.
//! 4. A wave whose enemies all die in one pass completes on that pass.
//! 5. Collision, hexagon, knockback and hook properties.
//! 6. A full session: death, delayed game over, high score, restart.

use std::f32::consts::{PI, TAU};

use bevy::math::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use hexhook::collision::{point_in_hexagon, CollisionSystem};
use hexhook::config::GameConfig;
use hexhook::effects::{NullEffects, RecordingEffects};
use hexhook::enemy::{Enemy, EnemyParams};
use hexhook::game::{Game, GamePhase};
use hexhook::hook::{GrapplingHook, HookParams, HookState};
use hexhook::math::{distance, from_angle, GeometryCache};
use hexhook::player::{Player, PlayerInput};
use hexhook::projectile::Projectile;
use hexhook::waves::EnemyManager;

// ── Helpers ───────────────────────────────────────────────────────────────────

fn rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

fn player_at(x: f32, y: f32) -> Player {
    Player::new(Vec2::new(x, y), &GameConfig::default())
}

fn enemy_shot(at: Vec2) -> Projectile {
    Projectile::new(at, 0.0, 7.0, true, &mut rng(1))
}

// ── Scenarios ─────────────────────────────────────────────────────────────────

#[test]
fn unshielded_hit_kills() {
    let mut player = player_at(100.0, 100.0);
    player.shield_angle = PI;
    let shot = enemy_shot(Vec2::new(100.0, 100.0));
    let mut collision = CollisionSystem::default();

    assert!(!collision.projectile_hits_shield(&shot, &player));
    assert!(collision.projectile_hits_player(&shot, &player));
}

#[test]
fn shield_facing_the_shot_blocks_it() {
    let mut player = player_at(100.0, 100.0);
    let angle = 0.7;
    player.shield_angle = angle;
    // Middle of the shield band at t = 0.
    let shot = enemy_shot(player.position + from_angle(angle) * 66.0);
    let mut collision = CollisionSystem::default();

    assert!(collision.projectile_hits_shield(&shot, &player));
    assert!(!collision.projectile_hits_player(&shot, &player));
}

#[test]
fn six_blocks_enter_hook_mode() {
    let mut player = player_at(450.0, 450.0);
    let mut effects = RecordingEffects::default();

    for i in 1..=6u32 {
        let activated = player.block_projectile(0.1 * f64::from(i), player.position, 0.0, &mut effects);
        assert_eq!(activated, i == 6);
        if i < 6 {
            assert_eq!(player.shield_charge, i);
        }
    }

    assert!(player.invulnerable);
    assert_eq!(player.shield_charge, 0);
    assert!(effects.texts().iter().any(|t| t == "INVULNERABLE!"));
}

#[test]
fn wave_completes_on_the_pass_that_clears_it() {
    let config = GameConfig::default();
    let mut manager = EnemyManager::new(&config);
    let mut projectiles = Vec::new();
    let mut geometry = GeometryCache::new(config.geometry_cache_timeout);
    let mut rng = rng(9);
    let player_pos = config.map_size() / 2.0;

    let mut now = 0.0;
    for step in 0..400 {
        now = f64::from(step) * 0.1;
        manager.update(player_pos, now, 0.1, &mut projectiles, &mut geometry, &mut rng, &mut NullEffects);
        if manager.wave() == 1 && manager.remaining_to_spawn() == 0 {
            break;
        }
    }
    assert_eq!(manager.wave(), 1);
    assert_eq!(manager.enemies_per_wave(), 5);
    assert_eq!(manager.remaining_to_spawn(), 0);
    assert_eq!(manager.active_count(), 5);
    assert!(manager.is_wave_active());

    for enemy in manager.enemies_mut() {
        enemy.active = false;
    }
    manager.update(player_pos, now + 0.1, 0.1, &mut projectiles, &mut geometry, &mut rng, &mut NullEffects);

    assert!(!manager.is_wave_active());
    assert!(manager.enemies().is_empty());
}

// ── Properties ────────────────────────────────────────────────────────────────

#[test]
fn circle_collision_matches_exact_distance() {
    let mut collision = CollisionSystem::default();
    let mut rng = rng(21);
    for _ in 0..500 {
        let c1 = Vec2::new(rng.gen_range(0.0..900.0), rng.gen_range(0.0..900.0));
        let c2 = c1 + Vec2::new(rng.gen_range(-120.0..120.0), rng.gen_range(-120.0..120.0));
        let (r1, r2) = (rng.gen_range(1.0..50.0), rng.gen_range(1.0..50.0));
        let exact = distance(c1, c2) < r1 + r2;
        // Flush the rounding-keyed cache so earlier pairs cannot alias.
        collision.update(collision.now() + 1.0);
        assert_eq!(collision.circle_collision(c1, r1, c2, r2), exact, "{c1} {r1} / {c2} {r2}");
    }
}

#[test]
fn hexagon_containment_is_rotation_equivariant() {
    let mut rng = rng(5);
    let center = Vec2::new(300.0, 300.0);
    for _ in 0..300 {
        let point = center + Vec2::new(rng.gen_range(-40.0..40.0), rng.gen_range(-40.0..40.0));
        let rotation = rng.gen_range(0.0..TAU);
        let turn = rng.gen_range(0.0..TAU);
        let rotated = center + Vec2::from_angle(turn).rotate(point - center);
        // Compare against slightly shrunk/grown hexagons so float error on
        // the edge cannot flip the result.
        if point_in_hexagon(point, center, 29.0, rotation) {
            assert!(point_in_hexagon(rotated, center, 30.0, rotation + turn));
        }
        if !point_in_hexagon(point, center, 31.0, rotation) {
            assert!(!point_in_hexagon(rotated, center, 30.0, rotation + turn));
        }
    }
}

#[test]
fn knockback_on_empty_field_does_nothing() {
    let collision = CollisionSystem::default();
    let mut effects = RecordingEffects::default();
    let hit = collision.apply_knockback(Vec2::ZERO, &mut [], 250.0, 30.0, &mut rng(1), &mut effects);
    assert!(!hit);
    assert!(effects.requests.is_empty());
}

#[test]
fn knockback_reaches_only_enemies_in_range() {
    let collision = CollisionSystem::default();
    let params = EnemyParams::default();
    let mut rng = rng(2);
    let center = Vec2::new(400.0, 400.0);

    let mut near = [Enemy::new(1, center + Vec2::new(100.0, 0.0), 0.0, 1.0, &params, &mut rng)];
    assert!(collision.apply_knockback(center, &mut near, 250.0, 30.0, &mut rng, &mut NullEffects));
    assert!(near[0].knocked_back);
    assert!(near[0].velocity.length() > 0.0);

    let mut far = [Enemy::new(2, center + Vec2::new(260.0, 0.0), 0.0, 1.0, &params, &mut rng)];
    assert!(!collision.apply_knockback(center, &mut far, 250.0, 30.0, &mut rng, &mut NullEffects));
    assert!(!far[0].knocked_back);
    assert_eq!(far[0].velocity, Vec2::ZERO);

    // Exactly on the radius is outside.
    let mut edge = [Enemy::new(3, center + Vec2::new(250.0, 0.0), 0.0, 1.0, &params, &mut rng)];
    assert!(!collision.apply_knockback(center, &mut edge, 250.0, 30.0, &mut rng, &mut NullEffects));
    assert!(!edge[0].knocked_back);
}

#[test]
fn hook_extends_until_range_then_retracts() {
    let mut rng = rng(3);
    let owner = Vec2::new(100.0, 450.0);
    let params = HookParams::default();
    let mut hook = GrapplingHook::new(owner, Vec2::new(800.0, 450.0), params, &mut rng, &mut NullEffects);
    assert_eq!(hook.state, HookState::Extending);

    let mut steps = 0;
    while hook.state == HookState::Extending {
        let before = distance(hook.start, hook.position);
        assert!(before < params.max_distance);
        hook.update(owner, 30.0, &[], 1.0 / 60.0, &mut rng, &mut NullEffects).unwrap();
        steps += 1;
        assert!(steps < 1_000);
    }
    assert_eq!(hook.state, HookState::Retracting);
    assert!(distance(hook.start, hook.position) >= params.max_distance);
}

#[test]
fn invulnerability_expires_exactly_once() {
    let config = GameConfig::default();
    let mut player = Player::new(Vec2::new(450.0, 450.0), &config);
    let mut enemies = EnemyManager::new(&config);
    let mut collision = CollisionSystem::default();
    let mut rng = rng(4);
    player.activate_invulnerability(0.0, &mut NullEffects);

    let mut effects = RecordingEffects::default();
    let input = PlayerInput::default();
    for step in 1..=30 {
        let now = 9.0 + f64::from(step) * 0.1;
        player.update(now, 0.1, &input, &mut enemies, &mut collision, &mut rng, &mut effects);
    }
    assert!(!player.invulnerable);
    let notices = effects.texts().iter().filter(|t| *t == "SHIELD MODE").count();
    assert_eq!(notices, 1);
}

// ── Full session ──────────────────────────────────────────────────────────────

#[test]
fn death_leads_to_game_over_and_restart() {
    let mut game = Game::headless(GameConfig::default(), 11);
    game.player.score = 3;
    let input = PlayerInput::default();
    game.frame(0.0, &input);

    let at = game.player.position;
    game.player.shield_angle = PI;
    game.projectiles.push(Projectile::new(at, 0.0, 0.0, true, &mut rng(1)));
    game.frame(0.05, &input);
    assert!(!game.player.alive);
    assert!(game.pending_game_over());
    assert_eq!(game.phase(), GamePhase::Playing);

    let mut t = 0.05;
    while t < 1.5 {
        t += 0.05;
        game.frame(t, &input);
    }
    game.frame(1.7, &input);
    assert_eq!(game.phase(), GamePhase::Over);
    assert_eq!(game.high_score(), 3);
    assert!(game.is_new_high_score());

    let restart = PlayerInput {
        restart_pressed: true,
        ..Default::default()
    };
    game.frame(1.8, &restart);
    assert_eq!(game.phase(), GamePhase::Playing);
    assert!(game.player.alive);
    assert_eq!(game.score(), 0);
    assert_eq!(game.high_score(), 3);
    assert!(game.projectiles.is_empty());
}
