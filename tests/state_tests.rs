//! Headless tests for [`GameState`] and its sync with the simulation.
//!
//! These use [`MinimalPlugins`] (no window, no rendering) so they run fast
//! and deterministically in CI.
//!
//! Covered scenarios:
//! 1. Default initial state is `Playing`.
//! 2. Pausing the game moves the state to `Paused` and spawns the overlay.
//! 3. Resuming despawns the pause overlay.
//! 4. Player death reaches `GameOver` only after the game-over delay.
//! 5. Restart from `GameOver` returns to `Playing` and clears the overlay.

use bevy::prelude::*;
use bevy::state::app::StatesPlugin;

use hexhook::config::GameConfig;
use hexhook::game::Game;
use hexhook::menu::{
    sync_game_state_system, GameOverRoot, GameState, MenuPlugin, PauseMenuRoot, VerificationStatusText,
};
use hexhook::player::PlayerInput;
use hexhook::projectile::Projectile;
use rand::rngs::StdRng;
use rand::SeedableRng;

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Headless app with the menu plugin, a seeded game, and the state sync.
fn app() -> App {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, StatesPlugin))
        .add_plugins(MenuPlugin)
        .insert_resource(Game::headless(GameConfig::default(), 17))
        .add_systems(Update, sync_game_state_system);
    app
}

/// Run enough frames for a requested transition to be applied.
fn settle(app: &mut App) {
    app.update();
    app.update();
}

fn state(app: &App) -> GameState {
    *app.world().resource::<State<GameState>>().get()
}

fn count<C: Component>(app: &mut App) -> usize {
    app.world_mut().query_filtered::<Entity, With<C>>().iter(app.world()).count()
}

/// Kill the player and step the core past the game-over delay.
fn finish_run(app: &mut App) {
    let mut game = app.world_mut().resource_mut::<Game>();
    let input = PlayerInput::default();
    game.frame(0.0, &input);
    let at = game.player.position;
    game.player.shield_angle = std::f32::consts::PI;
    game.projectiles
        .push(Projectile::new(at, 0.0, 0.0, true, &mut StdRng::seed_from_u64(1)));
    game.frame(0.05, &input);
    assert!(!game.player.alive);

    let mut t = 0.05;
    while t < 2.0 {
        t += 0.05;
        game.frame(t, &input);
    }
    assert!(game.is_over());
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[test]
fn default_state_is_playing() {
    let mut app = app();
    app.update();
    assert_eq!(state(&app), GameState::Playing);
    assert_eq!(count::<PauseMenuRoot>(&mut app), 0);
}

#[test]
fn pausing_the_game_shows_the_overlay() {
    let mut app = app();
    app.update();

    assert!(app.world_mut().resource_mut::<Game>().toggle_pause());
    settle(&mut app);
    assert_eq!(state(&app), GameState::Paused);
    assert_eq!(count::<PauseMenuRoot>(&mut app), 1);

    assert!(app.world_mut().resource_mut::<Game>().toggle_pause());
    settle(&mut app);
    assert_eq!(state(&app), GameState::Playing);
    assert_eq!(count::<PauseMenuRoot>(&mut app), 0);
}

#[test]
fn death_reaches_game_over() {
    let mut app = app();
    app.update();
    finish_run(&mut app);
    settle(&mut app);

    assert_eq!(state(&app), GameState::GameOver);
    assert_eq!(count::<GameOverRoot>(&mut app), 1);
    assert_eq!(count::<VerificationStatusText>(&mut app), 1);
}

#[test]
fn verification_status_reaches_the_overlay() {
    let mut app = app();
    app.update();
    finish_run(&mut app);
    settle(&mut app);

    app.world_mut().resource_mut::<Game>().start_verification();
    app.update();

    let texts: Vec<String> = app
        .world_mut()
        .query_filtered::<&Text, With<VerificationStatusText>>()
        .iter(app.world())
        .map(|t| t.0.clone())
        .collect();
    assert_eq!(texts.len(), 1);
    assert!(!texts[0].is_empty());
}

#[test]
fn restart_leaves_game_over() {
    let mut app = app();
    app.update();
    finish_run(&mut app);
    settle(&mut app);
    assert_eq!(state(&app), GameState::GameOver);

    app.world_mut().resource_mut::<Game>().restart();
    settle(&mut app);
    assert_eq!(state(&app), GameState::Playing);
    assert_eq!(count::<GameOverRoot>(&mut app), 0);
}
