//! Screen state machine: `GameState`, the pause and game-over overlays, and
//! `MenuPlugin`.
//!
//! The [`Game`] resource owns pause and game-over; `GameState` mirrors
//! [`Game::phase`] once per frame so overlays can hang off
//! `OnEnter`/`OnExit`.
//!
//! ## States
//!
//! | State      | Description                                   |
//! |------------|-----------------------------------------------|
//! | `Playing`  | Initial state; simulation advancing           |
//! | `Paused`   | Simulation frozen; pause overlay shown        |
//! | `GameOver` | Player destroyed; final score + verify prompt |
//!
//! ## Systems (registered by `MenuPlugin`)
//!
//! | System                      | Schedule               | Purpose                          |
//! |-----------------------------|------------------------|----------------------------------|
//! | `setup_pause_menu`          | `OnEnter(Paused)`      | Spawn pause overlay              |
//! | `cleanup_pause_menu`        | `OnExit(Paused)`       | Despawn pause overlay            |
//! | `setup_game_over`           | `OnEnter(GameOver)`    | Spawn game-over overlay          |
//! | `cleanup_game_over`         | `OnExit(GameOver)`     | Despawn game-over overlay        |
//! | `verification_status_system`| `Update / in GameOver` | Mirror verification progress     |
//!
//! [`sync_game_state_system`] is scheduled by the simulation plugin, right
//! after the frame step.

use bevy::ecs::hierarchy::ChildSpawnerCommands;
use bevy::prelude::*;

use crate::game::{Game, GamePhase};

mod game_over;
mod pause;

pub use game_over::*;
pub use pause::*;

// ── Game state ────────────────────────────────────────────────────────────────

#[derive(States, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GameState {
    #[default]
    Playing,
    Paused,
    GameOver,
}

impl From<GamePhase> for GameState {
    fn from(phase: GamePhase) -> Self {
        match phase {
            GamePhase::Playing => GameState::Playing,
            GamePhase::Paused => GameState::Paused,
            GamePhase::Over => GameState::GameOver,
        }
    }
}

// ── Component markers ─────────────────────────────────────────────────────────

/// Root node of the pause overlay; despawned on `OnExit(Paused)`.
#[derive(Component)]
pub struct PauseMenuRoot;

/// Root node of the game-over overlay; despawned on `OnExit(GameOver)`.
#[derive(Component)]
pub struct GameOverRoot;

/// The game-over line that mirrors verification progress.
#[derive(Component)]
pub struct VerificationStatusText;

// ── Plugin ────────────────────────────────────────────────────────────────────

/// Registers `GameState` and the overlay setup/teardown systems.
///
/// Must be added before any plugin that uses `in_state(GameState::..)`.
pub struct MenuPlugin;

impl Plugin for MenuPlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<GameState>()
            .add_systems(OnEnter(GameState::Paused), setup_pause_menu)
            .add_systems(OnExit(GameState::Paused), cleanup_pause_menu)
            .add_systems(OnEnter(GameState::GameOver), setup_game_over)
            .add_systems(OnExit(GameState::GameOver), cleanup_game_over)
            .add_systems(
                Update,
                verification_status_system.run_if(in_state(GameState::GameOver)),
            );
    }
}

/// Request a transition whenever the simulation's phase differs from the
/// current screen state.
pub fn sync_game_state_system(
    game: Res<Game>,
    state: Res<State<GameState>>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    let wanted = GameState::from(game.phase());
    if *state.get() != wanted {
        info!("[state] {:?} -> {:?}", state.get(), wanted);
        next_state.set(wanted);
    }
}

// ── Colour helpers ────────────────────────────────────────────────────────────

fn overlay_bg() -> Color {
    Color::srgba(0.0, 0.0, 0.0, 0.70)
}
fn card_bg() -> Color {
    Color::srgb(0.04, 0.04, 0.07)
}
fn card_border() -> Color {
    Color::srgb(0.30, 0.30, 0.46)
}
fn title_color() -> Color {
    Color::srgb(0.95, 0.88, 0.45)
}
fn subtitle_color() -> Color {
    Color::srgb(0.55, 0.55, 0.65)
}
fn hint_color() -> Color {
    Color::srgb(0.45, 0.45, 0.55)
}
fn danger_color() -> Color {
    Color::srgb(1.0, 0.22, 0.22)
}
fn highlight_color() -> Color {
    Color::srgb(1.0, 0.84, 0.0)
}

fn spacer(parent: &mut ChildSpawnerCommands<'_>, px: f32) {
    parent.spawn(Node {
        height: Val::Px(px),
        ..default()
    });
}

fn label(parent: &mut ChildSpawnerCommands<'_>, text: impl Into<String>, size: f32, color: Color) {
    parent.spawn((
        Text::new(text),
        TextFont {
            font_size: size,
            ..default()
        },
        TextColor(color),
    ));
}

/// Full-screen dim overlay with a centred card; `fill` populates the card.
fn spawn_overlay<M: Component>(
    commands: &mut Commands,
    root: M,
    z: i32,
    border: Color,
    fill: impl FnOnce(&mut ChildSpawnerCommands<'_>),
) {
    commands
        .spawn((
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                position_type: PositionType::Absolute,
                left: Val::Px(0.0),
                top: Val::Px(0.0),
                ..default()
            },
            BackgroundColor(overlay_bg()),
            ZIndex(z),
            root,
        ))
        .with_children(|overlay| {
            overlay
                .spawn((
                    Node {
                        flex_direction: FlexDirection::Column,
                        align_items: AlignItems::Center,
                        padding: UiRect::all(Val::Px(36.0)),
                        row_gap: Val::Px(12.0),
                        border: UiRect::all(Val::Px(2.0)),
                        min_width: Val::Px(300.0),
                        ..default()
                    },
                    BackgroundColor(card_bg()),
                    BorderColor::all(border),
                ))
                .with_children(fill);
        });
}
