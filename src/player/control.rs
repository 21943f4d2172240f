//! Player input: the [`PlayerInput`] snapshot and the Bevy system that fills it.
//!
//! ## Pipeline
//!
//! 1. [`collect_player_input_system`] samples keyboard, mouse and cursor into
//!    the [`PlayerInput`] resource.
//! 2. The game step consumes the snapshot and clears its edge flags with
//!    [`PlayerInput::clear_edges`].
//!
//! The core never touches Bevy input directly, so tests drive the simulation
//! by filling a `PlayerInput` by hand.

use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::config::GameConfig;

/// One frame of player intent, in map space.
///
/// Held flags (`up`, `down`, ...) mirror the keys currently down.  Edge flags
/// (`fire_pressed`, `pause_pressed`, ...) latch until the next game step
/// consumes them, so a press between two steps is never lost.
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct PlayerInput {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    /// Pointer position (map space).
    pub aim: Vec2,
    pub fire_pressed: bool,
    pub fire_released: bool,
    pub pause_pressed: bool,
    pub grid_pressed: bool,
    pub restart_pressed: bool,
    pub verify_pressed: bool,
}

impl PlayerInput {
    /// Normalized movement direction in map space (+y down).
    pub fn movement(&self) -> Vec2 {
        let mut dir = Vec2::ZERO;
        if self.up {
            dir.y -= 1.0;
        }
        if self.down {
            dir.y += 1.0;
        }
        if self.left {
            dir.x -= 1.0;
        }
        if self.right {
            dir.x += 1.0;
        }
        dir.normalize_or_zero()
    }

    /// Reset the one-shot flags after a step has seen them.
    pub fn clear_edges(&mut self) {
        self.fire_pressed = false;
        self.fire_released = false;
        self.pause_pressed = false;
        self.grid_pressed = false;
        self.restart_pressed = false;
        self.verify_pressed = false;
    }
}

/// Map a window cursor position (logical px, origin top-left) into map space.
///
/// The window may be resized, so the cursor is rescaled to the fixed map.
pub fn cursor_to_map(cursor: Vec2, window_size: Vec2, map_size: Vec2) -> Vec2 {
    if window_size.x <= 0.0 || window_size.y <= 0.0 {
        return cursor;
    }
    cursor * map_size / window_size
}

/// Sample keyboard and mouse into [`PlayerInput`].
///
/// - **WASD / arrows** → movement flags
/// - **Esc / P** → pause toggle
/// - **G** → grid toggle
/// - **R** / **V** → restart / verify (only honoured on the game-over screen)
/// - **Left mouse** → press fires the hook, release recalls it
pub fn collect_player_input_system(
    keys: Res<ButtonInput<KeyCode>>,
    mouse: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    config: Res<GameConfig>,
    mut input: ResMut<PlayerInput>,
) {
    input.up = keys.any_pressed([KeyCode::KeyW, KeyCode::ArrowUp]);
    input.down = keys.any_pressed([KeyCode::KeyS, KeyCode::ArrowDown]);
    input.left = keys.any_pressed([KeyCode::KeyA, KeyCode::ArrowLeft]);
    input.right = keys.any_pressed([KeyCode::KeyD, KeyCode::ArrowRight]);

    if keys.any_just_pressed([KeyCode::Escape, KeyCode::KeyP]) {
        input.pause_pressed = true;
    }
    if keys.just_pressed(KeyCode::KeyG) {
        input.grid_pressed = true;
    }
    if keys.just_pressed(KeyCode::KeyR) {
        input.restart_pressed = true;
    }
    if keys.just_pressed(KeyCode::KeyV) {
        input.verify_pressed = true;
    }

    if mouse.just_pressed(MouseButton::Left) {
        input.fire_pressed = true;
    }
    if mouse.just_released(MouseButton::Left) {
        input.fire_released = true;
    }

    let Ok(window) = windows.single() else {
        return;
    };
    if let Some(cursor) = window.cursor_position() {
        input.aim = cursor_to_map(
            cursor,
            Vec2::new(window.width(), window.height()),
            config.map_size(),
        );
    }
}
