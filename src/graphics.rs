use bevy::prelude::*;

/// Setup camera for 2D rendering.
///
/// The default `Camera2d` projection maps one world unit to one pixel, so a
/// window the size of the map shows the whole arena.
pub fn setup_camera(mut commands: Commands) {
    commands.spawn(Camera2d);
    eprintln!("[SETUP] Camera spawned");
}
