use super::*;

/// Spawn the pause overlay over the frozen arena.
///
/// ```text
/// ┌───────────────────────────────┐
/// │           PAUSED              │
/// │  Press ESC or P to resume     │
/// └───────────────────────────────┘
/// ```
pub fn setup_pause_menu(mut commands: Commands) {
    spawn_overlay(&mut commands, PauseMenuRoot, 200, card_border(), |card| {
        label(card, "PAUSED", 38.0, title_color());
        spacer(card, 4.0);
        label(card, "Press ESC or P to resume", 16.0, hint_color());
    });
}

pub fn cleanup_pause_menu(mut commands: Commands, query: Query<Entity, With<PauseMenuRoot>>) {
    for entity in query.iter() {
        commands.entity(entity).despawn();
    }
}
