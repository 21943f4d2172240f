use super::*;

/// Spawn the game-over overlay: final score, high-score notice, and the
/// restart / verify prompts.
pub fn setup_game_over(mut commands: Commands, game: Res<Game>) {
    let score = game.score();
    let new_best = game.is_new_high_score();
    let status = game.verification_status().unwrap_or_default().to_string();

    spawn_overlay(
        &mut commands,
        GameOverRoot,
        300,
        Color::srgb(0.55, 0.10, 0.10),
        |card| {
            label(card, "GAME OVER", 46.0, danger_color());
            spacer(card, 4.0);
            label(card, format!("Final Score: {score}"), 22.0, title_color());
            if new_best {
                label(card, "NEW HIGH SCORE!", 20.0, highlight_color());
            }
            spacer(card, 8.0);
            label(card, "Press R to restart", 16.0, subtitle_color());
            label(card, "Press V to verify score", 16.0, subtitle_color());
            card.spawn((
                Text::new(status),
                TextFont {
                    font_size: 14.0,
                    ..default()
                },
                TextColor(hint_color()),
                VerificationStatusText,
            ));
        },
    );
}

pub fn cleanup_game_over(mut commands: Commands, query: Query<Entity, With<GameOverRoot>>) {
    for entity in query.iter() {
        commands.entity(entity).despawn();
    }
}

/// Keep the status line in step with the verification session.
pub fn verification_status_system(game: Res<Game>, mut query: Query<&mut Text, With<VerificationStatusText>>) {
    let status = game.verification_status().unwrap_or_default();
    for mut text in query.iter_mut() {
        if text.0 != status {
            text.0 = status.to_string();
        }
    }
}
