//! Simulation plugin: wires the [`Game`] resource into Bevy's frame loop.
//!
//! One `Update` chain per frame:
//!
//! 1. `collect_player_input_system`: keyboard/mouse into [`PlayerInput`]
//! 2. `game_frame_system`: advance the core by the elapsed wall time
//! 3. `sync_game_state_system`: mirror the phase into `GameState`
//! 4. `draw_game_system`, `hud_system`: redraw from the updated state
//!
//! Drawing runs in every phase, so a paused or finished game stays on screen.

use bevy::prelude::*;

use crate::config::{load_game_config, GameConfig};
use crate::game::Game;
use crate::highscore::TomlScoreStore;
use crate::menu::sync_game_state_system;
use crate::player::{collect_player_input_system, PlayerInput};
use crate::rendering::{draw_game_system, hud_system, setup_hud};
use crate::verify::LedgerVerifier;

pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<GameConfig>()
            .init_resource::<PlayerInput>()
            .add_systems(
                Startup,
                (
                    // Config first so the game and HUD see the final values.
                    load_game_config,
                    setup_game.after(load_game_config),
                    setup_hud.after(load_game_config),
                ),
            )
            .add_systems(
                Update,
                (
                    collect_player_input_system,
                    game_frame_system,
                    sync_game_state_system,
                    draw_game_system,
                    hud_system,
                )
                    .chain(),
            );
    }
}

/// Build the [`Game`] from the loaded config with on-disk persistence.
pub fn setup_game(mut commands: Commands, config: Res<GameConfig>) {
    let store = TomlScoreStore::default();
    let verifier = LedgerVerifier::default();
    info!(
        "[setup] high score at {}, verification ledger at {}",
        store.path().display(),
        verifier.path().display()
    );
    commands.insert_resource(Game::new(config.clone(), Box::new(store), Box::new(verifier)));
}

/// Feed this frame's input to the core, then drop the one-shot edges.
pub fn game_frame_system(time: Res<Time>, mut game: ResMut<Game>, mut input: ResMut<PlayerInput>) {
    game.frame(time.elapsed_secs_f64(), &input);
    input.clear_edges();
}
