use bevy::prelude::*;
use bevy::window::WindowResolution;

use hexhook::canvas::palette;
use hexhook::constants::{MAP_HEIGHT, MAP_WIDTH};
use hexhook::{graphics, menu, simulation};

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Hexhook".into(),
                resolution: WindowResolution::new(MAP_WIDTH as u32, MAP_HEIGHT as u32),
                resizable: false,
                ..Default::default()
            }),
            ..Default::default()
        }))
        .insert_resource(ClearColor(palette::BACKDROP))
        // MenuPlugin registers GameState, which the simulation chain syncs.
        .add_plugins(menu::MenuPlugin)
        .add_plugins(simulation::SimulationPlugin)
        .add_systems(Startup, graphics::setup_camera)
        .run();
}
