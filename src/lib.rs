//! Hexhook: a hexagon arcade shooter.
//!
//! The player blocks enemy fire with a directional shield; a full charge
//! grants a few seconds of invulnerability during which a grappling hook
//! reels enemies in for points.  The simulation core ([`game::Game`]) is
//! plain Rust driven one frame at a time; Bevy only supplies the window,
//! input, and a [`canvas::Canvas`] to draw on.

pub mod canvas;
pub mod collision;
pub mod config;
pub mod constants;
pub mod effects;
pub mod enemy;
pub mod error;
pub mod game;
pub mod graphics;
pub mod highscore;
pub mod hook;
pub mod math;
pub mod menu;
pub mod particles;
pub mod player;
pub mod projectile;
pub mod render;
pub mod rendering;
pub mod schedule;
pub mod simulation;
pub mod verify;
pub mod waves;
