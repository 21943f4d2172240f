//! Frame composition: draws a [`Game`] onto any [`Canvas`].
//!
//! Back to front: grid, background motes, projectiles, enemies, hook chain,
//! player, particles/explosions/texts, wave read-out.  Everything is shifted
//! by the current screen-shake offset.

use bevy::color::Color;
use bevy::math::Vec2;

use crate::canvas::{palette, Canvas};
use crate::constants::GRID_CELL_SIZE_LOW_PERF;
use crate::game::Game;

/// Canvas adapter that shifts every call by a fixed offset.
pub struct Shaken<'a> {
    inner: &'a mut dyn Canvas,
    offset: Vec2,
}

impl<'a> Shaken<'a> {
    pub fn new(inner: &'a mut dyn Canvas, offset: Vec2) -> Self {
        Self { inner, offset }
    }
}

impl Canvas for Shaken<'_> {
    fn line(&mut self, from: Vec2, to: Vec2, color: Color) {
        self.inner.line(from + self.offset, to + self.offset, color);
    }

    fn polyline(&mut self, points: &[Vec2], color: Color) {
        let shifted: Vec<Vec2> = points.iter().map(|p| *p + self.offset).collect();
        self.inner.polyline(&shifted, color);
    }

    fn circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.inner.circle(center + self.offset, radius, color);
    }

    fn disc(&mut self, center: Vec2, radius: f32, color: Color) {
        self.inner.disc(center + self.offset, radius, color);
    }

    fn text(&mut self, at: Vec2, text: &str, size: f32, color: Color) {
        self.inner.text(at + self.offset, text, size, color);
    }
}

pub fn draw_grid(canvas: &mut dyn Canvas, map_size: Vec2, cell: f32, color: Color) {
    if cell <= 0.0 {
        return;
    }
    let mut x = 0.0;
    while x <= map_size.x {
        canvas.line(Vec2::new(x, 0.0), Vec2::new(x, map_size.y), color);
        x += cell;
    }
    let mut y = 0.0;
    while y <= map_size.y {
        canvas.line(Vec2::new(0.0, y), Vec2::new(map_size.x, y), color);
        y += cell;
    }
}

/// Draw one frame of `game` at time `now`.
pub fn draw_game(game: &Game, canvas: &mut dyn Canvas, now: f64) {
    let map_size = game.config.map_size();
    let mut world = Shaken::new(canvas, game.effects.shake_offset());

    if game.grid_visible() {
        let (cell, color) = if game.effects.low_performance() {
            (GRID_CELL_SIZE_LOW_PERF, palette::GRID_LOW_PERF)
        } else {
            (game.config.grid_cell_size, palette::GRID)
        };
        draw_grid(&mut world, map_size, cell, color);
    }
    game.effects.draw_background(&mut world);

    for p in &game.projectiles {
        p.draw(&mut world);
    }
    game.enemies.draw(&mut world, now);

    let player = &game.player;
    if player.alive {
        if let Some(hook) = &player.hook {
            let chain = hook.chain_points(player.position, &mut rand::thread_rng());
            hook.draw(&mut world, &chain);
        }
        player.draw(&mut world, now);
    }

    game.effects.draw_foreground(&mut world);
    game.enemies.draw_indicator(&mut world, now);
}
