//! Abstract 2D drawing surface used by every `draw` routine.
//!
//! The core never talks to Bevy rendering directly: it issues calls against a
//! [`Canvas`] in map space (origin top-left, +y down).  The Bevy adapter in
//! [`crate::rendering`] turns those calls into gizmos and pooled `Text2d`
//! entities; tests use [`RecordingCanvas`].

use bevy::color::Color;
use bevy::math::Vec2;

use crate::math::{from_angle, hexagon_vertices};

/// Drawing operations the game needs.  All coordinates are map space.
pub trait Canvas {
    fn line(&mut self, from: Vec2, to: Vec2, color: Color);

    /// Connected line segments through `points` (not closed).
    fn polyline(&mut self, points: &[Vec2], color: Color);

    /// Circle outline.
    fn circle(&mut self, center: Vec2, radius: f32, color: Color);

    /// Solid disc.  Adapters without fills approximate it with rings.
    fn disc(&mut self, center: Vec2, radius: f32, color: Color);

    /// Text centred on `at`.
    fn text(&mut self, at: Vec2, text: &str, size: f32, color: Color);

    /// Arc outline centred on `mid_angle` spanning `arc` radians.
    fn arc(&mut self, center: Vec2, radius: f32, mid_angle: f32, arc: f32, color: Color) {
        let segments = ((arc.abs() / 0.1).ceil() as usize).max(2);
        let start = mid_angle - arc / 2.0;
        let points: Vec<Vec2> = (0..=segments)
            .map(|i| center + from_angle(start + arc * i as f32 / segments as f32) * radius)
            .collect();
        self.polyline(&points, color);
    }

    /// Closed hexagon outline.
    fn hexagon(&mut self, center: Vec2, radius: f32, rotation: f32, color: Color) {
        let v = hexagon_vertices(center, radius, rotation);
        let points = [v[0], v[1], v[2], v[3], v[4], v[5], v[0]];
        self.polyline(&points, color);
    }
}

/// Named colours shared by gameplay feedback and drawing.
pub mod palette {
    use bevy::color::Color;

    pub const PLAYER: Color = Color::srgb(0.0, 0.667, 1.0);
    pub const PLAYER_DEEP: Color = Color::srgb(0.0, 0.5, 0.8);
    pub const PLAYER_LIGHT: Color = Color::srgb(0.533, 0.867, 1.0);
    pub const WHITE: Color = Color::srgb(1.0, 1.0, 1.0);
    pub const ENEMY: Color = Color::srgb(1.0, 0.2, 0.2);
    pub const ENEMY_DARK: Color = Color::srgb(0.667, 0.0, 0.0);
    pub const ENEMY_LIGHT: Color = Color::srgb(1.0, 0.533, 0.533);
    pub const ORANGE: Color = Color::srgb(1.0, 0.533, 0.0);
    pub const DEEP_ORANGE: Color = Color::srgb(1.0, 0.333, 0.0);
    pub const AMBER: Color = Color::srgb(1.0, 0.667, 0.0);
    pub const YELLOW: Color = Color::srgb(1.0, 1.0, 0.0);
    pub const GOLD: Color = Color::srgb(1.0, 0.867, 0.0);
    pub const ICE: Color = Color::srgb(0.733, 1.0, 1.0);
    pub const DANGER: Color = Color::srgb(1.0, 0.2, 0.2);
    pub const GRID: Color = Color::srgba(0.196, 0.196, 0.196, 0.3);
    pub const GRID_LOW_PERF: Color = Color::srgba(0.196, 0.196, 0.196, 0.2);
    pub const BACKDROP: Color = Color::srgb(0.067, 0.067, 0.067);
}

/// One recorded draw call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    Line(Vec2, Vec2),
    Polyline(usize),
    Circle(Vec2, f32),
    Disc(Vec2, f32),
    Text(Vec2, String),
}

/// Canvas that just records calls, for tests and headless runs.
#[derive(Debug, Default)]
pub struct RecordingCanvas {
    pub calls: Vec<DrawCall>,
}

impl RecordingCanvas {
    /// Every text drawn so far, in call order.
    pub fn texts(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                DrawCall::Text(_, t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Canvas for RecordingCanvas {
    fn line(&mut self, from: Vec2, to: Vec2, _color: Color) {
        self.calls.push(DrawCall::Line(from, to));
    }

    fn polyline(&mut self, points: &[Vec2], _color: Color) {
        self.calls.push(DrawCall::Polyline(points.len()));
    }

    fn circle(&mut self, center: Vec2, radius: f32, _color: Color) {
        self.calls.push(DrawCall::Circle(center, radius));
    }

    fn disc(&mut self, center: Vec2, radius: f32, _color: Color) {
        self.calls.push(DrawCall::Disc(center, radius));
    }

    fn text(&mut self, at: Vec2, text: &str, _size: f32, _color: Color) {
        self.calls.push(DrawCall::Text(at, text.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hexagon_is_a_closed_seven_point_strip() {
        let mut canvas = RecordingCanvas::default();
        canvas.hexagon(Vec2::ZERO, 10.0, 0.0, palette::WHITE);
        assert_eq!(canvas.calls, vec![DrawCall::Polyline(7)]);
    }

    #[test]
    fn arc_has_at_least_two_segments() {
        let mut canvas = RecordingCanvas::default();
        canvas.arc(Vec2::ZERO, 10.0, 0.0, 0.01, palette::WHITE);
        assert_eq!(canvas.calls, vec![DrawCall::Polyline(3)]);
    }
}
