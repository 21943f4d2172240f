//! Bevy side of drawing: gizmo canvas, pooled world text, and the HUD.
//!
//! ## Layer Model
//!
//! | Layer               | Technology        | Controlled by             |
//! |---------------------|-------------------|---------------------------|
//! | Grid, entities, fx  | Gizmos            | [`crate::render::draw_game`] |
//! | Floating/world text | `Text2d` pool     | [`CanvasText`] index      |
//! | Score/shield/best   | Bevy UI           | [`HudLine`]               |
//!
//! ## System Responsibilities
//!
//! | System               | Schedule | Purpose                                  |
//! |----------------------|----------|------------------------------------------|
//! | `setup_hud`          | Startup  | Spawn the three-line HUD node            |
//! | `draw_game_system`   | Update   | Replay the frame onto gizmos + text pool |
//! | `hud_system`         | Update   | Refresh HUD lines from the [`Game`]      |

use bevy::prelude::*;

use crate::canvas::Canvas;
use crate::config::GameConfig;
use crate::game::Game;
use crate::render::draw_game;

/// Text queued by a [`GizmoCanvas`], already in world space.
#[derive(Debug, Clone, PartialEq)]
pub struct QueuedText {
    pub at: Vec2,
    pub text: String,
    pub size: f32,
    pub color: Color,
}

/// Map-space (origin top-left, +y down) to world-space (origin centre, +y up).
pub fn map_to_world(p: Vec2, map_size: Vec2) -> Vec2 {
    Vec2::new(p.x - map_size.x / 2.0, map_size.y / 2.0 - p.y)
}

/// [`Canvas`] over Bevy gizmos.  Gizmos cannot draw text, so text calls are
/// queued and handed to the `Text2d` pool afterwards.
pub struct GizmoCanvas<'g, 'w, 's> {
    gizmos: &'g mut Gizmos<'w, 's>,
    map_size: Vec2,
    pub texts: Vec<QueuedText>,
}

impl<'g, 'w, 's> GizmoCanvas<'g, 'w, 's> {
    pub fn new(gizmos: &'g mut Gizmos<'w, 's>, map_size: Vec2) -> Self {
        Self {
            gizmos,
            map_size,
            texts: Vec::new(),
        }
    }

    fn world(&self, p: Vec2) -> Vec2 {
        map_to_world(p, self.map_size)
    }
}

impl Canvas for GizmoCanvas<'_, '_, '_> {
    fn line(&mut self, from: Vec2, to: Vec2, color: Color) {
        let (a, b) = (self.world(from), self.world(to));
        self.gizmos.line_2d(a, b, color);
    }

    fn polyline(&mut self, points: &[Vec2], color: Color) {
        if points.len() < 2 {
            return;
        }
        let world: Vec<Vec2> = points.iter().map(|p| self.world(*p)).collect();
        self.gizmos.linestrip_2d(world, color);
    }

    fn circle(&mut self, center: Vec2, radius: f32, color: Color) {
        if radius <= 0.0 {
            return;
        }
        let c = self.world(center);
        self.gizmos.circle_2d(c, radius, color);
    }

    // Gizmos have no fill; concentric rings read as a solid dot at game scale.
    fn disc(&mut self, center: Vec2, radius: f32, color: Color) {
        if radius <= 0.0 {
            return;
        }
        let c = self.world(center);
        let rings = (radius / 2.0).ceil().clamp(1.0, 6.0) as usize;
        for i in 0..rings {
            let r = radius * (1.0 - i as f32 / rings as f32);
            self.gizmos.circle_2d(c, r, color);
        }
    }

    fn text(&mut self, at: Vec2, text: &str, size: f32, color: Color) {
        let at = self.world(at);
        self.texts.push(QueuedText {
            at,
            text: text.to_string(),
            size,
            color,
        });
    }
}

// ── Text pool ─────────────────────────────────────────────────────────────────

/// Pooled `Text2d` slot; the index is the slot's position in the frame's text list.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasText(pub usize);

const TEXT_Z: f32 = 10.0;

/// Draw the current frame and sync the text pool with what it queued.
pub fn draw_game_system(
    mut commands: Commands,
    mut gizmos: Gizmos,
    game: Res<Game>,
    mut pool: Query<(
        &CanvasText,
        &mut Text2d,
        &mut TextFont,
        &mut TextColor,
        &mut Transform,
        &mut Visibility,
    )>,
) {
    let texts = {
        let mut canvas = GizmoCanvas::new(&mut gizmos, game.config.map_size());
        draw_game(&game, &mut canvas, game.now());
        canvas.texts
    };

    let mut pooled = 0;
    for (slot, mut text, mut font, mut color, mut transform, mut visibility) in pool.iter_mut() {
        pooled += 1;
        match texts.get(slot.0) {
            Some(queued) => {
                if text.0 != queued.text {
                    text.0.clone_from(&queued.text);
                }
                font.font_size = queued.size;
                color.0 = queued.color;
                transform.translation = queued.at.extend(TEXT_Z);
                *visibility = Visibility::Visible;
            }
            None => *visibility = Visibility::Hidden,
        }
    }

    for (index, queued) in texts.iter().enumerate().skip(pooled) {
        commands.spawn((
            CanvasText(index),
            Text2d::new(queued.text.clone()),
            TextFont {
                font_size: queued.size,
                ..default()
            },
            TextColor(queued.color),
            Transform::from_translation(queued.at.extend(TEXT_Z)),
            Visibility::Visible,
        ));
    }
}

// ── HUD ───────────────────────────────────────────────────────────────────────

/// One line of the HUD panel.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HudLine {
    Score,
    Shield,
    HighScore,
}

impl HudLine {
    pub const ALL: [HudLine; 3] = [HudLine::Score, HudLine::Shield, HudLine::HighScore];

    pub fn render(self, game: &Game) -> String {
        match self {
            HudLine::Score => format!("Score: {}", game.score()),
            HudLine::Shield => {
                let player = &game.player;
                if player.invulnerable {
                    let secs = player.invulnerability_remaining(game.now()).ceil() as u32;
                    format!("INVULNERABLE! {secs}s")
                } else {
                    format!("Shield: {}/{}", player.shield_charge, player.max_shield_charge)
                }
            }
            HudLine::HighScore => format!("High Score: {}", game.high_score()),
        }
    }

    fn color(self) -> Color {
        match self {
            HudLine::Score => Color::srgb(0.95, 0.88, 0.45),
            HudLine::Shield => Color::srgb(0.56, 0.79, 0.98),
            HudLine::HighScore => Color::srgb(0.85, 0.85, 0.90),
        }
    }
}

/// Marker for the HUD root node.
#[derive(Component)]
pub struct HudRoot;

pub fn setup_hud(mut commands: Commands, config: Res<GameConfig>) {
    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                left: Val::Px(10.0),
                top: Val::Px(10.0),
                flex_direction: FlexDirection::Column,
                row_gap: Val::Px(4.0),
                ..default()
            },
            HudRoot,
        ))
        .with_children(|parent| {
            for line in HudLine::ALL {
                parent.spawn((
                    Text::new(""),
                    TextFont {
                        font_size: config.hud_font_size,
                        ..default()
                    },
                    TextColor(line.color()),
                    line,
                ));
            }
        });
}

pub fn hud_system(game: Res<Game>, mut lines: Query<(&HudLine, &mut Text)>) {
    for (line, mut text) in lines.iter_mut() {
        let rendered = line.render(&game);
        if text.0 != rendered {
            text.0 = rendered;
        }
    }
}
