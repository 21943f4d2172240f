//! Player drawing: pulsing hull, shield arc with charge fill, hook-mode cues.
//!
//! ## Layers (back to front)
//!
//! | Layer | Shown when |
//! |-------|------------|
//! | Hull hexagon, inner hexagon, core | alive |
//! | Smiley | shield mode |
//! | Orbiting orbs | hook mode |
//! | Shield arc + charge fill + `c/m` label | shield mode |
//! | Aim ring, arrow, prompt and countdown | hook mode |

use std::f32::consts::TAU;

use bevy::color::Color;
use bevy::math::Vec2;

use super::Player;
use crate::canvas::{palette, Canvas};
use crate::collision::shield_band;
use crate::constants::*;
use crate::math::{angle_between, from_angle};

/// Seconds of hook mode left below which the prompt turns into a warning.
const HOOK_WARNING_SECS: f64 = 3.0;

fn body_pulse(now: f64) -> f32 {
    0.1 * (now / 0.5).sin() as f32 + 1.0
}

impl Player {
    pub fn draw(&self, canvas: &mut dyn Canvas, now: f64) {
        if !self.alive {
            return;
        }
        self.draw_hull(canvas, now);
        if self.invulnerable {
            self.draw_hook_indicator(canvas, now);
        } else {
            self.draw_shield(canvas, now);
        }
    }

    fn draw_hull(&self, canvas: &mut dyn Canvas, now: f64) {
        let pulse = body_pulse(now);
        let r = self.radius * pulse;
        let outline = if self.invulnerable { palette::WHITE } else { palette::PLAYER };

        canvas.hexagon(self.position, r, self.rotation, outline);
        canvas.hexagon(self.position, r * 0.7, -self.rotation, palette::PLAYER_DEEP);
        canvas.hexagon(self.position, r * 0.3, self.rotation * 1.5, palette::PLAYER_LIGHT);
        canvas.disc(self.position, r * 0.15, palette::WHITE);

        if self.invulnerable {
            for i in 0..6 {
                let a = self.rotation * 2.0 + i as f32 / 6.0 * TAU;
                canvas.disc(self.position + from_angle(a) * r * 0.5, r * 0.08, palette::WHITE);
            }
        } else {
            let eye = Vec2::new(r * 0.2, -r * 0.15);
            canvas.disc(self.position + Vec2::new(-eye.x, eye.y), r * 0.06, palette::WHITE);
            canvas.disc(self.position + eye, r * 0.06, palette::WHITE);
            // Mouth: lower half arc (+y is down).
            canvas.arc(
                self.position + Vec2::new(0.0, r * 0.05),
                r * 0.25,
                std::f32::consts::FRAC_PI_2,
                std::f32::consts::PI * 0.6,
                palette::WHITE,
            );
        }
    }

    fn draw_shield(&self, canvas: &mut dyn Canvas, now: f64) {
        let (inner, outer) = shield_band(self.radius, now);
        let mid = (inner + outer) / 2.0;

        for layer in [inner, mid, outer] {
            canvas.arc(self.position, layer, self.shield_angle, SHIELD_ARC, palette::PLAYER);
        }

        let ratio = self.charge_ratio();
        if ratio > 0.0 {
            let fill: Color = if ratio > 0.8 { palette::WHITE } else { palette::ICE };
            canvas.arc(self.position, mid, self.shield_angle, SHIELD_ARC * ratio, fill);
        }
        if ratio > 0.1 {
            let label = format!("{}/{}", self.shield_charge, self.max_shield_charge);
            let at = self.position + from_angle(self.shield_angle) * (outer + 14.0);
            canvas.text(at, &label, 14.0, palette::WHITE);
        }
    }

    fn draw_hook_indicator(&self, canvas: &mut dyn Canvas, now: f64) {
        let pulse = body_pulse(now);
        let r = self.radius;
        canvas.circle(self.position, r * 1.3 * pulse, palette::PLAYER_LIGHT);

        let dir = from_angle(angle_between(self.position, self.aim));
        let tip = self.position + dir * r * 1.5;
        let back = angle_between(tip, self.position);
        canvas.line(self.position + dir * r, tip, palette::WHITE);
        canvas.line(tip, tip + from_angle(back + 0.5) * 8.0, palette::WHITE);
        canvas.line(tip, tip + from_angle(back - 0.5) * 8.0, palette::WHITE);

        let remaining = self.invulnerability_remaining(now);
        let below = self.position + Vec2::new(0.0, r * 2.2);
        if remaining < HOOK_WARNING_SECS {
            canvas.text(below, "HOOK ENDING SOON!", 16.0, palette::ORANGE);
        } else if self.hook.is_none() {
            canvas.text(below, "CLICK TO HOOK", 16.0, palette::PLAYER_LIGHT);
        }
        let above = self.position - Vec2::new(0.0, r * 1.8);
        canvas.text(above, &format!("{}s", remaining.ceil() as u32), 14.0, palette::WHITE);
    }
}
