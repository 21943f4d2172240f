//! Cosmetic particles: sparks, energy beams, hull fragments, and ambient motes.
//!
//! ## Design
//!
//! Every particle shares one record shape, [`Particle`], tagged with a
//! [`ParticleKind`].  Behaviour is dispatched by kind in [`update_particle`] and
//! [`draw_particle`]; no particle stores its own callbacks.
//!
//! | Kind         | Motion                                   | Drawn as               |
//! |--------------|------------------------------------------|------------------------|
//! | `Simple`     | velocity with per-frame drag, optional shrink | fading disc       |
//! | `Beam`       | static segment, pulsing width            | line with energy nodes |
//! | `Fragment`   | spin, gravity, horizontal drag           | small hexagon          |
//! | `Background` | slow drift, pulse                        | faint mote             |
//!
//! Rates are per frame unit (`time_scale = dt * 60`), lifetimes are in frame
//! units, pulse speeds are rad/s.

use std::f32::consts::TAU;

use bevy::color::{Alpha, Color};
use bevy::math::Vec2;
use rand::Rng;

use crate::canvas::Canvas;
use crate::math::{from_angle, random_range};

/// Behaviour selector for a [`Particle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticleKind {
    Simple,
    Beam,
    Fragment,
    Background,
}

/// Short-lived visual particle.
#[derive(Debug, Clone)]
pub struct Particle {
    pub kind: ParticleKind,
    pub position: Vec2,
    pub velocity: Vec2,
    /// Disc radius, beam width, or fragment size depending on kind.
    pub radius: f32,
    pub color: Color,
    /// Remaining life (frame units).
    pub life: f32,
    pub max_life: f32,
    /// Velocity retention per frame unit.
    pub drag: f32,
    /// Radius retention per frame unit.
    pub shrink: f32,
    pub rotation: f32,
    /// Rotation per frame unit (fragments).
    pub spin: f32,
    /// Pulse phase (rad) and speed (rad/s); zero speed disables pulsing.
    pub phase: f32,
    pub phase_speed: f32,
    /// Far end of a beam.
    pub end: Vec2,
}

impl Particle {
    /// Plain spark with drag 0.95 and no pulse.
    pub fn simple(position: Vec2, velocity: Vec2, radius: f32, color: Color, life: f32) -> Self {
        Self {
            kind: ParticleKind::Simple,
            position,
            velocity,
            radius,
            color,
            life,
            max_life: life,
            drag: 0.95,
            shrink: 1.0,
            rotation: 0.0,
            spin: 0.0,
            phase: 0.0,
            phase_speed: 0.0,
            end: position,
        }
    }

    pub fn with_max_life(mut self, max_life: f32) -> Self {
        self.max_life = max_life.max(self.life);
        self
    }

    pub fn with_drag(mut self, drag: f32) -> Self {
        self.drag = drag;
        self
    }

    pub fn with_shrink(mut self, shrink: f32) -> Self {
        self.shrink = shrink;
        self
    }

    pub fn with_pulse(mut self, phase: f32, phase_speed: f32) -> Self {
        self.phase = phase;
        self.phase_speed = phase_speed;
        self
    }

    /// Energy beam between two points lasting `life` frame units.
    pub fn beam(from: Vec2, to: Vec2, width: f32, color: Color, life: f32, speed: f32) -> Self {
        Self {
            kind: ParticleKind::Beam,
            end: to,
            phase_speed: speed,
            ..Self::simple(from, Vec2::ZERO, width, color, life)
        }
    }

    /// Spinning hexagonal hull fragment.
    pub fn fragment(position: Vec2, velocity: Vec2, size: f32, spin: f32, color: Color, life: f32) -> Self {
        Self {
            kind: ParticleKind::Fragment,
            spin,
            ..Self::simple(position, velocity, size, color, life)
        }
    }

    /// Ambient mote placed uniformly on the map.
    pub fn background(map_size: Vec2, rng: &mut impl Rng) -> Self {
        let position = Vec2::new(
            random_range(rng, 0.0, map_size.x),
            random_range(rng, 0.0, map_size.y),
        );
        let velocity = Vec2::new(random_range(rng, -0.2, 0.2), random_range(rng, -0.2, 0.2));
        let color = Color::srgba(
            random_range(rng, 0.0, 100.0) / 255.0,
            random_range(rng, 100.0, 200.0) / 255.0,
            random_range(rng, 200.0, 255.0) / 255.0,
            0.5,
        );
        let life = random_range(rng, 300.0, 600.0);
        Self {
            kind: ParticleKind::Background,
            drag: 1.0,
            phase: random_range(rng, 0.0, TAU),
            phase_speed: random_range(rng, 1.0, 3.0),
            ..Self::simple(position, velocity, random_range(rng, 1.0, 3.0), color, life)
        }
        .with_max_life(600.0)
    }

    /// Remaining life as a fraction of the maximum.
    #[inline]
    pub fn alpha(&self) -> f32 {
        if self.max_life > 0.0 {
            (self.life / self.max_life).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    #[inline]
    fn pulse(&self, amplitude: f32) -> f32 {
        amplitude * self.phase.sin() + 1.0
    }
}

/// Advance one particle.  Returns `false` once it has expired.
pub fn update_particle(p: &mut Particle, dt: f32) -> bool {
    let ts = dt * 60.0;
    p.life -= ts;
    p.phase += p.phase_speed * dt;
    match p.kind {
        ParticleKind::Simple => {
            p.position += p.velocity * ts;
            p.velocity *= p.drag.powf(ts);
            p.radius *= p.shrink.powf(ts);
        }
        ParticleKind::Beam => {}
        ParticleKind::Fragment => {
            p.position += p.velocity * ts;
            p.rotation += p.spin * ts;
            p.velocity.y += 0.05 * ts;
            p.velocity.x *= 0.98_f32.powf(ts);
        }
        ParticleKind::Background => {
            p.position += p.velocity * ts;
        }
    }
    p.life > 0.0
}

/// Draw one particle.
pub fn draw_particle(p: &Particle, canvas: &mut dyn Canvas) {
    let alpha = p.alpha();
    match p.kind {
        ParticleKind::Simple => {
            let r = if p.phase_speed > 0.0 {
                p.radius * p.pulse(0.2)
            } else {
                p.radius
            };
            canvas.disc(p.position, r.max(0.5), p.color.with_alpha(alpha));
        }
        ParticleKind::Beam => {
            let color = p.color.with_alpha(alpha);
            canvas.line(p.position, p.end, color);
            let delta = p.end - p.position;
            let nodes = ((delta.length() / 30.0).floor() as usize).max(2);
            let normal = Vec2::new(-delta.y, delta.x).normalize_or_zero();
            let width = p.radius * p.pulse(0.3);
            for i in 1..nodes {
                let t = i as f32 / nodes as f32;
                let jitter = 3.0 * (p.phase * 2.0 + i as f32).sin();
                canvas.disc(p.position + delta * t + normal * jitter, width, color);
            }
        }
        ParticleKind::Fragment => {
            canvas.hexagon(p.position, p.radius, p.rotation, p.color.with_alpha(alpha));
        }
        ParticleKind::Background => {
            let a = alpha * 0.4 * p.pulse(0.2);
            if a >= 0.02 {
                canvas.disc(p.position, p.radius, p.color.with_alpha(a));
            }
        }
    }
}

// ── Spawn helpers ─────────────────────────────────────────────────────────────

/// Sparks flying out in every direction at up to `speed` px per frame unit.
///
/// Lifetimes are drawn from `[lifetime/2, lifetime)` frame units.
pub fn radial_burst(
    at: Vec2,
    color: Color,
    count: usize,
    speed: f32,
    lifetime: f32,
    rng: &mut impl Rng,
) -> Vec<Particle> {
    (0..count)
        .map(|_| {
            let angle = random_range(rng, 0.0, TAU);
            let v = from_angle(angle) * random_range(rng, 1.0, speed.max(1.0));
            let life = random_range(rng, lifetime * 0.5, lifetime);
            Particle::simple(at, v, random_range(rng, 2.0, 5.0), color, life)
        })
        .collect()
}

/// Sparks fanned around `angle` with `spread` radians either side.
pub fn cone_burst(
    at: Vec2,
    angle: f32,
    spread: f32,
    count: usize,
    speed: (f32, f32),
    colors: &[Color],
    lifetime: (f32, f32),
    rng: &mut impl Rng,
) -> Vec<Particle> {
    (0..count)
        .map(|i| {
            let a = angle + random_range(rng, -spread, spread);
            let v = from_angle(a) * random_range(rng, speed.0, speed.1);
            let color = colors[i % colors.len().max(1)];
            let life = random_range(rng, lifetime.0, lifetime.1);
            Particle::simple(at, v, random_range(rng, 2.0, 5.0), color, life)
                .with_max_life(lifetime.1)
        })
        .collect()
}
