//! Effects collaborator: explosions, floating text, particles and screen shake.
//!
//! Gameplay code never owns visual state.  It describes what should happen as
//! an [`EffectRequest`] and hands it to whatever [`EffectSink`] it was given.
//! The concrete sink, [`Effects`], owns every transient list and is the only
//! thing that adds to or removes from them.
//!
//! | Request family       | Result                                              |
//! |----------------------|-----------------------------------------------------|
//! | `Explosion`          | white flash plus an expanding ring that sheds sparks |
//! | `FloatingText`       | rising, drifting label that grows then shrinks      |
//! | `Banner`             | centre-screen label; a new banner replaces the old  |
//! | particle requests    | [`Particle`] records of the matching kind           |
//! | `ScreenShake`        | offset applied to the whole frame                   |
//! | `Staged`             | any request, replayed after a delay                 |
//!
//! Staged requests only carry positions captured when they were scheduled, so
//! they stay valid after the entity that caused them is gone.  [`Effects::clear`]
//! drops them on restart.

use std::f32::consts::TAU;

use bevy::color::{Alpha, Color};
use bevy::math::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::canvas::{palette, Canvas};
use crate::constants::*;
use crate::math::{from_angle, lerp, random_range};
use crate::particles::{cone_burst, draw_particle, radial_burst, update_particle, Particle};
use crate::schedule::DeferredQueue;

/// One cosmetic effect asked for by the simulation.
#[derive(Debug, Clone, PartialEq)]
pub enum EffectRequest {
    Explosion {
        at: Vec2,
        color: Color,
        size: f32,
    },
    FloatingText {
        at: Vec2,
        text: String,
        color: Color,
        size: f32,
    },
    Banner {
        text: String,
        color: Color,
        size: f32,
    },
    /// Sparks in every direction (`speed` is the upper bound).
    Burst {
        at: Vec2,
        color: Color,
        count: usize,
        speed: f32,
    },
    /// Single slow spark left behind by a moving object.
    Trail {
        at: Vec2,
        color: Color,
    },
    Beam {
        from: Vec2,
        to: Vec2,
        color: Color,
        width: f32,
        frames: f32,
    },
    /// Deflection sparks, a small explosion and a shock ring at a blocked shot.
    ShieldBlock {
        at: Vec2,
        angle: f32,
    },
    /// Sparks emitted around an invulnerable player (`progress` in 0..1).
    InvulnerabilityAura {
        center: Vec2,
        radius: f32,
        progress: f32,
    },
    /// Evenly spaced ring of sparks leaving `center` (hook mode activation).
    RingBurst {
        center: Vec2,
        radius: f32,
        count: usize,
    },
    /// Sparks thrown from inside a freshly hooked enemy.
    HookImpact {
        at: Vec2,
        radius: f32,
    },
    MuzzleFlash {
        at: Vec2,
        angle: f32,
    },
    EnemyDeath {
        at: Vec2,
        radius: f32,
    },
    /// Spinning hexagonal pieces of the destroyed player.
    HullFragments {
        center: Vec2,
        radius: f32,
        count: usize,
    },
    ScreenShake {
        duration: f32,
        intensity: f32,
    },
    /// Replay `effect` after `delay` seconds.
    Staged {
        delay: f64,
        effect: Box<EffectRequest>,
    },
}

impl EffectRequest {
    /// Wrap `self` so it fires `delay` seconds from now.
    pub fn after(self, delay: f64) -> EffectRequest {
        EffectRequest::Staged {
            delay,
            effect: Box::new(self),
        }
    }
}

/// Receiver of cosmetic requests.  Fire-and-forget: nothing is returned.
pub trait EffectSink {
    fn emit(&mut self, request: EffectRequest);

    fn explosion(&mut self, at: Vec2, color: Color, size: f32) {
        self.emit(EffectRequest::Explosion { at, color, size });
    }

    fn floating_text(&mut self, at: Vec2, text: &str, color: Color, size: f32) {
        self.emit(EffectRequest::FloatingText {
            at,
            text: text.to_string(),
            color,
            size,
        });
    }

    fn screen_shake(&mut self, duration: f32, intensity: f32) {
        self.emit(EffectRequest::ScreenShake {
            duration,
            intensity,
        });
    }
}

/// Sink that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullEffects;

impl EffectSink for NullEffects {
    fn emit(&mut self, _request: EffectRequest) {}
}

/// Sink that remembers every request, for assertions.
#[derive(Debug, Default, Clone)]
pub struct RecordingEffects {
    pub requests: Vec<EffectRequest>,
}

impl EffectSink for RecordingEffects {
    fn emit(&mut self, request: EffectRequest) {
        self.requests.push(request);
    }
}

impl RecordingEffects {
    /// Texts of floating labels and banners, staged ones included.
    pub fn texts(&self) -> Vec<String> {
        fn collect(r: &EffectRequest, out: &mut Vec<String>) {
            match r {
                EffectRequest::FloatingText { text, .. } | EffectRequest::Banner { text, .. } => {
                    out.push(text.clone())
                }
                EffectRequest::Staged { effect, .. } => collect(effect, out),
                _ => {}
            }
        }
        let mut out = Vec::new();
        for r in &self.requests {
            collect(r, &mut out);
        }
        out
    }

    /// `(duration, intensity)` of every shake request.
    pub fn shakes(&self) -> Vec<(f32, f32)> {
        self.requests
            .iter()
            .filter_map(|r| match r {
                EffectRequest::ScreenShake {
                    duration,
                    intensity,
                } => Some((*duration, *intensity)),
                _ => None,
            })
            .collect()
    }

    pub fn staged_count(&self) -> usize {
        self.requests
            .iter()
            .filter(|r| matches!(r, EffectRequest::Staged { .. }))
            .count()
    }

    pub fn clear(&mut self) {
        self.requests.clear();
    }
}

// ── Concrete effect records ───────────────────────────────────────────────────

/// How an [`Explosion`] grows and draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExplosionStyle {
    /// Brief solid flash.
    Flash,
    /// Expanding ring that sheds sparks while alive.
    Ring,
    /// Expanding ring without sparks.
    Shockwave,
    /// Ring growing at a fixed rate from a starting radius.
    Halo,
}

#[derive(Debug, Clone)]
pub struct Explosion {
    pub style: ExplosionStyle,
    pub position: Vec2,
    pub radius: f32,
    pub max_radius: f32,
    pub color: Color,
    pub life: f32,
    pub max_life: f32,
}

impl Explosion {
    fn alpha(&self) -> f32 {
        (self.life / self.max_life).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone)]
pub struct FloatingText {
    pub position: Vec2,
    pub text: String,
    pub color: Color,
    pub size: f32,
    pub velocity: Vec2,
    pub life: f32,
    pub max_life: f32,
    pub scale: f32,
    pub target_scale: f32,
}

impl FloatingText {
    fn new(at: Vec2, text: String, color: Color, size: f32, rng: &mut impl Rng) -> Self {
        Self {
            position: at,
            text,
            color,
            size,
            velocity: Vec2::new(random_range(rng, -0.5, 0.5), -2.0 - random_range(rng, 0.0, 1.0)),
            life: FLOATING_TEXT_LIFE,
            max_life: FLOATING_TEXT_LIFE,
            scale: 0.0,
            target_scale: 1.0 + random_range(rng, 0.0, 0.3),
        }
    }

    /// Centre-screen label that does not drift sideways.
    fn banner(at: Vec2, text: String, color: Color, size: f32) -> Self {
        Self {
            position: at,
            text,
            color,
            size,
            velocity: Vec2::new(0.0, -0.5),
            life: FLOATING_TEXT_LIFE * 1.5,
            max_life: FLOATING_TEXT_LIFE * 1.5,
            scale: 0.0,
            target_scale: 1.0,
        }
    }

    fn update(&mut self, dt: f32) -> bool {
        let ts = dt * 60.0;
        self.position += self.velocity * ts;
        self.velocity.y *= 0.97_f32.powf(ts);
        self.life -= ts;
        if self.scale < self.target_scale {
            self.scale = (self.scale + 0.1 * ts).min(self.target_scale);
        }
        if self.life < 20.0 {
            self.scale *= 0.97_f32.powf(ts);
        }
        self.life > 0.0
    }

    fn draw(&self, canvas: &mut dyn Canvas) {
        let alpha = (self.life / self.max_life).clamp(0.0, 1.0);
        if self.scale > 0.05 {
            canvas.text(
                self.position,
                &self.text,
                self.size * self.scale,
                self.color.with_alpha(alpha),
            );
        }
    }
}

/// Camera shake with randomized, smoothly decaying offsets.
#[derive(Debug, Clone, Default)]
pub struct ScreenShake {
    remaining: f32,
    intensity: f32,
    offset: Vec2,
}

impl ScreenShake {
    pub fn start(&mut self, duration: f32, intensity: f32) {
        self.remaining = duration;
        self.intensity = intensity;
    }

    pub fn update(&mut self, dt: f32, rng: &mut impl Rng) {
        if self.remaining <= 0.0 {
            return;
        }
        self.remaining -= dt;
        if self.remaining <= 0.0 {
            self.offset = Vec2::ZERO;
            return;
        }
        let progress = (self.remaining / SCREEN_SHAKE_FALLOFF).min(1.0);
        let strength = self.intensity * progress;
        let amount = 0.9 * dt * 10.0;
        self.offset.x = lerp(self.offset.x, random_range(rng, -1.0, 1.0) * strength, amount);
        self.offset.y = lerp(self.offset.y, random_range(rng, -1.0, 1.0) * strength, amount);
    }

    pub fn is_active(&self) -> bool {
        self.remaining > 0.0
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

// ── Effects system ────────────────────────────────────────────────────────────

/// Owner of every transient cosmetic list.
#[derive(Debug, Clone)]
pub struct Effects {
    pub particles: Vec<Particle>,
    pub background: Vec<Particle>,
    pub explosions: Vec<Explosion>,
    pub texts: Vec<FloatingText>,
    pub banner: Option<FloatingText>,
    shake: ScreenShake,
    staged: DeferredQueue<EffectRequest>,
    clock: f64,
    fps_low: bool,
    overloaded: bool,
    last_load_check: f64,
    max_particles: usize,
    max_explosions: usize,
    map_size: Vec2,
    rng: StdRng,
}

impl Effects {
    pub fn new(map_size: Vec2, max_particles: usize, max_explosions: usize) -> Self {
        Self::with_rng(map_size, max_particles, max_explosions, StdRng::from_entropy())
    }

    /// Deterministic variant for tests.
    pub fn with_rng(map_size: Vec2, max_particles: usize, max_explosions: usize, mut rng: StdRng) -> Self {
        let background = (0..MAX_BACKGROUND_PARTICLES)
            .map(|_| Particle::background(map_size, &mut rng))
            .collect();
        Self {
            particles: Vec::new(),
            background,
            explosions: Vec::new(),
            texts: Vec::new(),
            banner: None,
            shake: ScreenShake::default(),
            staged: DeferredQueue::new(),
            clock: 0.0,
            fps_low: false,
            overloaded: false,
            last_load_check: 0.0,
            max_particles,
            max_explosions,
            map_size,
            rng,
        }
    }

    /// True when caps are halved and optional flourishes skipped.
    pub fn low_performance(&self) -> bool {
        self.fps_low || self.overloaded
    }

    /// Feed the rolling FPS verdict from the frame driver.
    pub fn set_fps_low(&mut self, low: bool) {
        self.fps_low = low;
    }

    /// Stamp the current frame time before anything emits this frame, so
    /// staged delays count from the frame that queued them.
    pub fn set_clock(&mut self, now: f64) {
        self.clock = now;
    }

    pub fn shake_offset(&self) -> Vec2 {
        self.shake.offset()
    }

    pub fn shake_active(&self) -> bool {
        self.shake.is_active()
    }

    pub fn staged_len(&self) -> usize {
        self.staged.len()
    }

    fn performance_factor(&self) -> f32 {
        if self.low_performance() {
            0.5
        } else {
            1.0
        }
    }

    fn particle_cap(&self) -> usize {
        (self.max_particles as f32 * self.performance_factor()) as usize
    }

    fn explosion_cap(&self) -> usize {
        ((self.max_explosions as f32 * self.performance_factor()) as usize).max(1)
    }

    fn can_add_particles(&self) -> bool {
        self.particles.len() < self.particle_cap()
    }

    fn push_explosion(&mut self, explosion: Explosion) {
        if self.explosions.len() >= self.explosion_cap() {
            self.explosions.remove(0);
        }
        self.explosions.push(explosion);
    }

    fn create_explosion(&mut self, at: Vec2, color: Color, size: f32) {
        self.push_explosion(Explosion {
            style: ExplosionStyle::Flash,
            position: at,
            radius: size * 0.4,
            max_radius: size * 0.4,
            color: palette::WHITE,
            life: 10.0,
            max_life: 10.0,
        });
        if self.low_performance() && self.rng.gen_bool(0.5) {
            return;
        }
        self.push_explosion(Explosion {
            style: ExplosionStyle::Ring,
            position: at,
            radius: 0.0,
            max_radius: size,
            color,
            life: 30.0,
            max_life: 30.0,
        });
    }

    fn create_enemy_death(&mut self, at: Vec2, radius: f32) {
        if self.low_performance() {
            self.create_explosion(at, palette::ENEMY, radius * 3.0);
            let mut sparks = radial_burst(at, palette::ENEMY, 15, 8.0, 40.0, &mut self.rng);
            sparks.extend(radial_burst(at, palette::WHITE, 5, 10.0, 40.0, &mut self.rng));
            self.particles.extend(sparks);
            self.texts.push(FloatingText::new(
                at - Vec2::new(0.0, radius),
                "DESTROYED!".into(),
                palette::WHITE,
                24.0,
                &mut self.rng,
            ));
            return;
        }
        self.create_explosion(at, palette::ENEMY, radius * 4.0);
        self.emit(
            EffectRequest::Explosion {
                at,
                color: palette::AMBER,
                size: radius * 3.0,
            }
            .after(0.1),
        );
        self.emit(
            EffectRequest::Explosion {
                at,
                color: palette::WHITE,
                size: radius * 2.5,
            }
            .after(0.2),
        );
        let scale = if self.particles.is_empty() {
            1.0
        } else {
            (200.0 / self.particles.len() as f32).min(1.0)
        };
        for (color, count, speed) in [
            (palette::ENEMY, 50.0, 8.0),
            (palette::ORANGE, 30.0, 6.0),
            (palette::WHITE, 20.0, 10.0),
        ] {
            let n = (count * scale) as usize;
            let sparks = radial_burst(at, color, n, speed, 40.0, &mut self.rng);
            self.particles.extend(sparks);
        }
    }

    /// Advance all effects to `now` (seconds) by `dt`.
    pub fn update(&mut self, now: f64, dt: f32) {
        self.clock = now;
        for request in self.staged.drain_due(now) {
            self.emit(request);
        }

        if now - self.last_load_check > EFFECT_LOAD_CHECK_INTERVAL {
            let live = self.particles.len() + self.explosions.len() + self.background.len();
            self.overloaded = live > LOW_PERFORMANCE_EFFECT_COUNT;
            self.last_load_check = now;
        }

        self.shake.update(dt, &mut self.rng);

        let cap = self.particle_cap();
        if self.particles.len() > cap {
            let excess = self.particles.len() - cap;
            self.particles.drain(..excess);
        }
        self.particles.retain_mut(|p| update_particle(p, dt));

        let ts = dt * 60.0;
        let spark_chance = if self.low_performance() { 0.05 } else { 0.2 };
        let mut shed = Vec::new();
        for e in self.explosions.iter_mut() {
            match e.style {
                ExplosionStyle::Flash => {}
                ExplosionStyle::Ring | ExplosionStyle::Shockwave => {
                    e.radius = e.max_radius * (1.0 - e.life / e.max_life);
                }
                ExplosionStyle::Halo => e.radius += 2.0 * ts,
            }
            e.life -= ts;
            if e.style == ExplosionStyle::Ring
                && e.life > 0.0
                && self.rng.gen::<f32>() < spark_chance * ts
            {
                shed.push((e.position, e.color));
            }
        }
        self.explosions.retain(|e| e.life > 0.0);
        for (at, color) in shed {
            if self.can_add_particles() {
                let count = if self.low_performance() {
                    1
                } else {
                    ((3.0 * ts) as usize).max(1)
                };
                let sparks = radial_burst(at, color, count, 3.0, 40.0, &mut self.rng);
                self.particles.extend(sparks);
            }
        }

        self.texts.retain_mut(|t| t.update(dt));
        if let Some(banner) = self.banner.as_mut() {
            if !banner.update(dt) {
                self.banner = None;
            }
        }

        self.background.retain_mut(|p| update_particle(p, dt));
        let room = MAX_BACKGROUND_PARTICLES.saturating_sub(self.background.len());
        let replenish = room.min(if self.low_performance() { 1 } else { 3 });
        for _ in 0..replenish {
            let mote = Particle::background(self.map_size, &mut self.rng);
            self.background.push(mote);
        }
    }

    /// Drop all gameplay-driven effects.  Ambient motes survive.
    pub fn clear(&mut self) {
        self.particles.clear();
        self.explosions.clear();
        self.texts.clear();
        self.banner = None;
        self.staged.clear();
        self.shake.reset();
    }

    pub fn draw_background(&self, canvas: &mut dyn Canvas) {
        for p in &self.background {
            draw_particle(p, canvas);
        }
    }

    /// Particles, explosions, then floating text on top.
    pub fn draw_foreground(&self, canvas: &mut dyn Canvas) {
        for p in &self.particles {
            draw_particle(p, canvas);
        }
        for e in &self.explosions {
            let alpha = e.alpha();
            match e.style {
                ExplosionStyle::Flash => canvas.disc(e.position, e.radius, e.color.with_alpha(alpha)),
                _ => {
                    if alpha >= 0.05 && e.radius > 0.5 {
                        canvas.circle(e.position, e.radius, e.color.with_alpha(alpha));
                    }
                }
            }
        }
        for t in &self.texts {
            t.draw(canvas);
        }
        if let Some(banner) = &self.banner {
            banner.draw(canvas);
        }
    }
}

impl EffectSink for Effects {
    fn emit(&mut self, request: EffectRequest) {
        match request {
            EffectRequest::Explosion { at, color, size } => self.create_explosion(at, color, size),
            EffectRequest::FloatingText {
                at,
                text,
                color,
                size,
            } => {
                let label = FloatingText::new(at, text, color, size, &mut self.rng);
                self.texts.push(label);
            }
            EffectRequest::Banner { text, color, size } => {
                self.banner = Some(FloatingText::banner(self.map_size / 2.0, text, color, size));
            }
            EffectRequest::Burst {
                at,
                color,
                count,
                speed,
            } => {
                let sparks = radial_burst(at, color, count, speed, 40.0, &mut self.rng);
                self.particles.extend(sparks);
            }
            EffectRequest::Trail { at, color } => {
                if self.can_add_particles() {
                    let angle = random_range(&mut self.rng, 0.0, TAU);
                    let v = from_angle(angle) * random_range(&mut self.rng, 0.2, 1.0);
                    let life = random_range(&mut self.rng, 15.0, 25.0);
                    let r = random_range(&mut self.rng, 1.5, 3.5);
                    self.particles.push(Particle::simple(at, v, r, color, life).with_drag(0.9));
                }
            }
            EffectRequest::Beam {
                from,
                to,
                color,
                width,
                frames,
            } => {
                let speed = 10.0 + random_range(&mut self.rng, 0.0, 5.0);
                self.particles.push(Particle::beam(from, to, width, color, frames, speed));
            }
            EffectRequest::ShieldBlock { at, angle } => {
                let rng = &mut self.rng;
                let sparks = cone_burst(
                    at,
                    angle + std::f32::consts::PI,
                    0.7,
                    25,
                    (3.0, 10.0),
                    &[palette::DEEP_ORANGE, palette::GOLD],
                    (20.0, 40.0),
                    rng,
                )
                .into_iter()
                .map(|p| {
                    let phase = random_range(rng, 0.0, TAU);
                    let speed = 10.0 + random_range(rng, 0.0, 5.0);
                    p.with_pulse(phase, speed)
                })
                .collect::<Vec<_>>();
                self.particles.extend(sparks);
                self.create_explosion(at, palette::ORANGE, 25.0);
                self.push_explosion(Explosion {
                    style: ExplosionStyle::Shockwave,
                    position: at,
                    radius: 0.0,
                    max_radius: 40.0,
                    color: palette::WHITE,
                    life: 20.0,
                    max_life: 20.0,
                });
            }
            EffectRequest::InvulnerabilityAura {
                center,
                radius,
                progress,
            } => {
                let frequency = 0.4 + 0.3 * (progress * TAU).sin();
                if self.rng.gen::<f32>() < frequency && self.can_add_particles() {
                    let angle = random_range(&mut self.rng, 0.0, TAU);
                    let dir = from_angle(angle);
                    let color = if (progress * 2.0).min(1.0) > 0.8 {
                        palette::WHITE
                    } else {
                        palette::PLAYER
                    };
                    let v = dir * random_range(&mut self.rng, 0.5, 2.0);
                    let life = random_range(&mut self.rng, 20.0, 40.0);
                    let r = random_range(&mut self.rng, 3.0, 6.0);
                    let phase = random_range(&mut self.rng, 0.0, TAU);
                    let pulse = 8.0 + random_range(&mut self.rng, 0.0, 4.0);
                    self.particles.push(
                        Particle::simple(center + dir * radius * 1.2, v, r, color, life)
                            .with_max_life(40.0)
                            .with_pulse(phase, pulse),
                    );
                }
                if self.rng.gen::<f32>() < 0.02 {
                    self.push_explosion(Explosion {
                        style: ExplosionStyle::Halo,
                        position: center,
                        radius: radius * 1.1,
                        max_radius: radius * 2.5,
                        color: palette::PLAYER,
                        life: 20.0,
                        max_life: 20.0,
                    });
                }
            }
            EffectRequest::RingBurst {
                center,
                radius,
                count,
            } => {
                for i in 0..count {
                    let angle = i as f32 / count.max(1) as f32 * TAU;
                    let dir = from_angle(angle);
                    let speed = 5.0 + random_range(&mut self.rng, 0.0, 3.0);
                    let color = if i % 2 == 0 { palette::PLAYER } else { palette::WHITE };
                    let life = random_range(&mut self.rng, 30.0, 60.0);
                    let r = random_range(&mut self.rng, 3.0, 6.0);
                    self.particles.push(
                        Particle::simple(center + dir * radius * 1.2, dir * speed, r, color, life)
                            .with_max_life(60.0),
                    );
                }
            }
            EffectRequest::HookImpact { at, radius } => {
                for _ in 0..20 {
                    let angle = random_range(&mut self.rng, 0.0, TAU);
                    let dir = from_angle(angle);
                    let offset = dir * random_range(&mut self.rng, 0.0, radius);
                    let speed = random_range(&mut self.rng, 2.0, 5.0);
                    let life = random_range(&mut self.rng, 20.0, 40.0);
                    let r = random_range(&mut self.rng, 2.0, 4.0);
                    self.particles.push(
                        Particle::simple(at + offset, dir * speed, r, palette::PLAYER, life)
                            .with_max_life(40.0),
                    );
                }
            }
            EffectRequest::MuzzleFlash { at, angle } => {
                self.create_explosion(at, palette::ORANGE, 15.0);
                let sparks = cone_burst(
                    at,
                    angle,
                    0.4,
                    12,
                    (1.0, 4.0),
                    &[palette::ORANGE, palette::YELLOW, palette::DEEP_ORANGE],
                    (15.0, 30.0),
                    &mut self.rng,
                )
                .into_iter()
                .map(|p| p.with_drag(0.9));
                self.particles.extend(sparks);
            }
            EffectRequest::EnemyDeath { at, radius } => self.create_enemy_death(at, radius),
            EffectRequest::HullFragments {
                center,
                radius,
                count,
            } => {
                for i in 0..count {
                    let angle = i as f32 / count.max(1) as f32 * TAU;
                    let dir = from_angle(angle);
                    let speed = 3.0 + random_range(&mut self.rng, 0.0, 2.0);
                    let spin = random_range(&mut self.rng, -0.1, 0.1);
                    let life = random_range(&mut self.rng, 60.0, 120.0);
                    let mut piece = Particle::fragment(
                        center + dir * radius * 0.5,
                        dir * speed,
                        radius * 0.3,
                        spin,
                        palette::PLAYER,
                        life,
                    )
                    .with_max_life(120.0);
                    piece.rotation = angle;
                    self.particles.push(piece);
                }
            }
            EffectRequest::ScreenShake {
                duration,
                intensity,
            } => self.shake.start(duration, intensity),
            EffectRequest::Staged { delay, effect } => {
                self.staged.push(self.clock + delay, *effect);
            }
        }
    }
}
