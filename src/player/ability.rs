//! Shield charge, hook mode, and the player's death/reset lifecycle.

use bevy::log::info;
use bevy::math::Vec2;
use rand::Rng;

use super::Player;
use crate::canvas::palette;
use crate::constants::*;
use crate::effects::{EffectRequest, EffectSink};
use crate::hook::{GrapplingHook, HookCancel};

impl Player {
    /// A projectile was stopped by the shield at `at`, travelling along `angle`.
    ///
    /// Returns `true` when this block completed the charge and started hook mode.
    pub fn block_projectile(&mut self, now: f64, at: Vec2, angle: f32, effects: &mut dyn EffectSink) -> bool {
        if self.invulnerable {
            return false;
        }
        self.shield_charge += 1;
        effects.emit(EffectRequest::ShieldBlock { at, angle });

        let ratio = self.charge_ratio();
        let text = if ratio > 0.9 {
            "SHIELD READY!".to_string()
        } else if ratio > 0.6 {
            format!("ALMOST READY! {}/{}", self.shield_charge, self.max_shield_charge)
        } else {
            "+1 Shield".to_string()
        };
        let color = if ratio > 0.8 {
            palette::WHITE
        } else if ratio > 0.5 {
            palette::ICE
        } else {
            palette::PLAYER_LIGHT
        };
        let size = if ratio > 0.8 { 20.0 } else { 16.0 };
        effects.floating_text(at, &text, color, size);

        for i in 0..5 {
            let t = i as f32 / 5.0;
            effects.emit(EffectRequest::Trail {
                at: at.lerp(self.position, t),
                color,
            });
        }

        if self.shield_charge >= self.max_shield_charge {
            self.activate_invulnerability(now, effects);
            return true;
        }
        false
    }

    /// Enter hook mode: charge is spent, invulnerability starts now.
    pub fn activate_invulnerability(&mut self, now: f64, effects: &mut dyn EffectSink) {
        self.invulnerable = true;
        self.shield_charge = 0;
        self.invulnerable_since = now;

        let r = self.radius;
        effects.explosion(self.position, palette::PLAYER, r * 5.0);
        effects.emit(
            EffectRequest::Explosion {
                at: self.position,
                color: palette::WHITE,
                size: r * 3.0,
            }
            .after(0.15),
        );
        effects.emit(EffectRequest::RingBurst {
            center: self.position,
            radius: r,
            count: 40,
        });
        effects.floating_text(self.position - Vec2::new(0.0, r * 2.0), "INVULNERABLE!", palette::WHITE, 30.0);
        effects.screen_shake(0.5, 20.0);
        effects.emit(
            EffectRequest::FloatingText {
                at: self.position - Vec2::new(0.0, r),
                text: "HOOK MODE ACTIVATED".to_string(),
                color: palette::PLAYER_LIGHT,
                size: 18.0,
            }
            .after(0.3),
        );
        info!("[player] hook mode for {:.1}s", self.invulnerability_duration);
    }

    pub(super) fn expire_invulnerability(&mut self, effects: &mut dyn EffectSink) {
        self.invulnerable = false;
        if self.hook.is_some() {
            self.cancel_hook();
        }
        effects.explosion(self.position, palette::WHITE, self.radius * 1.5);
        effects.floating_text(
            self.position - Vec2::new(0.0, self.radius * 2.0),
            "SHIELD MODE",
            palette::WHITE,
            20.0,
        );
        info!("[player] hook mode ended");
    }

    /// Seconds of hook mode left, zero outside it.
    pub fn invulnerability_remaining(&self, now: f64) -> f64 {
        if !self.invulnerable {
            return 0.0;
        }
        (self.invulnerability_duration - (now - self.invulnerable_since)).max(0.0)
    }

    /// Launch the hook toward `target`.  Only one hook exists at a time, and
    /// only while invulnerable.
    pub fn fire_hook(&mut self, target: Vec2, rng: &mut impl Rng, effects: &mut dyn EffectSink) -> bool {
        if !self.invulnerable || self.hook.is_some() || !self.alive {
            return false;
        }
        self.hook = Some(GrapplingHook::new(self.position, target, self.hook_params, rng, effects));
        true
    }

    /// Recall an extending hook; anything else is dropped immediately.
    pub fn cancel_hook(&mut self) {
        if let Some(hook) = self.hook.as_mut() {
            if hook.cancel() == HookCancel::Discard {
                self.hook = None;
            }
        }
    }

    /// Destroy the player.  Returns `false` when already dead or when a recent
    /// `reset` suppresses death.
    pub fn die(&mut self, now: f64, effects: &mut dyn EffectSink) -> bool {
        if !self.alive || now < self.death_suppressed_until {
            return false;
        }
        self.alive = false;
        self.hook = None;

        let r = self.radius;
        let at = self.position;
        effects.explosion(at, palette::PLAYER, r * 6.0);
        effects.emit(EffectRequest::HullFragments {
            center: at,
            radius: r,
            count: 6,
        });
        effects.emit(
            EffectRequest::Explosion {
                at,
                color: palette::WHITE,
                size: r * 8.0,
            }
            .after(0.2),
        );
        effects.emit(
            EffectRequest::Burst {
                at,
                color: palette::WHITE,
                count: 50,
                speed: 10.0,
            }
            .after(0.2),
        );
        effects.emit(
            EffectRequest::Explosion {
                at,
                color: palette::PLAYER,
                size: r * 10.0,
            }
            .after(0.4),
        );
        effects.emit(EffectRequest::Burst {
            at,
            color: palette::PLAYER,
            count: 100,
            speed: 15.0,
        });
        effects.emit(EffectRequest::Burst {
            at,
            color: palette::WHITE,
            count: 50,
            speed: 10.0,
        });
        effects.floating_text(at - Vec2::new(0.0, r * 2.0), "DESTROYED!", palette::DANGER, 40.0);
        effects.screen_shake(1.5, 40.0);
        effects.emit(
            EffectRequest::Banner {
                text: "GAME OVER".to_string(),
                color: palette::DANGER,
                size: 40.0,
            }
            .after(0.5),
        );
        info!("[player] destroyed with score {}", self.score);
        true
    }

    /// Back to a fresh life at `position`.  `die` is ignored for a short window.
    pub fn reset(&mut self, position: Vec2, now: f64) {
        self.position = position;
        self.velocity = Vec2::ZERO;
        self.rotation = 0.0;
        self.shield_charge = 0;
        self.invulnerable = false;
        self.invulnerable_since = 0.0;
        self.hook = None;
        self.score = 0;
        self.alive = true;
        self.death_suppressed_until = now + DEATH_SUPPRESSION_WINDOW;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::effects::{NullEffects, RecordingEffects};
    use crate::hook::HookState;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn player() -> Player {
        Player::new(Vec2::new(100.0, 100.0), &GameConfig::default())
    }

    #[test]
    fn each_block_adds_exactly_one_charge() {
        let mut p = player();
        for expected in 1..6 {
            assert!(!p.block_projectile(0.0, Vec2::new(160.0, 100.0), 0.0, &mut NullEffects));
            assert_eq!(p.shield_charge, expected);
        }
    }

    #[test]
    fn sixth_block_starts_hook_mode() {
        let mut p = player();
        let mut fx = RecordingEffects::default();
        for _ in 0..5 {
            p.block_projectile(1.0, Vec2::new(160.0, 100.0), 0.0, &mut fx);
        }
        assert!(p.block_projectile(1.0, Vec2::new(160.0, 100.0), 0.0, &mut fx));
        assert!(p.invulnerable);
        assert_eq!(p.shield_charge, 0);
        assert_eq!(p.invulnerable_since, 1.0);
        assert!(fx.texts().iter().any(|t| t == "INVULNERABLE!"));
        assert!(fx.texts().iter().any(|t| t == "HOOK MODE ACTIVATED"));
        assert!(fx.shakes().contains(&(0.5, 20.0)));
    }

    #[test]
    fn block_feedback_follows_charge_ratio() {
        let mut p = player();
        let mut fx = RecordingEffects::default();
        for _ in 0..5 {
            p.block_projectile(0.0, Vec2::new(160.0, 100.0), 0.0, &mut fx);
        }
        let texts = fx.texts();
        assert_eq!(texts[0], "+1 Shield");
        assert_eq!(texts[3], "ALMOST READY! 4/6");
        assert_eq!(texts[4], "ALMOST READY! 5/6");
    }

    #[test]
    fn hook_requires_invulnerability() {
        let mut p = player();
        let mut rng = StdRng::seed_from_u64(1);
        assert!(!p.fire_hook(Vec2::new(400.0, 100.0), &mut rng, &mut NullEffects));
        p.activate_invulnerability(0.0, &mut NullEffects);
        assert!(p.fire_hook(Vec2::new(400.0, 100.0), &mut rng, &mut NullEffects));
        assert!(!p.fire_hook(Vec2::new(400.0, 100.0), &mut rng, &mut NullEffects));
    }

    #[test]
    fn cancel_recalls_extending_and_drops_others() {
        let mut p = player();
        let mut rng = StdRng::seed_from_u64(1);
        p.activate_invulnerability(0.0, &mut NullEffects);
        p.fire_hook(Vec2::new(400.0, 100.0), &mut rng, &mut NullEffects);
        p.cancel_hook();
        assert_eq!(p.hook_state(), Some(HookState::Retracting));
        p.cancel_hook();
        assert!(p.hook.is_none());
    }

    #[test]
    fn die_is_one_shot() {
        let mut p = player();
        let mut fx = RecordingEffects::default();
        assert!(p.die(5.0, &mut fx));
        assert!(!p.alive);
        let before = fx.requests.len();
        assert!(!p.die(5.1, &mut fx));
        assert_eq!(fx.requests.len(), before);
        assert!(fx.texts().iter().any(|t| t == "DESTROYED!"));
    }

    #[test]
    fn reset_suppresses_death_briefly() {
        let mut p = player();
        p.score = 12;
        p.shield_charge = 3;
        p.die(1.0, &mut NullEffects);
        p.reset(Vec2::new(450.0, 450.0), 2.0);
        assert!(p.alive);
        assert_eq!(p.score, 0);
        assert_eq!(p.shield_charge, 0);
        assert!(!p.die(2.05, &mut NullEffects));
        assert!(p.alive);
        assert!(p.die(2.2, &mut NullEffects));
    }

    #[test]
    fn remaining_time_counts_down() {
        let mut p = player();
        assert_eq!(p.invulnerability_remaining(3.0), 0.0);
        p.activate_invulnerability(3.0, &mut NullEffects);
        assert!((p.invulnerability_remaining(7.0) - 6.0).abs() < 1e-9);
    }
}
