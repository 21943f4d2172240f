//! Game-specific error types.
//!
//! Fallible operations return [`GameResult`] and callers decide how to degrade.
//! The hook update is the main consumer: its errors are caught at the player
//! update boundary and resolved by discarding the hook, so a bad geometric edge
//! case never ends the frame.
//!
//! ## Usage
//!
//! ```rust
//! use hexhook::error::{GameError, GameResult};
//!
//! fn checked_len(v: f32) -> GameResult<f32> {
//!     if v.is_finite() {
//!         Ok(v)
//!     } else {
//!         Err(GameError::DegenerateGeometry { context: "checked_len" })
//!     }
//! }
//! assert!(checked_len(f32::NAN).is_err());
//! ```

use std::fmt;

/// Top-level error enum for the game core and its collaborators.
#[derive(Debug, Clone, PartialEq)]
pub enum GameError {
    /// A geometric computation received a non-finite or zero-length input.
    DegenerateGeometry {
        /// Where the computation happened.
        context: &'static str,
    },

    /// An enemy handle no longer resolves to an active enemy.
    StaleEnemyHandle {
        /// Raw id of the handle that failed validation.
        id: u64,
    },

    /// A configuration value is outside its safe operating range.
    UnsafeConstant {
        /// Name of the field (for logging).
        name: &'static str,
        /// The value that was rejected.
        value: f64,
        /// Human-readable description of the safe range.
        safe_range: &'static str,
    },

    /// Reading or writing a persisted file failed.
    Persistence {
        /// File that was being accessed.
        path: String,
        /// Underlying failure.
        reason: String,
    },

    /// The score verification collaborator reported a failure.
    Verification {
        /// Collaborator-provided reason.
        reason: String,
    },
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameError::DegenerateGeometry { context } => {
                write!(f, "degenerate geometry during '{}'", context)
            }
            GameError::StaleEnemyHandle { id } => {
                write!(f, "enemy handle #{} no longer refers to an active enemy", id)
            }
            GameError::UnsafeConstant {
                name,
                value,
                safe_range,
            } => write!(
                f,
                "constant '{}' = {} is outside safe range {}",
                name, value, safe_range
            ),
            GameError::Persistence { path, reason } => {
                write!(f, "failed to access '{}': {}", path, reason)
            }
            GameError::Verification { reason } => {
                write!(f, "score verification failed: {}", reason)
            }
        }
    }
}

impl std::error::Error for GameError {}

/// Convenience alias: a `Result` using `GameError` as the error type.
pub type GameResult<T> = Result<T, GameError>;

// ── Validation helpers ────────────────────────────────────────────────────────

/// Returns an error unless `value` is finite and strictly positive.
pub fn ensure_positive(name: &'static str, value: f64) -> GameResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(GameError::UnsafeConstant {
            name,
            value,
            safe_range: "(0.0, ∞)",
        })
    }
}

/// Returns an error unless `min <= value <= max`.
pub fn ensure_within(
    name: &'static str,
    value: f64,
    min: f64,
    max: f64,
    safe_range: &'static str,
) -> GameResult<()> {
    if value.is_finite() && value >= min && value <= max {
        Ok(())
    } else {
        Err(GameError::UnsafeConstant {
            name,
            value,
            safe_range,
        })
    }
}

/// Returns an error for a non-finite point.
pub fn ensure_finite(context: &'static str, v: bevy::math::Vec2) -> GameResult<()> {
    if v.is_finite() {
        Ok(())
    } else {
        Err(GameError::DegenerateGeometry { context })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::math::Vec2;

    #[test]
    fn positive_check_rejects_zero_and_nan() {
        assert!(ensure_positive("x", 1.0).is_ok());
        assert!(ensure_positive("x", 0.0).is_err());
        assert!(ensure_positive("x", f64::NAN).is_err());
    }

    #[test]
    fn range_check_is_inclusive() {
        assert!(ensure_within("x", 1.0, 1.0, 2.0, "[1, 2]").is_ok());
        assert!(ensure_within("x", 2.0, 1.0, 2.0, "[1, 2]").is_ok());
        assert!(ensure_within("x", 2.5, 1.0, 2.0, "[1, 2]").is_err());
    }

    #[test]
    fn finite_check_flags_nan_points() {
        assert!(ensure_finite("t", Vec2::new(1.0, 2.0)).is_ok());
        assert_eq!(
            ensure_finite("t", Vec2::new(f32::NAN, 0.0)),
            Err(GameError::DegenerateGeometry { context: "t" })
        );
    }

    #[test]
    fn display_mentions_the_field() {
        let err = GameError::UnsafeConstant {
            name: "hook_speed",
            value: -1.0,
            safe_range: "(0.0, ∞)",
        };
        assert!(err.to_string().contains("hook_speed"));
    }
}
