//! Field-simulation error types.
//!
//! Nothing in the field engine is fatal.  Configuration problems are caught
//! when the field is built; everything reported afterwards is a recoverable,
//! local condition that callers log and move past.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use asteroid_field::error::FieldError;
//!
//! if let Err(err) = field.demote(id, position) {
//!     warn!("ignored demotion: {err}");
//! }
//! ```

use crate::body::{BodyId, BodyState};
use std::fmt;

/// Top-level error enum for the asteroid field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldError {
    /// A configuration value is outside its usable range.
    InvalidConfig {
        /// Name of the configuration key (for logging).
        name: &'static str,
        /// The value that was rejected.
        value: f32,
        /// Human-readable description of the accepted range.
        expected: &'static str,
    },

    /// A handoff referenced an id the field never issued.
    UnknownBody {
        /// The unrecognised id.
        id: BodyId,
    },

    /// A promotion or demotion arrived for a body that is not in the state the
    /// transition starts from (double promotion, demoting an active body, ...).
    /// The field is left untouched.
    StaleHandoff {
        /// The body the handoff referenced.
        id: BodyId,
        /// The state the body was actually in.
        state: BodyState,
    },

    /// The chunk index disagrees with the bodies.  Only produced by
    /// [`crate::field::AsteroidField::verify_index`].
    IndexCorrupted {
        /// The body whose indexing is wrong, if the problem is about one body.
        id: Option<BodyId>,
        /// What exactly is wrong.
        detail: String,
    },
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldError::InvalidConfig {
                name,
                value,
                expected,
            } => write!(
                f,
                "config '{}' = {} is invalid; expected {}",
                name, value, expected
            ),
            FieldError::UnknownBody { id } => write!(f, "no asteroid with id {}", id),
            FieldError::StaleHandoff { id, state } => write!(
                f,
                "stale handoff for asteroid {}: it is currently {:?}",
                id, state
            ),
            FieldError::IndexCorrupted {
                id: Some(id),
                detail,
            } => write!(f, "chunk index corrupted at asteroid {}: {}", id, detail),
            FieldError::IndexCorrupted { id: None, detail } => {
                write!(f, "chunk index corrupted: {}", detail)
            }
        }
    }
}

impl std::error::Error for FieldError {}

/// Convenience alias: a `Result` using `FieldError` as the error type.
pub type FieldResult<T> = Result<T, FieldError>;

// ── Validation helpers ────────────────────────────────────────────────────────

/// Returns an error unless `value` is finite and `>= 0`.
pub fn validate_non_negative(name: &'static str, value: f32) -> FieldResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(FieldError::InvalidConfig {
            name,
            value,
            expected: "a finite value >= 0",
        })
    }
}

/// Returns an error unless `value` is finite and strictly positive.
pub fn validate_positive(name: &'static str, value: f32) -> FieldResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(FieldError::InvalidConfig {
            name,
            value,
            expected: "a finite value > 0",
        })
    }
}
