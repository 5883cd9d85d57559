//! Runtime field configuration loaded from `assets/field.toml`.
//!
//! [`FieldConfig`] is a Bevy [`Resource`] that mirrors every constant in
//! [`crate::constants`].  At startup, [`load_field_config`] reads
//! `assets/field.toml` and overwrites the defaults with any values present in
//! the file.  Missing keys fall back to the compile-time defaults, so a minimal
//! TOML can override just the values you care about:
//!
//! ```toml
//! group_count = 6
//! diagonal_checks = true
//! seed = 1234
//! ```
//!
//! A file that parses but fails [`FieldConfig::validate`] is rejected as a
//! whole; the simulation never starts with a configuration it cannot run.

use crate::constants::*;
use crate::error::{validate_non_negative, validate_positive, FieldError, FieldResult};
use bevy::prelude::*;
use serde::Deserialize;

/// Default location of the override file, relative to the working directory.
pub const FIELD_CONFIG_PATH: &str = "assets/field.toml";

/// Runtime-tunable field configuration.
///
/// All fields default to the corresponding compile-time constant from
/// `src/constants.rs`.
#[derive(Resource, Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    // ── World Population ─────────────────────────────────────────────────────
    pub grid_width: u32,
    pub grid_length: u32,
    pub spawn_spacing: f32,

    // ── Motion ───────────────────────────────────────────────────────────────
    pub min_speed: f32,
    pub max_speed: f32,

    // ── Collision ────────────────────────────────────────────────────────────
    pub collision_threshold: f32,
    pub diagonal_checks: bool,

    // ── Scheduling ───────────────────────────────────────────────────────────
    pub group_count: usize,

    // ── Respawn / Observation ────────────────────────────────────────────────
    pub respawn_duration: f32,
    pub observation_radius: f32,

    // ── Diagnostics ──────────────────────────────────────────────────────────
    pub stats_interval_secs: f32,

    /// Fixed RNG seed; `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            // World Population
            grid_width: GRID_WIDTH,
            grid_length: GRID_LENGTH,
            spawn_spacing: SPAWN_SPACING,
            // Motion
            min_speed: MIN_SPEED,
            max_speed: MAX_SPEED,
            // Collision
            collision_threshold: COLLISION_THRESHOLD,
            diagonal_checks: DIAGONAL_CHECKS,
            // Scheduling
            group_count: GROUP_COUNT,
            // Respawn / Observation
            respawn_duration: RESPAWN_DURATION,
            observation_radius: OBSERVATION_RADIUS,
            // Diagnostics
            stats_interval_secs: STATS_INTERVAL_SECS,
            seed: None,
        }
    }
}

impl FieldConfig {
    /// Parse a TOML override on top of the compiled defaults.
    pub fn from_toml_str(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Per-axis bound on how far from the observer a respawn may land.
    pub fn respawn_extent(&self) -> Vec2 {
        Vec2::new(self.grid_width as f32, self.grid_length as f32)
    }

    /// Reject configurations the field cannot run with.
    pub fn validate(&self) -> FieldResult<()> {
        if self.group_count == 0 {
            return Err(FieldError::InvalidConfig {
                name: "group_count",
                value: 0.0,
                expected: ">= 1",
            });
        }

        validate_non_negative("min_speed", self.min_speed)?;
        validate_non_negative("max_speed", self.max_speed)?;
        if self.min_speed > self.max_speed {
            return Err(FieldError::InvalidConfig {
                name: "min_speed",
                value: self.min_speed,
                expected: "<= max_speed",
            });
        }

        validate_positive("collision_threshold", self.collision_threshold)?;
        // The search only reaches the neighbouring chunks.
        if self.collision_threshold > CELL_SIZE {
            return Err(FieldError::InvalidConfig {
                name: "collision_threshold",
                value: self.collision_threshold,
                expected: "<= CELL_SIZE",
            });
        }
        validate_positive("spawn_spacing", self.spawn_spacing)?;
        validate_non_negative("observation_radius", self.observation_radius)?;
        validate_non_negative("respawn_duration", self.respawn_duration)?;
        validate_positive("stats_interval_secs", self.stats_interval_secs)?;

        let extent = self.respawn_extent();
        for (name, value) in [("grid_width", extent.x), ("grid_length", extent.y)] {
            if value <= self.observation_radius {
                return Err(FieldError::InvalidConfig {
                    name,
                    value,
                    expected: "> observation_radius (respawn extent)",
                });
            }
        }

        Ok(())
    }
}

/// Startup system: attempt to load `assets/field.toml` and overwrite the
/// `FieldConfig` resource with any values present in the file.
///
/// Missing keys retain their compiled defaults.  Parse and validation errors
/// are logged but do not abort the simulation.  A missing file is silently
/// ignored (defaults are already in place from `init_resource`).
pub fn load_field_config(mut config: ResMut<FieldConfig>) {
    let path = FIELD_CONFIG_PATH;
    match std::fs::read_to_string(path) {
        Ok(contents) => match FieldConfig::from_toml_str(&contents) {
            Ok(loaded) => match loaded.validate() {
                Ok(()) => {
                    *config = loaded;
                    info!("Loaded field config from {path}");
                }
                Err(err) => warn!("Rejected {path}: {err}; using defaults"),
            },
            Err(err) => error!("Failed to parse {path}: {err}; using defaults"),
        },
        Err(_) => {
            // Missing file is fine: defaults are already in place.
            info!("No {path} found; using compiled defaults");
        }
    }
}
