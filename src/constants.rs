//! Centralised field-simulation constants.
//!
//! All tuneable values live here so they can be found, reasoned-about, and
//! modified in one place without source-diving across multiple modules.
//!
//! ## Tuning guidance
//!
//! Each constant notes the observable consequence of changing it.  These are
//! the compiled defaults behind [`crate::config::FieldConfig`]; override them
//! at runtime through `assets/field.toml`.

// ── World Population ──────────────────────────────────────────────────────────

/// Number of lattice columns in the initial asteroid population.
///
/// Together with [`GRID_LENGTH`] this fixes the population size
/// (`GRID_WIDTH × GRID_LENGTH` bodies) and the horizontal respawn extent.
pub const GRID_WIDTH: u32 = 100;

/// Number of lattice rows in the initial asteroid population.
///
/// Also the vertical respawn extent: respawned asteroids land at most this many
/// world units above or below the observer.
pub const GRID_LENGTH: u32 = 100;

/// Distance (world units) between neighbouring asteroids on the start lattice.
///
/// At 2.0 every body starts four collision thresholds away from its
/// neighbours, so nothing collides on the first processed tick.
pub const SPAWN_SPACING: f32 = 2.0;

// ── Motion ────────────────────────────────────────────────────────────────────

/// Lower bound of the uniformly sampled spawn speed (world units / s).
pub const MIN_SPEED: f32 = 0.5;

/// Upper bound of the uniformly sampled spawn speed (world units / s).
///
/// Keep `MAX_SPEED × GROUP_COUNT × frame_dt` below one cell: the collision
/// search only looks one cell away, so a body stepping further per processed
/// tick can tunnel through a partner undetected.
pub const MAX_SPEED: f32 = 2.0;

// ── Chunk Grid ────────────────────────────────────────────────────────────────

/// Edge length of one chunk (world units).  Matches the asteroid diameter scale.
pub const CELL_SIZE: f32 = 1.0;

// ── Collision ─────────────────────────────────────────────────────────────────

/// Centre distance below which two off-screen asteroids count as colliding.
///
/// 0.5 is one asteroid diameter: two radii, i.e. the bodies are touching tips.
pub const COLLISION_THRESHOLD: f32 = 0.5;

/// Whether the collision search also scans the four diagonal chunks.
///
/// Diagonal contacts make up roughly 5 % of off-screen collisions but cost
/// about a third more search time, so they are off by default.
pub const DIAGONAL_CHECKS: bool = false;

// ── Scheduling ────────────────────────────────────────────────────────────────

/// Number of calculation groups; one group is processed per frame.
///
/// Lower values → more accurate off-screen collision timing.
/// Higher values → cheaper frames.  12 groups at 30 FPS behaves like 24 groups
/// at 60 FPS.  Aim for 12 or lower at a 60 FPS target.
pub const GROUP_COUNT: usize = 12;

// ── Respawn ───────────────────────────────────────────────────────────────────

/// Seconds a destroyed asteroid waits before it respawns.
pub const RESPAWN_DURATION: f32 = 1.0;

// ── Observation ───────────────────────────────────────────────────────────────

/// Distance from the observer below which an asteroid is handed to Rapier.
///
/// The binary replaces this with the camera's visible half-width + 1 so the
/// handoff happens just outside the screen edge.
pub const OBSERVATION_RADIUS: f32 = 7.0;

/// Extra world units added to the camera half-width when deriving the
/// observation radius from the window.
pub const OBSERVATION_MARGIN: f32 = 1.0;

/// Camera transform scale: world units per screen pixel.
///
/// At 0.02 a 1200-px window shows 24 world units across, giving an observation
/// radius of 13.
pub const CAMERA_SCALE: f32 = 0.02;

// ── Diagnostics ───────────────────────────────────────────────────────────────

/// Simulated seconds between two collision-statistics log lines.
pub const STATS_INTERVAL_SECS: f32 = 5.0;

// ── Real asteroids (Rapier side) ──────────────────────────────────────────────

/// Collider radius of a promoted asteroid.  Half of [`COLLISION_THRESHOLD`].
pub const REAL_ASTEROID_RADIUS: f32 = 0.25;

/// Restitution coefficient for promoted asteroids.
pub const REAL_ASTEROID_RESTITUTION: f32 = 0.5;
