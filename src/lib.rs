//! Off-screen asteroid field library
//!
//! Thousands of asteroids are simulated cheaply off-screen on a unit chunk
//! grid, one calculation group per frame, and handed to Rapier for exact
//! physics once they come near the observer.
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | [`body`] | `SimulatedBody`, ids and the lifecycle state |
//! | [`chunk_grid`] | Lazily maintained chunk → body index |
//! | [`collision`] | Own-chunk + neighbour-chunk collision search |
//! | [`scheduler`] | Round-robin calculation groups |
//! | [`respawn`] | Respawn timers and relocation |
//! | [`promotion`] | Handoff to / from the presentation layer |
//! | [`field`] | The engine tying the above together |
//! | [`plugin`] / [`presentation`] | Bevy + Rapier integration |

pub mod body;
pub mod chunk_grid;
pub mod collision;
pub mod config;
pub mod constants;
pub mod error;
pub mod field;
pub mod plugin;
pub mod presentation;
pub mod promotion;
pub mod respawn;
pub mod scheduler;

pub use field::AsteroidField;
pub use plugin::{AsteroidFieldPlugin, FieldObserver, FieldPaused, FieldSim};
