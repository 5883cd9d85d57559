//! Respawn timers and relocation for destroyed off-screen asteroids.
//!
//! A destroyed asteroid keeps its id and velocity.  Once its timer runs out it
//! reappears at a random offset from the observer: on each axis the offset is
//! uniform in `[observation_radius, extent]` with a random sign.  Because the
//! offset is at least the radius on *both* axes, the new position is always
//! outside the promotion zone, so a respawn never hands a body straight to
//! Rapier.

use crate::body::{BodyState, SimulatedBody};
use crate::chunk_grid::ChunkGrid;
use bevy::prelude::*;
use rand::Rng;

#[derive(Debug, Clone, Copy)]
pub struct RespawnScheduler {
    /// Seconds a body stays dead.
    pub duration: f32,
    /// Minimum per-axis distance from the observer.
    pub observation_radius: f32,
    /// Maximum per-axis distance from the observer (x, y).
    pub extent: Vec2,
}

impl RespawnScheduler {
    /// Add `dt` to a respawning body's timer and bring it back once expired.
    ///
    /// On expiry the timer resets, the body becomes active, is moved to a fresh
    /// position around `observer` and is indexed into `grid`.  Returns `true`
    /// exactly when that relocation happened.  Bodies that are not respawning
    /// are left alone.
    pub fn advance<R: Rng + ?Sized>(
        &self,
        body: &mut SimulatedBody,
        dt: f32,
        observer: Vec2,
        grid: &mut ChunkGrid,
        rng: &mut R,
    ) -> bool {
        let BodyState::Respawning { timer } = body.state else {
            return false;
        };

        let timer = timer + dt;
        if timer < self.duration {
            body.state = BodyState::Respawning { timer };
            return false;
        }

        body.state = BodyState::Active;
        body.position = self.respawn_position(observer, rng);
        grid.enter(body);
        true
    }

    /// Random position outside the observation radius but within the extent.
    pub fn respawn_position<R: Rng + ?Sized>(&self, observer: Vec2, rng: &mut R) -> Vec2 {
        let offset = Vec2::new(
            Self::signed_offset(self.observation_radius, self.extent.x, rng),
            Self::signed_offset(self.observation_radius, self.extent.y, rng),
        );
        observer + offset
    }

    fn signed_offset<R: Rng + ?Sized>(min: f32, max: f32, rng: &mut R) -> f32 {
        let magnitude = if max > min {
            rng.gen_range(min..=max)
        } else {
            min
        };
        if rng.gen_bool(0.5) {
            magnitude
        } else {
            -magnitude
        }
    }
}
