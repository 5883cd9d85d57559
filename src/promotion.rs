//! Handoff between the off-screen field and the Rapier-simulated "real" asteroids.
//!
//! ## Lifecycle
//!
//! | From        | To          | Trigger                                         |
//! |-------------|-------------|-------------------------------------------------|
//! | `Active`    | `Promoted`  | body moved inside the observation radius       |
//! | `Promoted`  | `Active`    | real asteroid drifted out of range (demotion)  |
//! | `Promoted`  | `Respawning`| real asteroid destroyed near the player         |
//!
//! Every transition checks the current state first.  A handoff that does not
//! start from the expected state is rejected without touching the body or the
//! chunk grid; re-adding an already indexed body would break the
//! one-chunk-per-body invariant.

use crate::body::{BodyId, BodyState, SimulatedBody};
use crate::chunk_grid::ChunkGrid;
use crate::error::{FieldError, FieldResult};
use bevy::prelude::*;

/// Everything the presentation layer needs to take over an asteroid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Promotion {
    pub id: BodyId,
    pub position: Vec2,
    pub velocity: Vec2,
}

/// Consumer of promotions.  The field does not care what happens next.
pub trait PresentationLayer {
    fn promote(&mut self, promotion: Promotion);
}

/// Collecting promotions into a list is enough for batch consumers and tests.
impl PresentationLayer for Vec<Promotion> {
    fn promote(&mut self, promotion: Promotion) {
        self.push(promotion);
    }
}

/// Observation-radius check plus the guarded state transitions.
#[derive(Debug, Clone, Copy)]
pub struct PromotionGate {
    pub observation_radius: f32,
}

impl PromotionGate {
    pub fn new(observation_radius: f32) -> Self {
        Self { observation_radius }
    }

    /// `true` strictly inside the observation radius.
    #[inline]
    pub fn in_range(&self, position: Vec2, observer: Vec2) -> bool {
        position.distance(observer) < self.observation_radius
    }

    /// Promote `body` if it is active and close enough to the observer.
    ///
    /// The body leaves the chunk grid and becomes [`BodyState::Promoted`].
    pub fn check_promotion(
        &self,
        body: &mut SimulatedBody,
        observer: Vec2,
        grid: &mut ChunkGrid,
    ) -> Option<Promotion> {
        if !body.is_active() || !self.in_range(body.position, observer) {
            return None;
        }
        Some(Self::hand_off(body, grid))
    }

    /// Promote `body` regardless of distance.  Must be active.
    pub fn promote(&self, body: &mut SimulatedBody, grid: &mut ChunkGrid) -> FieldResult<Promotion> {
        if !body.is_active() {
            return Err(stale(body));
        }
        Ok(Self::hand_off(body, grid))
    }

    /// Take a promoted body back at the position the presentation layer reports.
    pub fn demote(
        &self,
        body: &mut SimulatedBody,
        position: Vec2,
        grid: &mut ChunkGrid,
    ) -> FieldResult<()> {
        if body.state != BodyState::Promoted {
            return Err(stale(body));
        }
        body.state = BodyState::Active;
        body.position = position;
        grid.enter(body);
        Ok(())
    }

    /// Take back a promoted body that was destroyed while real.
    ///
    /// It re-enters as respawning with a fresh timer and stays out of the grid
    /// until the respawn scheduler relocates it.
    pub fn demote_destroyed(&self, body: &mut SimulatedBody) -> FieldResult<()> {
        if body.state != BodyState::Promoted {
            return Err(stale(body));
        }
        body.destroy();
        Ok(())
    }

    fn hand_off(body: &mut SimulatedBody, grid: &mut ChunkGrid) -> Promotion {
        grid.leave(body);
        body.state = BodyState::Promoted;
        Promotion {
            id: body.id,
            position: body.position,
            velocity: body.velocity(),
        }
    }
}

fn stale(body: &SimulatedBody) -> FieldError {
    FieldError::StaleHandoff {
        id: body.id,
        state: body.state,
    }
}
