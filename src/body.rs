//! Off-screen asteroid data.
//!
//! A [`SimulatedBody`] is one asteroid as the field engine sees it.  It is
//! created once at population time and never destroyed: it cycles between
//! [`BodyState::Active`] and [`BodyState::Respawning`] while off-screen, and
//! spends time in [`BodyState::Promoted`] while Rapier owns it near the player.

use crate::chunk_grid::ChunkGrid;
use bevy::prelude::*;
use std::fmt;

/// Stable identity of an asteroid, unchanged across respawns and handoffs.
///
/// Ids are issued densely from zero, so an id doubles as the body's slot in
/// the field's body table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyId(pub u32);

impl BodyId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Engine-visible lifecycle of one asteroid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BodyState {
    /// Moving, indexed in the chunk grid, eligible for collisions.
    Active,
    /// Destroyed in an off-screen collision; waiting to reappear.
    Respawning {
        /// Simulated seconds spent dead so far.
        timer: f32,
    },
    /// Owned by the presentation layer; the engine does no work for it.
    Promoted,
}

/// One off-screen asteroid.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedBody {
    pub id: BodyId,
    pub position: Vec2,
    /// Unit heading.
    pub direction: Vec2,
    /// World units per second along `direction`.
    pub speed: f32,
    /// Chunk the body currently belongs to.
    pub cell: IVec2,
    /// Chunk the grid last indexed the body under.
    pub previous_cell: IVec2,
    pub state: BodyState,
}

impl SimulatedBody {
    pub fn new(id: BodyId, position: Vec2, direction: Vec2, speed: f32) -> Self {
        let cell = ChunkGrid::cell_for(position);
        Self {
            id,
            position,
            direction,
            speed,
            cell,
            previous_cell: cell,
            state: BodyState::Active,
        }
    }

    #[inline]
    pub fn velocity(&self) -> Vec2 {
        self.direction * self.speed
    }

    /// Advance the position by `dt` seconds of straight-line motion.
    #[inline]
    pub fn advance(&mut self, dt: f32) {
        self.position += self.velocity() * dt;
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        matches!(self.state, BodyState::Active)
    }

    #[inline]
    pub fn is_respawning(&self) -> bool {
        matches!(self.state, BodyState::Respawning { .. })
    }

    /// `false` while the presentation layer owns the asteroid.
    #[inline]
    pub fn is_simulated(&self) -> bool {
        !matches!(self.state, BodyState::Promoted)
    }

    /// Time spent dead; zero unless respawning.
    #[inline]
    pub fn respawn_timer(&self) -> f32 {
        match self.state {
            BodyState::Respawning { timer } => timer,
            _ => 0.0,
        }
    }

    /// Enter the respawning state with a fresh timer.
    #[inline]
    pub fn destroy(&mut self) {
        self.state = BodyState::Respawning { timer: 0.0 };
    }
}
