//! Chunk grid: the spatial index behind off-screen collision checks.
//!
//! The world is cut into unit squares ("chunks").  Each occupied chunk maps to
//! the ordered list of asteroid ids inside it; unoccupied chunks have no entry
//! at all, so the map only grows with the occupied area, not the world size.
//!
//! ## Incremental maintenance
//!
//! Unlike a per-frame rebuild, the grid is updated lazily: [`ChunkGrid::reindex`]
//! only touches the map when a body actually crossed a chunk border since its
//! last update.  Cost is proportional to border crossings, not population.
//!
//! ## Invariants
//!
//! - An active body is listed in exactly one chunk: `body.previous_cell`,
//!   which equals `ChunkGrid::cell_for(body.position)` after every reindex.
//! - No chunk entry is ever empty; the last removal prunes the entry.

use crate::body::{BodyId, SimulatedBody};
use crate::constants::CELL_SIZE;
use bevy::prelude::*;
use std::collections::HashMap;

/// Map from chunk coordinates to the ids of the asteroids inside.
///
/// Stores ids rather than bodies so the grid never owns simulation data; the
/// body table lives in [`crate::field::AsteroidField`].
#[derive(Debug, Clone, Default)]
pub struct ChunkGrid {
    cells: HashMap<IVec2, Vec<BodyId>>,
}

impl ChunkGrid {
    /// Chunk coordinates for a world position (component-wise floor).
    #[inline]
    pub fn cell_for(pos: Vec2) -> IVec2 {
        (pos / CELL_SIZE).floor().as_ivec2()
    }

    /// Append `id` to the chunk at `cell`, creating the entry if needed.
    pub fn insert(&mut self, id: BodyId, cell: IVec2) {
        self.cells.entry(cell).or_default().push(id);
    }

    /// Remove `id` from the chunk at `cell`, pruning the chunk if it empties.
    ///
    /// Returns `false` if the id was not listed there.
    pub fn remove(&mut self, id: BodyId, cell: IVec2) -> bool {
        let Some(occupants) = self.cells.get_mut(&cell) else {
            return false;
        };
        let Some(slot) = occupants.iter().position(|&other| other == id) else {
            return false;
        };
        // Keep insertion order; collision scans depend on it.
        occupants.remove(slot);
        if occupants.is_empty() {
            self.cells.remove(&cell);
        }
        true
    }

    /// Ids in the chunk at `cell`; empty if nobody is there.
    #[inline]
    pub fn bodies_in(&self, cell: IVec2) -> &[BodyId] {
        self.cells.get(&cell).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Bring the grid up to date after `body` moved.
    ///
    /// Recomputes `body.cell`; if it differs from `body.previous_cell` the id is
    /// moved between the two chunk lists and `previous_cell` catches up.
    /// Returns `true` if the body changed chunk.  Calling this again without
    /// moving the body does nothing.
    pub fn reindex(&mut self, body: &mut SimulatedBody) -> bool {
        body.cell = Self::cell_for(body.position);
        if body.cell == body.previous_cell {
            return false;
        }

        self.remove(body.id, body.previous_cell);
        self.insert(body.id, body.cell);
        body.previous_cell = body.cell;
        true
    }

    /// Index a body that is currently not in the grid (spawn, respawn, demotion).
    ///
    /// The chunk it was last listed under is irrelevant: it was already removed
    /// when it left, so re-entering the same chunk it died in is the normal case.
    pub fn enter(&mut self, body: &mut SimulatedBody) {
        body.cell = Self::cell_for(body.position);
        body.previous_cell = body.cell;
        self.insert(body.id, body.cell);
    }

    /// Drop a body from the chunk it is listed under.
    pub fn leave(&mut self, body: &SimulatedBody) -> bool {
        self.remove(body.id, body.previous_cell)
    }

    /// `true` if `id` is listed in the chunk at `cell`.
    pub fn contains(&self, id: BodyId, cell: IVec2) -> bool {
        self.bodies_in(cell).contains(&id)
    }

    /// Number of occupied chunks.
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Total number of indexed ids across all chunks.
    pub fn occupant_count(&self) -> usize {
        self.cells.values().map(Vec::len).sum()
    }

    /// Iterate over every occupied chunk and its occupants.
    pub fn iter(&self) -> impl Iterator<Item = (IVec2, &[BodyId])> {
        self.cells.iter().map(|(cell, ids)| (*cell, ids.as_slice()))
    }
}
