//! Neighbour-chunk collision search for off-screen asteroids.
//!
//! A body only ever needs its own chunk and the chunks touching it: with the
//! configured speed bounds nothing moves more than one chunk per processed
//! tick, so an undetected overlap can only hide next door.
//!
//! ## Scan order
//!
//! own chunk → N → S → E → W → (NE → SE → NW → SW when diagonal checks are on)
//!
//! The first partner found wins.  There is no nearest-partner
//! selection; a closer contact in a later-scanned chunk is skipped this tick.

use crate::body::{BodyId, SimulatedBody};
use crate::chunk_grid::ChunkGrid;
use bevy::prelude::*;

/// North, south, east, west.
pub const ORTHOGONAL_OFFSETS: [IVec2; 4] = [
    IVec2::new(0, 1),
    IVec2::new(0, -1),
    IVec2::new(1, 0),
    IVec2::new(-1, 0),
];

/// North-east, south-east, north-west, south-west.
pub const DIAGONAL_OFFSETS: [IVec2; 4] = [
    IVec2::new(1, 1),
    IVec2::new(1, -1),
    IVec2::new(-1, 1),
    IVec2::new(-1, -1),
];

/// Where the partner of a collision was found, relative to the searching body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionKind {
    SameCell,
    Orthogonal,
    Diagonal,
}

/// Result of a successful search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Collision {
    pub partner: BodyId,
    pub kind: CollisionKind,
}

/// Distance-threshold collision search over a [`ChunkGrid`].
#[derive(Debug, Clone, Copy)]
pub struct CollisionSearch {
    threshold_sq: f32,
    diagonal_checks: bool,
}

impl CollisionSearch {
    pub fn new(threshold: f32, diagonal_checks: bool) -> Self {
        Self {
            threshold_sq: threshold * threshold,
            diagonal_checks,
        }
    }

    /// `true` if two centres are strictly closer than the threshold.
    #[inline]
    pub fn has_collided(&self, a: Vec2, b: Vec2) -> bool {
        a.distance_squared(b) < self.threshold_sq
    }

    /// Find the first partner of `id` in scan order, without side effects.
    pub fn scan(&self, grid: &ChunkGrid, bodies: &[SimulatedBody], id: BodyId) -> Option<Collision> {
        let body = &bodies[id.index()];
        let origin = body.cell;

        if let Some(partner) = self.scan_cell(grid, bodies, body, origin) {
            return Some(Collision {
                partner,
                kind: CollisionKind::SameCell,
            });
        }

        for offset in ORTHOGONAL_OFFSETS {
            if let Some(partner) = self.scan_cell(grid, bodies, body, origin + offset) {
                return Some(Collision {
                    partner,
                    kind: CollisionKind::Orthogonal,
                });
            }
        }

        if self.diagonal_checks {
            for offset in DIAGONAL_OFFSETS {
                if let Some(partner) = self.scan_cell(grid, bodies, body, origin + offset) {
                    return Some(Collision {
                        partner,
                        kind: CollisionKind::Diagonal,
                    });
                }
            }
        }

        None
    }

    /// Find a partner for `id` and, on a hit, destroy both bodies.
    ///
    /// Both bodies enter the respawning state and leave the grid inside this
    /// call, so no later body in the same pass can collide with either.
    pub fn find_collision(
        &self,
        grid: &mut ChunkGrid,
        bodies: &mut [SimulatedBody],
        id: BodyId,
    ) -> Option<Collision> {
        let collision = self.scan(grid, bodies, id)?;

        for destroyed in [id, collision.partner] {
            let body = &mut bodies[destroyed.index()];
            grid.leave(body);
            body.destroy();
        }

        Some(collision)
    }

    fn scan_cell(
        &self,
        grid: &ChunkGrid,
        bodies: &[SimulatedBody],
        body: &SimulatedBody,
        cell: IVec2,
    ) -> Option<BodyId> {
        grid.bodies_in(cell).iter().copied().find(|&other| {
            other != body.id && self.has_collided(body.position, bodies[other.index()].position)
        })
    }
}

/// Running counts of off-screen collisions, split by where the partner was.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollisionStats {
    pub same_cell: u32,
    pub orthogonal: u32,
    pub diagonal: u32,
}

impl CollisionStats {
    pub fn record(&mut self, kind: CollisionKind) {
        match kind {
            CollisionKind::SameCell => self.same_cell += 1,
            CollisionKind::Orthogonal => self.orthogonal += 1,
            CollisionKind::Diagonal => self.diagonal += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.same_cell + self.orthogonal + self.diagonal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::BodyState;

    /// Build a body table from positions and index every body.
    fn indexed(positions: &[Vec2]) -> (ChunkGrid, Vec<SimulatedBody>) {
        let mut grid = ChunkGrid::default();
        let mut bodies: Vec<SimulatedBody> = positions
            .iter()
            .enumerate()
            .map(|(i, &p)| SimulatedBody::new(BodyId(i as u32), p, Vec2::X, 1.0))
            .collect();
        for body in &mut bodies {
            grid.enter(body);
        }
        (grid, bodies)
    }

    #[test]
    fn same_cell_pair_collides_and_both_leave_the_grid() {
        let (mut grid, mut bodies) = indexed(&[Vec2::new(0.4, 0.5), Vec2::new(0.5, 0.5)]);
        let search = CollisionSearch::new(0.3, false);

        let hit = search.find_collision(&mut grid, &mut bodies, BodyId(0));

        assert_eq!(
            hit,
            Some(Collision {
                partner: BodyId(1),
                kind: CollisionKind::SameCell
            })
        );
        assert!(bodies[0].is_respawning());
        assert!(bodies[1].is_respawning());
        assert_eq!(grid.cell_count(), 0);
    }

    #[test]
    fn body_never_collides_with_itself() {
        let (mut grid, mut bodies) = indexed(&[Vec2::new(0.5, 0.5)]);
        let search = CollisionSearch::new(0.5, true);
        assert!(search.find_collision(&mut grid, &mut bodies, BodyId(0)).is_none());
        assert_eq!(bodies[0].state, BodyState::Active);
    }

    #[test]
    fn orthogonal_neighbour_is_found_across_border() {
        let (grid, bodies) = indexed(&[Vec2::new(0.9, 0.5), Vec2::new(1.1, 0.5)]);
        let search = CollisionSearch::new(0.5, false);
        let hit = search.scan(&grid, &bodies, BodyId(0)).expect("east neighbour");
        assert_eq!(hit.partner, BodyId(1));
        assert_eq!(hit.kind, CollisionKind::Orthogonal);
    }

    #[test]
    fn diagonal_neighbour_needs_the_flag() {
        let (grid, bodies) = indexed(&[Vec2::new(0.9, 0.9), Vec2::new(1.1, 1.1)]);

        let orthogonal_only = CollisionSearch::new(0.5, false);
        assert!(orthogonal_only.scan(&grid, &bodies, BodyId(0)).is_none());

        let with_diagonals = CollisionSearch::new(0.5, true);
        let hit = with_diagonals
            .scan(&grid, &bodies, BodyId(0))
            .expect("north-east neighbour");
        assert_eq!(hit.kind, CollisionKind::Diagonal);
    }

    #[test]
    fn first_found_wins_over_closer_partner_in_later_cell() {
        // Own-cell partner at 0.4, east partner at 0.05: own cell is scanned first.
        let (grid, bodies) = indexed(&[
            Vec2::new(0.98, 0.5),
            Vec2::new(0.58, 0.5),
            Vec2::new(1.03, 0.5),
        ]);
        let search = CollisionSearch::new(0.5, false);
        let hit = search.scan(&grid, &bodies, BodyId(0)).unwrap();
        assert_eq!(hit.partner, BodyId(1));
        assert_eq!(hit.kind, CollisionKind::SameCell);
    }

    #[test]
    fn north_is_scanned_before_east() {
        let (grid, bodies) = indexed(&[
            Vec2::new(0.9, 0.9),
            Vec2::new(1.05, 0.9),
            Vec2::new(0.9, 1.2),
        ]);
        let search = CollisionSearch::new(0.5, false);
        let hit = search.scan(&grid, &bodies, BodyId(0)).unwrap();
        assert_eq!(hit.partner, BodyId(2));
    }

    #[test]
    fn threshold_is_strict() {
        let (grid, bodies) = indexed(&[Vec2::new(0.25, 0.5), Vec2::new(0.75, 0.5)]);
        let search = CollisionSearch::new(0.5, false);
        assert!(search.scan(&grid, &bodies, BodyId(0)).is_none());
    }

    #[test]
    fn stats_count_by_kind() {
        let mut stats = CollisionStats::default();
        stats.record(CollisionKind::SameCell);
        stats.record(CollisionKind::Orthogonal);
        stats.record(CollisionKind::Orthogonal);
        assert_eq!(stats.orthogonal, 2);
        assert_eq!(stats.total(), 3);
    }
}
