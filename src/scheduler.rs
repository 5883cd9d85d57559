//! Round-robin calculation groups.
//!
//! The population is split into `group_count` fixed groups when bodies are
//! spawned.  Each tick processes exactly one group, so every body is updated
//! once per `group_count` ticks; callers scale that body's time step by
//! [`GroupScheduler::time_scale`] to keep average speed and respawn delay
//! correct.

use crate::body::BodyId;

#[derive(Debug, Clone)]
pub struct GroupScheduler {
    groups: Vec<Vec<BodyId>>,
    /// Group that receives the next spawned body.
    next_assignment: usize,
    /// Group processed by the next tick.
    next_group: usize,
}

impl GroupScheduler {
    /// `group_count` must be at least 1; the field validates this first.
    pub fn new(group_count: usize) -> Self {
        let group_count = group_count.max(1);
        Self {
            groups: vec![Vec::new(); group_count],
            next_assignment: 0,
            next_group: 0,
        }
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Multiplier for per-body time deltas.
    #[inline]
    pub fn time_scale(&self) -> f32 {
        self.groups.len() as f32
    }

    /// Put a newly spawned body in the next group, round-robin.
    /// Returns the group index.
    pub fn assign(&mut self, id: BodyId) -> usize {
        let group = self.next_assignment;
        self.groups[group].push(id);
        self.next_assignment = (self.next_assignment + 1) % self.groups.len();
        group
    }

    /// Select the group for this tick and move the counter on.
    pub fn advance(&mut self) -> usize {
        let group = self.next_group;
        self.next_group = (self.next_group + 1) % self.groups.len();
        group
    }

    /// Group the next call to [`Self::advance`] will return.
    pub fn peek(&self) -> usize {
        self.next_group
    }

    /// Members of `group` in insertion order.
    pub fn members(&self, group: usize) -> &[BodyId] {
        &self.groups[group]
    }

    pub fn groups(&self) -> impl Iterator<Item = &[BodyId]> {
        self.groups.iter().map(Vec::as_slice)
    }
}
