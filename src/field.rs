//! The off-screen asteroid field engine.
//!
//! [`AsteroidField`] owns every [`SimulatedBody`] and the indices over them.
//! One call to [`AsteroidField::tick`] processes exactly one calculation group:
//!
//! 1. Active bodies move by `velocity × dt × group_count`, are reindexed in the
//!    chunk grid and collision-checked; a hit destroys both partners.
//! 2. Surviving bodies inside the observation radius are promoted to the
//!    presentation layer.
//! 3. Respawning bodies advance their timer (also scaled by `group_count`) and
//!    reappear outside the observation radius once it expires.
//!
//! Promoted bodies are skipped entirely until the presentation layer hands
//! them back through [`AsteroidField::demote`] or
//! [`AsteroidField::demote_destroyed`].
//!
//! Bodies within a group are visited in spawn order.  A body collides against
//! siblings processed earlier this tick at their new positions and against
//! later ones at their old positions; this asymmetry is accepted.

use crate::body::{BodyId, BodyState, SimulatedBody};
use crate::chunk_grid::ChunkGrid;
use crate::collision::{CollisionSearch, CollisionStats};
use crate::config::FieldConfig;
use crate::error::{validate_non_negative, FieldError, FieldResult};
use crate::promotion::{PresentationLayer, Promotion, PromotionGate};
use crate::respawn::RespawnScheduler;
use crate::scheduler::GroupScheduler;
use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// What one tick did.  Mostly useful for tests and diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Group processed by this tick.
    pub group: usize,
    /// Active bodies moved.
    pub moved: usize,
    /// Collisions found (each destroys two bodies).
    pub collisions: usize,
    /// Bodies that finished respawning.
    pub respawns: usize,
    /// Bodies handed to the presentation layer.
    pub promotions: usize,
}

/// Head count per lifecycle state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Census {
    pub active: usize,
    pub respawning: usize,
    pub promoted: usize,
}

pub struct AsteroidField {
    bodies: Vec<SimulatedBody>,
    grid: ChunkGrid,
    groups: GroupScheduler,
    collisions: CollisionSearch,
    respawn: RespawnScheduler,
    gate: PromotionGate,
    stats: CollisionStats,
    rng: StdRng,
    min_speed: f32,
    max_speed: f32,
    lattice: UVec2,
    spawn_spacing: f32,
}

impl AsteroidField {
    /// Build an empty field.  Fails if `config` does not validate.
    pub fn new(config: &FieldConfig) -> FieldResult<Self> {
        config.validate()?;

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            bodies: Vec::new(),
            grid: ChunkGrid::default(),
            groups: GroupScheduler::new(config.group_count),
            collisions: CollisionSearch::new(config.collision_threshold, config.diagonal_checks),
            respawn: RespawnScheduler {
                duration: config.respawn_duration,
                observation_radius: config.observation_radius,
                extent: config.respawn_extent(),
            },
            gate: PromotionGate::new(config.observation_radius),
            stats: CollisionStats::default(),
            rng,
            min_speed: config.min_speed,
            max_speed: config.max_speed,
            lattice: UVec2::new(config.grid_width, config.grid_length),
            spawn_spacing: config.spawn_spacing,
        })
    }

    /// Fill the field with the start lattice: `grid_width × grid_length` bodies
    /// `spawn_spacing` apart, centred on the origin, with random headings and
    /// speeds.  Returns the number of bodies spawned.
    pub fn populate(&mut self) -> usize {
        let half = self.lattice / 2;
        let before = self.bodies.len();

        for i in 0..self.lattice.x {
            for j in 0..self.lattice.y {
                let position = Vec2::new(
                    (i as i64 - half.x as i64) as f32,
                    (j as i64 - half.y as i64) as f32,
                ) * self.spawn_spacing;
                self.spawn_random(position);
            }
        }

        let spawned = self.bodies.len() - before;
        info!(
            "Populated asteroid field: {} bodies in {} groups over {} chunks",
            spawned,
            self.groups.group_count(),
            self.grid.cell_count()
        );
        spawned
    }

    /// Spawn a body at `position` with a random heading and speed.
    pub fn spawn_random(&mut self, position: Vec2) -> BodyId {
        let direction = Vec2::new(
            self.rng.gen_range(-1.0..=1.0),
            self.rng.gen_range(-1.0..=1.0),
        );
        let speed = if self.max_speed > self.min_speed {
            self.rng.gen_range(self.min_speed..self.max_speed)
        } else {
            self.min_speed
        };
        self.spawn_body(position, direction, speed)
    }

    /// Spawn an active body, assign it a group and index it.
    ///
    /// `direction` is normalised; a zero vector falls back to +X.
    pub fn spawn_body(&mut self, position: Vec2, direction: Vec2, speed: f32) -> BodyId {
        let id = BodyId(self.bodies.len() as u32);
        let direction = direction.try_normalize().unwrap_or(Vec2::X);

        let mut body = SimulatedBody::new(id, position, direction, speed);
        self.grid.enter(&mut body);
        self.groups.assign(id);
        self.bodies.push(body);
        id
    }

    /// Process the next calculation group.
    ///
    /// `dt` is the frame time; it is scaled by the group count internally.
    pub fn tick<P: PresentationLayer + ?Sized>(
        &mut self,
        dt: f32,
        observer: Vec2,
        presentation: &mut P,
    ) -> TickReport {
        let group = self.groups.advance();
        let scaled_dt = dt * self.groups.time_scale();
        let mut report = TickReport {
            group,
            ..Default::default()
        };

        for &id in self.groups.members(group) {
            let body = &mut self.bodies[id.index()];
            match body.state {
                BodyState::Promoted => {}
                BodyState::Respawning { .. } => {
                    if self
                        .respawn
                        .advance(body, scaled_dt, observer, &mut self.grid, &mut self.rng)
                    {
                        report.respawns += 1;
                        debug!("Asteroid {} respawned at {:?}", id, body.position);
                    }
                }
                BodyState::Active => {
                    body.advance(scaled_dt);
                    self.grid.reindex(body);
                    report.moved += 1;

                    if let Some(hit) =
                        self.collisions
                            .find_collision(&mut self.grid, &mut self.bodies, id)
                    {
                        self.stats.record(hit.kind);
                        report.collisions += 1;
                        continue;
                    }

                    if let Some(promotion) = self.gate.check_promotion(
                        &mut self.bodies[id.index()],
                        observer,
                        &mut self.grid,
                    ) {
                        debug!("Promoting asteroid {} at {:?}", id, promotion.position);
                        presentation.promote(promotion);
                        report.promotions += 1;
                    }
                }
            }
        }

        report
    }

    /// Hand a specific active body to the presentation layer now, regardless of
    /// distance.
    pub fn promote<P: PresentationLayer + ?Sized>(
        &mut self,
        id: BodyId,
        presentation: &mut P,
    ) -> FieldResult<Promotion> {
        let body = Self::slot(&mut self.bodies, id)?;
        let promotion = self.gate.promote(body, &mut self.grid)?;
        presentation.promote(promotion);
        Ok(promotion)
    }

    /// Take back a promoted body at the position its real counterpart reached.
    pub fn demote(&mut self, id: BodyId, position: Vec2) -> FieldResult<()> {
        let body = Self::slot(&mut self.bodies, id)?;
        self.gate.demote(body, position, &mut self.grid)
    }

    /// Take back a promoted body whose real counterpart was destroyed.
    pub fn demote_destroyed(&mut self, id: BodyId) -> FieldResult<()> {
        let body = Self::slot(&mut self.bodies, id)?;
        self.gate.demote_destroyed(body)
    }

    /// Change the promotion distance (e.g. after a window resize).
    ///
    /// The respawn zone follows so respawns stay outside it.
    pub fn set_observation_radius(&mut self, radius: f32) -> FieldResult<()> {
        validate_non_negative("observation_radius", radius)?;
        let limit = self.respawn.extent.min_element();
        if radius >= limit {
            return Err(FieldError::InvalidConfig {
                name: "observation_radius",
                value: radius,
                expected: "< respawn extent",
            });
        }
        self.gate.observation_radius = radius;
        self.respawn.observation_radius = radius;
        Ok(())
    }

    pub fn observation_radius(&self) -> f32 {
        self.gate.observation_radius
    }

    pub fn body(&self, id: BodyId) -> Option<&SimulatedBody> {
        self.bodies.get(id.index())
    }

    pub fn bodies(&self) -> &[SimulatedBody] {
        &self.bodies
    }

    pub fn grid(&self) -> &ChunkGrid {
        &self.grid
    }

    pub fn group_count(&self) -> usize {
        self.groups.group_count()
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn census(&self) -> Census {
        let mut census = Census::default();
        for body in &self.bodies {
            match body.state {
                BodyState::Active => census.active += 1,
                BodyState::Respawning { .. } => census.respawning += 1,
                BodyState::Promoted => census.promoted += 1,
            }
        }
        census
    }

    /// Collision counts since the last [`Self::take_stats`].
    pub fn stats(&self) -> CollisionStats {
        self.stats
    }

    /// Return and reset the collision counts.
    pub fn take_stats(&mut self) -> CollisionStats {
        std::mem::take(&mut self.stats)
    }

    /// Audit the chunk index against every body.
    ///
    /// Checks that each active body is listed exactly once, in the chunk its
    /// position floors to, that nothing else is listed, and that no chunk entry
    /// is empty.
    pub fn verify_index(&self) -> FieldResult<()> {
        for (cell, ids) in self.grid.iter() {
            if ids.is_empty() {
                return Err(FieldError::IndexCorrupted {
                    id: None,
                    detail: format!("chunk {:?} is listed but empty", cell),
                });
            }

            for &id in ids {
                let body = self.body(id).ok_or(FieldError::UnknownBody { id })?;
                if !body.is_active() {
                    return Err(corrupted(id, format!("{:?} body listed in {:?}", body.state, cell)));
                }
                if body.previous_cell != cell {
                    return Err(corrupted(
                        id,
                        format!("listed in {:?} but tracked in {:?}", cell, body.previous_cell),
                    ));
                }
            }
        }

        let mut active = 0;
        for body in self.bodies.iter().filter(|body| body.is_active()) {
            active += 1;
            let expected = ChunkGrid::cell_for(body.position);
            if body.cell != expected || body.previous_cell != expected {
                return Err(corrupted(
                    body.id,
                    format!(
                        "position {:?} floors to {:?}, tracked as {:?}/{:?}",
                        body.position, expected, body.cell, body.previous_cell
                    ),
                ));
            }
            let listings = self
                .grid
                .bodies_in(expected)
                .iter()
                .filter(|&&other| other == body.id)
                .count();
            if listings != 1 {
                return Err(corrupted(
                    body.id,
                    format!("listed {} times in {:?}", listings, expected),
                ));
            }
        }

        let indexed = self.grid.occupant_count();
        if indexed != active {
            return Err(FieldError::IndexCorrupted {
                id: None,
                detail: format!("{} ids indexed for {} active bodies", indexed, active),
            });
        }

        Ok(())
    }

    fn slot(bodies: &mut [SimulatedBody], id: BodyId) -> FieldResult<&mut SimulatedBody> {
        bodies
            .get_mut(id.index())
            .ok_or(FieldError::UnknownBody { id })
    }
}

fn corrupted(id: BodyId, detail: String) -> FieldError {
    FieldError::IndexCorrupted {
        id: Some(id),
        detail,
    }
}
