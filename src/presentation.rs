//! Rapier-side counterpart of promoted asteroids.
//!
//! A promotion becomes a dynamic Rapier body carrying [`RealAsteroid`] with the
//! field id.  From then on Rapier owns its motion and contacts.  The entity is
//! handed back when it drifts beyond the observation radius (demotion at its
//! current position) or when gameplay reports it destroyed through
//! [`RealAsteroidDestroyed`] (demotion straight into respawn).

use crate::body::BodyId;
use crate::constants::{REAL_ASTEROID_RADIUS, REAL_ASTEROID_RESTITUTION};
use crate::plugin::{FieldObserver, FieldSim};
use crate::promotion::Promotion;
use bevy::prelude::*;
use bevy_rapier2d::prelude::*;

/// Emitted once per asteroid handed from the field to Rapier.
#[derive(Message, Debug, Clone, Copy)]
pub struct AsteroidPromoted(pub Promotion);

/// Emitted once per real asteroid handed back to the field.
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub struct AsteroidDemoted {
    pub id: BodyId,
    pub position: Vec2,
    /// `true` when the asteroid came back destroyed and is now respawning.
    pub destroyed: bool,
}

/// Written by gameplay (projectiles, ship impacts, ...) when a real asteroid
/// is destroyed.
#[derive(Message, Debug, Clone, Copy)]
pub struct RealAsteroidDestroyed {
    pub entity: Entity,
}

/// Links a Rapier entity to its field body.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RealAsteroid {
    pub id: BodyId,
}

/// Spawn one Rapier body per promotion.
pub fn spawn_real_asteroids_system(
    mut commands: Commands,
    mut promoted: MessageReader<AsteroidPromoted>,
) {
    for AsteroidPromoted(promotion) in promoted.read() {
        commands.spawn((
            RealAsteroid { id: promotion.id },
            RigidBody::Dynamic,
            Collider::ball(REAL_ASTEROID_RADIUS),
            Velocity::linear(promotion.velocity),
            GravityScale(0.0),
            Restitution::coefficient(REAL_ASTEROID_RESTITUTION),
            Transform::from_translation(promotion.position.extend(0.0)),
        ));
    }
}

/// Return real asteroids to the field.
///
/// Destroyed ones go back as respawning; survivors beyond the observation
/// radius go back at their current position.  Either way the Rapier entity is
/// despawned.  Rejected handoffs are logged and otherwise ignored.
pub fn demote_real_asteroids_system(
    mut commands: Commands,
    sim: Option<ResMut<FieldSim>>,
    observer: Query<&Transform, With<FieldObserver>>,
    real: Query<(Entity, &RealAsteroid, &Transform)>,
    mut destroyed: MessageReader<RealAsteroidDestroyed>,
    mut demoted: MessageWriter<AsteroidDemoted>,
) {
    let Some(mut sim) = sim else {
        return;
    };
    let field = &mut sim.0;

    let mut handled: Vec<Entity> = Vec::new();
    for event in destroyed.read() {
        let Ok((entity, real_asteroid, transform)) = real.get(event.entity) else {
            continue;
        };
        if handled.contains(&entity) {
            continue;
        }
        match field.demote_destroyed(real_asteroid.id) {
            Ok(()) => {
                demoted.write(AsteroidDemoted {
                    id: real_asteroid.id,
                    position: transform.translation.truncate(),
                    destroyed: true,
                });
            }
            Err(err) => warn!("Ignored destroyed-asteroid handoff: {err}"),
        }
        commands.entity(entity).despawn();
        handled.push(entity);
    }

    let Ok(observer) = observer.single() else {
        return;
    };
    let observer = observer.translation.truncate();
    let radius = field.observation_radius();

    for (entity, real_asteroid, transform) in &real {
        if handled.contains(&entity) {
            continue;
        }
        let position = transform.translation.truncate();
        if position.distance(observer) <= radius {
            continue;
        }
        match field.demote(real_asteroid.id, position) {
            Ok(()) => {
                demoted.write(AsteroidDemoted {
                    id: real_asteroid.id,
                    position,
                    destroyed: false,
                });
            }
            Err(err) => warn!("Ignored out-of-range handoff: {err}"),
        }
        commands.entity(entity).despawn();
    }
}

/// Debug trace of every accepted demotion.
pub fn log_demotions_system(mut demoted: MessageReader<AsteroidDemoted>) {
    for demotion in demoted.read() {
        if demotion.destroyed {
            debug!("Asteroid {} returned destroyed; respawning", demotion.id);
        } else {
            debug!(
                "Asteroid {} returned to the field at {:?}",
                demotion.id, demotion.position
            );
        }
    }
}
