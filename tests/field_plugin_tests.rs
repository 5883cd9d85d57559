//! Headless tests for [`AsteroidFieldPlugin`] and the Rapier handoff systems.
//!
//! These tests use [`MinimalPlugins`] (no window and no Rapier pipeline), so
//! real asteroids are plain entities carrying Rapier components
//! that nothing integrates.  That keeps their transforms exactly where the
//! tests put them.
//!
//! Covered scenarios:
//! 1. Startup builds and populates the field from `FieldConfig`.
//! 2. An invalid config leaves the app running without a field.
//! 3. A body inside the observation radius becomes one `RealAsteroid` entity.
//! 4. A real asteroid outside the radius is demoted at its current position.
//! 5. `RealAsteroidDestroyed` demotes into the respawning state.
//! 6. `FieldPaused` freezes the field and the statistics clock.
//! 7. The primary window drives the observation radius; a radius the field
//!    refuses is remembered rather than retried every frame.

use asteroid_field::body::BodyId;
use asteroid_field::config::FieldConfig;
use asteroid_field::plugin::{ObservationRadiusSync, StatsLogTimer};
use asteroid_field::presentation::{
    demote_real_asteroids_system, AsteroidDemoted, RealAsteroid, RealAsteroidDestroyed,
};
use asteroid_field::{AsteroidField, AsteroidFieldPlugin, FieldObserver, FieldPaused, FieldSim};
use bevy::prelude::*;
use bevy::window::{PrimaryWindow, WindowResolution};
use bevy_rapier2d::prelude::Velocity;

// ── Helpers ───────────────────────────────────────────────────────────────────

fn small_config() -> FieldConfig {
    FieldConfig {
        grid_width: 20,
        grid_length: 20,
        group_count: 1,
        seed: Some(21),
        ..Default::default()
    }
}

/// Every `AsteroidDemoted` seen so far.
#[derive(Resource, Default)]
struct DemotionLog(Vec<AsteroidDemoted>);

fn record_demotions(mut demoted: MessageReader<AsteroidDemoted>, mut log: ResMut<DemotionLog>) {
    log.0.extend(demoted.read().copied());
}

fn demotions(app: &App) -> &[AsteroidDemoted] {
    &app.world().resource::<DemotionLog>().0
}

/// Build a headless app whose startup population is replaced by `field`.
///
/// The observer starts far away so the startup lattice promotes nothing, then
/// moves to the origin once the custom field is installed.
fn app_with_field(field: AsteroidField) -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.insert_resource(small_config());
    app.add_plugins(AsteroidFieldPlugin {
        load_config_file: false,
    });
    app.init_resource::<DemotionLog>();
    app.add_systems(Update, record_demotions.after(demote_real_asteroids_system));
    app.world_mut()
        .spawn((FieldObserver, Transform::from_xyz(10_000.0, 10_000.0, 0.0)));
    app.update(); // Startup builds the default field

    app.world_mut().insert_resource(FieldSim(field));
    set_observer(&mut app, Vec2::ZERO);
    app
}

fn set_observer(app: &mut App, position: Vec2) {
    let world = app.world_mut();
    let mut query = world.query_filtered::<&mut Transform, With<FieldObserver>>();
    for mut transform in query.iter_mut(world) {
        transform.translation = position.extend(0.0);
    }
}

fn real_asteroids(app: &mut App) -> Vec<(Entity, RealAsteroid, Vec2)> {
    let world = app.world_mut();
    let mut query = world.query::<(Entity, &RealAsteroid, &Transform)>();
    query
        .iter(world)
        .map(|(entity, real, transform)| (entity, *real, transform.translation.truncate()))
        .collect()
}

/// A one-group field with a single motionless body at `position`.
fn single_body_field(position: Vec2) -> (AsteroidField, BodyId) {
    let mut field = AsteroidField::new(&small_config()).expect("valid config");
    let id = field.spawn_body(position, Vec2::Y, 0.0);
    (field, id)
}

/// Promote the single body by running one frame with it inside the radius.
fn promoted_app() -> (App, BodyId, Entity) {
    let (field, id) = single_body_field(Vec2::new(2.5, 0.5));
    let mut app = app_with_field(field);
    app.update();
    let real = real_asteroids(&mut app);
    assert_eq!(real.len(), 1, "exactly one real asteroid after promotion");
    (app, id, real[0].0)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[test]
fn startup_populates_field_from_config() {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.insert_resource(small_config());
    app.add_plugins(AsteroidFieldPlugin {
        load_config_file: false,
    });
    app.update();

    let sim = app.world().resource::<FieldSim>();
    assert_eq!(sim.0.len(), 400);
    assert_eq!(sim.0.group_count(), 1);
    assert_eq!(sim.0.verify_index(), Ok(()));
}

#[test]
fn invalid_config_leaves_app_without_field() {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.insert_resource(FieldConfig {
        group_count: 0,
        ..Default::default()
    });
    app.add_plugins(AsteroidFieldPlugin {
        load_config_file: false,
    });
    app.world_mut().spawn((FieldObserver, Transform::default()));

    for _ in 0..3 {
        app.update();
    }

    assert!(app.world().get_resource::<FieldSim>().is_none());
}

#[test]
fn nearby_body_becomes_a_real_asteroid() {
    let (mut app, id, entity) = promoted_app();

    let real = real_asteroids(&mut app);
    assert_eq!(real[0].1, RealAsteroid { id });
    assert_eq!(real[0].2, Vec2::new(2.5, 0.5));

    let velocity = app
        .world()
        .get::<Velocity>(entity)
        .expect("real asteroid carries a Rapier velocity");
    assert_eq!(velocity.linvel, Vec2::ZERO);

    let sim = app.world().resource::<FieldSim>();
    assert!(!sim.0.body(id).unwrap().is_simulated());
    assert_eq!(sim.0.grid().occupant_count(), 0);

    // Further frames must not promote it again.
    app.update();
    assert_eq!(real_asteroids(&mut app).len(), 1);
}

#[test]
fn far_real_asteroid_is_demoted_at_its_position() {
    let (mut app, id, entity) = promoted_app();

    app.world_mut()
        .get_mut::<Transform>(entity)
        .unwrap()
        .translation = Vec3::new(30.25, -4.5, 0.0);
    app.update();

    assert!(real_asteroids(&mut app).is_empty());
    let sim = app.world().resource::<FieldSim>();
    let body = sim.0.body(id).unwrap();
    assert!(body.is_active());
    assert_eq!(body.position, Vec2::new(30.25, -4.5));
    assert_eq!(sim.0.grid().bodies_in(IVec2::new(30, -5)), &[id]);
    assert_eq!(sim.0.verify_index(), Ok(()));

    assert_eq!(
        demotions(&app),
        &[AsteroidDemoted {
            id,
            position: Vec2::new(30.25, -4.5),
            destroyed: false,
        }]
    );
}

#[test]
fn destroyed_real_asteroid_returns_as_respawning() {
    let (mut app, id, entity) = promoted_app();

    app.world_mut()
        .write_message(RealAsteroidDestroyed { entity });
    app.update();

    assert!(real_asteroids(&mut app).is_empty());
    let sim = app.world().resource::<FieldSim>();
    let body = sim.0.body(id).unwrap();
    assert!(body.is_simulated());
    assert!(body.is_respawning());
    assert_eq!(body.respawn_timer(), 0.0);
    assert_eq!(sim.0.verify_index(), Ok(()));

    assert_eq!(
        demotions(&app),
        &[AsteroidDemoted {
            id,
            position: Vec2::new(2.5, 0.5),
            destroyed: true,
        }]
    );
}

#[test]
fn rejected_handoff_writes_no_demotion() {
    // The body never left the field, so handing it back is stale.
    let (field, id) = single_body_field(Vec2::new(50.5, 50.5));
    let mut app = app_with_field(field);
    app.world_mut().spawn((
        RealAsteroid { id },
        Transform::from_xyz(40.0, 0.0, 0.0),
    ));

    app.update();

    assert!(real_asteroids(&mut app).is_empty());
    assert!(demotions(&app).is_empty());
    let sim = app.world().resource::<FieldSim>();
    let body = sim.0.body(id).unwrap();
    assert!(body.is_active());
    assert_eq!(body.position, Vec2::new(50.5, 50.5));
    assert_eq!(sim.0.verify_index(), Ok(()));
}

#[test]
fn paused_field_does_not_move() {
    let mut field = AsteroidField::new(&small_config()).unwrap();
    let id = field.spawn_body(Vec2::new(50.5, 50.5), Vec2::X, 2.0);
    let mut app = app_with_field(field);
    app.insert_resource(FieldPaused(true));
    app.insert_resource(StatsLogTimer::default());

    for _ in 0..5 {
        app.update();
    }

    let sim = app.world().resource::<FieldSim>();
    assert_eq!(sim.0.body(id).unwrap().position, Vec2::new(50.5, 50.5));
    assert_eq!(app.world().resource::<StatsLogTimer>().elapsed, 0.0);
}

fn spawn_primary_window(app: &mut App, width: u32) {
    app.world_mut().spawn((
        Window {
            resolution: WindowResolution::new(width, 680),
            ..Default::default()
        },
        PrimaryWindow,
    ));
}

#[test]
fn window_width_sets_observation_radius() {
    let (field, _) = single_body_field(Vec2::new(50.5, 50.5));
    let mut app = app_with_field(field);
    spawn_primary_window(&mut app, 1200);

    app.update();

    // 600 px * 0.02 world units per px + 1 unit margin.
    let radius = app.world().resource::<FieldSim>().0.observation_radius();
    assert!((radius - 13.0).abs() < 1e-4, "radius = {radius}");
    assert_eq!(app.world().resource::<ObservationRadiusSync>().rejected, None);
}

#[test]
fn too_wide_window_is_rejected_once_and_remembered() {
    // 2000 px gives a radius of 21, beyond the 20-unit respawn extent.
    let (field, _) = single_body_field(Vec2::new(50.5, 50.5));
    let mut app = app_with_field(field);
    spawn_primary_window(&mut app, 2000);

    for _ in 0..3 {
        app.update();
    }

    assert_eq!(app.world().resource::<FieldSim>().0.observation_radius(), 7.0);
    let rejected = app
        .world()
        .resource::<ObservationRadiusSync>()
        .rejected
        .expect("radius remembered as rejected");
    assert!((rejected - 21.0).abs() < 1e-4, "rejected = {rejected}");
}
