use asteroid_field::constants::{CAMERA_SCALE, REAL_ASTEROID_RADIUS};
use asteroid_field::presentation::RealAsteroid;
use asteroid_field::{AsteroidFieldPlugin, FieldObserver, FieldPaused};
use bevy::prelude::*;
use bevy::window::WindowResolution;
use bevy_rapier2d::prelude::*;

/// Camera that doubles as the field observer.
///
/// The transform scale zooms the 2D view so that one world unit (two asteroid
/// diameters) is `1 / CAMERA_SCALE` pixels wide.
fn setup_camera(mut commands: Commands) {
    commands.spawn((
        Camera2d,
        FieldObserver,
        Transform::from_scale(Vec3::splat(CAMERA_SCALE)),
    ));
    println!("✓ Camera / observer spawned at origin");
}

/// Configure Rapier physics: disable gravity for the space simulation.
fn setup_physics_config(mut config: Query<&mut RapierConfiguration>) {
    for mut cfg in config.iter_mut() {
        cfg.gravity = Vec2::ZERO;
    }
}

/// Space toggles the off-screen simulation.
fn pause_toggle_system(keys: Res<ButtonInput<KeyCode>>, mut paused: ResMut<FieldPaused>) {
    if keys.just_pressed(KeyCode::Space) {
        paused.0 = !paused.0;
        info!("Field {}", if paused.0 { "paused" } else { "resumed" });
    }
}

/// Outline every real asteroid.
fn real_asteroid_gizmo_system(
    mut gizmos: Gizmos,
    query: Query<&Transform, With<RealAsteroid>>,
) {
    for transform in &query {
        gizmos.circle_2d(
            transform.translation.truncate(),
            REAL_ASTEROID_RADIUS,
            Color::WHITE,
        );
    }
}

fn main() {
    let mut app = App::new();

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "Asteroid Field".into(),
            resolution: WindowResolution::new(1200, 680),
            ..Default::default()
        }),
        ..Default::default()
    }))
    .insert_resource(ClearColor(Color::BLACK))
    .add_plugins(RapierPhysicsPlugin::<NoUserData>::pixels_per_meter(1.0))
    .add_plugins(AsteroidFieldPlugin::default())
    .add_systems(Startup, (setup_camera, setup_physics_config))
    .add_systems(
        Update,
        (pause_toggle_system, real_asteroid_gizmo_system),
    );

    app.run();
}
