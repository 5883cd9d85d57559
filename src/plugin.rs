//! Bevy plugin driving the off-screen asteroid field.
//!
//! ## Systems
//!
//! | System                                | Schedule  | Purpose                                   |
//! |---------------------------------------|-----------|-------------------------------------------|
//! | `load_field_config`                   | `Startup` | Apply `assets/field.toml` overrides       |
//! | `build_field_system`                  | `Startup` | Validate config, populate [`FieldSim`]    |
//! | `field_tick_system`                   | `Update`  | Process one calculation group             |
//! | `spawn_real_asteroids_system`         | `Update`  | Turn promotions into Rapier bodies        |
//! | `demote_real_asteroids_system`        | `Update`  | Hand far / destroyed real asteroids back  |
//! | `log_demotions_system`                | `Update`  | Debug trace of accepted demotions         |
//! | `collision_stats_log_system`          | `Update`  | Periodic off-screen collision counts      |
//! | `sync_observation_radius_system`      | `Update`  | Derive the radius from the primary window |
//!
//! The `Update` systems are chained, so a body promoted this frame already has
//! its Rapier entity when the demotion pass runs.

use crate::config::{load_field_config, FieldConfig};
use crate::constants::{CAMERA_SCALE, OBSERVATION_MARGIN};
use crate::field::AsteroidField;
use crate::presentation::{
    demote_real_asteroids_system, log_demotions_system, spawn_real_asteroids_system,
    AsteroidDemoted, AsteroidPromoted, RealAsteroidDestroyed,
};
use crate::promotion::{PresentationLayer, Promotion};
use bevy::prelude::*;
use bevy::window::PrimaryWindow;

/// The field engine as a Bevy resource.  Inserted by [`build_field_system`].
#[derive(Resource)]
pub struct FieldSim(pub AsteroidField);

/// While `true` the field does not advance and the group counter holds.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldPaused(pub bool);

/// Marks the entity whose position the field treats as the observer
/// (normally the camera following the player).
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct FieldObserver;

/// Seconds accumulated towards the next statistics log line.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct StatsLogTimer {
    pub elapsed: f32,
}

/// Last window-derived radius the field refused.  Held so a window that is
/// too wide for the respawn extent is reported once, not every frame.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct ObservationRadiusSync {
    pub rejected: Option<f32>,
}

/// Registers the field resources, messages and systems.
///
/// Set `load_config_file` to `false` to keep whatever [`FieldConfig`] the app
/// already holds (headless tests insert their own).
pub struct AsteroidFieldPlugin {
    pub load_config_file: bool,
}

impl Default for AsteroidFieldPlugin {
    fn default() -> Self {
        Self {
            load_config_file: true,
        }
    }
}

impl Plugin for AsteroidFieldPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<FieldConfig>()
            .init_resource::<FieldPaused>()
            .init_resource::<StatsLogTimer>()
            .init_resource::<ObservationRadiusSync>()
            .add_message::<AsteroidPromoted>()
            .add_message::<AsteroidDemoted>()
            .add_message::<RealAsteroidDestroyed>();

        if self.load_config_file {
            app.add_systems(Startup, (load_field_config, build_field_system).chain());
        } else {
            app.add_systems(Startup, build_field_system);
        }

        app.add_systems(
            Update,
            (
                field_tick_system,
                spawn_real_asteroids_system,
                demote_real_asteroids_system,
                log_demotions_system,
                collision_stats_log_system,
            )
                .chain(),
        )
        .add_systems(
            Update,
            sync_observation_radius_system.before(field_tick_system),
        );
    }
}

/// Promotions go straight out as messages.
impl PresentationLayer for MessageWriter<'_, AsteroidPromoted> {
    fn promote(&mut self, promotion: Promotion) {
        self.write(AsteroidPromoted(promotion));
    }
}

/// Startup system: build and populate the field from [`FieldConfig`].
///
/// An invalid configuration is logged and leaves the app without a field;
/// the other systems then do nothing.
pub fn build_field_system(mut commands: Commands, config: Res<FieldConfig>) {
    match AsteroidField::new(&config) {
        Ok(mut field) => {
            field.populate();
            commands.insert_resource(FieldSim(field));
        }
        Err(err) => error!("Asteroid field not started: {err}"),
    }
}

/// Advance one calculation group using this frame's delta time.
pub fn field_tick_system(
    time: Res<Time>,
    paused: Res<FieldPaused>,
    sim: Option<ResMut<FieldSim>>,
    observer: Query<&Transform, With<FieldObserver>>,
    mut promoted: MessageWriter<AsteroidPromoted>,
) {
    if paused.0 {
        return;
    }
    let Some(mut sim) = sim else {
        return;
    };
    let Ok(observer) = observer.single() else {
        return;
    };

    sim.0
        .tick(time.delta_secs(), observer.translation.truncate(), &mut promoted);
}

/// Log and reset the off-screen collision counters every
/// `stats_interval_secs` of simulated time.  Paused frames do not count.
pub fn collision_stats_log_system(
    time: Res<Time>,
    config: Res<FieldConfig>,
    paused: Res<FieldPaused>,
    mut timer: ResMut<StatsLogTimer>,
    sim: Option<ResMut<FieldSim>>,
) {
    if paused.0 {
        return;
    }
    let Some(mut sim) = sim else {
        return;
    };

    timer.elapsed += time.delta_secs();
    if timer.elapsed < config.stats_interval_secs {
        return;
    }

    let stats = sim.0.take_stats();
    let census = sim.0.census();
    info!(
        "{:.2}s off-screen: {} collisions ({} same-chunk, {} orthogonal, {} diagonal) | \
         {} active, {} respawning, {} real",
        timer.elapsed,
        stats.total(),
        stats.same_cell,
        stats.orthogonal,
        stats.diagonal,
        census.active,
        census.respawning,
        census.promoted
    );
    timer.elapsed = 0.0;
}

/// Keep the promotion distance just outside the visible area: half the
/// primary window's width in world units plus a margin.
///
/// Does nothing without a primary window (headless runs).
pub fn sync_observation_radius_system(
    window: Query<&Window, With<PrimaryWindow>>,
    sim: Option<ResMut<FieldSim>>,
    mut sync: ResMut<ObservationRadiusSync>,
) {
    let (Ok(window), Some(mut sim)) = (window.single(), sim) else {
        return;
    };
    let radius = window.width() * 0.5 * CAMERA_SCALE + OBSERVATION_MARGIN;
    if (sim.0.observation_radius() - radius).abs() < f32::EPSILON
        || sync.rejected == Some(radius)
    {
        return;
    }

    match sim.0.set_observation_radius(radius) {
        Ok(()) => {
            sync.rejected = None;
            info!("Observation radius set to {radius:.2}");
        }
        Err(err) => {
            sync.rejected = Some(radius);
            warn!("Keeping observation radius {}: {err}", sim.0.observation_radius());
        }
    }
}
