use crate::input::InputAction;
use crate::level::ObservedLevel;
use bevy::{
    camera::Exposure,
    pbr::{AtmosphereMode, AtmosphereSettings},
    prelude::*,
};
use leafwing_input_manager::prelude::*;

pub(super) fn plugin(app: &mut App) {
    app.init_resource::<OrbitCamera>();
    app.add_systems(Startup, add_camera);
    app.add_systems(Update, (focus_on_level, orbit_input));
    app.add_systems(PostUpdate, follow_orbit);
}

const ORBIT_SPEED_RAD: f32 = 1.2;
const ZOOM_SPEED: f32 = 120.0;
const MIN_DISTANCE: f32 = 20.0;
const MAX_DISTANCE: f32 = 900.0;
const CAMERA_DECAY_RATE: f32 = 12.0;

/// Camera orbiting the center of the world.
#[derive(Resource, Debug)]
struct OrbitCamera {
    focus: Vec3,
    yaw: f32,
    pitch: f32,
    distance: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            focus: Vec3::ZERO,
            yaw: std::f32::consts::FRAC_PI_4,
            pitch: 0.6,
            distance: 420.0,
        }
    }
}

impl OrbitCamera {
    fn eye(&self) -> Vec3 {
        let offset = Vec3::new(
            self.yaw.sin() * self.pitch.cos(),
            self.pitch.sin(),
            self.yaw.cos() * self.pitch.cos(),
        );
        self.focus + offset * self.distance
    }
}

fn add_camera(mut commands: Commands, orbit: Res<OrbitCamera>) {
    commands.spawn((
        Exposure { ev100: 16.0 },
        bevy::core_pipeline::tonemapping::Tonemapping::AcesFitted,
        Camera3d::default(),
        Transform::from_translation(orbit.eye()).looking_at(orbit.focus, Vec3::Y),
        DistanceFog {
            color: Color::srgba(0.35, 0.48, 0.66, 1.0),
            directional_light_color: Color::srgba(1.0, 0.95, 0.85, 0.5),
            directional_light_exponent: 30.0,
            falloff: FogFalloff::from_visibility_colors(
                1500.0, // Fog distance
                Color::srgb(0.35, 0.5, 0.66),
                Color::srgb(0.8, 0.8, 0.7),
            ),
        },
        AtmosphereSettings {
            rendering_method: AtmosphereMode::Raymarched,
            ..default()
        },
    ));
}

fn focus_on_level(level: Option<Res<ObservedLevel>>, mut orbit: ResMut<OrbitCamera>) {
    let Some(level) = level else {
        return;
    };
    if !level.is_added() {
        return;
    }
    let bounds = level.session.config().bounds;
    orbit.focus = Vec3::new(bounds.width * 0.5, 0.0, bounds.depth * 0.5);
}

fn orbit_input(
    action_state: Res<ActionState<InputAction>>,
    mut orbit: ResMut<OrbitCamera>,
    time: Res<Time>,
) {
    let dt = time.delta_secs();
    if action_state.pressed(&InputAction::OrbitLeft) {
        orbit.yaw -= ORBIT_SPEED_RAD * dt;
    }
    if action_state.pressed(&InputAction::OrbitRight) {
        orbit.yaw += ORBIT_SPEED_RAD * dt;
    }
    if action_state.pressed(&InputAction::ZoomIn) {
        orbit.distance -= ZOOM_SPEED * dt;
    }
    if action_state.pressed(&InputAction::ZoomOut) {
        orbit.distance += ZOOM_SPEED * dt;
    }
    orbit.distance = orbit.distance.clamp(MIN_DISTANCE, MAX_DISTANCE);
}

fn follow_orbit(
    mut camera_query: Query<&mut Transform, With<Camera3d>>,
    orbit: Res<OrbitCamera>,
    time: Res<Time>,
) {
    let Ok(mut cam_tf) = camera_query.single_mut() else {
        return;
    };

    let target = orbit.eye();
    cam_tf
        .translation
        .smooth_nudge(&target, CAMERA_DECAY_RATE, time.delta_secs());
    cam_tf.look_at(orbit.focus, Vec3::Y);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eye_sits_at_distance_from_focus() {
        let orbit = OrbitCamera {
            focus: Vec3::new(200.0, 0.0, 200.0),
            ..default()
        };
        assert!((orbit.eye().distance(orbit.focus) - orbit.distance).abs() < 1.0e-3);
        assert!(orbit.eye().y > 0.0);
    }
}
