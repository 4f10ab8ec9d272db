use bevy::prelude::*;
use leafwing_input_manager::prelude::*;

#[derive(Reflect, Actionlike, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InputAction {
    OrbitLeft,
    OrbitRight,
    ZoomIn,
    ZoomOut,
    /// Loopback only: build a new level with the next seed.
    Regenerate,
}

pub(super) fn plugin(app: &mut App) {
    app.add_plugins(InputManagerPlugin::<InputAction>::default());

    app.register_type::<InputAction>();

    let mut input_map = InputMap::<InputAction>::default();
    input_map.insert(InputAction::OrbitLeft, KeyCode::KeyA);
    input_map.insert(InputAction::OrbitLeft, KeyCode::ArrowLeft);
    input_map.insert(InputAction::OrbitRight, KeyCode::KeyD);
    input_map.insert(InputAction::OrbitRight, KeyCode::ArrowRight);
    input_map.insert(InputAction::ZoomIn, KeyCode::KeyW);
    input_map.insert(InputAction::ZoomOut, KeyCode::KeyS);
    input_map.insert(InputAction::Regenerate, KeyCode::KeyR);
    app.insert_resource(input_map);
    app.insert_resource(ActionState::<InputAction>::default());
}
