use bevy::prelude::*;

pub(super) fn plugin(app: &mut App) {
    app.insert_resource(ClearColor(Color::srgb(0.35, 0.48, 0.66)));
    app.add_systems(Startup, setup);
}

fn setup(mut commands: Commands) {
    info!("World setup");

    // sun
    commands.spawn((
        DirectionalLight {
            shadows_enabled: true,
            illuminance: 12_000.0,
            ..default()
        },
        Transform::from_xyz(200.0, 300.0, 120.0).looking_at(Vec3::new(200.0, 0.0, 200.0), Vec3::Y),
    ));
}
