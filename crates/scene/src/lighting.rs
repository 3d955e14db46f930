//! Studio lighting: ambient fill plus key and back directional lights

use bevy::light::GlobalAmbientLight;
use bevy::prelude::*;
use drape_config::{DrapeConfig, LightingConfig};

/// Illuminance (lux) of a directional light at intensity 1.0
const LUX_PER_UNIT: f32 = 10_000.0;

/// Ambient brightness at intensity 1.0
const AMBIENT_BRIGHTNESS_PER_UNIT: f32 = 500.0;

/// Which studio light an entity is
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudioLight {
    Key,
    Back,
}

/// Plugin for the fixed studio lighting rig
pub struct LightingPlugin;

impl Plugin for LightingPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_lighting);
    }
}

/// Directional light shining from `position` toward the origin
fn directional_light(position: [f32; 3], intensity: f32, shadows: bool) -> (DirectionalLight, Transform) {
    (
        DirectionalLight {
            illuminance: intensity * LUX_PER_UNIT,
            color: Color::WHITE,
            shadows_enabled: shadows,
            ..default()
        },
        Transform::from_translation(Vec3::from_array(position)).looking_at(Vec3::ZERO, Vec3::Y),
    )
}

fn ambient_light(settings: &LightingConfig) -> GlobalAmbientLight {
    let [r, g, b] = settings.ambient_color;
    GlobalAmbientLight {
        color: Color::srgb(r, g, b),
        brightness: settings.ambient_intensity * AMBIENT_BRIGHTNESS_PER_UNIT,
        ..default()
    }
}

fn setup_lighting(mut commands: Commands, config: Res<DrapeConfig>) {
    let settings = &config.viewer.lighting;

    commands.spawn((
        directional_light(settings.key_position, settings.key_intensity, true),
        StudioLight::Key,
    ));
    commands.spawn((
        directional_light(settings.back_position, settings.back_intensity, false),
        StudioLight::Back,
    ));

    // Global ambient light is a resource, not an entity
    commands.insert_resource(ambient_light(settings));

    info!("Studio lighting initialized");
}
