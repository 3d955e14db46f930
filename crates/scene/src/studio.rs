//! Backdrop color and the display platform under the garment.

use bevy::prelude::*;
use drape_config::{DrapeConfig, StudioConfig};
use garment::Rgb;

/// Marker for the cylindrical display platform
#[derive(Component)]
pub struct StudioPlatform;

pub struct StudioPlugin;

impl Plugin for StudioPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_studio);
    }
}

/// Parse the configured backdrop, falling back to white
fn background_color(studio: &StudioConfig) -> Color {
    match Rgb::from_hex(&studio.background) {
        Ok(rgb) => {
            let [r, g, b] = rgb.to_srgb_f32();
            Color::srgb(r, g, b)
        }
        Err(e) => {
            warn!("Invalid studio background {}: {}", studio.background, e);
            Color::WHITE
        }
    }
}

fn setup_studio(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    config: Res<DrapeConfig>,
) {
    let studio = &config.viewer.studio;
    commands.insert_resource(ClearColor(background_color(studio)));

    commands.spawn((
        Mesh3d(meshes.add(Cylinder::new(studio.platform_radius, studio.platform_height))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::WHITE,
            perceptual_roughness: 0.5,
            metallic: 0.1,
            ..default()
        })),
        Transform::from_xyz(0.0, studio.platform_y, 0.0),
        StudioPlatform,
        Name::new("Platform"),
    ));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_background_parses_hex() {
        let color = background_color(&StudioConfig::default()).to_srgba();
        assert!((color.red - 248.0 / 255.0).abs() < 1e-4);
        assert!((color.blue - 237.0 / 255.0).abs() < 1e-4);
    }

    #[test]
    fn test_invalid_background_falls_back() {
        let studio = StudioConfig {
            background: "beige".to_string(),
            ..Default::default()
        };
        assert_eq!(background_color(&studio), Color::WHITE);
    }
}
