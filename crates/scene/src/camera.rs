//! Orbit camera around the garment
//!
//! Controls (when no decal drag is active):
//! - Left or right mouse drag: orbit around the target
//! - Scroll wheel: dolly, clamped to the configured distance range

use bevy::core_pipeline::tonemapping::Tonemapping;
use bevy::prelude::*;
use drape_config::{CameraConfig, DrapeConfig};

use crate::DrapeSet;

/// Pitch limit just short of straight up/down
const MAX_PITCH: f32 = 1.5;

/// Marker component for the main camera
#[derive(Component)]
pub struct MainCamera;

/// Camera orbit controller state.
///
/// Input edits the `desired_*` values; with damping enabled the current
/// values move a fixed fraction toward them every frame.
#[derive(Component, Debug, Clone)]
pub struct OrbitCamera {
    /// Point the camera orbits around
    pub target: Vec3,
    pub distance: f32,
    /// Horizontal angle (yaw) in radians
    pub yaw: f32,
    /// Elevation angle (pitch) in radians
    pub pitch: f32,
    pub desired_distance: f32,
    pub desired_yaw: f32,
    pub desired_pitch: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    /// Fraction of the remaining delta applied per frame; 1.0 disables damping
    pub damping_factor: f32,
    /// Radians per pixel
    pub orbit_sensitivity: f32,
    /// Fraction of the distance per scroll line
    pub zoom_sensitivity: f32,
}

impl OrbitCamera {
    /// Derive orbit angles from the configured position and target
    pub fn from_config(config: &CameraConfig) -> Self {
        let target = Vec3::from_array(config.target);
        let offset = Vec3::from_array(config.position) - target;
        let distance = offset
            .length()
            .clamp(config.min_distance, config.max_distance);
        let yaw = offset.x.atan2(offset.z);
        let pitch = if offset.length() > f32::EPSILON {
            (offset.y / offset.length()).asin()
        } else {
            0.0
        };

        Self {
            target,
            distance,
            yaw,
            pitch,
            desired_distance: distance,
            desired_yaw: yaw,
            desired_pitch: pitch,
            min_distance: config.min_distance,
            max_distance: config.max_distance,
            damping_factor: if config.damping {
                config.damping_factor.clamp(0.01, 1.0)
            } else {
                1.0
            },
            orbit_sensitivity: config.orbit_sensitivity,
            zoom_sensitivity: config.zoom_sensitivity,
        }
    }

    /// Calculate camera position from orbit parameters
    pub fn calculate_position(&self) -> Vec3 {
        let horizontal_distance = self.distance * self.pitch.cos();
        let y = self.distance * self.pitch.sin();
        let x = horizontal_distance * self.yaw.sin();
        let z = horizontal_distance * self.yaw.cos();

        self.target + Vec3::new(x, y, z)
    }

    /// Rotate by a mouse delta in pixels
    pub fn orbit(&mut self, delta: Vec2) {
        self.desired_yaw -= delta.x * self.orbit_sensitivity;
        self.desired_pitch =
            (self.desired_pitch + delta.y * self.orbit_sensitivity).clamp(-MAX_PITCH, MAX_PITCH);
    }

    /// Dolly by scroll lines; positive moves closer
    pub fn zoom(&mut self, lines: f32) {
        let amount = lines * self.zoom_sensitivity * self.desired_distance;
        self.desired_distance =
            (self.desired_distance - amount).clamp(self.min_distance, self.max_distance);
    }

    /// Move the current orbit toward the desired one
    pub fn step(&mut self) {
        let k = self.damping_factor;
        self.yaw += (self.desired_yaw - self.yaw) * k;
        self.pitch += (self.desired_pitch - self.pitch) * k;
        self.distance += (self.desired_distance - self.distance) * k;
    }
}

/// Plugin for the orbit camera
pub struct CameraControllerPlugin;

impl Plugin for CameraControllerPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_camera)
            .add_systems(Update, update_camera_transform.after(DrapeSet::Input));
    }
}

fn spawn_camera(mut commands: Commands, config: Res<DrapeConfig>) {
    let camera = &config.viewer.camera;
    let orbit = OrbitCamera::from_config(camera);
    let position = orbit.calculate_position();

    commands.spawn((
        Camera3d::default(),
        Projection::from(PerspectiveProjection {
            fov: camera.fov_degrees.to_radians(),
            near: camera.near,
            far: camera.far,
            ..default()
        }),
        Transform::from_translation(position).looking_at(orbit.target, Vec3::Y),
        Tonemapping::Reinhard,
        MainCamera,
        orbit,
    ));

    info!("Camera spawned at {:?}", position);
}

/// Update camera transform from orbit state
fn update_camera_transform(
    mut camera_query: Query<(&mut OrbitCamera, &mut Transform), With<MainCamera>>,
) {
    for (mut orbit, mut transform) in camera_query.iter_mut() {
        orbit.step();
        let position = orbit.calculate_position();
        *transform = Transform::from_translation(position).looking_at(orbit.target, Vec3::Y);
    }
}
