//! Mouse input routing between the selected decal and the orbit camera
//!
//! A left-button drag moves the selected decal when one is selected and
//! orbits the camera otherwise; the right button always orbits. The wheel
//! scales the selected decal, or dollies the camera when nothing is selected.

use bevy::input::mouse::{MouseButton, MouseMotion, MouseScrollUnit, MouseWheel};
use bevy::prelude::*;
use bevy::window::{PrimaryWindow, WindowResized};

use crate::camera::{MainCamera, OrbitCamera};
use crate::{DrapeSet, EngineResource};

/// Pointer id used for the mouse
pub const MOUSE_POINTER_ID: u64 = 1;

/// Wheel pixels per scroll line
const PIXELS_PER_LINE: f32 = 100.0;

/// What the current left-button press is doing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum PointerMode {
    #[default]
    Idle,
    /// The engine accepted the press as a decal drag
    DecalDrag,
    Orbit,
}

#[derive(Resource, Debug, Default)]
struct PointerState {
    mode: PointerMode,
}

pub struct PointerInputPlugin;

impl Plugin for PointerInputPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PointerState>()
            .add_systems(Startup, sync_initial_viewport)
            .add_systems(
                Update,
                (
                    route_mouse_buttons,
                    route_mouse_motion.after(route_mouse_buttons),
                    route_mouse_wheel,
                    forward_window_resize,
                )
                    .in_set(DrapeSet::Input),
            );
    }
}

/// Convert a Bevy wheel event to DOM-style pixels (positive scrolls down)
fn wheel_pixels(unit: MouseScrollUnit, y: f32) -> f32 {
    match unit {
        MouseScrollUnit::Line => -y * PIXELS_PER_LINE,
        MouseScrollUnit::Pixel => -y,
    }
}

fn to_engine_vec(v: Vec2) -> glam::Vec2 {
    glam::Vec2::from_array(v.to_array())
}

fn route_mouse_buttons(
    mouse_button: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut engine: ResMut<EngineResource>,
    mut state: ResMut<PointerState>,
) {
    if mouse_button.just_pressed(MouseButton::Left) {
        let Ok(window) = windows.single() else {
            return;
        };
        let Some(cursor) = window.cursor_position() else {
            return;
        };
        let viewport = Vec2::new(window.width(), window.height());

        state.mode = if engine.0.begin_drag(
            MOUSE_POINTER_ID,
            to_engine_vec(cursor),
            to_engine_vec(viewport),
        ) {
            PointerMode::DecalDrag
        } else {
            PointerMode::Orbit
        };
    }

    if mouse_button.just_released(MouseButton::Left) {
        if state.mode == PointerMode::DecalDrag {
            engine.0.end_drag(MOUSE_POINTER_ID);
        }
        state.mode = PointerMode::Idle;
    }
}

fn route_mouse_motion(
    mouse_button: Res<ButtonInput<MouseButton>>,
    mut motion_events: MessageReader<MouseMotion>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut engine: ResMut<EngineResource>,
    state: Res<PointerState>,
    mut camera_query: Query<&mut OrbitCamera, With<MainCamera>>,
) {
    let mut delta = Vec2::ZERO;
    for event in motion_events.read() {
        delta += event.delta;
    }
    if delta == Vec2::ZERO {
        return;
    }

    if state.mode == PointerMode::DecalDrag {
        let cursor = windows.single().ok().and_then(|w| w.cursor_position());
        if let Some(cursor) = cursor {
            engine.0.drag_to(MOUSE_POINTER_ID, to_engine_vec(cursor));
        }
        return;
    }

    let orbiting = state.mode == PointerMode::Orbit || mouse_button.pressed(MouseButton::Right);
    if !orbiting {
        return;
    }
    for mut orbit in camera_query.iter_mut() {
        orbit.orbit(delta);
    }
}

fn route_mouse_wheel(
    mut scroll_events: MessageReader<MouseWheel>,
    mut engine: ResMut<EngineResource>,
    mut camera_query: Query<&mut OrbitCamera, With<MainCamera>>,
) {
    let mut pixels = 0.0;
    for event in scroll_events.read() {
        pixels += wheel_pixels(event.unit, event.y);
    }
    if pixels == 0.0 {
        return;
    }

    if engine.0.wheel(pixels) {
        return;
    }
    for mut orbit in camera_query.iter_mut() {
        orbit.zoom(-pixels / PIXELS_PER_LINE);
    }
}

fn sync_initial_viewport(
    windows: Query<&Window, With<PrimaryWindow>>,
    mut engine: ResMut<EngineResource>,
) {
    if let Ok(window) = windows.single() {
        engine
            .0
            .resize(window.physical_width(), window.physical_height());
    }
}

fn forward_window_resize(
    mut resize_events: MessageReader<WindowResized>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut engine: ResMut<EngineResource>,
) {
    if resize_events.read().last().is_none() {
        return;
    }
    if let Ok(window) = windows.single() {
        engine
            .0
            .resize(window.physical_width(), window.physical_height());
    }
}
