//! Selection and transform input: sliders, pointer drag and wheel.

use drape_ipc::{ActiveSection, Axis};
use glam::Vec2;
use tracing::debug;

use super::DecalEngine;
use crate::error::EngineError;
use crate::interaction::{wheel_scale, DragState};
use crate::scene_graph::PatchKey;
use crate::transform::DecalTransform;
use crate::types::{DecalId, RegionId};

impl DecalEngine {
    /// Switch editor section.
    ///
    /// A region section makes that region active. The decal selection is
    /// reset either way.
    pub fn select_section(&mut self, section: ActiveSection) -> Result<(), EngineError> {
        if let ActiveSection::Region(id) = &section {
            let region = RegionId::from(id.as_str());
            if !self.catalog.contains(&region) {
                return Err(EngineError::UnknownRegion(id.clone()));
            }
            self.active_region = Some(region);
        }
        self.section = section;
        self.selected_decal = None;
        self.end_any_drag();
        self.dirty = true;
        Ok(())
    }

    /// Select a decal of the active region
    pub fn select_decal(&mut self, decal: &DecalId) -> Result<(), EngineError> {
        let region = self.active_region.clone().ok_or(EngineError::NoActiveRegion)?;
        if self.decal(&PatchKey::new(region, decal.clone())).is_none() {
            return Err(EngineError::UnknownDecal(decal.to_string()));
        }
        if self.selected_decal.as_ref() != Some(decal) {
            self.end_any_drag();
        }
        self.selected_decal = Some(decal.clone());
        self.dirty = true;
        Ok(())
    }

    pub fn deselect_decal(&mut self) {
        self.end_any_drag();
        if self.selected_decal.take().is_some() {
            self.dirty = true;
        }
    }

    /// Change a decal's transform.
    ///
    /// The clamped result is stored right away. The patch is rebuilt now when
    /// `immediate`, otherwise after the debounce delay.
    pub fn update_decal_transform(
        &mut self,
        key: &PatchKey,
        f: impl FnOnce(DecalTransform) -> DecalTransform,
        immediate: bool,
    ) -> Result<DecalTransform, EngineError> {
        let bounds = self.config.bounds;
        let decal = self
            .decal_mut(key)
            .ok_or_else(|| EngineError::UnknownDecal(key.decal.to_string()))?;
        decal.transform = f(decal.transform).clamped(&bounds);
        let transform = decal.transform;
        self.dirty = true;

        if immediate {
            self.debouncer.cancel_key(key);
            self.project_decal(key);
        } else if let Some(displaced) = self.debouncer.schedule(key.clone(), self.now) {
            // Another decal's update was still pending
            self.project_decal(&displaced);
        }
        Ok(transform)
    }

    /// Offset slider
    pub fn set_offset(&mut self, axis: Axis, value: f32) -> Result<DecalTransform, EngineError> {
        let key = self.require_selection()?;
        self.update_decal_transform(
            &key,
            |mut t| {
                t.offset[axis.index()] = value;
                t
            },
            false,
        )
    }

    /// Rotation slider, in degrees
    pub fn set_rotation_degrees(&mut self, axis: Axis, degrees: f32) -> Result<DecalTransform, EngineError> {
        let key = self.require_selection()?;
        self.update_decal_transform(
            &key,
            |mut t| {
                t.rotation[axis.index()] = degrees.to_radians();
                t
            },
            false,
        )
    }

    /// Scale slider
    pub fn set_scale(&mut self, value: f32) -> Result<DecalTransform, EngineError> {
        let key = self.require_selection()?;
        self.update_decal_transform(&key, |t| DecalTransform { scale: value, ..t }, false)
    }

    /// Scale the selected decal with the mouse wheel.
    ///
    /// Returns `false` when nothing is selected, letting the camera zoom.
    pub fn wheel(&mut self, delta_y: f32) -> bool {
        let Some(key) = self.selected_key() else {
            return false;
        };
        let bounds = self.config.bounds;
        let sensitivity = self.config.interaction.wheel_sensitivity;
        self.update_decal_transform(
            &key,
            |t| DecalTransform {
                scale: wheel_scale(t.scale, delta_y, sensitivity, &bounds),
                ..t
            },
            false,
        )
        .is_ok()
    }

    /// Start dragging the selected decal.
    ///
    /// Returns `false` (and the camera should orbit instead) when nothing is
    /// selected or the viewport is empty.
    pub fn begin_drag(&mut self, pointer_id: u64, position: Vec2, viewport: Vec2) -> bool {
        let Some(key) = self.selected_key() else {
            return false;
        };
        let Some(decal) = self.decal(&key) else {
            return false;
        };
        let start = decal.transform.offset.truncate();
        match DragState::begin(pointer_id, key, position, viewport, start) {
            Some(drag) => {
                debug!("Drag {} started on {}", pointer_id, drag.target.decal);
                self.drag = Some(drag);
                true
            }
            None => false,
        }
    }

    /// Move an active drag. Events from other pointers are ignored.
    pub fn drag_to(&mut self, pointer_id: u64, position: Vec2) -> bool {
        let Some(drag) = self.drag.as_ref().filter(|d| d.pointer_id == pointer_id) else {
            return false;
        };
        let offset = drag.offset_at(position, &self.config.bounds);
        let key = drag.target.clone();
        self.update_decal_transform(
            &key,
            |mut t| {
                t.offset.x = offset.x;
                t.offset.y = offset.y;
                t
            },
            false,
        )
        .is_ok()
    }

    /// Finish a drag and rebuild the patch without waiting for the debounce.
    pub fn end_drag(&mut self, pointer_id: u64) -> bool {
        if !self.drag.as_ref().is_some_and(|d| d.pointer_id == pointer_id) {
            return false;
        }
        self.drag = None;
        if let Some(key) = self.debouncer.flush() {
            self.project_decal(&key);
        }
        true
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    fn end_any_drag(&mut self) {
        if let Some(drag) = self.drag.take() {
            self.end_drag_flush(&drag.target);
        }
    }

    fn end_drag_flush(&mut self, key: &PatchKey) {
        if self.debouncer.pending_key() == Some(key) {
            self.debouncer.cancel_key(key);
            self.project_decal(key);
        }
    }

    fn require_selection(&self) -> Result<PatchKey, EngineError> {
        self.selected_key().ok_or(EngineError::NoSelection)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::super::test_support::*;
    use super::*;
    use crate::scene_graph::GeometryId;

    fn geometry(engine: &DecalEngine, key: &PatchKey) -> GeometryId {
        engine.scene().patch(key).unwrap().geometry
    }

    #[test]
    fn test_slider_updates_state_immediately_and_geometry_later() {
        let mut engine = loaded_engine();
        let key = add_ready_decal(&mut engine, "front");
        let before = geometry(&engine, &key);
        let t0 = engine.now;

        let transform = engine.set_offset(Axis::X, 0.3).unwrap();
        assert!((transform.offset.x - 0.3).abs() < 1e-6);
        assert!((engine.decal(&key).unwrap().transform.offset.x - 0.3).abs() < 1e-6);
        assert_eq!(geometry(&engine, &key), before);

        engine.frame(t0 + Duration::from_millis(5));
        assert_eq!(geometry(&engine, &key), before);
        engine.frame(t0 + Duration::from_millis(16));
        assert_ne!(geometry(&engine, &key), before);
    }

    #[test]
    fn test_sliders_clamp() {
        let mut engine = loaded_engine();
        add_ready_decal(&mut engine, "front");
        assert_eq!(engine.set_offset(Axis::Z, 5.0).unwrap().offset.z, 0.25);
        assert_eq!(engine.set_scale(0.0).unwrap().scale, 0.15);
        let rotation = engine.set_rotation_degrees(Axis::Y, 270.0).unwrap().rotation;
        assert!((rotation.y - std::f32::consts::PI).abs() < 1e-6);
        let rotation = engine.set_rotation_degrees(Axis::X, 90.0).unwrap().rotation;
        assert!((rotation.x - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn test_sliders_require_selection() {
        let mut engine = loaded_engine();
        assert!(matches!(engine.set_scale(1.0), Err(EngineError::NoSelection)));
        assert!(!engine.wheel(-100.0));
        assert!(!engine.begin_drag(1, Vec2::ZERO, Vec2::splat(100.0)));
    }

    #[test]
    fn test_drag_ignores_other_pointer_and_flushes_on_end() {
        let mut engine = loaded_engine();
        let key = add_ready_decal(&mut engine, "front");
        let start = engine.decal(&key).unwrap().transform.offset;
        let before = geometry(&engine, &key);

        assert!(engine.begin_drag(7, Vec2::new(500.0, 400.0), Vec2::new(1000.0, 800.0)));
        assert!(!engine.drag_to(8, Vec2::new(900.0, 400.0)));
        assert!(engine.drag_to(7, Vec2::new(600.0, 320.0)));

        let offset = engine.decal(&key).unwrap().transform.offset;
        assert!((offset.x - (start.x + 0.14)).abs() < 1e-5);
        assert!((offset.y - (start.y + 0.16)).abs() < 1e-5);
        assert_eq!(geometry(&engine, &key), before);

        assert!(!engine.end_drag(8));
        assert!(engine.end_drag(7));
        assert!(!engine.is_dragging());
        assert_ne!(geometry(&engine, &key), before);
    }

    #[test]
    fn test_wheel_scales_selected() {
        let mut engine = loaded_engine();
        let key = add_ready_decal(&mut engine, "front");
        let scale = engine.decal(&key).unwrap().transform.scale;
        assert!(engine.wheel(-100.0));
        let grown = engine.decal(&key).unwrap().transform.scale;
        assert!((grown - scale * 1.15).abs() < 1e-5);
    }

    #[test]
    fn test_displaced_update_applied_immediately() {
        let mut engine = loaded_engine();
        let first = add_ready_decal(&mut engine, "front");
        let second = add_ready_decal(&mut engine, "front");
        let first_geometry = geometry(&engine, &first);

        engine
            .update_decal_transform(&first, |t| DecalTransform { scale: 0.9, ..t }, false)
            .unwrap();
        assert_eq!(geometry(&engine, &first), first_geometry);
        engine
            .update_decal_transform(&second, |t| DecalTransform { scale: 0.9, ..t }, false)
            .unwrap();
        assert_ne!(geometry(&engine, &first), first_geometry);
    }

    #[test]
    fn test_section_change_resets_selection() {
        let mut engine = loaded_engine();
        add_ready_decal(&mut engine, "front");
        engine
            .select_section(ActiveSection::Region("back".to_string()))
            .unwrap();
        assert_eq!(engine.active_region(), Some(&RegionId::from("back")));
        assert_eq!(engine.selected_decal(), None);
        assert!(engine
            .select_section(ActiveSection::Region("cape".to_string()))
            .is_err());
    }

    #[test]
    fn test_select_decal_only_in_active_region() {
        let mut engine = loaded_engine();
        let front = add_ready_decal(&mut engine, "front");
        add_ready_decal(&mut engine, "back");
        assert!(matches!(
            engine.select_decal(&front.decal),
            Err(EngineError::UnknownDecal(_))
        ));
        engine
            .select_section(ActiveSection::Region("front".to_string()))
            .unwrap();
        engine.select_decal(&front.decal).unwrap();
        assert_eq!(engine.selected_decal(), Some(&front.decal));
        engine.deselect_decal();
        assert_eq!(engine.selected_decal(), None);
    }
}
