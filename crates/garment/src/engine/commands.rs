//! UI command dispatch.

use std::path::PathBuf;

use drape_ipc::{DecalUpload, EngineToUi, PointerCommand, TransformCommand, UiToEngine};
use glam::Vec2;
use tracing::{debug, warn};

use super::DecalEngine;
use crate::error::EngineError;
use crate::types::{DecalId, RegionId};

impl DecalEngine {
    /// Apply a UI command.
    ///
    /// Rejected commands are logged and reported to the UI as
    /// [`EngineToUi::Error`]; nothing is returned to the caller.
    pub fn handle_command(&mut self, command: UiToEngine) {
        if !self.alive {
            debug!("Ignoring command after teardown: {:?}", command);
            return;
        }
        if let Err(e) = self.dispatch(command) {
            warn!("Command rejected: {}", e);
            self.outbound.push(EngineToUi::Error {
                code: e.code().to_string(),
                message: e.to_string(),
            });
        }
    }

    fn dispatch(&mut self, command: UiToEngine) -> Result<(), EngineError> {
        match command {
            UiToEngine::SelectSection(section) => self.select_section(section),
            UiToEngine::AddDecal(request) => {
                let region = request.region.map(RegionId::new);
                match request.source {
                    DecalUpload::Upload { data, file_name } => {
                        self.add_upload(region, &data, file_name)?;
                    }
                    DecalUpload::Library { id, name, url } => {
                        self.add_library_design(region, &id, &name, &url)?;
                    }
                }
                Ok(())
            }
            UiToEngine::RemoveDecal { region, decal_id } => {
                self.remove_decal(&RegionId::new(region), &DecalId(decal_id))
            }
            UiToEngine::ClearDecals { region } => self.clear_decals(&RegionId::new(region)).map(|_| ()),
            UiToEngine::SelectDecal { decal_id } => self.select_decal(&DecalId(decal_id)),
            UiToEngine::DeselectDecal => {
                self.deselect_decal();
                Ok(())
            }
            UiToEngine::SetRegionColor { region, color } => match region {
                Some(region) => self.set_region_color(&RegionId::new(region), &color),
                None => self.set_active_region_color(&color),
            },
            UiToEngine::SetFabric { fabric_id } => self.set_fabric(&fabric_id),
            UiToEngine::SetFit { percent } => self.set_fit_adjustment(percent),
            UiToEngine::Pointer(pointer) => {
                self.handle_pointer(pointer);
                Ok(())
            }
            UiToEngine::Transform(transform) => {
                match transform {
                    TransformCommand::SetOffset { axis, value } => self.set_offset(axis, value)?,
                    TransformCommand::SetRotation { axis, degrees } => self.set_rotation_degrees(axis, degrees)?,
                    TransformCommand::SetScale { value } => self.set_scale(value)?,
                };
                Ok(())
            }
            UiToEngine::CaptureRender => {
                let capture = self.capture_render();
                self.outbound.push(EngineToUi::RenderCaptured(capture));
                Ok(())
            }
            UiToEngine::DownloadRender { directory } => {
                let directory = directory.map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."));
                let path = self.download_render(&directory)?;
                self.outbound.push(EngineToUi::RenderDownloaded {
                    path: path.map(|p| p.display().to_string()),
                });
                Ok(())
            }
            UiToEngine::RequestCartItem => {
                let item = self.cart_line_item();
                self.outbound.push(EngineToUi::CartItem(item));
                Ok(())
            }
        }
    }

    /// Pointer input; unconsumed events are left for the camera
    fn handle_pointer(&mut self, pointer: PointerCommand) {
        let consumed = match pointer {
            PointerCommand::DragBegin {
                pointer_id,
                position,
                viewport,
            } => self.begin_drag(pointer_id, Vec2::from_array(position), Vec2::from_array(viewport)),
            PointerCommand::DragMove { pointer_id, position } => {
                self.drag_to(pointer_id, Vec2::from_array(position))
            }
            PointerCommand::DragEnd { pointer_id } => self.end_drag(pointer_id),
            PointerCommand::Wheel { delta_y } => self.wheel(delta_y),
        };
        if !consumed {
            debug!("Pointer event not consumed: {:?}", pointer);
        }
    }
}

#[cfg(test)]
mod tests {
    use drape_ipc::{ActiveSection, AddDecalRequest, Axis};

    use super::super::test_support::*;
    use super::*;

    fn errors(engine: &mut DecalEngine) -> Vec<String> {
        engine
            .drain_outbound()
            .into_iter()
            .filter_map(|m| match m {
                EngineToUi::Error { code, .. } => Some(code),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_add_upload_command() {
        let mut engine = loaded_engine();
        engine.handle_command(UiToEngine::AddDecal(AddDecalRequest {
            region: Some("back".to_string()),
            source: DecalUpload::Upload {
                data: "data:image/png;base64,AQID".to_string(),
                file_name: Some("logo.png".to_string()),
            },
        }));
        assert!(errors(&mut engine).is_empty());
        assert_eq!(engine.decals(&RegionId::from("back")).len(), 1);
        assert_eq!(engine.take_image_requests().len(), 1);
    }

    #[test]
    fn test_rejected_commands_report_errors() {
        let mut engine = loaded_engine();
        engine.handle_command(UiToEngine::SetFabric {
            fabric_id: "denim".to_string(),
        });
        engine.handle_command(UiToEngine::Transform(TransformCommand::SetScale { value: 1.0 }));
        engine.handle_command(UiToEngine::SetRegionColor {
            region: None,
            color: "blue".to_string(),
        });
        engine.handle_command(UiToEngine::SelectSection(ActiveSection::Region("cape".to_string())));
        assert_eq!(
            errors(&mut engine),
            vec!["unknown_fabric", "no_selection", "invalid_color", "unknown_region"]
        );
    }

    #[test]
    fn test_transform_and_pointer_commands() {
        let mut engine = loaded_engine();
        let key = add_ready_decal(&mut engine, "front");
        engine.handle_command(UiToEngine::Transform(TransformCommand::SetOffset {
            axis: Axis::Y,
            value: -0.3,
        }));
        engine.handle_command(UiToEngine::Pointer(PointerCommand::Wheel { delta_y: 100.0 }));
        let transform = engine.decal(&key).unwrap().transform;
        assert!((transform.offset.y + 0.3).abs() < 1e-6);
        assert!((transform.scale - 0.65 * 0.85).abs() < 1e-5);
        assert!(errors(&mut engine).is_empty());
    }

    #[test]
    fn test_capture_and_cart_commands() {
        let mut engine = loaded_engine();
        engine.handle_command(UiToEngine::CaptureRender);
        engine.handle_command(UiToEngine::RequestCartItem);
        let messages = engine.drain_outbound();
        assert!(matches!(messages[0], EngineToUi::RenderCaptured(_)));
        assert!(matches!(messages[1], EngineToUi::CartItem(_)));
    }

    #[test]
    fn test_commands_ignored_after_teardown() {
        let mut engine = loaded_engine();
        engine.teardown();
        engine.drain_outbound();
        engine.handle_command(UiToEngine::SetFabric {
            fabric_id: "denim".to_string(),
        });
        assert!(engine.drain_outbound().is_empty());
    }
}
