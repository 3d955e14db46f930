//! IPC message protocol for Drape
//!
//! Defines the commands the storefront UI sends to the garment engine and the
//! observable state the engine publishes back.

pub mod commands;
pub mod error;
pub mod messages;
pub mod types;

pub use commands::*;
pub use error::IpcError;
pub use messages::{EngineToUi, UiToEngine};
pub use types::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_tagging() {
        let json = r#"{"type":"SetFabric","data":{"fabric_id":"velvet"}}"#;
        let cmd = UiToEngine::from_json(json).unwrap();
        assert_eq!(
            cmd,
            UiToEngine::SetFabric {
                fabric_id: "velvet".to_string()
            }
        );
    }

    #[test]
    fn test_section_serialization() {
        let cmd = UiToEngine::SelectSection(ActiveSection::Region("gala".to_string()));
        let json = serde_json::to_string(&cmd).unwrap();
        assert_eq!(
            json,
            r#"{"type":"SelectSection","data":{"kind":"region","region":"gala"}}"#
        );

        let fabric: ActiveSection = serde_json::from_str(r#"{"kind":"fabric"}"#).unwrap();
        assert_eq!(fabric, ActiveSection::Fabric);
    }

    #[test]
    fn test_library_upload_parses() {
        let json = r#"{
            "type": "AddDecal",
            "data": {
                "region": null,
                "source": { "kind": "library", "id": "d-12", "name": "Paisley", "url": "/uploads/paisley.png" }
            }
        }"#;
        let UiToEngine::AddDecal(request) = UiToEngine::from_json(json).unwrap() else {
            panic!("expected AddDecal");
        };
        assert!(request.region.is_none());
        assert!(matches!(request.source, DecalUpload::Library { ref id, .. } if id == "d-12"));
    }

    #[test]
    fn test_empty_message_rejected() {
        assert!(matches!(
            UiToEngine::from_json("  "),
            Err(IpcError::InvalidFormat(_))
        ));
        assert!(matches!(
            UiToEngine::from_json("{\"type\":\"Nope\"}"),
            Err(IpcError::Json(_))
        ));
    }

    #[test]
    fn test_axis_conversion() {
        assert_eq!(Axis::try_from(2).unwrap(), Axis::Z);
        assert_eq!(Axis::Y.index(), 1);
        assert!(matches!(Axis::try_from(3), Err(IpcError::InvalidAxis(3))));
    }

    #[test]
    fn test_model_status_encoding() {
        let msg = EngineToUi::ModelStatusChanged(ModelStatus::Failed {
            message: "boom".to_string(),
        });
        let json = msg.to_json().unwrap();
        assert_eq!(
            json,
            r#"{"type":"ModelStatusChanged","data":{"status":"failed","message":"boom"}}"#
        );
    }
}
