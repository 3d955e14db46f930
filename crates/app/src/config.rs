//! Application configuration and UI bridge selection

use bevy::prelude::*;

/// Environment variable selecting the UI bridge
pub const BRIDGE_ENV_VAR: &str = "DRAPE_BRIDGE";

/// How the storefront UI reaches the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Resource)]
pub enum BridgeMode {
    /// JSON messages, one per line, on stdin/stdout
    #[default]
    Stdio,
    /// Viewer only; no external UI
    Disabled,
}

impl BridgeMode {
    /// Parse from environment variable DRAPE_BRIDGE
    pub fn from_env() -> Self {
        Self::parse(std::env::var(BRIDGE_ENV_VAR).ok().as_deref())
    }

    fn parse(value: Option<&str>) -> Self {
        match value {
            Some("none") | Some("off") => Self::Disabled,
            _ => Self::Stdio,
        }
    }
}
