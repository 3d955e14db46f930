//! Line-delimited JSON bridge between a UI process and the engine.
//!
//! A reader thread parses `UiToEngine` messages from stdin; replies are
//! written to stdout as `EngineToUi` JSON, one message per line.

use std::io::{BufRead, Write};

use bevy::prelude::*;
use drape_ipc::{EngineToUi, UiToEngine};
use drape_scene::{DrapeSet, InboundUiMessages, OutboundUiMessages};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Receives parsed commands from the stdin reader thread
#[derive(Resource)]
struct StdioBridge {
    receiver: UnboundedReceiver<Result<UiToEngine, String>>,
}

pub struct StdioBridgePlugin;

impl Plugin for StdioBridgePlugin {
    fn build(&self, app: &mut App) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let spawned = std::thread::Builder::new()
            .name("drape-stdin".to_string())
            .spawn(move || read_commands(std::io::stdin().lock(), sender));
        if let Err(e) = spawned {
            error!("Failed to start stdin bridge: {}", e);
            return;
        }

        app.insert_resource(StdioBridge { receiver })
            .add_systems(Update, receive_commands.before(DrapeSet::Input))
            .add_systems(Update, send_replies.after(DrapeSet::Engine))
            .add_systems(Last, send_replies);
    }
}

/// Parse one command per line until the input closes or the app is gone
fn read_commands(input: impl BufRead, sender: UnboundedSender<Result<UiToEngine, String>>) {
    for line in input.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!("stdin bridge closed: {}", e);
                return;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        let parsed = UiToEngine::from_json(&line).map_err(|e| e.to_string());
        if sender.send(parsed).is_err() {
            return;
        }
    }
    debug!("stdin bridge reached end of input");
}

fn receive_commands(
    mut bridge: ResMut<StdioBridge>,
    mut inbound: ResMut<InboundUiMessages>,
    mut outbound: ResMut<OutboundUiMessages>,
) {
    while let Ok(parsed) = bridge.receiver.try_recv() {
        match parsed {
            Ok(msg) => inbound.push(msg),
            Err(message) => {
                warn!("Rejected UI message: {}", message);
                outbound.send(EngineToUi::Error {
                    code: "invalid_message".to_string(),
                    message,
                });
            }
        }
    }
}

fn send_replies(mut outbound: ResMut<OutboundUiMessages>) {
    let messages = outbound.drain();
    if messages.is_empty() {
        return;
    }

    let mut stdout = std::io::stdout().lock();
    for msg in messages {
        match msg.to_json() {
            Ok(json) => {
                if let Err(e) = writeln!(stdout, "{json}") {
                    warn!("Failed to write UI message: {}", e);
                    return;
                }
            }
            Err(e) => warn!("Failed to serialize UI message: {}", e),
        }
    }
    if let Err(e) = stdout.flush() {
        warn!("Failed to flush UI messages: {}", e);
    }
}
