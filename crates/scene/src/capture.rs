//! UI command dispatch and render capture
//!
//! Commands that return a picture of the garment (capture, download, cart
//! item) wait for a fresh screenshot of the primary window. Commands sent
//! after one of them queue behind it, so every reply reflects the state at
//! the moment it was requested. If no frame arrives within
//! [`CAPTURE_DEADLINE_FRAMES`], the waiting command runs anyway and the
//! engine answers with its fallback image.

use std::collections::VecDeque;

use bevy::prelude::*;
use bevy::render::view::screenshot::{Screenshot, ScreenshotCaptured};
use drape_ipc::UiToEngine;

use crate::{DrapeSet, EngineResource, InboundUiMessages};

/// Frames to wait for a screenshot before answering without one
pub const CAPTURE_DEADLINE_FRAMES: u32 = 30;

/// UI commands in arrival order, held while a capture is pending
#[derive(Resource, Debug, Default)]
pub struct CaptureQueue {
    waiting: VecDeque<UiToEngine>,
    in_flight: bool,
    frames_waited: u32,
    /// A frame newer than every applied command has been presented
    frame_ready: bool,
}

impl CaptureQueue {
    pub fn is_capturing(&self) -> bool {
        self.in_flight
    }

    pub fn pending(&self) -> usize {
        self.waiting.len()
    }

    /// Count one frame of waiting; true once the deadline has passed
    fn tick(&mut self) -> bool {
        if !self.in_flight {
            return false;
        }
        self.frames_waited += 1;
        self.frames_waited >= CAPTURE_DEADLINE_FRAMES
    }

    /// Stop waiting and let the queue run with whatever frame the engine has
    fn release(&mut self) {
        self.in_flight = false;
        self.frames_waited = 0;
        self.frame_ready = true;
    }
}

pub struct CapturePlugin;

impl Plugin for CapturePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CaptureQueue>()
            .add_systems(Update, dispatch_ui_commands.in_set(DrapeSet::Input));
    }
}

/// True for commands whose reply embeds the rendered image
fn needs_frame(command: &UiToEngine) -> bool {
    matches!(
        command,
        UiToEngine::CaptureRender | UiToEngine::DownloadRender { .. } | UiToEngine::RequestCartItem
    )
}

fn dispatch_ui_commands(
    mut commands: Commands,
    mut inbound: ResMut<InboundUiMessages>,
    mut engine: ResMut<EngineResource>,
    mut queue: ResMut<CaptureQueue>,
) {
    if queue.tick() {
        warn!(
            "No frame captured after {} frames; answering with the fallback render",
            CAPTURE_DEADLINE_FRAMES
        );
        queue.release();
    }

    queue.waiting.extend(inbound.drain());
    run_queue(&mut commands, &mut engine.0, &mut queue);
}

/// Apply queued commands in order until one needs a frame that is not ready
fn run_queue(commands: &mut Commands, engine: &mut garment::DecalEngine, queue: &mut CaptureQueue) {
    while !queue.in_flight {
        let Some(command) = queue.waiting.pop_front() else {
            return;
        };

        if !needs_frame(&command) {
            // The presented frame no longer matches the state
            queue.frame_ready = false;
            engine.handle_command(command);
            continue;
        }

        if queue.frame_ready {
            engine.handle_command(command);
            continue;
        }

        queue.waiting.push_front(command);
        queue.in_flight = true;
        queue.frames_waited = 0;
        commands
            .spawn(Screenshot::primary_window())
            .observe(on_frame_captured);
        debug!("Requested frame capture");
    }
}

fn on_frame_captured(
    captured: On<ScreenshotCaptured>,
    mut commands: Commands,
    mut engine: ResMut<EngineResource>,
    mut queue: ResMut<CaptureQueue>,
) {
    match captured.image.clone().try_into_dynamic() {
        Ok(frame) => engine.0.present_frame(frame.to_rgba8()),
        Err(e) => warn!("Captured frame could not be converted: {:?}", e),
    }

    // A late frame after the deadline is kept but does not release anything
    if !queue.in_flight {
        return;
    }
    queue.release();
    run_queue(&mut commands, &mut engine.0, &mut queue);
}
