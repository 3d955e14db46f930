//! Background loader feeding completions back to the render loop.

use std::path::PathBuf;

use garment::{DecalEngine, GarmentModel, ImageRequest, ImageTicket, LoadTicket};
use image::RgbaImage;
use tokio::runtime::Runtime;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info};

use crate::image_load::load_image_source;
use crate::model::load_model_file;
use crate::LoadError;

/// Result of one background load
#[derive(Debug)]
pub enum LoadCompletion {
    Model {
        ticket: LoadTicket,
        result: Result<GarmentModel, LoadError>,
    },
    Image {
        ticket: ImageTicket,
        result: Result<RgbaImage, LoadError>,
    },
}

impl LoadCompletion {
    /// Hand the result to the engine that issued the ticket
    pub fn apply(self, engine: &mut DecalEngine) {
        match self {
            LoadCompletion::Model { ticket, result } => engine.on_model_loaded(ticket, result),
            LoadCompletion::Image { ticket, result } => engine.on_image_loaded(ticket, result),
        }
    }
}

/// Runs model and image loads on a private tokio runtime.
///
/// Completions are queued on an unbounded channel and collected with
/// [`AssetLoader::drain`], which never blocks.
pub struct AssetLoader {
    runtime: Runtime,
    http: reqwest::Client,
    sender: UnboundedSender<LoadCompletion>,
    receiver: UnboundedReceiver<LoadCompletion>,
}

impl AssetLoader {
    pub fn new() -> Result<Self, LoadError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("drape-assets")
            .enable_all()
            .build()
            .map_err(LoadError::Runtime)?;
        let (sender, receiver) = mpsc::unbounded_channel();

        Ok(Self {
            runtime,
            http: reqwest::Client::new(),
            sender,
            receiver,
        })
    }

    /// Start loading the garment model at `path`
    pub fn load_model(&self, ticket: LoadTicket, path: impl Into<PathBuf>) {
        let path = path.into();
        let sender = self.sender.clone();
        info!("Queued model load: {}", path.display());

        self.runtime.spawn(async move {
            let result = load_model_file(&path).await;
            if sender.send(LoadCompletion::Model { ticket, result }).is_err() {
                debug!("Loader dropped before model {} finished", path.display());
            }
        });
    }

    /// Start fetching and decoding a decal image
    pub fn load_image(&self, request: ImageRequest) {
        let sender = self.sender.clone();
        let http = self.http.clone();
        let ImageRequest { ticket, source } = request;
        debug!("Queued image load for decal {}", ticket.key.decal);

        self.runtime.spawn(async move {
            let result = load_image_source(&http, source).await;
            if sender.send(LoadCompletion::Image { ticket, result }).is_err() {
                debug!("Loader dropped before image finished");
            }
        });
    }

    /// Queue every image the engine is waiting for
    pub fn load_images(&self, requests: impl IntoIterator<Item = ImageRequest>) {
        for request in requests {
            self.load_image(request);
        }
    }

    /// Collect finished loads without blocking
    pub fn drain(&mut self) -> Vec<LoadCompletion> {
        let mut completions = Vec::new();
        while let Ok(completion) = self.receiver.try_recv() {
            completions.push(completion);
        }
        completions
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    use drape_ipc::ModelStatus;
    use garment::{DecalSource, RegionId};

    use super::*;
    use crate::image_load::tests::png_bytes;
    use crate::model::tests::sample_gltf;

    /// Poll `drain` until `count` completions arrived or a timeout passes
    fn wait_for(loader: &mut AssetLoader, count: usize) -> Vec<LoadCompletion> {
        let deadline = Instant::now() + Duration::from_secs(10);
        let mut completions = Vec::new();
        while completions.len() < count && Instant::now() < deadline {
            completions.extend(loader.drain());
            std::thread::sleep(Duration::from_millis(5));
        }
        completions
    }

    #[test]
    fn test_model_and_image_round_trip_into_engine() {
        let path = std::env::temp_dir().join(format!("drape-loader-{}.gltf", std::process::id()));
        std::fs::write(&path, sample_gltf()).unwrap();

        let mut loader = AssetLoader::new().unwrap();
        let mut engine = DecalEngine::new(Default::default());
        let ticket = engine.begin_model_load(&path.display().to_string()).unwrap();
        loader.load_model(ticket, &path);

        for completion in wait_for(&mut loader, 1) {
            completion.apply(&mut engine);
        }
        assert_eq!(engine.model_status(), &ModelStatus::Ready);
        std::fs::remove_file(&path).unwrap();

        engine
            .add_decal(
                Some(RegionId::from("front")),
                DecalSource::Inline {
                    bytes: Arc::from(png_bytes()),
                    file_name: None,
                },
                None,
            )
            .unwrap();
        loader.load_images(engine.take_image_requests());
        for completion in wait_for(&mut loader, 1) {
            completion.apply(&mut engine);
        }
        assert_eq!(engine.scene().patch_count(), 1);
    }

    #[test]
    fn test_failed_model_reported() {
        let mut loader = AssetLoader::new().unwrap();
        loader.load_model(LoadTicket { generation: 0 }, "/nonexistent/garment.glb");
        let completions = wait_for(&mut loader, 1);
        assert!(matches!(
            completions.as_slice(),
            [LoadCompletion::Model { result: Err(LoadError::Io { .. }), .. }]
        ));
    }
}
