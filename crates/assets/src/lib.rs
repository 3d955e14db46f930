//! Asset loading for Drape
//!
//! Garment models (GLB/glTF) and decal images are loaded off the render
//! thread. Results come back as [`LoadCompletion`]s carrying the engine's
//! ticket, so the engine can drop anything that arrives after teardown.

mod image_load;
mod loader;
mod model;

pub use image_load::{decode_image, fetch_bytes, load_image_source};
pub use loader::{AssetLoader, LoadCompletion};
pub use model::{import_model, load_model_file};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid glTF: {0}")]
    Gltf(#[from] gltf::Error),

    #[error("Model has no meshes")]
    EmptyModel,

    #[error("Invalid mesh: {0}")]
    Mesh(#[from] garment::ProjectionError),

    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server returned {status} for {url}")]
    Status { status: u16, url: String },

    #[error("Failed to start loader runtime: {0}")]
    Runtime(#[source] std::io::Error),

    #[error("Loader task failed: {0}")]
    Task(String),
}
