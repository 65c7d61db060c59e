//! Asset management system
//!
//! - [`pool`]: the named, reference-counted resource cache
//! - [`kinds`]: the concrete asset variants stored in it
//! - [`loader`]: the loader interface and acquisition helpers
//! - [`wav`]: RIFF/WAVE parsing

pub mod kinds;
pub mod loader;
pub mod pool;
pub mod wav;

pub use kinds::{Asset, MeshAsset, SoundAsset, SpriteAsset, Submesh, SubmeshGeometry, TextureAsset};
pub use loader::{LoadedMesh, ResourceId, ResourceLoader};
pub use pool::{Resource, ResourceError, ResourceHandle, ResourcePool, Retired};

use crate::audio::AudioError;
use thiserror::Error;

/// Asset loading errors
#[derive(Debug, Error)]
pub enum AssetError {
    /// No embedded resource with this identifier
    #[error("No embedded resource {0}")]
    NotFound(ResourceId),

    /// No embedded image with this name
    #[error("No embedded image '{0}'")]
    MissingImage(String),

    /// WAV data violates the expected layout
    #[error("Malformed WAV data: {0}")]
    MalformedWav(String),

    /// Mesh data is inconsistent
    #[error("Malformed mesh: {0}")]
    MalformedMesh(String),

    /// Pool operation failed
    #[error(transparent)]
    Resource(#[from] ResourceError),

    /// Audio device rejected the data
    #[error(transparent)]
    Audio(#[from] AudioError),
}
