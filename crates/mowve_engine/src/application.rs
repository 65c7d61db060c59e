//! Application trait and lifecycle management

use thiserror::Error;

use crate::assets::AssetError;
use crate::audio::AudioError;
use crate::config::ConfigError;
use crate::engine::{Engine, EngineError, Services};
use crate::events::QueueError;
use crate::scene::ObjectError;

/// Application lifecycle trait
///
/// Implement this trait to drive a game with the engine.
pub trait Application {
    /// Deferred request type, applied at the top of each frame
    type Request;

    /// Initialize the application
    ///
    /// Called once before the first frame. Startup-critical resources are
    /// created here; an error aborts the run.
    fn initialize(&mut self, engine: &mut Engine<Self::Request>) -> Result<(), AppError>;

    /// Apply one deferred request
    ///
    /// Called outside every context pass, so the active context may be
    /// replaced or destroyed freely.
    fn apply(&mut self, engine: &mut Engine<Self::Request>, request: Self::Request) -> Result<(), AppError>;

    /// Whether a context is active; the frame hooks only run while it is
    fn is_active(&self) -> bool;

    /// React to this frame's input
    fn handle_input(&mut self, _services: &mut Services<'_, Self::Request>) {}

    /// Advance one frame
    fn update(&mut self, services: &mut Services<'_, Self::Request>) -> Result<(), AppError>;

    /// Draw the frame between begin and end
    fn render(&mut self, services: &mut Services<'_, Self::Request>);

    /// Reapply render state after the graphics device was reset
    fn on_device_reset(&mut self, _services: &mut Services<'_, Self::Request>) {}

    /// Cleanup the application
    ///
    /// Called when the loop ends. Every shared resource reference the
    /// application still holds should be released here.
    fn cleanup(&mut self, engine: &mut Engine<Self::Request>);
}

/// Application-level errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Engine error propagated to application level
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// Asset loading error
    #[error("Asset error: {0}")]
    Asset(#[from] AssetError),

    /// Audio device error
    #[error("Audio error: {0}")]
    Audio(#[from] AudioError),

    /// Object lifecycle error
    #[error("Object error: {0}")]
    Object(#[from] ObjectError),

    /// Request queue error
    #[error("Request queue error: {0}")]
    Queue(#[from] QueueError),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Game logic error
    #[error("Game logic error: {0}")]
    GameLogic(String),
}
