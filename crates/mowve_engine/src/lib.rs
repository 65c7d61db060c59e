//! # Mowve Engine
//!
//! Runtime core for small real-time arcade games: a reference-counted asset
//! pool, a deferred request queue, owned game-object registries and a
//! single-threaded game loop with modal waits and graphics device recovery.
//!
//! Window, graphics and audio devices sit behind traits; the crate ships
//! headless implementations of each so games run and test without hardware.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mowve_engine::prelude::*;
//!
//! struct MyApp;
//!
//! impl Application for MyApp {
//!     type Request = ();
//!
//!     fn initialize(&mut self, _engine: &mut Engine<()>) -> Result<(), AppError> {
//!         Ok(())
//!     }
//!
//!     fn apply(&mut self, _engine: &mut Engine<()>, _request: ()) -> Result<(), AppError> {
//!         Ok(())
//!     }
//!
//!     fn is_active(&self) -> bool {
//!         true
//!     }
//!
//!     fn update(&mut self, _services: &mut Services<'_, ()>) -> Result<(), AppError> {
//!         Ok(())
//!     }
//!
//!     fn render(&mut self, _services: &mut Services<'_, ()>) {}
//!
//!     fn cleanup(&mut self, _engine: &mut Engine<()>) {}
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod assets;
pub mod audio;
pub mod config;
pub mod events;
pub mod foundation;
pub mod input;
pub mod render;
pub mod scene;

mod application;
mod engine;

pub use application::{AppError, Application};
pub use engine::{Collaborators, Engine, EngineConfig, EngineError, ModalWait, Services};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        assets::{Asset, AssetError, ResourceHandle, ResourceId, ResourceLoader, ResourcePool},
        audio::AudioDevice,
        config::Config,
        events::RequestQueue,
        foundation::{
            math::{Mat4, Rect, Transform, Vec3},
            time::FrameClock,
        },
        input::{InputSource, InputState, KeyCode, MouseButtons},
        render::{Camera, Renderer},
        scene::{Container, Identity, Lifecycle, ObjectId, ObjectRegistry, ObjectStatus, Simulated},
        AppError, Application, Collaborators, Engine, EngineConfig, EngineError, ModalWait, Services,
    };
}
