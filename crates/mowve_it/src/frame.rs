//! Per-frame environments handed to contexts and their objects
//!
//! A context receives a [`Frame`]: the engine services plus the game's
//! settings and random source. Objects inside a context receive a [`Scope`],
//! which adds the running level's state when there is one.

use mowve_engine::assets::{Asset, ResourceHandle};
use mowve_engine::foundation::math::Mat4;
use mowve_engine::Services;
use rand::rngs::StdRng;

use crate::commands::Command;
use crate::config::GameConfig;
use crate::levels::LevelState;

/// Environment for contexts
pub struct Frame<'f> {
    /// Engine services
    pub services: Services<'f, Command>,
    /// Live settings, edited by the options menu
    pub settings: &'f mut GameConfig,
    /// Spawn placement randomness
    pub rng: &'f mut StdRng,
}

impl<'f> Frame<'f> {
    /// Bundle the engine services with game state
    pub fn new(services: Services<'f, Command>, settings: &'f mut GameConfig, rng: &'f mut StdRng) -> Self {
        Self { services, settings, rng }
    }

    /// Queue a command for the next frame
    pub fn request(&mut self, command: Command) {
        self.services.request(command);
    }

    /// Start a named sound from the pool, if it is loaded
    pub fn play_sound(&mut self, name: &str) {
        let Some(buffer) = self
            .services
            .resources
            .get_by_name(name)
            .and_then(Asset::as_sound)
            .map(|sound| sound.buffer)
        else {
            log::trace!("Sound '{name}' not loaded");
            return;
        };
        if let Err(err) = self.services.audio.play(buffer, false) {
            log::warn!("Playing '{name}': {err}");
        }
    }

    /// Drop one reference on a held resource, logging bookkeeping errors
    pub fn release(&mut self, handle: ResourceHandle) {
        if let Err(err) = self.services.resources.release_ref(handle) {
            log::warn!("Releasing resource: {err}");
        }
    }

    /// Draw a pooled mesh with `world` as its transform
    pub fn draw_mesh(&mut self, handle: Option<ResourceHandle>, world: &Mat4) {
        let Some(handle) = handle else { return };
        let services = &mut self.services;
        services.renderer.set_world_transform(world);
        if let Some(mesh) = services.resources.get(handle).and_then(Asset::as_mesh) {
            mesh.draw(&mut *services.renderer, &*services.resources);
        }
    }
}

/// Environment for objects inside a context
pub struct Scope<'s, 'f> {
    /// The owning context's frame
    pub frame: &'s mut Frame<'f>,
    /// Running level, when the context is the main game
    pub level: Option<&'s mut LevelState>,
}

impl<'s, 'f> Scope<'s, 'f> {
    /// Scope without a level
    pub fn menu(frame: &'s mut Frame<'f>) -> Self {
        Self { frame, level: None }
    }

    /// Scope over a running level
    pub fn level(frame: &'s mut Frame<'f>, level: &'s mut LevelState) -> Self {
        Self {
            frame,
            level: Some(level),
        }
    }
}
