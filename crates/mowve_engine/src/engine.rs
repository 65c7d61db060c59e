//! Core engine implementation
//!
//! The engine owns every collaborator and the shared per-frame state, and
//! drives one [`Application`] through the frame sequence:
//!
//! 1. pump input (a quit signal ends the loop)
//! 2. while a modal wait is up, poll its dismiss key and do nothing else
//! 3. drain the deferred request queue into [`Application::apply`]
//! 4. advance the frame clock and the camera
//! 5. input, update and render the active context, then present
//! 6. recover from device loss, free retired assets, roll input over

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::Application;
use crate::assets::kinds::retire_assets;
use crate::assets::{Asset, ResourceLoader, ResourcePool};
use crate::audio::AudioDevice;
use crate::config::{Config, ConfigError};
use crate::events::{QueueError, RequestQueue};
use crate::foundation::math::Rect;
use crate::foundation::time::FrameClock;
use crate::input::{InputSource, InputState, KeyCode};
use crate::render::{Camera, DeviceState, RenderError, Renderer};

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Frame rate the per-frame constants are tuned for
    pub desired_fps: f32,

    /// Sleep between dismiss-key polls during a modal wait
    pub modal_poll_ms: u64,

    /// Blocks the request queue may grow to
    pub request_block_limit: usize,

    /// Stop after this many frames (headless runs)
    pub max_frames: Option<u64>,

    /// Client area width
    pub viewport_width: i32,

    /// Client area height
    pub viewport_height: i32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            desired_fps: 60.0,
            modal_poll_ms: 1,
            request_block_limit: crate::events::DEFAULT_BLOCK_LIMIT,
            max_frames: None,
            viewport_width: 1024,
            viewport_height: 768,
        }
    }
}

impl Config for EngineConfig {}

/// Engine-level errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// Initialization error
    #[error("Engine initialization failed: {0}")]
    InitializationFailed(String),

    /// Rendering error
    #[error("Rendering error: {0}")]
    Render(#[from] RenderError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Request queue error
    #[error("Request queue error: {0}")]
    Queue(#[from] QueueError),

    /// Application error
    #[error("Application error: {0}")]
    Application(String),
}

/// External collaborators handed to the engine
pub struct Collaborators {
    /// Embedded asset source
    pub loader: Box<dyn ResourceLoader>,
    /// Graphics device
    pub renderer: Box<dyn Renderer>,
    /// Sound device
    pub audio: Box<dyn AudioDevice>,
    /// Window event feed
    pub input: Box<dyn InputSource>,
}

/// Blocking "press a key to continue" screen
#[derive(Debug, Clone, PartialEq)]
pub struct ModalWait<R> {
    /// Text shown
    pub message: String,
    /// Box drawn behind the text
    pub area: Rect,
    /// Box colour
    pub background: u32,
    /// Text colour
    pub text_colour: u32,
    /// Key that ends the wait
    pub dismiss: KeyCode,
    /// Request queued once dismissed
    pub then: R,
}

/// Borrowed engine state handed to the application each frame
pub struct Services<'e, R> {
    /// Shared asset cache
    pub resources: &'e mut ResourcePool<Asset>,
    /// Embedded asset source
    pub loader: &'e mut dyn ResourceLoader,
    /// Graphics device
    pub renderer: &'e mut dyn Renderer,
    /// Sound device
    pub audio: &'e mut dyn AudioDevice,
    /// This frame's input
    pub input: &'e InputState,
    /// Scene camera
    pub camera: &'e mut Camera,
    /// Frame timing
    pub clock: &'e FrameClock,
    /// Deferred requests for the next frame
    pub requests: &'e mut RequestQueue<R>,
}

impl<R> Services<'_, R> {
    /// Queue `request` for the top of the next frame
    ///
    /// A full queue drops the request with a warning.
    pub fn request(&mut self, request: R) {
        if let Err(err) = self.requests.add(request) {
            log::warn!("Dropping request: {err}");
        }
    }

    /// Client area
    pub fn viewport(&self) -> Rect {
        self.renderer.viewport()
    }

    /// Shorter-lived copy of the same borrows
    pub fn reborrow(&mut self) -> Services<'_, R> {
        Services {
            resources: &mut *self.resources,
            loader: &mut *self.loader,
            renderer: &mut *self.renderer,
            audio: &mut *self.audio,
            input: self.input,
            camera: &mut *self.camera,
            clock: self.clock,
            requests: &mut *self.requests,
        }
    }
}

/// Main engine struct
pub struct Engine<R> {
    config: EngineConfig,
    resources: ResourcePool<Asset>,
    loader: Box<dyn ResourceLoader>,
    renderer: Box<dyn Renderer>,
    audio: Box<dyn AudioDevice>,
    input_source: Box<dyn InputSource>,
    input: InputState,
    camera: Camera,
    clock: FrameClock,
    requests: RequestQueue<R>,
    modal: Option<ModalWait<R>>,
    running: bool,
    device_lost: bool,
    frames: u64,
}

impl<R> Engine<R> {
    /// Create a new engine instance
    pub fn new(config: EngineConfig, collaborators: Collaborators) -> Self {
        log::info!("Initializing engine at {} fps", config.desired_fps);
        let Collaborators {
            loader,
            renderer,
            audio,
            input,
        } = collaborators;
        Self {
            clock: FrameClock::new(config.desired_fps),
            requests: RequestQueue::with_block_limit(config.request_block_limit),
            config,
            resources: ResourcePool::new(),
            loader,
            renderer,
            audio,
            input_source: input,
            input: InputState::new(),
            camera: Camera::new(),
            modal: None,
            running: true,
            device_lost: false,
            frames: 0,
        }
    }

    /// Run `app` until it quits, the input source closes or the frame limit is hit
    pub fn run<A>(&mut self, app: &mut A) -> Result<(), EngineError>
    where
        A: Application<Request = R>,
    {
        app.initialize(self)
            .map_err(|e| EngineError::Application(format!("App initialization: {e}")))?;

        log::info!("Starting main loop...");
        let result = self.run_frames(app);

        app.cleanup(self);
        self.resources.clear();
        let retired = self.resources.take_retired();
        retire_assets(retired, &mut *self.renderer, &mut *self.audio);
        log::info!("Engine shutdown complete after {} frames", self.frames);
        result
    }

    fn run_frames<A>(&mut self, app: &mut A) -> Result<(), EngineError>
    where
        A: Application<Request = R>,
    {
        while self.running {
            if self.config.max_frames.is_some_and(|limit| self.frames >= limit) {
                log::info!("Frame limit reached");
                break;
            }
            self.tick(app)?;
        }
        Ok(())
    }

    /// Run one frame
    pub fn tick<A>(&mut self, app: &mut A) -> Result<(), EngineError>
    where
        A: Application<Request = R>,
    {
        self.frames += 1;
        if !self.input_source.pump(&mut self.input) {
            self.quit();
            return Ok(());
        }

        if self.modal.is_some() {
            self.poll_modal()?;
            self.input.end_frame();
            return Ok(());
        }

        for request in self.requests.drain() {
            app.apply(self, request)
                .map_err(|e| EngineError::Application(format!("Applying request: {e}")))?;
        }
        if self.modal.is_some() || !self.running {
            self.input.end_frame();
            return Ok(());
        }

        self.clock.tick();
        self.camera.update();

        if app.is_active() {
            let mut services = self.services();
            app.handle_input(&mut services);
            app.update(&mut services)
                .map_err(|e| EngineError::Application(format!("App update: {e}")))?;

            services.renderer.begin_frame();
            app.render(&mut services);
            services.renderer.end_frame();

            let state = self.renderer.present();
            self.handle_present(state, app);
        }

        let retired = self.resources.take_retired();
        retire_assets(retired, &mut *self.renderer, &mut *self.audio);
        self.input.end_frame();
        Ok(())
    }

    fn poll_modal(&mut self) -> Result<(), EngineError> {
        let dismissed = self
            .modal
            .as_ref()
            .is_some_and(|modal| self.input.is_key_down(modal.dismiss));
        if dismissed {
            if let Some(modal) = self.modal.take() {
                log::debug!("Modal wait dismissed with {:?}", modal.dismiss);
                self.requests.add(modal.then)?;
            }
        } else if self.config.modal_poll_ms > 0 {
            std::thread::sleep(Duration::from_millis(self.config.modal_poll_ms));
        }
        Ok(())
    }

    fn handle_present<A>(&mut self, state: DeviceState, app: &mut A)
    where
        A: Application<Request = R>,
    {
        match state {
            DeviceState::Ok => {}
            DeviceState::Lost => self.notify_lost(),
            DeviceState::NeedsReset => {
                self.notify_lost();
                match self.renderer.reset_device() {
                    Ok(()) => {
                        log::info!("Graphics device reset");
                        self.renderer.on_reset_device();
                        self.device_lost = false;
                        app.on_device_reset(&mut self.services());
                    }
                    Err(err) => log::warn!("{err}; retrying next frame"),
                }
            }
        }
    }

    fn notify_lost(&mut self) {
        if !self.device_lost {
            log::warn!("Graphics device lost");
            self.renderer.on_lost_device();
            self.device_lost = true;
        }
    }

    /// Show a modal screen and block the loop until its key is held
    ///
    /// The screen is drawn and presented once; the dismiss key's follow-up
    /// request is queued when the wait ends.
    pub fn begin_modal(&mut self, modal: ModalWait<R>) {
        log::info!("Waiting for {:?}", modal.dismiss);
        self.renderer.begin_frame();
        self.renderer.fill_rect(modal.area, modal.background);
        self.renderer.draw_text(&modal.message, modal.area, modal.text_colour);
        self.renderer.end_frame();
        let state = self.renderer.present();
        if state != DeviceState::Ok {
            log::debug!("Modal screen present returned {state:?}");
        }
        self.modal = Some(modal);
    }

    /// Active modal wait, if any
    pub fn modal(&self) -> Option<&ModalWait<R>> {
        self.modal.as_ref()
    }

    /// Borrow the per-frame services
    pub fn services(&mut self) -> Services<'_, R> {
        Services {
            resources: &mut self.resources,
            loader: &mut *self.loader,
            renderer: &mut *self.renderer,
            audio: &mut *self.audio,
            input: &self.input,
            camera: &mut self.camera,
            clock: &self.clock,
            requests: &mut self.requests,
        }
    }

    /// Queue a request for the next frame
    pub fn request(&mut self, request: R) -> Result<(), QueueError> {
        self.requests.add(request)
    }

    /// Request engine shutdown
    pub fn quit(&mut self) {
        if self.running {
            log::info!("Engine shutdown requested");
        }
        self.running = false;
    }

    /// Whether the loop keeps going
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Whether the graphics device is waiting for a reset
    pub fn is_device_lost(&self) -> bool {
        self.device_lost
    }

    /// Frames run so far
    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    /// Engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Shared asset cache
    pub fn resources(&self) -> &ResourcePool<Asset> {
        &self.resources
    }

    /// Scene camera
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Current input snapshot
    pub fn input(&self) -> &InputState {
        &self.input
    }
}
