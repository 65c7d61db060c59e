//! Score popups
//!
//! A popup drifts up the screen in two stages of equal length: it fades in
//! at half speed, then fades out at full speed and expires.

use mowve_engine::foundation::math::{colour, Rect, Vec2};
use mowve_engine::scene::{ObjectError, ObjectState, ObjectStatus};

use super::{Core, ObjectKind};
use crate::frame::Scope;

const ORIGIN: [f32; 2] = [32.0, 256.0];
const DRIFT: [f32; 2] = [0.0, -1.0];

/// Screen-space text that fades in, drifts and fades out
#[derive(Debug)]
pub struct FloatingText {
    pub(super) core: Core,
    text: String,
    colour: u32,
    position: Vec2,
    velocity: Vec2,
    stage_frames: u32,
    frames_left: u32,
    stage: u8,
}

impl FloatingText {
    /// Popup showing `text` in `colour` (its alpha is replaced while animating)
    pub fn new(text: impl Into<String>, colour: u32, stage_frames: u32) -> Self {
        let stage_frames = stage_frames.max(1);
        let mut popup = Self {
            core: Core::new(),
            text: text.into(),
            colour,
            position: Vec2::from(ORIGIN),
            velocity: Vec2::from(DRIFT),
            stage_frames,
            frames_left: stage_frames,
            stage: 0,
        };
        popup.initialise();
        popup
    }

    /// Kind tag
    pub const fn kind(&self) -> ObjectKind {
        ObjectKind::FloatingText
    }

    /// Text shown
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Top-left corner in client coordinates
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Colour with this frame's alpha applied
    #[allow(clippy::cast_precision_loss)]
    pub fn current_colour(&self) -> u32 {
        let progress = (self.stage_frames - self.frames_left) as f32 / self.stage_frames as f32;
        let alpha = if self.stage == 0 { progress } else { 1.0 - progress };
        colour::with_alpha(self.colour, alpha)
    }

    pub(super) fn initialise(&mut self) {
        self.core.step_or_log(ObjectState::Initialized);
        self.position = Vec2::from(ORIGIN);
        self.velocity = Vec2::from(DRIFT);
        self.frames_left = self.stage_frames;
        self.stage = 0;
    }

    pub(super) fn create(&mut self, _scope: &mut Scope<'_, '_>) -> Result<(), ObjectError> {
        self.core.step(ObjectState::Created)
    }

    pub(super) fn destroy(mut self, _scope: &mut Scope<'_, '_>) {
        self.core.step_or_log(ObjectState::Destroying);
        self.core.step_or_log(ObjectState::Destroyed);
    }

    pub(super) fn update(&mut self) -> ObjectStatus {
        let step = if self.stage == 0 { self.velocity * 0.5 } else { self.velocity };
        self.position += step;

        self.frames_left -= 1;
        if self.frames_left == 0 {
            self.stage += 1;
            if self.stage > 1 {
                return ObjectStatus::Expired;
            }
            self.frames_left = self.stage_frames;
        }
        ObjectStatus::Alive
    }

    #[allow(clippy::cast_possible_truncation)]
    pub(super) fn render(&self, scope: &mut Scope<'_, '_>) {
        let viewport = scope.frame.services.viewport();
        let area = Rect::new(
            self.position.x as i32,
            self.position.y as i32,
            viewport.right,
            viewport.bottom,
        );
        scope
            .frame
            .services
            .renderer
            .draw_text(&self.text, area, self.current_colour());
    }
}
