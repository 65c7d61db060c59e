//! # Animated look-at camera
//!
//! The camera tracks a current position and focus point plus an animation
//! segment between a start and an end pair. Setters only move the *end* of
//! the segment; the current values catch up on [`Camera::update`].
//!
//! ## Animation
//! - With speed 0 the camera snaps straight to the end values each update.
//! - [`Camera::begin_animate`] snapshots the current values as the start and
//!   resets progress to 0.
//! - Each update adds `speed` to the progress and interpolates linearly.
//!   Once progress passes 1 it is clamped, speed resets to 0 and the camera
//!   lands exactly on the end values.

use crate::foundation::math::{utils, Mat4, Point3, Vec3};

/// Animated look-at camera with a left-handed, Y-up view
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    position: Vec3,
    focus: Vec3,
    start_position: Vec3,
    start_focus: Vec3,
    end_position: Vec3,
    end_focus: Vec3,
    progress: f32,
    speed: f32,
}

impl Default for Camera {
    fn default() -> Self {
        let position = Vec3::new(0.0, 0.0, -1.0);
        Self {
            position,
            focus: Vec3::zeros(),
            start_position: position,
            start_focus: Vec3::zeros(),
            end_position: position,
            end_focus: Vec3::zeros(),
            progress: 1.0,
            speed: 0.0,
        }
    }
}

impl Camera {
    /// Create a camera at (0, 0, -1) looking at the origin
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the position the camera moves to
    pub fn set_position(&mut self, position: Vec3) {
        self.end_position = position;
        log::trace!("Camera target position set to {:?}", position);
    }

    /// Set the point the camera turns to face
    pub fn set_focus(&mut self, focus: Vec3) {
        self.end_focus = focus;
    }

    /// Start animating from the current values towards the end values
    ///
    /// `speed` is the fraction of the segment covered per update.
    pub fn begin_animate(&mut self, speed: f32) {
        self.start_position = self.position;
        self.start_focus = self.focus;
        self.progress = 0.0;
        self.speed = speed;
    }

    /// Advance the animation by one frame
    pub fn update(&mut self) {
        if self.speed == 0.0 {
            self.snap_to_end();
            return;
        }

        self.progress += self.speed;
        if self.progress >= 1.0 {
            self.progress = 1.0;
            self.speed = 0.0;
            self.snap_to_end();
        } else {
            self.position = utils::lerp_vec3(&self.start_position, &self.end_position, self.progress);
            self.focus = utils::lerp_vec3(&self.start_focus, &self.end_focus, self.progress);
        }
    }

    fn snap_to_end(&mut self) {
        self.position = self.end_position;
        self.focus = self.end_focus;
    }

    /// Current position
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Current focus point
    pub fn focus(&self) -> Vec3 {
        self.focus
    }

    /// Animation progress in 0..=1
    pub fn progress(&self) -> f32 {
        self.progress
    }

    /// Whether an animation is running
    pub fn is_animating(&self) -> bool {
        self.speed != 0.0
    }

    /// Left-handed look-at view matrix
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_lh(
            &Point3::from(self.position),
            &Point3::from(self.focus),
            &Vec3::y(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_defaults() {
        let camera = Camera::new();
        assert_eq!(camera.position(), Vec3::new(0.0, 0.0, -1.0));
        assert_eq!(camera.focus(), Vec3::zeros());
        assert_relative_eq!(camera.progress(), 1.0);
        assert!(!camera.is_animating());
    }

    #[test]
    fn test_snaps_without_animation() {
        let mut camera = Camera::new();
        camera.set_position(Vec3::new(0.0, 10.0, -12.5));
        // setters only move the end values
        assert_eq!(camera.position(), Vec3::new(0.0, 0.0, -1.0));

        camera.update();
        assert_eq!(camera.position(), Vec3::new(0.0, 10.0, -12.5));
    }

    #[test]
    fn test_animation_interpolates() {
        let mut camera = Camera::new();
        camera.set_position(Vec3::new(0.0, 0.0, -1.0));
        camera.update();

        camera.set_position(Vec3::new(0.0, 4.0, -1.0));
        camera.set_focus(Vec3::new(2.0, 0.0, 0.0));
        camera.begin_animate(0.25);
        camera.update();
        assert_relative_eq!(camera.position().y, 1.0, epsilon = 1e-6);
        assert_relative_eq!(camera.focus().x, 0.5, epsilon = 1e-6);

        camera.update();
        assert_relative_eq!(camera.position().y, 2.0, epsilon = 1e-6);
    }

    #[test]
    fn test_animation_lands_exactly() {
        let mut camera = Camera::new();
        let end = Vec3::new(0.3, 10.0, -20.7);
        camera.set_position(end);
        camera.begin_animate(1.0 / 60.0);

        let mut frames = 0;
        while camera.is_animating() {
            camera.update();
            frames += 1;
            assert!(frames <= 61);
        }
        assert_eq!(camera.position(), end);
        assert_relative_eq!(camera.progress(), 1.0);
    }

    #[test]
    fn test_view_matrix_maps_focus_forward() {
        let mut camera = Camera::new();
        camera.set_position(Vec3::new(0.0, 0.0, -10.0));
        camera.update();
        let focus_in_view = camera.view_matrix().transform_point(&Point3::origin());
        // left-handed: looking down +z
        assert_relative_eq!(focus_in_view.z, 10.0, epsilon = 1e-5);
    }
}
