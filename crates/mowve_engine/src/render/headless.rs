//! Renderer that draws nothing and records what it was asked to do
//!
//! Used by the headless binary and by tests. Device loss can be scripted to
//! exercise the game loop's recovery path.

use super::{DeviceState, Material, PointLight, RenderError, Renderer, TextureHandle, Vertex};
use crate::foundation::math::{Mat4, Rect};

/// Counters collected by [`HeadlessRenderer`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Frames begun
    pub frames: u64,
    /// Presents attempted
    pub presents: u64,
    /// Indexed triangle-list draws
    pub draw_calls: u64,
    /// Untextured draws
    pub untextured_draws: u64,
    /// Bytes of vertex data submitted
    pub vertex_bytes: u64,
    /// Text draws
    pub text_draws: u64,
    /// Sprite and rectangle draws
    pub quad_draws: u64,
    /// Times device-dependent objects were told the device was lost
    pub lost_notifications: u64,
    /// Successful device resets
    pub resets: u64,
    /// Textures released
    pub textures_released: u64,
}

/// Renderer without a device
#[derive(Debug)]
pub struct HeadlessRenderer {
    viewport: Rect,
    stats: RenderStats,
    bound_texture: Option<TextureHandle>,
    in_frame: bool,
    scripted_states: Vec<DeviceState>,
    failed_resets: u32,
    last_text: Vec<String>,
    lights: Vec<(u32, PointLight)>,
}

impl HeadlessRenderer {
    /// Create a renderer with the given client size
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            viewport: Rect::new(0, 0, width, height),
            stats: RenderStats::default(),
            bound_texture: None,
            in_frame: false,
            scripted_states: Vec::new(),
            failed_resets: 0,
            last_text: Vec::new(),
            lights: Vec::new(),
        }
    }

    /// Report these states from the next presents, in order, then `Ok`
    pub fn script_present(&mut self, states: impl IntoIterator<Item = DeviceState>) {
        let mut states: Vec<_> = states.into_iter().collect();
        states.reverse();
        self.scripted_states = states;
    }

    /// Make the next `count` reset attempts fail
    pub fn fail_resets(&mut self, count: u32) {
        self.failed_resets = count;
    }

    /// Counters so far
    pub fn stats(&self) -> &RenderStats {
        &self.stats
    }

    /// Text drawn during the current (or last) frame
    pub fn frame_text(&self) -> &[String] {
        &self.last_text
    }

    /// Lights set so far, in order
    pub fn lights(&self) -> &[(u32, PointLight)] {
        &self.lights
    }
}

impl Renderer for HeadlessRenderer {
    fn viewport(&self) -> Rect {
        self.viewport
    }

    fn begin_frame(&mut self) {
        self.in_frame = true;
        self.stats.frames += 1;
        self.last_text.clear();
    }

    fn end_frame(&mut self) {
        self.in_frame = false;
    }

    fn present(&mut self) -> DeviceState {
        self.stats.presents += 1;
        self.scripted_states.pop().unwrap_or(DeviceState::Ok)
    }

    fn clear(&mut self, _colour: u32) {}

    fn set_world_transform(&mut self, _matrix: &Mat4) {}

    fn set_view_transform(&mut self, _matrix: &Mat4) {}

    fn set_projection_transform(&mut self, _matrix: &Mat4) {}

    fn set_texture(&mut self, texture: Option<TextureHandle>) {
        self.bound_texture = texture;
    }

    fn bind_material(&mut self, _material: &Material) {}

    fn set_light(&mut self, index: u32, light: &PointLight) {
        self.lights.push((index, *light));
    }

    fn draw_indexed_triangle_list(&mut self, vertices: &[Vertex], _indices: &[u16]) {
        self.stats.draw_calls += 1;
        if self.bound_texture.is_none() {
            self.stats.untextured_draws += 1;
        }
        self.stats.vertex_bytes += bytemuck::cast_slice::<Vertex, u8>(vertices).len() as u64;
    }

    fn fill_rect(&mut self, _rect: Rect, _colour: u32) {
        self.stats.quad_draws += 1;
    }

    fn draw_sprite(&mut self, _texture: TextureHandle, _dest: Rect, _colour: u32) {
        self.stats.quad_draws += 1;
    }

    fn draw_text(&mut self, text: &str, _rect: Rect, _colour: u32) {
        self.stats.text_draws += 1;
        self.last_text.push(text.to_owned());
    }

    fn release_texture(&mut self, _texture: TextureHandle) {
        self.stats.textures_released += 1;
    }

    fn on_lost_device(&mut self) {
        self.stats.lost_notifications += 1;
    }

    fn reset_device(&mut self) -> Result<(), RenderError> {
        if self.failed_resets > 0 {
            self.failed_resets -= 1;
            return Err(RenderError::ResetFailed("device still busy".into()));
        }
        self.stats.resets += 1;
        Ok(())
    }

    fn on_reset_device(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_present_order() {
        let mut renderer = HeadlessRenderer::new(640, 480);
        renderer.script_present([DeviceState::Lost, DeviceState::NeedsReset]);
        assert_eq!(renderer.present(), DeviceState::Lost);
        assert_eq!(renderer.present(), DeviceState::NeedsReset);
        assert_eq!(renderer.present(), DeviceState::Ok);
    }

    #[test]
    fn test_counts_vertex_bytes() {
        let mut renderer = HeadlessRenderer::new(640, 480);
        let vertices = [Vertex::default(); 3];
        renderer.set_texture(None);
        renderer.draw_indexed_triangle_list(&vertices, &[0, 1, 2]);
        assert_eq!(renderer.stats().draw_calls, 1);
        assert_eq!(renderer.stats().untextured_draws, 1);
        assert_eq!(renderer.stats().vertex_bytes, 3 * 32);
    }

    #[test]
    fn test_failed_reset() {
        let mut renderer = HeadlessRenderer::new(640, 480);
        renderer.fail_resets(1);
        assert!(renderer.reset_device().is_err());
        assert!(renderer.reset_device().is_ok());
        assert_eq!(renderer.stats().resets, 1);
    }
}
