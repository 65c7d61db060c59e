//! # Rendering System
//!
//! The engine never talks to a graphics API directly. Everything it draws goes
//! through the [`Renderer`] trait, a narrow immediate-mode interface that a
//! native backend (or the bundled [`headless::HeadlessRenderer`]) implements.
//!
//! ## Device loss
//!
//! [`Renderer::present`] reports a [`DeviceState`]. The game loop reacts to
//! `Lost` by calling [`Renderer::on_lost_device`] once, and to `NeedsReset` by
//! attempting [`Renderer::reset_device`] followed by
//! [`Renderer::on_reset_device`]. A failed reset is retried on the next frame.

pub mod camera;
pub mod headless;

pub use camera::Camera;

use crate::foundation::math::{Mat4, Rect, Vec3};
use bytemuck::{Pod, Zeroable};
use thiserror::Error;

/// Vertex layout shared by every mesh
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct Vertex {
    /// Position in model space
    pub position: [f32; 3],
    /// Surface normal
    pub normal: [f32; 3],
    /// Texture coordinates
    pub tex_coord: [f32; 2],
}

impl Vertex {
    /// Create a vertex
    pub const fn new(position: [f32; 3], normal: [f32; 3], tex_coord: [f32; 2]) -> Self {
        Self { position, normal, tex_coord }
    }
}

/// Fixed-function material colours
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    /// Diffuse RGBA
    pub diffuse: [f32; 4],
    /// Ambient RGBA
    pub ambient: [f32; 4],
    /// Specular RGBA
    pub specular: [f32; 4],
    /// Emissive RGBA
    pub emissive: [f32; 4],
    /// Specular exponent
    pub power: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self::from_diffuse([1.0, 1.0, 1.0, 1.0])
    }
}

impl Material {
    /// Material whose ambient colour matches its diffuse colour
    pub const fn from_diffuse(diffuse: [f32; 4]) -> Self {
        Self {
            diffuse,
            ambient: diffuse,
            specular: [0.0, 0.0, 0.0, 1.0],
            emissive: [0.0, 0.0, 0.0, 1.0],
            power: 0.0,
        }
    }
}

/// Opaque renderer-side texture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u32);

/// Point light parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    /// Diffuse RGB
    pub diffuse: [f32; 3],
    /// Specular RGB
    pub specular: [f32; 3],
    /// World position
    pub position: Vec3,
    /// Maximum reach
    pub range: f32,
    /// Constant, linear and quadratic attenuation
    pub attenuation: [f32; 3],
}

impl Default for PointLight {
    fn default() -> Self {
        Self {
            diffuse: [0.8, 0.8, 0.8],
            specular: [0.2, 0.2, 0.2],
            position: Vec3::new(1.0, 20.0, -20.0),
            range: 100.0,
            attenuation: [0.0, 0.01, 0.0],
        }
    }
}

/// Result of presenting a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceState {
    /// Frame shown
    Ok,
    /// Device lost and cannot be reset yet
    Lost,
    /// Device lost and ready to be reset
    NeedsReset,
}

/// Rendering errors
#[derive(Debug, Error)]
pub enum RenderError {
    /// The device could not be reset
    #[error("Device reset failed: {0}")]
    ResetFailed(String),

    /// The backend could not be initialised
    #[error("Renderer initialization failed: {0}")]
    InitializationFailed(String),
}

/// Immediate-mode rendering interface implemented by graphics backends
pub trait Renderer {
    /// Client area in pixels
    fn viewport(&self) -> Rect;

    /// Start recording a frame
    fn begin_frame(&mut self);

    /// Finish recording a frame
    fn end_frame(&mut self);

    /// Show the frame
    fn present(&mut self) -> DeviceState;

    /// Clear colour and depth
    fn clear(&mut self, colour: u32);

    /// Model-to-world transform for subsequent draws
    fn set_world_transform(&mut self, matrix: &Mat4);

    /// World-to-view transform
    fn set_view_transform(&mut self, matrix: &Mat4);

    /// Projection transform
    fn set_projection_transform(&mut self, matrix: &Mat4);

    /// Texture for subsequent draws; `None` draws untextured
    fn set_texture(&mut self, texture: Option<TextureHandle>);

    /// Material for subsequent draws
    fn bind_material(&mut self, material: &Material);

    /// Configure and enable a light
    fn set_light(&mut self, index: u32, light: &PointLight);

    /// Draw an indexed triangle list
    fn draw_indexed_triangle_list(&mut self, vertices: &[Vertex], indices: &[u16]);

    /// Fill a screen rectangle with a solid colour
    fn fill_rect(&mut self, rect: Rect, colour: u32);

    /// Draw a textured screen rectangle
    fn draw_sprite(&mut self, texture: TextureHandle, dest: Rect, colour: u32);

    /// Draw text inside a screen rectangle
    fn draw_text(&mut self, text: &str, rect: Rect, colour: u32);

    /// Free a texture
    fn release_texture(&mut self, texture: TextureHandle);

    /// Device-dependent objects (font, sprite batch) must drop their device state
    fn on_lost_device(&mut self);

    /// Try to reset a lost device
    fn reset_device(&mut self) -> Result<(), RenderError>;

    /// Device-dependent objects may recreate their device state
    fn on_reset_device(&mut self);
}
