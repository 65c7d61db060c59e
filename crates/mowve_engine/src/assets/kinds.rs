//! Concrete pooled asset types
//!
//! Every pooled resource is one [`Asset`] variant. Device handles inside a
//! variant (textures, sound buffers) are freed by [`retire_assets`] once the
//! pool reports the resource destroyed.

use super::pool::{Resource, ResourceHandle, ResourcePool, Retired};
use super::wav::WaveFormat;
use super::AssetError;
use crate::audio::{AudioDevice, BufferHandle};
use crate::foundation::math::Rect;
use crate::render::{Material, PointLight, Renderer, TextureHandle, Vertex};

/// A pooled asset
#[derive(Debug)]
pub enum Asset {
    /// Multi-part textured mesh
    Mesh(MeshAsset),
    /// Single texture
    Texture(TextureAsset),
    /// Sound buffer
    Sound(SoundAsset),
    /// Animated sprite sheet
    Sprite(SpriteAsset),
    /// Scene light
    Light(PointLight),
}

impl Asset {
    /// Variant name for logging
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Mesh(_) => "mesh",
            Self::Texture(_) => "texture",
            Self::Sound(_) => "sound",
            Self::Sprite(_) => "sprite",
            Self::Light(_) => "light",
        }
    }

    /// Mesh payload, if this is a mesh
    pub const fn as_mesh(&self) -> Option<&MeshAsset> {
        match self {
            Self::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }

    /// Texture payload, if this is a texture
    pub const fn as_texture(&self) -> Option<&TextureAsset> {
        match self {
            Self::Texture(texture) => Some(texture),
            _ => None,
        }
    }

    /// Sound payload, if this is a sound
    pub const fn as_sound(&self) -> Option<&SoundAsset> {
        match self {
            Self::Sound(sound) => Some(sound),
            _ => None,
        }
    }

    /// Sprite payload, if this is a sprite
    pub fn as_sprite_mut(&mut self) -> Option<&mut SpriteAsset> {
        match self {
            Self::Sprite(sprite) => Some(sprite),
            _ => None,
        }
    }

    /// Light payload, if this is a light
    pub const fn as_light(&self) -> Option<&PointLight> {
        match self {
            Self::Light(light) => Some(light),
            _ => None,
        }
    }
}

impl Resource for Asset {
    fn dependencies(&self) -> Vec<ResourceHandle> {
        match self {
            Self::Mesh(mesh) => mesh.texture_refs().collect(),
            _ => Vec::new(),
        }
    }
}

/// Texture held by the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureAsset {
    /// Device texture
    pub handle: TextureHandle,
}

/// PCM sound uploaded to the audio device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SoundAsset {
    /// Device buffer
    pub buffer: BufferHandle,
    /// Sample format of the buffer
    pub format: WaveFormat,
}

/// Horizontal strip of equally sized animation frames
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteAsset {
    /// Device texture holding the strip
    pub texture: TextureHandle,
    /// Strip size in pixels
    pub texture_width: u32,
    /// Strip height (and frame height) in pixels
    pub texture_height: u32,
    /// Width of one frame in pixels
    pub frame_width: u32,
    /// Frames advanced per update
    pub speed: f32,
    /// Current frame position
    pub index: f32,
}

impl SpriteAsset {
    /// Create a sprite positioned on its first frame
    pub fn new(texture: TextureHandle, texture_width: u32, texture_height: u32, frame_width: u32) -> Self {
        Self {
            texture,
            texture_width,
            texture_height,
            frame_width: frame_width.max(1),
            speed: 0.0,
            index: 0.0,
        }
    }

    /// Number of whole frames in the strip
    pub fn frame_count(&self) -> u32 {
        (self.texture_width / self.frame_width).max(1)
    }

    /// Advance the animation, wrapping past the last frame
    #[allow(clippy::cast_precision_loss)]
    pub fn advance(&mut self) {
        self.index = (self.index + self.speed).rem_euclid(self.frame_count() as f32);
    }

    /// Source rectangle of the current frame
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_possible_wrap)]
    pub fn frame_rect(&self) -> Rect {
        let frame = (self.index as u32).min(self.frame_count() - 1);
        let left = (frame * self.frame_width) as i32;
        Rect::new(left, 0, left + self.frame_width as i32, self.texture_height as i32)
    }
}

/// One drawable part of a mesh with its own material and texture
#[derive(Debug, Clone)]
pub struct Submesh {
    /// Vertex data
    pub vertices: Vec<Vertex>,
    /// Triangle list indices
    pub indices: Vec<u16>,
    /// Material bound for this part
    pub material: Material,
    /// Texture resource bound for this part; the mesh holds one reference
    pub texture: Option<ResourceHandle>,
}

/// Geometry for one submesh as produced by a loader
#[derive(Debug, Clone, Default)]
pub struct SubmeshGeometry {
    /// Vertex data
    pub vertices: Vec<Vertex>,
    /// Triangle list indices
    pub indices: Vec<u16>,
}

/// Mesh made of index-aligned submeshes, materials and textures
#[derive(Debug, Clone)]
pub struct MeshAsset {
    submeshes: Vec<Submesh>,
}

impl MeshAsset {
    /// Zip geometry, materials and textures into submeshes
    ///
    /// All three lists must have the same length.
    pub fn from_parts(
        geometry: Vec<SubmeshGeometry>,
        materials: Vec<Material>,
        textures: Vec<Option<ResourceHandle>>,
    ) -> Result<Self, AssetError> {
        check_alignment(geometry.len(), materials.len(), textures.len())?;
        let submeshes = geometry
            .into_iter()
            .zip(materials)
            .zip(textures)
            .map(|((geometry, material), texture)| Submesh {
                vertices: geometry.vertices,
                indices: geometry.indices,
                material,
                texture,
            })
            .collect();
        Ok(Self { submeshes })
    }

    /// Submeshes in draw order
    pub fn submeshes(&self) -> &[Submesh] {
        &self.submeshes
    }

    /// Texture resources this mesh holds references to
    pub fn texture_refs(&self) -> impl Iterator<Item = ResourceHandle> + '_ {
        self.submeshes.iter().filter_map(|submesh| submesh.texture)
    }

    /// Issue one draw per submesh with its texture and material bound
    ///
    /// A missing or destroyed texture draws the part untextured.
    pub fn draw(&self, renderer: &mut dyn Renderer, pool: &ResourcePool<Asset>) {
        for submesh in &self.submeshes {
            let texture = submesh
                .texture
                .and_then(|handle| pool.get(handle))
                .and_then(Asset::as_texture)
                .map(|texture| texture.handle);
            renderer.set_texture(texture);
            renderer.bind_material(&submesh.material);
            renderer.draw_indexed_triangle_list(&submesh.vertices, &submesh.indices);
        }
    }
}

/// Validate that a mesh's parallel lists line up
pub fn check_alignment(submeshes: usize, materials: usize, textures: usize) -> Result<(), AssetError> {
    if submeshes == 0 {
        return Err(AssetError::MalformedMesh("mesh has no submeshes".into()));
    }
    if submeshes != materials || submeshes != textures {
        return Err(AssetError::MalformedMesh(format!(
            "{submeshes} submeshes, {materials} materials, {textures} textures"
        )));
    }
    Ok(())
}

/// Free the device handles of destroyed assets
pub fn retire_assets(retired: Vec<Retired<Asset>>, renderer: &mut dyn Renderer, audio: &mut dyn AudioDevice) {
    for Retired { name, payload } in retired {
        log::debug!(
            "Freeing {} '{}'",
            payload.kind_name(),
            name.as_deref().unwrap_or("<unnamed>")
        );
        match payload {
            Asset::Texture(texture) => renderer.release_texture(texture.handle),
            Asset::Sprite(sprite) => renderer.release_texture(sprite.texture),
            Asset::Sound(sound) => audio.release_buffer(sound.buffer),
            Asset::Mesh(_) | Asset::Light(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::headless::HeadlessRenderer;

    fn triangle() -> SubmeshGeometry {
        SubmeshGeometry {
            vertices: vec![Vertex::default(); 3],
            indices: vec![0, 1, 2],
        }
    }

    #[test]
    fn test_mesh_requires_alignment() {
        let result = MeshAsset::from_parts(vec![triangle(), triangle()], vec![Material::default()], vec![None, None]);
        assert!(matches!(result, Err(AssetError::MalformedMesh(_))));

        let result = MeshAsset::from_parts(Vec::new(), Vec::new(), Vec::new());
        assert!(matches!(result, Err(AssetError::MalformedMesh(_))));
    }

    #[test]
    fn test_mesh_draws_each_submesh() {
        let mut pool = ResourcePool::new();
        let texture = pool.create(Asset::Texture(TextureAsset { handle: TextureHandle(7) }));
        pool.add(texture, "Tex").unwrap();
        pool.add_ref(texture).unwrap();

        let mesh = MeshAsset::from_parts(
            vec![triangle(), triangle()],
            vec![Material::default(); 2],
            vec![Some(texture), None],
        )
        .unwrap();

        let mut renderer = HeadlessRenderer::new(640, 480);
        mesh.draw(&mut renderer, &pool);
        assert_eq!(renderer.stats().draw_calls, 2);
        assert_eq!(renderer.stats().untextured_draws, 1);
    }

    #[test]
    fn test_mesh_depends_on_its_textures() {
        let mesh = MeshAsset::from_parts(vec![triangle()], vec![Material::default()], vec![None]).unwrap();
        assert!(Asset::Mesh(mesh).dependencies().is_empty());
    }

    #[test]
    fn test_sprite_frames_wrap() {
        let mut sprite = SpriteAsset::new(TextureHandle(1), 256, 64, 64);
        sprite.speed = 1.5;
        assert_eq!(sprite.frame_count(), 4);
        assert_eq!(sprite.frame_rect(), Rect::new(0, 0, 64, 64));

        sprite.advance();
        assert_eq!(sprite.frame_rect(), Rect::new(64, 0, 128, 64));

        for _ in 0..2 {
            sprite.advance();
        }
        // 4.5 wraps to 0.5
        assert_eq!(sprite.frame_rect(), Rect::new(0, 0, 64, 64));
    }
}
