//! Asset loading and pooled acquisition
//!
//! A [`ResourceLoader`] turns embedded resource identifiers into raw asset
//! data. The `acquire_*` helpers wrap the pool protocol every game object
//! follows when it needs a shared asset:
//!
//! 1. look the asset up by its canonical name;
//! 2. if found, take a reference;
//! 3. otherwise load it, register the new resource under the name (the
//!    creation reference moves to the pool slot) and take a reference.
//!
//! The caller owns exactly one reference on success and must release it
//! with [`ResourcePool::release_ref`]. The `preload_*` variants stop after
//! registration, leaving the pool slot as the only holder.

use super::kinds::{check_alignment, Asset, MeshAsset, SoundAsset, SubmeshGeometry, TextureAsset};
use super::pool::{ResourceHandle, ResourcePool};
use super::wav::WavData;
use super::AssetError;
use crate::audio::AudioDevice;
use crate::render::{Material, TextureHandle};

/// Identifier of an embedded resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(pub u32);

impl std::fmt::Display for ResourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Raw mesh data: one entry per submesh in each list
#[derive(Debug, Clone, Default)]
pub struct LoadedMesh {
    /// Geometry per submesh
    pub submeshes: Vec<SubmeshGeometry>,
    /// Material per submesh
    pub materials: Vec<Material>,
    /// Texture resource name per submesh
    pub texture_refs: Vec<Option<String>>,
}

/// Source of embedded asset data
pub trait ResourceLoader {
    /// Load a mesh
    fn load_mesh(&mut self, id: ResourceId) -> Result<LoadedMesh, AssetError>;

    /// Load and validate a WAV resource
    fn load_wav(&mut self, id: ResourceId) -> Result<WavData, AssetError>;

    /// Create a texture from a named embedded image
    fn load_texture(&mut self, name: &str) -> Result<TextureHandle, AssetError>;
}

/// Acquire the mesh called `name`, loading resource `id` on first use
pub fn acquire_mesh(
    pool: &mut ResourcePool<Asset>,
    loader: &mut dyn ResourceLoader,
    name: &str,
    id: ResourceId,
) -> Result<ResourceHandle, AssetError> {
    if let Some(handle) = pool.acquire(name) {
        return Ok(handle);
    }
    let handle = preload_mesh(pool, loader, name, id)?;
    pool.add_ref(handle)?;
    Ok(handle)
}

/// Load resource `id` as a mesh and register it as `name`
///
/// Textures named by the mesh are acquired on its behalf. On failure every
/// reference taken so far is released again.
pub fn preload_mesh(
    pool: &mut ResourcePool<Asset>,
    loader: &mut dyn ResourceLoader,
    name: &str,
    id: ResourceId,
) -> Result<ResourceHandle, AssetError> {
    let loaded = loader.load_mesh(id)?;
    check_alignment(loaded.submeshes.len(), loaded.materials.len(), loaded.texture_refs.len())?;

    let mut textures = Vec::with_capacity(loaded.texture_refs.len());
    for texture_name in &loaded.texture_refs {
        let texture = match texture_name {
            Some(texture_name) => match acquire_texture(pool, loader, texture_name) {
                Ok(handle) => Some(handle),
                Err(err) => {
                    release_all(pool, textures.iter().flatten().copied());
                    return Err(err);
                }
            },
            None => None,
        };
        textures.push(texture);
    }

    let mesh = MeshAsset::from_parts(loaded.submeshes, loaded.materials, textures)?;
    register(pool, Asset::Mesh(mesh), name)
}

/// Acquire the texture called `name`, loading it on first use
pub fn acquire_texture(
    pool: &mut ResourcePool<Asset>,
    loader: &mut dyn ResourceLoader,
    name: &str,
) -> Result<ResourceHandle, AssetError> {
    if let Some(handle) = pool.acquire(name) {
        return Ok(handle);
    }
    let handle = preload_texture(pool, loader, name)?;
    pool.add_ref(handle)?;
    Ok(handle)
}

/// Load the texture called `name` and register it
pub fn preload_texture(
    pool: &mut ResourcePool<Asset>,
    loader: &mut dyn ResourceLoader,
    name: &str,
) -> Result<ResourceHandle, AssetError> {
    let handle = loader.load_texture(name)?;
    register(pool, Asset::Texture(TextureAsset { handle }), name)
}

/// Load resource `id` as a sound, upload it and register it as `name`
///
/// Returns the existing resource when `name` is already registered.
pub fn preload_sound(
    pool: &mut ResourcePool<Asset>,
    loader: &mut dyn ResourceLoader,
    audio: &mut dyn AudioDevice,
    name: &str,
    id: ResourceId,
) -> Result<ResourceHandle, AssetError> {
    if let Some(handle) = pool.find_by_name(name) {
        return Ok(handle);
    }
    let wav = loader.load_wav(id)?;
    let buffer = audio.create_buffer(&wav.format, wav.pcm.len())?;
    if let Err(err) = audio.write_buffer(buffer, &wav.pcm) {
        audio.release_buffer(buffer);
        return Err(err.into());
    }
    register(pool, Asset::Sound(SoundAsset { buffer, format: wav.format }), name)
}

fn register(pool: &mut ResourcePool<Asset>, asset: Asset, name: &str) -> Result<ResourceHandle, AssetError> {
    let handle = pool.create(asset);
    if let Err(err) = pool.add(handle, name) {
        pool.release_ref(handle)?;
        return Err(err.into());
    }
    log::debug!("Loaded resource '{name}'");
    Ok(handle)
}

fn release_all(pool: &mut ResourcePool<Asset>, handles: impl Iterator<Item = ResourceHandle>) {
    let handles: Vec<_> = handles.collect();
    for handle in handles {
        if let Err(err) = pool.release_ref(handle) {
            log::warn!("Releasing partial mesh texture: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::wav::{encode_wav, parse_wav, WaveFormat};
    use crate::audio::headless::HeadlessAudio;
    use crate::render::Vertex;

    #[derive(Default)]
    struct StubLoader {
        mesh_loads: u32,
        texture_loads: u32,
        misaligned: bool,
    }

    impl ResourceLoader for StubLoader {
        fn load_mesh(&mut self, _id: ResourceId) -> Result<LoadedMesh, AssetError> {
            self.mesh_loads += 1;
            let geometry = SubmeshGeometry {
                vertices: vec![Vertex::default(); 3],
                indices: vec![0, 1, 2],
            };
            let materials = if self.misaligned {
                Vec::new()
            } else {
                vec![Material::default(); 2]
            };
            Ok(LoadedMesh {
                submeshes: vec![geometry.clone(), geometry],
                materials,
                texture_refs: vec![Some("Bark".into()), None],
            })
        }

        fn load_wav(&mut self, id: ResourceId) -> Result<WavData, AssetError> {
            if id.0 == 0 {
                return Err(AssetError::NotFound(id));
            }
            parse_wav(&encode_wav(&WaveFormat::pcm16(1, 11_025), &[0, 1, 2, 3]))
        }

        fn load_texture(&mut self, _name: &str) -> Result<TextureHandle, AssetError> {
            self.texture_loads += 1;
            Ok(TextureHandle(self.texture_loads))
        }
    }

    #[test]
    fn test_acquire_loads_once() {
        let mut pool = ResourcePool::new();
        let mut loader = StubLoader::default();

        let first = acquire_mesh(&mut pool, &mut loader, "Tree", ResourceId(110)).unwrap();
        let second = acquire_mesh(&mut pool, &mut loader, "Tree", ResourceId(110)).unwrap();
        assert_eq!(first, second);
        assert_eq!(loader.mesh_loads, 1);
        // pool slot + two holders
        assert_eq!(pool.ref_count(first), Some(3));

        let bark = pool.find_by_name("Bark").unwrap();
        // pool slot + mesh
        assert_eq!(pool.ref_count(bark), Some(2));
    }

    #[test]
    fn test_last_release_frees_mesh_and_texture_reference() {
        let mut pool = ResourcePool::new();
        let mut loader = StubLoader::default();
        let mesh = acquire_mesh(&mut pool, &mut loader, "Tree", ResourceId(110)).unwrap();
        let bark = pool.find_by_name("Bark").unwrap();

        pool.release(mesh);
        pool.release_ref(mesh).unwrap();
        assert!(!pool.contains(mesh));
        assert_eq!(pool.ref_count(bark), Some(1));
    }

    #[test]
    fn test_misaligned_mesh_is_rejected() {
        let mut pool = ResourcePool::new();
        let mut loader = StubLoader {
            misaligned: true,
            ..Default::default()
        };
        let result = acquire_mesh(&mut pool, &mut loader, "Tree", ResourceId(110));
        assert!(matches!(result, Err(AssetError::MalformedMesh(_))));
        assert!(pool.is_empty());
        assert_eq!(loader.texture_loads, 0);
    }

    #[test]
    fn test_preload_sound_uploads_pcm() {
        let mut pool = ResourcePool::new();
        let mut loader = StubLoader::default();
        let mut audio = HeadlessAudio::new();

        let handle = preload_sound(&mut pool, &mut loader, &mut audio, "SndClick", ResourceId(117)).unwrap();
        assert_eq!(pool.ref_count(handle), Some(1));
        let sound = pool.get(handle).and_then(Asset::as_sound).unwrap();
        assert_eq!(audio.data(sound.buffer), Some(&[0, 1, 2, 3][..]));

        let again = preload_sound(&mut pool, &mut loader, &mut audio, "SndClick", ResourceId(117)).unwrap();
        assert_eq!(again, handle);
        assert_eq!(audio.buffer_count(), 1);
    }

    #[test]
    fn test_missing_sound_is_an_error() {
        let mut pool = ResourcePool::new();
        let mut loader = StubLoader::default();
        let mut audio = HeadlessAudio::new();
        let result = preload_sound(&mut pool, &mut loader, &mut audio, "SndLoop", ResourceId(0));
        assert!(matches!(result, Err(AssetError::NotFound(_))));
        assert!(pool.is_empty());
    }
}
