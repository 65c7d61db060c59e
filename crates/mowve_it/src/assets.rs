//! Embedded asset catalogue and the built-in loader
//!
//! Each pooled asset has a canonical name and an embedded resource id. The
//! [`BuiltinLoader`] produces the data procedurally: box meshes sized per
//! model, texture handles for the named images and short synthesised WAV
//! clips that go through the engine's WAV parser like a file would.

use std::collections::HashMap;

use mowve_engine::assets::wav::{encode_wav, parse_wav, WavData, WaveFormat};
use mowve_engine::assets::{AssetError, LoadedMesh, ResourceId, ResourceLoader, SubmeshGeometry};
use mowve_engine::render::{Material, TextureHandle, Vertex};

/// Grass, highest detail
pub const GRASS_1: ResourceId = ResourceId(101);
/// Grass, medium detail
pub const GRASS_2: ResourceId = ResourceId(102);
/// Grass, lowest detail
pub const GRASS_3: ResourceId = ResourceId(103);
/// Garden gnome
pub const GNOME: ResourceId = ResourceId(104);
/// Mower Mini
pub const MOWER_MINI: ResourceId = ResourceId(105);
/// Mower Mover
pub const MOWER_MOVER: ResourceId = ResourceId(106);
/// Mower Monster
pub const MOWER_MONSTER: ResourceId = ResourceId(107);
/// Stone ornament
pub const ORNAMENT: ResourceId = ResourceId(108);
/// Tree
pub const TREE: ResourceId = ResourceId(109);
/// Tree with beehive
pub const TREE_BEEHIVE: ResourceId = ResourceId(110);
/// Cat
pub const CAT: ResourceId = ResourceId(111);
/// Dog
pub const DOG: ResourceId = ResourceId(112);
/// Rabbit helper
pub const RABBIT: ResourceId = ResourceId(113);
/// Mole hill
pub const MOLE_HILL: ResourceId = ResourceId(114);
/// Button face, idle
pub const BUTTON_INACTIVE: ResourceId = ResourceId(115);
/// Button face, hovered
pub const BUTTON_ACTIVE: ResourceId = ResourceId(116);
/// Button face, held
pub const BUTTON_PRESSED: ResourceId = ResourceId(117);
/// Button face, disabled
pub const BUTTON_DISABLED: ResourceId = ResourceId(118);
/// Grass blade texture
pub const GRASS_BLADE: ResourceId = ResourceId(119);
/// Seamless grass texture
pub const GRASS_SEAMLESS: ResourceId = ResourceId(120);
/// Dirt texture
pub const DIRT: ResourceId = ResourceId(121);
/// Sun painting texture
pub const SUN_PAINTING: ResourceId = ResourceId(122);
/// Background music loop
pub const GUITAR_LOOP: ResourceId = ResourceId(123);
/// Button click sound
pub const SND_CLICK: ResourceId = ResourceId(124);
/// Button hover sound
pub const SND_HOVER: ResourceId = ResourceId(125);

/// Pool names of shared assets
pub mod names {
    /// Grass tile mesh at the current density
    pub const GRASS: &str = "Grass";
    /// Gnome mesh
    pub const GNOME: &str = "Gnome";
    /// Ornament mesh
    pub const ORNAMENT: &str = "Ornament";
    /// Mole hill mesh
    pub const MOLE_HILL: &str = "MoleHill";
    /// Rabbit mesh
    pub const RABBIT: &str = "Rabbit";
    /// Background music
    pub const SND_LOOP: &str = "SndLoop";
    /// Hover sound
    pub const SND_HOVER: &str = "SndHover";
    /// Click sound
    pub const SND_CLICK: &str = "SndClick";
    /// Scene light
    pub const GLOBAL_LIGHT: &str = "GlobalLight";
    /// Idle button face
    pub const FACE_INACTIVE: &str = "ButtonFaceInactive";
    /// Hovered button face
    pub const FACE_ACTIVE: &str = "ButtonFaceActive";
    /// Held button face
    pub const FACE_PRESSED: &str = "ButtonFacePressed";
    /// Disabled button face
    pub const FACE_DISABLED: &str = "ButtonFaceDisabled";
}

/// Sounds loaded at startup; the game cannot run without them
pub const SOUNDS: [(&str, ResourceId); 3] = [
    (names::SND_LOOP, GUITAR_LOOP),
    (names::SND_HOVER, SND_HOVER),
    (names::SND_CLICK, SND_CLICK),
];

/// Grass mesh resource for a density setting
pub fn grass_for_density(density: f32) -> ResourceId {
    if density < 1.0 / 3.0 {
        GRASS_3
    } else if density < 2.0 / 3.0 {
        GRASS_2
    } else {
        GRASS_1
    }
}

/// Embedded image names and the resource they come from
const IMAGES: [(&str, ResourceId); 8] = [
    (names::FACE_INACTIVE, BUTTON_INACTIVE),
    (names::FACE_ACTIVE, BUTTON_ACTIVE),
    (names::FACE_PRESSED, BUTTON_PRESSED),
    (names::FACE_DISABLED, BUTTON_DISABLED),
    ("GrassBlade", GRASS_BLADE),
    ("GrassSeamless", GRASS_SEAMLESS),
    ("Dirt", DIRT),
    ("SunPainting", SUN_PAINTING),
];

const SAMPLE_RATE: u32 = 22_050;

/// Shape of a procedural mesh: half extents, diffuse colour and texture
struct Model {
    half: [f32; 3],
    colour: [f32; 4],
    texture: Option<&'static str>,
}

fn model(id: ResourceId) -> Option<Model> {
    let (half, colour, texture) = match id {
        GRASS_1 => ([1.0, 0.4, 1.0], [0.2, 0.7, 0.2, 1.0], Some("GrassBlade")),
        GRASS_2 => ([1.0, 0.3, 1.0], [0.2, 0.65, 0.2, 1.0], Some("GrassBlade")),
        GRASS_3 => ([1.0, 0.2, 1.0], [0.25, 0.6, 0.2, 1.0], Some("GrassSeamless")),
        GNOME => ([0.4, 0.8, 0.4], [0.8, 0.1, 0.1, 1.0], None),
        MOWER_MINI => ([0.6, 0.4, 0.8], [0.9, 0.6, 0.1, 1.0], None),
        MOWER_MOVER => ([0.8, 0.5, 1.0], [0.1, 0.3, 0.9, 1.0], None),
        MOWER_MONSTER => ([1.2, 0.8, 1.5], [0.6, 0.1, 0.6, 1.0], None),
        ORNAMENT => ([0.5, 0.6, 0.5], [0.6, 0.6, 0.6, 1.0], None),
        TREE | TREE_BEEHIVE => ([0.8, 3.0, 0.8], [0.3, 0.5, 0.1, 1.0], None),
        CAT | DOG => ([0.3, 0.4, 0.7], [0.5, 0.4, 0.3, 1.0], None),
        RABBIT => ([0.3, 0.4, 0.5], [0.9, 0.9, 0.9, 1.0], None),
        MOLE_HILL => ([0.7, 0.4, 0.7], [0.4, 0.25, 0.1, 1.0], Some("Dirt")),
        _ => return None,
    };
    Some(Model { half, colour, texture })
}

/// Axis-aligned box standing on y = 0, four vertices per face
fn cuboid([hx, hy, hz]: [f32; 3]) -> SubmeshGeometry {
    let h = hy * 2.0;
    let faces: [([f32; 3], [[f32; 3]; 4]); 6] = [
        ([0.0, 0.0, -1.0], [[-hx, 0.0, -hz], [-hx, h, -hz], [hx, h, -hz], [hx, 0.0, -hz]]),
        ([0.0, 0.0, 1.0], [[hx, 0.0, hz], [hx, h, hz], [-hx, h, hz], [-hx, 0.0, hz]]),
        ([-1.0, 0.0, 0.0], [[-hx, 0.0, hz], [-hx, h, hz], [-hx, h, -hz], [-hx, 0.0, -hz]]),
        ([1.0, 0.0, 0.0], [[hx, 0.0, -hz], [hx, h, -hz], [hx, h, hz], [hx, 0.0, hz]]),
        ([0.0, 1.0, 0.0], [[-hx, h, -hz], [-hx, h, hz], [hx, h, hz], [hx, h, -hz]]),
        ([0.0, -1.0, 0.0], [[-hx, 0.0, hz], [-hx, 0.0, -hz], [hx, 0.0, -hz], [hx, 0.0, hz]]),
    ];
    let uvs = [[0.0, 1.0], [0.0, 0.0], [1.0, 0.0], [1.0, 1.0]];

    let mut geometry = SubmeshGeometry::default();
    for (normal, corners) in faces {
        let base = u16::try_from(geometry.vertices.len()).unwrap_or(u16::MAX);
        geometry
            .vertices
            .extend(corners.iter().zip(uvs).map(|(corner, uv)| Vertex::new(*corner, normal, uv)));
        geometry
            .indices
            .extend([base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    geometry
}

/// Tone used for each sound resource: frequency and length in samples
fn tone(id: ResourceId) -> Option<(f32, usize)> {
    match id {
        GUITAR_LOOP => Some((196.0, SAMPLE_RATE as usize)),
        SND_CLICK => Some((880.0, 1_024)),
        SND_HOVER => Some((660.0, 512)),
        _ => None,
    }
}

#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
fn synthesise(frequency: f32, samples: usize) -> Vec<u8> {
    let step = std::f32::consts::TAU * frequency / SAMPLE_RATE as f32;
    (0..samples)
        .flat_map(|n| {
            let sample = ((n as f32 * step).sin() * f32::from(i16::MAX / 4)) as i16;
            sample.to_le_bytes()
        })
        .collect()
}

/// Loader serving the built-in procedural assets
#[derive(Debug, Default)]
pub struct BuiltinLoader {
    textures: HashMap<String, TextureHandle>,
    next_texture: u32,
    meshes_loaded: u32,
}

impl BuiltinLoader {
    /// Create a loader
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of mesh loads served
    pub fn meshes_loaded(&self) -> u32 {
        self.meshes_loaded
    }
}

impl ResourceLoader for BuiltinLoader {
    fn load_mesh(&mut self, id: ResourceId) -> Result<LoadedMesh, AssetError> {
        let model = model(id).ok_or(AssetError::NotFound(id))?;
        self.meshes_loaded += 1;
        log::trace!("Building mesh {id}");
        Ok(LoadedMesh {
            submeshes: vec![cuboid(model.half)],
            materials: vec![Material::from_diffuse(model.colour)],
            texture_refs: vec![model.texture.map(str::to_owned)],
        })
    }

    fn load_wav(&mut self, id: ResourceId) -> Result<WavData, AssetError> {
        let (frequency, samples) = tone(id).ok_or(AssetError::NotFound(id))?;
        let bytes = encode_wav(&WaveFormat::pcm16(1, SAMPLE_RATE), &synthesise(frequency, samples));
        parse_wav(&bytes)
    }

    fn load_texture(&mut self, name: &str) -> Result<TextureHandle, AssetError> {
        if !IMAGES.iter().any(|(image, _)| *image == name) {
            return Err(AssetError::MissingImage(name.to_owned()));
        }
        if let Some(handle) = self.textures.get(name) {
            return Ok(*handle);
        }
        self.next_texture += 1;
        let handle = TextureHandle(self.next_texture);
        self.textures.insert(name.to_owned(), handle);
        Ok(handle)
    }
}
