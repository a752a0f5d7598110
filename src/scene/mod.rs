pub mod shapes;

use crate::assets::TextureKey;
use glam::{Mat4, Quat, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use shapes::MeshData;
use std::fmt;
use std::str::FromStr;

/// Height at which new shapes are placed above the grid.
pub const SPAWN_HEIGHT: f32 = 0.5;
/// Shadow discs hover just above the ground plane to avoid z-fighting with the grid.
pub const SHADOW_HEIGHT: f32 = 0.01;
pub const SHADOW_RADIUS: f32 = 0.7;
pub const SHADOW_OPACITY: f32 = 0.5;
/// Vertical distance between an object and its point light.
pub const LIGHT_OFFSET: f32 = 3.0;
pub const POINT_LIGHT_INTENSITY: f32 = 0.5;
pub const POINT_LIGHT_RANGE: f32 = 10.0;

pub const REFERENCE_PLANE_SIZE: f32 = 5.0;
pub const REFERENCE_PLANE_POSITION: Vec3 = Vec3::new(5.0, 2.5, 0.0);

pub const DEFAULT_BACKGROUND: Rgb = [0x22, 0x22, 0x22];

/// 8-bit sRGB color.
pub type Rgb = [u8; 3];

pub fn rgb_to_hex(color: Rgb) -> String {
    format!("#{:02x}{:02x}{:02x}", color[0], color[1], color[2])
}

pub fn parse_hex_rgb(value: &str) -> Option<Rgb> {
    let digits = value.trim().trim_start_matches('#');
    if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&digits[range], 16).ok();
    Some([channel(0..2)?, channel(2..4)?, channel(4..6)?])
}

#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("unknown shape type: {0}")]
    UnknownShape(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeCategory {
    Basic,
    Metaballs,
    Advanced,
}

impl ShapeCategory {
    pub const ALL: [ShapeCategory; 3] = [Self::Basic, Self::Metaballs, Self::Advanced];

    pub fn title(self) -> &'static str {
        match self {
            Self::Basic => "Basic",
            Self::Metaballs => "Metaballs",
            Self::Advanced => "Advanced",
        }
    }

    pub fn kinds(self) -> impl Iterator<Item = ShapeKind> {
        ShapeKind::ALL
            .into_iter()
            .filter(move |kind| kind.category() == self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Cube,
    Sphere,
    Cylinder,
    Triangle,
    MetaballSphere,
    MetaballBlob,
    HollowTube,
    Hypercube,
    Pyramid,
    IsoSphere,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 10] = [
        Self::Cube,
        Self::Sphere,
        Self::Cylinder,
        Self::Triangle,
        Self::MetaballSphere,
        Self::MetaballBlob,
        Self::HollowTube,
        Self::Hypercube,
        Self::Pyramid,
        Self::IsoSphere,
    ];

    /// Tag used by the add-shape menu.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Cube => "cube",
            Self::Sphere => "sphere",
            Self::Cylinder => "cylinder",
            Self::Triangle => "triangle",
            Self::MetaballSphere => "metaballSphere",
            Self::MetaballBlob => "metaballBlob",
            Self::HollowTube => "hollowTube",
            Self::Hypercube => "hypercube",
            Self::Pyramid => "pyramid",
            Self::IsoSphere => "isoSphere",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Cube => "Cube",
            Self::Sphere => "Sphere",
            Self::Cylinder => "Cylinder",
            Self::Triangle => "Triangle",
            Self::MetaballSphere => "Metaball Sphere",
            Self::MetaballBlob => "Metaball Blob",
            Self::HollowTube => "Hollow Tube",
            Self::Hypercube => "Hypercube",
            Self::Pyramid => "Pyramid",
            Self::IsoSphere => "Iso Sphere",
        }
    }

    pub fn category(self) -> ShapeCategory {
        match self {
            Self::Cube | Self::Sphere | Self::Cylinder | Self::Triangle => ShapeCategory::Basic,
            Self::MetaballSphere | Self::MetaballBlob => ShapeCategory::Metaballs,
            Self::HollowTube | Self::Hypercube | Self::Pyramid | Self::IsoSphere => {
                ShapeCategory::Advanced
            }
        }
    }
}

impl FromStr for ShapeKind {
    type Err = SceneError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.tag() == tag)
            .ok_or_else(|| SceneError::UnknownShape(tag.to_string()))
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId(u64);

impl ObjectId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::default()
        }
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }

    pub fn rotation_deg(&self) -> Vec3 {
        let (x, y, z) = self.rotation.to_euler(glam::EulerRot::XYZ);
        Vec3::new(x.to_degrees(), y.to_degrees(), z.to_degrees())
    }

    pub fn set_rotation_deg(&mut self, degrees: Vec3) {
        self.rotation = Quat::from_euler(
            glam::EulerRot::XYZ,
            degrees.x.to_radians(),
            degrees.y.to_radians(),
            degrees.z.to_radians(),
        );
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Material {
    pub color: Rgb,
    pub map: Option<TextureKey>,
}

#[derive(Debug, Clone)]
pub struct SceneObject {
    pub id: ObjectId,
    pub kind: ShapeKind,
    pub name: String,
    pub transform: Transform,
    pub material: Material,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
    pub mesh: MeshData,
}

impl SceneObject {
    pub fn position(&self) -> Vec3 {
        self.transform.translation
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowProxy {
    pub position: Vec3,
    pub radius: f32,
    pub opacity: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLightProxy {
    pub position: Vec3,
    pub color: Rgb,
    pub intensity: f32,
    pub range: f32,
}

/// Shadow disc and point light owned by one scene object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AuxiliaryPair {
    pub object: ObjectId,
    pub shadow: ShadowProxy,
    pub light: PointLightProxy,
}

impl AuxiliaryPair {
    fn for_object(object: ObjectId, position: Vec3) -> Self {
        let (shadow, light) = auxiliary_positions(position);
        Self {
            object,
            shadow: ShadowProxy {
                position: shadow,
                radius: SHADOW_RADIUS,
                opacity: SHADOW_OPACITY,
            },
            light: PointLightProxy {
                position: light,
                color: [0xff, 0xff, 0xff],
                intensity: POINT_LIGHT_INTENSITY,
                range: POINT_LIGHT_RANGE,
            },
        }
    }
}

/// Shadow and light positions derived from an object's position.
pub fn auxiliary_positions(object_position: Vec3) -> (Vec3, Vec3) {
    (
        Vec3::new(object_position.x, SHADOW_HEIGHT, object_position.z),
        Vec3::new(
            object_position.x,
            object_position.y + LIGHT_OFFSET,
            object_position.z,
        ),
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Background {
    Color(Rgb),
    Texture(TextureKey),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferencePlane {
    pub texture: TextureKey,
    pub position: Vec3,
    pub size: f32,
}

pub struct SceneSession {
    objects: Vec<SceneObject>,
    auxiliaries: Vec<AuxiliaryPair>,
    reference_planes: Vec<ReferencePlane>,
    background: Background,
    next_id: u64,
    rng: StdRng,
}

impl SceneSession {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            objects: Vec::new(),
            auxiliaries: Vec::new(),
            reference_planes: Vec::new(),
            background: Background::Color(DEFAULT_BACKGROUND),
            next_id: 1,
            rng,
        }
    }

    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    pub fn object(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.iter().find(|object| object.id == id)
    }

    pub fn object_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        self.objects.iter_mut().find(|object| object.id == id)
    }

    pub fn auxiliaries(&self) -> &[AuxiliaryPair] {
        &self.auxiliaries
    }

    pub fn auxiliary(&self, id: ObjectId) -> Option<&AuxiliaryPair> {
        self.auxiliaries.iter().find(|pair| pair.object == id)
    }

    pub fn reference_planes(&self) -> &[ReferencePlane] {
        &self.reference_planes
    }

    pub fn background(&self) -> Background {
        self.background
    }

    pub fn set_background(&mut self, background: Background) {
        self.background = background;
    }

    pub fn add_reference_plane(&mut self, texture: TextureKey) {
        self.reference_planes.push(ReferencePlane {
            texture,
            position: REFERENCE_PLANE_POSITION,
            size: REFERENCE_PLANE_SIZE,
        });
    }

    /// Adds a shape by menu tag. Unknown tags are logged and ignored.
    pub fn add_object(&mut self, tag: &str) -> Option<ObjectId> {
        match tag.parse::<ShapeKind>() {
            Ok(kind) => Some(self.add_shape(kind)),
            Err(err) => {
                log::warn!("{err}");
                None
            }
        }
    }

    pub fn add_shape(&mut self, kind: ShapeKind) -> ObjectId {
        let id = ObjectId(self.next_id);
        self.next_id += 1;

        let color: Rgb = self.rng.gen();
        let transform = Transform::from_translation(Vec3::new(0.0, SPAWN_HEIGHT, 0.0));
        let object = SceneObject {
            id,
            kind,
            name: kind.display_name().to_string(),
            transform,
            material: Material { color, map: None },
            cast_shadow: true,
            receive_shadow: true,
            mesh: shapes::build(kind),
        };
        self.auxiliaries
            .push(AuxiliaryPair::for_object(id, transform.translation));
        self.objects.push(object);
        log::debug!("Added {} ({})", kind, id.raw());
        id
    }

    /// Re-derives every shadow and light proxy from its object's current position.
    pub fn sync_auxiliaries(&mut self) {
        for pair in &mut self.auxiliaries {
            let Some(object) = self.objects.iter().find(|object| object.id == pair.object) else {
                continue;
            };
            let (shadow, light) = auxiliary_positions(object.position());
            pair.shadow.position = shadow;
            pair.light.position = light;
        }
    }
}

impl Default for SceneSession {
    fn default() -> Self {
        Self::new()
    }
}
