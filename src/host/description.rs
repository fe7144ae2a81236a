//! Plain data handed over by the host scene. Matrices are column-major, the
//! way `glam::Mat4::from_cols_array` reads them.

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ObjectKind {
    Mesh,
    Empty,
    Camera,
    Light,
    Armature,
    #[serde(other)]
    Other,
}

pub const IDENTITY: [f32; 16] = [
    1.0, 0.0, 0.0, 0.0, //
    0.0, 1.0, 0.0, 0.0, //
    0.0, 0.0, 1.0, 0.0, //
    0.0, 0.0, 0.0, 1.0,
];

fn identity() -> [f32; 16] {
    IDENTITY
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RawObject {
    pub name: String,
    pub kind: ObjectKind,
    /// Name of the mesh/camera/light/armature data block.
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub parent: Option<String>,
    /// Relative to the parent object.
    #[serde(default = "identity")]
    pub matrix_local: [f32; 16],
    #[serde(default = "identity")]
    pub matrix_world: [f32; 16],
    #[serde(default)]
    pub material: Option<String>,
    /// Armature object deforming this mesh. When absent the nearest armature
    /// ancestor is used.
    #[serde(default)]
    pub armature: Option<String>,
    /// Actions exported for an armature object, active action first.
    #[serde(default)]
    pub actions: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RawPolygon {
    pub loops: Vec<u32>,
    pub normal: [f32; 3],
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RawLoop {
    pub vertex: u32,
    pub uv: [f32; 2],
    pub normal: [f32; 3],
    #[serde(default)]
    pub tangent: Option<[f32; 3]>,
    #[serde(default)]
    pub binormal: Option<[f32; 3]>,
}

/// A named bone-influence group, stored sparsely as (vertex, weight).
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct VertexGroup {
    pub name: String,
    pub weights: Vec<(u32, f32)>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RawMesh {
    pub name: String,
    pub positions: Vec<[f32; 3]>,
    pub loops: Vec<RawLoop>,
    pub polygons: Vec<RawPolygon>,
    #[serde(default)]
    pub groups: Vec<VertexGroup>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct MaterialTextures {
    pub ambient: Option<String>,
    pub emissive: Option<String>,
    pub diffuse: Option<String>,
    pub specular: Option<String>,
    pub specular_power: Option<String>,
    pub normal: Option<String>,
    pub bump: Option<String>,
    pub opacity: Option<String>,
}

/// Flat values the host pulled out of its shader graph.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MaterialValues {
    pub ambient_color: [f32; 4],
    pub emissive_color: [f32; 4],
    pub diffuse_color: [f32; 4],
    pub specular_color: [f32; 4],
    pub opacity: f32,
    pub specular_power: f32,
    pub reflectance: f32,
    pub refraction: f32,
    pub index_of_refraction: f32,
    pub bump_intensity: f32,
    pub specular_scale: f32,
    pub alpha_threshold: f32,
    #[serde(default)]
    pub alpha_blending: bool,
    #[serde(default)]
    pub textures: MaterialTextures,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MaterialSource {
    Defaults,
    Extracted(MaterialValues),
    /// The host could not produce values for this material.
    Failed { reason: String },
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RawMaterial {
    pub name: String,
    pub source: MaterialSource,
}

fn default_attenuation() -> [f32; 3] {
    [1.0, 0.0, 1.0]
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RawLight {
    pub name: String,
    /// Host light type: SPOT, SUN, POINT (anything else is rejected).
    pub kind: String,
    pub color: [f32; 3],
    pub energy: f32,
    /// Full cone angle in radians, spot lights only.
    #[serde(default)]
    pub spot_size: f32,
    /// Constant, linear, quadratic.
    #[serde(default = "default_attenuation")]
    pub attenuation: [f32; 3],
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RawCamera {
    pub name: String,
    /// Field of view in radians.
    pub angle: f32,
    pub clip_start: f32,
    pub clip_end: f32,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RawBone {
    pub name: String,
    #[serde(default)]
    pub parent: Option<String>,
    /// Rest pose in armature space.
    pub matrix_local: [f32; 16],
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RawArmature {
    pub name: String,
    pub bones: Vec<RawBone>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Interpolation {
    Constant,
    Linear,
    #[default]
    Bezier,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RawKeyframePoint {
    /// (frame, value)
    pub co: [f32; 2],
    /// Interpolation towards the next keyframe.
    #[serde(default)]
    pub interpolation: Interpolation,
    #[serde(default)]
    pub handle_left: Option<[f32; 2]>,
    #[serde(default)]
    pub handle_right: Option<[f32; 2]>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RawCurve {
    pub data_path: String,
    #[serde(default)]
    pub array_index: usize,
    pub keyframes: Vec<RawKeyframePoint>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RawAction {
    pub name: String,
    pub curves: Vec<RawCurve>,
}

fn default_percentage() -> u32 {
    100
}

fn default_fps() -> f32 {
    24.0
}

fn default_fps_base() -> f32 {
    1.0
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RenderSettings {
    pub resolution_x: u32,
    pub resolution_y: u32,
    #[serde(default = "default_percentage")]
    pub resolution_percentage: u32,
    #[serde(default = "default_fps")]
    pub fps: f32,
    #[serde(default = "default_fps_base")]
    pub fps_base: f32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            resolution_x: 1920,
            resolution_y: 1080,
            resolution_percentage: default_percentage(),
            fps: default_fps(),
            fps_base: default_fps_base(),
        }
    }
}

impl RenderSettings {
    pub fn effective_fps(&self) -> f32 {
        self.fps / self.fps_base
    }

    pub fn effective_resolution(&self) -> (u32, u32) {
        let scale = |v: u32| (v as u64 * self.resolution_percentage as u64 / 100) as u32;
        (scale(self.resolution_x), scale(self.resolution_y))
    }
}

fn default_ambient() -> [f32; 4] {
    [0.0, 0.0, 0.0, 1.0]
}

/// Everything about the scene except the mesh buffers, which are leased
/// separately because the host evaluates them on demand.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct SceneDescription {
    #[serde(default)]
    pub render: RenderSettings,
    #[serde(default = "default_ambient")]
    pub ambient: [f32; 4],
    #[serde(default)]
    pub active_camera: Option<String>,
    #[serde(default)]
    pub objects: Vec<RawObject>,
    #[serde(default)]
    pub materials: Vec<RawMaterial>,
    #[serde(default)]
    pub lights: Vec<RawLight>,
    #[serde(default)]
    pub cameras: Vec<RawCamera>,
    #[serde(default)]
    pub armatures: Vec<RawArmature>,
    #[serde(default)]
    pub actions: Vec<RawAction>,
}

impl SceneDescription {
    pub fn object(&self, name: &str) -> Option<&RawObject> {
        self.objects.iter().find(|o| o.name == name)
    }

    pub fn material(&self, name: &str) -> Option<&RawMaterial> {
        self.materials.iter().find(|m| m.name == name)
    }

    pub fn light(&self, name: &str) -> Option<&RawLight> {
        self.lights.iter().find(|l| l.name == name)
    }

    pub fn camera(&self, name: &str) -> Option<&RawCamera> {
        self.cameras.iter().find(|c| c.name == name)
    }

    pub fn armature(&self, name: &str) -> Option<&RawArmature> {
        self.armatures.iter().find(|a| a.name == name)
    }

    pub fn action(&self, name: &str) -> Option<&RawAction> {
        self.actions.iter().find(|a| a.name == name)
    }
}
