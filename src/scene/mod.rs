pub mod builder;
pub mod camera;
pub mod light;
pub mod material;
pub mod tree;

use glam::Mat4;

use crate::anim::AnimationCollection;
use crate::mesh::IndexedGeometry;
pub use builder::SceneGraphBuilder;
pub use camera::Camera;
pub use light::{Light, LightKind};
pub use material::Material;
pub use tree::ObjectForest;

/// An exported object. Resource references are 0 when absent, else a
/// 1-based index into the matching table of the [`SceneGraph`].
#[derive(Debug, Clone, PartialEq)]
pub struct SceneObject {
    pub name: String,
    pub parent: Option<String>,
    pub camera: u32,
    pub geometry: u32,
    pub material: u32,
    pub light: u32,
    pub animation: u32,
    /// Relative to the parent, through any armatures in between.
    pub transform: Mat4,
}

/// A fully resolved scene, ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneGraph {
    pub ambient: [f32; 4],
    pub cameras: Vec<Camera>,
    pub geometries: Vec<IndexedGeometry>,
    pub materials: Vec<Material>,
    pub lights: Vec<Light>,
    pub animations: Vec<AnimationCollection>,
    pub objects: Vec<SceneObject>,
    pub tree: ObjectForest,
}
