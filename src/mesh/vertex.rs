use bytemuck::{Pod, Zeroable};

/// Floats per vertex record in the file.
pub const VERTEX_FLOATS: usize = 20;

/// Vertex exactly as the engine uploads it. Bone indices are stored as
/// floats because the engine feeds them through a vec3 attribute.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct GlVertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
    pub normal: [f32; 3],
    pub tangent: [f32; 3],
    pub binormal: [f32; 3],
    pub bones: [f32; 3],
    pub weights: [f32; 3],
}

impl GlVertex {
    pub fn to_floats(&self) -> [f32; VERTEX_FLOATS] {
        bytemuck::cast(*self)
    }
}

/// Mesh buffer ready for indexed drawing.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedGeometry {
    /// Source mesh data name.
    pub name: String,
    pub vertices: Vec<GlVertex>,
    pub indices: Vec<u32>,
}

impl IndexedGeometry {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}
