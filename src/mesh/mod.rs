pub mod indexer;
pub mod quantize;
pub mod skin;
pub mod tangents;
pub mod vertex;
pub mod winding;

pub use indexer::{convert, convert_skinned};
pub use skin::{BoneIndexSpace, SkinWeightResolver, SkinWeights};
pub use vertex::{GlVertex, IndexedGeometry};
