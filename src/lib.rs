//! Bakes a host 3D scene into a BOGLE (`.bgl`) file: one indexed vertex
//! buffer per mesh, materials, lights, cameras, skeletal animation and the
//! object hierarchy, in a fixed little-endian layout a renderer can load
//! without further processing.

pub mod anim;
pub mod config;
pub mod error;
pub mod file_format;
pub mod host;
pub mod mesh;
pub mod scene;

#[cfg(test)]
mod test_log;

use std::path::Path;

pub use config::{ExportConfig, WindingPolicy};
pub use error::{ExportError, Result};
pub use host::{SceneDump, SceneSource};
pub use scene::{SceneGraph, SceneGraphBuilder};

/// Resolves every table of `source` in memory.
pub fn bake<S: SceneSource + ?Sized>(source: &S, config: &ExportConfig) -> Result<SceneGraph> {
    SceneGraphBuilder::new(source, config)?.build()
}

/// Bakes `source` and writes it to `path`. Nothing is written if any part of
/// the scene fails to convert.
pub fn bake_to_file<S: SceneSource + ?Sized>(
    source: &S,
    config: &ExportConfig,
    path: &Path,
) -> Result<SceneGraph> {
    let graph = bake(source, config)?;
    file_format::write_scene(&graph, path)?;
    Ok(graph)
}
