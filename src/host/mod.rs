pub mod description;
pub mod dump;

use std::ops::Deref;

use crate::error::Result;
pub use description::*;
pub use dump::SceneDump;

/// The host scene as seen by the baker.
///
/// Mesh buffers are evaluated by the host on request and must be handed
/// back as soon as the attributes are extracted; use [`lease_mesh`] rather
/// than calling the pair directly.
pub trait SceneSource {
    fn description(&self) -> &SceneDescription;

    /// Evaluate the mesh data block `name` into a temporary buffer.
    fn acquire_mesh(&self, name: &str) -> Result<RawMesh>;

    /// Free whatever [`SceneSource::acquire_mesh`] allocated for `name`.
    fn release_mesh(&self, name: &str);
}

/// Scoped access to an evaluated mesh. Releases it on drop, including when
/// a conversion bails out halfway with `?`.
pub struct MeshLease<'a, S: SceneSource + ?Sized> {
    source: &'a S,
    name: String,
    mesh: RawMesh,
}

impl<S: SceneSource + ?Sized> Deref for MeshLease<'_, S> {
    type Target = RawMesh;

    fn deref(&self) -> &RawMesh {
        &self.mesh
    }
}

impl<S: SceneSource + ?Sized> Drop for MeshLease<'_, S> {
    fn drop(&mut self) {
        self.source.release_mesh(&self.name);
    }
}

pub fn lease_mesh<'a, S: SceneSource + ?Sized>(source: &'a S, name: &str) -> Result<MeshLease<'a, S>> {
    let mesh = source.acquire_mesh(name)?;
    Ok(MeshLease {
        source,
        name: name.to_string(),
        mesh,
    })
}
