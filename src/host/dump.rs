use std::cell::Cell;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{RawMesh, SceneDescription, SceneSource};
use crate::error::{ExportError, Result};

/// A scene written to JSON by the host-side export script.
#[derive(Serialize, Deserialize, Debug, Default)]
pub struct SceneDump {
    #[serde(flatten)]
    pub scene: SceneDescription,
    #[serde(default)]
    pub meshes: Vec<RawMesh>,
    #[serde(skip)]
    outstanding: Cell<usize>,
}

impl SceneDump {
    pub fn new(scene: SceneDescription, meshes: Vec<RawMesh>) -> Self {
        Self {
            scene,
            meshes,
            outstanding: Cell::new(0),
        }
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text =
            std::fs::read_to_string(path).map_err(|e| ExportError::Io(path.to_path_buf(), e))?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Meshes acquired and not yet released.
    pub fn outstanding_leases(&self) -> usize {
        self.outstanding.get()
    }
}

impl SceneSource for SceneDump {
    fn description(&self) -> &SceneDescription {
        &self.scene
    }

    fn acquire_mesh(&self, name: &str) -> Result<RawMesh> {
        let mesh = self
            .meshes
            .iter()
            .find(|m| m.name == name)
            .ok_or_else(|| ExportError::MalformedMesh {
                mesh: name.to_string(),
                reason: "no such mesh in the scene dump".to_string(),
            })?;
        self.outstanding.set(self.outstanding.get() + 1);
        debug!("acquired mesh '{}'", name);
        Ok(mesh.clone())
    }

    fn release_mesh(&self, name: &str) {
        self.outstanding.set(self.outstanding.get().saturating_sub(1));
        debug!("released mesh '{}'", name);
    }
}
