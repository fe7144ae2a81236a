use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ExportError, Result};

/// Emission order of triangle corners.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum WindingPolicy {
    /// Keep the host's loop order.
    None,
    #[default]
    Ccw,
    Cw,
}

/// Options collected by the host-side export dialog.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ExportConfig {
    pub winding: WindingPolicy,
    /// Fill in MikkTSpace tangents for loops the host left without any.
    pub generate_tangents: bool,
    /// Frames per second used to turn frame numbers into seconds. Falls back
    /// to the scene's render fps.
    pub fps_override: Option<f32>,
    pub ambient_override: Option<[f32; 4]>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            winding: WindingPolicy::Ccw,
            generate_tangents: true,
            fps_override: None,
            ambient_override: None,
        }
    }
}

impl ExportConfig {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text =
            std::fs::read_to_string(path).map_err(|e| ExportError::Io(path.to_path_buf(), e))?;
        let config: ExportConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(fps) = self.fps_override {
            if !(fps.is_finite() && fps > 0.0) {
                return Err(ExportError::Config(format!(
                    "fps_override must be positive, got {}",
                    fps
                )));
            }
        }
        if let Some(ambient) = self.ambient_override {
            if ambient.iter().any(|c| !c.is_finite()) {
                return Err(ExportError::Config(
                    "ambient_override must be finite".to_string(),
                ));
            }
        }
        Ok(())
    }
}
