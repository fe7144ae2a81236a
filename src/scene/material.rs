use std::path::Path;

use serde::Serialize;
use tracing::warn;

use crate::error::{ExportError, Result};
use crate::host::{MaterialSource, MaterialTextures, MaterialValues, RawMaterial};

/// Identity of the material given to meshes that have none.
pub const DEFAULT_MATERIAL: &str = "default";
pub const SCALAR_COUNT: usize = 24;
pub const TEXTURE_SLOTS: usize = 8;

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
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
    pub alpha_blending: bool,
    /// Ambient, emissive, diffuse, specular, specular power, normal, bump,
    /// opacity. Extension already stripped; empty when unused.
    pub textures: [String; TEXTURE_SLOTS],
}

impl Material {
    pub fn defaults(name: &str) -> Self {
        const BLACK: [f32; 4] = [0.0, 0.0, 0.0, 1.0];
        Self {
            name: name.to_string(),
            ambient_color: BLACK,
            emissive_color: BLACK,
            diffuse_color: BLACK,
            specular_color: BLACK,
            opacity: 1.0,
            specular_power: 100.0,
            reflectance: 0.0,
            refraction: 0.0,
            index_of_refraction: 0.0,
            bump_intensity: 1.0,
            specular_scale: 1.0,
            alpha_threshold: 1.0,
            alpha_blending: false,
            textures: Default::default(),
        }
    }

    pub fn from_raw(raw: &RawMaterial) -> Result<Self> {
        match &raw.source {
            MaterialSource::Defaults => Ok(Self::defaults(&raw.name)),
            MaterialSource::Failed { reason } => Err(ExportError::MaterialExtractionError {
                material: raw.name.clone(),
                reason: reason.clone(),
            }),
            MaterialSource::Extracted(values) => Self::from_values(&raw.name, values),
        }
    }

    fn from_values(name: &str, v: &MaterialValues) -> Result<Self> {
        let material = Self {
            name: name.to_string(),
            ambient_color: v.ambient_color,
            emissive_color: v.emissive_color,
            diffuse_color: v.diffuse_color,
            specular_color: v.specular_color,
            opacity: v.opacity,
            specular_power: v.specular_power,
            reflectance: v.reflectance,
            refraction: v.refraction,
            index_of_refraction: v.index_of_refraction,
            bump_intensity: v.bump_intensity,
            specular_scale: v.specular_scale,
            alpha_threshold: v.alpha_threshold,
            alpha_blending: v.alpha_blending,
            textures: texture_names(&v.textures),
        };
        if let Some(i) = material.scalars().iter().position(|s| !s.is_finite()) {
            return Err(ExportError::MaterialExtractionError {
                material: name.to_string(),
                reason: format!("value {} is not finite", i),
            });
        }
        Ok(material)
    }

    /// The 24 floats in file order.
    pub fn scalars(&self) -> [f32; SCALAR_COUNT] {
        let mut out = [0.0; SCALAR_COUNT];
        let colors = [
            self.ambient_color,
            self.emissive_color,
            self.diffuse_color,
            self.specular_color,
        ];
        for (chunk, color) in out.chunks_exact_mut(4).zip(colors) {
            chunk.copy_from_slice(&color);
        }
        out[16..].copy_from_slice(&[
            self.opacity,
            self.specular_power,
            self.reflectance,
            self.refraction,
            self.index_of_refraction,
            self.bump_intensity,
            self.specular_scale,
            self.alpha_threshold,
        ]);
        out
    }
}

fn texture_names(t: &MaterialTextures) -> [String; TEXTURE_SLOTS] {
    [
        &t.ambient,
        &t.emissive,
        &t.diffuse,
        &t.specular,
        &t.specular_power,
        &t.normal,
        &t.bump,
        &t.opacity,
    ]
    .map(|slot| slot.as_deref().map(strip_texture_extension).unwrap_or_default())
}

/// `bricks/wall.png` -> `bricks/wall`. The engine only loads PNGs, so any
/// other extension is reported.
pub fn strip_texture_extension(name: &str) -> String {
    let path = Path::new(name);
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("png") => {}
        Some(ext) => warn!("texture '{}' is .{}, the engine expects .png", name, ext),
        None => {}
    }
    let stem = path.file_stem().and_then(|s| s.to_str());
    match (path.parent(), stem) {
        (Some(parent), Some(stem)) if !parent.as_os_str().is_empty() => {
            format!("{}/{}", parent.to_string_lossy(), stem)
        }
        (_, Some(stem)) => stem.to_string(),
        _ => name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_scalars_layout() {
        let scalars = Material::defaults(DEFAULT_MATERIAL).scalars();
        assert_eq!(&scalars[..4], &[0.0, 0.0, 0.0, 1.0]);
        assert_eq!(
            &scalars[16..],
            &[1.0, 100.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0]
        );
    }

    #[test]
    fn texture_extensions_are_stripped() {
        assert_eq!(strip_texture_extension("wood.png"), "wood");
        assert_eq!(strip_texture_extension("maps/wood.PNG"), "maps/wood");
        assert_eq!(strip_texture_extension("normal.jpg"), "normal");
        assert_eq!(strip_texture_extension("plain"), "plain");
    }

    #[test]
    fn non_png_textures_warn() {
        let (name, logged) = crate::test_log::capture(|| strip_texture_extension("normal.jpg"));
        assert_eq!(name, "normal");
        assert!(logged.contains("WARN"));
        assert!(logged.contains("texture 'normal.jpg' is .jpg"));

        let (_, logged) = crate::test_log::capture(|| strip_texture_extension("wood.png"));
        assert!(!logged.contains("WARN"));
    }

    fn brick_values() -> MaterialValues {
        MaterialValues {
            ambient_color: [0.0, 0.0, 0.0, 1.0],
            emissive_color: [0.5, 0.5, 0.5, 1.0],
            diffuse_color: [0.8, 0.2, 0.1, 1.0],
            specular_color: [1.0, 1.0, 1.0, 1.0],
            opacity: 0.5,
            specular_power: 10.0,
            reflectance: 0.0,
            refraction: 0.0,
            index_of_refraction: 1.45,
            bump_intensity: 1.0,
            specular_scale: 1.0,
            alpha_threshold: 0.5,
            alpha_blending: true,
            textures: MaterialTextures::default(),
        }
    }

    #[test]
    fn extracted_values_keep_slot_order() {
        let mut values = brick_values();
        values.textures.normal = Some("brick_n.png".to_string());
        let raw = RawMaterial {
            name: "Brick".to_string(),
            source: MaterialSource::Extracted(values),
        };
        let material = Material::from_raw(&raw).unwrap();
        assert_eq!(material.textures[5], "brick_n");
        assert!(material.textures[2].is_empty());
        assert_eq!(material.scalars()[4..8], [0.5, 0.5, 0.5, 1.0]);
        assert_eq!(material.scalars()[20], 1.45);
        assert!(material.alpha_blending);
    }

    #[test]
    fn failed_or_nan_values_are_extraction_errors() {
        let failed = RawMaterial {
            name: "Glass".to_string(),
            source: MaterialSource::Failed {
                reason: "unsupported node 'Mix Shader'".to_string(),
            },
        };
        assert!(matches!(
            Material::from_raw(&failed),
            Err(ExportError::MaterialExtractionError { .. })
        ));

        let mut values = brick_values();
        values.opacity = f32::NAN;
        let nan = RawMaterial {
            name: "Brick".to_string(),
            source: MaterialSource::Extracted(values),
        };
        assert!(matches!(
            Material::from_raw(&nan),
            Err(ExportError::MaterialExtractionError { .. })
        ));
    }
}
