use serde::Serialize;
use serde_repr::Serialize_repr;

use crate::error::{ExportError, Result};
use crate::host::RawLight;

/// Lights the engine can draw at once.
pub const MAX_LIGHTS: usize = 20;

#[derive(Serialize_repr, Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LightKind {
    Spot = 0,
    Sun = 1,
    Point = 2,
}

impl LightKind {
    pub fn from_host(kind: &str) -> Option<Self> {
        match kind {
            "SPOT" => Some(LightKind::Spot),
            "SUN" => Some(LightKind::Sun),
            "POINT" => Some(LightKind::Point),
            _ => None,
        }
    }

    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(LightKind::Spot),
            1 => Some(LightKind::Sun),
            2 => Some(LightKind::Point),
            _ => None,
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Light {
    pub name: String,
    pub kind: LightKind,
    pub color: [f32; 4],
    /// Constant, linear, quadratic.
    pub attenuation: [f32; 3],
    pub intensity: f32,
    /// Cone angle in radians; 0 unless spot.
    pub angle: f32,
}

/// Maps host light energy onto the engine's intensity scale. Fitted
/// empirically; keep the constants as they are.
pub fn engine_intensity(energy: f32) -> f32 {
    250.0 + (-0.5 - 250.0) / (1.0 + (energy.max(0.0) / 15.0).powf(0.7))
}

impl Light {
    pub fn from_raw(raw: &RawLight) -> Result<Self> {
        let kind = LightKind::from_host(&raw.kind).ok_or_else(|| ExportError::UnsupportedLightType {
            light: raw.name.clone(),
            kind: raw.kind.clone(),
        })?;
        let [r, g, b] = raw.color;
        let (intensity, angle) = match kind {
            LightKind::Spot => (engine_intensity(raw.energy), raw.spot_size),
            LightKind::Point => (engine_intensity(raw.energy), 0.0),
            LightKind::Sun => (raw.energy, 0.0),
        };
        Ok(Self {
            name: raw.name.clone(),
            kind,
            color: [r, g, b, 1.0],
            attenuation: raw.attenuation,
            intensity,
            angle,
        })
    }
}
