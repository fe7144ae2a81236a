use serde::Serialize;

use crate::host::{RawCamera, RenderSettings};

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Camera {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub near: f32,
    pub far: f32,
    /// Radians.
    pub fov: f32,
    pub main: bool,
}

impl Camera {
    pub fn from_raw(raw: &RawCamera, render: &RenderSettings, main: bool) -> Self {
        let (width, height) = render.effective_resolution();
        Self {
            name: raw.name.clone(),
            width,
            height,
            near: raw.clip_start,
            far: raw.clip_end,
            fov: raw.angle,
            main,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolution_is_scaled_by_percentage() {
        let render = RenderSettings {
            resolution_x: 1920,
            resolution_y: 1080,
            resolution_percentage: 50,
            ..RenderSettings::default()
        };
        let raw = RawCamera {
            name: "Cam".to_string(),
            angle: 0.9,
            clip_start: 0.1,
            clip_end: 100.0,
        };
        let camera = Camera::from_raw(&raw, &render, true);
        assert_eq!((camera.width, camera.height), (960, 540));
        assert_eq!(camera.fov, 0.9);
        assert!(camera.main);
    }
}
