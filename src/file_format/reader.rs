use std::path::Path;

use serde::Serialize;

use super::{BASIC_TYPE, MAGIC, OBJECT_NAME_FIELD, UBER_SHADER, VERSION};
use crate::error::{ExportError, Result};
use crate::mesh::vertex::VERTEX_FLOATS;
use crate::scene::material::{SCALAR_COUNT, TEXTURE_SLOTS};
use crate::scene::{Camera, Light, LightKind, Material, ObjectForest};

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct GeometrySummary {
    pub name: String,
    pub vertices: u32,
    pub indices: u32,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ClipSummary {
    pub name: String,
    pub keyframes: u32,
    /// Time of the last keyframe, seconds.
    pub duration: f32,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct AnimationCollectionSummary {
    pub name: String,
    pub bones: u32,
    pub animations: Vec<ClipSummary>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ObjectSummary {
    pub name: String,
    pub camera: u32,
    pub geometry: u32,
    pub material: u32,
    pub light: u32,
    pub animation: u32,
    pub transform: [f32; 16],
}

/// What a `.bgl` file contains, minus the bulk vertex and keyframe data.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SceneSummary {
    pub version: u8,
    pub ambient: [f32; 4],
    pub cameras: Vec<Camera>,
    pub geometries: Vec<GeometrySummary>,
    pub materials: Vec<Material>,
    pub lights: Vec<Light>,
    pub animations: Vec<AnimationCollectionSummary>,
    pub objects: Vec<ObjectSummary>,
    pub tree: String,
}

fn bad(msg: impl Into<String>) -> ExportError {
    ExportError::Format(msg.into())
}

struct ByteReader<'b> {
    bytes: &'b [u8],
    pos: usize,
}

impl<'b> ByteReader<'b> {
    fn take(&mut self, n: usize) -> Result<&'b [u8]> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.bytes.len())
            .ok_or_else(|| bad(format!("unexpected end of file at byte {}", self.pos)))?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    fn u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    fn tag(&mut self, what: &str, expected: u8) -> Result<()> {
        let at = self.pos;
        match self.u8()? {
            v if v == expected => Ok(()),
            v => Err(bad(format!("{} tag {} at byte {}, expected {}", what, v, at, expected))),
        }
    }

    fn bool(&mut self) -> Result<bool> {
        let at = self.pos;
        match self.u8()? {
            0 => Ok(false),
            1 => Ok(true),
            v => Err(bad(format!("flag byte {} at {}", v, at))),
        }
    }

    fn u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.array()?))
    }

    fn f32(&mut self) -> Result<f32> {
        Ok(f32::from_le_bytes(self.array()?))
    }

    fn f32s<const N: usize>(&mut self) -> Result<[f32; N]> {
        let mut out = [0.0; N];
        for v in &mut out {
            *v = self.f32()?;
        }
        Ok(out)
    }

    fn skip_f32s(&mut self, count: usize) -> Result<()> {
        let bytes = count
            .checked_mul(4)
            .ok_or_else(|| bad("element count overflows"))?;
        self.take(bytes).map(|_| ())
    }

    fn str(&mut self) -> Result<String> {
        let len = self.u32()? as usize;
        let at = self.pos;
        let raw = self.take(len)?;
        if !raw.is_ascii() {
            return Err(bad(format!("non-ASCII string at byte {}", at)));
        }
        Ok(raw.iter().map(|&b| b as char).collect())
    }

    fn object_name(&mut self) -> Result<String> {
        let at = self.pos;
        let field: [u8; OBJECT_NAME_FIELD] = self.array()?;
        let len = field
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| bad(format!("object name at byte {} is not NUL terminated", at)))?;
        if !field[..len].is_ascii() {
            return Err(bad(format!("non-ASCII object name at byte {}", at)));
        }
        Ok(field[..len].iter().map(|&b| b as char).collect())
    }
}

fn reference(kind: &str, index: u32, len: usize) -> Result<u32> {
    if index as usize > len {
        return Err(bad(format!("{} reference {} out of range ({} entries)", kind, index, len)));
    }
    Ok(index)
}

fn camera(r: &mut ByteReader) -> Result<Camera> {
    r.tag("camera", BASIC_TYPE)?;
    Ok(Camera {
        name: r.str()?,
        width: r.u32()?,
        height: r.u32()?,
        near: r.f32()?,
        far: r.f32()?,
        fov: r.f32()?,
        main: r.bool()?,
    })
}

fn geometry(r: &mut ByteReader) -> Result<GeometrySummary> {
    r.tag("geometry", BASIC_TYPE)?;
    let name = r.str()?;
    let vertices = r.u32()?;
    let indices = r.u32()?;
    r.skip_f32s(vertices as usize * VERTEX_FLOATS)?;
    for _ in 0..indices {
        let index = r.u32()?;
        if index >= vertices {
            return Err(bad(format!(
                "geometry '{}' index {} out of range ({} vertices)",
                name, index, vertices
            )));
        }
    }
    Ok(GeometrySummary {
        name,
        vertices,
        indices,
    })
}

fn material(r: &mut ByteReader) -> Result<Material> {
    r.tag("material", BASIC_TYPE)?;
    r.tag("shader", UBER_SHADER)?;
    let name = r.str()?;
    let s: [f32; SCALAR_COUNT] = r.f32s()?;
    let alpha_blending = r.bool()?;
    let mut textures: [String; TEXTURE_SLOTS] = Default::default();
    for texture in &mut textures {
        *texture = r.str()?;
    }
    let color = |i: usize| [s[i], s[i + 1], s[i + 2], s[i + 3]];
    Ok(Material {
        name,
        ambient_color: color(0),
        emissive_color: color(4),
        diffuse_color: color(8),
        specular_color: color(12),
        opacity: s[16],
        specular_power: s[17],
        reflectance: s[18],
        refraction: s[19],
        index_of_refraction: s[20],
        bump_intensity: s[21],
        specular_scale: s[22],
        alpha_threshold: s[23],
        alpha_blending,
        textures,
    })
}

fn light(r: &mut ByteReader) -> Result<Light> {
    let at = r.pos;
    let tag = r.u8()?;
    let kind = LightKind::from_tag(tag)
        .ok_or_else(|| bad(format!("unknown light kind {} at byte {}", tag, at)))?;
    Ok(Light {
        kind,
        name: r.str()?,
        color: r.f32s()?,
        attenuation: r.f32s()?,
        intensity: r.f32()?,
        angle: r.f32()?,
    })
}

fn animation_collection(r: &mut ByteReader) -> Result<AnimationCollectionSummary> {
    r.tag("animation collection", BASIC_TYPE)?;
    let name = r.str()?;
    let clip_count = r.u32()?;
    let _bind: [f32; 16] = r.f32s()?;
    let bones = r.u32()?;
    for bone in 0..bones {
        r.skip_f32s(3 + 4)?;
        let parent = r.u32()?;
        if parent > bones || parent == bone + 1 {
            return Err(bad(format!(
                "skeleton '{}': bone {} has parent {}",
                name, bone, parent
            )));
        }
    }

    let mut animations = vec![];
    for _ in 0..clip_count {
        let clip = r.str()?;
        let keyframes = r.u32()?;
        let mut duration = 0.0;
        let mut previous = f32::NEG_INFINITY;
        for _ in 0..keyframes {
            let time = r.f32()?;
            if time <= previous {
                return Err(bad(format!("animation '{}': keyframe times not increasing", clip)));
            }
            previous = time;
            duration = time;
            r.skip_f32s(3 + 4 * bones as usize)?;
        }
        animations.push(ClipSummary {
            name: clip,
            keyframes,
            duration,
        });
    }
    Ok(AnimationCollectionSummary {
        name,
        bones,
        animations,
    })
}

/// Parses and validates the bytes of a `.bgl` file.
pub fn decode_scene(bytes: &[u8]) -> Result<SceneSummary> {
    let mut r = ByteReader { bytes, pos: 0 };
    if &r.array::<5>()? != MAGIC {
        return Err(bad("not a BOGLE file"));
    }
    let version = r.u8()?;
    if version != VERSION {
        return Err(bad(format!("unsupported version {}", version)));
    }
    let cameras = r.u32()?;
    let geometries = r.u32()?;
    let materials = r.u32()?;
    let lights = r.u32()?;
    let animations = r.u32()?;
    let objects = r.u32()?;
    let ambient = r.f32s()?;

    let mut summary = SceneSummary {
        version,
        ambient,
        cameras: vec![],
        geometries: vec![],
        materials: vec![],
        lights: vec![],
        animations: vec![],
        objects: vec![],
        tree: String::new(),
    };
    for _ in 0..cameras {
        summary.cameras.push(camera(&mut r)?);
    }
    for _ in 0..geometries {
        summary.geometries.push(geometry(&mut r)?);
    }
    for _ in 0..materials {
        summary.materials.push(material(&mut r)?);
    }
    for _ in 0..lights {
        summary.lights.push(light(&mut r)?);
    }
    for _ in 0..animations {
        summary.animations.push(animation_collection(&mut r)?);
    }
    for _ in 0..objects {
        let name = r.object_name()?;
        let object = ObjectSummary {
            camera: reference("camera", r.u32()?, summary.cameras.len())?,
            geometry: reference("geometry", r.u32()?, summary.geometries.len())?,
            material: reference("material", r.u32()?, summary.materials.len())?,
            light: reference("light", r.u32()?, summary.lights.len())?,
            animation: reference("animation", r.u32()?, summary.animations.len())?,
            transform: r.f32s()?,
            name,
        };
        summary.objects.push(object);
    }

    let tree = &bytes[r.pos..];
    ObjectForest::decode(tree, summary.objects.len()).map_err(bad)?;
    summary.tree = tree[..tree.len() - 1].iter().map(|&b| b as char).collect();
    Ok(summary)
}

pub fn read_scene(path: &Path) -> Result<SceneSummary> {
    let bytes = std::fs::read(path).map_err(|e| ExportError::Io(path.to_path_buf(), e))?;
    decode_scene(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file_format::encode_scene;
    use crate::scene::{SceneGraph, SceneObject};
    use glam::Mat4;

    fn graph() -> SceneGraph {
        let object = |name: &str| SceneObject {
            name: name.to_string(),
            parent: None,
            camera: 0,
            geometry: 0,
            material: 1,
            light: 0,
            animation: 0,
            transform: Mat4::IDENTITY,
        };
        SceneGraph {
            ambient: [0.0, 0.0, 0.0, 1.0],
            cameras: vec![],
            geometries: vec![],
            materials: vec![Material::defaults("default")],
            lights: vec![],
            animations: vec![],
            objects: vec![object("A"), object("B")],
            tree: ObjectForest::new(&[None, Some(0)]),
        }
    }

    #[test]
    fn reads_what_the_writer_wrote() {
        let summary = decode_scene(&encode_scene(&graph()).unwrap()).unwrap();
        assert_eq!(summary.materials, vec![Material::defaults("default")]);
        assert_eq!(summary.objects[1].name, "B");
        assert_eq!(summary.objects[1].material, 1);
        assert_eq!(summary.tree, "0{1{}}");
    }

    #[test]
    fn rejects_trailing_bytes() {
        let mut bytes = encode_scene(&graph()).unwrap();
        bytes.push(b'x');
        assert!(matches!(decode_scene(&bytes), Err(ExportError::Format(_))));
    }

    #[test]
    fn rejects_dangling_references() {
        let mut g = graph();
        g.objects[0].material = 2;
        let bytes = encode_scene(&g).unwrap();
        assert!(matches!(decode_scene(&bytes), Err(ExportError::Format(_))));
    }

    #[test]
    fn rejects_wrong_magic_and_truncation() {
        let bytes = encode_scene(&graph()).unwrap();
        let mut wrong = bytes.clone();
        wrong[0] = b'X';
        assert!(decode_scene(&wrong).is_err());
        assert!(decode_scene(&bytes[..bytes.len() - 3]).is_err());
    }
}
