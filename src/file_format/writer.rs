//! Record order: header, ambient light, cameras, geometries, materials,
//! lights, animation collections, objects, object tree.

use std::path::Path;

use glam::{Mat4, Quat};
use tracing::info;

use super::{BASIC_TYPE, MAGIC, OBJECT_NAME_FIELD, OBJECT_NAME_LEN, UBER_SHADER, VERSION};
use crate::anim::AnimationCollection;
use crate::error::{ExportError, Result};
use crate::mesh::IndexedGeometry;
use crate::scene::{Camera, Light, Material, SceneGraph, SceneObject};

#[derive(Default)]
struct ByteWriter {
    buf: Vec<u8>,
}

impl ByteWriter {
    fn u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn bool(&mut self, v: bool) {
        self.u8(v as u8);
    }

    fn u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn count(&mut self, len: usize) -> Result<()> {
        let v = u32::try_from(len)
            .map_err(|_| ExportError::Format(format!("{} entries do not fit a u32 count", len)))?;
        self.u32(v);
        Ok(())
    }

    fn f32(&mut self, v: f32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn f32s(&mut self, vs: &[f32]) {
        for &v in vs {
            self.f32(v);
        }
    }

    /// Raw buffer contents, already in file byte order.
    fn bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    fn mat4(&mut self, m: &Mat4) {
        self.f32s(&m.to_cols_array());
    }

    fn quat(&mut self, q: Quat) {
        self.f32s(&q.to_array());
    }

    /// u32 length + ASCII bytes.
    fn str(&mut self, s: &str) -> Result<()> {
        if !s.is_ascii() {
            return Err(ExportError::InvalidName(s.to_string()));
        }
        self.count(s.len())?;
        self.buf.extend_from_slice(s.as_bytes());
        Ok(())
    }

    /// Fixed field, zero padded, always NUL terminated.
    fn object_name(&mut self, s: &str) -> Result<()> {
        if s.len() > OBJECT_NAME_LEN {
            return Err(ExportError::NameTooLong {
                name: s.to_string(),
                len: s.len(),
                max: OBJECT_NAME_LEN,
            });
        }
        let mut field = [0u8; OBJECT_NAME_FIELD];
        field[..s.len()].copy_from_slice(s.as_bytes());
        self.buf.extend_from_slice(&field);
        Ok(())
    }
}

fn camera(w: &mut ByteWriter, camera: &Camera) -> Result<()> {
    w.u8(BASIC_TYPE);
    w.str(&camera.name)?;
    w.u32(camera.width);
    w.u32(camera.height);
    w.f32(camera.near);
    w.f32(camera.far);
    w.f32(camera.fov);
    w.bool(camera.main);
    Ok(())
}

fn geometry(w: &mut ByteWriter, geometry: &IndexedGeometry) -> Result<()> {
    w.u8(BASIC_TYPE);
    w.str(&geometry.name)?;
    w.count(geometry.vertices.len())?;
    w.count(geometry.indices.len())?;
    if cfg!(target_endian = "little") {
        w.bytes(bytemuck::cast_slice(&geometry.vertices));
        w.bytes(bytemuck::cast_slice(&geometry.indices));
    } else {
        for vertex in &geometry.vertices {
            w.f32s(&vertex.to_floats());
        }
        for &index in &geometry.indices {
            w.u32(index);
        }
    }
    Ok(())
}

fn material(w: &mut ByteWriter, material: &Material) -> Result<()> {
    w.u8(BASIC_TYPE);
    w.u8(UBER_SHADER);
    w.str(&material.name)?;
    w.f32s(&material.scalars());
    w.bool(material.alpha_blending);
    for texture in &material.textures {
        w.str(texture)?;
    }
    Ok(())
}

fn light(w: &mut ByteWriter, light: &Light) -> Result<()> {
    w.u8(light.kind as u8);
    w.str(&light.name)?;
    w.f32s(&light.color);
    w.f32s(&light.attenuation);
    w.f32(light.intensity);
    w.f32(light.angle);
    Ok(())
}

fn animation_collection(w: &mut ByteWriter, collection: &AnimationCollection) -> Result<()> {
    w.u8(BASIC_TYPE);
    w.str(&collection.name)?;
    w.count(collection.animations.len())?;

    let skeleton = &collection.skeleton;
    w.mat4(&skeleton.bind);
    w.count(skeleton.bones.len())?;
    for bone in &skeleton.bones {
        w.f32s(&bone.position.to_array());
        w.quat(bone.rotation);
        w.u32(bone.parent);
    }

    for animation in &collection.animations {
        w.str(&animation.name)?;
        w.count(animation.keyframes.len())?;
        for keyframe in &animation.keyframes {
            if keyframe.rotations.len() != skeleton.bones.len() {
                return Err(ExportError::Format(format!(
                    "animation '{}' has {} rotations per keyframe for {} bones",
                    animation.name,
                    keyframe.rotations.len(),
                    skeleton.bones.len()
                )));
            }
            w.f32(keyframe.time);
            w.f32s(&keyframe.root_offset.to_array());
            for &rotation in &keyframe.rotations {
                w.quat(rotation);
            }
        }
    }
    Ok(())
}

fn object(w: &mut ByteWriter, object: &SceneObject) -> Result<()> {
    w.object_name(&object.name)?;
    w.u32(object.camera);
    w.u32(object.geometry);
    w.u32(object.material);
    w.u32(object.light);
    w.u32(object.animation);
    w.mat4(&object.transform);
    Ok(())
}

/// Serializes `graph` into the bytes of a `.bgl` file.
pub fn encode_scene(graph: &SceneGraph) -> Result<Vec<u8>> {
    let mut w = ByteWriter::default();
    w.buf.extend_from_slice(MAGIC);
    w.u8(VERSION);
    w.count(graph.cameras.len())?;
    w.count(graph.geometries.len())?;
    w.count(graph.materials.len())?;
    w.count(graph.lights.len())?;
    w.count(graph.animations.len())?;
    w.count(graph.objects.len())?;
    w.f32s(&graph.ambient);

    for c in &graph.cameras {
        camera(&mut w, c)?;
    }
    for g in &graph.geometries {
        geometry(&mut w, g)?;
    }
    for m in &graph.materials {
        material(&mut w, m)?;
    }
    for l in &graph.lights {
        light(&mut w, l)?;
    }
    for a in &graph.animations {
        animation_collection(&mut w, a)?;
    }
    for o in &graph.objects {
        object(&mut w, o)?;
    }
    w.buf.extend_from_slice(&graph.tree.encode());
    Ok(w.buf)
}

/// Encodes first, then creates `path`; a failed encode leaves no file.
pub fn write_scene(graph: &SceneGraph, path: &Path) -> Result<()> {
    let bytes = encode_scene(graph)?;
    std::fs::write(path, &bytes).map_err(|e| ExportError::Io(path.to_path_buf(), e))?;
    info!("wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}
