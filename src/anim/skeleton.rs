use std::collections::HashMap;

use glam::{Mat4, Quat, Vec3};

use crate::error::{ExportError, Result};
use crate::host::RawArmature;
use crate::mesh::BoneIndexSpace;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bone {
    /// Offset from the parent joint, in the bone's own frame.
    pub position: Vec3,
    /// Rest rotation relative to the parent, normalized.
    pub rotation: Quat,
    /// 0 for roots, else 1 + parent index.
    pub parent: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Skeleton {
    /// Armature space to animated-object space.
    pub bind: Mat4,
    /// Alphabetical; this is the bone index space of skinning and keyframes.
    pub names: BoneIndexSpace,
    pub bones: Vec<Bone>,
}

impl Skeleton {
    /// The bone the engine applies root offsets to: the first parentless bone.
    pub fn root(&self) -> Option<usize> {
        self.bones.iter().position(|b| b.parent == 0)
    }
}

/// Builds the bind-pose skeleton of `armature`.
///
/// `bind` places the armature relative to the object it deforms, usually
/// `object_world.inverse() * armature_world`.
pub fn encode(armature: &RawArmature, bind: Mat4) -> Result<Skeleton> {
    let malformed = |reason: String| ExportError::MalformedSkeleton {
        armature: armature.name.clone(),
        reason,
    };

    let mut by_name = HashMap::new();
    for bone in &armature.bones {
        if by_name.insert(bone.name.as_str(), bone).is_some() {
            return Err(malformed(format!("duplicate bone '{}'", bone.name)));
        }
    }
    for bone in &armature.bones {
        let mut current = bone;
        let mut depth = 0;
        while let Some(parent) = current.parent.as_deref().and_then(|p| by_name.get(p).copied()) {
            depth += 1;
            if depth > armature.bones.len() {
                return Err(malformed(format!("bone '{}' has a cyclic parent chain", bone.name)));
            }
            current = parent;
        }
    }
    let names = BoneIndexSpace::new(armature.bones.iter().map(|b| b.name.clone()));

    let mut bones = Vec::with_capacity(names.len());
    for name in names.names() {
        let raw = by_name[name.as_str()];
        let rest = Mat4::from_cols_array(&raw.matrix_local);
        let (parent, parent_rest) = match &raw.parent {
            None => (0, Mat4::IDENTITY),
            Some(parent_name) => {
                let parent_idx = names.index_of(parent_name).ok_or_else(|| {
                    malformed(format!(
                        "bone '{}' has unknown parent '{}'",
                        name, parent_name
                    ))
                })?;
                let parent_raw = by_name[parent_name.as_str()];
                (
                    parent_idx as u32 + 1,
                    Mat4::from_cols_array(&parent_raw.matrix_local),
                )
            }
        };

        let relative = parent_rest.inverse() * rest;
        let (_, rotation, translation) = relative.to_scale_rotation_translation();
        let rotation = rotation.normalize();
        bones.push(Bone {
            position: rotation.inverse() * translation,
            rotation,
            parent,
        });
    }

    Ok(Skeleton { bind, names, bones })
}
