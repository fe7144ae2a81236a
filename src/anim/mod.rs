pub mod animation;
pub mod bone_path;
pub mod curve;
pub mod skeleton;

use std::collections::HashSet;

use glam::Mat4;

use crate::error::Result;
use crate::host::{RawAction, RawArmature};
pub use animation::{Animation, Keyframe};
pub use skeleton::{Bone, Skeleton};

/// A skeleton and every action baked against it.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationCollection {
    pub name: String,
    pub skeleton: Skeleton,
    pub animations: Vec<Animation>,
}

impl AnimationCollection {
    /// Repeated actions are baked once, in first-seen order.
    pub fn encode<'a>(
        armature: &RawArmature,
        bind: Mat4,
        actions: impl IntoIterator<Item = &'a RawAction>,
        fps: f32,
    ) -> Result<Self> {
        let skeleton = skeleton::encode(armature, bind)?;
        let mut seen = HashSet::new();
        let mut animations = vec![];
        for action in actions {
            if seen.insert(action.name.as_str()) {
                animations.push(animation::encode(action, &skeleton, fps)?);
            }
        }
        Ok(Self {
            name: armature.name.clone(),
            skeleton,
            animations,
        })
    }
}
