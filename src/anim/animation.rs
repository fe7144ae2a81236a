use glam::{EulerRot, Quat, Vec3, Vec4};
use tracing::{debug, warn};

use super::bone_path::{self, DataPath};
use super::curve;
use super::skeleton::Skeleton;
use crate::error::{ExportError, Result};
use crate::host::{RawAction, RawCurve};

#[derive(Debug, Clone, PartialEq)]
pub struct Keyframe {
    /// Seconds.
    pub time: f32,
    pub root_offset: Vec3,
    /// One per bone, in skeleton order.
    pub rotations: Vec<Quat>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Animation {
    pub name: String,
    pub keyframes: Vec<Keyframe>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Channel {
    RootOffset(usize),
    /// Component in host order w, x, y, z.
    Quaternion { bone: usize, component: usize },
    Euler { bone: usize, component: usize },
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Rotation {
    Rest,
    Quaternion,
    Euler,
}

fn classify(action: &RawAction, curve: &RawCurve, skeleton: &Skeleton) -> Result<Channel> {
    let component = curve.array_index;
    let unsupported = || ExportError::UnsupportedAnimationTarget {
        action: action.name.clone(),
        path: format!("{}[{}]", curve.data_path, component),
    };
    let malformed = || ExportError::MalformedBonePath {
        action: action.name.clone(),
        path: curve.data_path.clone(),
    };

    match bone_path::parse(&curve.data_path).map_err(|_| malformed())? {
        DataPath::Object("location") if component < 3 => Ok(Channel::RootOffset(component)),
        DataPath::Object(_) => Err(unsupported()),
        DataPath::Bone { bone, property } => {
            let bone = skeleton.names.index_of(&bone).ok_or_else(malformed)?;
            match property {
                "location" if component < 3 && skeleton.root() == Some(bone) => {
                    Ok(Channel::RootOffset(component))
                }
                "rotation_quaternion" if component < 4 => Ok(Channel::Quaternion { bone, component }),
                "rotation_euler" if component < 3 => Ok(Channel::Euler { bone, component }),
                _ => Err(unsupported()),
            }
        }
    }
}

/// Samples `action` at every frame any of its curves is keyed on.
pub fn encode(action: &RawAction, skeleton: &Skeleton, fps: f32) -> Result<Animation> {
    if !(fps.is_finite() && fps > 0.0) {
        return Err(ExportError::Config(format!("frame rate must be positive, got {}", fps)));
    }

    let channels = action
        .curves
        .iter()
        .map(|c| classify(action, c, skeleton).map(|channel| (channel, c)))
        .collect::<Result<Vec<_>>>()?;

    let bone_count = skeleton.bones.len();
    let mut modes = vec![Rotation::Rest; bone_count];
    for (channel, _) in &channels {
        match *channel {
            Channel::Quaternion { bone, .. } => modes[bone] = Rotation::Quaternion,
            Channel::Euler { bone, .. } if modes[bone] == Rotation::Rest => {
                modes[bone] = Rotation::Euler
            }
            _ => {}
        }
    }
    for (channel, _) in &channels {
        if let Channel::Euler { bone, .. } = *channel {
            if modes[bone] == Rotation::Quaternion {
                warn!(
                    "action '{}': bone '{}' has quaternion and euler curves, using the quaternion",
                    action.name,
                    skeleton.names.names()[bone]
                );
                break;
            }
        }
    }

    let mut frames: Vec<f32> = channels
        .iter()
        .flat_map(|(_, c)| c.keyframes.iter().map(|k| k.co[0]))
        .filter(|f| f.is_finite())
        .collect();
    frames.sort_by(f32::total_cmp);
    frames.dedup();

    let mut keyframes: Vec<Keyframe> = Vec::with_capacity(frames.len());
    for frame in frames {
        let mut root_offset = Vec3::ZERO;
        let mut wxyz = vec![[1.0, 0.0, 0.0, 0.0]; bone_count];
        let mut euler = vec![Vec3::ZERO; bone_count];

        for (channel, c) in &channels {
            let value = curve::evaluate(&c.keyframes, frame);
            match *channel {
                Channel::RootOffset(i) => root_offset[i] = value,
                Channel::Quaternion { bone, component } => wxyz[bone][component] = value,
                Channel::Euler { bone, component } => euler[bone][component] = value,
            }
        }

        let rotations = (0..bone_count)
            .map(|bone| match modes[bone] {
                Rotation::Rest => Quat::IDENTITY,
                Rotation::Quaternion => {
                    let [w, x, y, z] = wxyz[bone];
                    Vec4::new(x, y, z, w)
                        .try_normalize()
                        .map(Quat::from_vec4)
                        .unwrap_or(Quat::IDENTITY)
                }
                Rotation::Euler => {
                    let e = euler[bone];
                    Quat::from_euler(EulerRot::ZYX, e.z, e.y, e.x).normalize()
                }
            })
            .collect();

        let time = frame / fps;
        if keyframes.last().is_some_and(|k| k.time >= time) {
            continue;
        }
        keyframes.push(Keyframe {
            time,
            root_offset,
            rotations,
        });
    }

    debug!(
        "action '{}': {} curves sampled into {} keyframes",
        action.name,
        channels.len(),
        keyframes.len()
    );

    Ok(Animation {
        name: action.name.clone(),
        keyframes,
    })
}
