use std::cmp::Ordering;

use crate::host::VertexGroup;

/// Influences kept per vertex.
pub const MAX_INFLUENCES: usize = 3;

/// Alphabetical bone name table. A bone's index is its position in it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoneIndexSpace {
    names: Vec<String>,
}

impl BoneIndexSpace {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut names: Vec<String> = names.into_iter().map(Into::into).collect();
        names.sort();
        names.dedup();
        Self { names }
    }

    /// Index space of a mesh without a skeleton: its own group names.
    pub fn from_groups(groups: &[VertexGroup]) -> Self {
        Self::new(groups.iter().map(|g| g.name.clone()))
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.binary_search_by(|n| n.as_str().cmp(name)).ok()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkinWeights {
    pub bones: [u32; MAX_INFLUENCES],
    pub weights: [f32; MAX_INFLUENCES],
    /// More than [`MAX_INFLUENCES`] nonzero influences were dropped.
    pub truncated: bool,
}

impl SkinWeights {
    pub const NONE: SkinWeights = SkinWeights {
        bones: [0; MAX_INFLUENCES],
        weights: [0.0; MAX_INFLUENCES],
        truncated: false,
    };
}

/// Per-vertex influence lists of one mesh, keyed by bone index.
#[derive(Debug, Clone)]
pub struct SkinWeightResolver {
    influences: Vec<Vec<(u32, f32)>>,
}

impl SkinWeightResolver {
    /// Groups whose name is not in `space` do not deform and are skipped.
    pub fn new(groups: &[VertexGroup], space: &BoneIndexSpace, vertex_count: usize) -> Self {
        let mut influences = vec![Vec::new(); vertex_count];
        for group in groups {
            let Some(bone) = space.index_of(&group.name) else {
                continue;
            };
            for &(vertex, weight) in &group.weights {
                if weight == 0.0 {
                    continue;
                }
                if let Some(list) = influences.get_mut(vertex as usize) {
                    list.push((bone as u32, weight));
                }
            }
        }
        Self { influences }
    }

    pub fn resolve(&self, vertex: usize) -> SkinWeights {
        let Some(list) = self.influences.get(vertex) else {
            return SkinWeights::NONE;
        };
        let mut ranked = list.clone();
        // heaviest first, lower bone index wins ties
        ranked.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });
        let truncated = ranked.len() > MAX_INFLUENCES;
        ranked.truncate(MAX_INFLUENCES);
        ranked.resize(MAX_INFLUENCES, (0, 0.0));
        ranked.sort_by_key(|&(bone, _)| bone);

        let mut out = SkinWeights {
            truncated,
            ..SkinWeights::NONE
        };
        for (i, (bone, weight)) in ranked.into_iter().enumerate() {
            out.bones[i] = bone;
            out.weights[i] = weight;
        }
        out
    }
}
