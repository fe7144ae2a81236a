use std::collections::hash_map::Entry;
use std::collections::HashMap;

use glam::Vec3;
use tracing::{debug, warn};

use super::quantize::VertexKey;
use super::skin::{SkinWeightResolver, SkinWeights};
use super::vertex::{GlVertex, IndexedGeometry};
use super::winding;
use crate::config::WindingPolicy;
use crate::error::{ExportError, Result};
use crate::host::RawMesh;

const ZERO3: [f32; 3] = [0.0; 3];

/// Checks that every polygon is a triangle and every reference is in range.
pub fn validate(mesh: &RawMesh) -> Result<()> {
    let malformed = |reason: String| ExportError::MalformedMesh {
        mesh: mesh.name.clone(),
        reason,
    };
    for (polygon_idx, polygon) in mesh.polygons.iter().enumerate() {
        if polygon.loops.len() != 3 {
            return Err(ExportError::NonTriangularFace {
                mesh: mesh.name.clone(),
                polygon: polygon_idx,
                loops: polygon.loops.len(),
            });
        }
        for &loop_idx in &polygon.loops {
            let l = mesh.loops.get(loop_idx as usize).ok_or_else(|| {
                malformed(format!("polygon {} references loop {}", polygon_idx, loop_idx))
            })?;
            if l.vertex as usize >= mesh.positions.len() {
                return Err(malformed(format!(
                    "loop {} references vertex {}",
                    loop_idx, l.vertex
                )));
            }
        }
    }
    Ok(())
}

/// Index the next welded vertex gets, if it still fits a 32-bit index.
fn next_index(mesh: &str, count: usize) -> Result<u32> {
    u32::try_from(count).map_err(|_| ExportError::MalformedMesh {
        mesh: mesh.to_string(),
        reason: "too many vertices for 32-bit indices".to_string(),
    })
}

/// Welds a triangulated mesh into an indexed vertex buffer.
pub fn convert(mesh: &RawMesh, policy: WindingPolicy) -> Result<IndexedGeometry> {
    convert_skinned(mesh, policy, None)
}

/// Same as [`convert`], filling bone slots from `skin` when given.
///
/// Corners weld iff their quantized position, uv, normal, tangent and
/// binormal all match. Vertices are numbered in first-seen order (polygon
/// order, then loop order) and keep the attributes of that first corner.
pub fn convert_skinned(
    mesh: &RawMesh,
    policy: WindingPolicy,
    skin: Option<&SkinWeightResolver>,
) -> Result<IndexedGeometry> {
    validate(mesh)?;

    let mut welded = HashMap::<VertexKey, u32>::new();
    // (vertex, loop) of each group's first corner
    let mut representatives: Vec<(u32, u32)> = vec![];
    let mut indices = Vec::with_capacity(mesh.polygons.len() * 3);

    for polygon in &mesh.polygons {
        let mut corners = [0u32; 3];
        let mut positions = [Vec3::ZERO; 3];
        for (k, &loop_idx) in polygon.loops.iter().enumerate() {
            let l = &mesh.loops[loop_idx as usize];
            let position = mesh.positions[l.vertex as usize];
            let key = VertexKey::new(
                position,
                l.uv,
                l.normal,
                l.tangent.unwrap_or(ZERO3),
                l.binormal.unwrap_or(ZERO3),
            );
            corners[k] = match welded.entry(key) {
                Entry::Occupied(entry) => *entry.get(),
                Entry::Vacant(entry) => {
                    let next = next_index(&mesh.name, representatives.len())?;
                    representatives.push((l.vertex, loop_idx));
                    *entry.insert(next)
                }
            };
            positions[k] = Vec3::from(position);
        }
        let ordered = winding::resolve(corners, positions, Vec3::from(polygon.normal), policy);
        indices.extend_from_slice(&ordered);
    }

    let mut ambiguous = 0usize;
    let vertices: Vec<GlVertex> = representatives
        .iter()
        .map(|&(vertex, loop_idx)| {
            let l = &mesh.loops[loop_idx as usize];
            let weights = skin
                .map(|s| s.resolve(vertex as usize))
                .unwrap_or(SkinWeights::NONE);
            if weights.truncated {
                ambiguous += 1;
            }
            GlVertex {
                position: mesh.positions[vertex as usize],
                uv: l.uv.map(|c| c.clamp(0.0, 1.0)),
                normal: l.normal,
                tangent: l.tangent.unwrap_or(ZERO3),
                binormal: l.binormal.unwrap_or(ZERO3),
                bones: weights.bones.map(|b| b as f32),
                weights: weights.weights,
            }
        })
        .collect();

    if ambiguous > 0 {
        warn!(
            "AmbiguousSkinWeights: mesh '{}' has {} vertices with more than 3 bone influences, kept the 3 heaviest",
            mesh.name, ambiguous
        );
    }
    debug!(
        "mesh '{}': {} corners welded into {} vertices",
        mesh.name,
        mesh.polygons.len() * 3,
        vertices.len()
    );

    Ok(IndexedGeometry {
        name: mesh.name.clone(),
        vertices,
        indices,
    })
}
