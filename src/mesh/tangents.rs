use glam::Vec3;
use mikktspace::{generate_tangents, Geometry};

use crate::host::RawMesh;

/// Fills in tangent/binormal pairs for loops the host left without them.
/// Returns false when MikkTSpace gave up, in which case the mesh is left
/// untouched. The mesh must already be validated.
pub fn generate_missing_tangents(mesh: &mut RawMesh) -> bool {
    let needs_tangents = mesh
        .loops
        .iter()
        .any(|l| l.tangent.is_none() || l.binormal.is_none());
    if !needs_tangents {
        return true;
    }

    struct LoopGeometry<'a> {
        mesh: &'a RawMesh,
        tangents: &'a mut [[f32; 4]],
    }

    impl LoopGeometry<'_> {
        fn loop_index(&self, face: usize, vert: usize) -> usize {
            self.mesh.polygons[face].loops[vert] as usize
        }
    }

    impl Geometry for LoopGeometry<'_> {
        fn num_faces(&self) -> usize {
            self.mesh.polygons.len()
        }

        fn num_vertices_of_face(&self, _face: usize) -> usize {
            3
        }

        fn position(&self, face: usize, vert: usize) -> [f32; 3] {
            let l = &self.mesh.loops[self.loop_index(face, vert)];
            self.mesh.positions[l.vertex as usize]
        }

        fn normal(&self, face: usize, vert: usize) -> [f32; 3] {
            self.mesh.loops[self.loop_index(face, vert)].normal
        }

        fn tex_coord(&self, face: usize, vert: usize) -> [f32; 2] {
            self.mesh.loops[self.loop_index(face, vert)].uv
        }

        fn set_tangent_encoded(&mut self, tangent: [f32; 4], face: usize, vert: usize) {
            let idx = self.loop_index(face, vert);
            self.tangents[idx] = tangent;
        }
    }

    let mut tangents = vec![[0.0; 4]; mesh.loops.len()];
    let ok = {
        let mut geometry = LoopGeometry {
            mesh,
            tangents: tangents.as_mut_slice(),
        };
        generate_tangents(&mut geometry)
    };
    if !ok {
        return false;
    }

    for (l, t) in mesh.loops.iter_mut().zip(tangents) {
        let tangent = Vec3::new(t[0], t[1], t[2]);
        if l.tangent.is_none() {
            l.tangent = Some(tangent.to_array());
        }
        if l.binormal.is_none() {
            let binormal = Vec3::from(l.normal).cross(tangent) * t[3];
            l.binormal = Some(binormal.to_array());
        }
    }
    true
}
