use glam::Vec3;

use crate::config::WindingPolicy;

/// Zero for degenerate triangles.
fn cross_normal(a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
    (b - a).cross(c - a).normalize_or_zero()
}

/// Picks the corner order for one triangle. `corners` are in loop order and
/// `positions` are their positions; the result is a permutation of `corners`.
///
/// Of the two possible orientations the one whose cross-product normal lies
/// closer to `face_normal` is taken as counter-clockwise.
pub fn resolve<T: Copy>(
    corners: [T; 3],
    positions: [Vec3; 3],
    face_normal: Vec3,
    policy: WindingPolicy,
) -> [T; 3] {
    if policy == WindingPolicy::None {
        return corners;
    }
    let [p1, p2, p3] = positions;
    let n1 = cross_normal(p1, p2, p3);
    let n2 = cross_normal(p1, p3, p2);
    let [a, b, c] = corners;
    let ccw = if n1.distance(face_normal) <= n2.distance(face_normal) {
        [a, b, c]
    } else {
        [a, c, b]
    };
    match policy {
        WindingPolicy::Cw => {
            let [x, y, z] = ccw;
            [z, y, x]
        }
        _ => ccw,
    }
}
