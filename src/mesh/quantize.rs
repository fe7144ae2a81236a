/// Five decimal digits.
const SCALE: f64 = 100_000.0;

/// Fixed-point representation of `value` rounded to five decimal digits.
pub fn quantize(value: f32) -> i64 {
    // the integer cast also folds -0.0 into 0
    (value as f64 * SCALE).round() as i64
}

pub fn quantize_array<const N: usize>(values: [f32; N]) -> [i64; N] {
    values.map(quantize)
}

/// Weld key of one (vertex, loop) corner. Two corners become the same GPU
/// vertex iff their keys are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexKey {
    pub position: [i64; 3],
    pub uv: [i64; 2],
    pub normal: [i64; 3],
    pub tangent: [i64; 3],
    pub binormal: [i64; 3],
}

impl VertexKey {
    pub fn new(
        position: [f32; 3],
        uv: [f32; 2],
        normal: [f32; 3],
        tangent: [f32; 3],
        binormal: [f32; 3],
    ) -> Self {
        Self {
            position: quantize_array(position),
            uv: quantize_array(uv),
            normal: quantize_array(normal),
            tangent: quantize_array(tangent),
            binormal: quantize_array(binormal),
        }
    }
}
