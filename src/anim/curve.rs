use glam::Vec2;

use crate::host::{Interpolation, RawKeyframePoint};

const BEZIER_ITERATIONS: usize = 48;

/// Value of the curve at `frame`. Holds the end values outside the keyed
/// range; an empty curve evaluates to 0.
pub fn evaluate(keys: &[RawKeyframePoint], frame: f32) -> f32 {
    let (Some(first), Some(last)) = (keys.first(), keys.last()) else {
        return 0.0;
    };
    if frame <= first.co[0] {
        return first.co[1];
    }
    if frame >= last.co[0] {
        return last.co[1];
    }

    // first key strictly after `frame`; exists because frame < last
    let next = keys.partition_point(|k| k.co[0] <= frame);
    let a = &keys[next - 1];
    let b = &keys[next];
    if frame == a.co[0] {
        return a.co[1];
    }

    let span = b.co[0] - a.co[0];
    if span <= 0.0 {
        return b.co[1];
    }
    match a.interpolation {
        Interpolation::Constant => a.co[1],
        Interpolation::Linear => {
            let alpha = (frame - a.co[0]) / span;
            a.co[1] + (b.co[1] - a.co[1]) * alpha
        }
        Interpolation::Bezier => bezier(a, b, frame),
    }
}

fn bezier(a: &RawKeyframePoint, b: &RawKeyframePoint, frame: f32) -> f32 {
    let p0 = Vec2::from(a.co);
    let p3 = Vec2::from(b.co);
    let third = (p3.x - p0.x) / 3.0;
    let mut p1 = a.handle_right.map(Vec2::from).unwrap_or(Vec2::new(p0.x + third, p0.y));
    let mut p2 = b.handle_left.map(Vec2::from).unwrap_or(Vec2::new(p3.x - third, p3.y));
    // keep x(s) monotonic so it has a single solution
    p1.x = p1.x.clamp(p0.x, p3.x);
    p2.x = p2.x.clamp(p0.x, p3.x);

    let point = |s: f32| {
        let u = 1.0 - s;
        p0 * (u * u * u) + p1 * (3.0 * u * u * s) + p2 * (3.0 * u * s * s) + p3 * (s * s * s)
    };

    let (mut lo, mut hi) = (0.0f32, 1.0f32);
    for _ in 0..BEZIER_ITERATIONS {
        let mid = 0.5 * (lo + hi);
        if point(mid).x < frame {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    point(0.5 * (lo + hi)).y
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(frame: f32, value: f32, interpolation: Interpolation) -> RawKeyframePoint {
        RawKeyframePoint {
            co: [frame, value],
            interpolation,
            handle_left: None,
            handle_right: None,
        }
    }

    #[test]
    fn keyed_frames_return_key_values() {
        let keys = [key(1.0, 2.0, Interpolation::Bezier), key(5.0, -1.0, Interpolation::Bezier)];
        assert_eq!(evaluate(&keys, 1.0), 2.0);
        assert_eq!(evaluate(&keys, 5.0), -1.0);
    }

    #[test]
    fn extrapolation_is_constant() {
        let keys = [key(1.0, 2.0, Interpolation::Linear), key(5.0, 4.0, Interpolation::Linear)];
        assert_eq!(evaluate(&keys, -10.0), 2.0);
        assert_eq!(evaluate(&keys, 99.0), 4.0);
        assert_eq!(evaluate(&[], 3.0), 0.0);
    }

    #[test]
    fn linear_and_constant_segments() {
        let keys = [key(0.0, 0.0, Interpolation::Linear), key(4.0, 8.0, Interpolation::Constant), key(6.0, 0.0, Interpolation::Linear)];
        assert!((evaluate(&keys, 1.0) - 2.0).abs() < 1e-6);
        assert_eq!(evaluate(&keys, 5.0), 8.0);
    }

    #[test]
    fn symmetric_bezier_passes_through_midpoint() {
        let keys = [key(0.0, 0.0, Interpolation::Bezier), key(10.0, 1.0, Interpolation::Bezier)];
        assert!((evaluate(&keys, 5.0) - 0.5).abs() < 1e-4);
        let early = evaluate(&keys, 1.0);
        assert!(early > 0.0 && early < 0.1, "ease-in expected, got {}", early);
    }
}
