//! Planar geometry over normalized landmark coordinates

use crate::landmark::Landmark;

/// Planar angle at the middle joint `b` of the triplet `a-b-c`,
/// in degrees, normalized to [0, 180].
///
/// Standard two-vector formula: acos of the dot product of the unit
/// vectors b→a and b→c. Degenerate triplets (coincident points) yield 0.
pub fn angle_at(a: &Landmark, b: &Landmark, c: &Landmark) -> f32 {
    let v1 = (a.x - b.x, a.y - b.y);
    let v2 = (c.x - b.x, c.y - b.y);

    let mag1 = (v1.0 * v1.0 + v1.1 * v1.1).sqrt();
    let mag2 = (v2.0 * v2.0 + v2.1 * v2.1).sqrt();
    if mag1 == 0.0 || mag2 == 0.0 {
        return 0.0;
    }

    let cos = ((v1.0 * v2.0 + v1.1 * v2.1) / (mag1 * mag2)).clamp(-1.0, 1.0);
    cos.acos().to_degrees()
}

/// Angle of the vector a→b measured from the vertical (y) axis,
/// in degrees in [0, 180].
pub fn angle_from_vertical(a: &Landmark, b: &Landmark) -> f32 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let mag = (dx * dx + dy * dy).sqrt();
    if mag == 0.0 {
        return 0.0;
    }
    // Vertical axis points down in image coordinates
    let cos = (dy / mag).clamp(-1.0, 1.0);
    cos.acos().to_degrees()
}

/// Planar euclidean distance between two landmarks.
pub fn distance(a: &Landmark, b: &Landmark) -> f32 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    (dx * dx + dy * dy).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn lm(x: f32, y: f32) -> Landmark {
        Landmark::new(x, y, 0.0, 1.0)
    }

    #[test]
    fn test_right_angle() {
        let a = lm(0.0, 0.0);
        let b = lm(0.0, 1.0);
        let c = lm(1.0, 1.0);
        assert!((angle_at(&a, &b, &c) - 90.0).abs() < 1e-3);
    }

    #[test]
    fn test_straight_line_is_180() {
        let a = lm(0.0, 0.5);
        let b = lm(0.5, 0.5);
        let c = lm(1.0, 0.5);
        assert!((angle_at(&a, &b, &c) - 180.0).abs() < 1e-3);
    }

    #[test]
    fn test_folded_is_zero() {
        let a = lm(0.0, 0.0);
        let b = lm(0.5, 0.5);
        let c = lm(0.0, 0.0);
        assert!(angle_at(&a, &b, &c).abs() < 1e-3);
    }

    #[test]
    fn test_degenerate_triplet() {
        let p = lm(0.3, 0.3);
        assert_eq!(angle_at(&p, &p, &p), 0.0);
    }

    #[test]
    fn test_vertical_vector() {
        let a = lm(0.5, 0.2);
        let b = lm(0.5, 0.8);
        assert!(angle_from_vertical(&a, &b).abs() < 1e-3);
        // Reversed points up: 180 from vertical
        assert!((angle_from_vertical(&b, &a) - 180.0).abs() < 1e-3);
    }

    #[test]
    fn test_horizontal_vector() {
        let a = lm(0.2, 0.5);
        let b = lm(0.8, 0.5);
        assert!((angle_from_vertical(&a, &b) - 90.0).abs() < 1e-3);
    }

    #[test]
    fn test_distance() {
        let a = lm(0.0, 0.0);
        let b = lm(0.3, 0.4);
        assert!((distance(&a, &b) - 0.5).abs() < 1e-6);
    }

    proptest! {
        #[test]
        fn prop_angle_in_range(
            ax in 0.0f32..1.0, ay in 0.0f32..1.0,
            bx in 0.0f32..1.0, by in 0.0f32..1.0,
            cx in 0.0f32..1.0, cy in 0.0f32..1.0,
        ) {
            let angle = angle_at(&lm(ax, ay), &lm(bx, by), &lm(cx, cy));
            prop_assert!((0.0..=180.0).contains(&angle));
        }

        #[test]
        fn prop_angle_symmetric(
            ax in 0.0f32..1.0, ay in 0.0f32..1.0,
            bx in 0.0f32..1.0, by in 0.0f32..1.0,
            cx in 0.0f32..1.0, cy in 0.0f32..1.0,
        ) {
            let a = lm(ax, ay);
            let b = lm(bx, by);
            let c = lm(cx, cy);
            prop_assert!((angle_at(&a, &b, &c) - angle_at(&c, &b, &a)).abs() < 1e-3);
        }
    }
}
