//! Offset-to-polar conversion for legacy shadow filters.

/// Direction and strength of a shadow offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PolarOffset {
    /// Rotation in whole degrees, counter-clockwise from the positive x axis.
    pub rotation_degrees: i32,
    /// Shadow strength in whole pixels.
    pub magnitude: i32,
}

/// Convert a screen-space offset into a rotation and magnitude.
///
/// The y axis is negated because screen coordinates grow downwards.
/// The magnitude is `|x| + |y|`, not the Euclidean length: legacy shadow
/// filters were tuned against this value and existing output depends on it.
pub fn offset_to_polar(x: f64, y: f64) -> PolarOffset {
    // `0.0 - y` keeps a zero offset at +0.0 so that (-x, 0) maps to 180, not -180.
    let rotation = (0.0 - y).atan2(x).to_degrees().round();
    let magnitude = (x.abs() + y.abs()).round();

    PolarOffset {
        rotation_degrees: rotation as i32,
        magnitude: magnitude as i32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upward_offset_points_at_ninety_degrees() {
        let polar = offset_to_polar(0.0, -10.0);
        assert_eq!(polar.rotation_degrees, 90);
        assert_eq!(polar.magnitude, 10);
    }

    #[test]
    fn downward_right_offset() {
        let polar = offset_to_polar(2.0, 2.0);
        assert_eq!(polar.rotation_degrees, -45);
        assert_eq!(polar.magnitude, 4);
    }

    #[test]
    fn magnitude_is_manhattan_length() {
        // Euclidean length would be 5.
        assert_eq!(offset_to_polar(3.0, 4.0).magnitude, 7);
        assert_eq!(offset_to_polar(-3.0, -4.0).magnitude, 7);
    }

    #[test]
    fn zero_offset() {
        assert_eq!(
            offset_to_polar(0.0, 0.0),
            PolarOffset {
                rotation_degrees: 0,
                magnitude: 0
            }
        );
    }

    #[test]
    fn leftward_offset() {
        assert_eq!(offset_to_polar(-5.0, 0.0).rotation_degrees, 180);
    }
}
