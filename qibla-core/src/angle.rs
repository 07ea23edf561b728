//! Circular arithmetic on compass degrees
//!
//! Headings and bearings are degrees clockwise from north. All helpers here
//! accept any finite input, including values far outside one turn.

use libm::fabsf;

/// Degrees in a full turn
pub const FULL_TURN_DEG: f32 = 360.0;

/// Degrees in a half turn
pub const HALF_TURN_DEG: f32 = 180.0;

/// Normalize an angle into [0, 360)
pub fn normalize_degrees(degrees: f32) -> f32 {
    let mut d = degrees % FULL_TURN_DEG;
    if d < 0.0 {
        d += FULL_TURN_DEG;
    }
    // -1e-7 % 360 + 360 rounds to exactly 360.0 in f32
    if d >= FULL_TURN_DEG {
        d -= FULL_TURN_DEG;
    }
    d
}

/// Signed shortest rotation from `from` to `to`, in (-180, 180]
///
/// A rotation of exactly half a turn is reported as +180.
pub fn shortest_delta(from: f32, to: f32) -> f32 {
    let mut d = (to - from) % FULL_TURN_DEG;
    if d > HALF_TURN_DEG {
        d -= FULL_TURN_DEG;
    } else if d <= -HALF_TURN_DEG {
        d += FULL_TURN_DEG;
    }
    d
}

/// Unsigned angular separation between two directions, in [0, 180]
///
/// Symmetric in its arguments.
pub fn angular_difference(a: f32, b: f32) -> f32 {
    let mut diff = fabsf(normalize_degrees(a) - normalize_degrees(b));
    if diff > HALF_TURN_DEG {
        diff = FULL_TURN_DEG - diff;
    }
    diff
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_degrees() {
        assert_eq!(normalize_degrees(0.0), 0.0);
        assert_eq!(normalize_degrees(360.0), 0.0);
        assert_eq!(normalize_degrees(725.0), 5.0);
        assert_eq!(normalize_degrees(-90.0), 270.0);
        assert_eq!(normalize_degrees(-720.0), 0.0);
    }

    #[test]
    fn test_normalize_tiny_negative_stays_in_range() {
        let d = normalize_degrees(-1e-7);
        assert!((0.0..360.0).contains(&d));
    }

    #[test]
    fn test_shortest_delta_wraps() {
        assert_eq!(shortest_delta(350.0, 10.0), 20.0);
        assert_eq!(shortest_delta(10.0, 350.0), -20.0);
        assert_eq!(shortest_delta(0.0, 180.0), 180.0);
        assert_eq!(shortest_delta(180.0, 0.0), 180.0);
        assert_eq!(shortest_delta(90.0, 90.0), 0.0);
    }

    #[test]
    fn test_angular_difference_wraps() {
        assert_eq!(angular_difference(355.0, 5.0), 10.0);
        assert_eq!(angular_difference(358.0, 5.0), 7.0);
        assert_eq!(angular_difference(0.0, 180.0), 180.0);
        assert_eq!(angular_difference(5.0, 355.0), 10.0);
    }
}
