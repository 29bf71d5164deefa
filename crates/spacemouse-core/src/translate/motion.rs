//! Motion path: raw axes to [`MoveEvent`].
//!
//! Pure and stateless.  Every motion sample yields exactly one event, even an
//! all-zero one: a zero sample tells the application the cap was released.

use crate::domain::event::MoveEvent;

/// Axis used when the rotation vector is zero.
pub const DEFAULT_AXIS: [f64; 3] = [0.0, 0.0, 1.0];

/// Converts raw translation and rotation vectors into a [`MoveEvent`].
///
/// `angle` is the Euclidean norm of `rotation`; the axis is `rotation / angle`,
/// or [`DEFAULT_AXIS`] when the norm is zero.
pub fn translate_motion(translation: [i32; 3], rotation: [i32; 3]) -> MoveEvent {
    let [rx, ry, rz] = rotation.map(f64::from);
    let angle = (rx * rx + ry * ry + rz * rz).sqrt();

    let [axis_x, axis_y, axis_z] = if angle == 0.0 {
        DEFAULT_AXIS
    } else {
        [rx / angle, ry / angle, rz / angle]
    };

    MoveEvent {
        tx: translation[0],
        ty: translation[1],
        tz: translation[2],
        angle,
        axis_x,
        axis_y,
        axis_z,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    fn norm(v: [f64; 3]) -> f64 {
        (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
    }

    #[test]
    fn test_zero_rotation_uses_default_axis() {
        let event = translate_motion([0, 0, 0], [0, 0, 0]);
        assert_eq!(event.angle, 0.0);
        assert_eq!(event.axis(), DEFAULT_AXIS);
    }

    #[test]
    fn test_translation_is_copied_verbatim() {
        let event = translate_motion([-350, 12, 7], [0, 0, 0]);
        assert_eq!(event.translation(), [-350, 12, 7]);
    }

    #[test]
    fn test_angle_is_euclidean_norm() {
        // 3-4-12 gives a norm of exactly 13.
        let event = translate_motion([0, 0, 0], [3, 4, 12]);
        assert!((event.angle - 13.0).abs() < EPS);
        assert!((event.axis_x - 3.0 / 13.0).abs() < EPS);
        assert!((event.axis_y - 4.0 / 13.0).abs() < EPS);
        assert!((event.axis_z - 12.0 / 13.0).abs() < EPS);
    }

    #[test]
    fn test_axis_is_unit_and_parallel_for_many_vectors() {
        for rotation in [
            [1, 0, 0],
            [0, -1, 0],
            [0, 0, 350],
            [-350, 350, -350],
            [17, -250, 3],
            [i16::MAX as i32, i16::MIN as i32, 1],
        ] {
            // Act
            let event = translate_motion([0, 0, 0], rotation);
            let axis = event.axis();
            let raw = rotation.map(f64::from);

            // Assert: unit length
            assert!((norm(axis) - 1.0).abs() < 1e-9, "axis {axis:?} not unit");
            // Assert: parallel (axis * angle reproduces the raw vector)
            for i in 0..3 {
                assert!((axis[i] * event.angle - raw[i]).abs() < 1e-6, "{rotation:?}");
            }
            assert!((event.angle - norm(raw)).abs() < 1e-9);
        }
    }
}
