//! Palm frame and focal-point placement.
//!
//! The haptic point sits 2 cm along the palm's X axis and 2 cm along its Y
//! (finger) axis from the palm centre, all in device space.

use glam::Vec3;

use crate::alignment::Alignment;
use crate::error::{FocusError, Result};
use crate::hand::Hand;

/// Offset along each of the palm's X and Y axes (metres).
pub const PALM_OFFSET_M: f32 = 0.02;

/// Emitter intensity, in the emitter library's own units.
pub const INTENSITY: f32 = 1.5;

/// Amplitude-modulation frequency (Hz).
pub const FREQUENCY_HZ: f32 = 200.0;

/// Below this, the cross product of direction and normal is treated as zero.
const MIN_CROSS_LEN: f32 = 1.0e-6;

// ════════════════════════════════════════════════════════════════════════════
// ControlPoint
// ════════════════════════════════════════════════════════════════════════════

/// One focal-point command for the emitter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ControlPoint {
    /// Device space (metres).
    pub position:  Vec3,
    pub intensity: f32,
    /// Hz.
    pub frequency: f32,
}

impl ControlPoint {
    pub fn new(position: Vec3, intensity: f32, frequency: f32) -> Self {
        ControlPoint { position, intensity, frequency }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// PalmAxes
// ════════════════════════════════════════════════════════════════════════════

/// Orthonormal frame attached to the palm, in device space.
///
/// `z` is the (emitter-facing) palm normal and `x = normalize(d × z)` for
/// finger direction `d`.  `y = z × x` is `d` with its component along the
/// normal removed, so a tilted palm still yields a right-handed orthonormal
/// frame and the normal wins any disagreement.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PalmAxes {
    pub x: Vec3,
    pub y: Vec3,
    pub z: Vec3,
}

impl PalmAxes {
    /// Build the frame from a device-space normal and finger direction.
    /// Both are normalised here.
    ///
    /// # Example
    ///
    /// ```
    /// use glam::Vec3;
    /// use palm_focus::PalmAxes;
    ///
    /// let axes = PalmAxes::from_normal_direction(Vec3::Z, Vec3::Y).unwrap();
    /// assert_eq!(axes.x, Vec3::X);
    /// ```
    pub fn from_normal_direction(normal: Vec3, direction: Vec3) -> Result<Self> {
        let z = normal.try_normalize()
            .ok_or(FocusError::degenerate("zero-length palm normal"))?;
        let d = direction.try_normalize()
            .ok_or(FocusError::degenerate("zero-length palm direction"))?;

        let cross = d.cross(z);
        if cross.length() < MIN_CROSS_LEN {
            return Err(FocusError::degenerate("palm normal parallel to direction"));
        }
        let x = cross.normalize();
        let y = z.cross(x);

        Ok(PalmAxes { x, y, z })
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Target computation
// ════════════════════════════════════════════════════════════════════════════

/// Palm centre and axes in device space.
///
/// The tracker's normal points out of the back of the working side, so it is
/// negated before mapping.
pub fn palm_in_device(hand: &Hand, alignment: &Alignment) -> Result<(Vec3, PalmAxes)> {
    check_finite("palm position",  hand.palm_position)?;
    check_finite("palm normal",    hand.palm_normal)?;
    check_finite("palm direction", hand.direction)?;

    let position  = alignment.position_tracking_to_device(hand.palm_position);
    let normal    = alignment.direction_tracking_to_device(-hand.palm_normal);
    let direction = alignment.direction_tracking_to_device(hand.direction);

    Ok((position, PalmAxes::from_normal_direction(normal, direction)?))
}

/// Device-space point 2 cm × 2 cm from the palm centre.
pub fn target_position(hand: &Hand, alignment: &Alignment) -> Result<Vec3> {
    let (centre, axes) = palm_in_device(hand, alignment)?;
    Ok(offset_point(centre, &axes))
}

/// The default control point for `hand`: [`INTENSITY`] at [`FREQUENCY_HZ`].
pub fn control_point(hand: &Hand, alignment: &Alignment) -> Result<ControlPoint> {
    control_point_with(hand, alignment, INTENSITY, FREQUENCY_HZ)
}

pub fn control_point_with(
    hand:      &Hand,
    alignment: &Alignment,
    intensity: f32,
    frequency: f32,
) -> Result<ControlPoint> {
    let position = target_position(hand, alignment)?;
    Ok(ControlPoint::new(position, intensity, frequency))
}

fn offset_point(centre: Vec3, axes: &PalmAxes) -> Vec3 {
    centre + PALM_OFFSET_M * axes.x + PALM_OFFSET_M * axes.y
}

fn check_finite(what: &'static str, v: Vec3) -> Result<()> {
    if v.is_finite() { Ok(()) } else { Err(FocusError::non_finite(what, v)) }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hand::Side;
    use approx::assert_abs_diff_eq;

    fn assert_orthonormal(a: &PalmAxes) {
        assert_abs_diff_eq!(a.x.length(), 1.0, epsilon = 1e-5);
        assert_abs_diff_eq!(a.y.length(), 1.0, epsilon = 1e-5);
        assert_abs_diff_eq!(a.z.length(), 1.0, epsilon = 1e-5);
        assert_abs_diff_eq!(a.x.dot(a.y), 0.0, epsilon = 1e-5);
        assert_abs_diff_eq!(a.x.dot(a.z), 0.0, epsilon = 1e-5);
        assert_abs_diff_eq!(a.y.dot(a.z), 0.0, epsilon = 1e-5);
    }

    #[test]
    fn origin_palm_offsets_two_cm_each_way() {
        // Tracker normal is negated, so (0,0,-1) becomes device Z.
        let hand = Hand::new(Side::Right, Vec3::ZERO)
            .with_normal(Vec3::NEG_Z)
            .with_direction(Vec3::Y);
        let (_, axes) = palm_in_device(&hand, &Alignment::identity()).unwrap();
        assert_eq!(axes.x, Vec3::X);

        let p = target_position(&hand, &Alignment::identity()).unwrap();
        assert_abs_diff_eq!(p.x, 0.02, epsilon = 1e-7);
        assert_abs_diff_eq!(p.y, 0.02, epsilon = 1e-7);
        assert_abs_diff_eq!(p.z, 0.0,  epsilon = 1e-7);
    }

    #[test]
    fn palm_above_sensor_with_default_alignment() {
        // Flat palm-down hand 200 mm up, fingers away from the user.
        let hand = Hand::new(Side::Left, Vec3::new(0.0, 200.0, 0.0));
        let p = target_position(&hand, &Alignment::default()).unwrap();
        assert_abs_diff_eq!(p.x, 0.02, epsilon = 1e-5);
        assert_abs_diff_eq!(p.y, 0.02, epsilon = 1e-5);
        assert_abs_diff_eq!(p.z, 0.2,  epsilon = 1e-5);
    }

    #[test]
    fn axes_are_orthonormal_for_skewed_inputs() {
        let cases = [
            (Vec3::new(0.1, 0.2, 0.97),  Vec3::new(0.0, 1.0, 0.1)),
            (Vec3::new(-0.5, 0.5, 0.7),  Vec3::new(0.3, 0.9, -0.2)),
            (Vec3::new(3.0, 0.0, 4.0),   Vec3::new(0.0, 7.0, 0.0)),
        ];
        for (n, d) in cases {
            let axes = PalmAxes::from_normal_direction(n, d).unwrap();
            assert_orthonormal(&axes);
            // Finger direction survives, minus its normal component.
            assert!(axes.y.dot(d.normalize()) > 0.0);
        }
    }

    #[test]
    fn tilted_tracker_palm_still_gives_orthonormal_axes() {
        // Palm pitched ~10° so the normal is not perpendicular to -Z.
        let hand = Hand::new(Side::Right, Vec3::new(0.0, 200.0, 0.0))
            .with_normal(Vec3::new(0.0, -0.985, -0.174));
        let (_, axes) = palm_in_device(&hand, &Alignment::default()).unwrap();
        assert_orthonormal(&axes);
        assert_abs_diff_eq!(axes.x.cross(axes.y).dot(axes.z), 1.0, epsilon = 1e-5);
    }

    #[test]
    fn axes_orthonormal_after_rotated_alignment() {
        let hand = Hand::new(Side::Right, Vec3::new(10.0, 180.0, -20.0));
        let (_, axes) = palm_in_device(&hand, &Alignment::default()).unwrap();
        assert_orthonormal(&axes);
    }

    #[test]
    fn identical_input_gives_identical_output() {
        let hand = Hand::new(Side::Right, Vec3::new(12.5, 201.0, -33.0))
            .with_normal(Vec3::new(0.05, -0.99, 0.1))
            .with_direction(Vec3::new(0.1, 0.02, -0.99));
        let a = Alignment::default();
        let first = target_position(&hand, &a).unwrap();
        for _ in 0..10 {
            assert_eq!(target_position(&hand, &a).unwrap(), first);
        }
    }

    #[test]
    fn parallel_normal_and_direction_is_degenerate() {
        let hand = Hand::new(Side::Left, Vec3::ZERO)
            .with_normal(Vec3::NEG_Y)
            .with_direction(Vec3::Y);
        assert_eq!(
            target_position(&hand, &Alignment::identity()),
            Err(FocusError::degenerate("palm normal parallel to direction")),
        );
    }

    #[test]
    fn zero_normal_is_degenerate() {
        let hand = Hand::new(Side::Left, Vec3::ZERO).with_normal(Vec3::ZERO);
        assert!(matches!(
            target_position(&hand, &Alignment::identity()),
            Err(FocusError::DegenerateFrame(_)),
        ));
    }

    #[test]
    fn nan_position_is_rejected() {
        let hand = Hand::new(Side::Left, Vec3::new(f32::NAN, 0.0, 0.0));
        assert!(matches!(
            target_position(&hand, &Alignment::default()),
            Err(FocusError::NonFinite { what: "palm position", .. }),
        ));
    }

    #[test]
    fn control_point_carries_defaults() {
        let hand = Hand::new(Side::Right, Vec3::new(0.0, 200.0, 0.0));
        let cp = control_point(&hand, &Alignment::default()).unwrap();
        assert_eq!(cp.intensity, 1.5);
        assert_eq!(cp.frequency, 200.0);
    }
}
