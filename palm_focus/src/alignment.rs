//! Fixed tracking-space → device-space mapping.
//!
//! Tracking space is the sensor's frame (mm, +Y up, +Z toward the user).
//! Device space is the emitter array's frame (metres, origin at the array
//! centre, +Z up out of the array, +Y away from the user).

use std::f32::consts::FRAC_PI_2;

use glam::{Quat, Vec3};

/// Millimetres → metres.
pub const MM_TO_M: f32 = 1.0e-3;

/// A rigid transform with a uniform unit conversion, applied as
/// `device = rotation * (tracking * scale) + translation`.
///
/// # Example
///
/// ```
/// use glam::Vec3;
/// use palm_focus::Alignment;
///
/// let a = Alignment::default();
/// // 200 mm above the sensor is 0.2 m above the array.
/// let p = a.position_tracking_to_device(Vec3::new(0.0, 200.0, 0.0));
/// assert!((p - Vec3::new(0.0, 0.0, 0.2)).length() < 1e-6);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Alignment {
    pub rotation:    Quat,
    /// Sensor origin expressed in device space (metres).
    pub translation: Vec3,
    pub scale:       f32,
}

impl Default for Alignment {
    /// Sensor lying flat at the centre of the array, cable toward the user.
    fn default() -> Self {
        Alignment {
            rotation:    Quat::from_rotation_x(FRAC_PI_2),
            translation: Vec3::ZERO,
            scale:       MM_TO_M,
        }
    }
}

impl Alignment {
    /// Tracking and device coordinates coincide.
    pub const fn identity() -> Self {
        Alignment {
            rotation:    Quat::IDENTITY,
            translation: Vec3::ZERO,
            scale:       1.0,
        }
    }

    pub fn new(rotation: Quat, translation: Vec3, scale: f32) -> Self {
        Alignment { rotation: rotation.normalize(), translation, scale }
    }

    /// Map a point.  Applies scale, rotation and translation.
    pub fn position_tracking_to_device(&self, p: Vec3) -> Vec3 {
        self.rotation * (p * self.scale) + self.translation
    }

    /// Map a free vector.  Rotation only; the result is not re-normalised.
    pub fn direction_tracking_to_device(&self, d: Vec3) -> Vec3 {
        self.rotation * d
    }

    /// Inverse of [`position_tracking_to_device`](Self::position_tracking_to_device).
    pub fn position_device_to_tracking(&self, p: Vec3) -> Vec3 {
        (self.rotation.inverse() * (p - self.translation)) / self.scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn identity_is_a_no_op() {
        let a = Alignment::identity();
        let p = Vec3::new(1.0, -2.0, 3.5);
        assert_eq!(a.position_tracking_to_device(p), p);
        assert_eq!(a.direction_tracking_to_device(p), p);
    }

    #[test]
    fn default_maps_up_to_up() {
        let a = Alignment::default();
        let up = a.direction_tracking_to_device(Vec3::Y);
        assert_abs_diff_eq!(up.z, 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(up.y, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn default_maps_toward_user_to_negative_y() {
        let a = Alignment::default();
        let d = a.direction_tracking_to_device(Vec3::Z);
        assert_abs_diff_eq!(d.y, -1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(d.z,  0.0, epsilon = 1e-6);
    }

    #[test]
    fn default_converts_millimetres() {
        let a = Alignment::default();
        let p = a.position_tracking_to_device(Vec3::new(50.0, 0.0, 0.0));
        assert_abs_diff_eq!(p.x, 0.05, epsilon = 1e-6);
    }

    #[test]
    fn directions_ignore_scale_and_translation() {
        let a = Alignment::new(Quat::IDENTITY, Vec3::new(0.0, 0.0, 0.1), MM_TO_M);
        assert_eq!(a.direction_tracking_to_device(Vec3::X), Vec3::X);
    }

    #[test]
    fn inverse_round_trips_a_mounted_offset() {
        let a = Alignment::new(
            Quat::from_rotation_x(FRAC_PI_2),
            Vec3::new(0.0, 0.121, 0.0),
            MM_TO_M,
        );
        let t = Vec3::new(-30.0, 180.0, 40.0);
        let back = a.position_device_to_tracking(a.position_tracking_to_device(t));
        assert!(back.abs_diff_eq(t, 1e-3));
    }
}
