//! Error types for palm geometry.

use glam::Vec3;
use thiserror::Error;

/// Failures while turning a tracked hand into a device-space target.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FocusError {
    /// The palm normal / direction pair cannot span an orthonormal frame.
    #[error("degenerate palm frame: {0}")]
    DegenerateFrame(&'static str),

    /// A tracked vector contained NaN or infinity.
    #[error("non-finite {what}: {value}")]
    NonFinite {
        /// Which hand field was bad.
        what: &'static str,
        /// The offending value.
        value: Vec3,
    },
}

impl FocusError {
    /// Creates a degenerate-frame error.
    #[must_use]
    pub const fn degenerate(reason: &'static str) -> Self {
        Self::DegenerateFrame(reason)
    }

    /// Creates a non-finite input error.
    #[must_use]
    pub const fn non_finite(what: &'static str, value: Vec3) -> Self {
        Self::NonFinite { what, value }
    }
}

/// Result alias for palm geometry.
pub type Result<T> = std::result::Result<T, FocusError>;
