//! Error types for the tracking → emitter pipeline.

use thiserror::Error;

/// Failures reported by a [`TrackingSource`](crate::tracking::TrackingSource).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrackingError {
    /// The sensor or its feeding channel is gone for good.
    #[error("tracking source disconnected")]
    Disconnected,

    /// A transient driver-level failure; the next poll may succeed.
    #[error("tracking device error: {0}")]
    Device(String),
}

/// Failures reported by a [`HapticEmitter`](crate::emitter::HapticEmitter).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmitterError {
    #[error("haptic emitter disconnected")]
    Disconnected,

    #[error("haptic emitter error: {0}")]
    Device(String),
}

/// Top-level application error.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Tracking(#[from] TrackingError),

    #[error(transparent)]
    Emitter(#[from] EmitterError),

    #[error("window error: {0}")]
    Window(String),
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracking_error_converts() {
        let e: AppError = TrackingError::Disconnected.into();
        assert_eq!(e.to_string(), "tracking source disconnected");
    }

    #[test]
    fn device_error_keeps_message() {
        let e = EmitterError::Device("array over temperature".into());
        assert_eq!(e.to_string(), "haptic emitter error: array over temperature");
    }
}
