//! # palm_focus
//!
//! The hardware-free half of push-gated palm haptics: a hand/frame model in
//! tracking space, a fixed tracking → device [`Alignment`], the push
//! [`GestureGate`] with its hold hysteresis, and the geometry that places a
//! focal point 2 cm × 2 cm off the centre of the palm.
//!
//! Nothing in this crate talks to a sensor or an emitter.  The application
//! crate feeds it [`Frame`]s and turns its [`GateAction`]s into emitter calls.
//!
//! ## Quick start
//!
//! ```rust
//! use glam::Vec3;
//! use palm_focus::{Alignment, Frame, GestureGate, GestureStates, Hand, Side, target};
//!
//! let gate      = GestureGate::default();
//! let alignment = Alignment::default();
//!
//! // A right hand 200 mm above the sensor, palm down, pushing forward.
//! let hand = Hand::new(Side::Right, Vec3::new(0.0, 200.0, 0.0))
//!     .with_velocity(Vec3::new(0.0, 0.0, -300.0));
//! let frame = Frame::new(1, vec![hand]);
//!
//! let outcome = gate.evaluate(GestureStates::default(), &frame);
//! assert!(outcome.states.right.pressed);
//!
//! for i in outcome.emitted() {
//!     let point = target::control_point(&frame.hands[i], &alignment).unwrap();
//!     assert!((point.position.z - 0.2).abs() < 1e-4);
//! }
//! ```

pub mod alignment;
pub mod error;
pub mod gesture;
pub mod hand;
pub mod target;

pub use alignment::Alignment;
pub use error::{FocusError, Result};
pub use gesture::{
    BranchMode, GateAction, GateConfig, GateOutcome, GestureGate, GestureState,
    GestureStates, Transition, HOLD_ITERATIONS, PUSH_VELOCITY_Z,
};
pub use hand::{Frame, Hand, Side};
pub use target::{ControlPoint, PalmAxes, FREQUENCY_HZ, INTENSITY, PALM_OFFSET_M};
