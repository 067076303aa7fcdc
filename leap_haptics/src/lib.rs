//! # leap_haptics
//!
//! LeapMotion push-gesture controller for a mid-air haptic emitter.  Each
//! poll reads the tracked hands, runs them through the push gate from
//! [`palm_focus`], and places one focal point 2 cm × 2 cm off the centre of
//! every qualifying palm.
//!
//! ## Gesture → Action mapping
//!
//! | Gesture | Hand | Action |
//! |---|---|---|
//! | Push toward screen (v_z < −90 mm/s) | Either | Press that side; focal point on the palm |
//! | Keep hand in view after a press | Same | Hold; focal point follows the palm |
//! | 40 held polls | Same | Auto-release that side |
//! | No pressed hand in view | — | Emitter stopped |
//!
//! ## Modes
//!
//! * **Simulation** (default): the visualizer window drives two simulated
//!   hands from the keyboard.
//! * **Hardware** (`--features leap`): frames come from LeapC via `leaprs`.
//!
//! In both modes the emitted points are forwarded to the visualizer over a
//! channel; [`emitter::HapticEmitter`] is the seam for a real array driver.

pub mod app;
pub mod emitter;
pub mod error;
pub mod tracking;
pub mod visualizer;

pub use app::{AppConfig, ControlLoop, LoopStats, StepReport, StopSignal};
pub use emitter::{ChannelEmitter, EmitterEvent, HapticEmitter, LogEmitter, NullEmitter};
pub use error::{AppError, EmitterError, TrackingError};
pub use tracking::{ScriptedSource, SimHands, SimTrackingSource, TrackingSource};

#[cfg(feature = "leap")]
pub use tracking::LeapTrackingSource;
