//! Haptic output — the consuming end of the control loop.
//!
//! The loop only ever needs two operations: place a focal point, or stop.
//! Backends implement [`HapticEmitter`]; the loop does not know whether the
//! points reach an array, a log, or the visualizer.

use std::sync::mpsc::{self, Receiver, Sender};

use palm_focus::ControlPoint;
use tracing::debug;

use crate::error::EmitterError;

// ════════════════════════════════════════════════════════════════════════════
// HapticEmitter trait
// ════════════════════════════════════════════════════════════════════════════

/// A fire-and-forget focal-point sink.
pub trait HapticEmitter {
    /// Render `point` until the next update or stop.
    fn update(&mut self, point: &ControlPoint) -> Result<(), EmitterError>;
    /// Cease all emission.
    fn stop(&mut self) -> Result<(), EmitterError>;
}

impl<E: HapticEmitter + ?Sized> HapticEmitter for Box<E> {
    fn update(&mut self, point: &ControlPoint) -> Result<(), EmitterError> {
        (**self).update(point)
    }
    fn stop(&mut self) -> Result<(), EmitterError> {
        (**self).stop()
    }
}

// ── null backend ──────────────────────────────────────────────────────────

/// Discards every command.
pub struct NullEmitter;

impl HapticEmitter for NullEmitter {
    fn update(&mut self, _p: &ControlPoint) -> Result<(), EmitterError> { Ok(()) }
    fn stop(&mut self) -> Result<(), EmitterError>                       { Ok(()) }
}

// ── log backend ───────────────────────────────────────────────────────────

/// Traces every command; used when running headless against real tracking.
#[derive(Default)]
pub struct LogEmitter {
    active: bool,
}

impl HapticEmitter for LogEmitter {
    fn update(&mut self, p: &ControlPoint) -> Result<(), EmitterError> {
        self.active = true;
        debug!(
            x = p.position.x, y = p.position.y, z = p.position.z,
            intensity = p.intensity, frequency = p.frequency,
            "focal point"
        );
        Ok(())
    }

    fn stop(&mut self) -> Result<(), EmitterError> {
        if std::mem::take(&mut self.active) {
            debug!("emission stopped");
        }
        Ok(())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// ChannelEmitter — forwards commands to the visualizer
// ════════════════════════════════════════════════════════════════════════════

/// A command as seen by a monitor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EmitterEvent {
    Update(ControlPoint),
    Stop,
}

/// Sends each command over a channel, so the visualizer can draw what the
/// array would render.
pub struct ChannelEmitter {
    tx: Sender<EmitterEvent>,
}

impl ChannelEmitter {
    /// Create the emitter and the receiving end for the monitor.
    pub fn new() -> (Self, Receiver<EmitterEvent>) {
        let (tx, rx) = mpsc::channel();
        (ChannelEmitter { tx }, rx)
    }
}

impl HapticEmitter for ChannelEmitter {
    fn update(&mut self, point: &ControlPoint) -> Result<(), EmitterError> {
        self.tx.send(EmitterEvent::Update(*point)).map_err(|_| EmitterError::Disconnected)
    }
    fn stop(&mut self) -> Result<(), EmitterError> {
        self.tx.send(EmitterEvent::Stop).map_err(|_| EmitterError::Disconnected)
    }
}

/// Drain any pending emitter events (non-blocking).
pub fn drain_events(rx: &Receiver<EmitterEvent>) -> Vec<EmitterEvent> {
    let mut out = Vec::new();
    while let Ok(e) = rx.try_recv() { out.push(e); }
    out
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
