//! Hand tracking — from LeapMotion hardware, the keyboard simulator, or a
//! fixed script.
//!
//! The public interface is [`TrackingSource::next_frame`].  The control loop
//! doesn't need to know whether frames came from real hardware.

use std::collections::VecDeque;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

use glam::Vec3;
use palm_focus::{Frame, Hand, Side};

use crate::error::TrackingError;

// ════════════════════════════════════════════════════════════════════════════
// TrackingSource trait — unified interface for hw, sim and scripts
// ════════════════════════════════════════════════════════════════════════════

/// Anything that can hand the loop the latest [`Frame`].
///
/// Sources never block waiting for new data: if nothing new arrived since the
/// last call they return the previous frame again.
pub trait TrackingSource {
    fn next_frame(&mut self) -> Result<Frame, TrackingError>;
}

impl<T: TrackingSource + ?Sized> TrackingSource for Box<T> {
    fn next_frame(&mut self) -> Result<Frame, TrackingError> {
        (**self).next_frame()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// LeapTrackingSource — real hardware (feature = "leap")
// ════════════════════════════════════════════════════════════════════════════

/// Tracking source backed by a real LeapMotion controller.
///
/// Requires the `leap` feature flag and the LeapC shared library installed.
/// Each call drains whatever LeapC has queued (waiting at most
/// [`POLL_TIMEOUT_MS`](Self::POLL_TIMEOUT_MS) per message) and keeps the
/// newest tracking event.  A lost connection ends tracking with
/// [`TrackingError::Disconnected`].  A lost device clears the held frame and
/// is reported as [`TrackingError::Device`], as is a failed poll.
#[cfg(feature = "leap")]
pub struct LeapTrackingSource {
    connection: leaprs::Connection,
    last:       Frame,
    next_id:    u64,
}

#[cfg(feature = "leap")]
impl LeapTrackingSource {
    pub const POLL_TIMEOUT_MS: u32 = 1;

    /// Open the first LeapC connection.
    pub fn open() -> Result<Self, TrackingError> {
        use leaprs::{Connection, ConnectionConfig};

        let mut connection = Connection::create(ConnectionConfig::default())
            .map_err(|e| TrackingError::Device(format!("LeapC create: {:?}", e)))?;
        connection.open()
            .map_err(|e| TrackingError::Device(format!("LeapC open: {:?}", e)))?;

        tracing::info!("LeapC connection opened");
        Ok(LeapTrackingSource { connection, last: Frame::empty(0), next_id: 1 })
    }
}

#[cfg(feature = "leap")]
impl TrackingSource for LeapTrackingSource {
    fn next_frame(&mut self) -> Result<Frame, TrackingError> {
        use leaprs::{Error, Event, HandType};

        loop {
            let msg = match self.connection.poll(Self::POLL_TIMEOUT_MS) {
                Ok(m)               => m,
                Err(Error::Timeout) => break,
                Err(e) => {
                    tracing::warn!(error = ?e, "LeapC poll failed");
                    return Err(TrackingError::Device(format!("LeapC poll: {:?}", e)));
                }
            };
            match msg.event() {
                Event::ConnectionLost(..) => {
                    self.last = Frame::empty(self.next_id);
                    return Err(TrackingError::Disconnected);
                }
                // Don't replay a stale push while the device is away.
                Event::DeviceLost(..) => {
                    self.last = Frame::empty(self.next_id);
                    return Err(TrackingError::Device("LeapC device lost".into()));
                }
                Event::Tracking(frame) => {
                    let hands = frame.hands().map(|h| {
                        let side = if h.hand_type() == HandType::Left { Side::Left } else { Side::Right };
                        let palm = h.palm();
                        let (p, n, vel, d) =
                            (palm.position(), palm.normal(), palm.velocity(), palm.direction());
                        Hand {
                            side,
                            palm_position: Vec3::new(p.x,   p.y,   p.z),
                            palm_normal:   Vec3::new(n.x,   n.y,   n.z),
                            palm_velocity: Vec3::new(vel.x, vel.y, vel.z),
                            direction:     Vec3::new(d.x,   d.y,   d.z),
                        }
                    }).collect();

                    self.last = Frame::new(self.next_id, hands);
                    self.next_id += 1;
                }
                _ => {}
            }
        }

        Ok(self.last.clone())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SimTrackingSource — frames from the visualizer's simulated hands
// ════════════════════════════════════════════════════════════════════════════

/// Tracking source fed by the visualizer.  The visualizer builds a [`Frame`]
/// from keyboard state once per poll and sends it here; this source hands the
/// newest one to the loop.
pub struct SimTrackingSource {
    rx:   Receiver<Frame>,
    last: Frame,
}

impl SimTrackingSource {
    /// Create the source and the sender the visualizer writes to.
    pub fn new() -> (Self, Sender<Frame>) {
        let (tx, rx) = mpsc::channel();
        (SimTrackingSource { rx, last: Frame::empty(0) }, tx)
    }
}

impl TrackingSource for SimTrackingSource {
    fn next_frame(&mut self) -> Result<Frame, TrackingError> {
        loop {
            match self.rx.try_recv() {
                Ok(f)                           => self.last = f,
                Err(TryRecvError::Empty)        => break,
                Err(TryRecvError::Disconnected) => return Err(TrackingError::Disconnected),
            }
        }
        Ok(self.last.clone())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SimHands — keyboard-driven hand poses
// ════════════════════════════════════════════════════════════════════════════

/// Simulated palm state, edited by the visualizer's keys.
///
/// Both hands share one palm centre (tracking mm) and sit
/// [`HAND_SPREAD_MM`](Self::HAND_SPREAD_MM) either side of it, flat and palm
/// down.  While `pushing` is set they move toward the screen at
/// [`PUSH_SPEED_MM_S`](Self::PUSH_SPEED_MM_S).
#[derive(Clone, Debug)]
pub struct SimHands {
    pub centre:  Vec3,
    pub left:    bool,
    pub right:   bool,
    pub pushing: bool,
    next_id:     u64,
}

impl Default for SimHands {
    fn default() -> Self {
        SimHands {
            centre:  Vec3::new(0.0, 200.0, 0.0),
            left:    false,
            right:   true,
            pushing: false,
            next_id: 1,
        }
    }
}

impl SimHands {
    pub const HAND_SPREAD_MM:  f32 = 80.0;
    pub const PUSH_SPEED_MM_S: f32 = -300.0;
    /// Tracking volume the centre is clamped to.
    pub const MIN: Vec3 = Vec3::new(-200.0,  80.0, -200.0);
    pub const MAX: Vec3 = Vec3::new( 200.0, 450.0,  200.0);

    /// Move the palm centre, staying inside the tracking volume.
    pub fn nudge(&mut self, delta: Vec3) {
        self.centre = (self.centre + delta).clamp(Self::MIN, Self::MAX);
    }

    /// Snapshot the current pose as a frame with a fresh id.
    pub fn frame(&mut self) -> Frame {
        let velocity = if self.pushing {
            Vec3::new(0.0, 0.0, Self::PUSH_SPEED_MM_S)
        } else {
            Vec3::ZERO
        };
        let offset = Vec3::new(Self::HAND_SPREAD_MM, 0.0, 0.0);

        let mut hands = Vec::with_capacity(2);
        if self.left {
            hands.push(Hand::new(Side::Left, self.centre - offset).with_velocity(velocity));
        }
        if self.right {
            hands.push(Hand::new(Side::Right, self.centre + offset).with_velocity(velocity));
        }

        let id = self.next_id;
        self.next_id += 1;
        Frame::new(id, hands)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// ScriptedSource — a fixed frame sequence
// ════════════════════════════════════════════════════════════════════════════

/// Replays `frames` in order, then yields empty frames forever.
pub struct ScriptedSource {
    frames:  VecDeque<Frame>,
    next_id: u64,
}

impl ScriptedSource {
    pub fn new(frames: impl IntoIterator<Item = Frame>) -> Self {
        let frames: VecDeque<Frame> = frames.into_iter().collect();
        let next_id = frames.iter().map(|f| f.id + 1).max().unwrap_or(0);
        ScriptedSource { frames, next_id }
    }

    pub fn remaining(&self) -> usize { self.frames.len() }
}

impl TrackingSource for ScriptedSource {
    fn next_frame(&mut self) -> Result<Frame, TrackingError> {
        Ok(self.frames.pop_front().unwrap_or_else(|| {
            let f = Frame::empty(self.next_id);
            self.next_id += 1;
            f
        }))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
