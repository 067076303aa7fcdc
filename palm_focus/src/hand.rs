//! Tracked hands and frames, in tracking-device space.
//!
//! Units follow the Leap convention: millimetres for positions, mm/s for
//! velocities, unit-ish vectors for the normal and the finger direction.
//! The tracking origin sits on the sensor, +Y up, +Z toward the user.

use glam::Vec3;

// ════════════════════════════════════════════════════════════════════════════
// Side
// ════════════════════════════════════════════════════════════════════════════

/// Which hand a tracked [`Hand`] belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn name(self) -> &'static str {
        match self {
            Side::Left  => "left",
            Side::Right => "right",
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Hand
// ════════════════════════════════════════════════════════════════════════════

/// One tracked hand pose.  Read-only once produced by a tracking source.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hand {
    pub side:          Side,
    /// Palm centre (mm).
    pub palm_position: Vec3,
    /// Points out of the palm, i.e. downward for a flat, face-down hand.
    pub palm_normal:   Vec3,
    /// Palm velocity (mm/s).  A push toward the screen is negative Z.
    pub palm_velocity: Vec3,
    /// From the palm centre toward the fingers.
    pub direction:     Vec3,
}

impl Hand {
    /// A resting, palm-down hand at `palm_position` with fingers pointing
    /// away from the user.
    pub fn new(side: Side, palm_position: Vec3) -> Self {
        Hand {
            side,
            palm_position,
            palm_normal:   Vec3::NEG_Y,
            palm_velocity: Vec3::ZERO,
            direction:     Vec3::NEG_Z,
        }
    }

    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.palm_velocity = velocity;
        self
    }

    pub fn with_normal(mut self, normal: Vec3) -> Self {
        self.palm_normal = normal;
        self
    }

    pub fn with_direction(mut self, direction: Vec3) -> Self {
        self.direction = direction;
        self
    }

    pub fn is_left(&self)  -> bool { self.side == Side::Left  }
    pub fn is_right(&self) -> bool { self.side == Side::Right }
}

// ════════════════════════════════════════════════════════════════════════════
// Frame
// ════════════════════════════════════════════════════════════════════════════

/// Snapshot of every hand visible in one poll.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Frame {
    pub id:    u64,
    pub hands: Vec<Hand>,
}

impl Frame {
    pub fn new(id: u64, hands: Vec<Hand>) -> Self {
        Frame { id, hands }
    }

    pub fn empty(id: u64) -> Self {
        Frame { id, hands: Vec::new() }
    }

    pub fn is_empty(&self) -> bool { self.hands.is_empty() }

    /// Index of the first hand on `side`, if any.  Trackers occasionally
    /// report two hands with the same chirality; later ones are ignored.
    pub fn first_of(&self, side: Side) -> Option<usize> {
        self.hands.iter().position(|h| h.side == side)
    }
}
