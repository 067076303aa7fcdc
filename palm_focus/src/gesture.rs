//! Push-gesture gate with hold hysteresis.
//!
//! A hand "presses" when its palm moves toward the screen faster than
//! [`PUSH_VELOCITY_Z`].  Once pressed, that side stays active for
//! [`HOLD_ITERATIONS`] further qualifying iterations and then auto-releases.
//! The gate is a pure function of `(GestureStates, Frame)`: the caller owns
//! the state and threads it from one iteration to the next.
//!
//! # Algorithm
//!
//! A hand is a *candidate* if `palm_velocity.z < push_velocity_z` or its side
//! is already pressed.  Two evaluation policies exist, see [`BranchMode`].

use crate::hand::{Frame, Hand, Side};

/// Palm velocity Z (tracking mm/s) below which a hand counts as pushing.
pub const PUSH_VELOCITY_Z: f32 = -90.0;

/// Held iterations after the press before a side auto-releases.
pub const HOLD_ITERATIONS: u32 = 40;

// ════════════════════════════════════════════════════════════════════════════
// State
// ════════════════════════════════════════════════════════════════════════════

/// Press state for one side.  `hold_count` is meaningful only while pressed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GestureState {
    pub pressed:    bool,
    pub hold_count: u32,
}

impl GestureState {
    fn press(&mut self) {
        self.pressed    = true;
        self.hold_count = 0;
    }
}

/// Both sides' press state.  Starts released.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GestureStates {
    pub left:  GestureState,
    pub right: GestureState,
}

impl GestureStates {
    pub fn get(&self, side: Side) -> &GestureState {
        match side {
            Side::Left  => &self.left,
            Side::Right => &self.right,
        }
    }

    pub fn get_mut(&mut self, side: Side) -> &mut GestureState {
        match side {
            Side::Left  => &mut self.left,
            Side::Right => &mut self.right,
        }
    }

    pub fn any_pressed(&self) -> bool {
        self.left.pressed || self.right.pressed
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Outcome
// ════════════════════════════════════════════════════════════════════════════

/// What the emitter should do, in order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GateAction {
    /// Render a point on `frame.hands[i]`.
    Emit(usize),
    /// Stop all emission.
    Stop,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    Pressed(Side),
    Released(Side),
}

/// Result of one gate evaluation.
#[derive(Clone, Debug, PartialEq)]
pub struct GateOutcome {
    /// State to pass into the next evaluation.
    pub states:      GestureStates,
    pub actions:     Vec<GateAction>,
    pub transitions: Vec<Transition>,
}

impl GateOutcome {
    /// Hand indices to emit on, in action order.
    pub fn emitted(&self) -> impl Iterator<Item = usize> + '_ {
        self.actions.iter().filter_map(|a| match a {
            GateAction::Emit(i) => Some(*i),
            GateAction::Stop    => None,
        })
    }

    pub fn stopped(&self) -> bool {
        self.actions.contains(&GateAction::Stop)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// GestureGate
// ════════════════════════════════════════════════════════════════════════════

/// How per-hand branches and releases are evaluated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BranchMode {
    /// Each side is evaluated once per iteration and released with
    /// `hold_count >= hold_iterations`, independent of the other side.
    #[default]
    Independent,

    /// One exclusive `left-new / left-held / right-new / right-held` chain
    /// per hand, followed after every hand by an exclusive `left else right`
    /// release test on `hold_count == hold_iterations`, and a stop whenever
    /// neither side is pressed.  Emission precedes the release test.
    ///
    /// Every hand in the frame is evaluated, so two hands reported with the
    /// same chirality advance that side twice per iteration, and a stop
    /// emitted for an early hand can be followed by a point for a later one.
    LegacyExclusive,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GateConfig {
    pub push_velocity_z: f32,
    pub hold_iterations: u32,
    pub mode:            BranchMode,
}

impl Default for GateConfig {
    fn default() -> Self {
        GateConfig {
            push_velocity_z: PUSH_VELOCITY_Z,
            hold_iterations: HOLD_ITERATIONS,
            mode:            BranchMode::Independent,
        }
    }
}

/// Decides, per iteration, which hands get a focal point.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GestureGate {
    config: GateConfig,
}

impl GestureGate {
    pub fn new(config: GateConfig) -> Self {
        GestureGate { config }
    }

    pub fn config(&self) -> &GateConfig { &self.config }

    fn is_pushing(&self, hand: &Hand) -> bool {
        hand.palm_velocity.z < self.config.push_velocity_z
    }

    /// Advance `states` by one frame.
    pub fn evaluate(&self, states: GestureStates, frame: &Frame) -> GateOutcome {
        match self.config.mode {
            BranchMode::Independent     => self.evaluate_independent(states, frame),
            BranchMode::LegacyExclusive => self.evaluate_legacy(states, frame),
        }
    }

    fn evaluate_independent(&self, mut states: GestureStates, frame: &Frame) -> GateOutcome {
        let mut transitions = Vec::new();
        let mut candidates  = Vec::with_capacity(2);

        for side in [Side::Left, Side::Right] {
            let Some(idx) = frame.first_of(side) else { continue };
            let state = states.get_mut(side);
            if !(self.is_pushing(&frame.hands[idx]) || state.pressed) {
                continue;
            }
            if state.pressed {
                state.hold_count += 1;
            } else {
                state.press();
                transitions.push(Transition::Pressed(side));
            }
            candidates.push(idx);
        }

        for side in [Side::Left, Side::Right] {
            let state = states.get_mut(side);
            if state.pressed && state.hold_count >= self.config.hold_iterations {
                state.pressed = false;
                transitions.push(Transition::Released(side));
            }
        }

        candidates.retain(|&i| states.get(frame.hands[i].side).pressed);
        candidates.sort_unstable();

        let actions = if candidates.is_empty() {
            vec![GateAction::Stop]
        } else {
            candidates.into_iter().map(GateAction::Emit).collect()
        };

        GateOutcome { states, actions, transitions }
    }

    fn evaluate_legacy(&self, mut states: GestureStates, frame: &Frame) -> GateOutcome {
        let mut transitions = Vec::new();
        let mut actions     = Vec::new();
        let hold            = self.config.hold_iterations;

        if frame.is_empty() {
            actions.push(GateAction::Stop);
            return GateOutcome { states, actions, transitions };
        }

        for (i, hand) in frame.hands.iter().enumerate() {
            let (lp, rp) = (states.left.pressed, states.right.pressed);
            let candidate = self.is_pushing(hand)
                || (lp && hand.is_left())
                || (rp && hand.is_right());

            if candidate {
                if !lp && hand.is_left() {
                    states.left.press();
                    transitions.push(Transition::Pressed(Side::Left));
                } else if lp && hand.is_left() {
                    states.left.hold_count += 1;
                } else if !rp && hand.is_right() {
                    states.right.press();
                    transitions.push(Transition::Pressed(Side::Right));
                } else if rp && hand.is_right() {
                    states.right.hold_count += 1;
                }
                actions.push(GateAction::Emit(i));
            }

            if states.left.pressed && states.left.hold_count == hold {
                states.left.pressed = false;
                transitions.push(Transition::Released(Side::Left));
            } else if states.right.pressed && states.right.hold_count == hold {
                states.right.pressed = false;
                transitions.push(Transition::Released(Side::Right));
            }

            if !states.any_pressed() {
                actions.push(GateAction::Stop);
            }
        }

        GateOutcome { states, actions, transitions }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn still(side: Side) -> Hand {
        Hand::new(side, Vec3::new(0.0, 200.0, 0.0))
    }

    fn pushing(side: Side) -> Hand {
        still(side).with_velocity(Vec3::new(0.0, 0.0, -300.0))
    }

    fn frame(hands: Vec<Hand>) -> Frame {
        Frame::new(0, hands)
    }

    fn legacy() -> GestureGate {
        GestureGate::new(GateConfig { mode: BranchMode::LegacyExclusive, ..GateConfig::default() })
    }

    #[test]
    fn empty_frame_stops() {
        let out = GestureGate::default().evaluate(GestureStates::default(), &Frame::empty(0));
        assert_eq!(out.actions, vec![GateAction::Stop]);
        assert!(out.transitions.is_empty());
    }

    #[test]
    fn still_hand_does_not_press() {
        let out = GestureGate::default()
            .evaluate(GestureStates::default(), &frame(vec![still(Side::Left)]));
        assert!(!out.states.left.pressed);
        assert_eq!(out.actions, vec![GateAction::Stop]);
    }

    #[test]
    fn exactly_at_threshold_is_not_a_push() {
        let hand = still(Side::Right).with_velocity(Vec3::new(0.0, 0.0, PUSH_VELOCITY_Z));
        let out = GestureGate::default()
            .evaluate(GestureStates::default(), &frame(vec![hand]));
        assert!(!out.states.right.pressed);
    }

    #[test]
    fn push_presses_and_emits() {
        let out = GestureGate::default()
            .evaluate(GestureStates::default(), &frame(vec![pushing(Side::Right)]));
        assert_eq!(out.states.right, GestureState { pressed: true, hold_count: 0 });
        assert_eq!(out.actions, vec![GateAction::Emit(0)]);
        assert_eq!(out.transitions, vec![Transition::Pressed(Side::Right)]);
    }

    #[test]
    fn pressed_side_holds_without_pushing() {
        let gate = GestureGate::default();
        let mut s = gate.evaluate(GestureStates::default(), &frame(vec![pushing(Side::Left)])).states;
        for n in 1..=5 {
            let out = gate.evaluate(s, &frame(vec![still(Side::Left)]));
            assert_eq!(out.states.left.hold_count, n);
            assert_eq!(out.actions, vec![GateAction::Emit(0)]);
            s = out.states;
        }
    }

    #[test]
    fn releases_after_hold_iterations() {
        let gate = GestureGate::default();
        let mut s = gate.evaluate(GestureStates::default(), &frame(vec![pushing(Side::Left)])).states;
        for _ in 1..HOLD_ITERATIONS {
            let out = gate.evaluate(s, &frame(vec![still(Side::Left)]));
            assert!(out.states.left.pressed);
            s = out.states;
        }
        let out = gate.evaluate(s, &frame(vec![still(Side::Left)]));
        assert!(!out.states.left.pressed);
        assert_eq!(out.transitions, vec![Transition::Released(Side::Left)]);
        assert_eq!(out.actions, vec![GateAction::Stop]);
    }

    #[test]
    fn repeated_push_during_hold_does_not_reset() {
        let gate = GestureGate::default();
        let mut s = GestureStates::default();
        for _ in 0..=HOLD_ITERATIONS {
            s = gate.evaluate(s, &frame(vec![pushing(Side::Right)])).states;
        }
        assert!(!s.right.pressed);
        // Still pushing on the next poll: a fresh press.
        let out = gate.evaluate(s, &frame(vec![pushing(Side::Right)]));
        assert_eq!(out.transitions, vec![Transition::Pressed(Side::Right)]);
    }

    #[test]
    fn sides_are_independent() {
        let gate = GestureGate::default();
        let s = GestureStates {
            left:  GestureState::default(),
            right: GestureState { pressed: true, hold_count: 7 },
        };
        let out = gate.evaluate(s, &frame(vec![pushing(Side::Left), still(Side::Right)]));
        assert_eq!(out.states.left,  GestureState { pressed: true, hold_count: 0 });
        assert_eq!(out.states.right, GestureState { pressed: true, hold_count: 8 });
        assert_eq!(out.actions, vec![GateAction::Emit(0), GateAction::Emit(1)]);
    }

    #[test]
    fn simultaneous_limits_release_both() {
        let gate = GestureGate::default();
        let held = GestureState { pressed: true, hold_count: HOLD_ITERATIONS - 1 };
        let s = GestureStates { left: held, right: held };
        let out = gate.evaluate(s, &frame(vec![still(Side::Right), still(Side::Left)]));
        assert!(!out.states.any_pressed());
        assert_eq!(out.transitions, vec![
            Transition::Released(Side::Left),
            Transition::Released(Side::Right),
        ]);
        assert!(out.stopped());
    }

    #[test]
    fn one_side_releasing_keeps_the_other_emitting() {
        let gate = GestureGate::default();
        let s = GestureStates {
            left:  GestureState { pressed: true, hold_count: HOLD_ITERATIONS - 1 },
            right: GestureState { pressed: true, hold_count: 3 },
        };
        let out = gate.evaluate(s, &frame(vec![still(Side::Left), still(Side::Right)]));
        assert_eq!(out.actions, vec![GateAction::Emit(1)]);
        assert!(!out.stopped());
    }

    #[test]
    fn duplicate_side_counts_once() {
        let gate = GestureGate::default();
        let out = gate.evaluate(
            GestureStates::default(),
            &frame(vec![pushing(Side::Left), pushing(Side::Left)]),
        );
        assert_eq!(out.states.left.hold_count, 0);
        assert_eq!(out.emitted().collect::<Vec<_>>(), vec![0]);
    }

    #[test]
    fn missing_hand_freezes_its_counter() {
        let gate = GestureGate::default();
        let s = GestureStates {
            left:  GestureState { pressed: true, hold_count: 10 },
            right: GestureState::default(),
        };
        let out = gate.evaluate(s, &frame(vec![still(Side::Right)]));
        assert_eq!(out.states.left.hold_count, 10);
        assert!(out.states.left.pressed);
        assert_eq!(out.actions, vec![GateAction::Stop]);
    }

    // ── legacy chain ──────────────────────────────────────────────────────

    #[test]
    fn legacy_emits_then_stops_on_release() {
        let gate = legacy();
        let s = GestureStates {
            left:  GestureState { pressed: true, hold_count: HOLD_ITERATIONS - 1 },
            right: GestureState::default(),
        };
        let out = gate.evaluate(s, &frame(vec![still(Side::Left)]));
        assert_eq!(out.actions, vec![GateAction::Emit(0), GateAction::Stop]);
        assert!(!out.states.left.pressed);
    }

    #[test]
    fn legacy_still_hand_stops_per_pass() {
        let out = legacy().evaluate(GestureStates::default(), &frame(vec![still(Side::Left)]));
        assert_eq!(out.actions, vec![GateAction::Stop]);
    }

    #[test]
    fn legacy_duplicate_side_counts_twice() {
        let s = GestureStates {
            left:  GestureState { pressed: true, hold_count: 0 },
            right: GestureState::default(),
        };
        let hands = frame(vec![still(Side::Left), still(Side::Left)]);
        assert_eq!(legacy().evaluate(s, &hands).states.left.hold_count, 2);
        assert_eq!(GestureGate::default().evaluate(s, &hands).states.left.hold_count, 1);
    }

    #[test]
    fn legacy_stop_can_precede_a_later_press() {
        let out = legacy().evaluate(
            GestureStates::default(),
            &frame(vec![still(Side::Left), pushing(Side::Right)]),
        );
        assert_eq!(out.actions, vec![GateAction::Stop, GateAction::Emit(1)]);
        assert!(out.states.right.pressed);
    }

    #[test]
    fn legacy_releases_on_the_pass_that_hits_the_limit() {
        let gate = legacy();
        let s = GestureStates {
            left:  GestureState { pressed: true, hold_count: HOLD_ITERATIONS - 2 },
            right: GestureState::default(),
        };
        let out = gate.evaluate(s, &frame(vec![still(Side::Left), still(Side::Left)]));
        assert!(!out.states.left.pressed);
        assert_eq!(out.transitions, vec![Transition::Released(Side::Left)]);
        assert_eq!(out.actions, vec![GateAction::Emit(0), GateAction::Emit(1), GateAction::Stop]);
    }

    #[test]
    fn legacy_matches_independent_for_a_single_hand() {
        let (ind, leg) = (GestureGate::default(), legacy());
        let (mut a, mut b) = (GestureStates::default(), GestureStates::default());
        let frames: Vec<Frame> = std::iter::once(frame(vec![pushing(Side::Left)]))
            .chain((0..60).map(|_| frame(vec![still(Side::Left)])))
            .collect();
        for f in &frames {
            a = ind.evaluate(a, f).states;
            b = leg.evaluate(b, f).states;
            assert_eq!(a.left.pressed, b.left.pressed);
        }
    }
}
