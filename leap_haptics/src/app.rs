//! The control loop: poll → gate → target → emit → sleep.
//!
//! [`ControlLoop`] owns one tracking source, one emitter and the two-sided
//! gesture state.  [`ControlLoop::step`] runs a single iteration without
//! sleeping; [`ControlLoop::run`] repeats it at the poll interval until a
//! [`StopSignal`] fires.  [`run`] wires the loop to the visualizer.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use palm_focus::{
    target, Alignment, Frame, GateAction, GateConfig, GestureGate, GestureStates,
    Transition, FREQUENCY_HZ, INTENSITY,
};
use tracing::{debug, error, info, warn};

use crate::emitter::{ChannelEmitter, HapticEmitter};
use crate::error::{AppError, Result, TrackingError};
use crate::tracking::TrackingSource;
use crate::visualizer::Visualizer;

/// Sleep between iterations.  Caps the loop near 100 Hz; not a frame rate.
pub const POLL_INTERVAL: Duration = Duration::from_millis(10);

// ════════════════════════════════════════════════════════════════════════════
// AppConfig
// ════════════════════════════════════════════════════════════════════════════

/// Compile-time configuration for the loop.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AppConfig {
    pub poll_interval: Duration,
    pub gate:          GateConfig,
    pub alignment:     Alignment,
    pub intensity:     f32,
    /// Hz.
    pub frequency:     f32,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            poll_interval: POLL_INTERVAL,
            gate:          GateConfig::default(),
            alignment:     Alignment::default(),
            intensity:     INTENSITY,
            frequency:     FREQUENCY_HZ,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// StopSignal
// ════════════════════════════════════════════════════════════════════════════

/// Cloneable cancellation flag, checked once per iteration.
#[derive(Clone, Debug, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn new() -> Self { Self::default() }

    pub fn stop(&self)            { self.0.store(true, Ordering::SeqCst); }
    pub fn is_stopped(&self) -> bool { self.0.load(Ordering::SeqCst) }
}

// ════════════════════════════════════════════════════════════════════════════
// Reports
// ════════════════════════════════════════════════════════════════════════════

/// What one iteration did.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StepReport {
    pub frame_id:    u64,
    /// Points accepted by the emitter.
    pub submitted:   usize,
    /// Qualifying hands dropped for degenerate geometry.
    pub skipped:     usize,
    pub stopped:     bool,
    pub transitions: Vec<Transition>,
}

/// Running totals since the loop was created.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoopStats {
    pub iterations:      u64,
    pub points:          u64,
    pub stops:           u64,
    pub presses:         u64,
    pub releases:        u64,
    pub skipped_hands:   u64,
    pub emitter_errors:  u64,
    pub tracking_errors: u64,
}

// ════════════════════════════════════════════════════════════════════════════
// ControlLoop
// ════════════════════════════════════════════════════════════════════════════

pub struct ControlLoop<S, E> {
    source:     S,
    emitter:    E,
    gate:       GestureGate,
    states:     GestureStates,
    config:     AppConfig,
    last_frame: Frame,
    stats:      LoopStats,
}

impl<S: TrackingSource, E: HapticEmitter> ControlLoop<S, E> {
    pub fn new(source: S, emitter: E, config: AppConfig) -> Self {
        ControlLoop {
            source,
            emitter,
            gate:       GestureGate::new(config.gate),
            states:     GestureStates::default(),
            config,
            last_frame: Frame::default(),
            stats:      LoopStats::default(),
        }
    }

    // ── one iteration ─────────────────────────────────────────────────────

    /// Fetch a frame, run the gate, and drive the emitter.  Does not sleep.
    ///
    /// Emitter failures and degenerate hands are logged and counted; only a
    /// tracking failure aborts the step.
    pub fn step(&mut self) -> Result<StepReport> {
        let frame = match self.source.next_frame() {
            Ok(f)  => f,
            Err(e) => {
                self.stats.tracking_errors += 1;
                return Err(e.into());
            }
        };

        let outcome = self.gate.evaluate(self.states, &frame);
        self.states = outcome.states;

        let mut report = StepReport {
            frame_id:    frame.id,
            transitions: outcome.transitions.clone(),
            ..StepReport::default()
        };

        for t in &outcome.transitions {
            match t {
                Transition::Pressed(side) => {
                    self.stats.presses += 1;
                    info!(side = side.name(), frame = frame.id, "push pressed");
                }
                Transition::Released(side) => {
                    self.stats.releases += 1;
                    info!(side = side.name(), frame = frame.id, "push released");
                }
            }
        }

        for action in &outcome.actions {
            match *action {
                GateAction::Emit(i) => {
                    let hand = &frame.hands[i];
                    let point = target::control_point_with(
                        hand, &self.config.alignment, self.config.intensity, self.config.frequency,
                    );
                    match point {
                        Ok(p) => {
                            if self.send_update(&p) { report.submitted += 1; }
                        }
                        Err(e) => {
                            warn!(side = hand.side.name(), error = %e, "skipping hand");
                            report.skipped += 1;
                        }
                    }
                }
                GateAction::Stop => {
                    self.send_stop();
                    report.stopped = true;
                }
            }
        }

        // Every qualifying hand was dropped: don't leave the last point live.
        if report.skipped > 0 && report.submitted == 0 && !report.stopped {
            self.send_stop();
            report.stopped = true;
        }

        self.stats.iterations    += 1;
        self.stats.points        += report.submitted as u64;
        self.stats.skipped_hands += report.skipped as u64;
        if report.stopped { self.stats.stops += 1; }

        self.last_frame = frame;
        Ok(report)
    }

    fn send_update(&mut self, p: &palm_focus::ControlPoint) -> bool {
        match self.emitter.update(p) {
            Ok(()) => {
                debug!(x = p.position.x, y = p.position.y, z = p.position.z, "point submitted");
                true
            }
            Err(e) => {
                self.stats.emitter_errors += 1;
                warn!(error = %e, "emitter update failed");
                false
            }
        }
    }

    fn send_stop(&mut self) {
        if let Err(e) = self.emitter.stop() {
            self.stats.emitter_errors += 1;
            warn!(error = %e, "emitter stop failed");
        }
    }

    // ── the loop ──────────────────────────────────────────────────────────

    /// Run until `stop` fires or tracking disconnects.
    pub fn run(&mut self, stop: &StopSignal) -> Result<LoopStats> {
        self.run_with(stop, |_, _| {})
    }

    /// Like [`run`](Self::run), calling `after_step` after every iteration
    /// (including ones lost to a transient tracking error).
    ///
    /// The emitter is stopped once on the way out, whatever the reason.
    pub fn run_with<F>(&mut self, stop: &StopSignal, mut after_step: F) -> Result<LoopStats>
    where
        F: FnMut(&Self, &StepReport),
    {
        info!(interval_ms = self.config.poll_interval.as_millis() as u64, "control loop started");

        let result = loop {
            if stop.is_stopped() { break Ok(()); }

            let report = match self.step() {
                Ok(r) => r,
                Err(AppError::Tracking(TrackingError::Device(msg))) => {
                    warn!(error = %msg, "tracking error, skipping iteration");
                    StepReport::default()
                }
                Err(e) => break Err(e),
            };
            after_step(&*self, &report);

            thread::sleep(self.config.poll_interval);
        };

        self.send_stop();
        match &result {
            Ok(())  => info!(iterations = self.stats.iterations, "control loop stopped"),
            Err(e)  => error!(error = %e, "control loop aborted"),
        }
        result.map(|()| self.stats)
    }

    // ── accessors ─────────────────────────────────────────────────────────

    pub fn states(&self)     -> &GestureStates { &self.states }
    pub fn stats(&self)      -> &LoopStats     { &self.stats }
    pub fn last_frame(&self) -> &Frame         { &self.last_frame }
    pub fn config(&self)     -> &AppConfig     { &self.config }
    pub fn emitter(&self)    -> &E             { &self.emitter }
}

// ════════════════════════════════════════════════════════════════════════════
// run() — the application entry
// ════════════════════════════════════════════════════════════════════════════

/// Run the full application.
///
/// This is the entry point called from `main.rs`.  It opens the tracking
/// source (simulation by default, hardware with `--features leap`) and the
/// visualizer, and drives the loop on the window thread until the window
/// closes or `Q` is pressed.
pub fn run(cfg: AppConfig) -> Result<()> {
    let stop = StopSignal::new();
    let (emitter, events) = ChannelEmitter::new();

    #[cfg(not(feature = "leap"))]
    let (source, sim_tx) = {
        let (source, tx) = crate::tracking::SimTrackingSource::new();
        (source, Some(tx))
    };
    #[cfg(feature = "leap")]
    let (source, sim_tx) = (crate::tracking::LeapTrackingSource::open()?, None);

    let mut vis = match Visualizer::new(sim_tx, events, cfg.alignment) {
        Ok(v)  => v,
        #[cfg(feature = "leap")]
        Err(e) => {
            warn!(error = %e, "no display, running headless");
            return run_headless(source, cfg, &stop);
        }
        #[cfg(not(feature = "leap"))]
        Err(e) => return Err(e),
    };

    let mut control = ControlLoop::new(source, emitter, cfg);
    let stats = control.run_with(&stop, |ctl, _| {
        if !vis.poll_input() {
            stop.stop();
            return;
        }
        vis.render(ctl.last_frame(), ctl.states(), ctl.stats());
    })?;

    info!(
        presses = stats.presses, releases = stats.releases, points = stats.points,
        "session summary"
    );
    Ok(())
}

/// Hardware tracking with no window: log the points, run until killed.
#[cfg(feature = "leap")]
fn run_headless<S: TrackingSource>(source: S, cfg: AppConfig, stop: &StopSignal) -> Result<()> {
    let mut control = ControlLoop::new(source, crate::emitter::LogEmitter::default(), cfg);
    control.run(stop).map(|_| ())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
