//! Software-rendered monitor using `minifb`.
//!
//! Top-down view of device space, user at the bottom edge:
//!
//! ```text
//! ┌──────────────────────────────────────────────┬──────┐
//! │                 +y (away)                    │ H    │
//! │          ┌──────────────────┐                │ E    │
//! │          │  array   ◆ focal │   ○ palm       │ I    │
//! │   -x     │        ●         │     +x         │ G    │
//! │          └──────────────────┘                │ H    │
//! │                                              │ T    │
//! │  status bar                                  │      │
//! └──────────────────────────────────────────────┴──────┘
//! ```
//!
//! In simulation mode the same window owns the keyboard that drives
//! [`SimHands`]; each poll it sends one [`Frame`] to the
//! [`SimTrackingSource`](crate::tracking::SimTrackingSource).

use std::sync::mpsc::{Receiver, Sender};

use glam::Vec3;
use minifb::{Key, KeyRepeat, Window, WindowOptions};
use palm_focus::{Alignment, ControlPoint, Frame, GestureState, GestureStates, Side};

use crate::app::LoopStats;
use crate::emitter::{drain_events, EmitterEvent};
use crate::error::AppError;
use crate::tracking::SimHands;

// ════════════════════════════════════════════════════════════════════════════
// Layout constants
// ════════════════════════════════════════════════════════════════════════════

pub const WIN_W:       usize = 720;
pub const WIN_H:       usize = 520;
const PLAN_W:          usize = WIN_W - 80;
const PLAN_CX:         f32   = PLAN_W as f32 / 2.0;
const PLAN_CY:         f32   = 230.0;
/// Screen pixels per device metre.
const PX_PER_M:        f32   = 1400.0;
/// Emitter array half-width (metres).
const ARRAY_HALF_M:    f32   = 0.084;
const HEIGHT_X:        usize = PLAN_W + 30;
const HEIGHT_TOP:      usize = 30;
const HEIGHT_BOTTOM:   usize = 440;
const HEIGHT_MAX_M:    f32   = 0.5;
const STATUS_Y:        usize = WIN_H - 40;
const SIM_STEP_MM:     f32   = 4.0;

const BG_COLOR:        u32   = 0xFF1A1A2E;
const ARRAY_COLOR:     u32   = 0xFF2E4A62;
const GRID_COLOR:      u32   = 0xFF23233F;
const LEFT_COLOR:      u32   = 0xFF4FC3F7;
const RIGHT_COLOR:     u32   = 0xFFFFB74D;
const FOCAL_COLOR:     u32   = 0xFFFFD700;
const TEXT_BG:         u32   = 0xFF0F3460;

// ════════════════════════════════════════════════════════════════════════════
// Visualizer
// ════════════════════════════════════════════════════════════════════════════

pub struct Visualizer {
    window:    Window,
    buf:       Vec<u32>,
    /// `None` when frames come from real hardware.
    sim_tx:    Option<Sender<Frame>>,
    sim:       SimHands,
    events:    Receiver<EmitterEvent>,
    focal:     Vec<ControlPoint>,
    alignment: Alignment,
}

impl Visualizer {
    pub fn new(
        sim_tx:    Option<Sender<Frame>>,
        events:    Receiver<EmitterEvent>,
        alignment: Alignment,
    ) -> Result<Self, AppError> {
        let mut window = Window::new(
            "Leap Haptics — push to feel",
            WIN_W, WIN_H,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        ).map_err(|e| AppError::Window(e.to_string()))?;

        // The control loop sets the pace.
        window.limit_update_rate(None);

        Ok(Visualizer {
            window,
            buf: vec![BG_COLOR; WIN_W * WIN_H],
            sim_tx,
            sim: SimHands::default(),
            events,
            focal: Vec::new(),
            alignment,
        })
    }

    /// Poll the keyboard.  In simulation mode, also move the simulated
    /// hands and send this poll's frame.  Returns false on quit.
    pub fn poll_input(&mut self) -> bool {
        if !self.window.is_open() { return false; }
        if self.window.is_key_pressed(Key::Q, KeyRepeat::No)
            || self.window.is_key_pressed(Key::Escape, KeyRepeat::No)
        {
            return false;
        }

        let Some(tx) = &self.sim_tx else { return true };

        let down = |k: Key| self.window.is_key_down(k);
        let mut delta = Vec3::ZERO;
        if down(Key::Left)  { delta.x -= SIM_STEP_MM; }
        if down(Key::Right) { delta.x += SIM_STEP_MM; }
        if down(Key::Up)    { delta.z -= SIM_STEP_MM; }
        if down(Key::Down)  { delta.z += SIM_STEP_MM; }
        if down(Key::W)     { delta.y += SIM_STEP_MM; }
        if down(Key::S)     { delta.y -= SIM_STEP_MM; }
        let pushing = down(Key::Space);

        if self.window.is_key_pressed(Key::L, KeyRepeat::No) { self.sim.left  = !self.sim.left;  }
        if self.window.is_key_pressed(Key::R, KeyRepeat::No) { self.sim.right = !self.sim.right; }

        self.sim.nudge(delta);
        self.sim.pushing = pushing;
        send_sim_frame(tx, &mut self.sim)
    }

    /// Render one frame.
    pub fn render(&mut self, frame: &Frame, states: &GestureStates, stats: &LoopStats) {
        let events = drain_events(&self.events);
        if !events.is_empty() {
            self.focal = focal_points(&events);
        }

        self.buf.fill(BG_COLOR);

        // ── Plan view ─────────────────────────────────────────────────────
        self.draw_grid();
        let (ax, ay) = plan_to_screen(Vec3::new(-ARRAY_HALF_M, ARRAY_HALF_M, 0.0));
        let side_px = (2.0 * ARRAY_HALF_M * PX_PER_M) as usize;
        self.fill_rect(ax as usize, ay as usize, side_px, side_px, ARRAY_COLOR);
        self.draw_label("ARRAY", ax as usize + 4, ay as usize + 4, 0xFF7FA7C7);

        for hand in &frame.hands {
            let p     = self.alignment.position_tracking_to_device(hand.palm_position);
            let color = side_color(hand.side);
            let state = states.get(hand.side);
            let (sx, sy) = plan_to_screen(p);
            if state.pressed {
                self.fill_disc(sx, sy, 14, color);
            } else {
                self.draw_ring(sx, sy, 14, color);
            }
            self.draw_height_marker(p.z, color);
        }

        let focal = std::mem::take(&mut self.focal);
        for cp in &focal {
            let (sx, sy) = plan_to_screen(cp.position);
            self.draw_diamond(sx, sy, 6, FOCAL_COLOR);
            self.draw_height_marker(cp.position.z, FOCAL_COLOR);
        }
        self.focal = focal;

        // ── Height gauge ──────────────────────────────────────────────────
        self.draw_label("HEIGHT", PLAN_W + 12, 12, 0xFF888888);
        for y in HEIGHT_TOP..=HEIGHT_BOTTOM {
            self.set_pixel(HEIGHT_X, y, GRID_COLOR | 0xFF404040);
        }

        // ── Status bar ────────────────────────────────────────────────────
        self.fill_rect(0, STATUS_Y, WIN_W, WIN_H - STATUS_Y, TEXT_BG);
        let status = status_line(frame, states, stats, self.focal.len());
        self.draw_label(&status, 10, STATUS_Y + 8, 0xFFEEEEEE);

        let legend = if self.sim_tx.is_some() {
            "arrows=move  w/s=height  space=push  l/r=hands  q=quit"
        } else {
            "leap hardware  q=quit"
        };
        self.draw_label(legend, 10, WIN_H - 14, 0xFF888888);

        self.window.update_with_buffer(&self.buf, WIN_W, WIN_H).ok();
    }

    // ── Scene pieces ──────────────────────────────────────────────────────

    fn draw_grid(&mut self) {
        // 5 cm spacing.
        let step = (0.05 * PX_PER_M) as isize;
        let (cx, cy) = (PLAN_CX as isize, PLAN_CY as isize);
        for k in -6..=6isize {
            let x = cx + k * step;
            let y = cy + k * step;
            if (0..PLAN_W as isize).contains(&x) {
                for row in 0..STATUS_Y { self.set_pixel(x as usize, row, GRID_COLOR); }
            }
            if (0..STATUS_Y as isize).contains(&y) {
                for col in 0..PLAN_W { self.set_pixel(col, y as usize, GRID_COLOR); }
            }
        }
    }

    fn draw_height_marker(&mut self, z_m: f32, color: u32) {
        let y = height_to_screen(z_m);
        self.fill_rect(HEIGHT_X - 8, y.saturating_sub(1), 17, 3, color);
    }

    // ── Primitive drawing helpers ─────────────────────────────────────────

    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        for row in y..(y+h).min(WIN_H) {
            for col in x..(x+w).min(WIN_W) {
                self.buf[row * WIN_W + col] = color;
            }
        }
    }

    fn set_pixel(&mut self, x: usize, y: usize, color: u32) {
        if x < WIN_W && y < WIN_H {
            self.buf[y * WIN_W + x] = color;
        }
    }

    fn set_pixel_i(&mut self, x: isize, y: isize, color: u32) {
        if x >= 0 && y >= 0 { self.set_pixel(x as usize, y as usize, color); }
    }

    fn fill_disc(&mut self, cx: isize, cy: isize, r: isize, color: u32) {
        for dy in -r..=r {
            for dx in -r..=r {
                if dx*dx + dy*dy <= r*r { self.set_pixel_i(cx + dx, cy + dy, color); }
            }
        }
    }

    fn draw_ring(&mut self, cx: isize, cy: isize, r: isize, color: u32) {
        let inner = (r - 2) * (r - 2);
        for dy in -r..=r {
            for dx in -r..=r {
                let d = dx*dx + dy*dy;
                if d <= r*r && d >= inner { self.set_pixel_i(cx + dx, cy + dy, color); }
            }
        }
    }

    fn draw_diamond(&mut self, cx: isize, cy: isize, r: isize, color: u32) {
        for dy in -r..=r {
            let w = r - dy.abs();
            for dx in -w..=w { self.set_pixel_i(cx + dx, cy + dy, color); }
        }
    }

    /// Minimal bitmap font — 3×5 characters, 5 rows × 3 bits each.
    fn draw_label(&mut self, text: &str, x: usize, y: usize, color: u32) {
        let mut cx = x;
        for ch in text.chars() {
            for (row, &bits) in char_glyph(ch).iter().enumerate() {
                for col in 0..3usize {
                    if bits & (1 << (2 - col)) != 0 {
                        self.set_pixel(cx + col, y + row, color);
                    }
                }
            }
            cx += 4;
            if cx + 4 > WIN_W { break; }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Pure helpers
// ════════════════════════════════════════════════════════════════════════════

/// Device-space point → plan-view pixel (x right, +y up the screen).
fn plan_to_screen(p: Vec3) -> (isize, isize) {
    let x = PLAN_CX + p.x * PX_PER_M;
    let y = PLAN_CY - p.y * PX_PER_M;
    (x.round() as isize, y.round() as isize)
}

fn height_to_screen(z_m: f32) -> usize {
    let t = (z_m / HEIGHT_MAX_M).clamp(0.0, 1.0);
    HEIGHT_BOTTOM - (t * (HEIGHT_BOTTOM - HEIGHT_TOP) as f32) as usize
}

/// Points live after replaying `events` from an empty emitter.
fn focal_points(events: &[EmitterEvent]) -> Vec<ControlPoint> {
    let mut live = Vec::new();
    for e in events {
        match e {
            EmitterEvent::Update(p) => live.push(*p),
            EmitterEvent::Stop      => live.clear(),
        }
    }
    live
}

/// Send this poll's simulated frame.  False once the loop's source is gone.
fn send_sim_frame(tx: &Sender<Frame>, sim: &mut SimHands) -> bool {
    tx.send(sim.frame()).is_ok()
}

fn side_color(side: Side) -> u32 {
    match side {
        Side::Left  => LEFT_COLOR,
        Side::Right => RIGHT_COLOR,
    }
}

fn side_status(tag: &str, s: &GestureState) -> String {
    if s.pressed { format!("{}: held {}", tag, s.hold_count) } else { format!("{}: idle", tag) }
}

fn status_line(frame: &Frame, states: &GestureStates, stats: &LoopStats, live: usize) -> String {
    format!(
        "frame {}  hands {}  {}  {}  points {}  total {}",
        frame.id,
        frame.hands.len(),
        side_status("L", &states.left),
        side_status("R", &states.right),
        live,
        stats.points,
    )
}

fn char_glyph(c: char) -> [u8; 5] {
    match c.to_ascii_lowercase() {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'a' => [0b111, 0b101, 0b111, 0b101, 0b101],
        'b' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'c' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'd' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'e' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'f' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'g' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'h' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'i' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'j' => [0b001, 0b001, 0b001, 0b101, 0b111],
        'k' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'l' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'm' => [0b101, 0b111, 0b101, 0b101, 0b101],
        'n' => [0b111, 0b101, 0b101, 0b101, 0b101],
        'o' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'p' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'r' => [0b110, 0b101, 0b110, 0b101, 0b101],
        's' => [0b111, 0b100, 0b111, 0b001, 0b111],
        't' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'u' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'v' => [0b101, 0b101, 0b101, 0b010, 0b010],
        'w' => [0b101, 0b101, 0b101, 0b111, 0b101],
        'x' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'y' => [0b101, 0b101, 0b111, 0b010, 0b010],
        'z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        _   => [0b000, 0b000, 0b010, 0b000, 0b000],
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
