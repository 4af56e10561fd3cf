//! Software-rendered diagnostic overlay using `minifb`.
//!
//! Layout:
//!
//! ```text
//! ┌──────────────────────────────────────────┬──────────────────┐
//! │  CAMERA VIEW (frame space)               │  SCREEN          │
//! │   ┌ safe box ───────────────┐            │  [mini-map with  │
//! │   │   hand skeleton         │            │   cursor dot]    │
//! │   │   pinch line            │            │                  │
//! │   └─────────────────────────┘            │  fingers, mode   │
//! │                                          │  volume bar      │
//! ├──────────────────────────────────────────┴──────────────────┤
//! │  status: pinch distance, events                  key legend │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The window doubles as the simulator's input device: mouse position over
//! the camera view and the held keys are forwarded as [`SimInput`].

use std::sync::mpsc::Sender;

use minifb::{Key, KeyRepeat, MouseMode, Window, WindowOptions};

use hand_signal::driver::{FrameReport, Overlay};
use hand_signal::fingers::Finger;
use hand_signal::gesture::PinchPhase;
use hand_signal::landmark::{idx, HAND_CONNECTIONS};
use hand_signal::roi::{PixelRect, RoiMapper};
use hand_signal::{FilterState, GestureEvent, HandObservation};

use crate::source::{SimInput, SimKey};

// ════════════════════════════════════════════════════════════════════════════
// Layout constants
// ════════════════════════════════════════════════════════════════════════════

pub const WIN_W:      usize = 1000;
pub const WIN_H:      usize = 530;
const VIEW_W:         usize = 640;
const VIEW_H:         usize = 480;
const PANEL_X:        usize = VIEW_W + 20;
const MAP_W:          usize = 320;
const MAP_H:          usize = 180;
const MAP_Y:          usize = 30;
const BAR_X:          usize = PANEL_X + 280;
const BAR_Y:          usize = 240;
const BAR_W:          usize = 24;
const BAR_H:          usize = 200;
const STATUS_Y:       usize = VIEW_H;
const BG_COLOR:       u32   = 0xFF1A1A2E;
const VIEW_BG:        u32   = 0xFF101018;
const PANEL_BG:       u32   = 0xFF16213E;
const TEXT_BG:        u32   = 0xFF0F3460;
const SAFE_BOX:       u32   = 0xFFFF00FF;
const BONE_COLOR:     u32   = 0xFF00C8FF;
const JOINT_COLOR:    u32   = 0xFFFFFFFF;
const TIP_COLOR:      u32   = 0xFF00FF00;
const PINCH_COLOR:    u32   = 0xFFFFD700;
const CLICK_COLOR:    u32   = 0xFFFF4040;
const VOLUME_COLOR:   u32   = 0xFF40E0A0;
const DIM_TEXT:       u32   = 0xFF888888;

/// How long "CLICK" stays on screen after a click, seconds.
const CLICK_FLASH_S:  f64   = 0.3;

// ════════════════════════════════════════════════════════════════════════════
// Canvas: pixel buffer and primitives
// ════════════════════════════════════════════════════════════════════════════

/// ARGB pixel buffer with clipped drawing primitives.
pub struct Canvas {
    pub buf: Vec<u32>,
    pub w:   usize,
    pub h:   usize,
}

impl Canvas {
    pub fn new(w: usize, h: usize, color: u32) -> Self {
        Canvas { buf: vec![color; w * h], w, h }
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        (x < self.w && y < self.h).then(|| self.buf[y * self.w + x])
    }

    pub fn fill(&mut self, color: u32) {
        self.buf.fill(color);
    }

    pub fn set_pixel(&mut self, x: usize, y: usize, color: u32) {
        if x < self.w && y < self.h {
            self.buf[y * self.w + x] = color;
        }
    }

    fn set_signed(&mut self, x: isize, y: isize, color: u32) {
        if x >= 0 && y >= 0 {
            self.set_pixel(x as usize, y as usize, color);
        }
    }

    pub fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        for row in y..(y + h).min(self.h) {
            for col in x..(x + w).min(self.w) {
                self.buf[row * self.w + col] = color;
            }
        }
    }

    pub fn draw_border(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        if w == 0 || h == 0 {
            return;
        }
        for col in x..x + w {
            self.set_pixel(col, y, color);
            self.set_pixel(col, y + h - 1, color);
        }
        for row in y..y + h {
            self.set_pixel(x, row, color);
            self.set_pixel(x + w - 1, row, color);
        }
    }

    /// Bresenham line, clipped per pixel.
    pub fn draw_line(&mut self, from: (isize, isize), to: (isize, isize), color: u32) {
        let (mut x, mut y) = from;
        let dx = (to.0 - x).abs();
        let dy = -(to.1 - y).abs();
        let sx = if x < to.0 { 1 } else { -1 };
        let sy = if y < to.1 { 1 } else { -1 };
        let mut err = dx + dy;
        loop {
            self.set_signed(x, y, color);
            if (x, y) == to {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    pub fn draw_disc(&mut self, cx: isize, cy: isize, r: isize, color: u32) {
        for dy in -r..=r {
            for dx in -r..=r {
                if dx * dx + dy * dy <= r * r {
                    self.set_signed(cx + dx, cy + dy, color);
                }
            }
        }
    }

    /// 3×5 bitmap text, magnified by `scale`.
    pub fn draw_label(&mut self, text: &str, x: usize, y: usize, scale: usize, color: u32) {
        let scale = scale.max(1);
        let mut cx = x;
        for ch in text.chars() {
            let glyph = char_glyph(ch);
            for (row, &bits) in glyph.iter().enumerate() {
                for col in 0..3usize {
                    if bits & (1 << (2 - col)) != 0 {
                        self.fill_rect(cx + col * scale, y + row * scale, scale, scale, color);
                    }
                }
            }
            cx += 4 * scale;
            if cx + 4 * scale > self.w {
                break;
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Coordinate helpers
// ════════════════════════════════════════════════════════════════════════════

/// Normalized frame coordinates → camera-view pixel.
fn to_view(x: f64, y: f64) -> (isize, isize) {
    ((x * VIEW_W as f64).round() as isize, (y * VIEW_H as f64).round() as isize)
}

/// Frame-pixel rectangle → camera-view rectangle `(x, y, w, h)`.
fn rect_to_view(r: PixelRect, frame: (u32, u32)) -> (usize, usize, usize, usize) {
    let sx = VIEW_W as f64 / frame.0 as f64;
    let sy = VIEW_H as f64 / frame.1 as f64;
    let x0 = (r.x0 * sx).round().max(0.0) as usize;
    let y0 = (r.y0 * sy).round().max(0.0) as usize;
    let x1 = (r.x1 * sx).round().max(0.0) as usize;
    let y1 = (r.y1 * sy).round().max(0.0) as usize;
    (x0, y0, x1.saturating_sub(x0), y1.saturating_sub(y0))
}

/// Screen coordinates → mini-map pixel.
fn to_map(x: f64, y: f64, screen: (u32, u32)) -> (isize, isize) {
    let mx = PANEL_X as f64 + x / screen.0 as f64 * (MAP_W - 1) as f64;
    let my = MAP_Y as f64 + y / screen.1 as f64 * (MAP_H - 1) as f64;
    (mx.round() as isize, my.round() as isize)
}

fn margin_label(roi: &RoiMapper) -> String {
    format!("SAFE BOX  MARGIN {:.0}%", roi.margin() * 100.0)
}

fn last_click_label(state: &FilterState) -> String {
    match state.last_click_at() {
        Some(t) => format!("LAST CLICK {t:.2}S"),
        None    => "LAST CLICK -".to_string(),
    }
}

/// Filled height of the volume bar for a level in `[0, 1]`.
fn bar_fill(level: f64) -> usize {
    (level.clamp(0.0, 1.0) * BAR_H as f64).round() as usize
}

// ════════════════════════════════════════════════════════════════════════════
// Visualizer
// ════════════════════════════════════════════════════════════════════════════

/// Keys forwarded to the simulator while held.
const HELD_KEYS: [(Key, SimKey); 4] = [
    (Key::P, SimKey::Pinch),
    (Key::O, SimKey::OpenHand),
    (Key::C, SimKey::ClosedFist),
    (Key::H, SimKey::HideHand),
];

pub struct Visualizer {
    window:      Window,
    canvas:      Canvas,
    sim_tx:      Option<Sender<SimInput>>,
    held:        [bool; HELD_KEYS.len()],
    safe_box:    (usize, usize, usize, usize),
    roi_label:   String,
    screen:      (u32, u32),
    click_until: f64,
    last_event:  String,
}

impl Visualizer {
    /// `sim_tx` is `Some` when the simulator reads input from this window.
    pub fn new(
        sim_tx:   Option<Sender<SimInput>>,
        roi:      &RoiMapper,
        frame:    (u32, u32),
        screen:   (u32, u32),
    ) -> Result<Self, String> {
        let mut window = Window::new(
            "Hand Pointer — gesture overlay",
            WIN_W, WIN_H,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        ).map_err(|e| e.to_string())?;

        window.limit_update_rate(Some(std::time::Duration::from_millis(16))); // ~60fps

        Ok(Visualizer {
            window,
            canvas: Canvas::new(WIN_W, WIN_H, BG_COLOR),
            sim_tx,
            held: [false; HELD_KEYS.len()],
            safe_box: rect_to_view(roi.safe_box_px(f64::from(frame.0), f64::from(frame.1)), frame),
            roi_label: margin_label(roi),
            screen,
            click_until: f64::NEG_INFINITY,
            last_event: String::new(),
        })
    }

    /// Forward mouse and keys to the simulator.  Returns false on quit.
    fn poll_input(&mut self) -> bool {
        if !self.window.is_open() {
            return false;
        }
        if self.window.is_key_pressed(Key::Q, KeyRepeat::No)
            || self.window.is_key_pressed(Key::Escape, KeyRepeat::No)
        {
            return false;
        }

        let Some(tx) = self.sim_tx.as_ref() else {
            return true;
        };

        if let Some((mx, my)) = self.window.get_mouse_pos(MouseMode::Discard) {
            let (mx, my) = (mx as f64, my as f64);
            if mx < VIEW_W as f64 && my < VIEW_H as f64 {
                let _ = tx.send(SimInput::Pointer { x: mx / VIEW_W as f64, y: my / VIEW_H as f64 });
            }
        }

        for (k, &(key, sim)) in HELD_KEYS.iter().enumerate() {
            let down = self.window.is_key_down(key);
            if down != self.held[k] {
                self.held[k] = down;
                let _ = tx.send(if down { SimInput::KeyDown(sim) } else { SimInput::KeyUp(sim) });
            }
        }
        if self.window.is_key_pressed(Key::RightBracket, KeyRepeat::Yes) {
            let _ = tx.send(SimInput::KeyDown(SimKey::SpreadWider));
        }
        if self.window.is_key_pressed(Key::LeftBracket, KeyRepeat::Yes) {
            let _ = tx.send(SimInput::KeyDown(SimKey::SpreadNarrower));
        }
        true
    }

    /// Render one frame into the canvas.
    fn render(&mut self, report: &FrameReport<'_>) {
        if report.output.pinch == GestureEvent::ClickFired {
            self.click_until = report.at + CLICK_FLASH_S;
        }
        if let Some(ev) = report.output.events().next() {
            self.last_event = format!("{:.2}S  {}", report.at, ev.label());
        }

        let c = &mut self.canvas;
        c.fill(BG_COLOR);

        // ── Camera view ───────────────────────────────────────────────────
        c.fill_rect(0, 0, VIEW_W, VIEW_H, VIEW_BG);
        let (bx, by, bw, bh) = self.safe_box;
        c.draw_border(bx, by, bw, bh, SAFE_BOX);
        c.draw_label(&self.roi_label, bx + 4, by + bh + 4, 1, SAFE_BOX);

        if let Some(hand) = report.hand {
            draw_hand(c, hand, report);
        } else {
            c.draw_label("NO HAND", 10, 10, 2, DIM_TEXT);
        }
        if report.at < self.click_until {
            c.draw_label("CLICK", 10, 40, 4, CLICK_COLOR);
        }

        // ── Side panel ────────────────────────────────────────────────────
        c.fill_rect(VIEW_W, 0, WIN_W - VIEW_W, VIEW_H, PANEL_BG);
        draw_panel(c, report, self.screen);

        // ── Status bar ────────────────────────────────────────────────────
        c.fill_rect(0, STATUS_Y, WIN_W, WIN_H - STATUS_Y, TEXT_BG);
        let status = match report.output.readings {
            Some(r) => format!("PINCH {:.0} PX  {}", r.pinch_px, phase_label(r.pinch_phase)),
            None    => "PINCH -".to_string(),
        };
        c.draw_label(&status, 10, STATUS_Y + 8, 2, 0xFFEEEEEE);
        c.draw_label(&self.last_event, 360, STATUS_Y + 8, 2, PINCH_COLOR);

        // ── Key legend ────────────────────────────────────────────────────
        let legend = if self.sim_tx.is_some() {
            "MOUSE=INDEX TIP  P=PINCH  O=OPEN  C=FIST  [ ]=SPREAD  H=HIDE  Q/ESC=QUIT"
        } else {
            "Q/ESC=QUIT"
        };
        c.draw_label(legend, 10, WIN_H - 14, 1, DIM_TEXT);
    }
}

fn phase_label(phase: PinchPhase) -> &'static str {
    match phase {
        PinchPhase::Idle     => "IDLE",
        PinchPhase::Pinching => "PINCHING",
    }
}

fn draw_hand(c: &mut Canvas, hand: &HandObservation, report: &FrameReport<'_>) {
    for &(a, b) in HAND_CONNECTIONS.iter() {
        let pa = hand.point(a);
        let pb = hand.point(b);
        c.draw_line(to_view(pa.x, pa.y), to_view(pb.x, pb.y), BONE_COLOR);
    }
    for lm in hand.landmarks.iter() {
        let (x, y) = to_view(lm.x, lm.y);
        c.draw_disc(x, y, 2, JOINT_COLOR);
    }

    let thumb = hand.point(idx::THUMB_TIP);
    let index = hand.point(idx::INDEX_TIP);
    let pinching = report
        .output
        .readings
        .is_some_and(|r| r.pinch_phase == PinchPhase::Pinching);
    c.draw_line(
        to_view(thumb.x, thumb.y),
        to_view(index.x, index.y),
        if pinching { CLICK_COLOR } else { PINCH_COLOR },
    );
    let (ix, iy) = to_view(index.x, index.y);
    c.draw_disc(ix, iy, 5, TIP_COLOR);

    c.draw_label(hand.handedness.label(), 10, 10, 2, 0xFFAADDFF);
}

fn draw_panel(c: &mut Canvas, report: &FrameReport<'_>, screen: (u32, u32)) {
    // ── Screen mini-map ───────────────────────────────────────────────────
    c.draw_label("SCREEN", PANEL_X, MAP_Y - 14, 2, PINCH_COLOR);
    c.fill_rect(PANEL_X, MAP_Y, MAP_W, MAP_H, VIEW_BG);
    c.draw_border(PANEL_X, MAP_Y, MAP_W, MAP_H, DIM_TEXT);
    let (mx, my) = to_map(report.state.cursor_x, report.state.cursor_y, screen);
    c.draw_disc(mx, my, 4, TIP_COLOR);
    c.draw_label(
        &format!("{:.0}, {:.0}", report.state.cursor_x, report.state.cursor_y),
        PANEL_X,
        MAP_Y + MAP_H + 6,
        1,
        DIM_TEXT,
    );
    c.draw_label(&last_click_label(report.state), PANEL_X + 160, MAP_Y + MAP_H + 6, 1, DIM_TEXT);

    // ── Fingers ───────────────────────────────────────────────────────────
    let mut y = BAR_Y;
    if let Some(r) = report.output.readings {
        c.draw_label(&format!("FINGERS {}", r.fingers.count()), PANEL_X, y, 2, 0xFFEEEEEE);
        y += 20;
        for finger in Finger::ALL {
            let up = r.fingers.is_extended(finger);
            let color = if up { TIP_COLOR } else { DIM_TEXT };
            c.draw_label(
                &format!("{} {}", finger.name(), if up { "UP" } else { "DOWN" }),
                PANEL_X,
                y,
                2,
                color,
            );
            y += 16;
        }
    }

    // ── Mode and volume ───────────────────────────────────────────────────
    y += 10;
    let mode_on = report.state.mode_active();
    c.draw_label(
        if mode_on { "VOLUME MODE ON" } else { "VOLUME MODE OFF" },
        PANEL_X,
        y,
        2,
        if mode_on { VOLUME_COLOR } else { DIM_TEXT },
    );
    c.draw_label(
        &format!("VOL {}%", report.state.volume.last_issued),
        PANEL_X,
        y + 20,
        2,
        0xFFEEEEEE,
    );

    if mode_on {
        c.draw_border(BAR_X, BAR_Y, BAR_W, BAR_H, DIM_TEXT);
        let fill = bar_fill(report.state.volume.smoothed);
        c.fill_rect(BAR_X + 2, BAR_Y + BAR_H - fill, BAR_W - 4, fill.saturating_sub(1), VOLUME_COLOR);
    }
}

impl Overlay for Visualizer {
    fn present(&mut self, report: &FrameReport<'_>) {
        self.render(report);
        self.window
            .update_with_buffer(&self.canvas.buf, WIN_W, WIN_H)
            .ok();
    }

    fn stop_requested(&mut self) -> bool {
        !self.poll_input()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Minimal 3×5 bitmap font
// ────────────────────────────────────────────────────────────────────────────

fn char_glyph(c: char) -> [u8; 5] {
    match c {
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
        'a' | 'A' => [0b111, 0b101, 0b111, 0b101, 0b101],
        'b' | 'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'c' | 'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'd' | 'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'e' | 'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'f' | 'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'g' | 'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'h' | 'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'i' | 'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'j' | 'J' => [0b001, 0b001, 0b001, 0b101, 0b111],
        'k' | 'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'l' | 'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'm' | 'M' => [0b101, 0b111, 0b101, 0b101, 0b101],
        'n' | 'N' => [0b111, 0b101, 0b101, 0b101, 0b101],
        'o' | 'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'p' | 'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'q' | 'Q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'r' | 'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        's' | 'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        't' | 'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'u' | 'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'v' | 'V' => [0b101, 0b101, 0b101, 0b010, 0b010],
        'w' | 'W' => [0b101, 0b101, 0b101, 0b111, 0b101],
        'x' | 'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'y' | 'Y' => [0b101, 0b101, 0b111, 0b010, 0b010],
        'z' | 'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '%' => [0b101, 0b001, 0b010, 0b100, 0b101],
        '[' => [0b110, 0b100, 0b100, 0b100, 0b110],
        ']' => [0b011, 0b001, 0b001, 0b001, 0b011],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ',' => [0b000, 0b000, 0b000, 0b010, 0b100],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        '+' => [0b000, 0b010, 0b111, 0b010, 0b000],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        _   => [0b000, 0b000, 0b010, 0b000, 0b000], // fallback dot
    }
}
