//! Hand sources: a simulated hand driven by the keyboard and mouse, or LeapMotion hardware.
//!
//! Both deliver frames that already are landmark sets, so either pairs with
//! [`hand_signal::driver::PassThrough`] as the detector.  Consumers don't
//! need to know whether a hand came from real hardware or the simulator.

use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::Instant;

use hand_signal::driver::{Captured, FrameSource};
use hand_signal::landmark::{idx, LANDMARK_COUNT};
use hand_signal::{HandObservation, Handedness, Landmark, SourceError};

// ════════════════════════════════════════════════════════════════════════════
// SimInput: raw events from the window
// ════════════════════════════════════════════════════════════════════════════

/// Raw input event from the simulation window.
#[derive(Clone, Debug, PartialEq)]
pub enum SimInput {
    /// Mouse over the camera view, in normalized frame coordinates.
    Pointer { x: f64, y: f64 },
    KeyDown(SimKey),
    KeyUp(SimKey),
}

/// Simulated key codes (mapped from minifb Key).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimKey {
    Pinch,          // P (held)
    OpenHand,       // O (held)
    ClosedFist,     // C (held)
    SpreadWider,    // ]
    SpreadNarrower, // [
    HideHand,       // H (held)
}

// ════════════════════════════════════════════════════════════════════════════
// SimHand: the synthetic hand
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimPose {
    /// Index finger up, the rest curled.
    Pointer,
    Open,
    Fist,
}

const SPREAD_STEP: f64 = 0.05;

/// A right hand in a mirrored camera frame whose index fingertip follows the
/// mouse.
#[derive(Clone, Debug, PartialEq)]
pub struct SimHand {
    pub tip:      (f64, f64),
    pub pose:     SimPose,
    pub pinching: bool,
    pub hidden:   bool,
    /// Thumb tip position between the index tip (0) and fully out (1), used
    /// while the hand is open.
    pub spread:   f64,
    open_held:    bool,
    fist_held:    bool,
}

impl Default for SimHand {
    fn default() -> Self {
        SimHand {
            tip:       (0.5, 0.5),
            pose:      SimPose::Pointer,
            pinching:  false,
            hidden:    false,
            spread:    1.0,
            open_held: false,
            fist_held: false,
        }
    }
}

impl SimHand {
    pub fn apply(&mut self, input: &SimInput) {
        match *input {
            SimInput::Pointer { x, y } => self.tip = (x, y),
            SimInput::KeyDown(key) => self.key(key, true),
            SimInput::KeyUp(key)   => self.key(key, false),
        }
    }

    fn key(&mut self, key: SimKey, down: bool) {
        match key {
            SimKey::Pinch      => self.pinching = down,
            SimKey::HideHand   => self.hidden = down,
            SimKey::OpenHand   => self.open_held = down,
            SimKey::ClosedFist => self.fist_held = down,
            SimKey::SpreadWider if down => {
                self.spread = (self.spread + SPREAD_STEP).min(1.0);
            }
            SimKey::SpreadNarrower if down => {
                self.spread = (self.spread - SPREAD_STEP).max(0.0);
            }
            SimKey::SpreadWider | SimKey::SpreadNarrower => {}
        }
        self.pose = match (self.open_held, self.fist_held) {
            (true, _)      => SimPose::Open,
            (false, true)  => SimPose::Fist,
            (false, false) => SimPose::Pointer,
        };
    }

    /// Landmarks for the current pose, or `None` while the hand is hidden.
    pub fn observation(&self) -> Option<HandObservation> {
        if self.hidden {
            return None;
        }
        let up = match self.pose {
            SimPose::Pointer => [false, true, false, false, false],
            SimPose::Open    => [true; 5],
            SimPose::Fist    => [false; 5],
        };
        let mut p = canonical(up);

        if self.pose == SimPose::Open && !self.pinching {
            // thumb slides toward the index tip as the spread closes
            let tip = p[idx::INDEX_TIP];
            let out = p[idx::THUMB_TIP];
            p[idx::THUMB_TIP] = Landmark::flat(
                tip.x + self.spread * (out.x - tip.x),
                tip.y + self.spread * (out.y - tip.y),
            );
        }
        if self.pinching {
            let tip = p[idx::INDEX_TIP];
            p[idx::THUMB_TIP] = Landmark::flat(tip.x + 0.01, tip.y + 0.005);
        }

        // move the whole hand so the index tip sits under the mouse
        let anchor = p[idx::INDEX_TIP];
        let (dx, dy) = (self.tip.0 - anchor.x, self.tip.1 - anchor.y);
        for lm in p.iter_mut() {
            lm.x += dx;
            lm.y += dy;
        }
        Some(HandObservation::new(Handedness::Right, p))
    }
}

/// Hand with its wrist low in the frame and the thumb out to +x.
fn canonical(up: [bool; 5]) -> [Landmark; LANDMARK_COUNT] {
    let mut p = [Landmark::flat(0.5, 0.5); LANDMARK_COUNT];
    p[idx::WRIST]     = Landmark::flat(0.50, 0.80);
    p[idx::THUMB_CMC] = Landmark::flat(0.55, 0.75);
    p[idx::THUMB_MCP] = Landmark::flat(0.60, 0.70);
    p[idx::THUMB_IP]  = Landmark::flat(0.64, 0.66);
    p[idx::THUMB_TIP] = if up[0] { Landmark::flat(0.70, 0.62) } else { Landmark::flat(0.58, 0.64) };

    let columns = [
        (idx::INDEX_MCP,  0.56),
        (idx::MIDDLE_MCP, 0.50),
        (idx::RING_MCP,   0.45),
        (idx::PINKY_MCP,  0.40),
    ];
    for (k, &(mcp, x)) in columns.iter().enumerate() {
        p[mcp]     = Landmark::flat(x, 0.60);
        p[mcp + 1] = Landmark::flat(x, 0.50);
        let (dip, tip) = if up[k + 1] { (0.42, 0.35) } else { (0.56, 0.58) };
        p[mcp + 2] = Landmark::flat(x, dip);
        p[mcp + 3] = Landmark::flat(x, tip);
    }
    p
}

// ════════════════════════════════════════════════════════════════════════════
// SimFrameSource
// ════════════════════════════════════════════════════════════════════════════

/// Frame source driven by [`SimInput`] events from the visualizer's window.
///
/// Each call drains the pending input and produces one frame stamped with
/// the time since the source was created.  The window's update rate paces
/// the loop.
pub struct SimFrameSource {
    rx:    Receiver<SimInput>,
    hand:  SimHand,
    start: Instant,
}

impl SimFrameSource {
    pub fn new(rx: Receiver<SimInput>) -> Self {
        SimFrameSource { rx, hand: SimHand::default(), start: Instant::now() }
    }

    /// Drain pending input.  Returns false once the window side has gone.
    fn drain(&mut self) -> bool {
        loop {
            match self.rx.try_recv() {
                Ok(input) => self.hand.apply(&input),
                Err(TryRecvError::Empty)        => return true,
                Err(TryRecvError::Disconnected) => return false,
            }
        }
    }
}

impl FrameSource for SimFrameSource {
    type Frame = Option<HandObservation>;

    fn next_frame(&mut self) -> Result<Option<Captured<Self::Frame>>, SourceError> {
        if !self.drain() {
            return Ok(None);
        }
        Ok(Some(Captured {
            at:    self.start.elapsed().as_secs_f64(),
            image: self.hand.observation(),
        }))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// LeapFrameSource: real hardware (feature = "leap")
// ════════════════════════════════════════════════════════════════════════════

/// Frame source backed by a real LeapMotion controller.
///
/// Requires the `leap` feature flag and the LeapC shared library installed.
///
/// Leap joint positions (millimetres above the device) are projected onto a
/// camera-like frame: x across, y down from the top of the interaction
/// volume, z toward the user.  Each digit's proximal, intermediate and distal
/// bones give the four landmarks of that finger; the wrist is the mean of
/// the metacarpal bases.
#[cfg(feature = "leap")]
pub struct LeapFrameSource {
    connection: leaprs::Connection,
    start:      Instant,
}

#[cfg(feature = "leap")]
impl LeapFrameSource {
    /// Half-width of the tracked volume, mm.
    const HALF_WIDTH: f32 = 200.0;
    /// Height range above the device, mm.
    const Y_LOW:      f32 = 80.0;
    const Y_HIGH:     f32 = 400.0;
    /// Polls without a tracking frame before the device counts as lost.
    const MAX_IDLE_POLLS: u32 = 100;

    pub fn open() -> Result<Self, SourceError> {
        use leaprs::{Connection, ConnectionConfig};

        let mut connection = Connection::create(ConnectionConfig::default())
            .map_err(|e| SourceError::Unavailable(format!("LeapC connection: {e:?}")))?;
        connection
            .open()
            .map_err(|e| SourceError::Unavailable(format!("LeapMotion device: {e:?}")))?;
        Ok(LeapFrameSource { connection, start: Instant::now() })
    }

    fn project(x: f32, y: f32, z: f32) -> Landmark {
        let nx = 0.5 + x / (2.0 * Self::HALF_WIDTH);
        let ny = 1.0 - (y - Self::Y_LOW) / (Self::Y_HIGH - Self::Y_LOW);
        let nz = z / (2.0 * Self::HALF_WIDTH);
        Landmark::new(nx as f64, ny as f64, nz as f64)
    }

    fn observe(hand: &leaprs::Hand) -> Option<HandObservation> {
        let digits: Vec<_> = hand.digits().collect();
        if digits.len() < 5 {
            return None;
        }

        macro_rules! at {
            ($joint:expr) => {{
                let j = $joint;
                Self::project(j.x, j.y, j.z)
            }};
        }

        let mut p = [Landmark::flat(0.0, 0.0); LANDMARK_COUNT];
        let (mut wx, mut wy, mut wz) = (0.0, 0.0, 0.0);
        for (k, digit) in digits.iter().take(5).enumerate() {
            let base = at!(digit.metacarpal().prev_joint());
            wx += base.x;
            wy += base.y;
            wz += base.z;

            let first = 1 + 4 * k;
            p[first]     = at!(digit.proximal().prev_joint());
            p[first + 1] = at!(digit.intermediate().prev_joint());
            p[first + 2] = at!(digit.distal().prev_joint());
            p[first + 3] = at!(digit.distal().next_joint());
        }
        p[idx::WRIST] = Landmark::new(wx / 5.0, wy / 5.0, wz / 5.0);

        let handedness = match hand.hand_type() {
            leaprs::HandType::Left  => Handedness::Left,
            leaprs::HandType::Right => Handedness::Right,
        };
        Some(HandObservation::new(handedness, p))
    }
}

#[cfg(feature = "leap")]
impl FrameSource for LeapFrameSource {
    type Frame = Option<HandObservation>;

    fn next_frame(&mut self) -> Result<Option<Captured<Self::Frame>>, SourceError> {
        use leaprs::Event;

        let mut idle = 0;
        loop {
            let msg = match self.connection.poll(100) {
                Ok(m)  => m,
                Err(_) => {
                    idle += 1;
                    if idle >= Self::MAX_IDLE_POLLS {
                        return Err(SourceError::Read("no tracking data from LeapMotion".into()));
                    }
                    continue;
                }
            };

            if let Event::Tracking(frame) = msg.event() {
                let hand = frame.hands().next().and_then(|h| Self::observe(&h));
                return Ok(Some(Captured {
                    at:    self.start.elapsed().as_secs_f64(),
                    image: hand,
                }));
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
