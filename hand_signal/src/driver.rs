//! Collaborator traits and the frame loop.
//!
//! The loop is single-threaded and pull-based:
//!
//! ```text
//! stop? ─▶ next_frame ─▶ detect ─▶ (record) ─▶ Pipeline::process
//!                                                   │
//!                       overlay ◀── actuators ◀─────┘
//! ```
//!
//! [`run_loop`] takes its collaborators by value, so every one of them is
//! dropped (and releases its device) on every way out of the loop.

use tracing::{debug, info, warn};

use crate::error::{ActuatorError, RunError, SourceError, TraceError};
use crate::gesture::GestureEvent;
use crate::landmark::HandObservation;
use crate::pipeline::{ActuatorCommand, FilterState, FrameOutput, Pipeline};

// ════════════════════════════════════════════════════════════════════════════
// Collaborator traits
// ════════════════════════════════════════════════════════════════════════════

/// A frame together with its capture time in seconds.
#[derive(Clone, Debug, PartialEq)]
pub struct Captured<F> {
    pub at:    f64,
    pub image: F,
}

/// Camera or any other source of frames.
pub trait FrameSource {
    type Frame;

    /// Block until the next frame.  `Ok(None)` is a clean end of stream.
    fn next_frame(&mut self) -> Result<Option<Captured<Self::Frame>>, SourceError>;
}

/// Landmark detector.  A frame without a hand yields `None`.
pub trait HandDetector {
    type Frame;

    fn detect(&mut self, frame: &Self::Frame) -> Option<HandObservation>;
}

/// Detector for sources whose frames already are landmark sets, such as a
/// replayed trace or the simulator.
#[derive(Clone, Copy, Debug, Default)]
pub struct PassThrough;

impl HandDetector for PassThrough {
    type Frame = Option<HandObservation>;

    fn detect(&mut self, frame: &Self::Frame) -> Option<HandObservation> {
        frame.clone()
    }
}

/// Moves and clicks the system pointer.
pub trait PointerActuator {
    fn move_to(&mut self, x: f64, y: f64) -> Result<(), ActuatorError>;
    fn click(&mut self) -> Result<(), ActuatorError>;
}

/// Sets the system output volume.
pub trait VolumeActuator {
    fn set_volume_percent(&mut self, percent: u8) -> Result<(), ActuatorError>;
}

/// Diagnostic view and quit poll.
pub trait Overlay {
    fn present(&mut self, report: &FrameReport<'_>);

    fn stop_requested(&mut self) -> bool { false }
}

/// Receives every acquired frame's landmarks, e.g. to write a trace.
pub trait FrameRecorder {
    fn record(&mut self, at: f64, hand: Option<&HandObservation>) -> Result<(), TraceError>;
}

impl<T: PointerActuator + ?Sized> PointerActuator for Box<T> {
    fn move_to(&mut self, x: f64, y: f64) -> Result<(), ActuatorError> { (**self).move_to(x, y) }
    fn click(&mut self) -> Result<(), ActuatorError> { (**self).click() }
}

impl<T: VolumeActuator + ?Sized> VolumeActuator for Box<T> {
    fn set_volume_percent(&mut self, percent: u8) -> Result<(), ActuatorError> {
        (**self).set_volume_percent(percent)
    }
}

/// Everything the overlay may show for one frame.
#[derive(Clone, Copy, Debug)]
pub struct FrameReport<'a> {
    pub at:     f64,
    pub hand:   Option<&'a HandObservation>,
    pub output: &'a FrameOutput,
    pub state:  &'a FilterState,
}

// ════════════════════════════════════════════════════════════════════════════
// Loop
// ════════════════════════════════════════════════════════════════════════════

/// The collaborators one loop owns.
pub struct Rig<S, D, P, V, O> {
    pub source:   S,
    pub detector: D,
    pub pointer:  P,
    pub volume:   V,
    pub overlay:  O,
    pub recorder: Option<Box<dyn FrameRecorder>>,
}

/// Counters reported when the loop ends.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub frames:            u64,
    pub hand_frames:       u64,
    pub clicks:            u64,
    pub mode_changes:      u64,
    pub volume_changes:    u64,
    pub actuator_failures: u64,
    pub stopped_by_user:   bool,
}

impl RunSummary {
    fn tally(&mut self, out: &FrameOutput, hand_seen: bool) {
        self.frames += 1;
        if hand_seen {
            self.hand_frames += 1;
        }
        for ev in out.events() {
            match ev {
                GestureEvent::ClickFired => self.clicks += 1,
                GestureEvent::ModeEntered | GestureEvent::ModeExited => self.mode_changes += 1,
                GestureEvent::NoEvent => {}
            }
        }
    }
}

/// Run until end of stream, a stop request, or an acquisition failure.
pub fn run_loop<S, D, P, V, O>(pipeline: &Pipeline, rig: Rig<S, D, P, V, O>) -> Result<RunSummary, RunError>
where
    S: FrameSource,
    D: HandDetector<Frame = S::Frame>,
    P: PointerActuator,
    V: VolumeActuator,
    O: Overlay,
{
    let Rig { mut source, mut detector, mut pointer, mut volume, mut overlay, mut recorder } = rig;
    let mut state = FilterState::new(pipeline.config());
    let mut summary = RunSummary::default();

    info!("frame loop started");
    loop {
        if overlay.stop_requested() {
            summary.stopped_by_user = true;
            break;
        }

        let Some(frame) = source.next_frame()? else {
            debug!("end of stream");
            break;
        };
        let hand = detector.detect(&frame.image);

        let record_failed = match recorder.as_mut() {
            Some(rec) => rec.record(frame.at, hand.as_ref()).err(),
            None => None,
        };
        if let Some(e) = record_failed {
            warn!(error = %e, "trace recording failed, recording disabled");
            recorder = None;
        }

        let out = pipeline.process(&mut state, hand.as_ref(), frame.at);
        summary.tally(&out, hand.is_some());

        for cmd in out.commands.iter().copied() {
            let result = match cmd {
                ActuatorCommand::MoveTo { x, y } => pointer.move_to(x, y),
                ActuatorCommand::Click => {
                    info!(at = frame.at, "click");
                    pointer.click()
                }
                ActuatorCommand::SetVolume(percent) => {
                    let r = volume.set_volume_percent(percent);
                    if r.is_ok() {
                        state.confirm_volume(percent, frame.at);
                        summary.volume_changes += 1;
                        debug!(percent, "volume set");
                    }
                    r
                }
            };
            if let Err(e) = result {
                summary.actuator_failures += 1;
                warn!(command = ?cmd, error = %e, "actuator call failed");
            }
        }

        overlay.present(&FrameReport {
            at:     frame.at,
            hand:   hand.as_ref(),
            output: &out,
            state:  &state,
        });
    }

    info!(
        frames = summary.frames,
        clicks = summary.clicks,
        volume_changes = summary.volume_changes,
        stopped_by_user = summary.stopped_by_user,
        "frame loop finished"
    );
    Ok(summary)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;
    use crate::fingers::tests::posed_hand;
    use crate::landmark::{idx, Handedness, Landmark};
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<String>>>;

    // ── fakes ─────────────────────────────────────────────────────────────

    struct ScriptSource {
        frames:  VecDeque<Result<Captured<Option<HandObservation>>, SourceError>>,
        log:     Log,
    }

    impl ScriptSource {
        fn new(log: &Log, hands: Vec<Option<HandObservation>>) -> Self {
            let frames = hands
                .into_iter()
                .enumerate()
                .map(|(k, h)| Ok(Captured { at: k as f64 / 30.0, image: h }))
                .collect();
            ScriptSource { frames, log: log.clone() }
        }

        fn then_fail(mut self) -> Self {
            self.frames.push_back(Err(SourceError::Read("camera unplugged".into())));
            self
        }
    }

    impl FrameSource for ScriptSource {
        type Frame = Option<HandObservation>;

        fn next_frame(&mut self) -> Result<Option<Captured<Self::Frame>>, SourceError> {
            self.frames.pop_front().transpose()
        }
    }

    impl Drop for ScriptSource {
        fn drop(&mut self) {
            self.log.borrow_mut().push("released source".into());
        }
    }

    struct FakePointer {
        log:      Log,
        failures: usize,
    }

    impl PointerActuator for FakePointer {
        fn move_to(&mut self, x: f64, y: f64) -> Result<(), ActuatorError> {
            self.log.borrow_mut().push(format!("move {x:.0},{y:.0}"));
            Ok(())
        }

        fn click(&mut self) -> Result<(), ActuatorError> {
            self.log.borrow_mut().push("click".into());
            if self.failures > 0 {
                self.failures -= 1;
                return Err(ActuatorError::Rejected("busy".into()));
            }
            Ok(())
        }
    }

    struct FakeVolume {
        log:      Log,
        failures: usize,
    }

    impl VolumeActuator for FakeVolume {
        fn set_volume_percent(&mut self, percent: u8) -> Result<(), ActuatorError> {
            self.log.borrow_mut().push(format!("volume {percent}"));
            if self.failures > 0 {
                self.failures -= 1;
                return Err(ActuatorError::Status(1));
            }
            Ok(())
        }
    }

    impl Drop for FakeVolume {
        fn drop(&mut self) {
            self.log.borrow_mut().push("released volume".into());
        }
    }

    struct StopAfter {
        presented: usize,
        limit:     Option<usize>,
    }

    impl Overlay for StopAfter {
        fn present(&mut self, _report: &FrameReport<'_>) {
            self.presented += 1;
        }

        fn stop_requested(&mut self) -> bool {
            self.limit.is_some_and(|n| self.presented >= n)
        }
    }

    fn rig(
        log: &Log,
        source: ScriptSource,
        pointer_failures: usize,
        volume_failures: usize,
        stop_after: Option<usize>,
    ) -> Rig<ScriptSource, PassThrough, FakePointer, FakeVolume, StopAfter> {
        Rig {
            source,
            detector: PassThrough,
            pointer:  FakePointer { log: log.clone(), failures: pointer_failures },
            volume:   FakeVolume { log: log.clone(), failures: volume_failures },
            overlay:  StopAfter { presented: 0, limit: stop_after },
            recorder: None,
        }
    }

    fn pipeline() -> Pipeline {
        Pipeline::new(PipelineConfig::default()).unwrap()
    }

    fn pinching() -> HandObservation {
        let mut h = posed_hand(Handedness::Right, [false, true, false, false, false]);
        let tip = h.point(idx::INDEX_TIP);
        h.landmarks[idx::THUMB_TIP] = Landmark::flat(tip.x + 0.01, tip.y);
        h
    }

    fn open_hand() -> HandObservation {
        posed_hand(Handedness::Right, [true; 5])
    }

    fn count(log: &Log, prefix: &str) -> usize {
        log.borrow().iter().filter(|l| l.starts_with(prefix)).count()
    }

    // ── tests ─────────────────────────────────────────────────────────────

    #[test]
    fn end_of_stream_is_clean() {
        let log = Log::default();
        let src = ScriptSource::new(&log, vec![None, Some(open_hand()), None]);
        let summary = run_loop(&pipeline(), rig(&log, src, 0, 0, None)).unwrap();
        assert_eq!(summary.frames, 3);
        assert_eq!(summary.hand_frames, 1);
        assert_eq!(summary.mode_changes, 1);
        assert!(!summary.stopped_by_user);
        assert_eq!(count(&log, "move"), 1);
    }

    #[test]
    fn acquisition_failure_stops_and_releases() {
        let log = Log::default();
        let src = ScriptSource::new(&log, vec![Some(open_hand())]).then_fail();
        let err = run_loop(&pipeline(), rig(&log, src, 0, 0, None)).unwrap_err();
        assert!(matches!(err, RunError::Acquisition(SourceError::Read(_))));
        assert_eq!(count(&log, "released source"), 1);
        assert_eq!(count(&log, "released volume"), 1);
    }

    #[test]
    fn held_pinch_clicks_once_through_the_loop() {
        let log = Log::default();
        let src = ScriptSource::new(&log, vec![Some(pinching()); 15]);
        let summary = run_loop(&pipeline(), rig(&log, src, 0, 0, None)).unwrap();
        assert_eq!(summary.clicks, 1);
        assert_eq!(count(&log, "click"), 1);
    }

    #[test]
    fn click_failure_is_not_fatal() {
        let log = Log::default();
        let mut hands = vec![Some(pinching()); 3];
        hands.push(None);
        let src = ScriptSource::new(&log, hands);
        let summary = run_loop(&pipeline(), rig(&log, src, 1, 0, None)).unwrap();
        assert_eq!(summary.frames, 4);
        assert_eq!(summary.actuator_failures, 1);
    }

    #[test]
    fn failed_volume_change_is_retried_next_frame() {
        // two frames 1/30 s apart: a confirmed change rate-limits the second
        let log = Log::default();
        let src = ScriptSource::new(&log, vec![Some(open_hand()); 2]);
        let summary = run_loop(&pipeline(), rig(&log, src, 0, 0, None)).unwrap();
        assert_eq!(count(&log, "volume "), 1);
        assert_eq!(summary.volume_changes, 1);

        // an unconfirmed change leaves the gate open
        let log = Log::default();
        let src = ScriptSource::new(&log, vec![Some(open_hand()); 2]);
        let summary = run_loop(&pipeline(), rig(&log, src, 0, 1, None)).unwrap();
        assert_eq!(count(&log, "volume "), 2);
        assert_eq!(summary.volume_changes, 1);
        assert_eq!(summary.actuator_failures, 1);
    }

    #[test]
    fn stop_request_ends_loop() {
        let log = Log::default();
        let src = ScriptSource::new(&log, vec![None; 100]);
        let summary = run_loop(&pipeline(), rig(&log, src, 0, 0, Some(5))).unwrap();
        assert!(summary.stopped_by_user);
        assert_eq!(summary.frames, 5);
        assert_eq!(count(&log, "released source"), 1);
    }

    struct FlakyRecorder {
        calls: Rc<RefCell<usize>>,
    }

    impl FrameRecorder for FlakyRecorder {
        fn record(&mut self, _at: f64, _hand: Option<&HandObservation>) -> Result<(), TraceError> {
            *self.calls.borrow_mut() += 1;
            Err(TraceError::Io(std::io::Error::other("disk full")))
        }
    }

    #[test]
    fn recorder_failure_disables_recording_only() {
        let log = Log::default();
        let calls = Rc::new(RefCell::new(0));
        let src = ScriptSource::new(&log, vec![None; 4]);
        let mut r = rig(&log, src, 0, 0, None);
        r.recorder = Some(Box::new(FlakyRecorder { calls: calls.clone() }));
        let summary = run_loop(&pipeline(), r).unwrap();
        assert_eq!(summary.frames, 4);
        assert_eq!(*calls.borrow(), 1);
    }
}
