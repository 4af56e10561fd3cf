//! Landmark traces: one JSON object per line.
//!
//! ```text
//! {"t":0.0,"hand":null}
//! {"t":0.033,"hand":{"handedness":"Right","landmarks":[{"x":0.5,"y":0.8,"z":0.0}, …]}}
//! ```
//!
//! A trace recorded from a live session replays through the pipeline with
//! [`TraceSource`] and [`crate::driver::PassThrough`] and produces the same events.

use std::io::{BufRead, Lines, Write};

use serde::{Deserialize, Serialize};

use crate::driver::{Captured, FrameRecorder, FrameSource};
use crate::error::{SourceError, TraceError};
use crate::landmark::HandObservation;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TraceRecord {
    pub t:    f64,
    pub hand: Option<HandObservation>,
}

// ── reading ──────────────────────────────────────────────────────────────────

/// Iterates the records of a trace.  Blank lines are skipped.
pub struct TraceReader<R> {
    lines: Lines<R>,
    line:  usize,
}

impl<R: BufRead> TraceReader<R> {
    pub fn new(reader: R) -> Self {
        TraceReader { lines: reader.lines(), line: 0 }
    }
}

impl<R: BufRead> Iterator for TraceReader<R> {
    type Item = Result<TraceRecord, TraceError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let text = match self.lines.next()? {
                Ok(text) => text,
                Err(e) => return Some(Err(TraceError::Io(e))),
            };
            self.line += 1;
            if text.trim().is_empty() {
                continue;
            }
            let line = self.line;
            return Some(
                serde_json::from_str(&text).map_err(|source| TraceError::Parse { line, source }),
            );
        }
    }
}

/// Replays a trace as a frame source whose frames are the recorded hands.
pub struct TraceSource<R> {
    reader: TraceReader<R>,
}

impl<R: BufRead> TraceSource<R> {
    pub fn new(reader: R) -> Self {
        TraceSource { reader: TraceReader::new(reader) }
    }
}

impl<R: BufRead> FrameSource for TraceSource<R> {
    type Frame = Option<HandObservation>;

    fn next_frame(&mut self) -> Result<Option<Captured<Self::Frame>>, SourceError> {
        match self.reader.next() {
            None => Ok(None),
            Some(Ok(rec)) => Ok(Some(Captured { at: rec.t, image: rec.hand })),
            Some(Err(e)) => Err(SourceError::Read(e.to_string())),
        }
    }
}

// ── writing ──────────────────────────────────────────────────────────────────

pub struct TraceWriter<W: Write> {
    out: W,
}

impl<W: Write> TraceWriter<W> {
    pub fn new(out: W) -> Self {
        TraceWriter { out }
    }

    pub fn write(&mut self, record: &TraceRecord) -> Result<(), TraceError> {
        serde_json::to_writer(&mut self.out, record)?;
        self.out.write_all(b"\n")?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> FrameRecorder for TraceWriter<W> {
    fn record(&mut self, at: f64, hand: Option<&HandObservation>) -> Result<(), TraceError> {
        self.write(&TraceRecord { t: at, hand: hand.cloned() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;
    use crate::driver::{run_loop, FrameReport, Overlay, PassThrough, PointerActuator, Rig, VolumeActuator};
    use crate::error::{ActuatorError, RunError};
    use crate::fingers::tests::posed_hand;
    use crate::landmark::Handedness;
    use crate::pipeline::Pipeline;
    use std::io::Cursor;

    struct Quiet;

    impl PointerActuator for Quiet {
        fn move_to(&mut self, _x: f64, _y: f64) -> Result<(), ActuatorError> { Ok(()) }
        fn click(&mut self) -> Result<(), ActuatorError> { Ok(()) }
    }

    impl VolumeActuator for Quiet {
        fn set_volume_percent(&mut self, _p: u8) -> Result<(), ActuatorError> { Ok(()) }
    }

    impl Overlay for Quiet {
        fn present(&mut self, _report: &FrameReport<'_>) {}
    }

    fn sample() -> Vec<u8> {
        let mut w = TraceWriter::new(Vec::new());
        w.record(0.0, None).unwrap();
        w.record(0.033, Some(&posed_hand(Handedness::Right, [true; 5]))).unwrap();
        w.record(0.066, Some(&posed_hand(Handedness::Left, [false; 5]))).unwrap();
        w.into_inner()
    }

    #[test]
    fn writes_one_line_per_frame() {
        let bytes = sample();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text.lines().count(), 3);
        assert!(text.starts_with(r#"{"t":0.0,"hand":null}"#));
    }

    #[test]
    fn reads_back_what_was_written() {
        let records: Vec<_> = TraceReader::new(Cursor::new(sample()))
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].hand, None);
        assert_eq!(records[1].hand, Some(posed_hand(Handedness::Right, [true; 5])));
        assert_eq!(records[2].t, 0.066);
    }

    #[test]
    fn blank_lines_skipped_and_errors_carry_line_number() {
        let text = "{\"t\":0.0,\"hand\":null}\n\n{\"t\":oops}\n";
        let mut r = TraceReader::new(Cursor::new(text));
        assert!(r.next().unwrap().is_ok());
        match r.next().unwrap() {
            Err(TraceError::Parse { line, .. }) => assert_eq!(line, 3),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn short_landmark_list_rejected() {
        let text = r#"{"t":0.0,"hand":{"handedness":"Left","landmarks":[{"x":0.1,"y":0.2}]}}"#;
        let mut r = TraceReader::new(Cursor::new(text));
        assert!(matches!(r.next(), Some(Err(TraceError::Parse { line: 1, .. }))));
    }

    #[test]
    fn replay_runs_through_the_loop() {
        let pipeline = Pipeline::new(PipelineConfig::default()).unwrap();
        let rig = Rig {
            source:   TraceSource::new(Cursor::new(sample())),
            detector: PassThrough,
            pointer:  Quiet,
            volume:   Quiet,
            overlay:  Quiet,
            recorder: None,
        };
        let summary = run_loop(&pipeline, rig).unwrap();
        assert_eq!(summary.frames, 3);
        assert_eq!(summary.hand_frames, 2);
        // open hand enters the mode, the fist leaves it
        assert_eq!(summary.mode_changes, 2);
    }

    #[test]
    fn corrupt_replay_is_an_acquisition_error() {
        let pipeline = Pipeline::new(PipelineConfig::default()).unwrap();
        let rig = Rig {
            source:   TraceSource::new(Cursor::new("not json\n")),
            detector: PassThrough,
            pointer:  Quiet,
            volume:   Quiet,
            overlay:  Quiet,
            recorder: None,
        };
        assert!(matches!(run_loop(&pipeline, rig), Err(RunError::Acquisition(_))));
    }
}
