//! Application wiring: configuration → backends → window → frame loop.

use std::fs::File;
use std::io::BufWriter;
use std::sync::mpsc;

use thiserror::Error;
use tracing::{info, warn};

use hand_actuate::{open_volume, PointerBackend, UnknownBackend};
use hand_signal::driver::{
    run_loop, FrameRecorder, FrameSource, PassThrough, PointerActuator, Rig, RunSummary,
    VolumeActuator,
};
use hand_signal::trace::TraceWriter;
use hand_signal::{ConfigError, HandObservation, Pipeline, RunError};

use crate::config::AppConfig;
use crate::source::SimInput;
use crate::visualizer::Visualizer;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Backend(#[from] UnknownBackend),

    #[error("could not open window: {0}")]
    Window(String),

    #[error("trace file {path}: {source}")]
    Trace {
        path:   String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Run(#[from] RunError),
}

/// Run until the window closes, the user quits, or the source fails.
pub fn run(cfg: AppConfig) -> Result<RunSummary, AppError> {
    let pipeline = Pipeline::new(cfg.pipeline.clone())?;
    info!(
        volume  = %cfg.volume,
        pointer = %cfg.pointer,
        screen  = ?(cfg.pipeline.screen_width, cfg.pipeline.screen_height),
        "starting hand pointer"
    );

    let volume = open_volume(cfg.volume);
    let pointer = open_pointer(cfg.pointer);
    let recorder = open_recorder(&cfg)?;

    let p = &cfg.pipeline;

    // The simulator reads its input from the window; with hardware the
    // window only draws.
    let (tx, rx) = mpsc::channel::<SimInput>();
    let sim_tx = if cfg!(feature = "leap") { None } else { Some(tx) };
    let overlay = Visualizer::new(
        sim_tx,
        pipeline.roi(),
        (p.frame_width, p.frame_height),
        (p.screen_width, p.screen_height),
    )
    .map_err(AppError::Window)?;

    #[cfg(feature = "leap")]
    let source = {
        drop(rx);
        crate::source::LeapFrameSource::open().map_err(RunError::from)?
    };
    #[cfg(not(feature = "leap"))]
    let source = crate::source::SimFrameSource::new(rx);

    drive(&pipeline, source, pointer, volume, overlay, recorder)
}

fn drive<S>(
    pipeline: &Pipeline,
    source:   S,
    pointer:  Box<dyn PointerActuator>,
    volume:   Box<dyn VolumeActuator>,
    overlay:  Visualizer,
    recorder: Option<Box<dyn FrameRecorder>>,
) -> Result<RunSummary, AppError>
where
    S: FrameSource<Frame = Option<HandObservation>>,
{
    let rig = Rig { source, detector: PassThrough, pointer, volume, overlay, recorder };
    Ok(run_loop(pipeline, rig)?)
}

fn open_pointer(backend: PointerBackend) -> Box<dyn PointerActuator> {
    match backend {
        PointerBackend::Sim => Box::new(hand_actuate::echo::EchoPointer::default()),
        PointerBackend::Desktop => desktop_pointer(),
    }
}

#[cfg(feature = "desktop")]
fn desktop_pointer() -> Box<dyn PointerActuator> {
    match hand_actuate::desktop::DesktopPointer::new() {
        Ok(p) => Box::new(p),
        Err(e) => {
            warn!(error = %e, "system pointer unavailable, cursor shown in the window only");
            Box::new(hand_actuate::echo::EchoPointer::default())
        }
    }
}

#[cfg(not(feature = "desktop"))]
fn desktop_pointer() -> Box<dyn PointerActuator> {
    warn!("built without the `desktop` feature, cursor shown in the window only");
    Box::new(hand_actuate::echo::EchoPointer::default())
}

fn open_recorder(cfg: &AppConfig) -> Result<Option<Box<dyn FrameRecorder>>, AppError> {
    let Some(path) = cfg.record.as_ref() else {
        return Ok(None);
    };
    let file = File::create(path).map_err(|source| AppError::Trace {
        path: path.display().to_string(),
        source,
    })?;
    info!(path = %path.display(), "recording landmark trace");
    let writer: Box<dyn FrameRecorder> = Box::new(TraceWriter::new(BufWriter::new(file)));
    Ok(Some(writer))
}
