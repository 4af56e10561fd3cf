//! hand_replay: run a recorded landmark trace through the pipeline.
//!
//! ```text
//! hand_replay session.jsonl [--config pipeline.json]
//! ```

use std::fs::File;
use std::io::BufReader;

use hand_signal::driver::{run_loop, FrameReport, Overlay, PassThrough, PointerActuator, Rig, VolumeActuator};
use hand_signal::trace::TraceSource;
use hand_signal::{ActuatorCommand, ActuatorError, Pipeline, PipelineConfig};

/// Prints every event and volume request as it happens.
struct EventPrinter;

impl Overlay for EventPrinter {
    fn present(&mut self, report: &FrameReport<'_>) {
        for ev in report.output.events() {
            println!("  {:>9.3}s  {}", report.at, ev.label());
        }
        for cmd in &report.output.commands {
            if let ActuatorCommand::SetVolume(p) = cmd {
                println!("  {:>9.3}s  volume {}%", report.at, p);
            }
        }
    }
}

/// Accepts every command without touching the system.
struct Dry;

impl PointerActuator for Dry {
    fn move_to(&mut self, _x: f64, _y: f64) -> Result<(), ActuatorError> { Ok(()) }
    fn click(&mut self) -> Result<(), ActuatorError> { Ok(()) }
}

impl VolumeActuator for Dry {
    fn set_volume_percent(&mut self, _percent: u8) -> Result<(), ActuatorError> { Ok(()) }
}

fn main() {
    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║          Hand Replay — landmark trace → gesture events       ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    if let Err(e) = replay() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn replay() -> Result<(), String> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let trace_path = args
        .iter()
        .find(|a| !a.starts_with("--") && !is_flag_value(&args, a))
        .ok_or("usage: hand_replay <trace.jsonl> [--config pipeline.json]")?;

    let cfg = match flag_value(&args, "--config") {
        Some(path) => {
            let file = File::open(path).map_err(|e| format!("{path}: {e}"))?;
            serde_json::from_reader::<_, PipelineConfig>(BufReader::new(file))
                .map_err(|e| format!("{path}: {e}"))?
        }
        None => PipelineConfig::default(),
    };
    let pipeline = Pipeline::new(cfg).map_err(|e| e.to_string())?;

    let file = File::open(trace_path).map_err(|e| format!("{trace_path}: {e}"))?;
    println!("  Replaying {trace_path}");
    println!();

    let rig = Rig {
        source:   TraceSource::new(BufReader::new(file)),
        detector: PassThrough,
        pointer:  Dry,
        volume:   Dry,
        overlay:  EventPrinter,
        recorder: None,
    };
    let summary = run_loop(&pipeline, rig).map_err(|e| e.to_string())?;

    println!();
    println!(
        "  {} frames ({} with a hand), {} clicks, {} mode changes, {} volume changes",
        summary.frames, summary.hand_frames, summary.clicks, summary.mode_changes, summary.volume_changes
    );
    Ok(())
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

fn is_flag_value(args: &[String], candidate: &String) -> bool {
    args.windows(2)
        .any(|w| w[0].starts_with("--") && std::ptr::eq(&w[1], candidate))
}
