//! hand_pointer: interactive entry point.

use hand_pointer::app::run;
use hand_pointer::config::{load_pipeline, AppConfig};
use hand_pointer::logging::init_tracing;

fn main() {
    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║        Hand Pointer — gesture mouse and volume control       ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    dotenvy::dotenv().ok();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let base = match args.iter().position(|a| a == "--config").map(|i| args.get(i + 1)) {
        None => hand_signal::PipelineConfig::default(),
        Some(None) => {
            eprintln!("Error: --config needs a path");
            std::process::exit(1);
        }
        Some(Some(path)) => match load_pipeline(std::path::Path::new(path)) {
            Ok(base) => base,
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        },
    };

    let cfg = match AppConfig::from_env_over(base) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    if args.iter().any(|a| a == "--print-config") {
        match serde_json::to_string_pretty(&cfg.pipeline) {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("Error: {}", e),
        }
        return;
    }

    if let Err(e) = init_tracing(&cfg.log) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    #[cfg(feature = "leap")]
    println!("  Mode: LeapMotion hardware");
    #[cfg(not(feature = "leap"))]
    println!("  Mode: Mouse/keyboard simulation  (use --features leap for hardware)");
    println!("  Volume:  {}", cfg.volume);
    println!("  Pointer: {}", cfg.pointer);
    println!();
    println!("  Opening visualizer window…");
    println!();

    match run(cfg) {
        Ok(summary) => {
            println!();
            println!(
                "  {} frames ({} with a hand), {} clicks, {} volume changes, {} actuator failures",
                summary.frames,
                summary.hand_frames,
                summary.clicks,
                summary.volume_changes,
                summary.actuator_failures
            );
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
