//! Headless driver for the range sensor simulation. It runs the demo scene for a fixed number
//! of frames at a fixed frame rate, as a render loop would, and reports what was accumulated.

use clap::{Parser, ValueEnum};
use lidarsim::accumulation::InstanceArray;
use lidarsim::{CircularPath, LidarSimulator, MotionPolicy, ScanConfig, Scene, Stationary};
use log::info;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Motion {
    Stationary,
    Circular,
}

#[derive(Debug, Parser)]
#[command(name = "lidarsim", about = "Simulate a scanning range sensor over a demo scene")]
struct Args {
    /// JSON scan configuration; missing fields take their defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of frames to simulate
    #[arg(short, long, default_value_t = 300)]
    frames: usize,

    /// Simulated frame rate
    #[arg(long, default_value_t = 60.0, value_parser = parse_fps)]
    fps: f64,

    #[arg(short, long, value_enum, default_value_t = Motion::Circular)]
    motion: Motion,

    /// Cast rays on all cores
    #[arg(long)]
    parallel: bool,

    /// Write the accumulated point records to this file when done
    #[arg(short, long)]
    export: Option<PathBuf>,
}

fn parse_fps(s: &str) -> Result<f64, String> {
    let fps: f64 = s.parse().map_err(|e| format!("{e}"))?;
    if fps.is_finite() && fps > 0.0 {
        Ok(fps)
    } else {
        Err(format!("frame rate must be finite and positive, got {fps}"))
    }
}

fn main() -> lidarsim::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => ScanConfig::load_json(path)?,
        None => ScanConfig::default(),
    };
    config.parallel |= args.parallel;

    let motion: Box<dyn MotionPolicy> = match args.motion {
        Motion::Stationary => Box::new(Stationary(config.sensor_start)),
        Motion::Circular => Box::new(CircularPath::default()),
    };

    let scene = Scene::demo();
    let mut sink = InstanceArray::new(config.capacity());
    let mut sim = LidarSimulator::new(config, motion)?;

    let mut scans = 0;
    let mut hits = 0;
    for frame in 1..=args.frames {
        let now = frame as f64 / args.fps;
        if let Some(report) = sim.frame(now, &scene, &mut sink) {
            scans += 1;
            hits += report.hits;
        }
        sink.mark_uploaded();
    }

    info!(
        "{} frames, {} scans, {} hits, {} points displayed ({} written in total)",
        args.frames,
        scans,
        hits,
        sink.count(),
        sim.buffer().total_written()
    );

    if let Some(path) = &args.export {
        lidarsim::io::write_records(path, sim.buffer())?;
        info!("Wrote {} points to {}", sim.buffer().active_count(), path.display());
    }

    Ok(())
}
