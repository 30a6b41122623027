use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use glam::{Quat, Vec3};
use rewind::config::Settings;
use rewind::input::{self, Recording};
use rewind::session::{run_session, SessionOutcome, MAX_TICK_RATE_HZ};
use rewind::{FrameBuffer, FrameSample, PlaybackEngine, Recorder, RecorderConfig, SystemClock};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a recording in real time
    Play {
        file: PathBuf,
        #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..=MAX_TICK_RATE_HZ as i64))]
        tick_rate: Option<u32>,
        /// Skip the rest of the replay after this many seconds
        #[arg(short, long, value_parser = parse_skip_after)]
        skip_after: Option<Duration>,
        /// Play even if the recording fails validation
        #[arg(long)]
        no_validate: bool,
        /// Print every pose to stdout
        #[arg(short, long)]
        print: bool,
    },
    /// Describe a recording
    Info { file: PathBuf },
    /// Record a synthetic crash and save it
    Demo {
        #[arg(short, long, default_value = "crash.json")]
        out: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load();

    // RUST_LOG wins over the settings file
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Play {
            file,
            tick_rate,
            skip_after,
            no_validate,
            print,
        } => {
            let rt = tokio::runtime::Runtime::new().context("Failed to create Tokio runtime")?;
            rt.block_on(play(&settings, file, tick_rate, skip_after, !no_validate, print))
        }
        Commands::Info { file } => describe(file),
        Commands::Demo { out } => demo(out),
    }
}

async fn play(
    settings: &Settings,
    file: PathBuf,
    tick_rate: Option<u32>,
    skip_after: Option<Duration>,
    validate: bool,
    print: bool,
) -> Result<()> {
    let recording = input::load_file(&file)
        .with_context(|| format!("Failed to load {}", file.display()))?;

    check_recording(&recording.frames, validate && settings.validate_on_load)
        .with_context(|| format!("{} failed validation", file.display()))?;

    let mut session = settings.session();
    if let Some(rate) = tick_rate {
        session.tick_rate_hz = rate;
    }

    let mut engine =
        PlaybackEngine::with_config(recording.frames, SystemClock::new(), settings.playback());

    let skip = async move {
        let ctrl_c = async {
            if tokio::signal::ctrl_c().await.is_err() {
                warn!("Ctrl-C handler unavailable; skip disabled");
                std::future::pending::<()>().await;
            }
        };
        match skip_after {
            Some(delay) => {
                tokio::select! {
                    _ = ctrl_c => {}
                    _ = tokio::time::sleep(delay) => {}
                }
            }
            None => ctrl_c.await,
        }
    };

    let mut sink = |pose: &FrameSample, progress: f64| {
        if print {
            let p = pose.primary_position;
            let c = pose.secondary_position;
            println!(
                "{:8.3} {:6.1}% car=({:.2}, {:.2}, {:.2}) cam=({:.2}, {:.2}, {:.2})",
                pose.time,
                progress * 100.0,
                p.x,
                p.y,
                p.z,
                c.x,
                c.y,
                c.z
            );
        }
    };

    let report = run_session(&mut engine, &session, skip, &mut sink).await;
    match report.outcome {
        SessionOutcome::Completed => info!("Replay complete, respawning"),
        SessionOutcome::Skipped => info!(at = report.elapsed, "Replay skipped, respawning"),
        SessionOutcome::Empty => warn!("{} has no frames", file.display()),
    }
    Ok(())
}

/// Seconds before an automatic skip. Must be finite, non-negative and fit a `Duration`.
fn parse_skip_after(arg: &str) -> Result<Duration, String> {
    let secs: f64 = arg.parse().map_err(|e| format!("{arg}: {e}"))?;
    if secs < 0.0 {
        return Err(format!("{arg}: must not be negative"));
    }
    Duration::try_from_secs_f64(secs).map_err(|e| format!("{arg}: {e}"))
}

/// Validate a loaded buffer. A failure is an error when `strict`, otherwise
/// it is logged and playback goes ahead.
fn check_recording(frames: &FrameBuffer, strict: bool) -> Result<()> {
    match frames.validate() {
        Ok(()) => Ok(()),
        Err(e) if strict => Err(e.into()),
        Err(e) => {
            warn!(error = %e, "Recording failed validation; playing anyway");
            Ok(())
        }
    }
}

fn describe(file: PathBuf) -> Result<()> {
    let recording = input::load_file(&file)
        .with_context(|| format!("Failed to load {}", file.display()))?;
    let frames = &recording.frames;

    println!("File:      {}", file.display());
    if let Some(at) = recording.recorded_at {
        println!("Recorded:  {}", at.format("%Y-%m-%d %H:%M:%S UTC"));
    }
    println!("Frames:    {}", frames.len());
    println!("Duration:  {:.3}s", frames.duration());
    if let (Some(first), Some(last)) = (frames.first(), frames.last()) {
        println!("Span:      {:.3}s .. {:.3}s", first.time, last.time);
        if first.time != 0.0 {
            println!("Note:      first frame is not at 0, playback starts with a hold");
        }
    }
    match frames.validate() {
        Ok(()) => println!("Valid:     yes"),
        Err(e) => println!("Valid:     no ({})", e),
    }
    Ok(())
}

fn demo(out: PathBuf) -> Result<()> {
    let mut recorder = Recorder::new(RecorderConfig {
        sample_interval: Duration::from_millis(33),
        max_history: Duration::from_secs(5),
    });

    let kept = simulate_crash(8.0, 120.0)
        .into_iter()
        .filter(|sample| recorder.record(*sample))
        .count();

    let recording = Recording::now(recorder.finish());
    info!(kept, span = recorder.span(), "Captured crash");

    input::save_file(&out, &recording)
        .with_context(|| format!("Failed to save {}", out.display()))?;
    println!("Wrote {} frames to {}", recording.frames.len(), out.display());
    Ok(())
}

/// Car drives along +Z, hits a wall at 6s and rolls, with a chase camera behind
fn simulate_crash(length: f64, rate: f64) -> Vec<FrameSample> {
    const SPEED: f32 = 30.0;
    const WHEEL_RADIUS: f32 = 0.35;
    const IMPACT: f32 = 6.0;

    let steps = (length * rate) as usize;
    (0..=steps)
        .map(|i| {
            let time = i as f64 / rate;
            let t = time as f32;

            let (distance, roll, lift) = if t < IMPACT {
                (SPEED * t, 0.0, 0.0)
            } else {
                let since = t - IMPACT;
                let decay = (-since * 1.5).exp();
                let travel = SPEED * IMPACT + (SPEED / 1.5) * (1.0 - decay);
                (travel, 9.0 * (1.0 - decay), 1.2 * (since * 6.0).sin().abs() * decay)
            };

            let position = Vec3::new(0.0, lift, distance);
            let orientation = Quat::from_rotation_z(roll);
            let spin = distance / WHEEL_RADIUS;
            let camera = position + Vec3::new(0.0, 3.0, -9.0);
            let look = Quat::from_rotation_x(-0.25);

            FrameSample::new(time, position, orientation)
                .with_angles([spin; 4])
                .with_camera(camera, look)
        })
        .collect()
}
