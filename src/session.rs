use crate::core::FrameSample;
use crate::playback::{Clock, PlaybackEngine, PlaybackEvent};
use std::future::Future;
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};

/// Receives each pose the session produces
pub trait PoseSink {
    fn pose(&mut self, pose: &FrameSample, progress: f64);
}

impl<F: FnMut(&FrameSample, f64)> PoseSink for F {
    fn pose(&mut self, pose: &FrameSample, progress: f64) {
        self(pose, progress)
    }
}

/// Highest tick rate a session will run at
pub const MAX_TICK_RATE_HZ: u32 = 1000;

/// Tick driver configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub tick_rate_hz: u32,
    /// Log a progress line every this many ticks; 0 disables it
    pub progress_log_interval: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: 60,
            progress_log_interval: 30,
        }
    }
}

impl SessionConfig {
    /// Period between ticks. The rate is clamped to `1..=MAX_TICK_RATE_HZ`.
    pub fn tick_period(&self) -> Duration {
        let rate = self.tick_rate_hz.clamp(1, MAX_TICK_RATE_HZ);
        Duration::from_secs_f64(1.0 / rate as f64)
    }
}

/// How a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Played to the end
    Completed,
    /// Interrupted by the skip input
    Skipped,
    /// Nothing to play
    Empty,
}

#[derive(Debug, Clone)]
pub struct SessionReport {
    pub outcome: SessionOutcome,
    pub ticks: u64,
    pub poses: u64,
    /// Replay time reached when the session ended
    pub elapsed: f64,
}

/// Play a replay to completion, one engine update per tick.
///
/// `skip` resolving is treated as the user asking to skip the rest.
pub async fn run_session<C, S, F>(
    engine: &mut PlaybackEngine<C>,
    config: &SessionConfig,
    skip: F,
    sink: &mut S,
) -> SessionReport
where
    C: Clock,
    S: PoseSink + ?Sized,
    F: Future<Output = ()>,
{
    let mut report = SessionReport {
        outcome: SessionOutcome::Empty,
        ticks: 0,
        poses: 0,
        elapsed: 0.0,
    };

    if engine.buffer().is_empty() {
        info!("Nothing to replay");
        return report;
    }

    let mut interval = tokio::time::interval(config.tick_period());
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    tokio::pin!(skip);
    let mut skip_armed = true;

    engine.start();
    info!(
        frames = engine.buffer().len(),
        duration = engine.duration(),
        tick_rate_hz = config.tick_rate_hz,
        "Replay started"
    );
    let mut last_tick = Instant::now();

    loop {
        tokio::select! {
            biased;

            _ = &mut skip, if skip_armed => {
                skip_armed = false;
                debug!("Skip requested");
                engine.skip();
            }

            now = interval.tick() => {
                let dt = now.saturating_duration_since(last_tick);
                last_tick = now;
                report.ticks += 1;

                if let Some(pose) = engine.update(dt).copied() {
                    report.poses += 1;
                    sink.pose(&pose, engine.progress());
                }

                if config.progress_log_interval > 0
                    && report.ticks % config.progress_log_interval as u64 == 0
                {
                    info!(
                        progress = format_args!("{:5.1}%", engine.progress() * 100.0),
                        elapsed = format_args!("{:.2}s", engine.elapsed()),
                        "Replaying"
                    );
                }
            }
        }

        if let Some(event) = engine.take_event() {
            report.outcome = match event {
                PlaybackEvent::Finished => SessionOutcome::Completed,
                PlaybackEvent::Skipped => SessionOutcome::Skipped,
            };
            break;
        }
    }

    report.elapsed = engine.elapsed();
    info!(
        outcome = ?report.outcome,
        ticks = report.ticks,
        poses = report.poses,
        "Replay ended"
    );
    report
}
