use crate::core::{FrameBuffer, FrameSample};
use crate::playback::{
    interpolate, locate, Clock, PlaybackConfig, PlaybackEvent, PlaybackState, SystemClock,
};
use std::time::Duration;
use tracing::{debug, trace};

/// Playback engine for recorded frames.
///
/// Drive it with `start` and then one `update` per tick. Poses are written
/// into a single slot owned by the engine, so the reference returned by
/// `update` is only good until the next call; copy it out if it has to live
/// longer.
pub struct PlaybackEngine<C: Clock = SystemClock> {
    buffer: FrameBuffer,
    clock: C,
    config: PlaybackConfig,
    state: PlaybackState,
    /// Clock reading taken by `start`
    start_time: Duration,
    /// Seconds since `start` as of the last update
    elapsed: f64,
    pose: FrameSample,
    has_pose: bool,
    /// Set once a zero-duration replay has shown its only frame
    instant_shown: bool,
    event: Option<PlaybackEvent>,
}

impl PlaybackEngine<SystemClock> {
    pub fn new(buffer: FrameBuffer) -> Self {
        Self::with_clock(buffer, SystemClock::new())
    }
}

impl<C: Clock> PlaybackEngine<C> {
    pub fn with_clock(buffer: FrameBuffer, clock: C) -> Self {
        Self::with_config(buffer, clock, PlaybackConfig::default())
    }

    pub fn with_config(buffer: FrameBuffer, clock: C, config: PlaybackConfig) -> Self {
        Self {
            buffer,
            clock,
            config,
            state: PlaybackState::Idle,
            start_time: Duration::ZERO,
            elapsed: 0.0,
            pose: FrameSample::default(),
            has_pose: false,
            instant_shown: false,
            event: None,
        }
    }

    /// Replace the recording and return to `Idle`
    pub fn load(&mut self, buffer: FrameBuffer) {
        debug!(frames = buffer.len(), duration = buffer.duration(), "Replay loaded");
        self.buffer = buffer;
        self.state = PlaybackState::Idle;
        self.reset_progress();
    }

    pub fn buffer(&self) -> &FrameBuffer {
        &self.buffer
    }

    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    /// Get current playback state
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Check if currently playing
    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    /// Seconds since `start`, as of the last update or stop
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Timestamp of the last recorded frame, or 0 when there are none
    pub fn duration(&self) -> f64 {
        self.buffer.duration()
    }

    /// Fraction of the replay shown so far, in `[0, 1]`.
    ///
    /// A zero-duration (or empty) replay reports 1.
    pub fn progress(&self) -> f64 {
        let duration = self.duration();
        if duration <= 0.0 {
            return 1.0;
        }
        (self.elapsed / duration).clamp(0.0, 1.0)
    }

    /// Start playback from the beginning. Restarting mid-playback is allowed.
    pub fn start(&mut self) {
        self.reset_progress();
        self.start_time = self.clock.now();
        self.state = PlaybackState::Playing;
        debug!(
            frames = self.buffer.len(),
            duration = self.duration(),
            "Playback started"
        );
    }

    /// Halt playback, keeping the elapsed time. Calling it again does nothing.
    pub fn stop(&mut self) {
        if self.state != PlaybackState::Playing {
            return;
        }
        self.elapsed = self.read_elapsed();
        self.state = PlaybackState::Stopped;
        debug!(elapsed = self.elapsed, "Playback stopped");
    }

    /// Continue a stopped replay from where it was halted
    pub fn resume(&mut self) {
        if self.state != PlaybackState::Stopped {
            return;
        }
        self.start_time = self
            .clock
            .now()
            .saturating_sub(Duration::from_secs_f64(self.elapsed.max(0.0)));
        self.state = PlaybackState::Playing;
        debug!(elapsed = self.elapsed, "Playback resumed");
    }

    /// End playback early. Subsequent updates return no pose and
    /// `take_event` reports [`PlaybackEvent::Skipped`].
    pub fn skip(&mut self) {
        self.stop();
        if self.state == PlaybackState::Finished {
            return;
        }
        self.state = PlaybackState::Finished;
        self.event = Some(PlaybackEvent::Skipped);
        debug!(elapsed = self.elapsed, "Playback skipped");
    }

    /// Take the pending end-of-playback event, if any
    pub fn take_event(&mut self) -> Option<PlaybackEvent> {
        self.event.take()
    }

    /// Advance playback (call each tick).
    ///
    /// Timing comes from the clock, not from `dt`, so frame-rate jitter does
    /// not accumulate. Returns `None` when not playing, when the buffer is
    /// empty, or once the replay has run out.
    pub fn update(&mut self, _dt: Duration) -> Option<&FrameSample> {
        if self.state != PlaybackState::Playing || self.buffer.is_empty() {
            return None;
        }

        self.elapsed = self.read_elapsed();
        let duration = self.duration();

        if duration > 0.0 {
            if self.elapsed >= duration {
                self.finish();
                return None;
            }
        } else if self.instant_shown {
            if self.elapsed > self.config.nominal_frame_interval.as_secs_f64() {
                self.finish();
            }
            return None;
        } else {
            self.instant_shown = true;
        }

        self.sample(self.elapsed)
    }

    /// Interpolate the recording at an arbitrary time without touching
    /// playback state. Shares the result slot with `update`.
    pub fn sample_at(&mut self, time: f64) -> Option<&FrameSample> {
        self.sample(time)
    }

    /// Copy of the last pose written to the result slot, by either `update`
    /// or `sample_at`. Cleared by `start` and `load`.
    pub fn current_pose(&self) -> Option<FrameSample> {
        self.has_pose.then_some(self.pose)
    }

    fn sample(&mut self, time: f64) -> Option<&FrameSample> {
        let hit = locate(&self.buffer, time)?;
        trace!(time, low = hit.low, high = hit.high, t = hit.t, "Sampling");

        let frames = self.buffer.frames();
        interpolate(&frames[hit.low], &frames[hit.high], hit.t, &mut self.pose);
        self.has_pose = true;
        Some(&self.pose)
    }

    fn finish(&mut self) {
        self.state = PlaybackState::Finished;
        self.event = Some(PlaybackEvent::Finished);
        debug!(elapsed = self.elapsed, "Playback finished");
    }

    fn read_elapsed(&self) -> f64 {
        self.clock.now().saturating_sub(self.start_time).as_secs_f64()
    }

    fn reset_progress(&mut self) {
        self.elapsed = 0.0;
        self.has_pose = false;
        self.instant_shown = false;
        self.event = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::ManualClock;
    use glam::{Quat, Vec3};
    use std::f32::consts::{FRAC_1_SQRT_2, PI};

    const TICK: Duration = Duration::from_millis(16);

    fn engine(frames: Vec<FrameSample>) -> (PlaybackEngine<ManualClock>, ManualClock) {
        let clock = ManualClock::new();
        (PlaybackEngine::with_clock(frames.into(), clock.clone()), clock)
    }

    /// 10 seconds at 30Hz, vehicle driving along +X at 1m/s
    fn ten_seconds() -> Vec<FrameSample> {
        (0..300)
            .map(|i| {
                let time = i as f64 * 10.0 / 299.0;
                FrameSample::new(time, Vec3::new(time as f32, 0.0, 0.0), Quat::IDENTITY)
            })
            .collect()
    }

    #[test]
    fn test_idle_until_started() {
        let (mut engine, clock) = engine(ten_seconds());
        assert_eq!(engine.state(), PlaybackState::Idle);

        clock.advance(Duration::from_secs(1));
        assert!(engine.update(TICK).is_none());
        assert_eq!(engine.progress(), 0.0);
        assert_eq!(engine.take_event(), None);
    }

    #[test]
    fn test_interpolates_between_samples() {
        let frames = vec![
            FrameSample::new(0.0, Vec3::ZERO, Quat::IDENTITY),
            FrameSample::new(2.0, Vec3::new(2.0, 0.0, 0.0), Quat::from_rotation_y(PI)),
        ];
        let (mut engine, clock) = engine(frames);

        engine.start();
        clock.advance(Duration::from_secs(1));
        let pose = *engine.update(TICK).unwrap();

        assert!((pose.time - 1.0).abs() < 1e-9);
        assert!(pose.primary_position.abs_diff_eq(Vec3::new(1.0, 0.0, 0.0), 1e-5));
        let q = pose.primary_orientation;
        assert!((q.length() - 1.0).abs() < 1e-5);
        assert!((q.w - FRAC_1_SQRT_2).abs() < 1e-5);
        assert!((q.y.abs() - FRAC_1_SQRT_2).abs() < 1e-5);
        assert!((engine.progress() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_dt_is_ignored() {
        let (mut engine, clock) = engine(ten_seconds());
        engine.start();
        clock.advance(Duration::from_secs(3));

        let a = *engine.update(Duration::from_secs(100)).unwrap();
        let b = *engine.update(Duration::ZERO).unwrap();
        assert_eq!(a, b);
        assert!((a.time - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_finishes_at_duration() {
        let (mut engine, clock) = engine(ten_seconds());
        engine.start();

        clock.advance(Duration::from_millis(9_990));
        assert!(engine.update(TICK).is_some());
        assert_eq!(engine.take_event(), None);

        clock.advance(Duration::from_millis(10));
        assert!(engine.update(TICK).is_none());
        assert_eq!(engine.state(), PlaybackState::Finished);
        assert_eq!(engine.progress(), 1.0);
        assert_eq!(engine.take_event(), Some(PlaybackEvent::Finished));
        assert_eq!(engine.take_event(), None);

        clock.advance(TICK);
        assert!(engine.update(TICK).is_none());
    }

    #[test]
    fn test_progress_is_monotonic() {
        let (mut engine, clock) = engine(ten_seconds());
        engine.start();

        let mut last = engine.progress();
        let steps = [0u64, 7, 16, 16, 33, 0, 250, 1, 1000, 16, 5000, 4000];
        for ms in steps {
            clock.advance(Duration::from_millis(ms));
            engine.update(TICK);
            let now = engine.progress();
            assert!(now >= last, "{} < {}", now, last);
            last = now;
            if engine.state() == PlaybackState::Finished {
                break;
            }
        }
        assert_eq!(engine.state(), PlaybackState::Finished);
    }

    #[test]
    fn test_empty_buffer_is_safe() {
        let (mut engine, clock) = engine(Vec::new());

        assert_eq!(engine.duration(), 0.0);
        assert_eq!(engine.progress(), 1.0);
        engine.start();
        for _ in 0..3 {
            clock.advance(TICK);
            assert!(engine.update(TICK).is_none());
        }
        assert!(engine.sample_at(1.0).is_none());
        assert_eq!(engine.progress(), 1.0);
        assert_eq!(engine.current_pose(), None);
        engine.stop();
        engine.skip();
        assert_eq!(engine.take_event(), Some(PlaybackEvent::Skipped));
    }

    #[test]
    fn test_single_sample_shows_one_pose() {
        let only = FrameSample::new(0.0, Vec3::new(4.0, 5.0, 6.0), Quat::from_rotation_x(0.5))
            .with_angles([1.0, 2.0, 3.0, 4.0]);
        let (mut engine, clock) = engine(vec![only]);

        assert_eq!(engine.duration(), 0.0);
        engine.start();
        assert_eq!(engine.update(TICK), Some(&only));

        clock.advance(Duration::from_millis(17));
        assert!(engine.update(TICK).is_none());
        assert_eq!(engine.state(), PlaybackState::Finished);
        assert_eq!(engine.take_event(), Some(PlaybackEvent::Finished));
    }

    #[test]
    fn test_shared_timestamp_shows_last_sample_once() {
        let frames: Vec<FrameSample> = [Vec3::X, Vec3::Y, Vec3::Z]
            .into_iter()
            .map(|position| FrameSample::new(0.0, position, Quat::IDENTITY))
            .collect();
        let last = frames[2];
        let (mut engine, clock) = engine(frames);

        assert_eq!(engine.duration(), 0.0);
        assert_eq!(engine.progress(), 1.0);
        engine.start();
        assert_eq!(engine.update(TICK), Some(&last));

        clock.advance(Duration::from_millis(5));
        assert!(engine.update(TICK).is_none());
        assert_eq!(engine.state(), PlaybackState::Playing);
        assert_eq!(engine.take_event(), None);

        clock.advance(Duration::from_millis(12));
        assert!(engine.update(TICK).is_none());
        assert_eq!(engine.state(), PlaybackState::Finished);
        assert_eq!(engine.take_event(), Some(PlaybackEvent::Finished));
        assert_eq!(engine.progress(), 1.0);
    }

    #[test]
    fn test_current_pose_follows_result_slot() {
        let (mut engine, clock) = engine(ten_seconds());
        assert_eq!(engine.current_pose(), None);

        let scrubbed = *engine.sample_at(7.5).unwrap();
        assert_eq!(engine.current_pose(), Some(scrubbed));

        engine.start();
        assert_eq!(engine.current_pose(), None);
        clock.advance(Duration::from_secs(2));
        let played = *engine.update(TICK).unwrap();
        assert_eq!(engine.current_pose(), Some(played));
        assert!((played.time - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_single_sample_does_not_repeat_within_interval() {
        let (mut engine, clock) = engine(vec![FrameSample::default()]);
        engine.start();
        assert!(engine.update(TICK).is_some());

        clock.advance(Duration::from_millis(5));
        assert!(engine.update(TICK).is_none());
        assert_eq!(engine.state(), PlaybackState::Playing);

        clock.advance(Duration::from_millis(20));
        assert!(engine.update(TICK).is_none());
        assert_eq!(engine.state(), PlaybackState::Finished);
    }

    #[test]
    fn test_boundary_snap_returns_last_sample() {
        let frames = ten_seconds();
        let last = *frames.last().unwrap();
        let (mut engine, _clock) = engine(frames);

        assert_eq!(engine.sample_at(engine.duration()), Some(&last));
        assert_eq!(engine.sample_at(1e6), Some(&last));
        assert_eq!(engine.state(), PlaybackState::Idle);
    }

    #[test]
    fn test_stop_is_idempotent() {
        let (mut engine, clock) = engine(ten_seconds());
        engine.start();
        clock.advance(Duration::from_secs(4));
        engine.update(TICK);

        engine.stop();
        let (state, elapsed, progress) = (engine.state(), engine.elapsed(), engine.progress());

        clock.advance(Duration::from_secs(1));
        engine.stop();
        assert_eq!(engine.state(), state);
        assert_eq!(engine.elapsed(), elapsed);
        assert_eq!(engine.progress(), progress);
        assert_eq!(state, PlaybackState::Stopped);
        assert!(engine.update(TICK).is_none());
        assert_eq!(engine.take_event(), None);
    }

    #[test]
    fn test_resume_continues_from_stop() {
        let (mut engine, clock) = engine(ten_seconds());
        engine.start();
        clock.advance(Duration::from_secs(2));
        engine.stop();

        clock.advance(Duration::from_secs(5));
        engine.resume();
        clock.advance(Duration::from_secs(1));
        let pose = *engine.update(TICK).unwrap();
        assert!((pose.time - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_skip_short_circuits() {
        for skip_at in [0u64, 1, 2500, 9999] {
            let (mut engine, clock) = engine(ten_seconds());
            engine.start();
            clock.advance(Duration::from_millis(skip_at));
            engine.update(TICK);

            engine.skip();
            assert_eq!(engine.state(), PlaybackState::Finished);
            assert_eq!(engine.take_event(), Some(PlaybackEvent::Skipped));

            for _ in 0..5 {
                clock.advance(TICK);
                assert!(engine.update(TICK).is_none());
            }
        }
    }

    #[test]
    fn test_restart_resets_progress() {
        let (mut engine, clock) = engine(ten_seconds());
        engine.start();
        clock.advance(Duration::from_secs(20));
        assert!(engine.update(TICK).is_none());
        assert_eq!(engine.state(), PlaybackState::Finished);

        engine.start();
        assert_eq!(engine.take_event(), None);
        assert_eq!(engine.progress(), 0.0);
        let pose = *engine.update(TICK).unwrap();
        assert_eq!(pose.time, 0.0);
    }

    #[test]
    fn test_load_returns_to_idle() {
        let (mut engine, clock) = engine(ten_seconds());
        engine.start();
        clock.advance(Duration::from_secs(1));
        engine.update(TICK);

        engine.load(FrameBuffer::empty());
        assert_eq!(engine.state(), PlaybackState::Idle);
        assert_eq!(engine.current_pose(), None);
        assert_eq!(engine.duration(), 0.0);
    }
}
