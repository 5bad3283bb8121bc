use crate::common::file_utils;
use crate::core::capture_shell::{CaptureRequest, CaptureShell};
use crate::core::scheduler::ShotPlan;
use crate::errors::AppError;
use crate::modes::profile::ShootingProfile;
use crate::modes::shooting_mode::ShootingMode;
use crate::speech::announcer::Announcer;
use log::{debug, error, info, warn};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep_until, Instant};

/// Immutable run parameters, resolved once at configuration time.
#[derive(Debug, Clone)]
pub struct SequencerConfig {
    pub mode: ShootingMode,
    pub duration: Duration,
    pub interval: Duration,
    pub output_dir: PathBuf,
    pub failure_threshold: u32,
    pub announce_capture_failures: bool,
    pub progress_announce_interval: Duration,
    pub filename_timestamp_format: String,
    pub image_extension: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Idle,
    Configuring,
    Running,
    Capturing,
    Waiting,
    Finishing,
    Aborting,
    Done,
}

/// Mutable per-run bookkeeping, owned exclusively by the sequencer loop.
#[derive(Debug)]
pub struct RunState {
    pub phase: RunPhase,
    pub shots_total: usize,
    pub shots_done: usize,
    pub captures_attempted: u32,
    pub captures_failed: u32,
    pub consecutive_failures: u32,
    pub last_capture_ok: bool,
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub shots_scheduled: usize,
    pub shots_completed: usize,
    pub captures_attempted: u32,
    pub captures_failed: u32,
    pub interrupted: bool,
    pub elapsed: Duration,
}

/// Drives one time-lapse session: walks the shot plan, resolves per-shot
/// settings from the mode profile, issues captures through the shell, and
/// keeps going through individual failures.
pub struct Sequencer {
    config: SequencerConfig,
    profile: ShootingProfile,
    plan: ShotPlan,
    shell: Box<dyn CaptureShell>,
    announcer: Box<dyn Announcer>,
    state: RunState,
}

impl Sequencer {
    pub fn new(
        config: SequencerConfig,
        shell: Box<dyn CaptureShell>,
        announcer: Box<dyn Announcer>,
    ) -> Result<Self, AppError> {
        if config.failure_threshold == 0 {
            return Err(AppError::Config(
                "failure_threshold must be at least 1.".to_string(),
            ));
        }
        let profile = ShootingProfile::for_mode(config.mode);
        let plan = ShotPlan::build(config.duration, config.interval)?;
        let state = RunState {
            phase: RunPhase::Configuring,
            shots_total: plan.len(),
            shots_done: 0,
            captures_attempted: 0,
            captures_failed: 0,
            consecutive_failures: 0,
            last_capture_ok: true,
        };
        Ok(Sequencer {
            config,
            profile,
            plan,
            shell,
            announcer,
            state,
        })
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    /// Run the session to completion. `cancel` is checked at loop boundaries
    /// only (never mid-capture); a set flag takes the same finishing path as
    /// normal completion.
    pub async fn run(&mut self, cancel: Arc<AtomicBool>) -> Result<RunSummary, AppError> {
        let start = Instant::now();
        let total_shots = self.state.shots_total;
        self.state.phase = RunPhase::Running;
        info!(
            "🚀 Starting {} time-lapse: {} shots over {:?} at {:?} intervals, saving to {}.",
            self.config.mode,
            total_shots,
            self.config.duration,
            self.config.interval,
            self.config.output_dir.display()
        );
        self.announcer
            .say(&format!(
                "Starting time-lapse session in {} mode",
                self.config.mode
            ))
            .await;

        let mut interrupted = false;
        let mut last_progress_announce = Duration::ZERO;
        let offsets: Vec<Duration> = self.plan.offsets().to_vec();

        for (shot_index, offset) in offsets.into_iter().enumerate() {
            // Drift-corrected wait: sleep until the absolute scheduled
            // instant, measured from run start, never a summed relative sleep.
            let deadline = start + offset;
            if Instant::now() < deadline {
                self.state.phase = RunPhase::Waiting;
                debug!(
                    "⏳ Waiting until t+{:?} for shot {}/{}...",
                    offset,
                    shot_index + 1,
                    total_shots
                );
                sleep_until(deadline).await;
            } else if shot_index > 0 {
                debug!(
                    "🏃 Behind schedule at shot {}/{} (t+{:?}); capturing immediately.",
                    shot_index + 1,
                    total_shots,
                    offset
                );
            }

            if cancel.load(Ordering::Relaxed) {
                warn!(
                    "🛑 Interrupt received; finishing early after {} of {} shots.",
                    self.state.shots_done, total_shots
                );
                self.announcer
                    .say("Time-lapse session interrupted by user")
                    .await;
                interrupted = true;
                break;
            }

            self.state.phase = RunPhase::Capturing;
            if let Err(e) = self.capture_shot(shot_index).await {
                // Aborted runs still flush their progress and summary.
                self.log_progress(start.elapsed());
                error!(
                    "🏁 Session aborted: {}/{} shots, {} captures attempted, {} failed, elapsed {:?}.",
                    self.state.shots_done,
                    total_shots,
                    self.state.captures_attempted,
                    self.state.captures_failed,
                    start.elapsed()
                );
                return Err(e);
            }
            self.state.shots_done += 1;
            self.log_progress(start.elapsed());

            let elapsed = start.elapsed();
            if elapsed - last_progress_announce >= self.config.progress_announce_interval
                && shot_index + 1 < total_shots
            {
                let remaining = self.config.duration.saturating_sub(elapsed);
                self.announcer
                    .say(&format!(
                        "Time-lapse progress: {} minutes remaining",
                        remaining.as_secs() / 60
                    ))
                    .await;
                last_progress_announce = elapsed;
            }
        }

        self.state.phase = RunPhase::Finishing;
        debug!("Final run state: {:?}", self.state);
        let summary = RunSummary {
            shots_scheduled: total_shots,
            shots_completed: self.state.shots_done,
            captures_attempted: self.state.captures_attempted,
            captures_failed: self.state.captures_failed,
            interrupted,
            elapsed: start.elapsed(),
        };
        info!(
            "🏁 Session finished: {}/{} shots, {} captures attempted, {} failed, elapsed {:?}.",
            summary.shots_completed,
            summary.shots_scheduled,
            summary.captures_attempted,
            summary.captures_failed,
            summary.elapsed
        );
        self.announcer.say("Time-lapse session completed").await;
        self.state.phase = RunPhase::Done;
        Ok(summary)
    }

    /// Issue every capture for one scheduled instant: one frame per bracket
    /// offset, in increasing exposure order. Individual failures are
    /// recoverable; only the consecutive-failure threshold is fatal.
    async fn capture_shot(&mut self, shot_index: usize) -> Result<(), AppError> {
        let resolved = self.profile.resolved_for_shot(shot_index);
        let ev_offsets = self.profile.settings().bracketing.offsets();
        let frames = ev_offsets.len();

        for (bracket_index, ev_offset) in ev_offsets.into_iter().enumerate() {
            let filename = file_utils::capture_filename(
                self.config.mode.as_str(),
                &self.config.filename_timestamp_format,
                shot_index,
                bracket_index,
                &self.config.image_extension,
            );
            let request = CaptureRequest {
                aperture: resolved.aperture.to_string(),
                shutter_speed: resolved.shutter_speed.to_string(),
                iso: resolved.iso,
                white_balance: resolved.white_balance.to_string(),
                ev_offset,
                output_path: self.config.output_dir.join(filename),
            };

            self.state.captures_attempted += 1;
            info!(
                "📸 Shot {}/{} frame {}/{}: aperture={} shutter={} iso={} ev={:+.1}",
                shot_index + 1,
                self.state.shots_total,
                bracket_index + 1,
                frames,
                request.aperture,
                request.shutter_speed,
                request.iso,
                request.ev_offset
            );

            match self.shell.capture(&request).await {
                Ok(path) => {
                    self.state.consecutive_failures = 0;
                    self.state.last_capture_ok = true;
                    debug!("  ✅ Saved {}", path.display());
                }
                Err(e) => {
                    self.state.captures_failed += 1;
                    self.state.consecutive_failures += 1;
                    self.state.last_capture_ok = false;
                    error!(
                        "❌ Capture failed (shot {}, frame {}, {} consecutive): {}",
                        shot_index + 1,
                        bracket_index + 1,
                        self.state.consecutive_failures,
                        e
                    );
                    if self.config.announce_capture_failures {
                        self.announcer.say("Capture failed, continuing").await;
                    }
                    if self.state.consecutive_failures >= self.config.failure_threshold {
                        let count = self.state.consecutive_failures;
                        self.state.phase = RunPhase::Aborting;
                        error!(
                            "🛑 {} consecutive capture failures; camera appears unreachable. Aborting session.",
                            count
                        );
                        self.announcer
                            .say("Camera is not responding. Aborting time-lapse session.")
                            .await;
                        self.state.phase = RunPhase::Done;
                        return Err(AppError::ConsecutiveFailures { count });
                    }
                }
            }
        }
        Ok(())
    }

    fn log_progress(&self, elapsed: Duration) {
        let percent = self.state.shots_done * 100 / self.state.shots_total.max(1);
        let remaining = self.config.duration.saturating_sub(elapsed);
        info!(
            "📊 [{}/{}] {}% — elapsed {:?}, remaining {:?}, failed captures: {}",
            self.state.shots_done,
            self.state.shots_total,
            percent,
            elapsed,
            remaining,
            self.state.captures_failed
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::Mutex;

    struct MockShell {
        calls: Arc<Mutex<Vec<CaptureRequest>>>,
        fail_at: HashSet<usize>,
        delays: Vec<Duration>,
    }

    impl MockShell {
        fn new(calls: Arc<Mutex<Vec<CaptureRequest>>>) -> Self {
            MockShell {
                calls,
                fail_at: HashSet::new(),
                delays: Vec::new(),
            }
        }
    }

    #[async_trait]
    impl CaptureShell for MockShell {
        async fn capture(&self, request: &CaptureRequest) -> Result<PathBuf, AppError> {
            let index = {
                let mut calls = self.calls.lock().unwrap();
                calls.push(request.clone());
                calls.len() - 1
            };
            if let Some(delay) = self.delays.get(index) {
                tokio::time::sleep(*delay).await;
            }
            if self.fail_at.contains(&index) {
                Err(AppError::Capture(format!("simulated failure #{}", index)))
            } else {
                Ok(request.output_path.clone())
            }
        }
    }

    struct MockAnnouncer {
        lines: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl Announcer for MockAnnouncer {
        async fn say(&mut self, text: &str) {
            self.lines.lock().unwrap().push(text.to_string());
        }
    }

    fn test_config(mode: ShootingMode, duration: u64, interval: u64) -> SequencerConfig {
        SequencerConfig {
            mode,
            duration: Duration::from_secs(duration),
            interval: Duration::from_secs(interval),
            output_dir: PathBuf::from("/tmp/lapsectl-test"),
            failure_threshold: 3,
            announce_capture_failures: false,
            progress_announce_interval: Duration::from_secs(1800),
            filename_timestamp_format: "%Y%m%dT%H%M%S".to_string(),
            image_extension: "jpg".to_string(),
        }
    }

    struct Harness {
        sequencer: Sequencer,
        calls: Arc<Mutex<Vec<CaptureRequest>>>,
        lines: Arc<Mutex<Vec<String>>>,
    }

    fn harness(
        config: SequencerConfig,
        fail_at: HashSet<usize>,
        delays: Vec<Duration>,
    ) -> Harness {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let lines = Arc::new(Mutex::new(Vec::new()));
        let mut shell = MockShell::new(Arc::clone(&calls));
        shell.fail_at = fail_at;
        shell.delays = delays;
        let announcer = MockAnnouncer {
            lines: Arc::clone(&lines),
        };
        let sequencer =
            Sequencer::new(config, Box::new(shell), Box::new(announcer)).unwrap();
        Harness {
            sequencer,
            calls,
            lines,
        }
    }

    fn no_cancel() -> Arc<AtomicBool> {
        Arc::new(AtomicBool::new(false))
    }

    #[tokio::test(start_paused = true)]
    async fn custom_sixty_seconds_at_ten_second_interval_takes_seven_captures() {
        let mut h = harness(
            test_config(ShootingMode::Custom, 60, 10),
            HashSet::new(),
            Vec::new(),
        );
        let summary = h.sequencer.run(no_cancel()).await.unwrap();

        assert_eq!(summary.shots_scheduled, 7);
        assert_eq!(summary.shots_completed, 7);
        assert_eq!(summary.captures_attempted, 7);
        assert_eq!(summary.captures_failed, 0);
        assert!(!summary.interrupted);
        assert_eq!(summary.elapsed, Duration::from_secs(60));
        assert_eq!(h.calls.lock().unwrap().len(), 7);
    }

    #[tokio::test(start_paused = true)]
    async fn bracketed_mode_issues_one_capture_per_offset_in_increasing_ev_order() {
        // Day mode brackets at one EV: three frames per scheduled instant.
        let mut h = harness(
            test_config(ShootingMode::Day, 60, 30),
            HashSet::new(),
            Vec::new(),
        );
        let summary = h.sequencer.run(no_cancel()).await.unwrap();

        assert_eq!(summary.shots_completed, 3);
        assert_eq!(summary.captures_attempted, 9);
        let calls = h.calls.lock().unwrap();
        assert_eq!(calls.len(), 9);
        for shot in calls.chunks(3) {
            assert_eq!(shot[0].ev_offset, -1.0);
            assert_eq!(shot[1].ev_offset, 0.0);
            assert_eq!(shot[2].ev_offset, 1.0);
        }
        // All nine filenames must be distinct.
        let names: HashSet<_> = calls.iter().map(|c| c.output_path.clone()).collect();
        assert_eq!(names.len(), 9);
    }

    #[tokio::test(start_paused = true)]
    async fn single_failure_does_not_stop_the_run() {
        let mut h = harness(
            test_config(ShootingMode::Custom, 60, 10),
            HashSet::from([2]),
            Vec::new(),
        );
        let summary = h.sequencer.run(no_cancel()).await.unwrap();

        assert_eq!(summary.shots_completed, 7);
        assert_eq!(summary.captures_attempted, 7);
        assert_eq!(summary.captures_failed, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn threshold_consecutive_failures_aborts_the_run() {
        // Every capture fails; threshold is 3, so the run must stop after
        // exactly three attempts.
        let mut h = harness(
            test_config(ShootingMode::Custom, 60, 10),
            (0..7).collect(),
            Vec::new(),
        );
        let err = h.sequencer.run(no_cancel()).await.unwrap_err();

        assert!(matches!(err, AppError::ConsecutiveFailures { count: 3 }));
        assert_eq!(h.calls.lock().unwrap().len(), 3);
        let lines = h.lines.lock().unwrap();
        assert!(lines.iter().any(|l| l.contains("Aborting")));
        // The abort path still finishes its bookkeeping before returning.
        assert_eq!(h.sequencer.state().captures_attempted, 3);
        assert_eq!(h.sequencer.state().captures_failed, 3);
        assert_eq!(h.sequencer.state().shots_done, 0);
        assert_eq!(h.sequencer.state().phase, RunPhase::Done);
    }

    #[tokio::test(start_paused = true)]
    async fn failure_counter_resets_on_success() {
        // fail, ok, fail, fail, ok... never reaches three in a row.
        let mut h = harness(
            test_config(ShootingMode::Custom, 60, 10),
            HashSet::from([0, 2, 3]),
            Vec::new(),
        );
        let summary = h.sequencer.run(no_cancel()).await.unwrap();

        assert_eq!(summary.shots_completed, 7);
        assert_eq!(summary.captures_failed, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_capture_does_not_accumulate_schedule_drift() {
        // First capture takes 25s, blowing through the 10s and 20s slots.
        // Elapsed-time scheduling catches up immediately and finishes the
        // run at the configured 60s mark instead of 85s.
        let mut h = harness(
            test_config(ShootingMode::Custom, 60, 10),
            HashSet::new(),
            vec![Duration::from_secs(25)],
        );
        let summary = h.sequencer.run(no_cancel()).await.unwrap();

        assert_eq!(summary.shots_completed, 7);
        assert_eq!(summary.elapsed, Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn interrupt_takes_the_finishing_path_between_shots() {
        let cancel = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancel);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(15)).await;
            flag.store(true, Ordering::Relaxed);
        });

        let mut h = harness(
            test_config(ShootingMode::Custom, 60, 10),
            HashSet::new(),
            Vec::new(),
        );
        let summary = h.sequencer.run(cancel).await.unwrap();

        assert!(summary.interrupted);
        assert_eq!(summary.shots_completed, 2);
        let lines = h.lines.lock().unwrap();
        assert!(lines.iter().any(|l| l.contains("interrupted")));
        // The finishing announcement still fires on the interrupt path.
        assert!(lines.iter().any(|l| l.contains("completed")));
    }

    #[tokio::test(start_paused = true)]
    async fn periodic_progress_is_announced_but_never_after_the_final_shot() {
        let mut config = test_config(ShootingMode::Custom, 60, 10);
        config.progress_announce_interval = Duration::from_secs(20);
        let mut h = harness(config, HashSet::new(), Vec::new());
        h.sequencer.run(no_cancel()).await.unwrap();

        let lines = h.lines.lock().unwrap();
        let progress_cues = lines
            .iter()
            .filter(|l| l.contains("minutes remaining"))
            .count();
        // Shots land at t=0..60; the 20s cadence fires at t=20 and t=40.
        // The final shot at t=60 must not trigger another cue.
        assert_eq!(progress_cues, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn capture_failures_are_announced_when_configured() {
        let mut config = test_config(ShootingMode::Custom, 60, 10);
        config.announce_capture_failures = true;
        let mut h = harness(config, HashSet::from([2]), Vec::new());
        let summary = h.sequencer.run(no_cancel()).await.unwrap();

        assert_eq!(summary.captures_failed, 1);
        let lines = h.lines.lock().unwrap();
        assert_eq!(
            lines.iter().filter(|l| l.contains("Capture failed")).count(),
            1
        );
    }

    #[tokio::test(start_paused = true)]
    async fn broken_speech_tool_never_fails_the_run() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let shell = MockShell::new(Arc::clone(&calls));
        // A speech binary that cannot even spawn: every cue fails and must
        // be swallowed without touching the capture schedule.
        let announcer = crate::speech::festival::FestivalAnnouncer::new("lapsectl-no-such-binary");
        let mut sequencer = Sequencer::new(
            test_config(ShootingMode::Custom, 60, 10),
            Box::new(shell),
            Box::new(announcer),
        )
        .unwrap();
        let summary = sequencer.run(no_cancel()).await.unwrap();

        assert_eq!(summary.shots_completed, 7);
        assert_eq!(summary.captures_failed, 0);
        assert_eq!(calls.lock().unwrap().len(), 7);
    }

    #[tokio::test(start_paused = true)]
    async fn start_and_completion_are_announced() {
        let mut h = harness(
            test_config(ShootingMode::Custom, 10, 10),
            HashSet::new(),
            Vec::new(),
        );
        h.sequencer.run(no_cancel()).await.unwrap();
        let lines = h.lines.lock().unwrap();
        assert!(lines.iter().any(|l| l.contains("Starting time-lapse")));
        assert!(lines.iter().any(|l| l.contains("completed")));
    }

    #[test]
    fn zero_failure_threshold_is_rejected() {
        let mut config = test_config(ShootingMode::Custom, 60, 10);
        config.failure_threshold = 0;
        let calls = Arc::new(Mutex::new(Vec::new()));
        let shell = MockShell::new(calls);
        let announcer = MockAnnouncer {
            lines: Arc::new(Mutex::new(Vec::new())),
        };
        let result = Sequencer::new(config, Box::new(shell), Box::new(announcer));
        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
