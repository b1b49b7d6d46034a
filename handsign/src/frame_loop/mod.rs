//! The frame loop: acquire landmarks, classify each hand, publish results.
//!
//! Runs as a calloop timer on a single thread.  Each cycle runs to
//! completion before the next is armed, and the next one fires one frame
//! interval after the current one ends, so a slow cycle delays the next
//! rather than queueing extra ones.  A landmark source failure skips the
//! frame and the loop carries on.

pub mod timing;

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use calloop::timer::{TimeoutAction, Timer};
use calloop::EventLoop;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::hand::estimator::{GestureEstimator, MatchResult};
use crate::hand::geometry::extract;
use crate::hand::landmarks::{HandJoint, Handedness};
use crate::hand::template::TemplateRegistry;
use crate::shutdown::StopHandle;
use crate::source::{EstimateOptions, LandmarkSource};
use crate::ui::{GestureSink, LandmarkColor, POINT_RADIUS};

pub use timing::{CycleTiming, CycleTimingStats};

/// Number of cycle samples kept for statistics.
const TIMING_WINDOW: usize = 1000;

#[derive(Debug, Clone)]
pub struct FrameLoopConfig {
    /// Delay between the end of one cycle and the start of the next.
    pub interval: Duration,
    /// Minimum score, as a fraction of the maximum.
    pub threshold: f32,
    pub flip_horizontal: bool,
    /// Stop after this many cycles.
    pub max_frames: Option<u64>,
    pub status_interval: Duration,
}

impl FrameLoopConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            interval: config.video.frame_interval(),
            threshold: config.threshold,
            flip_horizontal: config.flip_horizontal,
            max_frames: None,
            status_interval: Duration::from_secs(config.status_interval_secs.max(1)),
        }
    }
}

/// Outcome for one hand in one cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct HandResult {
    pub handedness: Handedness,
    /// Detector confidence for this hand, when the source reports one.
    pub detection_score: Option<f32>,
    pub gesture: Option<MatchResult>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    Processed(Vec<HandResult>),
    SourceFailed,
}

/// Totals reported when the loop ends.
#[derive(Debug, Clone)]
pub struct LoopSummary {
    pub cycles: u64,
    pub failed_cycles: u64,
    pub stats: CycleTimingStats,
}

pub struct FrameLoop<S, K> {
    source: S,
    sink: K,
    registry: Arc<TemplateRegistry>,
    config: FrameLoopConfig,
    timing: CycleTiming,
    stop: StopHandle,
    cycles: u64,
    last_status: Instant,
    /// Last published gesture per hand, indexed by `Handedness`.
    last_gestures: [Option<String>; 2],
}

impl<S: LandmarkSource, K: GestureSink> FrameLoop<S, K> {
    pub fn new(
        source: S,
        sink: K,
        registry: Arc<TemplateRegistry>,
        config: FrameLoopConfig,
    ) -> Self {
        let budget_ms = config.interval.as_secs_f64() * 1000.0;
        Self {
            source,
            sink,
            registry,
            config,
            timing: CycleTiming::new(TIMING_WINDOW, budget_ms),
            stop: StopHandle::new(),
            cycles: 0,
            last_status: Instant::now(),
            last_gestures: [None, None],
        }
    }

    /// Handle that stops the loop before its next cycle.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn timing(&self) -> &CycleTiming {
        &self.timing
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    fn should_continue(&self) -> bool {
        if self.stop.is_stop_requested() || self.source.is_exhausted() {
            return false;
        }
        match self.config.max_frames {
            Some(max) => self.cycles < max,
            None => true,
        }
    }

    /// Run one acquire → classify → publish cycle.
    pub fn run_cycle(&mut self) -> CycleOutcome {
        let start = Instant::now();
        self.cycles += 1;

        report_sink(self.sink.begin_frame());

        let options = EstimateOptions {
            flip_horizontal: self.config.flip_horizontal,
        };
        let hands = match self.source.estimate_hands(&options) {
            Ok(hands) => hands,
            Err(e) => {
                warn!(cycle = self.cycles, "landmark source failed: {:#}", e);
                self.timing.record_failure(elapsed_ms(start));
                report_sink(self.sink.end_frame());
                return CycleOutcome::SourceFailed;
            }
        };
        let acquired = Instant::now();

        let estimator = GestureEstimator::new(&self.registry);
        let mut results = Vec::with_capacity(hands.len());
        for hand in &hands {
            for (i, kp) in hand.keypoints.iter().enumerate() {
                let color = LandmarkColor::for_joint(HandJoint::from_index(i));
                report_sink(self.sink.draw_point(kp.x, kp.y, POINT_RADIUS, color));
            }

            let geometry = extract(&hand.joints);
            let best = estimator.best(&geometry, self.config.threshold);
            debug!(
                cycle = self.cycles,
                hand = hand.handedness.as_str(),
                detection_score = hand.score,
                gesture = best.as_ref().map(|m| m.name.as_str()).unwrap_or("none"),
                "hand classified"
            );

            report_sink(
                self.sink
                    .show_gesture(hand.handedness, best.as_ref().map(|m| m.name.as_str())),
            );
            if best.is_some() {
                report_sink(self.sink.show_finger_debug(hand.handedness, &geometry));
            }

            results.push(HandResult {
                handedness: hand.handedness,
                detection_score: hand.score,
                gesture: best,
            });
        }
        report_sink(self.sink.end_frame());

        self.track_changes(&results);
        self.timing
            .record_cycle(ms_between(start, acquired), elapsed_ms(acquired));
        self.log_status();

        CycleOutcome::Processed(results)
    }

    fn track_changes(&mut self, results: &[HandResult]) {
        let mut current: [Option<String>; 2] = [None, None];
        for r in results {
            if let Some(m) = &r.gesture {
                current[r.handedness.index()] = Some(m.name.clone());
            }
        }
        for hand in Handedness::ALL {
            let i = hand.index();
            if current[i] != self.last_gestures[i] {
                debug!(
                    hand = hand.as_str(),
                    gesture = current[i].as_deref().unwrap_or("none"),
                    "gesture changed"
                );
            }
        }
        self.last_gestures = current;
    }

    fn log_status(&mut self) {
        if self.last_status.elapsed() >= self.config.status_interval {
            info!("frame loop status: {}", self.timing.stats_sexp());
            self.last_status = Instant::now();
        }
    }

    /// Run cycles on a timer until stopped, the source ends, or
    /// `max_frames` is reached.
    pub fn run(mut self) -> Result<LoopSummary> {
        let mut event_loop = EventLoop::<Self>::try_new()?;
        let signal = event_loop.get_signal();
        let interval = self.config.interval;

        event_loop
            .handle()
            .insert_source(Timer::immediate(), move |_, _, frame_loop: &mut Self| {
                if frame_loop.should_continue() {
                    frame_loop.run_cycle();
                }
                if frame_loop.should_continue() {
                    TimeoutAction::ToDuration(interval)
                } else {
                    signal.stop();
                    TimeoutAction::Drop
                }
            })
            .map_err(|e| anyhow::anyhow!("failed to insert frame timer: {:?}", e))?;

        info!(
            "frame loop started ({} templates, interval {}ms, threshold {:.2})",
            self.registry.len(),
            interval.as_millis(),
            self.config.threshold
        );

        event_loop.run(None::<Duration>, &mut self, |_| {})?;

        let stats = self.timing.stats();
        info!(
            "frame loop stopped after {} cycle(s), {} failed",
            self.cycles, stats.failed_cycles
        );
        Ok(LoopSummary {
            cycles: self.cycles,
            failed_cycles: stats.failed_cycles,
            stats,
        })
    }
}

fn report_sink(result: Result<()>) {
    if let Err(e) = result {
        warn!("ui update failed: {:#}", e);
    }
}

fn ms_between(from: Instant, to: Instant) -> f64 {
    to.duration_since(from).as_secs_f64() * 1000.0
}

fn elapsed_ms(from: Instant) -> f64 {
    from.elapsed().as_secs_f64() * 1000.0
}

// ── Tests ──────────────────────────────────────────────────
