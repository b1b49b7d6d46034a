//! Frame cycle timing instrumentation.
//!
//! Tracks per-cycle timing and keeps rolling statistics for status logging.

use std::collections::VecDeque;

/// Rolling cycle timing statistics over a window of samples.
#[derive(Debug)]
pub struct CycleTiming {
    /// Time spent waiting on the landmark source.
    pub acquire_times: VecDeque<f64>,
    /// Time spent on extraction, estimation, and UI updates.
    pub process_times: VecDeque<f64>,
    pub total_times: VecDeque<f64>,
    /// Maximum number of samples to keep.
    pub window_size: usize,
    pub total_cycles: u64,
    /// Cycles whose landmark source call failed.
    pub failed_cycles: u64,
    /// Cycles that took longer than the frame interval.
    pub overrun_cycles: u64,
    /// Frame interval in milliseconds.
    pub budget_ms: f64,
}

impl CycleTiming {
    pub fn new(window_size: usize, budget_ms: f64) -> Self {
        Self {
            acquire_times: VecDeque::with_capacity(window_size),
            process_times: VecDeque::with_capacity(window_size),
            total_times: VecDeque::with_capacity(window_size),
            window_size,
            total_cycles: 0,
            failed_cycles: 0,
            overrun_cycles: 0,
            budget_ms,
        }
    }

    /// Record a completed cycle.
    pub fn record_cycle(&mut self, acquire_ms: f64, process_ms: f64) {
        let total = acquire_ms + process_ms;

        Self::push_sample(&mut self.acquire_times, acquire_ms, self.window_size);
        Self::push_sample(&mut self.process_times, process_ms, self.window_size);
        Self::push_sample(&mut self.total_times, total, self.window_size);

        self.total_cycles += 1;
        if total > self.budget_ms {
            self.overrun_cycles += 1;
        }
    }

    /// Record a cycle whose landmark source call failed.
    pub fn record_failure(&mut self, acquire_ms: f64) {
        Self::push_sample(&mut self.acquire_times, acquire_ms, self.window_size);
        self.total_cycles += 1;
        self.failed_cycles += 1;
    }

    fn push_sample(samples: &mut VecDeque<f64>, value: f64, window_size: usize) {
        samples.push_back(value);
        while samples.len() > window_size {
            samples.pop_front();
        }
    }

    /// Compute percentile from a sorted slice.
    fn percentile(sorted: &[f64], p: f64) -> f64 {
        if sorted.is_empty() {
            return 0.0;
        }
        let idx = ((sorted.len() as f64 - 1.0) * p / 100.0).round() as usize;
        sorted[idx.min(sorted.len() - 1)]
    }

    fn sorted(samples: &VecDeque<f64>) -> Vec<f64> {
        let mut v: Vec<f64> = samples.iter().copied().collect();
        v.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        v
    }

    pub fn stats(&self) -> CycleTimingStats {
        let acquire = Self::sorted(&self.acquire_times);
        let process = Self::sorted(&self.process_times);
        let total = Self::sorted(&self.total_times);
        let total_p50 = Self::percentile(&total, 50.0);

        CycleTimingStats {
            acquire_p50: Self::percentile(&acquire, 50.0),
            acquire_p99: Self::percentile(&acquire, 99.0),
            process_p50: Self::percentile(&process, 50.0),
            process_p99: Self::percentile(&process, 99.0),
            total_p50,
            total_p99: Self::percentile(&total, 99.0),
            // The next cycle is scheduled one interval after this one ends.
            effective_fps: if self.budget_ms + total_p50 > 0.0 {
                1000.0 / (self.budget_ms + total_p50)
            } else {
                0.0
            },
            overrun_pct: if self.total_cycles > 0 {
                (self.overrun_cycles as f64 / self.total_cycles as f64) * 100.0
            } else {
                0.0
            },
            total_cycles: self.total_cycles,
            failed_cycles: self.failed_cycles,
            overrun_cycles: self.overrun_cycles,
        }
    }

    /// Format stats as an s-expression.
    pub fn stats_sexp(&self) -> String {
        let s = self.stats();
        format!(
            "(:acquire-p50 {:.1} :process-p50 {:.1} :total-p50 {:.1} :total-p99 {:.1} :overrun-pct {:.1} :fps {:.1} :total-cycles {} :failed-cycles {})",
            s.acquire_p50, s.process_p50, s.total_p50, s.total_p99,
            s.overrun_pct, s.effective_fps, s.total_cycles, s.failed_cycles,
        )
    }
}

/// Computed cycle timing statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleTimingStats {
    pub acquire_p50: f64,
    pub acquire_p99: f64,
    pub process_p50: f64,
    pub process_p99: f64,
    pub total_p50: f64,
    pub total_p99: f64,
    pub effective_fps: f64,
    pub overrun_pct: f64,
    pub total_cycles: u64,
    pub failed_cycles: u64,
    pub overrun_cycles: u64,
}
