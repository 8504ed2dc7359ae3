//! Fixed-step accumulator
//!
//! Converts variable frame time into a bounded number of uniform simulation
//! ticks. Frame deltas are capped, at most `max_substeps` ticks run per frame,
//! and whole steps beyond that are discarded (the fractional remainder is
//! kept for the next frame).

use crate::consts::{MAX_FRAME_DT, MAX_SUBSTEPS, SIM_DT};

#[derive(Debug, Clone)]
pub struct FixedStepScheduler {
    step: f32,
    max_substeps: u32,
    max_frame_dt: f32,
    accumulator: f32,
    dropped: f32,
    total_ticks: u64,
}

impl Default for FixedStepScheduler {
    fn default() -> Self {
        Self::new(SIM_DT, MAX_SUBSTEPS, MAX_FRAME_DT)
    }
}

impl FixedStepScheduler {
    pub fn new(step: f32, max_substeps: u32, max_frame_dt: f32) -> Self {
        Self {
            step,
            max_substeps,
            max_frame_dt,
            accumulator: 0.0,
            dropped: 0.0,
            total_ticks: 0,
        }
    }

    /// Feed one frame of elapsed time, calling `on_tick` once per fixed step.
    /// Returns the number of ticks run.
    pub fn advance(&mut self, frame_dt: f32, mut on_tick: impl FnMut(f32)) -> u32 {
        let frame_dt = if frame_dt.is_finite() {
            frame_dt.clamp(0.0, self.max_frame_dt)
        } else {
            0.0
        };
        self.accumulator += frame_dt;

        let mut substeps = 0;
        while self.accumulator >= self.step && substeps < self.max_substeps {
            on_tick(self.step);
            self.accumulator -= self.step;
            substeps += 1;
        }

        if self.accumulator >= self.step {
            let before = self.accumulator;
            self.accumulator %= self.step;
            let discarded = before - self.accumulator;
            self.dropped += discarded;
            log::debug!("Scheduler overrun: dropped {:.4}s after {} ticks", discarded, substeps);
        }
        self.total_ticks += u64::from(substeps);
        substeps
    }

    /// Fraction of a step waiting in the accumulator (render interpolation)
    pub fn alpha(&self) -> f32 {
        (self.accumulator / self.step).clamp(0.0, 1.0)
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
        self.dropped = 0.0;
        self.total_ticks = 0;
    }

    /// Total simulated time thrown away by overruns
    pub fn dropped_time(&self) -> f32 {
        self.dropped
    }

    pub fn total_ticks(&self) -> u64 {
        self.total_ticks
    }

    pub fn step(&self) -> f32 {
        self.step
    }
}
