//! Global scatter/chase phase schedule

use serde::{Deserialize, Serialize};

use super::state::PursuerMode;

/// Global pursuer behavior outside of frightened/eaten/exiting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaveMode {
    Scatter,
    Chase,
}

impl WaveMode {
    pub fn pursuer_mode(self) -> PursuerMode {
        match self {
            WaveMode::Scatter => PursuerMode::Scatter,
            WaveMode::Chase => PursuerMode::Chase,
        }
    }
}

/// Number of scatter/chase pairs before permanent chase
const WAVES: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SchedulePhase {
    pub mode: WaveMode,
    /// `None` lasts forever
    pub duration: Option<f32>,
}

/// Ordered phases for one level; the index only moves forward
#[derive(Debug, Clone)]
pub struct PhaseSchedule {
    phases: Vec<SchedulePhase>,
    index: usize,
    elapsed: f32,
}

impl PhaseSchedule {
    pub fn for_level(level: u32) -> Self {
        let level = level as f32;
        let scatter = (7.0 - level).max(3.0);
        let chase = 20.0 + 3.0 * level;

        let mut phases = Vec::with_capacity(WAVES * 2 + 1);
        for _ in 0..WAVES {
            phases.push(SchedulePhase { mode: WaveMode::Scatter, duration: Some(scatter) });
            phases.push(SchedulePhase { mode: WaveMode::Chase, duration: Some(chase) });
        }
        phases.push(SchedulePhase { mode: WaveMode::Chase, duration: None });
        Self { phases, index: 0, elapsed: 0.0 }
    }

    pub fn current(&self) -> WaveMode {
        self.phases[self.index].mode
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn phases(&self) -> &[SchedulePhase] {
        &self.phases
    }

    /// Seconds left in the active phase (`None` when permanent)
    pub fn remaining(&self) -> Option<f32> {
        self.phases[self.index].duration.map(|d| (d - self.elapsed).max(0.0))
    }

    /// Advance by `dt`. Returns the new mode if a phase boundary was crossed.
    pub fn advance(&mut self, dt: f32) -> Option<WaveMode> {
        let before = self.current();
        self.elapsed += dt;
        while let Some(duration) = self.phases[self.index].duration {
            if self.elapsed < duration {
                break;
            }
            self.elapsed -= duration;
            self.index += 1;
        }
        let after = self.current();
        (after != before).then_some(after)
    }
}
