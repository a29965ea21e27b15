//! Deterministic replay without a runtime.
//!
//! Render ticks are derived from sample timestamps through a
//! [`RateController`]: before each sample is classified, every tick due
//! up to its timestamp is run against the targets that were current at
//! that point. The drift phase for tick `k` is `k / hz`. A timestamp jump
//! longer than [`MAX_CATCH_UP_SECS`](handweave_common::clock::MAX_CATCH_UP_SECS)
//! runs only that many seconds of ticks.

use handweave_choreography::{FormationState, MotionIntegrator, RenderFrame};
use handweave_common::clock::RateController;
use handweave_common::config::AppConfig;
use handweave_common::error::HandweaveResult;
use handweave_gesture::LandmarkSource;
use handweave_model::gesture::GestureReading;
use handweave_model::landmark::{DetectionSample, TimestampNs};
use serde::Serialize;

use crate::cycle::{CycleOutcome, DetectionCycle, DetectionStats};

/// One accepted formation change during a replay.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TransitionRecord {
    pub timestamp_ns: TimestampNs,
    pub reading: GestureReading,
    pub state: FormationState,
    pub generation: u64,
    /// Render ticks that had run when the transition was applied.
    pub tick: u64,
}

/// Summary of a completed replay.
#[derive(Debug, Clone, Serialize)]
pub struct ReplayReport {
    pub detection: DetectionStats,
    pub ticks: u64,
    pub transitions: Vec<TransitionRecord>,
    pub final_state: FormationState,
    pub final_gesture: GestureReading,
    /// Largest remaining object distance to its target.
    pub max_distance: f64,
}

/// Drives detection and motion from recorded samples.
pub struct OfflineDriver {
    cycle: DetectionCycle,
    integrator: MotionIntegrator,
    rate: RateController,
    tick_rate_hz: u32,
    transitions: Vec<TransitionRecord>,
}

impl OfflineDriver {
    pub fn new(cycle: DetectionCycle, integrator: MotionIntegrator, tick_rate_hz: u32) -> Self {
        Self {
            cycle,
            integrator,
            rate: RateController::new(tick_rate_hz),
            tick_rate_hz: tick_rate_hz.max(1),
            transitions: Vec::new(),
        }
    }

    pub fn from_config(config: &AppConfig) -> HandweaveResult<Self> {
        let cycle = DetectionCycle::from_config(config)?;
        let integrator = MotionIntegrator::new(&cycle.targets(), &config.motion);
        Ok(Self::new(cycle, integrator, config.scheduler.tick_rate_hz))
    }

    /// Run due ticks, then one detection cycle for `sample`.
    pub fn feed(&mut self, sample: &DetectionSample) -> CycleOutcome {
        let due = self.rate.ticks_until(sample.timestamp_ns);
        self.run_ticks(due);

        let outcome = self.cycle.process(sample);
        if let CycleOutcome::Classified {
            update,
            transition: Some(targets),
        } = &outcome
        {
            self.transitions.push(TransitionRecord {
                timestamp_ns: sample.timestamp_ns,
                reading: update.reading,
                state: targets.state,
                generation: targets.generation,
                tick: self.integrator.ticks(),
            });
        }
        outcome
    }

    /// Run `count` ticks against the current targets.
    pub fn run_ticks(&mut self, count: u64) {
        let targets = self.cycle.targets();
        for _ in 0..count {
            let phase = self.integrator.ticks() as f64 / f64::from(self.tick_rate_hz);
            self.integrator.tick(&targets, phase);
        }
    }

    /// Feed every sample from `source`; stops at the first empty poll.
    ///
    /// Source errors are logged and skipped.
    pub fn run_source(&mut self, source: &mut dyn LandmarkSource) -> u64 {
        let mut fed = 0;
        loop {
            match source.poll() {
                Ok(Some(sample)) => {
                    self.feed(&sample);
                    fed += 1;
                }
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!(source = %source.name(), error = %e, "Skipping bad sample");
                }
            }
        }
        fed
    }

    pub fn cycle(&self) -> &DetectionCycle {
        &self.cycle
    }

    pub fn integrator(&self) -> &MotionIntegrator {
        &self.integrator
    }

    pub fn snapshot(&self) -> RenderFrame {
        self.integrator.snapshot()
    }

    pub fn transitions(&self) -> &[TransitionRecord] {
        &self.transitions
    }

    /// Run `settle_ticks` more ticks and summarize.
    pub fn finish(mut self, settle_ticks: u64) -> ReplayReport {
        self.run_ticks(settle_ticks);
        let targets = self.cycle.targets();
        ReplayReport {
            detection: self.cycle.stats(),
            ticks: self.integrator.ticks(),
            max_distance: self.integrator.max_distance_to(&targets),
            final_state: self.cycle.state(),
            final_gesture: self.cycle.gesture(),
            transitions: self.transitions,
        }
    }
}
