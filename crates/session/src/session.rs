//! Live choreography session management.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use handweave_choreography::{FormationState, MotionIntegrator, RenderFrame, TargetSet};
use handweave_common::clock::SessionClock;
use handweave_common::config::AppConfig;
use handweave_common::error::{HandweaveError, HandweaveResult};
use handweave_gesture::LandmarkSource;
use handweave_model::gesture::GestureReading;
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::cycle::{DetectionCycle, DetectionStats, DetectionTask};
use crate::scheduler::{Scheduler, TickHandle};

/// State of a choreography session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Created but not started.
    Idle,
    /// Detection and render cycles running.
    Running,
    /// Both cycles shut down.
    Stopped,
}

/// Totals reported when a session stops.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub started_at: String,
    pub duration_secs: f64,
    pub ticks: u64,
    pub detection: DetectionStats,
    pub final_state: FormationState,
    pub final_gesture: GestureReading,
    pub max_distance: f64,
}

/// Runs the detection cycle and the render scheduler side by side.
///
/// The detection task publishes gesture readings and whole target sets on
/// watch channels; the scheduler reads the latest target set each tick and
/// publishes a [`RenderFrame`]. Neither side waits on the other.
pub struct ChoreographySession {
    config: AppConfig,
    state: SessionState,
    clock: Option<SessionClock>,
    targets_rx: watch::Receiver<Arc<TargetSet>>,
    gesture_rx: watch::Receiver<GestureReading>,
    frames_rx: watch::Receiver<RenderFrame>,
    pending: Option<Pending>,
    detection_stop: Option<Arc<AtomicBool>>,
    detection_task: Option<JoinHandle<HandweaveResult<DetectionStats>>>,
    ticker: Option<TickHandle>,
}

/// Pieces built by `new` and consumed by `start`.
struct Pending {
    cycle: DetectionCycle,
    integrator: MotionIntegrator,
    targets_tx: watch::Sender<Arc<TargetSet>>,
    gesture_tx: watch::Sender<GestureReading>,
    frames_tx: watch::Sender<RenderFrame>,
}

impl ChoreographySession {
    /// Build the catalog, controller and integrator. Nothing runs yet.
    pub fn new(config: AppConfig) -> HandweaveResult<Self> {
        let cycle = DetectionCycle::from_config(&config)?;
        let targets = cycle.targets();
        let integrator = MotionIntegrator::new(&targets, &config.motion);

        let (targets_tx, targets_rx) = watch::channel(targets);
        let (gesture_tx, gesture_rx) = watch::channel(cycle.gesture());
        let (frames_tx, frames_rx) = watch::channel(integrator.snapshot());

        Ok(Self {
            config,
            state: SessionState::Idle,
            clock: None,
            targets_rx,
            gesture_rx,
            frames_rx,
            pending: Some(Pending {
                cycle,
                integrator,
                targets_tx,
                gesture_tx,
                frames_tx,
            }),
            detection_stop: None,
            detection_task: None,
            ticker: None,
        })
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Start both cycles, reading samples from `source`.
    pub fn start(&mut self, source: Box<dyn LandmarkSource>) -> HandweaveResult<()> {
        if self.state != SessionState::Idle {
            return Err(HandweaveError::scheduler("Session already started"));
        }
        let Some(pending) = self.pending.take() else {
            return Err(HandweaveError::scheduler("Session already started"));
        };

        let clock = SessionClock::start();
        tracing::info!(
            source = %source.name(),
            objects = self.config.formation.object_count,
            hz = self.config.scheduler.tick_rate_hz,
            started_at = %clock.epoch_wall(),
            "Starting choreography session"
        );

        self.ticker = Some(Scheduler::spawn(
            pending.integrator,
            self.targets_rx.clone(),
            pending.frames_tx,
            self.config.scheduler.tick_rate_hz,
            clock.clone(),
        ));

        let task = DetectionTask::new(
            pending.cycle,
            source,
            pending.targets_tx,
            pending.gesture_tx,
            Duration::from_millis(self.config.scheduler.detection_poll_interval_ms),
        );
        self.detection_stop = Some(task.stop_flag());
        self.detection_task = Some(tokio::spawn(task.run()));

        self.clock = Some(clock);
        self.state = SessionState::Running;
        Ok(())
    }

    /// Latest gesture reading, for display only.
    pub fn gesture(&self) -> GestureReading {
        *self.gesture_rx.borrow()
    }

    pub fn formation_state(&self) -> FormationState {
        self.targets_rx.borrow().state
    }

    pub fn subscribe_frames(&self) -> watch::Receiver<RenderFrame> {
        self.frames_rx.clone()
    }

    pub fn subscribe_gesture(&self) -> watch::Receiver<GestureReading> {
        self.gesture_rx.clone()
    }

    pub fn subscribe_targets(&self) -> watch::Receiver<Arc<TargetSet>> {
        self.targets_rx.clone()
    }

    /// Whether the detection task has ended on its own (source exhausted).
    pub fn detection_finished(&self) -> bool {
        self.detection_task
            .as_ref()
            .map(|task| task.is_finished())
            .unwrap_or(false)
    }

    /// Cancel the scheduler, stop detection, and wait for both.
    pub async fn stop(&mut self) -> HandweaveResult<SessionSummary> {
        if self.state != SessionState::Running {
            return Err(HandweaveError::scheduler("Session not running"));
        }

        tracing::info!("Stopping choreography session");

        let ticker = self
            .ticker
            .take()
            .ok_or_else(|| HandweaveError::scheduler("Render scheduler missing"))?;
        ticker.cancel();

        if let Some(stop) = self.detection_stop.take() {
            stop.store(true, Ordering::SeqCst);
        }

        let detection = match self.detection_task.take() {
            Some(handle) => match handle.await {
                Ok(Ok(stats)) => stats,
                Ok(Err(e)) => {
                    tracing::warn!(error = %e, "Detection task exited with error");
                    DetectionStats::default()
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Detection task join failed");
                    DetectionStats::default()
                }
            },
            None => DetectionStats::default(),
        };

        let integrator = ticker.join().await?;
        let targets = Arc::clone(&self.targets_rx.borrow());
        self.state = SessionState::Stopped;

        let (started_at, duration_secs) = self
            .clock
            .as_ref()
            .map(|c| (c.epoch_wall().to_string(), c.elapsed_secs()))
            .unwrap_or_default();

        let summary = SessionSummary {
            started_at,
            duration_secs,
            ticks: integrator.ticks(),
            detection,
            final_state: targets.state,
            final_gesture: self.gesture(),
            max_distance: integrator.max_distance_to(&targets),
        };
        tracing::info!(
            duration_secs = summary.duration_secs,
            ticks = summary.ticks,
            samples = summary.detection.samples,
            "Choreography session stopped"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use handweave_gesture::ScriptedSource;

    #[tokio::test]
    async fn test_lifecycle() {
        let mut session = ChoreographySession::new(AppConfig::default()).unwrap();
        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.stop().await.is_err());

        session.start(Box::new(ScriptedSource::open())).unwrap();
        assert_eq!(session.state(), SessionState::Running);
        assert!(session.start(Box::new(ScriptedSource::open())).is_err());

        let summary = session.stop().await.unwrap();
        assert_eq!(session.state(), SessionState::Stopped);
        assert_eq!(summary.final_state, FormationState::Idle);
        assert!(session.stop().await.is_err());
    }

    #[test]
    fn test_rejects_invalid_config() {
        let mut config = AppConfig::default();
        config.scheduler.tick_rate_hz = 0;
        assert!(ChoreographySession::new(config).is_err());
    }
}
